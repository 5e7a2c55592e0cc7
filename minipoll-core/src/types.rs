//! Core type definitions shared by every Minipoll subsystem.
//!
//! Enumerations are declared in a fixed order. Where an algorithm needs a
//! deterministic tie-break (dominant emotion, lowest need) it walks the
//! variants in declaration order via the `ALL` constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for a Minipoll agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Create a new random agent ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic agent ID from a number (seeded runs, tests).
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Game time in seconds since the simulation started.
pub type GameSeconds = f64;

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 3D position in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// Create a position from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

/// An emotion a Minipoll can feel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmotionKind {
    /// Resting state; never dominant by intensity.
    Neutral,
    /// Joy.
    Happy,
    /// Sadness.
    Sad,
    /// Fear.
    Scared,
    /// Curiosity.
    Curious,
    /// Fatigue.
    Tired,
    /// Hunger felt as an emotion.
    Hungry,
    /// Excitement.
    Excited,
    /// Shyness.
    Shy,
    /// Anger.
    Angry,
    /// Surprise.
    Surprised,
}

impl EmotionKind {
    /// Every emotion in declaration order (the dominant-emotion tie-break order).
    pub const ALL: [Self; 11] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Scared,
        Self::Curious,
        Self::Tired,
        Self::Hungry,
        Self::Excited,
        Self::Shy,
        Self::Angry,
        Self::Surprised,
    ];

    /// Whether this is the neutral resting emotion.
    #[must_use]
    pub fn is_neutral(self) -> bool {
        self == Self::Neutral
    }

    /// Stable display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Scared => "Scared",
            Self::Curious => "Curious",
            Self::Tired => "Tired",
            Self::Hungry => "Hungry",
            Self::Excited => "Excited",
            Self::Shy => "Shy",
            Self::Angry => "Angry",
            Self::Surprised => "Surprised",
        }
    }
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// A physiological or social need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NeedKind {
    /// Rest.
    Energy,
    /// Food.
    Hunger,
    /// Company.
    Social,
    /// Play.
    Fun,
    /// Cleanliness.
    Hygiene,
}

impl NeedKind {
    /// Every need in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Energy,
        Self::Hunger,
        Self::Social,
        Self::Fun,
        Self::Hygiene,
    ];
}

impl fmt::Display for NeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Energy => "Energy",
            Self::Hunger => "Hunger",
            Self::Social => "Social",
            Self::Fun => "Fun",
            Self::Hygiene => "Hygiene",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Decisions & social
// ---------------------------------------------------------------------------

/// A top-level action the decision policy can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Wander to a random nearby point.
    Movement,
    /// Interact with a nearby world object.
    Interaction,
    /// Interact with a nearby Minipoll.
    Social,
    /// Stop and recover from tiredness.
    Rest,
    /// Head for an unexplored area.
    Explore,
    /// Do nothing this tick. Returned when no candidate carries weight.
    Idle,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Movement => "Movement",
            Self::Interaction => "Interaction",
            Self::Social => "Social",
            Self::Rest => "Rest",
            Self::Explore => "Explore",
            Self::Idle => "Idle",
        };
        f.write_str(name)
    }
}

/// Derived classification of a relationship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipType {
    /// Barely known.
    Stranger,
    /// Known, neither close nor hostile.
    Acquaintance,
    /// Friendly.
    Friend,
    /// Very high trust and friendship.
    BestFriend,
    /// Feared.
    Afraid,
    /// No trust, no friendship, no fear.
    Hostile,
}

impl RelationshipType {
    /// Whether the relationship counts as a friendship.
    #[must_use]
    pub fn is_friendly(self) -> bool {
        matches!(self, Self::Friend | Self::BestFriend)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stranger => "Stranger",
            Self::Acquaintance => "Acquaintance",
            Self::Friend => "Friend",
            Self::BestFriend => "BestFriend",
            Self::Afraid => "Afraid",
            Self::Hostile => "Hostile",
        };
        f.write_str(name)
    }
}

/// Kinds of Minipoll-to-Minipoll interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialInteractionKind {
    /// Simple hello.
    Greeting,
    /// Play together.
    Play,
    /// Pass on a remembered experience.
    ShareExperience,
    /// Ask for comfort while sad.
    SeekComfort,
    /// Watch from a distance. Needs no response.
    Observe,
}

// ---------------------------------------------------------------------------
// Life & movement state
// ---------------------------------------------------------------------------

/// Whether an agent is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifeState {
    /// Making decisions and moving.
    #[default]
    Awake,
    /// Sleeping; decisions and movement paused.
    Asleep,
    /// Long dormancy; decisions and movement paused.
    Hibernating,
}

/// What the movement collaborator is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MovementState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking to a destination.
    Walking,
    /// Running to a destination.
    Running,
    /// Lying down asleep.
    Sleeping,
    /// Dancing in place.
    Dancing,
    /// Hiding.
    Hiding,
}

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// Phase of the day/night cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    /// `[0.0, 0.125)`
    Dawn,
    /// `[0.125, 0.3)`
    Morning,
    /// `[0.3, 0.45)`
    Noon,
    /// `[0.45, 0.6)`
    Afternoon,
    /// `[0.6, 0.75)`
    Evening,
    /// `[0.75, 0.9)`
    Night,
    /// `[0.9, 1.0)`
    Midnight,
}

impl DayPhase {
    /// Phase for a normalized time of day in `[0, 1)`.
    #[must_use]
    pub fn from_normalized(t: f32) -> Self {
        if t < 0.125 {
            Self::Dawn
        } else if t < 0.3 {
            Self::Morning
        } else if t < 0.45 {
            Self::Noon
        } else if t < 0.6 {
            Self::Afternoon
        } else if t < 0.75 {
            Self::Evening
        } else if t < 0.9 {
            Self::Night
        } else {
            Self::Midnight
        }
    }

    /// Whether the phase belongs to the dark part of the cycle.
    #[must_use]
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Night | Self::Midnight)
    }
}

/// A time-of-day notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Current phase.
    pub phase: DayPhase,
    /// Position within the day, `[0, 1)`.
    pub normalized_time: f32,
    /// Day counter, starting at 1.
    pub day_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_phase_thresholds() {
        assert_eq!(DayPhase::from_normalized(0.0), DayPhase::Dawn);
        assert_eq!(DayPhase::from_normalized(0.125), DayPhase::Morning);
        assert_eq!(DayPhase::from_normalized(0.3), DayPhase::Noon);
        assert_eq!(DayPhase::from_normalized(0.59), DayPhase::Afternoon);
        assert_eq!(DayPhase::from_normalized(0.6), DayPhase::Evening);
        assert_eq!(DayPhase::from_normalized(0.8), DayPhase::Night);
        assert_eq!(DayPhase::from_normalized(0.95), DayPhase::Midnight);
    }

    #[test]
    fn emotion_order_starts_with_neutral() {
        assert_eq!(EmotionKind::ALL[0], EmotionKind::Neutral);
        assert!(EmotionKind::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn position_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn deterministic_agent_ids() {
        assert_eq!(AgentId::from_u128(7), AgentId::from_u128(7));
        assert_ne!(AgentId::from_u128(7), AgentId::from_u128(8));
    }
}
