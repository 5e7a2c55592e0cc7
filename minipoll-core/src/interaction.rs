//! Interaction resolution — how attempts at world objects and peers turn out.
//!
//! Everything here is a pure function of the inputs plus one caller-supplied
//! random draw, so outcomes can be checked exactly by computing the chance
//! functions directly.
//!
//! ## World objects
//!
//! ```text
//! chance = base
//!        + 0.2·exp     (learned experience > 0)
//!        + 0.1·exp     (learned experience < 0, so a penalty)
//!        + mood term   (Happy +0.1·i, Excited +0.15·i, Sad −0.1·i,
//!                       Scared −0.2·i, Tired −0.15·i)
//! success  ⇔  draw < clamp01(chance)
//! ```
//!
//! ## Peers
//!
//! ```text
//! chance = 0.5 + relationship term + kind term + peer mood term
//! ```
//!
//! See [`social_success_chance`] for the tables.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::relationship::RelationshipRecord;
use crate::types::{EmotionKind, RelationshipType, SocialInteractionKind};

/// Experience id used when a positive result names none.
pub const GENERIC_POSITIVE: &str = "generic_positive";
/// Experience id used when a negative result names none.
pub const GENERIC_NEGATIVE: &str = "generic_negative";
/// Experience id of [`InteractionResult::neutral`].
pub const NEUTRAL_ID: &str = "neutral";

/// Fallback impact when a profile configures no matching emotion.
const DEFAULT_IMPACT: f32 = 0.1;

/// Outcome of one interaction, handed back to the acting agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResult {
    /// Whether the interaction succeeded.
    pub success: bool,
    /// Magnitude of the emotional effect, never negative.
    pub emotional_impact: f32,
    /// Emotion the impact applies to.
    pub primary_emotion: EmotionKind,
    /// Memory key the outcome is recorded under.
    pub experience_id: String,
}

impl InteractionResult {
    /// A success. Empty ids become `generic_positive`.
    #[must_use]
    pub fn positive(impact: f32, emotion: EmotionKind, experience_id: &str) -> Self {
        Self {
            success: true,
            emotional_impact: impact.abs(),
            primary_emotion: emotion,
            experience_id: non_empty_or(experience_id, GENERIC_POSITIVE),
        }
    }

    /// A failure. Empty ids become `generic_negative`.
    #[must_use]
    pub fn negative(impact: f32, emotion: EmotionKind, experience_id: &str) -> Self {
        Self {
            success: false,
            emotional_impact: impact.abs(),
            primary_emotion: emotion,
            experience_id: non_empty_or(experience_id, GENERIC_NEGATIVE),
        }
    }

    /// A success with no emotional weight.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            success: true,
            emotional_impact: 0.0,
            primary_emotion: EmotionKind::Neutral,
            experience_id: NEUTRAL_ID.to_string(),
        }
    }

    /// Signed emotion delta for the acting agent: `+impact` on success,
    /// `−impact` on failure.
    #[must_use]
    pub fn signed_impact(&self) -> f32 {
        if self.success { self.emotional_impact } else { -self.emotional_impact }
    }
}

fn non_empty_or(id: &str, fallback: &str) -> String {
    if id.is_empty() { fallback.to_string() } else { id.to_string() }
}

// ---------------------------------------------------------------------------
// World objects
// ---------------------------------------------------------------------------

/// How one emotion reacts to an object's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalImpact {
    /// Emotion affected.
    pub emotion: EmotionKind,
    /// Impact when the interaction succeeds.
    #[serde(default = "default_success_impact")]
    pub on_success: f32,
    /// Impact when it fails.
    #[serde(default = "default_failure_impact")]
    pub on_failure: f32,
}

/// Authored description of an interactable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionProfile {
    /// Stable memory key.
    pub interaction_id: String,
    /// Success chance before learned and mood adjustments.
    #[serde(default = "default_base_chance")]
    pub base_success_chance: f32,
    /// Emotional reactions the object can cause.
    #[serde(default)]
    pub emotional_impacts: Vec<EmotionalImpact>,
    /// Animation the agent plays on success.
    #[serde(default)]
    pub success_animation: Option<String>,
    /// Animation the agent plays on failure.
    #[serde(default)]
    pub failure_animation: Option<String>,
}

impl InteractionProfile {
    /// A profile with default chance and no configured impacts.
    #[must_use]
    pub fn new(interaction_id: impl Into<String>) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            base_success_chance: default_base_chance(),
            emotional_impacts: Vec::new(),
            success_animation: None,
            failure_animation: None,
        }
    }

    /// Add an emotional reaction.
    #[must_use]
    pub fn with_impact(mut self, emotion: EmotionKind, on_success: f32, on_failure: f32) -> Self {
        self.emotional_impacts.push(EmotionalImpact { emotion, on_success, on_failure });
        self
    }

    /// The strongest positive success impact, or Happy at 0.1.
    #[must_use]
    pub fn success_impact(&self) -> (EmotionKind, f32) {
        let mut best = (EmotionKind::Happy, 0.0_f32);
        for impact in &self.emotional_impacts {
            if impact.on_success > best.1 {
                best = (impact.emotion, impact.on_success);
            }
        }
        if best.1 > 0.0 { best } else { (best.0, DEFAULT_IMPACT) }
    }

    /// The strongest negative failure impact as a magnitude, or Sad at 0.1.
    #[must_use]
    pub fn failure_impact(&self) -> (EmotionKind, f32) {
        let mut best = (EmotionKind::Sad, 0.0_f32);
        for impact in &self.emotional_impacts {
            if impact.on_failure < 0.0 && impact.on_failure.abs() > best.1 {
                best = (impact.emotion, impact.on_failure.abs());
            }
        }
        if best.1 > 0.0 { best } else { (best.0, DEFAULT_IMPACT) }
    }
}

/// Adjusted success chance for a world object, in `[0, 1]`.
#[must_use]
pub fn world_success_chance(
    base: f32,
    learned_experience: f32,
    dominant: EmotionKind,
    intensity: f32,
) -> f32 {
    let mut chance = base;
    if learned_experience > 0.0 {
        chance += learned_experience * 0.2;
    } else if learned_experience < 0.0 {
        chance += learned_experience * 0.1;
    }
    chance += match dominant {
        EmotionKind::Happy => intensity * 0.1,
        EmotionKind::Excited => intensity * 0.15,
        EmotionKind::Sad => -intensity * 0.1,
        EmotionKind::Scared => -intensity * 0.2,
        EmotionKind::Tired => -intensity * 0.15,
        _ => 0.0,
    };
    clamp01(chance)
}

/// Attempt a world object.
///
/// One uniform draw decides success against [`world_success_chance`]. A
/// success reports the strongest positive success impact, a failure the most
/// negative failure impact.
pub fn resolve_world_interaction<R: Rng + ?Sized>(
    profile: &InteractionProfile,
    learned_experience: f32,
    dominant: EmotionKind,
    intensity: f32,
    rng: &mut R,
) -> InteractionResult {
    let chance =
        world_success_chance(profile.base_success_chance, learned_experience, dominant, intensity);
    let draw: f32 = rng.r#gen();
    let success = draw < chance;
    trace!(id = %profile.interaction_id, chance, draw, success, "world interaction resolved");

    if success {
        let (emotion, impact) = profile.success_impact();
        InteractionResult::positive(impact, emotion, &profile.interaction_id)
    } else {
        let (emotion, impact) = profile.failure_impact();
        InteractionResult::negative(impact, emotion, &profile.interaction_id)
    }
}

/// How interesting an object looks, in `[0.1, 2.0]`.
///
/// Starts at 1.0. A positive learned value adds `0.5·v` when it exceeds 0.8
/// with real history behind it, else `multiplier·v`. A negative value
/// subtracts `0.8·|v|` below −0.5, else `0.3·|v|`. The dominant emotion then
/// scales the result: Curious ×(1 + 0.5·i), Scared ×(1 − 0.7·i), Tired
/// ×(1 − 0.5·i).
#[must_use]
pub fn interest_level(
    experience_value: f32,
    has_history: bool,
    dominant: EmotionKind,
    intensity: f32,
    multiplier: f32,
) -> f32 {
    let mut interest = 1.0;
    if experience_value > 0.0 {
        if has_history && experience_value > 0.8 {
            interest += experience_value * 0.5;
        } else {
            interest += experience_value * multiplier;
        }
    } else if experience_value < 0.0 {
        let factor = if experience_value < -0.5 { 0.8 } else { 0.3 };
        interest -= experience_value.abs() * factor;
    }

    interest *= match dominant {
        EmotionKind::Curious => 1.0 + intensity * 0.5,
        EmotionKind::Scared => 1.0 - intensity * 0.7,
        EmotionKind::Tired => 1.0 - intensity * 0.5,
        _ => 1.0,
    };
    if interest.is_finite() { interest.clamp(0.1, 2.0) } else { 0.1 }
}

// ---------------------------------------------------------------------------
// Peers
// ---------------------------------------------------------------------------

type Effects = &'static [(EmotionKind, f32)];

const NO_EFFECT: Effects = &[];
const GREETING_RETURNED: Effects = &[(EmotionKind::Happy, 0.05)];
const PLAY_ACCEPTED: Effects = &[(EmotionKind::Happy, 0.15), (EmotionKind::Tired, 0.05)];
const SHARE_HEARD: Effects = &[(EmotionKind::Happy, 0.1)];
const COMFORTED: Effects = &[(EmotionKind::Sad, -0.15), (EmotionKind::Happy, 0.05)];
const DISAPPOINTED: Effects = &[(EmotionKind::Sad, 0.05)];

/// Result of one social attempt, before it is applied to either agent.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialOutcome {
    /// What was attempted.
    pub kind: SocialInteractionKind,
    /// Whether the peer responded positively.
    pub success: bool,
    /// Emotion deltas for the acting agent.
    pub actor_effects: Effects,
    /// Animation the acting agent plays.
    pub actor_animation: &'static str,
    /// Animation the peer plays in response, if any.
    pub peer_animation: Option<&'static str>,
    /// Whether the actor should pass an experience to the peer.
    pub share_experience: bool,
}

impl SocialOutcome {
    /// Apply the actor's emotion deltas.
    pub fn apply(&self, emotions: &mut crate::emotion::EmotionModel) {
        for &(kind, delta) in self.actor_effects {
            emotions.modify(kind, delta);
        }
    }
}

/// Probability that a peer responds positively, in `[0, 1]`.
///
/// | Term          | Contribution                                            |
/// |---------------|---------------------------------------------------------|
/// | base          | 0.5                                                     |
/// | relationship  | Friend/BestFriend +0.3, Acquaintance +0.1, Afraid/Hostile −0.4 |
/// | kind          | Greeting +0.2, Play +0.2·f − 0.1, ShareExperience +0.3·t − 0.1, SeekComfort +0.3·f − 0.1 |
/// | peer mood     | Happy +0.2·i, Sad/Tired −0.1·i, Scared −0.3·i           |
#[must_use]
pub fn social_success_chance(
    record: &RelationshipRecord,
    kind: SocialInteractionKind,
    peer_dominant: EmotionKind,
    peer_intensity: f32,
) -> f32 {
    let mut chance = 0.5;
    chance += match record.relationship_type {
        RelationshipType::Friend | RelationshipType::BestFriend => 0.3,
        RelationshipType::Acquaintance => 0.1,
        RelationshipType::Afraid | RelationshipType::Hostile => -0.4,
        RelationshipType::Stranger => 0.0,
    };
    chance += match kind {
        SocialInteractionKind::Greeting => 0.2,
        SocialInteractionKind::Play => record.friendship * 0.2 - 0.1,
        SocialInteractionKind::ShareExperience => record.trust * 0.3 - 0.1,
        SocialInteractionKind::SeekComfort => record.friendship * 0.3 - 0.1,
        SocialInteractionKind::Observe => 0.0,
    };
    chance += match peer_dominant {
        EmotionKind::Happy => peer_intensity * 0.2,
        EmotionKind::Sad | EmotionKind::Tired => -peer_intensity * 0.1,
        EmotionKind::Scared => -peer_intensity * 0.3,
        _ => 0.0,
    };
    clamp01(chance)
}

/// Attempt a social interaction with a peer.
///
/// The draw is always taken so the random stream does not depend on the
/// kind; Observe succeeds regardless of it.
pub fn resolve_social<R: Rng + ?Sized>(
    record: &RelationshipRecord,
    kind: SocialInteractionKind,
    peer_dominant: EmotionKind,
    peer_intensity: f32,
    rng: &mut R,
) -> SocialOutcome {
    use SocialInteractionKind as K;

    let chance = social_success_chance(record, kind, peer_dominant, peer_intensity);
    let draw: f32 = rng.r#gen();
    let responded = draw < chance;

    let (success, actor_effects, peer_animation) = match (kind, responded) {
        (K::Greeting, true) => (true, GREETING_RETURNED, Some("Greeting")),
        (K::Greeting, false) => (false, NO_EFFECT, Some("Ignore")),
        (K::Play, true) => (true, PLAY_ACCEPTED, Some("Play")),
        (K::Play, false) => (false, DISAPPOINTED, Some("Reject")),
        (K::ShareExperience, true) => (true, SHARE_HEARD, Some("Talk")),
        (K::ShareExperience, false) => (false, NO_EFFECT, Some("Ignore")),
        (K::SeekComfort, true) => (true, COMFORTED, Some("Comfort")),
        (K::SeekComfort, false) => (false, DISAPPOINTED, Some("Ignore")),
        (K::Observe, _) => (true, NO_EFFECT, None),
    };

    trace!(?kind, chance, draw, success, "social interaction resolved");
    SocialOutcome {
        kind,
        success,
        actor_effects,
        actor_animation: actor_animation(kind),
        peer_animation,
        share_experience: success && kind == K::ShareExperience,
    }
}

/// Animation the acting agent plays for a kind of social interaction.
#[must_use]
pub fn actor_animation(kind: SocialInteractionKind) -> &'static str {
    match kind {
        SocialInteractionKind::Greeting => "Greeting",
        SocialInteractionKind::Play => "Play",
        SocialInteractionKind::ShareExperience => "Talk",
        SocialInteractionKind::SeekComfort => "Sad",
        SocialInteractionKind::Observe => "Look",
    }
}

/// Trust and friendship deltas after a social attempt.
///
/// Success: `(+0.1·m, +0.05·m)`. Failure: `(−0.05·m, −0.1·m)`.
#[must_use]
pub fn relationship_deltas(success: bool, multiplier: f32) -> (f32, f32) {
    if success {
        (0.1 * multiplier, 0.05 * multiplier)
    } else {
        (-0.05 * multiplier, -0.1 * multiplier)
    }
}

fn clamp01(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

fn default_success_impact() -> f32 { 0.2 }
fn default_failure_impact() -> f32 { -0.2 }
fn default_base_chance() -> f32 { 0.8 }
