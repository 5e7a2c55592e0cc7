//! Collaborator contracts between a Minipoll and its host.
//!
//! The engine never moves, renders or looks anything up by itself. A host
//! implements these traits and hands them to the agent at construction time
//! (see [`crate::agent::MinipollBuilder`]); the agent then calls them from
//! its tick.

use rand::RngCore;

use minipoll_core::interaction::InteractionResult;
use minipoll_core::{AgentId, DayPhase, EmotionKind, GameSeconds, MovementState, Position};

/// Moves one agent around the world.
pub trait MovementExecutor: Send {
    /// Start walking to `target`. Returns false when it is unreachable.
    fn set_destination(&mut self, target: Position) -> bool;

    /// Stop where the agent stands.
    fn stop_moving(&mut self);

    /// Walk to a random nearby point.
    fn wander_randomly(&mut self);

    /// Walk somewhere further away that has not been visited recently.
    fn explore_new_area(&mut self);

    /// Whether a destination was reached since the last call. Clears the flag.
    fn take_destination_reached(&mut self) -> bool;

    /// Current position.
    fn position(&self) -> Position;

    /// Current movement state.
    fn movement_state(&self) -> MovementState;

    /// Advance any simulated motion by `dt` seconds. Hosts with their own
    /// physics keep the default no-op.
    fn step(&mut self, _dt: f64) {}
}

/// Fire-and-forget presentation hooks.
pub trait VisualExecutor: Send {
    /// Trigger a named animation.
    fn play_animation(&mut self, name: &str);

    /// Reflect an emotion change in the agent's appearance.
    fn update_emotion_visuals(&mut self, kind: EmotionKind, intensity: f32);
}

/// What an interactable sees of the agent using it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interactor {
    /// Acting agent.
    pub agent: AgentId,
    /// Its dominant emotion.
    pub dominant: EmotionKind,
    /// Intensity of the dominant emotion.
    pub dominant_intensity: f32,
    /// What it has learned about this object, in `[-1, 1]`.
    pub experience_value: f32,
    /// Current phase of the day.
    pub phase: DayPhase,
}

/// A world object agents can interact with.
pub trait Interactable: Send {
    /// Stable id, used as the memory key.
    fn interaction_id(&self) -> &str;

    /// Where the object stands.
    fn position(&self) -> Position;

    /// Whether `who` may use the object right now.
    fn can_interact(&self, who: &Interactor, now: GameSeconds) -> bool;

    /// Use the object.
    fn interact(&mut self, who: &Interactor, now: GameSeconds, rng: &mut dyn RngCore)
        -> InteractionResult;

    /// Animation the agent plays after an interaction.
    fn animation_for(&self, _success: bool) -> Option<&str> {
        None
    }
}

/// Another agent as seen at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerView {
    /// The peer.
    pub id: AgentId,
    /// Where it stands.
    pub position: Position,
    /// Its dominant emotion.
    pub dominant: EmotionKind,
    /// Intensity of that emotion.
    pub dominant_intensity: f32,
}

/// Handle to one interactable in the host's object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub usize);

/// An interactable in range, as perceived by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenObject {
    /// Handle for later calls.
    pub handle: ObjectHandle,
    /// The object's interaction id.
    pub interaction_id: String,
    /// Where it stands.
    pub position: Position,
}

/// The agent's window onto the world during one tick.
pub trait Perception {
    /// Other agents within `radius` of `from`, excluding `me`.
    fn peers_within(&self, me: AgentId, from: Position, radius: f32) -> Vec<PeerView>;

    /// Whether `peer` still exists.
    fn peer_exists(&self, peer: AgentId) -> bool;

    /// Interactables within `radius` of `from`.
    fn objects_within(&self, from: Position, radius: f32) -> Vec<SeenObject>;

    /// Position of one object.
    fn object_position(&self, handle: ObjectHandle) -> Option<Position>;

    /// Ask an object whether it may be used.
    fn can_interact(&self, handle: ObjectHandle, who: &Interactor, now: GameSeconds) -> bool;

    /// Use an object. `None` when the handle is stale.
    fn interact(
        &mut self,
        handle: ObjectHandle,
        who: &Interactor,
        now: GameSeconds,
        rng: &mut dyn RngCore,
    ) -> Option<(InteractionResult, Option<String>)>;

    /// Current phase of the day.
    fn phase(&self) -> DayPhase;
}
