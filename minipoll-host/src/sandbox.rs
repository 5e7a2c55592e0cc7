//! In-memory collaborators for headless runs and tests.
//!
//! [`SandboxMovement`] walks a point across a flat square world centred on
//! the origin (the x/z plane). [`RecordingVisuals`] keeps every animation
//! name for later inspection; [`LoggingVisuals`] sends them to `tracing`.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use minipoll_core::{EmotionKind, MovementState, Position};

use crate::collaborators::{MovementExecutor, VisualExecutor};

const WALK_SPEED: f32 = 2.0;
const RUN_MULTIPLIER: f32 = 2.0;
const WANDER_RADIUS: f32 = 5.0;
const EXPLORE_RADIUS: f32 = 10.0;
const ARRIVAL_EPSILON: f32 = 0.05;

/// Straight-line movement inside `[-extent, extent]²`.
#[derive(Debug, Clone)]
pub struct SandboxMovement {
    position: Position,
    destination: Option<Position>,
    state: MovementState,
    reached: bool,
    extent: f32,
    rng: StdRng,
}

impl SandboxMovement {
    /// Start at `start` in a world of half-size `extent`.
    #[must_use]
    pub fn new(start: Position, extent: f32, seed: u64) -> Self {
        Self {
            position: start,
            destination: None,
            state: MovementState::Idle,
            reached: false,
            extent: extent.abs().max(1.0),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current destination, if walking.
    #[must_use]
    pub fn destination(&self) -> Option<Position> {
        self.destination
    }

    fn in_bounds(&self, p: Position) -> bool {
        p.x.abs() <= self.extent && p.z.abs() <= self.extent && p.x.is_finite() && p.z.is_finite()
    }

    fn clamp(&self, p: Position) -> Position {
        Position::new(
            p.x.clamp(-self.extent, self.extent),
            p.y,
            p.z.clamp(-self.extent, self.extent),
        )
    }

    fn random_offset(&mut self, radius: f32) -> Position {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = self.rng.gen_range(radius * 0.3..=radius);
        self.clamp(Position::new(
            self.position.x + angle.cos() * distance,
            self.position.y,
            self.position.z + angle.sin() * distance,
        ))
    }
}

impl MovementExecutor for SandboxMovement {
    fn set_destination(&mut self, target: Position) -> bool {
        if !self.in_bounds(target) {
            trace!(%target, "destination out of bounds");
            return false;
        }
        self.destination = Some(target);
        self.state = MovementState::Walking;
        true
    }

    fn stop_moving(&mut self) {
        self.destination = None;
        self.state = MovementState::Idle;
    }

    fn wander_randomly(&mut self) {
        let target = self.random_offset(WANDER_RADIUS);
        self.set_destination(target);
    }

    fn explore_new_area(&mut self) {
        let target = self.random_offset(EXPLORE_RADIUS);
        if self.set_destination(target) {
            self.state = MovementState::Running;
        }
    }

    fn take_destination_reached(&mut self) -> bool {
        std::mem::take(&mut self.reached)
    }

    fn position(&self) -> Position {
        self.position
    }

    fn movement_state(&self) -> MovementState {
        self.state
    }

    fn step(&mut self, dt: f64) {
        let Some(target) = self.destination else {
            return;
        };
        let speed = if self.state == MovementState::Running {
            WALK_SPEED * RUN_MULTIPLIER
        } else {
            WALK_SPEED
        };
        #[allow(clippy::cast_possible_truncation)]
        let travel = speed * dt as f32;
        let remaining = self.position.distance(&target);

        if remaining <= travel + ARRIVAL_EPSILON {
            self.position = target;
            self.destination = None;
            self.state = MovementState::Idle;
            self.reached = true;
            return;
        }
        let t = travel / remaining;
        self.position = Position::new(
            self.position.x + (target.x - self.position.x) * t,
            self.position.y + (target.y - self.position.y) * t,
            self.position.z + (target.z - self.position.z) * t,
        );
    }
}

/// Keeps every animation name, shareable with the test that created it.
#[derive(Debug, Clone, Default)]
pub struct RecordingVisuals {
    played: Arc<Mutex<Vec<String>>>,
    emotion_updates: Arc<Mutex<Vec<(EmotionKind, f32)>>>,
}

impl RecordingVisuals {
    /// Animation names in play order.
    #[must_use]
    pub fn played(&self) -> Vec<String> {
        self.played.lock().clone()
    }

    /// Emotion visual updates in order.
    #[must_use]
    pub fn emotion_updates(&self) -> Vec<(EmotionKind, f32)> {
        self.emotion_updates.lock().clone()
    }
}

impl VisualExecutor for RecordingVisuals {
    fn play_animation(&mut self, name: &str) {
        self.played.lock().push(name.to_string());
    }

    fn update_emotion_visuals(&mut self, kind: EmotionKind, intensity: f32) {
        self.emotion_updates.lock().push((kind, intensity));
    }
}

/// Sends presentation hooks to `tracing` at trace level.
#[derive(Debug, Clone)]
pub struct LoggingVisuals {
    name: String,
}

impl LoggingVisuals {
    /// Visuals for the agent called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl VisualExecutor for LoggingVisuals {
    fn play_animation(&mut self, animation: &str) {
        trace!(agent = %self.name, animation, "play animation");
    }

    fn update_emotion_visuals(&mut self, kind: EmotionKind, intensity: f32) {
        trace!(agent = %self.name, %kind, intensity, "emotion visuals");
    }
}
