//! Simulation events and the observer bus.
//!
//! Agents queue [`SimEvent`]s while they tick; the population publishes them
//! through the [`EventBus`] after releasing the agent. Observers are
//! fire-and-forget: the simulation never depends on what they do.

use serde::{Deserialize, Serialize};
use tracing::trace;

use minipoll_core::{
    ActionKind, AgentId, EngineEvent, GameSeconds, LifeState, MovementState, Position,
    SocialInteractionKind, TimeOfDay,
};

/// Everything observable about a running simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A state change inside one agent's models.
    Engine {
        /// The agent.
        agent: AgentId,
        /// What changed.
        event: EngineEvent,
    },
    /// The decision policy picked an action.
    DecisionMade {
        /// The agent.
        agent: AgentId,
        /// Chosen action.
        action: ActionKind,
    },
    /// An agent started using a world object.
    InteractionStarted {
        /// The agent.
        agent: AgentId,
        /// The object's interaction id.
        object: String,
    },
    /// An object interaction finished.
    InteractionCompleted {
        /// The agent.
        agent: AgentId,
        /// The object's interaction id.
        object: String,
        /// Whether it succeeded.
        success: bool,
        /// Memory key the outcome was recorded under.
        experience_id: String,
        /// Signed emotional impact applied.
        impact: f32,
    },
    /// An agent approached a peer.
    SocialInteraction {
        /// The acting agent.
        agent: AgentId,
        /// The peer.
        peer: AgentId,
        /// What was attempted.
        kind: SocialInteractionKind,
        /// Whether the peer responded positively.
        success: bool,
    },
    /// Life state changed.
    StateChanged {
        /// The agent.
        agent: AgentId,
        /// New state.
        state: LifeState,
    },
    /// Movement state changed.
    MovementChanged {
        /// The agent.
        agent: AgentId,
        /// New state.
        state: MovementState,
    },
    /// Exploration found an object worth coming back to.
    InterestingLocationDiscovered {
        /// The agent.
        agent: AgentId,
        /// Where.
        position: Position,
        /// Interest weight.
        interest: f32,
    },
    /// The day/night clock changed phase.
    TimeOfDayChanged {
        /// The new time of day.
        time: TimeOfDay,
    },
}

impl SimEvent {
    /// Agent the event belongs to, if any.
    #[must_use]
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            Self::Engine { agent, .. }
            | Self::DecisionMade { agent, .. }
            | Self::InteractionStarted { agent, .. }
            | Self::InteractionCompleted { agent, .. }
            | Self::SocialInteraction { agent, .. }
            | Self::StateChanged { agent, .. }
            | Self::MovementChanged { agent, .. }
            | Self::InterestingLocationDiscovered { agent, .. } => Some(*agent),
            Self::TimeOfDayChanged { .. } => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Engine { event, .. } => event.name(),
            Self::DecisionMade { .. } => "decision_made",
            Self::InteractionStarted { .. } => "interaction_started",
            Self::InteractionCompleted { .. } => "interaction_completed",
            Self::SocialInteraction { .. } => "social_interaction",
            Self::StateChanged { .. } => "state_changed",
            Self::MovementChanged { .. } => "movement_changed",
            Self::InterestingLocationDiscovered { .. } => "interesting_location_discovered",
            Self::TimeOfDayChanged { .. } => "time_of_day_changed",
        }
    }
}

/// A published event with its simulation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRecord {
    /// Game time of publication.
    pub time: GameSeconds,
    /// The event.
    #[serde(flatten)]
    pub event: SimEvent,
}

type Observer = Box<dyn FnMut(&SimRecord) + Send>;

/// Fans events out to observers and optionally keeps a log.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Observer>,
    log: Option<Vec<SimRecord>>,
}

impl EventBus {
    /// A bus with no observers and no log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus that also keeps every record until drained.
    #[must_use]
    pub fn with_log() -> Self {
        Self { observers: Vec::new(), log: Some(Vec::new()) }
    }

    /// Register an observer.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&SimRecord) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Deliver one event to every observer.
    pub fn publish(&mut self, time: GameSeconds, event: SimEvent) {
        let record = SimRecord { time, event };
        trace!(time, event = record.event.name(), "publish");
        for observer in &mut self.observers {
            observer(&record);
        }
        if let Some(log) = &mut self.log {
            log.push(record);
        }
    }

    /// Take the logged records. Empty when logging is off.
    pub fn drain_log(&mut self) -> Vec<SimRecord> {
        self.log.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("logged", &self.log.as_ref().map(Vec::len))
            .finish()
    }
}
