//! Engine events.
//!
//! Models never call observers directly. Each one queues [`EngineEvent`]s
//! while it mutates, and the owning agent drains the queues after every
//! operation, preserving the order in which the changes happened.

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, EmotionKind, NeedKind, RelationshipType};

/// A state change inside one agent's models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// An emotion changed by at least the change threshold.
    EmotionChanged {
        /// Which emotion.
        kind: EmotionKind,
        /// Intensity after the change.
        value: f32,
    },
    /// The dominant emotion moved to another kind.
    DominantEmotionChanged {
        /// Dominant kind before.
        previous: EmotionKind,
        /// Dominant kind now.
        current: EmotionKind,
    },
    /// A need crossed the critical threshold downward.
    NeedCritical {
        /// Which need.
        need: NeedKind,
        /// Value after the crossing.
        value: f32,
    },
    /// A need crossed the high threshold upward.
    NeedSatisfied {
        /// Which need.
        need: NeedKind,
        /// Value after the crossing.
        value: f32,
    },
    /// An experience was recorded.
    ExperienceLearned {
        /// Experience identifier.
        id: String,
        /// Whether it was a positive outcome.
        positive: bool,
        /// Intensity after the learning curve.
        intensity: f32,
    },
    /// An experience was evaluated.
    ExperienceRecalled {
        /// Experience identifier.
        id: String,
        /// Evaluation score in `[-1, 1]`.
        value: f32,
    },
    /// An experience was evicted or forgotten.
    ExperienceForgotten {
        /// Experience identifier.
        id: String,
    },
    /// First contact with a peer.
    FirstMeet {
        /// The peer.
        peer: AgentId,
    },
    /// A relationship changed type.
    RelationshipChanged {
        /// The peer.
        peer: AgentId,
        /// Type before.
        previous: RelationshipType,
        /// Type now.
        current: RelationshipType,
    },
    /// An experience was passed on to a peer.
    ExperienceShared {
        /// The peer.
        peer: AgentId,
        /// Experience identifier.
        id: String,
    },
}

impl EngineEvent {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EmotionChanged { .. } => "emotion_changed",
            Self::DominantEmotionChanged { .. } => "dominant_emotion_changed",
            Self::NeedCritical { .. } => "need_critical",
            Self::NeedSatisfied { .. } => "need_satisfied",
            Self::ExperienceLearned { .. } => "experience_learned",
            Self::ExperienceRecalled { .. } => "experience_recalled",
            Self::ExperienceForgotten { .. } => "experience_forgotten",
            Self::FirstMeet { .. } => "first_meet",
            Self::RelationshipChanged { .. } => "relationship_changed",
            Self::ExperienceShared { .. } => "experience_shared",
        }
    }
}
