//! Decision policy — weighted-random choice of the next action.
//!
//! Every decision tick the policy builds a fresh candidate list from a
//! [`DecisionContext`] snapshot of the agent's state, then draws one action
//! with probability proportional to its weight:
//!
//! | Action      | Weight                                              | Present when          |
//! |-------------|-----------------------------------------------------|-----------------------|
//! | Rest        | 3.0 if Tired > 0.7, else 0.5                        | always                |
//! | Explore     | 0.5 + Curious intensity                             | always                |
//! | Interaction | 1.0, ×0.3 when dominant emotion is Scared           | interactables nearby  |
//! | Social      | socializing tendency, ×1.5 when dominant is Happy   | peers nearby          |
//! | Movement    | 1.0                                                 | always                |
//!
//! An empty or weightless list yields [`ActionKind::Idle`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::DecisionConfig;
use crate::emotion::EmotionModel;
use crate::types::{ActionKind, EmotionKind};
use crate::weighted::choose_weighted_by;

/// One weighted candidate action. Built fresh each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Candidate action.
    pub action: ActionKind,
    /// Selection weight, never negative.
    pub weight: f32,
}

impl DecisionOption {
    /// A candidate with its weight floored at zero.
    #[must_use]
    pub fn new(action: ActionKind, weight: f32) -> Self {
        Self { action, weight: weight.max(0.0) }
    }
}

/// Everything the policy reads about an agent at decision time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionContext {
    /// Tired intensity.
    pub tired: f32,
    /// Curious intensity.
    pub curiosity: f32,
    /// Current dominant emotion.
    pub dominant: EmotionKind,
    /// Whether any world object is in reach of perception.
    pub has_nearby_interactables: bool,
    /// Whether any other Minipoll is within the social radius.
    pub has_nearby_peers: bool,
    /// Personality weight for social behaviour.
    pub socializing_tendency: f32,
}

impl DecisionContext {
    /// Snapshot the emotion-derived fields from a model.
    #[must_use]
    pub fn from_emotions(
        emotions: &EmotionModel,
        has_nearby_interactables: bool,
        has_nearby_peers: bool,
        socializing_tendency: f32,
    ) -> Self {
        Self {
            tired: emotions.intensity(EmotionKind::Tired),
            curiosity: emotions.intensity(EmotionKind::Curious),
            dominant: emotions.dominant(),
            has_nearby_interactables,
            has_nearby_peers,
            socializing_tendency,
        }
    }
}

/// Stateless weighted selector over [`ActionKind`]s.
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    config: DecisionConfig,
}

impl DecisionPolicy {
    /// Create a policy with the given tuning.
    #[must_use]
    pub fn new(config: &DecisionConfig) -> Self {
        Self { config: config.clone() }
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Autonomy gate: a uniform draw above the autonomy level skips the tick.
    pub fn should_decide<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        let draw: f32 = rng.r#gen();
        draw <= self.config.autonomy
    }

    /// Candidate list for the current state, in a fixed order.
    #[must_use]
    pub fn build_candidates(&self, ctx: &DecisionContext) -> Vec<DecisionOption> {
        let c = &self.config;
        let mut options = Vec::with_capacity(5);

        let rest = if ctx.tired > c.tired_threshold { c.rest_weight_tired } else { c.rest_weight };
        options.push(DecisionOption::new(ActionKind::Rest, rest));
        options.push(DecisionOption::new(ActionKind::Explore, c.explore_base_weight + ctx.curiosity));

        if ctx.has_nearby_interactables {
            let mut weight = c.interaction_weight;
            if ctx.dominant == EmotionKind::Scared {
                weight *= c.scared_interaction_factor;
            }
            options.push(DecisionOption::new(ActionKind::Interaction, weight));
        }

        if ctx.has_nearby_peers {
            let mut weight = ctx.socializing_tendency;
            if ctx.dominant == EmotionKind::Happy {
                weight *= c.happy_social_factor;
            }
            options.push(DecisionOption::new(ActionKind::Social, weight));
        }

        options.push(DecisionOption::new(ActionKind::Movement, c.movement_weight));
        options
    }

    /// Draw one action. Returns [`ActionKind::Idle`] when nothing carries
    /// weight.
    pub fn choose_action<R: Rng + ?Sized>(&self, candidates: &[DecisionOption], rng: &mut R) -> ActionKind {
        choose_weighted_by(candidates, |o| o.weight, rng).map_or(ActionKind::Idle, |o| o.action)
    }

    /// Full decision tick: autonomy gate, candidates, draw.
    ///
    /// `None` means the autonomy gate skipped this tick.
    pub fn decide<R: Rng + ?Sized>(&self, ctx: &DecisionContext, rng: &mut R) -> Option<ActionKind> {
        if !self.should_decide(rng) {
            return None;
        }
        let candidates = self.build_candidates(ctx);
        let action = self.choose_action(&candidates, rng);
        trace!(%action, candidates = candidates.len(), "decision drawn");
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ctx() -> DecisionContext {
        DecisionContext {
            tired: 0.0,
            curiosity: 0.0,
            dominant: EmotionKind::Neutral,
            has_nearby_interactables: false,
            has_nearby_peers: false,
            socializing_tendency: 0.5,
        }
    }

    fn weight_of(options: &[DecisionOption], action: ActionKind) -> Option<f32> {
        options.iter().find(|o| o.action == action).map(|o| o.weight)
    }

    #[test]
    fn alone_and_rested() {
        let policy = DecisionPolicy::new(&DecisionConfig::default());
        let options = policy.build_candidates(&ctx());
        assert_eq!(options.len(), 3);
        assert_eq!(weight_of(&options, ActionKind::Rest), Some(0.5));
        assert_eq!(weight_of(&options, ActionKind::Explore), Some(0.5));
        assert_eq!(weight_of(&options, ActionKind::Movement), Some(1.0));
        assert_eq!(weight_of(&options, ActionKind::Interaction), None);
        assert_eq!(weight_of(&options, ActionKind::Social), None);
    }

    #[test]
    fn scared_dampens_interaction_and_happy_boosts_social() {
        let policy = DecisionPolicy::new(&DecisionConfig::default());
        let scared = DecisionContext {
            dominant: EmotionKind::Scared,
            has_nearby_interactables: true,
            has_nearby_peers: true,
            ..ctx()
        };
        let options = policy.build_candidates(&scared);
        assert!((weight_of(&options, ActionKind::Interaction).unwrap_or(0.0) - 0.3).abs() < 1e-6);
        assert!((weight_of(&options, ActionKind::Social).unwrap_or(0.0) - 0.5).abs() < 1e-6);

        let happy = DecisionContext { dominant: EmotionKind::Happy, ..scared };
        let options = policy.build_candidates(&happy);
        assert!((weight_of(&options, ActionKind::Interaction).unwrap_or(0.0) - 1.0).abs() < 1e-6);
        assert!((weight_of(&options, ActionKind::Social).unwrap_or(0.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn empty_candidates_choose_idle() {
        let policy = DecisionPolicy::new(&DecisionConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(policy.choose_action(&[], &mut rng), ActionKind::Idle);
        let zero = [DecisionOption::new(ActionKind::Rest, -1.0)];
        assert_eq!(policy.choose_action(&zero, &mut rng), ActionKind::Idle);
    }

    #[test]
    fn zero_autonomy_never_decides() {
        let config = DecisionConfig { autonomy: 0.0, ..DecisionConfig::default() };
        let policy = DecisionPolicy::new(&config);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert_eq!(policy.decide(&ctx(), &mut rng), None);
        }
    }

    #[test]
    fn full_autonomy_always_decides() {
        let policy = DecisionPolicy::new(&DecisionConfig::default());
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            assert!(policy.decide(&ctx(), &mut rng).is_some());
        }
    }

    #[test]
    fn from_emotions_reads_tired_and_curious() {
        let mut emotions = EmotionModel::new(&crate::config::EmotionConfig::default());
        emotions.modify(EmotionKind::Tired, 0.8);
        emotions.modify(EmotionKind::Curious, 0.3);
        let ctx = DecisionContext::from_emotions(&emotions, false, true, 0.4);
        assert!((ctx.tired - 0.8).abs() < 1e-6);
        assert!((ctx.curiosity - 0.3).abs() < 1e-6);
        assert_eq!(ctx.dominant, EmotionKind::Tired);
        assert!(ctx.has_nearby_peers);
    }
}
