//! A world object driven by an [`InteractionProfile`].
//!
//! Gating (cooldown, use limit, required emotion, phases of the day) happens
//! here; the outcome roll is [`interaction::resolve_world_interaction`].
//! Objects without a profile fall back to a flat 70 % chance of a small
//! happy outcome.

use rand::{Rng, RngCore};
use tracing::debug;

use minipoll_core::interaction::{self, InteractionProfile, InteractionResult};
use minipoll_core::{DayPhase, EmotionKind, GameSeconds, Position};

use crate::collaborators::{Interactable, Interactor};

/// Success chance of an object with no profile.
const UNPROFILED_SUCCESS_CHANCE: f32 = 0.7;

/// A configurable world object.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfiledInteractable {
    id: String,
    position: Position,
    profile: Option<InteractionProfile>,
    cooldown_secs: f64,
    max_interactions: Option<u32>,
    required_emotion: Option<EmotionKind>,
    available_phases: Option<Vec<DayPhase>>,
    count: u32,
    last_used: GameSeconds,
}

fn never_used() -> GameSeconds {
    f64::NEG_INFINITY
}

impl ProfiledInteractable {
    /// An unprofiled object with a 3 s cooldown and no other gates.
    #[must_use]
    pub fn new(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            profile: None,
            cooldown_secs: 3.0,
            max_interactions: None,
            required_emotion: None,
            available_phases: None,
            count: 0,
            last_used: never_used(),
        }
    }

    /// Attach a profile. The object's id becomes the profile's id.
    #[must_use]
    pub fn with_profile(mut self, profile: InteractionProfile) -> Self {
        self.id.clone_from(&profile.interaction_id);
        self.profile = Some(profile);
        self
    }

    /// Seconds between two uses by anyone.
    #[must_use]
    pub fn with_cooldown(mut self, secs: f64) -> Self {
        self.cooldown_secs = secs.max(0.0);
        self
    }

    /// Total uses before the object is exhausted.
    #[must_use]
    pub fn with_max_interactions(mut self, max: u32) -> Self {
        self.max_interactions = Some(max);
        self
    }

    /// Only agents whose dominant emotion is `emotion` may use the object.
    #[must_use]
    pub fn requiring_emotion(mut self, emotion: EmotionKind) -> Self {
        self.required_emotion = Some(emotion);
        self
    }

    /// Restrict use to some phases of the day.
    #[must_use]
    pub fn available_during(mut self, phases: Vec<DayPhase>) -> Self {
        self.available_phases = Some(phases);
        self
    }

    /// Uses so far.
    #[must_use]
    pub fn interaction_count(&self) -> u32 {
        self.count
    }

    fn is_available(&self, who: &Interactor, now: GameSeconds) -> bool {
        if now - self.last_used < self.cooldown_secs {
            return false;
        }
        if self.max_interactions.is_some_and(|max| self.count >= max) {
            return false;
        }
        if self.required_emotion.is_some_and(|e| e != who.dominant) {
            return false;
        }
        self.available_phases.as_ref().is_none_or(|phases| phases.contains(&who.phase))
    }
}

impl Interactable for ProfiledInteractable {
    fn interaction_id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn can_interact(&self, who: &Interactor, now: GameSeconds) -> bool {
        self.is_available(who, now)
    }

    fn interact(
        &mut self,
        who: &Interactor,
        now: GameSeconds,
        rng: &mut dyn RngCore,
    ) -> InteractionResult {
        if !self.is_available(who, now) {
            debug!(object = %self.id, agent = %who.agent, "object unavailable");
            return InteractionResult::negative(
                0.1,
                EmotionKind::Sad,
                &format!("{}_unavailable", self.id),
            );
        }
        self.count = self.count.saturating_add(1);
        self.last_used = now;

        let result = match &self.profile {
            Some(profile) => interaction::resolve_world_interaction(
                profile,
                who.experience_value,
                who.dominant,
                who.dominant_intensity,
                rng,
            ),
            None => {
                let draw: f32 = rng.r#gen();
                if draw < UNPROFILED_SUCCESS_CHANCE {
                    InteractionResult::positive(0.2, EmotionKind::Happy, &self.id)
                } else {
                    InteractionResult::negative(0.1, EmotionKind::Sad, &self.id)
                }
            }
        };
        debug!(object = %self.id, agent = %who.agent, success = result.success, "object used");
        result
    }

    fn animation_for(&self, success: bool) -> Option<&str> {
        let profile = self.profile.as_ref()?;
        if success {
            profile.success_animation.as_deref()
        } else {
            profile.failure_animation.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minipoll_core::AgentId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn who(dominant: EmotionKind, phase: DayPhase) -> Interactor {
        Interactor {
            agent: AgentId::from_u128(1),
            dominant,
            dominant_intensity: 0.5,
            experience_value: 0.0,
            phase,
        }
    }

    #[test]
    fn cooldown_blocks_reuse() {
        let mut obj = ProfiledInteractable::new("rock", Position::default()).with_cooldown(3.0);
        let mut rng = StdRng::seed_from_u64(1);
        let w = who(EmotionKind::Happy, DayPhase::Noon);
        assert!(obj.can_interact(&w, 0.0));
        obj.interact(&w, 0.0, &mut rng);
        assert!(!obj.can_interact(&w, 2.0));
        assert!(obj.can_interact(&w, 3.0));
    }

    #[test]
    fn unavailable_use_reports_a_sad_failure() {
        let mut obj = ProfiledInteractable::new("well", Position::default()).with_max_interactions(1);
        let mut rng = StdRng::seed_from_u64(2);
        let w = who(EmotionKind::Happy, DayPhase::Noon);
        obj.interact(&w, 0.0, &mut rng);
        let result = obj.interact(&w, 100.0, &mut rng);
        assert!(!result.success);
        assert_eq!(result.primary_emotion, EmotionKind::Sad);
        assert_eq!(result.experience_id, "well_unavailable");
        assert_eq!(obj.interaction_count(), 1);
    }

    #[test]
    fn emotion_and_phase_gates() {
        let obj = ProfiledInteractable::new("lantern", Position::default())
            .requiring_emotion(EmotionKind::Curious)
            .available_during(vec![DayPhase::Night, DayPhase::Midnight]);
        assert!(!obj.can_interact(&who(EmotionKind::Happy, DayPhase::Night), 0.0));
        assert!(!obj.can_interact(&who(EmotionKind::Curious, DayPhase::Noon), 0.0));
        assert!(obj.can_interact(&who(EmotionKind::Curious, DayPhase::Night), 0.0));
    }

    #[test]
    fn profile_drives_the_outcome() {
        let mut profile =
            InteractionProfile::new("swing").with_impact(EmotionKind::Excited, 0.4, -0.1);
        profile.base_success_chance = 1.0;
        profile.success_animation = Some("Swing".into());
        let mut obj =
            ProfiledInteractable::new("ignored", Position::default()).with_profile(profile);
        let mut rng = StdRng::seed_from_u64(3);

        let result = obj.interact(&who(EmotionKind::Neutral, DayPhase::Noon), 0.0, &mut rng);
        assert!(result.success);
        assert_eq!(result.primary_emotion, EmotionKind::Excited);
        assert_eq!(result.experience_id, "swing");
        assert_eq!(obj.interaction_id(), "swing");
        assert_eq!(obj.animation_for(true), Some("Swing"));
        assert_eq!(obj.animation_for(false), None);
    }

    #[test]
    fn unprofiled_objects_mostly_succeed() {
        let mut rng = StdRng::seed_from_u64(4);
        let w = who(EmotionKind::Neutral, DayPhase::Noon);
        let mut successes = 0;
        for i in 0..2000 {
            let mut obj = ProfiledInteractable::new("stick", Position::default());
            if obj.interact(&w, f64::from(i), &mut rng).success {
                successes += 1;
            }
        }
        let rate = f64::from(successes) / 2000.0;
        assert!((rate - 0.7).abs() < 0.05, "success rate {rate}");
    }
}
