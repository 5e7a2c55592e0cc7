//! Needs model — linear decay, edge-triggered thresholds, emotional feedback.
//!
//! Each tracked need holds a value in `[0, 1]` (1 = fully satisfied) that
//! drains at its own rate. Threshold events fire on the transition only:
//!
//! ```text
//!   1.0 ─┬─ high (0.8)      fill crossing upward   → NeedSatisfied + joy
//!        │
//!        ├─ low (0.3)       decay crossing downward → small penalty
//!        ├─ critical (0.1)  decay crossing downward → NeedCritical + large penalty
//!   0.0 ─┘
//! ```
//!
//! Emotional feedback goes through an optional [`EmotionModel`]; without one
//! the needs still evolve and only the feedback is skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NeedsConfig;
use crate::emotion::EmotionModel;
use crate::events::EngineEvent;
use crate::types::{DayPhase, EmotionKind, NeedKind};

/// Scale of the critical-crossing penalty.
const CRITICAL_EFFECT: f32 = 0.4;
/// Scale of the low-crossing penalty.
const LOW_EFFECT: f32 = 0.2;
/// Scale of the satisfied bonus.
const FILL_EFFECT: f32 = 0.3;

/// State of one need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedState {
    /// Current value, always in `[0, 1]`.
    pub current: f32,
    /// Active decay rate (may be scaled by time of day).
    pub decay_rate: f32,
    /// Configured decay rate the active rate is restored to.
    pub base_rate: f32,
}

/// Per-agent needs.
#[derive(Debug, Clone)]
pub struct NeedsModel {
    needs: BTreeMap<NeedKind, NeedState>,
    config: NeedsConfig,
    events: Vec<EngineEvent>,
}

impl NeedsModel {
    /// Create a model tracking the configured needs, all fully satisfied.
    #[must_use]
    pub fn new(config: &NeedsConfig) -> Self {
        let needs = config
            .tracked
            .iter()
            .map(|&need| {
                let rate = config.rates.base_rate(need);
                let state = NeedState { current: 1.0, decay_rate: rate, base_rate: rate };
                (need, state)
            })
            .collect();
        Self { needs, config: config.clone(), events: Vec::new() }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Drain every need by `decay_rate · dt`.
    ///
    /// A downward crossing of the critical threshold emits
    /// [`EngineEvent::NeedCritical`] and applies the large penalty; otherwise
    /// a downward crossing of the low threshold applies the small penalty.
    pub fn decay(&mut self, dt: f64, mut emotions: Option<&mut EmotionModel>) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let dt = dt as f32;
        let critical = self.config.critical_threshold;
        let low = self.config.low_threshold;
        let strength = self.config.effect_strength;

        let mut crossings = Vec::new();
        for (&need, state) in &mut self.needs {
            let previous = state.current;
            state.current = (previous - state.decay_rate * dt).max(0.0);
            let value = state.current;

            if previous > critical && critical >= value {
                crossings.push((need, value, true));
            } else if previous > low && low >= value {
                crossings.push((need, value, false));
            }
        }

        for (need, value, is_critical) in crossings {
            if is_critical {
                debug!(%need, value, "need critical");
                self.events.push(EngineEvent::NeedCritical { need, value });
                apply(emotions.as_deref_mut(), deficit_effects(need), CRITICAL_EFFECT * strength);
            } else {
                debug!(%need, value, "need low");
                apply(emotions.as_deref_mut(), deficit_effects(need), LOW_EFFECT * strength);
            }
        }
    }

    /// Satisfy a need by `amount`, saturating at 1.
    ///
    /// An untracked need starts being tracked at 0 first. Crossing the high
    /// threshold upward emits [`EngineEvent::NeedSatisfied`] and applies the
    /// positive feedback.
    pub fn fill(&mut self, need: NeedKind, amount: f32, emotions: Option<&mut EmotionModel>) {
        if !amount.is_finite() {
            warn!(%need, amount, "ignoring non-finite fill amount");
            return;
        }
        let untracked_rate = self.config.untracked_decay_rate;
        let state = self.needs.entry(need).or_insert_with(|| NeedState {
            current: 0.0,
            decay_rate: untracked_rate,
            base_rate: untracked_rate,
        });

        let previous = state.current;
        state.current = (previous + amount).clamp(0.0, 1.0);
        let value = state.current;

        let high = self.config.high_threshold;
        if previous < high && value >= high {
            debug!(%need, value, "need satisfied");
            self.events.push(EngineEvent::NeedSatisfied { need, value });
            apply(emotions, fill_effects(need), FILL_EFFECT * self.config.effect_strength);
        }
    }

    /// Overwrite a need's value without side-effects. Clamped to `[0, 1]`.
    pub fn set_value(&mut self, need: NeedKind, value: f32) {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 1.0 };
        let rate = self.config.rates.base_rate(need);
        self.needs
            .entry(need)
            .and_modify(|s| s.current = value)
            .or_insert(NeedState { current: value, decay_rate: rate, base_rate: rate });
    }

    /// Temporarily scale one need's decay rate relative to its base rate.
    pub fn scale_decay_rate(&mut self, need: NeedKind, multiplier: f32) {
        if let Some(state) = self.needs.get_mut(&need) {
            state.decay_rate = state.base_rate * multiplier.max(0.0);
        }
    }

    /// Restore every decay rate to its base rate.
    pub fn reset_decay_rates(&mut self) {
        for state in self.needs.values_mut() {
            state.decay_rate = state.base_rate;
        }
    }

    /// React to a time-of-day change.
    ///
    /// Dawn refills energy for a sleeper; evening and night speed up energy
    /// (and at night hunger) decay; every other phase restores base rates.
    pub fn apply_time_of_day(
        &mut self,
        phase: DayPhase,
        asleep: bool,
        emotions: Option<&mut EmotionModel>,
    ) {
        match phase {
            DayPhase::Dawn => {
                if asleep {
                    self.fill(NeedKind::Energy, self.config.dawn_energy_fill, emotions);
                }
            }
            DayPhase::Evening => {
                self.scale_decay_rate(NeedKind::Energy, self.config.evening_energy_multiplier);
            }
            DayPhase::Night => {
                self.scale_decay_rate(NeedKind::Hunger, self.config.night_hunger_multiplier);
                self.scale_decay_rate(NeedKind::Energy, self.config.night_energy_multiplier);
            }
            DayPhase::Morning | DayPhase::Noon | DayPhase::Afternoon | DayPhase::Midnight => {
                self.reset_decay_rates();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current value. Untracked needs read as fully satisfied.
    #[must_use]
    pub fn value(&self, need: NeedKind) -> f32 {
        self.needs.get(&need).map_or(1.0, |s| s.current)
    }

    /// Whether a need is at or below the critical threshold.
    #[must_use]
    pub fn is_critical(&self, need: NeedKind) -> bool {
        self.value(need) <= self.config.critical_threshold
    }

    /// Whether a need is at or below the low threshold.
    #[must_use]
    pub fn is_low(&self, need: NeedKind) -> bool {
        self.value(need) <= self.config.low_threshold
    }

    /// The most depleted need; Energy when everything is full.
    #[must_use]
    pub fn lowest_need(&self) -> NeedKind {
        let mut lowest = NeedKind::Energy;
        let mut lowest_value = 1.0;
        for (&need, state) in &self.needs {
            if state.current < lowest_value {
                lowest = need;
                lowest_value = state.current;
            }
        }
        lowest
    }

    /// Full state of one need.
    #[must_use]
    pub fn state(&self, need: NeedKind) -> Option<&NeedState> {
        self.needs.get(&need)
    }

    /// Value copy of every tracked need.
    #[must_use]
    pub fn values(&self) -> BTreeMap<NeedKind, f32> {
        self.needs.iter().map(|(&k, s)| (k, s.current)).collect()
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }
}

// ---------------------------------------------------------------------------
// Feedback tables
// ---------------------------------------------------------------------------

/// Emotions affected when a need runs low, with per-unit coefficients.
#[must_use]
pub fn deficit_effects(need: NeedKind) -> &'static [(EmotionKind, f32)] {
    match need {
        NeedKind::Energy => &[(EmotionKind::Tired, 1.0)],
        NeedKind::Hunger => &[(EmotionKind::Sad, 0.5), (EmotionKind::Tired, 0.3)],
        NeedKind::Social => &[(EmotionKind::Sad, 1.0)],
        NeedKind::Fun => &[(EmotionKind::Sad, 0.4), (EmotionKind::Curious, -0.3)],
        NeedKind::Hygiene => &[(EmotionKind::Sad, 0.2)],
    }
}

/// Emotions affected when a need is satisfied, with per-unit coefficients.
#[must_use]
pub fn fill_effects(need: NeedKind) -> &'static [(EmotionKind, f32)] {
    match need {
        NeedKind::Energy => &[(EmotionKind::Tired, -1.0), (EmotionKind::Happy, 0.5)],
        NeedKind::Hunger => &[(EmotionKind::Happy, 1.0)],
        NeedKind::Social => &[(EmotionKind::Happy, 1.0), (EmotionKind::Curious, 0.3)],
        NeedKind::Fun => &[(EmotionKind::Happy, 1.2), (EmotionKind::Curious, 0.5)],
        NeedKind::Hygiene => &[(EmotionKind::Happy, 0.5)],
    }
}

fn apply(emotions: Option<&mut EmotionModel>, table: &[(EmotionKind, f32)], intensity: f32) {
    let Some(emotions) = emotions else {
        return;
    };
    for &(kind, coefficient) in table {
        emotions.modify(kind, coefficient * intensity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmotionConfig;

    fn needs() -> NeedsModel {
        NeedsModel::new(&NeedsConfig::default())
    }

    fn critical_count(model: &mut NeedsModel) -> usize {
        model
            .drain_events()
            .filter(|e| matches!(e, EngineEvent::NeedCritical { .. }))
            .count()
    }

    #[test]
    fn defaults_track_three_needs() {
        let m = needs();
        assert!(m.state(NeedKind::Energy).is_some());
        assert!(m.state(NeedKind::Hunger).is_some());
        assert!(m.state(NeedKind::Social).is_some());
        assert!(m.state(NeedKind::Fun).is_none());
        assert!((m.value(NeedKind::Fun) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_is_linear_and_floored() {
        let mut m = needs();
        m.decay(10.0, None);
        assert!((m.value(NeedKind::Energy) - 0.9).abs() < 1e-6);
        assert!((m.value(NeedKind::Hunger) - 0.95).abs() < 1e-6);
        m.decay(1_000.0, None);
        assert!(m.value(NeedKind::Energy).abs() < f32::EPSILON);
    }

    #[test]
    fn critical_fires_once_on_crossing() {
        let mut m = needs();
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        m.set_value(NeedKind::Energy, 0.15);
        m.decay(6.0, Some(&mut emotions));
        assert!((m.value(NeedKind::Energy) - 0.09).abs() < 1e-6);
        assert_eq!(critical_count(&mut m), 1);
        assert!((emotions.intensity(EmotionKind::Tired) - 0.4).abs() < 1e-6);

        m.decay(2.0, Some(&mut emotions));
        assert_eq!(critical_count(&mut m), 0);
    }

    #[test]
    fn low_crossing_applies_small_penalty_without_event() {
        let mut m = needs();
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        m.set_value(NeedKind::Social, 0.31);
        m.decay(10.0, Some(&mut emotions));
        assert!(m.is_low(NeedKind::Social));
        assert_eq!(critical_count(&mut m), 0);
        assert!((emotions.intensity(EmotionKind::Sad) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn fill_saturates_and_fires_satisfied_on_crossing() {
        let mut m = needs();
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        m.set_value(NeedKind::Hunger, 0.5);
        m.fill(NeedKind::Hunger, 2.0, Some(&mut emotions));
        assert!((m.value(NeedKind::Hunger) - 1.0).abs() < f32::EPSILON);
        let satisfied = m
            .drain_events()
            .filter(|e| matches!(e, EngineEvent::NeedSatisfied { need: NeedKind::Hunger, .. }))
            .count();
        assert_eq!(satisfied, 1);
        assert!((emotions.intensity(EmotionKind::Happy) - 0.3).abs() < 1e-6);

        m.fill(NeedKind::Hunger, 0.1, Some(&mut emotions));
        assert_eq!(m.drain_events().count(), 0);
    }

    #[test]
    fn fill_untracked_need_starts_from_zero() {
        let mut m = needs();
        m.fill(NeedKind::Fun, 0.25, None);
        assert!((m.value(NeedKind::Fun) - 0.25).abs() < f32::EPSILON);
        let state = m.state(NeedKind::Fun).expect("now tracked");
        assert!((state.decay_rate - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn lowest_need_defaults_to_energy() {
        let mut m = needs();
        assert_eq!(m.lowest_need(), NeedKind::Energy);
        m.set_value(NeedKind::Social, 0.4);
        assert_eq!(m.lowest_need(), NeedKind::Social);
    }

    #[test]
    fn night_scaling_is_restorable() {
        let mut m = needs();
        m.apply_time_of_day(DayPhase::Night, false, None);
        let energy = m.state(NeedKind::Energy).expect("tracked");
        assert!((energy.decay_rate - 0.02).abs() < 1e-6);
        let hunger = m.state(NeedKind::Hunger).expect("tracked");
        assert!((hunger.decay_rate - 0.006).abs() < 1e-6);

        m.apply_time_of_day(DayPhase::Morning, false, None);
        let energy = m.state(NeedKind::Energy).expect("tracked");
        assert!((energy.decay_rate - energy.base_rate).abs() < f32::EPSILON);
    }

    #[test]
    fn dawn_refills_energy_only_for_sleepers() {
        let mut m = needs();
        m.set_value(NeedKind::Energy, 0.2);
        m.apply_time_of_day(DayPhase::Dawn, false, None);
        assert!((m.value(NeedKind::Energy) - 0.2).abs() < f32::EPSILON);
        m.apply_time_of_day(DayPhase::Dawn, true, None);
        assert!((m.value(NeedKind::Energy) - 0.6).abs() < 1e-6);
    }
}
