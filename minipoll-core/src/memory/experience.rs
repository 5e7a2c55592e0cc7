//! A single learned experience and its significance score.

use serde::{Deserialize, Serialize};

use crate::types::GameSeconds;

/// Weight of the net-outcome term in significance.
const NET_WEIGHT: f32 = 0.6;
/// Weight of the repetition term in significance.
const REPETITION_WEIGHT: f32 = 0.3;
/// Weight of the recency term in significance.
const RECENCY_WEIGHT: f32 = 0.1;

/// What an agent has learned about one experience id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    /// Accumulated positive learning, never negative.
    pub positive_weight: f32,
    /// Accumulated negative learning, never negative.
    pub negative_weight: f32,
    /// How many times the experience was recorded.
    pub encounter_count: u32,
    /// Game time of the last recording.
    pub last_encounter: GameSeconds,
    /// Game time of the last evaluation.
    pub last_recall: GameSeconds,
    /// Memorability in `[0, 1]`.
    pub significance: f32,
}

impl ExperienceRecord {
    /// An empty record first seen at `now`.
    #[must_use]
    pub fn new(now: GameSeconds) -> Self {
        Self {
            positive_weight: 0.0,
            negative_weight: 0.0,
            encounter_count: 0,
            last_encounter: now,
            last_recall: now,
            significance: 0.0,
        }
    }

    /// Positive minus negative weight.
    #[must_use]
    pub fn net(&self) -> f32 {
        self.positive_weight - self.negative_weight
    }

    /// Whether positive learning dominates.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.positive_weight > self.negative_weight
    }

    /// Whether negative learning dominates.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative_weight > self.positive_weight
    }

    /// Compute significance at `now`.
    ///
    /// ```text
    /// 0.6·|positive − negative| + 0.3·log10(max(1, encounters)) + 0.1·exp(−Δt / τ)
    /// ```
    ///
    /// clamped to `[0, 1]`, where Δt is the time since the last encounter.
    #[must_use]
    pub fn compute_significance(&self, now: GameSeconds, time_constant: GameSeconds) -> f32 {
        let elapsed = (now - self.last_encounter).max(0.0);
        #[allow(clippy::cast_possible_truncation)]
        let recency = if time_constant > 0.0 {
            (-elapsed / time_constant).exp() as f32
        } else {
            0.0
        };
        #[allow(clippy::cast_precision_loss)]
        let repetition = (self.encounter_count.max(1) as f32).log10();

        (NET_WEIGHT * self.net().abs() + REPETITION_WEIGHT * repetition + RECENCY_WEIGHT * recency)
            .clamp(0.0, 1.0)
    }

    /// Recompute and store significance at `now`.
    pub fn refresh_significance(&mut self, now: GameSeconds, time_constant: GameSeconds) {
        self.significance = self.compute_significance(now, time_constant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_single_encounter_scores_recency_only() {
        let mut record = ExperienceRecord::new(10.0);
        record.encounter_count = 1;
        let s = record.compute_significance(10.0, 300.0);
        assert!((s - 0.1).abs() < 1e-6);
    }

    #[test]
    fn significance_combines_terms() {
        let record = ExperienceRecord {
            positive_weight: 0.5,
            negative_weight: 0.1,
            encounter_count: 10,
            last_encounter: 0.0,
            last_recall: 0.0,
            significance: 0.0,
        };
        let s = record.compute_significance(300.0, 300.0);
        let expected = 0.6 * 0.4 + 0.3 * 1.0 + 0.1 * (-1.0_f32).exp();
        assert!((s - expected).abs() < 1e-5);
    }

    #[test]
    fn significance_is_clamped() {
        let record = ExperienceRecord {
            positive_weight: 5.0,
            negative_weight: 0.0,
            encounter_count: 1_000,
            last_encounter: 0.0,
            last_recall: 0.0,
            significance: 0.0,
        };
        assert!((record.compute_significance(0.0, 300.0) - 1.0).abs() < f32::EPSILON);
    }
}
