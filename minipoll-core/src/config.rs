//! Tuning for every Minipoll subsystem.
//!
//! Maps directly to the `[minipoll]` tables of a simulation TOML file. Every
//! field has a default, so an empty document yields the stock creature.

use serde::{Deserialize, Serialize};

use crate::error::{MinipollError, Result};
use crate::memory::curve::LearningCurve;
use crate::types::{EmotionKind, NeedKind};

/// Top-level per-agent configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinipollConfig {
    /// Emotion decay and dominance settings.
    #[serde(default)]
    pub emotion: EmotionConfig,
    /// Needs thresholds and decay rates.
    #[serde(default)]
    pub needs: NeedsConfig,
    /// Experience learning and forgetting.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Relationship maintenance and social interaction.
    #[serde(default)]
    pub social: SocialConfig,
    /// Decision policy weights.
    #[serde(default)]
    pub decision: DecisionConfig,
    /// World-object interaction settings.
    #[serde(default)]
    pub interaction: InteractionConfig,
    /// Innate personality.
    #[serde(default)]
    pub personality: PersonalityConfig,
}

impl MinipollConfig {
    /// Load configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns `MinipollError::Config` if the TOML is invalid, or
    /// `MinipollError::InvalidTuning` if a value is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| MinipollError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Render as TOML, e.g. to seed a tuning file.
    ///
    /// # Errors
    /// Returns `MinipollError::Serialization` if a value has no TOML form.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MinipollError::Serialization(e.to_string()))
    }

    /// Check every value against its legal range.
    ///
    /// # Errors
    /// Returns the first `MinipollError::InvalidTuning` found.
    pub fn validate(&self) -> Result<()> {
        let e = &self.emotion;
        positive("emotion.decay_interval_secs", e.decay_interval_secs)?;
        non_negative("emotion.default_decay_rate", e.default_decay_rate)?;
        non_negative("emotion.global_decay_multiplier", e.global_decay_multiplier)?;
        unit("emotion.dominant_threshold", e.dominant_threshold)?;
        unit("emotion.blend_threshold", e.blend_threshold)?;

        let n = &self.needs;
        positive("needs.update_interval_secs", n.update_interval_secs)?;
        unit("needs.critical_threshold", n.critical_threshold)?;
        unit("needs.low_threshold", n.low_threshold)?;
        unit("needs.high_threshold", n.high_threshold)?;
        if n.critical_threshold > n.low_threshold || n.low_threshold > n.high_threshold {
            return Err(MinipollError::InvalidTuning {
                field: "needs.low_threshold",
                value: f64::from(n.low_threshold),
                reason: "thresholds must satisfy critical <= low <= high",
            });
        }
        non_negative("needs.effect_strength", n.effect_strength)?;
        for need in NeedKind::ALL {
            non_negative("needs.rates", n.rates.base_rate(need))?;
        }

        let m = &self.memory;
        unit("memory.learning_rate", m.learning_rate)?;
        unit("memory.forgetting_rate", m.forgetting_rate)?;
        positive("memory.update_interval_secs", m.update_interval_secs)?;
        unit("memory.significance_floor", m.significance_floor)?;
        if m.recent_capacity == 0 {
            return Err(MinipollError::InvalidTuning {
                field: "memory.recent_capacity",
                value: 0.0,
                reason: "must be at least 1",
            });
        }

        let s = &self.social;
        positive("social.update_interval_secs", s.update_interval_secs)?;
        unit("social.interaction_probability", s.interaction_probability)?;
        non_negative("social.social_radius", s.social_radius)?;
        if s.max_relationships == 0 {
            return Err(MinipollError::InvalidTuning {
                field: "social.max_relationships",
                value: 0.0,
                reason: "must be at least 1",
            });
        }

        let d = &self.decision;
        positive("decision.decision_interval_secs", d.decision_interval_secs)?;
        unit("decision.autonomy", d.autonomy)?;

        let i = &self.interaction;
        non_negative("interaction.interaction_range", i.interaction_range)?;
        non_negative("interaction.cooldown_secs", i.cooldown_secs)?;

        for tendency in &self.personality.tendencies {
            unit("personality.tendencies.baseline", tendency.baseline)?;
            non_negative(
                "personality.tendencies.response_multiplier",
                tendency.response_multiplier,
            )?;
            non_negative("personality.tendencies.decay_rate", tendency.decay_rate)?;
        }
        Ok(())
    }
}

fn unit(field: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(MinipollError::InvalidTuning {
            field,
            value: f64::from(value),
            reason: "must be within [0, 1]",
        })
    }
}

fn non_negative(field: &'static str, value: impl Into<f64>) -> Result<()> {
    let value: f64 = value.into();
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MinipollError::InvalidTuning {
            field,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MinipollError::InvalidTuning {
            field,
            value,
            reason: "must be finite and greater than zero",
        })
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Emotion model tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Seconds between decay passes.
    #[serde(default = "default_emotion_interval")]
    pub decay_interval_secs: f64,
    /// Decay rate (intensity per second) for kinds without a tendency.
    #[serde(default = "default_emotion_decay_rate")]
    pub default_decay_rate: f32,
    /// Response multiplier for kinds without a tendency.
    #[serde(default = "default_one")]
    pub default_response_multiplier: f32,
    /// Global scale applied to every decay step.
    #[serde(default = "default_one")]
    pub global_decay_multiplier: f32,
    /// A kind must exceed this intensity to be dominant.
    #[serde(default = "default_dominant_threshold")]
    pub dominant_threshold: f32,
    /// Smallest change that counts as an emotion change.
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f32,
    /// Both sources of a blend must exceed this intensity.
    #[serde(default = "default_blend_threshold")]
    pub blend_threshold: f32,
    /// How much each blend source is reduced after blending.
    #[serde(default = "default_blend_reduction")]
    pub blend_reduction: f32,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            decay_interval_secs: 0.5,
            default_decay_rate: 0.01,
            default_response_multiplier: 1.0,
            global_decay_multiplier: 1.0,
            dominant_threshold: 0.2,
            change_threshold: 0.01,
            blend_threshold: 0.3,
            blend_reduction: 0.1,
        }
    }
}

/// Base decay rate per need, in value per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedRates {
    /// Energy decay rate.
    #[serde(default = "default_energy_rate")]
    pub energy: f32,
    /// Hunger decay rate.
    #[serde(default = "default_hunger_rate")]
    pub hunger: f32,
    /// Social decay rate.
    #[serde(default = "default_social_rate")]
    pub social: f32,
    /// Fun decay rate.
    #[serde(default = "default_fun_rate")]
    pub fun: f32,
    /// Hygiene decay rate.
    #[serde(default = "default_hygiene_rate")]
    pub hygiene: f32,
}

impl NeedRates {
    /// Base rate for one need.
    #[must_use]
    pub fn base_rate(&self, need: NeedKind) -> f32 {
        match need {
            NeedKind::Energy => self.energy,
            NeedKind::Hunger => self.hunger,
            NeedKind::Social => self.social,
            NeedKind::Fun => self.fun,
            NeedKind::Hygiene => self.hygiene,
        }
    }
}

impl Default for NeedRates {
    fn default() -> Self {
        Self {
            energy: 0.01,
            hunger: 0.005,
            social: 0.003,
            fun: 0.002,
            hygiene: 0.001,
        }
    }
}

/// Needs model tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedsConfig {
    /// Seconds between decay passes.
    #[serde(default = "default_needs_interval")]
    pub update_interval_secs: f64,
    /// At or below this a need is low.
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f32,
    /// At or below this a need is critical.
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f32,
    /// Filling past this counts as satisfied.
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f32,
    /// Scales every emotional side-effect of needs.
    #[serde(default = "default_one")]
    pub effect_strength: f32,
    /// Needs tracked from spawn.
    #[serde(default = "default_tracked_needs")]
    pub tracked: Vec<NeedKind>,
    /// Base decay rates.
    #[serde(default)]
    pub rates: NeedRates,
    /// Decay rate given to a need first seen through `fill`.
    #[serde(default = "default_untracked_rate")]
    pub untracked_decay_rate: f32,
    /// Keep decaying needs while asleep or hibernating.
    #[serde(default)]
    pub decay_while_asleep: bool,
    /// Energy decay multiplier during the evening.
    #[serde(default = "default_evening_energy")]
    pub evening_energy_multiplier: f32,
    /// Energy decay multiplier at night.
    #[serde(default = "default_night_energy")]
    pub night_energy_multiplier: f32,
    /// Hunger decay multiplier at night.
    #[serde(default = "default_night_hunger")]
    pub night_hunger_multiplier: f32,
    /// Energy restored at dawn when the agent slept through it.
    #[serde(default = "default_dawn_fill")]
    pub dawn_energy_fill: f32,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 2.0,
            low_threshold: 0.3,
            critical_threshold: 0.1,
            high_threshold: 0.8,
            effect_strength: 1.0,
            tracked: default_tracked_needs(),
            rates: NeedRates::default(),
            untracked_decay_rate: 0.01,
            decay_while_asleep: false,
            evening_energy_multiplier: 1.5,
            night_energy_multiplier: 2.0,
            night_hunger_multiplier: 1.2,
            dawn_energy_fill: 0.4,
        }
    }
}

/// Memory (learning) tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Weight gained per unit of adjusted intensity. Clamped to `[0.01, 1]`.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// Weight lost per second of disuse. Clamped to `[0.001, 0.1]`.
    #[serde(default = "default_forgetting_rate")]
    pub forgetting_rate: f32,
    /// Store capacity. Never below 10.
    #[serde(default = "default_max_memories")]
    pub max_memories: usize,
    /// Mapping from raw intensity to learned intensity.
    #[serde(default)]
    pub learning_curve: LearningCurve,
    /// Keep records whose significance falls below the floor.
    #[serde(default = "default_true")]
    pub memorize_important_events: bool,
    /// Records below this significance are forgotten during decay.
    #[serde(default = "default_significance_floor")]
    pub significance_floor: f32,
    /// How many recently touched ids are spared from the next decay.
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
    /// Seconds between maintenance passes.
    #[serde(default = "default_memory_interval")]
    pub update_interval_secs: f64,
    /// Encounters needed before an evaluation reaches full confidence.
    #[serde(default = "default_confidence_encounters")]
    pub confidence_encounters: f32,
    /// Time constant of the recency term in seconds.
    #[serde(default = "default_recency_secs")]
    pub recency_time_constant_secs: f64,
    /// Damping applied to experiences received from peers.
    #[serde(default = "default_share_damping")]
    pub share_damping: f32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            forgetting_rate: 0.01,
            max_memories: 50,
            learning_curve: LearningCurve::default(),
            memorize_important_events: true,
            significance_floor: 0.05,
            recent_capacity: 10,
            update_interval_secs: 5.0,
            confidence_encounters: 5.0,
            recency_time_constant_secs: 300.0,
            share_damping: 0.7,
        }
    }
}

/// Relationship and social interaction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Peers within this distance count as nearby.
    #[serde(default = "default_social_radius")]
    pub social_radius: f32,
    /// Scales the chance of starting an interaction with the best peer.
    #[serde(default = "default_interaction_probability")]
    pub interaction_probability: f32,
    /// Seconds between maintenance passes.
    #[serde(default = "default_social_interval")]
    pub update_interval_secs: f64,
    /// Ledger capacity.
    #[serde(default = "default_max_relationships")]
    pub max_relationships: usize,
    /// Decay rate for stale relationships, per second.
    #[serde(default = "default_base_change_rate")]
    pub base_change_rate: f32,
    /// Scales trust/friendship changes after an interaction.
    #[serde(default = "default_impact_multiplier")]
    pub interaction_impact_multiplier: f32,
    /// Trust and friendship gained the first time an experience is shared.
    #[serde(default = "default_shared_bonus")]
    pub shared_experience_bonus: f32,
    /// Seconds without interaction before a relationship starts to fade.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: f64,
    /// Chance that a successful interaction also shares an experience.
    #[serde(default = "default_share_chance")]
    pub share_on_success_chance: f32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            social_radius: 5.0,
            interaction_probability: 0.3,
            update_interval_secs: 2.0,
            max_relationships: 20,
            base_change_rate: 0.05,
            interaction_impact_multiplier: 1.5,
            shared_experience_bonus: 0.1,
            stale_after_secs: 60.0,
            share_on_success_chance: 0.3,
        }
    }
}

/// Decision policy tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Seconds between decision ticks.
    #[serde(default = "default_decision_interval")]
    pub decision_interval_secs: f64,
    /// Probability of deciding at all on a tick.
    #[serde(default = "default_one")]
    pub autonomy: f32,
    /// Tiredness above which resting is strongly preferred.
    #[serde(default = "default_tired_threshold")]
    pub tired_threshold: f32,
    /// Rest weight when tired.
    #[serde(default = "default_rest_tired")]
    pub rest_weight_tired: f32,
    /// Rest weight otherwise.
    #[serde(default = "default_rest_weight")]
    pub rest_weight: f32,
    /// Explore weight before curiosity is added.
    #[serde(default = "default_explore_base")]
    pub explore_base_weight: f32,
    /// Interaction weight when objects are nearby.
    #[serde(default = "default_one")]
    pub interaction_weight: f32,
    /// Interaction weight factor when the dominant emotion is Scared.
    #[serde(default = "default_scared_factor")]
    pub scared_interaction_factor: f32,
    /// Social weight factor when the dominant emotion is Happy.
    #[serde(default = "default_happy_factor")]
    pub happy_social_factor: f32,
    /// Weight of the always-available wander candidate.
    #[serde(default = "default_one")]
    pub movement_weight: f32,
    /// Tiredness removed by one rest.
    #[serde(default = "default_rest_recovery")]
    pub rest_recovery: f32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            decision_interval_secs: 2.0,
            autonomy: 1.0,
            tired_threshold: 0.7,
            rest_weight_tired: 3.0,
            rest_weight: 0.5,
            explore_base_weight: 0.5,
            interaction_weight: 1.0,
            scared_interaction_factor: 0.3,
            happy_social_factor: 1.5,
            movement_weight: 1.0,
            rest_recovery: 0.3,
        }
    }
}

/// World-object interaction tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Objects within this distance can be used without walking.
    #[serde(default = "default_interaction_range")]
    pub interaction_range: f32,
    /// Seconds between two object interactions.
    #[serde(default = "default_interaction_cooldown")]
    pub cooldown_secs: f64,
    /// Consecutive failures before interest points stop being chased.
    #[serde(default = "default_max_attempts")]
    pub max_interaction_attempts: u32,
    /// Weight of positive experience in interest.
    #[serde(default = "default_interest_multiplier")]
    pub interest_multiplier: f32,
    /// Interest points further than this are dropped.
    #[serde(default = "default_max_interest_distance")]
    pub max_interest_distance: f32,
    /// Interest points older than this are dropped.
    #[serde(default = "default_interest_expiry")]
    pub interest_expiry_secs: f64,
    /// Interest map capacity.
    #[serde(default = "default_max_interest_points")]
    pub max_interest_points: usize,
    /// New points closer than this to an existing one are ignored.
    #[serde(default = "default_one")]
    pub interest_merge_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            interaction_range: 2.0,
            cooldown_secs: 1.5,
            max_interaction_attempts: 3,
            interest_multiplier: 1.2,
            max_interest_distance: 8.0,
            interest_expiry_secs: 30.0,
            max_interest_points: 10,
            interest_merge_radius: 1.0,
        }
    }
}

/// One innate emotional tendency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionTendency {
    /// Which emotion.
    pub kind: EmotionKind,
    /// Resting intensity the emotion decays toward.
    pub baseline: f32,
    /// Scale applied to every stimulus.
    pub response_multiplier: f32,
    /// Decay speed toward the baseline, per second.
    pub decay_rate: f32,
}

/// Innate personality of a Minipoll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityConfig {
    /// Base weight of the Social decision candidate.
    #[serde(default = "default_half")]
    pub socializing_tendency: f32,
    /// Emotional tendencies applied at spawn.
    #[serde(default = "default_tendencies")]
    pub tendencies: Vec<EmotionTendency>,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            socializing_tendency: 0.5,
            tendencies: default_tendencies(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_one() -> f32 { 1.0 }
fn default_half() -> f32 { 0.5 }
fn default_emotion_interval() -> f64 { 0.5 }
fn default_emotion_decay_rate() -> f32 { 0.01 }
fn default_dominant_threshold() -> f32 { 0.2 }
fn default_change_threshold() -> f32 { 0.01 }
fn default_blend_threshold() -> f32 { 0.3 }
fn default_blend_reduction() -> f32 { 0.1 }
fn default_energy_rate() -> f32 { 0.01 }
fn default_hunger_rate() -> f32 { 0.005 }
fn default_social_rate() -> f32 { 0.003 }
fn default_fun_rate() -> f32 { 0.002 }
fn default_hygiene_rate() -> f32 { 0.001 }
fn default_needs_interval() -> f64 { 2.0 }
fn default_low_threshold() -> f32 { 0.3 }
fn default_critical_threshold() -> f32 { 0.1 }
fn default_high_threshold() -> f32 { 0.8 }
fn default_tracked_needs() -> Vec<NeedKind> {
    vec![NeedKind::Energy, NeedKind::Hunger, NeedKind::Social]
}
fn default_untracked_rate() -> f32 { 0.01 }
fn default_evening_energy() -> f32 { 1.5 }
fn default_night_energy() -> f32 { 2.0 }
fn default_night_hunger() -> f32 { 1.2 }
fn default_dawn_fill() -> f32 { 0.4 }
fn default_learning_rate() -> f32 { 0.1 }
fn default_forgetting_rate() -> f32 { 0.01 }
fn default_max_memories() -> usize { 50 }
fn default_significance_floor() -> f32 { 0.05 }
fn default_recent_capacity() -> usize { 10 }
fn default_memory_interval() -> f64 { 5.0 }
fn default_confidence_encounters() -> f32 { 5.0 }
fn default_recency_secs() -> f64 { 300.0 }
fn default_share_damping() -> f32 { 0.7 }
fn default_social_radius() -> f32 { 5.0 }
fn default_interaction_probability() -> f32 { 0.3 }
fn default_social_interval() -> f64 { 2.0 }
fn default_max_relationships() -> usize { 20 }
fn default_base_change_rate() -> f32 { 0.05 }
fn default_impact_multiplier() -> f32 { 1.5 }
fn default_shared_bonus() -> f32 { 0.1 }
fn default_stale_after() -> f64 { 60.0 }
fn default_share_chance() -> f32 { 0.3 }
fn default_decision_interval() -> f64 { 2.0 }
fn default_tired_threshold() -> f32 { 0.7 }
fn default_rest_tired() -> f32 { 3.0 }
fn default_rest_weight() -> f32 { 0.5 }
fn default_explore_base() -> f32 { 0.5 }
fn default_scared_factor() -> f32 { 0.3 }
fn default_happy_factor() -> f32 { 1.5 }
fn default_rest_recovery() -> f32 { 0.3 }
fn default_interaction_range() -> f32 { 2.0 }
fn default_interaction_cooldown() -> f64 { 1.5 }
fn default_max_attempts() -> u32 { 3 }
fn default_interest_multiplier() -> f32 { 1.2 }
fn default_max_interest_distance() -> f32 { 8.0 }
fn default_interest_expiry() -> f64 { 30.0 }
fn default_max_interest_points() -> usize { 10 }

fn default_tendencies() -> Vec<EmotionTendency> {
    let t = |kind, baseline, response_multiplier, decay_rate| EmotionTendency {
        kind,
        baseline,
        response_multiplier,
        decay_rate,
    };
    vec![
        t(EmotionKind::Happy, 0.3, 1.0, 0.02),
        t(EmotionKind::Sad, 0.1, 1.0, 0.01),
        t(EmotionKind::Curious, 0.4, 1.2, 0.03),
        t(EmotionKind::Tired, 0.1, 0.8, 0.005),
        t(EmotionKind::Scared, 0.1, 1.5, 0.04),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = MinipollConfig::from_toml("").expect("empty config parses");
        assert!((config.needs.critical_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.memory.max_memories, 50);
        assert_eq!(config.social.max_relationships, 20);
        assert_eq!(config.personality.tendencies.len(), 5);
    }

    #[test]
    fn partial_override() {
        let config = MinipollConfig::from_toml(
            r#"
            [decision]
            autonomy = 0.5

            [needs]
            tracked = ["Energy", "Fun"]
            "#,
        )
        .expect("valid config");
        assert!((config.decision.autonomy - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.needs.tracked, vec![NeedKind::Energy, NeedKind::Fun]);
        assert!((config.decision.rest_weight_tired - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_autonomy() {
        let err = MinipollConfig::from_toml("[decision]\nautonomy = 1.5\n")
            .expect_err("autonomy above one is invalid");
        assert!(matches!(
            err,
            MinipollError::InvalidTuning { field: "decision.autonomy", .. }
        ));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = MinipollConfig::from_toml("[needs]\ncritical_threshold = 0.5\n")
            .expect_err("critical above low is invalid");
        assert!(matches!(err, MinipollError::InvalidTuning { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = MinipollConfig::from_toml("[needs\n").expect_err("malformed");
        assert!(matches!(err, MinipollError::Config(_)));
    }

    #[test]
    fn tendencies_parse_from_toml() {
        let config = MinipollConfig::from_toml(
            r#"
            [personality]
            socializing_tendency = 0.8

            [[personality.tendencies]]
            kind = "Curious"
            baseline = 0.6
            response_multiplier = 1.5
            decay_rate = 0.02
            "#,
        )
        .expect("valid config");
        assert_eq!(config.personality.tendencies.len(), 1);
        assert_eq!(config.personality.tendencies[0].kind, EmotionKind::Curious);
    }

    #[test]
    fn exported_toml_loads_back() {
        let mut config = MinipollConfig::default();
        config.social.interaction_probability = 0.6;
        let text = config.to_toml().expect("serializes");
        let back = MinipollConfig::from_toml(&text).expect("reloads");
        assert!((back.social.interaction_probability - 0.6).abs() < 1e-6);
        assert_eq!(back.personality.tendencies.len(), config.personality.tendencies.len());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("minipoll.toml");
        std::fs::write(&path, "[memory]\nmax_memories = 25\n").expect("write config");
        let config = MinipollConfig::from_file(&path).expect("file loads");
        assert_eq!(config.memory.max_memories, 25);
    }
}
