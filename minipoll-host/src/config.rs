//! Simulation run configuration.
//!
//! A TOML document with three parts:
//!
//! ```toml
//! [run]
//! agents = 4
//! seed = 42
//!
//! [minipoll.decision]      # any MinipollConfig table
//! autonomy = 0.9
//!
//! [[objects]]
//! id = "berry_bush"
//! position = { x = 3.0, y = 0.0, z = -2.0 }
//! ```
//!
//! Every field has a default. When no `[[objects]]` are listed the runner
//! scatters [`RunConfig::objects`] stock objects instead.

use rand::Rng;
use serde::{Deserialize, Serialize};

use minipoll_core::config::MinipollConfig;
use minipoll_core::error::{MinipollError, Result};
use minipoll_core::interaction::InteractionProfile;
use minipoll_core::{DayPhase, EmotionKind, Position};

use crate::interactable::ProfiledInteractable;

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Population size, timing and world extent.
    #[serde(default)]
    pub run: RunConfig,
    /// Tuning shared by every agent.
    #[serde(default)]
    pub minipoll: MinipollConfig,
    /// Hand-placed world objects.
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

impl SimulationConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// `MinipollError::Config` for malformed TOML, `InvalidTuning` for
    /// out-of-range values.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| MinipollError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Render as TOML.
    ///
    /// # Errors
    /// `MinipollError::Serialization` if a value has no TOML form.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| MinipollError::Serialization(e.to_string()))
    }

    /// Check run values and the embedded agent tuning.
    ///
    /// # Errors
    /// The first `MinipollError::InvalidTuning` found.
    pub fn validate(&self) -> Result<()> {
        let r = &self.run;
        positive("run.tick_secs", r.tick_secs)?;
        positive("run.duration_secs", r.duration_secs)?;
        positive("run.day_length_secs", r.day_length_secs)?;
        positive("run.world_extent", f64::from(r.world_extent))?;
        if !(0.0..1.0).contains(&r.start_time) {
            return Err(MinipollError::InvalidTuning {
                field: "run.start_time",
                value: f64::from(r.start_time),
                reason: "must be within [0, 1)",
            });
        }
        for object in &self.objects {
            if object.id.is_empty() {
                return Err(MinipollError::Config("object with an empty id".into()));
            }
        }
        self.minipoll.validate()
    }

    /// Build the world objects: the configured ones, or `run.objects` stock
    /// objects scattered at random when none are configured.
    pub fn build_objects<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ProfiledInteractable> {
        let extent = self.run.world_extent;
        if self.objects.is_empty() {
            return (0..self.run.objects)
                .map(|i| {
                    let position = random_position(extent, rng);
                    stock_object(i, position)
                })
                .collect();
        }
        self.objects
            .iter()
            .map(|object| {
                let position = object.position.unwrap_or_else(|| random_position(extent, rng));
                object.build(position)
            })
            .collect()
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

fn random_position<R: Rng + ?Sized>(extent: f32, rng: &mut R) -> Position {
    Position::new(rng.gen_range(-extent..=extent), 0.0, rng.gen_range(-extent..=extent))
}

/// Population size, timing and world shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of agents.
    #[serde(default = "default_agents")]
    pub agents: usize,
    /// Stock objects scattered when none are configured.
    #[serde(default = "default_objects")]
    pub objects: usize,
    /// Simulated seconds to run.
    #[serde(default = "default_duration")]
    pub duration_secs: f64,
    /// Fixed tick length.
    #[serde(default = "default_tick")]
    pub tick_secs: f64,
    /// Master seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Half-size of the square world.
    #[serde(default = "default_extent")]
    pub world_extent: f32,
    /// Put everyone to sleep at night and wake them in the morning.
    #[serde(default = "default_true")]
    pub sleep_at_night: bool,
    /// Seconds per day/night cycle.
    #[serde(default = "default_day_length")]
    pub day_length_secs: f64,
    /// Normalized time of day at start.
    #[serde(default = "default_start_time")]
    pub start_time: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            agents: 4,
            objects: 6,
            duration_secs: 600.0,
            tick_secs: 0.1,
            seed: 42,
            world_extent: 20.0,
            sleep_at_night: true,
            day_length_secs: 300.0,
            start_time: 0.3,
        }
    }
}

/// One hand-placed world object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Interaction id, also the memory key.
    pub id: String,
    /// Where it stands. Random when omitted.
    #[serde(default)]
    pub position: Option<Position>,
    /// Success chance before adjustments. No profile when omitted.
    #[serde(default)]
    pub base_success_chance: Option<f32>,
    /// Emotional reactions.
    #[serde(default)]
    pub impacts: Vec<ImpactConfig>,
    /// Seconds between uses.
    #[serde(default = "default_object_cooldown")]
    pub cooldown_secs: f64,
    /// Total uses allowed.
    #[serde(default)]
    pub max_interactions: Option<u32>,
    /// Dominant emotion required to use it.
    #[serde(default)]
    pub required_emotion: Option<EmotionKind>,
    /// Phases of the day it can be used in.
    #[serde(default)]
    pub available_phases: Option<Vec<DayPhase>>,
    /// Animation on success.
    #[serde(default)]
    pub success_animation: Option<String>,
    /// Animation on failure.
    #[serde(default)]
    pub failure_animation: Option<String>,
}

/// One emotional reaction of a configured object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// Emotion affected.
    pub emotion: EmotionKind,
    /// Delta on success.
    pub on_success: f32,
    /// Delta on failure.
    pub on_failure: f32,
}

impl ObjectConfig {
    /// Whether this object carries a profile.
    #[must_use]
    pub fn is_profiled(&self) -> bool {
        self.base_success_chance.is_some() || !self.impacts.is_empty()
    }

    /// The runtime object at `position`.
    #[must_use]
    pub fn build(&self, position: Position) -> ProfiledInteractable {
        let mut object =
            ProfiledInteractable::new(self.id.clone(), position).with_cooldown(self.cooldown_secs);
        if self.is_profiled() {
            let mut profile = InteractionProfile::new(self.id.clone());
            if let Some(chance) = self.base_success_chance {
                profile.base_success_chance = chance.clamp(0.0, 1.0);
            }
            for impact in &self.impacts {
                profile = profile.with_impact(impact.emotion, impact.on_success, impact.on_failure);
            }
            profile.success_animation.clone_from(&self.success_animation);
            profile.failure_animation.clone_from(&self.failure_animation);
            object = object.with_profile(profile);
        }
        if let Some(max) = self.max_interactions {
            object = object.with_max_interactions(max);
        }
        if let Some(emotion) = self.required_emotion {
            object = object.requiring_emotion(emotion);
        }
        if let Some(phases) = &self.available_phases {
            object = object.available_during(phases.clone());
        }
        object
    }
}

/// The `index`-th object of the stock set.
#[must_use]
pub fn stock_object(index: usize, position: Position) -> ProfiledInteractable {
    let kind = index % 6;
    let id = format!("{}_{index}", STOCK_NAMES[kind]);
    let object = ProfiledInteractable::new(id.clone(), position);
    let profile = InteractionProfile::new(id);
    match kind {
        0 => object.with_profile(
            animated(profile.with_impact(EmotionKind::Happy, 0.25, -0.1), "Eat"),
        ),
        1 => object.with_profile(
            animated(profile.with_impact(EmotionKind::Excited, 0.3, -0.15), "Splash"),
        ),
        2 => object.with_profile(profile.with_impact(EmotionKind::Curious, 0.2, -0.05)),
        3 => {
            let mut profile = profile.with_impact(EmotionKind::Scared, 0.0, -0.3);
            profile.base_success_chance = 0.4;
            object.with_profile(profile).available_during(vec![
                DayPhase::Evening,
                DayPhase::Night,
                DayPhase::Midnight,
            ])
        }
        4 => object.with_max_interactions(20),
        _ => object
            .with_profile(profile.with_impact(EmotionKind::Happy, 0.15, -0.2))
            .requiring_emotion(EmotionKind::Curious),
    }
}

const STOCK_NAMES: [&str; 6] = ["berry_bush", "pond", "flower_patch", "dark_cave", "log", "glowcap"];

fn animated(mut profile: InteractionProfile, success_animation: &str) -> InteractionProfile {
    profile.success_animation = Some(success_animation.to_string());
    profile
}

fn default_true() -> bool { true }
fn default_agents() -> usize { 4 }
fn default_objects() -> usize { 6 }
fn default_duration() -> f64 { 600.0 }
fn default_tick() -> f64 { 0.1 }
fn default_seed() -> u64 { 42 }
fn default_extent() -> f32 { 20.0 }
fn default_day_length() -> f64 { 300.0 }
fn default_start_time() -> f32 { 0.3 }
fn default_object_cooldown() -> f64 { 3.0 }
