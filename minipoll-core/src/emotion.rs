//! Emotion model — intensities, decay toward baseline, dominance, blending.
//!
//! Every configured [`EmotionKind`] is a channel with a current intensity in
//! `[0, 1]`, a personal baseline it relaxes toward, a decay rate and a
//! response multiplier that scales incoming stimuli.
//!
//! ## Dominant emotion
//!
//! The dominant emotion is the non-neutral channel with the highest
//! intensity, provided it exceeds the dominance threshold (0.2 by default);
//! otherwise it is [`EmotionKind::Neutral`]. Ties go to the kind declared
//! first in [`EmotionKind::ALL`]. The result is cached and refreshed after
//! every significant change, never on a read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EmotionConfig, EmotionTendency};
use crate::events::EngineEvent;
use crate::types::EmotionKind;

/// Intensity of the neutral channel at spawn.
const NEUTRAL_BASELINE: f32 = 0.5;

/// State of one emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionChannel {
    /// Current intensity, always in `[0, 1]`.
    pub current: f32,
    /// Intensity the channel decays toward.
    pub baseline: f32,
    /// Decay speed, intensity per second.
    pub decay_rate: f32,
    /// Scale applied to every stimulus.
    pub response_multiplier: f32,
}

/// Value copy of an emotion model, for peers and observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    /// Dominant emotion at capture time.
    pub dominant: EmotionKind,
    /// Intensity of the dominant emotion.
    pub dominant_intensity: f32,
    /// Every configured intensity.
    pub intensities: BTreeMap<EmotionKind, f32>,
}

/// Per-agent emotional state.
#[derive(Debug, Clone)]
pub struct EmotionModel {
    channels: BTreeMap<EmotionKind, EmotionChannel>,
    dominant: EmotionKind,
    config: EmotionConfig,
    events: Vec<EngineEvent>,
}

impl EmotionModel {
    /// Create a model with every kind configured at its default.
    ///
    /// Neutral starts at 0.5, everything else at 0.
    #[must_use]
    pub fn new(config: &EmotionConfig) -> Self {
        Self::with_kinds(config, &EmotionKind::ALL)
    }

    /// Create a model tracking only the given kinds.
    #[must_use]
    pub fn with_kinds(config: &EmotionConfig, kinds: &[EmotionKind]) -> Self {
        let channels = kinds
            .iter()
            .map(|&kind| {
                let start = if kind.is_neutral() { NEUTRAL_BASELINE } else { 0.0 };
                let channel = EmotionChannel {
                    current: start,
                    baseline: start,
                    decay_rate: config.default_decay_rate,
                    response_multiplier: config.default_response_multiplier,
                };
                (kind, channel)
            })
            .collect();
        Self {
            channels,
            dominant: EmotionKind::Neutral,
            config: config.clone(),
            events: Vec::new(),
        }
    }

    /// Create a fully configured model and apply personality tendencies.
    #[must_use]
    pub fn with_tendencies(config: &EmotionConfig, tendencies: &[EmotionTendency]) -> Self {
        let mut model = Self::new(config);
        for t in tendencies {
            model.set_tendency(t.kind, t.baseline, t.response_multiplier, t.decay_rate);
            if let Some(channel) = model.channels.get_mut(&t.kind) {
                channel.current = channel.baseline;
            }
        }
        model.recompute_dominant();
        // Spawn-time configuration is not an observable change.
        model.events.clear();
        model
    }

    // -----------------------------------------------------------------------
    // Stimuli
    // -----------------------------------------------------------------------

    /// Apply a stimulus. `delta` is scaled by the channel's response multiplier
    /// and the result clamped to `[0, 1]`.
    ///
    /// Changes of at least the change threshold emit
    /// [`EngineEvent::EmotionChanged`] and refresh the dominant emotion.
    /// Unconfigured kinds and non-finite deltas are ignored with a warning.
    pub fn modify(&mut self, kind: EmotionKind, delta: f32) {
        if !delta.is_finite() {
            warn!(%kind, delta, "ignoring non-finite emotion delta");
            return;
        }
        let Some(channel) = self.channels.get_mut(&kind) else {
            warn!(%kind, "modify on unconfigured emotion");
            return;
        };

        let previous = channel.current;
        channel.current = (previous + delta * channel.response_multiplier).clamp(0.0, 1.0);
        let value = channel.current;

        if (value - previous).abs() >= self.config.change_threshold {
            debug!(%kind, previous, value, "emotion changed");
            self.events.push(EngineEvent::EmotionChanged { kind, value });
            self.recompute_dominant();
        }
    }

    /// Relax every non-neutral channel toward its baseline.
    ///
    /// Each channel moves by `decay_rate · dt · global_decay_multiplier` and
    /// never overshoots. The dominant emotion is refreshed only if some
    /// channel moved by more than the change threshold.
    pub fn decay(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let dt = dt as f32;
        let multiplier = self.config.global_decay_multiplier;
        let threshold = self.config.change_threshold;

        let mut significant = false;
        for (kind, channel) in &mut self.channels {
            if kind.is_neutral() {
                continue;
            }
            let step = channel.decay_rate * dt * multiplier;
            let before = channel.current;
            channel.current = if before > channel.baseline {
                (before - step).max(channel.baseline)
            } else {
                (before + step).min(channel.baseline)
            };
            if (channel.current - before).abs() > threshold {
                significant = true;
            }
        }

        if significant {
            self.recompute_dominant();
        }
    }

    /// Configure or re-configure an emotion's personality tendency.
    ///
    /// A new kind starts at its baseline. An existing kind keeps most of its
    /// current intensity: it moves halfway toward the new baseline.
    pub fn set_tendency(
        &mut self,
        kind: EmotionKind,
        baseline: f32,
        response_multiplier: f32,
        decay_rate: f32,
    ) {
        let baseline = if baseline.is_finite() { baseline.clamp(0.0, 1.0) } else { 0.0 };
        let response_multiplier = response_multiplier.max(0.0);
        let decay_rate = decay_rate.max(0.0);

        self.channels
            .entry(kind)
            .and_modify(|c| {
                c.baseline = baseline;
                c.current = c.current + (baseline - c.current) * 0.5;
                c.response_multiplier = response_multiplier;
                c.decay_rate = decay_rate;
            })
            .or_insert(EmotionChannel {
                current: baseline,
                baseline,
                decay_rate,
                response_multiplier,
            });

        self.recompute_dominant();
    }

    /// Blend two strong emotions into a third.
    ///
    /// Proceeds only when both sources exceed the blend threshold. The
    /// blended kind receives half the ratio-weighted intensity and both
    /// sources are reduced slightly. Returns the blended kind when applied.
    pub fn blend(&mut self, a: EmotionKind, b: EmotionKind, ratio: f32) -> Option<EmotionKind> {
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.5 };
        let ia = self.intensity(a);
        let ib = self.intensity(b);
        if ia <= self.config.blend_threshold || ib <= self.config.blend_threshold {
            return None;
        }

        let blended = blend_kind(a, b, ratio);
        let blended_intensity = ia * ratio + ib * (1.0 - ratio);
        debug!(%a, %b, %blended, blended_intensity, "blending emotions");

        self.modify(blended, blended_intensity * 0.5);
        self.modify(a, -self.config.blend_reduction);
        self.modify(b, -self.config.blend_reduction);
        Some(blended)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Current intensity of a kind. Unconfigured kinds read as 0.
    #[must_use]
    pub fn intensity(&self, kind: EmotionKind) -> f32 {
        self.channels.get(&kind).map_or(0.0, |c| c.current)
    }

    /// The cached dominant emotion.
    #[must_use]
    pub fn dominant(&self) -> EmotionKind {
        self.dominant
    }

    /// Intensity of the dominant emotion.
    #[must_use]
    pub fn dominant_intensity(&self) -> f32 {
        self.intensity(self.dominant)
    }

    /// Sum of every non-neutral intensity.
    #[must_use]
    pub fn total_intensity(&self) -> f32 {
        self.channels
            .iter()
            .filter(|(kind, _)| !kind.is_neutral())
            .map(|(_, c)| c.current)
            .sum()
    }

    /// Full channel state of a kind.
    #[must_use]
    pub fn channel(&self, kind: EmotionKind) -> Option<&EmotionChannel> {
        self.channels.get(&kind)
    }

    /// Value copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> EmotionSnapshot {
        EmotionSnapshot {
            dominant: self.dominant,
            dominant_intensity: self.dominant_intensity(),
            intensities: self.channels.iter().map(|(&k, c)| (k, c.current)).collect(),
        }
    }

    /// Recompute and cache the dominant emotion.
    ///
    /// Emits [`EngineEvent::DominantEmotionChanged`] when the result differs
    /// from the cached value. Calling it again without an intervening
    /// mutation returns the same kind and emits nothing.
    pub fn recompute_dominant(&mut self) -> EmotionKind {
        let mut best = EmotionKind::Neutral;
        let mut best_value = f32::NEG_INFINITY;
        for kind in EmotionKind::ALL {
            if kind.is_neutral() {
                continue;
            }
            let Some(channel) = self.channels.get(&kind) else {
                continue;
            };
            if channel.current > best_value {
                best = kind;
                best_value = channel.current;
            }
        }
        let next = if best_value > self.config.dominant_threshold {
            best
        } else {
            EmotionKind::Neutral
        };

        if next != self.dominant {
            debug!(previous = %self.dominant, current = %next, "dominant emotion changed");
            self.events.push(EngineEvent::DominantEmotionChanged {
                previous: self.dominant,
                current: next,
            });
            self.dominant = next;
        }
        next
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }
}

/// Fixed pairwise blend table.
///
/// Strongly skewed ratios keep the favoured source; otherwise known pairs
/// map to their compound emotion and anything else falls back to a source.
#[must_use]
pub fn blend_kind(a: EmotionKind, b: EmotionKind, ratio: f32) -> EmotionKind {
    use EmotionKind::{Curious, Excited, Happy, Sad, Tired};

    if ratio > 0.65 {
        return a;
    }
    match (a, b) {
        (Happy, Curious) | (Curious, Happy) => Excited,
        (Sad, Tired) | (Tired, Sad) => Tired,
        _ if ratio < 0.35 => b,
        _ => a,
    }
}
