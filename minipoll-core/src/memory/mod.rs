//! Memory store — the experience ledger each Minipoll learns from.
//!
//! Experiences are keyed by a stable id (usually an interactable's
//! interaction id). Recording an outcome adds learned weight to the positive
//! or negative side; evaluating returns how good the experience has been,
//! scaled by confidence in the number of encounters.
//!
//! ## Capacity
//!
//! The store never exceeds its capacity: after every insertion the lowest
//! significance records are evicted (ties broken by id) until it fits.
//! Periodic decay wears down records not touched since the previous pass.

pub mod curve;
pub mod experience;

use std::cmp::Reverse;
use std::collections::{BTreeMap, VecDeque};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MemoryConfig;
use crate::events::EngineEvent;
use crate::types::GameSeconds;

pub use experience::ExperienceRecord;

/// Smallest capacity a store can be configured with.
const MIN_CAPACITY: usize = 10;

/// A dampened copy of an experience on its way to another agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedExperience {
    /// Experience identifier.
    pub id: String,
    /// Whether the sharer's experience was positive overall.
    pub positive: bool,
    /// Intensity the receiver records.
    pub intensity: f32,
}

/// Per-agent experience ledger.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: BTreeMap<String, ExperienceRecord>,
    recent: VecDeque<String>,
    config: MemoryConfig,
    events: Vec<EngineEvent>,
}

impl MemoryStore {
    /// Create an empty store. Rates and capacity are clamped to sane ranges.
    #[must_use]
    pub fn new(config: &MemoryConfig) -> Self {
        let mut config = config.clone();
        config.learning_rate = config.learning_rate.clamp(0.01, 1.0);
        config.forgetting_rate = config.forgetting_rate.clamp(0.001, 0.1);
        config.max_memories = config.max_memories.max(MIN_CAPACITY);
        config.recent_capacity = config.recent_capacity.max(1);
        Self {
            records: BTreeMap::new(),
            recent: VecDeque::with_capacity(config.recent_capacity),
            config,
            events: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Learning
    // -----------------------------------------------------------------------

    /// Learn from one outcome.
    ///
    /// The intensity passes through the learning curve, then
    /// `learning_rate · adjusted` is added to the positive or negative
    /// weight. Empty ids are ignored.
    pub fn record(&mut self, id: &str, positive: bool, intensity: f32, now: GameSeconds) {
        if id.is_empty() {
            return;
        }
        if !intensity.is_finite() {
            warn!(id, intensity, "ignoring non-finite experience intensity");
            return;
        }

        let adjusted = self.config.learning_curve.apply(intensity);
        let increment = self.config.learning_rate * adjusted;
        let time_constant = self.config.recency_time_constant_secs;

        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| ExperienceRecord::new(now));
        if positive {
            record.positive_weight += increment;
        } else {
            record.negative_weight += increment;
        }
        record.encounter_count = record.encounter_count.saturating_add(1);
        record.last_encounter = now;
        record.refresh_significance(now, time_constant);
        debug!(id, positive, adjusted, significance = record.significance, "experience recorded");

        self.touch(id);
        self.events.push(EngineEvent::ExperienceLearned {
            id: id.to_string(),
            positive,
            intensity: adjusted,
        });
        self.evict_to_capacity();
    }

    /// How good an experience has been, in `[-1, 1]`.
    ///
    /// `(positive − negative) · min(1, encounters / 5)`. Unknown ids score 0.
    /// Marks the record as recalled.
    pub fn evaluate(&mut self, id: &str, now: GameSeconds) -> f32 {
        let value = self.value(id);
        if let Some(record) = self.records.get_mut(id) {
            record.last_recall = now;
            self.events.push(EngineEvent::ExperienceRecalled { id: id.to_string(), value });
        }
        value
    }

    /// Same score as [`Self::evaluate`] without marking a recall.
    #[must_use]
    pub fn value(&self, id: &str) -> f32 {
        self.records.get(id).map_or(0.0, |record| {
            #[allow(clippy::cast_precision_loss)]
            let confidence =
                (record.encounter_count as f32 / self.config.confidence_encounters).min(1.0);
            (record.net() * confidence).clamp(-1.0, 1.0)
        })
    }

    /// Wear down records not touched since the previous pass.
    ///
    /// Both weights drop by `forgetting_rate · dt` (floored at 0) and
    /// significance is refreshed. Records that fall below the significance
    /// floor are forgotten unless important events are always memorized.
    /// The recent list is cleared afterwards.
    pub fn periodic_decay(&mut self, dt: f64, now: GameSeconds) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let loss = self.config.forgetting_rate * dt as f32;
        let time_constant = self.config.recency_time_constant_secs;
        let floor = self.config.significance_floor;
        let keep_all = self.config.memorize_important_events;

        let mut forgotten = Vec::new();
        for (id, record) in &mut self.records {
            if self.recent.contains(id) {
                continue;
            }
            record.positive_weight = (record.positive_weight - loss).max(0.0);
            record.negative_weight = (record.negative_weight - loss).max(0.0);
            record.refresh_significance(now, time_constant);
            if record.significance < floor && !keep_all {
                forgotten.push(id.clone());
            }
        }

        for id in forgotten {
            self.records.remove(&id);
            debug!(id, "experience forgotten");
            self.events.push(EngineEvent::ExperienceForgotten { id });
        }
        self.recent.clear();
    }

    // -----------------------------------------------------------------------
    // Sharing
    // -----------------------------------------------------------------------

    /// Build the dampened copy of `id` another agent would receive.
    ///
    /// The sign follows the dominant weight and the intensity is
    /// `|positive − negative| · trust · damping`.
    #[must_use]
    pub fn share_payload(&self, id: &str, trust: f32) -> Option<SharedExperience> {
        let record = self.records.get(id)?;
        let trust = if trust.is_finite() { trust.clamp(0.0, 1.0) } else { 0.0 };
        Some(SharedExperience {
            id: id.to_string(),
            positive: record.is_positive(),
            intensity: record.net().abs() * trust * self.config.share_damping,
        })
    }

    /// Record an experience received from a peer.
    pub fn receive_shared(&mut self, shared: &SharedExperience, now: GameSeconds) {
        self.record(&shared.id, shared.positive, shared.intensity, now);
    }

    /// Copy a dampened version of `id` into another store.
    ///
    /// Returns false when this store has no such experience.
    pub fn share_into(
        &self,
        other: &mut MemoryStore,
        id: &str,
        trust: f32,
        now: GameSeconds,
    ) -> bool {
        match self.share_payload(id, trust) {
            Some(shared) => {
                other.receive_shared(&shared, now);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether anything was learned about `id`.
    #[must_use]
    pub fn has_experience(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// The most significant id containing `fragment`.
    #[must_use]
    pub fn find_similar(&self, fragment: &str) -> Option<&str> {
        self.most_significant_where(|id, _| id.contains(fragment))
    }

    /// The most significant id overall.
    #[must_use]
    pub fn most_significant(&self) -> Option<&str> {
        self.most_significant_where(|_, _| true)
    }

    /// The most significant id whose requested sign dominates.
    #[must_use]
    pub fn most_significant_with_sign(&self, positive: bool) -> Option<&str> {
        self.most_significant_where(|_, record| {
            if positive { record.is_positive() } else { record.is_negative() }
        })
    }

    /// Learned state of one experience.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ExperienceRecord> {
        self.records.get(id)
    }

    /// Every record in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExperienceRecord)> {
        self.records.iter().map(|(id, r)| (id.as_str(), r))
    }

    /// Ids touched since the last decay pass, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Effective capacity after clamping.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.max_memories
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn most_significant_where<F>(&self, filter: F) -> Option<&str>
    where
        F: Fn(&str, &ExperienceRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|(id, record)| filter(id, record))
            // Earliest id wins equal significance.
            .max_by_key(|(id, record)| (OrderedFloat(record.significance), Reverse(id.as_str())))
            .map(|(id, _)| id.as_str())
    }

    fn touch(&mut self, id: &str) {
        if self.recent.iter().any(|r| r == id) {
            return;
        }
        self.recent.push_back(id.to_string());
        while self.recent.len() > self.config.recent_capacity {
            self.recent.pop_front();
        }
    }

    fn evict_to_capacity(&mut self) {
        let capacity = self.config.max_memories;
        if self.records.len() <= capacity {
            return;
        }
        let mut ranked: Vec<(OrderedFloat<f32>, String)> = self
            .records
            .iter()
            .map(|(id, r)| (OrderedFloat(r.significance), id.clone()))
            .collect();
        ranked.sort();

        let excess = self.records.len() - capacity;
        for (significance, id) in ranked.into_iter().take(excess) {
            self.records.remove(&id);
            self.recent.retain(|r| r != &id);
            debug!(id, significance = significance.0, "experience evicted");
            self.events.push(EngineEvent::ExperienceForgotten { id });
        }
    }
}
