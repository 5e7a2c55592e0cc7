//! Relationship ledger — what one Minipoll thinks of every peer it has met.
//!
//! Each record holds three scalars in `[0, 1]` (trust, friendship, fear) and
//! a [`RelationshipType`] derived from them by [`classify`]. The type is
//! recomputed after every mutation and a [`EngineEvent::RelationshipChanged`]
//! is queued only when it actually changes.
//!
//! ## Maintenance
//!
//! ```text
//! periodic_maintenance(now, dt, is_valid)
//!   1. drop peers the host reports as gone
//!   2. stale records (> 60 s since interaction): trust −rate·dt,
//!      friendship −rate·dt/2
//!   3. over capacity: evict lowest overall score (ties: peer id)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SocialConfig;
use crate::events::EngineEvent;
use crate::types::{AgentId, EmotionKind, GameSeconds, RelationshipType, SocialInteractionKind};
use crate::weighted::choose_weighted;

/// Initial trust toward a newly met peer.
pub const INITIAL_TRUST: f32 = 0.2;
/// Initial friendship toward a newly met peer.
pub const INITIAL_FRIENDSHIP: f32 = 0.1;

/// One agent's view of one peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Trust in `[0, 1]`.
    pub trust: f32,
    /// Friendship in `[0, 1]`.
    pub friendship: f32,
    /// Fear in `[0, 1]`.
    pub fear: f32,
    /// Derived from the three scalars.
    pub relationship_type: RelationshipType,
    /// Game time of the last real interaction.
    pub last_interaction: GameSeconds,
    /// Experience ids already shared with this peer.
    pub shared_experiences: BTreeSet<String>,
}

impl RelationshipRecord {
    /// A fresh record for a peer met at `now`.
    #[must_use]
    pub fn new(now: GameSeconds) -> Self {
        Self {
            trust: INITIAL_TRUST,
            friendship: INITIAL_FRIENDSHIP,
            fear: 0.0,
            relationship_type: RelationshipType::Stranger,
            last_interaction: now,
            shared_experiences: BTreeSet::new(),
        }
    }

    /// `0.5·trust + 0.5·friendship − 0.4·fear`.
    #[must_use]
    pub fn overall_score(&self) -> f32 {
        0.5 * self.trust + 0.5 * self.friendship - 0.4 * self.fear
    }

    /// Recompute the type. Returns the previous type.
    fn reclassify(&mut self) -> RelationshipType {
        let previous = self.relationship_type;
        self.relationship_type = classify(self.trust, self.friendship, self.fear);
        previous
    }
}

/// Derive a relationship type. First matching rule wins:
///
/// 1. friendship < 0.2 and trust < 0.2 → Stranger
/// 2. friendship ≥ 0.7 and trust ≥ 0.7 → BestFriend
/// 3. friendship > 0.4 → Friend
/// 4. fear > 0.6 → Afraid
/// 5. trust, friendship and fear all < 0.2 → Hostile
/// 6. otherwise → Acquaintance
#[must_use]
pub fn classify(trust: f32, friendship: f32, fear: f32) -> RelationshipType {
    if friendship < 0.2 && trust < 0.2 {
        RelationshipType::Stranger
    } else if friendship >= 0.7 && trust >= 0.7 {
        RelationshipType::BestFriend
    } else if friendship > 0.4 {
        RelationshipType::Friend
    } else if fear > 0.6 {
        RelationshipType::Afraid
    } else if trust < 0.2 && friendship < 0.2 && fear < 0.2 {
        // Shadowed by rule 1 for every input; kept for the fixed order.
        RelationshipType::Hostile
    } else {
        RelationshipType::Acquaintance
    }
}

fn clamp01(value: f32) -> f32 {
    if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 }
}

/// Per-agent map of peer → relationship record.
#[derive(Debug, Clone)]
pub struct RelationshipLedger {
    records: BTreeMap<AgentId, RelationshipRecord>,
    config: SocialConfig,
    events: Vec<EngineEvent>,
}

impl RelationshipLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new(config: &SocialConfig) -> Self {
        Self { records: BTreeMap::new(), config: config.clone(), events: Vec::new() }
    }

    /// The record for `peer`, created on first contact.
    ///
    /// Creation queues exactly one [`EngineEvent::FirstMeet`] per peer.
    pub fn get_or_create(&mut self, peer: AgentId, now: GameSeconds) -> &mut RelationshipRecord {
        let events = &mut self.events;
        self.records.entry(peer).or_insert_with(|| {
            debug!(%peer, "first meeting");
            events.push(EngineEvent::FirstMeet { peer });
            RelationshipRecord::new(now)
        })
    }

    /// The record for `peer`, if met.
    #[must_use]
    pub fn get(&self, peer: AgentId) -> Option<&RelationshipRecord> {
        self.records.get(&peer)
    }

    /// Shift trust and friendship, clamping both to `[0, 1]`.
    pub fn adjust(&mut self, peer: AgentId, trust_delta: f32, friendship_delta: f32, now: GameSeconds) {
        let record = self.get_or_create(peer, now);
        record.trust = clamp01(record.trust + trust_delta);
        record.friendship = clamp01(record.friendship + friendship_delta);
        self.after_mutation(peer);
    }

    /// Shift fear, clamping to `[0, 1]`.
    pub fn adjust_fear(&mut self, peer: AgentId, delta: f32, now: GameSeconds) {
        let record = self.get_or_create(peer, now);
        record.fear = clamp01(record.fear + delta);
        self.after_mutation(peer);
    }

    /// Mark a real interaction with `peer` at `now`.
    pub fn note_interaction(&mut self, peer: AgentId, now: GameSeconds) {
        self.get_or_create(peer, now).last_interaction = now;
    }

    /// Remember that `id` was shared with `peer`.
    ///
    /// The first share of a given id adds the shared-experience bonus to
    /// trust and friendship. Returns whether the id was new for this peer.
    pub fn record_shared_experience(&mut self, peer: AgentId, id: &str, now: GameSeconds) -> bool {
        let is_new = self.get_or_create(peer, now).shared_experiences.insert(id.to_string());
        if is_new {
            let bonus = self.config.shared_experience_bonus;
            self.adjust(peer, bonus, bonus, now);
        }
        self.events.push(EngineEvent::ExperienceShared { peer, id: id.to_string() });
        is_new
    }

    /// Forget departed peers, wear down stale relationships and enforce
    /// capacity.
    pub fn periodic_maintenance<F>(&mut self, now: GameSeconds, dt: f64, is_valid: F)
    where
        F: Fn(AgentId) -> bool,
    {
        self.records.retain(|peer, _| is_valid(*peer));

        if dt.is_finite() && dt > 0.0 {
            #[allow(clippy::cast_possible_truncation)]
            let trust_loss = self.config.base_change_rate * dt as f32;
            let stale: Vec<AgentId> = self
                .records
                .iter()
                .filter(|(_, r)| now - r.last_interaction > self.config.stale_after_secs)
                .map(|(peer, _)| *peer)
                .collect();
            for peer in stale {
                self.adjust(peer, -trust_loss, -0.5 * trust_loss, now);
            }
        }

        self.evict_to_capacity();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Peers classified Friend or BestFriend.
    #[must_use]
    pub fn friends(&self) -> Vec<AgentId> {
        self.records
            .iter()
            .filter(|(_, r)| r.relationship_type.is_friendly())
            .map(|(peer, _)| *peer)
            .collect()
    }

    /// Hostile peers, plus strangers feared above 0.5.
    #[must_use]
    pub fn threats(&self) -> Vec<AgentId> {
        self.records
            .iter()
            .filter(|(_, r)| {
                r.relationship_type == RelationshipType::Hostile
                    || (r.relationship_type == RelationshipType::Stranger && r.fear > 0.5)
            })
            .map(|(peer, _)| *peer)
            .collect()
    }

    /// Overall score toward `peer`; 0 for unknown peers.
    #[must_use]
    pub fn score(&self, peer: AgentId) -> f32 {
        self.records.get(&peer).map_or(0.0, RelationshipRecord::overall_score)
    }

    /// The candidate with the highest overall score. Earlier candidates win
    /// ties.
    #[must_use]
    pub fn best_peer(&self, candidates: &[AgentId]) -> Option<AgentId> {
        let mut best: Option<(AgentId, f32)> = None;
        for &peer in candidates {
            let score = self.score(peer);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((peer, score));
            }
        }
        best.map(|(peer, _)| peer)
    }

    /// Every record in peer order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &RelationshipRecord)> {
        self.records.iter().map(|(peer, r)| (*peer, r))
    }

    /// Number of known peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no peer is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take every queued event.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EngineEvent> {
        self.events.drain(..)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn after_mutation(&mut self, peer: AgentId) {
        let Some(record) = self.records.get_mut(&peer) else {
            return;
        };
        let previous = record.reclassify();
        let current = record.relationship_type;
        if previous != current {
            debug!(%peer, %previous, %current, "relationship changed");
            self.events.push(EngineEvent::RelationshipChanged { peer, previous, current });
        }
    }

    fn evict_to_capacity(&mut self) {
        let capacity = self.config.max_relationships;
        if self.records.len() <= capacity {
            return;
        }
        let mut ranked: Vec<(OrderedFloat<f32>, AgentId)> = self
            .records
            .iter()
            .map(|(peer, r)| (OrderedFloat(r.overall_score()), *peer))
            .collect();
        ranked.sort();

        let excess = self.records.len() - capacity;
        for (score, peer) in ranked.into_iter().take(excess) {
            self.records.remove(&peer);
            debug!(%peer, score = score.0, "relationship evicted");
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction choice
// ---------------------------------------------------------------------------

/// Weighted social options for one peer given the actor's mood.
///
/// Friendship above 0.3 unlocks Play (weight = friendship) next to a 0.5
/// Greeting, and above 0.6 also ShareExperience (weight = trust). Otherwise
/// Greeting carries 1.0, with Observe at 0.8 when trust is below 0.2. The
/// dominant emotion then adds one more entry: Happy → Play (1.5·intensity),
/// Sad → SeekComfort (intensity), Scared → Observe (intensity).
#[must_use]
pub fn interaction_options(
    record: &RelationshipRecord,
    dominant: EmotionKind,
    intensity: f32,
) -> Vec<(SocialInteractionKind, f32)> {
    let mut options = Vec::with_capacity(4);
    if record.friendship > 0.3 {
        options.push((SocialInteractionKind::Greeting, 0.5));
        options.push((SocialInteractionKind::Play, record.friendship));
        if record.friendship > 0.6 {
            options.push((SocialInteractionKind::ShareExperience, record.trust));
        }
    } else {
        options.push((SocialInteractionKind::Greeting, 1.0));
        if record.trust < 0.2 {
            options.push((SocialInteractionKind::Observe, 0.8));
        }
    }

    match dominant {
        EmotionKind::Happy => options.push((SocialInteractionKind::Play, intensity * 1.5)),
        EmotionKind::Sad => options.push((SocialInteractionKind::SeekComfort, intensity)),
        EmotionKind::Scared => options.push((SocialInteractionKind::Observe, intensity)),
        _ => {}
    }
    options
}

/// Pick how to approach a peer. Falls back to Greeting.
pub fn choose_interaction_type<R: Rng + ?Sized>(
    record: &RelationshipRecord,
    dominant: EmotionKind,
    intensity: f32,
    rng: &mut R,
) -> SocialInteractionKind {
    let options = interaction_options(record, dominant, intensity);
    choose_weighted(&options, rng).unwrap_or(SocialInteractionKind::Greeting)
}
