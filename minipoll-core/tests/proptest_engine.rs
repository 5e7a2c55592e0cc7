//! Property-based tests for the engine models.
//!
//! Uses `proptest` to check the clamping, purity and ordering guarantees
//! under arbitrary inputs.

use proptest::prelude::*;

use minipoll_core::config::{EmotionConfig, MemoryConfig, NeedsConfig, SocialConfig};
use minipoll_core::relationship::{self, RelationshipLedger};
use minipoll_core::weighted::choose_weighted;
use minipoll_core::{AgentId, EmotionKind, EmotionModel, MemoryStore, NeedKind, NeedsModel};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_emotion() -> impl Strategy<Value = EmotionKind> {
    prop::sample::select(EmotionKind::ALL.to_vec())
}

fn arb_need() -> impl Strategy<Value = NeedKind> {
    prop::sample::select(NeedKind::ALL.to_vec())
}

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn emotion_intensity_stays_in_unit_range(
        steps in prop::collection::vec((arb_emotion(), -5.0..5.0f32), 1..60),
        decay in 0.0..20.0f64,
    ) {
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        for (kind, delta) in steps {
            emotions.modify(kind, delta);
            let value = emotions.intensity(kind);
            prop_assert!((0.0..=1.0).contains(&value), "{kind} = {value}");
        }
        emotions.decay(decay);
        for kind in EmotionKind::ALL {
            let value = emotions.intensity(kind);
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn dominant_recompute_is_idempotent(
        steps in prop::collection::vec((arb_emotion(), 0.0..1.0f32), 0..20),
    ) {
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        for (kind, delta) in steps {
            emotions.modify(kind, delta);
        }
        let first = emotions.recompute_dominant();
        let second = emotions.recompute_dominant();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, emotions.dominant());
    }
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn need_values_stay_in_unit_range(
        ops in prop::collection::vec((arb_need(), -2.0..2.0f32, 0.0..200.0f64), 1..40),
    ) {
        let mut needs = NeedsModel::new(&NeedsConfig::default());
        let mut emotions = EmotionModel::new(&EmotionConfig::default());
        for (need, amount, dt) in ops {
            needs.fill(need, amount, Some(&mut emotions));
            needs.decay(dt, Some(&mut emotions));
            for value in needs.values().values() {
                prop_assert!((0.0..=1.0).contains(value));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn store_never_exceeds_capacity(
        records in prop::collection::vec((0..200u32, any::<bool>(), 0.0..1.0f32), 1..300),
    ) {
        let mut memory = MemoryStore::new(&MemoryConfig::default());
        for (i, (id, positive, intensity)) in records.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            memory.record(&format!("exp_{id}"), positive, intensity, i as f64);
            prop_assert!(memory.len() <= memory.capacity());
        }
    }

    #[test]
    fn evaluation_stays_in_signed_unit_range(
        records in prop::collection::vec((any::<bool>(), 0.0..1.0f32), 1..50),
    ) {
        let mut memory = MemoryStore::new(&MemoryConfig::default());
        for (positive, intensity) in records {
            memory.record("thing", positive, intensity, 0.0);
        }
        let value = memory.evaluate("thing", 0.0);
        prop_assert!((-1.0..=1.0).contains(&value));
    }

    #[test]
    fn significance_never_drops_under_same_sign_reinforcement(
        intensities in prop::collection::vec(0.0..1.0f32, 2..30),
        positive in any::<bool>(),
    ) {
        let mut memory = MemoryStore::new(&MemoryConfig::default());
        let mut previous = 0.0_f32;
        for intensity in intensities {
            memory.record("habit", positive, intensity, 0.0);
            let significance = memory.get("habit").map_or(0.0, |r| r.significance);
            prop_assert!(significance >= previous - 1e-6);
            previous = significance;
        }
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn classifier_is_pure(trust in 0.0..=1.0f32, friendship in 0.0..=1.0f32, fear in 0.0..=1.0f32) {
        let a = relationship::classify(trust, friendship, fear);
        let b = relationship::classify(trust, friendship, fear);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn relationship_scalars_stay_clamped(
        deltas in prop::collection::vec((-3.0..3.0f32, -3.0..3.0f32, -3.0..3.0f32), 1..30),
    ) {
        let mut ledger = RelationshipLedger::new(&SocialConfig::default());
        let peer = AgentId::from_u128(42);
        for (i, (dt, df, dfear)) in deltas.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let now = i as f64;
            ledger.adjust(peer, dt, df, now);
            ledger.adjust_fear(peer, dfear, now);
            let record = ledger.get(peer).expect("created by adjust");
            prop_assert!((0.0..=1.0).contains(&record.trust));
            prop_assert!((0.0..=1.0).contains(&record.friendship));
            prop_assert!((0.0..=1.0).contains(&record.fear));
            prop_assert_eq!(
                record.relationship_type,
                relationship::classify(record.trust, record.friendship, record.fear)
            );
        }
    }

    #[test]
    fn ledger_eviction_keeps_the_highest_scores(
        trusts in prop::collection::vec(0.0..1.0f32, 1..40),
    ) {
        let config = SocialConfig { max_relationships: 5, ..SocialConfig::default() };
        let mut ledger = RelationshipLedger::new(&config);
        for (i, trust) in trusts.iter().enumerate() {
            ledger.adjust(AgentId::from_u128(i as u128), *trust, 0.0, 0.0);
        }
        ledger.periodic_maintenance(0.0, 0.0, |_| true);
        prop_assert!(ledger.len() <= 5);

        let kept_min = ledger
            .iter()
            .map(|(_, r)| r.overall_score())
            .fold(f32::INFINITY, f32::min);
        let kept: Vec<AgentId> = ledger.iter().map(|(p, _)| p).collect();
        for (i, trust) in trusts.iter().enumerate() {
            let peer = AgentId::from_u128(i as u128);
            if !kept.contains(&peer) {
                // Anything evicted scored no higher than everything kept.
                let mut probe = RelationshipLedger::new(&SocialConfig::default());
                probe.adjust(peer, *trust, 0.0, 0.0);
                let evicted = probe.score(peer);
                prop_assert!(evicted <= kept_min + 1e-6);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Weighted choice
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn weighted_choice_only_returns_usable_entries(
        weights in prop::collection::vec(-1.0..3.0f32, 0..12),
        seed in any::<u64>(),
    ) {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let options: Vec<(usize, f32)> = weights.iter().copied().enumerate().collect();
        match choose_weighted(&options, &mut rng) {
            Some(i) => prop_assert!(weights[i] > 0.0),
            None => prop_assert!(weights.iter().all(|w| *w <= 0.0)),
        }
    }
}
