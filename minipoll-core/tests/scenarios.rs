//! Scenario tests — end-to-end flows across the engine models.
//!
//! Each test drives several models together the way a host agent would:
//! decide, resolve, feed the result back into emotions, memory and
//! relationships.

use rand::SeedableRng;
use rand::rngs::StdRng;

use minipoll_core::config::{EmotionConfig, MemoryConfig, MinipollConfig, NeedsConfig, SocialConfig};
use minipoll_core::decision::{DecisionContext, DecisionPolicy};
use minipoll_core::interaction::{self, InteractionProfile};
use minipoll_core::relationship::{self, RelationshipLedger};
use minipoll_core::{
    ActionKind, AgentId, EmotionKind, EmotionModel, EngineEvent, MemoryStore, NeedKind, NeedsModel,
    RelationshipType, SocialInteractionKind,
};

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

#[test]
fn tired_agent_alone_mostly_rests() {
    let config = MinipollConfig::default();
    let mut emotions = EmotionModel::new(&config.emotion);
    emotions.modify(EmotionKind::Tired, 0.75);

    let policy = DecisionPolicy::new(&config.decision);
    let ctx = DecisionContext::from_emotions(&emotions, false, false, 0.5);
    let candidates = policy.build_candidates(&ctx);

    let weight = |action| candidates.iter().find(|o| o.action == action).map(|o| o.weight);
    assert_eq!(weight(ActionKind::Rest), Some(3.0));
    assert_eq!(weight(ActionKind::Movement), Some(1.0));
    assert_eq!(weight(ActionKind::Interaction), None);
    assert_eq!(weight(ActionKind::Social), None);

    let total: f32 = candidates.iter().map(|o| o.weight).sum();
    let expected = f64::from(3.0 / total);

    let mut rng = StdRng::seed_from_u64(2024);
    let draws = 10_000;
    let rests = (0..draws)
        .filter(|_| policy.choose_action(&candidates, &mut rng) == ActionKind::Rest)
        .count();
    #[allow(clippy::cast_precision_loss)]
    let ratio = rests as f64 / f64::from(draws);
    assert!((ratio - expected).abs() < 0.02, "rest ratio {ratio}, expected {expected}");
}

#[test]
fn same_seed_same_decisions() {
    let config = MinipollConfig::default();
    let policy = DecisionPolicy::new(&config.decision);
    let ctx = DecisionContext {
        tired: 0.2,
        curiosity: 0.4,
        dominant: EmotionKind::Curious,
        has_nearby_interactables: true,
        has_nearby_peers: true,
        socializing_tendency: 0.5,
    };
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..100).map(|_| policy.decide(&ctx, &mut rng)).collect::<Vec<_>>()
    };
    assert_eq!(run(7), run(7));
}

// ---------------------------------------------------------------------------
// World interaction → emotions + memory
// ---------------------------------------------------------------------------

#[test]
fn repeated_good_experiences_raise_success_chance() {
    let mut memory = MemoryStore::new(&MemoryConfig::default());
    let mut emotions = EmotionModel::new(&EmotionConfig::default());
    let profile = InteractionProfile { base_success_chance: 1.0, ..InteractionProfile::new("berry_bush") }
        .with_impact(EmotionKind::Happy, 0.3, -0.2);
    let mut rng = StdRng::seed_from_u64(1);

    let before = interaction::world_success_chance(0.5, memory.value("berry_bush"), EmotionKind::Neutral, 0.0);
    for t in 0..5 {
        let now = f64::from(t);
        let learned = memory.evaluate(&profile.interaction_id, now);
        let result = interaction::resolve_world_interaction(
            &profile,
            learned,
            emotions.dominant(),
            emotions.dominant_intensity(),
            &mut rng,
        );
        emotions.modify(result.primary_emotion, result.signed_impact());
        memory.record(&result.experience_id, result.success, result.emotional_impact, now);
    }
    let after = interaction::world_success_chance(0.5, memory.value("berry_bush"), EmotionKind::Neutral, 0.0);

    assert!(memory.value("berry_bush") > 0.0);
    assert!(after > before);
    assert_eq!(emotions.dominant(), EmotionKind::Happy);
}

#[test]
fn unknown_experience_evaluates_to_exactly_zero() {
    let mut memory = MemoryStore::new(&MemoryConfig::default());
    memory.record("known", true, 1.0, 0.0);
    assert_eq!(memory.evaluate("never_seen", 1.0).to_bits(), 0.0_f32.to_bits());
}

#[test]
fn record_then_evaluate_carries_outcome_sign() {
    let mut memory = MemoryStore::new(&MemoryConfig::default());
    memory.record("sunny_rock", true, 1.0, 0.0);
    memory.record("thorn_patch", false, 1.0, 0.0);
    assert!(memory.evaluate("sunny_rock", 0.0) > 0.0);
    assert!(memory.evaluate("thorn_patch", 0.0) < 0.0);
}

#[test]
fn eviction_removes_exactly_the_lowest_ranked() {
    let mut memory = MemoryStore::new(&MemoryConfig { max_memories: 10, ..MemoryConfig::default() });
    // Ten well-known experiences, each reinforced twice.
    for i in 0..10 {
        let id = format!("strong_{i}");
        memory.record(&id, true, 1.0, 0.0);
        memory.record(&id, true, 1.0, 0.0);
    }
    memory.drain_events().for_each(drop);

    // Each new weak record is the lowest ranked and goes straight back out.
    for i in 0..3 {
        memory.record(&format!("weak_{i}"), true, 0.1, 0.0);
        assert_eq!(memory.len(), 10);
    }
    let forgotten: Vec<String> = memory
        .drain_events()
        .filter_map(|e| match e {
            EngineEvent::ExperienceForgotten { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(forgotten, vec!["weak_0", "weak_1", "weak_2"]);
    assert!((0..10).all(|i| memory.has_experience(&format!("strong_{i}"))));
}

// ---------------------------------------------------------------------------
// Needs → emotions
// ---------------------------------------------------------------------------

#[test]
fn starving_energy_makes_an_agent_tired() {
    let mut needs = NeedsModel::new(&NeedsConfig::default());
    let mut emotions = EmotionModel::new(&EmotionConfig::default());
    needs.set_value(NeedKind::Energy, 0.15);

    needs.decay(6.0, Some(&mut emotions));

    let critical: Vec<_> = needs
        .drain_events()
        .filter(|e| matches!(e, EngineEvent::NeedCritical { need: NeedKind::Energy, .. }))
        .collect();
    assert_eq!(critical.len(), 1);
    assert!(emotions.intensity(EmotionKind::Tired) >= 0.4 - 1e-6);
    assert_eq!(needs.lowest_need(), NeedKind::Energy);

    // Further decay below the threshold does not re-fire.
    needs.decay(2.0, Some(&mut emotions));
    assert_eq!(needs.drain_events().count(), 0);
}

// ---------------------------------------------------------------------------
// Social exchange
// ---------------------------------------------------------------------------

#[test]
fn friendly_exchanges_grow_into_friendship() {
    let social = SocialConfig::default();
    let peer = AgentId::from_u128(2);
    let mut mine = RelationshipLedger::new(&social);
    let mut my_memory = MemoryStore::new(&MemoryConfig::default());
    let mut peer_memory = MemoryStore::new(&MemoryConfig::default());
    let mut my_emotions = EmotionModel::new(&EmotionConfig::default());
    for t in 0..5 {
        my_memory.record("warm_pond", true, 1.0, f64::from(t));
    }

    let mut rng = StdRng::seed_from_u64(99);
    for step in 0..40 {
        let now = f64::from(step) * 2.0;
        let record = mine.get_or_create(peer, now).clone();
        let kind = relationship::choose_interaction_type(
            &record,
            my_emotions.dominant(),
            my_emotions.dominant_intensity(),
            &mut rng,
        );
        // A cheerful peer.
        let outcome = interaction::resolve_social(&record, kind, EmotionKind::Happy, 0.8, &mut rng);
        outcome.apply(&mut my_emotions);
        mine.note_interaction(peer, now);
        let (dt, df) = interaction::relationship_deltas(outcome.success, social.interaction_impact_multiplier);
        mine.adjust(peer, dt, df, now);
        if outcome.share_experience {
            if let Some(id) = my_memory.most_significant().map(str::to_string) {
                my_memory.share_into(&mut peer_memory, &id, mine.get(peer).map_or(0.0, |r| r.trust), now);
                mine.record_shared_experience(peer, &id, now);
            }
        }
    }

    let record = mine.get(peer).expect("met");
    assert!(record.relationship_type.is_friendly(), "ended as {}", record.relationship_type);
    assert_eq!(mine.friends(), vec![peer]);
    assert!(peer_memory.has_experience("warm_pond") || !record.shared_experiences.contains("warm_pond"));
}

#[test]
fn hostile_play_with_scared_peer_has_floor_chance() {
    let record = relationship::RelationshipRecord {
        relationship_type: RelationshipType::Hostile,
        friendship: 0.05,
        trust: 0.05,
        ..relationship::RelationshipRecord::new(0.0)
    };
    let chance =
        interaction::social_success_chance(&record, SocialInteractionKind::Play, EmotionKind::Scared, 0.8);
    let expected: f32 = (0.5 - 0.4 + (0.05 * 0.2 - 0.1) - 0.8 * 0.3_f32).clamp(0.0, 1.0);
    assert!((chance - expected).abs() < 1e-6);
}

#[test]
fn classifier_boundary_prefers_best_friend() {
    assert_eq!(relationship::classify(0.7, 0.71, 0.0), RelationshipType::BestFriend);
    for _ in 0..3 {
        assert_eq!(relationship::classify(0.45, 0.3, 0.65), RelationshipType::Afraid);
    }
}
