//! Population integration tests — whole runs through the public host API.

use minipoll_core::{EngineEvent, LifeState};
use minipoll_host::{EventBus, Population, SimEvent, SimRecord, SimulationConfig};

fn crowded(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.run.seed = seed;
    config.run.agents = 4;
    config.run.objects = 6;
    config.run.world_extent = 2.0;
    config.run.sleep_at_night = false;
    config
}

fn run(config: &SimulationConfig, seconds: f64) -> (Population, Vec<SimRecord>) {
    let mut population = Population::from_config(config).expect("valid config");
    population.set_bus(EventBus::with_log());
    population.run_for(seconds, config.run.tick_secs);
    let log = population.bus_mut().drain_log();
    (population, log)
}

fn count<F: Fn(&SimEvent) -> bool>(log: &[SimRecord], pred: F) -> usize {
    log.iter().filter(|r| pred(&r.event)).count()
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn same_seed_replays_the_same_run() {
    let config = crowded(11);
    let (a, log_a) = run(&config, 120.0);
    let (b, log_b) = run(&config, 120.0);

    assert!(!log_a.is_empty());
    assert_eq!(log_a, log_b);

    let strip = |p: &Population| {
        p.summaries()
            .into_iter()
            .map(|s| (s.id, s.position, s.dominant_emotion, s.memory_count, s.last_decision))
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(&a), strip(&b));
}

#[test]
fn tick_count_matches_duration() {
    let config = crowded(3);
    let mut population = Population::from_config(&config).expect("valid config");
    assert_eq!(population.run_for(10.0, 0.1), 100);
    assert!((population.now() - 10.0).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Behaviour over a run
// ---------------------------------------------------------------------------

#[test]
fn crowded_agents_meet_and_socialise() {
    let (population, log) = run(&crowded(5), 600.0);

    let first_meets = count(&log, |e| {
        matches!(e, SimEvent::Engine { event: EngineEvent::FirstMeet { .. }, .. })
    });
    let exchanges = count(&log, |e| matches!(e, SimEvent::SocialInteraction { .. }));
    assert!(first_meets > 0, "no agent ever met another");
    assert!(exchanges > 0, "no social interaction in ten minutes");

    assert!(population.summaries().iter().any(|s| !s.relationships.is_empty()));
}

#[test]
fn agents_use_objects_and_remember_them() {
    let (population, log) = run(&crowded(8), 600.0);

    let started = count(&log, |e| matches!(e, SimEvent::InteractionStarted { .. }));
    let completed = count(&log, |e| matches!(e, SimEvent::InteractionCompleted { .. }));
    assert!(completed > 0, "no object interaction completed");
    assert!(started >= completed);
    assert!(population.summaries().iter().any(|s| s.memory_count > 0));
}

#[test]
fn every_agent_event_names_a_member() {
    let (population, log) = run(&crowded(13), 60.0);
    let ids = population.agent_ids();
    for record in &log {
        if let Some(agent) = record.event.agent() {
            assert!(ids.contains(&agent), "{} from unknown agent", record.event.name());
        }
    }
}

#[test]
fn removed_agents_are_forgotten() {
    let config = crowded(21);
    let (mut population, _) = run(&config, 600.0);

    let gone = population.agent_ids()[0];
    assert!(population.remove_agent(gone).is_some());
    population.run_for(5.0, config.run.tick_secs);

    for id in population.agent_ids() {
        let agent = population.agent(id).expect("still present");
        assert!(agent.relationships().get(gone).is_none());
    }
}

// ---------------------------------------------------------------------------
// Day and night
// ---------------------------------------------------------------------------

#[test]
fn night_puts_the_population_to_sleep() {
    let mut config = crowded(34);
    config.run.sleep_at_night = true;
    config.run.day_length_secs = 100.0;
    config.run.start_time = 0.7;

    let (population, log) = run(&config, 10.0);

    let sleeps = count(&log, |e| {
        matches!(e, SimEvent::StateChanged { state: LifeState::Asleep, .. })
    });
    assert_eq!(sleeps, config.run.agents);
    assert!(log.iter().any(|r| matches!(r.event, SimEvent::TimeOfDayChanged { .. })));
    assert!(population.summaries().iter().all(|s| s.life_state == LifeState::Asleep));
}

#[test]
fn sleepers_stop_deciding() {
    let mut config = crowded(55);
    config.run.sleep_at_night = true;
    config.run.day_length_secs = 1000.0;
    config.run.start_time = 0.76;

    let mut population = Population::from_config(&config).expect("valid config");
    for id in population.agent_ids() {
        population.set_life_state(id, LifeState::Asleep).expect("known agent");
    }
    population.set_bus(EventBus::with_log());
    population.run_for(30.0, 0.1);

    let log = population.bus_mut().drain_log();
    assert_eq!(count(&log, |e| matches!(e, SimEvent::DecisionMade { .. })), 0);
}

// ---------------------------------------------------------------------------
// Configuration files
// ---------------------------------------------------------------------------

#[test]
fn run_file_places_configured_objects() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("run.toml");
    std::fs::write(
        &path,
        r#"
[run]
agents = 2
seed = 9

[[objects]]
id = "swing"
position = { x = 1.0, y = 0.0, z = 1.0 }
base_success_chance = 0.9
success_animation = "Swing"

[[objects.impacts]]
emotion = "Excited"
on_success = 0.4
on_failure = -0.1

[[objects]]
id = "puddle"
"#,
    )
    .expect("write run file");

    let config = SimulationConfig::from_file(&path).expect("valid run file");
    let population = Population::from_config(&config).expect("valid config");
    assert_eq!(population.len(), 2);
    assert_eq!(population.object_count(), 2);
}

#[test]
fn invalid_run_file_is_rejected() {
    let err = SimulationConfig::from_toml("[run]\ntick_secs = 0.0\n").expect_err("zero tick");
    assert!(err.to_string().contains("run.tick_secs"));
}
