//! A population of Minipolls sharing one world.
//!
//! `Population::tick(dt)` is the tick pump. Each call:
//!
//! 1. advances game time and the day/night clock, notifying every agent on
//!    a phase change (and putting them to sleep at night when configured)
//! 2. snapshots every agent as a [`PeerView`]
//! 3. updates agents one at a time in id order, each behind its own lock,
//!    with a [`Perception`] over the snapshot and the shared object table
//! 4. hands any social exchange to the peer after the actor is released
//! 5. publishes the queued events on the [`EventBus`]
//!
//! Peers are seen as they were at the start of the tick. No two agent locks
//! are ever held at once.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use minipoll_core::error::Result;
use minipoll_core::interaction::InteractionResult;
use minipoll_core::{
    ActionKind, AgentId, DayPhase, EmotionKind, GameSeconds, LifeState, MinipollError, NeedKind,
    Position, RelationshipType,
};

use crate::agent::Minipoll;
use crate::clock::DayCycle;
use crate::collaborators::{Interactable, Interactor, ObjectHandle, PeerView, Perception, SeenObject};
use crate::config::SimulationConfig;
use crate::events::{EventBus, SimEvent};
use crate::sandbox::{LoggingVisuals, SandboxMovement};

/// Owns agents, world objects, the clock and the event bus.
pub struct Population {
    agents: BTreeMap<AgentId, Mutex<Minipoll>>,
    objects: Vec<Box<dyn Interactable>>,
    clock: DayCycle,
    bus: EventBus,
    now: GameSeconds,
    sleep_at_night: bool,
}

impl Population {
    /// An empty population on `clock`.
    #[must_use]
    pub fn new(clock: DayCycle) -> Self {
        Self {
            agents: BTreeMap::new(),
            objects: Vec::new(),
            clock,
            bus: EventBus::new(),
            now: 0.0,
            sleep_at_night: true,
        }
    }

    /// A headless population built from a run configuration: sandbox
    /// movement, logging visuals and either the configured or stock objects.
    ///
    /// # Errors
    /// Configuration validation errors.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let run = &config.run;
        let mut rng = StdRng::seed_from_u64(run.seed);

        let mut population = Self::new(DayCycle::new(run.day_length_secs, run.start_time))
            .with_sleep_at_night(run.sleep_at_night);
        for object in config.build_objects(&mut rng) {
            population.add_object(object);
        }

        for i in 0..run.agents {
            let seed = rng.next_u64();
            let start = Position::new(
                rng.gen_range(-run.world_extent..=run.world_extent),
                0.0,
                rng.gen_range(-run.world_extent..=run.world_extent),
            );
            let name = format!("Minipoll-{}", i + 1);
            let agent = Minipoll::builder()
                .id(AgentId::from_u128(u128::from(seed)))
                .name(name.clone())
                .seed(seed)
                .config(config.minipoll.clone())
                .movement(SandboxMovement::new(start, run.world_extent, seed.rotate_left(17)))
                .visuals(LoggingVisuals::new(name))
                .build()?;
            population.add_agent(agent);
        }

        info!(
            agents = population.len(),
            objects = population.objects.len(),
            seed = run.seed,
            "population ready"
        );
        Ok(population)
    }

    /// Whether night puts everyone to sleep and morning wakes them.
    #[must_use]
    pub fn with_sleep_at_night(mut self, enabled: bool) -> Self {
        self.sleep_at_night = enabled;
        self
    }

    /// Add an agent. Replaces any agent with the same id.
    pub fn add_agent(&mut self, agent: Minipoll) -> AgentId {
        let id = agent.id();
        self.agents.insert(id, Mutex::new(agent));
        id
    }

    /// Remove an agent. Its peers forget it at their next maintenance pass.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Minipoll> {
        self.agents.remove(&id).map(Mutex::into_inner)
    }

    /// Add a world object.
    pub fn add_object(&mut self, object: impl Interactable + 'static) -> ObjectHandle {
        self.objects.push(Box::new(object));
        ObjectHandle(self.objects.len() - 1)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the whole world by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.now += dt;
        let now = self.now;

        if let Some(time) = self.clock.advance(dt) {
            self.bus.publish(now, SimEvent::TimeOfDayChanged { time });
            for cell in self.agents.values() {
                let events = {
                    let mut agent = cell.lock();
                    agent.on_time_of_day(time);
                    if self.sleep_at_night {
                        match (time.phase, agent.life_state()) {
                            (DayPhase::Night, LifeState::Awake) => {
                                agent.set_life_state(LifeState::Asleep);
                            }
                            (DayPhase::Morning, LifeState::Asleep) => {
                                agent.set_life_state(LifeState::Awake);
                            }
                            _ => {}
                        }
                    }
                    agent.take_events()
                };
                for event in events {
                    self.bus.publish(now, event);
                }
            }
        }

        let phase = self.clock.phase();
        let views: Vec<PeerView> = self.agents.values().map(|cell| cell.lock().peer_view()).collect();
        let ids: Vec<AgentId> = self.agents.keys().copied().collect();

        for id in ids {
            let Some(cell) = self.agents.get(&id) else {
                continue;
            };
            let (exchange, events) = {
                let mut agent = cell.lock();
                let mut world = World { peers: &views, objects: &mut self.objects, phase };
                let exchange = agent.update(dt, now, &mut world);
                (exchange, agent.take_events())
            };
            for event in events {
                self.bus.publish(now, event);
            }

            let Some(exchange) = exchange else {
                continue;
            };
            let Some(peer_cell) = self.agents.get(&exchange.peer) else {
                debug!(peer = %exchange.peer, "exchange target left the world");
                continue;
            };
            let events = {
                let mut peer = peer_cell.lock();
                peer.respond_to_social(&exchange, now);
                peer.take_events()
            };
            for event in events {
                self.bus.publish(now, event);
            }
        }
    }

    /// Run `duration` seconds in fixed `tick` steps. Returns the tick count.
    pub fn run_for(&mut self, duration: f64, tick: f64) -> u64 {
        if !(tick.is_finite() && tick > 0.0) {
            return 0;
        }
        let mut ticks = 0;
        let end = self.now + duration;
        while self.now + tick <= end + 1e-9 {
            self.tick(tick);
            ticks += 1;
        }
        ticks
    }

    // -----------------------------------------------------------------------
    // Host control
    // -----------------------------------------------------------------------

    /// Lock one agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<MutexGuard<'_, Minipoll>> {
        self.agents.get(&id).map(Mutex::lock)
    }

    /// Change an agent's life state and publish the result.
    ///
    /// # Errors
    /// `MinipollError::UnknownAgent` when no such agent exists.
    pub fn set_life_state(&mut self, id: AgentId, state: LifeState) -> Result<()> {
        let cell = self.agents.get(&id).ok_or(MinipollError::UnknownAgent(id))?;
        let events = {
            let mut agent = cell.lock();
            agent.set_life_state(state);
            agent.take_events()
        };
        for event in events {
            self.bus.publish(self.now, event);
        }
        Ok(())
    }

    /// Every agent id in update order.
    #[must_use]
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether there are no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of world objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// The event bus, for subscribing observers.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Replace the event bus.
    pub fn set_bus(&mut self, bus: EventBus) {
        self.bus = bus;
    }

    /// Game time.
    #[must_use]
    pub fn now(&self) -> GameSeconds {
        self.now
    }

    /// The day/night clock.
    #[must_use]
    pub fn clock(&self) -> &DayCycle {
        &self.clock
    }

    /// A serialisable snapshot of every agent.
    #[must_use]
    pub fn summaries(&self) -> Vec<AgentSummary> {
        let captured_at = Utc::now();
        self.agents
            .values()
            .map(|cell| AgentSummary::capture(&cell.lock(), captured_at))
            .collect()
    }
}

impl std::fmt::Debug for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Population")
            .field("agents", &self.agents.len())
            .field("objects", &self.objects.len())
            .field("now", &self.now)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Perception over the tick snapshot
// ---------------------------------------------------------------------------

struct World<'a> {
    peers: &'a [PeerView],
    objects: &'a mut Vec<Box<dyn Interactable>>,
    phase: DayPhase,
}

impl Perception for World<'_> {
    fn peers_within(&self, me: AgentId, from: Position, radius: f32) -> Vec<PeerView> {
        self.peers
            .iter()
            .filter(|p| p.id != me && p.position.distance(&from) <= radius)
            .copied()
            .collect()
    }

    fn peer_exists(&self, peer: AgentId) -> bool {
        self.peers.iter().any(|p| p.id == peer)
    }

    fn objects_within(&self, from: Position, radius: f32) -> Vec<SeenObject> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.position().distance(&from) <= radius)
            .map(|(i, o)| SeenObject {
                handle: ObjectHandle(i),
                interaction_id: o.interaction_id().to_string(),
                position: o.position(),
            })
            .collect()
    }

    fn object_position(&self, handle: ObjectHandle) -> Option<Position> {
        self.objects.get(handle.0).map(|o| o.position())
    }

    fn can_interact(&self, handle: ObjectHandle, who: &Interactor, now: GameSeconds) -> bool {
        self.objects.get(handle.0).is_some_and(|o| o.can_interact(who, now))
    }

    fn interact(
        &mut self,
        handle: ObjectHandle,
        who: &Interactor,
        now: GameSeconds,
        rng: &mut dyn RngCore,
    ) -> Option<(InteractionResult, Option<String>)> {
        let object = self.objects.get_mut(handle.0)?;
        let result = object.interact(who, now, rng);
        let animation = object.animation_for(result.success).map(str::to_string);
        Some((result, animation))
    }

    fn phase(&self) -> DayPhase {
        self.phase
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// End-of-run view of one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    /// Agent id.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Life state.
    pub life_state: LifeState,
    /// Where it stands.
    pub position: Position,
    /// Dominant emotion.
    pub dominant_emotion: EmotionKind,
    /// Its intensity.
    pub dominant_intensity: f32,
    /// Need values.
    pub needs: BTreeMap<NeedKind, f32>,
    /// Relationship type per peer id.
    pub relationships: BTreeMap<String, RelationshipType>,
    /// Stored experiences.
    pub memory_count: usize,
    /// Most significant experience, if any.
    pub strongest_memory: Option<String>,
    /// Most recent decision.
    pub last_decision: Option<ActionKind>,
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
}

impl AgentSummary {
    fn capture(agent: &Minipoll, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: agent.id(),
            name: agent.name().to_string(),
            life_state: agent.life_state(),
            position: agent.position(),
            dominant_emotion: agent.emotions().dominant(),
            dominant_intensity: agent.emotions().dominant_intensity(),
            needs: agent.needs().values(),
            relationships: agent
                .relationships()
                .iter()
                .map(|(peer, record)| (peer.to_string(), record.relationship_type))
                .collect(),
            memory_count: agent.memory().len(),
            strongest_memory: agent.memory().most_significant().map(str::to_string),
            last_decision: agent.last_decision(),
            captured_at,
        }
    }
}
