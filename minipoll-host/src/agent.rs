//! The Minipoll brain.
//!
//! A [`Minipoll`] owns one instance of every core model plus its movement
//! and visual collaborators, and advances them from a single
//! [`Minipoll::update`] call per host tick:
//!
//! ```text
//! update(dt, now, world)
//!   ├─ movement.step / arrival at a pending object
//!   ├─ emotion cadence   → EmotionModel::decay
//!   ├─ needs cadence     → NeedsModel::decay (awake only by default)
//!   ├─ memory cadence    → MemoryStore::periodic_decay + InterestMap::prune
//!   ├─ social cadence    → RelationshipLedger::periodic_maintenance
//!   ├─ decision cadence  → DecisionPolicy::decide → action queue
//!   ├─ execute one queued action
//!   └─ drain engine events into SimEvents
//! ```
//!
//! Cross-agent effects never touch the peer directly. A social action
//! returns a [`SocialExchange`] that the population hands to the peer via
//! [`Minipoll::respond_to_social`] once the actor is released.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use minipoll_core::config::MinipollConfig;
use minipoll_core::error::Result;
use minipoll_core::interaction::{self, InteractionResult};
use minipoll_core::interest::InterestMap;
use minipoll_core::memory::SharedExperience;
use minipoll_core::relationship::{self, INITIAL_TRUST};
use minipoll_core::{
    ActionKind, AgentId, DecisionContext, DecisionPolicy, EmotionKind, EmotionModel, EngineEvent,
    GameSeconds, LifeState, MemoryStore, MinipollError, MovementState, NeedKind, NeedsModel,
    Position, RelationshipLedger, SocialInteractionKind, TimeOfDay,
};

use crate::collaborators::{
    Interactor, MovementExecutor, PeerView, Perception, SeenObject, VisualExecutor,
};
use crate::events::SimEvent;
use crate::schedule::AgentCadences;

/// What one social action did, for delivery to the peer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialExchange {
    /// Agent that initiated.
    pub actor: AgentId,
    /// Agent that was approached.
    pub peer: AgentId,
    /// What was attempted.
    pub kind: SocialInteractionKind,
    /// Whether the peer responded positively.
    pub success: bool,
    /// Animation the peer plays in response.
    pub peer_animation: Option<&'static str>,
    /// Experiences passed to the peer.
    pub shared: Vec<SharedExperience>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Assembles a [`Minipoll`] from configuration and collaborators.
#[derive(Default)]
pub struct MinipollBuilder {
    id: Option<AgentId>,
    name: Option<String>,
    config: MinipollConfig,
    seed: Option<u64>,
    movement: Option<Box<dyn MovementExecutor>>,
    visuals: Option<Box<dyn VisualExecutor>>,
}

impl MinipollBuilder {
    /// Start from the stock configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the agent id.
    #[must_use]
    pub fn id(mut self, id: AgentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Per-agent tuning.
    #[must_use]
    pub fn config(mut self, config: MinipollConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed of the agent's private random stream.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Movement collaborator. Required.
    #[must_use]
    pub fn movement(mut self, movement: impl MovementExecutor + 'static) -> Self {
        self.movement = Some(Box::new(movement));
        self
    }

    /// Visual collaborator. Required.
    #[must_use]
    pub fn visuals(mut self, visuals: impl VisualExecutor + 'static) -> Self {
        self.visuals = Some(Box::new(visuals));
        self
    }

    /// Validate the configuration and assemble the agent.
    ///
    /// # Errors
    /// `MinipollError::MissingCollaborator` when movement or visuals were not
    /// supplied, or the configuration's validation error.
    pub fn build(self) -> Result<Minipoll> {
        self.config.validate()?;
        let movement = self.movement.ok_or(MinipollError::MissingCollaborator("movement"))?;
        let visuals = self.visuals.ok_or(MinipollError::MissingCollaborator("visuals"))?;

        let id = self.id.unwrap_or_default();
        #[allow(clippy::cast_possible_truncation)]
        let seed = self.seed.unwrap_or(id.0.as_u128() as u64);
        let name = self.name.unwrap_or_else(|| format!("Minipoll-{}", &id.to_string()[..8]));
        let config = self.config;

        let emotions = EmotionModel::with_tendencies(&config.emotion, &config.personality.tendencies);
        let last_movement_state = movement.movement_state();
        info!(agent = %id, %name, seed, "minipoll spawned");

        Ok(Minipoll {
            id,
            name,
            life_state: LifeState::Awake,
            emotions,
            needs: NeedsModel::new(&config.needs),
            memory: MemoryStore::new(&config.memory),
            relationships: RelationshipLedger::new(&config.social),
            policy: DecisionPolicy::new(&config.decision),
            interests: InterestMap::new(&config.interaction),
            cadences: AgentCadences::from_config(&config),
            config,
            movement,
            visuals,
            rng: StdRng::seed_from_u64(seed),
            actions: VecDeque::new(),
            pending_target: None,
            last_interaction: f64::NEG_INFINITY,
            failed_interactions: 0,
            last_decision: None,
            events: Vec::new(),
            last_movement_state,
        })
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// One autonomous creature.
pub struct Minipoll {
    id: AgentId,
    name: String,
    life_state: LifeState,
    emotions: EmotionModel,
    needs: NeedsModel,
    memory: MemoryStore,
    relationships: RelationshipLedger,
    policy: DecisionPolicy,
    interests: InterestMap,
    cadences: AgentCadences,
    config: MinipollConfig,
    movement: Box<dyn MovementExecutor>,
    visuals: Box<dyn VisualExecutor>,
    rng: StdRng,
    actions: VecDeque<ActionKind>,
    pending_target: Option<SeenObject>,
    last_interaction: GameSeconds,
    failed_interactions: u32,
    last_decision: Option<ActionKind>,
    events: Vec<SimEvent>,
    last_movement_state: MovementState,
}

impl Minipoll {
    /// Shorthand for [`MinipollBuilder::new`].
    #[must_use]
    pub fn builder() -> MinipollBuilder {
        MinipollBuilder::new()
    }

    /// Advance the agent by `dt` seconds of game time ending at `now`.
    ///
    /// Returns the social exchange this tick produced, if any, for the host
    /// to deliver to the peer.
    pub fn update(
        &mut self,
        dt: f64,
        now: GameSeconds,
        world: &mut dyn Perception,
    ) -> Option<SocialExchange> {
        if !(dt.is_finite() && dt > 0.0) {
            return None;
        }

        self.movement.step(dt);
        self.track_movement_state();
        if self.movement.take_destination_reached() {
            if let Some(target) = self.pending_target.take() {
                self.interact_with(&target, now, world);
            }
        }

        if let Some(covered) = self.cadences.emotion.advance(dt) {
            self.emotions.decay(covered);
        }
        if let Some(covered) = self.cadences.needs.advance(dt) {
            if self.life_state == LifeState::Awake || self.config.needs.decay_while_asleep {
                self.needs.decay(covered, Some(&mut self.emotions));
            }
        }
        if let Some(covered) = self.cadences.memory.advance(dt) {
            self.memory.periodic_decay(covered, now);
            self.interests.prune(self.movement.position(), now);
        }
        if let Some(covered) = self.cadences.social.advance(dt) {
            let world: &dyn Perception = &*world;
            self.relationships.periodic_maintenance(now, covered, |peer| world.peer_exists(peer));
        }
        if self.cadences.decision.advance(dt).is_some() {
            self.make_decision(now, world);
        }

        let exchange = self.execute_next_action(now, world);
        self.track_movement_state();
        self.flush_engine_events();
        exchange
    }

    // -----------------------------------------------------------------------
    // Decisions
    // -----------------------------------------------------------------------

    fn make_decision(&mut self, now: GameSeconds, world: &dyn Perception) {
        if self.life_state != LifeState::Awake {
            return;
        }
        let position = self.movement.position();
        let who = self.interactor(0.0, world);
        let has_objects = world
            .objects_within(position, self.config.interaction.interaction_range)
            .iter()
            .any(|seen| world.can_interact(seen.handle, &who, now));
        let has_peers =
            !world.peers_within(self.id, position, self.config.social.social_radius).is_empty();

        let ctx = DecisionContext::from_emotions(
            &self.emotions,
            has_objects,
            has_peers,
            self.config.personality.socializing_tendency,
        );
        let Some(action) = self.policy.decide(&ctx, &mut self.rng) else {
            trace!(agent = %self.id, "autonomy gate skipped decision");
            return;
        };

        debug!(agent = %self.id, %action, has_objects, has_peers, "decision made");
        self.last_decision = Some(action);
        self.actions.push_back(action);
        self.events.push(SimEvent::DecisionMade { agent: self.id, action });
    }

    fn execute_next_action(
        &mut self,
        now: GameSeconds,
        world: &mut dyn Perception,
    ) -> Option<SocialExchange> {
        let action = self.actions.pop_front()?;
        match action {
            ActionKind::Movement => self.movement.wander_randomly(),
            ActionKind::Interaction => {
                self.try_interact_with_nearby_object(now, world);
            }
            ActionKind::Social => return self.try_social(now, world),
            ActionKind::Rest => self.rest(),
            ActionKind::Explore => self.explore(now, world),
            ActionKind::Idle => {}
        }
        None
    }

    fn rest(&mut self) {
        self.movement.stop_moving();
        self.emotions.modify(EmotionKind::Tired, -self.config.decision.rest_recovery);
        self.visuals.play_animation("Rest");
        debug!(agent = %self.id, "resting");
    }

    fn explore(&mut self, now: GameSeconds, world: &dyn Perception) {
        self.movement.explore_new_area();
        self.scan_surroundings(now, world);
    }

    /// Remember every object within the interest distance as a point worth
    /// returning to.
    pub fn scan_surroundings(&mut self, now: GameSeconds, world: &dyn Perception) {
        let position = self.movement.position();
        for seen in world.objects_within(position, self.config.interaction.max_interest_distance) {
            let interest = self.interest_in(&seen.interaction_id, now);
            if self.interests.add(seen.position, interest, now) {
                self.events.push(SimEvent::InterestingLocationDiscovered {
                    agent: self.id,
                    position: seen.position,
                    interest,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // World objects
    // -----------------------------------------------------------------------

    fn interest_in(&mut self, interaction_id: &str, now: GameSeconds) -> f32 {
        let value = self.memory.evaluate(interaction_id, now);
        interaction::interest_level(
            value,
            self.memory.has_experience(interaction_id),
            self.emotions.dominant(),
            self.emotions.dominant_intensity(),
            self.config.interaction.interest_multiplier,
        )
    }

    fn interactor(&self, experience_value: f32, world: &dyn Perception) -> Interactor {
        Interactor {
            agent: self.id,
            dominant: self.emotions.dominant(),
            dominant_intensity: self.emotions.dominant_intensity(),
            experience_value,
            phase: world.phase(),
        }
    }

    /// Use the most interesting object in range.
    ///
    /// With nothing usable in range the agent heads for its best interest
    /// point instead, until too many attempts in a row have failed. Returns
    /// whether anything was attempted.
    pub fn try_interact_with_nearby_object(
        &mut self,
        now: GameSeconds,
        world: &mut dyn Perception,
    ) -> bool {
        if now - self.last_interaction < self.config.interaction.cooldown_secs {
            return false;
        }

        let position = self.movement.position();
        let mut best: Option<(SeenObject, f32)> = None;
        for seen in world.objects_within(position, self.config.interaction.interaction_range) {
            let who = self.interactor(self.memory.value(&seen.interaction_id), world);
            if !world.can_interact(seen.handle, &who, now) {
                continue;
            }
            let interest = self.interest_in(&seen.interaction_id, now);
            if best.as_ref().is_none_or(|(_, top)| interest > *top) {
                best = Some((seen, interest));
            }
        }

        match best {
            Some((target, _)) => self.interact_with(&target, now, world),
            None => {
                if self.failed_interactions >= self.config.interaction.max_interaction_attempts {
                    return false;
                }
                let Some(point) = self.interests.best(position) else {
                    return false;
                };
                debug!(agent = %self.id, target = %point.position, "heading for interest point");
                self.movement.set_destination(point.position);
                self.failed_interactions += 1;
                true
            }
        }
    }

    /// Interact with `target`, walking there first when it is out of range.
    ///
    /// Returns true when the interaction succeeded or the walk started.
    pub fn interact_with(
        &mut self,
        target: &SeenObject,
        now: GameSeconds,
        world: &mut dyn Perception,
    ) -> bool {
        let Some(object_position) = world.object_position(target.handle) else {
            return false;
        };
        if self.movement.position().distance(&object_position)
            > self.config.interaction.interaction_range
        {
            if self.movement.set_destination(object_position) {
                self.pending_target = Some(target.clone());
                return true;
            }
            self.movement.wander_randomly();
            return false;
        }

        let who = self.interactor(self.memory.value(&target.interaction_id), world);
        self.events.push(SimEvent::InteractionStarted {
            agent: self.id,
            object: target.interaction_id.clone(),
        });
        let Some((result, animation)) = world.interact(target.handle, &who, now, &mut self.rng)
        else {
            return false;
        };

        self.last_interaction = now;
        if result.success {
            self.failed_interactions = 0;
        } else {
            self.failed_interactions = self.failed_interactions.saturating_add(1);
        }
        self.handle_interaction_completed(&target.interaction_id, &result, now);
        if let Some(animation) = animation {
            self.visuals.play_animation(&animation);
        }
        result.success
    }

    /// Apply an interaction outcome: emotion, memory and an event.
    pub fn handle_interaction_completed(
        &mut self,
        object: &str,
        result: &InteractionResult,
        now: GameSeconds,
    ) {
        let impact = result.signed_impact();
        self.emotions.modify(result.primary_emotion, impact);
        self.memory.record(&result.experience_id, result.success, result.emotional_impact, now);
        debug!(
            agent = %self.id,
            object,
            success = result.success,
            experience = %result.experience_id,
            "interaction completed"
        );
        self.events.push(SimEvent::InteractionCompleted {
            agent: self.id,
            object: object.to_string(),
            success: result.success,
            experience_id: result.experience_id.clone(),
            impact,
        });
    }

    // -----------------------------------------------------------------------
    // Peers
    // -----------------------------------------------------------------------

    /// Approach the best-liked peer in range, with probability
    /// `interaction_probability · score`.
    pub fn try_social(
        &mut self,
        now: GameSeconds,
        world: &dyn Perception,
    ) -> Option<SocialExchange> {
        let peers =
            world.peers_within(self.id, self.movement.position(), self.config.social.social_radius);
        let ids: Vec<AgentId> = peers.iter().map(|p| p.id).collect();
        let target = self.relationships.best_peer(&ids)?;
        let view = peers.iter().find(|p| p.id == target).copied()?;

        let score = self.relationships.get_or_create(target, now).overall_score();
        let draw: f32 = self.rng.r#gen();
        if draw >= self.config.social.interaction_probability * score {
            trace!(agent = %self.id, peer = %target, score, draw, "social approach skipped");
            return None;
        }
        Some(self.perform_social(&view, now))
    }

    /// Run one social interaction against a peer snapshot.
    pub fn perform_social(&mut self, peer: &PeerView, now: GameSeconds) -> SocialExchange {
        let dominant = self.emotions.dominant();
        let intensity = self.emotions.dominant_intensity();
        let record = self.relationships.get_or_create(peer.id, now).clone();

        let kind = relationship::choose_interaction_type(&record, dominant, intensity, &mut self.rng);
        let outcome = interaction::resolve_social(
            &record,
            kind,
            peer.dominant,
            peer.dominant_intensity,
            &mut self.rng,
        );

        self.visuals.play_animation(outcome.actor_animation);
        outcome.apply(&mut self.emotions);
        self.relationships.note_interaction(peer.id, now);
        let (trust, friendship) = interaction::relationship_deltas(
            outcome.success,
            self.config.social.interaction_impact_multiplier,
        );
        self.relationships.adjust(peer.id, trust, friendship, now);

        let mut shared = Vec::new();
        if outcome.share_experience {
            shared.extend(self.share_with(peer.id, now));
        } else if outcome.success {
            let roll: f32 = self.rng.r#gen();
            if roll < self.config.social.share_on_success_chance {
                shared.extend(self.share_with(peer.id, now));
            }
        }

        debug!(
            agent = %self.id,
            peer = %peer.id,
            ?kind,
            success = outcome.success,
            shared = shared.len(),
            "social interaction"
        );
        self.events.push(SimEvent::SocialInteraction {
            agent: self.id,
            peer: peer.id,
            kind,
            success: outcome.success,
        });

        SocialExchange {
            actor: self.id,
            peer: peer.id,
            kind,
            success: outcome.success,
            peer_animation: outcome.peer_animation,
            shared,
        }
    }

    fn share_with(&mut self, peer: AgentId, now: GameSeconds) -> Option<SharedExperience> {
        let id = self.memory.most_significant()?.to_string();
        let trust = self.relationships.get(peer).map_or(INITIAL_TRUST, |r| r.trust);
        let payload = self.memory.share_payload(&id, trust)?;
        self.relationships.record_shared_experience(peer, &id, now);
        Some(payload)
    }

    /// The peer side of an exchange: respond, note the meeting and learn
    /// whatever was shared.
    pub fn respond_to_social(&mut self, exchange: &SocialExchange, now: GameSeconds) {
        if let Some(animation) = exchange.peer_animation {
            self.visuals.play_animation(animation);
        }
        self.relationships.note_interaction(exchange.actor, now);
        for shared in &exchange.shared {
            self.memory.receive_shared(shared, now);
        }
        self.flush_engine_events();
    }

    // -----------------------------------------------------------------------
    // Host signals
    // -----------------------------------------------------------------------

    /// Switch between awake, asleep and hibernating.
    ///
    /// Leaving the awake state stops movement, drops queued actions and
    /// pauses decisions. Emotion decay keeps running.
    pub fn set_life_state(&mut self, state: LifeState) {
        if state == self.life_state {
            return;
        }
        self.life_state = state;
        match state {
            LifeState::Awake => {
                self.visuals.play_animation("WakeUp");
                self.cadences.decision.resume();
            }
            LifeState::Asleep | LifeState::Hibernating => {
                self.movement.stop_moving();
                self.actions.clear();
                self.pending_target = None;
                self.cadences.decision.pause();
                self.visuals.play_animation(if state == LifeState::Asleep {
                    "Sleep"
                } else {
                    "Hibernate"
                });
            }
        }
        info!(agent = %self.id, ?state, "life state changed");
        self.events.push(SimEvent::StateChanged { agent: self.id, state });
        self.track_movement_state();
    }

    /// React to a day/night phase change.
    pub fn on_time_of_day(&mut self, time: TimeOfDay) {
        let asleep = self.life_state != LifeState::Awake;
        self.needs.apply_time_of_day(time.phase, asleep, Some(&mut self.emotions));
        self.flush_engine_events();
    }

    /// Satisfy a need from outside (feeding, cleaning).
    pub fn fill_need(&mut self, need: NeedKind, amount: f32) {
        self.needs.fill(need, amount, Some(&mut self.emotions));
        self.flush_engine_events();
    }

    /// Walk somewhere on the host's behalf.
    pub fn set_destination(&mut self, target: Position) -> bool {
        self.pending_target = None;
        self.movement.set_destination(target)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    fn track_movement_state(&mut self) {
        let state = self.movement.movement_state();
        if state != self.last_movement_state {
            self.last_movement_state = state;
            self.events.push(SimEvent::MovementChanged { agent: self.id, state });
        }
    }

    fn flush_engine_events(&mut self) {
        let mut drained: Vec<EngineEvent> = Vec::new();
        drained.extend(self.emotions.drain_events());
        drained.extend(self.needs.drain_events());
        drained.extend(self.memory.drain_events());
        drained.extend(self.relationships.drain_events());

        for event in drained {
            if let EngineEvent::EmotionChanged { kind, value } = event {
                self.visuals.update_emotion_visuals(kind, value);
            }
            self.events.push(SimEvent::Engine { agent: self.id, event });
        }
    }

    /// Take every event queued since the last call.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Agent id.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current life state.
    #[must_use]
    pub fn life_state(&self) -> LifeState {
        self.life_state
    }

    /// Emotion model.
    #[must_use]
    pub fn emotions(&self) -> &EmotionModel {
        &self.emotions
    }

    /// Mutable emotion model, for host stimuli.
    pub fn emotions_mut(&mut self) -> &mut EmotionModel {
        &mut self.emotions
    }

    /// Needs model.
    #[must_use]
    pub fn needs(&self) -> &NeedsModel {
        &self.needs
    }

    /// Experience memory.
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Relationship ledger.
    #[must_use]
    pub fn relationships(&self) -> &RelationshipLedger {
        &self.relationships
    }

    /// Remembered interest points.
    #[must_use]
    pub fn interests(&self) -> &InterestMap {
        &self.interests
    }

    /// Most recent decision.
    #[must_use]
    pub fn last_decision(&self) -> Option<ActionKind> {
        self.last_decision
    }

    /// Actions waiting to run.
    #[must_use]
    pub fn queued_actions(&self) -> usize {
        self.actions.len()
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Position {
        self.movement.position()
    }

    /// Current movement state.
    #[must_use]
    pub fn movement_state(&self) -> MovementState {
        self.movement.movement_state()
    }

    /// How this agent looks to others at the start of a tick.
    #[must_use]
    pub fn peer_view(&self) -> PeerView {
        PeerView {
            id: self.id,
            position: self.movement.position(),
            dominant: self.emotions.dominant(),
            dominant_intensity: self.emotions.dominant_intensity(),
        }
    }
}

impl std::fmt::Debug for Minipoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Minipoll")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("life_state", &self.life_state)
            .field("dominant", &self.emotions.dominant())
            .field("memories", &self.memory.len())
            .field("relationships", &self.relationships.len())
            .finish_non_exhaustive()
    }
}
