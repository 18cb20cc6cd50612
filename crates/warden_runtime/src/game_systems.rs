//! Game Systems Integration
//!
//! Wires agents, triggers, level props and the run session together and
//! advances them one fixed tick at a time.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::Serialize;
use warden_ai::brain::{AgentBrain, AgentContext, StateTransition};
use warden_ai::perception::AgentPose;
use warden_ai::profile::BehaviorProfile;
use warden_gamestate::{GameSession, HudText, Outcome, SessionSignal};
use warden_triggers::prelude::*;

use crate::nav::KinematicNav;
use crate::player::{KeyItem, PlayerController};
use crate::scenario::{ScenarioDefinition, ScenarioError};
use crate::world::{Collider, SimWorld};
use crate::{LAYER_AGENT, LAYER_PLAYER, LAYER_PROP, LAYER_STATIC};

/// Half extents of the box standing in for a character body
const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.9, 0.4);
/// Half extents of the key item collider
const KEY_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.1, 0.1);

fn body_center(position: Vec3) -> Vec3 {
    position + Vec3::Y * BODY_HALF_EXTENTS.y
}

/// What a trigger means to the level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerRole {
    /// Player touching this agent loses the run
    Tag { agent: usize },
    /// A held key item scares this agent
    Scare { agent: usize },
    /// Key plate that opens the gate
    Plate,
    /// Reaching it wins the run
    Goal,
}

/// Hands out trigger ids no scenario entity uses
struct TriggerIds {
    last: u64,
}

impl TriggerIds {
    fn above(ids: &[u64]) -> Self {
        Self {
            last: ids.iter().copied().max().unwrap_or(0),
        }
    }

    fn next(&mut self) -> Result<u64, ScenarioError> {
        self.last = self.last.checked_add(1).ok_or_else(|| {
            ScenarioError::Invalid("entity ids leave no room for agent trigger volumes".to_string())
        })?;
        Ok(self.last)
    }
}

struct AgentSlot {
    brain: AgentBrain,
    nav: KinematicNav,
    tagger: Tagger,
    tag_trigger: Option<u64>,
    scare_trigger: Option<u64>,
    transitions: u32,
}

impl AgentSlot {
    fn pose(&self) -> AgentPose {
        AgentPose::new(self.nav.position(), self.nav.forward())
    }
}

struct GateSlot {
    entity: u64,
    gate: Gate,
    half_extents: Vec3,
}

impl GateSlot {
    fn collider_center(&self) -> Vec3 {
        self.gate.position() + Vec3::Y * self.half_extents.y
    }
}

/// Per-agent summary
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub id: u64,
    pub profile: BehaviorProfile,
    pub state: &'static str,
    pub patrol_index: usize,
    pub transitions: u32,
    pub position: [f32; 3],
    pub distance_travelled: f32,
}

/// Summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub outcome: Outcome,
    pub ticks: u64,
    pub elapsed: f32,
    pub best_time: Option<f32>,
    pub hud: HudText,
    pub gate_open: bool,
    pub key_held: bool,
    pub player_position: [f32; 3],
    pub agents: Vec<AgentReport>,
}

/// A running scenario
pub struct Simulation {
    name: String,
    session: GameSession,
    world: SimWorld,
    triggers: TriggerSystem,
    roles: BTreeMap<u64, TriggerRole>,
    static_trigger_positions: Vec<(u64, Vec3)>,
    player: PlayerController,
    key_item: Option<KeyItem>,
    bumper: Option<Bumper>,
    gate: Option<GateSlot>,
    agents: Vec<AgentSlot>,
    ticks: u64,
    transitions: Vec<StateTransition>,
}

impl Simulation {
    /// Build every entity the scenario declares
    pub fn from_scenario(scenario: &ScenarioDefinition) -> Result<Self, ScenarioError> {
        scenario.validate()?;

        let mut world = SimWorld::new(scenario.world.walkable);
        for wall in &scenario.world.walls {
            let collider = Collider::solid(wall.center, wall.half_extents, LAYER_STATIC);
            world.add_collider(wall.id, collider);
        }

        let def = &scenario.player;
        let player = PlayerController::new(def.id, def.position, def.speed, def.path.clone());
        world.add_collider(
            player.entity,
            Collider::body(body_center(player.position), BODY_HALF_EXTENTS, LAYER_PLAYER),
        );

        let key_item = scenario.key_item.as_ref().map(|def| {
            let mut key = KeyItem::new(def.id, def.position);
            key.pickup_radius = def.pickup_radius;
            if scenario.player.holding_key {
                key = key.held_by(&player);
                world.attach(key.entity, player.entity);
            }
            let collider = Collider::body(key.position, KEY_HALF_EXTENTS, LAYER_PROP);
            world.add_collider(key.entity, collider);
            key
        });

        let mut sim = Self {
            name: scenario.metadata.name.clone(),
            session: GameSession::new(),
            world,
            triggers: TriggerSystem::new(),
            roles: BTreeMap::new(),
            static_trigger_positions: Vec::new(),
            player,
            key_item,
            bumper: None,
            gate: None,
            agents: Vec::new(),
            ticks: 0,
            transitions: Vec::new(),
        };

        if let Some(def) = &scenario.gate {
            let slot = GateSlot {
                entity: def.id,
                gate: Gate::new(def.position, def.open_height, def.speed),
                half_extents: def.half_extents,
            };
            sim.world.add_collider(
                slot.entity,
                Collider::solid(slot.collider_center(), slot.half_extents, LAYER_STATIC),
            );
            sim.gate = Some(slot);
        }

        if let Some(def) = &scenario.plate {
            let trigger = Trigger::new(TriggerVolume::sphere(def.radius))
                .with_filter(TriggerFilter::new().with_tag(KEY_ITEM_TAG));
            sim.add_static_trigger(def.id, def.position, trigger, TriggerRole::Plate);
            sim.bumper = Some(
                Bumper::new(KEY_ITEM_TAG)
                    .with_require_held(def.require_held)
                    .with_fire_once(def.fire_once),
            );
        }

        if let Some(def) = &scenario.goal {
            let trigger = Trigger::new(TriggerVolume::Box {
                half_extents: def.half_extents,
            })
            .with_filter(TriggerFilter::player_only());
            sim.add_static_trigger(def.id, def.position, trigger, TriggerRole::Goal);
        }

        // Agent trigger ids are allocated above every scenario id
        let mut trigger_ids = TriggerIds::above(&scenario.entity_ids());

        for def in &scenario.agents {
            let mut brain = AgentBrain::new(def.id, def.config(), def.route())
                .map_err(|source| ScenarioError::Agent { id: def.id, source })?;
            let mut nav = KinematicNav::new(def.position, def.forward)
                .with_stopping_distance(def.stopping_distance);
            brain.start(&mut nav);
            sim.world.add_collider(
                def.id,
                Collider::body(body_center(def.position), BODY_HALF_EXTENTS, LAYER_AGENT),
            );

            let index = sim.agents.len();
            let tag_trigger = match def.effective_tag_radius() {
                Some(radius) => {
                    let id = trigger_ids.next()?;
                    let trigger = Trigger::new(TriggerVolume::sphere(radius))
                        .with_filter(TriggerFilter::player_only());
                    sim.triggers.register_trigger(id, trigger);
                    sim.roles.insert(id, TriggerRole::Tag { agent: index });
                    Some(id)
                }
                None => None,
            };
            let scare_trigger = match def.effective_scare_radius() {
                Some(radius) => {
                    let id = trigger_ids.next()?;
                    let trigger = Trigger::new(TriggerVolume::sphere(radius))
                        .with_filter(TriggerFilter::new().with_tag(KEY_ITEM_TAG));
                    sim.triggers.register_trigger(id, trigger);
                    sim.roles.insert(id, TriggerRole::Scare { agent: index });
                    Some(id)
                }
                None => None,
            };

            sim.agents.push(AgentSlot {
                brain,
                nav,
                tagger: Tagger::default(),
                tag_trigger,
                scare_trigger,
                transitions: 0,
            });
        }

        log::info!(
            "Simulation '{}' ready: {} agents, {} triggers, {} colliders",
            sim.name,
            sim.agents.len(),
            sim.triggers.trigger_count(),
            sim.world.collider_count()
        );
        Ok(sim)
    }

    fn add_static_trigger(&mut self, id: u64, position: Vec3, trigger: Trigger, role: TriggerRole) {
        self.triggers.register_trigger(id, trigger);
        self.static_trigger_positions.push((id, position));
        self.roles.insert(id, role);
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn key_item(&self) -> Option<&KeyItem> {
        self.key_item.as_ref()
    }

    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref().map(|slot| &slot.gate)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Every agent transition so far, in order
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn agent(&self, id: u64) -> Option<&AgentBrain> {
        self.agents
            .iter()
            .map(|slot| &slot.brain)
            .find(|brain| brain.entity() == id)
    }

    pub fn agent_nav(&self, id: u64) -> Option<&KinematicNav> {
        self.agents
            .iter()
            .find(|slot| slot.brain.entity() == id)
            .map(|slot| &slot.nav)
    }

    /// Advance the whole level by one tick
    ///
    /// Order: session timer, player, triggers, gate, agents. Nothing moves
    /// once the run is decided.
    pub fn step(&mut self, delta_time: f32) {
        if self.session.outcome().is_decided() {
            return;
        }
        let dt = delta_time.max(0.0);
        self.ticks += 1;
        self.session.tick(dt);

        self.update_player(dt);
        self.process_triggers(dt);
        if self.session.outcome().is_decided() {
            return;
        }

        if let Some(slot) = &mut self.gate {
            slot.gate.update(dt);
            let center = slot.collider_center();
            self.world.set_collider_center(slot.entity, center);
        }

        self.update_agents(dt);
    }

    /// Step until the run is decided or `max_ticks` have passed
    pub fn run(&mut self, delta_time: f32, max_ticks: u32) -> Outcome {
        for _ in 0..max_ticks {
            if self.session.outcome().is_decided() {
                break;
            }
            self.step(delta_time);
        }
        self.session.outcome()
    }

    fn update_player(&mut self, dt: f32) {
        self.player.advance(dt, &self.world);
        self.world
            .set_collider_center(self.player.entity, body_center(self.player.position));

        if let Some(key) = &mut self.key_item {
            if key.follow(&self.player) {
                self.world.attach(key.entity, self.player.entity);
            }
            self.world.set_collider_center(key.entity, key.position);
        }
    }

    fn process_triggers(&mut self, dt: f32) {
        let mut positions = self.static_trigger_positions.clone();
        for slot in &self.agents {
            let position = slot.nav.position();
            positions.extend(slot.tag_trigger.map(|id| (id, position)));
            positions.extend(slot.scare_trigger.map(|id| (id, position)));
        }

        let mut interactors = vec![self.player.trigger_entity()];
        interactors.extend(self.key_item.as_ref().map(KeyItem::trigger_entity));

        let events = self.triggers.update(dt, &positions, &interactors);
        for event in events.iter().filter(|e| e.is_enter()) {
            let Some(role) = self.roles.get(&event.trigger_entity).copied() else {
                continue;
            };
            self.route_event(role, event);
        }
    }

    fn route_event(&mut self, role: TriggerRole, event: &TriggerEvent) {
        match role {
            TriggerRole::Tag { agent } => {
                let Some(slot) = self.agents.get_mut(agent) else {
                    return;
                };
                if slot.tagger.on_trigger_enter(event) {
                    log::info!("Player tagged by agent {}", slot.brain.entity());
                    self.session.apply(SessionSignal::Lose);
                }
            }
            TriggerRole::Scare { agent } => {
                let Some(slot) = self.agents.get_mut(agent) else {
                    return;
                };
                let pose = slot.pose();
                let target = Some(self.player.target());
                let mut ctx = AgentContext::new(pose, target, &mut slot.nav, &self.world);
                if let Some(transition) = slot.brain.on_trigger_enter(event, &mut ctx) {
                    slot.transitions += 1;
                    self.transitions.push(transition);
                }
            }
            TriggerRole::Plate => {
                let Some(bumper) = &mut self.bumper else {
                    return;
                };
                if bumper.on_trigger_enter(event) {
                    if let Some(slot) = &mut self.gate {
                        slot.gate.open();
                        log::info!("Gate {} opening", slot.entity);
                    }
                }
            }
            TriggerRole::Goal => {
                if event.has_tag(PLAYER_TAG) {
                    self.session.apply(SessionSignal::Win);
                }
            }
        }
    }

    fn update_agents(&mut self, dt: f32) {
        let target = Some(self.player.target());
        for slot in &mut self.agents {
            let pose = slot.pose();
            let mut ctx = AgentContext::new(pose, target, &mut slot.nav, &self.world);
            if let Some(transition) = slot.brain.tick(dt, &mut ctx) {
                slot.transitions += 1;
                self.transitions.push(transition);
            }

            slot.nav.advance(dt);
            self.world
                .set_collider_center(slot.brain.entity(), body_center(slot.nav.position()));
        }
    }

    /// Snapshot for logging and tests
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            scenario: self.name.clone(),
            outcome: self.session.outcome(),
            ticks: self.ticks,
            elapsed: self.session.elapsed(),
            best_time: self.session.best_time(),
            hud: HudText::from_session(&self.session),
            gate_open: self.gate.as_ref().is_some_and(|slot| slot.gate.is_open()),
            key_held: self.key_item.as_ref().is_some_and(|key| key.held),
            player_position: self.player.position.to_array(),
            agents: self
                .agents
                .iter()
                .map(|slot| AgentReport {
                    id: slot.brain.entity(),
                    profile: slot.brain.profile(),
                    state: slot.brain.state().name(),
                    patrol_index: slot.brain.patrol_index(),
                    transitions: slot.transitions,
                    position: slot.nav.position().to_array(),
                    distance_travelled: slot.nav.distance_travelled(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::load_scenario_from_str;
    use warden_ai::brain::AgentState;

    const DT: f32 = 0.1;

    #[test]
    fn test_builtin_scenario_builds() {
        let scenario = ScenarioDefinition::builtin().unwrap();
        let sim = Simulation::from_scenario(&scenario).unwrap();
        assert_eq!(sim.report().agents.len(), 3);
        assert!(sim.gate().is_some_and(|g| !g.is_open()));
    }

    #[test]
    fn test_goal_wins() {
        let scenario = load_scenario_from_str(
            r#"
            [player]
            id = 1
            position = [0.0, 0.0, 0.0]
            speed = 4.0
            path = [[0.0, 0.0, 6.0]]

            [goal]
            id = 9
            position = [0.0, 1.0, 5.0]
            half_extents = [1.0, 1.0, 1.0]
            "#,
        )
        .unwrap();
        let mut sim = Simulation::from_scenario(&scenario).unwrap();

        assert_eq!(sim.run(DT, 100), Outcome::Won);
        let report = sim.report();
        assert!(report.best_time.is_some());

        // Frozen once decided
        let ticks = sim.ticks();
        sim.step(DT);
        assert_eq!(sim.ticks(), ticks);
    }

    const ID_CLASH: &str = r#"
        [player]
        id = 1
        position = [0.0, 0.0, 0.0]
        speed = 0.0

        [plate]
        id = 4294967496
        position = [5.0, 0.0, 5.0]
        radius = 1.0

        [[agents]]
        id = 100
        profile = "triggerable_guard"
        position = [0.0, 0.0, -5.0]
        route = [[0.0, 0.0, -5.0]]

        [[agents]]
        id = 9223372036854775000
        profile = "triggerable_guard"
        position = [5.0, 0.0, -5.0]
        route = [[5.0, 0.0, -5.0]]
    "#;

    #[test]
    fn test_agent_triggers_keep_clear_of_scenario_ids() {
        let scenario = load_scenario_from_str(ID_CLASH).unwrap();
        let sim = Simulation::from_scenario(&scenario).unwrap();

        assert_eq!(sim.roles.get(&4294967496), Some(&TriggerRole::Plate));
        let agent_triggers: Vec<u64> = sim
            .roles
            .iter()
            .filter(|(_, role)| !matches!(role, TriggerRole::Plate))
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(agent_triggers.len(), 4);
        assert!(agent_triggers.iter().all(|id| *id > 9223372036854775000));
        assert_eq!(sim.triggers.trigger_count(), 5);
    }

    #[test]
    fn test_exhausted_trigger_ids_rejected() {
        let mut scenario = load_scenario_from_str(ID_CLASH).unwrap();
        scenario.agents[1].id = u64::MAX;
        assert!(matches!(
            Simulation::from_scenario(&scenario),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_inverted_walkable_does_not_panic() {
        let mut scenario = load_scenario_from_str(
            r#"
            [player]
            id = 1
            position = [0.0, 0.0, 4.0]
            speed = 0.0

            [[agents]]
            id = 100
            profile = "wary_evader"
            position = [0.0, 0.0, 0.0]
            route = [[0.0, 0.0, 0.0]]
            "#,
        )
        .unwrap();
        let mut sim = Simulation::from_scenario(&scenario).unwrap();

        // Built around validation, the world still samples without panicking
        scenario.world.walkable.min = glam::Vec2::splat(5.0);
        scenario.world.walkable.max = glam::Vec2::splat(-5.0);
        sim.world = SimWorld::new(scenario.world.walkable);
        sim.step(DT);
        assert_eq!(sim.agent(100).map(AgentBrain::state), Some(AgentState::Flee));
    }

    #[test]
    fn test_guard_contact_loses() {
        let scenario = load_scenario_from_str(
            r#"
            [player]
            id = 1
            position = [0.0, 0.0, 0.0]
            speed = 2.0
            path = [[0.0, 0.0, 3.0]]

            [[agents]]
            id = 100
            profile = "standard_guard"
            position = [0.0, 0.0, 5.0]
            forward = [0.0, 0.0, -1.0]
            route = [[0.0, 0.0, 5.0]]
            "#,
        )
        .unwrap();
        let mut sim = Simulation::from_scenario(&scenario).unwrap();

        assert_eq!(sim.run(DT, 200), Outcome::Lost);
        assert_eq!(
            sim.transitions().first().map(|t| t.to),
            Some(AgentState::Seek)
        );
    }
}
