//! Scenario Definitions
//!
//! A scenario describes one level in TOML: the walkable floor and walls, the
//! scripted player, the key item, the plate and gate it opens, the goal, and
//! every agent with its route and tuning.
//!
//! # Example
//!
//! ```toml
//! [metadata]
//! name = "corridor"
//!
//! [player]
//! id = 1
//! position = [0.0, 0.0, -8.0]
//! speed = 3.0
//! path = [[0.0, 0.0, 8.0]]
//!
//! [[agents]]
//! id = 100
//! profile = "standard_guard"
//! position = [6.0, 0.0, 0.0]
//! route = [[6.0, 0.0, 0.0], [6.0, 0.0, 6.0]]
//!
//! [agents.tuning]
//! view_distance = 8.0
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_ai::config::AgentConfig;
use warden_ai::error::AiError;
use warden_ai::patrol::PatrolRoute;
use warden_ai::profile::BehaviorProfile;

use crate::world::Walkable;

/// Scenario shipped with the binary
const BUILTIN_SCENARIO: &str = include_str!("../scenarios/courtyard.toml");

/// Tag volume radius for pursuing agents that do not set one
pub const DEFAULT_TAG_RADIUS: f32 = 1.0;
/// Scare volume radius for trigger-fleeing agents that do not set one
pub const DEFAULT_SCARE_RADIUS: f32 = 3.0;

/// Error type for scenario loading
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid scenario: {0}")]
    Invalid(String),

    #[error("Agent {id}: {source}")]
    Agent {
        id: u64,
        #[source]
        source: AiError,
    },
}

/// Complete scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    #[serde(default)]
    pub metadata: ScenarioMetadata,
    #[serde(default)]
    pub run: RunDef,
    #[serde(default)]
    pub world: WorldDef,
    pub player: PlayerDef,
    #[serde(default)]
    pub key_item: Option<KeyItemDef>,
    #[serde(default)]
    pub plate: Option<PlateDef>,
    #[serde(default)]
    pub gate: Option<GateDef>,
    #[serde(default)]
    pub goal: Option<GoalDef>,
    #[serde(default)]
    pub agents: Vec<AgentDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Run length and rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDef {
    /// Ticks per second
    pub tick_rate: f32,
    /// Hard stop if the run is still undecided
    pub max_ticks: u32,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldDef {
    #[serde(default)]
    pub walkable: Walkable,
    #[serde(default)]
    pub walls: Vec<WallDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallDef {
    pub id: u64,
    pub center: Vec3,
    pub half_extents: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    pub id: u64,
    pub position: Vec3,
    pub speed: f32,
    #[serde(default)]
    pub path: Vec<Vec3>,
    /// Start the run already holding the key item
    #[serde(default)]
    pub holding_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyItemDef {
    pub id: u64,
    pub position: Vec3,
    #[serde(default = "default_pickup_radius")]
    pub pickup_radius: f32,
}

fn default_pickup_radius() -> f32 {
    0.75
}

/// Plate that opens the gate when the key item is pushed into it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateDef {
    pub id: u64,
    pub position: Vec3,
    pub radius: f32,
    #[serde(default = "default_true")]
    pub require_held: bool,
    #[serde(default = "default_true")]
    pub fire_once: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateDef {
    pub id: u64,
    /// Base of the gate when closed
    pub position: Vec3,
    pub half_extents: Vec3,
    pub open_height: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDef {
    pub id: u64,
    pub position: Vec3,
    pub half_extents: Vec3,
}

/// One agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDef {
    pub id: u64,
    pub profile: BehaviorProfile,
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    #[serde(default)]
    pub route: Vec<Vec3>,
    /// Radius of the volume that tags the player on contact
    #[serde(default)]
    pub tag_radius: Option<f32>,
    /// Radius of the volume a held key item scares the agent from
    #[serde(default)]
    pub scare_radius: Option<f32>,
    /// Distance short of the destination at which the mover stops
    #[serde(default)]
    pub stopping_distance: f32,
    #[serde(default)]
    pub tuning: AgentTuning,
}

fn default_forward() -> Vec3 {
    Vec3::Z
}

/// Per-agent overrides on top of the profile's stock tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    pub view_distance: Option<f32>,
    pub view_angle: Option<f32>,
    pub eye_height: Option<f32>,
    pub waypoint_tolerance: Option<f32>,
    pub repath_every: Option<f32>,
    pub lose_after_seconds: Option<f32>,
    pub patrol_speed: Option<f32>,
    pub seek_speed: Option<f32>,
    pub flee_speed: Option<f32>,
    pub flee_distance: Option<f32>,
    pub flee_duration: Option<f32>,
    pub flee_half_steps: Option<u32>,
}

impl AgentTuning {
    /// Apply the overrides to a configuration
    pub fn apply(&self, mut config: AgentConfig) -> AgentConfig {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut config.perception.view_distance, self.view_distance);
        set(&mut config.perception.view_angle, self.view_angle);
        set(&mut config.perception.eye_height, self.eye_height);
        set(&mut config.waypoint_tolerance, self.waypoint_tolerance);
        set(&mut config.repath_every, self.repath_every);
        set(&mut config.lose_after_seconds, self.lose_after_seconds);
        set(&mut config.speeds.patrol, self.patrol_speed);
        set(&mut config.speeds.flee, self.flee_speed);
        set(&mut config.flee_distance, self.flee_distance);
        set(&mut config.flee_duration, self.flee_duration);
        set(&mut config.flee_search.half_steps, self.flee_half_steps);
        if self.seek_speed.is_some() {
            config.speeds.seek = self.seek_speed;
        }
        config
    }
}

impl AgentDef {
    /// Profile tuning with this agent's overrides applied
    pub fn config(&self) -> AgentConfig {
        self.tuning.apply(AgentConfig::for_profile(self.profile))
    }

    pub fn route(&self) -> PatrolRoute {
        PatrolRoute::new(self.route.clone())
    }

    /// Tag volume radius, defaulting for pursuing profiles
    pub fn effective_tag_radius(&self) -> Option<f32> {
        self.tag_radius
            .or_else(|| self.profile.capabilities().can_seek.then_some(DEFAULT_TAG_RADIUS))
    }

    /// Scare volume radius, defaulting for trigger-fleeing profiles
    pub fn effective_scare_radius(&self) -> Option<f32> {
        self.scare_radius.or_else(|| {
            self.profile
                .capabilities()
                .flee_on_trigger
                .then_some(DEFAULT_SCARE_RADIUS)
        })
    }
}

impl ScenarioDefinition {
    /// The scenario shipped with the binary
    pub fn builtin() -> Result<Self, ScenarioError> {
        load_scenario_from_str(BUILTIN_SCENARIO)
    }

    /// Check ids, rates and agent tuning
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.run.tick_rate > 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "tick rate must be positive, got {}",
                self.run.tick_rate
            )));
        }
        if !(self.player.speed >= 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "player speed must be non-negative, got {}",
                self.player.speed
            )));
        }
        let walkable = &self.world.walkable;
        if !(walkable.min.is_finite() && walkable.max.is_finite() && walkable.ground_y.is_finite())
            || walkable.min.x > walkable.max.x
            || walkable.min.y > walkable.max.y
        {
            return Err(ScenarioError::Invalid(format!(
                "walkable area must be finite with min <= max, got {} .. {}",
                walkable.min, walkable.max
            )));
        }
        if self.player.holding_key && self.key_item.is_none() {
            return Err(ScenarioError::Invalid(
                "player holds a key item but none is defined".to_string(),
            ));
        }

        let mut ids = BTreeSet::new();
        for id in self.entity_ids() {
            if !ids.insert(id) {
                return Err(ScenarioError::Invalid(format!("duplicate entity id {}", id)));
            }
        }

        for agent in &self.agents {
            if !(agent.stopping_distance >= 0.0) {
                return Err(ScenarioError::Invalid(format!(
                    "agent {} stopping distance must be non-negative, got {}",
                    agent.id, agent.stopping_distance
                )));
            }
            agent
                .config()
                .validate()
                .map_err(|source| ScenarioError::Agent { id: agent.id, source })?;
        }
        Ok(())
    }

    /// Every entity id the scenario declares
    pub fn entity_ids(&self) -> Vec<u64> {
        let mut ids = vec![self.player.id];
        ids.extend(self.world.walls.iter().map(|w| w.id));
        ids.extend(self.key_item.iter().map(|k| k.id));
        ids.extend(self.plate.iter().map(|p| p.id));
        ids.extend(self.gate.iter().map(|g| g.id));
        ids.extend(self.goal.iter().map(|g| g.id));
        ids.extend(self.agents.iter().map(|a| a.id));
        ids
    }
}

/// Load and validate a scenario file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioDefinition, ScenarioError> {
    let content = std::fs::read_to_string(path)?;
    load_scenario_from_str(&content)
}

/// Parse and validate a scenario from TOML text
pub fn load_scenario_from_str(content: &str) -> Result<ScenarioDefinition, ScenarioError> {
    let scenario: ScenarioDefinition = toml::from_str(content)?;
    scenario.validate()?;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [player]
        id = 1
        position = [0.0, 0.0, 0.0]
        speed = 3.0

        [[agents]]
        id = 100
        profile = "wary_evader"
        position = [4.0, 0.0, 4.0]
        route = [[4.0, 0.0, 4.0], [8.0, 0.0, 4.0]]

        [agents.tuning]
        flee_distance = 9.0
    "#;

    #[test]
    fn test_builtin_scenario_loads() {
        let scenario = ScenarioDefinition::builtin().unwrap();
        assert!(!scenario.agents.is_empty());
        assert!(scenario.gate.is_some());
        assert!(scenario.goal.is_some());
    }

    #[test]
    fn test_minimal_scenario_defaults() {
        let scenario = load_scenario_from_str(MINIMAL).unwrap();
        assert_eq!(scenario.run, RunDef::default());
        assert!(scenario.key_item.is_none());

        let agent = &scenario.agents[0];
        assert_eq!(agent.forward, Vec3::Z);
        assert_eq!(agent.route().len(), 2);
        assert_eq!(agent.effective_tag_radius(), None);
        assert_eq!(agent.effective_scare_radius(), None);

        let config = agent.config();
        assert_eq!(config.flee_distance, 9.0);
        assert_eq!(config.perception.view_distance, 12.0);
    }

    #[test]
    fn test_guard_radius_defaults() {
        let agent = AgentDef {
            id: 5,
            profile: BehaviorProfile::TriggerableGuard,
            position: Vec3::ZERO,
            forward: Vec3::Z,
            route: Vec::new(),
            tag_radius: None,
            scare_radius: Some(2.0),
            stopping_distance: 0.0,
            tuning: AgentTuning::default(),
        };
        assert_eq!(agent.effective_tag_radius(), Some(DEFAULT_TAG_RADIUS));
        assert_eq!(agent.effective_scare_radius(), Some(2.0));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = MINIMAL.replace("id = 100", "id = 1");
        assert!(matches!(
            load_scenario_from_str(&content),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_agent_tuning_rejected() {
        let content = MINIMAL.replace("flee_distance = 9.0", "view_angle = 270.0");
        match load_scenario_from_str(&content) {
            Err(ScenarioError::Agent { id, source }) => {
                assert_eq!(id, 100);
                assert_eq!(source, AiError::InvalidViewAngle(270.0));
            }
            other => panic!("expected agent error, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_walkable_rejected() {
        let content = format!(
            "[world.walkable]\nmin = [5.0, 5.0]\nmax = [-5.0, -5.0]\n{}",
            MINIMAL
        );
        assert!(matches!(
            load_scenario_from_str(&content),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_non_finite_walkable_rejected() {
        let content = format!(
            "[world.walkable]\nmin = [-5.0, nan]\nmax = [5.0, 5.0]\n{}",
            MINIMAL
        );
        assert!(matches!(
            load_scenario_from_str(&content),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_negative_stopping_distance_rejected() {
        let content =
            MINIMAL.replace("[agents.tuning]", "stopping_distance = -1.0\n\n[agents.tuning]");
        assert!(matches!(
            load_scenario_from_str(&content),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            load_scenario_from_str("[player\nid = 1"),
            Err(ScenarioError::Parse(_))
        ));
    }

    #[test]
    fn test_tuning_overrides_seek_speed() {
        let tuning = AgentTuning {
            seek_speed: Some(5.0),
            lose_after_seconds: Some(2.0),
            ..Default::default()
        };
        let config = tuning.apply(AgentConfig::for_profile(BehaviorProfile::StandardGuard));
        assert_eq!(config.speeds.seek, Some(5.0));
        assert_eq!(config.lose_after_seconds, 2.0);
        assert_eq!(config.repath_every, 0.2);
    }
}
