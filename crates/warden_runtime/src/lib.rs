//! Warden Runtime - Headless Scenario Host
//!
//! Runs a scenario without an engine: a box world for raycasts and
//! navigable sampling, straight-line movers standing in for navigation
//! agents, a scripted player, and the trigger props that end a run.
//!
//! # Example
//!
//! ```ignore
//! use warden_runtime::prelude::*;
//!
//! let scenario = load_scenario("scenario.toml")?;
//! let mut sim = Simulation::from_scenario(&scenario)?;
//! while sim.session().outcome().is_playing() {
//!     sim.step(1.0 / 60.0);
//! }
//! println!("{}", serde_json::to_string_pretty(&sim.report())?);
//! ```

pub mod boot_config;
pub mod game_systems;
pub mod nav;
pub mod player;
pub mod scenario;
pub mod world;

pub mod prelude {
    pub use crate::boot_config::BootConfig;
    pub use crate::game_systems::{AgentReport, Simulation, SimulationReport};
    pub use crate::nav::KinematicNav;
    pub use crate::player::{KeyItem, PlayerController};
    pub use crate::scenario::{
        load_scenario, load_scenario_from_str, AgentDef, ScenarioDefinition, ScenarioError,
    };
    pub use crate::world::{Collider, SimWorld, Walkable};
}

pub use prelude::*;

/// Collision layer of walls and other static geometry
pub const LAYER_STATIC: u8 = 0;
/// Collision layer of the player and everything it carries
pub const LAYER_PLAYER: u8 = 1;
/// Collision layer of agents
pub const LAYER_AGENT: u8 = warden_ai::config::DEFAULT_AGENT_LAYER;
/// Collision layer of loose props
pub const LAYER_PROP: u8 = 3;
