//! Boot Configuration
//!
//! Decides which scenario to run and how long to run it.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. First positional command-line argument: `warden levels/yard.toml`
//! 2. Environment variable: `WARDEN_SCENARIO=levels/yard.toml`
//! 3. `scenario.toml` in the working directory
//! 4. The built-in courtyard scenario
//!
//! `WARDEN_TICKS` and `WARDEN_TICK_RATE` override the scenario's run length
//! and rate. Logging is controlled by `RUST_LOG`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scenario::{load_scenario, ScenarioDefinition, ScenarioError};

/// Scenario file picked up from the working directory
pub const DEFAULT_SCENARIO_FILE: &str = "scenario.toml";

/// Where the scenario came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSource {
    Argument(PathBuf),
    Environment(PathBuf),
    WorkingDirectory(PathBuf),
    Builtin,
}

impl ScenarioSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Argument(p) | Self::Environment(p) | Self::WorkingDirectory(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

impl std::fmt::Display for ScenarioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Argument(p) => write!(f, "{} (argument)", p.display()),
            Self::Environment(p) => write!(f, "{} (WARDEN_SCENARIO)", p.display()),
            Self::WorkingDirectory(p) => write!(f, "{} (working directory)", p.display()),
            Self::Builtin => write!(f, "built-in courtyard"),
        }
    }
}

/// Resolved boot configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootConfig {
    pub source: ScenarioSource,
    /// Overrides the scenario's `max_ticks`
    pub max_ticks: Option<u32>,
    /// Overrides the scenario's `tick_rate`
    pub tick_rate: Option<f32>,
}

impl BootConfig {
    /// Resolve from the process arguments, environment and working directory
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let config = Self::from_sources(&args, |key| std::env::var(key).ok(), |path| path.exists());
        log::info!("Scenario source: {}", config.source);
        config
    }

    /// Resolve from explicit sources
    pub fn from_sources<E, F>(args: &[String], env: E, file_exists: F) -> Self
    where
        E: Fn(&str) -> Option<String>,
        F: Fn(&Path) -> bool,
    {
        let source = if let Some(arg) = args.iter().find(|a| !a.starts_with("--")) {
            ScenarioSource::Argument(PathBuf::from(arg))
        } else if let Some(path) = env("WARDEN_SCENARIO").filter(|p| !p.is_empty()) {
            ScenarioSource::Environment(PathBuf::from(path))
        } else if file_exists(Path::new(DEFAULT_SCENARIO_FILE)) {
            ScenarioSource::WorkingDirectory(PathBuf::from(DEFAULT_SCENARIO_FILE))
        } else {
            ScenarioSource::Builtin
        };

        let max_ticks = env("WARDEN_TICKS").and_then(|v| match v.parse() {
            Ok(ticks) => Some(ticks),
            Err(_) => {
                log::warn!("Ignoring WARDEN_TICKS={:?}: not a tick count", v);
                None
            }
        });

        let tick_rate = env("WARDEN_TICK_RATE").and_then(|v| match v.parse::<f32>() {
            Ok(rate) if rate > 0.0 => Some(rate),
            _ => {
                log::warn!("Ignoring WARDEN_TICK_RATE={:?}: not a positive rate", v);
                None
            }
        });

        Self {
            source,
            max_ticks,
            tick_rate,
        }
    }

    /// Load the selected scenario and apply run overrides
    pub fn load_scenario(&self) -> Result<ScenarioDefinition, ScenarioError> {
        let mut scenario = match self.source.path() {
            Some(path) => load_scenario(path)?,
            None => ScenarioDefinition::builtin()?,
        };

        if let Some(ticks) = self.max_ticks {
            scenario.run.max_ticks = ticks;
        }
        if let Some(rate) = self.tick_rate {
            scenario.run.tick_rate = rate;
        }

        log::info!(
            "Loaded scenario '{}': {} agents, {} Hz, up to {} ticks",
            scenario.metadata.name,
            scenario.agents.len(),
            scenario.run.tick_rate,
            scenario.run.max_ticks
        );
        Ok(scenario)
    }
}
