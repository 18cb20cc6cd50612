//! Warden - headless scenario runner
//!
//! Loads a scenario, steps it at a fixed rate until the run is won, lost or
//! out of ticks, and logs a JSON summary.

use warden_runtime::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Warden runtime v{}", env!("CARGO_PKG_VERSION"));

    let boot = BootConfig::load();
    let scenario = match boot.load_scenario() {
        Ok(scenario) => scenario,
        Err(e) => {
            log::error!("Failed to load scenario from {}: {}", boot.source, e);
            std::process::exit(1);
        }
    };

    let mut sim = match Simulation::from_scenario(&scenario) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Failed to build scenario '{}': {}", scenario.metadata.name, e);
            std::process::exit(1);
        }
    };

    let delta_time = 1.0 / scenario.run.tick_rate;
    let outcome = sim.run(delta_time, scenario.run.max_ticks);

    for transition in sim.transitions() {
        log::debug!(
            "Agent {}: {} -> {} ({:?})",
            transition.agent,
            transition.from.name(),
            transition.to.name(),
            transition.reason
        );
    }

    for change in sim.session_mut().drain_transitions() {
        log::info!("Run {:?} -> {:?} at {:.2} s", change.from, change.to, change.elapsed);
    }

    if outcome.is_playing() {
        log::warn!("Run undecided after {} ticks", sim.ticks());
    }

    match serde_json::to_string_pretty(&sim.report()) {
        Ok(json) => log::info!("Run summary:\n{}", json),
        Err(e) => log::error!("Failed to serialize run summary: {}", e),
    }
}
