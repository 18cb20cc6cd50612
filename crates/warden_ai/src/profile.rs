//! Behavior profiles

use serde::{Deserialize, Serialize};

use crate::brain::AgentState;

/// Which reactions an agent has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorProfile {
    /// Flees when it sees the target
    WaryEvader,
    /// Pursues when it sees the target
    #[default]
    StandardGuard,
    /// Pursues when it sees the target, flees from trigger events
    TriggerableGuard,
}

/// Capability flags derived from a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_seek: bool,
    pub flee_on_sight: bool,
    pub flee_on_trigger: bool,
}

impl BehaviorProfile {
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::WaryEvader => Capabilities {
                can_seek: false,
                flee_on_sight: true,
                flee_on_trigger: false,
            },
            Self::StandardGuard => Capabilities {
                can_seek: true,
                flee_on_sight: false,
                flee_on_trigger: false,
            },
            Self::TriggerableGuard => Capabilities {
                can_seek: true,
                flee_on_sight: false,
                flee_on_trigger: true,
            },
        }
    }

    /// Whether an agent with this profile can ever be in `state`
    pub fn allows(self, state: AgentState) -> bool {
        let caps = self.capabilities();
        match state {
            AgentState::Patrol | AgentState::Return { .. } => true,
            AgentState::Seek => caps.can_seek,
            AgentState::Flee => caps.flee_on_sight || caps.flee_on_trigger,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::WaryEvader => "wary_evader",
            Self::StandardGuard => "standard_guard",
            Self::TriggerableGuard => "triggerable_guard",
        }
    }
}

impl std::fmt::Display for BehaviorProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
