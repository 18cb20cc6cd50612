//! Warden AI - Agent Behavior Core
//!
//! This crate provides the per-agent behavior of non-player characters:
//! perception, flee-point search, patrol routes and the state machine that
//! ties them together. Navigation and spatial queries are external
//! collaborators reached through the [`NavigationAgent`] and
//! [`SpatialQuery`] traits; the core never computes paths itself.
//!
//! # Features
//!
//! - Field-of-view + line-of-sight perception
//! - First-valid flee-point search with an angular sweep
//! - Cyclic patrol routes
//! - One state machine, three behavior profiles (evader, guard, triggerable guard)
//!
//! # Example
//!
//! ```ignore
//! use warden_ai::prelude::*;
//!
//! let config = AgentConfig::for_profile(BehaviorProfile::StandardGuard);
//! let mut brain = AgentBrain::new(7, config, PatrolRoute::new(waypoints))?;
//! brain.start(&mut nav);
//!
//! // every frame
//! let mut ctx = AgentContext::new(pose, Some(player), &mut nav, &world);
//! if let Some(change) = brain.tick(dt, &mut ctx) {
//!     animator.on_state(change.to);
//! }
//! ```

pub mod brain;
pub mod config;
pub mod error;
pub mod flee;
pub mod navigation;
pub mod patrol;
pub mod perception;
pub mod profile;
pub mod spatial;

pub mod prelude {
    pub use crate::brain::{
        AgentBrain, AgentContext, AgentState, AgentTimers, StateTransition, TransitionReason,
    };
    pub use crate::config::{AgentConfig, SpeedProfile};
    pub use crate::error::{AiError, Result};
    pub use crate::flee::{FleeSearch, FleeSearchResult};
    pub use crate::navigation::NavigationAgent;
    pub use crate::patrol::PatrolRoute;
    pub use crate::perception::{AgentPose, PerceptionConfig, Sighting, Target};
    pub use crate::profile::{BehaviorProfile, Capabilities};
    pub use crate::spatial::{LayerMask, RaycastHit, SpatialQuery};
}

pub use prelude::*;
