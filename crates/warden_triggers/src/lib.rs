//! Warden Triggers - Trigger Volume and Interaction System
//!
//! This crate detects interactors overlapping trigger volumes and turns the
//! overlaps into events the agent brains and level props react to.
//!
//! # Features
//!
//! - Sphere and box volumes
//! - Enter/Exit events carrying the other object's tags, center and held
//!   state
//! - Tag, layer and held-item filtering
//! - Level props driven by triggers: tagger, bumper, gate
//!
//! # Example
//!
//! ```ignore
//! use warden_triggers::prelude::*;
//!
//! let mut system = TriggerSystem::new();
//! system.register_trigger(
//!     10,
//!     Trigger::new(TriggerVolume::sphere(1.5))
//!         .with_filter(TriggerFilter::held_item(KEY_ITEM_TAG)),
//! );
//! let events = system.update(dt, &[(10, guard_position)], &interactors);
//! ```

pub mod bumper;
pub mod events;
pub mod filter;
pub mod gate;
pub mod system;
pub mod tagger;
pub mod trigger;
pub mod volume;

/// Tag carried by the player body
pub const PLAYER_TAG: &str = "Player";

/// Tag carried by the key item the player can pick up
pub const KEY_ITEM_TAG: &str = "KeyItem";

pub mod prelude {
    pub use crate::bumper::Bumper;
    pub use crate::events::{TriggerEvent, TriggerEventType};
    pub use crate::filter::TriggerFilter;
    pub use crate::gate::Gate;
    pub use crate::system::{TriggerEntity, TriggerSystem};
    pub use crate::tagger::Tagger;
    pub use crate::trigger::Trigger;
    pub use crate::volume::TriggerVolume;
    pub use crate::{KEY_ITEM_TAG, PLAYER_TAG};
}

pub use prelude::*;
