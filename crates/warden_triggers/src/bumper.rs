//! Bumper plate: fires when a tagged, held item is pushed into it

use crate::events::TriggerEvent;
use serde::{Deserialize, Serialize};

/// A plate that reacts to a specific tagged item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bumper {
    /// Tag the item must carry
    pub required_tag: String,
    /// Whether the item must be held by the player
    pub require_held: bool,
    /// Fire only the first time
    pub fire_once: bool,
    #[serde(skip)]
    used: bool,
}

impl Bumper {
    /// Create a bumper reacting to `required_tag`
    pub fn new(required_tag: impl Into<String>) -> Self {
        Self {
            required_tag: required_tag.into(),
            require_held: true,
            fire_once: true,
            used: false,
        }
    }

    /// Set whether the item must be held
    pub fn with_require_held(mut self, require_held: bool) -> Self {
        self.require_held = require_held;
        self
    }

    /// Set whether the bumper fires only once
    pub fn with_fire_once(mut self, fire_once: bool) -> Self {
        self.fire_once = fire_once;
        self
    }

    /// Feed a trigger event; returns true when the bumper fires
    pub fn on_trigger_enter(&mut self, event: &TriggerEvent) -> bool {
        if !event.is_enter() || (self.fire_once && self.used) {
            return false;
        }
        if !event.has_tag(&self.required_tag) {
            return false;
        }
        if self.require_held && !event.other_held {
            return false;
        }

        self.used = true;
        log::debug!("Bumper {} fired by entity {}", event.trigger_entity, event.other_entity);
        true
    }

    /// Whether the bumper has fired
    pub fn is_used(&self) -> bool {
        self.used
    }
}

impl Default for Bumper {
    fn default() -> Self {
        Self::new(crate::KEY_ITEM_TAG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(held: bool) -> TriggerEvent {
        TriggerEvent::enter(1, 2).with_tag("KeyItem").held(held)
    }

    #[test]
    fn test_requires_held_key() {
        let mut bumper = Bumper::default();

        assert!(!bumper.on_trigger_enter(&key(false)));
        assert!(!bumper.on_trigger_enter(&TriggerEvent::enter(1, 3).with_tag("Rock").held(true)));
        assert!(bumper.on_trigger_enter(&key(true)));
        assert!(bumper.is_used());
    }

    #[test]
    fn test_fire_once() {
        let mut bumper = Bumper::default();
        assert!(bumper.on_trigger_enter(&key(true)));
        assert!(!bumper.on_trigger_enter(&key(true)));
        assert!(bumper.is_used());
    }

    #[test]
    fn test_repeatable_loose_item() {
        let mut bumper = Bumper::default()
            .with_require_held(false)
            .with_fire_once(false);

        assert!(bumper.on_trigger_enter(&key(false)));
        assert!(bumper.on_trigger_enter(&key(false)));
    }
}
