//! Trigger filtering system

use crate::events::TriggerEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter for what entities can activate a trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerFilter {
    /// Required layers (entity must have at least one)
    pub required_layers: u32,
    /// Required tags (entity must have all of these)
    pub required_tags: BTreeSet<String>,
    /// Only pass entities the player is currently holding
    pub require_held: bool,
}

impl TriggerFilter {
    /// Create a new filter that accepts everything
    pub fn new() -> Self {
        Self {
            required_layers: u32::MAX,
            required_tags: BTreeSet::new(),
            require_held: false,
        }
    }

    /// Set required layers (bitmask)
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.required_layers = layers;
        self
    }

    /// Require a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.required_tags.insert(tag.into());
        self
    }

    /// Only pass entities that are currently held
    pub fn requiring_held(mut self, require_held: bool) -> Self {
        self.require_held = require_held;
        self
    }

    /// Check if an event's other entity passes this filter
    pub fn passes(&self, event: &TriggerEvent) -> bool {
        // Trigger owners never activate themselves
        if event.other_entity == event.trigger_entity {
            return false;
        }

        if event.other_layers & self.required_layers == 0 {
            return false;
        }

        if !self.required_tags.iter().all(|tag| event.has_tag(tag)) {
            return false;
        }

        !self.require_held || event.other_held
    }
}

impl Default for TriggerFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Common filter presets
impl TriggerFilter {
    /// Filter for the player body only
    pub fn player_only() -> Self {
        Self::new().with_tag(crate::PLAYER_TAG)
    }

    /// Filter for a tagged item the player is holding
    pub fn held_item(tag: impl Into<String>) -> Self {
        Self::new().with_tag(tag).requiring_held(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_layers() {
        let filter = TriggerFilter::new().with_layers(0b0011);

        assert!(filter.passes(&TriggerEvent::enter(0, 1).with_layers(0b0001)));
        assert!(filter.passes(&TriggerEvent::enter(0, 2).with_layers(0b0010)));
        assert!(!filter.passes(&TriggerEvent::enter(0, 3).with_layers(0b0100)));
    }

    #[test]
    fn test_filter_tags() {
        let filter = TriggerFilter::player_only();

        assert!(filter.passes(&TriggerEvent::enter(0, 1).with_tag("Player")));
        assert!(!filter.passes(&TriggerEvent::enter(0, 2).with_tag("Enemy")));
    }

    #[test]
    fn test_filter_held_item() {
        let filter = TriggerFilter::held_item("KeyItem");

        let loose = TriggerEvent::enter(0, 7).with_tag("KeyItem");
        assert!(!filter.passes(&loose));
        assert!(filter.passes(&loose.clone().held(true)));

        let wrong_tag = TriggerEvent::enter(0, 8).with_tag("Rock").held(true);
        assert!(!filter.passes(&wrong_tag));
    }

    #[test]
    fn test_filter_self() {
        let filter = TriggerFilter::new();
        assert!(!filter.passes(&TriggerEvent::enter(5, 5)));
        assert!(filter.passes(&TriggerEvent::enter(5, 6)));
    }
}
