//! Guard tag volume: reports when a guard touches the player

use crate::events::TriggerEvent;
use serde::{Deserialize, Serialize};

/// Watches a guard's tag volume for the player body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagger {
    /// Tag identifying the player body
    pub player_tag: String,
    /// How many times the player has been tagged
    tag_count: u32,
}

impl Tagger {
    /// Create a tagger watching for the given player tag
    pub fn new(player_tag: impl Into<String>) -> Self {
        Self {
            player_tag: player_tag.into(),
            tag_count: 0,
        }
    }

    /// Feed a trigger event; returns true when it tags the player
    pub fn on_trigger_enter(&mut self, event: &TriggerEvent) -> bool {
        if !event.is_enter() || !event.has_tag(&self.player_tag) {
            return false;
        }
        self.tag_count += 1;
        log::debug!(
            "Trigger {} tagged player entity {}",
            event.trigger_entity,
            event.other_entity
        );
        true
    }

    /// Number of tags so far
    pub fn tag_count(&self) -> u32 {
        self.tag_count
    }
}

impl Default for Tagger {
    fn default() -> Self {
        Self::new(crate::PLAYER_TAG)
    }
}
