//! Trigger events

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Type of trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEventType {
    /// Entity entered the trigger volume
    Enter,
    /// Entity exited the trigger volume
    Exit,
}

/// A trigger event
///
/// Carries a snapshot of the other entity taken when the overlap changed, so
/// consumers never need to look the entity up again.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    /// Type of event
    pub event_type: TriggerEventType,
    /// The trigger entity
    pub trigger_entity: u64,
    /// The entity that caused the event
    pub other_entity: u64,
    /// Tags of the other entity
    pub other_tags: BTreeSet<String>,
    /// Collision layers of the other entity
    pub other_layers: u32,
    /// Center of the other entity's bounding volume
    pub other_center: Vec3,
    /// Whether the player currently holds the other entity
    pub other_held: bool,
    /// Time in the trigger (for Exit events)
    pub time_in_trigger: f32,
}

impl TriggerEvent {
    fn with_type(event_type: TriggerEventType, trigger: u64, other: u64, time: f32) -> Self {
        Self {
            event_type,
            trigger_entity: trigger,
            other_entity: other,
            other_tags: BTreeSet::new(),
            other_layers: u32::MAX,
            other_center: Vec3::ZERO,
            other_held: false,
            time_in_trigger: time,
        }
    }

    /// Create an enter event
    pub fn enter(trigger: u64, other: u64) -> Self {
        Self::with_type(TriggerEventType::Enter, trigger, other, 0.0)
    }

    /// Create an exit event
    pub fn exit(trigger: u64, other: u64, time_spent: f32) -> Self {
        Self::with_type(TriggerEventType::Exit, trigger, other, time_spent)
    }

    /// Add a tag of the other entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.other_tags.insert(tag.into());
        self
    }

    /// Replace the tag set of the other entity
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.other_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the other entity's layers
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.other_layers = layers;
        self
    }

    /// Set the other entity's bounding-volume center
    pub fn with_other_center(mut self, center: Vec3) -> Self {
        self.other_center = center;
        self
    }

    /// Set whether the other entity is held
    pub fn held(mut self, held: bool) -> Self {
        self.other_held = held;
        self
    }

    /// Check whether the other entity carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.other_tags.contains(tag)
    }

    /// Check if this is an enter event
    pub fn is_enter(&self) -> bool {
        self.event_type == TriggerEventType::Enter
    }

    /// Check if this is an exit event
    pub fn is_exit(&self) -> bool {
        self.event_type == TriggerEventType::Exit
    }
}
