//! Trigger system for processing overlaps

use crate::events::TriggerEvent;
use crate::trigger::Trigger;
use glam::Vec3;
use std::collections::{BTreeMap, BTreeSet};

/// Entity data for trigger system
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEntity {
    /// Entity ID
    pub id: u64,
    /// World position of the bounding-volume center
    pub position: Vec3,
    /// Collision layers
    pub layers: u32,
    /// Entity tags
    pub tags: BTreeSet<String>,
    /// Whether the player currently holds this entity
    pub held: bool,
}

impl TriggerEntity {
    /// Create a new trigger entity
    pub fn new(id: u64) -> Self {
        Self {
            id,
            position: Vec3::ZERO,
            layers: u32::MAX,
            tags: BTreeSet::new(),
            held: false,
        }
    }

    /// Set position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set layers
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Set held state
    pub fn with_held(mut self, held: bool) -> Self {
        self.held = held;
        self
    }

    /// Build an enter event snapshotting this entity
    pub fn enter_event(&self, trigger: u64) -> TriggerEvent {
        TriggerEvent::enter(trigger, self.id)
            .with_tags(self.tags.iter().cloned())
            .with_layers(self.layers)
            .with_other_center(self.position)
            .held(self.held)
    }
}

/// Trigger system: owns triggers and turns entity positions into events
#[derive(Debug, Default)]
pub struct TriggerSystem {
    /// Registered triggers by owning entity
    triggers: BTreeMap<u64, Trigger>,
}

impl TriggerSystem {
    /// Create a new trigger system
    pub fn new() -> Self {
        Self {
            triggers: BTreeMap::new(),
        }
    }

    /// Register a trigger
    pub fn register_trigger(&mut self, entity_id: u64, trigger: Trigger) {
        self.triggers.insert(entity_id, trigger);
    }

    /// Get a trigger
    pub fn get_trigger(&self, entity_id: u64) -> Option<&Trigger> {
        self.triggers.get(&entity_id)
    }

    /// Get trigger count
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Update the trigger system
    ///
    /// # Arguments
    /// * `delta_time` - Time since last update
    /// * `trigger_positions` - World position of each trigger owner this frame
    /// * `entities` - All entities that can activate triggers
    ///
    /// Returns the events produced this frame, ordered by trigger position in
    /// `trigger_positions` and then by entity id.
    pub fn update(
        &mut self,
        delta_time: f32,
        trigger_positions: &[(u64, Vec3)],
        entities: &[TriggerEntity],
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();

        for &(trigger_id, trigger_pos) in trigger_positions {
            let Some(trigger) = self.triggers.get_mut(&trigger_id) else {
                continue;
            };

            for entity in entities {
                if entity.id == trigger_id {
                    continue;
                }
                let inside = trigger.volume.contains_point(trigger_pos, entity.position);
                trigger.process_overlap(trigger_id, entity, inside);
            }

            // Entities that vanished from the list count as having left
            let vanished: Vec<u64> = trigger
                .get_overlapping()
                .filter(|id| !entities.iter().any(|e| e.id == *id))
                .collect();
            for id in vanished {
                trigger.process_overlap(trigger_id, &TriggerEntity::new(id), false);
            }

            trigger.update(delta_time);
            events.extend(trigger.drain_events());
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::TriggerVolume;

    #[test]
    fn test_trigger_system() {
        let mut system = TriggerSystem::new();
        system.register_trigger(1, Trigger::new(TriggerVolume::sphere(1.0)));

        assert_eq!(system.trigger_count(), 1);
        assert!(system.get_trigger(1).is_some());
    }

    #[test]
    fn test_trigger_overlap_detection() {
        let mut system = TriggerSystem::new();
        system.register_trigger(1, Trigger::new(TriggerVolume::sphere(2.0)));

        let entities = vec![TriggerEntity::new(2).with_position(Vec3::new(0.5, 0.0, 0.0))];
        let events = system.update(0.016, &[(1, Vec3::ZERO)], &entities);

        assert_eq!(events.len(), 1);
        assert!(events[0].is_enter());
        assert_eq!(events[0].other_center, Vec3::new(0.5, 0.0, 0.0));
        assert!(system.get_trigger(1).is_some_and(|t| t.is_inside(2)));
    }

    #[test]
    fn test_trigger_follows_owner() {
        let mut system = TriggerSystem::new();
        system.register_trigger(1, Trigger::new(TriggerVolume::sphere(1.0)));
        let entities = vec![TriggerEntity::new(2).with_position(Vec3::new(5.0, 0.0, 0.0))];

        assert!(system.update(0.1, &[(1, Vec3::ZERO)], &entities).is_empty());
        let events = system.update(0.1, &[(1, Vec3::new(4.5, 0.0, 0.0))], &entities);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_enter());
    }

    #[test]
    fn test_trigger_exit() {
        let mut system = TriggerSystem::new();
        system.register_trigger(1, Trigger::new(TriggerVolume::sphere(1.0)));
        let at = |x: f32| vec![TriggerEntity::new(2).with_position(Vec3::new(x, 0.0, 0.0))];

        system.update(0.016, &[(1, Vec3::ZERO)], &at(0.0));
        let events = system.update(0.016, &[(1, Vec3::ZERO)], &at(10.0));

        assert_eq!(events.len(), 1);
        assert!(events[0].is_exit());
        assert!(system.get_trigger(1).is_some_and(|t| !t.is_inside(2)));
    }

    #[test]
    fn test_vanished_entity_exits() {
        let mut system = TriggerSystem::new();
        system.register_trigger(1, Trigger::new(TriggerVolume::sphere(1.0)));

        system.update(0.1, &[(1, Vec3::ZERO)], &[TriggerEntity::new(2)]);
        let events = system.update(0.1, &[(1, Vec3::ZERO)], &[]);

        assert_eq!(events.len(), 1);
        assert!(events[0].is_exit());
    }
}
