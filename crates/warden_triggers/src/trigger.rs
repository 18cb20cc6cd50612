//! Trigger component

use crate::events::{TriggerEvent, TriggerEventType};
use crate::filter::TriggerFilter;
use crate::system::TriggerEntity;
use crate::volume::TriggerVolume;
use std::collections::BTreeMap;

/// State of an entity inside a trigger
#[derive(Debug, Clone)]
struct TriggerOverlapState {
    /// Total time inside
    time_inside: f32,
    /// Last snapshot of the entity, reused for the Exit event
    snapshot: TriggerEvent,
}

/// Trigger component for detecting overlaps
#[derive(Debug, Clone)]
pub struct Trigger {
    /// Trigger volume shape
    pub volume: TriggerVolume,
    /// Trigger filter
    pub filter: TriggerFilter,
    /// Currently overlapping entities, ordered by id for deterministic events
    overlapping: BTreeMap<u64, TriggerOverlapState>,
    /// Queue of events to be drained
    event_queue: Vec<TriggerEvent>,
}

impl Trigger {
    /// Create a new trigger
    pub fn new(volume: TriggerVolume) -> Self {
        Self {
            volume,
            filter: TriggerFilter::new(),
            overlapping: BTreeMap::new(),
            event_queue: Vec::new(),
        }
    }

    /// Set filter
    pub fn with_filter(mut self, filter: TriggerFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Check if an entity is currently inside this trigger
    pub fn is_inside(&self, entity: u64) -> bool {
        self.overlapping.contains_key(&entity)
    }

    /// Get all entities currently inside
    pub fn get_overlapping(&self) -> impl Iterator<Item = u64> + '_ {
        self.overlapping.keys().copied()
    }

    /// Process an entity's overlap state for this frame
    pub fn process_overlap(
        &mut self,
        trigger_entity: u64,
        other: &TriggerEntity,
        is_overlapping: bool,
    ) {
        let was_overlapping = self.overlapping.contains_key(&other.id);

        if is_overlapping && !was_overlapping {
            let event = other.enter_event(trigger_entity);
            if !self.filter.passes(&event) {
                return;
            }

            self.overlapping.insert(
                other.id,
                TriggerOverlapState {
                    time_inside: 0.0,
                    snapshot: event.clone(),
                },
            );
            self.event_queue.push(event);
        } else if is_overlapping {
            // Keep the snapshot fresh so Exit reports the latest held state
            if let Some(state) = self.overlapping.get_mut(&other.id) {
                state.snapshot = other.enter_event(trigger_entity);
            }
        } else if let Some(state) = self.overlapping.remove(&other.id) {
            let mut event = state.snapshot;
            event.event_type = TriggerEventType::Exit;
            event.time_in_trigger = state.time_inside;
            self.event_queue.push(event);
        }
    }

    /// Advance the time every overlapping entity has spent inside
    pub fn update(&mut self, delta_time: f32) {
        for state in self.overlapping.values_mut() {
            state.time_inside += delta_time;
        }
    }

    /// Drain events for external processing
    pub fn drain_events(&mut self) -> Vec<TriggerEvent> {
        std::mem::take(&mut self.event_queue)
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new(TriggerVolume::default())
    }
}
