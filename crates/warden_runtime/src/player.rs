//! Scripted player and the key item it carries

use glam::Vec3;
use serde::{Deserialize, Serialize};
use warden_ai::perception::{planar, Target};
use warden_triggers::gate::move_towards;
use warden_triggers::system::TriggerEntity;
use warden_triggers::{KEY_ITEM_TAG, PLAYER_TAG};

use crate::world::SimWorld;
use crate::{LAYER_PLAYER, LAYER_PROP};

/// Height of the body point used for collision checks
const BODY_HEIGHT: f32 = 0.5;
/// Where a held item sits relative to the player
const HAND_HEIGHT: f32 = 1.0;
const HAND_REACH: f32 = 0.4;

/// Player walking a fixed path
///
/// Waits in place while the next step would enter solid geometry, so a
/// closed gate holds the player back until it opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    pub entity: u64,
    pub position: Vec3,
    pub forward: Vec3,
    pub speed: f32,
    pub path: Vec<Vec3>,
    #[serde(default)]
    pub path_index: usize,
    #[serde(default)]
    pub blocked_time: f32,
}

impl PlayerController {
    pub fn new(entity: u64, position: Vec3, speed: f32, path: Vec<Vec3>) -> Self {
        Self {
            entity,
            position,
            forward: Vec3::Z,
            speed,
            path,
            path_index: 0,
            blocked_time: 0.0,
        }
    }

    /// Whether every path point has been reached
    pub fn finished(&self) -> bool {
        self.path_index >= self.path.len()
    }

    pub fn target(&self) -> Target {
        Target::new(self.entity, self.position)
    }

    pub fn trigger_entity(&self) -> TriggerEntity {
        TriggerEntity::new(self.entity)
            .with_position(self.position)
            .with_layers(1 << LAYER_PLAYER)
            .with_tag(PLAYER_TAG)
    }

    /// Point held items are attached to
    pub fn hand(&self) -> Vec3 {
        self.position + Vec3::Y * HAND_HEIGHT + self.forward * HAND_REACH
    }

    /// Walk toward the next path point
    pub fn advance(&mut self, delta_time: f32, world: &SimWorld) {
        let Some(&waypoint) = self.path.get(self.path_index) else {
            return;
        };

        let target = Vec3::new(waypoint.x, self.position.y, waypoint.z);
        let next = move_towards(self.position, target, self.speed * delta_time.max(0.0));
        if world.is_blocked(next + Vec3::Y * BODY_HEIGHT) {
            self.blocked_time += delta_time;
            return;
        }

        if let Some(dir) = planar(next - self.position).try_normalize() {
            self.forward = dir;
        }
        self.position = next;
        if next == target {
            self.path_index += 1;
            log::debug!("Player reached path point {}", self.path_index);
        }
    }
}

/// The item that opens the gate and scares triggerable guards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyItem {
    pub entity: u64,
    pub position: Vec3,
    #[serde(default)]
    pub held: bool,
    /// Distance at which the player picks the item up
    pub pickup_radius: f32,
}

impl KeyItem {
    pub fn new(entity: u64, position: Vec3) -> Self {
        Self {
            entity,
            position,
            held: false,
            pickup_radius: 0.75,
        }
    }

    pub fn held_by(mut self, player: &PlayerController) -> Self {
        self.held = true;
        self.position = player.hand();
        self
    }

    /// Pick up when in reach, then follow the hand
    ///
    /// Returns true on the tick the item is picked up.
    pub fn follow(&mut self, player: &PlayerController) -> bool {
        let mut picked_up = false;
        if !self.held && planar(player.position - self.position).length() <= self.pickup_radius {
            self.held = true;
            picked_up = true;
            log::info!("Player picked up key item {}", self.entity);
        }
        if self.held {
            self.position = player.hand();
        }
        picked_up
    }

    pub fn trigger_entity(&self) -> TriggerEntity {
        TriggerEntity::new(self.entity)
            .with_position(self.position)
            .with_layers(1 << LAYER_PROP)
            .with_tag(KEY_ITEM_TAG)
            .with_held(self.held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Collider, Walkable};
    use approx::assert_relative_eq;

    fn player() -> PlayerController {
        let path = vec![Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 2.0)];
        PlayerController::new(1, Vec3::ZERO, 2.0, path)
    }

    #[test]
    fn test_walks_path() {
        let world = SimWorld::new(Walkable::default());
        let mut player = player();

        player.advance(0.5, &world);
        assert_relative_eq!(player.position.z, 1.0);
        player.advance(0.5, &world);
        assert_eq!(player.path_index, 1);
        player.advance(1.0, &world);
        assert!(player.finished());
        assert_eq!(player.position, Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(player.forward, Vec3::X);

        // Nothing left to do
        player.advance(1.0, &world);
        assert_eq!(player.position, Vec3::new(2.0, 0.0, 2.0));
    }

    #[test]
    fn test_waits_at_solid_geometry() {
        let mut world = SimWorld::new(Walkable::default());
        let gate = Collider::solid(Vec3::new(0.0, 1.5, 1.5), Vec3::new(2.0, 1.5, 0.25), 0);
        world.add_collider(9, gate);
        let mut player = player();

        for _ in 0..10 {
            player.advance(0.25, &world);
        }
        assert!(player.position.z < 1.25);
        assert!(player.blocked_time > 0.0);

        world.set_collider_center(9, Vec3::new(0.0, 4.5, 1.5));
        for _ in 0..10 {
            player.advance(0.25, &world);
        }
        assert!(player.path_index >= 1);
    }

    #[test]
    fn test_key_pickup_and_follow() {
        let mut player = player();
        let mut key = KeyItem::new(2, Vec3::new(0.0, 0.0, 0.5));

        assert!(key.follow(&player));
        assert!(key.held);
        assert!(!key.follow(&player));

        player.position = Vec3::new(3.0, 0.0, 3.0);
        key.follow(&player);
        assert_eq!(key.position, player.hand());
        assert!(key.trigger_entity().held);
        assert!(key.trigger_entity().tags.contains(KEY_ITEM_TAG));
    }

    #[test]
    fn test_key_out_of_reach() {
        let player = player();
        let mut key = KeyItem::new(2, Vec3::new(5.0, 0.0, 0.0));
        assert!(!key.follow(&player));
        assert_eq!(key.position, Vec3::new(5.0, 0.0, 0.0));
    }
}
