//! Straight-line navigation agent

use glam::Vec3;
use warden_ai::navigation::NavigationAgent;
use warden_ai::perception::planar;
use warden_triggers::gate::move_towards;

/// Moves in a straight line toward its destination on the plane
///
/// A new destination takes one `advance` call to become active, which
/// mirrors the path-pending latency of a real planner.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicNav {
    position: Vec3,
    forward: Vec3,
    destination: Option<Vec3>,
    pending: bool,
    speed: f32,
    stopping_distance: f32,
    distance_travelled: f32,
}

impl KinematicNav {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        let forward = planar(forward).try_normalize().unwrap_or(Vec3::Z);
        Self {
            position,
            forward,
            destination: None,
            pending: false,
            speed: 0.0,
            stopping_distance: 0.0,
            distance_travelled: 0.0,
        }
    }

    pub fn with_stopping_distance(mut self, distance: f32) -> Self {
        self.stopping_distance = distance;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Facing direction on the plane, following the last movement
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn distance_travelled(&self) -> f32 {
        self.distance_travelled
    }

    /// Move for `delta_time` seconds
    pub fn advance(&mut self, delta_time: f32) {
        if self.pending {
            self.pending = false;
            return;
        }
        let Some(destination) = self.destination else {
            return;
        };

        let target = Vec3::new(destination.x, self.position.y, destination.z);
        let next = move_towards(self.position, target, self.speed * delta_time.max(0.0));
        let step = next - self.position;
        if let Some(dir) = planar(step).try_normalize() {
            self.forward = dir;
        }
        self.distance_travelled += step.length();
        self.position = next;
    }
}

impl NavigationAgent for KinematicNav {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
        self.pending = true;
    }

    fn reset_path(&mut self) {
        self.destination = None;
        self.pending = false;
    }

    fn is_path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |destination| planar(destination - self.position).length())
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pending_for_one_advance() {
        let mut nav = KinematicNav::new(Vec3::ZERO, Vec3::Z);
        nav.set_speed(2.0);
        nav.set_destination(Vec3::new(4.0, 0.0, 0.0));
        assert!(nav.is_path_pending());

        nav.advance(0.5);
        assert!(!nav.is_path_pending());
        assert_eq!(nav.position(), Vec3::ZERO);

        nav.advance(0.5);
        assert_relative_eq!(nav.position().x, 1.0);
        assert_relative_eq!(nav.remaining_distance(), 3.0);
        assert_eq!(nav.forward(), Vec3::X);
    }

    #[test]
    fn test_stops_at_destination() {
        let mut nav = KinematicNav::new(Vec3::ZERO, Vec3::Z);
        nav.set_speed(10.0);
        nav.set_destination(Vec3::new(0.0, 0.0, 3.0));
        nav.advance(0.1);
        nav.advance(1.0);
        assert_eq!(nav.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(nav.remaining_distance(), 0.0);
        assert!(nav.has_arrived(0.3));
        assert_relative_eq!(nav.distance_travelled(), 3.0);
    }

    #[test]
    fn test_remaining_distance_is_planar() {
        let mut nav = KinematicNav::new(Vec3::ZERO, Vec3::Z);
        nav.set_destination(Vec3::new(3.0, 5.0, 4.0));
        assert_relative_eq!(nav.remaining_distance(), 5.0);

        // Height of the destination is ignored while moving
        nav.set_speed(100.0);
        nav.advance(0.0);
        nav.advance(1.0);
        assert_eq!(nav.position().y, 0.0);
    }

    #[test]
    fn test_stopping_distance_counts_as_arrival() {
        let mut nav = KinematicNav::new(Vec3::ZERO, Vec3::Z).with_stopping_distance(1.5);
        nav.set_destination(Vec3::new(0.0, 0.0, 1.2));
        nav.advance(0.1);

        assert_eq!(nav.stopping_distance(), 1.5);
        assert!(nav.has_arrived(0.3));
    }

    #[test]
    fn test_reset_path() {
        let mut nav = KinematicNav::new(Vec3::ZERO, Vec3::Z);
        nav.set_destination(Vec3::new(3.0, 0.0, 0.0));
        nav.reset_path();
        assert!(!nav.is_path_pending());
        assert_eq!(nav.destination(), None);
        assert_eq!(nav.remaining_distance(), 0.0);
    }
}
