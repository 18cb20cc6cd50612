//! Navigation seam
//!
//! The host owns path planning and movement; agents only hand it target
//! points and read back progress.

use glam::Vec3;

/// Navigation agent driven by the behavior core
pub trait NavigationAgent {
    /// Request travel to a world point
    fn set_destination(&mut self, point: Vec3);

    /// Drop the current path, including any request still being planned
    fn reset_path(&mut self);

    /// Whether a requested path is still being computed
    fn is_path_pending(&self) -> bool;

    /// Distance left along the current path
    fn remaining_distance(&self) -> f32;

    /// Distance at which the agent stops short of its destination
    fn stopping_distance(&self) -> f32;

    /// Current travel speed
    fn speed(&self) -> f32;

    /// Set travel speed
    fn set_speed(&mut self, speed: f32);

    /// Arrival test shared by patrol and return
    fn has_arrived(&self, waypoint_tolerance: f32) -> bool {
        !self.is_path_pending()
            && self.remaining_distance() <= self.stopping_distance().max(waypoint_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        pending: bool,
        remaining: f32,
        stopping: f32,
    }

    impl NavigationAgent for Fixed {
        fn set_destination(&mut self, _point: Vec3) {}
        fn reset_path(&mut self) {}
        fn is_path_pending(&self) -> bool {
            self.pending
        }
        fn remaining_distance(&self) -> f32 {
            self.remaining
        }
        fn stopping_distance(&self) -> f32 {
            self.stopping
        }
        fn speed(&self) -> f32 {
            0.0
        }
        fn set_speed(&mut self, _speed: f32) {}
    }

    #[test]
    fn test_has_arrived_uses_larger_tolerance() {
        let nav = Fixed { pending: false, remaining: 0.4, stopping: 0.5 };
        assert!(nav.has_arrived(0.3));

        let nav = Fixed { pending: false, remaining: 0.4, stopping: 0.0 };
        assert!(!nav.has_arrived(0.3));
        assert!(nav.has_arrived(0.4));
    }

    #[test]
    fn test_pending_path_never_arrived() {
        let nav = Fixed { pending: true, remaining: 0.0, stopping: 0.0 };
        assert!(!nav.has_arrived(0.3));
    }
}
