//! Sliding gate opened by trigger props

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A gate that slides vertically between a closed and an open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    closed_position: Vec3,
    open_position: Vec3,
    position: Vec3,
    /// Travel speed in units per second
    pub speed: f32,
    is_open: bool,
}

impl Gate {
    /// Create a closed gate at `position` that rises `open_height` when opened
    pub fn new(position: Vec3, open_height: f32, speed: f32) -> Self {
        Self {
            closed_position: position,
            open_position: position + Vec3::Y * open_height,
            position,
            speed,
            is_open: false,
        }
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the gate has been told to open
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the gate has reached its target
    pub fn is_settled(&self) -> bool {
        self.position == self.target()
    }

    fn target(&self) -> Vec3 {
        if self.is_open {
            self.open_position
        } else {
            self.closed_position
        }
    }

    /// Open the gate
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close the gate
    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Flip between open and closed
    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Advance the gate toward its target
    pub fn update(&mut self, delta_time: f32) {
        self.position = move_towards(self.position, self.target(), self.speed * delta_time);
    }
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta / distance * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_opens_over_time() {
        let mut gate = Gate::new(Vec3::ZERO, 2.0, 2.0);
        gate.open();

        gate.update(0.5);
        assert_relative_eq!(gate.position().y, 1.0);
        assert!(!gate.is_settled());

        gate.update(0.75);
        assert_relative_eq!(gate.position().y, 2.0);
        assert!(gate.is_settled());
    }

    #[test]
    fn test_toggle_returns_closed() {
        let mut gate = Gate::new(Vec3::new(1.0, 0.0, 1.0), 2.0, 4.0);
        gate.toggle();
        gate.update(1.0);
        assert!(gate.is_open());

        gate.toggle();
        gate.update(1.0);
        assert!(!gate.is_open());
        assert_eq!(gate.position(), Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_move_towards_no_overshoot() {
        let p = move_towards(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 10.0);
        assert_eq!(p, Vec3::new(3.0, 0.0, 4.0));

        let p = move_towards(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), 2.5);
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.z, 2.0);
    }
}
