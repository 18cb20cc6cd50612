//! Patrol routes

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::perception::planar;

/// Ordered, cyclic list of waypoints
///
/// The route is fixed once an agent is built. An empty route is valid and
/// turns patrolling into a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.waypoints.get(index).copied()
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    /// Index after `index`, wrapping to 0
    pub fn next_index(&self, index: usize) -> usize {
        if self.waypoints.is_empty() {
            0
        } else {
            (index + 1) % self.waypoints.len()
        }
    }

    /// Index of the waypoint closest to `position` on the horizontal plane
    ///
    /// Ties resolve to the lowest index.
    pub fn nearest_planar(&self, position: Vec3) -> Option<usize> {
        let origin = planar(position);
        let mut best: Option<(usize, f32)> = None;
        for (i, waypoint) in self.waypoints.iter().enumerate() {
            let d = (planar(*waypoint) - origin).length_squared();
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| i)
    }
}

impl From<Vec<Vec3>> for PatrolRoute {
    fn from(waypoints: Vec<Vec3>) -> Self {
        Self::new(waypoints)
    }
}
