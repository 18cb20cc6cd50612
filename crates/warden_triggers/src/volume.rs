//! Trigger volume shapes

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Trigger volume shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerVolume {
    /// Axis-aligned box
    Box {
        /// Half-extents (width/2, height/2, depth/2)
        half_extents: Vec3,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
}

impl TriggerVolume {
    /// Create a box trigger volume
    pub fn box_shape(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            half_extents: Vec3::new(width / 2.0, height / 2.0, depth / 2.0),
        }
    }

    /// Create a cube trigger volume
    pub fn cube(size: f32) -> Self {
        Self::box_shape(size, size, size)
    }

    /// Create a sphere trigger volume
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Check if a world point lies inside the volume placed at `center`
    pub fn contains_point(&self, center: Vec3, point: Vec3) -> bool {
        let local = point - center;
        match *self {
            Self::Box { half_extents } => {
                local.x.abs() <= half_extents.x
                    && local.y.abs() <= half_extents.y
                    && local.z.abs() <= half_extents.z
            }
            Self::Sphere { radius } => local.length_squared() <= radius * radius,
        }
    }

    /// Get the local-space bounding box (min, max)
    pub fn bounding_box(&self) -> (Vec3, Vec3) {
        match *self {
            Self::Box { half_extents } => (-half_extents, half_extents),
            Self::Sphere { radius } => (Vec3::splat(-radius), Vec3::splat(radius)),
        }
    }
}

impl Default for TriggerVolume {
    fn default() -> Self {
        Self::sphere(1.0)
    }
}
