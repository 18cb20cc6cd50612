//! Flee-point search
//!
//! Sweeps candidate directions fanning out from the preferred escape
//! direction and takes the first one whose destination snaps onto navigable
//! ground.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, AiError, Result};
use crate::spatial::SpatialQuery;

/// Outcome of a flee-point search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FleeSearchResult {
    /// Whether any candidate snapped onto navigable ground
    pub found: bool,
    /// Snapped point when found, otherwise the search origin
    pub point: Vec3,
}

/// Angular sweep parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleeSearch {
    /// Angle between neighbouring candidates in degrees
    pub step_degrees: f32,
    /// Number of steps tried on each side of the preferred direction
    pub half_steps: u32,
    /// Radius used when snapping a candidate onto navigable ground
    pub sample_radius: f32,
}

impl Default for FleeSearch {
    fn default() -> Self {
        Self {
            step_degrees: 20.0,
            half_steps: 4,
            sample_radius: 2.5,
        }
    }
}

impl FleeSearch {
    pub fn new(step_degrees: f32, half_steps: u32) -> Self {
        Self {
            step_degrees,
            half_steps,
            ..Default::default()
        }
    }

    pub fn with_sample_radius(mut self, radius: f32) -> Self {
        self.sample_radius = radius;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_degrees.is_finite() || self.step_degrees <= 0.0 {
            return Err(AiError::InvalidFleeSearch(format!(
                "step must be positive, got {} degrees",
                self.step_degrees
            )));
        }
        if self.step_degrees * self.half_steps as f32 > 180.0 {
            return Err(AiError::InvalidFleeSearch(format!(
                "sweep of {} x {} degrees wraps past the opposite direction",
                self.half_steps, self.step_degrees
            )));
        }
        non_negative("sample_radius", self.sample_radius)
    }

    /// Rotation offsets in degrees, in the order they are tried
    ///
    /// `0, +step, -step, +2 step, -2 step, ...`. Positive offsets rotate
    /// counter-clockwise seen from above.
    pub fn candidate_offsets(&self) -> impl Iterator<Item = f32> + '_ {
        std::iter::once(0.0).chain((1..=self.half_steps).flat_map(move |i| {
            let offset = i as f32 * self.step_degrees;
            [offset, -offset]
        }))
    }

    /// Candidate directions, in the order they are tried
    pub fn candidate_directions(&self, away: Vec3) -> impl Iterator<Item = Vec3> + '_ {
        self.candidate_offsets()
            .map(move |offset| rotate_about_vertical(away, offset))
    }

    /// Find the first candidate destination that snaps onto navigable ground
    ///
    /// `away` should be a planar unit vector; callers substitute a fallback
    /// before calling when it has no direction.
    pub fn find_flee_point<S>(
        &self,
        origin: Vec3,
        away: Vec3,
        distance: f32,
        spatial: &S,
    ) -> FleeSearchResult
    where
        S: SpatialQuery + ?Sized,
    {
        for dir in self.candidate_directions(away) {
            let candidate = origin + dir * distance;
            if let Some(point) = spatial.sample_navigable_point(candidate, self.sample_radius) {
                return FleeSearchResult { found: true, point };
            }
        }

        FleeSearchResult { found: false, point: origin }
    }

    /// Search result, or the raw unclamped point along `away` when nothing
    /// snapped
    pub fn resolve_flee_destination<S>(
        &self,
        origin: Vec3,
        away: Vec3,
        distance: f32,
        spatial: &S,
    ) -> (Vec3, bool)
    where
        S: SpatialQuery + ?Sized,
    {
        let result = self.find_flee_point(origin, away, distance, spatial);
        if result.found {
            (result.point, true)
        } else {
            (origin + away * distance, false)
        }
    }
}

/// Rotate a direction about the world up axis
pub fn rotate_about_vertical(dir: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * dir
}
