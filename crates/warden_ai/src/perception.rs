//! Field-of-view and line-of-sight perception

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, AiError, Result};
use crate::spatial::{LayerMask, SpatialQuery};

/// Planar vectors shorter than this are treated as having no direction
pub(crate) const DEGENERATE_LENGTH_SQ: f32 = 1e-6;

/// Project a vector onto the horizontal plane
#[inline]
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Angle in degrees between two vectors after projecting both onto the plane
///
/// Returns 0 when either projection has no direction, so a target standing
/// directly above or below the agent always passes the angle gate.
pub fn planar_angle_degrees(a: Vec3, b: Vec3) -> f32 {
    let a = planar(a);
    let b = planar(b);
    if a.length_squared() < DEGENERATE_LENGTH_SQ || b.length_squared() < DEGENERATE_LENGTH_SQ {
        return 0.0;
    }
    let cos = a.normalize().dot(b.normalize()).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Position and facing of the observing agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentPose {
    /// World position
    pub position: Vec3,
    /// Facing direction (need not be normalized)
    pub forward: Vec3,
}

impl AgentPose {
    pub fn new(position: Vec3, forward: Vec3) -> Self {
        Self { position, forward }
    }
}

impl Default for AgentPose {
    fn default() -> Self {
        Self { position: Vec3::ZERO, forward: Vec3::Z }
    }
}

/// Something an agent can see
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Root entity of the target, used to accept raycast hits on its parts
    pub entity: u64,
    /// World position
    pub position: Vec3,
}

impl Target {
    pub fn new(entity: u64, position: Vec3) -> Self {
        Self { entity, position }
    }
}

/// A positive sighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Planar unit direction from agent to target (zero if directly above)
    pub direction: Vec3,
    /// 3D distance from agent to target
    pub distance: f32,
}

/// Perception tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionConfig {
    /// Maximum sight distance
    pub view_distance: f32,
    /// Full view cone in degrees
    pub view_angle: f32,
    /// Height of the line-of-sight ray origin above the agent position
    #[serde(default)]
    pub eye_height: f32,
    /// Layers the line-of-sight ray may be blocked by
    #[serde(default)]
    pub los_mask: LayerMask,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            view_distance: 10.0,
            view_angle: 90.0,
            eye_height: 0.0,
            los_mask: LayerMask::ALL,
        }
    }
}

impl PerceptionConfig {
    pub fn new(view_distance: f32, view_angle: f32) -> Self {
        Self {
            view_distance,
            view_angle,
            ..Default::default()
        }
    }

    /// Raise the line-of-sight origin above the agent position
    pub fn with_eye_height(mut self, eye_height: f32) -> Self {
        self.eye_height = eye_height;
        self
    }

    /// Restrict which layers can block line of sight
    pub fn with_los_mask(mut self, mask: LayerMask) -> Self {
        self.los_mask = mask;
        self
    }

    /// Check tuning values
    pub fn validate(&self) -> Result<()> {
        if !(self.view_distance > 0.0) || !self.view_distance.is_finite() {
            return Err(AiError::InvalidViewDistance(self.view_distance));
        }
        if !(self.view_angle > 0.0 && self.view_angle <= 180.0) {
            return Err(AiError::InvalidViewAngle(self.view_angle));
        }
        non_negative("eye_height", self.eye_height)
    }

    /// Run the distance, angle and line-of-sight gates in that order
    pub fn perceive<S>(
        &self,
        pose: &AgentPose,
        target: Option<&Target>,
        spatial: &S,
    ) -> Option<Sighting>
    where
        S: SpatialQuery + ?Sized,
    {
        let target = target?;
        let to_target = target.position - pose.position;
        let distance = to_target.length();
        if distance > self.view_distance {
            return None;
        }

        if planar_angle_degrees(pose.forward, to_target) > self.view_angle * 0.5 {
            return None;
        }

        if !self.has_line_of_sight(pose, target, spatial) {
            return None;
        }

        Some(Sighting {
            direction: planar(to_target).normalize_or_zero(),
            distance,
        })
    }

    /// Whether the target passes every perception gate
    pub fn is_target_visible<S>(
        &self,
        pose: &AgentPose,
        target: Option<&Target>,
        spatial: &S,
    ) -> bool
    where
        S: SpatialQuery + ?Sized,
    {
        self.perceive(pose, target, spatial).is_some()
    }

    /// Line-of-sight gate alone
    ///
    /// The first hit along the ray must belong to the target. No hit at all
    /// counts as a clear line.
    pub fn has_line_of_sight<S>(&self, pose: &AgentPose, target: &Target, spatial: &S) -> bool
    where
        S: SpatialQuery + ?Sized,
    {
        let origin = pose.position + Vec3::Y * self.eye_height;
        let to_target = target.position - origin;
        let length = to_target.length();
        if length <= f32::EPSILON {
            return true;
        }

        match spatial.raycast_first_hit(origin, to_target / length, length, self.los_mask) {
            Some(hit) => spatial.is_part_of(hit.entity, target.entity),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::RaycastHit;
    use approx::assert_relative_eq;

    const TARGET: u64 = 100;
    const TARGET_HAND: u64 = 101;
    const WALL: u64 = 7;
    const WALL_LAYER: u8 = 1;

    /// Reports a fixed first hit for every ray and records the last mask used
    struct Scripted {
        hit: Option<(u64, u8)>,
        last_origin: std::cell::Cell<Vec3>,
    }

    impl Scripted {
        fn clear() -> Self {
            Self { hit: None, last_origin: std::cell::Cell::new(Vec3::ZERO) }
        }

        fn blocked_by(entity: u64, layer: u8) -> Self {
            Self { hit: Some((entity, layer)), last_origin: std::cell::Cell::new(Vec3::ZERO) }
        }
    }

    impl SpatialQuery for Scripted {
        fn raycast_first_hit(
            &self,
            origin: Vec3,
            direction: Vec3,
            max_distance: f32,
            mask: LayerMask,
        ) -> Option<RaycastHit> {
            self.last_origin.set(origin);
            let (entity, layer) = self.hit?;
            mask.contains(layer).then(|| RaycastHit {
                entity,
                point: origin + direction * max_distance * 0.5,
                distance: max_distance * 0.5,
                layer,
            })
        }

        fn sample_navigable_point(&self, near: Vec3, _search_radius: f32) -> Option<Vec3> {
            Some(near)
        }

        fn is_part_of(&self, entity: u64, root: u64) -> bool {
            entity == root || (root == TARGET && entity == TARGET_HAND)
        }
    }

    fn pose() -> AgentPose {
        AgentPose::new(Vec3::ZERO, Vec3::Z)
    }

    #[test]
    fn test_missing_target_not_visible() {
        let config = PerceptionConfig::new(10.0, 90.0);
        assert!(!config.is_target_visible(&pose(), None, &Scripted::clear()));
    }

    #[test]
    fn test_distance_gate() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let world = Scripted::clear();

        let near = Target::new(TARGET, Vec3::new(0.0, 0.0, 10.0));
        assert!(config.is_target_visible(&pose(), Some(&near), &world));

        let far = Target::new(TARGET, Vec3::new(0.0, 0.0, 10.01));
        assert!(!config.is_target_visible(&pose(), Some(&far), &world));
    }

    #[test]
    fn test_distance_gate_is_three_dimensional() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let above = Target::new(TARGET, Vec3::new(0.0, 8.0, 8.0));
        assert!(!config.is_target_visible(&pose(), Some(&above), &Scripted::clear()));
    }

    #[test]
    fn test_angle_gate() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let world = Scripted::clear();

        // 40 degrees off forward: inside the 45 degree half-cone
        let at_degrees = |deg: f32| {
            Vec3::new(deg.to_radians().sin(), 0.0, deg.to_radians().cos()) * 5.0
        };
        let inside = Target::new(TARGET, at_degrees(40.0));
        assert!(config.is_target_visible(&pose(), Some(&inside), &world));

        // 50 degrees off forward: outside
        let outside = Target::new(TARGET, at_degrees(50.0));
        assert!(!config.is_target_visible(&pose(), Some(&outside), &world));

        let behind = Target::new(TARGET, Vec3::new(0.0, 0.0, -3.0));
        assert!(!config.is_target_visible(&pose(), Some(&behind), &world));
    }

    #[test]
    fn test_angle_ignores_height() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let raised = Target::new(TARGET, Vec3::new(0.0, 4.0, 3.0));
        assert!(config.is_target_visible(&pose(), Some(&raised), &Scripted::clear()));
    }

    #[test]
    fn test_blocked_line_of_sight() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let target = Target::new(TARGET, Vec3::new(0.0, 0.0, 5.0));
        let world = Scripted::blocked_by(WALL, WALL_LAYER);
        assert!(!config.is_target_visible(&pose(), Some(&target), &world));
        assert!(!config.has_line_of_sight(&pose(), &target, &world));
    }

    #[test]
    fn test_hit_on_target_part_counts_as_visible() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let target = Target::new(TARGET, Vec3::new(0.0, 0.0, 5.0));
        assert!(config.is_target_visible(&pose(), Some(&target), &Scripted::blocked_by(TARGET, 0)));
        let world = Scripted::blocked_by(TARGET_HAND, 0);
        assert!(config.is_target_visible(&pose(), Some(&target), &world));
    }

    #[test]
    fn test_mask_excludes_own_layer() {
        let target = Target::new(TARGET, Vec3::new(0.0, 0.0, 5.0));
        let world = Scripted::blocked_by(WALL, WALL_LAYER);

        let config =
            PerceptionConfig::new(10.0, 90.0).with_los_mask(LayerMask::all_except(WALL_LAYER));
        assert!(config.is_target_visible(&pose(), Some(&target), &world));
    }

    #[test]
    fn test_eye_height_raises_ray_origin() {
        let config = PerceptionConfig::new(12.0, 120.0).with_eye_height(1.2);
        let world = Scripted::clear();
        let target = Target::new(TARGET, Vec3::new(0.0, 0.0, 5.0));
        assert!(config.is_target_visible(&pose(), Some(&target), &world));
        assert_relative_eq!(world.last_origin.get().y, 1.2);
    }

    #[test]
    fn test_perceive_reports_planar_direction() {
        let config = PerceptionConfig::new(10.0, 90.0);
        let target = Target::new(TARGET, Vec3::new(3.0, 2.0, 4.0));
        let sighting = config
            .perceive(&pose(), Some(&target), &Scripted::clear())
            .unwrap();
        assert_relative_eq!(sighting.direction.x, 0.6);
        assert_relative_eq!(sighting.direction.y, 0.0);
        assert_relative_eq!(sighting.direction.z, 0.8);
        assert_relative_eq!(sighting.distance, 29f32.sqrt());
    }

    #[test]
    fn test_planar_angle() {
        assert_relative_eq!(planar_angle_degrees(Vec3::Z, Vec3::X), 90.0, epsilon = 1e-4);
        assert_relative_eq!(planar_angle_degrees(Vec3::Z, -Vec3::Z), 180.0, epsilon = 1e-4);
        assert_eq!(planar_angle_degrees(Vec3::Z, Vec3::Y), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(PerceptionConfig::new(10.0, 90.0).validate().is_ok());
        assert!(PerceptionConfig::new(10.0, 180.0).validate().is_ok());
        assert_eq!(
            PerceptionConfig::new(0.0, 90.0).validate(),
            Err(AiError::InvalidViewDistance(0.0))
        );
        assert_eq!(
            PerceptionConfig::new(10.0, 0.0).validate(),
            Err(AiError::InvalidViewAngle(0.0))
        );
        assert!(PerceptionConfig::new(10.0, 181.0).validate().is_err());
        assert!(PerceptionConfig::new(10.0, 90.0).with_eye_height(-1.0).validate().is_err());
    }
}
