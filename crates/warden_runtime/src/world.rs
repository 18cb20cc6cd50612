//! Box World
//!
//! A flat walkable rectangle populated with axis-aligned box colliders.
//! Stands in for the physics scene and the navigation mesh: raycasts test
//! the boxes, and navigable sampling snaps points onto the rectangle while
//! keeping them out of solid boxes.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use warden_ai::spatial::{LayerMask, RaycastHit, SpatialQuery};

/// Ring directions tried when a sampled point lands inside a solid box
const SAMPLE_DIRECTIONS: usize = 8;
/// Spacing between sampling rings
const SAMPLE_RING_STEP: f32 = 0.5;

/// Walkable floor area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Walkable {
    /// Minimum corner on the plane (x, z)
    pub min: Vec2,
    /// Maximum corner on the plane (x, z)
    pub max: Vec2,
    /// Floor height
    #[serde(default)]
    pub ground_y: f32,
}

impl Walkable {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max, ground_y: 0.0 }
    }

    /// Closest floor point to `point`
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        // max/min rather than clamp: an inverted rectangle must not panic
        Vec3::new(
            point.x.max(self.min.x).min(self.max.x),
            self.ground_y,
            point.z.max(self.min.y).min(self.max.y),
        )
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.y
            && point.z <= self.max.y
    }
}

impl Default for Walkable {
    fn default() -> Self {
        Self::new(Vec2::splat(-20.0), Vec2::splat(20.0))
    }
}

/// Axis-aligned box collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub layer: u8,
    /// Whether walkers are kept out of the box
    pub solid: bool,
}

impl Collider {
    /// Solid static geometry
    pub fn solid(center: Vec3, half_extents: Vec3, layer: u8) -> Self {
        Self { center, half_extents, layer, solid: true }
    }

    /// Body that blocks rays but not walkers
    pub fn body(center: Vec3, half_extents: Vec3, layer: u8) -> Self {
        Self { center, half_extents, layer, solid: false }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }

    /// Distance along the ray to the box surface (slab test)
    ///
    /// Rays starting inside the box never hit it.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        if self.contains(origin) {
            return None;
        }

        let min = self.min().to_array();
        let max = self.max().to_array();
        let origin = origin.to_array();
        let direction = direction.to_array();

        let mut t_near = 0.0_f32;
        let mut t_far = max_distance;
        for axis in 0..3 {
            if direction[axis].abs() < f32::EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }
}

/// The simulated scene
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    walkable: Walkable,
    colliders: BTreeMap<u64, Collider>,
    /// Child entity -> entity it is attached to
    parents: BTreeMap<u64, u64>,
}

impl SimWorld {
    pub fn new(walkable: Walkable) -> Self {
        Self {
            walkable,
            colliders: BTreeMap::new(),
            parents: BTreeMap::new(),
        }
    }

    pub fn walkable(&self) -> &Walkable {
        &self.walkable
    }

    pub fn add_collider(&mut self, entity: u64, collider: Collider) {
        self.colliders.insert(entity, collider);
    }

    pub fn collider(&self, entity: u64) -> Option<&Collider> {
        self.colliders.get(&entity)
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Move a collider; unknown entities are ignored
    pub fn set_collider_center(&mut self, entity: u64, center: Vec3) {
        if let Some(collider) = self.colliders.get_mut(&entity) {
            collider.center = center;
        }
    }

    /// Attach `child` to `parent` so hits on the child count as the parent
    pub fn attach(&mut self, child: u64, parent: u64) {
        self.parents.insert(child, parent);
    }

    /// Whether a walker standing at `point` would be inside solid geometry
    pub fn is_blocked(&self, point: Vec3) -> bool {
        self.colliders
            .values()
            .any(|collider| collider.solid && collider.contains(point))
    }

    fn is_standable(&self, point: Vec3) -> bool {
        self.walkable.contains(point) && !self.is_blocked(point)
    }
}

impl SpatialQuery for SimWorld {
    fn raycast_first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        let mut best: Option<RaycastHit> = None;
        for (&entity, collider) in &self.colliders {
            if !mask.contains(collider.layer) {
                continue;
            }
            let Some(distance) = collider.ray_distance(origin, direction, max_distance) else {
                continue;
            };
            if best.map_or(true, |hit| distance < hit.distance) {
                best = Some(RaycastHit {
                    entity,
                    point: origin + direction * distance,
                    distance,
                    layer: collider.layer,
                });
            }
        }
        best
    }

    fn sample_navigable_point(&self, near: Vec3, search_radius: f32) -> Option<Vec3> {
        let within = |p: Vec3| {
            let d = p - near;
            Vec2::new(d.x, d.z).length() <= search_radius
        };

        let snapped = self.walkable.clamp(near);
        if within(snapped) && !self.is_blocked(snapped) {
            return Some(snapped);
        }

        // Walk outward in rings until a free floor point turns up
        let rings = (search_radius / SAMPLE_RING_STEP).floor() as usize;
        for ring in 1..=rings {
            let r = ring as f32 * SAMPLE_RING_STEP;
            for i in 0..SAMPLE_DIRECTIONS {
                let angle = i as f32 * std::f32::consts::TAU / SAMPLE_DIRECTIONS as f32;
                let candidate = snapped + Vec3::new(angle.cos(), 0.0, angle.sin()) * r;
                if within(candidate) && self.is_standable(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn is_part_of(&self, entity: u64, root: u64) -> bool {
        let mut current = entity;
        for _ in 0..=self.parents.len() {
            if current == root {
                return true;
            }
            match self.parents.get(&current) {
                Some(&parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
