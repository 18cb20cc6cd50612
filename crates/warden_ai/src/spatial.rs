//! Spatial query seam: raycasts and navigable-point sampling

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Bit for `layer`; layers past the mask width have no bit
const fn layer_bit(layer: u8) -> u32 {
    match 1u32.checked_shl(layer as u32) {
        Some(bit) => bit,
        None => 0,
    }
}

/// Bitmask of collision layers a query is allowed to hit
///
/// Only layers 0..32 exist. Out-of-range layers are never contained, and
/// adding or removing them leaves the mask unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Hit every layer
    pub const ALL: Self = Self(u32::MAX);
    /// Hit nothing
    pub const NONE: Self = Self(0);

    /// Mask containing a single layer
    pub const fn layer(layer: u8) -> Self {
        Self(layer_bit(layer))
    }

    /// Every layer except `layer`
    pub const fn all_except(layer: u8) -> Self {
        Self::ALL.excluding(layer)
    }

    /// Remove a layer from the mask
    pub const fn excluding(self, layer: u8) -> Self {
        Self(self.0 & !layer_bit(layer))
    }

    /// Add a layer to the mask
    pub const fn including(self, layer: u8) -> Self {
        Self(self.0 | layer_bit(layer))
    }

    /// Check whether a layer is in the mask
    pub const fn contains(self, layer: u8) -> bool {
        self.0 & layer_bit(layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Result of a raycast query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Entity owning the collider that was hit
    pub entity: u64,
    /// Hit point in world space
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
    /// Layer of the collider that was hit
    pub layer: u8,
}

/// World queries the behavior core needs from the host
pub trait SpatialQuery {
    /// Cast a ray and return the first solid hit within `max_distance`
    ///
    /// `direction` is normalized. Colliders whose layer is not in `mask` are
    /// ignored.
    fn raycast_first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RaycastHit>;

    /// Nearest navigable point within `search_radius` of `near`
    fn sample_navigable_point(&self, near: Vec3, search_radius: f32) -> Option<Vec3>;

    /// Whether `entity` is `root` itself or a part attached to it
    fn is_part_of(&self, entity: u64, root: u64) -> bool {
        entity == root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let mask = LayerMask::layer(2);
        assert!(mask.contains(2));
        assert!(!mask.contains(1));

        let mask = mask.including(5);
        assert!(mask.contains(5));
        assert_eq!(mask.excluding(2), LayerMask::layer(5));
    }

    #[test]
    fn test_all_except() {
        let mask = LayerMask::all_except(3);
        assert!(!mask.contains(3));
        assert!(mask.contains(0));
        assert!(mask.contains(31));
        assert_eq!(LayerMask::default(), LayerMask::ALL);
        assert!(!LayerMask::NONE.contains(0));
    }

    #[test]
    fn test_out_of_range_layer_has_no_bit() {
        assert_eq!(LayerMask::layer(32), LayerMask::NONE);
        assert_eq!(LayerMask::layer(200), LayerMask::NONE);
        assert!(!LayerMask::ALL.contains(40));
        assert_eq!(LayerMask::ALL.excluding(40), LayerMask::ALL);
        assert_eq!(LayerMask::NONE.including(255), LayerMask::NONE);
        assert_eq!(LayerMask::all_except(64), LayerMask::ALL);
    }
}
