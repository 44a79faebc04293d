//! Items the host draws each frame

use glam::Vec3;

use crate::bounds::{BoundingBox, Containment, Frustum};
use crate::graphics::{GraphicsError, RenderContext};

/// Main opaque/overlay stage
pub const STANDARD_STAGE: &str = "Standard";

/// Sort key within a stage; lower keys draw first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderOrderKey(pub u64);

impl RenderOrderKey {
    pub const MIN: Self = Self(0);
    /// Always drawn last
    pub const MAX: Self = Self(u64::MAX);

    /// Front-to-back key from a non-negative view distance
    pub fn from_distance(distance: f32) -> Self {
        // Bit patterns of non-negative floats sort like the floats themselves
        Self(u64::from(distance.max(0.0).to_bits()))
    }
}

/// Something with bounds that can be culled and drawn in one or more stages
pub trait RenderItem<C: RenderContext + ?Sized> {
    /// World-space bounds
    fn bounds(&self) -> BoundingBox;

    /// True when the item should be skipped for this frustum
    fn cull(&self, frustum: &Frustum) -> bool {
        frustum.contains_box(&self.bounds()) == Containment::Disjoint
    }

    fn render_order_key(&self, viewer_position: Vec3) -> RenderOrderKey;

    /// Stage names this item draws in
    fn stages(&self) -> &'static [&'static str];

    fn render(&mut self, context: &mut C, stage: &str) -> Result<(), GraphicsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ordering() {
        assert!(RenderOrderKey::MIN < RenderOrderKey::MAX);
        assert!(RenderOrderKey::from_distance(1.0) < RenderOrderKey::from_distance(2.5));
        assert!(RenderOrderKey::from_distance(1e30) < RenderOrderKey::MAX);
        assert_eq!(RenderOrderKey::from_distance(-3.0), RenderOrderKey::from_distance(0.0));
    }
}
