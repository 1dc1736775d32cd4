use crate::Vec3;

/// Convert a Z-up file position into the engine's Y-up frame, applying a
/// uniform scale. The Y and Z components are swapped, nothing is negated.
#[inline]
pub fn remap_z_up(x: f32, y: f32, z: f32, scale: f32) -> Vec3 {
    Vec3::new(x, z, y) * scale
}
