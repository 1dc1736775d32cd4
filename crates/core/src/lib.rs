//! Core shared types: math re-exports, colors, axis conventions.

pub use glam::{Vec2, Vec3, vec2, vec3};

pub mod axis;
pub mod color;

pub use axis::remap_z_up;
pub use color::Rgba;
