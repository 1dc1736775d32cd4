//! Per-load configuration.

use std::path::PathBuf;

use corelib::Rgba;

/// What makes two face corners the same pooled vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupKeyMode {
    /// Position, normal and texcoord only. A corner shared by faces of
    /// different colors keeps the color of the first face that reached it.
    Geometry,
    /// Geometry plus the face's resolved color.
    #[default]
    GeometryAndColor,
}

impl DedupKeyMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "geometry" | "geo" => Some(Self::Geometry),
            "color" | "geometry+color" => Some(Self::GeometryAndColor),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Uniform scale applied to positions.
    pub scale: f32,
    /// Color of faces whose material is unknown or has no `Kd`.
    pub fallback_color: Rgba,
    pub dedup: DedupKeyMode,
    /// Directory `map_Kd` paths are resolved against when loading from paths.
    /// Defaults to the material file's directory.
    pub texture_root: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            fallback_color: Rgba::WHITE,
            dedup: DedupKeyMode::default(),
            texture_root: None,
        }
    }
}

impl LoadOptions {
    #[inline]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn with_fallback_color(mut self, color: Rgba) -> Self {
        self.fallback_color = color;
        self
    }

    #[inline]
    pub fn with_dedup(mut self, dedup: DedupKeyMode) -> Self {
        self.dedup = dedup;
        self
    }

    #[inline]
    pub fn with_texture_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.texture_root = Some(root.into());
        self
    }
}
