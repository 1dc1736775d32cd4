//! CPU-side indexed mesh handed to the renderer.

use bytemuck::{Pod, Zeroable};
use corelib::Rgba;

use crate::texture::TextureData;

/// Vertex with position/normal/uv, interleaved in that order.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: std::mem::size_of::<MeshVertex>() as u32,
        attributes: [
            VertexAttribute {
                semantic: VertexSemantic::Position,
                components: 3,
                offset: 0,
            },
            VertexAttribute {
                semantic: VertexSemantic::Normal,
                components: 3,
                offset: 12,
            },
            VertexAttribute {
                semantic: VertexSemantic::TexCoord,
                components: 2,
                offset: 24,
            },
        ],
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSemantic {
    Position,
    Normal,
    TexCoord,
}

/// One `f32` attribute inside the interleaved vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset: u32,
}

/// Layout of the interleaved vertex buffer. Colors live in a separate,
/// tightly packed RGBA `f32` stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u32,
    pub attributes: [VertexAttribute; 3],
}

/// Substitutions made while building; never fatal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshDiagnostics {
    pub missing_normals: usize,
    pub missing_texcoords: usize,
    pub first_missing_normal_line: Option<usize>,
    pub first_missing_texcoord_line: Option<usize>,
}

impl MeshDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.missing_normals == 0 && self.missing_texcoords == 0
    }
}

/// Indexed triangle mesh: unique vertices, one color per vertex, triangle list indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    /// Parallel to `vertices`.
    pub colors: Vec<Rgba>,
    pub indices: Vec<u32>,
    pub texture: Option<TextureData>,
    pub diagnostics: MeshDiagnostics,
}

impl Mesh {
    pub fn layout(&self) -> VertexLayout {
        MeshVertex::LAYOUT
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Returns `true` if both buffers are non-empty, colors line up with
    /// vertices and every index points into the vertex pool.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty()
            && !self.indices.is_empty()
            && self.colors.len() == self.vertices.len()
            && self.indices.len() % 3 == 0
            && self
                .indices
                .iter()
                .all(|&i| (i as usize) < self.vertices.len())
    }
}
