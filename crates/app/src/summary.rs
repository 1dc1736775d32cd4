//! Stand-in uploader that only records what a GPU upload would receive.

use std::fmt;

use anyhow::{Result, ensure};
use asset::{Mesh, MeshDiagnostics, MeshUploader, VertexLayout};

#[derive(Debug)]
pub struct MeshSummary {
    pub layout: VertexLayout,
    pub vertex_count: usize,
    pub index_count: usize,
    pub vertex_bytes: usize,
    pub color_bytes: usize,
    pub index_bytes: usize,
    pub texture: Option<(u32, u32)>,
    pub diagnostics: MeshDiagnostics,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vertices:  {} ({} bytes, stride {})", self.vertex_count, self.vertex_bytes, self.layout.stride)?;
        for attr in &self.layout.attributes {
            writeln!(f, "  {:?}: {} x f32 @ {}", attr.semantic, attr.components, attr.offset)?;
        }
        writeln!(f, "colors:    {} bytes", self.color_bytes)?;
        writeln!(f, "indices:   {} ({} bytes)", self.index_count, self.index_bytes)?;
        match self.texture {
            Some((w, h)) => writeln!(f, "texture:   {}x{} RGBA8", w, h)?,
            None => writeln!(f, "texture:   none (flat colors)")?,
        }
        if self.diagnostics.is_clean() {
            write!(f, "defaults:  none")
        } else {
            write!(
                f,
                "defaults:  {} normal(s), {} texcoord(s)",
                self.diagnostics.missing_normals, self.diagnostics.missing_texcoords
            )
        }
    }
}

/// Counts uploads; hands back a summary instead of device buffers.
#[derive(Debug, Default)]
pub struct SummaryUploader {
    uploaded: usize,
}

impl MeshUploader for SummaryUploader {
    type Handle = MeshSummary;

    fn upload(&mut self, mesh: Mesh) -> Result<MeshSummary> {
        ensure!(mesh.is_valid(), "Mesh has no triangles or inconsistent buffers");
        self.uploaded += 1;
        log::info!(
            "Upload #{}: {} vertices, {} indices",
            self.uploaded,
            mesh.vertex_count(),
            mesh.index_count()
        );
        Ok(MeshSummary {
            layout: mesh.layout(),
            vertex_count: mesh.vertex_count(),
            index_count: mesh.index_count(),
            vertex_bytes: mesh.vertex_bytes().len(),
            color_bytes: mesh.color_bytes().len(),
            index_bytes: mesh.index_bytes().len(),
            texture: mesh.texture.as_ref().map(|t| (t.width, t.height)),
            diagnostics: mesh.diagnostics,
        })
    }
}
