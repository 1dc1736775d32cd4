//! Seam towards the GPU: whoever owns device buffers implements [`MeshUploader`].

use anyhow::Result;

use crate::mesh::Mesh;

/// Takes ownership of a built mesh and turns it into device-side resources.
pub trait MeshUploader {
    type Handle;

    fn upload(&mut self, mesh: Mesh) -> Result<Self::Handle>;
}
