//! Asset loading: OBJ geometry + MTL materials into a render-ready indexed mesh.
//!
//! Positions are scaled and converted from Z-up to Y-up, texture V is flipped,
//! polygons are fan-triangulated and identical corners are pooled once.

pub mod builder;
pub mod error;
mod lines;
pub mod load;
pub mod mesh;
pub mod mtl;
pub mod obj;
pub mod options;
pub mod texture;
pub mod upload;

pub use builder::{MeshBuilder, build_from_asset, build_mesh};
pub use error::{ParseError, ParseResult, SourceKind};
pub use load::load_mesh_from_paths;
pub use mesh::{Mesh, MeshDiagnostics, MeshVertex, VertexAttribute, VertexLayout, VertexSemantic};
pub use mtl::{Material, MaterialLibrary, parse_materials};
pub use obj::{DEFAULT_MATERIAL, Face, FaceVertex, ObjTables, ParsedAsset, parse_asset, parse_geometry};
pub use options::{DedupKeyMode, LoadOptions};
pub use texture::{
    DirResolver, ImageDecoder, TextureData, TextureDecoder, TextureFormat, TextureLoader,
    TextureResolver,
};
pub use upload::MeshUploader;
