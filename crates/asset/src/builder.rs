//! Expands parsed faces into a deduplicated, indexed mesh.

use std::collections::HashMap;
use std::io::BufRead;

use corelib::Rgba;

use crate::error::{ParseError, ParseResult, SourceKind};
use crate::mesh::{Mesh, MeshDiagnostics, MeshVertex};
use crate::mtl::MaterialLibrary;
use crate::obj::{Face, ObjTables, ParsedAsset, parse_asset};
use crate::options::{DedupKeyMode, LoadOptions};
use crate::texture::{TextureData, TextureLoader};

const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
const DEFAULT_UV: [f32; 2] = [0.0, 0.0];

/// Bit-exact identity of a pooled vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct DedupKey {
    position: [u32; 3],
    normal: [u32; 3],
    uv: [u32; 2],
    color: Option<[u32; 4]>,
}

impl DedupKey {
    fn new(vertex: &MeshVertex, color: Option<Rgba>) -> Self {
        Self {
            position: vertex.position.map(f32::to_bits),
            normal: vertex.normal.map(f32::to_bits),
            uv: vertex.uv.map(f32::to_bits),
            color: color.map(Rgba::to_bits),
        }
    }
}

/// Accumulates the vertex, color and index pools of one mesh.
#[derive(Debug)]
pub struct MeshBuilder {
    fallback_color: Rgba,
    mode: DedupKeyMode,
    vertices: Vec<MeshVertex>,
    colors: Vec<Rgba>,
    indices: Vec<u32>,
    lookup: HashMap<DedupKey, u32>,
    diagnostics: MeshDiagnostics,
}

impl MeshBuilder {
    pub fn new(fallback_color: Rgba, mode: DedupKeyMode) -> Self {
        Self {
            fallback_color,
            mode,
            vertices: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            lookup: HashMap::new(),
            diagnostics: MeshDiagnostics::default(),
        }
    }

    /// Reserve pool space for roughly `triangles` triangles.
    pub fn with_capacity(mut self, triangles: usize) -> Self {
        self.indices.reserve(triangles * 3);
        self.lookup.reserve(triangles);
        self
    }

    /// Append one triangle, reusing pooled vertices with an identical key.
    pub fn push_face(
        &mut self,
        tables: &ObjTables,
        materials: &MaterialLibrary,
        face: &Face,
    ) -> ParseResult<()> {
        let color = materials
            .color_of(&face.material)
            .unwrap_or(self.fallback_color);

        for corner in &face.corners {
            let out_of_range = |token: usize, len: usize| ParseError::IndexOutOfRange {
                origin: SourceKind::Geometry,
                line: face.line,
                token: (token + 1).to_string(),
                len,
            };

            let position = tables
                .positions
                .get(corner.position)
                .copied()
                .ok_or_else(|| out_of_range(corner.position, tables.positions.len()))?;

            let normal = match corner.normal {
                Some(i) => tables
                    .normals
                    .get(i)
                    .copied()
                    .ok_or_else(|| out_of_range(i, tables.normals.len()))?
                    .to_array(),
                None => {
                    self.diagnostics.missing_normals += 1;
                    let first = &mut self.diagnostics.first_missing_normal_line;
                    *first = first.or(Some(face.line));
                    DEFAULT_NORMAL
                }
            };

            let uv = match corner.texcoord {
                Some(i) => tables
                    .texcoords
                    .get(i)
                    .copied()
                    .ok_or_else(|| out_of_range(i, tables.texcoords.len()))?
                    .to_array(),
                None => {
                    self.diagnostics.missing_texcoords += 1;
                    let first = &mut self.diagnostics.first_missing_texcoord_line;
                    *first = first.or(Some(face.line));
                    DEFAULT_UV
                }
            };

            let index = self.intern(MeshVertex::new(position.to_array(), normal, uv), color, face.line)?;
            self.indices.push(index);
        }
        Ok(())
    }

    fn intern(&mut self, vertex: MeshVertex, color: Rgba, line: usize) -> ParseResult<u32> {
        let key_color = match self.mode {
            DedupKeyMode::Geometry => None,
            DedupKeyMode::GeometryAndColor => Some(color),
        };
        let key = DedupKey::new(&vertex, key_color);
        if let Some(&index) = self.lookup.get(&key) {
            return Ok(index);
        }
        let index = pool_index(self.vertices.len(), line)?;
        self.vertices.push(vertex);
        self.colors.push(color);
        self.lookup.insert(key, index);
        Ok(index)
    }

    /// Hand over the pools, attaching `texture` if one was resolved.
    pub fn finish(self, texture: Option<TextureData>) -> Mesh {
        let d = &self.diagnostics;
        if d.missing_normals > 0 {
            log::warn!(
                "{} corner(s) without a normal got (0,0,1), first on line {}",
                d.missing_normals,
                d.first_missing_normal_line.unwrap_or_default()
            );
        }
        if d.missing_texcoords > 0 {
            log::debug!(
                "{} corner(s) without a texcoord got (0,0), first on line {}",
                d.missing_texcoords,
                d.first_missing_texcoord_line.unwrap_or_default()
            );
        }

        Mesh {
            vertices: self.vertices,
            colors: self.colors,
            indices: self.indices,
            texture,
            diagnostics: self.diagnostics,
        }
    }
}

/// Index of the next pooled vertex, if it still fits a `u32` index buffer.
fn pool_index(len: usize, line: usize) -> ParseResult<u32> {
    u32::try_from(len).map_err(|_| ParseError::TooManyVertices { line })
}

/// Build a mesh from already parsed tables.
pub fn build_from_asset(
    asset: &ParsedAsset,
    options: &LoadOptions,
    textures: Option<TextureLoader<'_>>,
) -> ParseResult<Mesh> {
    let tables = &asset.geometry;
    let mut builder = MeshBuilder::new(options.fallback_color, options.dedup)
        .with_capacity(tables.triangle_count());

    for face in &tables.faces {
        builder.push_face(tables, &asset.materials, face)?;
    }

    let texture = textures.and_then(|loader| resolve_texture(asset, loader));
    let mesh = builder.finish(texture);
    log::info!(
        "Built mesh: {} vertices, {} indices, {} texture",
        mesh.vertex_count(),
        mesh.index_count(),
        if mesh.has_texture() { "with" } else { "no" }
    );
    Ok(mesh)
}

/// Parse both streams and build the mesh in one call.
pub fn build_mesh<G: BufRead, M: BufRead>(
    geometry: G,
    material: Option<M>,
    options: &LoadOptions,
    textures: Option<TextureLoader<'_>>,
) -> ParseResult<Mesh> {
    let asset = parse_asset(geometry, material, options.scale)?;
    build_from_asset(&asset, options, textures)
}

/// First material, in face order, whose texture path resolves; decoded once.
/// A decode failure leaves the mesh untextured rather than trying further paths.
fn resolve_texture(asset: &ParsedAsset, loader: TextureLoader<'_>) -> Option<TextureData> {
    let mut tried: Vec<&str> = Vec::new();
    for face in &asset.geometry.faces {
        let name = face.material.as_str();
        if tried.contains(&name) {
            continue;
        }
        tried.push(name);

        let Some(path) = asset.materials.texture_of(name) else {
            continue;
        };
        let Some(bytes) = loader.resolver.resolve(path) else {
            continue;
        };
        return match loader.decoder.decode(&bytes) {
            Ok(texture) => {
                log::info!("Using texture '{}' from material '{}'", path, name);
                Some(texture)
            }
            Err(e) => {
                log::warn!("Texture '{}' failed to decode, mesh stays untextured: {:#}", path, e);
                None
            }
        };
    }
    None
}
