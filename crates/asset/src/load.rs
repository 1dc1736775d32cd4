//! Loading from files on disk, including `mtllib` discovery and texture lookup.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::builder::build_from_asset;
use crate::error::{ParseError, ParseResult};
use crate::mesh::Mesh;
use crate::mtl::{MaterialLibrary, parse_materials};
use crate::obj::{ParsedAsset, parse_geometry};
use crate::options::LoadOptions;
use crate::texture::{DirResolver, ImageDecoder, TextureLoader};

fn open(path: &Path) -> ParseResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        log::debug!("cannot open {}: {}", path.display(), e);
        ParseError::ResourceNotFound {
            path: path.display().to_string(),
        }
    })?;
    Ok(BufReader::new(file))
}

/// Load an OBJ file and its material library into a mesh.
///
/// With `mtl == None` the first `mtllib` of the OBJ, relative to the OBJ's
/// directory, is used; a geometry file without `mtllib` gets no materials.
pub fn load_mesh_from_paths(
    obj: impl AsRef<Path>,
    mtl: Option<&Path>,
    options: &LoadOptions,
) -> ParseResult<Mesh> {
    let obj = obj.as_ref();
    log::info!("Loading mesh from {}", obj.display());
    let obj_dir = obj.parent().map(Path::to_path_buf).unwrap_or_default();

    let geometry = parse_geometry(open(obj)?, options.scale)?;

    let mtl_path: Option<PathBuf> = match mtl {
        Some(path) => Some(path.to_path_buf()),
        None => geometry.material_libs.first().map(|name| obj_dir.join(name)),
    };
    let materials = match &mtl_path {
        Some(path) => parse_materials(open(path)?)?,
        None => MaterialLibrary::new(),
    };

    let texture_root = options
        .texture_root
        .clone()
        .or_else(|| mtl_path.as_deref().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or(obj_dir);
    let resolver = DirResolver::new(texture_root);
    let decoder = ImageDecoder;

    let asset = ParsedAsset {
        geometry,
        materials,
    };
    build_from_asset(&asset, options, Some(TextureLoader::new(&resolver, &decoder)))
}
