//! Geometry (`.obj`) parser producing raw attribute tables and triangulated faces.

use std::io::BufRead;

use corelib::{Vec2, Vec3, remap_z_up, vec2};

use crate::error::{ParseError, ParseResult, SourceKind, parse_f32};
use crate::lines::LossyLines;
use crate::mtl::{MaterialLibrary, parse_materials};

/// Material name given to faces that appear before any `usemtl`.
pub const DEFAULT_MATERIAL: &str = "default";

const ORIGIN: SourceKind = SourceKind::Geometry;

/// 0-based references of one triangle corner into the [`ObjTables`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceVertex {
    pub position: usize,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

/// One triangle after fan triangulation.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub corners: [FaceVertex; 3],
    pub material: String,
    /// Source line of the `f` directive the triangle came from.
    pub line: usize,
}

/// Everything read from a geometry stream, in file order.
#[derive(Clone, Debug, Default)]
pub struct ObjTables {
    /// Scaled, Y-up positions.
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// V already flipped (`1 - v`).
    pub texcoords: Vec<Vec2>,
    pub faces: Vec<Face>,
    /// `mtllib` names in declaration order.
    pub material_libs: Vec<String>,
}

impl ObjTables {
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

/// Raw tables of both input files.
#[derive(Clone, Debug, Default)]
pub struct ParsedAsset {
    pub geometry: ObjTables,
    pub materials: MaterialLibrary,
}

/// Parse a geometry stream and its optional material stream.
///
/// The material stream is consumed in full first so faces may name materials
/// declared anywhere in it.
pub fn parse_asset<G: BufRead, M: BufRead>(
    geometry: G,
    material: Option<M>,
    scale: f32,
) -> ParseResult<ParsedAsset> {
    let materials = match material {
        Some(reader) => parse_materials(reader)?,
        None => MaterialLibrary::new(),
    };
    let geometry = parse_geometry(geometry, scale)?;
    Ok(ParsedAsset {
        geometry,
        materials,
    })
}

/// Parse a geometry stream; positions are multiplied by `scale`.
pub fn parse_geometry<R: BufRead>(reader: R, scale: f32) -> ParseResult<ObjTables> {
    if !scale.is_finite() || scale <= 0.0 {
        log::warn!("non-positive or non-finite scale {scale}, using it anyway");
    }

    let mut tables = ObjTables::default();
    let mut current_material: Option<String> = None;
    let mut polygon: Vec<FaceVertex> = Vec::new();

    for line in LossyLines::new(reader, ORIGIN) {
        let (line_no, line) = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else { continue };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), ORIGIN, line_no)?;
                let y = parse_f32(parts.next(), ORIGIN, line_no)?;
                let z = parse_f32(parts.next(), ORIGIN, line_no)?;
                tables.positions.push(remap_z_up(x, y, z, scale));
            }
            "vn" => {
                let x = parse_f32(parts.next(), ORIGIN, line_no)?;
                let y = parse_f32(parts.next(), ORIGIN, line_no)?;
                let z = parse_f32(parts.next(), ORIGIN, line_no)?;
                tables.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let u = parse_f32(parts.next(), ORIGIN, line_no)?;
                let v = parse_f32(parts.next(), ORIGIN, line_no)?;
                tables.texcoords.push(vec2(u, 1.0 - v));
            }
            "usemtl" => {
                let name = parts.next().ok_or_else(|| ParseError::MissingArgument {
                    origin: ORIGIN,
                    line: line_no,
                    directive: tag.to_owned(),
                })?;
                current_material = Some(name.to_owned());
            }
            "mtllib" => {
                tables.material_libs.extend(parts.map(str::to_owned));
            }
            "f" => {
                polygon.clear();
                for group in parts {
                    polygon.push(parse_face_vertex(group, &tables, line_no)?);
                }
                if polygon.len() < 3 {
                    return Err(ParseError::MalformedFace {
                        origin: ORIGIN,
                        line: line_no,
                        token: trimmed.to_owned(),
                    });
                }
                let material = current_material.as_deref().unwrap_or(DEFAULT_MATERIAL);
                // Fan from the first corner; only correct for convex planar polygons.
                for i in 1..polygon.len() - 1 {
                    tables.faces.push(Face {
                        corners: [polygon[0], polygon[i], polygon[i + 1]],
                        material: material.to_owned(),
                        line: line_no,
                    });
                }
            }
            _ => {
                log::trace!("geometry line {line_no}: ignoring '{tag}'");
            }
        }
    }

    log::debug!(
        "parsed geometry: {} positions, {} normals, {} texcoords, {} triangles",
        tables.positions.len(),
        tables.normals.len(),
        tables.texcoords.len(),
        tables.faces.len()
    );
    Ok(tables)
}

/// Parse `v`, `v/vt`, `v/vt/vn` or `v//vn`.
fn parse_face_vertex(group: &str, tables: &ObjTables, line_no: usize) -> ParseResult<FaceVertex> {
    let malformed = || ParseError::MalformedFace {
        origin: ORIGIN,
        line: line_no,
        token: group.to_owned(),
    };

    let mut segments = group.split('/');
    let position = match segments.next() {
        Some(s) if !s.is_empty() => resolve_index(s, tables.positions.len(), line_no)?,
        _ => return Err(malformed()),
    };
    let texcoord = match segments.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, tables.texcoords.len(), line_no)?),
        _ => None,
    };
    let normal = match segments.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, tables.normals.len(), line_no)?),
        // `1/2/` is not one of the accepted forms.
        Some(_) => return Err(malformed()),
        None => None,
    };
    if segments.next().is_some() {
        return Err(malformed());
    }

    Ok(FaceVertex {
        position,
        texcoord,
        normal,
    })
}

/// Turn a 1-based (or negative, relative) index into a 0-based one.
fn resolve_index(token: &str, len: usize, line_no: usize) -> ParseResult<usize> {
    let raw = token.parse::<i64>().map_err(|_| ParseError::BadNumber {
        origin: ORIGIN,
        line: line_no,
        token: token.to_owned(),
    })?;

    let idx = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };

    if raw == 0 || idx < 0 || idx as usize >= len {
        return Err(ParseError::IndexOutOfRange {
            origin: ORIGIN,
            line: line_no,
            token: token.to_owned(),
            len,
        });
    }
    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use corelib::vec3;

    fn parse(src: &str) -> ParseResult<ObjTables> {
        parse_geometry(io::Cursor::new(src), 1.0)
    }

    fn corner(position: usize) -> FaceVertex {
        FaceVertex {
            position,
            texcoord: None,
            normal: None,
        }
    }

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let tables = parse(src).expect("parse triangle");
        assert_eq!(tables.positions.len(), 3);
        assert_eq!(tables.triangle_count(), 1);
        let face = &tables.faces[0];
        assert_eq!(face.material, DEFAULT_MATERIAL);
        assert_eq!(face.line, 9);
        assert_eq!(
            face.corners[2],
            FaceVertex {
                position: 2,
                texcoord: Some(2),
                normal: Some(0)
            }
        );
    }

    #[test]
    fn indices_are_converted_to_zero_based() {
        let tables = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(tables.faces[0].corners, [corner(0), corner(1), corner(2)]);
    }

    #[test]
    fn positions_are_scaled_and_remapped() {
        let tables = parse_geometry(io::Cursor::new("v 1 2 3\n"), 0.5).unwrap();
        assert_eq!(tables.positions[0], vec3(0.5, 1.5, 1.0));
    }

    #[test]
    fn normals_are_kept_as_is_and_v_is_flipped() {
        let tables = parse("vn 0 0.6 0.8\nvt 0.25 0.75 0.0\n").unwrap();
        assert_eq!(tables.normals[0], vec3(0.0, 0.6, 0.8));
        assert_eq!(tables.texcoords[0], vec2(0.25, 0.25));
    }

    #[test]
    fn quad_is_fanned_from_first_corner() {
        let tables = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();
        assert_eq!(tables.triangle_count(), 2);
        assert_eq!(tables.faces[0].corners, [corner(0), corner(1), corner(2)]);
        assert_eq!(tables.faces[1].corners, [corner(0), corner(2), corner(3)]);
    }

    #[test]
    fn pentagon_yields_three_triangles() {
        let src = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let tables = parse(src).unwrap();
        let firsts: Vec<_> = tables.faces.iter().map(|f| f.corners[0].position).collect();
        assert_eq!(firsts, [0, 0, 0]);
        assert_eq!(tables.faces[2].corners[2], corner(4));
    }

    #[test]
    fn all_slash_forms_are_accepted() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1 2/1 3/1/1\nf 1//1 2//1 3//1\n";
        let tables = parse(src).unwrap();
        let [a, b, c] = tables.faces[0].corners;
        assert_eq!((a.texcoord, a.normal), (None, None));
        assert_eq!((b.texcoord, b.normal), (Some(0), None));
        assert_eq!((c.texcoord, c.normal), (Some(0), Some(0)));
        let d = tables.faces[1].corners[0];
        assert_eq!((d.texcoord, d.normal), (None, Some(0)));
    }

    #[test]
    fn negative_indices_are_relative() {
        let tables = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(tables.faces[0].corners, [corner(0), corner(1), corner(2)]);
    }

    #[test]
    fn usemtl_tags_following_faces() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nusemtl Red\nf 1 2 3\nf 3 2 1\n";
        let tables = parse(src).unwrap();
        let names: Vec<_> = tables.faces.iter().map(|f| f.material.as_str()).collect();
        assert_eq!(names, ["default", "Red", "Red"]);
    }

    #[test]
    fn mtllib_is_recorded() {
        let tables = parse("mtllib scene.mtl\no Cube\ns off\n").unwrap();
        assert_eq!(tables.material_libs, ["scene.mtl"]);
    }

    #[test]
    fn bad_number_in_vertex() {
        let err = parse("v 0 0 0\nv 1 abc 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::BadNumber { origin: SourceKind::Geometry, line: 2, ref token } if token == "abc"
        ));
    }

    #[test]
    fn truncated_vertex_is_bad_number() {
        assert!(matches!(parse("v 1 2\n"), Err(ParseError::BadNumber { line: 1, .. })));
    }

    #[test]
    fn forward_reference_is_out_of_range() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::IndexOutOfRange { line: 3, len: 2, ref token, .. } if token == "3"
        ));
    }

    #[test]
    fn zero_index_is_out_of_range() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::IndexOutOfRange { .. }));
    }

    #[test]
    fn normal_index_without_normals_is_out_of_range() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n").unwrap_err();
        assert!(matches!(err, ParseError::IndexOutOfRange { len: 0, .. }));
    }

    #[test]
    fn short_face_is_malformed() {
        let err = parse("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedFace { line: 3, .. }));
    }

    #[test]
    fn unsupported_slash_forms_are_malformed() {
        let base = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n";
        for face in ["f 1/1/1/1 2 3", "f /1 2 3", "f 1/1/ 2 3"] {
            let err = parse(&format!("{base}{face}\n")).unwrap_err();
            assert!(matches!(err, ParseError::MalformedFace { .. }), "{face}: {err}");
        }
    }

    #[test]
    fn non_integer_index_is_bad_number() {
        let err = parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n").unwrap_err();
        assert!(matches!(err, ParseError::BadNumber { .. }));
    }

    #[test]
    fn comments_blank_and_unknown_lines_are_skipped() {
        let tables = parse("# header\n\n   \ng group\nfoo bar\nv 1 1 1\n").unwrap();
        assert_eq!(tables.positions.len(), 1);
        assert!(tables.faces.is_empty());
    }

    #[test]
    fn usemtl_without_name_is_rejected() {
        let err = parse("v 0 0 0\nusemtl\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingArgument { origin: SourceKind::Geometry, line: 2, ref directive } if directive == "usemtl"
        ));
    }

    #[test]
    fn latin1_comment_still_loads() {
        let src: &[u8] = b"# Caf\xE9\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let tables = parse_geometry(io::Cursor::new(src), 1.0).expect("lossy parse");
        assert_eq!(tables.positions.len(), 3);
        assert_eq!(tables.faces[0].line, 5);
    }

    #[test]
    fn latin1_material_names_still_match() {
        let geometry: &[u8] = b"usemtl Caf\xE9\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let material: &[u8] = b"newmtl Caf\xE9\nKd 0 1 0\n";
        let asset = parse_asset(
            io::Cursor::new(geometry),
            Some(io::Cursor::new(material)),
            1.0,
        )
        .unwrap();
        let name = &asset.geometry.faces[0].material;
        assert_eq!(asset.materials.color_of(name), Some(corelib::Rgba::GREEN));
    }

    #[test]
    fn asset_reads_materials_and_geometry() {
        let geometry = "usemtl Green\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let material = "newmtl Green\nKd 0 1 0\n";
        let asset = parse_asset(
            io::Cursor::new(geometry),
            Some(io::Cursor::new(material)),
            1.0,
        )
        .unwrap();
        assert_eq!(asset.materials.len(), 1);
        assert_eq!(asset.geometry.faces[0].material, "Green");
    }
}
