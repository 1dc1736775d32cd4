//! Material library (`.mtl`) parser: diffuse color and diffuse texture per material.

use std::collections::HashMap;
use std::io::BufRead;

use corelib::Rgba;

use crate::error::{ParseError, ParseResult, SourceKind, parse_f32};
use crate::lines::LossyLines;

/// One `newmtl` record.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    /// `Kd` color; `None` when the material never declared one.
    pub base_color: Option<Rgba>,
    /// `map_Kd` path exactly as written in the file.
    pub texture: Option<String>,
    /// `d` / `Tr`, applied on top of `Kd`.
    alpha: Option<f32>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_color: None,
            texture: None,
            alpha: None,
        }
    }

    /// Diffuse color with dissolve applied, if a `Kd` was declared.
    ///
    /// `d` is opacity. `Tr` is read as transparency (`alpha = 1 - Tr`); exporters
    /// that write opacity into `Tr` come out inverted. The last of the two wins.
    pub fn color(&self) -> Option<Rgba> {
        let color = self.base_color?;
        Some(match self.alpha {
            Some(a) => color.with_alpha(a),
            None => color,
        })
    }
}

/// Materials keyed by name, kept in declaration order.
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    by_name: HashMap<String, usize>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.by_name.get(name).map(|&i| &self.materials[i])
    }

    /// Color of `name`, `None` if unknown or declared without `Kd`.
    pub fn color_of(&self, name: &str) -> Option<Rgba> {
        self.get(name).and_then(Material::color)
    }

    pub fn texture_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|m| m.texture.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    /// Insert or replace a material.
    pub fn insert(&mut self, material: Material) {
        match self.by_name.get(&material.name) {
            Some(&i) => self.materials[i] = material,
            None => {
                self.by_name
                    .insert(material.name.clone(), self.materials.len());
                self.materials.push(material);
            }
        }
    }

    /// Index of `name`, creating an empty record for it when absent.
    fn open(&mut self, name: &str) -> usize {
        if let Some(&i) = self.by_name.get(name) {
            return i;
        }
        self.insert(Material::new(name));
        self.materials.len() - 1
    }
}

/// Parse a whole material library from `reader`.
pub fn parse_materials<R: BufRead>(reader: R) -> ParseResult<MaterialLibrary> {
    const ORIGIN: SourceKind = SourceKind::Material;

    let mut library = MaterialLibrary::new();
    let mut current: Option<usize> = None;

    for line in LossyLines::new(reader, ORIGIN) {
        let (line_no, line) = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else { continue };
        let missing = || ParseError::MissingArgument {
            origin: ORIGIN,
            line: line_no,
            directive: tag.to_owned(),
        };

        if tag == "newmtl" {
            let name = parts.next().ok_or_else(missing)?;
            current = Some(library.open(name));
            continue;
        }

        let Some(index) = current else {
            log::debug!("material line {line_no}: '{tag}' before any newmtl, ignored");
            continue;
        };
        let material = &mut library.materials[index];

        match tag {
            "Kd" => {
                let r = parse_f32(parts.next(), ORIGIN, line_no)?;
                let g = parse_f32(parts.next(), ORIGIN, line_no)?;
                let b = parse_f32(parts.next(), ORIGIN, line_no)?;
                material.base_color = Some(Rgba::from_rgb(r, g, b));
            }
            "d" => {
                material.alpha = Some(parse_f32(parts.next(), ORIGIN, line_no)?);
            }
            "Tr" => {
                material.alpha = Some(1.0 - parse_f32(parts.next(), ORIGIN, line_no)?);
            }
            "map_Kd" => {
                // Options like `-s 1 1 1` may precede the file name.
                let path = parts.last().ok_or_else(missing)?;
                material.texture = Some(path.to_owned());
            }
            _ => {
                // Ka/Ks/Ns/illum and friends carry nothing we render.
            }
        }
    }

    log::debug!("parsed {} material(s)", library.len());
    Ok(library)
}
