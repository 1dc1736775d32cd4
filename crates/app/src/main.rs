//! mtlmesh: load an OBJ (+ MTL) and report the mesh the renderer would get.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::{DedupKeyMode, LoadOptions, Mesh, MeshUploader};
use corelib::Rgba;

mod summary;

use summary::SummaryUploader;

struct Args {
    obj: PathBuf,
    mtl: Option<PathBuf>,
    options: LoadOptions,
}

fn parse_color(value: &str) -> Option<Rgba> {
    let channels: Vec<f32> = value
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .ok()?;
    match channels.as_slice() {
        &[r, g, b] => Some(Rgba::from_rgb(r, g, b)),
        &[r, g, b, a] => Some(Rgba::new(r, g, b, a)),
        _ => None,
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    // Accept: <file.obj> --mtl=PATH --scale=F --color=R,G,B[,A] --dedup=geometry|color --texture-root=DIR
    let mut obj: Option<PathBuf> = None;
    let mut mtl: Option<PathBuf> = None;
    let mut options = LoadOptions::default();

    for arg in args {
        if let Some(v) = arg.strip_prefix("--mtl=") {
            mtl = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--scale=") {
            let scale = v
                .parse::<f32>()
                .with_context(|| format!("Invalid --scale '{}'", v))?;
            options = options.with_scale(scale);
        } else if let Some(v) = arg.strip_prefix("--color=") {
            match parse_color(v) {
                Some(c) => options = options.with_fallback_color(c),
                None => bail!("Invalid --color '{}', expected r,g,b or r,g,b,a", v),
            }
        } else if let Some(v) = arg.strip_prefix("--dedup=") {
            match DedupKeyMode::parse(v) {
                Some(mode) => options = options.with_dedup(mode),
                None => {
                    log::warn!("Unknown dedup mode '{}', keeping {:?}.", v, options.dedup);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--texture-root=") {
            options = options.with_texture_root(v);
        } else if arg.starts_with("--") {
            log::warn!("Ignoring unknown flag '{}'", arg);
        } else if obj.is_none() {
            obj = Some(PathBuf::from(arg));
        } else {
            bail!("Unexpected extra argument '{}'", arg);
        }
    }

    let Some(obj) = obj else {
        bail!("Usage: mtlmesh <file.obj> [--mtl=PATH] [--scale=F] [--color=R,G,B[,A]] [--dedup=geometry|color] [--texture-root=DIR]");
    };
    Ok(Args { obj, mtl, options })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    log::info!(
        "Loading {} (scale={}, dedup={:?})",
        args.obj.display(),
        args.options.scale,
        args.options.dedup
    );

    let mesh: Mesh = asset::load_mesh_from_paths(&args.obj, args.mtl.as_deref(), &args.options)
        .with_context(|| format!("Failed to load {}", args.obj.display()))?;

    let summary = SummaryUploader::default().upload(mesh)?;
    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_all_flags() {
        let a = args(&[
            "model.obj",
            "--mtl=model.mtl",
            "--scale=0.5",
            "--color=1,0,0",
            "--dedup=geometry",
            "--texture-root=textures",
        ])
        .unwrap();
        assert_eq!(a.obj, PathBuf::from("model.obj"));
        assert_eq!(a.mtl, Some(PathBuf::from("model.mtl")));
        assert_eq!(a.options.scale, 0.5);
        assert_eq!(a.options.fallback_color, Rgba::RED);
        assert_eq!(a.options.dedup, DedupKeyMode::Geometry);
        assert_eq!(a.options.texture_root, Some(PathBuf::from("textures")));
    }

    #[test]
    fn obj_path_is_required() {
        assert!(args(&["--scale=2"]).is_err());
    }

    #[test]
    fn color_accepts_alpha_and_rejects_junk() {
        assert_eq!(parse_color("0,1,0,0.5"), Some(Rgba::new(0.0, 1.0, 0.0, 0.5)));
        assert_eq!(parse_color("0,1"), None);
        assert_eq!(parse_color("a,b,c"), None);
    }

    #[test]
    fn bad_scale_is_an_error() {
        assert!(args(&["m.obj", "--scale=big"]).is_err());
    }
}
