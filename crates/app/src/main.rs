//! Entry point for objmesh: load an OBJ, build the indexed mesh, and write
//! the requested exports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use asset::{
    build,
    export::write_obj,
    frames::{FrameLayout, load_frame_sequence, write_frames_text_to_path},
    material::load_materials_from_path,
    mesh_text::write_mesh_text_to_path,
    obj::load_obj_from_path,
};

const USAGE: &str = "\
usage: objmesh <input.obj> [options]
  --materials=<path>   material sidecar (<name> <#RRGGBB> <#RRGGBB> per line)
  --export=<path>      write the deduplicated mesh as OBJ
  --material=<name>    only export faces of this material group
  --mesh-text=<path>   write the plain-text mesh (v x,y,z nx,ny,nz u,v / f i,j,k)
  --frames=<path>      resolve <stem>_NNNNNN.obj frames next to the input and write them
  --help               show this message";

#[derive(Clone, Debug, Default, PartialEq)]
struct Options {
    input: PathBuf,
    materials: Option<PathBuf>,
    export: Option<PathBuf>,
    material: Option<String>,
    mesh_text: Option<PathBuf>,
    frames: Option<PathBuf>,
}

/// `Ok(None)` means `--help` was requested.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut input: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Ok(None);
        }
        if let Some(v) = arg.strip_prefix("--materials=") {
            options.materials = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--export=") {
            options.export = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--material=") {
            options.material = Some(v.to_owned());
        } else if let Some(v) = arg.strip_prefix("--mesh-text=") {
            options.mesh_text = Some(PathBuf::from(v));
        } else if let Some(v) = arg.strip_prefix("--frames=") {
            options.frames = Some(PathBuf::from(v));
        } else if arg.starts_with("--") {
            log::warn!("Unknown option '{}', ignoring.", arg);
        } else if let Some(first) = &input {
            bail!("Unexpected argument '{}' (input already set to '{}')", arg, first.display());
        } else {
            input = Some(PathBuf::from(arg));
        }
    }

    options.input = input.ok_or_else(|| anyhow!("Missing input OBJ path\n{USAGE}"))?;
    Ok(Some(options))
}

fn run(options: &Options) -> Result<()> {
    let raw = load_obj_from_path(&options.input)
        .with_context(|| format!("Failed to load mesh '{}'", options.input.display()))?;
    // Frames need the index-keyed layout of the base file, taken before building.
    let layout = match &options.frames {
        Some(_) => Some(FrameLayout::from_raw(&raw).with_context(|| {
            format!("Failed to lay out frames for '{}'", options.input.display())
        })?),
        None => None,
    };
    let mesh = build(raw)
        .with_context(|| format!("Failed to build mesh '{}'", options.input.display()))?;

    if let Some(path) = &options.materials {
        let library = load_materials_from_path(path)
            .with_context(|| format!("Failed to load materials '{}'", path.display()))?;
        for material in library.iter() {
            log::info!(
                "Material '{}': albedo {}, emission {}",
                material.name,
                material.albedo,
                material.emission
            );
        }
        for name in library.missing_for(&mesh) {
            log::warn!("Material group '{}' has no definition in '{}'", name, path.display());
        }
    }

    match (&options.export, &options.material) {
        (Some(path), material) => write_obj(path, &mesh, material.as_deref())
            .with_context(|| format!("Failed to export OBJ '{}'", path.display()))?,
        (None, Some(_)) => log::warn!("--material has no effect without --export"),
        (None, None) => {}
    }

    if let Some(path) = &options.mesh_text {
        // Frames index the layout's slots, so the mesh text must use them too.
        let text_mesh = match &layout {
            Some(layout) => {
                log::info!("Writing mesh text in frame layout order ({} slots)", layout.len());
                layout.base_mesh()
            }
            None => &mesh,
        };
        write_mesh_text_to_path(path, text_mesh)
            .with_context(|| format!("Failed to write mesh text '{}'", path.display()))?;
    }

    if let (Some(path), Some(layout)) = (&options.frames, &layout) {
        let dir = options.input.parent().unwrap_or_else(|| Path::new("."));
        let stem = options
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Input '{}' has no usable file stem", options.input.display()))?;
        let frames = load_frame_sequence(dir, stem, layout)
            .with_context(|| format!("Failed to load animation frames for '{stem}'"))?;
        write_frames_text_to_path(path, &frames)
            .with_context(|| format!("Failed to write frames '{}'", path.display()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        println!("{USAGE}");
        return Ok(());
    };
    log::info!("Starting objmesh. Input: '{}'", options.input.display());

    run(&options)?;

    log::info!("Done.");
    Ok(())
}
