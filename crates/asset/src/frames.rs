//! Animation frames that reuse a base model's vertex layout.
//!
//! Frame `n` of a model lives next to the base file as `<stem>_NNNNNN.obj`
//! and must share the base topology. The layout has one slot per distinct
//! `{position, normal, uv}` index triple of the base file, so corners that
//! merely coincide at rest stay separate and can move apart in later frames.
//! Each frame yields a new position and normal per slot; ids, uvs and indices
//! stay those of the base.

use std::{
    collections::BTreeSet,
    fmt, fs,
    path::{Path, PathBuf},
};

use corelib::Vec3;

use crate::{
    error::{AssetError, AssetResult, Attribute},
    mesh::{MeshData, MeshVertex, fetch, group_faces, resolve_corner},
    mesh_text::parse_csv_floats,
    obj::{CornerRef, LineCtx, RawGeometry, load_obj_from_path},
};

/// Frame files beyond this are not scanned.
pub const MAX_FRAMES: usize = 255;

/// Per-vertex animated attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Index-keyed vertex layout of the base frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameLayout {
    corners: Vec<CornerRef>,
    base: MeshData,
}

impl FrameLayout {
    /// Collect the distinct index triples of `raw` in ascending order and
    /// index its faces against them.
    pub fn from_raw(raw: &RawGeometry) -> AssetResult<Self> {
        let unique: BTreeSet<CornerRef> = raw.faces.iter().flat_map(|f| f.corners).collect();
        if u32::try_from(unique.len()).is_err() {
            return Err(AssetError::TooMany {
                source_name: raw.source_name.clone(),
                what: "frame slots",
                count: unique.len(),
            });
        }
        let corners: Vec<CornerRef> = unique.into_iter().collect();

        let mut vertices = vec![MeshVertex::default(); corners.len()];
        let mut indices = Vec::with_capacity(raw.faces.len() * 3);
        for face in &raw.faces {
            for corner in &face.corners {
                let id = corners.partition_point(|c| c < corner);
                vertices[id] = resolve_corner(raw, corner, face.line)?;
                indices.push(id as u32);
            }
        }

        let base = MeshData {
            vertices,
            indices,
            material_faces: group_faces(raw)?,
        };
        log::info!(
            "Frame layout for '{}': {} slots, {} triangles",
            raw.source_name,
            corners.len(),
            base.triangle_count()
        );
        Ok(Self { corners, base })
    }

    pub fn len(&self) -> usize {
        self.corners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    pub fn corners(&self) -> &[CornerRef] {
        &self.corners
    }

    /// Base geometry in slot order. Unlike a built mesh, `vertices` may hold
    /// equal values at different slots.
    pub fn base_mesh(&self) -> &MeshData {
        &self.base
    }
}

/// `dir/stem.obj` for frame 0, `dir/stem_000007.obj` for frame 7.
pub fn frame_file_name(dir: impl AsRef<Path>, stem: &str, frame: usize) -> PathBuf {
    let file = if frame == 0 {
        format!("{stem}.obj")
    } else {
        format!("{stem}_{frame:06}.obj")
    };
    dir.as_ref().join(file)
}

/// Resolve one frame's geometry against the base layout, one entry per slot.
pub fn resolve_frame(layout: &FrameLayout, frame: &RawGeometry) -> AssetResult<Vec<FrameVertex>> {
    let name = frame.source_name.as_str();
    layout
        .corners
        .iter()
        .map(|corner| {
            let position = fetch(&frame.positions, corner.position, Attribute::Position, name, 0)?;
            let normal = match corner.normal {
                Some(n) => fetch(&frame.normals, n, Attribute::Normal, name, 0)?,
                None => Vec3::ZERO,
            };
            Ok(FrameVertex { position, normal })
        })
        .collect()
}

/// Load frames 1, 2, ... next to `dir/stem.obj` until one is missing.
pub fn load_frame_sequence(
    dir: impl AsRef<Path>,
    stem: &str,
    layout: &FrameLayout,
) -> AssetResult<Vec<Vec<FrameVertex>>> {
    let dir = dir.as_ref();
    let mut frames = Vec::new();
    for n in 1..=MAX_FRAMES {
        let path = frame_file_name(dir, stem, n);
        if !path.is_file() {
            break;
        }
        let raw = load_obj_from_path(&path)?;
        frames.push(resolve_frame(layout, &raw)?);
        log::info!("Frame {} resolved from '{}'", n, path.display());
    }
    log::info!("Loaded {} animation frames for '{}'", frames.len(), stem);
    Ok(frames)
}

/// [`fmt::Display`] adapter: a `frame <n>` header per frame, numbered from 1,
/// then `v px,py,pz nx,ny,nz` per vertex.
pub struct FramesText<'a>(pub &'a [Vec<FrameVertex>]);

impl fmt::Display for FramesText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, frame) in self.0.iter().enumerate() {
            writeln!(f, "frame {}", n + 1)?;
            for v in frame {
                writeln!(
                    f,
                    "v {:.6},{:.6},{:.6} {:.6},{:.6},{:.6}",
                    v.position.x, v.position.y, v.position.z, v.normal.x, v.normal.y, v.normal.z
                )?;
            }
        }
        Ok(())
    }
}

pub fn write_frames_text(frames: &[Vec<FrameVertex>]) -> String {
    FramesText(frames).to_string()
}

pub fn write_frames_text_to_path(
    path: impl AsRef<Path>,
    frames: &[Vec<FrameVertex>],
) -> AssetResult<()> {
    let path = path.as_ref();
    let name = path.display().to_string();
    log::info!("Writing {} frames to '{}'", frames.len(), name);
    fs::write(path, write_frames_text(frames)).map_err(|e| AssetError::io(&name, e))
}

/// Parse a frames file; every frame must hold exactly `vertex_count` vertices.
pub fn parse_frames_text(
    source_name: &str,
    contents: &str,
    vertex_count: usize,
) -> AssetResult<Vec<Vec<FrameVertex>>> {
    let mut frames: Vec<Vec<FrameVertex>> = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let ctx = LineCtx {
            source_name,
            line: line_no + 1,
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("frame") => {
                check_frame_len(source_name, &frames, vertex_count)?;
                frames.push(Vec::with_capacity(vertex_count));
            }
            Some("v") => {
                let frame = frames
                    .last_mut()
                    .ok_or_else(|| ctx.malformed_line("vertex before the first 'frame' header"))?;
                let [px, py, pz] = parse_csv_floats::<3>(parts.next(), ctx, "position")?;
                let [nx, ny, nz] = parse_csv_floats::<3>(parts.next(), ctx, "normal")?;
                frame.push(FrameVertex {
                    position: Vec3::new(px, py, pz),
                    normal: Vec3::new(nx, ny, nz),
                });
            }
            _ => {}
        }
    }
    check_frame_len(source_name, &frames, vertex_count)?;

    Ok(frames)
}

fn check_frame_len(
    source_name: &str,
    frames: &[Vec<FrameVertex>],
    vertex_count: usize,
) -> AssetResult<()> {
    match frames.last() {
        Some(last) if last.len() != vertex_count => Err(AssetError::FrameMismatch {
            source_name: format!("{} frame {}", source_name, frames.len()),
            expected: vertex_count,
            found: last.len(),
        }),
        _ => Ok(()),
    }
}
