//! OBJ parser producing raw geometry: positions, normals, texture coordinates,
//! triangle faces and `usemtl` material groups.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    str::SplitWhitespace,
};

use corelib::{Vec2, Vec3};

use crate::error::{AssetError, AssetResult};

/// Material group that collects faces declared before the first `usemtl`.
pub const DEFAULT_MATERIAL: &str = "__default__";

/// One triangle corner as 0-based indices into the raw arrays. Ordered by
/// position, then normal, then uv index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerRef {
    pub position: usize,
    pub normal: Option<usize>,
    pub uv: Option<usize>,
}

/// Triangle as written in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRef {
    pub corners: [CornerRef; 3],
    /// Index into [`RawGeometry::material_names`].
    pub material: usize,
    /// 1-based line of the `f` directive.
    pub line: usize,
}

/// Parsed but unresolved OBJ contents. Face indices are not bounds-checked
/// here; [`crate::mesh::build`] does that.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    pub source_name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub material_names: Vec<String>,
    pub faces: Vec<FaceRef>,
}

impl RawGeometry {
    /// Index of `name`, appending it if unseen.
    fn material_index(&mut self, name: &str) -> usize {
        match self.material_names.iter().position(|m| m == name) {
            Some(idx) => idx,
            None => {
                self.material_names.push(name.to_owned());
                self.material_names.len() - 1
            }
        }
    }
}

/// Load OBJ geometry from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> AssetResult<RawGeometry> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AssetError::open(path, e))?;
    log::info!("Loading OBJ from '{}'", path.display());
    load_obj_from_reader(&path.display().to_string(), BufReader::new(file))
}

/// Load OBJ geometry from a [`BufRead`] implementation. `source_name` is
/// used in error messages.
pub fn load_obj_from_reader<R: BufRead>(source_name: &str, reader: R) -> AssetResult<RawGeometry> {
    parse_obj(source_name, reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(source_name: &str, contents: &str) -> AssetResult<RawGeometry> {
    parse_obj(source_name, io::Cursor::new(contents))
}

/// Source name and 1-based line number for error reporting.
#[derive(Clone, Copy)]
pub(crate) struct LineCtx<'a> {
    pub(crate) source_name: &'a str,
    pub(crate) line: usize,
}

impl LineCtx<'_> {
    pub(crate) fn malformed_line(self, reason: impl Into<String>) -> AssetError {
        AssetError::MalformedLine {
            source_name: self.source_name.to_owned(),
            line: self.line,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_face(self, reason: impl Into<String>) -> AssetError {
        AssetError::MalformedFace {
            source_name: self.source_name.to_owned(),
            line: self.line,
            reason: reason.into(),
        }
    }
}

fn parse_obj<R: BufRead>(source_name: &str, reader: R) -> AssetResult<RawGeometry> {
    let mut raw = RawGeometry {
        source_name: source_name.to_owned(),
        ..RawGeometry::default()
    };
    let mut active: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AssetError::io(source_name, e))?;
        let ctx = LineCtx {
            source_name,
            line: line_no + 1,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, ctx, "position")?;
                raw.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, ctx, "normal")?;
                raw.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&mut parts, ctx, "uv")?;
                raw.uvs.push(Vec2::new(u, v));
            }
            "usemtl" => {
                let name = parts
                    .next()
                    .ok_or_else(|| ctx.malformed_line("usemtl without a material name"))?;
                active = Some(raw.material_index(name));
            }
            "f" => {
                let tokens: Vec<&str> = parts.collect();
                if tokens.len() != 3 {
                    return Err(ctx.malformed_face(format!(
                        "expected 3 corners, found {}",
                        tokens.len()
                    )));
                }
                let mut corners = [CornerRef::default(); 3];
                for (corner, token) in corners.iter_mut().zip(&tokens) {
                    *corner = parse_face_vertex(token, &raw, ctx)?;
                }
                let material = match active {
                    Some(idx) => idx,
                    None => {
                        let idx = raw.material_index(DEFAULT_MATERIAL);
                        active = Some(idx);
                        idx
                    }
                };
                raw.faces.push(FaceRef {
                    corners,
                    material,
                    line: ctx.line,
                });
            }
            _ => {
                // Ignore other directives (o/g/s/mtllib/etc.)
            }
        }
    }

    log::info!(
        "Parsed '{}': {} positions, {} normals, {} uvs, {} faces, {} materials",
        source_name,
        raw.positions.len(),
        raw.normals.len(),
        raw.uvs.len(),
        raw.faces.len(),
        raw.material_names.len()
    );
    Ok(raw)
}

fn parse_floats<const N: usize>(
    parts: &mut SplitWhitespace<'_>,
    ctx: LineCtx<'_>,
    what: &str,
) -> AssetResult<[f32; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let token = parts
            .next()
            .ok_or_else(|| ctx.malformed_line(format!("missing {what} component {}", i + 1)))?;
        *slot = token
            .parse::<f32>()
            .map_err(|_| ctx.malformed_line(format!("invalid {what} component '{token}'")))?;
    }
    Ok(out)
}

/// `p`, `p/n`, `p/t/n` or `p//n`; the grammar is picked by slash count.
fn parse_face_vertex(token: &str, raw: &RawGeometry, ctx: LineCtx<'_>) -> AssetResult<CornerRef> {
    let fields: Vec<&str> = token.split('/').collect();
    let (pos, tex, norm) = match fields.as_slice() {
        [p] => (*p, None, None),
        [p, n] => (*p, None, Some(*n)),
        [p, t, n] => (*p, Some(*t).filter(|t| !t.is_empty()), Some(*n)),
        _ => {
            return Err(ctx.malformed_face(format!(
                "corner '{}' has {} slashes",
                token,
                fields.len() - 1
            )));
        }
    };

    Ok(CornerRef {
        position: resolve_index(pos, raw.positions.len(), ctx)?,
        uv: tex
            .map(|t| resolve_index(t, raw.uvs.len(), ctx))
            .transpose()?,
        normal: norm
            .map(|n| resolve_index(n, raw.normals.len(), ctx))
            .transpose()?,
    })
}

/// 1-based to 0-based. Negative values count back from `len`, the number of
/// elements declared so far.
fn resolve_index(token: &str, len: usize, ctx: LineCtx<'_>) -> AssetResult<usize> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| ctx.malformed_face(format!("invalid index '{token}'")))?;
    if raw == 0 {
        return Err(ctx.malformed_face("OBJ indices are 1-based; found 0"));
    }
    if raw > 0 {
        return usize::try_from(raw - 1)
            .map_err(|_| ctx.malformed_face(format!("index {raw} does not fit in memory")));
    }

    let back = usize::try_from(raw.unsigned_abs())
        .map_err(|_| ctx.malformed_face(format!("index {raw} does not fit in memory")))?;
    len.checked_sub(back).ok_or_else(|| {
        ctx.malformed_face(format!(
            "relative index {raw} reaches before the first of {len} elements"
        ))
    })
}
