//! Plain-text mesh format shared with animation tooling.
//!
//! ```text
//! v x,y,z nx,ny,nz u,v
//! f i,j,k
//! ```
//!
//! Vertex lines come first, in id order; face ids are 0-based.

use std::{fmt, fs, path::Path};

use corelib::{Vec2, Vec3};

use crate::{
    error::{AssetError, AssetResult, Attribute},
    mesh::{MeshData, MeshVertex},
    obj::LineCtx,
};

/// [`fmt::Display`] adapter for the mesh text format.
pub struct MeshText<'a>(pub &'a MeshData);

impl fmt::Display for MeshText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in &self.0.vertices {
            writeln!(
                f,
                "v {:.6},{:.6},{:.6} {:.6},{:.6},{:.6} {:.6},{:.6}",
                v.position.x,
                v.position.y,
                v.position.z,
                v.normal.x,
                v.normal.y,
                v.normal.z,
                v.uv.x,
                v.uv.y
            )?;
        }
        for tri in self.0.indices.chunks_exact(3) {
            writeln!(f, "f {},{},{}", tri[0], tri[1], tri[2])?;
        }
        Ok(())
    }
}

pub fn write_mesh_text(mesh: &MeshData) -> String {
    MeshText(mesh).to_string()
}

pub fn write_mesh_text_to_path(path: impl AsRef<Path>, mesh: &MeshData) -> AssetResult<()> {
    let path = path.as_ref();
    let name = path.display().to_string();
    log::info!(
        "Writing mesh text '{}': {} vertices, {} triangles",
        name,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    fs::write(path, write_mesh_text(mesh)).map_err(|e| AssetError::io(&name, e))
}

pub fn load_mesh_text_from_path(path: impl AsRef<Path>) -> AssetResult<MeshData> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| AssetError::open(path, e))?;
    parse_mesh_text(&path.display().to_string(), &contents)
}

/// Parse the mesh text format. Material groups are not part of the format
/// and come back empty.
pub fn parse_mesh_text(source_name: &str, contents: &str) -> AssetResult<MeshData> {
    let mut vertices = Vec::new();
    let mut triangles: Vec<(usize, [u32; 3])> = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let ctx = LineCtx {
            source_name,
            line: line_no + 1,
        };
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let [px, py, pz] = parse_csv_floats::<3>(parts.next(), ctx, "position")?;
                let [nx, ny, nz] = parse_csv_floats::<3>(parts.next(), ctx, "normal")?;
                let [u, v] = parse_csv_floats::<2>(parts.next(), ctx, "uv")?;
                vertices.push(MeshVertex::new(
                    Vec3::new(px, py, pz),
                    Vec3::new(nx, ny, nz),
                    Vec2::new(u, v),
                ));
            }
            Some("f") => {
                let tri = parts
                    .next()
                    .and_then(parse_triangle)
                    .ok_or_else(|| ctx.malformed_face("expected 'f i,j,k'"))?;
                triangles.push((ctx.line, tri));
            }
            _ => {}
        }
    }

    let mut indices = Vec::with_capacity(triangles.len() * 3);
    for (line, tri) in triangles {
        for id in tri {
            if id as usize >= vertices.len() {
                return Err(AssetError::OutOfRange {
                    source_name: source_name.to_owned(),
                    line,
                    attribute: Attribute::Vertex,
                    index: id as usize + 1,
                    len: vertices.len(),
                });
            }
            indices.push(id);
        }
    }

    Ok(MeshData::new(vertices, indices))
}

fn parse_triangle(token: &str) -> Option<[u32; 3]> {
    let mut ids = token.split(',').map(|t| t.parse::<u32>().ok());
    let tri = [ids.next()??, ids.next()??, ids.next()??];
    ids.next().is_none().then_some(tri)
}

/// Parse `a,b[,c]` into exactly `N` floats.
pub(crate) fn parse_csv_floats<const N: usize>(
    token: Option<&str>,
    ctx: LineCtx<'_>,
    what: &str,
) -> AssetResult<[f32; N]> {
    let token = token.ok_or_else(|| ctx.malformed_line(format!("missing {what}")))?;
    let mut out = [0.0; N];
    let mut fields = token.split(',');
    for slot in out.iter_mut() {
        *slot = fields
            .next()
            .and_then(|t| t.parse::<f32>().ok())
            .ok_or_else(|| ctx.malformed_line(format!("invalid {what} '{token}'")))?;
    }
    if fields.next().is_some() {
        return Err(ctx.malformed_line(format!("too many {what} components in '{token}'")));
    }
    Ok(out)
}
