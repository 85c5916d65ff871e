//! Wavefront OBJ writer for built meshes.
//!
//! Position, normal and uv share one id per vertex after deduplication, so
//! each face corner is written as `i/i/i`.

use std::{fmt, fs, path::Path};

use crate::{
    error::{AssetError, AssetResult},
    mesh::MeshData,
};

/// [`fmt::Display`] adapter that renders a mesh as OBJ text.
pub struct ObjExport<'a> {
    name: &'a str,
    mesh: &'a MeshData,
    material: Option<&'a str>,
}

impl<'a> ObjExport<'a> {
    /// `name` only appears in the header comment. With `material` set, only
    /// that group's triangles are written; vertices are always written in full.
    pub fn new(name: &'a str, mesh: &'a MeshData, material: Option<&'a str>) -> Self {
        Self {
            name,
            mesh,
            material,
        }
    }

    fn faces(&self) -> Vec<usize> {
        match self.material {
            None => (0..self.mesh.triangle_count()).collect(),
            Some(name) => match self.mesh.material(name) {
                Some(faces) => faces.iter().map(|&f| f as usize).collect(),
                None => {
                    log::warn!("No material group '{}' in '{}'", name, self.name);
                    Vec::new()
                }
            },
        }
    }
}

impl fmt::Display for ObjExport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertices = &self.mesh.vertices;
        writeln!(
            f,
            "# {} - {} vertices / {} faces",
            self.name,
            vertices.len(),
            self.mesh.triangle_count()
        )?;
        writeln!(f, "# positions:")?;
        for v in vertices {
            writeln!(f, "v {:.6} {:.6} {:.6}", v.position.x, v.position.y, v.position.z)?;
        }
        writeln!(f, "# normals:")?;
        for v in vertices {
            writeln!(f, "vn {:.6} {:.6} {:.6}", v.normal.x, v.normal.y, v.normal.z)?;
        }
        writeln!(f, "# uvs:")?;
        for v in vertices {
            writeln!(f, "vt {:.6} {:.6}", v.uv.x, v.uv.y)?;
        }
        writeln!(f, "# faces:")?;
        for face in self.faces() {
            let Some(tri) = self.mesh.triangle(face) else {
                continue;
            };
            write!(f, "f")?;
            for id in tri {
                let id = id + 1;
                write!(f, " {id}/{id}/{id}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Render `mesh` as OBJ text.
pub fn export_obj(name: &str, mesh: &MeshData, material: Option<&str>) -> String {
    ObjExport::new(name, mesh, material).to_string()
}

/// Write `mesh` as an OBJ file.
pub fn write_obj(path: impl AsRef<Path>, mesh: &MeshData, material: Option<&str>) -> AssetResult<()> {
    let path = path.as_ref();
    let name = path.display().to_string();
    log::info!("Exporting OBJ to '{}'", name);
    fs::write(path, export_obj(&name, mesh, material)).map_err(|e| AssetError::io(&name, e))
}
