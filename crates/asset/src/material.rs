//! Material sidecar files: one `<name> <#RRGGBB albedo> <#RRGGBB emission>`
//! per line, `#` comments.
//!
//! Bad lines are skipped with a warning rather than failing the load.

use std::{fs, path::Path};

use corelib::Color;

use crate::{
    error::{AssetError, AssetResult},
    mesh::MeshData,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Material {
    pub name: String,
    pub albedo: Color,
    pub emission: Color,
}

/// Materials in the order their names first appear.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    warnings: Vec<AssetError>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Skipped lines, as [`AssetError::InvalidMaterialLine`].
    pub fn warnings(&self) -> &[AssetError] {
        &self.warnings
    }

    /// Material groups of `mesh` with no definition here.
    pub fn missing_for<'m>(&self, mesh: &'m MeshData) -> Vec<&'m str> {
        mesh.material_faces
            .iter()
            .map(|g| g.name.as_str())
            .filter(|name| self.get(name).is_none())
            .collect()
    }

    /// A redefinition replaces the earlier entry in place.
    fn insert(&mut self, material: Material) {
        match self.materials.iter_mut().find(|m| m.name == material.name) {
            Some(slot) => *slot = material,
            None => self.materials.push(material),
        }
    }
}

pub fn load_materials_from_path(path: impl AsRef<Path>) -> AssetResult<MaterialLibrary> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| AssetError::open(path, e))?;
    log::info!("Loading materials from '{}'", path.display());
    Ok(parse_materials_str(&path.display().to_string(), &contents))
}

pub fn parse_materials_str(source_name: &str, contents: &str) -> MaterialLibrary {
    let mut library = MaterialLibrary::default();

    for (line_no, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_material(trimmed) {
            Ok(material) => library.insert(material),
            Err(reason) => {
                let warning = AssetError::InvalidMaterialLine {
                    source_name: source_name.to_owned(),
                    line: line_no + 1,
                    reason,
                };
                log::warn!("{}", warning);
                library.warnings.push(warning);
            }
        }
    }

    log::info!(
        "Loaded {} materials from '{}' ({} lines skipped)",
        library.len(),
        source_name,
        library.warnings.len()
    );
    library
}

fn parse_material(line: &str) -> Result<Material, String> {
    let mut parts = line.split_whitespace();
    let (Some(name), Some(albedo), Some(emission)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected '<name> <#RRGGBB> <#RRGGBB>', found '{line}'"));
    };
    let color = |text: &str| Color::from_hex(text).ok_or_else(|| format!("invalid color '{text}'"));
    Ok(Material {
        name: name.to_owned(),
        albedo: color(albedo)?,
        emission: color(emission)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mesh::build, obj::load_obj_from_str};

    #[test]
    fn parses_materials() {
        let src = "\
# name albedo emission
skin #C08060 #000000

visor #102030 #80AACD
";
        let lib = parse_materials_str("doom.mat", src);
        assert_eq!(lib.len(), 2);
        assert!(lib.warnings().is_empty());
        let visor = lib.get("visor").unwrap();
        assert_eq!(visor.albedo, Color::new(0x10, 0x20, 0x30));
        assert_eq!(visor.emission, Color::new(0x80, 0xAA, 0xCD));
        let names: Vec<&str> = lib.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["skin", "visor"]);
    }

    #[test]
    fn bad_lines_are_skipped_with_warnings() {
        let src = "skin #C08060\nmetal #FFFFFF #000000\nglow red #FF0000\n";
        let lib = parse_materials_str("m.mat", src);
        assert_eq!(lib.len(), 1);
        assert!(lib.get("metal").is_some());
        let lines: Vec<Option<usize>> = lib.warnings().iter().map(AssetError::line).collect();
        assert_eq!(lines, vec![Some(1), Some(3)]);
        assert!(
            lib.warnings()
                .iter()
                .all(|w| matches!(w, AssetError::InvalidMaterialLine { .. }))
        );
    }

    #[test]
    fn later_definition_wins() {
        let lib = parse_materials_str("m.mat", "a #000000 #000000\na #FFFFFF #000000\n");
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("a").unwrap().albedo, Color::new(255, 255, 255));
    }

    #[test]
    fn reports_groups_without_definition() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl skin\nf 1 2 3\nusemtl cloth\nf 1 3 2\n";
        let mesh = build(load_obj_from_str("m.obj", src).unwrap()).unwrap();
        let lib = parse_materials_str("m.mat", "skin #FFFFFF #000000\n");
        assert_eq!(lib.missing_for(&mesh), vec!["cloth"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_materials_from_path(dir.path().join("none.mat")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }
}
