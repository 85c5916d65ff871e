//! CPU-side indexed mesh built from raw OBJ geometry.
//!
//! Every face corner is resolved into a full [`MeshVertex`], identical
//! vertices are merged through an ordered set, and each unique vertex gets its
//! position in the sorted sequence as id. Face corners then find their id by
//! binary search with the same ordering.

use std::{cmp::Ordering, collections::BTreeSet};

use corelib::{Vec2, Vec3, order};

use crate::{
    error::{AssetError, AssetResult, Attribute},
    obj::{CornerRef, RawGeometry},
};

/// Vertex with position/normal/uv. Values are in object space.
///
/// Equality and ordering are exact and lexicographic: position, then normal,
/// then uv, each compared x, y, z. `-0.0` equals `+0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

impl Ord for MeshVertex {
    fn cmp(&self, other: &Self) -> Ordering {
        order::cmp_vec3(self.position, other.position)
            .then_with(|| order::cmp_vec3(self.normal, other.normal))
            .then_with(|| order::cmp_vec2(self.uv, other.uv))
    }
}

impl PartialOrd for MeshVertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for MeshVertex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MeshVertex {}

/// Triangles drawn with one material, in parse order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialGroup {
    pub name: String,
    pub faces: Vec<u32>,
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Unique vertices in ascending [`MeshVertex`] order.
    pub vertices: Vec<MeshVertex>,
    /// Three ids per triangle, in face order.
    pub indices: Vec<u32>,
    /// Groups in the order their material first received a face.
    pub material_faces: Vec<MaterialGroup>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            ..Self::default()
        }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangle(&self, face: usize) -> Option<[u32; 3]> {
        let tri = self.indices.get(face * 3..face * 3 + 3)?;
        Some([tri[0], tri[1], tri[2]])
    }

    /// Face indices of one material group.
    pub fn material(&self, name: &str) -> Option<&[u32]> {
        self.material_faces
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.faces.as_slice())
    }
}

/// Bounds-checked lookup into one raw array.
pub(crate) fn fetch<T: Copy>(
    items: &[T],
    index: usize,
    attribute: Attribute,
    source_name: &str,
    line: usize,
) -> AssetResult<T> {
    items
        .get(index)
        .copied()
        .ok_or_else(|| AssetError::OutOfRange {
            source_name: source_name.to_owned(),
            line,
            attribute,
            index: index + 1,
            len: items.len(),
        })
}

/// Dereference one corner. Unset normal/uv stay zero.
pub(crate) fn resolve_corner(
    raw: &RawGeometry,
    corner: &CornerRef,
    line: usize,
) -> AssetResult<MeshVertex> {
    let name = raw.source_name.as_str();
    let mut vertex = MeshVertex::new(
        fetch(&raw.positions, corner.position, Attribute::Position, name, line)?,
        Vec3::ZERO,
        Vec2::ZERO,
    );
    if let Some(n) = corner.normal {
        vertex.normal = fetch(&raw.normals, n, Attribute::Normal, name, line)?;
    }
    if let Some(t) = corner.uv {
        vertex.uv = fetch(&raw.uvs, t, Attribute::Uv, name, line)?;
    }
    Ok(vertex)
}

/// Partition face indices by material, keeping first-use order.
pub(crate) fn group_faces(raw: &RawGeometry) -> AssetResult<Vec<MaterialGroup>> {
    let face_count = u32::try_from(raw.faces.len()).map_err(|_| AssetError::TooMany {
        source_name: raw.source_name.clone(),
        what: "faces",
        count: raw.faces.len(),
    })?;

    let mut groups: Vec<MaterialGroup> = Vec::new();
    let mut group_of: Vec<Option<usize>> = vec![None; raw.material_names.len()];
    for (face_idx, face) in (0..face_count).zip(&raw.faces) {
        let Some(name) = raw.material_names.get(face.material) else {
            return Err(AssetError::OutOfRange {
                source_name: raw.source_name.clone(),
                line: face.line,
                attribute: Attribute::Material,
                index: face.material + 1,
                len: raw.material_names.len(),
            });
        };
        let group = match group_of[face.material] {
            Some(group) => group,
            None => {
                groups.push(MaterialGroup {
                    name: name.clone(),
                    faces: Vec::new(),
                });
                group_of[face.material] = Some(groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[group].faces.push(face_idx);
    }
    Ok(groups)
}

/// Resolve, deduplicate and index raw geometry.
pub fn build(raw: RawGeometry) -> AssetResult<MeshData> {
    let material_faces = group_faces(&raw)?;

    let mut resolved: Vec<[MeshVertex; 3]> = Vec::with_capacity(raw.faces.len());
    let mut unique: BTreeSet<MeshVertex> = BTreeSet::new();

    for face in &raw.faces {
        let mut corners = [MeshVertex::default(); 3];
        for (slot, corner) in corners.iter_mut().zip(&face.corners) {
            *slot = resolve_corner(&raw, corner, face.line)?;
            unique.insert(*slot);
        }
        resolved.push(corners);
    }

    if u32::try_from(unique.len()).is_err() {
        return Err(AssetError::TooMany {
            source_name: raw.source_name,
            what: "unique vertices",
            count: unique.len(),
        });
    }
    let vertices: Vec<MeshVertex> = unique.into_iter().collect();

    let mut indices = Vec::with_capacity(resolved.len() * 3);
    for vertex in resolved.iter().flatten() {
        // Binary search with the set's ordering; every corner is in the set.
        let id = vertices.partition_point(|v| v < vertex);
        debug_assert_eq!(vertices.get(id), Some(vertex));
        indices.push(id as u32);
    }

    log::info!(
        "Built mesh '{}': {} unique vertices, {} triangles, {} material groups",
        raw.source_name,
        vertices.len(),
        resolved.len(),
        material_faces.len()
    );
    for group in &material_faces {
        log::debug!("  material '{}': {} triangles", group.name, group.faces.len());
    }

    Ok(MeshData {
        vertices,
        indices,
        material_faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::{DEFAULT_MATERIAL, FaceRef, load_obj_from_str};
    use corelib::{vec2, vec3};

    fn build_str(src: &str) -> AssetResult<MeshData> {
        build(load_obj_from_str("test.obj", src)?)
    }

    #[test]
    fn mesh_data_validity() {
        let data = MeshData::new(vec![MeshVertex::default()], vec![0]);
        assert!(data.is_valid());
        assert!(!MeshData::default().is_valid());
    }

    #[test]
    fn sample_triangle() {
        let mesh = build_str(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1/1 2/2/1 3/3/1\n",
        )
        .unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        // Sorted by position x first: (0,0,0) < (0,1,0) < (1,0,0).
        assert_eq!(mesh.vertices[0].position, Vec3::ZERO);
        assert_eq!(mesh.vertices[1].position, Vec3::Y);
        assert_eq!(mesh.vertices[2].position, Vec3::X);
        assert_eq!(mesh.indices, vec![0, 2, 1]);
        assert_eq!(mesh.material(DEFAULT_MATERIAL), Some(&[0][..]));
        assert_eq!(mesh.triangle(0), Some([0, 2, 1]));
        assert_eq!(mesh.triangle(1), None);
    }

    #[test]
    fn unshared_faces_keep_every_corner() {
        let mut src = String::new();
        for i in 0..4 {
            let z = i as f32;
            src.push_str(&format!("v 0 0 {z}\nv 1 0 {z}\nv 0 1 {z}\n"));
            let base = i * 3;
            src.push_str(&format!("f {} {} {}\n", base + 1, base + 2, base + 3));
        }
        let mesh = build_str(&src).unwrap();
        assert_eq!(mesh.vertices.len(), 12);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn shared_corners_are_merged() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 0 1
vt 0 0
f 1/1/1 2/1/1 3/1/1
f 2/1/1 4/1/1 3/1/1
";
        let mesh = build_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        let first = mesh.triangle(0).unwrap();
        let second = mesh.triangle(1).unwrap();
        assert_eq!(first[1], second[0]);
        assert_eq!(first[2], second[2]);
        let mut sorted = mesh.vertices.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), mesh.vertices.len());
    }

    #[test]
    fn same_value_from_different_indices_is_merged() {
        // Positions 1 and 4 hold the same point.
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 0\nf 1 2 3\nf 4 2 3\n";
        let mesh = build_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.triangle(0), mesh.triangle(1));
    }

    #[test]
    fn signed_zero_is_one_vertex() {
        let src = "v 0 0 0\nv -0 -0 -0\nv 1 0 0\nv 0 1 0\nf 1 3 4\nf 2 3 4\n";
        let mesh = build_str(src).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn ids_resolve_to_the_original_corner() {
        let mut src = String::new();
        let coords = [-2.5f32, -0.0, 0.0, 1e-9, 2e-9, 0.1, 0.30000001, 7.0];
        for &x in &coords {
            for &y in &coords {
                src.push_str(&format!("v {x} {y} {}\n", x * y));
            }
        }
        src.push_str("vn 0 0 1\nvn 0 1 0\nvt 0.25 0.75\nvt 0.75 0.25\n");
        let count = coords.len() * coords.len();
        for i in 0..count {
            let a = i + 1;
            let b = (i * 7) % count + 1;
            let c = (i * 13 + 5) % count + 1;
            let n = i % 2 + 1;
            let t = (i / 2) % 2 + 1;
            src.push_str(&format!("f {a}/{t}/{n} {b}//{n} {c}\n"));
        }
        let raw = load_obj_from_str("grid.obj", &src).unwrap();
        let expected: Vec<MeshVertex> = raw
            .faces
            .iter()
            .flat_map(|f| f.corners)
            .map(|c| {
                MeshVertex::new(
                    raw.positions[c.position],
                    c.normal.map(|n| raw.normals[n]).unwrap_or_default(),
                    c.uv.map(|t| raw.uvs[t]).unwrap_or_default(),
                )
            })
            .collect();
        let mesh = build(raw).unwrap();

        assert_eq!(mesh.indices.len(), expected.len());
        for (id, vertex) in mesh.indices.iter().zip(&expected) {
            assert_eq!(&mesh.vertices[*id as usize], vertex);
        }
        assert!(mesh.vertices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn material_groups_partition_faces() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
usemtl skin
f 1 2 3
f 1 3 2
usemtl unused
usemtl metal
f 2 1 3
usemtl skin
f 3 2 1
";
        let mesh = build_str(src).unwrap();
        let names: Vec<&str> = mesh.material_faces.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_MATERIAL, "skin", "metal"]);
        assert_eq!(mesh.material("skin"), Some(&[1, 2, 4][..]));
        assert_eq!(mesh.material("metal"), Some(&[3][..]));
        assert_eq!(mesh.material("unused"), None);

        let mut all: Vec<u32> = mesh
            .material_faces
            .iter()
            .flat_map(|g| g.faces.iter().copied())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..5).collect::<Vec<u32>>());
    }

    #[test]
    fn position_only_corners_get_zero_attributes() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0.5 0.5\nf 1 2/1/1 3/1\n";
        let mesh = build_str(src).unwrap();
        let tri = mesh.triangle(0).unwrap();
        let first = mesh.vertices[tri[0] as usize];
        assert_eq!(first.normal, Vec3::ZERO);
        assert_eq!(first.uv, Vec2::ZERO);
        let second = mesh.vertices[tri[1] as usize];
        assert_eq!(second.normal, Vec3::Z);
        assert_eq!(second.uv, vec2(0.5, 0.5));
        let third = mesh.vertices[tri[2] as usize];
        assert_eq!(third.normal, Vec3::Z);
        assert_eq!(third.uv, Vec2::ZERO);
    }

    #[test]
    fn out_of_range_indices_fail() {
        let cases = [
            ("v 0 0 0\nf 1 1 2\n", Attribute::Position, 2),
            ("v 0 0 0\nvn 0 0 1\nf 1//1 1//2 1//1\n", Attribute::Normal, 2),
            ("v 0 0 0\nvn 0 0 1\nf 1/3/1 1 1\n", Attribute::Uv, 3),
        ];
        for (src, attr, idx) in cases {
            match build_str(src) {
                Err(AssetError::OutOfRange {
                    attribute, index, ..
                }) => {
                    assert_eq!(attribute, attr);
                    assert_eq!(index, idx);
                }
                other => panic!("expected OutOfRange for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn hand_built_geometry_with_bad_material_fails() {
        let corner = CornerRef::default();
        let raw = RawGeometry {
            source_name: "manual".into(),
            positions: vec![vec3(0.0, 0.0, 0.0)],
            faces: vec![FaceRef {
                corners: [corner; 3],
                material: 1,
                line: 0,
            }],
            ..RawGeometry::default()
        };
        let err = build(raw).unwrap_err();
        assert!(matches!(
            err,
            AssetError::OutOfRange {
                attribute: Attribute::Material,
                ..
            }
        ));
    }

    #[test]
    fn empty_geometry_builds_empty_mesh() {
        let mesh = build_str("# nothing\n").unwrap();
        assert!(!mesh.is_valid());
        assert!(mesh.material_faces.is_empty());
    }
}
