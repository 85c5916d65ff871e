//! Asset loading: OBJ parsing, indexed mesh building, material sidecars,
//! and the text/OBJ/GPU views consumers need.

pub mod error;
pub mod export;
pub mod frames;
pub mod gpu;
pub mod material;
pub mod mesh;
pub mod mesh_text;
pub mod obj;

use std::path::Path;

pub use error::{AssetError, AssetResult, Attribute};
pub use mesh::{MaterialGroup, MeshData, MeshVertex, build};
pub use obj::{DEFAULT_MATERIAL, RawGeometry};

/// Parse and build an OBJ file in one call.
pub fn load_mesh_from_path(path: impl AsRef<Path>) -> AssetResult<MeshData> {
    build(obj::load_obj_from_path(path)?)
}
