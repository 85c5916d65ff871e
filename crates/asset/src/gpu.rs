//! Interleaved vertex and index views for GPU upload.

use bytemuck::{Pod, Zeroable};

use crate::mesh::{MeshData, MeshVertex};

/// Vertex: position + normal + uv.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl GpuVertex {
    pub const STRIDE: usize = std::mem::size_of::<GpuVertex>();
}

impl From<&MeshVertex> for GpuVertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.uv.to_array(),
        }
    }
}

/// Vertex: position + uv, for unlit textured drawing.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const STRIDE: usize = std::mem::size_of::<TexturedVertex>();
}

impl From<&MeshVertex> for TexturedVertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            position: v.position.to_array(),
            uv: v.uv.to_array(),
        }
    }
}

/// Convert `mesh.vertices` in id order.
pub fn interleave<V: for<'a> From<&'a MeshVertex>>(mesh: &MeshData) -> Vec<V> {
    mesh.vertices.iter().map(V::from).collect()
}

pub fn vertex_bytes<V: Pod>(vertices: &[V]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Triangle-list `u32` index buffer.
pub fn index_bytes(mesh: &MeshData) -> &[u8] {
    bytemuck::cast_slice(&mesh.indices)
}
