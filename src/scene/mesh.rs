use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::scene::TextureKey;

/// Interleaved render vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

/// CPU-side vertex and index buffers of one surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl SurfaceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `vertex` to the index list, reusing an existing vertex when
    /// position, normal and UV are exactly equal.
    ///
    /// The scan runs backwards: duplicates come from neighbouring triangles
    /// and were appended recently. Cost is linear in the vertex count.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = match self.vertices.iter().rposition(|v| *v == vertex) {
            Some(existing) => existing,
            None => {
                self.vertices.push(vertex);
                self.vertices.len() - 1
            }
        };
        let index = index as u32;
        self.indices.push(index);
        index
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Raw vertex bytes for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw `u32` index bytes for upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    pub data: SurfaceData,
    pub texture: Option<TextureKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub surfaces: Vec<Surface>,
}

impl Mesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.data.vertices.len()).sum()
    }

    #[must_use]
    pub fn index_count(&self) -> usize {
        self.surfaces.iter().map(|s| s.data.indices.len()).sum()
    }
}
