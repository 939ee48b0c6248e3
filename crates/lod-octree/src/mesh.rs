//! Cube mesh extraction.
//!
//! Every leaf becomes one axis-aligned cube scaled to the leaf's edge length.
//! Output is a plain position list plus a `u32` triangle list, which maps
//! directly onto GPU vertex and index buffers.

use glam::Vec3;

use crate::node::SpatialNode;

/// Corners of a unit cube centered at the origin.
pub const UNIT_CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

/// Triangle list for [`UNIT_CUBE_VERTICES`], two triangles per face.
pub const UNIT_CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0, // -z
    1, 5, 6, 6, 2, 1, // +x
    7, 6, 5, 5, 4, 7, // +z
    4, 0, 3, 3, 7, 4, // -x
    4, 5, 1, 1, 0, 4, // -y
    3, 2, 6, 6, 7, 3, // +y
];

/// Append one cube per leaf under `node` to the output buffers.
///
/// The buffers are never cleared here. Leaves are emitted depth-first in
/// octant order, so the output is deterministic for a given tree.
pub fn extract(node: &SpatialNode, vertices: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    if node.is_leaf() {
        push_cube(node.center(), node.edge_length(), vertices, indices);
        return;
    }

    for child in node.children() {
        extract(child, vertices, indices);
    }
}

#[allow(clippy::cast_possible_truncation)]
fn push_cube(center: Vec3, edge_length: f32, vertices: &mut Vec<Vec3>, indices: &mut Vec<u32>) {
    // A depth-limited tree has at most 8^8 leaves, well inside u32 range.
    let base = vertices.len() as u32;
    vertices.extend(UNIT_CUBE_VERTICES.iter().map(|&v| center + v * edge_length));
    indices.extend(UNIT_CUBE_INDICES.iter().map(|&i| base + i));
}

/// Caller-owned vertex and index buffers for the extracted cubes.
///
/// Reuse one instance across frames to keep the allocations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CubeMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
}

impl CubeMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all geometry but keep the allocations.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
    }

    /// Append the cubes for every leaf under `node`.
    pub fn extract_from(&mut self, node: &SpatialNode) {
        extract(node, &mut self.positions, &mut self.indices);
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the mesh holds no geometry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as plain arrays, the layout GPU vertex buffers expect.
    #[must_use]
    pub fn positions_as_arrays(&self) -> Vec<[f32; 3]> {
        self.positions.iter().map(|p| p.to_array()).collect()
    }
}
