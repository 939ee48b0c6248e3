//! Owning wrapper that ties a root node to its configuration.

use glam::Vec3;

use crate::builder::{self, BuildStats};
use crate::config::OctreeConfig;
use crate::error::{Error, Result};
use crate::mesh::CubeMesh;
use crate::node::SpatialNode;
use crate::updater::{DepthFirst, RefineStrategy, UpdateStats};

/// Per-frame input from whoever owns the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Camera position in world space.
    pub camera_position: Vec3,
    /// Monotonic frame counter, used for logging only.
    pub frame: u64,
}

impl FrameInput {
    #[must_use]
    pub fn new(camera_position: Vec3, frame: u64) -> Self {
        Self {
            camera_position,
            frame,
        }
    }
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Total nodes, including the root.
    pub nodes: usize,
    /// Leaves, i.e. cubes that will be drawn.
    pub leaves: usize,
    /// Depth of the deepest node, root at 0.
    pub depth: u32,
}

/// An adaptive octree and the parameters it is maintained with.
///
/// The root is allocated once in [`Octree::new`] and then mutated in place by
/// every build and update for the lifetime of the tree.
#[derive(Debug, Clone)]
pub struct Octree {
    root: SpatialNode,
    config: OctreeConfig,
}

impl Octree {
    /// Create an unbuilt tree: a single leaf covering the root volume.
    pub fn new(config: OctreeConfig) -> Result<Self> {
        config.validate()?;
        let root = SpatialNode::root(config.root_center, config.root_edge_length)?;
        Ok(Self { root, config })
    }

    /// Create a tree and run the construction pass for `camera`.
    pub fn build_new(config: OctreeConfig, camera: Vec3) -> Result<Self> {
        if !camera.is_finite() {
            return Err(Error::invalid(
                "camera position",
                format!("{camera} is not finite"),
            ));
        }
        let mut octree = Self::new(config)?;
        octree.build(camera);
        Ok(octree)
    }

    /// Run the construction pass, replacing the current shape.
    ///
    /// A non-finite camera leaves the tree untouched.
    pub fn build(&mut self, camera: Vec3) -> BuildStats {
        if !camera.is_finite() {
            tracing::warn!(%camera, "skipping octree build for non-finite camera");
            return BuildStats::default();
        }
        builder::build(&mut self.root, camera, &self.config.build)
    }

    /// Refine the tree for this frame depth-first.
    pub fn update(&mut self, input: &FrameInput) -> UpdateStats {
        self.update_with(input, &DepthFirst)
    }

    /// Refine the tree for this frame using a custom traversal.
    ///
    /// Frames with a non-finite camera position are skipped.
    pub fn update_with<S>(&mut self, input: &FrameInput, strategy: &S) -> UpdateStats
    where
        S: RefineStrategy + ?Sized,
    {
        if !input.camera_position.is_finite() {
            tracing::warn!(
                frame = input.frame,
                camera = %input.camera_position,
                "skipping octree update for non-finite camera"
            );
            return UpdateStats::default();
        }
        let stats = strategy.refine(&mut self.root, input.camera_position, &self.config.update);
        tracing::trace!(
            frame = input.frame,
            subdivided = stats.subdivided,
            merged = stats.merged,
            "frame refined"
        );
        stats
    }

    /// Replace the contents of `mesh` with the current leaves.
    pub fn rebuild_mesh(&self, mesh: &mut CubeMesh) {
        mesh.clear();
        mesh.extract_from(&self.root);
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &SpatialNode {
        &self.root
    }

    /// The configuration this tree was created with.
    #[must_use]
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Count nodes and leaves and measure depth in one pass.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.root.visit(&mut |node, depth| {
            stats.nodes += 1;
            if node.is_leaf() {
                stats.leaves += 1;
            }
            stats.depth = stats.depth.max(depth);
        });
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LodParams;
    use crate::error::Error;
    use crate::updater::BreadthFirstBudget;

    fn config(edge_length: f32, max_depth: u32, threshold: f32) -> OctreeConfig {
        let params = LodParams::new(max_depth, threshold).unwrap();
        OctreeConfig {
            root_center: Vec3::ZERO,
            root_edge_length: edge_length,
            build: params,
            update: params,
        }
    }

    #[test]
    fn test_new_rejects_bad_edge_length() {
        let result = Octree::new(config(0.0, 1, 1.0));
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_new_is_single_leaf() {
        let octree = Octree::new(OctreeConfig::default()).unwrap();
        assert_eq!(
            octree.stats(),
            TreeStats {
                nodes: 1,
                leaves: 1,
                depth: 0
            }
        );
    }

    #[test]
    fn test_rebuild_mesh_clears_previous_frame() {
        let mut octree = Octree::build_new(config(8.0, 1, 10.0), Vec3::ZERO).unwrap();
        let mut mesh = CubeMesh::new();
        octree.rebuild_mesh(&mut mesh);
        assert_eq!(mesh.vertex_count(), 64);

        octree.update(&FrameInput::new(Vec3::splat(500.0), 1));
        octree.rebuild_mesh(&mut mesh);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn test_stats_match_node_queries() {
        let octree = Octree::build_new(config(16.0, 3, 40.0), Vec3::splat(4.0)).unwrap();
        let stats = octree.stats();
        assert_eq!(stats.nodes, octree.root().node_count());
        assert_eq!(stats.leaves, octree.root().leaf_count());
        assert_eq!(stats.depth, octree.root().depth());
    }

    #[test]
    fn test_update_with_budget() {
        let mut octree = Octree::new(config(16.0, 3, 1000.0)).unwrap();
        let strategy = BreadthFirstBudget { max_changes: 1 };
        let input = FrameInput::new(Vec3::ZERO, 0);

        let stats = octree.update_with(&input, &strategy);
        assert_eq!(stats.subdivided, 1);
        let stats = octree.update_with(&input, &strategy);
        assert_eq!(stats.subdivided, 1);
        assert_eq!(octree.stats().nodes, 1 + 8 + 8);
    }

    #[test]
    fn test_non_finite_camera_is_ignored() {
        let mut octree = Octree::build_new(config(8.0, 2, 10.0), Vec3::ZERO).unwrap();
        let before = octree.root().clone();

        let stats = octree.update(&FrameInput::new(Vec3::NAN, 1));
        assert!(stats.is_unchanged());
        assert_eq!(stats.visited, 0);
        assert_eq!(octree.build(Vec3::new(0.0, f32::INFINITY, 0.0)), BuildStats::default());
        assert_eq!(octree.root(), &before);

        let result = Octree::build_new(config(8.0, 2, 10.0), Vec3::NAN);
        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration {
                parameter: "camera position",
                ..
            })
        ));
    }

    #[test]
    fn test_update_with_dyn_strategy() {
        let mut octree = Octree::new(config(16.0, 2, 1000.0)).unwrap();
        let strategy: Box<dyn RefineStrategy> = Box::new(DepthFirst);
        let stats = octree.update_with(&FrameInput::new(Vec3::ZERO, 0), strategy.as_ref());
        assert_eq!(stats.subdivided, 1);
    }
}
