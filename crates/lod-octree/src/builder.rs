//! Initial construction of the octree around a camera position.
//!
//! A node subdivides while the camera is within the detail threshold of its
//! center. The threshold shrinks harmonically on the way down: each level
//! divides the threshold it was handed by its parent by `depth + 1`, so the
//! effective threshold at depth `d` is `initial / (d + 1)!`.
//!
//! The per-frame updater decays its threshold geometrically instead, so a
//! freshly built tree is not necessarily a fixed point of the updater.

use glam::Vec3;

use crate::config::LodParams;
use crate::node::{PLACEHOLDER_VALUE, SpatialNode};

/// Summary of one construction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Child nodes allocated during the pass.
    pub nodes_allocated: usize,
    /// Leaves in the finished tree.
    pub leaves: usize,
}

/// Populate `root` for a camera at `camera`.
///
/// Any existing subtree under `root` is replaced.
pub fn build(root: &mut SpatialNode, camera: Vec3, params: &LodParams) -> BuildStats {
    let mut stats = BuildStats::default();
    build_subtree(
        root,
        camera,
        params.max_depth(),
        params.threshold(),
        0,
        &mut stats,
    );

    tracing::debug!(
        nodes_allocated = stats.nodes_allocated,
        leaves = stats.leaves,
        max_depth = params.max_depth(),
        "built octree"
    );
    stats
}

/// Threshold for a node at `current_depth` given the one its parent used.
#[allow(clippy::cast_precision_loss)]
fn decayed_threshold(parent_threshold: f32, current_depth: u32) -> f32 {
    parent_threshold / (current_depth + 1) as f32
}

fn build_subtree(
    node: &mut SpatialNode,
    camera: Vec3,
    max_depth: u32,
    parent_threshold: f32,
    current_depth: u32,
    stats: &mut BuildStats,
) {
    let distance = camera.distance(node.center());
    let threshold = decayed_threshold(parent_threshold, current_depth);

    if distance > threshold || current_depth >= max_depth {
        node.mark_leaf(PLACEHOLDER_VALUE);
        stats.leaves += 1;
        return;
    }

    // Start from a clean leaf so a rebuild never keeps stale children.
    node.merge();
    node.subdivide();
    stats.nodes_allocated += node.child_count();

    for child in node.children_mut() {
        build_subtree(
            child,
            camera,
            max_depth,
            threshold,
            current_depth + 1,
            stats,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::octant_offset;

    fn params(max_depth: u32, threshold: f32) -> LodParams {
        LodParams::new(max_depth, threshold).unwrap()
    }

    #[test]
    fn test_far_camera_builds_single_leaf() {
        let mut root = SpatialNode::root(Vec3::ZERO, 36.0).unwrap();
        let stats = build(&mut root, Vec3::splat(1000.0), &params(0, 50.0));

        assert!(root.is_leaf());
        assert_eq!(root.child_count(), 0);
        assert!((root.value() - PLACEHOLDER_VALUE).abs() < f32::EPSILON);
        assert_eq!(
            stats,
            BuildStats {
                nodes_allocated: 0,
                leaves: 1
            }
        );
    }

    #[test]
    fn test_zero_depth_never_subdivides() {
        let mut root = SpatialNode::root(Vec3::ZERO, 36.0).unwrap();
        build(&mut root, Vec3::ZERO, &params(0, 1000.0));
        assert!(root.is_leaf());
    }

    #[test]
    fn test_near_camera_subdivides_one_level() {
        let mut root = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        let stats = build(&mut root, Vec3::ZERO, &params(1, 10.0));

        assert!(!root.is_leaf());
        assert_eq!(root.child_count(), 8);
        for (index, child) in root.children().enumerate() {
            assert!(child.is_leaf());
            assert!((child.edge_length() - 4.0).abs() < f32::EPSILON);
            assert_eq!(child.center(), octant_offset(index, 4.0));
        }
        assert_eq!(stats.nodes_allocated, 8);
        assert_eq!(stats.leaves, 8);
    }

    #[test]
    fn test_distance_equal_to_threshold_subdivides() {
        let mut root = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        build(&mut root, Vec3::new(5.0, 0.0, 0.0), &params(1, 5.0));
        assert!(!root.is_leaf());
    }

    #[test]
    fn test_threshold_decays_from_parent_threshold() {
        // Depth 0 uses 10, depth 1 uses 10 / 2 = 5, depth 2 uses 5 / 3.
        assert!((decayed_threshold(10.0, 0) - 10.0).abs() < f32::EPSILON);
        assert!((decayed_threshold(10.0, 1) - 5.0).abs() < f32::EPSILON);
        assert!((decayed_threshold(5.0, 2) - 5.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_only_near_octant_deepens() {
        // Camera sits at the center of octant 7 of a 16-unit root.
        // Depth 1 threshold is 40 / 2 = 20, which every child center is
        // within, so all eight subdivide. Depth 2 threshold is 20 / 3,
        // which only grandchildren close to the camera satisfy.
        let camera = Vec3::splat(4.0);
        let mut root = SpatialNode::root(Vec3::ZERO, 16.0).unwrap();
        build(&mut root, camera, &params(3, 40.0));

        assert!(root.children().all(|c| !c.is_leaf()));
        let near = root.child(7).unwrap();
        let far = root.child(0).unwrap();
        assert!(near.children().any(|c| !c.is_leaf()));
        assert!(far.children().all(SpatialNode::is_leaf));
        assert!(root.depth() <= 3);
    }

    #[test]
    fn test_rebuild_replaces_existing_tree() {
        let mut root = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        build(&mut root, Vec3::ZERO, &params(2, 100.0));
        assert!(root.node_count() > 1);

        build(&mut root, Vec3::splat(1000.0), &params(2, 100.0));
        assert!(root.is_leaf());
        assert_eq!(root.node_count(), 1);
    }
}
