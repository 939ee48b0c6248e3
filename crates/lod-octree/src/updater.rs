//! Per-frame refinement of an existing octree.
//!
//! Each call walks the tree once. A leaf close enough to the camera is split
//! into eight leaves; a subdivided node that is too far away collapses back
//! into a leaf once all of its children are leaves. Nodes only move one level
//! per call, so a fast camera approaching a region deepens it over several
//! frames rather than all at once. Children created during a call are not
//! revisited in that call, so a near leaf does not cascade straight down to
//! the max depth.
//!
//! The threshold halves with every level (`base * 2^-depth`), unlike the
//! builder's harmonic decay.

use std::collections::VecDeque;

use glam::Vec3;

use crate::config::LodParams;
use crate::node::SpatialNode;

/// Summary of one update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Nodes visited.
    pub visited: usize,
    /// Leaves that were split into eight children.
    pub subdivided: usize,
    /// Subdivided nodes that collapsed back into a leaf.
    pub merged: usize,
}

impl UpdateStats {
    /// True if the pass made no structural change.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.subdivided == 0 && self.merged == 0
    }

    fn changes(&self) -> usize {
        self.subdivided + self.merged
    }
}

/// A traversal order for applying the per-node refinement rule.
pub trait RefineStrategy {
    /// Refine the tree under `root` (at depth 0) for a camera at `camera`.
    fn refine(&self, root: &mut SpatialNode, camera: Vec3, params: &LodParams) -> UpdateStats;
}

/// Visit every node depth-first, children in octant order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirst;

impl RefineStrategy for DepthFirst {
    fn refine(&self, root: &mut SpatialNode, camera: Vec3, params: &LodParams) -> UpdateStats {
        update(root, camera, params)
    }
}

/// Visit nodes level by level and stop once a change budget is spent.
///
/// Coarse levels are refined first, so when the camera jumps a long way the
/// frame cost stays bounded and the remaining work spills into later frames.
#[derive(Debug, Clone, Copy)]
pub struct BreadthFirstBudget {
    /// Maximum number of subdivisions plus merges per call.
    pub max_changes: usize,
}

impl RefineStrategy for BreadthFirstBudget {
    fn refine(&self, root: &mut SpatialNode, camera: Vec3, params: &LodParams) -> UpdateStats {
        let mut stats = UpdateStats::default();
        let mut queue: VecDeque<(&mut SpatialNode, u32)> = VecDeque::new();
        queue.push_back((root, 0));

        while let Some((node, depth)) = queue.pop_front() {
            if stats.changes() >= self.max_changes {
                break;
            }
            let outcome = refine_node(node, camera, depth, params, &mut stats);
            if outcome.descends() && !node.is_leaf() {
                queue.extend(node.children_mut().map(|child| (child, depth + 1)));
            }
        }

        tracing::trace!(
            visited = stats.visited,
            subdivided = stats.subdivided,
            merged = stats.merged,
            budget = self.max_changes,
            "budgeted octree update"
        );
        stats
    }
}

/// Refine the whole tree depth-first, starting at depth 0.
pub fn update(root: &mut SpatialNode, camera: Vec3, params: &LodParams) -> UpdateStats {
    let mut stats = UpdateStats::default();
    update_subtree(root, camera, 0, params, &mut stats);

    tracing::trace!(
        visited = stats.visited,
        subdivided = stats.subdivided,
        merged = stats.merged,
        "octree update"
    );
    stats
}

/// Refine `node`, which sits at `current_depth`, and everything below it.
pub fn update_subtree(
    node: &mut SpatialNode,
    camera: Vec3,
    current_depth: u32,
    params: &LodParams,
    stats: &mut UpdateStats,
) {
    let outcome = refine_node(node, camera, current_depth, params, stats);

    if outcome.descends() && !node.is_leaf() {
        for child in node.children_mut() {
            update_subtree(child, camera, current_depth + 1, params, stats);
        }
    }
}

/// Detail threshold at `depth`: the base halved once per level.
#[allow(clippy::cast_possible_wrap)]
fn depth_threshold(base: f32, depth: u32) -> f32 {
    base * 2f32.powi(-(depth as i32))
}

/// What [`refine_node`] did to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Refinement {
    Unchanged,
    Subdivided,
    Merged,
}

impl Refinement {
    /// Children created this call are not refined until the next one.
    fn descends(self) -> bool {
        self != Refinement::Subdivided
    }
}

/// Apply the subdivide-or-merge rule to a single node without recursing.
fn refine_node(
    node: &mut SpatialNode,
    camera: Vec3,
    depth: u32,
    params: &LodParams,
    stats: &mut UpdateStats,
) -> Refinement {
    stats.visited += 1;

    let distance = camera.distance(node.center());
    let threshold = depth_threshold(params.threshold(), depth);

    if distance < threshold && depth < params.max_depth() {
        if node.subdivide() {
            stats.subdivided += 1;
            return Refinement::Subdivided;
        }
    } else if !node.is_leaf() && node.can_merge() {
        node.merge();
        stats.merged += 1;
        return Refinement::Merged;
    }
    Refinement::Unchanged
}
