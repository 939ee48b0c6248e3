//! The spatial node: a cubic region that is either a leaf or split into eight.

use glam::Vec3;

use crate::config::validate_root;
use crate::error::Result;

/// Scalar assigned to every leaf produced by a build or update pass.
///
/// Nothing reads it yet; it marks where a density field would plug in.
pub const PLACEHOLDER_VALUE: f32 = 0.5;

/// Number of children of a subdivided node.
pub const OCTANT_COUNT: usize = 8;

/// Offset from a parent center to the center of child `index`.
///
/// Bit 0 of the index selects +x, bit 1 +y and bit 2 +z; a cleared bit
/// selects the negative side. The magnitude on each axis is `new_size / 2`.
#[must_use]
pub fn octant_offset(index: usize, new_size: f32) -> Vec3 {
    let half = new_size / 2.0;
    let sign = |bit: usize| if index & bit != 0 { half } else { -half };
    Vec3::new(sign(1), sign(2), sign(4))
}

/// A cubic region of space.
///
/// Each child is owned exclusively by its parent, so dropping a node drops
/// its whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialNode {
    is_leaf: bool,
    center: Vec3,
    edge_length: f32,
    children: [Option<Box<SpatialNode>>; OCTANT_COUNT],
    value: f32,
}

impl SpatialNode {
    pub(crate) fn new(is_leaf: bool, center: Vec3, edge_length: f32) -> Self {
        Self {
            is_leaf,
            center,
            edge_length,
            children: Default::default(),
            value: 0.0,
        }
    }

    /// Create a root node covering the given cube.
    ///
    /// The root starts out as a leaf; run the builder to populate it.
    pub fn root(center: Vec3, edge_length: f32) -> Result<Self> {
        validate_root(center, edge_length)?;
        Ok(Self::new(true, center, edge_length))
    }

    /// Whether this node has no children and contributes geometry directly.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// World-space center of the cube.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Length of one edge of the cube.
    #[must_use]
    pub fn edge_length(&self) -> f32 {
        self.edge_length
    }

    /// Scalar field sample. Stored but not used for rendering.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Child in octant `index`, if present.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&SpatialNode> {
        self.children.get(index)?.as_deref()
    }

    /// Present children in octant order. Absent slots are skipped.
    pub fn children(&self) -> impl Iterator<Item = &SpatialNode> {
        self.children.iter().filter_map(Option::as_deref)
    }

    pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut SpatialNode> {
        self.children.iter_mut().filter_map(Option::as_deref_mut)
    }

    /// Number of present children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    /// Become a leaf holding `value`, releasing any children.
    pub(crate) fn mark_leaf(&mut self, value: f32) {
        self.children = Default::default();
        self.is_leaf = true;
        self.value = value;
    }

    /// Turn a leaf into a non-leaf owning eight fresh leaf children.
    ///
    /// Returns false and leaves the node untouched if it is already
    /// subdivided.
    pub(crate) fn subdivide(&mut self) -> bool {
        if !self.is_leaf {
            return false;
        }
        self.is_leaf = false;
        let new_size = self.edge_length / 2.0;
        for (index, slot) in self.children.iter_mut().enumerate() {
            let center = self.center + octant_offset(index, new_size);
            let mut child = SpatialNode::new(true, center, new_size);
            child.value = PLACEHOLDER_VALUE;
            *slot = Some(Box::new(child));
        }
        true
    }

    /// True when all eight children are present and every one is a leaf.
    #[must_use]
    pub fn can_merge(&self) -> bool {
        self.children
            .iter()
            .all(|c| c.as_deref().is_some_and(SpatialNode::is_leaf))
    }

    /// Release every child and become a leaf.
    pub(crate) fn merge(&mut self) {
        self.children = Default::default();
        self.is_leaf = true;
    }

    #[cfg(test)]
    pub(crate) fn remove_child(&mut self, index: usize) {
        self.children[index] = None;
    }

    /// Visit this node and its descendants depth-first in octant order.
    ///
    /// The callback receives each node with its depth relative to `self`.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&SpatialNode, u32),
    {
        self.visit_at(0, f);
    }

    fn visit_at<F>(&self, depth: u32, f: &mut F)
    where
        F: FnMut(&SpatialNode, u32),
    {
        f(self, depth);
        for child in self.children() {
            child.visit_at(depth + 1, f);
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_, _| count += 1);
        count
    }

    /// Number of leaves in this subtree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |node, _| {
            if node.is_leaf {
                count += 1;
            }
        });
        count
    }

    /// Depth of the deepest node, with `self` at depth 0.
    #[must_use]
    pub fn depth(&self) -> u32 {
        let mut deepest = 0;
        self.visit(&mut |_, depth| deepest = deepest.max(depth));
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octant_offsets_sign_pattern() {
        assert_eq!(octant_offset(0, 2.0), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(octant_offset(1, 2.0), Vec3::new(1.0, -1.0, -1.0));
        assert_eq!(octant_offset(2, 2.0), Vec3::new(-1.0, 1.0, -1.0));
        assert_eq!(octant_offset(4, 2.0), Vec3::new(-1.0, -1.0, 1.0));
        assert_eq!(octant_offset(7, 2.0), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_root_validation() {
        assert!(SpatialNode::root(Vec3::ZERO, 1.0).is_ok());
        assert!(SpatialNode::root(Vec3::ZERO, 0.0).is_err());
        assert!(SpatialNode::root(Vec3::ZERO, -3.0).is_err());
        assert!(SpatialNode::root(Vec3::splat(f32::INFINITY), 1.0).is_err());
    }

    #[test]
    fn test_subdivide_creates_leaf_children() {
        let mut node = SpatialNode::root(Vec3::new(1.0, 2.0, 3.0), 8.0).unwrap();
        assert!(node.subdivide());
        assert!(!node.is_leaf());
        assert_eq!(node.child_count(), 8);

        for (index, child) in node.children().enumerate() {
            assert!(child.is_leaf());
            assert!((child.edge_length() - 4.0).abs() < f32::EPSILON);
            assert!((child.value() - PLACEHOLDER_VALUE).abs() < f32::EPSILON);
            assert_eq!(child.center(), node.center() + octant_offset(index, 4.0));
        }

        // Subdividing again is a no-op.
        assert!(!node.subdivide());
    }

    #[test]
    fn test_merge_releases_children() {
        let mut node = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        node.subdivide();
        assert!(node.can_merge());
        node.merge();
        assert!(node.is_leaf());
        assert_eq!(node.child_count(), 0);
        assert_eq!(node.node_count(), 1);
    }

    #[test]
    fn test_can_merge_requires_all_leaf_children() {
        let mut node = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        node.subdivide();
        node.children_mut().nth(3).unwrap().subdivide();
        assert!(!node.can_merge());

        let mut partial = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        partial.subdivide();
        partial.remove_child(5);
        assert!(!partial.can_merge());
    }

    #[test]
    fn test_counts_and_depth() {
        let mut node = SpatialNode::root(Vec3::ZERO, 8.0).unwrap();
        assert_eq!(node.depth(), 0);
        node.subdivide();
        node.children_mut().next().unwrap().subdivide();

        assert_eq!(node.node_count(), 1 + 8 + 8);
        assert_eq!(node.leaf_count(), 7 + 8);
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn test_visit_order_is_octant_order() {
        let mut node = SpatialNode::root(Vec3::ZERO, 2.0).unwrap();
        node.subdivide();

        let mut centers = Vec::new();
        node.visit(&mut |n, depth| {
            if depth == 1 {
                centers.push(n.center());
            }
        });
        let expected: Vec<Vec3> = (0..8).map(|i| octant_offset(i, 1.0)).collect();
        assert_eq!(centers, expected);
    }
}
