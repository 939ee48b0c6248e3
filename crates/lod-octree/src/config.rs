//! Detail parameters for building and updating an octree.
//!
//! The construction pass and the per-frame update pass each get their own
//! [`LodParams`]. They are allowed to differ: a deeper initial build followed
//! by a shallower steady-state update is a supported policy.

use glam::Vec3;

use crate::error::{Error, Result};

/// Largest max depth accepted by [`LodParams::new`].
///
/// A full tree at this depth holds 8^8 leaves, which is already far beyond
/// anything worth rendering as individual cubes.
pub const MAX_SUPPORTED_DEPTH: u32 = 8;

/// Default root edge length.
pub const DEFAULT_ROOT_EDGE_LENGTH: f32 = 36.0;

/// Default max depth for both passes.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Default detail threshold for both passes.
pub const DEFAULT_THRESHOLD: f32 = 50.0;

/// Where the camera starts in a fresh scene.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 25.0, 50.0);

/// Depth bound and detail threshold for one pass over the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodParams {
    max_depth: u32,
    threshold: f32,
}

impl LodParams {
    /// Create validated parameters.
    ///
    /// The threshold must be finite and positive, and `max_depth` must not
    /// exceed [`MAX_SUPPORTED_DEPTH`].
    pub fn new(max_depth: u32, threshold: f32) -> Result<Self> {
        if max_depth > MAX_SUPPORTED_DEPTH {
            return Err(Error::ResourceLimitExceeded {
                requested: max_depth,
                limit: MAX_SUPPORTED_DEPTH,
            });
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::invalid(
                "detail threshold",
                format!("must be finite and positive, got {threshold}"),
            ));
        }
        Ok(Self {
            max_depth,
            threshold,
        })
    }

    /// Deepest level a node may live at. Nodes at this depth are always leaves.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Threshold at the root; each pass decays it with depth its own way.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Default for LodParams {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Everything needed to create and maintain an [`crate::Octree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeConfig {
    /// World-space center of the root volume.
    pub root_center: Vec3,
    /// Edge length of the root cube.
    pub root_edge_length: f32,
    /// Parameters for the initial construction pass.
    pub build: LodParams,
    /// Parameters for the per-frame update pass.
    pub update: LodParams,
}

impl OctreeConfig {
    /// Check the root volume. [`LodParams`] are validated on construction.
    pub fn validate(&self) -> Result<()> {
        validate_root(self.root_center, self.root_edge_length)
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            root_center: Vec3::ZERO,
            root_edge_length: DEFAULT_ROOT_EDGE_LENGTH,
            build: LodParams::default(),
            update: LodParams::default(),
        }
    }
}

pub(crate) fn validate_root(center: Vec3, edge_length: f32) -> Result<()> {
    if !center.is_finite() {
        return Err(Error::invalid(
            "root center",
            format!("must be finite, got {center}"),
        ));
    }
    if !edge_length.is_finite() || edge_length <= 0.0 {
        return Err(Error::invalid(
            "edge length",
            format!("must be finite and positive, got {edge_length}"),
        ));
    }
    Ok(())
}
