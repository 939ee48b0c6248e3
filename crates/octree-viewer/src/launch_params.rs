//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use lod_octree::config::{
    DEFAULT_CAMERA_POSITION, DEFAULT_MAX_DEPTH, DEFAULT_ROOT_EDGE_LENGTH, DEFAULT_THRESHOLD,
};
use lod_octree::{LodParams, OctreeConfig};

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Clone, Copy)]
pub struct LaunchParams {
    /// Octree root volume and detail parameters.
    pub config: OctreeConfig,
    /// Where the camera starts.
    pub camera_start: Vec3,
    /// Maximum structural changes per frame, if refinement is budgeted.
    pub budget: Option<usize>,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            config: OctreeConfig::default(),
            camera_start: DEFAULT_CAMERA_POSITION,
            budget: None,
        }
    }
}

/// Unvalidated values as they come from the command line.
#[derive(Debug, Clone, Copy)]
pub struct RawLaunchParams {
    pub root_size: f32,
    pub build_depth: u32,
    pub update_depth: u32,
    pub threshold: f32,
    pub camera_start: Vec3,
    pub budget: Option<usize>,
}

impl Default for RawLaunchParams {
    fn default() -> Self {
        Self {
            root_size: DEFAULT_ROOT_EDGE_LENGTH,
            build_depth: DEFAULT_MAX_DEPTH,
            update_depth: DEFAULT_MAX_DEPTH,
            threshold: DEFAULT_THRESHOLD,
            camera_start: DEFAULT_CAMERA_POSITION,
            budget: None,
        }
    }
}

impl TryFrom<RawLaunchParams> for LaunchParams {
    type Error = lod_octree::Error;

    fn try_from(raw: RawLaunchParams) -> Result<Self, Self::Error> {
        let config = OctreeConfig {
            root_center: Vec3::ZERO,
            root_edge_length: raw.root_size,
            build: LodParams::new(raw.build_depth, raw.threshold)?,
            update: LodParams::new(raw.update_depth, raw.threshold)?,
        };
        config.validate()?;
        Ok(Self {
            config,
            camera_start: raw.camera_start,
            budget: raw.budget.filter(|&b| b > 0),
        })
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Fly through an adaptive level-of-detail octree")]
    struct CliArgs {
        /// Edge length of the root cube.
        #[arg(long, default_value_t = DEFAULT_ROOT_EDGE_LENGTH)]
        root_size: f32,

        /// Max depth for the initial build.
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        build_depth: u32,

        /// Max depth for per-frame updates.
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        update_depth: u32,

        /// Detail threshold at the root.
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Starting camera x.
        #[arg(long, default_value_t = DEFAULT_CAMERA_POSITION.x, allow_hyphen_values = true)]
        camera_x: f32,

        /// Starting camera y.
        #[arg(long, default_value_t = DEFAULT_CAMERA_POSITION.y, allow_hyphen_values = true)]
        camera_y: f32,

        /// Starting camera z.
        #[arg(long, default_value_t = DEFAULT_CAMERA_POSITION.z, allow_hyphen_values = true)]
        camera_z: f32,

        /// Refine breadth-first with at most this many changes per frame.
        #[arg(long)]
        budget: Option<usize>,
    }

    pub fn parse() -> RawLaunchParams {
        let args = CliArgs::parse();
        RawLaunchParams {
            root_size: args.root_size,
            build_depth: args.build_depth,
            update_depth: args.update_depth,
            threshold: args.threshold,
            camera_start: Vec3::new(args.camera_x, args.camera_y, args.camera_z),
            budget: args.budget,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> Result<LaunchParams, lod_octree::Error> {
    #[cfg(not(target_family = "wasm"))]
    let raw = native::parse();
    #[cfg(target_family = "wasm")]
    let raw = RawLaunchParams::default();

    LaunchParams::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = LaunchParams::try_from(RawLaunchParams::default()).unwrap();
        assert_eq!(params.config, OctreeConfig::default());
        assert_eq!(params.camera_start, DEFAULT_CAMERA_POSITION);
        assert!(params.budget.is_none());
    }

    #[test]
    fn test_rejects_negative_root_size() {
        let raw = RawLaunchParams {
            root_size: -4.0,
            ..RawLaunchParams::default()
        };
        assert!(matches!(
            LaunchParams::try_from(raw),
            Err(lod_octree::Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_excessive_depth() {
        let raw = RawLaunchParams {
            update_depth: 20,
            ..RawLaunchParams::default()
        };
        assert!(matches!(
            LaunchParams::try_from(raw),
            Err(lod_octree::Error::ResourceLimitExceeded { requested: 20, .. })
        ));
    }

    #[test]
    fn test_zero_budget_disables_budgeting() {
        let raw = RawLaunchParams {
            budget: Some(0),
            ..RawLaunchParams::default()
        };
        assert!(LaunchParams::try_from(raw).unwrap().budget.is_none());
    }
}
