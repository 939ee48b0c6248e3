//! Camera-driven adaptive octree with cube mesh extraction.
//!
//! A cubic volume is split recursively into octants, more finely near the
//! camera and more coarsely far away. Every leaf is drawn as one cube.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives
//! - **Single owner**: Each node owns its children; the tree is mutated in
//!   place by whoever drives the frame loop
//! - **Caller-owned buffers**: Mesh extraction appends to buffers the caller
//!   keeps between frames
//!
//! # Frame order
//!
//! ```ignore
//! use lod_octree::{CubeMesh, FrameInput, Octree, OctreeConfig};
//!
//! let mut octree = Octree::build_new(OctreeConfig::default(), camera)?;
//! let mut mesh = CubeMesh::new();
//!
//! // Every frame: update, then clear and extract, then upload.
//! octree.update(&FrameInput::new(camera, frame));
//! octree.rebuild_mesh(&mut mesh);
//! upload(&mesh.positions, &mesh.indices);
//! ```

pub mod builder;
pub mod config;
mod error;
pub mod mesh;
pub mod node;
mod tree;
pub mod updater;

pub use builder::{BuildStats, build};
pub use config::{LodParams, MAX_SUPPORTED_DEPTH, OctreeConfig};
pub use error::{Error, Result};
pub use mesh::{CubeMesh, extract};
pub use node::SpatialNode;
pub use tree::{FrameInput, Octree, TreeStats};
pub use updater::{BreadthFirstBudget, DepthFirst, RefineStrategy, UpdateStats, update};
