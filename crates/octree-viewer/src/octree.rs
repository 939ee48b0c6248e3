//! Frame loop glue between the camera and the octree.
//!
//! Every frame the octree is refined for the camera position, the cube mesh
//! is cleared and re-extracted, and the result is uploaded as a Bevy mesh.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use lod_octree::mesh::UNIT_CUBE_VERTICES;
use lod_octree::{BreadthFirstBudget, CubeMesh, FrameInput, Octree, TreeStats, UpdateStats};

use crate::camera::{FlyCamera, camera_movement};
use crate::launch_params::LaunchParams;

/// Plugin that maintains and draws the octree.
pub struct OctreePlugin;

impl Plugin for OctreePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EdgeDisplay>()
            .add_systems(Startup, spawn_octree_mesh)
            .add_systems(
                Update,
                (refine_octree, upload_octree_mesh, toggle_edges, draw_leaf_edges)
                    .chain()
                    .after(camera_movement),
            );
    }
}

/// Edges of a cube as pairs of indices into [`UNIT_CUBE_VERTICES`].
const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// The live octree plus the mesh buffers it is extracted into.
#[derive(Resource)]
pub struct OctreeState {
    octree: Octree,
    mesh: CubeMesh,
    budget: Option<BreadthFirstBudget>,
    frame: u64,
    last_update: UpdateStats,
    dirty: bool,
}

impl OctreeState {
    /// Build the initial tree for the launch camera position.
    pub fn new(params: &LaunchParams) -> lod_octree::Result<Self> {
        let octree = Octree::build_new(params.config, params.camera_start)?;
        let mut mesh = CubeMesh::new();
        octree.rebuild_mesh(&mut mesh);

        let stats = octree.stats();
        tracing::info!(
            nodes = stats.nodes,
            leaves = stats.leaves,
            depth = stats.depth,
            "initial octree built"
        );

        Ok(Self {
            octree,
            mesh,
            budget: params.budget.map(|max_changes| BreadthFirstBudget { max_changes }),
            frame: 0,
            last_update: UpdateStats::default(),
            dirty: true,
        })
    }

    /// Shape of the current tree.
    #[must_use]
    pub fn tree_stats(&self) -> TreeStats {
        self.octree.stats()
    }

    /// The current extracted mesh.
    #[must_use]
    pub fn mesh(&self) -> &CubeMesh {
        &self.mesh
    }

    /// Result of the most recent update.
    #[must_use]
    pub fn last_update(&self) -> UpdateStats {
        self.last_update
    }

    /// Run one frame: update, clear, extract.
    fn step(&mut self, camera_position: Vec3) {
        self.frame += 1;
        let input = FrameInput::new(camera_position, self.frame);
        self.last_update = match &self.budget {
            Some(budget) => self.octree.update_with(&input, budget),
            None => self.octree.update(&input),
        };
        self.octree.rebuild_mesh(&mut self.mesh);
        self.dirty |= !self.last_update.is_unchanged();
    }
}

/// Whether leaf cube outlines are drawn.
#[derive(Resource)]
pub struct EdgeDisplay {
    pub enabled: bool,
}

impl Default for EdgeDisplay {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Marker for the entity carrying the octree mesh.
#[derive(Component)]
pub struct OctreeMeshMarker;

/// Convert extracted cubes to a Bevy triangle mesh.
///
/// Normals point out through each cube corner; the material is unlit, so
/// they only need to be present.
pub fn to_bevy_mesh(cubes: &CubeMesh) -> Mesh {
    let normals: Vec<[f32; 3]> = (0..cubes.vertex_count())
        .map(|i| UNIT_CUBE_VERTICES[i % UNIT_CUBE_VERTICES.len()].normalize().to_array())
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, cubes.positions_as_arrays());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(cubes.indices.clone()));
    mesh
}

/// Line segments outlining every cube in the mesh.
pub fn leaf_edges(positions: &[Vec3]) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
    positions
        .chunks_exact(UNIT_CUBE_VERTICES.len())
        .flat_map(|cube| CUBE_EDGES.iter().map(move |&(a, b)| (cube[a], cube[b])))
}

fn spawn_octree_mesh(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut state: ResMut<OctreeState>,
) {
    state.dirty = false;
    commands.spawn((
        OctreeMeshMarker,
        Mesh3d(meshes.add(to_bevy_mesh(&state.mesh))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgba(0.2, 0.7, 1.0, 0.15),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
    ));
}

/// Refine the octree for the current camera position.
fn refine_octree(mut state: ResMut<OctreeState>, camera_query: Query<&Transform, With<FlyCamera>>) {
    let Ok(transform) = camera_query.single() else {
        return;
    };
    state.step(transform.translation);
}

/// Replace the drawn mesh when the tree shape changed.
fn upload_octree_mesh(
    mut state: ResMut<OctreeState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut query: Query<&mut Mesh3d, With<OctreeMeshMarker>>,
) {
    if !state.dirty {
        return;
    }
    let Ok(mut mesh3d) = query.single_mut() else {
        return;
    };
    // The old handle is dropped here, which frees the previous asset.
    mesh3d.0 = meshes.add(to_bevy_mesh(&state.mesh));
    state.dirty = false;

    tracing::debug!(
        vertices = state.mesh.vertex_count(),
        triangles = state.mesh.triangle_count(),
        "uploaded octree mesh"
    );
}

fn toggle_edges(keyboard: Res<ButtonInput<KeyCode>>, mut display: ResMut<EdgeDisplay>) {
    if keyboard.just_pressed(KeyCode::KeyF) {
        display.enabled = !display.enabled;
    }
}

#[allow(clippy::needless_pass_by_value)]
fn draw_leaf_edges(state: Res<OctreeState>, display: Res<EdgeDisplay>, mut gizmos: Gizmos) {
    if !display.enabled {
        return;
    }
    let color = Color::srgb(0.4, 0.9, 1.0);
    for (start, end) in leaf_edges(&state.mesh.positions) {
        gizmos.line(start, end, color);
    }
}
