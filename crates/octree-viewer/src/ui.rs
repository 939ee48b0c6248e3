//! Debug UI for displaying performance metrics and octree info.
//!
//! Shows FPS, camera position, tree shape, mesh size and the last update.

use bevy::camera::ClearColorConfig;
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::ui::{IsDefaultUiCamera, Node as UiNode, PositionType, Val};

use crate::camera::FlyCamera;
use crate::octree::{EdgeDisplay, OctreeState};

/// Plugin for debug UI overlay.
pub struct DebugUiPlugin;

impl Plugin for DebugUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(Startup, setup_debug_ui)
            .add_systems(Update, update_debug_ui);
    }
}

/// Marker component for the debug text.
#[derive(Component)]
struct DebugText;

/// Set up the debug UI text element.
fn setup_debug_ui(mut commands: Commands) {
    // Order 1 renders the overlay after the 3D camera.
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        IsDefaultUiCamera,
    ));

    commands.spawn((
        Text::new("Building..."),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        UiNode {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        DebugText,
    ));
}

/// Update the debug UI with current metrics.
#[allow(clippy::needless_pass_by_value)]
fn update_debug_ui(
    diagnostics: Res<DiagnosticsStore>,
    state: Res<OctreeState>,
    display: Res<EdgeDisplay>,
    camera_query: Query<&Transform, With<FlyCamera>>,
    mut text_query: Query<&mut Text, With<DebugText>>,
) {
    let Ok(mut text) = text_query.single_mut() else {
        return;
    };

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    let position = camera_query
        .single()
        .map_or(Vec3::ZERO, |transform| transform.translation);

    let tree = state.tree_stats();
    let mesh = state.mesh();
    let update = state.last_update();
    let edges = if display.enabled { "on" } else { "off" };

    **text = format!(
        "FPS: {fps:.0}\n\
         Camera: ({:.1}, {:.1}, {:.1})\n\
         Nodes: {} ({} leaves, depth {})\n\
         Mesh: {} vertices, {} triangles\n\
         Last update: +{} split, -{} merged\n\
         \n\
         Controls:\n\
         WASD - Move\n\
         Space / Ctrl - Up / Down\n\
         Mouse - Look\n\
         Esc / Click - Release / capture mouse\n\
         Shift - Speed boost\n\
         F - Edges ({edges})",
        position.x,
        position.y,
        position.z,
        tree.nodes,
        tree.leaves,
        tree.depth,
        mesh.vertex_count(),
        mesh.triangle_count(),
        update.subdivided,
        update.merged,
    );
}
