//! Fly-through viewer for the adaptive level-of-detail octree using Bevy.
//!
//! Every leaf of the octree is drawn as a translucent cube with outlined
//! edges. Flying closer to a region splits it into finer cubes; flying away
//! merges them back.

mod camera;
mod launch_params;
mod octree;
mod ui;

use bevy::prelude::*;
use camera::{CameraControllerPlugin, FlyCamera};
use launch_params::LaunchParams;
use octree::{OctreePlugin, OctreeState};
use ui::DebugUiPlugin;

/// Vertical field of view in degrees.
const FOV_DEGREES: f32 = 80.0;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_plugins((CameraControllerPlugin, OctreePlugin, DebugUiPlugin))
            .add_systems(Startup, setup_scene);
    }
}

/// Spawn the camera at the launch position.
#[allow(clippy::needless_pass_by_value)]
fn setup_scene(mut commands: Commands, params: Res<LaunchParams>) {
    let fly = FlyCamera::default();

    commands.spawn((
        Camera3d::default(),
        Camera::default(),
        Transform::from_translation(params.camera_start).looking_to(fly.direction(), Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..Default::default()
        }),
        fly,
    ));

    tracing::info!("Scene setup complete - use WASD to move, mouse to look");
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = match launch_params::parse() {
        Ok(params) => params,
        Err(e) => {
            tracing::error!("invalid launch parameters: {e}");
            std::process::exit(2);
        }
    };

    let state = match OctreeState::new(&params) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("failed to build octree: {e}");
            std::process::exit(2);
        }
    };

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "octree-viewer".to_string(),
        resolution: (1920, 1080).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params)
        .insert_resource(state)
        .add_plugins(AppPlugin)
        .run();
}
