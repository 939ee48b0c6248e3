//! Free-flight camera controller.
//!
//! WASD moves along the view direction, Space and Ctrl move straight up and
//! down, Shift doubles horizontal speed, and the mouse turns the view while
//! the cursor is captured. Esc releases the cursor; left-click captures it
//! again.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};

/// Plugin for free-flight camera controls.
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, grab_cursor)
            .add_systems(
                Update,
                (
                    cursor_grab_system,
                    camera_look.run_if(cursor_is_grabbed),
                    camera_movement,
                )
                    .chain(),
            );
    }
}

/// Settings for camera movement.
#[derive(Resource)]
pub struct CameraSettings {
    /// Movement speed in units per second.
    pub base_speed: f32,
    /// Horizontal speed multiplier when Shift is held.
    pub boost_multiplier: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Largest pitch magnitude in degrees.
    pub max_pitch: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            // 0.2 units per frame at 60 fps.
            base_speed: 12.0,
            boost_multiplier: 2.0,
            mouse_sensitivity: 0.1,
            max_pitch: 89.0,
        }
    }
}

/// The controlled camera's orientation, in degrees.
#[derive(Component, Debug, Clone, Copy)]
pub struct FlyCamera {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        // Looking down -Z.
        Self {
            yaw: -90.0,
            pitch: 0.0,
        }
    }
}

impl FlyCamera {
    /// Unit vector the camera is facing.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        direction_from_angles(self.yaw, self.pitch)
    }
}

/// Forward vector for a yaw/pitch pair given in degrees.
pub fn direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    let (yaw, pitch) = (yaw.to_radians(), pitch.to_radians());
    Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
}

/// Grab the cursor on startup.
fn grab_cursor(
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
) {
    set_cursor_grab(&mut cursor, &mut window, true);
}

/// Set cursor grab state, centering the cursor when grabbing.
fn set_cursor_grab(cursor: &mut CursorOptions, window: &mut Window, grabbed: bool) {
    if grabbed {
        // Browsers cannot lock the pointer without a gesture, so confine it.
        #[cfg(not(target_family = "wasm"))]
        {
            cursor.grab_mode = CursorGrabMode::Locked;
        }
        #[cfg(target_family = "wasm")]
        {
            cursor.grab_mode = CursorGrabMode::Confined;
        }
        cursor.visible = false;
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    } else {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
    }
}

/// Locked on native, Confined on WASM.
fn is_captured(mode: CursorGrabMode) -> bool {
    matches!(mode, CursorGrabMode::Locked | CursorGrabMode::Confined)
}

#[allow(clippy::needless_pass_by_value)]
fn cursor_is_grabbed(cursor: Single<&CursorOptions>) -> bool {
    is_captured(cursor.grab_mode)
}

/// Release the cursor with Esc and capture it again with a left click.
#[allow(clippy::needless_pass_by_value)]
fn cursor_grab_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor: Single<&mut CursorOptions>,
    mut window: Single<&mut Window, With<PrimaryWindow>>,
) {
    let grabbed = is_captured(cursor.grab_mode);

    if keyboard.just_pressed(KeyCode::Escape) && grabbed {
        set_cursor_grab(&mut cursor, &mut window, false);
    } else if mouse.just_pressed(MouseButton::Left) && !grabbed {
        set_cursor_grab(&mut cursor, &mut window, true);
    }
}

/// Handle mouse look rotation.
#[allow(clippy::needless_pass_by_value)]
fn camera_look(
    mut mouse_motion: MessageReader<MouseMotion>,
    settings: Res<CameraSettings>,
    mut query: Query<(&mut Transform, &mut FlyCamera)>,
) {
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    if delta == Vec2::ZERO {
        return;
    }

    for (mut transform, mut camera) in &mut query {
        camera.yaw += delta.x * settings.mouse_sensitivity;
        // Screen y grows downwards.
        camera.pitch = (camera.pitch - delta.y * settings.mouse_sensitivity)
            .clamp(-settings.max_pitch, settings.max_pitch);

        transform.look_to(camera.direction(), Vec3::Y);
    }
}

/// Handle WASD movement with shift boost and vertical flight.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn camera_movement(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<CameraSettings>,
    mut query: Query<(&mut Transform, &FlyCamera)>,
) {
    let step = settings.base_speed * time.delta_secs();
    let boosted = if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        step * settings.boost_multiplier
    } else {
        step
    };

    for (mut transform, camera) in &mut query {
        let forward = camera.direction();
        let right = forward.cross(Vec3::Y).normalize();

        let mut movement = Vec3::ZERO;
        if keyboard.pressed(KeyCode::KeyW) {
            movement += forward * boosted;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            movement -= forward * boosted;
        }
        if keyboard.pressed(KeyCode::KeyA) {
            movement -= right * boosted;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            movement += right * boosted;
        }

        // Vertical flight is never boosted.
        if keyboard.pressed(KeyCode::Space) {
            movement += Vec3::Y * step;
        }
        // Descending is ignored while moving forward.
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight])
            && !keyboard.pressed(KeyCode::KeyW)
        {
            movement -= Vec3::Y * step;
        }

        transform.translation += movement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_locked_or_confined_counts_as_captured() {
        assert!(is_captured(CursorGrabMode::Locked));
        assert!(is_captured(CursorGrabMode::Confined));
        assert!(!is_captured(CursorGrabMode::None));
    }

    #[test]
    fn test_release_then_grab_cursor() {
        let mut cursor = CursorOptions::default();
        let mut window = Window::default();

        set_cursor_grab(&mut cursor, &mut window, true);
        assert!(is_captured(cursor.grab_mode));
        assert!(!cursor.visible);

        set_cursor_grab(&mut cursor, &mut window, false);
        assert_eq!(cursor.grab_mode, CursorGrabMode::None);
        assert!(cursor.visible);
    }

    #[test]
    fn test_default_direction_is_negative_z() {
        let direction = FlyCamera::default().direction();
        assert!(direction.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn test_direction_is_normalized() {
        for (yaw, pitch) in [(0.0, 0.0), (45.0, 30.0), (-120.0, -89.0), (370.0, 10.0)] {
            let direction = direction_from_angles(yaw, pitch);
            assert!((direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pitch_tilts_upwards() {
        let direction = direction_from_angles(-90.0, 45.0);
        assert!(direction.y > 0.7);
        assert!(direction.z < -0.7);
    }
}
