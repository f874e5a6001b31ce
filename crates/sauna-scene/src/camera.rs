//! Camera spawn and orbit navigation

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use sauna_core::{CameraPose, ControlScheme, OrbitRig};

use crate::{Viewer, ViewerSet, ViewerSettings};

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Orbit rig of the active control scheme; `None` while the camera is locked
#[derive(Resource, Default)]
pub struct OrbitState {
    pub rig: Option<OrbitRig>,
}

impl OrbitState {
    /// Re-seed from a control scheme change
    pub fn apply_scheme(&mut self, scheme: &ControlScheme) {
        self.rig = scheme
            .orbit()
            .map(|(limits, resume)| OrbitRig::from_pose(&resume, limits));
    }
}

/// Pixels per scroll line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 100.0;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitState>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, update_orbit.in_set(ViewerSet::Orbit))
            .add_systems(Update, drive_camera.in_set(ViewerSet::Tick));
    }
}

pub fn pose_transform(pose: &CameraPose) -> Transform {
    Transform::from_translation(pose.position).with_rotation(pose.orientation(Vec3::Y))
}

fn spawn_camera(mut commands: Commands, settings: Res<ViewerSettings>) {
    let camera = &settings.0.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: 0.01,
            far: 1000.0,
            ..default()
        }),
        pose_transform(&camera.initial),
        MainCamera,
    ));
}

/// Drag to orbit, right-drag to pan, scroll or pinch to zoom
fn update_orbit(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut orbit: ResMut<OrbitState>,
    viewer: Option<ResMut<Viewer>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }
    let mut scroll_lines = 0.0;
    for scroll in mouse_wheel.read() {
        scroll_lines += match scroll.unit {
            MouseScrollUnit::Line => scroll.y,
            MouseScrollUnit::Pixel => scroll.y / PIXELS_PER_LINE,
        };
    }

    let Some(mut viewer) = viewer else { return };
    let Some(rig) = orbit.rig.as_mut() else { return };
    if egui_wants_pointer {
        return;
    }

    let before = rig.pose();

    if mouse_button.pressed(MouseButton::Left) {
        rig.rotate(total_motion.x, total_motion.y);
    }
    if mouse_button.pressed(MouseButton::Right) {
        rig.pan(-total_motion.x, total_motion.y);
    }
    if scroll_lines != 0.0 {
        let factor = rig.limits().scroll_factor(scroll_lines);
        rig.zoom(factor);
    }

    // Touch: one finger orbits, two fingers pinch
    let touches: Vec<_> = touch_input.iter().collect();
    match touches.as_slice() {
        [touch] => {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                rig.rotate(delta.x, delta.y);
            }
        }
        [t1, t2] => {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            rig.zoom(prev_dist / curr_dist.max(1.0));
        }
        _ => {}
    }

    let pose = rig.pose();
    if pose == before {
        return;
    }
    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = pose_transform(&pose);
    }
    viewer.machine.observe_camera(pose);
}

/// Advance the machine and let choreographed moves own the camera
fn drive_camera(
    viewer: Option<ResMut<Viewer>>,
    time: Res<Time>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let Some(mut viewer) = viewer else { return };
    let Some(pose) = viewer.machine.tick(time.elapsed()) else {
        return;
    };
    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = pose_transform(&pose);
    }
}
