//! Pointer hover and click routing

use bevy::prelude::*;
use sauna_core::{ClickOutcome, Ray};

use crate::camera::MainCamera;
use crate::{Viewer, ViewerSet};

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TapState>()
            .add_systems(Update, route_pointer.in_set(ViewerSet::Pointer));
    }
}

/// Movement in pixels after which a press counts as a drag, not a tap
const TAP_SLOP: f32 = 10.0;

/// Tap-vs-drag tracking for one press (a touch or the left mouse button)
#[derive(Debug, Default)]
pub struct TapTracker {
    /// Position where the press started
    start_position: Option<Vec2>,
    /// Whether this press has moved significantly (is a drag, not a tap)
    is_dragging: bool,
}

impl TapTracker {
    fn begin(&mut self, position: Vec2) {
        self.start_position = Some(position);
        self.is_dragging = false;
    }

    fn moved_to(&mut self, position: Vec2) {
        if let Some(start) = self.start_position {
            if position.distance(start) > TAP_SLOP {
                self.is_dragging = true;
            }
        }
    }

    /// Ends the press; returns the tap position if it never turned into a drag
    fn end(&mut self) -> Option<Vec2> {
        let tap = if self.is_dragging {
            None
        } else {
            self.start_position
        };
        self.start_position = None;
        self.is_dragging = false;
        tap
    }
}

/// Track press state for tap detection
#[derive(Resource, Debug, Default)]
pub struct TapState {
    touch: TapTracker,
    mouse: TapTracker,
}

fn route_pointer(
    viewer: Option<ResMut<Viewer>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    time: Res<Time>,
    mut taps: ResMut<TapState>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let Some(mut viewer) = viewer else { return };
    let Ok(window) = windows.single() else { return };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let to_ray = |position: Vec2| {
        camera
            .viewport_to_world(camera_transform, position)
            .ok()
            .and_then(|ray| Ray::new(ray.origin, *ray.direction))
    };

    // Hover follows the mouse; no hover while a UI panel owns the pointer
    let hover_ray = if egui_wants_pointer {
        None
    } else {
        window.cursor_position().and_then(to_ray)
    };
    let Viewer { machine, router } = &mut *viewer;
    router.hover(machine, hover_ray.as_ref());

    if egui_wants_pointer {
        // A press that ends over a panel never becomes a scene click
        taps.mouse.end();
        return;
    }

    let mut click_position: Option<Vec2> = None;

    if let Some(touch) = touch_input.iter().next() {
        if touch_input.just_pressed(touch.id()) {
            taps.touch.begin(touch.position());
        } else {
            taps.touch.moved_to(touch.position());
        }
    }
    for touch in touch_input.iter_just_released() {
        if let Some(tap) = taps.touch.end() {
            click_position = Some(tap);
        }
        tracing::trace!(id = touch.id(), "Touch released");
    }

    // Mouse clicks land on release, and only when the press did not orbit
    if let Some(cursor) = window.cursor_position() {
        if mouse_button.just_pressed(MouseButton::Left) {
            taps.mouse.begin(cursor);
        } else if mouse_button.pressed(MouseButton::Left) {
            taps.mouse.moved_to(cursor);
        }
    }
    if mouse_button.just_released(MouseButton::Left) {
        if let Some(cursor) = window.cursor_position() {
            taps.mouse.moved_to(cursor);
        }
        if let Some(tap) = taps.mouse.end() {
            click_position = Some(tap);
        }
    }

    let Some(ray) = click_position.and_then(to_ray) else {
        return;
    };
    match router.click(machine, &ray, time.elapsed()) {
        ClickOutcome::Dispatched(id) => tracing::debug!(%id, "Hotspot clicked"),
        ClickOutcome::Ignored(id) => tracing::debug!(%id, "Hotspot click ignored"),
        ClickOutcome::Missed => {}
    }
}
