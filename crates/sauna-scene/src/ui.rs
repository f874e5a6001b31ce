//! UI overlays using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use sauna_core::{Cursor, HotspotId};

use crate::camera::MainCamera;
use crate::models::{ModelState, ModelStatus};
use crate::Viewer;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiState>()
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// What the overlays currently show, written by the effect system
#[derive(Resource, Debug, Default)]
pub struct UiState {
    /// Title and description of the open info panel
    pub info: Option<(String, String)>,
    /// Hotspot whose hover label is shown
    pub label: Option<HotspotId>,
    pub cursor: Cursor,
    pub show_back_button: bool,
    pub show_interior_indicator: bool,
}

const INTERIOR_HINT: &str = "360° View Mode - Drag to Look Around";

fn ui_system(
    mut contexts: EguiContexts,
    ui_state: Res<UiState>,
    viewer: Option<ResMut<Viewer>>,
    model: Option<Res<ModelState>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    time: Res<Time>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Loading and failure overlays block everything else
    if let Some(model) = model.as_ref() {
        match &model.status {
            ModelStatus::Loading => {
                egui::Area::new(egui::Id::new("loading"))
                    .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(egui::RichText::new("Loading sauna…").size(18.0));
                        });
                    });
                return;
            }
            ModelStatus::Failed(err) => {
                egui::Window::new("Model failed to load")
                    .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                    .collapsible(false)
                    .resizable(false)
                    .show(ctx, |ui| {
                        ui.label(format!("Could not load {}.", model.path));
                        ui.label(egui::RichText::new(err.as_str()).weak());
                        ui.add_space(8.0);
                        ui.label("Reload the page to try again.");
                    });
                return;
            }
            ModelStatus::Ready => {}
        }
    }

    let Some(mut viewer) = viewer else { return };
    let now = time.elapsed();

    if ui_state.cursor == Cursor::Pointer {
        ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    // Hover label next to its marker
    if let Some(id) = ui_state.label {
        if let (Some(hotspot), Ok((camera, camera_transform))) =
            (viewer.machine.registry().get(id), camera_query.single())
        {
            if let Ok(screen) = camera.world_to_viewport(camera_transform, hotspot.def.anchor) {
                egui::Area::new(egui::Id::new("hotspot_label"))
                    .fixed_pos(egui::pos2(screen.x + 14.0, screen.y - 10.0))
                    .interactable(false)
                    .show(ctx, |ui| {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            ui.label(egui::RichText::new(&hotspot.def.title).strong());
                        });
                    });
            }
        }
    }

    // Info panel for the focused hotspot
    if let Some((title, description)) = &ui_state.info {
        let mut close_clicked = false;
        egui::Window::new(title.as_str())
            .id(egui::Id::new("info_panel"))
            .anchor(egui::Align2::RIGHT_CENTER, egui::vec2(-24.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.label(description.as_str());
                ui.add_space(8.0);
                if ui.button("Close").clicked() {
                    close_clicked = true;
                }
            });
        if close_clicked {
            if let Err(err) = viewer.machine.close_info_panel(now) {
                tracing::debug!(error = %err, "Close ignored");
            }
        }
    }

    if ui_state.show_back_button {
        egui::Area::new(egui::Id::new("go_back"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(16.0, 16.0))
            .show(ctx, |ui| {
                if ui
                    .button(egui::RichText::new("← Go Back").size(16.0))
                    .clicked()
                {
                    if let Err(err) = viewer.machine.go_back(now) {
                        tracing::debug!(error = %err, "Go back ignored");
                    }
                }
            });
    }

    if ui_state.show_interior_indicator {
        egui::Area::new(egui::Id::new("interior_indicator"))
            .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(INTERIOR_HINT);
                });
            });
    }
}
