//! Applies port effects queued by the state machine

use bevy::prelude::*;
use sauna_core::Effect;

use crate::camera::OrbitState;
use crate::models::{ClipLibrary, ShellMesh};
use crate::ui::UiState;
use crate::{Viewer, ViewerSet};

pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_effects.in_set(ViewerSet::Effects));
    }
}

fn apply_effects(
    viewer: Option<ResMut<Viewer>>,
    mut orbit: ResMut<OrbitState>,
    mut ui_state: ResMut<UiState>,
    library: Res<ClipLibrary>,
    clips: Res<Assets<AnimationClip>>,
    mut players: Query<&mut AnimationPlayer>,
    mut shell_meshes: Query<(&ShellMesh, &mut Visibility)>,
) {
    let Some(mut viewer) = viewer else { return };

    for effect in viewer.machine.ports_mut().drain() {
        match effect {
            Effect::ShowInfo { title, description } => {
                ui_state.info = Some((title, description));
            }
            Effect::HideInfo => {
                ui_state.info = None;
            }
            Effect::PlayClip {
                clip,
                direction,
                speed,
            } => {
                library.play(&clip, direction, speed, &mut players, &clips);
            }
            Effect::SetMeshGroupVisible { group, visible } => {
                let wanted = if visible {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
                let mut count = 0;
                for (shell, mut visibility) in shell_meshes.iter_mut() {
                    if shell.group == group {
                        *visibility = wanted;
                        count += 1;
                    }
                }
                tracing::debug!(%group, visible, count, "Shell group visibility");
            }
            Effect::SetControlScheme(scheme) => {
                orbit.apply_scheme(&scheme);
            }
            Effect::SetCursor(cursor) => {
                ui_state.cursor = cursor;
            }
            Effect::ShowLabel(id) => {
                ui_state.label = Some(id);
            }
            Effect::HideLabel(id) => {
                if ui_state.label == Some(id) {
                    ui_state.label = None;
                }
            }
            Effect::SetBackButtonVisible(visible) => {
                ui_state.show_back_button = visible;
            }
            Effect::SetInteriorIndicatorVisible(visible) => {
                ui_state.show_interior_indicator = visible;
            }
        }
    }
}
