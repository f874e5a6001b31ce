//! Sauna Scene - Bevy binding for the sauna viewer core
//!
//! This crate wires `sauna-core` into a Bevy app: the orbit camera, the glTF
//! model with its shell meshes and clips, hotspot markers, pointer routing and
//! the egui overlays. Both the browser build (sauna-web) and the native build
//! (sauna-desktop) start the viewer through [`app::run`].

pub mod app;
pub mod camera;
pub mod effects;
pub mod input;
pub mod markers;
pub mod models;
pub mod scene;
pub mod ui;

use bevy::prelude::*;
use sauna_core::{EffectQueue, InteractionRouter, ViewerConfig, ViewerMachine};

/// Frame order of the viewer systems in `Update`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    /// User orbit input moves the camera rig
    Orbit,
    /// Pointer hover and clicks go through the router
    Pointer,
    /// Door gates and camera moves advance
    Tick,
    /// Port effects queued by the machine are applied
    Effects,
    /// Markers follow registry state and face the camera
    Visuals,
}

/// Configuration the app was started with
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings(pub ViewerConfig);

/// The state machine and its router; inserted once the model has loaded
#[derive(Resource)]
pub struct Viewer {
    pub machine: ViewerMachine<EffectQueue>,
    pub router: InteractionRouter,
}

impl Viewer {
    pub fn new(config: &ViewerConfig, ports: EffectQueue) -> Self {
        Self {
            machine: ViewerMachine::new(config, ports),
            router: InteractionRouter::new(config.markers.clone()),
        }
    }
}

/// Plugin that sets up the whole sauna viewer
pub struct SaunaViewerPlugin {
    pub config: ViewerConfig,
}

impl Plugin for SaunaViewerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ViewerSettings(self.config.clone()))
            .configure_sets(
                Update,
                (
                    ViewerSet::Orbit,
                    ViewerSet::Pointer,
                    ViewerSet::Tick,
                    ViewerSet::Effects,
                    ViewerSet::Visuals,
                )
                    .chain(),
            )
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(markers::MarkersPlugin)
            .add_plugins(input::PointerPlugin)
            .add_plugins(effects::EffectsPlugin)
            .add_plugins(ui::UiPlugin);
    }
}

pub use camera::{MainCamera, OrbitState};
pub use models::{ModelState, ModelStatus};
pub use ui::UiState;
