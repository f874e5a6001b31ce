//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use sauna_core::ViewerConfig;

use crate::SaunaViewerPlugin;

/// Window and asset options that differ between the web and native builds
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub title: String,
    /// CSS selector of the canvas to render into (web only)
    pub canvas: Option<String>,
    /// Root the model path is resolved against
    pub asset_root: String,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            title: "Sauna Viewer".to_string(),
            canvas: None,
            asset_root: "assets".to_string(),
        }
    }
}

/// Run the Bevy application
pub fn run(config: ViewerConfig, options: AppOptions) {
    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: options.title,
                    canvas: options.canvas,
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: options.asset_root,
                // Static hosting serves no .meta files
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // bevy_egui needs PickingPlugin registered before it
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(SaunaViewerPlugin { config })
        .run();
}
