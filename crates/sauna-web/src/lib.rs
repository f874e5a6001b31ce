//! Sauna Web - Browser build of the sauna product viewer
//!
//! Renders into `#sauna-canvas`. A `?model=` query parameter overrides the
//! model path of the built-in catalog.

use sauna_core::ViewerConfig;
use sauna_scene::app::{self, AppOptions};
use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    let mut config = match ViewerConfig::builtin() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Built-in sauna catalog is invalid: {}", err);
            return;
        }
    };

    if let Some(model) = model_from_url() {
        tracing::info!("Loading model from URL parameter: {}", model);
        config.model.path = model;
    }

    app::run(
        config,
        AppOptions {
            canvas: Some("#sauna-canvas".to_string()),
            // Assets are served next to index.html
            asset_root: String::new(),
            ..AppOptions::default()
        },
    );
}

/// Value of the `?model=` query parameter, if present
fn model_from_url() -> Option<String> {
    let window = web_sys::window()?;
    let href = window.location().href().ok()?;
    let url = web_sys::Url::new(&href).ok()?;
    url.search_params().get("model").filter(|model| !model.is_empty())
}
