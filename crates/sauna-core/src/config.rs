//! Viewer configuration and the built-in sauna catalog
//!
//! Everything except the hotspot list has a default, so a config file only
//! needs to carry what differs from the stock sauna model.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::hotspot::HotspotDef;
use crate::orbit::OrbitLimits;
use crate::pose::CameraPose;
use crate::visibility::{MeshGroup, SideAllowList};

/// Catalog for the stock outdoor sauna model
pub const BUILTIN_CATALOG: &str = include_str!("../catalog/sauna.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read viewer config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse viewer config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to parse viewer config: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to serialize viewer config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid viewer config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    #[serde(default = "OrbitLimits::exterior")]
    pub exterior: OrbitLimits,
    #[serde(default = "OrbitLimits::interior")]
    pub interior: OrbitLimits,
    #[serde(default)]
    pub clips: ClipConfig,
    #[serde(default = "default_shell")]
    pub shell: MeshGroup,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default, rename = "hotspot")]
    pub hotspots: Vec<HotspotDef>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            timing: TimingConfig::default(),
            visibility: VisibilityConfig::default(),
            exterior: OrbitLimits::exterior(),
            interior: OrbitLimits::interior(),
            clips: ClipConfig::default(),
            shell: default_shell(),
            markers: MarkerConfig::default(),
            hotspots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// glTF asset path, relative to the asset root or an absolute URL
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Point the viewing side is measured from
    #[serde(default)]
    pub origin: Vec3,
    /// Rotation applied to the model about +Y, in degrees
    #[serde(default = "default_yaw")]
    pub yaw_degrees: f32,
    /// Translation applied to the model after loading
    #[serde(default)]
    pub offset: Vec3,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            origin: Vec3::ZERO,
            yaw_degrees: default_yaw(),
            offset: Vec3::ZERO,
        }
    }
}

fn default_model_path() -> String {
    "models/outdoor_sauna.glb".to_string()
}

fn default_yaw() -> f32 {
    180.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub initial: CameraPose,
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial: CameraPose::default(),
            fov_degrees: default_fov(),
        }
    }
}

fn default_fov() -> f32 {
    50.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Move from the current pose to a hotspot pose
    #[serde(default = "default_move_secs")]
    pub focus_secs: f32,
    /// Move back after the info panel closes
    #[serde(default = "default_move_secs")]
    pub return_secs: f32,
    /// Move through the door into the interior
    #[serde(default = "default_move_secs")]
    pub enter_secs: f32,
    /// Move from the interior back to the outside rest pose
    #[serde(default = "default_move_secs")]
    pub exit_secs: f32,
    /// Head start the door-open clip gets before the camera moves
    #[serde(default = "default_door_open_delay")]
    pub door_open_delay_ms: u64,
    /// Head start the door-close clip gets before the camera moves
    #[serde(default = "default_door_close_delay")]
    pub door_close_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            focus_secs: default_move_secs(),
            return_secs: default_move_secs(),
            enter_secs: default_move_secs(),
            exit_secs: default_move_secs(),
            door_open_delay_ms: default_door_open_delay(),
            door_close_delay_ms: default_door_close_delay(),
        }
    }
}

impl TimingConfig {
    pub fn focus(&self) -> Duration {
        Duration::from_secs_f32(self.focus_secs)
    }

    pub fn return_from_focus(&self) -> Duration {
        Duration::from_secs_f32(self.return_secs)
    }

    pub fn enter(&self) -> Duration {
        Duration::from_secs_f32(self.enter_secs)
    }

    pub fn exit(&self) -> Duration {
        Duration::from_secs_f32(self.exit_secs)
    }

    pub fn door_open_delay(&self) -> Duration {
        Duration::from_millis(self.door_open_delay_ms)
    }

    pub fn door_close_delay(&self) -> Duration {
        Duration::from_millis(self.door_close_delay_ms)
    }
}

fn default_move_secs() -> f32 {
    1.0
}

fn default_door_open_delay() -> u64 {
    400
}

fn default_door_close_delay() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Opacity of exterior hotspots facing away from the camera
    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f32,
    /// Camera travel (world units) that triggers a viewing-side recompute
    #[serde(default = "default_recompute_distance")]
    pub recompute_distance: f32,
    #[serde(default)]
    pub sides: SideAllowList,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            dim_opacity: default_dim_opacity(),
            recompute_distance: default_recompute_distance(),
            sides: SideAllowList::default(),
        }
    }
}

fn default_dim_opacity() -> f32 {
    0.3
}

fn default_recompute_distance() -> f32 {
    0.1
}

/// Named animation clips inside the glTF asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipConfig {
    #[serde(default = "default_door_clip")]
    pub door: String,
    #[serde(default = "default_door_open_speed")]
    pub door_open_speed: f32,
    #[serde(default = "default_clip_speed")]
    pub door_close_speed: f32,
    #[serde(default = "default_light_clip")]
    pub light: Option<String>,
    #[serde(default = "default_clip_speed")]
    pub light_speed: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            door: default_door_clip(),
            door_open_speed: default_door_open_speed(),
            door_close_speed: default_clip_speed(),
            light: default_light_clip(),
            light_speed: default_clip_speed(),
        }
    }
}

fn default_door_clip() -> String {
    "ACT Sauna Front Glass Door".to_string()
}

fn default_door_open_speed() -> f32 {
    6.5
}

fn default_clip_speed() -> f32 {
    1.0
}

fn default_light_clip() -> Option<String> {
    Some("Light BottomAction".to_string())
}

fn default_shell() -> MeshGroup {
    MeshGroup::new(
        "front_shell",
        [
            "Sauna_Front_Window_Frame_Outside",
            "Sauna_Front_Glass_Window",
            "Sauna_Front_Window_Frame_Inside",
            "Sauna_Front_Glass_Door",
            "Sauna_Front_Door_Handle_Inner",
            "Sauna_Front_Door_Handle_Outer",
            "Sauna_Front_Door_Frame_01",
            "Sauna_Front_Door_Frame_02",
            "Hinge_01-3",
            "Magnet_01",
            "Magnet_02",
            "Sphere",
            "Object_0",
        ]
        .iter()
        .map(|name| name.to_string())
        .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Outline radius of a marker at scale 1
    #[serde(default = "default_marker_radius")]
    pub radius: f32,
    /// Base scale of exterior markers
    #[serde(default = "default_exterior_scale")]
    pub exterior_scale: f32,
    /// Base scale of interior markers
    #[serde(default = "default_interior_scale")]
    pub interior_scale: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            radius: default_marker_radius(),
            exterior_scale: default_exterior_scale(),
            interior_scale: default_interior_scale(),
        }
    }
}

impl MarkerConfig {
    /// Pick radius of a marker, already scaled for its hotspot set
    pub fn pick_radius(&self, interior: bool) -> f32 {
        let scale = if interior {
            self.interior_scale
        } else {
            self.exterior_scale
        };
        self.radius * scale
    }
}

fn default_marker_radius() -> f32 {
    0.065
}

fn default_exterior_scale() -> f32 {
    1.1
}

fn default_interior_scale() -> f32 {
    0.6
}

impl ViewerConfig {
    /// Parse a TOML config and validate it
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config and validate it
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_toml(&content)?,
        };
        tracing::info!(
            path = %path.display(),
            hotspots = config.hotspots.len(),
            "Loaded viewer config"
        );
        Ok(config)
    }

    /// The stock sauna catalog shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for hotspot in &self.hotspots {
            if !names.insert(hotspot.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate hotspot name '{}'",
                    hotspot.name
                )));
            }
            if hotspot.action && hotspot.interior {
                return Err(ConfigError::Invalid(format!(
                    "hotspot '{}' cannot be both an action and an interior hotspot",
                    hotspot.name
                )));
            }
        }

        let timings = [
            ("focus_secs", self.timing.focus_secs),
            ("return_secs", self.timing.return_secs),
            ("enter_secs", self.timing.enter_secs),
            ("exit_secs", self.timing.exit_secs),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "timing.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.visibility.dim_opacity) {
            return Err(ConfigError::Invalid(format!(
                "visibility.dim_opacity must be within [0, 1], got {}",
                self.visibility.dim_opacity
            )));
        }
        if !self.visibility.recompute_distance.is_finite() || self.visibility.recompute_distance < 0.0 {
            return Err(ConfigError::Invalid(
                "visibility.recompute_distance must be a non-negative number".to_string(),
            ));
        }

        self.exterior
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("exterior: {}", e)))?;
        self.interior
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("interior: {}", e)))?;
        Ok(())
    }
}
