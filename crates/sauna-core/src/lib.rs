//! Sauna Core - Hotspot interaction and camera choreography for the sauna viewer
//!
//! This crate holds everything that does not need a render engine:
//! - Hotspot registry and the built-in sauna catalog
//! - Eased, time-based camera moves between poses
//! - Viewing-side classification and hotspot dimming
//! - The view-mode state machine and its outbound ports
//! - Ray picking against hotspot markers and the orbit rig math

pub mod choreographer;
pub mod config;
pub mod easing;
pub mod hotspot;
pub mod machine;
pub mod orbit;
pub mod ports;
pub mod pose;
pub mod router;
pub mod visibility;

pub use choreographer::{AnimationRequest, Choreographer, ChoreographyError, Tick};
pub use config::{ConfigError, MarkerConfig, ViewerConfig};
pub use easing::ease_in_out_cubic;
pub use hotspot::{Category, Hotspot, HotspotDef, HotspotFilter, HotspotId, HotspotRegistry, MarkerPart};
pub use machine::{InteractionError, ViewMode, ViewerMachine};
pub use orbit::{OrbitLimits, OrbitRig};
pub use ports::{ClipError, ControlScheme, Cursor, Effect, EffectQueue, PlaybackDirection, ViewerPorts};
pub use pose::{CameraPose, OrbitCoords};
pub use router::{ClickOutcome, InteractionRouter, Ray};
pub use visibility::{determine_viewing_side, MeshGroup, ViewingSide, VisibilityPolicy};
