//! Outbound ports of the view-mode state machine
//!
//! The machine never touches the engine or the UI directly. It calls these
//! traits, and the engine binding decides how each call is rendered.
//! [`EffectQueue`] implements every port by recording calls as [`Effect`]s,
//! which engine systems drain once per frame.

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::hotspot::HotspotId;
use crate::orbit::OrbitLimits;
use crate::pose::CameraPose;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipError {
    #[error("animation clip '{0}' not found in the model")]
    NotFound(String),
    #[error("animation clips are not loaded yet")]
    NotLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackDirection {
    Forward,
    Reverse,
}

impl fmt::Display for PlaybackDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackDirection::Forward => f.write_str("forward"),
            PlaybackDirection::Reverse => f.write_str("reverse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Which input scheme owns the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlScheme {
    /// Camera is driven by a choreographed move; user input is ignored
    Locked,
    /// Free orbit around the product
    ExteriorOrbit {
        limits: OrbitLimits,
        resume: CameraPose,
    },
    /// Restricted look-around from inside the cabin
    InteriorOrbit {
        limits: OrbitLimits,
        resume: CameraPose,
    },
}

impl ControlScheme {
    pub fn is_locked(&self) -> bool {
        matches!(self, ControlScheme::Locked)
    }

    /// Limits and resume pose of an orbit scheme
    pub fn orbit(&self) -> Option<(OrbitLimits, CameraPose)> {
        match self {
            ControlScheme::Locked => None,
            ControlScheme::ExteriorOrbit { limits, resume }
            | ControlScheme::InteriorOrbit { limits, resume } => Some((*limits, *resume)),
        }
    }
}

pub trait InfoPanel {
    fn show(&mut self, title: &str, description: &str);
    fn hide(&mut self);
}

pub trait ClipPlayer {
    /// Start a named clip; playback is fire-and-forget
    fn play(&mut self, clip: &str, direction: PlaybackDirection, speed: f32) -> Result<(), ClipError>;
}

pub trait SceneControl {
    fn set_mesh_group_visible(&mut self, group: &str, visible: bool);
    fn set_control_scheme(&mut self, scheme: ControlScheme);
}

pub trait ViewerUi {
    fn set_cursor(&mut self, cursor: Cursor);
    fn show_label(&mut self, id: HotspotId);
    fn hide_label(&mut self, id: HotspotId);
    fn set_back_button_visible(&mut self, visible: bool);
    fn set_interior_indicator_visible(&mut self, visible: bool);
}

/// Everything the state machine needs from its host
pub trait ViewerPorts: InfoPanel + ClipPlayer + SceneControl + ViewerUi {}

impl<T: InfoPanel + ClipPlayer + SceneControl + ViewerUi> ViewerPorts for T {}

/// One recorded port call
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowInfo { title: String, description: String },
    HideInfo,
    PlayClip {
        clip: String,
        direction: PlaybackDirection,
        speed: f32,
    },
    SetMeshGroupVisible { group: String, visible: bool },
    SetControlScheme(ControlScheme),
    SetCursor(Cursor),
    ShowLabel(HotspotId),
    HideLabel(HotspotId),
    SetBackButtonVisible(bool),
    SetInteriorIndicatorVisible(bool),
}

/// Port implementation that queues effects for the engine to apply
#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
    clips: Option<HashSet<String>>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that knows which clips the loaded model provides
    pub fn with_clips<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut queue = Self::new();
        queue.set_available_clips(clips);
        queue
    }

    pub fn set_available_clips<I, S>(&mut self, clips: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clips = Some(clips.into_iter().map(Into::into).collect());
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl InfoPanel for EffectQueue {
    fn show(&mut self, title: &str, description: &str) {
        self.effects.push(Effect::ShowInfo {
            title: title.to_string(),
            description: description.to_string(),
        });
    }

    fn hide(&mut self) {
        self.effects.push(Effect::HideInfo);
    }
}

impl ClipPlayer for EffectQueue {
    fn play(&mut self, clip: &str, direction: PlaybackDirection, speed: f32) -> Result<(), ClipError> {
        let clips = self.clips.as_ref().ok_or(ClipError::NotLoaded)?;
        if !clips.contains(clip) {
            return Err(ClipError::NotFound(clip.to_string()));
        }
        self.effects.push(Effect::PlayClip {
            clip: clip.to_string(),
            direction,
            speed,
        });
        Ok(())
    }
}

impl SceneControl for EffectQueue {
    fn set_mesh_group_visible(&mut self, group: &str, visible: bool) {
        self.effects.push(Effect::SetMeshGroupVisible {
            group: group.to_string(),
            visible,
        });
    }

    fn set_control_scheme(&mut self, scheme: ControlScheme) {
        self.effects.push(Effect::SetControlScheme(scheme));
    }
}

impl ViewerUi for EffectQueue {
    fn set_cursor(&mut self, cursor: Cursor) {
        self.effects.push(Effect::SetCursor(cursor));
    }

    fn show_label(&mut self, id: HotspotId) {
        self.effects.push(Effect::ShowLabel(id));
    }

    fn hide_label(&mut self, id: HotspotId) {
        self.effects.push(Effect::HideLabel(id));
    }

    fn set_back_button_visible(&mut self, visible: bool) {
        self.effects.push(Effect::SetBackButtonVisible(visible));
    }

    fn set_interior_indicator_visible(&mut self, visible: bool) {
        self.effects.push(Effect::SetInteriorIndicatorVisible(visible));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_lookup() {
        let mut queue = EffectQueue::new();
        assert_eq!(
            queue.play("Door", PlaybackDirection::Forward, 1.0),
            Err(ClipError::NotLoaded)
        );

        queue.set_available_clips(["Door"]);
        assert!(queue.play("Door", PlaybackDirection::Forward, 6.5).is_ok());
        assert_eq!(
            queue.play("Light", PlaybackDirection::Reverse, 1.0),
            Err(ClipError::NotFound("Light".to_string()))
        );
        assert_eq!(queue.effects().len(), 1);
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EffectQueue::new();
        queue.show("Glass Door", "8mm tempered");
        queue.set_cursor(Cursor::Pointer);
        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1], Effect::SetCursor(Cursor::Pointer));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_control_scheme_orbit() {
        let pose = CameraPose::default();
        let scheme = ControlScheme::InteriorOrbit {
            limits: OrbitLimits::interior(),
            resume: pose,
        };
        assert_eq!(scheme.orbit(), Some((OrbitLimits::interior(), pose)));
        assert!(ControlScheme::Locked.is_locked());
        assert_eq!(ControlScheme::Locked.orbit(), None);
    }
}
