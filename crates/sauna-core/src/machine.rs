//! View-mode state machine
//!
//! [`ViewerMachine`] owns the hotspot registry, the camera choreographer and
//! the visibility policy, and coordinates them across the outside orbit,
//! hotspot focus and interior modes. It talks to the engine and UI only
//! through [`ViewerPorts`].
//!
//! The host drives it once per frame:
//! 1. [`ViewerMachine::observe_camera`] with the pose produced by user orbit
//! 2. pointer input through the [`InteractionRouter`](crate::router::InteractionRouter)
//! 3. [`ViewerMachine::tick`], applying any returned pose to the camera

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::choreographer::{AnimationRequest, Choreographer, ChoreographyError, Tick};
use crate::config::{ClipConfig, TimingConfig, ViewerConfig};
use crate::hotspot::{HotspotFilter, HotspotId, HotspotRegistry};
use crate::orbit::OrbitLimits;
use crate::ports::{ControlScheme, Cursor, PlaybackDirection, ViewerPorts};
use crate::pose::CameraPose;
use crate::visibility::{MeshGroup, ViewingSide, VisibilityPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Free orbit around the product (initial mode)
    OutsideOrbit,
    /// Moving to or from an exterior close-up, or into an interior close-up
    CameraInFlight,
    /// Close-up with the info panel open
    HotspotFocus,
    /// Door opening, then moving through it
    EnteringInterior,
    /// Look-around from inside
    InteriorOrbit,
    /// Moving from an interior close-up back to the interior pose
    ReturningFromFocusInterior,
    /// Door closing, then moving back outside
    ExitingInterior,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViewMode::OutsideOrbit => "outside_orbit",
            ViewMode::CameraInFlight => "camera_in_flight",
            ViewMode::HotspotFocus => "hotspot_focus",
            ViewMode::EnteringInterior => "entering_interior",
            ViewMode::InteriorOrbit => "interior_orbit",
            ViewMode::ReturningFromFocusInterior => "returning_from_focus_interior",
            ViewMode::ExitingInterior => "exiting_interior",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    #[error("viewer is busy with a camera transition")]
    Busy,
    #[error("unknown hotspot {0}")]
    UnknownHotspot(HotspotId),
    #[error("{id} cannot be activated in {mode}")]
    NotEligible { id: HotspotId, mode: ViewMode },
    #[error("no info panel is open")]
    NoFocus,
    #[error("go back is only available inside the sauna")]
    NotInterior,
}

impl From<ChoreographyError> for InteractionError {
    fn from(err: ChoreographyError) -> Self {
        match err {
            ChoreographyError::Busy => InteractionError::Busy,
        }
    }
}

/// What to do when a camera move lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrival {
    Focus { id: HotspotId, interior: bool },
    ReturnFromFocus { interior: bool },
    Interior,
    Exterior,
}

/// A door clip is playing; the camera move starts once the gate opens
#[derive(Debug, Clone, PartialEq)]
struct PendingMove {
    release_at: Duration,
    to: CameraPose,
    duration: Duration,
    arrival: Arrival,
}

pub struct ViewerMachine<P: ViewerPorts> {
    ports: P,
    registry: HotspotRegistry,
    visibility: VisibilityPolicy,
    choreographer: Choreographer<Arrival>,
    pending: Option<PendingMove>,
    mode: ViewMode,
    scheme: ControlScheme,
    camera: CameraPose,
    hovered: Option<HotspotId>,
    interior_focus: bool,
    shell: MeshGroup,
    timing: TimingConfig,
    clips: ClipConfig,
    exterior: OrbitLimits,
    interior: OrbitLimits,
    initial: CameraPose,
    outside_rest: Option<CameraPose>,
    interior_entry: Option<CameraPose>,
    before_focus: Option<CameraPose>,
}

impl<P: ViewerPorts> ViewerMachine<P> {
    /// Register the catalog and enter `OutsideOrbit` at the configured initial pose
    pub fn new(config: &ViewerConfig, ports: P) -> Self {
        let mut registry = HotspotRegistry::new();
        for def in &config.hotspots {
            registry.register(def.clone());
        }

        let mut machine = Self {
            ports,
            registry,
            visibility: VisibilityPolicy::new(&config.visibility, config.model.origin),
            choreographer: Choreographer::new(),
            pending: None,
            mode: ViewMode::OutsideOrbit,
            scheme: ControlScheme::Locked,
            camera: config.camera.initial,
            hovered: None,
            interior_focus: false,
            shell: config.shell.clone(),
            timing: config.timing.clone(),
            clips: config.clips.clone(),
            exterior: config.exterior,
            interior: config.interior,
            initial: config.camera.initial,
            outside_rest: None,
            interior_entry: None,
            before_focus: None,
        };

        machine.show_exterior_set();
        machine.ports.set_back_button_visible(false);
        machine.ports.set_interior_indicator_visible(false);
        machine.set_scheme(ControlScheme::ExteriorOrbit {
            limits: machine.exterior,
            resume: machine.camera,
        });
        tracing::info!(hotspots = machine.registry.len(), "Viewer ready");
        machine
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn registry(&self) -> &HotspotRegistry {
        &self.registry
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    pub fn control_scheme(&self) -> ControlScheme {
        self.scheme
    }

    /// Live camera pose as last driven or observed
    pub fn camera(&self) -> CameraPose {
        self.camera
    }

    pub fn hovered(&self) -> Option<HotspotId> {
        self.hovered
    }

    pub fn viewing_side(&self) -> Option<ViewingSide> {
        self.visibility.side()
    }

    pub fn shell(&self) -> &MeshGroup {
        &self.shell
    }

    pub fn outside_rest(&self) -> Option<CameraPose> {
        self.outside_rest
    }

    pub fn interior_entry(&self) -> Option<CameraPose> {
        self.interior_entry
    }

    pub fn before_focus(&self) -> Option<CameraPose> {
        self.before_focus
    }

    pub fn is_animating(&self) -> bool {
        self.choreographer.is_animating()
    }

    /// A move is in flight or waiting on a door gate
    pub fn is_busy(&self) -> bool {
        self.choreographer.is_animating() || self.pending.is_some()
    }

    pub fn is_interior(&self) -> bool {
        matches!(
            self.mode,
            ViewMode::InteriorOrbit | ViewMode::ReturningFromFocusInterior
        ) || self.interior_focus
    }

    /// Hover runs while nothing is focused, and always inside the sauna
    pub fn hover_active(&self) -> bool {
        if self.is_interior() {
            return true;
        }
        !self.is_busy() && self.registry.focused().is_none()
    }

    /// Whether a click on `id` would be dispatched right now
    pub fn is_eligible(&self, id: HotspotId) -> bool {
        let Some(hotspot) = self.registry.get(id) else {
            return false;
        };
        if !hotspot.state.visible {
            return false;
        }
        match self.mode {
            ViewMode::OutsideOrbit => !hotspot.is_interior(),
            ViewMode::InteriorOrbit => hotspot.is_interior(),
            _ => false,
        }
    }

    /// Feed a camera pose produced by user input.
    ///
    /// Ignored while the camera is locked. Returns the new viewing side when
    /// the outside opacity pass ran.
    pub fn observe_camera(&mut self, pose: CameraPose) -> Option<ViewingSide> {
        if self.scheme.is_locked() || self.is_busy() {
            return None;
        }
        self.camera = pose;
        if self.mode == ViewMode::OutsideOrbit {
            self.visibility.update(pose.position, &mut self.registry)
        } else {
            None
        }
    }

    /// Apply the hover result for this frame. At most one label is shown.
    pub fn update_hover(&mut self, hit: Option<HotspotId>) {
        if !self.hover_active() {
            self.clear_hover();
            return;
        }
        let hit = hit.filter(|id| {
            self.registry
                .get(*id)
                .map(|hotspot| hotspot.state.visible)
                .unwrap_or(false)
        });
        if hit == self.hovered {
            return;
        }
        self.clear_hover();
        if let Some(id) = hit {
            self.registry.set_hovered(id, true);
            self.ports.show_label(id);
            self.ports.set_cursor(Cursor::Pointer);
            self.hovered = Some(id);
        }
    }

    /// Dispatch a hotspot click
    pub fn activate(&mut self, id: HotspotId, now: Duration) -> Result<(), InteractionError> {
        if self.is_busy() {
            tracing::debug!(%id, mode = %self.mode, "Ignoring hotspot while busy");
            return Err(InteractionError::Busy);
        }
        let hotspot = self
            .registry
            .get(id)
            .ok_or(InteractionError::UnknownHotspot(id))?;
        if !self.is_eligible(id) {
            return Err(InteractionError::NotEligible {
                id,
                mode: self.mode,
            });
        }

        let target = hotspot.def.camera;
        let action = hotspot.is_action();
        tracing::info!(%id, name = %hotspot.name(), mode = %self.mode, "Hotspot activated");
        self.clear_hover();

        if action {
            self.enter_interior(target, now)
        } else {
            let interior = self.mode == ViewMode::InteriorOrbit;
            self.focus(id, target, interior, now)
        }
    }

    /// The info panel was closed; return to the pose captured before the focus
    pub fn close_info_panel(&mut self, now: Duration) -> Result<(), InteractionError> {
        if self.is_busy() {
            return Err(InteractionError::Busy);
        }
        if self.mode != ViewMode::HotspotFocus {
            return Err(InteractionError::NoFocus);
        }
        let interior = self.interior_focus;
        let back_to = self.before_focus.unwrap_or(self.camera);

        self.ports.hide();
        if let Some(id) = self.registry.focused() {
            self.registry.set_focused(id, false);
        }
        self.choreographer.animate(
            AnimationRequest::new(
                self.camera,
                back_to,
                self.timing.return_from_focus(),
                Arrival::ReturnFromFocus { interior },
            ),
            now,
        )?;
        self.mode = if interior {
            ViewMode::ReturningFromFocusInterior
        } else {
            ViewMode::CameraInFlight
        };
        tracing::debug!(mode = %self.mode, "Info panel closed");
        Ok(())
    }

    /// Leave the interior through the door
    pub fn go_back(&mut self, now: Duration) -> Result<(), InteractionError> {
        if self.is_busy() {
            return Err(InteractionError::Busy);
        }
        if self.mode != ViewMode::InteriorOrbit {
            return Err(InteractionError::NotInterior);
        }

        self.clear_hover();
        self.registry.set_visible_where(HotspotFilter::All, false);
        self.ports.set_back_button_visible(false);
        self.ports.set_interior_indicator_visible(false);
        self.set_scheme(ControlScheme::Locked);

        let door = self.clips.door.clone();
        self.play_clip(&door, PlaybackDirection::Reverse, self.clips.door_close_speed);
        if let Some(light) = self.clips.light.clone() {
            self.play_clip(&light, PlaybackDirection::Reverse, self.clips.light_speed);
        }

        self.pending = Some(PendingMove {
            release_at: now + self.timing.door_close_delay(),
            to: self.outside_rest.unwrap_or(self.initial),
            duration: self.timing.exit(),
            arrival: Arrival::Exterior,
        });
        self.mode = ViewMode::ExitingInterior;
        tracing::info!("Leaving interior");
        Ok(())
    }

    /// Open a pending door gate now instead of waiting for its delay.
    /// Returns false when nothing was waiting.
    pub fn release_pending(&mut self, now: Duration) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let request = AnimationRequest::new(self.camera, pending.to, pending.duration, pending.arrival);
        if let Err(err) = self.choreographer.animate(request, now) {
            tracing::warn!(error = %err, "Could not start gated camera move");
            return false;
        }
        true
    }

    /// Advance timers and the camera move.
    ///
    /// Returns the pose the camera must take this frame while a move is
    /// driving it, or `None` when the active control scheme owns the camera.
    pub fn tick(&mut self, now: Duration) -> Option<CameraPose> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.release_at)
        {
            self.release_pending(now);
        }

        match self.choreographer.tick(now) {
            Tick::Idle => None,
            Tick::Moving(pose) => {
                self.camera = pose;
                Some(pose)
            }
            Tick::Finished { pose, completion } => {
                self.camera = pose;
                self.arrive(completion, pose);
                Some(pose)
            }
        }
    }

    fn focus(
        &mut self,
        id: HotspotId,
        target: CameraPose,
        interior: bool,
        now: Duration,
    ) -> Result<(), InteractionError> {
        self.choreographer.animate(
            AnimationRequest::new(
                self.camera,
                target,
                self.timing.focus(),
                Arrival::Focus { id, interior },
            ),
            now,
        )?;
        self.before_focus = Some(self.camera);
        self.interior_focus = interior;

        for other in self.registry.ids(HotspotFilter::All) {
            if other != id {
                self.registry.set_visible(other, false);
            }
        }
        if interior {
            self.ports.set_back_button_visible(false);
            self.ports.set_interior_indicator_visible(false);
        }
        self.set_scheme(ControlScheme::Locked);
        self.mode = ViewMode::CameraInFlight;
        Ok(())
    }

    fn enter_interior(&mut self, target: CameraPose, now: Duration) -> Result<(), InteractionError> {
        self.outside_rest = Some(self.camera);
        self.registry.set_visible_where(HotspotFilter::All, false);
        self.set_scheme(ControlScheme::Locked);

        let door = self.clips.door.clone();
        self.play_clip(&door, PlaybackDirection::Forward, self.clips.door_open_speed);

        self.pending = Some(PendingMove {
            release_at: now + self.timing.door_open_delay(),
            to: self.interior.fit(&target),
            duration: self.timing.enter(),
            arrival: Arrival::Interior,
        });
        self.mode = ViewMode::EnteringInterior;
        tracing::info!("Entering interior");
        Ok(())
    }

    fn arrive(&mut self, arrival: Arrival, pose: CameraPose) {
        match arrival {
            Arrival::Focus { id, interior } => {
                self.registry.set_focused(id, true);
                if let Some(hotspot) = self.registry.get(id) {
                    let (title, description) =
                        (hotspot.def.title.clone(), hotspot.def.description.clone());
                    self.ports.show(&title, &description);
                }
                self.mode = ViewMode::HotspotFocus;
                tracing::debug!(%id, interior, "Focused hotspot");
            }
            Arrival::ReturnFromFocus { interior } => {
                self.interior_focus = false;
                if interior {
                    self.enter_interior_orbit(pose);
                } else {
                    self.enter_outside_orbit(pose);
                }
            }
            Arrival::Interior => {
                self.interior_entry = Some(pose);
                let group = self.shell.name.clone();
                self.set_mesh_group_transparency(&group, true);
                if let Some(light) = self.clips.light.clone() {
                    self.play_clip(&light, PlaybackDirection::Forward, self.clips.light_speed);
                }
                self.enter_interior_orbit(pose);
                tracing::info!("Inside the sauna");
            }
            Arrival::Exterior => {
                let group = self.shell.name.clone();
                self.set_mesh_group_transparency(&group, false);
                self.enter_outside_orbit(pose);
                tracing::info!("Back outside");
            }
        }
    }

    /// Hide (transparent) or restore the meshes of a named group.
    /// Unknown groups are ignored; returns true when visibility changed.
    pub fn set_mesh_group_transparency(&mut self, group: &str, transparent: bool) -> bool {
        if group != self.shell.name {
            tracing::debug!(group, "Unknown mesh group");
            return false;
        }
        if !self.shell.set_transparent(transparent) {
            return false;
        }
        self.ports.set_mesh_group_visible(group, !transparent);
        true
    }

    fn enter_outside_orbit(&mut self, pose: CameraPose) {
        self.show_exterior_set();
        self.set_scheme(ControlScheme::ExteriorOrbit {
            limits: self.exterior,
            resume: pose,
        });
        self.mode = ViewMode::OutsideOrbit;
    }

    fn enter_interior_orbit(&mut self, pose: CameraPose) {
        self.registry.set_visible_where(HotspotFilter::Exterior, false);
        self.registry.set_visible_where(HotspotFilter::Interior, true);
        self.ports.set_back_button_visible(true);
        self.ports.set_interior_indicator_visible(true);
        self.set_scheme(ControlScheme::InteriorOrbit {
            limits: self.interior,
            resume: pose,
        });
        self.mode = ViewMode::InteriorOrbit;
    }

    fn show_exterior_set(&mut self) {
        self.registry.set_visible_where(HotspotFilter::Interior, false);
        self.registry.set_visible_where(HotspotFilter::Exterior, true);
        self.visibility.force(self.camera.position, &mut self.registry);
    }

    fn clear_hover(&mut self) {
        if let Some(id) = self.hovered.take() {
            self.registry.set_hovered(id, false);
            self.ports.hide_label(id);
            self.ports.set_cursor(Cursor::Default);
        }
    }

    fn set_scheme(&mut self, scheme: ControlScheme) {
        self.scheme = scheme;
        self.ports.set_control_scheme(scheme);
    }

    fn play_clip(&mut self, clip: &str, direction: PlaybackDirection, speed: f32) {
        match self.ports.play(clip, direction, speed) {
            Ok(()) => tracing::debug!(clip, %direction, speed, "Playing clip"),
            Err(err) => tracing::warn!(clip, error = %err, "Skipping animation clip"),
        }
    }
}
