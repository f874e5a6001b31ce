//! Spherical orbit rig shared by the exterior and interior control schemes

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::pose::{CameraPose, OrbitCoords};

/// Limits and input gains of an orbit control scheme
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits in radians, measured down from +Y
    pub min_polar: f32,
    pub max_polar: f32,
    pub pan: bool,
    /// Radians per pixel of drag
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,
    /// Fraction of the distance per scroll line
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    /// Fixed orbit centre; without one the rig orbits the target of the pose it resumes from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<Vec3>,
}

fn default_rotate_speed() -> f32 {
    0.005
}

fn default_zoom_speed() -> f32 {
    0.1
}

impl OrbitLimits {
    /// Free orbit around the product
    pub fn exterior() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 50.0,
            min_polar: 0.01,
            max_polar: PI - 0.01,
            pan: true,
            rotate_speed: default_rotate_speed(),
            zoom_speed: default_zoom_speed(),
            pivot: None,
        }
    }

    /// Look-around from inside the cabin
    pub fn interior() -> Self {
        Self {
            min_distance: 0.1,
            max_distance: 0.4,
            min_polar: 0.05,
            max_polar: 0.45 * PI,
            pan: false,
            rotate_speed: default_rotate_speed(),
            zoom_speed: default_zoom_speed(),
            pivot: Some(Vec3::new(0.0, 0.6, 0.0)),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_distance > 0.0 && self.min_distance <= self.max_distance) {
            return Err(format!(
                "distance limits must satisfy 0 < min <= max, got {}..{}",
                self.min_distance, self.max_distance
            ));
        }
        if !(0.0..=PI).contains(&self.min_polar)
            || !(0.0..=PI).contains(&self.max_polar)
            || self.min_polar > self.max_polar
        {
            return Err(format!(
                "polar limits must satisfy 0 <= min <= max <= pi, got {}..{}",
                self.min_polar, self.max_polar
            ));
        }
        if self.pivot.is_some_and(|pivot| !pivot.is_finite()) {
            return Err("pivot must be finite".to_string());
        }
        Ok(())
    }

    /// Move `pose` onto the pivot's sphere of allowed poses.
    ///
    /// The camera keeps its bearing from the pivot with distance and polar
    /// angle clamped, and looks at the pivot. Without a pivot the pose is
    /// returned unchanged.
    pub fn fit(&self, pose: &CameraPose) -> CameraPose {
        let Some(pivot) = self.pivot else {
            return *pose;
        };
        let mut coords = OrbitCoords::from_offset(pose.position - pivot);
        let polar = coords.polar();
        if (self.min_distance..=self.max_distance).contains(&coords.distance)
            && (self.min_polar..=self.max_polar).contains(&polar)
        {
            return CameraPose::new(pose.position, pivot);
        }
        coords.distance = coords.distance.clamp(self.min_distance, self.max_distance);
        coords.elevation = FRAC_PI_2 - coords.polar().clamp(self.min_polar, self.max_polar);
        CameraPose::new(pivot + coords.offset(), pivot)
    }

    /// Zoom factor for a scroll of `lines` (positive zooms in)
    pub fn scroll_factor(&self, lines: f32) -> f32 {
        (1.0 - lines * self.zoom_speed).max(0.01)
    }
}

/// Camera orbiting a target on a sphere.
///
/// Seeding from a pose keeps the pose exactly, even outside the limits;
/// limits are applied only when input moves the rig.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    target: Vec3,
    coords: OrbitCoords,
    limits: OrbitLimits,
}

impl OrbitRig {
    pub fn from_pose(pose: &CameraPose, limits: OrbitLimits) -> Self {
        Self {
            target: pose.target,
            coords: OrbitCoords::from_pose(pose),
            limits,
        }
    }

    pub fn limits(&self) -> &OrbitLimits {
        &self.limits
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn coords(&self) -> OrbitCoords {
        self.coords
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.target + self.coords.offset(), self.target)
    }

    /// Drag by a pixel delta
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.coords.azimuth -= dx * self.limits.rotate_speed;
        let polar = (self.coords.polar() - dy * self.limits.rotate_speed)
            .clamp(self.limits.min_polar, self.limits.max_polar);
        self.coords.elevation = FRAC_PI_2 - polar;
    }

    /// Multiply the distance by `factor` (below 1 zooms in).
    ///
    /// Clamps only in the direction of travel, so a rig seeded outside its
    /// range never jumps the opposite way.
    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let current = self.coords.distance;
        let wanted = current * factor;
        self.coords.distance = if factor > 1.0 {
            if current >= self.limits.max_distance {
                current
            } else {
                wanted.min(self.limits.max_distance)
            }
        } else if current <= self.limits.min_distance {
            current
        } else {
            wanted.max(self.limits.min_distance)
        };
    }

    /// Slide the target in the camera's screen plane; no-op when pan is off
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !self.limits.pan {
            return;
        }
        let right = Vec3::new(self.coords.azimuth.cos(), 0.0, -self.coords.azimuth.sin());
        let pan_speed = self.coords.distance * 0.002;
        self.target += right * dx * pan_speed;
        self.target += Vec3::Y * dy * pan_speed;
    }
}
