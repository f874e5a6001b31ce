//! Camera poses and spherical orbit coordinates

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// A camera position paired with the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Linear interpolation of both position and target by `t`
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }

    /// Larger of the position and target distances between two poses
    pub fn distance(&self, other: &CameraPose) -> f32 {
        self.position
            .distance(other.position)
            .max(self.target.distance(other.target))
    }

    pub fn approx_eq(&self, other: &CameraPose, epsilon: f32) -> bool {
        self.distance(other) <= epsilon
    }

    /// Viewing direction (unit length, or zero for a degenerate pose)
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Camera rotation for this pose with a world up vector (`-Z` forward convention)
    pub fn orientation(&self, up: Vec3) -> Quat {
        let forward = self.forward();
        if forward == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let right = forward.cross(up).normalize_or_zero();
        if right == Vec3::ZERO {
            // Looking straight along `up`; any roll is as good as another
            return Quat::from_rotation_arc(Vec3::NEG_Z, forward);
        }
        let camera_up = right.cross(forward);
        Quat::from_mat3(&glam::Mat3::from_cols(right, camera_up, -forward))
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.52, 0.53, -3.4),
            target: Vec3::ZERO,
        }
    }
}

/// Spherical coordinates of a camera around its orbit target (Y up).
///
/// Azimuth is measured around +Y starting at +Z, elevation is the angle above
/// the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCoords {
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl OrbitCoords {
    pub fn from_offset(offset: Vec3) -> Self {
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                distance: 0.0,
                azimuth: 0.0,
                elevation: 0.0,
            };
        }
        Self {
            distance,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / distance).clamp(-1.0, 1.0).asin(),
        }
    }

    pub fn from_pose(pose: &CameraPose) -> Self {
        Self::from_offset(pose.position - pose.target)
    }

    pub fn offset(&self) -> Vec3 {
        let horizontal = self.distance * self.elevation.cos();
        Vec3::new(
            horizontal * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            horizontal * self.azimuth.cos(),
        )
    }

    /// Polar angle measured down from +Y
    pub fn polar(&self) -> f32 {
        FRAC_PI_2 - self.elevation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = CameraPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let b = CameraPose::new(Vec3::new(-1.0, 0.0, 5.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!(mid.position.abs_diff_eq(Vec3::new(0.0, 1.0, 4.0), 1e-6));
        assert!(mid.target.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_orbit_coords_roundtrip() {
        let pose = CameraPose::new(Vec3::new(1.52, 0.53, -3.4), Vec3::new(0.1, 0.2, -0.3));
        let coords = OrbitCoords::from_pose(&pose);
        let rebuilt = pose.target + coords.offset();
        assert!(rebuilt.abs_diff_eq(pose.position, 1e-5));
    }

    #[test]
    fn test_orientation_faces_target() {
        let pose = CameraPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let rotation = pose.orientation(Vec3::Y);
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));

        let pose = CameraPose::new(Vec3::new(3.0, 1.0, -2.0), Vec3::new(0.0, 0.5, 0.0));
        let forward = pose.orientation(Vec3::Y) * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(pose.forward(), 1e-5));
    }

    #[test]
    fn test_degenerate_offset() {
        let coords = OrbitCoords::from_offset(Vec3::ZERO);
        assert_eq!(coords.distance, 0.0);
        assert_eq!(coords.offset(), Vec3::ZERO);
    }
}
