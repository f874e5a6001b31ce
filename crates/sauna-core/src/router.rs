//! Pointer ray to hotspot dispatch

use glam::{Vec2, Vec3};
use std::time::Duration;

use crate::config::MarkerConfig;
use crate::hotspot::{HotspotFilter, HotspotId, HotspotRegistry};
use crate::machine::{InteractionError, ViewerMachine};
use crate::ports::ViewerPorts;
use crate::pose::CameraPose;

/// World-space ray with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Returns `None` for a zero direction
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Ray through a point in normalized device coordinates (`[-1, 1]`, +Y up)
    pub fn from_ndc(ndc: Vec2, camera: &CameraPose, fov_y: f32, aspect: f32) -> Option<Self> {
        let half = (fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half * aspect, ndc.y * half, -1.0);
        Self::new(camera.position, camera.orientation(Vec3::Y) * local)
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the first hit on a sphere, if in front
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub id: HotspotId,
    pub distance: f32,
}

/// Test `ray` against every visible marker, nearest first
pub fn pick(ray: &Ray, registry: &HotspotRegistry, markers: &MarkerConfig) -> Vec<Hit> {
    let mut hits: Vec<Hit> = registry
        .filtered(HotspotFilter::Visible)
        .filter_map(|hotspot| {
            let radius = markers.pick_radius(hotspot.is_interior());
            ray.intersect_sphere(hotspot.def.anchor, radius)
                .map(|distance| Hit {
                    id: hotspot.id,
                    distance,
                })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The ray hit no visible marker
    Missed,
    /// A marker was hit but the machine did not take it
    Ignored(HotspotId),
    Dispatched(HotspotId),
}

/// Routes pointer rays into the view-mode state machine
#[derive(Debug, Clone)]
pub struct InteractionRouter {
    markers: MarkerConfig,
}

impl InteractionRouter {
    pub fn new(markers: MarkerConfig) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &MarkerConfig {
        &self.markers
    }

    pub fn nearest<P: ViewerPorts>(&self, machine: &ViewerMachine<P>, ray: &Ray) -> Option<HotspotId> {
        pick(ray, machine.registry(), &self.markers)
            .first()
            .map(|hit| hit.id)
    }

    /// Per-frame hover update; `None` when the pointer is off the canvas
    pub fn hover<P: ViewerPorts>(
        &self,
        machine: &mut ViewerMachine<P>,
        ray: Option<&Ray>,
    ) -> Option<HotspotId> {
        let hit = ray.and_then(|ray| self.nearest(machine, ray));
        machine.update_hover(hit);
        machine.hovered()
    }

    pub fn click<P: ViewerPorts>(
        &self,
        machine: &mut ViewerMachine<P>,
        ray: &Ray,
        now: Duration,
    ) -> ClickOutcome {
        let Some(id) = self.nearest(machine, ray) else {
            return ClickOutcome::Missed;
        };
        match machine.activate(id, now) {
            Ok(()) => ClickOutcome::Dispatched(id),
            Err(InteractionError::Busy) => ClickOutcome::Ignored(id),
            Err(err) => {
                tracing::debug!(%id, error = %err, "Click not dispatched");
                ClickOutcome::Ignored(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::hotspot::tests::def;
    use crate::hotspot::Category;
    use crate::machine::ViewMode;
    use crate::ports::EffectQueue;

    fn toward(from: Vec3, to: Vec3) -> Ray {
        Ray::new(from, to - from).unwrap()
    }

    #[test]
    fn test_ray_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z).unwrap();
        let t = ray.intersect_sphere(Vec3::new(0.0, 0.0, 5.0), 2.0).unwrap();
        assert!((t - 3.0).abs() < 1e-6);
        assert!(ray.intersect_sphere(Vec3::new(0.0, 0.0, -5.0), 2.0).is_none());
        assert!(ray.intersect_sphere(Vec3::new(3.0, 0.0, 5.0), 2.0).is_none());
        // Starting inside the sphere hits the far side
        let inside = ray.intersect_sphere(Vec3::new(0.0, 0.0, 1.0), 2.0).unwrap();
        assert!((inside - 3.0).abs() < 1e-6);
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_center_ray_looks_at_target() {
        let camera = CameraPose::new(Vec3::new(1.52, 0.53, -3.4), Vec3::ZERO);
        let ray = Ray::from_ndc(Vec2::ZERO, &camera, 50f32.to_radians(), 16.0 / 9.0).unwrap();
        assert!(ray.direction.abs_diff_eq(camera.forward(), 1e-5));

        // Right half of the screen bends the ray to the camera's right
        let right = Ray::from_ndc(Vec2::new(1.0, 0.0), &camera, 50f32.to_radians(), 1.0).unwrap();
        let camera_right = camera.forward().cross(Vec3::Y);
        assert!(right.direction.dot(camera_right) > 0.0);
    }

    #[test]
    fn test_pick_skips_hidden_and_sorts() {
        let mut registry = HotspotRegistry::new();
        let mut near = def("near", Category::Front, false, false);
        near.anchor = Vec3::new(0.0, 0.0, -1.0);
        let mut far = def("far", Category::Front, false, false);
        far.anchor = Vec3::new(0.0, 0.0, 1.0);
        let mut hidden = def("hidden", Category::Front, false, false);
        hidden.anchor = Vec3::new(0.0, 0.0, 0.0);
        let near = registry.register(near);
        let far = registry.register(far);
        let hidden = registry.register(hidden);
        registry.set_visible(near, true);
        registry.set_visible(far, true);
        registry.set_visible(hidden, false);

        let ray = toward(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        let hits = pick(&ray, &registry, &MarkerConfig::default());
        let ids: Vec<_> = hits.iter().map(|hit| hit.id).collect();
        assert_eq!(ids, vec![near, far]);
    }

    #[test]
    fn test_interior_markers_pick_smaller() {
        let markers = MarkerConfig::default();
        let mut registry = HotspotRegistry::new();
        let mut backrest = def("backrest", Category::Inside, true, false);
        backrest.anchor = Vec3::ZERO;
        let backrest = registry.register(backrest);
        registry.set_visible(backrest, true);

        // Passes inside the exterior radius but outside the interior one
        let offset = markers.pick_radius(true) + 0.005;
        assert!(offset < markers.pick_radius(false));
        let ray = toward(Vec3::new(offset, 0.0, -2.0), Vec3::new(offset, 0.0, 0.0));
        assert!(pick(&ray, &registry, &markers).is_empty());
    }

    #[test]
    fn test_click_dispatch() {
        let config = ViewerConfig::builtin().unwrap();
        let router = InteractionRouter::new(config.markers.clone());
        let mut machine = ViewerMachine::new(&config, EffectQueue::new());
        let camera = machine.camera();

        let glass = machine.registry().id_of("glass_door").unwrap();
        let anchor = machine.registry().get(glass).unwrap().def.anchor;
        let ray = toward(camera.position, anchor);

        let miss = toward(camera.position, camera.position + Vec3::Y);
        assert_eq!(router.click(&mut machine, &miss, Duration::ZERO), ClickOutcome::Missed);

        assert_eq!(
            router.click(&mut machine, &ray, Duration::ZERO),
            ClickOutcome::Dispatched(glass)
        );
        assert_eq!(machine.mode(), ViewMode::CameraInFlight);
        assert_eq!(
            router.click(&mut machine, &ray, Duration::from_millis(100)),
            ClickOutcome::Ignored(glass)
        );
    }

    #[test]
    fn test_hover_through_router() {
        let config = ViewerConfig::builtin().unwrap();
        let router = InteractionRouter::new(config.markers.clone());
        let mut machine = ViewerMachine::new(&config, EffectQueue::new());
        let camera = machine.camera();

        let frame = machine.registry().id_of("door_frame").unwrap();
        let anchor = machine.registry().get(frame).unwrap().def.anchor;
        let ray = toward(camera.position, anchor);
        assert_eq!(router.hover(&mut machine, Some(&ray)), Some(frame));
        assert_eq!(router.hover(&mut machine, None), None);
    }
}
