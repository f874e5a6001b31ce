//! Viewing-side classification, hotspot dimming and shell-mesh groups

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::VisibilityConfig;
use crate::hotspot::{Category, HotspotFilter, HotspotRegistry};

/// Cardinal side of the product the camera is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewingSide {
    Front,
    Back,
    Left,
    Right,
}

impl ViewingSide {
    /// Evaluation order; ties resolve to the earliest entry
    pub const ALL: [ViewingSide; 4] = [
        ViewingSide::Front,
        ViewingSide::Back,
        ViewingSide::Left,
        ViewingSide::Right,
    ];

    pub fn direction(&self) -> Vec3 {
        match self {
            ViewingSide::Front => Vec3::NEG_Z,
            ViewingSide::Back => Vec3::Z,
            ViewingSide::Left => Vec3::X,
            ViewingSide::Right => Vec3::NEG_X,
        }
    }
}

impl fmt::Display for ViewingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViewingSide::Front => "front",
            ViewingSide::Back => "back",
            ViewingSide::Left => "left",
            ViewingSide::Right => "right",
        };
        f.write_str(label)
    }
}

/// Nearest cardinal direction from `origin` to the camera.
///
/// A camera sitting on the origin has no direction; every dot product is zero
/// and the first side in evaluation order (front) wins.
pub fn determine_viewing_side(camera: Vec3, origin: Vec3) -> ViewingSide {
    let direction = (camera - origin).normalize_or_zero();
    let mut best = ViewingSide::Front;
    let mut best_dot = f32::NEG_INFINITY;
    for side in ViewingSide::ALL {
        let dot = direction.dot(side.direction());
        if dot > best_dot {
            best = side;
            best_dot = dot;
        }
    }
    best
}

/// Categories shown at full strength from each viewing side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideAllowList {
    #[serde(default = "default_front")]
    pub front: Vec<Category>,
    #[serde(default = "default_back")]
    pub back: Vec<Category>,
    #[serde(default = "default_left")]
    pub left: Vec<Category>,
    #[serde(default = "default_right")]
    pub right: Vec<Category>,
}

impl Default for SideAllowList {
    fn default() -> Self {
        Self {
            front: default_front(),
            back: default_back(),
            left: default_left(),
            right: default_right(),
        }
    }
}

fn default_front() -> Vec<Category> {
    vec![Category::Front, Category::Top, Category::Action]
}

fn default_back() -> Vec<Category> {
    vec![Category::Back]
}

fn default_left() -> Vec<Category> {
    vec![Category::Left]
}

fn default_right() -> Vec<Category> {
    vec![Category::Right]
}

impl SideAllowList {
    pub fn for_side(&self, side: ViewingSide) -> &[Category] {
        match side {
            ViewingSide::Front => &self.front,
            ViewingSide::Back => &self.back,
            ViewingSide::Left => &self.left,
            ViewingSide::Right => &self.right,
        }
    }

    pub fn allows(&self, side: ViewingSide, category: Category) -> bool {
        self.for_side(side).contains(&category)
    }
}

/// Dims exterior hotspots that face away from the camera
#[derive(Debug, Clone)]
pub struct VisibilityPolicy {
    origin: Vec3,
    dim_opacity: f32,
    recompute_distance: f32,
    allow: SideAllowList,
    last_camera: Option<Vec3>,
    side: Option<ViewingSide>,
}

impl VisibilityPolicy {
    pub fn new(config: &VisibilityConfig, origin: Vec3) -> Self {
        Self {
            origin,
            dim_opacity: config.dim_opacity,
            recompute_distance: config.recompute_distance,
            allow: config.sides.clone(),
            last_camera: None,
            side: None,
        }
    }

    /// Side computed by the most recent recompute
    pub fn side(&self) -> Option<ViewingSide> {
        self.side
    }

    pub fn determine_viewing_side(&self, camera: Vec3) -> ViewingSide {
        determine_viewing_side(camera, self.origin)
    }

    /// Apply the per-side opacity rules to every exterior hotspot.
    /// Interior hotspots are left alone; action hotspots never dim.
    pub fn recompute_opacity(&self, side: ViewingSide, registry: &mut HotspotRegistry) {
        let updates: Vec<_> = registry
            .filtered(HotspotFilter::Exterior)
            .map(|hotspot| {
                let opacity = if hotspot.is_action() || self.allow.allows(side, hotspot.category()) {
                    1.0
                } else {
                    self.dim_opacity
                };
                (hotspot.id, opacity)
            })
            .collect();
        for (id, opacity) in updates {
            registry.set_opacity(id, opacity);
        }
    }

    /// Recompute only when the camera moved past the threshold since the last
    /// recompute. Returns the side when a recompute happened.
    pub fn update(&mut self, camera: Vec3, registry: &mut HotspotRegistry) -> Option<ViewingSide> {
        if let Some(last) = self.last_camera {
            if camera.distance(last) <= self.recompute_distance {
                return None;
            }
        }
        Some(self.force(camera, registry))
    }

    /// Recompute regardless of how far the camera moved
    pub fn force(&mut self, camera: Vec3, registry: &mut HotspotRegistry) -> ViewingSide {
        let side = self.determine_viewing_side(camera);
        self.recompute_opacity(side, registry);
        if self.side != Some(side) {
            tracing::debug!(%side, "Viewing side changed");
        }
        self.last_camera = Some(camera);
        self.side = Some(side);
        side
    }
}

/// Named set of model meshes hidden together to reveal the interior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGroup {
    pub name: String,
    /// Node-name fragments; a mesh belongs to the group if its name contains one
    pub meshes: Vec<String>,
    #[serde(skip)]
    transparent: bool,
}

impl MeshGroup {
    pub fn new(name: impl Into<String>, meshes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            meshes,
            transparent: false,
        }
    }

    pub fn matches(&self, node_name: &str) -> bool {
        self.meshes.iter().any(|fragment| node_name.contains(fragment.as_str()))
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Meshes in the group are rendered only while the group is not transparent
    pub fn meshes_visible(&self) -> bool {
        !self.transparent
    }

    /// Returns true when the state actually changed
    pub fn set_transparent(&mut self, transparent: bool) -> bool {
        let changed = self.transparent != transparent;
        self.transparent = transparent;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotspot::tests::def;

    fn registry() -> HotspotRegistry {
        let mut registry = HotspotRegistry::new();
        registry.register(def("open_door", Category::Action, false, true));
        registry.register(def("glass_door", Category::Front, false, false));
        registry.register(def("door_frame", Category::Top, false, false));
        registry.register(def("side_panel", Category::Right, false, false));
        registry.register(def("steel_bands", Category::Left, false, false));
        registry.register(def("vent", Category::Back, false, false));
        registry.register(def("backrest", Category::Inside, true, false));
        registry
    }

    fn opacity(registry: &HotspotRegistry, name: &str) -> f32 {
        let id = registry.id_of(name).unwrap();
        registry.get(id).unwrap().state.opacity
    }

    #[test]
    fn test_cardinal_sides() {
        assert_eq!(determine_viewing_side(Vec3::new(0.0, 0.5, -3.0), Vec3::ZERO), ViewingSide::Front);
        assert_eq!(determine_viewing_side(Vec3::new(0.2, 0.5, 3.0), Vec3::ZERO), ViewingSide::Back);
        assert_eq!(determine_viewing_side(Vec3::new(2.5, 0.4, -0.5), Vec3::ZERO), ViewingSide::Left);
        assert_eq!(determine_viewing_side(Vec3::new(-3.0, 0.3, 0.0), Vec3::ZERO), ViewingSide::Right);
    }

    #[test]
    fn test_ties_resolve_in_evaluation_order() {
        // Exactly between front (-Z) and left (+X): front is checked first
        assert_eq!(determine_viewing_side(Vec3::new(1.0, 0.0, -1.0), Vec3::ZERO), ViewingSide::Front);
        // Between back (+Z) and right (-X): back is checked first
        assert_eq!(determine_viewing_side(Vec3::new(-1.0, 0.0, 1.0), Vec3::ZERO), ViewingSide::Back);
        // Straight above: all horizontal dots are zero
        assert_eq!(determine_viewing_side(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO), ViewingSide::Front);
    }

    #[test]
    fn test_side_is_idempotent() {
        let camera = Vec3::new(1.52, 0.53, -3.4);
        let first = determine_viewing_side(camera, Vec3::ZERO);
        for _ in 0..10 {
            assert_eq!(determine_viewing_side(camera, Vec3::ZERO), first);
        }
    }

    #[test]
    fn test_side_relative_to_origin() {
        let origin = Vec3::new(10.0, 0.0, 10.0);
        assert_eq!(determine_viewing_side(Vec3::new(10.0, 0.0, 7.0), origin), ViewingSide::Front);
    }

    #[test]
    fn test_front_side_opacity() {
        let mut registry = registry();
        let policy = VisibilityPolicy::new(&VisibilityConfig::default(), Vec3::ZERO);
        policy.recompute_opacity(ViewingSide::Front, &mut registry);

        assert_eq!(opacity(&registry, "open_door"), 1.0);
        assert_eq!(opacity(&registry, "glass_door"), 1.0);
        assert_eq!(opacity(&registry, "door_frame"), 1.0);
        assert!((opacity(&registry, "side_panel") - 0.3).abs() < 1e-6);
        assert!((opacity(&registry, "vent") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_action_never_dims_and_interior_untouched() {
        let mut registry = registry();
        let backrest = registry.id_of("backrest").unwrap();
        registry.set_opacity(backrest, 0.55);

        let policy = VisibilityPolicy::new(&VisibilityConfig::default(), Vec3::ZERO);
        for side in ViewingSide::ALL {
            policy.recompute_opacity(side, &mut registry);
            assert_eq!(opacity(&registry, "open_door"), 1.0);
            assert!((opacity(&registry, "backrest") - 0.55).abs() < 1e-6);
        }
        policy.recompute_opacity(ViewingSide::Back, &mut registry);
        assert_eq!(opacity(&registry, "vent"), 1.0);
        assert!((opacity(&registry, "glass_door") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_update_respects_distance_threshold() {
        let mut registry = registry();
        let mut policy = VisibilityPolicy::new(&VisibilityConfig::default(), Vec3::ZERO);

        let start = Vec3::new(0.0, 0.5, -3.0);
        assert_eq!(policy.update(start, &mut registry), Some(ViewingSide::Front));
        // Jitter below the threshold does nothing
        assert_eq!(policy.update(start + Vec3::splat(0.01), &mut registry), None);
        // A real move past the threshold recomputes
        assert_eq!(
            policy.update(Vec3::new(3.0, 0.5, 0.0), &mut registry),
            Some(ViewingSide::Left)
        );
        assert_eq!(policy.side(), Some(ViewingSide::Left));
        assert_eq!(opacity(&registry, "steel_bands"), 1.0);
        assert!((opacity(&registry, "glass_door") - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_group_matching_and_toggle() {
        let mut group = MeshGroup::new(
            "front_shell",
            vec!["Sauna_Front_Glass_Door".to_string(), "Hinge_01-3".to_string()],
        );
        assert!(group.matches("Sauna_Front_Glass_Door.001"));
        assert!(group.matches("Hinge_01-3001"));
        assert!(!group.matches("Sauna_Back_Panel"));

        assert!(group.meshes_visible());
        assert!(group.set_transparent(true));
        assert!(!group.meshes_visible());
        assert!(!group.set_transparent(true));
        assert!(group.set_transparent(false));
        assert!(group.meshes_visible());
    }
}
