//! Hotspot definitions and the per-session hotspot registry

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::pose::CameraPose;

/// Stable identity of a registered hotspot (its insertion index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HotspotId(pub usize);

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hotspot#{}", self.0)
    }
}

/// Product area a hotspot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
    Inside,
    Action,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Front => "front",
            Category::Back => "back",
            Category::Left => "left",
            Category::Right => "right",
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Inside => "inside",
            Category::Action => "action",
        }
    }
}

/// Static description of a hotspot, as written in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotDef {
    /// Unique name within the catalog (e.g., "glass_door")
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// Marker position in model space
    pub anchor: Vec3,
    /// Framed camera pose for this feature
    pub camera: CameraPose,
    /// Belongs to the inside set rather than the outside set
    #[serde(default)]
    pub interior: bool,
    /// Triggers the interior transition instead of an info panel
    #[serde(default)]
    pub action: bool,
}

/// Runtime state mutated by the visibility policy, router and state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotState {
    pub visible: bool,
    pub opacity: f32,
    pub hovered: bool,
    pub focused: bool,
}

impl Default for HotspotState {
    fn default() -> Self {
        Self {
            visible: false,
            opacity: 1.0,
            hovered: false,
            focused: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hotspot {
    pub id: HotspotId,
    pub def: HotspotDef,
    pub state: HotspotState,
}

impl Hotspot {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn is_interior(&self) -> bool {
        self.def.interior
    }

    pub fn is_action(&self) -> bool {
        self.def.action
    }

    pub fn category(&self) -> Category {
        self.def.category
    }
}

/// Selection used by [`HotspotRegistry::get_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotFilter {
    All,
    Exterior,
    Interior,
    Category(Category),
    Visible,
}

impl HotspotFilter {
    fn matches(&self, hotspot: &Hotspot) -> bool {
        match self {
            HotspotFilter::All => true,
            HotspotFilter::Exterior => !hotspot.is_interior(),
            HotspotFilter::Interior => hotspot.is_interior(),
            HotspotFilter::Category(category) => hotspot.category() == *category,
            HotspotFilter::Visible => hotspot.state.visible,
        }
    }
}

/// Visual roles of the parts that make up a hotspot marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerPart {
    /// Dark ring drawn behind the disc
    Outline,
    /// Light filled disc
    Disc,
    /// Title label shown on hover
    Label,
}

impl MarkerPart {
    pub fn base_alpha(&self) -> f32 {
        match self {
            MarkerPart::Outline => 0.8,
            MarkerPart::Disc => 0.9,
            MarkerPart::Label => 1.0,
        }
    }

    /// Rendered alpha of this part for a hotspot at `opacity`
    pub fn alpha(&self, opacity: f32) -> f32 {
        self.base_alpha() * opacity.clamp(0.0, 1.0)
    }
}

/// Fixed-per-session set of hotspots in insertion order.
///
/// Mutators silently ignore unknown ids: model loading can race with pointer
/// input, and a stale id is not worth surfacing.
#[derive(Debug, Clone, Default)]
pub struct HotspotRegistry {
    hotspots: Vec<Hotspot>,
    by_name: HashMap<String, HotspotId>,
}

impl HotspotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: HotspotDef) -> HotspotId {
        let id = HotspotId(self.hotspots.len());
        if self.by_name.contains_key(&def.name) {
            tracing::warn!(name = %def.name, "Hotspot name registered twice; lookups by name keep the first");
        } else {
            self.by_name.insert(def.name.clone(), id);
        }
        tracing::debug!(%id, name = %def.name, title = %def.title, "Registered hotspot");
        self.hotspots.push(Hotspot {
            id,
            def,
            state: HotspotState::default(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.get(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<HotspotId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter()
    }

    pub fn filtered(&self, filter: HotspotFilter) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter().filter(move |h| filter.matches(h))
    }

    pub fn get_all(&self, filter: HotspotFilter) -> Vec<&Hotspot> {
        self.filtered(filter).collect()
    }

    pub fn ids(&self, filter: HotspotFilter) -> Vec<HotspotId> {
        self.filtered(filter).map(|h| h.id).collect()
    }

    pub fn set_visible(&mut self, id: HotspotId, visible: bool) {
        if let Some(hotspot) = self.hotspots.get_mut(id.0) {
            hotspot.state.visible = visible;
        }
    }

    pub fn set_opacity(&mut self, id: HotspotId, opacity: f32) {
        if let Some(hotspot) = self.hotspots.get_mut(id.0) {
            hotspot.state.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn set_hovered(&mut self, id: HotspotId, hovered: bool) {
        if let Some(hotspot) = self.hotspots.get_mut(id.0) {
            hotspot.state.hovered = hovered;
        }
    }

    pub fn set_focused(&mut self, id: HotspotId, focused: bool) {
        if let Some(hotspot) = self.hotspots.get_mut(id.0) {
            hotspot.state.focused = focused;
        }
    }

    /// Set visibility for every hotspot matching `filter`
    pub fn set_visible_where(&mut self, filter: HotspotFilter, visible: bool) {
        for hotspot in self.hotspots.iter_mut().filter(|h| filter.matches(h)) {
            hotspot.state.visible = visible;
        }
    }

    pub fn focused(&self) -> Option<HotspotId> {
        self.hotspots.iter().find(|h| h.state.focused).map(|h| h.id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn def(name: &str, category: Category, interior: bool, action: bool) -> HotspotDef {
        HotspotDef {
            name: name.to_string(),
            title: name.replace('_', " "),
            description: format!("About {}", name),
            category,
            anchor: Vec3::new(0.1, 0.2, -0.6),
            camera: CameraPose::new(Vec3::new(0.0, 0.3, -3.0), Vec3::ZERO),
            interior,
            action,
        }
    }

    #[test]
    fn test_register_preserves_insertion_order() {
        let mut registry = HotspotRegistry::new();
        let a = registry.register(def("glass_door", Category::Front, false, false));
        let b = registry.register(def("vent", Category::Back, false, false));
        let c = registry.register(def("backrest", Category::Inside, true, false));

        assert_eq!((a, b, c), (HotspotId(0), HotspotId(1), HotspotId(2)));
        let names: Vec<_> = registry.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["glass_door", "vent", "backrest"]);
        assert_eq!(registry.id_of("vent"), Some(b));
    }

    #[test]
    fn test_filters() {
        let mut registry = HotspotRegistry::new();
        registry.register(def("glass_door", Category::Front, false, false));
        registry.register(def("open_door", Category::Action, false, true));
        registry.register(def("backrest", Category::Inside, true, false));

        assert_eq!(registry.get_all(HotspotFilter::All).len(), 3);
        assert_eq!(registry.ids(HotspotFilter::Exterior), vec![HotspotId(0), HotspotId(1)]);
        assert_eq!(registry.ids(HotspotFilter::Interior), vec![HotspotId(2)]);
        assert_eq!(
            registry.ids(HotspotFilter::Category(Category::Action)),
            vec![HotspotId(1)]
        );
        assert!(registry.get_all(HotspotFilter::Visible).is_empty());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut registry = HotspotRegistry::new();
        registry.register(def("glass_door", Category::Front, false, false));
        registry.set_visible(HotspotId(42), true);
        registry.set_opacity(HotspotId(42), 0.5);
        registry.set_hovered(HotspotId(42), true);
        registry.set_focused(HotspotId(42), true);
        assert!(registry.get(HotspotId(42)).is_none());
        assert_eq!(registry.focused(), None);
    }

    #[test]
    fn test_opacity_is_clamped_and_decoupled_from_visibility() {
        let mut registry = HotspotRegistry::new();
        let id = registry.register(def("glass_door", Category::Front, false, false));
        registry.set_opacity(id, 1.7);
        assert_eq!(registry.get(id).unwrap().state.opacity, 1.0);
        registry.set_opacity(id, 0.3);
        registry.set_visible(id, false);
        let state = registry.get(id).unwrap().state;
        assert_eq!(state.opacity, 0.3);
        assert!(!state.visible);
    }

    #[test]
    fn test_marker_part_alpha() {
        assert!((MarkerPart::Outline.alpha(0.3) - 0.24).abs() < 1e-6);
        assert!((MarkerPart::Disc.alpha(1.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_category_serde_names() {
        let parsed: Category = serde_json::from_str("\"front\"").unwrap();
        assert_eq!(parsed, Category::Front);
        assert_eq!(Category::Action.as_str(), "action");
    }
}
