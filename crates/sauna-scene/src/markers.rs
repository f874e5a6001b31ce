//! Hotspot marker entities
//!
//! Each hotspot gets a root entity at its anchor with two child discs, an
//! outline and a fill, tagged by [`MarkerPart`]. Markers face the camera every
//! frame, pulse gently and follow the registry's visible, opacity and hover state.

use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use sauna_core::{EffectQueue, HotspotId, MarkerPart, ViewerConfig, ViewerMachine};

use crate::camera::MainCamera;
use crate::{Viewer, ViewerSet};

pub struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (billboard_markers, sync_markers).in_set(ViewerSet::Visuals),
        );
    }
}

#[derive(Component, Debug)]
pub struct HotspotMarker {
    pub id: HotspotId,
    pub base_scale: f32,
}

/// One visual part of a marker; its material alpha follows the hotspot opacity
#[derive(Component, Debug)]
pub struct MarkerVisual {
    pub part: MarkerPart,
}

const PULSE_AMPLITUDE: f32 = 0.1;
const PULSE_RATE: f32 = 2.0;
const HOVER_SCALE: f32 = 0.8;
/// Fill radius relative to the outline radius
const DISC_RATIO: f32 = 0.06 / 0.065;

pub fn spawn_markers(
    commands: &mut Commands,
    machine: &ViewerMachine<EffectQueue>,
    config: &ViewerConfig,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let radius = config.markers.radius;
    let outline_mesh = meshes.add(Circle::new(radius));
    let disc_mesh = meshes.add(Circle::new(radius * DISC_RATIO));

    for hotspot in machine.registry().iter() {
        let base_scale = if hotspot.is_interior() {
            config.markers.interior_scale
        } else {
            config.markers.exterior_scale
        };
        let visibility = if hotspot.state.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        commands
            .spawn((
                Transform::from_translation(hotspot.def.anchor).with_scale(Vec3::splat(base_scale)),
                visibility,
                HotspotMarker {
                    id: hotspot.id,
                    base_scale,
                },
                Name::new(format!("hotspot:{}", hotspot.name())),
            ))
            .with_children(|parent| {
                parent.spawn((
                    Mesh3d(outline_mesh.clone()),
                    MeshMaterial3d(materials.add(part_material(MarkerPart::Outline, hotspot.state.opacity))),
                    Transform::from_xyz(0.0, 0.0, -0.001),
                    MarkerVisual {
                        part: MarkerPart::Outline,
                    },
                ));
                parent.spawn((
                    Mesh3d(disc_mesh.clone()),
                    MeshMaterial3d(materials.add(part_material(MarkerPart::Disc, hotspot.state.opacity))),
                    Transform::default(),
                    MarkerVisual {
                        part: MarkerPart::Disc,
                    },
                ));
            });
    }
    tracing::debug!(count = machine.registry().len(), "Spawned hotspot markers");
}

fn part_base_color(part: MarkerPart) -> Color {
    match part {
        MarkerPart::Outline => Color::srgb(0.1, 0.1, 0.1),
        MarkerPart::Disc | MarkerPart::Label => Color::WHITE,
    }
}

fn part_material(part: MarkerPart, opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: part_base_color(part).with_alpha(part.alpha(opacity)),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

/// Markers copy the camera rotation so their discs always face it
fn billboard_markers(
    camera_query: Query<&Transform, (With<MainCamera>, Without<HotspotMarker>)>,
    mut markers: Query<&mut Transform, With<HotspotMarker>>,
) {
    let Ok(camera) = camera_query.single() else {
        return;
    };
    for mut transform in markers.iter_mut() {
        transform.rotation = camera.rotation;
    }
}

fn sync_markers(
    viewer: Option<Res<Viewer>>,
    time: Res<Time>,
    mut markers: Query<(&HotspotMarker, &mut Transform, &mut Visibility, &Children)>,
    parts: Query<(&MarkerVisual, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(viewer) = viewer else { return };
    let registry = viewer.machine.registry();
    let pulse = (time.elapsed_secs() * PULSE_RATE).sin() * PULSE_AMPLITUDE + 1.0;

    for (marker, mut transform, mut visibility, children) in markers.iter_mut() {
        let Some(hotspot) = registry.get(marker.id) else {
            continue;
        };
        let state = hotspot.state;

        let wanted = if state.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
        if !state.visible {
            continue;
        }

        let hover = if state.hovered { HOVER_SCALE } else { 1.0 };
        transform.scale = Vec3::splat(marker.base_scale * pulse * hover);

        for child in children.iter() {
            let Ok((visual, material)) = parts.get(child) else {
                continue;
            };
            let Some(material) = materials.get_mut(&material.0) else {
                continue;
            };
            let alpha = visual.part.alpha(state.opacity);
            if (material.base_color.alpha() - alpha).abs() > f32::EPSILON {
                material.base_color.set_alpha(alpha);
            }
        }
    }
}
