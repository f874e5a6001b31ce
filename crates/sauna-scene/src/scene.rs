//! Lights and background

use bevy::prelude::*;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::srgb_u8(0x33, 0x33, 0x33)))
            .add_systems(Startup, setup_lights);
    }
}

fn setup_lights(mut commands: Commands) {
    // Even base light so the cedar reads from every side
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 1500.0,
        ..default()
    });

    // Overhead key light
    commands.spawn((
        DirectionalLight {
            illuminance: 4000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(0.0, 10.0, 0.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));

    // Two angled fills
    for position in [Vec3::new(10.0, 5.0, 5.0), Vec3::new(-5.0, 5.0, -5.0)] {
        commands.spawn((
            DirectionalLight {
                illuminance: 2500.0,
                shadows_enabled: false,
                ..default()
            },
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        ));
    }

    // Warm point light behind the viewer
    commands.spawn((
        PointLight {
            intensity: 100000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(0.0, 5.0, 5.0),
    ));
}
