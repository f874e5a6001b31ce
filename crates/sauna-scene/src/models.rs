//! glTF model loading, shell mesh tagging and animation clips

use bevy::animation::AnimationTarget;
use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use sauna_core::{EffectQueue, PlaybackDirection};
use std::collections::HashMap;

use crate::markers::spawn_markers;
use crate::{Viewer, ViewerSettings};

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClipLibrary>()
            .add_systems(Startup, start_model_load)
            .add_systems(
                Update,
                (
                    poll_model_load,
                    tag_shell_meshes,
                    attach_animation_graph,
                    bind_clip_players,
                ),
            );
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

#[derive(Resource, Debug)]
pub struct ModelState {
    pub path: String,
    pub handle: Handle<Gltf>,
    pub status: ModelStatus,
}

/// Marks the root entity of the spawned model scene
#[derive(Component)]
pub struct SaunaModel;

/// A model node that belongs to a named shell group
#[derive(Component, Debug, Clone)]
pub struct ShellMesh {
    pub group: String,
}

/// Named clips of the loaded model and the players that run them
#[derive(Resource, Default)]
pub struct ClipLibrary {
    pub graph: Option<Handle<AnimationGraph>>,
    pub nodes: HashMap<String, ClipNode>,
    /// Player owning the targets of each clip
    pub players: HashMap<String, Entity>,
    /// First player seen; used for clips whose targets are not bound yet
    pub fallback: Option<Entity>,
}

#[derive(Debug, Clone)]
pub struct ClipNode {
    pub index: AnimationNodeIndex,
    pub clip: Handle<AnimationClip>,
}

impl ClipLibrary {
    /// Player that should run `name`
    pub fn player_for(&self, name: &str) -> Option<Entity> {
        self.players.get(name).copied().or(self.fallback)
    }

    /// Record the player animating one of `name`'s targets; the first binding wins
    pub fn bind(&mut self, name: &str, player: Entity) -> bool {
        if self.players.contains_key(name) {
            return false;
        }
        self.players.insert(name.to_string(), player);
        true
    }

    /// Start a clip on the model's animation player
    pub fn play(
        &self,
        name: &str,
        direction: PlaybackDirection,
        speed: f32,
        players: &mut Query<&mut AnimationPlayer>,
        clips: &Assets<AnimationClip>,
    ) {
        let Some(node) = self.nodes.get(name) else {
            tracing::warn!(clip = name, "Clip not in the model");
            return;
        };
        let Some(mut player) = self.player_for(name).and_then(|entity| players.get_mut(entity).ok()) else {
            tracing::warn!(clip = name, "No animation player yet; skipping clip");
            return;
        };

        let active = player.start(node.index);
        match direction {
            PlaybackDirection::Forward => {
                active.set_speed(speed);
            }
            PlaybackDirection::Reverse => {
                let duration = clips.get(&node.clip).map(|clip| clip.duration()).unwrap_or(0.0);
                active.set_speed(-speed).seek_to(duration);
            }
        }
    }
}

fn start_model_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<ViewerSettings>,
) {
    let path = settings.0.model.path.clone();
    tracing::info!("Loading model: {}", path);
    let handle: Handle<Gltf> = asset_server.load(path.clone());
    commands.insert_resource(ModelState {
        path,
        handle,
        status: ModelStatus::Loading,
    });
}

/// Spawn the scene, build the clip graph and start the viewer once the glTF is in
fn poll_model_load(
    mut commands: Commands,
    model: Option<ResMut<ModelState>>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
    mut library: ResMut<ClipLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let Some(mut model) = model else { return };
    if model.status != ModelStatus::Loading {
        return;
    }

    match asset_server.get_load_state(model.handle.id()) {
        Some(LoadState::Loaded) => {}
        Some(LoadState::Failed(err)) => {
            tracing::error!("Failed to load model {}: {}", model.path, err);
            model.status = ModelStatus::Failed(err.to_string());
            return;
        }
        _ => return,
    }

    let Some(gltf) = gltf_assets.get(&model.handle) else {
        return;
    };
    let Some(scene) = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
    else {
        tracing::error!("Model {} has no scenes", model.path);
        model.status = ModelStatus::Failed("the model contains no scene".to_string());
        return;
    };

    let config = &settings.0;
    commands.spawn((
        SceneRoot(scene),
        Transform::from_translation(config.model.offset)
            .with_rotation(Quat::from_rotation_y(config.model.yaw_degrees.to_radians())),
        SaunaModel,
    ));

    let (names, handles): (Vec<String>, Vec<Handle<AnimationClip>>) = gltf
        .named_animations
        .iter()
        .map(|(name, handle)| (name.to_string(), handle.clone()))
        .unzip();
    let (graph, indices) = AnimationGraph::from_clips(handles.iter().cloned());
    library.graph = Some(graphs.add(graph));
    library.nodes = names
        .iter()
        .cloned()
        .zip(indices.into_iter().zip(handles).map(|(index, clip)| ClipNode { index, clip }))
        .collect();
    tracing::info!(clips = ?names, "Model loaded: {}", model.path);

    let viewer = Viewer::new(config, EffectQueue::with_clips(names));
    spawn_markers(&mut commands, &viewer.machine, config, &mut meshes, &mut materials);
    commands.insert_resource(viewer);
    model.status = ModelStatus::Ready;
}

/// Tag model mesh nodes that belong to the configured shell group.
///
/// Only nodes carrying a mesh (on themselves or on their primitive children)
/// are tagged; a matching group node would hide its whole subtree.
fn tag_shell_meshes(
    mut commands: Commands,
    named: Query<(Entity, &Name, Has<Mesh3d>, Option<&Children>), Added<Name>>,
    meshes: Query<(), With<Mesh3d>>,
    settings: Res<ViewerSettings>,
) {
    let shell = &settings.0.shell;
    for (entity, name, is_mesh, children) in named.iter() {
        if !shell.matches(name.as_str()) {
            continue;
        }
        let holds_mesh = is_mesh
            || children.is_some_and(|children| children.iter().any(|child| meshes.contains(child)));
        if !holds_mesh {
            tracing::debug!(node = %name, "Skipping shell match without a mesh");
            continue;
        }
        tracing::debug!(node = %name, group = %shell.name, "Tagged shell mesh");
        commands.entity(entity).insert(ShellMesh {
            group: shell.name.clone(),
        });
    }
}

/// The glTF loader adds the player while the scene spawns; give it our graph
fn attach_animation_graph(
    mut commands: Commands,
    players: Query<Entity, Added<AnimationPlayer>>,
    mut library: ResMut<ClipLibrary>,
) {
    let Some(graph) = library.graph.clone() else {
        return;
    };
    for entity in players.iter() {
        commands.entity(entity).insert(AnimationGraphHandle(graph.clone()));
        match library.fallback {
            None => library.fallback = Some(entity),
            Some(first) if first != entity => {
                tracing::debug!(?entity, "Model has more than one animation player");
            }
            Some(_) => {}
        }
    }
}

/// Map each clip to the player that owns the nodes it animates
fn bind_clip_players(
    targets: Query<&AnimationTarget, Added<AnimationTarget>>,
    clips: Res<Assets<AnimationClip>>,
    mut library: ResMut<ClipLibrary>,
) {
    if targets.is_empty() || library.nodes.is_empty() {
        return;
    }
    let bindings: Vec<(String, Entity)> = library
        .nodes
        .iter()
        .filter(|(name, _)| !library.players.contains_key(name.as_str()))
        .filter_map(|(name, node)| {
            let clip = clips.get(&node.clip)?;
            targets
                .iter()
                .find(|target| clip.curves_for_target(target.id).is_some())
                .map(|target| (name.clone(), target.player))
        })
        .collect();
    for (name, player) in bindings {
        if library.bind(&name, player) {
            tracing::debug!(clip = %name, ?player, "Bound clip to its animation player");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sauna_core::ViewerConfig;

    fn app() -> App {
        let mut app = App::new();
        app.insert_resource(ViewerSettings(ViewerConfig::builtin().unwrap()))
            .add_systems(Update, tag_shell_meshes);
        app
    }

    fn tagged(app: &mut App) -> Vec<String> {
        let mut names: Vec<String> = app
            .world_mut()
            .query_filtered::<&Name, With<ShellMesh>>()
            .iter(app.world())
            .map(|name| name.to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_shell_tags_mesh_nodes_only() {
        let mut app = app();
        // A group node whose name matches, holding a mesh node and a plain node
        app.world_mut()
            .spawn(Name::new("Sphere_Group"))
            .with_children(|group| {
                group
                    .spawn(Name::new("Sphere"))
                    .with_children(|node| {
                        node.spawn(Mesh3d(Handle::default()));
                    });
                group.spawn(Name::new("Bench"));
            });
        app.world_mut()
            .spawn((Name::new("Sphere_Back_Trim"), Mesh3d(Handle::default())));
        app.update();

        assert_eq!(tagged(&mut app), vec!["Sphere", "Sphere_Back_Trim"]);
    }

    #[test]
    fn test_clip_players_prefer_bound_player() {
        let mut world = World::new();
        let door_player = world.spawn_empty().id();
        let light_player = world.spawn_empty().id();

        let mut library = ClipLibrary {
            fallback: Some(door_player),
            ..ClipLibrary::default()
        };
        assert_eq!(library.player_for("Light BottomAction"), Some(door_player));

        assert!(library.bind("Light BottomAction", light_player));
        assert!(!library.bind("Light BottomAction", door_player));
        assert_eq!(library.player_for("Light BottomAction"), Some(light_player));
        assert_eq!(library.player_for("ACT Sauna Front Glass Door"), Some(door_player));
    }
}
