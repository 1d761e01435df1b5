//! Nested target demo.
//!
//! The manipulated cube lives under a rotated, scaled parent, exercising
//! the hierarchy-aware bounds measurement of the scale gizmo. Use T/R/S to
//! switch modes and Tab to move the gizmo between the child and a free
//! cube.

use bevy::prelude::*;
use bevy_transform_controls::{
    ActiveTarget, GizmoMode, TransformControl, TransformControlCamera, TransformControlPlugin,
    TransformTarget,
};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(TransformControlPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (keyboard_controls, cycle_target))
        .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(8.0, 7.0, 12.0).looking_at(Vec3::ZERO, Vec3::Y),
        TransformControlCamera,
    ));

    // Light
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 15.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Ground
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(12.0)))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.3, 0.2))),
    ));

    // A rotated, scaled parent with the gizmo target as its child.
    let cube = meshes.add(Cuboid::from_length(1.0));
    commands
        .spawn((
            Transform::from_xyz(-2.0, 0.0, 0.0)
                .with_rotation(Quat::from_rotation_y(0.5))
                .with_scale(Vec3::splat(1.5)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(cube.clone()),
                MeshMaterial3d(materials.add(Color::srgb(0.9, 0.6, 0.2))),
                Transform::from_xyz(0.0, 0.5, 0.0),
                TransformTarget,
                ActiveTarget,
            ));
        });

    // A free-standing cube to Tab over to.
    commands.spawn((
        Mesh3d(cube),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.7, 1.0))),
        Transform::from_xyz(3.0, 0.5, 1.0),
        TransformTarget,
    ));
}

fn keyboard_controls(keys: Res<ButtonInput<KeyCode>>, mut control: ResMut<TransformControl>) {
    if keys.just_pressed(KeyCode::KeyT) {
        control.change_mode(GizmoMode::Translate);
    }
    if keys.just_pressed(KeyCode::KeyR) {
        control.change_mode(GizmoMode::Rotate);
    }
    if keys.just_pressed(KeyCode::KeyS) {
        control.change_mode(GizmoMode::Scale);
    }
}

fn cycle_target(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    active: Query<Entity, With<ActiveTarget>>,
    targets: Query<Entity, With<TransformTarget>>,
) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }

    let all: Vec<Entity> = targets.iter().collect();
    if all.is_empty() {
        return;
    }
    let current = active.iter().next();
    let next_index = current
        .and_then(|entity| all.iter().position(|&e| e == entity))
        .map(|i| (i + 1) % all.len())
        .unwrap_or(0);

    if let Some(entity) = current {
        commands.entity(entity).remove::<ActiveTarget>();
    }
    commands.entity(all[next_index]).insert(ActiveTarget);
}
