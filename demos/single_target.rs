//! Single target demo.
//!
//! One cube carries the gizmo. Use T/R/S to switch modes, L to align the
//! gizmo frame to the target, A to align it to the world axes, P to toggle
//! pivoted scaling.

use bevy::prelude::*;
use bevy_transform_controls::{
    ActiveTarget, GizmoMode, TransformControl, TransformControlCamera, TransformControlPlugin,
    TransformTarget,
};

#[derive(Component)]
struct Hud;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(TransformControlPlugin)
        .add_systems(Startup, setup)
        .add_systems(Update, (keyboard_controls, update_hud))
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
        Transform::from_xyz(6.0, 6.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
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
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(10.0)))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.35, 0.18))),
    ));

    // Cube with the control attached
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_length(1.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.2, 0.7, 1.0))),
        Transform::from_xyz(0.0, 0.5, 0.0),
        TransformTarget,
        ActiveTarget,
    ));

    // HUD
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                left: Val::Px(10.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ))
        .with_children(|p| {
            p.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Hud,
            ));
        });
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
    if keys.just_pressed(KeyCode::KeyL) {
        control.rotate_by_target(true);
    }
    if keys.just_pressed(KeyCode::KeyA) {
        control.rotate_to_align_axes(true);
    }
    if keys.just_pressed(KeyCode::KeyP) {
        let pivoted = control.util().pivoted;
        control.set_pivoted(!pivoted);
    }
}

fn update_hud(control: Res<TransformControl>, mut query: Query<&mut Text, With<Hud>>) {
    let Ok(mut text) = query.single_mut() else {
        return;
    };

    text.0 = format!(
        "Mode: {} | Pivoted: {}\n\n\
         [T] Translate [R] Rotate [S] Scale\n\
         [L] Align to target [A] Align to world\n\
         [P] Toggle pivoted scaling",
        control.mode(),
        control.util().pivoted,
    );
}
