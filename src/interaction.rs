//! Bevy systems wiring the transform control into a running app: camera and
//! target sync, cursor routing, screen-constant sizing and writing the
//! dragged transform back to the scene.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::camera::primitives::Aabb;
use bevy::window::PrimaryWindow;

use crate::control::TransformControl;
use crate::math::Box3;
use crate::types::{
    ActiveTarget, GizmoProportions, TransformControlCamera, TransformControlStyle,
};
use crate::util::{PickCamera, TargetProxy};

/// Configure gizmo rendering and build the handle layouts once at startup.
pub fn setup_control(
    mut control: ResMut<TransformControl>,
    mut config_store: ResMut<GizmoConfigStore>,
    style: Res<TransformControlStyle>,
    proportions: Res<GizmoProportions>,
) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line.width = style.line_width;
    config.depth_bias = style.depth_bias;

    control.build(&proportions);
}

/// Mirror the pick camera and the active target into the control.
///
/// While a drag is in progress the gizmo owns the target transform, so the
/// target side of the sync is skipped to avoid overwriting the drag.
#[allow(clippy::too_many_arguments)]
pub fn sync_control(
    mut control: ResMut<TransformControl>,
    cameras: Query<(&Camera, &GlobalTransform), With<TransformControlCamera>>,
    active: Query<Entity, With<ActiveTarget>>,
    transforms: Query<&Transform>,
    global_transforms: Query<&GlobalTransform>,
    children: Query<&Children>,
    parents: Query<&ChildOf>,
    bounds: Query<&Aabb>,
) {
    if let Some((camera, camera_transform)) = cameras.iter().next() {
        let world_from_view = Mat4::from_rotation_translation(
            camera_transform.rotation(),
            camera_transform.translation(),
        );
        control.set_camera(PickCamera::from_matrices(
            world_from_view,
            camera.clip_from_view(),
        ));
    }

    if control.is_transforming() {
        return;
    }

    let Some(entity) = active.iter().next() else {
        if control.enabled() {
            control.unset_target();
        }
        return;
    };

    let Ok(transform) = transforms.get(entity) else {
        return;
    };
    let Ok(target_global) = global_transforms.get(entity) else {
        return;
    };

    // Subtree bounds, expressed in the target's local space.
    let world_from_target = target_global.affine();
    let target_from_world = world_from_target.inverse();
    let mut local_bounds = Box3::EMPTY;
    let mut expand = |entity: Entity| {
        let (Ok(aabb), Ok(global)) = (bounds.get(entity), global_transforms.get(entity)) else {
            return;
        };
        let aabb_bounds = Box3::from_center_half_extents(
            Vec3::from(aabb.center),
            Vec3::from(aabb.half_extents),
        );
        local_bounds.union(&aabb_bounds.transformed(&(target_from_world * global.affine())));
    };
    expand(entity);
    for descendant in children.iter_descendants(entity) {
        expand(descendant);
    }

    // Decomposed ancestor chain, nearest parent first.
    let ancestors: Vec<Transform> = parents
        .iter_ancestors(entity)
        .filter_map(|ancestor| transforms.get(ancestor).ok().copied())
        .collect();

    let changed = control.target_entity() != Some(entity);
    control.set_target(
        TargetProxy::new(entity, *transform, local_bounds, ancestors),
        changed,
    );
}

/// Keep the gizmo handles a constant apparent size on screen.
pub fn update_scale_factor(
    mut control: ResMut<TransformControl>,
    cameras: Query<&GlobalTransform, With<TransformControlCamera>>,
    style: Res<TransformControlStyle>,
) {
    if !control.enabled() {
        return;
    }
    let Some(camera_transform) = cameras.iter().next() else {
        return;
    };
    let distance = camera_transform
        .translation()
        .distance(control.gizmo().core.position());
    control.set_scale_factor(distance * style.screen_size_factor);
}

/// Route the primary pointer to the control as normalized device
/// coordinates.
pub fn pointer_input(
    mut control: ResMut<TransformControl>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Some(window) = windows.iter().next() else {
        return;
    };

    if buttons.just_released(MouseButton::Left) {
        control.on_mouse_up(Vec2::ZERO);
        return;
    }

    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if size.x <= 0.0 || size.y <= 0.0 {
        return;
    }
    // Cursor y grows downward; NDC y grows upward.
    let ndc = Vec2::new(
        cursor.x / size.x * 2.0 - 1.0,
        1.0 - cursor.y / size.y * 2.0,
    );

    if buttons.just_pressed(MouseButton::Left) {
        control.on_mouse_down(ndc);
    } else if buttons.pressed(MouseButton::Left) {
        control.on_mouse_move(ndc);
    }
}

/// Write the dragged transform back to the target entity.
pub fn apply_target(control: Res<TransformControl>, mut transforms: Query<&mut Transform>) {
    if !control.is_transforming() {
        return;
    }
    let Some((entity, transform)) = control.target_transform() else {
        return;
    };
    if let Ok(mut target) = transforms.get_mut(entity) {
        *target = transform;
    }
}
