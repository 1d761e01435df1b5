//! The transform control facade: one gizmo per mode, shared state, pointer
//! routing and target lifecycle.

use bevy::prelude::*;

use crate::gizmo::Gizmo;
use crate::rotate::RotateGizmo;
use crate::scale::ScaleGizmo;
use crate::translate::TranslateGizmo;
use crate::types::{GizmoMode, GizmoProportions, GizmoUpdate};
use crate::util::{GizmoUtil, PickCamera, TargetProxy};

/// Owns the three gizmos and routes pointer input to the active one.
///
/// Input is accepted only after [`TransformControl::build`] has run and
/// while a real target is set. The pointer protocol is
/// down → move* → up; a move without a successful down is ignored.
#[derive(Resource)]
pub struct TransformControl {
    util: GizmoUtil,
    translate: Gizmo,
    rotate: Gizmo,
    scale: Gizmo,
    mode: GizmoMode,
    dragging: bool,
    enabled: bool,
    built: bool,
}

impl TransformControl {
    /// Creates the control with no target and unbuilt gizmos.
    pub fn new() -> Self {
        Self {
            util: GizmoUtil::new(),
            translate: Gizmo::new(Box::new(TranslateGizmo::new())),
            rotate: Gizmo::new(Box::new(RotateGizmo::new())),
            scale: Gizmo::new(Box::new(ScaleGizmo::new())),
            mode: GizmoMode::Translate,
            dragging: false,
            enabled: false,
            built: false,
        }
    }

    /// Lays out every gizmo's handles. Must be called once before any
    /// pointer input is accepted.
    pub fn build(&mut self, proportions: &GizmoProportions) {
        self.translate.build(proportions);
        self.rotate.build(proportions);
        self.scale.build(proportions);
        self.built = true;
        self.refresh();
    }

    fn active(&mut self) -> (&mut Gizmo, &mut GizmoUtil) {
        let gizmo = match self.mode {
            GizmoMode::Translate => &mut self.translate,
            GizmoMode::Rotate => &mut self.rotate,
            GizmoMode::Scale => &mut self.scale,
        };
        (gizmo, &mut self.util)
    }

    fn refresh(&mut self) {
        let (gizmo, util) = self.active();
        gizmo.update_scale_factor(util);
        gizmo.set_from_target(util, GizmoUpdate::Full);
    }

    /// Pointer press at `ndc`. Starts a drag when a handle is under the
    /// cursor.
    pub fn on_mouse_down(&mut self, ndc: Vec2) {
        if !self.enabled || !self.built {
            return;
        }
        let (gizmo, util) = self.active();
        if !util.set_raycaster(ndc) {
            return;
        }
        self.dragging = gizmo.initialize_drag(util);
    }

    /// Pointer move at `ndc`. Applies one drag sample; ignored unless a
    /// drag is in progress.
    pub fn on_mouse_move(&mut self, ndc: Vec2) {
        if !self.dragging {
            return;
        }
        let (gizmo, util) = self.active();
        if !util.set_raycaster(ndc) {
            return;
        }
        self.dragging = gizmo.drag(util);
    }

    /// Pointer release. Closes the drag session.
    pub fn on_mouse_up(&mut self, _ndc: Vec2) {
        self.dragging = false;
        let (gizmo, _) = self.active();
        gizmo.end_drag();
    }

    /// Switches the active gizmo, re-deriving its geometry from the target
    /// so it never lags a frame.
    pub fn change_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
        self.refresh();
    }

    /// Current mode.
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Sets a new target. With `update_rotation` the gizmo frame aligns to
    /// the target's rotation; otherwise the current base rotation is kept.
    pub fn set_target(&mut self, target: TargetProxy, update_rotation: bool) {
        self.util.set_target(target);
        if update_rotation {
            self.rotate_by_target(false);
        }
        self.refresh();
        self.enabled = true;
    }

    /// Drops the target, swapping in the placeholder and disabling input.
    pub fn unset_target(&mut self) {
        self.util.set_target(TargetProxy::placeholder());
        self.enabled = false;
        self.dragging = false;
        let (gizmo, _) = self.active();
        gizmo.end_drag();
    }

    /// Sets the base-rotation frame the gizmos are rendered in.
    pub fn set_rotation(&mut self, rotation: Quat, update: bool) {
        self.util.set_base_rotation(rotation);
        if update {
            let (gizmo, util) = self.active();
            gizmo.set_from_target(util, GizmoUpdate::Rotate);
        }
    }

    /// Aligns the base rotation to the target's current rotation.
    pub fn rotate_by_target(&mut self, update: bool) {
        let rotation = self.util.target().transform.rotation;
        self.set_rotation(rotation, update);
    }

    /// Resets the base rotation to the world axes.
    pub fn rotate_to_align_axes(&mut self, update: bool) {
        self.set_rotation(Quat::IDENTITY, update);
    }

    /// The current base rotation.
    pub fn rotation(&self) -> Quat {
        self.util.base_rotation()
    }

    /// Updates the screen-constant handle scale.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.util.scale_factor = scale_factor;
        let (gizmo, util) = self.active();
        gizmo.update_scale_factor(util);
    }

    /// Switches between anchor-plane and pivoted scaling.
    pub fn set_pivoted(&mut self, pivoted: bool) {
        self.util.pivoted = pivoted;
        self.refresh();
    }

    /// Replaces the pick camera frame.
    pub fn set_camera(&mut self, camera: PickCamera) {
        self.util.set_camera(camera);
    }

    /// Whether a drag is in progress.
    pub fn is_transforming(&self) -> bool {
        self.dragging
    }

    /// Whether a real target is set.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The target entity, or `None` when disabled.
    pub fn target_entity(&self) -> Option<Entity> {
        if self.enabled {
            self.util.target().entity
        } else {
            None
        }
    }

    /// The target's entity and current transform, for writing back to the
    /// scene. `None` when disabled.
    pub fn target_transform(&self) -> Option<(Entity, Transform)> {
        if !self.enabled {
            return None;
        }
        let target = self.util.target();
        Some((target.entity?, target.transform))
    }

    /// Shared state, for rendering.
    pub fn util(&self) -> &GizmoUtil {
        &self.util
    }

    /// The active gizmo, for rendering.
    pub fn gizmo(&self) -> &Gizmo {
        match self.mode {
            GizmoMode::Translate => &self.translate,
            GizmoMode::Rotate => &self.rotate,
            GizmoMode::Scale => &self.scale,
        }
    }
}

impl Default for TransformControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Box3;
    use crate::util::tests::test_camera;

    /// Ortho test camera spans x,y in [-5, 5]: world = ndc * 5.
    fn world_to_ndc(world: Vec2) -> Vec2 {
        world / 5.0
    }

    fn control_with_target() -> TransformControl {
        let mut control = TransformControl::new();
        control.set_camera(test_camera(Vec3::new(0.0, 0.0, 10.0)));
        control.build(&GizmoProportions::default());
        control.set_target(
            TargetProxy {
                entity: None,
                transform: Transform::IDENTITY,
                local_bounds: Box3::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
                ancestors: Vec::new(),
            },
            false,
        );
        control
    }

    #[test]
    fn input_rejected_before_build_or_without_target() {
        let mut unbuilt = TransformControl::new();
        unbuilt.set_camera(test_camera(Vec3::new(0.0, 0.0, 10.0)));
        unbuilt.on_mouse_down(Vec2::ZERO);
        assert!(!unbuilt.is_transforming());

        let mut untargeted = TransformControl::new();
        untargeted.set_camera(test_camera(Vec3::new(0.0, 0.0, 10.0)));
        untargeted.build(&GizmoProportions::default());
        untargeted.on_mouse_down(Vec2::ZERO);
        assert!(!untargeted.is_transforming());
        assert!(untargeted.target_entity().is_none());
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut control = control_with_target();
        control.on_mouse_move(world_to_ndc(Vec2::new(2.2, 0.0)));
        assert!(!control.is_transforming());
        assert!(control
            .util
            .target()
            .transform
            .translation
            .abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn translate_drag_through_pointer_protocol() {
        let mut control = control_with_target();

        // Grab the X arrow tip at x = 2.2 and pull it to x = 4.2.
        control.on_mouse_down(world_to_ndc(Vec2::new(2.2, 0.0)));
        assert!(control.is_transforming());
        control.on_mouse_move(world_to_ndc(Vec2::new(4.2, 0.0)));
        assert!(control.is_transforming());
        control.on_mouse_up(Vec2::ZERO);
        assert!(!control.is_transforming());

        assert!(control
            .util
            .target()
            .transform
            .translation
            .abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn mode_switch_keeps_target_and_realigns_gizmo() {
        let mut control = control_with_target();
        let before = control.util.target().transform;

        control.change_mode(GizmoMode::Scale);
        control.change_mode(GizmoMode::Rotate);
        control.change_mode(GizmoMode::Translate);

        let after = control.util.target().transform;
        assert!(after.translation.abs_diff_eq(before.translation, 1e-6));
        assert!(after.rotation.abs_diff_eq(before.rotation, 1e-6));
        assert!(after.scale.abs_diff_eq(before.scale, 1e-6));
        assert!(control.gizmo().core.position().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn unset_target_disables_and_cancels_drag() {
        let mut control = control_with_target();
        control.on_mouse_down(world_to_ndc(Vec2::new(2.2, 0.0)));
        assert!(control.is_transforming());

        control.unset_target();
        assert!(!control.is_transforming());
        assert!(!control.enabled());
        assert!(control.target_transform().is_none());

        // Further input stays dead until a new target arrives.
        control.on_mouse_down(world_to_ndc(Vec2::new(2.2, 0.0)));
        assert!(!control.is_transforming());
    }

    #[test]
    fn base_rotation_controls_gizmo_frame() {
        let mut control = control_with_target();
        let quarter = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        control.set_rotation(quarter, true);
        assert!(control.gizmo().core.rotation().abs_diff_eq(quarter, 1e-5));

        control.rotate_to_align_axes(true);
        assert!(control
            .gizmo()
            .core
            .rotation()
            .abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn set_target_can_adopt_target_rotation() {
        let mut control = TransformControl::new();
        control.set_camera(test_camera(Vec3::new(0.0, 0.0, 10.0)));
        control.build(&GizmoProportions::default());

        let rotation = Quat::from_rotation_z(0.5);
        control.set_target(
            TargetProxy {
                entity: None,
                transform: Transform::from_rotation(rotation),
                local_bounds: Box3::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)),
                ancestors: Vec::new(),
            },
            true,
        );
        assert!(control.rotation().abs_diff_eq(rotation, 1e-5));
        assert!(control.gizmo().core.rotation().abs_diff_eq(rotation, 1e-5));
    }

    #[test]
    fn set_from_target_is_idempotent() {
        let mut control = control_with_target();
        let position = control.gizmo().core.position();
        control.refresh();
        control.refresh();
        assert!(control.gizmo().core.position().abs_diff_eq(position, 1e-6));
    }
}
