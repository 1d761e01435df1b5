//! The scale gizmo: side plates, corner plates and a top cone, laid out
//! around the target's measured footprint.
//!
//! Unlike the other gizmos this one is sized in world units: its handles sit
//! on the target's bounding box, so their extents and positions are rebuilt
//! whenever the measured dimension changes. The gizmo origin sits at the
//! bounding box bottom-center, and `dimension.y` is stored doubled so that
//! `dimension[axis] / 2` is the origin-to-handle distance on every axis.

use bevy::log::{debug, warn};
use bevy::prelude::*;

use crate::gizmo::{GizmoBehavior, GizmoCore, Handle, HandleShape};
use crate::math::{Line3, LINE_HALF_LENGTH};
use crate::types::{Axis3, GizmoAxis, GizmoProportions, GizmoUpdate};
use crate::util::GizmoUtil;

/// Drag-start state for one scale gesture.
struct ScaleDragStart {
    /// Cardinal axis of a single-axis drag, `None` for diagonals.
    axis: Option<Axis3>,
    /// World-space unit direction of a single-axis drag, grab side folded in.
    direction: Vec3,
    /// World-space point that must stay fixed while scaling.
    anchor: Vec3,
    /// Cursor slack between the pick point and the handle reference.
    offset: f32,
    /// Origin-to-handle distance at drag start; the scale denominator.
    reference: f32,
}

impl Default for ScaleDragStart {
    fn default() -> Self {
        Self {
            axis: None,
            direction: Vec3::X,
            anchor: Vec3::ZERO,
            offset: 0.0,
            reference: 0.0,
        }
    }
}

/// Scales the target along one axis, or uniformly from a footprint corner.
pub struct ScaleGizmo {
    handles: Vec<Handle>,
    dimension: Vec3,
    handle_width: f32,
    top_height: f32,
    top_radius: f32,
    /// World-space infinite lines along the two footprint diagonals.
    diag_lines: [Line3; 2],
    drag: ScaleDragStart,
}

impl ScaleGizmo {
    /// Creates an unbuilt scale gizmo.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            dimension: Vec3::ZERO,
            handle_width: 0.1,
            top_height: 0.3,
            top_radius: 0.15,
            diag_lines: [Line3::default(); 2],
            drag: ScaleDragStart::default(),
        }
    }

    /// The last measured target dimension (y doubled).
    pub fn dimension(&self) -> Vec3 {
        self.dimension
    }

    fn rebuild_handles(&mut self) {
        let dim = self.dimension;
        let hw = self.handle_width;
        let half = hw * 0.5;
        let x_distance = (dim.x + hw) * 0.5;
        let y_distance = dim.y * 0.5;
        let z_distance = (dim.z + hw) * 0.5;

        self.handles.clear();

        // Side plates span the opposite footprint extent.
        let x_plate = Vec3::new(half, half, dim.z * 0.5);
        let z_plate = Vec3::new(dim.x * 0.5, half, half);
        self.handles.push(Handle::new(
            GizmoAxis::X,
            HandleShape::Box {
                center: Vec3::new(x_distance, 0.0, 0.0),
                half_extents: x_plate,
            },
        ));
        self.handles.push(Handle::new(
            GizmoAxis::XNeg,
            HandleShape::Box {
                center: Vec3::new(-x_distance, 0.0, 0.0),
                half_extents: x_plate,
            },
        ));
        self.handles.push(Handle::new(
            GizmoAxis::Z,
            HandleShape::Box {
                center: Vec3::new(0.0, 0.0, z_distance),
                half_extents: z_plate,
            },
        ));
        self.handles.push(Handle::new(
            GizmoAxis::ZNeg,
            HandleShape::Box {
                center: Vec3::new(0.0, 0.0, -z_distance),
                half_extents: z_plate,
            },
        ));

        // Corner plates, tagged with the diagonal they drag.
        let corner = Vec3::splat(half);
        for (axis, x, z) in [
            (GizmoAxis::DiagXz1, x_distance, z_distance),
            (GizmoAxis::DiagXz2, x_distance, -z_distance),
            (GizmoAxis::DiagXz2Neg, -x_distance, z_distance),
            (GizmoAxis::DiagXz1Neg, -x_distance, -z_distance),
        ] {
            self.handles.push(Handle::new(
                axis,
                HandleShape::Box {
                    center: Vec3::new(x, 0.0, z),
                    half_extents: corner,
                },
            ));
        }

        // Top cone, picked as a sphere around its midpoint.
        self.handles.push(Handle::new(
            GizmoAxis::Y,
            HandleShape::Sphere {
                center: Vec3::new(0.0, y_distance + self.top_height * 0.5, 0.0),
                radius: self.top_radius.max(self.top_height * 0.5),
            },
        ));
    }

    fn rebuild_diag_lines(&mut self, core: &GizmoCore) {
        let half_x = self.dimension.x * 0.5;
        let half_z = self.dimension.z * 0.5;
        for (slot, local) in [
            (0, Vec3::new(half_x, 0.0, half_z)),
            (1, Vec3::new(half_x, 0.0, -half_z)),
        ] {
            let dir = core.rotation() * local.normalize_or_zero();
            self.diag_lines[slot] = Line3::new(
                core.position() - dir * LINE_HALF_LENGTH,
                core.position() + dir * LINE_HALF_LENGTH,
            );
        }
    }

    /// Measures the target dimension: the bounding box size with y doubled,
    /// since the gizmo origin sits at the bottom-center. Pivoted scaling
    /// measures the target alone with its rotation kept; otherwise the
    /// simulated ancestor chain is applied with the rotation neutralized.
    fn measure_dimension(util: &GizmoUtil) -> Option<Vec3> {
        let bounds = if util.pivoted {
            util.target().solo_bounds()
        } else {
            util.target().world_bounds_unrotated()
        };
        let mut size = bounds.size();
        size.y *= 2.0;
        if !size.is_finite() || size.min_element() <= 0.0 {
            warn!("scale gizmo: degenerate target dimension {size}");
            return None;
        }
        Some(size)
    }
}

impl Default for ScaleGizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl GizmoBehavior for ScaleGizmo {
    fn build(&mut self, proportions: &GizmoProportions) {
        self.handle_width = proportions.scale_handle_width;
        self.top_height = proportions.scale_top_height;
        self.top_radius = proportions.scale_top_radius;
        self.rebuild_handles();
    }

    fn handles(&self) -> &[Handle] {
        &self.handles
    }

    // Handles are laid out in world units on the target's bounding box, so
    // the screen-constant factor must not stretch them.
    fn pick_scale(&self, _core: &GizmoCore) -> f32 {
        1.0
    }

    fn get_axis_point(&self, core: &GizmoCore, util: &GizmoUtil) -> Option<Vec3> {
        match core.axis? {
            GizmoAxis::X => core.intersect_line3(util, Axis3::X),
            GizmoAxis::Y => core.intersect_line3(util, Axis3::Y),
            GizmoAxis::Z => core.intersect_line3(util, Axis3::Z),
            GizmoAxis::DiagXz1 => core.intersect_target_line3(util, &self.diag_lines[0]),
            GizmoAxis::DiagXz2 => core.intersect_target_line3(util, &self.diag_lines[1]),
            _ => None,
        }
    }

    fn setup_drag(&mut self, core: &mut GizmoCore, _util: &GizmoUtil) -> bool {
        let to_pick = core.drag_point - core.position();
        let distance = to_pick.length();

        match core.axis {
            Some(GizmoAxis::X) | Some(GizmoAxis::Y) | Some(GizmoAxis::Z) => {
                let axis = match core.axis {
                    Some(GizmoAxis::X) => Axis3::X,
                    Some(GizmoAxis::Y) => Axis3::Y,
                    _ => Axis3::Z,
                };
                let world_axis = core.rotation() * axis.to_vec3();
                let side = if to_pick.dot(world_axis) < 0.0 { -1.0 } else { 1.0 };
                let reference = axis.component(self.dimension) * 0.5;

                self.drag = ScaleDragStart {
                    axis: Some(axis),
                    direction: world_axis * side,
                    anchor: core.position() + world_axis * side * reference,
                    offset: distance - reference,
                    reference,
                };
            }
            Some(GizmoAxis::DiagXz1) | Some(GizmoAxis::DiagXz2) => {
                let half_x = self.dimension.x * 0.5;
                let half_z = self.dimension.z * 0.5;
                let reference = half_x.hypot(half_z);
                let world_x = core.rotation() * Vec3::X;
                let world_z = core.rotation() * Vec3::Z;
                let side_x = if to_pick.dot(world_x) < 0.0 { -1.0 } else { 1.0 };
                let side_z = if to_pick.dot(world_z) < 0.0 { -1.0 } else { 1.0 };
                let corner = Vec3::new(side_x * half_x, 0.0, side_z * half_z);

                self.drag = ScaleDragStart {
                    axis: None,
                    direction: Vec3::ZERO,
                    anchor: core.position() + core.rotation() * corner,
                    offset: distance - reference,
                    reference,
                };
            }
            _ => return false,
        }

        self.drag.reference > 0.0
    }

    fn transform_target(&mut self, core: &mut GizmoCore, util: &mut GizmoUtil) -> bool {
        if util.pivoted {
            // Pivoted scaling is not wired up yet; report success without
            // touching the target so the gesture stays inert.
            debug!("scale gizmo: pivoted drag ignored");
            return true;
        }

        let distance = (core.drag_point - core.position()).length();
        let factor = (distance - self.drag.offset) / self.drag.reference;
        if !factor.is_finite() {
            return false;
        }

        let initial = core.initial_transform;
        let target = util.target_mut();
        target.transform.scale = initial.scale;

        match self.drag.axis {
            Some(axis) => {
                axis.scale_component(&mut target.transform.scale, factor);
                // Slide the origin so the grabbed face plane stays fixed.
                let along = (initial.translation - self.drag.anchor).dot(self.drag.direction);
                target.transform.translation =
                    initial.translation + self.drag.direction * along * (factor - 1.0);
            }
            None => {
                target.transform.scale = initial.scale * factor;
                // Uniform scale about the grabbed footprint corner.
                target.transform.translation = initial.translation
                    + (initial.translation - self.drag.anchor) * (factor - 1.0);
            }
        }
        true
    }

    fn set_from_target(
        &mut self,
        core: &mut GizmoCore,
        util: &GizmoUtil,
        update: GizmoUpdate,
    ) -> bool {
        if update == GizmoUpdate::Rotate {
            return true;
        }

        let Some(size) = Self::measure_dimension(util) else {
            return false;
        };

        if update == GizmoUpdate::Drag {
            self.dimension = size;
            self.rebuild_handles();
            self.rebuild_diag_lines(core);
            return true;
        }

        // Full refresh: the gizmo origin is the bounding box bottom-center,
        // swung around the target's world position by its rotation.
        let target = util.target();
        let rotation = target.transform.rotation;
        let bounds = if util.pivoted {
            target.solo_bounds()
        } else {
            target.world_bounds_unrotated()
        };
        let mut origin = bounds.center();
        origin.y = bounds.min.y;
        let pivot = target.world_position();
        let origin = pivot + rotation * (origin - pivot);

        core.set(origin, rotation);
        self.dimension = size;
        self.rebuild_handles();
        self.rebuild_diag_lines(core);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::Gizmo;
    use crate::math::Box3;
    use approx::assert_relative_eq;
    use bevy::math::{Dir3, Ray3d};

    fn ray(origin: Vec3, dir: Vec3) -> Ray3d {
        Ray3d {
            origin,
            direction: Dir3::new(dir).unwrap(),
        }
    }

    fn built_gizmo() -> Gizmo {
        let mut gizmo = Gizmo::new(Box::new(ScaleGizmo::new()));
        gizmo.build(&GizmoProportions::default());
        gizmo
    }

    /// A 2x1x2 box resting on the ground plane, origin at its bottom-center.
    fn grounded_target(util: &mut GizmoUtil) {
        let proxy = util.target_mut();
        proxy.local_bounds = Box3 {
            min: Vec3::new(-1.0, 0.0, -1.0),
            max: Vec3::new(1.0, 1.0, 1.0),
        };
        proxy.transform = Transform::IDENTITY;
    }

    #[test]
    fn full_refresh_measures_doubled_height() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));
        assert!(gizmo.core.position().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn side_drag_scales_one_axis_and_fixes_grab_plane() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));

        // Grab the +X side plate at x = (2 + 0.1) / 2, from above.
        util.set_ray(ray(Vec3::new(1.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));

        // Double the cursor distance from the gizmo origin.
        util.set_ray(ray(Vec3::new(2.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.drag(&mut util));

        let transform = util.target().transform;
        assert_relative_eq!(transform.scale.x, 2.0, epsilon = 1e-3);
        assert_relative_eq!(transform.scale.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(transform.translation.x, -1.0, epsilon = 1e-3);
        // The +X face stays on the grabbed plane.
        assert_relative_eq!(
            util.target().world_bounds().max.x,
            1.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn negative_side_handle_drags_same_axis() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));

        util.set_ray(ray(Vec3::new(-1.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));

        util.set_ray(ray(Vec3::new(-2.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.drag(&mut util));

        let transform = util.target().transform;
        assert_relative_eq!(transform.scale.x, 2.0, epsilon = 1e-3);
        // Grabbed from -X: that face stays put instead.
        assert_relative_eq!(transform.translation.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(
            util.target().world_bounds().min.x,
            -1.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn corner_drag_scales_uniformly_about_corner() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));

        // Grab the (+X, +Z) corner plate from above.
        util.set_ray(ray(Vec3::new(1.05, 5.0, 1.05), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::DiagXz1));

        util.set_ray(ray(Vec3::new(2.05, 5.0, 2.05), Vec3::NEG_Y));
        assert!(gizmo.drag(&mut util));

        let transform = util.target().transform;
        assert!(transform.scale.abs_diff_eq(Vec3::splat(2.0), 1e-3));
        assert!(transform
            .translation
            .abs_diff_eq(Vec3::new(-1.0, 0.0, -1.0), 1e-3));
        // The grabbed corner stays fixed.
        let bounds = util.target().world_bounds();
        assert_relative_eq!(bounds.max.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(bounds.max.z, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn top_cone_scales_height() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));

        // Top cone sits above dimension.y / 2 = 1.
        util.set_ray(ray(Vec3::new(0.0, 1.15, 10.0), Vec3::NEG_Z));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::Y));

        util.set_ray(ray(Vec3::new(0.0, 2.15, 10.0), Vec3::NEG_Z));
        assert!(gizmo.drag(&mut util));

        let transform = util.target().transform;
        assert_relative_eq!(transform.scale.y, 2.0, epsilon = 1e-3);
        // Grab anchor is the top plane at y = 1.
        assert_relative_eq!(transform.translation.y, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn degenerate_target_rejects_refresh_and_drag() {
        let mut util = GizmoUtil::new();
        // Placeholder target: empty bounds.
        let mut gizmo = built_gizmo();
        assert!(!gizmo.set_from_target(&util, GizmoUpdate::Full));

        // Even with a manual pick the zero reference refuses the drag.
        util.set_ray(ray(Vec3::new(0.05, 0.0, 10.0), Vec3::NEG_Z));
        assert!(!gizmo.initialize_drag(&util));
    }

    #[test]
    fn pivoted_drag_leaves_target_untouched() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));

        util.pivoted = true;
        util.set_ray(ray(Vec3::new(1.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        util.set_ray(ray(Vec3::new(2.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.drag(&mut util));

        let transform = util.target().transform;
        assert!(transform.scale.abs_diff_eq(Vec3::ONE, 1e-6));
        assert!(transform.translation.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn ancestor_scale_feeds_measured_dimension() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        util.target_mut().ancestors = vec![Transform {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(3.0),
        }];

        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));
        // Footprint 6x6, height 3 doubled.
        util.set_ray(ray(Vec3::new(3.05, 5.0, 0.0), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));
    }

    #[test]
    fn rotated_target_drags_in_its_own_frame() {
        let mut util = GizmoUtil::new();
        grounded_target(&mut util);
        // Quarter turn about Y: local +X now points along world -Z.
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        util.target_mut().transform.rotation = rotation;

        let mut gizmo = built_gizmo();
        assert!(gizmo.set_from_target(&util, GizmoUpdate::Full));
        assert!(gizmo.core.rotation().abs_diff_eq(rotation, 1e-5));

        // The +X plate now sits at world z = -1.05; pick it from above.
        util.set_ray(ray(Vec3::new(0.0, 5.0, -1.05), Vec3::NEG_Y));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));

        util.set_ray(ray(Vec3::new(0.0, 5.0, -2.05), Vec3::NEG_Y));
        assert!(gizmo.drag(&mut util));
        assert_relative_eq!(util.target().transform.scale.x, 2.0, epsilon = 1e-3);
    }
}
