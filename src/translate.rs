//! The translation gizmo: directional arrows, planar squares and a free
//! center handle.

use bevy::prelude::*;

use crate::gizmo::{GizmoBehavior, GizmoCore, Handle, HandleShape};
use crate::types::{Axis3, GizmoAxis, GizmoProportions, GizmoUpdate};
use crate::util::GizmoUtil;

/// Moves the target along one axis or within one plane.
///
/// Directional drags resolve the cursor against the gizmo's infinite
/// reference line for that axis; planar drags against the matching axis
/// plane. The free center handle is pickable but resolves to no point, so
/// grabbing it starts no drag.
pub struct TranslateGizmo {
    handles: Vec<Handle>,
    start_point: Vec3,
}

impl TranslateGizmo {
    /// Creates an unbuilt translation gizmo.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            start_point: Vec3::ZERO,
        }
    }
}

impl Default for TranslateGizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl GizmoBehavior for TranslateGizmo {
    fn build(&mut self, proportions: &GizmoProportions) {
        self.handles.clear();

        // Pick spheres over the arrow cones at the axis ends.
        let tip = proportions.axis_length + proportions.cone_length * 0.5;
        for axis in Axis3::ALL {
            let gizmo_axis = match axis {
                Axis3::X => GizmoAxis::X,
                Axis3::Y => GizmoAxis::Y,
                Axis3::Z => GizmoAxis::Z,
            };
            self.handles.push(Handle::new(
                gizmo_axis,
                HandleShape::Sphere {
                    center: axis.to_vec3() * tip,
                    radius: proportions.translate_hit_radius,
                },
            ));
        }

        // Thin plates for the planar squares, offset into each quadrant.
        let offset = proportions.plane_offset + proportions.plane_size * 0.5;
        let half = proportions.plane_size * 0.5;
        let thickness = proportions.plane_thickness;
        self.handles.push(Handle::new(
            GizmoAxis::PlaneX,
            HandleShape::Box {
                center: Vec3::new(0.0, offset, offset),
                half_extents: Vec3::new(thickness, half, half),
            },
        ));
        self.handles.push(Handle::new(
            GizmoAxis::PlaneY,
            HandleShape::Box {
                center: Vec3::new(offset, 0.0, offset),
                half_extents: Vec3::new(half, thickness, half),
            },
        ));
        self.handles.push(Handle::new(
            GizmoAxis::PlaneZ,
            HandleShape::Box {
                center: Vec3::new(offset, offset, 0.0),
                half_extents: Vec3::new(half, half, thickness),
            },
        ));

        // Free handle at the origin. Pickable, but resolves to no axis
        // point, so it never opens a drag session.
        self.handles.push(Handle::new(
            GizmoAxis::Xyz,
            HandleShape::Sphere {
                center: Vec3::ZERO,
                radius: proportions.center_radius,
            },
        ));
    }

    fn handles(&self) -> &[Handle] {
        &self.handles
    }

    fn get_axis_point(&self, core: &GizmoCore, util: &GizmoUtil) -> Option<Vec3> {
        let axis = core.axis?;
        if let Some(normal) = axis.planar() {
            return core.intersect_plane(util, normal);
        }
        if let Some(direction) = axis.directional() {
            return core.intersect_line3(util, direction);
        }
        // The free center handle resolves to no point.
        None
    }

    fn setup_drag(&mut self, core: &mut GizmoCore, _util: &GizmoUtil) -> bool {
        self.start_point = core.drag_point;
        true
    }

    fn transform_target(&mut self, core: &mut GizmoCore, util: &mut GizmoUtil) -> bool {
        let offset = core.drag_point - self.start_point;
        util.target_mut().transform.translation = core.initial_transform.translation + offset;
        true
    }

    fn set_from_target(
        &mut self,
        core: &mut GizmoCore,
        util: &GizmoUtil,
        update: GizmoUpdate,
    ) -> bool {
        match update {
            GizmoUpdate::Drag => {
                core.set_position(util.target().world_bounds().center());
            }
            GizmoUpdate::Rotate => {
                core.set_rotation(util.base_rotation());
            }
            GizmoUpdate::Full => {
                core.set(
                    util.target().world_bounds().center(),
                    util.base_rotation(),
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::Gizmo;
    use crate::math::Box3;
    use bevy::math::{Dir3, Ray3d};

    fn ray(origin: Vec3, dir: Vec3) -> Ray3d {
        Ray3d {
            origin,
            direction: Dir3::new(dir).unwrap(),
        }
    }

    fn built_gizmo() -> Gizmo {
        let mut gizmo = Gizmo::new(Box::new(TranslateGizmo::new()));
        gizmo.build(&GizmoProportions::default());
        gizmo
    }

    fn unit_target(util: &mut GizmoUtil, translation: Vec3) {
        let proxy = util.target_mut();
        proxy.local_bounds = Box3::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5));
        proxy.transform = Transform::from_translation(translation);
    }

    #[test]
    fn x_axis_drag_moves_only_x() {
        let mut util = GizmoUtil::new();
        unit_target(&mut util, Vec3::ZERO);
        let mut gizmo = built_gizmo();
        gizmo.set_from_target(&util, GizmoUpdate::Full);

        // Grab the X arrow tip head-on.
        util.set_ray(ray(Vec3::new(2.2, 0.0, 10.0), Vec3::NEG_Z));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::X));

        // Slide the cursor 5 units along +X.
        util.set_ray(ray(Vec3::new(7.2, 0.0, 10.0), Vec3::NEG_Z));
        assert!(gizmo.drag(&mut util));
        assert!(util
            .target()
            .transform
            .translation
            .abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-3));
        // Gizmo followed the target's bounds center.
        assert!(gizmo
            .core
            .position()
            .abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn planar_drag_moves_in_plane() {
        let mut util = GizmoUtil::new();
        unit_target(&mut util, Vec3::ZERO);
        let mut gizmo = built_gizmo();
        gizmo.set_from_target(&util, GizmoUpdate::Full);

        // Grab the Z-plane square (offset into +X/+Y).
        util.set_ray(ray(Vec3::new(0.6, 0.6, 10.0), Vec3::NEG_Z));
        assert!(gizmo.initialize_drag(&util));
        assert_eq!(gizmo.axis(), Some(GizmoAxis::PlaneZ));

        util.set_ray(ray(Vec3::new(2.6, -0.4, 10.0), Vec3::NEG_Z));
        assert!(gizmo.drag(&mut util));
        assert!(util
            .target()
            .transform
            .translation
            .abs_diff_eq(Vec3::new(2.0, -1.0, 0.0), 1e-3));
    }

    #[test]
    fn center_handle_starts_no_drag() {
        let mut util = GizmoUtil::new();
        unit_target(&mut util, Vec3::ZERO);
        let mut gizmo = built_gizmo();
        gizmo.set_from_target(&util, GizmoUpdate::Full);

        util.set_ray(ray(Vec3::new(0.05, 0.05, 10.0), Vec3::NEG_Z));
        assert!(!gizmo.initialize_drag(&util));
        assert!(!gizmo.is_dragging());
    }

    #[test]
    fn full_refresh_tracks_bounds_center_and_base_rotation() {
        let mut util = GizmoUtil::new();
        unit_target(&mut util, Vec3::new(3.0, 1.0, -2.0));
        let base = Quat::from_rotation_y(0.7);
        util.set_base_rotation(base);

        let mut gizmo = built_gizmo();
        gizmo.set_from_target(&util, GizmoUpdate::Full);
        assert!(gizmo
            .core
            .position()
            .abs_diff_eq(Vec3::new(3.0, 1.0, -2.0), 1e-4));
        assert!(gizmo.core.rotation().abs_diff_eq(base, 1e-5));
    }
}
