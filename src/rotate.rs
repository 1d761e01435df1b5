//! The rotation gizmo: three great-circle rings.

use bevy::prelude::*;

use crate::gizmo::{GizmoBehavior, GizmoCore, Handle, HandleShape};
use crate::math::EPSILON;
use crate::types::{Axis3, GizmoAxis, GizmoProportions, GizmoUpdate};
use crate::util::GizmoUtil;

/// Rotates the target on the great circle of the grabbed ring.
///
/// The drag sample is the unit vector from the gizmo center to the cursor's
/// point on the ring plane; the applied rotation is always the arc from the
/// drag-start unit vector to the current one, composed onto the drag-start
/// rotation. Rotations are never compounded sample-over-sample.
pub struct RotateGizmo {
    handles: Vec<Handle>,
    start_unit: Vec3,
    start_rotation: Quat,
    start_center: Vec3,
}

impl RotateGizmo {
    /// Creates an unbuilt rotation gizmo.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
            start_unit: Vec3::X,
            start_rotation: Quat::IDENTITY,
            start_center: Vec3::ZERO,
        }
    }
}

impl Default for RotateGizmo {
    fn default() -> Self {
        Self::new()
    }
}

impl GizmoBehavior for RotateGizmo {
    fn build(&mut self, proportions: &GizmoProportions) {
        self.handles.clear();
        for axis in Axis3::ALL {
            let gizmo_axis = match axis {
                Axis3::X => GizmoAxis::PlaneX,
                Axis3::Y => GizmoAxis::PlaneY,
                Axis3::Z => GizmoAxis::PlaneZ,
            };
            self.handles.push(Handle::new(
                gizmo_axis,
                HandleShape::Ring {
                    normal: axis.to_vec3(),
                    radius: proportions.ring_radius,
                    thickness: proportions.ring_thickness,
                },
            ));
        }
    }

    fn handles(&self) -> &[Handle] {
        &self.handles
    }

    fn get_axis_point(&self, core: &GizmoCore, util: &GizmoUtil) -> Option<Vec3> {
        let normal = core.axis?.planar()?;
        let point = core.intersect_plane(util, normal)?;
        let relative = point - core.position();
        if relative.length_squared() < EPSILON {
            return None;
        }
        Some(relative.normalize())
    }

    fn setup_drag(&mut self, core: &mut GizmoCore, util: &GizmoUtil) -> bool {
        self.start_unit = core.drag_point;
        self.start_rotation = util.target().transform.rotation;
        self.start_center = core.position();
        true
    }

    fn transform_target(&mut self, core: &mut GizmoCore, util: &mut GizmoUtil) -> bool {
        let arc = Quat::from_rotation_arc(self.start_unit, core.drag_point);
        let target = util.target_mut();
        target.transform.rotation = arc * self.start_rotation;

        // The rotation pivots on the gizmo center, not the target origin;
        // move the origin along the same arc around that center.
        let initial = core.initial_transform.translation;
        let to_center = self.start_center - initial;
        target.transform.translation = initial - (arc * to_center - to_center);
        true
    }

    fn set_from_target(
        &mut self,
        core: &mut GizmoCore,
        util: &GizmoUtil,
        update: GizmoUpdate,
    ) -> bool {
        if update == GizmoUpdate::Drag {
            return true;
        }
        core.set_rotation(util.base_rotation());
        if update == GizmoUpdate::Rotate {
            return true;
        }
        core.set_position(util.target().world_bounds().center());
        true
    }
}
