//! Shared gizmo geometry and the drag lifecycle.
//!
//! [`GizmoCore`] holds the state every gizmo kind needs: the world pose,
//! three infinite cardinal reference lines, three axis planes and the
//! per-drag bookkeeping. Mode-specific behavior lives behind the
//! [`GizmoBehavior`] trait; [`Gizmo`] pairs a core with a boxed behavior and
//! drives the initialize/drag/rollback protocol.

use bevy::math::Ray3d;
use bevy::prelude::*;

use crate::math::{Line3, Plane3, ray_box_intersection, ray_sphere_intersection, EPSILON, LINE_HALF_LENGTH};
use crate::types::{Axis3, GizmoAxis, GizmoProportions, GizmoUpdate};
use crate::util::GizmoUtil;

/// Analytic pick shape of one handle, in gizmo-local space.
#[derive(Debug, Clone, Copy)]
pub enum HandleShape {
    /// A sphere, used for cone tips and the free center handle.
    Sphere {
        /// Sphere center.
        center: Vec3,
        /// Sphere radius.
        radius: f32,
    },
    /// An axis-aligned box, used for planar squares and scale plates.
    Box {
        /// Box center.
        center: Vec3,
        /// Box half extents.
        half_extents: Vec3,
    },
    /// A flat annulus, used for the rotation rings.
    Ring {
        /// Unit normal of the ring plane (through the local origin).
        normal: Vec3,
        /// Ring radius.
        radius: f32,
        /// Half-width of the pickable band around the radius.
        thickness: f32,
    },
}

impl HandleShape {
    /// Distance along `ray` to this shape, or `None` on a miss. The ray must
    /// already be in the shape's local space.
    pub fn hit(&self, ray: &Ray3d) -> Option<f32> {
        match *self {
            HandleShape::Sphere { center, radius } => ray_sphere_intersection(ray, center, radius),
            HandleShape::Box {
                center,
                half_extents,
            } => ray_box_intersection(ray, center, half_extents),
            HandleShape::Ring {
                normal,
                radius,
                thickness,
            } => {
                let plane = Plane3::from_normal_and_point(normal, Vec3::ZERO);
                let point = plane.intersect_ray(ray)?;
                if (point.length() - radius).abs() > thickness {
                    return None;
                }
                Some((point - ray.origin).length())
            }
        }
    }
}

/// One pickable handle: its semantic axis tag plus its pick shape.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Which drag the handle starts.
    pub axis: GizmoAxis,
    /// The analytic shape raycast against.
    pub shape: HandleShape,
}

impl Handle {
    /// Creates a handle.
    pub fn new(axis: GizmoAxis, shape: HandleShape) -> Self {
        Self { axis, shape }
    }
}

/// A single handle raycast result.
#[derive(Debug, Clone, Copy)]
pub struct HandleHit {
    /// Distance along the pick ray.
    pub distance: f32,
    /// The hit handle's axis tag.
    pub axis: GizmoAxis,
}

/// Geometry and drag state shared by all gizmo kinds.
///
/// The three reference lines and planes are cached and rebuilt from scratch
/// on every pose change; nothing updates them incrementally.
pub struct GizmoCore {
    position: Vec3,
    rotation: Quat,
    lines: [Line3; 3],
    planes: [Plane3; 3],
    /// Uniform visual scale for screen-constant handle size.
    pub scale_factor: f32,
    /// Axis of the drag in progress, `None` while idle.
    pub axis: Option<GizmoAxis>,
    /// Pick point recorded at drag start and refreshed every drag sample.
    pub drag_point: Vec3,
    /// Target transform snapshot taken at drag start; restored on failure.
    pub initial_transform: Transform,
}

impl GizmoCore {
    /// Creates a core at the origin with identity rotation.
    pub fn new() -> Self {
        let mut core = Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            lines: [Line3::default(); 3],
            planes: [Plane3::from_normal_and_point(Vec3::X, Vec3::ZERO); 3],
            scale_factor: 1.0,
            axis: None,
            drag_point: Vec3::ZERO,
            initial_transform: Transform::IDENTITY,
        };
        core.rebuild();
        core
    }

    /// Gizmo world position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Gizmo world rotation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Sets position and rotation together, rebuilding lines and planes once.
    pub fn set(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
        self.rebuild();
    }

    /// Moves the gizmo, rebuilding lines and planes.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.rebuild();
    }

    /// Reorients the gizmo, rebuilding lines and planes.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        for axis in Axis3::ALL {
            let dir = self.rotation * axis.to_vec3();
            self.lines[axis.index()] = Line3::new(
                self.position - dir * LINE_HALF_LENGTH,
                self.position + dir * LINE_HALF_LENGTH,
            );
            self.planes[axis.index()] = Plane3::from_normal_and_point(dir, self.position);
        }
    }

    /// The cached reference line along `axis`.
    pub fn line(&self, axis: Axis3) -> &Line3 {
        &self.lines[axis.index()]
    }

    /// The cached plane with normal `axis`.
    pub fn plane(&self, axis: Axis3) -> &Plane3 {
        &self.planes[axis.index()]
    }

    /// Intersects the pick ray with the cached plane of `axis`.
    pub fn intersect_plane(&self, util: &GizmoUtil, axis: Axis3) -> Option<Vec3> {
        util.intersect_plane(self.plane(axis))
    }

    /// Intersects the pick ray with the cached reference line of `axis`,
    /// using the view-plane construction of [`GizmoCore::intersect_target_line3`].
    pub fn intersect_line3(&self, util: &GizmoUtil, axis: Axis3) -> Option<Vec3> {
        self.intersect_target_line3(util, self.line(axis))
    }

    /// Finds the point on `line` the cursor is "over".
    ///
    /// The segment is projected onto the plane through the gizmo origin
    /// perpendicular to the view ray. The pick ray is intersected with that
    /// plane, then a dissecting plane perpendicular to the projected segment
    /// is pushed through the hit and intersected with the original 3D
    /// segment. Returns `None` when the projection degenerates (segment
    /// parallel to the view ray) or the auxiliary plane is missed.
    pub fn intersect_target_line3(&self, util: &GizmoUtil, line: &Line3) -> Option<Vec3> {
        let view_dir = util.ray_direction();
        let view_plane = Plane3::from_normal_and_point(view_dir, self.position);

        let start = view_plane.project_point(line.start);
        let end = view_plane.project_point(line.end);
        let projected = end - start;
        if projected.length_squared() < EPSILON {
            return None;
        }

        let intersect = util.intersect_plane(&view_plane)?;

        // Points on the dissecting plane share the cursor's coordinate along
        // the projected direction; its cut through the original segment is
        // the point the cursor is over.
        let dissect_plane =
            Plane3::from_normal_and_point(projected.normalize(), intersect);
        dissect_plane.intersect_segment(line)
    }
}

impl Default for GizmoCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode-specific gizmo behavior.
///
/// The core owns the shared geometry; implementations contribute their
/// handle layout and the drag math. All methods are infallible in the panic
/// sense: failure is reported through `Option`/`bool` and handled by the
/// [`Gizmo`] drag protocol.
pub trait GizmoBehavior: Send + Sync {
    /// Lays out the handle shapes. Called once before any input is accepted.
    fn build(&mut self, proportions: &GizmoProportions);

    /// Current pick handles, in gizmo-local space.
    fn handles(&self) -> &[Handle];

    /// Scale applied to the handle shapes when picking and drawing.
    /// Defaults to the screen-constant factor; behaviors whose handles are
    /// laid out in world units override this to 1.
    fn pick_scale(&self, core: &GizmoCore) -> f32 {
        core.scale_factor
    }

    /// Resolves the pick ray to a point for the active axis. `None` means
    /// the cursor has no meaningful position for this handle this frame.
    fn get_axis_point(&self, core: &GizmoCore, util: &GizmoUtil) -> Option<Vec3>;

    /// Captures drag-start state after `core.axis`, `core.drag_point` and
    /// the transform snapshot are in place. Returning false aborts the drag.
    fn setup_drag(&mut self, core: &mut GizmoCore, util: &GizmoUtil) -> bool;

    /// Applies the current drag sample to the target transform.
    fn transform_target(&mut self, core: &mut GizmoCore, util: &mut GizmoUtil) -> bool;

    /// Re-derives gizmo state from the target. `update` selects how much
    /// work to do; see [`GizmoUpdate`].
    fn set_from_target(
        &mut self,
        core: &mut GizmoCore,
        util: &GizmoUtil,
        update: GizmoUpdate,
    ) -> bool;
}

/// A gizmo: shared core plus one boxed behavior.
pub struct Gizmo {
    /// Shared geometry and drag bookkeeping.
    pub core: GizmoCore,
    behavior: Box<dyn GizmoBehavior>,
}

impl Gizmo {
    /// Wraps a behavior around a fresh core.
    pub fn new(behavior: Box<dyn GizmoBehavior>) -> Self {
        Self {
            core: GizmoCore::new(),
            behavior,
        }
    }

    /// Builds the behavior's handle layout.
    pub fn build(&mut self, proportions: &GizmoProportions) {
        self.behavior.build(proportions);
    }

    /// Current pick handles.
    pub fn handles(&self) -> &[Handle] {
        self.behavior.handles()
    }

    /// Scale applied to handle shapes for picking and drawing.
    pub fn visual_scale(&self) -> f32 {
        self.behavior.pick_scale(&self.core)
    }

    /// Copies the shared screen-constant factor into the core.
    pub fn update_scale_factor(&mut self, util: &GizmoUtil) {
        self.core.scale_factor = util.scale_factor;
    }

    /// Whether a drag session is open.
    pub fn is_dragging(&self) -> bool {
        self.core.axis.is_some()
    }

    /// Axis of the drag in progress.
    pub fn axis(&self) -> Option<GizmoAxis> {
        self.core.axis
    }

    /// Re-derives gizmo state from the target.
    pub fn set_from_target(&mut self, util: &GizmoUtil, update: GizmoUpdate) -> bool {
        self.behavior.set_from_target(&mut self.core, util, update)
    }

    /// Starts a drag from the current pick ray. Picks the nearest handle,
    /// resolves the anchor point, snapshots the target transform and lets
    /// the behavior capture its drag-start state. Any failure leaves the
    /// gizmo idle.
    pub fn initialize_drag(&mut self, util: &GizmoUtil) -> bool {
        self.core.axis = None;

        let scale = self.behavior.pick_scale(&self.core);
        let hits = util.intersect_handles(
            self.behavior.handles(),
            self.core.position,
            self.core.rotation,
            scale,
        );
        let Some(hit) = hits.first() else {
            return false;
        };
        // Negative-side handles drag the positive semantic axis.
        self.core.axis = Some(hit.axis.canonical());

        let Some(point) = self.behavior.get_axis_point(&self.core, util) else {
            self.core.axis = None;
            return false;
        };
        self.core.drag_point = point;
        self.core.initial_transform = util.target().transform;

        if !self.behavior.setup_drag(&mut self.core, util) {
            self.core.axis = None;
            return false;
        }
        true
    }

    /// Applies one drag sample. On any failure the target transform is
    /// rolled back to the drag-start snapshot and the gizmo re-derived from
    /// the unchanged target, so a bad sample degrades to "nothing happened".
    pub fn drag(&mut self, util: &mut GizmoUtil) -> bool {
        if self.core.axis.is_none() {
            return false;
        }

        let applied = match self.behavior.get_axis_point(&self.core, util) {
            Some(point) => {
                self.core.drag_point = point;
                self.behavior.transform_target(&mut self.core, util)
                    && self
                        .behavior
                        .set_from_target(&mut self.core, util, GizmoUpdate::Drag)
            }
            None => false,
        };
        if applied {
            return true;
        }

        util.target_mut().transform = self.core.initial_transform;
        self.behavior
            .set_from_target(&mut self.core, util, GizmoUpdate::Drag);
        false
    }

    /// Closes the drag session.
    pub fn end_drag(&mut self) {
        self.core.axis = None;
    }
}
