//! Shared raycasting and target state used by every gizmo variant.
//!
//! [`GizmoUtil`] owns the pick ray, the base-rotation frame and the live
//! target reference so the three gizmo kinds do not duplicate raycasting
//! logic. [`PickCamera`] turns normalized device coordinates into world-space
//! rays; [`TargetProxy`] is the non-owning view of the manipulated object.

use bevy::math::{Affine3A, Dir3, Ray3d};
use bevy::prelude::*;

use crate::gizmo::{Handle, HandleHit};
use crate::math::{Box3, Plane3, EPSILON};

/// Minimal camera frame for building pick rays from normalized device
/// coordinates.
///
/// Follows Bevy's clip-space convention (reverse z: NDC depth 1.0 is the
/// near plane), so a frame built from a Bevy `Camera` via
/// [`PickCamera::from_matrices`] produces the same rays as
/// `Camera::viewport_to_world`.
#[derive(Debug, Clone, Copy)]
pub struct PickCamera {
    world_from_ndc: Mat4,
}

impl PickCamera {
    /// Builds a pick frame from the camera's world matrix and projection.
    pub fn from_matrices(world_from_view: Mat4, clip_from_view: Mat4) -> Self {
        Self {
            world_from_ndc: world_from_view * clip_from_view.inverse(),
        }
    }

    /// Builds the pick ray through `ndc` (-1..1 on each screen axis).
    /// Returns `None` when the unprojected direction degenerates.
    pub fn ndc_ray(&self, ndc: Vec2) -> Option<Ray3d> {
        let near = self.world_from_ndc.project_point3(ndc.extend(1.0));
        let far = self.world_from_ndc.project_point3(ndc.extend(f32::EPSILON));
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d {
            origin: near,
            direction,
        })
    }
}

impl Default for PickCamera {
    fn default() -> Self {
        Self {
            world_from_ndc: Mat4::IDENTITY,
        }
    }
}

/// Non-owning view of the object being manipulated.
///
/// The control never owns the target; it holds the ECS entity id plus the
/// data the drag math needs: the live local transform (the one field the
/// gizmos mutate), the subtree bounds in target-local space, and the
/// decomposed transforms of the ancestor chain (nearest parent first).
#[derive(Debug, Clone)]
pub struct TargetProxy {
    /// The target entity, or `None` for the internal placeholder.
    pub entity: Option<Entity>,
    /// The target's local transform. Mutated directly during drags.
    pub transform: Transform,
    /// Bounds of the target subtree in target-local space, before the
    /// target's own transform is applied.
    pub local_bounds: Box3,
    /// Decomposed TRS of each ancestor, nearest parent first.
    pub ancestors: Vec<Transform>,
}

impl TargetProxy {
    /// The placeholder the control falls back to when no target is set,
    /// so the system is never left referencing nothing.
    pub fn placeholder() -> Self {
        Self {
            entity: None,
            transform: Transform::IDENTITY,
            local_bounds: Box3::EMPTY,
            ancestors: Vec::new(),
        }
    }

    /// Creates a proxy for a scene entity.
    pub fn new(
        entity: Entity,
        transform: Transform,
        local_bounds: Box3,
        ancestors: Vec<Transform>,
    ) -> Self {
        Self {
            entity: Some(entity),
            transform,
            local_bounds,
            ancestors,
        }
    }

    /// Combined affine of the ancestor chain (root first).
    fn chain_affine(&self) -> Affine3A {
        let mut chain = Affine3A::IDENTITY;
        for ancestor in self.ancestors.iter().rev() {
            chain = chain * ancestor.compute_affine();
        }
        chain
    }

    /// World-space affine of the target itself.
    pub fn world_affine(&self) -> Affine3A {
        self.chain_affine() * self.transform.compute_affine()
    }

    /// World-space position of the target's local origin.
    pub fn world_position(&self) -> Vec3 {
        self.chain_affine()
            .transform_point3(self.transform.translation)
    }

    /// World-space bounds of the target subtree.
    pub fn world_bounds(&self) -> Box3 {
        self.local_bounds.transformed(&self.world_affine())
    }

    /// World-space bounds measured under the simulated ancestor chain with
    /// the target's own rotation neutralized. This isolates the size
    /// measurement from the orientation that would otherwise inflate an
    /// axis-aligned box.
    pub fn world_bounds_unrotated(&self) -> Box3 {
        let unrotated = Transform {
            translation: self.transform.translation,
            rotation: Quat::IDENTITY,
            scale: self.transform.scale,
        };
        self.local_bounds
            .transformed(&(self.chain_affine() * unrotated.compute_affine()))
    }

    /// Bounds of the target alone, ancestors ignored, rotation kept.
    pub fn solo_bounds(&self) -> Box3 {
        self.local_bounds
            .transformed(&self.transform.compute_affine())
    }
}

impl Default for TargetProxy {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Attributes and methods shared among all gizmos: the pick ray, the base
/// rotation frame, the screen-size scale factor, the pivot flag and the
/// target reference.
pub struct GizmoUtil {
    camera: PickCamera,
    ray: Ray3d,
    base_rotation: Quat,
    target: TargetProxy,
    /// Uniform visual scale applied to handle geometry so handles keep a
    /// constant apparent size; recomputed every frame by the caller.
    pub scale_factor: f32,
    /// Whether scaling pivots around the object's own origin instead of the
    /// opposite handle anchor.
    pub pivoted: bool,
}

impl GizmoUtil {
    /// Creates the shared state with a default camera and placeholder target.
    pub fn new() -> Self {
        Self {
            camera: PickCamera::default(),
            ray: Ray3d {
                origin: Vec3::ZERO,
                direction: Dir3::NEG_Z,
            },
            base_rotation: Quat::IDENTITY,
            target: TargetProxy::placeholder(),
            scale_factor: 1.0,
            pivoted: false,
        }
    }

    /// Replaces the pick camera frame.
    pub fn set_camera(&mut self, camera: PickCamera) {
        self.camera = camera;
    }

    /// Builds the pick ray from normalized device coordinates. Must be
    /// called before any intersection query for the frame. Returns false
    /// (keeping the previous ray) when the frame cannot produce a ray.
    pub fn set_raycaster(&mut self, ndc: Vec2) -> bool {
        match self.camera.ndc_ray(ndc) {
            Some(ray) => {
                self.ray = ray;
                true
            }
            None => false,
        }
    }

    /// Injects a prebuilt pick ray, bypassing the camera.
    pub fn set_ray(&mut self, ray: Ray3d) {
        self.ray = ray;
    }

    /// The current pick ray.
    pub fn ray(&self) -> &Ray3d {
        &self.ray
    }

    /// Direction of the current pick ray.
    pub fn ray_direction(&self) -> Vec3 {
        *self.ray.direction
    }

    /// Ray/plane intersection with the current pick ray. `None` when the
    /// ray is parallel to the plane; callers must treat that as "drag
    /// target lost" and abort the gesture.
    pub fn intersect_plane(&self, plane: &Plane3) -> Option<Vec3> {
        plane.intersect_ray(&self.ray)
    }

    /// Raycasts the supplied handle shapes, nearest hit first. The shapes
    /// are defined in gizmo-local space; `position`, `rotation` and `scale`
    /// describe the gizmo's world pose.
    pub fn intersect_handles(
        &self,
        handles: &[Handle],
        position: Vec3,
        rotation: Quat,
        scale: f32,
    ) -> Vec<HandleHit> {
        let scale = scale.max(EPSILON);
        let inv_rotation = rotation.inverse();
        let local_origin = inv_rotation * (self.ray.origin - position) / scale;
        let Ok(local_direction) = Dir3::new(inv_rotation * *self.ray.direction) else {
            return Vec::new();
        };
        let local_ray = Ray3d {
            origin: local_origin,
            direction: local_direction,
        };

        let mut hits: Vec<HandleHit> = handles
            .iter()
            .filter_map(|handle| {
                handle.shape.hit(&local_ray).map(|distance| HandleHit {
                    distance,
                    axis: handle.axis,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Read access to the target proxy.
    pub fn target(&self) -> &TargetProxy {
        &self.target
    }

    /// Mutable access to the target proxy; only the active gizmo should
    /// write through this while a drag session is open.
    pub fn target_mut(&mut self) -> &mut TargetProxy {
        &mut self.target
    }

    /// Replaces the target reference.
    pub fn set_target(&mut self, target: TargetProxy) {
        self.target = target;
    }

    /// The coordinate frame the gizmo is rendered in.
    pub fn base_rotation(&self) -> Quat {
        self.base_rotation
    }

    /// Sets the base-rotation frame.
    pub fn set_base_rotation(&mut self, rotation: Quat) {
        self.base_rotation = rotation;
    }
}

impl Default for GizmoUtil {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gizmo::HandleShape;
    use crate::types::GizmoAxis;

    /// Orthographic pick frame looking down -Z from `eye`, with Bevy's
    /// reverse-z depth convention (near plane at NDC depth 1).
    pub(crate) fn test_camera(eye: Vec3) -> PickCamera {
        let world_from_view = Mat4::look_at_rh(eye, eye + Vec3::NEG_Z, Vec3::Y).inverse();
        let clip_from_view = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 100.0, 0.1);
        PickCamera::from_matrices(world_from_view, clip_from_view)
    }

    #[test]
    fn ndc_ray_points_away_from_camera() {
        let camera = test_camera(Vec3::new(0.0, 0.0, 10.0));
        let ray = camera.ndc_ray(Vec2::ZERO).unwrap();
        assert!(ray.direction.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        // NDC x maps to world x for this frame.
        let ray = camera.ndc_ray(Vec2::new(0.4, 0.0)).unwrap();
        assert!((ray.origin.x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn raycaster_hits_plane_through_origin() {
        let mut util = GizmoUtil::new();
        util.set_camera(test_camera(Vec3::new(0.0, 0.0, 10.0)));
        assert!(util.set_raycaster(Vec2::new(0.2, -0.2)));
        let plane = Plane3::from_normal_and_point(Vec3::Z, Vec3::ZERO);
        let hit = util.intersect_plane(&plane).unwrap();
        assert!(hit.abs_diff_eq(Vec3::new(1.0, -1.0, 0.0), 1e-3));
    }

    #[test]
    fn parallel_plane_yields_no_intersection() {
        let mut util = GizmoUtil::new();
        util.set_ray(Ray3d {
            origin: Vec3::new(5.0, 0.0, 0.0),
            direction: Dir3::Y,
        });
        let plane = Plane3::from_normal_and_point(Vec3::X, Vec3::ZERO);
        assert!(util.intersect_plane(&plane).is_none());
    }

    #[test]
    fn handle_hits_are_sorted_nearest_first() {
        let mut util = GizmoUtil::new();
        util.set_ray(Ray3d {
            origin: Vec3::new(0.0, 0.0, 10.0),
            direction: Dir3::NEG_Z,
        });
        let handles = [
            Handle::new(
                GizmoAxis::Y,
                HandleShape::Sphere {
                    center: Vec3::new(0.0, 0.0, -2.0),
                    radius: 0.5,
                },
            ),
            Handle::new(
                GizmoAxis::X,
                HandleShape::Sphere {
                    center: Vec3::ZERO,
                    radius: 0.5,
                },
            ),
        ];
        let hits = util.intersect_handles(&handles, Vec3::ZERO, Quat::IDENTITY, 1.0);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].axis, GizmoAxis::X);
        assert_eq!(hits[1].axis, GizmoAxis::Y);
        assert!(hits[0].distance < hits[1].distance);
    }

    #[test]
    fn proxy_world_bounds_respect_ancestors() {
        let mut proxy = TargetProxy::placeholder();
        proxy.local_bounds = Box3::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        proxy.transform = Transform::from_xyz(1.0, 0.0, 0.0);
        proxy.ancestors = vec![Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        }];

        let bounds = proxy.world_bounds();
        assert!(bounds.center().abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-4));
        assert!(bounds.size().abs_diff_eq(Vec3::splat(4.0), 1e-4));
        assert!(proxy
            .world_position()
            .abs_diff_eq(Vec3::new(2.0, 2.0, 0.0), 1e-4));
    }

    #[test]
    fn unrotated_bounds_ignore_target_rotation() {
        let mut proxy = TargetProxy::placeholder();
        proxy.local_bounds = Box3::from_center_half_extents(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        proxy.transform =
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));

        let rotated = proxy.world_bounds();
        let unrotated = proxy.world_bounds_unrotated();
        assert!(rotated.size().x > unrotated.size().x);
        assert!(unrotated.size().abs_diff_eq(Vec3::new(4.0, 2.0, 2.0), 1e-4));
    }
}
