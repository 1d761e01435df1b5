//! Math utilities for gizmo hit testing and intersection calculations.

use bevy::math::{Affine3A, Ray3d};
use bevy::prelude::*;

/// Threshold for considering vectors as parallel or zero-length.
pub(crate) const EPSILON: f32 = 1e-6;

/// Threshold for parallel plane/ray detection.
const PLANE_EPSILON: f32 = 1e-5;

/// Threshold for choosing perpendicular helper vector.
const AXIS_PARALLEL_THRESHOLD: f32 = 0.9;

/// Half-length of the gizmo's infinite reference lines. Large enough to act
/// as infinite for any reasonable scene while keeping f32 segment/plane
/// intersections well conditioned.
pub const LINE_HALF_LENGTH: f32 = 1.0e4;

/// Build an orthonormal basis (t1, t2) in the plane perpendicular to `axis`.
pub fn axis_basis(axis: Vec3) -> (Vec3, Vec3) {
    let axis = axis.normalize_or_zero();
    if axis.length_squared() < EPSILON {
        return (Vec3::X, Vec3::Y);
    }

    // Pick a helper vector that is not parallel to axis.
    let helper = if axis.abs().dot(Vec3::Y) < AXIS_PARALLEL_THRESHOLD {
        Vec3::Y
    } else {
        Vec3::X
    };

    let t1 = axis.cross(helper).normalize_or_zero();
    let t2 = axis.cross(t1).normalize_or_zero();
    (t1, t2)
}

/// Solve intersection between a ray and a sphere. Returns distance along the
/// ray if there is an intersection, otherwise `None`.
pub fn ray_sphere_intersection(ray: &Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let m = ray.origin - center;
    let b = m.dot(*ray.direction);
    let c = m.length_squared() - radius * radius;

    // Exit if ray origin is outside sphere (c > 0) and ray is pointing away
    // from sphere (b > 0).
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discr = b * b - c;
    if discr < 0.0 {
        return None;
    }

    let t = -b - discr.sqrt();
    if t < 0.0 {
        Some(0.0)
    } else {
        Some(t)
    }
}

/// Slab-method intersection between a ray and an axis-aligned box.
/// Returns the distance to the entry point, or 0 when the ray starts inside.
pub fn ray_box_intersection(ray: &Ray3d, center: Vec3, half_extents: Vec3) -> Option<f32> {
    let min = center - half_extents;
    let max = center + half_extents;
    let inv = Vec3::ONE / *ray.direction;

    let t0 = (min - ray.origin) * inv;
    let t1 = (max - ray.origin) * inv;
    let t_near = t0.min(t1);
    let t_far = t0.max(t1);

    let t_min = t_near.max_element();
    let t_max = t_far.min_element();

    if t_max < t_min || t_max < 0.0 || !t_min.is_finite() {
        return None;
    }
    Some(t_min.max(0.0))
}

/// A line segment between two points; the gizmo's reference lines use
/// endpoints at [`LINE_HALF_LENGTH`] so they behave as infinite lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    /// Segment start point.
    pub start: Vec3,
    /// Segment end point.
    pub end: Vec3,
}

impl Line3 {
    /// Creates a segment between two points.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end.
    pub fn delta(&self) -> Vec3 {
        self.end - self.start
    }

    /// Segment length.
    pub fn length(&self) -> f32 {
        self.delta().length()
    }
}

impl Default for Line3 {
    fn default() -> Self {
        Self {
            start: Vec3::ZERO,
            end: Vec3::ZERO,
        }
    }
}

/// An infinite plane in constant-normal form: `normal . p + d == 0` for
/// points `p` on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3 {
    /// Unit plane normal.
    pub normal: Vec3,
    /// Signed distance term.
    pub d: f32,
}

impl Plane3 {
    /// Builds a plane from a unit normal and a point it passes through.
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            d: -normal.dot(point),
        }
    }

    /// Signed distance from `point` to the plane.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Orthogonal projection of `point` onto the plane.
    pub fn project_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.distance_to_point(point)
    }

    /// Intersects a ray with the plane. Returns `None` when the ray is
    /// parallel to the plane or the intersection lies behind the origin.
    pub fn intersect_ray(&self, ray: &Ray3d) -> Option<Vec3> {
        let denom = self.normal.dot(*ray.direction);
        if denom.abs() < PLANE_EPSILON {
            return None;
        }
        let t = -self.distance_to_point(ray.origin) / denom;
        if t < 0.0 {
            None
        } else {
            Some(ray.origin + *ray.direction * t)
        }
    }

    /// Intersects a segment with the plane. Returns `None` when the segment
    /// is parallel to the plane or does not cross it.
    pub fn intersect_segment(&self, line: &Line3) -> Option<Vec3> {
        let delta = line.delta();
        let len = delta.length();
        if len < EPSILON {
            return None;
        }
        let dir = delta / len;
        let denom = self.normal.dot(dir);
        if denom.abs() < PLANE_EPSILON {
            // Parallel segment: only a segment lying in the plane intersects.
            if self.distance_to_point(line.start).abs() < PLANE_EPSILON {
                return Some(line.start);
            }
            return None;
        }
        let t = -self.distance_to_point(line.start) / denom / len;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(line.start + delta * t)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Box3 {
    /// The empty box; union identity.
    pub const EMPTY: Box3 = Box3 {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Builds a box from its center and half extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grows the box to contain `point`.
    pub fn expand_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grows the box to contain `other`.
    pub fn union(&mut self, other: &Box3) {
        if other.is_empty() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Center of the box, or zero when empty.
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Extent of the box along each axis, or zero when empty.
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Axis-aligned bounds of the box transformed by `affine`.
    pub fn transformed(&self, affine: &Affine3A) -> Box3 {
        if self.is_empty() {
            return *self;
        }
        let mut out = Box3::EMPTY;
        for corner in [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ] {
            out.expand_point(affine.transform_point3(corner));
        }
        out
    }
}

impl Default for Box3 {
    fn default() -> Self {
        Box3::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::math::Dir3;

    fn ray(origin: Vec3, dir: Vec3) -> Ray3d {
        Ray3d {
            origin,
            direction: Dir3::new(dir).unwrap(),
        }
    }

    #[test]
    fn axis_basis_is_orthonormal() {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.3, -0.9, 0.4)] {
            let (t1, t2) = axis_basis(axis);
            let a = axis.normalize();
            assert_relative_eq!(t1.length(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(t2.length(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(t1.dot(t2), 0.0, epsilon = 1e-5);
            assert_relative_eq!(t1.dot(a), 0.0, epsilon = 1e-5);
            assert_relative_eq!(t2.dot(a), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn plane_ray_intersection_hits() {
        let plane = Plane3::from_normal_and_point(Vec3::Y, Vec3::ZERO);
        let hit = plane
            .intersect_ray(&ray(Vec3::new(1.0, 5.0, 2.0), Vec3::NEG_Y))
            .unwrap();
        assert!(hit.abs_diff_eq(Vec3::new(1.0, 0.0, 2.0), 1e-5));
    }

    #[test]
    fn plane_ray_parallel_returns_none() {
        let plane = Plane3::from_normal_and_point(Vec3::X, Vec3::ZERO);
        assert!(plane
            .intersect_ray(&ray(Vec3::new(5.0, 0.0, 0.0), Vec3::Y))
            .is_none());
    }

    #[test]
    fn plane_ray_behind_origin_returns_none() {
        let plane = Plane3::from_normal_and_point(Vec3::Y, Vec3::ZERO);
        assert!(plane
            .intersect_ray(&ray(Vec3::new(0.0, 5.0, 0.0), Vec3::Y))
            .is_none());
    }

    #[test]
    fn plane_segment_intersection_clamps_to_segment() {
        let plane = Plane3::from_normal_and_point(Vec3::X, Vec3::new(2.0, 0.0, 0.0));
        let crossing = Line3::new(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0));
        let hit = plane.intersect_segment(&crossing).unwrap();
        assert!(hit.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-4));

        let short = Line3::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(plane.intersect_segment(&short).is_none());
    }

    #[test]
    fn plane_projection_drops_normal_component() {
        let plane = Plane3::from_normal_and_point(Vec3::Z, Vec3::new(0.0, 0.0, 3.0));
        let p = plane.project_point(Vec3::new(1.0, 2.0, 10.0));
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    }

    #[test]
    fn ray_sphere_reports_near_hit() {
        let t = ray_sphere_intersection(&ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z), Vec3::ZERO, 1.0)
            .unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-4);
        assert!(
            ray_sphere_intersection(&ray(Vec3::new(0.0, 3.0, 5.0), Vec3::NEG_Z), Vec3::ZERO, 1.0)
                .is_none()
        );
    }

    #[test]
    fn ray_box_hits_and_misses() {
        let t = ray_box_intersection(
            &ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z),
            Vec3::ZERO,
            Vec3::splat(1.0),
        )
        .unwrap();
        assert_relative_eq!(t, 4.0, epsilon = 1e-4);

        assert!(ray_box_intersection(
            &ray(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z),
            Vec3::ZERO,
            Vec3::splat(1.0),
        )
        .is_none());

        // Thin plate hit from above.
        let t = ray_box_intersection(
            &ray(Vec3::new(0.2, 5.0, 0.2), Vec3::NEG_Y),
            Vec3::ZERO,
            Vec3::new(0.5, 0.02, 0.5),
        )
        .unwrap();
        assert!(t > 0.0);
    }

    #[test]
    fn box3_union_and_transform() {
        let mut b = Box3::EMPTY;
        assert!(b.is_empty());
        b.expand_point(Vec3::new(-1.0, -1.0, -1.0));
        b.expand_point(Vec3::new(1.0, 1.0, 1.0));
        assert!(b.center().abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(b.size().abs_diff_eq(Vec3::splat(2.0), 1e-6));

        let moved = b.transformed(&Affine3A::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        assert!(moved.center().abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));

        let rotated = b.transformed(&Affine3A::from_rotation_y(std::f32::consts::FRAC_PI_4));
        assert_relative_eq!(rotated.size().x, 2.0 * 2f32.sqrt(), epsilon = 1e-4);
        assert_relative_eq!(rotated.size().y, 2.0, epsilon = 1e-4);
    }
}
