//! Gizmo rendering via Bevy's `Gizmos` line API.
//!
//! Everything is drawn from the same handle layout used for picking, so the
//! visuals can never drift from the hit shapes.

use std::f32::consts::PI;

use bevy::prelude::*;

use crate::control::TransformControl;
use crate::gizmo::{Gizmo as ControlGizmo, HandleShape};
use crate::math::axis_basis;
use crate::types::{
    Axis3, GizmoAxis, GizmoMode, GizmoProportions, GizmoStateColors, TransformControlCamera,
    TransformControlStyle,
};

/// Segments used for cones and circles.
const CONE_SEGMENTS: usize = 16;
const RING_SEGMENTS: usize = 48;

/// World pose applied to gizmo-local handle geometry.
struct DrawFrame {
    position: Vec3,
    rotation: Quat,
    scale: f32,
}

impl DrawFrame {
    fn of(gizmo: &ControlGizmo) -> Self {
        Self {
            position: gizmo.core.position(),
            rotation: gizmo.core.rotation(),
            scale: gizmo.visual_scale(),
        }
    }

    fn point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }

    fn dir(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }
}

fn state_colors<'a>(
    style: &'a TransformControlStyle,
    axis: GizmoAxis,
    mode: GizmoMode,
) -> &'a GizmoStateColors {
    match axis.canonical() {
        GizmoAxis::X => style.axes.for_axis(Axis3::X),
        GizmoAxis::Y => style.axes.for_axis(Axis3::Y),
        GizmoAxis::Z => style.axes.for_axis(Axis3::Z),
        // Rotation rings are per-axis; translation planes stay neutral.
        GizmoAxis::PlaneX if mode == GizmoMode::Rotate => style.axes.for_axis(Axis3::X),
        GizmoAxis::PlaneY if mode == GizmoMode::Rotate => style.axes.for_axis(Axis3::Y),
        GizmoAxis::PlaneZ if mode == GizmoMode::Rotate => style.axes.for_axis(Axis3::Z),
        _ => &style.neutral,
    }
}

fn handle_color(
    control: &TransformControl,
    style: &TransformControlStyle,
    axis: GizmoAxis,
) -> Color {
    let colors = state_colors(style, axis, control.mode());
    let active =
        control.is_transforming() && control.gizmo().axis() == Some(axis.canonical());
    if active {
        colors.active
    } else {
        colors.idle
    }
}

fn draw_circle(
    gizmos: &mut Gizmos,
    center: Vec3,
    normal: Vec3,
    radius: f32,
    segments: usize,
    color: Color,
) {
    let (t1, t2) = axis_basis(normal);
    let mut prev: Option<Vec3> = None;
    for i in 0..=segments {
        let angle = 2.0 * PI * (i as f32) / (segments as f32);
        let point = center + (t1 * angle.cos() + t2 * angle.sin()) * radius;
        if let Some(prev) = prev {
            gizmos.line(prev, point, color);
        }
        prev = Some(point);
    }
}

fn draw_cone(
    gizmos: &mut Gizmos,
    base: Vec3,
    axis_dir: Vec3,
    length: f32,
    radius: f32,
    color: Color,
) {
    let tip = base + axis_dir * length;
    let (t1, t2) = axis_basis(axis_dir);
    for i in 0..CONE_SEGMENTS {
        let a0 = 2.0 * PI * (i as f32) / (CONE_SEGMENTS as f32);
        let a1 = 2.0 * PI * (i as f32 + 1.0) / (CONE_SEGMENTS as f32);
        let base0 = base + (t1 * a0.cos() + t2 * a0.sin()) * radius;
        let base1 = base + (t1 * a1.cos() + t2 * a1.sin()) * radius;
        gizmos.line(tip, base0, color);
        gizmos.line(tip, base1, color);
        gizmos.line(base0, base1, color);
    }
}

/// Outline of a flat plate handle: the rectangle through its center in the
/// plane of its two widest extents.
fn draw_plate(gizmos: &mut Gizmos, frame: &DrawFrame, center: Vec3, half: Vec3, color: Color) {
    // Plates are thin along exactly one local axis; span the other two.
    let (u, v) = if half.x <= half.y && half.x <= half.z {
        (Vec3::Y * half.y, Vec3::Z * half.z)
    } else if half.y <= half.z {
        (Vec3::X * half.x, Vec3::Z * half.z)
    } else {
        (Vec3::X * half.x, Vec3::Y * half.y)
    };
    let corners = [
        frame.point(center - u - v),
        frame.point(center + u - v),
        frame.point(center + u + v),
        frame.point(center - u + v),
    ];
    for i in 0..4 {
        gizmos.line(corners[i], corners[(i + 1) % 4], color);
    }
}

/// Camera-facing square, used for the free center handle.
fn draw_facing_square(
    gizmos: &mut Gizmos,
    origin: Vec3,
    size: f32,
    color: Color,
    camera_transform: &GlobalTransform,
) {
    let right: Vec3 = camera_transform.right().into();
    let up: Vec3 = camera_transform.up().into();
    let r = right * size * 0.5;
    let u = up * size * 0.5;

    let p0 = origin - r - u;
    let p1 = origin + r - u;
    let p2 = origin + r + u;
    let p3 = origin - r + u;
    gizmos.line(p0, p1, color);
    gizmos.line(p1, p2, color);
    gizmos.line(p2, p3, color);
    gizmos.line(p3, p0, color);
}

fn draw_translate(
    gizmos: &mut Gizmos,
    control: &TransformControl,
    style: &TransformControlStyle,
    proportions: &GizmoProportions,
    frame: &DrawFrame,
    camera_transform: Option<&GlobalTransform>,
) {
    for handle in control.gizmo().handles() {
        let color = handle_color(control, style, handle.axis);
        match (handle.axis, handle.shape) {
            (GizmoAxis::Xyz, _) => {
                if let Some(camera_transform) = camera_transform {
                    draw_facing_square(
                        gizmos,
                        frame.position,
                        proportions.center_radius * 2.0 * frame.scale,
                        color,
                        camera_transform,
                    );
                }
            }
            (axis, HandleShape::Sphere { .. }) => {
                let Some(cardinal) = axis.directional() else {
                    continue;
                };
                let dir = frame.dir(cardinal.to_vec3());
                let line_end =
                    frame.position + dir * proportions.axis_length * frame.scale;
                gizmos.line(frame.position, line_end, color);
                draw_cone(
                    gizmos,
                    line_end,
                    dir,
                    proportions.cone_length * frame.scale,
                    proportions.cone_radius * frame.scale,
                    color,
                );
            }
            (
                _,
                HandleShape::Box {
                    center,
                    half_extents,
                },
            ) => {
                draw_plate(gizmos, frame, center, half_extents, color);
            }
            _ => {}
        }
    }
}

fn draw_rotate(
    gizmos: &mut Gizmos,
    control: &TransformControl,
    style: &TransformControlStyle,
    frame: &DrawFrame,
) {
    for handle in control.gizmo().handles() {
        let HandleShape::Ring { normal, radius, .. } = handle.shape else {
            continue;
        };
        let color = handle_color(control, style, handle.axis);
        draw_circle(
            gizmos,
            frame.position,
            frame.dir(normal),
            radius * frame.scale,
            RING_SEGMENTS,
            color,
        );
    }
}

fn draw_scale(
    gizmos: &mut Gizmos,
    control: &TransformControl,
    style: &TransformControlStyle,
    frame: &DrawFrame,
) {
    for handle in control.gizmo().handles() {
        let color = handle_color(control, style, handle.axis);
        match handle.shape {
            HandleShape::Box {
                center,
                half_extents,
            } => {
                draw_plate(gizmos, frame, center, half_extents, color);
            }
            HandleShape::Sphere { center, radius } => {
                // Top handle: a cone pointing up from the box top.
                let base = center - Vec3::Y * radius;
                draw_cone(
                    gizmos,
                    frame.point(base),
                    frame.dir(Vec3::Y),
                    radius * 2.0 * frame.scale,
                    radius * frame.scale,
                    color,
                );
            }
            HandleShape::Ring { .. } => {}
        }
    }
}

/// Render the active gizmo.
pub fn draw_control(
    control: Res<TransformControl>,
    style: Res<TransformControlStyle>,
    proportions: Res<GizmoProportions>,
    cameras: Query<&GlobalTransform, With<TransformControlCamera>>,
    mut gizmos: Gizmos,
) {
    if !control.enabled() {
        return;
    }

    let frame = DrawFrame::of(control.gizmo());
    let camera_transform = cameras.iter().next();

    match control.mode() {
        GizmoMode::Translate => draw_translate(
            &mut gizmos,
            &control,
            &style,
            &proportions,
            &frame,
            camera_transform,
        ),
        GizmoMode::Rotate => draw_rotate(&mut gizmos, &control, &style, &frame),
        GizmoMode::Scale => draw_scale(&mut gizmos, &control, &style, &frame),
    }
}
