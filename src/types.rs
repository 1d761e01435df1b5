//! Core types for the transform control system.
//!
//! This module contains the public enums, marker components and style
//! resources used to configure and interact with the gizmo system.

use bevy::prelude::*;
use std::fmt;

/// Which transform component the control is currently editing.
///
/// Exactly one gizmo is active at a time; switching modes swaps the active
/// gizmo without losing the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GizmoMode {
    /// Translation mode - move the target along axes or planes.
    #[default]
    Translate,
    /// Rotation mode - trackball rotation on planar great circles.
    Rotate,
    /// Scale mode - per-axis and diagonal-corner scaling.
    Scale,
}

impl fmt::Display for GizmoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GizmoMode::Translate => f.write_str("Translate"),
            GizmoMode::Rotate => f.write_str("Rotate"),
            GizmoMode::Scale => f.write_str("Scale"),
        }
    }
}

/// A cardinal axis, used to index the gizmo's reference lines and planes
/// and to address single components of a scale vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis3 {
    /// The X axis (typically red).
    X,
    /// The Y axis (typically green).
    Y,
    /// The Z axis (typically blue).
    Z,
}

impl Axis3 {
    /// All three cardinal axes, in index order.
    pub const ALL: [Axis3; 3] = [Axis3::X, Axis3::Y, Axis3::Z];

    /// Converts the axis to its corresponding unit vector.
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Axis3::X => Vec3::X,
            Axis3::Y => Vec3::Y,
            Axis3::Z => Vec3::Z,
        }
    }

    /// Array index of the axis.
    pub fn index(self) -> usize {
        match self {
            Axis3::X => 0,
            Axis3::Y => 1,
            Axis3::Z => 2,
        }
    }

    /// Reads this axis' component from a vector.
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis3::X => v.x,
            Axis3::Y => v.y,
            Axis3::Z => v.z,
        }
    }

    /// Multiplies this axis' component of `v` by `factor`.
    pub fn scale_component(self, v: &mut Vec3, factor: f32) {
        match self {
            Axis3::X => v.x *= factor,
            Axis3::Y => v.y *= factor,
            Axis3::Z => v.z *= factor,
        }
    }
}

/// Tagged identifier for one draggable gizmo handle.
///
/// Each concrete gizmo supports only a strict subset: translation uses the
/// directional, planar and [`GizmoAxis::Xyz`] handles; rotation uses the
/// planar handles reinterpreted as great circles; scaling uses directional
/// and diagonal handles. Negative variants exist so the same semantic axis
/// can be grabbed from either end of the object; they canonicalize onto the
/// positive variant via [`GizmoAxis::canonical`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    /// Directional X handle.
    X,
    /// Directional Y handle.
    Y,
    /// Directional Z handle.
    Z,
    /// Negative-directional X handle (scale only).
    XNeg,
    /// Negative-directional Z handle (scale only).
    ZNeg,
    /// Planar handle in the plane with normal X.
    PlaneX,
    /// Planar handle in the plane with normal Y.
    PlaneY,
    /// Planar handle in the plane with normal Z.
    PlaneZ,
    /// Diagonal corner handle along the (+X,+Z) footprint diagonal.
    DiagXz1,
    /// Diagonal corner handle along the (+X,-Z) footprint diagonal.
    DiagXz2,
    /// Opposite-corner twin of [`GizmoAxis::DiagXz1`].
    DiagXz1Neg,
    /// Opposite-corner twin of [`GizmoAxis::DiagXz2`].
    DiagXz2Neg,
    /// The free "all axes" handle at the gizmo origin.
    Xyz,
}

impl GizmoAxis {
    /// Maps negative handle variants onto the semantic axis they control.
    pub fn canonical(self) -> GizmoAxis {
        match self {
            GizmoAxis::XNeg => GizmoAxis::X,
            GizmoAxis::ZNeg => GizmoAxis::Z,
            GizmoAxis::DiagXz1Neg => GizmoAxis::DiagXz1,
            GizmoAxis::DiagXz2Neg => GizmoAxis::DiagXz2,
            other => other,
        }
    }

    /// The cardinal axis of a directional handle, if this is one.
    pub fn directional(self) -> Option<Axis3> {
        match self {
            GizmoAxis::X => Some(Axis3::X),
            GizmoAxis::Y => Some(Axis3::Y),
            GizmoAxis::Z => Some(Axis3::Z),
            _ => None,
        }
    }

    /// The normal axis of a planar handle, if this is one.
    pub fn planar(self) -> Option<Axis3> {
        match self {
            GizmoAxis::PlaneX => Some(Axis3::X),
            GizmoAxis::PlaneY => Some(Axis3::Y),
            GizmoAxis::PlaneZ => Some(Axis3::Z),
            _ => None,
        }
    }
}

/// Refresh kind passed to a gizmo's `set_from_target`, so cheap updates can
/// skip work that only full refreshes need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoUpdate {
    /// Recompute everything: position, rotation and (for scale) dimension.
    #[default]
    Full,
    /// Per-sample update while a drag is in progress.
    Drag,
    /// Only the base-rotation frame changed.
    Rotate,
}

/// Marker component for the camera whose view drives gizmo picking.
///
/// Add this to the camera that should build pick rays for the control.
/// If several cameras carry it, the first one found is used.
#[derive(Component)]
pub struct TransformControlCamera;

/// Marks an entity as manipulable by the transform control.
#[derive(Component)]
pub struct TransformTarget;

/// Marks a [`TransformTarget`] as the currently selected target.
///
/// Only one entity should carry this at a time; if multiple exist, the
/// first one found is used.
#[derive(Component)]
pub struct ActiveTarget;

/// Colors for a single gizmo element in its two interaction states.
#[derive(Clone, Debug)]
pub struct GizmoStateColors {
    /// Color while the element is not part of an active drag.
    pub idle: Color,
    /// Color while the element is being dragged.
    pub active: Color,
}

impl GizmoStateColors {
    /// Creates a new color pair.
    pub fn new(idle: Color, active: Color) -> Self {
        Self { idle, active }
    }
}

impl Default for GizmoStateColors {
    fn default() -> Self {
        Self {
            idle: Color::srgb(0.8, 0.8, 0.8),
            active: Color::srgb(1.0, 1.0, 0.8),
        }
    }
}

/// Colors for each cardinal axis of a handle group.
#[derive(Clone, Debug)]
pub struct AxisColors {
    /// Colors for X-axis handles (typically red tones).
    pub x: GizmoStateColors,
    /// Colors for Y-axis handles (typically green tones).
    pub y: GizmoStateColors,
    /// Colors for Z-axis handles (typically blue tones).
    pub z: GizmoStateColors,
}

impl AxisColors {
    /// Returns the colors for a specific axis.
    pub fn for_axis(&self, axis: Axis3) -> &GizmoStateColors {
        match axis {
            Axis3::X => &self.x,
            Axis3::Y => &self.y,
            Axis3::Z => &self.z,
        }
    }
}

impl Default for AxisColors {
    fn default() -> Self {
        Self {
            x: GizmoStateColors::new(Color::srgb(1.0, 0.25, 0.25), Color::srgb(1.0, 0.9, 0.9)),
            y: GizmoStateColors::new(Color::srgb(0.25, 1.0, 0.25), Color::srgb(0.9, 1.0, 0.9)),
            z: GizmoStateColors::new(Color::srgb(0.25, 0.5, 1.0), Color::srgb(0.9, 0.95, 1.0)),
        }
    }
}

/// Visual style configuration for the transform control.
///
/// Modify this resource at runtime to customize gizmo appearance.
#[derive(Resource, Clone)]
pub struct TransformControlStyle {
    /// Line width for gizmo rendering (in pixels).
    pub line_width: f32,
    /// Depth bias to draw gizmos on top of regular geometry.
    /// Negative values bring the gizmo closer to the camera.
    pub depth_bias: f32,
    /// Colors for axis-bound handles.
    pub axes: AxisColors,
    /// Colors for planar, diagonal and free handles.
    pub neutral: GizmoStateColors,
    /// Multiplier applied to the camera-to-gizmo distance to keep handle
    /// size roughly constant in screen space.
    pub screen_size_factor: f32,
}

impl Default for TransformControlStyle {
    fn default() -> Self {
        Self {
            line_width: 4.0,
            depth_bias: -1.0,
            axes: AxisColors::default(),
            neutral: GizmoStateColors::new(
                Color::srgba(1.0, 1.0, 1.0, 0.9),
                Color::srgba(1.0, 0.9, 0.8, 1.0),
            ),
            screen_size_factor: 0.12,
        }
    }
}

/// Sizing of the analytic handle layout, in gizmo-local units.
///
/// Translation and rotation handles are laid out from these proportions at
/// build time; scale handles are rebuilt from the target's measured
/// dimension instead and only use the width constants here.
#[derive(Resource, Clone, Debug)]
pub struct GizmoProportions {
    /// Length of each directional axis line.
    pub axis_length: f32,
    /// Length of the translation cone from base to tip.
    pub cone_length: f32,
    /// Radius of the translation cone at its base.
    pub cone_radius: f32,
    /// Hit radius for translation cones.
    pub translate_hit_radius: f32,
    /// Side length of planar translation squares.
    pub plane_size: f32,
    /// Offset of planar squares from the origin along both in-plane axes.
    pub plane_offset: f32,
    /// Half-thickness of planar handle pick plates.
    pub plane_thickness: f32,
    /// Pick radius of the free "all axes" handle at the origin.
    pub center_radius: f32,
    /// Radius of the rotation rings.
    pub ring_radius: f32,
    /// Hit thickness of the rotation rings.
    pub ring_thickness: f32,
    /// Width of the flat scale handle plates.
    pub scale_handle_width: f32,
    /// Height of the scale gizmo's top cone.
    pub scale_top_height: f32,
    /// Base radius of the scale gizmo's top cone.
    pub scale_top_radius: f32,
}

impl Default for GizmoProportions {
    fn default() -> Self {
        let cone_length = 0.4;
        Self {
            axis_length: 2.0,
            cone_length,
            cone_radius: 0.12,
            translate_hit_radius: cone_length * 0.9,
            plane_size: 0.5,
            plane_offset: 0.35,
            plane_thickness: 0.05,
            center_radius: 0.27,
            ring_radius: 2.0,
            ring_thickness: 0.25,
            scale_handle_width: 0.1,
            scale_top_height: 0.3,
            scale_top_radius: 0.15,
        }
    }
}
