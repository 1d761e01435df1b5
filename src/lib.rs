//! Interactive transform-gizmo control system for Bevy 0.18.
//!
//! This crate provides translate / rotate / scale gizmos for manipulating
//! entity transforms. Picking is fully analytic (no meshes are raycast),
//! the drag math recomputes every sample from drag-start state so errors
//! never accumulate, and a failed sample rolls the target back to its
//! drag-start transform.
//!
//! # Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_transform_controls::{
//!     ActiveTarget, TransformControlCamera, TransformControlPlugin, TransformTarget,
//! };
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TransformControlPlugin)
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     // Camera whose view drives picking.
//!     commands.spawn((
//!         Camera3d::default(),
//!         Transform::from_xyz(0.0, 5.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
//!         TransformControlCamera,
//!     ));
//!
//!     // Entity to manipulate; mark it active to attach the gizmo.
//!     commands.spawn((
//!         // ... your mesh and material ...
//!         Transform::from_xyz(0.0, 1.0, 0.0),
//!         TransformTarget,
//!         ActiveTarget,
//!     ));
//! }
//! ```
//!
//! # Modes
//!
//! - **Translate**: axis arrows, plane squares and a free center handle
//! - **Rotate**: three great-circle rings; the drag is always the arc from
//!   the grab point, never an accumulation of per-frame deltas
//! - **Scale**: side and corner plates on the target's footprint plus a top
//!   cone; the grabbed face or corner stays fixed while the object grows
//!
//! Switch modes at runtime through [`TransformControl::change_mode`].

#![warn(missing_docs)]

use bevy::prelude::*;

mod control;
mod draw;
mod gizmo;
mod interaction;
mod math;
mod rotate;
mod scale;
mod translate;
mod types;
mod util;

pub use control::TransformControl;
pub use gizmo::{Gizmo, GizmoBehavior, GizmoCore, Handle, HandleHit, HandleShape};
pub use math::{Box3, Line3, Plane3, LINE_HALF_LENGTH};
pub use rotate::RotateGizmo;
pub use scale::ScaleGizmo;
pub use translate::TranslateGizmo;
pub use types::{
    ActiveTarget, Axis3, AxisColors, GizmoAxis, GizmoMode, GizmoProportions, GizmoStateColors,
    GizmoUpdate, TransformControlCamera, TransformControlStyle, TransformTarget,
};
pub use util::{GizmoUtil, PickCamera, TargetProxy};

use crate::draw::draw_control;
use crate::interaction::{
    apply_target, pointer_input, setup_control, sync_control, update_scale_factor,
};

/// Plugin that wires the transform control into an app.
///
/// Registers the [`TransformControl`], [`TransformControlStyle`] and
/// [`GizmoProportions`] resources, builds the handle layouts at startup and
/// runs the sync / input / write-back / draw chain every frame.
pub struct TransformControlPlugin;

impl Plugin for TransformControlPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransformControl>()
            .init_resource::<TransformControlStyle>()
            .init_resource::<GizmoProportions>()
            .add_systems(Startup, setup_control)
            .add_systems(
                Update,
                (
                    sync_control,
                    update_scale_factor,
                    pointer_input,
                    apply_target,
                    draw_control,
                )
                    .chain(),
            );
    }
}
