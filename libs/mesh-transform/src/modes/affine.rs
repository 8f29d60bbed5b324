//! Translate, rotate, trackball, resize, mirror and align.

use super::{element_resize, element_rotation, for_each_active, protected_loc, ModeContext, ModeSetup, TransformMode};
use crate::constraint::Constraint;
use crate::element::TransformData;
use crate::input::{InputMode, NumericInput};
use crate::math::{axis_angle_to_mat3, pseudo_inverse, rotation_between};
use config::constants::{RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION, TRANSLATE_SNAP_PRECISION};
use glam::{DMat3, DVec3};

/// Typed values land on the constrained axes in order; the other axes get
/// `fill`.
fn spread_to_axes(con: &Constraint, typed: [f64; 3], fill: f64) -> [f64; 3] {
    let mut out = [fill; 3];
    let mut next = 0;
    for axis in 0..3 {
        if con.axes[axis] {
            out[axis] = typed[next];
            next += 1;
        }
    }
    out
}

fn pivot_for(ctx: &ModeContext<'_>, td_center: DVec3) -> DVec3 {
    if ctx.pivot.is_local() {
        td_center
    } else {
        ctx.center.local
    }
}

// =============================================================================
// TRANSLATE
// =============================================================================

pub(super) fn init_translate(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::Vector, NumericInput::new(2));
    TransformMode::Translate
}

pub(super) fn apply_translate(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let con = ctx.constraint;
    let coarse = ctx.config.snap_increment;
    let fine = coarse * TRANSLATE_SNAP_PRECISION;

    let (vec, shown) = if ctx.preset {
        let vec = DVec3::from_array(values);
        (vec, vec)
    } else if ctx.constrained() {
        let vec = if ctx.numeric.is_active() {
            let mut typed = [0.0; 3];
            ctx.numeric.apply(&mut typed);
            con.mtx * DVec3::from_array(spread_to_axes(con, typed, 0.0))
        } else {
            let projected = match ctx.snapping.target_delta(ctx.center.global) {
                Some(delta) => con.project_orthogonal(delta),
                None => {
                    let up = ctx.view.viewinv.y_axis.truncate().normalize_or_zero();
                    con.apply_vec(DVec3::from_array(values), ctx.view_dir(), up)
                }
            };
            let mut local = (con.imtx * projected).to_array();
            ctx.snap_increment(&mut local, coarse, fine);
            con.mtx * DVec3::from_array(local)
        };
        (vec, con.imtx * vec)
    } else {
        let mut v = values;
        ctx.snap_increment(&mut v, coarse, fine);
        ctx.numeric.apply(&mut v);
        let mut vec = DVec3::from_array(v);
        if let Some(delta) = ctx.snapping.target_delta(ctx.center.global) {
            vec = delta;
        }
        (vec, vec)
    };

    let align = ctx.snapping.align_normal().zip(ctx.snapping.target);
    let points = data.is_edit_mode();
    let to_local = data.obmat.inverse();
    for_each_active(data, |td| {
        let mut offset = DVec3::ZERO;
        if let Some((normal, target)) = align {
            let pivot = if points {
                to_local.transform_point3(target.point)
            } else {
                target.point
            };
            let mat = rotation_between(td.axismtx.z_axis, normal);
            element_rotation(td, mat, pivot, points);
            offset = td.loc - td.iloc;
        }
        let tvec = (td.smtx * vec + offset) * td.factor;
        td.loc = td.iloc + protected_loc(td, tvec);
    });

    translate_header(ctx, shown, vec.length())
}

fn translate_header(ctx: &ModeContext<'_>, shown: DVec3, dist: f64) -> String {
    if ctx.numeric.is_active() && !ctx.preset {
        return format!("D: {} ({dist:.4}){}", ctx.numeric.text(), ctx.constraint.text);
    }
    let con = ctx.constraint;
    match con.dimension() {
        1 => {
            let axis = con.axes.iter().position(|a| *a).unwrap_or(0);
            format!("D: {:.4} ({dist:.4}){}", shown[axis], con.text)
        }
        2 => {
            let shown: Vec<String> = (0..3)
                .filter(|axis| con.axes[*axis])
                .map(|axis| format!("{:.4}", shown[axis]))
                .collect();
            format!("D: {}   D: {} ({dist:.4}){}", shown[0], shown[1], con.text)
        }
        _ => format!(
            "Dx: {:.4}   Dy: {:.4}  Dz: {:.4} ({dist:.4}){}",
            shown.x, shown.y, shown.z, con.text
        ),
    }
}

// =============================================================================
// ROTATE
// =============================================================================

pub(super) fn init_rotate(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(0);
    numeric.unit_rotation = true;
    setup.input(InputMode::Angle, numeric);
    TransformMode::Rotate
}

pub(super) fn apply_rotate(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let mut angle = [values[0]];
    let numeric = !ctx.preset && ctx.numeric.is_active();
    if !ctx.preset {
        let (coarse, fine) = ctx.rotation_increments();
        ctx.snap_increment(&mut angle, coarse, fine);
        ctx.numeric.apply(&mut angle);
    }
    let angle = angle[0];

    let default_axis = -ctx.view.view_axis();
    let (axis, final_angle) = ctx
        .constraint
        .apply_rot(angle, ctx.view_dir(), numeric || ctx.preset)
        .unwrap_or((default_axis, angle));

    let points = data.is_edit_mode();
    let per_element = ctx.constrained() || data.elements.iter().any(|td| td.factor != 1.0);
    let mat = axis_angle_to_mat3(axis, final_angle);
    for_each_active(data, |td| {
        let m = if per_element {
            axis_angle_to_mat3(axis, final_angle * td.factor)
        } else {
            mat
        };
        let center = pivot_for(ctx, td.center);
        element_rotation(td, m, center, points);
    });

    if numeric {
        format!("Rot: {}{}", ctx.numeric.text(), ctx.constraint.text)
    } else {
        format!("Rot: {:.2}{}", angle.to_degrees(), ctx.constraint.text)
    }
}

// =============================================================================
// TRACKBALL
// =============================================================================

pub(super) fn init_trackball(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(1);
    numeric.unit_rotation = true;
    setup.input(InputMode::Trackball, numeric);
    TransformMode::Trackball
}

pub(super) fn apply_trackball(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let mut phi = [values[0], values[1]];
    if !ctx.preset {
        let (coarse, fine) = ctx.rotation_increments();
        ctx.snap_increment(&mut phi, coarse, fine);
        ctx.numeric.apply(&mut phi);
    }

    let axis1 = ctx.view.persinv.x_axis.truncate().normalize_or_zero();
    let axis2 = ctx.view.persinv.y_axis.truncate().normalize_or_zero();
    let combined = axis1 * phi[0] + axis2 * phi[1];
    let angle = combined.length();
    let axis = combined.normalize_or_zero();

    let points = data.is_edit_mode();
    for_each_active(data, |td| {
        let mat = axis_angle_to_mat3(axis, angle * td.factor);
        let center = pivot_for(ctx, td.center);
        element_rotation(td, mat, center, points);
    });

    if ctx.numeric.is_active() && !ctx.preset {
        format!("Trackball: {}", ctx.numeric.text())
    } else {
        format!("Trackball: {:.2} {:.2}", phi[0].to_degrees(), phi[1].to_degrees())
    }
}

// =============================================================================
// RESIZE
// =============================================================================

pub(super) fn init_resize(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(2);
    numeric.null_one = [true; 3];
    numeric.affect_all = true;
    setup.input(InputMode::SpringFlip, numeric);
    TransformMode::Resize
}

pub(super) fn apply_resize(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let con = ctx.constraint;
    let size = if ctx.preset {
        values
    } else {
        let mut size = [values[0]; 3];
        ctx.snap_increment(&mut size, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION);
        let mut typed = size;
        if ctx.numeric.apply(&mut typed) {
            size = if ctx.constrained() {
                spread_to_axes(con, typed, 1.0)
            } else {
                typed
            };
        }
        size
    };

    let mat = con.apply_size(DMat3::from_diagonal(DVec3::from_array(size)));
    let points = data.is_edit_mode();
    for_each_active(data, |td| {
        let center = pivot_for(ctx, td.center);
        element_resize(td, mat, center, points);
    });

    if ctx.numeric.is_active() && !ctx.preset {
        return format!("Scale: {}{}", ctx.numeric.text(), con.text);
    }
    match con.dimension() {
        1 => {
            let axis = con.axes.iter().position(|a| *a).unwrap_or(0);
            format!("Scale: {:.4}{}", size[axis], con.text)
        }
        2 => {
            let shown: Vec<String> = (0..3)
                .filter(|axis| con.axes[*axis])
                .map(|axis| format!("{:.4}", size[axis]))
                .collect();
            format!("Scale: {} : {}{}", shown[0], shown[1], con.text)
        }
        _ => format!(
            "Scale X: {:.4}   Y: {:.4}  Z: {:.4}{}",
            size[0], size[1], size[2], con.text
        ),
    }
}

// =============================================================================
// MIRROR
// =============================================================================

pub(super) fn init_mirror(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::None, NumericInput::new(0));
    TransformMode::Mirror { done: false }
}

/// Scales by -1 along the constrained axes once an axis is chosen; until
/// then the elements stay where they are.
pub(super) fn apply_mirror(data: &mut TransformData, done: &mut bool, ctx: &ModeContext<'_>) -> String {
    let chosen = ctx.constrained();
    let scale = if chosen { -1.0 } else { 1.0 };
    let mat = if chosen {
        ctx.constraint.apply_size(DMat3::from_diagonal(DVec3::splat(scale)))
    } else {
        DMat3::IDENTITY
    };
    let points = data.is_edit_mode();
    for_each_active(data, |td| {
        let center = pivot_for(ctx, td.center);
        element_resize(td, mat, center, points);
    });
    *done = chosen;
    if chosen {
        format!("Mirror{}", ctx.constraint.text)
    } else {
        "Select a mirror axis (X, Y, Z)".to_string()
    }
}

// =============================================================================
// ALIGN
// =============================================================================

pub(super) fn init_align(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::None, NumericInput::new(0));
    TransformMode::Align
}

/// Rotates every element so its axis frame matches the global axes.
/// Objects always turn around their own origin.
pub(super) fn apply_align(data: &mut TransformData, ctx: &ModeContext<'_>) -> String {
    let points = data.is_edit_mode();
    for_each_active(data, |td| {
        let center = if points { pivot_for(ctx, td.center) } else { td.center };
        let mat = pseudo_inverse(td.axismtx);
        element_rotation(td, mat, center, points);
    });
    "Align".to_string()
}
