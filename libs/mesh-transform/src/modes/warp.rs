//! Non-affine position modes: to sphere, shear, bend, shrink/fatten and
//! push/pull.

use super::{element_rotation, for_each_active, ModeContext, ModeSetup, TransformMode};
use crate::element::TransformData;
use crate::input::{InputMode, NumericInput};
use crate::math::{axis_angle_to_mat3, line_point_factor, shell_angle_to_dist, with_length};
use config::constants::{
    RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION, TRANSLATE_SNAP_INCREMENT, TRANSLATE_SNAP_PRECISION,
};
use glam::{DMat3, DVec3};

// =============================================================================
// TO SPHERE
// =============================================================================

pub(super) fn init_to_sphere(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(0);
    numeric.null_one = [true; 3];
    numeric.no_negative = [true; 3];
    setup.input(InputMode::HorizontalRatio, numeric);

    let center = setup.center.local;
    let elements = &setup.data.elements;
    let radius = if elements.is_empty() {
        0.0
    } else {
        elements.iter().map(|td| td.iloc.distance(center)).sum::<f64>() / elements.len() as f64
    };
    TransformMode::ToSphere { radius }
}

pub(super) fn apply_to_sphere(
    data: &mut TransformData,
    radius: f64,
    values: [f64; 3],
    ctx: &ModeContext<'_>,
) -> String {
    let mut ratio = [values[0]];
    if !ctx.preset {
        ctx.snap_increment(&mut ratio, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION);
        ctx.numeric.apply(&mut ratio);
    }
    let ratio = ratio[0].clamp(0.0, 1.0);

    let center = ctx.center.local;
    for_each_active(data, |td| {
        let mut dir = td.iloc - center;
        let len = crate::math::normalize_in_place(&mut dir);
        let tratio = ratio * td.factor;
        td.loc = center + dir * (len * (1.0 - tratio) + radius * tratio);
    });

    if ctx.numeric.is_active() && !ctx.preset {
        format!("To Sphere: {}", ctx.numeric.text())
    } else {
        format!("To Sphere: {ratio:.4}")
    }
}

// =============================================================================
// SHEAR
// =============================================================================

pub(super) fn init_shear(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::HorizontalRatio, NumericInput::new(0));
    TransformMode::Shear { vertical: false }
}

pub(super) fn apply_shear(
    data: &mut TransformData,
    vertical: bool,
    values: [f64; 3],
    ctx: &ModeContext<'_>,
) -> String {
    let mut value = [values[0]];
    if !ctx.preset {
        ctx.snap_increment(&mut value, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION);
        ctx.numeric.apply(&mut value);
    }
    let value = value[0];

    let mut smat = DMat3::IDENTITY;
    if vertical {
        smat.x_axis.y = value;
    } else {
        smat.y_axis.x = value;
    }
    let totmat = ctx.view.view_rotation_inv() * smat * ctx.view.view_rotation();

    let points = data.is_edit_mode();
    let local = ctx.pivot.is_local();
    for_each_active(data, |td| {
        let tmat = if points { td.smtx * totmat * td.mtx } else { totmat };
        let (center, co) = if local {
            (td.center, td.iloc)
        } else {
            (ctx.center.local, td.center)
        };
        let vec = (tmat * (co - center) + center - co) * td.factor;
        td.loc = td.iloc + vec;
    });

    if ctx.numeric.is_active() && !ctx.preset {
        format!("Shear: {}", ctx.numeric.text())
    } else {
        format!("Shear: {value:.3}")
    }
}

// =============================================================================
// BEND
// =============================================================================

/// Bend line fixed when the mode starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendState {
    /// Start of the bend line (the cursor) in element space
    pub warp_sta: DVec3,
    /// Point under the mouse at start, in element space
    pub warp_end: DVec3,
    /// Bend axis (the view direction)
    pub warp_nor: DVec3,
    /// Unit direction the bend pivot moves along
    pub warp_tan: DVec3,
    /// Distance between start and end at init
    pub warp_init_dist: f64,
    /// Points beyond the bend line keep bending instead of following the
    /// end rigidly
    pub unclamped: bool,
}

pub(super) fn init_bend(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(1);
    numeric.unit_rotation = true;
    let cursor = setup.view.cursor;
    setup.mouse.center = setup.view.project(cursor);
    setup.input(InputMode::AngleSpring, numeric);

    let mut warp_sta = cursor;
    let mut warp_end = setup.view.win_to_3d(cursor, setup.mval);
    if setup.data.is_edit_mode() {
        let offset = setup.data.obmat.w_axis.truncate();
        warp_sta -= offset;
        warp_end -= offset;
    }
    let warp_nor = setup.view.view_axis();
    let warp_tan = (warp_end - warp_sta).cross(warp_nor).normalize_or_zero();
    TransformMode::Bend(BendState {
        warp_sta,
        warp_end,
        warp_nor,
        warp_tan,
        warp_init_dist: warp_end.distance(warp_sta),
        unclamped: false,
    })
}

pub(super) fn apply_bend(
    data: &mut TransformData,
    state: &BendState,
    values: [f64; 3],
    ctx: &ModeContext<'_>,
) -> String {
    let mut v = [values[0], values[1]];
    if !ctx.preset {
        let (coarse, fine) = ctx.rotation_increments();
        ctx.snap_increment(&mut v[..1], coarse, fine);
        // typed radius is absolute, mouse radius is relative to the start
        if ctx.numeric.apply(&mut v) && state.warp_init_dist != 0.0 {
            v[1] /= state.warp_init_dist;
        }
    }
    let shown_angle = v[0];
    let angle = -v[0];
    let scale = v[1] * state.warp_init_dist;

    let sta = state.warp_sta;
    let end_radius = sta + (state.warp_end - sta).normalize_or_zero() * scale;
    let pivot = if angle > 0.0 {
        sta + state.warp_tan * (-scale * shell_angle_to_dist(std::f64::consts::FRAC_PI_2 - angle))
    } else {
        sta + state.warp_tan * (scale * shell_angle_to_dist(std::f64::consts::FRAC_PI_2 + angle))
    };

    let points = data.is_edit_mode();
    let clamp = !state.unclamped;
    for_each_active(data, |td| {
        if angle == 0.0 {
            td.loc = td.iloc;
            return;
        }
        let mut vec = td.mtx * td.iloc;
        let mut fac = line_point_factor(vec, sta, end_radius);
        if clamp {
            fac = fac.clamp(0.0, 1.0);
        }
        let fac_scaled = fac * td.factor;
        let mat = axis_angle_to_mat3(state.warp_nor, angle * fac_scaled);
        let delta = sta.lerp(end_radius, fac_scaled) - sta;
        vec = mat * (vec - delta - pivot) + pivot;
        let loc = td.smtx * vec;
        if !points {
            let center = td.center;
            element_rotation(td, mat, center, false);
        }
        td.loc = loc;
    });

    if ctx.numeric.is_active() && !ctx.preset {
        format!("Bend: {}", ctx.numeric.text())
    } else {
        format!(
            "Bend Angle: {:.3} Radius: {:.4}, Alt, Clamp {}",
            shown_angle.to_degrees(),
            scale,
            if clamp { "ON" } else { "OFF" }
        )
    }
}

// =============================================================================
// SHRINK / FATTEN
// =============================================================================

pub(super) fn init_shrink_fatten(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::VerticalAbsolute, NumericInput::new(0));
    TransformMode::ShrinkFatten { even: false }
}

pub(super) fn apply_shrink_fatten(
    data: &mut TransformData,
    even: bool,
    values: [f64; 3],
    ctx: &ModeContext<'_>,
) -> String {
    let mut distance = [-values[0]];
    if !ctx.preset {
        ctx.snap_increment(&mut distance, TRANSLATE_SNAP_INCREMENT, TRANSLATE_SNAP_PRECISION);
        ctx.numeric.apply(&mut distance);
    }
    let distance = distance[0];

    for_each_active(data, |td| {
        let mut tdistance = distance * td.factor;
        if even {
            tdistance *= td.shell_factor;
        }
        td.loc = td.iloc + td.axismtx.z_axis * tdistance;
    });

    let even_text = if even { "ON" } else { "OFF" };
    if ctx.numeric.is_active() && !ctx.preset {
        format!("Shrink/Fatten: {}, (S)Even Thickness {even_text}", ctx.numeric.text())
    } else {
        format!("Shrink/Fatten: {distance:.4}, (S)Even Thickness {even_text}")
    }
}

// =============================================================================
// PUSH / PULL
// =============================================================================

pub(super) fn init_push_pull(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::VerticalAbsolute, NumericInput::new(0));
    TransformMode::PushPull
}

pub(super) fn apply_push_pull(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let mut distance = [values[0]];
    if !ctx.preset {
        ctx.snap_increment(&mut distance, TRANSLATE_SNAP_INCREMENT, TRANSLATE_SNAP_PRECISION);
        ctx.numeric.apply(&mut distance);
    }
    let distance = distance[0];

    let con = ctx.constraint;
    let axis = con.apply_rot(0.0, ctx.view_dir(), true).map(|(axis, _)| axis);
    let plane = con.dimension() == 2;
    let center = ctx.center.local;
    for_each_active(data, |td| {
        let mut vec = center - td.center;
        if let Some(axis) = axis {
            let axis = td.smtx * axis;
            let len_sq = axis.length_squared();
            if len_sq > 0.0 {
                let along = axis * (vec.dot(axis) / len_sq);
                vec = if plane { vec - along } else { along };
            }
        }
        td.loc = td.iloc + with_length(vec, distance * td.factor);
    });

    if ctx.numeric.is_active() && !ctx.preset {
        format!("Push/Pull: {}{}", ctx.numeric.text(), con.text)
    } else {
        format!("Push/Pull: {distance:.4}{}", con.text)
    }
}
