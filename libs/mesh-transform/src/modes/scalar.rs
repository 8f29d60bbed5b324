//! Modes editing a scalar channel instead of positions: curve tilt, curve
//! radius and edge crease.

use super::{for_each_active, ModeContext, ModeSetup, TransformMode};
use crate::element::TransformData;
use crate::input::{InputMode, NumericInput};
use config::constants::{CURVE_RADIUS_MIN, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION};

/// Snaps and types a single value.
fn single_value(value: f64, coarse: f64, fine: f64, ctx: &ModeContext<'_>) -> f64 {
    let mut v = [value];
    if !ctx.preset {
        ctx.snap_increment(&mut v, coarse, fine);
        ctx.numeric.apply(&mut v);
    }
    v[0]
}

fn typed_header(label: &str, ctx: &ModeContext<'_>) -> Option<String> {
    (ctx.numeric.is_active() && !ctx.preset).then(|| format!("{label}: {}", ctx.numeric.text()))
}

// =============================================================================
// TILT
// =============================================================================

pub(super) fn init_tilt(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(0);
    numeric.unit_rotation = true;
    setup.input(InputMode::Angle, numeric);
    TransformMode::Tilt
}

pub(super) fn apply_tilt(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let (coarse, fine) = ctx.rotation_increments();
    let angle = single_value(values[0], coarse, fine, ctx);

    for_each_active(data, |td| {
        if td.val.is_some() {
            td.val = Some(td.ival + angle * td.factor);
        }
    });

    typed_header("Tilt", ctx).unwrap_or_else(|| format!("Tilt: {:.2}°", angle.to_degrees()))
}

// =============================================================================
// CURVE SHRINK / FATTEN
// =============================================================================

pub(super) fn init_curve_shrink_fatten(setup: &mut ModeSetup<'_>) -> TransformMode {
    let mut numeric = NumericInput::new(0);
    numeric.null_one = [true; 3];
    setup.input(InputMode::Spring, numeric);
    TransformMode::CurveShrinkFatten
}

pub(super) fn apply_curve_shrink_fatten(
    data: &mut TransformData,
    values: [f64; 3],
    ctx: &ModeContext<'_>,
) -> String {
    let ratio = single_value(values[0], RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION, ctx);

    for_each_active(data, |td| {
        if td.val.is_none() {
            return;
        }
        let scaled = td.ival * ratio;
        let mut radius = scaled * td.factor + (1.0 - td.factor) * td.ival;
        if radius <= 0.0 {
            radius = CURVE_RADIUS_MIN;
        }
        td.val = Some(radius);
    });

    typed_header("Shrink/Fatten", ctx).unwrap_or_else(|| format!("Shrink/Fatten: {ratio:.4}"))
}

// =============================================================================
// CREASE
// =============================================================================

pub(super) fn init_crease(setup: &mut ModeSetup<'_>) -> TransformMode {
    setup.input(InputMode::SpringDelta, NumericInput::new(0));
    TransformMode::Crease
}

pub(super) fn apply_crease(data: &mut TransformData, values: [f64; 3], ctx: &ModeContext<'_>) -> String {
    let crease = single_value(values[0].min(1.0), RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION, ctx);

    for_each_active(data, |td| {
        if td.val.is_some() {
            td.val = Some((td.ival + crease * td.factor).clamp(0.0, 1.0));
        }
    });

    typed_header("Crease", ctx).unwrap_or_else(|| format!("Crease: {crease:+.3}"))
}
