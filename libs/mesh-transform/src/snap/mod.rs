//! # Snapping
//!
//! Increment snapping rounds mode values to a per-mode step; target
//! snapping replaces the translation with the offset to a point supplied by
//! the host (a vertex, edge or face it found under the mouse), optionally
//! with a surface normal to align to.

use glam::DVec3;

/// Point found by the host near the mouse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// Snap point in world space
    pub point: DVec3,
    /// Surface normal at the point, used to align rotation
    pub normal: Option<DVec3>,
}

/// Snapping state of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapping {
    /// Snapping requested by the settings
    pub enabled: bool,
    /// Temporarily inverted by the modifier key
    pub invert: bool,
    /// Current target, if the host found one
    pub target: Option<SnapTarget>,
    /// Rotate elements so their normal meets the target normal
    pub align_rotation: bool,
}

impl Snapping {
    /// Snapping in effect.
    pub fn is_active(&self) -> bool {
        self.enabled ^ self.invert
    }

    /// Offset from `center_global` to the target point.
    pub fn target_delta(&self, center_global: DVec3) -> Option<DVec3> {
        if !self.is_active() {
            return None;
        }
        self.target.map(|target| target.point - center_global)
    }

    /// Target normal to align to, when alignment is on.
    pub fn align_normal(&self) -> Option<DVec3> {
        if !self.is_active() || !self.align_rotation {
            return None;
        }
        self.target.and_then(|target| target.normal)
    }
}

/// Rounds each value to a multiple of the increment, using the fine step
/// while the precision modifier is held.
pub fn apply_increment(values: &mut [f64], coarse: f64, fine: f64, precision: bool) {
    let step = if precision { fine } else { coarse };
    if step <= 0.0 {
        return;
    }
    for v in values.iter_mut() {
        *v = (*v / step).round() * step;
    }
}

#[cfg(test)]
mod tests;
