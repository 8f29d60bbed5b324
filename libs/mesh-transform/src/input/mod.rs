//! # Mode Input
//!
//! Turns mouse positions or typed numbers into the values a mode applies.
//!
//! ## Mouse Mappings
//!
//! | Mode | Output |
//! |------|--------|
//! | Vector | world delta of the mouse at the pivot depth |
//! | Spring | distance to the pivot relative to the start distance |
//! | SpringFlip | Spring, negative once the mouse crosses the pivot |
//! | SpringDelta | Spring minus one |
//! | Angle | accumulated angle around the pivot |
//! | AngleSpring | Angle and Spring |
//! | Trackball | two angles from horizontal and vertical motion |
//! | HorizontalRatio / VerticalRatio | offset in tenths of the region |
//! | VerticalAbsolute | world delta along the screen up axis |
//! | CustomRatio / CustomRatioFlip | position along a custom screen segment |

mod numeric;

pub use numeric::NumericInput;

use crate::view::ViewContext;
use config::constants::{PRECISION_FACTOR, RATIO_INPUT_DIVISIONS, TRACKBALL_FACTOR};
use glam::{DVec2, DVec3};

/// How mouse motion maps to mode values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// No mouse input
    #[default]
    None,
    /// World space delta
    Vector,
    /// Distance ratio to the pivot
    Spring,
    /// Signed distance ratio
    SpringFlip,
    /// Distance ratio minus one
    SpringDelta,
    /// Angle around the pivot
    Angle,
    /// Angle and distance ratio
    AngleSpring,
    /// Two rotation angles
    Trackball,
    /// Horizontal offset ratio
    HorizontalRatio,
    /// Vertical offset ratio
    VerticalRatio,
    /// Vertical world delta
    VerticalAbsolute,
    /// Negated position along a custom segment
    CustomRatio,
    /// Position along a custom segment
    CustomRatioFlip,
}

/// Mouse state of a running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseInput {
    /// Active mapping
    pub mode: InputMode,
    /// Mouse position when the operation (or mode) started
    pub imval: DVec2,
    /// Pivot in window coordinates
    pub center: DVec2,
    /// Start distance to the pivot for the spring modes
    pub factor: f64,
    /// Precision modifier held
    pub precision: bool,
    /// Mouse position when precision was engaged
    pub precision_mval: DVec2,
    /// Segment for the custom ratio modes
    pub custom: Option<(DVec2, DVec2)>,
    angle: f64,
    mval_prev: DVec2,
}

impl MouseInput {
    /// Mouse input starting at `imval` around pivot `center`.
    pub fn new(imval: DVec2, center: DVec2) -> Self {
        Self {
            mode: InputMode::None,
            imval,
            center,
            factor: 1.0,
            precision: false,
            precision_mval: imval,
            custom: None,
            angle: 0.0,
            mval_prev: imval,
        }
    }

    /// Switches the mapping and resets the accumulated state.
    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
        self.angle = 0.0;
        self.mval_prev = self.imval;
        let dist = self.imval.distance(self.center);
        self.factor = if dist == 0.0 { 1.0 } else { dist };
    }

    /// Restarts from a new mouse position.
    pub fn reset(&mut self, imval: DVec2) {
        self.imval = imval;
        self.precision_mval = imval;
        self.set_mode(self.mode);
    }

    /// Engages or releases the precision modifier at `mval`.
    pub fn set_precision(&mut self, precision: bool, mval: DVec2) {
        if precision && !self.precision {
            self.precision_mval = mval;
        }
        self.precision = precision;
    }

    fn virtual_mval(&self, mval: DVec2) -> DVec2 {
        if self.precision {
            self.precision_mval + (mval - self.precision_mval) * PRECISION_FACTOR
        } else {
            mval
        }
    }

    /// Values for the current mouse position. `center_global` is the pivot
    /// in world space.
    pub fn apply(&mut self, view: &ViewContext, mval: DVec2, center_global: DVec3) -> [f64; 3] {
        let mut out = [0.0; 3];
        match self.mode {
            InputMode::None => {}
            InputMode::Vector => {
                let v = self.vector(view, mval, center_global);
                out = [v.x, v.y, v.z];
            }
            InputMode::Spring => out[0] = self.spring(mval),
            InputMode::SpringFlip => out[0] = self.spring_flip(mval),
            InputMode::SpringDelta => out[0] = self.spring(mval) - 1.0,
            InputMode::Angle => out[0] = self.angle(mval),
            InputMode::AngleSpring => {
                out[0] = self.angle(mval);
                out[1] = self.spring(mval);
            }
            InputMode::Trackball => {
                let m = self.virtual_mval(mval);
                out[0] = (self.imval.y - m.y) * TRACKBALL_FACTOR;
                out[1] = (m.x - self.imval.x) * TRACKBALL_FACTOR;
            }
            InputMode::HorizontalRatio => {
                let m = self.virtual_mval(mval);
                out[0] = (m.x - self.imval.x) / (view.winx / RATIO_INPUT_DIVISIONS);
            }
            InputMode::VerticalRatio => {
                let m = self.virtual_mval(mval);
                out[0] = (m.y - self.imval.y) / (view.winy / RATIO_INPUT_DIVISIONS);
            }
            InputMode::VerticalAbsolute => {
                let up = view.viewinv.y_axis.truncate().normalize_or_zero();
                let v = self.vector(view, mval, center_global);
                out[0] = v.dot(up) * 2.0;
            }
            InputMode::CustomRatioFlip => out[0] = self.custom_ratio(mval),
            InputMode::CustomRatio => out[0] = -self.custom_ratio(mval),
        }
        out
    }

    fn vector(&self, view: &ViewContext, mval: DVec2, center_global: DVec3) -> DVec3 {
        let m = self.virtual_mval(mval);
        view.win_to_delta(m - self.imval, center_global)
    }

    fn spring(&self, mval: DVec2) -> f64 {
        self.virtual_mval(mval).distance(self.center) / self.factor
    }

    fn spring_flip(&self, mval: DVec2) -> f64 {
        let ratio = self.spring(mval);
        let current = self.virtual_mval(mval) - self.center;
        let start = self.imval - self.center;
        if current.dot(start) < 0.0 {
            -ratio
        } else {
            ratio
        }
    }

    fn angle(&mut self, mval: DVec2) -> f64 {
        let prev = self.mval_prev - self.center;
        let cur = mval - self.center;
        let mut dphi = -prev.perp_dot(cur).atan2(prev.dot(cur));
        if self.precision {
            dphi *= PRECISION_FACTOR;
        }
        if dphi != 0.0 {
            self.angle += dphi;
            self.mval_prev = mval;
        }
        self.angle
    }

    fn custom_ratio(&self, mval: DVec2) -> f64 {
        let Some((start, end)) = self.custom else {
            return 0.0;
        };
        let d = end - start;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return 0.0;
        }
        (self.virtual_mval(mval) - end).dot(d) / len_sq
    }
}
