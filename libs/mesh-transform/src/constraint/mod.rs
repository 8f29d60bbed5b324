//! # Axis Constraints
//!
//! Restricts a transform to one axis or one plane of an orientation frame.
//!
//! ## Projection
//!
//! - **Axis**: the mouse delta is measured along the axis as it appears on
//!   screen, so dragging along the drawn axis moves one unit per unit
//! - **Plane**: the delta is pushed along the view direction until it lies
//!   in the plane, which keeps the point under the mouse
//!
//! Rotation uses the constrained axis (or the plane normal), resize resets
//! unconstrained axes to 1.

use glam::{DMat3, DVec2, DVec3};

/// Per-axis constraint mask, X Y Z.
pub type ConstraintAxes = [bool; 3];

/// Frame the constraint axes are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// World axes
    #[default]
    Global,
    /// Axes of the edited object
    Local,
    /// Screen axes
    View,
    /// Frame around the selection normal
    Normal,
}

impl Orientation {
    /// Lowercase name used in header texts.
    pub fn name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
            Self::View => "view",
            Self::Normal => "normal",
        }
    }
}

/// Frames available to the constraint, computed once per operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationFrames {
    /// Normalized object axes
    pub local: DMat3,
    /// Inverse view rotation
    pub view: DMat3,
    /// Frame around the selection normal
    pub normal: DMat3,
}

impl Default for OrientationFrames {
    fn default() -> Self {
        Self {
            local: DMat3::IDENTITY,
            view: DMat3::IDENTITY,
            normal: DMat3::IDENTITY,
        }
    }
}

impl OrientationFrames {
    /// Matrix of the given orientation.
    pub fn matrix(&self, orientation: Orientation) -> DMat3 {
        match orientation {
            Orientation::Global => DMat3::IDENTITY,
            Orientation::Local => self.local,
            Orientation::View => self.view,
            Orientation::Normal => self.normal,
        }
    }
}

/// Axis or plane constraint of a running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Constrained axes: one for an axis, two for a plane
    pub axes: ConstraintAxes,
    /// Constraint is applied
    pub active: bool,
    /// Frame of the axes
    pub orientation: Orientation,
    /// Frame matrix, axes in columns
    pub mtx: DMat3,
    /// Inverse of `mtx`
    pub imtx: DMat3,
    /// Header text
    pub text: String,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            axes: [false; 3],
            active: false,
            orientation: Orientation::Global,
            mtx: DMat3::IDENTITY,
            imtx: DMat3::IDENTITY,
            text: String::new(),
        }
    }
}

const AXIS_NAMES: [char; 3] = ['X', 'Y', 'Z'];

impl Constraint {
    /// Constrains to the given axes of `orientation`.
    pub fn set(&mut self, axes: ConstraintAxes, orientation: Orientation, frames: &OrientationFrames) {
        let count = axes.iter().filter(|a| **a).count();
        if count == 0 || count == 3 {
            self.clear();
            return;
        }
        self.axes = axes;
        self.active = true;
        self.orientation = orientation;
        self.mtx = frames.matrix(orientation);
        self.imtx = crate::math::pseudo_inverse(self.mtx);
        self.text = if count == 1 {
            format!(" along {} {}", orientation.name(), AXIS_NAMES[self.first_axis()])
        } else {
            let locked = axes.iter().position(|a| !*a).unwrap_or(0);
            format!(" locking {} {}", orientation.name(), AXIS_NAMES[locked])
        };
    }

    /// Removes the constraint.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of constrained axes when active.
    pub fn dimension(&self) -> usize {
        if self.active {
            self.axes.iter().filter(|a| **a).count()
        } else {
            0
        }
    }

    fn first_axis(&self) -> usize {
        self.axes.iter().position(|a| *a).unwrap_or(0)
    }

    /// Axis letter identifying the constraint: the constrained axis, or the
    /// locked axis of a plane.
    pub fn mode_char(&self) -> Option<char> {
        match self.dimension() {
            1 => Some(AXIS_NAMES[self.first_axis()]),
            2 => self.axes.iter().position(|a| !*a).map(|i| AXIS_NAMES[i]),
            _ => None,
        }
    }

    /// Handles an axis key: the first press constrains in global space, a
    /// second press switches to `user_orientation` (local when that is
    /// global), a third press removes the constraint.
    pub fn cycle_axis(
        &mut self,
        axis: usize,
        plane: bool,
        user_orientation: Orientation,
        frames: &OrientationFrames,
    ) {
        let mut axes = [false; 3];
        if plane {
            axes = [true; 3];
            axes[axis] = false;
        } else {
            axes[axis] = true;
        }
        if self.mode_char() == Some(AXIS_NAMES[axis]) {
            if self.orientation != Orientation::Global {
                self.clear();
            } else {
                let orientation = if user_orientation != Orientation::Global {
                    user_orientation
                } else {
                    Orientation::Local
                };
                self.set(axes, orientation, frames);
            }
        } else {
            self.set(axes, Orientation::Global, frames);
        }
    }

    /// Drops the components of `v` outside the constrained axes, measured
    /// in the constraint frame.
    pub fn project_orthogonal(&self, v: DVec3) -> DVec3 {
        if self.dimension() == 0 {
            return v;
        }
        let local = self.imtx * v;
        let masked = DVec3::new(
            if self.axes[0] { local.x } else { 0.0 },
            if self.axes[1] { local.y } else { 0.0 },
            if self.axes[2] { local.z } else { 0.0 },
        );
        self.mtx * masked
    }

    /// Projects a translation onto the constraint. `view_dir` is the unit
    /// vector towards the viewer at the constraint center, `view_up` the
    /// screen up axis in world space.
    pub fn apply_vec(&self, input: DVec3, view_dir: DVec3, view_up: DVec3) -> DVec3 {
        match self.dimension() {
            1 => {
                let axis = self.mtx.col(self.first_axis()).normalize_or_zero();
                self.axis_projection(axis, input, view_dir, view_up)
            }
            2 => {
                let out = self.project_orthogonal(input);
                let diff = out - input;
                let factor = diff.dot(view_dir);
                if factor.abs() <= 0.001 {
                    return out;
                }
                input + view_dir * (diff.length_squared() / factor)
            }
            _ => input,
        }
    }

    fn axis_projection(&self, axis: DVec3, input: DVec3, view_dir: DVec3, view_up: DVec3) -> DVec3 {
        if input == DVec3::ZERO || axis == DVec3::ZERO {
            return DVec3::ZERO;
        }
        let mut angle = axis.angle_between(view_dir);
        if angle > std::f64::consts::FRAC_PI_2 {
            angle = std::f64::consts::PI - angle;
        }
        if angle.to_degrees() < 5.0 {
            // looking down the axis: vertical motion drives it
            let mut factor = input.dot(view_up) * 2.0;
            factor *= factor.abs();
            return axis * -factor;
        }
        let screen_axis = axis - view_dir * axis.dot(view_dir);
        let len_sq = screen_axis.length_squared();
        if len_sq < f64::EPSILON {
            return self.project_orthogonal(input);
        }
        axis * (input.dot(screen_axis) / len_sq)
    }

    /// Rotation axis and angle under the constraint, `None` when it does
    /// not define one. The angle flips when the axis faces the viewer so
    /// the rotation follows the mouse; numeric input keeps its sign.
    pub fn apply_rot(&self, angle: f64, view_dir: DVec3, numeric: bool) -> Option<(DVec3, f64)> {
        let axis_index = match self.dimension() {
            1 => self.first_axis(),
            2 => self.axes.iter().position(|a| !*a)?,
            _ => return None,
        };
        let axis = self.mtx.col(axis_index).normalize_or_zero();
        let angle = if !numeric && axis.dot(view_dir) > 0.0 {
            -angle
        } else {
            angle
        };
        Some((axis, angle))
    }

    /// Resets unconstrained axes of a scale matrix to 1 in the constraint
    /// frame.
    pub fn apply_size(&self, smat: DMat3) -> DMat3 {
        if self.dimension() == 0 {
            return smat;
        }
        let mut m = smat;
        if !self.axes[0] {
            m.x_axis.x = 1.0;
        }
        if !self.axes[1] {
            m.y_axis.y = 1.0;
        }
        if !self.axes[2] {
            m.z_axis.z = 1.0;
        }
        self.mtx * m * self.imtx
    }

    /// Picks the axis of `frames`' orientation whose screen direction best
    /// matches the mouse drag `drag` (window pixels). `project_dir` maps a
    /// world direction to its screen direction at the constraint center.
    pub fn select_from_drag(
        &mut self,
        drag: DVec2,
        orientation: Orientation,
        frames: &OrientationFrames,
        project_dir: impl Fn(DVec3) -> DVec2,
    ) {
        let drag = drag.normalize_or_zero();
        if drag == DVec2::ZERO {
            return;
        }
        let mtx = frames.matrix(orientation);
        let mut best: Option<(f64, usize)> = None;
        for i in 0..3 {
            let screen = project_dir(mtx.col(i)).normalize_or_zero();
            if screen == DVec2::ZERO {
                continue;
            }
            let score = screen.dot(drag).abs();
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, i));
            }
        }
        if let Some((_, i)) = best {
            let mut axes = [false; 3];
            axes[i] = true;
            self.set(axes, orientation, frames);
        }
    }
}
