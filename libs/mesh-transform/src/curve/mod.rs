//! # Edit Curve
//!
//! Curve data edited in place by a transform: Bezier splines made of
//! control points with two handles each, and poly splines made of plain
//! points.
//!
//! ## Handle Types
//!
//! | Type | Behaviour |
//! |------|-----------|
//! | Free | moves independently |
//! | Auto | recomputed from the neighbouring points |
//! | Vector | points at the neighbouring control point |
//! | Align | stays colinear with the opposite handle |
//!
//! Auto handle recomputation is a derived cache of the host, it is not
//! performed here.

use glam::DVec3;

/// Behaviour of one Bezier handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandleType {
    /// Moves independently.
    #[default]
    Free,
    /// Recomputed from the neighbouring points.
    Auto,
    /// Points at the neighbouring control point.
    Vector,
    /// Colinear with the opposite handle.
    Align,
}

impl HandleType {
    fn is_auto_or_align(self) -> bool {
        matches!(self, Self::Auto | Self::Align)
    }
}

/// Bezier control point: left handle, center, right handle.
#[derive(Debug, Clone, PartialEq)]
pub struct BezTriple {
    /// `[left handle, center, right handle]`
    pub vec: [DVec3; 3],
    /// Selection of each of the three points
    pub select: [bool; 3],
    /// Hidden control points never take part in a transform
    pub hidden: bool,
    /// Left handle type
    pub h1: HandleType,
    /// Right handle type
    pub h2: HandleType,
    /// Bevel radius
    pub radius: f64,
    /// Twist around the curve tangent, in radians
    pub tilt: f64,
}

impl BezTriple {
    /// Control point at `center` with handles offset by `handle`.
    pub fn new(center: DVec3, handle: DVec3) -> Self {
        Self {
            vec: [center - handle, center, center + handle],
            select: [false; 3],
            hidden: false,
            h1: HandleType::Align,
            h2: HandleType::Align,
            radius: 1.0,
            tilt: 0.0,
        }
    }

    /// Selects or deselects all three points.
    pub fn set_selected(&mut self, select: bool) {
        self.select = [select; 3];
    }

    /// True when any of the three points is selected.
    pub fn any_selected(&self) -> bool {
        self.select.iter().any(|s| *s)
    }

    /// Which of the three points a transform moves directly.
    ///
    /// With handles hidden, a selected center carries both handles. A
    /// partially selected triple whose handles are both auto or aligned is
    /// moved as a whole so the tangent stays intact.
    pub fn transform_mask(&self, hide_handles: bool) -> [bool; 3] {
        let mut mask = if hide_handles {
            [self.select[1]; 3]
        } else {
            self.select
        };
        if mask[1]
            && !(mask[0] && mask[2])
            && self.h1.is_auto_or_align()
            && self.h2.is_auto_or_align()
        {
            mask = [true; 3];
        }
        mask
    }

    /// Adjusts handle types after a partial move so the handles stay
    /// consistent with the edit.
    pub fn handles_test(&mut self, hide_handles: bool) {
        let sel = if hide_handles {
            [self.select[1]; 3]
        } else {
            self.select
        };
        let count = sel.iter().filter(|s| **s).count();
        if count == 0 || count == 3 {
            return;
        }
        if self.h1 == HandleType::Auto {
            self.h1 = HandleType::Align;
        }
        if self.h2 == HandleType::Auto {
            self.h2 = HandleType::Align;
        }
        if self.h1 == HandleType::Vector && sel[0] != sel[1] {
            self.h1 = HandleType::Free;
        }
        if self.h2 == HandleType::Vector && sel[2] != sel[1] {
            self.h2 = HandleType::Free;
        }
    }
}

/// Point of a poly or NURBS spline.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    /// Position (the rational weight is not edited)
    pub co: DVec3,
    /// Selection state
    pub selected: bool,
    /// Hidden state
    pub hidden: bool,
    /// Bevel radius
    pub radius: f64,
    /// Twist in radians
    pub tilt: f64,
}

impl CurvePoint {
    /// Unselected point at `co` with unit radius.
    pub fn new(co: DVec3) -> Self {
        Self {
            co,
            selected: false,
            hidden: false,
            radius: 1.0,
            tilt: 0.0,
        }
    }
}

/// Points of a spline.
#[derive(Debug, Clone, PartialEq)]
pub enum SplinePoints {
    /// Bezier control points
    Bezier(Vec<BezTriple>),
    /// Poly or NURBS points
    Poly(Vec<CurvePoint>),
}

/// One spline of a curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    /// Control points
    pub points: SplinePoints,
    /// Closed splines connect the last point back to the first
    pub cyclic: bool,
}

impl Spline {
    /// Number of control points.
    pub fn len(&self) -> usize {
        match &self.points {
            SplinePoints::Bezier(points) => points.len(),
            SplinePoints::Poly(points) => points.len(),
        }
    }

    /// Returns true when the spline has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Curve in edit mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    /// Splines of the curve
    pub splines: Vec<Spline>,
    /// Handles are not drawn and follow their control point
    pub hide_handles: bool,
}

impl Curve {
    /// Empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a Bezier spline and returns its index.
    pub fn add_bezier(&mut self, points: Vec<BezTriple>, cyclic: bool) -> usize {
        self.splines.push(Spline {
            points: SplinePoints::Bezier(points),
            cyclic,
        });
        self.splines.len() - 1
    }

    /// Appends a poly spline and returns its index.
    pub fn add_poly(&mut self, points: Vec<CurvePoint>, cyclic: bool) -> usize {
        self.splines.push(Spline {
            points: SplinePoints::Poly(points),
            cyclic,
        });
        self.splines.len() - 1
    }

    /// Bezier control point, if `spline` is a Bezier spline.
    pub fn bezier(&self, spline: usize, point: usize) -> Option<&BezTriple> {
        match &self.splines.get(spline)?.points {
            SplinePoints::Bezier(points) => points.get(point),
            SplinePoints::Poly(_) => None,
        }
    }

    /// Mutable Bezier control point.
    pub fn bezier_mut(&mut self, spline: usize, point: usize) -> Option<&mut BezTriple> {
        match &mut self.splines.get_mut(spline)?.points {
            SplinePoints::Bezier(points) => points.get_mut(point),
            SplinePoints::Poly(_) => None,
        }
    }

    /// Poly point, if `spline` is a poly spline.
    pub fn point(&self, spline: usize, point: usize) -> Option<&CurvePoint> {
        match &self.splines.get(spline)?.points {
            SplinePoints::Poly(points) => points.get(point),
            SplinePoints::Bezier(_) => None,
        }
    }

    /// Mutable poly point.
    pub fn point_mut(&mut self, spline: usize, point: usize) -> Option<&mut CurvePoint> {
        match &mut self.splines.get_mut(spline)?.points {
            SplinePoints::Poly(points) => points.get_mut(point),
            SplinePoints::Bezier(_) => None,
        }
    }

    /// Runs [`BezTriple::handles_test`] over every Bezier point.
    pub fn handles_test(&mut self) {
        let hide = self.hide_handles;
        for spline in &mut self.splines {
            if let SplinePoints::Bezier(points) = &mut spline.points {
                points
                    .iter_mut()
                    .filter(|bezt| !bezt.hidden)
                    .for_each(|bezt| bezt.handles_test(hide));
            }
        }
    }
}
