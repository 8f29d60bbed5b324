//! # Pivot Center
//!
//! Computes the point rotations and scales happen around. The center is
//! kept in the space of the element centers (object local space in edit
//! mode, world space for objects) together with its world position, its
//! window position and the depth factor used to turn mouse pixels into
//! world distances.

use crate::element::{ElementFlags, TransformData};
use crate::modes::ModeKind;
use crate::view::ViewContext;
use glam::{DVec2, DVec3};

/// Where the pivot sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotMode {
    /// Center of the selection bounding box
    BoundsCenter,
    /// Average of the selected element centers
    #[default]
    Median,
    /// The 3D cursor
    Cursor,
    /// The active element, median when there is none
    Active,
    /// Each element around its own center
    IndividualOrigins,
    /// Same as [`PivotMode::IndividualOrigins`]
    LocalOrigins,
}

impl PivotMode {
    /// Elements pivot around their own centers.
    pub fn is_local(self) -> bool {
        matches!(self, Self::IndividualOrigins | Self::LocalOrigins)
    }

    /// Pivot actually used for `mode` with `count` elements: transforming a
    /// single element around itself is no use, so rotate, resize and
    /// trackball fall back to its local origin.
    pub fn resolve(self, mode: ModeKind, count: usize) -> Self {
        if count == 1
            && matches!(self, Self::BoundsCenter | Self::Median | Self::Active)
            && matches!(mode, ModeKind::Resize | ModeKind::Rotate | ModeKind::Trackball)
        {
            Self::LocalOrigins
        } else {
            self
        }
    }
}

/// Pivot of a running operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformCenter {
    /// Center in element space
    pub local: DVec3,
    /// Center in world space
    pub global: DVec3,
    /// Center in window coordinates
    pub screen: DVec2,
    /// Depth factor at the center
    pub zfac: f64,
}

impl TransformCenter {
    /// Center at `local`, deriving the other spaces from the data and view.
    pub fn from_local(local: DVec3, data: &TransformData, view: &ViewContext) -> Self {
        let global = if data.is_edit_mode() {
            data.obmat.transform_point3(local)
        } else {
            local
        };
        Self {
            local,
            global,
            screen: view.project(global),
            zfac: view.zfac(global),
        }
    }
}

fn contributes(flags: ElementFlags) -> bool {
    flags.contains(ElementFlags::SELECTED) && !flags.contains(ElementFlags::NOCENTER)
}

/// Average center of the selected elements, origin when none counts.
pub fn center_median(data: &TransformData) -> DVec3 {
    let (sum, total) = data
        .elements
        .iter()
        .filter(|td| contributes(td.flags))
        .fold((DVec3::ZERO, 0usize), |(sum, n), td| (sum + td.center, n + 1));
    if total == 0 {
        DVec3::ZERO
    } else {
        sum / total as f64
    }
}

/// Middle of the bounding box of the selected element centers.
pub fn center_bounds(data: &TransformData) -> DVec3 {
    let mut bounds: Option<(DVec3, DVec3)> = None;
    for td in data.elements.iter().filter(|td| contributes(td.flags)) {
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(td.center), max.max(td.center)),
            None => (td.center, td.center),
        });
    }
    bounds.map_or(DVec3::ZERO, |(min, max)| (min + max) * 0.5)
}

/// The 3D cursor in element space.
pub fn center_cursor(data: &TransformData, view: &ViewContext) -> DVec3 {
    if data.is_edit_mode() {
        data.obmat.inverse().transform_point3(view.cursor)
    } else {
        view.cursor
    }
}

/// Computes the pivot. `active` is the active element's center in element
/// space; `center_override` replaces the computed center entirely.
pub fn calculate_center(
    data: &TransformData,
    pivot: PivotMode,
    view: &ViewContext,
    active: Option<DVec3>,
    center_override: Option<DVec3>,
) -> TransformCenter {
    let local = center_override.unwrap_or_else(|| match pivot {
        PivotMode::BoundsCenter => center_bounds(data),
        PivotMode::Cursor => center_cursor(data, view),
        PivotMode::Active => active.unwrap_or_else(|| center_median(data)),
        // the median still drives help lines and the constraint center
        PivotMode::Median | PivotMode::IndividualOrigins | PivotMode::LocalOrigins => {
            center_median(data)
        }
    });
    TransformCenter::from_local(local, data, view)
}
