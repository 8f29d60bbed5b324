//! Edit targets and element writeback.

use super::{DataKind, ElementFlags, ElementHandle, ScalarChannel, TransformData, TransformElement};
use crate::curve::Curve;
use crate::error::{TransformError, TransformResult};
use crate::mesh::EditMesh;
use crate::scene::Scene;
use config::constants::MIRROR_TOLERANCE;
use glam::DVec3;
use tracing::warn;

/// Per-axis clipping against the mirror plane, as done by a mirror
/// modifier with clipping enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSettings {
    /// Axes to clip
    pub axes: [bool; 3],
    /// Distance from the plane under which a point sticks to it
    pub tolerance: f64,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            axes: [true, false, false],
            tolerance: MIRROR_TOLERANCE,
        }
    }
}

/// Symmetry options for mesh editing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Symmetry {
    /// Mirror edits across the local X = 0 plane
    pub mirror_x: bool,
    /// Clip points to the mirror plane
    pub clip: Option<ClipSettings>,
}

/// Entity being transformed. Exactly one source kind per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    /// Mesh in edit mode
    Mesh(EditMesh),
    /// Curve in edit mode
    Curve(Curve),
    /// Scene objects
    Objects(Scene),
}

impl EditTarget {
    /// The edited mesh, if any.
    pub fn mesh(&self) -> Option<&EditMesh> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Mutable edited mesh.
    pub fn mesh_mut(&mut self) -> Option<&mut EditMesh> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// The edited curve, if any.
    pub fn curve(&self) -> Option<&Curve> {
        match self {
            Self::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    /// The scene, in object mode.
    pub fn scene(&self) -> Option<&Scene> {
        match self {
            Self::Objects(scene) => Some(scene),
            _ => None,
        }
    }

    /// Writes one element through the owner's setters.
    pub fn write_element(&mut self, td: &TransformElement) -> TransformResult<()> {
        match (self, td.handle) {
            (Self::Mesh(mesh), ElementHandle::MeshVertex(v)) => {
                if mesh.get_vertex(v).is_none() {
                    return Err(TransformError::invalid_element(format!("vertex {}", v.0)));
                }
                mesh.set_position(v, td.loc);
                Ok(())
            }
            (Self::Mesh(mesh), ElementHandle::MeshEdge(e)) => {
                let edge = mesh
                    .get_edge(e)
                    .ok_or_else(|| TransformError::invalid_element(format!("edge {}", e.0)))?;
                let crease = td.val.unwrap_or(edge.crease);
                mesh.edge_mut(e).crease = crease;
                Ok(())
            }
            (Self::Curve(curve), ElementHandle::CurveBezier { spline, point, slot }) => {
                let bezt = curve.bezier_mut(spline, point).ok_or_else(|| {
                    TransformError::invalid_element(format!("bezier point {spline}:{point}"))
                })?;
                if slot > 2 {
                    return Err(TransformError::invalid_element(format!("handle slot {slot}")));
                }
                bezt.vec[slot] = td.loc;
                if let Some(val) = td.val {
                    match td.channel {
                        ScalarChannel::Radius => bezt.radius = val,
                        ScalarChannel::Tilt => bezt.tilt = val,
                        _ => {}
                    }
                }
                Ok(())
            }
            (Self::Curve(curve), ElementHandle::CurvePoint { spline, point }) => {
                let bp = curve.point_mut(spline, point).ok_or_else(|| {
                    TransformError::invalid_element(format!("curve point {spline}:{point}"))
                })?;
                bp.co = td.loc;
                if let Some(val) = td.val {
                    match td.channel {
                        ScalarChannel::Radius => bp.radius = val,
                        ScalarChannel::Tilt => bp.tilt = val,
                        _ => {}
                    }
                }
                Ok(())
            }
            (Self::Objects(scene), ElementHandle::Object(id)) => {
                let ob = scene
                    .object_mut(id)
                    .ok_or_else(|| TransformError::invalid_element(format!("object {}", id.0)))?;
                ob.location = td.loc;
                if let Some(ext) = &td.ext {
                    ob.rotation = ext.rot;
                    ob.scale = ext.size;
                }
                Ok(())
            }
            (_, handle) => Err(TransformError::invalid_element(format!(
                "{handle:?} does not belong to this target"
            ))),
        }
    }

    /// Writes every element back and applies the symmetry rules.
    ///
    /// Elements whose storage vanished are flagged and skipped for the rest
    /// of the operation.
    pub fn recalc(
        &mut self,
        data: &mut TransformData,
        cancelled: bool,
        symmetry: &Symmetry,
        handles_test: bool,
    ) {
        if data.kind == DataKind::Mesh && !cancelled {
            if let Some(clip) = &symmetry.clip {
                for td in &mut data.elements {
                    clip_element(td, clip);
                }
            }
        }

        let mirror = data.kind == DataKind::Mesh && symmetry.mirror_x;
        for td in &mut data.elements {
            if mirror && !cancelled && td.flags.contains(ElementFlags::MIRROR_EDGE) {
                td.loc.x = 0.0;
            }
            if let Err(err) = self.write_element(td) {
                warn!(handle = ?td.handle, %err, "element storage vanished, skipping");
                td.flags.insert(ElementFlags::SKIP);
                continue;
            }
            if !mirror {
                continue;
            }
            if let (Some(partner), Self::Mesh(mesh)) = (td.mirror, &mut *self) {
                if mesh.get_vertex(partner).is_some() {
                    let position = if cancelled {
                        td.mirror_iloc
                    } else {
                        DVec3::new(-td.loc.x, td.loc.y, td.loc.z)
                    };
                    mesh.set_position(partner, position);
                } else {
                    warn!(partner = partner.0, "mirror partner vanished, skipping element");
                    td.mirror = None;
                    td.flags.insert(ElementFlags::SKIP);
                }
            }
        }

        if let Self::Curve(curve) = self {
            if cancelled {
                restore_handle_types(curve, data);
            } else if handles_test {
                curve.handles_test();
            }
        }
    }
}

fn clip_element(td: &mut TransformElement, clip: &ClipSettings) {
    if !td.has_location() {
        return;
    }
    for axis in 0..3 {
        if !clip.axes[axis] {
            continue;
        }
        let iloc = td.iloc[axis];
        let loc = td.loc[axis];
        if iloc.abs() <= clip.tolerance || loc * iloc < 0.0 {
            td.loc[axis] = 0.0;
        }
    }
}

fn restore_handle_types(curve: &mut Curve, data: &TransformData) {
    for td in &data.elements {
        let (ElementHandle::CurveBezier { spline, point, .. }, Some([h1, h2])) =
            (td.handle, td.handle_types)
        else {
            continue;
        };
        if let Some(bezt) = curve.bezier_mut(spline, point) {
            bezt.h1 = h1;
            bezt.h2 = h2;
        }
    }
}
