//! # Selection Conversion
//!
//! Builds the flat element array of an operation from exactly one source
//! kind. Conversion only reads the target; nothing is written until the
//! operation applies a mode.
//!
//! ## Sources
//!
//! | Target | Elements |
//! |--------|----------|
//! | Mesh | visible vertices, edges for crease |
//! | Curve | Bezier handles and centers, poly points |
//! | Objects | selected objects, children of selected parents left out |
//!
//! Without proportional editing only selected elements are converted. With
//! it every visible element is, and the array is sorted selected first,
//! then by distance to the selection.

use crate::center::PivotMode;
use crate::curve::{Curve, SplinePoints};
use crate::element::{
    DataKind, EditTarget, ElementFlags, ElementHandle, ObjectExt, ScalarChannel, Symmetry,
    TransformData, TransformElement,
};
use crate::error::{TransformError, TransformResult};
use crate::host::{EntityRef, TransformHost};
use crate::math::{normalize_columns, pseudo_inverse, space_from_normal};
use crate::mesh::{EdgeId, EditMesh};
use crate::mirror::MirrorCache;
use crate::modes::ModeKind;
use crate::proportional::{
    curve_chain_distance, mesh_connectivity_distance, set_prop_dist, ProportionalSettings,
};
use crate::scene::{ObjectRotation, Scene};
use crate::view::ViewContext;
use config::constants::MIRROR_TOLERANCE;
use glam::{DMat3, DMat4, DVec3};
use tracing::debug;

/// Settings that shape the element array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvertOptions {
    /// Mode the operation starts in
    pub mode: ModeKind,
    /// Pivot placement
    pub pivot: PivotMode,
    /// Proportional editing
    pub proportional: ProportionalSettings,
    /// Mesh symmetry
    pub symmetry: Symmetry,
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Converts the selection of `target` into transform elements.
///
/// # Errors
///
/// [`TransformError::NothingToTransform`] when nothing is selected, even
/// with proportional editing, which needs at least one selected element.
pub fn create_trans_data(
    target: &EditTarget,
    host: &dyn TransformHost,
    view: &ViewContext,
    options: &ConvertOptions,
) -> TransformResult<TransformData> {
    let mut data = match target {
        EditTarget::Mesh(mesh) => {
            let obmat = host.world_matrix(EntityRef::EditObject);
            if options.mode == ModeKind::Crease {
                create_mesh_edges(mesh, obmat, options)?
            } else {
                create_mesh_verts(mesh, obmat, options)?
            }
        }
        EditTarget::Curve(curve) => {
            create_curve_verts(curve, host.world_matrix(EntityRef::EditObject), options)?
        }
        EditTarget::Objects(scene) => create_objects(scene, host, options)?,
    };

    let prop = &options.proportional;
    if prop.enabled {
        sort_trans_data(&mut data.elements);
        let proj_vec = prop.projected.then(|| view.view_axis());
        // rdist is filled in connected mode too, Alt+C may switch back
        match data.kind {
            DataKind::Mesh | DataKind::Curve => set_prop_dist(&mut data.elements, false, proj_vec),
            DataKind::Edges | DataKind::Objects => set_prop_dist(&mut data.elements, true, proj_vec),
        }
        sort_trans_data_dist(&mut data.elements, prop.connected);
    }

    debug!(
        kind = ?data.kind,
        total = data.len(),
        selected = data.selected_count(),
        "created transform data"
    );
    Ok(data)
}

// =============================================================================
// SORTING
// =============================================================================

/// Moves selected elements to the front, keeping relative order.
pub fn sort_trans_data(elements: &mut [TransformElement]) {
    elements.sort_by_key(|td| !td.is_selected());
}

/// Orders the unselected tail by connectivity distance when `connected`,
/// by straight distance otherwise. Selected elements must come first.
pub fn sort_trans_data_dist(elements: &mut [TransformElement], connected: bool) {
    let start = elements.iter().take_while(|td| td.is_selected()).count();
    let key = |td: &TransformElement| if connected { td.dist } else { td.rdist };
    elements[start..].sort_by(|a, b| key(a).total_cmp(&key(b)));
}

// =============================================================================
// MESH
// =============================================================================

fn edit_matrices(obmat: DMat4) -> (DMat3, DMat3) {
    let mtx = DMat3::from_mat4(obmat);
    // pseudo inverse keeps the other axes usable when one is scaled to zero
    (mtx, pseudo_inverse(mtx))
}

fn create_mesh_verts(
    mesh: &EditMesh,
    obmat: DMat4,
    options: &ConvertOptions,
) -> TransformResult<TransformData> {
    if mesh.selected_vertex_count() == 0 {
        return Err(TransformError::NothingToTransform);
    }
    let prop = options.proportional.enabled;
    let connected = prop && options.proportional.connected;
    let (mtx, smtx) = edit_matrices(obmat);

    let dists = connected.then(|| mesh_connectivity_distance(mesh, mtx));
    let normals = mesh.vertex_normals();

    let mirror = options
        .symmetry
        .mirror_x
        .then(|| MirrorCache::spatial(mesh, MIRROR_TOLERANCE));
    let mirror_side = if mirror.is_some() {
        let first = mesh.vertex_ids().find(|v| {
            let vert = mesh.vertex(*v);
            vert.selected && !vert.hidden && vert.position.x != 0.0
        });
        match first {
            Some(v) if mesh.position(v).x < 0.0 => -1.0,
            _ => 1.0,
        }
    } else {
        0.0
    };

    let mut data = TransformData::new(DataKind::Mesh);
    data.obmat = obmat;
    data.mirror_side = mirror_side;

    for v in mesh.vertex_ids() {
        let vert = mesh.vertex(v);
        if vert.hidden || !(prop || vert.selected) {
            continue;
        }
        let normal = normals[v.index()];
        let mut td = TransformElement::new(ElementHandle::MeshVertex(v), vert.position)
            .with_matrices(mtx, smtx);
        td.axismtx = if options.pivot.is_local() {
            space_from_normal(normal).unwrap_or(DMat3::IDENTITY)
        } else {
            DMat3::from_cols(DVec3::ZERO, DVec3::ZERO, normal)
        };
        if options.mode == ModeKind::ShrinkFatten {
            td.shell_factor = mesh.vertex_shell_factor(v, normal);
        }
        if vert.selected {
            td.flags.insert(ElementFlags::SELECTED);
        }
        if prop {
            match &dists {
                Some(dists) => td.dist = dists[v.index()],
                None => {
                    td.flags.insert(ElementFlags::NOTCONNECTED);
                    td.dist = f64::MAX;
                }
            }
        }
        if let Some(cache) = &mirror {
            if td.iloc.x * mirror_side > 0.0 {
                td.mirror = cache.lookup(v).filter(|partner| *partner != v);
                if let Some(partner) = td.mirror {
                    td.mirror_iloc = mesh.position(partner);
                }
            }
            if td.iloc.x.abs() <= MIRROR_TOLERANCE {
                td.flags.insert(ElementFlags::MIRROR_EDGE);
            }
        }
        data.elements.push(td);
    }
    Ok(data)
}

fn create_mesh_edges(
    mesh: &EditMesh,
    obmat: DMat4,
    options: &ConvertOptions,
) -> TransformResult<TransformData> {
    let visible = |e: &EdgeId| !mesh.edge(*e).hidden;
    if !mesh.edge_ids().filter(visible).any(|e| mesh.edge(e).selected) {
        return Err(TransformError::NothingToTransform);
    }
    let prop = options.proportional.enabled;
    let (mtx, smtx) = edit_matrices(obmat);

    let mut data = TransformData::new(DataKind::Edges);
    data.obmat = obmat;
    for e in mesh.edge_ids().filter(visible) {
        let edge = mesh.edge(e);
        if !(prop || edge.selected) {
            continue;
        }
        let (a, b) = mesh.edge_vertices(e);
        let mid = (mesh.position(a) + mesh.position(b)) * 0.5;
        let mut td = TransformElement::new(ElementHandle::MeshEdge(e), mid)
            .with_matrices(mtx, smtx)
            .with_scalar(ScalarChannel::Crease, edge.crease);
        if edge.selected {
            td.flags.insert(ElementFlags::SELECTED);
        }
        data.elements.push(td);
    }
    Ok(data)
}

// =============================================================================
// CURVE
// =============================================================================

fn create_curve_verts(
    curve: &Curve,
    obmat: DMat4,
    options: &ConvertOptions,
) -> TransformResult<TransformData> {
    let hide = curve.hide_handles;
    let any_selected = curve.splines.iter().any(|spline| match &spline.points {
        SplinePoints::Bezier(points) => points
            .iter()
            .any(|b| !b.hidden && b.transform_mask(hide).iter().any(|m| *m)),
        SplinePoints::Poly(points) => points.iter().any(|p| !p.hidden && p.selected),
    });
    if !any_selected {
        return Err(TransformError::NothingToTransform);
    }

    let prop = options.proportional.enabled;
    let local = options.pivot.is_local();
    let mode = options.mode;
    let (mtx, smtx) = edit_matrices(obmat);
    let mut data = TransformData::new(DataKind::Curve);
    data.obmat = obmat;

    for (si, spline) in curve.splines.iter().enumerate() {
        let mut head = data.elements.len();
        let mut split = false;
        match &spline.points {
            SplinePoints::Bezier(points) => {
                for (pi, bezt) in points.iter().enumerate() {
                    if bezt.hidden {
                        split = true;
                        close_chain(&mut data.elements, &mut head, prop, false);
                        continue;
                    }
                    let mask = bezt.transform_mask(hide);
                    for slot in 0..3 {
                        if !(prop || mask[slot]) {
                            continue;
                        }
                        let handle = ElementHandle::CurveBezier { spline: si, point: pi, slot };
                        let mut td = TransformElement::new(handle, bezt.vec[slot])
                            .with_matrices(mtx, smtx);
                        if slot == 1 {
                            td.center = bezt.vec[1];
                            if mode == ModeKind::CurveShrinkFatten {
                                td = td.with_scalar(ScalarChannel::Radius, bezt.radius);
                            } else if mode == ModeKind::Tilt {
                                td = td.with_scalar(ScalarChannel::Tilt, bezt.tilt);
                            }
                        } else {
                            let follow_center = hide || local || bezt.select[1];
                            td.center = bezt.vec[if follow_center { 1 } else { slot }];
                        }
                        // handles carried along by their center count as selected
                        if mask[slot] {
                            td.flags.insert(ElementFlags::SELECTED);
                        }
                        td.flags.insert(ElementFlags::BEZTRIPLE);
                        td.handle_types = Some([bezt.h1, bezt.h2]);
                        data.elements.push(td);
                    }
                }
            }
            SplinePoints::Poly(points) => {
                let channel = if matches!(mode, ModeKind::CurveShrinkFatten | ModeKind::Resize) {
                    ScalarChannel::Radius
                } else {
                    ScalarChannel::Tilt
                };
                for (pi, bp) in points.iter().enumerate() {
                    if bp.hidden {
                        split = true;
                        close_chain(&mut data.elements, &mut head, prop, false);
                        continue;
                    }
                    if !(prop || bp.selected) {
                        continue;
                    }
                    let value = match channel {
                        ScalarChannel::Radius => bp.radius,
                        _ => bp.tilt,
                    };
                    let mut td = TransformElement::new(ElementHandle::CurvePoint { spline: si, point: pi }, bp.co)
                        .with_matrices(mtx, smtx)
                        .with_scalar(channel, value);
                    if bp.selected {
                        td.flags.insert(ElementFlags::SELECTED);
                    }
                    data.elements.push(td);
                }
            }
        }
        close_chain(&mut data.elements, &mut head, prop, spline.cyclic && !split);
    }
    Ok(data)
}

/// Computes chain distances for the elements added since `head`.
fn close_chain(elements: &mut [TransformElement], head: &mut usize, prop: bool, cyclic: bool) {
    if prop && *head < elements.len() {
        curve_chain_distance(&mut elements[*head..], cyclic);
    }
    *head = elements.len();
}

// =============================================================================
// OBJECTS
// =============================================================================

fn create_objects(
    scene: &Scene,
    host: &dyn TransformHost,
    options: &ConvertOptions,
) -> TransformResult<TransformData> {
    // spinning children around their own origins is meaningful, so they
    // stay in the transform instead of following their parent
    let transform_children = options.pivot.is_local()
        && matches!(options.mode, ModeKind::Rotate | ModeKind::Trackball);
    let selected = |i: usize| {
        scene
            .objects
            .get(i)
            .is_some_and(|ob| ob.selected && !ob.hidden)
    };

    let mut data = TransformData::new(DataKind::Objects);
    for (i, ob) in scene.objects.iter().enumerate() {
        if !selected(i) {
            continue;
        }
        let mut flags = ElementFlags::SELECTED;
        if scene.has_ancestor(i, |parent| parent.selected && !parent.hidden) {
            if transform_children {
                flags |= ElementFlags::NOCENTER | ElementFlags::NO_LOC;
            } else {
                data.implied_children.push(ob.id);
                continue;
            }
        }
        if ob.linked {
            flags |= ElementFlags::SKIP;
        }
        let mut td = object_to_trans_data(scene, i, host);
        td.flags |= flags;
        data.elements.push(td);
    }
    if data.is_empty() {
        return Err(TransformError::NothingToTransform);
    }

    if options.proportional.enabled {
        for (i, ob) in scene.objects.iter().enumerate() {
            if ob.selected || ob.hidden || ob.linked {
                continue;
            }
            if !transform_children {
                let is_parent = (0..scene.objects.len())
                    .any(|j| selected(j) && scene.has_ancestor(j, |p| p.id == ob.id));
                let is_child = scene.has_ancestor(i, |p| p.selected && !p.hidden);
                if is_parent || is_child {
                    continue;
                }
            }
            data.elements.push(object_to_trans_data(scene, i, host));
        }
    }
    Ok(data)
}

fn object_to_trans_data(scene: &Scene, index: usize, host: &dyn TransformHost) -> TransformElement {
    let ob = &scene.objects[index];
    let entity = EntityRef::Object(ob.id);
    let world = host.world_matrix(entity);

    let mut td = TransformElement::new(ElementHandle::Object(ob.id), ob.location);
    td.axismtx = normalize_columns(DMat3::from_mat4(world));
    td.center = world.w_axis.truncate();
    td.ext = Some(ObjectExt::new(ob.rotation, ob.scale, world));
    td.locks = ob.locks;
    if matches!(ob.rotation, ObjectRotation::Quaternion(_)) {
        td.flags.insert(ElementFlags::USEQUAT);
    }
    if ob.parent.is_some() {
        // effect of the parent on this object's channels
        let obmtx = DMat3::from_mat4(host.local_matrix(entity));
        let totmat = DMat3::from_mat4(world);
        td.smtx = obmtx * pseudo_inverse(totmat);
        td.mtx = pseudo_inverse(td.smtx);
    }
    td
}

#[cfg(test)]
mod tests;
