//! Edge slide: rails on both sides of selected edge loops.

use super::{
    element_lookup, mirror_partners, project_local, slide_header, SlideOptions, SlideOrigData,
};
use crate::element::{ElementFlags, TransformData};
use crate::error::{TransformError, TransformResult};
use crate::event::{Event, Key, KeyState};
use crate::input::{InputMode, NumericInput};
use crate::math::{
    dist_squared_to_segment_2d, interp_line_v3, isect_line_plane, line_point_factor,
    normalize_in_place, with_length,
};
use crate::mesh::{EdgeId, EditMesh, HalfedgeId, VertexId};
use crate::modes::{ModeContext, ModeEventContext, ModeSetup, SlideMode};
use crate::view::ViewContext;
use config::constants::{
    FLT_EPSILON, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION, SLIDE_FALLBACK_SCREEN_LEN,
    SLIDE_MIN_SCREEN_DIR_SQ,
};
use glam::{DMat4, DVec2, DVec3};
use tracing::debug;

// =============================================================================
// TYPES
// =============================================================================

/// One slid vertex with its two rails.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSlideVert {
    /// Slid vertex
    pub vertex: VertexId,
    /// Position when the slide started
    pub orig: DVec3,
    /// Position for the current factor
    pub co: DVec3,
    /// Vertex at the far end of each rail, if the rail follows an edge
    pub side_vertex: [Option<VertexId>; 2],
    /// Rail vectors; a zero vector means there is no rail on that side
    pub dir: [DVec3; 2],
    /// Distance between the two rail ends, used by even sliding
    pub edge_len: f64,
    /// Edge loop the vertex belongs to
    pub loop_nr: usize,
    element: Option<usize>,
}

impl EdgeSlideVert {
    fn new(vertex: VertexId, orig: DVec3) -> Self {
        Self {
            vertex,
            orig,
            co: orig,
            side_vertex: [None; 2],
            dir: [DVec3::ZERO; 2],
            edge_len: 0.0,
            loop_nr: 0,
            element: None,
        }
    }
}

/// Edge slide state of a running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSlide {
    /// Slid vertices
    pub verts: Vec<EdgeSlideVert>,
    /// Vertex whose rail length drives even sliding
    pub curr_sv_index: usize,
    even: bool,
    flipped: bool,
    clamp: bool,
    /// Side used by unclamped sliding, kept from the last clamped step
    curr_side_unclamp: bool,
    mval_start: DVec2,
    mval_end: DVec2,
    perc: f64,
    orig_data: Option<SlideOrigData>,
}

// =============================================================================
// TOPOLOGY WALK
// =============================================================================

/// The other selected edge at `v`.
fn other_selected_edge(mesh: &EditMesh, v: VertexId, e: EdgeId) -> Option<EdgeId> {
    mesh.vertex_edges(v)
        .iter()
        .copied()
        .find(|e_iter| *e_iter != e && mesh.edge(*e_iter).selected)
}

/// Vertices in the middle of a surface get the averaged fan direction,
/// boundary vertices slide straight along their boundary edge.
fn is_inner(mesh: &EditMesh, v: VertexId, e_dir: EdgeId) -> bool {
    !mesh.edge_is_boundary(e_dir) && mesh.vertex_nonwire_edge_count(v) == 2
}

fn averaged(accum: DVec3, accum_len: f64, count: usize) -> DVec3 {
    if count > 0 {
        with_length(accum, accum_len / count as f64)
    } else {
        accum
    }
}

/// Closest point where the face edges opposite `l` cross the plane through
/// its corner.
fn opposite_co(mesh: &EditMesh, l: HalfedgeId, plane_no: DVec3) -> Option<DVec3> {
    let co = mesh.position(mesh.origin(l));
    let l_last = mesh.prev(l);
    let mut l_iter = mesh.next(l);
    let mut best: Option<(f64, DVec3)> = None;
    loop {
        let a = mesh.position(mesh.origin(l_iter));
        let b = mesh.position(mesh.dest(l_iter));
        if let Some(p) = isect_line_plane(a, b, co, plane_no) {
            let fac = line_point_factor(p, a, b);
            if fac > -FLT_EPSILON && fac < 1.0 + FLT_EPSILON {
                let dist = co.distance(p);
                if best.map_or(true, |(best_dist, _)| dist < best_dist) {
                    best = Some((dist, p));
                }
            }
        }
        l_iter = mesh.next(l_iter);
        if l_iter == l_last {
            break;
        }
    }
    best.map(|(_, p)| p)
}

/// Rail across the face of `l_first` when no edge fans out between
/// `e_prev` and `e_next`.
fn face_rail(mesh: &EditMesh, v: VertexId, l_first: HalfedgeId, e_prev: EdgeId, e_next: EdgeId) -> DVec3 {
    let Some(f) = mesh.loop_face(l_first) else {
        return DVec3::ZERO;
    };
    let Some(l) = mesh.face_vert_share_loop(f, v) else {
        return DVec3::ZERO;
    };
    let co = mesh.position(v);
    if mesh.face(f).len == 4 {
        // diagonal of the quad
        return mesh.position(mesh.origin(mesh.next(mesh.next(l)))) - co;
    }
    let tdir = mesh.loop_face_direction(l);
    let rail = mesh.face_normal(f).cross(tdir);
    let dist = match opposite_co(mesh, l, tdir) {
        Some(p) => co.distance(p),
        None => (mesh.edge_length(e_prev) + mesh.edge_length(e_next)) / 2.0,
    };
    with_length(rail, dist)
}

/// Steps from `l` around `v` towards `e_next`, averaging the edges passed
/// on the way into a rail. Returns the corner reached on `e_next` (if any)
/// and the rail.
fn next_loop(
    mesh: &EditMesh,
    v: VertexId,
    l: HalfedgeId,
    e_prev: EdgeId,
    e_next: EdgeId,
) -> (Option<HalfedgeId>, DVec3) {
    let co = mesh.position(v);
    let l_first = l;
    let mut l = l;
    let mut accum = DVec3::ZERO;
    let mut accum_len = 0.0;
    let mut count = 0;
    loop {
        l = mesh.loop_other_edge_loop(l, v);
        if mesh.loop_edge(l) == e_next {
            let rail = if count > 0 {
                averaged(accum, accum_len, count)
            } else {
                face_rail(mesh, v, l_first, e_prev, e_next)
            };
            return (Some(l), rail);
        }

        let mut tvec = mesh.position(mesh.edge_other_vertex(mesh.loop_edge(l), v)) - co;
        accum_len += normalize_in_place(&mut tvec);
        accum += tvec;
        count += 1;

        let l_other = mesh.loop_other_edge_loop(l, v);
        if mesh.loop_edge(l_other) == e_next {
            return (Some(l_other), averaged(accum, accum_len, count));
        }

        let radial = mesh.radial_next(l);
        if radial == l || radial == l_first {
            break;
        }
        l = radial;
    }
    (None, averaged(accum, accum_len, count))
}

/// Rail of the first vertex of a loop, on the side of corner `l`.
fn start_rail(mesh: &EditMesh, v: VertexId, l: HalfedgeId, e: EdgeId) -> DVec3 {
    if let Some(e_next) = other_selected_edge(mesh, v, e) {
        return next_loop(mesh, v, l, e, e_next).1;
    }
    let e_tmp = mesh.loop_edge(mesh.loop_other_edge_loop(l, v));
    if is_inner(mesh, v, e_tmp) {
        next_loop(mesh, v, l, e, e_tmp).1
    } else {
        mesh.position(mesh.edge_other_vertex(e_tmp, v)) - mesh.position(v)
    }
}

/// Rail of the last vertex of an open loop, on the side of corner `l`.
fn end_rail(mesh: &EditMesh, v: VertexId, l: HalfedgeId, e_prev: EdgeId) -> (VertexId, DVec3) {
    let e_tmp = mesh.loop_edge(mesh.loop_other_edge_loop(l, v));
    let side = mesh.edge_other_vertex(e_tmp, v);
    let rail = if is_inner(mesh, v, e_tmp) {
        next_loop(mesh, v, l, e_prev, e_tmp).1
    } else {
        mesh.position(side) - mesh.position(v)
    };
    (side, rail)
}

fn radial_other(mesh: &EditMesh, l: HalfedgeId) -> Option<HalfedgeId> {
    let radial = mesh.radial_next(l);
    (radial != l).then_some(radial)
}

/// Slot of `v` in `verts`, created on first use.
fn slot(
    table: &mut [Option<usize>],
    verts: &mut Vec<EdgeSlideVert>,
    mesh: &EditMesh,
    v: VertexId,
) -> usize {
    *table[v.index()].get_or_insert_with(|| {
        verts.push(EdgeSlideVert::new(v, mesh.position(v)));
        verts.len() - 1
    })
}

// =============================================================================
// BUILD
// =============================================================================

impl EdgeSlide {
    fn with_verts(verts: Vec<EdgeSlideVert>, options: &SlideOptions, flipped: bool) -> Self {
        Self {
            verts,
            curr_sv_index: 0,
            even: options.even,
            flipped,
            clamp: options.clamp,
            curr_side_unclamp: false,
            mval_start: DVec2::ZERO,
            mval_end: DVec2::ZERO,
            perc: 0.0,
            orig_data: None,
        }
    }

    /// Analyses the selected edge loops of `mesh` and builds two rails per
    /// vertex. `obmat` places the mesh in the world and `mval` is the mouse
    /// position used to orient the loops.
    ///
    /// # Errors
    ///
    /// [`TransformError::SlideUnavailable`] when a selected vertex has no
    /// or more than two selected edges, or a selected edge is neither
    /// manifold nor boundary.
    pub fn build_double_sided(
        mesh: &EditMesh,
        view: &ViewContext,
        obmat: DMat4,
        mval: DVec2,
        options: &SlideOptions,
    ) -> TransformResult<Self> {
        let nverts = mesh.vertex_count();
        let mut vert_edge: Vec<Option<EdgeId>> = vec![None; nverts];
        let mut tag = vec![false; nverts];

        for v in mesh.vertex_ids() {
            let vert = mesh.vertex(v);
            if !vert.selected || vert.hidden {
                continue;
            }
            let mut numsel = 0;
            for e in mesh.vertex_edges(v) {
                if mesh.edge(*e).selected {
                    vert_edge[v.index()] = Some(*e);
                    numsel += 1;
                }
            }
            if numsel == 0 || numsel > 2 {
                return Err(TransformError::slide_unavailable(format!(
                    "vertex {} has {numsel} selected edges",
                    v.0
                )));
            }
            tag[v.index()] = true;
        }

        for e in mesh.edge_ids() {
            if mesh.edge(e).selected && !mesh.edge_is_manifold(e) && !mesh.edge_is_boundary(e) {
                return Err(TransformError::slide_unavailable(format!(
                    "edge {} is neither manifold nor boundary",
                    e.0
                )));
            }
        }

        if !tag.iter().any(|t| *t) {
            return Err(TransformError::slide_unavailable("no selected vertices"));
        }

        let mut table: Vec<Option<usize>> = vec![None; nverts];
        let mut verts: Vec<EdgeSlideVert> = Vec::new();
        let mut loop_nr = 0;

        while let Some(start) = mesh.vertex_ids().find(|v| tag[v.index()]) {
            let Some(start_edge) = vert_edge[start.index()] else {
                tag[start.index()] = false;
                continue;
            };

            // rewind to the start of the loop
            let mut v = start;
            let mut e = start_edge;
            loop {
                let Some(next) = other_selected_edge(mesh, v, e) else {
                    e = vert_edge[v.index()].unwrap_or(e);
                    break;
                };
                e = next;
                let other = mesh.edge_other_vertex(e, v);
                if !tag[other.index()] {
                    break;
                }
                v = other;
                if e == start_edge {
                    break;
                }
            }
            tag[v.index()] = false;

            let Some(first_loop) = mesh.edge_loop(e) else {
                return Err(TransformError::slide_unavailable(format!("edge {} has no faces", e.0)));
            };
            let mut l_a = Some(first_loop);
            let mut l_b = radial_other(mesh, first_loop);
            let mut vec_a = start_rail(mesh, v, first_loop, e);
            let mut vec_b = l_b.map_or(DVec3::ZERO, |l| start_rail(mesh, v, l, e));
            let mut l_a_prev: Option<HalfedgeId> = None;
            let mut l_b_prev: Option<HalfedgeId> = None;
            let first_edge = vert_edge[v.index()];

            loop {
                let idx = slot(&mut table, &mut verts, mesh, v);
                let sv = &mut verts[idx];
                sv.loop_nr = loop_nr;
                if let Some(l) = l_a.or(l_a_prev) {
                    let l_tmp = mesh.loop_other_edge_loop(l, v);
                    sv.side_vertex[0] = Some(mesh.edge_other_vertex(mesh.loop_edge(l_tmp), v));
                    sv.dir[0] = vec_a;
                }
                if let Some(l) = l_b.or(l_b_prev) {
                    let l_tmp = mesh.loop_other_edge_loop(l, v);
                    sv.side_vertex[1] = Some(mesh.edge_other_vertex(mesh.loop_edge(l_tmp), v));
                    sv.dir[1] = vec_b;
                }

                let v_prev = v;
                v = mesh.edge_other_vertex(e, v);
                let e_prev = e;

                let Some(next) = other_selected_edge(mesh, v, e) else {
                    // open end of the loop
                    let idx = slot(&mut table, &mut verts, mesh, v);
                    let sv = &mut verts[idx];
                    sv.loop_nr = loop_nr;
                    if let Some(l) = l_a {
                        let (side, rail) = end_rail(mesh, v, l, e_prev);
                        sv.side_vertex[0] = Some(side);
                        sv.dir[0] = rail;
                    }
                    if let Some(l) = l_b {
                        let (side, rail) = end_rail(mesh, v, l, e_prev);
                        sv.side_vertex[1] = Some(side);
                        sv.dir[1] = rail;
                    }
                    tag[v.index()] = false;
                    tag[v_prev.index()] = false;
                    break;
                };
                e = next;

                let l_a_ok_prev = l_a.is_some();
                let l_b_ok_prev = l_b.is_some();
                l_a_prev = l_a;
                l_b_prev = l_b;

                match l_a {
                    Some(l) => (l_a, vec_a) = next_loop(mesh, v, l, e_prev, e),
                    None => vec_a = DVec3::ZERO,
                }
                match l_b {
                    Some(l) => (l_b, vec_b) = next_loop(mesh, v, l, e_prev, e),
                    None => vec_b = DVec3::ZERO,
                }

                if l_a.is_none() || l_b.is_none() {
                    if l_a.is_some() || l_b.is_some() {
                        // recover the opposite side where it went missing
                        if let (None, Some(lb)) = (l_a, l_b) {
                            l_a = radial_other(mesh, lb);
                        } else if let (Some(la), None) = (l_a, l_b) {
                            l_b = radial_other(mesh, la);
                        }
                    } else if let Some(l) = mesh.edge_loop(e) {
                        // faces around the loop are not contiguous, restart
                        // from the faces of the new edge
                        if l_a_ok_prev {
                            l_a = Some(l);
                            l_b = radial_other(mesh, l);
                        } else if l_b_ok_prev {
                            l_b = Some(l);
                            l_a = radial_other(mesh, l);
                        }
                    }
                    if !l_a_ok_prev {
                        if let Some(l) = l_a {
                            vec_a = next_loop(mesh, v, l, e, e_prev).1;
                        }
                    }
                    if !l_b_ok_prev {
                        if let Some(l) = l_b {
                            vec_b = next_loop(mesh, v, l, e, e_prev).1;
                        }
                    }
                }

                tag[v.index()] = false;
                tag[v_prev.index()] = false;

                if Some(e) == first_edge || (l_a.is_none() && l_b.is_none()) {
                    break;
                }
            }

            loop_nr += 1;
        }

        debug!(verts = verts.len(), loops = loop_nr, "edge slide rails built");

        let mut slide = Self::with_verts(verts, options, options.flipped);
        slide.calc_mval_range(mesh, view, obmat, mval, &table, loop_nr, true);
        slide.calc_even(view, obmat, mval);
        Ok(slide)
    }

    /// Builds one rail per selected vertex along its longest unselected
    /// edge. Selected wire chains between such vertices blend the rails of
    /// the chain ends.
    ///
    /// # Errors
    ///
    /// [`TransformError::SlideUnavailable`] when no selected vertex has an
    /// unselected edge.
    pub fn build_single_sided(
        mesh: &EditMesh,
        view: &ViewContext,
        obmat: DMat4,
        mval: DVec2,
        options: &SlideOptions,
    ) -> TransformResult<Self> {
        let nverts = mesh.vertex_count();
        let mut longest: Vec<Option<EdgeId>> = vec![None; nverts];

        for v in mesh.vertex_ids() {
            let vert = mesh.vertex(v);
            if !vert.selected || vert.hidden {
                continue;
            }
            let mut len_sq_max = -1.0;
            for e in mesh.vertex_edges(v) {
                if mesh.edge(*e).selected {
                    continue;
                }
                let len_sq = mesh.edge_length(*e).powi(2);
                if len_sq > len_sq_max {
                    len_sq_max = len_sq;
                    longest[v.index()] = Some(*e);
                }
            }
        }
        if longest.iter().all(Option::is_none) {
            return Err(TransformError::slide_unavailable(
                "no selected vertex has an unselected edge",
            ));
        }

        let mut table: Vec<Option<usize>> = vec![None; nverts];
        let mut verts: Vec<EdgeSlideVert> = Vec::new();
        for v in mesh.vertex_ids() {
            let Some(e) = longest[v.index()] else {
                continue;
            };
            let side = mesh.edge_other_vertex(e, v);
            let mut sv = EdgeSlideVert::new(v, mesh.position(v));
            sv.side_vertex[0] = Some(side);
            sv.dir[0] = mesh.position(side) - sv.orig;
            table[v.index()] = Some(verts.len());
            verts.push(sv);
        }

        // selected wire chains take rails blended from their ends
        if verts.len() != nverts {
            let nowire = verts.len();
            for i in 0..nowire {
                let src = verts[i].vertex;
                for e in mesh.vertex_edges(src) {
                    let chain_start = verts.len();
                    let mut v = src;
                    let mut e_step = *e;
                    let mut chain_end = None;
                    loop {
                        let v_other = mesh.edge_other_vertex(e_step, v);
                        let edge_pair = mesh.vertex_edges(v_other).len() == 2;
                        let endpoint =
                            usize::from(table[v_other.index()].is_some()) + usize::from(!edge_pair);
                        if mesh.edge(e_step).selected && mesh.vertex(v_other).selected && endpoint == 0 {
                            table[v_other.index()] = Some(verts.len());
                            let mut sv = EdgeSlideVert::new(v_other, mesh.position(v_other));
                            sv.dir[0] = verts[i].dir[0];
                            verts.push(sv);
                            let Some(step) = mesh
                                .vertex_edges(v_other)
                                .iter()
                                .copied()
                                .find(|other| *other != e_step)
                            else {
                                break;
                            };
                            v = v_other;
                            e_step = step;
                        } else {
                            if endpoint == 2 && verts.len() != chain_start {
                                chain_end = table[v_other.index()];
                            }
                            break;
                        }
                    }

                    match chain_end {
                        Some(end) => {
                            let (co_src, dir_src) = (verts[i].orig, verts[i].dir[0]);
                            let (co_dst, dir_dst) = (verts[end].orig, verts[end].dir[0]);
                            for sv in &mut verts[chain_start..] {
                                let factor = line_point_factor(sv.orig, co_src, co_dst);
                                sv.dir[0] = dir_src.lerp(dir_dst, factor);
                            }
                        }
                        None => {
                            for sv in verts.drain(chain_start..) {
                                table[sv.vertex.index()] = None;
                            }
                        }
                    }
                }
            }
        }

        debug!(verts = verts.len(), "single sided edge slide rails built");

        let mut slide = Self::with_verts(verts, options, !options.flipped);
        slide.calc_mval_range(mesh, view, obmat, mval, &table, 1, false);
        slide.calc_even(view, obmat, mval);
        Ok(slide)
    }

    /// Finds the screen segment the mouse ratio is measured along, and with
    /// `calc_direction` swaps the rails of loops running against the mouse.
    #[allow(clippy::too_many_arguments)]
    fn calc_mval_range(
        &mut self,
        mesh: &EditMesh,
        view: &ViewContext,
        obmat: DMat4,
        mval: DVec2,
        table: &[Option<usize>],
        loop_count: usize,
        calc_direction: bool,
    ) {
        let side_screen = |sv: &EdgeSlideVert, side: usize| {
            let p = match sv.side_vertex[side] {
                Some(other) => mesh.position(other),
                None => sv.orig + sv.dir[side],
            };
            project_local(view, obmat, p)
        };

        let mut mval_dir = DVec2::ZERO;
        let mut dist_best_sq: Option<f64> = None;
        let mut loop_dir = vec![DVec2::ZERO; loop_count];
        let mut loop_dist: Vec<Option<f64>> = vec![None; loop_count];

        for e in mesh.edge_ids() {
            if !mesh.edge(e).selected {
                continue;
            }
            let (v1, v2) = mesh.edge_vertices(e);
            for v in [v2, v1] {
                let Some(j) = table[v.index()] else {
                    continue;
                };
                let crossed = mesh
                    .vertex_edges(v)
                    .iter()
                    .any(|e_other| !mesh.edge(*e_other).selected);
                if !crossed {
                    continue;
                }
                let sv = &self.verts[j];
                let sco_a = side_screen(sv, 0);
                let sco_b = side_screen(sv, 1);
                let dist_sq = dist_squared_to_segment_2d(mval, sco_b, sco_a);
                let better = match dist_best_sq {
                    None => true,
                    Some(best) => dist_sq < best && sco_b.distance_squared(sco_a) > SLIDE_MIN_SCREEN_DIR_SQ,
                };
                if better {
                    dist_best_sq = Some(dist_sq);
                    mval_dir = sco_b - sco_a;
                }
                if calc_direction {
                    let nr = sv.loop_nr;
                    if loop_dist[nr].map_or(true, |best| dist_sq < best) {
                        loop_dist[nr] = Some(dist_sq);
                        loop_dir[nr] = sco_b - sco_a;
                    }
                }
            }
        }

        if calc_direction {
            for sv in &mut self.verts {
                if loop_dir[sv.loop_nr].dot(mval_dir) < 0.0 {
                    sv.dir.swap(0, 1);
                    sv.side_vertex.swap(0, 1);
                }
            }
        }

        // every loop may point straight at the viewer
        if mval_dir.length_squared() < SLIDE_MIN_SCREEN_DIR_SQ {
            mval_dir = DVec2::new(0.0, SLIDE_FALLBACK_SCREEN_LEN);
        }

        self.mval_start = mval;
        self.mval_end = mval + mval_dir * 0.5;
    }

    /// Rail spans and the vertex closest to the mouse.
    fn calc_even(&mut self, view: &ViewContext, obmat: DMat4, mval: DVec2) {
        let mut dist_min_sq = f64::MAX;
        self.curr_sv_index = 0;
        for (i, sv) in self.verts.iter_mut().enumerate() {
            sv.edge_len = sv.dir[0].distance(sv.dir[1]);
            let dist_sq = mval.distance_squared(project_local(view, obmat, sv.orig));
            if dist_sq < dist_min_sq {
                dist_min_sq = dist_sq;
                self.curr_sv_index = i;
            }
        }
    }

    // =========================================================================
    // MODE
    // =========================================================================

    /// Builds the slide for the running operation and points the mouse
    /// input at its screen segment.
    ///
    /// # Errors
    ///
    /// [`TransformError::SlideUnavailable`] when the edit target is not a
    /// mesh or the selection cannot be slid.
    pub fn init(setup: &mut ModeSetup<'_>) -> TransformResult<Self> {
        let target = setup.target;
        let mesh = target
            .mesh()
            .ok_or_else(|| TransformError::slide_unavailable("edge slide needs a mesh"))?;
        let obmat = setup.data.obmat;
        let mut slide = if setup.slide.double_sided {
            Self::build_double_sided(mesh, setup.view, obmat, setup.mval, &setup.slide)?
        } else {
            Self::build_single_sided(mesh, setup.view, obmat, setup.mval, &setup.slide)?
        };

        let lookup = element_lookup(setup.data);
        for sv in &mut slide.verts {
            sv.element = lookup.get(&sv.vertex).copied();
        }

        if setup.slide.correct_uvs {
            let mut moved: Vec<(VertexId, DVec3)> =
                slide.verts.iter().map(|sv| (sv.vertex, sv.orig)).collect();
            moved.extend(mirror_partners(setup.data).map(|v| (v, mesh.position(v))));
            slide.orig_data = SlideOrigData::build(mesh, &moved);
        }

        setup.mouse.custom = Some((slide.mval_end, slide.mval_start));
        setup.input(InputMode::CustomRatioFlip, NumericInput::new(0));
        Ok(slide)
    }

    /// Even sliding on or off.
    pub fn set_even(&mut self, even: bool) {
        self.even = even;
    }

    /// Flips which rail end even sliding measures from.
    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Clamping of the factor to `[-1, 1]`.
    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
    }

    /// Even sliding in effect.
    pub fn is_even(&self) -> bool {
        self.even
    }

    /// Flipped in effect.
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Clamping in effect.
    pub fn is_clamped(&self) -> bool {
        self.clamp
    }

    /// Factor of the last slide.
    pub fn factor(&self) -> f64 {
        self.perc
    }

    /// Moves every slid vertex for factor `perc`, filling
    /// [`EdgeSlideVert::co`].
    pub fn slide_to(&mut self, perc: f64) {
        self.perc = perc;

        if self.even {
            let Some(curr) = self.verts.get(self.curr_sv_index) else {
                return;
            };
            let signed = if self.flipped { perc } else { -perc };
            let curr_length = curr.edge_len * ((signed + 1.0) / 2.0);
            let flipped = self.flipped;
            for sv in &mut self.verts {
                if sv.edge_len <= FLT_EPSILON {
                    sv.co = sv.orig;
                    continue;
                }
                let fac = sv.edge_len.min(curr_length) / sv.edge_len;
                let co_a = sv.orig + sv.dir[0];
                let co_b = sv.orig + sv.dir[1];
                sv.co = if flipped {
                    interp_line_v3(co_b, sv.orig, co_a, fac)
                } else {
                    interp_line_v3(co_a, sv.orig, co_b, fac)
                };
            }
            return;
        }

        if self.clamp {
            let side = usize::from(perc < 0.0);
            let amount = perc.abs();
            for sv in &mut self.verts {
                sv.co = sv.orig + sv.dir[side] * amount;
            }
            self.curr_side_unclamp = perc < 0.0;
        } else {
            let side = usize::from(self.curr_side_unclamp);
            let perc_init = if self.curr_side_unclamp == (perc < 0.0) {
                perc.abs()
            } else {
                -perc.abs()
            };
            for sv in &mut self.verts {
                let (dir, amount) = if sv.dir[side] != DVec3::ZERO {
                    (sv.dir[side], perc_init)
                } else {
                    (sv.dir[1 - side], -perc_init)
                };
                sv.co = sv.orig + dir * amount;
            }
        }
    }

    /// Slides to `value` after snapping, clamping and typed input, writes
    /// the element locations and returns the header.
    pub fn apply(&mut self, data: &mut TransformData, value: f64, ctx: &ModeContext<'_>) -> String {
        let mut v = [value];
        let typed = !ctx.preset && ctx.numeric.is_active();
        if !ctx.preset {
            ctx.snap_increment(&mut v, RATIO_SNAP_INCREMENT, RATIO_SNAP_PRECISION);
        }
        if self.clamp && !typed {
            v[0] = v[0].clamp(-1.0, 1.0);
        }
        if !ctx.preset {
            ctx.numeric.apply(&mut v);
        }
        let perc = v[0];

        self.slide_to(perc);
        for sv in &self.verts {
            let Some(td) = sv.element.and_then(|i| data.elements.get_mut(i)) else {
                continue;
            };
            if !td.flags.contains(ElementFlags::SKIP) {
                td.loc = sv.co;
            }
        }

        let value = if typed {
            ctx.numeric.text()
        } else {
            format!("{perc:.4}")
        };
        slide_header("Edge Slide", &value, self.even, self.flipped, self.clamp)
    }

    /// Option toggles and active vertex cycling.
    pub fn handle_event(&mut self, event: &Event, _ctx: &mut ModeEventContext<'_>) -> bool {
        let Event::Key {
            key,
            state,
            modifiers,
        } = event
        else {
            return false;
        };
        let total = self.verts.len();
        match (key, state) {
            (Key::E, KeyState::Press) => self.even = !self.even,
            (Key::F, KeyState::Press) => self.flipped = !self.flipped,
            (Key::C, KeyState::Press) => self.clamp = !self.clamp,
            (Key::Alt, KeyState::Press) => self.clamp = false,
            (Key::Alt, KeyState::Release) => self.clamp = true,
            (Key::Up, KeyState::Press) if total > 0 => {
                self.curr_sv_index = (self.curr_sv_index + 1) % total;
            }
            (Key::WheelDown, KeyState::Press) if modifiers.alt && total > 0 => {
                self.curr_sv_index = (self.curr_sv_index + 1) % total;
            }
            (Key::Down, KeyState::Press) if total > 0 => {
                self.curr_sv_index = (self.curr_sv_index + total - 1) % total;
            }
            (Key::WheelUp, KeyState::Press) if modifiers.alt && total > 0 => {
                self.curr_sv_index = (self.curr_sv_index + total - 1) % total;
            }
            _ => return false,
        }
        true
    }
}

impl SlideMode for EdgeSlide {
    fn project_custom_data(&mut self, mesh: &mut EditMesh, final_pass: bool) {
        if let Some(orig_data) = &self.orig_data {
            orig_data.project(mesh, final_pass);
        }
    }

    fn finish(&mut self) {
        if let Some(mut orig_data) = self.orig_data.take() {
            orig_data.finish();
        }
    }
}
