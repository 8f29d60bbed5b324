//! Original face copies for re-interpolating corner UVs while sliding.

use crate::math::{dist_signed_squared_to_corner, mean_value_weights, project_plane};
use crate::mesh::{EditMesh, FaceId, HalfedgeId, VertexId};
use config::constants::{FLT_EPSILON, SLIDE_CORNER_WEIGHT_EPSILON};
use glam::{DVec2, DVec3};
use std::collections::HashMap;
use tracing::trace;

/// Face as it was when the slide started.
#[derive(Debug, Clone, PartialEq)]
struct FaceCopy {
    loops: Vec<HalfedgeId>,
    positions: Vec<DVec3>,
    uvs: Vec<DVec2>,
}

impl FaceCopy {
    fn uv_at(&self, p: DVec3) -> DVec2 {
        mean_value_weights(&self.positions, p)
            .iter()
            .zip(&self.uvs)
            .map(|(w, uv)| *uv * *w)
            .sum()
    }

    fn orig_uv(&self, l: HalfedgeId) -> Option<DVec2> {
        self.loops.iter().position(|x| *x == l).map(|i| self.uvs[i])
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OrigVert {
    vertex: VertexId,
    orig: DVec3,
    normal: DVec3,
    /// Corners sharing one UV; they stay welded while sliding
    groups: Vec<Vec<HalfedgeId>>,
}

/// Corner data snapshot of the faces around slid vertices.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideOrigData {
    faces: HashMap<FaceId, FaceCopy>,
    verts: Vec<OrigVert>,
    orig_positions: HashMap<VertexId, DVec3>,
}

impl SlideOrigData {
    /// Copies every face around `verts`, given with their positions at the
    /// start of the slide. `None` when the mesh has no UV layer.
    pub fn build(mesh: &EditMesh, verts: &[(VertexId, DVec3)]) -> Option<Self> {
        if !mesh.has_uv_layer() {
            return None;
        }

        let mut data = Self::default();
        for (v, orig) in verts {
            if data.orig_positions.insert(*v, *orig).is_some() {
                continue;
            }
            let mut groups: Vec<Vec<HalfedgeId>> = Vec::new();
            for l in mesh.vertex_loops(*v) {
                let Some(f) = mesh.loop_face(l) else {
                    continue;
                };
                data.faces.entry(f).or_insert_with(|| {
                    let loops = mesh.face_loops(f);
                    FaceCopy {
                        positions: loops.iter().map(|l| mesh.position(mesh.origin(*l))).collect(),
                        uvs: loops.iter().map(|l| mesh.loop_uv(*l)).collect(),
                        loops,
                    }
                });

                let uv = mesh.loop_uv(l);
                match groups
                    .iter_mut()
                    .find(|g| mesh.loop_uv(g[0]).abs_diff_eq(uv, FLT_EPSILON))
                {
                    Some(group) => group.push(l),
                    None => groups.push(vec![l]),
                }
            }
            data.verts.push(OrigVert {
                vertex: *v,
                orig: *orig,
                normal: mesh.vertex_normal(*v),
                groups,
            });
        }

        trace!(faces = data.faces.len(), verts = data.verts.len(), "slide corner data copied");
        Some(data)
    }

    fn orig_co(&self, mesh: &EditMesh, v: VertexId) -> DVec3 {
        self.orig_positions
            .get(&v)
            .copied()
            .unwrap_or_else(|| mesh.position(v))
    }

    /// How much corner `l` of a moved vertex still contains `co`, in
    /// `[0, 1]`. Used to favour the face the vertex slid into.
    fn corner_weight(&self, mesh: &EditMesh, l: HalfedgeId, co: DVec3, orig_proj: DVec3, axis: DVec3) -> f64 {
        let eps = SLIDE_CORNER_WEIGHT_EPSILON;

        // step past zero length edges
        let l_next_start = mesh.next(l);
        let l_prev_start = mesh.prev(l);

        let mut l_prev = l_prev_start;
        let mut proj_prev = project_plane(self.orig_co(mesh, mesh.origin(l_prev)), axis);
        let mut prev_ok = orig_proj.distance_squared(proj_prev) > eps;
        while !prev_ok {
            l_prev = mesh.prev(l_prev);
            if l_prev == l_next_start {
                break;
            }
            proj_prev = project_plane(self.orig_co(mesh, mesh.origin(l_prev)), axis);
            prev_ok = orig_proj.distance_squared(proj_prev) > eps;
        }

        let mut l_next = l_next_start;
        let mut proj_next = project_plane(self.orig_co(mesh, mesh.origin(l_next)), axis);
        let mut next_ok = orig_proj.distance_squared(proj_next) > eps;
        while !next_ok {
            l_next = mesh.next(l_next);
            if l_next == l_prev_start {
                break;
            }
            proj_next = project_plane(self.orig_co(mesh, mesh.origin(l_next)), axis);
            next_ok = orig_proj.distance_squared(proj_next) > eps;
        }

        if !(prev_ok && next_ok) {
            return 0.0;
        }
        let dist = dist_signed_squared_to_corner(co, proj_prev, orig_proj, proj_next, axis);
        let weight = if dist >= 0.0 {
            1.0
        } else if dist <= -eps {
            0.0
        } else {
            1.0 + dist / eps
        };
        if weight.is_finite() {
            weight
        } else {
            0.0
        }
    }

    /// Writes corner UVs interpolated from the face copies at the current
    /// vertex positions. On the `final_pass` vertices that did not move get
    /// their original UVs back exactly.
    pub fn project(&self, mesh: &mut EditMesh, final_pass: bool) {
        for ov in &self.verts {
            let co = mesh.position(ov.vertex);
            let moved = co.distance_squared(ov.orig) > FLT_EPSILON;

            if final_pass && !moved {
                for l in ov.groups.iter().flatten() {
                    let orig = mesh
                        .loop_face(*l)
                        .and_then(|f| self.faces.get(&f))
                        .and_then(|copy| copy.orig_uv(*l));
                    if let Some(uv) = orig {
                        mesh.set_loop_uv(*l, uv);
                    }
                }
                continue;
            }

            let axis = ov.normal;
            let orig_proj = project_plane(ov.orig, axis);
            for group in &ov.groups {
                let mut weighted = DVec2::ZERO;
                let mut plain = DVec2::ZERO;
                let mut total = 0.0;
                let mut count = 0usize;
                for l in group {
                    let Some(copy) = mesh.loop_face(*l).and_then(|f| self.faces.get(&f)) else {
                        continue;
                    };
                    let uv = copy.uv_at(co);
                    plain += uv;
                    count += 1;
                    if moved {
                        let w = self.corner_weight(mesh, *l, co, orig_proj, axis);
                        weighted += uv * w;
                        total += w;
                    }
                }
                if count == 0 {
                    continue;
                }
                let uv = if moved && total > 0.0 {
                    weighted / total
                } else {
                    plain / count as f64
                };
                for l in group {
                    mesh.set_loop_uv(*l, uv);
                }
            }
        }
    }

    /// Drops the copies.
    pub fn finish(&mut self) {
        self.faces.clear();
        self.verts.clear();
        self.orig_positions.clear();
    }
}
