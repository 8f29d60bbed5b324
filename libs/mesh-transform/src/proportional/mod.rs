//! # Proportional Editing
//!
//! Falloff weights for elements around the selection.
//!
//! ## Distances
//!
//! - **Connected**: shortest path along mesh edges (quad diagonals count as
//!   edges) or along curve point chains, stored in `dist`
//! - **Projected**: straight distance with the view direction removed
//! - **Default**: straight distance, stored in `rdist`
//!
//! ## Falloff
//!
//! With `d = max(0, (size - dist) / size)`:
//!
//! | Curve | Weight |
//! |-------|--------|
//! | Smooth | 3d² - 2d³ |
//! | Sphere | √(2d - d²) |
//! | Root | √d |
//! | Sharp | d² |
//! | Linear | d |
//! | Constant | 1 |
//! | Random | r·d |
//! | InverseSquare | d(2 - d) |

use crate::element::{ElementFlags, TransformElement};
use crate::mesh::{EditMesh, VertexId};
use config::constants::{clamp_prop_size, step_prop_size, DEFAULT_PROP_SIZE, PROP_SIZE_PAN_FACTOR};
use glam::{DMat3, DVec3};
use rayon::prelude::*;

// =============================================================================
// SETTINGS
// =============================================================================

/// Shape of the falloff, in the order the cycle key walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FalloffCurve {
    /// Smoothstep
    #[default]
    Smooth,
    /// Quarter circle
    Sphere,
    /// Square root
    Root,
    /// Quadratic
    Sharp,
    /// Linear
    Linear,
    /// Full effect inside the radius
    Constant,
    /// Linear scaled by a per-element random value
    Random,
    /// Inverted quadratic
    InverseSquare,
}

impl FalloffCurve {
    const CYCLE: [Self; 8] = [
        Self::Smooth,
        Self::Sphere,
        Self::Root,
        Self::Sharp,
        Self::Linear,
        Self::Constant,
        Self::Random,
        Self::InverseSquare,
    ];

    /// Next curve of the cycle.
    pub fn next(self) -> Self {
        let i = Self::CYCLE.iter().position(|c| *c == self).unwrap_or(0);
        Self::CYCLE[(i + 1) % Self::CYCLE.len()]
    }

    /// Header label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Smooth => "(Smooth)",
            Self::Sphere => "(Sphere)",
            Self::Root => "(Root)",
            Self::Sharp => "(Sharp)",
            Self::Linear => "(Linear)",
            Self::Constant => "(Constant)",
            Self::Random => "(Random)",
            Self::InverseSquare => "(InvSquare)",
        }
    }

    /// Weight for the normalized closeness `d` in `[0, 1]`.
    pub fn weight(self, d: f64, random: f64) -> f64 {
        match self {
            Self::Sharp => d * d,
            Self::Smooth => 3.0 * d * d - 2.0 * d * d * d,
            Self::Root => d.sqrt(),
            Self::Linear => d,
            Self::Constant => 1.0,
            Self::Sphere => (2.0 * d - d * d).max(0.0).sqrt(),
            Self::Random => random * d,
            Self::InverseSquare => d * (2.0 - d),
        }
    }
}

/// Proportional editing options of one operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionalSettings {
    /// Proportional editing on
    pub enabled: bool,
    /// Measure along connectivity
    pub connected: bool,
    /// Ignore depth along the view direction
    pub projected: bool,
    /// Falloff shape
    pub curve: FalloffCurve,
    /// Falloff radius
    pub size: f64,
    /// Seed of the random falloff
    pub seed: u32,
}

impl Default for ProportionalSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            connected: false,
            projected: false,
            curve: FalloffCurve::default(),
            size: DEFAULT_PROP_SIZE,
            seed: 0,
        }
    }
}

impl ProportionalSettings {
    /// Enabled with the given curve and radius.
    pub fn with_radius(curve: FalloffCurve, size: f64) -> Self {
        Self {
            enabled: true,
            curve,
            size: clamp_prop_size(size),
            ..Self::default()
        }
    }

    /// Grows the radius by one key step.
    pub fn grow(&mut self, precision: bool) {
        self.size = step_prop_size(self.size, true, precision);
    }

    /// Shrinks the radius by one key step.
    pub fn shrink(&mut self, precision: bool) {
        self.size = step_prop_size(self.size, false, precision);
    }

    /// Scales the radius by a vertical mouse-pan delta in pixels.
    pub fn pan(&mut self, delta_y: f64) {
        self.size = clamp_prop_size(self.size * (1.0 + PROP_SIZE_PAN_FACTOR * delta_y));
    }
}

// =============================================================================
// DISTANCES
// =============================================================================

/// Connectivity distance of every vertex to the selection, measured in the
/// space of `mtx`. Unreachable vertices get `f64::MAX`.
///
/// Wavefront relaxation: each pass expands the vertices improved by the
/// previous one. Distances added in a pass read the values of the previous
/// pass so a vertex cannot feed on its own update.
pub fn mesh_connectivity_distance(mesh: &EditMesh, mtx: DMat3) -> Vec<f64> {
    let n = mesh.vertex_count();
    let mut dists = vec![f64::MAX; n];
    let mut queue = Vec::new();
    for v in mesh.vertex_ids() {
        let vert = mesh.vertex(v);
        if vert.selected && !vert.hidden {
            dists[v.index()] = 0.0;
            queue.push(v);
        }
    }
    let mut dists_prev = dists.clone();
    let mut tagged = vec![false; n];
    let mut queue_next = Vec::new();

    while !queue.is_empty() {
        for v in queue.drain(..) {
            for &e in mesh.vertex_edges(v) {
                if mesh.edge(e).hidden {
                    continue;
                }
                let v_other = mesh.edge_other_vertex(e, v);
                if test_dist_add(mesh, v, v_other, &mut dists, &dists_prev, mtx) && !tagged[v_other.index()] {
                    tagged[v_other.index()] = true;
                    queue_next.push(v_other);
                }

                // imaginary edge across quads
                let he = mesh.edge(e).halfedge;
                for l in [he, mesh.halfedge(he).twin] {
                    let Some(f) = mesh.loop_face(l) else {
                        continue;
                    };
                    if mesh.origin(l) != v || mesh.face(f).len != 4 || mesh.face(f).hidden {
                        continue;
                    }
                    let v_diag = mesh.origin(mesh.next(mesh.next(l)));
                    if test_dist_add(mesh, v, v_diag, &mut dists, &dists_prev, mtx) && !tagged[v_diag.index()] {
                        tagged[v_diag.index()] = true;
                        queue_next.push(v_diag);
                    }
                }
            }
        }

        for v in &queue_next {
            tagged[v.index()] = false;
            dists_prev[v.index()] = dists[v.index()];
        }
        std::mem::swap(&mut queue, &mut queue_next);
    }
    dists
}

fn test_dist_add(
    mesh: &EditMesh,
    v: VertexId,
    v_other: VertexId,
    dists: &mut [f64],
    dists_prev: &[f64],
    mtx: DMat3,
) -> bool {
    let other = mesh.vertex(v_other);
    if other.selected || other.hidden {
        return false;
    }
    let step = (mtx * (mesh.position(v) - mesh.position(v_other))).length();
    let dist_other = dists_prev[v.index()] + step;
    if dist_other < dists[v_other.index()] {
        dists[v_other.index()] = dist_other;
        true
    } else {
        false
    }
}

/// Chain distance along the points of one spline, given in spline order.
///
/// A forward and a backward pass each keep the distance to the nearest
/// selected point behind them, never decreasing along the walk. Points
/// with no selected point on either side are flagged not connected.
/// Cyclic splines are walked twice so the distance wraps around.
pub fn curve_chain_distance(elements: &mut [TransformElement], cyclic: bool) {
    let n = elements.len();
    if n == 0 {
        return;
    }
    let laps = if cyclic { 2 } else { 1 };

    let mut near: Option<DVec3> = None;
    for step in 0..n * laps {
        let i = step % n;
        let prev_dist = (step > 0).then(|| elements[(step - 1) % n].dist);
        let td = &mut elements[i];
        if td.is_selected() {
            near = Some(td.center);
            td.dist = 0.0;
        } else if let Some(near_center) = near {
            let dist = near_center.distance(td.center);
            td.dist = match prev_dist {
                Some(prev) if dist < prev => prev,
                _ => dist,
            };
            td.flags.remove(ElementFlags::NOTCONNECTED);
        } else if step < n {
            td.dist = f64::MAX;
            td.flags.insert(ElementFlags::NOTCONNECTED);
        }
    }

    near = None;
    for step in 0..n * laps {
        let i = n - 1 - step % n;
        let next_dist = if step > 0 {
            elements[n - 1 - (step - 1) % n].dist
        } else {
            0.0
        };
        let td = &mut elements[i];
        if td.is_selected() {
            near = Some(td.center);
            td.dist = 0.0;
        } else if let Some(near_center) = near {
            let dist = near_center.distance(td.center);
            if td.flags.contains(ElementFlags::NOTCONNECTED) || dist < td.dist || next_dist < td.dist {
                td.flags.remove(ElementFlags::NOTCONNECTED);
                td.dist = dist.max(next_dist);
            }
        }
    }
}

/// Straight distance of every unselected element to the nearest selected
/// one, measured in the element's global space. Selected elements must
/// come first. With `proj_vec` the component along that unit vector is
/// ignored.
pub fn set_prop_dist(elements: &mut [TransformElement], with_dist: bool, proj_vec: Option<DVec3>) {
    let selected_count = elements.iter().take_while(|td| td.is_selected()).count();
    let (selected, rest) = elements.split_at_mut(selected_count);
    selected.iter_mut().for_each(|td| td.rdist = 0.0);
    let selected: &[TransformElement] = selected;

    rest.par_iter_mut().for_each(|tob| {
        let mut best: Option<f64> = None;
        for td in selected {
            let mut vec = tob.mtx * (tob.center - td.center);
            if let Some(proj) = proj_vec {
                vec -= proj * vec.dot(proj);
            }
            let dist_sq = vec.length_squared();
            if best.map_or(true, |b| dist_sq < b) {
                best = Some(dist_sq);
            }
        }
        tob.rdist = best.map_or(f64::MAX, f64::sqrt);
        if with_dist {
            tob.dist = tob.rdist;
        }
    });
}

// =============================================================================
// WEIGHTS
// =============================================================================

/// Deterministic value in `[0, 1)` for the random falloff.
fn random_unit(seed: u32, index: usize) -> f64 {
    // splitmix64
    let mut x = (u64::from(seed) << 32) ^ index as u64;
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^= x >> 31;
    (x >> 11) as f64 / (1u64 << 53) as f64
}

/// Assigns every element its falloff weight.
///
/// Out of range elements get weight 0 and are reset to their original
/// values. With mirror editing (`mirror_side` non-zero) elements on the far
/// side of the plane are skipped.
pub fn calculate_prop_ratio(
    elements: &mut [TransformElement],
    settings: &ProportionalSettings,
    mirror_side: f64,
) {
    if !settings.enabled {
        elements.par_iter_mut().for_each(|td| td.factor = 1.0);
        return;
    }
    let size = settings.size;
    let connected = settings.connected;
    elements.par_iter_mut().enumerate().for_each(|(i, td)| {
        if td.is_selected() {
            td.factor = 1.0;
        } else if mirror_side != 0.0 && td.loc.x * mirror_side < -0.00001 {
            td.flags.insert(ElementFlags::SKIP);
            td.factor = 0.0;
            td.restore();
        } else if (connected && (td.flags.contains(ElementFlags::NOTCONNECTED) || td.dist > size))
            || (!connected && td.rdist > size)
        {
            td.flags.insert(ElementFlags::NOACTION);
            td.factor = 0.0;
            td.restore();
        } else {
            td.flags.remove(ElementFlags::NOACTION);
            let dist = if connected { td.dist } else { td.rdist };
            let d = ((size - dist) / size).max(0.0);
            td.factor = settings.curve.weight(d, random_unit(settings.seed, i));
        }
    });
}

#[cfg(test)]
mod tests;
