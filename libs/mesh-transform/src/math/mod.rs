//! # Geometry Helpers
//!
//! Small vector/matrix routines shared by the converters, the mode engine and
//! the slide engine. Everything works in `f64`; degenerate inputs fall back to
//! neutral values instead of producing NaN.

use config::constants::FLT_EPSILON;
use glam::{DMat3, DQuat, DVec2, DVec3, EulerRot};

/// Parametric position of `p` projected on the line `l1 → l2`.
///
/// Returns 0 for a degenerate line.
pub fn line_point_factor(p: DVec3, l1: DVec3, l2: DVec3) -> f64 {
    let u = l2 - l1;
    let dot = u.length_squared();
    if dot != 0.0 {
        u.dot(p - l1) / dot
    } else {
        0.0
    }
}

/// 2D variant of [`line_point_factor`].
pub fn line_point_factor_2d(p: DVec2, l1: DVec2, l2: DVec2) -> f64 {
    let u = l2 - l1;
    let dot = u.length_squared();
    if dot != 0.0 {
        u.dot(p - l1) / dot
    } else {
        0.0
    }
}

/// Interpolates along the polyline `v1 → v2 → v3` where `t` in `[0, 1]`
/// spans the whole polyline and the break point sits where `v2` projects
/// onto `v1 → v3`.
pub fn interp_line_v3(v1: DVec3, v2: DVec3, v3: DVec3, t: f64) -> DVec3 {
    let t_mid = line_point_factor(v2, v1, v3);
    if t - t_mid < 0.0 {
        if t_mid.abs() < FLT_EPSILON {
            v2
        } else {
            v1.lerp(v2, t / t_mid)
        }
    } else {
        let t_rest = 1.0 - t_mid;
        if t_rest.abs() < FLT_EPSILON {
            v3
        } else {
            v2.lerp(v3, (t - t_mid) / t_rest)
        }
    }
}

/// Removes the component of `v` along `plane_no` (which need not be unit length).
pub fn project_plane(v: DVec3, plane_no: DVec3) -> DVec3 {
    let len_sq = plane_no.length_squared();
    if len_sq == 0.0 {
        return v;
    }
    v - plane_no * (v.dot(plane_no) / len_sq)
}

/// Squared distance from `p` to the segment `a → b`.
pub fn dist_squared_to_segment_2d(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let fac = line_point_factor_2d(p, a, b).clamp(0.0, 1.0);
    p.distance_squared(a.lerp(b, fac))
}

/// Rescales `v` to `length`, leaving a zero vector untouched.
pub fn with_length(v: DVec3, length: f64) -> DVec3 {
    let len = v.length();
    if len > 0.0 {
        v * (length / len)
    } else {
        v
    }
}

/// Normalizes `v` in place and returns its previous length.
pub fn normalize_in_place(v: &mut DVec3) -> f64 {
    let len = v.length();
    if len > 0.0 {
        *v /= len;
    } else {
        *v = DVec3::ZERO;
    }
    len
}

/// Inverse of `m`, or the regularized least-squares inverse when `m` is
/// singular (flattened objects, zero scale axes).
pub fn pseudo_inverse(m: DMat3) -> DMat3 {
    let det = m.determinant();
    if det.abs() > 1e-12 {
        return m.inverse();
    }
    let mt = m.transpose();
    let scale = (mt * m).to_cols_array().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let lambda = (scale * 1e-9).max(1e-18);
    let damped = mt * m + DMat3::from_diagonal(DVec3::splat(lambda));
    if damped.determinant().abs() <= f64::MIN_POSITIVE {
        return DMat3::ZERO;
    }
    damped.inverse() * mt
}

/// Normalizes each column of `m`; zero columns stay zero.
pub fn normalize_columns(m: DMat3) -> DMat3 {
    DMat3::from_cols(
        m.x_axis.normalize_or_zero(),
        m.y_axis.normalize_or_zero(),
        m.z_axis.normalize_or_zero(),
    )
}

/// Lengths of the columns of `m` (the scale it carries).
pub fn mat3_to_size(m: DMat3) -> DVec3 {
    DVec3::new(m.x_axis.length(), m.y_axis.length(), m.z_axis.length())
}

/// Rotation taking direction `from` onto direction `to`.
pub fn rotation_between(from: DVec3, to: DVec3) -> DMat3 {
    let a = from.normalize_or_zero();
    let b = to.normalize_or_zero();
    if a == DVec3::ZERO || b == DVec3::ZERO {
        return DMat3::IDENTITY;
    }
    DMat3::from_quat(DQuat::from_rotation_arc(a, b))
}

/// Rotation of `angle` radians about `axis`; identity for a zero axis.
pub fn axis_angle_to_mat3(axis: DVec3, angle: f64) -> DMat3 {
    let axis = axis.normalize_or_zero();
    if axis == DVec3::ZERO {
        return DMat3::IDENTITY;
    }
    DMat3::from_axis_angle(axis, angle)
}

/// Intersection of the infinite line `l1 → l2` with a plane.
pub fn isect_line_plane(l1: DVec3, l2: DVec3, plane_co: DVec3, plane_no: DVec3) -> Option<DVec3> {
    let u = l2 - l1;
    let dot = plane_no.dot(u);
    if dot.abs() > f64::EPSILON {
        let lambda = -plane_no.dot(l1 - plane_co) / dot;
        Some(l1 + u * lambda)
    } else {
        None
    }
}

/// Signed squared distance of `p` to the corner `v1 - v2 - v3` seen along
/// `axis_ref`; positive inside the corner.
pub fn dist_signed_squared_to_corner(
    p: DVec3,
    v1: DVec3,
    v2: DVec3,
    v3: DVec3,
    axis_ref: DVec3,
) -> f64 {
    let dir_a = v1 - v2;
    let dir_b = v3 - v2;
    let mut axis = dir_a.cross(dir_b);

    // concave
    let flip = axis.dot(axis_ref) < 0.0;
    if flip {
        axis = -axis;
    }

    let plane_a = dir_a.cross(axis);
    let plane_b = axis.cross(dir_b);
    let rel = p - v2;

    let dist_a = signed_squared_side(plane_a, rel);
    let dist_b = signed_squared_side(plane_b, rel);
    if flip {
        dist_a.min(dist_b)
    } else {
        dist_a.max(dist_b)
    }
}

fn signed_squared_side(plane_no: DVec3, rel: DVec3) -> f64 {
    let len_sq = plane_no.length_squared();
    if len_sq == 0.0 {
        return 0.0;
    }
    let d = plane_no.dot(rel);
    d * d.abs() / len_sq
}

/// Newell normal of a polygon.
pub fn polygon_normal(points: &[DVec3]) -> DVec3 {
    let n = points.len();
    let mut normal = DVec3::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal.normalize_or_zero()
}

/// Mean-value interpolation weights of `p` with respect to a planar polygon.
///
/// The polygon is flattened along its normal first. A point on a corner gets
/// that corner's weight only, a point on an edge interpolates linearly along
/// it. Weights always sum to one; a degenerate polygon yields equal weights.
pub fn mean_value_weights(points: &[DVec3], p: DVec3) -> Vec<f64> {
    let n = points.len();
    let mut weights = vec![0.0; n];
    if n == 0 {
        return weights;
    }

    let normal = polygon_normal(points);
    let (tangent, bitangent) = if normal == DVec3::ZERO {
        (DVec3::X, DVec3::Y)
    } else {
        normal.any_orthonormal_pair()
    };
    let flat = |v: DVec3| DVec2::new(v.dot(tangent), v.dot(bitangent));

    let origin = flat(p);
    let dirs: Vec<DVec2> = points.iter().map(|v| flat(*v) - origin).collect();
    let lens: Vec<f64> = dirs.iter().map(|d| d.length()).collect();

    const EPS: f64 = 1e-12;

    if let Some(i) = lens.iter().position(|len| *len < EPS) {
        weights[i] = 1.0;
        return weights;
    }

    for i in 0..n {
        let j = (i + 1) % n;
        let cross = dirs[i].perp_dot(dirs[j]);
        let dot = dirs[i].dot(dirs[j]);
        if cross.abs() < EPS && dot < 0.0 {
            let total = lens[i] + lens[j];
            weights[i] = lens[j] / total;
            weights[j] = lens[i] / total;
            return weights;
        }
    }

    let tan_half = |i: usize| {
        let j = (i + 1) % n;
        let cross = dirs[i].perp_dot(dirs[j]);
        if cross.abs() < EPS {
            0.0
        } else {
            (lens[i] * lens[j] - dirs[i].dot(dirs[j])) / cross
        }
    };

    let mut total = 0.0;
    for i in 0..n {
        let prev = (i + n - 1) % n;
        let w = (tan_half(prev) + tan_half(i)) / lens[i];
        weights[i] = w;
        total += w;
    }

    if total.abs() > EPS && total.is_finite() {
        for w in &mut weights {
            *w /= total;
        }
    } else {
        weights.fill(1.0 / n as f64);
    }
    weights
}

/// Orthonormal frame whose Z axis is `normal`.
///
/// X is taken perpendicular to world Z where possible. Returns `None` for a
/// zero normal.
pub fn space_from_normal(normal: DVec3) -> Option<DMat3> {
    let z = normal.normalize_or_zero();
    if z == DVec3::ZERO {
        return None;
    }
    let mut x = z.cross(DVec3::Z);
    if x.length_squared() < f64::EPSILON {
        x = DVec3::X.cross(z);
    }
    let x = x.normalize_or_zero();
    let y = z.cross(x).normalize_or_zero();
    Some(DMat3::from_cols(x, y, z))
}

/// Offset multiplier keeping a shell of constant thickness around a corner
/// of the given angle.
pub fn shell_angle_to_dist(angle: f64) -> f64 {
    let cos = angle.cos();
    if cos.abs() < 1e-8 {
        1.0
    } else {
        (1.0 / cos).abs()
    }
}

/// [`shell_angle_to_dist`] for the angle between two unit vectors.
pub fn shell_normalized_to_dist(a: DVec3, b: DVec3) -> f64 {
    let d = a.dot(b).abs();
    if d < 1e-8 {
        1.0
    } else {
        1.0 / d
    }
}

/// Euler angles for `m` closest to `old`, so that keyed rotations do not
/// jump by whole turns.
pub fn compatible_euler(m: DMat3, order: EulerRot, old: DVec3) -> DVec3 {
    let q = DQuat::from_mat3(&normalize_columns(m));
    let (a, b, c) = q.to_euler(order);
    let wrap = |value: f64, reference: f64| {
        let turns = ((reference - value) / std::f64::consts::TAU).round();
        value + turns * std::f64::consts::TAU
    };
    let first = DVec3::new(wrap(a, old.x), wrap(b, old.y), wrap(c, old.z));

    // the same orientation is reachable with the middle angle mirrored
    let (a2, b2, c2) = (
        a + std::f64::consts::PI,
        std::f64::consts::PI - b,
        c + std::f64::consts::PI,
    );
    let second = DVec3::new(wrap(a2, old.x), wrap(b2, old.y), wrap(c2, old.z));

    if (second - old).length_squared() < (first - old).length_squared() {
        second
    } else {
        first
    }
}

#[cfg(test)]
mod tests;
