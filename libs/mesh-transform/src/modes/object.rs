//! Per-element rotation and scale shared by the affine modes.
//!
//! Edit-mode points only move. Objects additionally get their rotation
//! and scale channels rewritten, with protection locks applied to the end
//! result.

use super::protected_loc;
use crate::element::{ElementFlags, TransformElement};
use crate::math::normalize_columns;
use crate::scene::{ObjectRotation, TransformLocks};
use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Rotates one element by `mat` around `center`. `points` selects the
/// edit-mode behavior (only the location changes).
pub fn element_rotation(td: &mut TransformElement, mat: DMat3, center: DVec3, points: bool) {
    if points {
        let smat = td.smtx * mat * td.mtx;
        let moved = smat * (td.iloc - center) + center;
        td.loc = td.iloc + protected_loc(td, moved - td.iloc);
        return;
    }

    if !td.flags.contains(ElementFlags::NO_LOC) {
        let vec = mat * (td.center - center) + center - td.center;
        td.loc = td.iloc + protected_loc(td, td.smtx * vec);
    }

    let fmat = td.smtx * mat * td.mtx;
    let locks = td.locks;
    let Some(ext) = td.ext.as_mut() else {
        return;
    };
    ext.rot = match ext.irot {
        ObjectRotation::Quaternion(iquat) => {
            let quat = DQuat::from_mat3(&normalize_columns(fmat)) * iquat;
            ObjectRotation::Quaternion(protected_quat(&locks, quat, iquat))
        }
        ObjectRotation::AxisAngle { axis, angle } => {
            let iquat = ext.irot.to_quat();
            let (new_axis, new_angle) = (DQuat::from_mat3(&normalize_columns(fmat)) * iquat)
                .normalize()
                .to_axis_angle();
            let (axis, angle) = protected_axis_angle(&locks, new_axis, new_angle, axis, angle);
            ObjectRotation::AxisAngle { axis, angle }
        }
        ObjectRotation::Euler { angles, order } => {
            let current = match ext.rot {
                ObjectRotation::Euler { angles, .. } => angles,
                _ => angles,
            };
            let target = fmat * ext.irot.to_mat3();
            let mut eul = crate::math::compatible_euler(target, order, current);
            for axis in 0..3 {
                if locks.rotation[axis] {
                    eul[axis] = angles[axis];
                }
            }
            ObjectRotation::Euler { angles: eul, order }
        }
    };
}

/// Quaternion locks: component-wise in 4D lock mode, otherwise through an
/// Euler decomposition so single axes can be held.
fn protected_quat(locks: &TransformLocks, quat: DQuat, iquat: DQuat) -> DQuat {
    if !locks.any_rotation() {
        return quat;
    }
    if locks.rotation_4d {
        let mut q = quat;
        if locks.rotation_w {
            q.w = iquat.w;
        }
        if locks.rotation[0] {
            q.x = iquat.x;
        }
        if locks.rotation[1] {
            q.y = iquat.y;
        }
        if locks.rotation[2] {
            q.z = iquat.z;
        }
        return q;
    }
    let len = quat.length();
    let nquat = quat.normalize();
    let (mut x, mut y, mut z) = nquat.to_euler(EulerRot::XYZ);
    let (ox, oy, oz) = iquat.normalize().to_euler(EulerRot::XYZ);
    if locks.rotation[0] {
        x = ox;
    }
    if locks.rotation[1] {
        y = oy;
    }
    if locks.rotation[2] {
        z = oz;
    }
    let mut q = DQuat::from_euler(EulerRot::XYZ, x, y, z) * len;
    // keep the sign of w so rotations keep accumulating the same way
    if (nquat.w < 0.0 && q.w > 0.0) || (nquat.w > 0.0 && q.w < 0.0) {
        q = -q;
    }
    q
}

fn protected_axis_angle(
    locks: &TransformLocks,
    axis: DVec3,
    angle: f64,
    old_axis: DVec3,
    old_angle: f64,
) -> (DVec3, f64) {
    if !locks.any_rotation() {
        return (axis, angle);
    }
    if locks.rotation_4d {
        let mut axis = axis;
        let angle = if locks.rotation_w { old_angle } else { angle };
        for i in 0..3 {
            if locks.rotation[i] {
                axis[i] = old_axis[i];
            }
        }
        return (axis, angle);
    }
    let quat = DQuat::from_axis_angle(axis.normalize_or_zero(), angle);
    let old = if old_axis.normalize_or_zero() == DVec3::ZERO {
        DQuat::IDENTITY
    } else {
        DQuat::from_axis_angle(old_axis.normalize(), old_angle)
    };
    let q = protected_quat(
        &TransformLocks {
            rotation_4d: false,
            ..*locks
        },
        quat,
        old,
    );
    let (axis, angle) = q.normalize().to_axis_angle();
    // a zero rotation keeps the old axis instead of an arbitrary one
    if angle == 0.0 {
        (old_axis, angle)
    } else {
        (axis, angle)
    }
}

/// Column lengths of `mat`, negated where a column points away from the
/// matching column of `reference`, so scales through zero keep their sign.
pub fn mat3_to_size_signed(mat: DMat3, reference: DMat3) -> DVec3 {
    let mut size = crate::math::mat3_to_size(mat);
    let normalized = normalize_columns(mat);
    for axis in 0..3 {
        if normalized.col(axis).dot(reference.col(axis)) < 0.0 {
            size[axis] = -size[axis];
        }
    }
    size
}

/// Scales one element by `mat` around `center`. `points` selects the
/// edit-mode behavior.
pub fn element_resize(td: &mut TransformElement, mat: DMat3, center: DVec3, points: bool) {
    let tmat = if points { td.smtx * mat * td.mtx } else { mat };

    let factor = td.factor;
    let locks = td.locks;
    let axismtx = td.axismtx;
    if let Some(ext) = td.ext.as_mut() {
        let mut fsize = mat3_to_size_signed(tmat * axismtx, axismtx);
        for axis in 0..3 {
            if locks.scale[axis] {
                fsize[axis] = 1.0;
            }
        }
        ext.size = ext.isize * (DVec3::ONE + (fsize - DVec3::ONE) * factor);
    }

    let origin = if points { td.iloc } else { td.center };
    let mut vec = (tmat * (origin - center) + center - origin) * factor;
    if !points {
        vec = td.smtx * vec;
    }
    td.loc = td.iloc + protected_loc(td, vec);
}
