use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn test_increment_rounds_to_step() {
    let mut values = [0.26, -1.74, 3.0];
    apply_increment(&mut values, 0.5, 0.1, false);
    assert_eq!(values, [0.5, -1.5, 3.0]);
}

#[test]
fn test_increment_precision_uses_fine_step() {
    let mut values = [0.26];
    apply_increment(&mut values, 0.5, 0.1, true);
    assert_abs_diff_eq!(values[0], 0.3, epsilon = 1e-12);
}

#[test]
fn test_invert_toggles_activity() {
    let mut snap = Snapping::default();
    assert!(!snap.is_active());
    snap.invert = true;
    assert!(snap.is_active());
    snap.enabled = true;
    assert!(!snap.is_active());
}

#[test]
fn test_target_delta_requires_active_snapping() {
    let mut snap = Snapping {
        target: Some(SnapTarget {
            point: DVec3::new(1.0, 2.0, 3.0),
            normal: Some(DVec3::Z),
        }),
        ..Snapping::default()
    };
    assert_eq!(snap.target_delta(DVec3::ONE), None);
    snap.enabled = true;
    assert_eq!(snap.target_delta(DVec3::ONE), Some(DVec3::new(0.0, 1.0, 2.0)));
    assert_eq!(snap.align_normal(), None);
    snap.align_rotation = true;
    assert_eq!(snap.align_normal(), Some(DVec3::Z));
}
