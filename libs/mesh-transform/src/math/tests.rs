use super::*;
use approx::assert_abs_diff_eq;

#[test]
fn test_line_point_factor_midpoint() {
    let f = line_point_factor(DVec3::new(1.0, 5.0, 0.0), DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));
    assert_abs_diff_eq!(f, 0.5, epsilon = 1e-12);
}

#[test]
fn test_line_point_factor_degenerate_line() {
    assert_eq!(line_point_factor(DVec3::ONE, DVec3::ONE, DVec3::ONE), 0.0);
}

#[test]
fn test_interp_line_hits_three_anchors() {
    let v1 = DVec3::new(-1.0, 0.0, 0.0);
    let v2 = DVec3::new(0.5, 0.0, 0.0);
    let v3 = DVec3::new(1.0, 0.0, 0.0);
    assert_abs_diff_eq!(interp_line_v3(v1, v2, v3, 0.0).x, -1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(interp_line_v3(v1, v2, v3, 0.75).x, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(interp_line_v3(v1, v2, v3, 1.0).x, 1.0, epsilon = 1e-12);
}

#[test]
fn test_interp_line_is_piecewise_linear() {
    let v1 = DVec3::ZERO;
    let v2 = DVec3::new(1.0, 0.0, 0.0);
    let v3 = DVec3::new(4.0, 0.0, 0.0);
    // break point at t = 0.25
    let p = interp_line_v3(v1, v2, v3, 0.625);
    assert_abs_diff_eq!(p.x, 2.5, epsilon = 1e-12);
}

#[test]
fn test_project_plane_removes_normal_component() {
    let v = project_plane(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.0, 0.0, 2.0));
    assert_eq!(v, DVec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_segment_distance_clamps_to_ends() {
    let d = dist_squared_to_segment_2d(DVec2::new(3.0, 0.0), DVec2::ZERO, DVec2::new(1.0, 0.0));
    assert_abs_diff_eq!(d, 4.0, epsilon = 1e-12);
}

#[test]
fn test_pseudo_inverse_of_regular_matrix_is_inverse() {
    let m = DMat3::from_diagonal(DVec3::new(2.0, 4.0, 0.5));
    let inv = pseudo_inverse(m);
    assert_abs_diff_eq!((inv * m).x_axis.x, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!((inv * m).z_axis.z, 1.0, epsilon = 1e-9);
}

#[test]
fn test_pseudo_inverse_of_flat_matrix_is_finite() {
    let m = DMat3::from_diagonal(DVec3::new(2.0, 1.0, 0.0));
    let inv = pseudo_inverse(m);
    assert!(inv.is_finite(), "pseudo inverse must not blow up: {inv:?}");
    assert_abs_diff_eq!(inv.x_axis.x, 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(inv.z_axis.z, 0.0, epsilon = 1e-6);
}

#[test]
fn test_rotation_between_maps_direction() {
    let m = rotation_between(DVec3::Z, DVec3::X);
    let v = m * DVec3::Z;
    assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-12);
}

#[test]
fn test_isect_line_plane_parallel_is_none() {
    assert!(isect_line_plane(DVec3::ZERO, DVec3::X, DVec3::Z, DVec3::Z).is_none());
    let hit = isect_line_plane(DVec3::ZERO, DVec3::Z, DVec3::new(0.0, 0.0, 3.0), DVec3::Z);
    assert_eq!(hit, Some(DVec3::new(0.0, 0.0, 3.0)));
}

#[test]
fn test_corner_distance_sign() {
    // square corner at the origin, interior is +x/+y
    let prev = DVec3::new(0.0, 1.0, 0.0);
    let next = DVec3::new(1.0, 0.0, 0.0);
    let inside = dist_signed_squared_to_corner(DVec3::new(0.5, 0.5, 0.0), prev, DVec3::ZERO, next, DVec3::Z);
    let outside = dist_signed_squared_to_corner(DVec3::new(-0.5, 0.5, 0.0), prev, DVec3::ZERO, next, DVec3::Z);
    assert!(inside > 0.0, "inside should be positive: {inside}");
    assert!(outside < 0.0, "outside should be negative: {outside}");
}

#[test]
fn test_mean_value_weights_reproduce_point() {
    let square = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(2.0, 0.0, 0.0),
        DVec3::new(2.0, 2.0, 0.0),
        DVec3::new(0.0, 2.0, 0.0),
    ];
    let p = DVec3::new(0.5, 1.5, 0.0);
    let w = mean_value_weights(&square, p);
    let sum: f64 = w.iter().sum();
    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
    let rebuilt = square.iter().zip(&w).fold(DVec3::ZERO, |acc, (v, w)| acc + *v * *w);
    assert_abs_diff_eq!(rebuilt.x, p.x, epsilon = 1e-9);
    assert_abs_diff_eq!(rebuilt.y, p.y, epsilon = 1e-9);
}

#[test]
fn test_mean_value_weights_on_corner_and_edge() {
    let tri = [DVec3::ZERO, DVec3::X, DVec3::Y];
    assert_eq!(mean_value_weights(&tri, DVec3::X), vec![0.0, 1.0, 0.0]);
    let w = mean_value_weights(&tri, DVec3::new(0.25, 0.0, 0.0));
    assert_abs_diff_eq!(w[0], 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(w[1], 0.25, epsilon = 1e-12);
}

#[test]
fn test_space_from_normal_is_orthonormal() {
    let m = space_from_normal(DVec3::new(0.0, 1.0, 1.0)).unwrap();
    assert_abs_diff_eq!(m.x_axis.dot(m.y_axis), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.y_axis.dot(m.z_axis), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.z_axis.length(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.z_axis.y, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_space_from_world_z_normal() {
    let m = space_from_normal(DVec3::Z).unwrap();
    assert_abs_diff_eq!(m.z_axis.z, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.x_axis.length(), 1.0, epsilon = 1e-12);
    assert!(space_from_normal(DVec3::ZERO).is_none());
}

#[test]
fn test_shell_distance_factors() {
    assert_abs_diff_eq!(shell_angle_to_dist(0.0), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(shell_angle_to_dist(std::f64::consts::FRAC_PI_3), 2.0, epsilon = 1e-9);
    // right angle would be infinite
    assert_eq!(shell_angle_to_dist(std::f64::consts::FRAC_PI_2), 1.0);
    assert_eq!(shell_normalized_to_dist(DVec3::X, DVec3::Y), 1.0);
}

#[test]
fn test_compatible_euler_keeps_turns() {
    let m = DMat3::from_rotation_z(0.5);
    let old = DVec3::new(0.0, 0.0, std::f64::consts::TAU);
    let eul = compatible_euler(m, EulerRot::XYZ, old);
    assert_abs_diff_eq!(eul.z, std::f64::consts::TAU + 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(eul.x, 0.0, epsilon = 1e-9);
}
