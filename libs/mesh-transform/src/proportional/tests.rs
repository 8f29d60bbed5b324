use super::*;
use crate::element::ElementHandle;
use crate::test_support::{grid_mesh, wire_chain};
use approx::assert_abs_diff_eq;

fn point(x: f64, selected: bool) -> TransformElement {
    let mut td = TransformElement::new(
        ElementHandle::CurvePoint {
            spline: 0,
            point: 0,
        },
        DVec3::new(x, 0.0, 0.0),
    );
    if selected {
        td.flags.insert(ElementFlags::SELECTED);
    }
    td
}

#[test]
fn test_falloff_endpoints() {
    for curve in FalloffCurve::CYCLE {
        if curve == FalloffCurve::Random {
            continue;
        }
        assert_abs_diff_eq!(curve.weight(1.0, 0.5), 1.0, epsilon = 1e-12);
        if curve != FalloffCurve::Constant {
            assert_abs_diff_eq!(curve.weight(0.0, 0.5), 0.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_falloff_is_monotonic() {
    for curve in FalloffCurve::CYCLE {
        let mut last = curve.weight(0.0, 1.0);
        for i in 1..=100 {
            let w = curve.weight(i as f64 / 100.0, 1.0);
            assert!(w + 1e-12 >= last, "{curve:?} decreases at step {i}");
            last = w;
        }
    }
}

#[test]
fn test_cycle_wraps() {
    let mut curve = FalloffCurve::Smooth;
    for _ in 0..8 {
        curve = curve.next();
    }
    assert_eq!(curve, FalloffCurve::Smooth);
    assert_eq!(FalloffCurve::Random.next(), FalloffCurve::InverseSquare);
}

#[test]
fn test_connectivity_follows_edges() {
    let mut mesh = wire_chain(&[
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
    ]);
    mesh.select_vertex(VertexId(0), true);
    let dists = mesh_connectivity_distance(&mesh, DMat3::IDENTITY);
    assert_eq!(dists[0], 0.0);
    assert_abs_diff_eq!(dists[1], 1.0, epsilon = 1e-12);
    // path length, not the straight distance
    assert_abs_diff_eq!(dists[2], 2.0, epsilon = 1e-12);
}

#[test]
fn test_connectivity_uses_quad_diagonals() {
    let mut mesh = grid_mesh(2, 2, 1.0);
    mesh.select_vertex(VertexId(0), true);
    let dists = mesh_connectivity_distance(&mesh, DMat3::IDENTITY);
    assert_abs_diff_eq!(dists[3], std::f64::consts::SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_connectivity_stops_at_hidden_edges() {
    let mut mesh = wire_chain(&[DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)]);
    mesh.select_vertex(VertexId(0), true);
    let e = mesh.find_edge(VertexId(1), VertexId(2)).unwrap();
    mesh.edge_mut(e).hidden = true;
    let dists = mesh_connectivity_distance(&mesh, DMat3::IDENTITY);
    assert_eq!(dists[2], f64::MAX);
}

#[test]
fn test_connectivity_scales_with_matrix() {
    let mut mesh = wire_chain(&[DVec3::ZERO, DVec3::X]);
    mesh.select_vertex(VertexId(0), true);
    let dists = mesh_connectivity_distance(&mesh, DMat3::from_diagonal(DVec3::splat(3.0)));
    assert_abs_diff_eq!(dists[1], 3.0, epsilon = 1e-12);
}

#[test]
fn test_set_prop_dist_picks_nearest_selected() {
    let mut elements = vec![point(0.0, true), point(10.0, true), point(7.0, false)];
    set_prop_dist(&mut elements, true, None);
    assert_abs_diff_eq!(elements[2].rdist, 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(elements[2].dist, 3.0, epsilon = 1e-12);
}

#[test]
fn test_set_prop_dist_projected_ignores_depth() {
    let mut elements = vec![point(0.0, true), point(0.0, false)];
    elements[1].center = DVec3::new(0.0, 1.0, 5.0);
    set_prop_dist(&mut elements, false, Some(DVec3::Z));
    assert_abs_diff_eq!(elements[1].rdist, 1.0, epsilon = 1e-12);
}

#[test]
fn test_curve_chain_distance_both_sides() {
    let mut elements = vec![
        point(0.0, false),
        point(1.0, false),
        point(2.0, true),
        point(3.0, false),
    ];
    curve_chain_distance(&mut elements, false);
    assert_abs_diff_eq!(elements[0].dist, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(elements[1].dist, 1.0, epsilon = 1e-12);
    assert_eq!(elements[2].dist, 0.0);
    assert_abs_diff_eq!(elements[3].dist, 1.0, epsilon = 1e-12);
    assert!(elements.iter().all(|td| !td.flags.contains(ElementFlags::NOTCONNECTED)));
}

#[test]
fn test_curve_chain_without_selection_is_not_connected() {
    let mut elements = vec![point(0.0, false), point(1.0, false)];
    curve_chain_distance(&mut elements, true);
    assert!(elements
        .iter()
        .all(|td| td.flags.contains(ElementFlags::NOTCONNECTED)));
}

#[test]
fn test_cyclic_chain_wraps_around() {
    // square loop, selected corner 0, corner 3 is one step back
    let mut elements = vec![point(0.0, true), point(1.0, false), point(2.0, false), point(3.0, false)];
    elements[1].center = DVec3::new(1.0, 0.0, 0.0);
    elements[2].center = DVec3::new(1.0, 1.0, 0.0);
    elements[3].center = DVec3::new(0.0, 1.0, 0.0);
    elements[0].center = DVec3::ZERO;
    curve_chain_distance(&mut elements, true);
    assert_abs_diff_eq!(elements[3].dist, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(elements[1].dist, 1.0, epsilon = 1e-12);
}

#[test]
fn test_prop_ratio_linear_connected_scenario() {
    // A(selected) - B - C with unit spacing, radius 2
    let mut elements = vec![point(0.0, true), point(1.0, false), point(2.0, false)];
    elements[1].dist = 1.0;
    elements[2].dist = 2.0;
    let settings = ProportionalSettings {
        connected: true,
        ..ProportionalSettings::with_radius(FalloffCurve::Linear, 2.0)
    };
    calculate_prop_ratio(&mut elements, &settings, 0.0);
    assert_eq!(elements[0].factor, 1.0);
    assert_abs_diff_eq!(elements[1].factor, 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(elements[2].factor, 0.0, epsilon = 1e-12);
}

#[test]
fn test_prop_ratio_restores_out_of_range() {
    let mut elements = vec![point(0.0, true), point(5.0, false)];
    elements[1].rdist = 5.0;
    elements[1].loc = DVec3::new(9.0, 9.0, 9.0);
    let settings = ProportionalSettings::with_radius(FalloffCurve::Smooth, 1.0);
    calculate_prop_ratio(&mut elements, &settings, 0.0);
    assert_eq!(elements[1].factor, 0.0);
    assert_eq!(elements[1].loc, elements[1].iloc);
}

#[test]
fn test_prop_ratio_skips_far_side_of_mirror() {
    let mut elements = vec![point(1.0, true), point(-1.0, false)];
    let settings = ProportionalSettings::with_radius(FalloffCurve::Linear, 10.0);
    calculate_prop_ratio(&mut elements, &settings, 1.0);
    assert!(elements[1].flags.contains(ElementFlags::SKIP));
    assert_eq!(elements[1].factor, 0.0);
}

#[test]
fn test_prop_ratio_monotonic_in_distance() {
    let mut elements: Vec<TransformElement> = (0..20).map(|i| point(i as f64, i == 0)).collect();
    for (i, td) in elements.iter_mut().enumerate() {
        td.dist = i as f64 * 0.25;
    }
    for curve in FalloffCurve::CYCLE {
        if curve == FalloffCurve::Random {
            continue;
        }
        let settings = ProportionalSettings {
            connected: true,
            ..ProportionalSettings::with_radius(curve, 4.0)
        };
        calculate_prop_ratio(&mut elements, &settings, 0.0);
        for pair in elements[1..].windows(2) {
            assert!(
                pair[0].factor >= pair[1].factor,
                "{curve:?}: weight grows with distance"
            );
        }
    }
}

#[test]
fn test_random_falloff_is_deterministic() {
    let mut a = vec![point(0.0, true), point(1.0, false)];
    a[1].rdist = 0.5;
    let mut b = a.clone();
    let settings = ProportionalSettings::with_radius(FalloffCurve::Random, 1.0);
    calculate_prop_ratio(&mut a, &settings, 0.0);
    calculate_prop_ratio(&mut b, &settings, 0.0);
    assert_eq!(a[1].factor, b[1].factor);
    assert!(a[1].factor >= 0.0 && a[1].factor <= 0.5);
}

#[test]
fn test_radius_keys_clamp() {
    let mut settings = ProportionalSettings::with_radius(FalloffCurve::Linear, 1.0);
    settings.grow(false);
    assert_abs_diff_eq!(settings.size, 1.1, epsilon = 1e-12);
    settings.shrink(false);
    assert_abs_diff_eq!(settings.size, 1.0, epsilon = 1e-12);
    settings.pan(-1e9);
    assert_eq!(settings.size, config::constants::PROP_SIZE_MIN);
}
