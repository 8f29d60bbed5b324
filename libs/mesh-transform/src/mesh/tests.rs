use super::*;
use crate::test_support::grid_mesh;

fn quad() -> EditMesh {
    EditMesh::from_polygons(
        &[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ],
        &[vec![0, 1, 2, 3]],
    )
    .unwrap()
}

#[test]
fn test_quad_counts() {
    let mesh = quad();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.edge_count(), 4);
    assert_eq!(mesh.face_count(), 1);
    assert!(mesh.is_valid());
}

#[test]
fn test_face_normal_points_up() {
    let mesh = quad();
    assert_eq!(mesh.face_normal(FaceId(0)), DVec3::Z);
}

#[test]
fn test_edges_are_boundary_on_single_face() {
    let mesh = quad();
    for e in mesh.edge_ids() {
        assert!(mesh.edge_is_boundary(e), "edge {e:?} should be boundary");
        let l = mesh.edge_loop(e).unwrap();
        assert_eq!(mesh.radial_next(l), l);
    }
}

#[test]
fn test_shared_edge_is_manifold() {
    let mesh = grid_mesh(3, 2, 1.0);
    let e = mesh.find_edge(VertexId(1), VertexId(4)).unwrap();
    assert!(mesh.edge_is_manifold(e));
    let l = mesh.edge_loop(e).unwrap();
    let r = mesh.radial_next(l);
    assert_ne!(l, r);
    assert_eq!(mesh.radial_next(r), l);
}

#[test]
fn test_rejects_non_manifold_third_face() {
    let mut mesh = quad();
    let extra = mesh.add_vertex(DVec3::new(0.5, -1.0, 0.0));
    // same winding over edge 0 -> 1 as the quad
    let result = mesh.add_face(&[VertexId(0), VertexId(1), extra]);
    assert!(result.is_err(), "directed edge reuse must be rejected");
    assert_eq!(mesh.face_count(), 1, "failed insertion must not mutate");
}

#[test]
fn test_rejects_degenerate_faces() {
    let mut mesh = quad();
    assert!(mesh.add_face(&[VertexId(0), VertexId(1)]).is_err());
    assert!(mesh.add_face(&[VertexId(0), VertexId(2), VertexId(0)]).is_err());
    assert!(mesh.add_face(&[VertexId(0), VertexId(2), VertexId(9)]).is_err());
}

#[test]
fn test_loop_other_edge_loop_stays_on_vertex() {
    let mesh = quad();
    let v = VertexId(1);
    for l in mesh.face_loops(FaceId(0)) {
        if mesh.edge_has_vertex(mesh.loop_edge(l), v) {
            let other = mesh.loop_other_edge_loop(l, v);
            assert_ne!(mesh.loop_edge(other), mesh.loop_edge(l));
            assert!(mesh.edge_has_vertex(mesh.loop_edge(other), v));
        }
    }
}

#[test]
fn test_face_vert_share_loop() {
    let mesh = quad();
    let l = mesh.face_vert_share_loop(FaceId(0), VertexId(2)).unwrap();
    assert_eq!(mesh.origin(l), VertexId(2));
    assert_eq!(mesh.dest(mesh.next(l)), VertexId(0));
}

#[test]
fn test_vertex_loops_count_corners() {
    let mesh = grid_mesh(3, 3, 1.0);
    // center vertex of a 3x3 vertex grid touches 4 quads
    assert_eq!(mesh.vertex_loops(VertexId(4)).len(), 4);
    assert_eq!(mesh.vertex_loops(VertexId(0)).len(), 1);
}

#[test]
fn test_wire_edges_do_not_count_as_nonwire() {
    let mut mesh = quad();
    let loose = mesh.add_vertex(DVec3::new(2.0, 0.0, 0.0));
    mesh.add_edge(VertexId(1), loose).unwrap();
    assert_eq!(mesh.vertex_edges(VertexId(1)).len(), 3);
    assert_eq!(mesh.vertex_nonwire_edge_count(VertexId(1)), 2);
}

#[test]
fn test_vertex_normal_of_flat_grid() {
    let mesh = grid_mesh(3, 3, 1.0);
    let normals = mesh.vertex_normals();
    for n in normals {
        assert!((n - DVec3::Z).length() < 1e-12, "unexpected normal {n:?}");
    }
}

#[test]
fn test_hide_vertex_hides_faces() {
    let mut mesh = grid_mesh(3, 2, 1.0);
    mesh.hide_vertex(VertexId(0));
    assert!(mesh.face(FaceId(0)).hidden);
    assert!(!mesh.face(FaceId(1)).hidden);
    let e = mesh.find_edge(VertexId(0), VertexId(1)).unwrap();
    assert!(mesh.edge(e).hidden);
}

#[test]
fn test_select_edge_flushes_to_vertices() {
    let mut mesh = quad();
    let e = mesh.find_edge(VertexId(2), VertexId(3)).unwrap();
    mesh.select_edge(e, true);
    assert!(mesh.vertex(VertexId(2)).selected);
    assert!(mesh.vertex(VertexId(3)).selected);
    assert_eq!(mesh.selected_vertex_count(), 2);
}

#[test]
fn test_loop_face_direction_bisects_corner() {
    let mesh = quad();
    let l = mesh.face_vert_share_loop(FaceId(0), VertexId(0)).unwrap();
    let dir = mesh.loop_face_direction(l);
    // incoming edge from (0,1) is -Y, outgoing to (1,0) is +X
    let expected = DVec3::new(1.0, -1.0, 0.0).normalize();
    assert!((dir - expected).length() < 1e-12, "unexpected direction {dir:?}");
}

#[test]
fn test_shell_factor_of_folded_corner() {
    // two quads folded 90 degrees along the shared edge 1-4
    let positions = [
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 1.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 1.0),
    ];
    let mut mesh =
        EditMesh::from_polygons(&positions, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap();
    mesh.select_face(FaceId(0), true);
    mesh.select_face(FaceId(1), true);
    let v = VertexId(1);
    let factor = mesh.vertex_shell_factor(v, mesh.vertex_normal(v));
    // both faces sit 45 degrees off the vertex normal
    assert!((factor - std::f64::consts::SQRT_2).abs() < 1e-9, "unexpected factor {factor}");

    mesh.deselect_all();
    assert_eq!(mesh.vertex_shell_factor(v, DVec3::Z), 1.0);
}
