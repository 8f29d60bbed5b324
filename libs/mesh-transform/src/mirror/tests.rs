use super::*;
use crate::test_support::grid_mesh;

#[test]
fn test_symmetric_grid_pairs_up() {
    // columns at x = -1, 0, 1
    let mut mesh = grid_mesh(3, 2, 1.0);
    for v in mesh.vertex_ids().collect::<Vec<_>>() {
        let p = mesh.position(v);
        mesh.set_position(v, p - DVec3::X);
    }
    let cache = MirrorCache::spatial(&mesh, 1e-5);
    assert_eq!(cache.lookup(VertexId(0)), Some(VertexId(2)));
    assert_eq!(cache.lookup(VertexId(5)), Some(VertexId(3)));
    // vertices on the plane map to themselves
    assert_eq!(cache.lookup(VertexId(1)), Some(VertexId(1)));
}

#[test]
fn test_tolerance_rejects_far_partners() {
    let mut mesh = EditMesh::new();
    let a = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
    let b = mesh.add_vertex(DVec3::new(-1.001, 0.0, 0.0));
    assert_eq!(MirrorCache::spatial(&mesh, 1e-5).lookup(a), None);
    assert_eq!(MirrorCache::spatial(&mesh, 1e-2).lookup(a), Some(b));
}

#[test]
fn test_lookup_out_of_range_is_none() {
    let cache = MirrorCache::default();
    assert_eq!(cache.lookup(VertexId(3)), None);
}
