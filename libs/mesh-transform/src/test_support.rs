//! Shared fixtures for unit tests.

use crate::mesh::{EditMesh, VertexId};
use glam::DVec3;

/// Flat grid of `nx * ny` vertices in the XY plane, quads wound
/// counter-clockwise. Vertex `(x, y)` has index `y * nx + x`.
pub fn grid_mesh(nx: u32, ny: u32, spacing: f64) -> EditMesh {
    let mut positions = Vec::new();
    for y in 0..ny {
        for x in 0..nx {
            positions.push(DVec3::new(x as f64 * spacing, y as f64 * spacing, 0.0));
        }
    }
    let mut polygons = Vec::new();
    for y in 0..ny.saturating_sub(1) {
        for x in 0..nx.saturating_sub(1) {
            let i = y * nx + x;
            polygons.push(vec![i, i + 1, i + 1 + nx, i + nx]);
        }
    }
    EditMesh::from_polygons(&positions, &polygons).unwrap()
}

/// Polyline of wire edges through the given points.
pub fn wire_chain(points: &[DVec3]) -> EditMesh {
    let mut mesh = EditMesh::new();
    let ids: Vec<VertexId> = points.iter().map(|p| mesh.add_vertex(*p)).collect();
    for pair in ids.windows(2) {
        mesh.add_edge(pair[0], pair[1]).unwrap();
    }
    mesh
}

/// Selects the edges joining consecutive vertices of `path`.
pub fn select_path(mesh: &mut EditMesh, path: &[u32]) {
    for pair in path.windows(2) {
        let e = mesh.find_edge(VertexId(pair[0]), VertexId(pair[1])).unwrap();
        mesh.select_edge(e, true);
    }
}

/// Asserts two vectors agree within `eps`.
#[track_caller]
pub fn assert_vec_eq(actual: DVec3, expected: DVec3, eps: f64) {
    approx::assert_abs_diff_eq!(actual.x, expected.x, epsilon = eps);
    approx::assert_abs_diff_eq!(actual.y, expected.y, epsilon = eps);
    approx::assert_abs_diff_eq!(actual.z, expected.z, epsilon = eps);
}
