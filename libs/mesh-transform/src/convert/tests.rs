use super::*;
use crate::curve::{BezTriple, CurvePoint, HandleType};
use crate::host::SimpleHost;
use crate::mesh::VertexId;
use crate::proportional::FalloffCurve;
use crate::scene::{ObjectId, SceneObject};
use crate::test_support::{grid_mesh, select_path, wire_chain};
use approx::assert_abs_diff_eq;
use glam::DVec2;

fn view() -> ViewContext {
    ViewContext::orthographic_top(DVec2::new(100.0, 100.0), 5.0)
}

fn convert(target: &EditTarget, options: ConvertOptions) -> TransformResult<TransformData> {
    let host = match target {
        EditTarget::Objects(scene) => SimpleHost::from_scene(scene),
        _ => SimpleHost::new(DMat4::IDENTITY),
    };
    create_trans_data(target, &host, &view(), &options)
}

fn vertex_of(td: &TransformElement) -> VertexId {
    match td.handle {
        ElementHandle::MeshVertex(v) => v,
        other => panic!("expected a vertex, got {other:?}"),
    }
}

#[test]
fn test_mesh_converts_selected_vertices_only() {
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    mesh.select_vertex(VertexId(8), true);
    let data = convert(&EditTarget::Mesh(mesh), ConvertOptions::default()).unwrap();
    assert_eq!(data.kind, DataKind::Mesh);
    assert_eq!(data.len(), 2);
    assert!(data.elements.iter().all(|td| td.is_selected()));
    assert_eq!(data.elements[0].axismtx.z_axis, DVec3::Z, "normal is kept in the third axis");
}

#[test]
fn test_mesh_without_selection_is_refused() {
    let mesh = grid_mesh(3, 3, 1.0);
    let result = convert(&EditTarget::Mesh(mesh), ConvertOptions::default());
    assert!(matches!(result, Err(TransformError::NothingToTransform)));
}

#[test]
fn test_hidden_vertices_are_never_converted() {
    let mut mesh = grid_mesh(3, 1, 1.0);
    mesh.select_vertex(VertexId(0), true);
    mesh.hide_vertex(VertexId(2));
    let options = ConvertOptions {
        proportional: ProportionalSettings::with_radius(FalloffCurve::Linear, 5.0),
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Mesh(mesh), options).unwrap();
    assert_eq!(data.len(), 2);
}

#[test]
fn test_connected_proportional_sorts_by_distance() {
    let mut mesh = wire_chain(&[
        DVec3::new(-3.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
    ]);
    mesh.select_vertex(VertexId(1), true);
    let mut proportional = ProportionalSettings::with_radius(FalloffCurve::Linear, 2.0);
    proportional.connected = true;
    let options = ConvertOptions {
        proportional,
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Mesh(mesh), options).unwrap();
    let order: Vec<u32> = data.elements.iter().map(|td| vertex_of(td).0).collect();
    assert_eq!(order, vec![1, 2, 0]);
    assert_abs_diff_eq!(data.elements[1].dist, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(data.elements[2].dist, 3.0, epsilon = 1e-12);
}

#[test]
fn test_unconnected_proportional_uses_straight_distance() {
    let mut mesh = grid_mesh(4, 1, 1.0);
    mesh.select_vertex(VertexId(3), true);
    let options = ConvertOptions {
        proportional: ProportionalSettings::with_radius(FalloffCurve::Linear, 5.0),
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Mesh(mesh), options).unwrap();
    let order: Vec<u32> = data.elements.iter().map(|td| vertex_of(td).0).collect();
    assert_eq!(order, vec![3, 2, 1, 0]);
    assert!(data.elements[1].flags.contains(ElementFlags::NOTCONNECTED));
    assert_abs_diff_eq!(data.elements[3].rdist, 3.0, epsilon = 1e-12);
}

#[test]
fn test_mirror_partners_and_plane_vertices() {
    let mut mesh = grid_mesh(3, 2, 1.0);
    for v in mesh.vertex_ids().collect::<Vec<_>>() {
        let p = mesh.position(v);
        mesh.set_position(v, DVec3::new(p.x - 1.0, p.y, p.z));
    }
    // x = -1, 0, 1 per row
    mesh.select_vertex(VertexId(1), true);
    mesh.select_vertex(VertexId(2), true);
    let options = ConvertOptions {
        symmetry: Symmetry {
            mirror_x: true,
            clip: None,
        },
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Mesh(mesh), options).unwrap();
    assert_eq!(data.mirror_side, 1.0);
    let on_plane = &data.elements[0];
    assert!(on_plane.flags.contains(ElementFlags::MIRROR_EDGE));
    assert_eq!(on_plane.mirror, None, "plane vertices have no partner");
    assert_eq!(data.elements[1].mirror, Some(VertexId(0)));
}

#[test]
fn test_crease_converts_edges() {
    let mut mesh = grid_mesh(2, 2, 1.0);
    select_path(&mut mesh, &[0, 1]);
    let e = mesh.find_edge(VertexId(0), VertexId(1)).unwrap();
    mesh.edge_mut(e).crease = 0.25;
    let options = ConvertOptions {
        mode: ModeKind::Crease,
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Mesh(mesh), options).unwrap();
    assert_eq!(data.kind, DataKind::Edges);
    assert_eq!(data.len(), 1);
    let td = &data.elements[0];
    assert_eq!(td.val, Some(0.25));
    assert_eq!(td.center, DVec3::new(0.5, 0.0, 0.0));
}

#[test]
fn test_bezier_center_drags_aligned_handles() {
    let mut curve = Curve::new();
    let mut bezt = BezTriple::new(DVec3::ZERO, DVec3::X);
    bezt.select = [false, true, false];
    let mut free = BezTriple::new(DVec3::new(4.0, 0.0, 0.0), DVec3::X);
    free.h1 = HandleType::Free;
    free.h2 = HandleType::Free;
    free.select = [false, true, false];
    curve.add_bezier(vec![bezt, free], false);
    let data = convert(&EditTarget::Curve(curve), ConvertOptions::default()).unwrap();
    assert_eq!(data.len(), 4, "three points of the aligned triple plus one center");
    assert!(data.elements.iter().all(|td| td.flags.contains(ElementFlags::BEZTRIPLE)));
    // handles of the aligned triple pivot around its center
    assert_eq!(data.elements[0].center, DVec3::ZERO);
    assert_eq!(data.elements[0].handle_types, Some([HandleType::Align; 2]));
}

#[test]
fn test_poly_points_carry_radius_for_shrink_fatten() {
    let mut curve = Curve::new();
    let mut p = CurvePoint::new(DVec3::ZERO);
    p.selected = true;
    p.radius = 0.5;
    curve.add_poly(vec![p, CurvePoint::new(DVec3::X)], false);
    let options = ConvertOptions {
        mode: ModeKind::CurveShrinkFatten,
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Curve(curve), options).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.elements[0].channel, ScalarChannel::Radius);
    assert_eq!(data.elements[0].ival, 0.5);
}

fn parented_scene() -> Scene {
    let mut scene = Scene::new();
    let mut parent = SceneObject::new(ObjectId(1), "parent");
    parent.location = DVec3::new(1.0, 0.0, 0.0);
    parent.selected = true;
    let parent_index = scene.add_object(parent);
    let mut child = SceneObject::new(ObjectId(2), "child");
    child.location = DVec3::new(0.0, 2.0, 0.0);
    child.parent = Some(parent_index);
    child.selected = true;
    scene.add_object(child);
    scene.add_object(SceneObject::new(ObjectId(3), "bystander"));
    scene
}

#[test]
fn test_children_of_selected_parents_are_implied() {
    let data = convert(&EditTarget::Objects(parented_scene()), ConvertOptions::default()).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.implied_children, vec![ObjectId(2)]);
    let td = &data.elements[0];
    assert_eq!(td.center, DVec3::new(1.0, 0.0, 0.0));
    assert!(td.ext.is_some());
}

#[test]
fn test_local_rotation_keeps_children() {
    let options = ConvertOptions {
        mode: ModeKind::Rotate,
        pivot: PivotMode::IndividualOrigins,
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Objects(parented_scene()), options).unwrap();
    assert_eq!(data.len(), 2);
    let child = &data.elements[1];
    assert!(child.flags.contains(ElementFlags::NO_LOC | ElementFlags::NOCENTER));
    assert_eq!(child.center, DVec3::new(1.0, 2.0, 0.0));
}

#[test]
fn test_proportional_objects_skip_relatives() {
    let options = ConvertOptions {
        proportional: ProportionalSettings::with_radius(FalloffCurve::Linear, 10.0),
        ..ConvertOptions::default()
    };
    let data = convert(&EditTarget::Objects(parented_scene()), options).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.elements[1].handle, ElementHandle::Object(ObjectId(3)));
    assert_abs_diff_eq!(data.elements[1].dist, 1.0, epsilon = 1e-12);
}

#[test]
fn test_sort_is_stable_partition() {
    let mut elements: Vec<TransformElement> = (0..5)
        .map(|i| {
            let mut td = TransformElement::new(ElementHandle::MeshVertex(VertexId(i)), DVec3::ZERO);
            if i % 2 == 1 {
                td.flags.insert(ElementFlags::SELECTED);
            }
            td
        })
        .collect();
    sort_trans_data(&mut elements);
    let order: Vec<u32> = elements.iter().map(|td| vertex_of(td).0).collect();
    assert_eq!(order, vec![1, 3, 0, 2, 4]);
}
