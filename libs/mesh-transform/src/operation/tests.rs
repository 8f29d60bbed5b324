use super::*;
use crate::host::SimpleHost;
use crate::mesh::VertexId;
use crate::proportional::FalloffCurve;
use crate::scene::{ObjectId, Scene, SceneObject};
use crate::test_support::{assert_vec_eq, grid_mesh, select_path, wire_chain};
use approx::assert_abs_diff_eq;
use glam::DMat4;
use std::f64::consts::FRAC_PI_2;

fn top_view() -> ViewContext {
    ViewContext::orthographic_top(DVec2::new(100.0, 100.0), 5.0)
}

fn start<'h>(target: EditTarget, host: &'h mut SimpleHost, mval: DVec2, options: TransformOptions) -> Box<TransformOperation<'h>> {
    match begin(target, host, top_view(), mval, options) {
        Begin::Handle(op) => op,
        Begin::Refused(reason) => panic!("operation refused: {reason}"),
    }
}

fn mesh_of<'a>(op: &'a TransformOperation<'_>) -> &'a EditMesh {
    op.target().mesh().expect("mesh target")
}

fn positions(mesh: &EditMesh) -> Vec<DVec3> {
    mesh.vertex_ids().map(|v| mesh.position(v)).collect()
}

fn translate_options() -> TransformOptions {
    TransformOptions {
        mode: ModeKind::Translate,
        ..TransformOptions::default()
    }
}

// =============================================================================
// BEGIN
// =============================================================================

#[test]
fn test_begin_refuses_empty_selection() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mesh = grid_mesh(3, 3, 1.0);
    let refused = matches!(
        begin(EditTarget::Mesh(mesh), &mut host, top_view(), DVec2::ZERO, translate_options()),
        Begin::Refused(RefuseReason::NothingSelected)
    );
    assert!(refused);
    assert_eq!(host.redraws, 0);
    assert!(host.invalidated.is_empty());
}

#[test]
fn test_begin_refuses_unsupported_target() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let options = TransformOptions {
        mode: ModeKind::Tilt,
        ..TransformOptions::default()
    };
    let result = begin(EditTarget::Mesh(mesh), &mut host, top_view(), DVec2::ZERO, options);
    match result {
        Begin::Refused(reason) => {
            assert_eq!(reason, RefuseReason::UnsupportedTarget { mode: ModeKind::Tilt });
            assert_eq!(reason.to_string(), "Tilt does not support this data");
        }
        Begin::Handle(_) => panic!("tilt should not run on a mesh"),
    }
}

#[test]
fn test_begin_starts_without_touching_the_mesh() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let before = positions(&mesh);

    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), translate_options());
    assert_eq!(op.state(), OperationState::Starting);
    assert_eq!(op.mode(), ModeKind::Translate);
    assert_eq!(op.elements().len(), 1);
    assert_eq!(positions(mesh_of(&op)), before);
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_connected_proportional_translate() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = wire_chain(&[DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)]);
    mesh.select_vertex(VertexId(0), true);

    let mut proportional = ProportionalSettings::with_radius(FalloffCurve::Linear, 2.0);
    proportional.connected = true;
    let options = TransformOptions {
        proportional,
        values: Some([1.0, 0.0, 0.0]),
        ..translate_options()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_eq!(op.state(), OperationState::Running);

    let mesh = mesh_of(&op);
    assert_vec_eq(mesh.position(VertexId(0)), DVec3::new(1.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(1)), DVec3::new(1.5, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(2)), DVec3::new(2.0, 0.0, 0.0), 1e-12);
}

#[test]
fn test_rotate_point_about_cursor() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = EditMesh::new();
    let v = mesh.add_vertex(DVec3::X);
    mesh.select_vertex(v, true);

    let options = TransformOptions {
        mode: ModeKind::Rotate,
        pivot: PivotMode::Cursor,
        constraint_axis: Some([false, false, true]),
        values: Some([FRAC_PI_2, 0.0, 0.0]),
        ..TransformOptions::default()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_vec_eq(mesh_of(&op).position(v), DVec3::Y, 1e-5);
}

#[test]
fn test_mode_switch_discards_uncommitted_translate() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(0), true);
    mesh.select_vertex(VertexId(8), true);
    let before = positions(&mesh);

    let view = top_view();
    let mval = view.project(DVec3::new(3.0, 0.0, 0.0));
    let mut op = start(EditTarget::Mesh(mesh), &mut host, mval, translate_options());
    op.apply_values([5.0, 0.0, 0.0]).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(0)), DVec3::new(5.0, 0.0, 0.0), 1e-12);

    let status = op.feed_event(&Event::Modal(ModalEvent::Resize)).unwrap();
    assert_eq!(status, EventStatus::Continue);
    assert_eq!(op.mode(), ModeKind::Resize);
    for td in op.elements() {
        assert_vec_eq(td.loc, td.iloc, 1e-9);
    }
    let after = positions(mesh_of(&op));
    for (a, b) in after.iter().zip(&before) {
        assert_vec_eq(*a, *b, 1e-9);
    }
}

#[test]
fn test_cancel_restores_exactly() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(4, 4, 0.3);
    select_path(&mut mesh, &[5, 6, 10]);
    let before = positions(&mesh);

    let view = top_view();
    let mut op = start(EditTarget::Mesh(mesh), &mut host, view.project(DVec3::ZERO), translate_options());
    for step in 1..5 {
        let mval = DVec2::new(50.0 + 7.3 * step as f64, 50.0 - 3.1 * step as f64);
        op.feed_event(&Event::MouseMove(mval)).unwrap();
    }
    assert_ne!(positions(mesh_of(&op)), before);

    let status = op.feed_event(&Event::press(Key::Esc)).unwrap();
    assert_eq!(status, EventStatus::Cancelled);
    assert_eq!(op.state(), OperationState::Cancelled);
    let target = op.into_target();
    assert_eq!(positions(target.mesh().unwrap()), before);
    assert_eq!(host.invalidated, vec![EntityRef::EditObject]);
    assert!(host.redraws >= 5);
}

#[test]
fn test_apply_is_idempotent() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);

    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), translate_options());
    let mval = DVec2::new(61.0, 44.0);
    op.feed_event(&Event::MouseMove(mval)).unwrap();
    let first = positions(mesh_of(&op));
    op.feed_event(&Event::MouseMove(mval)).unwrap();
    assert_eq!(positions(mesh_of(&op)), first);
}

#[test]
fn test_edge_slide_even_lands_on_midpoint() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(5, 2, 1.0);
    select_path(&mut mesh, &[2, 7]);

    let view = top_view();
    let options = TransformOptions {
        mode: ModeKind::EdgeSlide,
        slide: SlideOptions {
            even: true,
            ..SlideOptions::default()
        },
        values: Some([0.5, 0.0, 0.0]),
        ..TransformOptions::default()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, view.project(DVec3::new(2.0, 0.5, 0.0)), options);
    assert_eq!(op.mode(), ModeKind::EdgeSlide);

    let mesh = mesh_of(&op);
    let a = mesh.position(VertexId(2));
    let b = mesh.position(VertexId(7));
    assert_abs_diff_eq!((a.x - 2.0).abs(), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
    assert_abs_diff_eq!(a.y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b.y, 1.0, epsilon = 1e-12);
}

#[test]
fn test_edge_slide_falls_back_to_vertex_slide() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let options = TransformOptions {
        mode: ModeKind::EdgeSlide,
        ..TransformOptions::default()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), options);
    assert_eq!(op.mode(), ModeKind::VertSlide);
}

#[test]
fn test_slide_falls_back_to_translate() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = EditMesh::new();
    let v = mesh.add_vertex(DVec3::ZERO);
    mesh.select_vertex(v, true);
    let options = TransformOptions {
        mode: ModeKind::EdgeSlide,
        ..TransformOptions::default()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_eq!(op.mode(), ModeKind::Translate);
}

#[test]
fn test_slide_cancel_restores_uvs() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(5, 2, 1.0);
    for f in mesh.face_ids().collect::<Vec<_>>() {
        for l in mesh.face_loops(f) {
            let uv = mesh.position(mesh.origin(l)).truncate();
            mesh.set_loop_uv(l, uv);
        }
    }
    select_path(&mut mesh, &[2, 7]);
    let uvs_before: Vec<DVec2> = mesh.vertex_loops(VertexId(2)).iter().map(|l| mesh.loop_uv(*l)).collect();

    let view = top_view();
    let options = TransformOptions {
        mode: ModeKind::EdgeSlide,
        ..TransformOptions::default()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, view.project(DVec3::new(2.0, 0.5, 0.0)), options);
    op.apply_values([0.5, 0.0, 0.0]).unwrap();
    assert_ne!(mesh_of(&op).position(VertexId(2)), DVec3::new(2.0, 0.0, 0.0));

    assert_eq!(op.feed_event(&Event::press(Key::Esc)).unwrap(), EventStatus::Cancelled);
    let mesh = mesh_of(&op);
    assert_eq!(mesh.position(VertexId(2)), DVec3::new(2.0, 0.0, 0.0));
    let uvs_after: Vec<DVec2> = mesh.vertex_loops(VertexId(2)).iter().map(|l| mesh.loop_uv(*l)).collect();
    assert_eq!(uvs_after, uvs_before);
}

// =============================================================================
// EVENTS
// =============================================================================

#[test]
fn test_finished_operation_rejects_events() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), translate_options());

    assert_eq!(op.feed_event(&Event::press(Key::Return)).unwrap(), EventStatus::Confirmed);
    assert!(op.state().is_finished());
    assert!(matches!(
        op.feed_event(&Event::MouseMove(DVec2::ZERO)),
        Err(TransformError::OperationFinished)
    ));
    assert!(matches!(
        op.apply_values([1.0, 0.0, 0.0]),
        Err(TransformError::OperationFinished)
    ));
}

#[test]
fn test_axis_key_constrains_translation() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), translate_options());

    op.feed_event(&Event::press(Key::X)).unwrap();
    assert!(op.constraint().active);
    op.feed_event(&Event::MouseMove(DVec2::new(60.0, 65.0))).unwrap();
    let p = mesh_of(&op).position(VertexId(4));
    assert!((p.x - 1.0).abs() > 1e-3, "x should follow the mouse, got {p}");
    assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);

    // a mode switch drops the constraint
    op.feed_event(&Event::Modal(ModalEvent::Rotate)).unwrap();
    assert!(!op.constraint().active);
}

#[test]
fn test_typed_value_overrides_mouse() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), translate_options());

    op.feed_event(&Event::MouseMove(DVec2::new(70.0, 70.0))).unwrap();
    op.feed_event(&Event::press(Key::Digit(2))).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(4)), DVec3::new(3.0, 1.0, 0.0), 1e-12);
    assert!(op.header().contains('2'), "header {}", op.header());
}

#[test]
fn test_mirror_confirms_once_an_axis_is_chosen() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = EditMesh::new();
    let a = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
    let b = mesh.add_vertex(DVec3::new(3.0, 1.0, 0.0));
    mesh.select_vertex(a, true);
    mesh.select_vertex(b, true);
    let options = TransformOptions {
        mode: ModeKind::Mirror,
        ..TransformOptions::default()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    assert_eq!(op.feed_event(&Event::MouseMove(DVec2::ONE)).unwrap(), EventStatus::Continue);
    assert_eq!(op.feed_event(&Event::press(Key::X)).unwrap(), EventStatus::Confirmed);
    let mesh = mesh_of(&op);
    assert_vec_eq(mesh.position(a), DVec3::new(3.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(b), DVec3::new(1.0, 1.0, 0.0), 1e-12);
}

#[test]
fn test_release_of_launching_button_confirms() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let options = TransformOptions {
        release_confirm: Some(Key::LeftMouse),
        ..translate_options()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::new(50.0, 50.0), options);
    op.feed_event(&Event::MouseMove(DVec2::new(55.0, 50.0))).unwrap();
    assert_eq!(op.feed_event(&Event::release(Key::RightMouse)).unwrap(), EventStatus::Continue);
    assert_eq!(op.feed_event(&Event::release(Key::LeftMouse)).unwrap(), EventStatus::Confirmed);
}

#[test]
fn test_auto_confirm_finishes_in_begin() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = grid_mesh(3, 3, 1.0);
    mesh.select_vertex(VertexId(4), true);
    let options = TransformOptions {
        values: Some([0.0, 0.0, 2.0]),
        auto_confirm: true,
        ..translate_options()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_eq!(op.state(), OperationState::Confirmed);
    let target = op.into_target();
    assert_vec_eq(target.mesh().unwrap().position(VertexId(4)), DVec3::new(1.0, 1.0, 2.0), 1e-12);
    assert_eq!(host.invalidated, vec![EntityRef::EditObject]);
}

// =============================================================================
// PROPORTIONAL KEYS
// =============================================================================

fn proportional_row() -> (EditMesh, TransformOptions) {
    let mut mesh = wire_chain(&[DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0)]);
    mesh.select_vertex(VertexId(0), true);
    let options = TransformOptions {
        proportional: ProportionalSettings::with_radius(FalloffCurve::Linear, 2.0),
        ..translate_options()
    };
    (mesh, options)
}

#[test]
fn test_prop_size_keys_grow_and_shrink() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let (mesh, options) = proportional_row();
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    op.feed_event(&Event::press(Key::PageUp)).unwrap();
    assert_abs_diff_eq!(op.proportional().size, 2.2, epsilon = 1e-12);
    op.feed_event(&Event::press(Key::PageDown)).unwrap();
    assert_abs_diff_eq!(op.proportional().size, 2.0, epsilon = 1e-12);
}

#[test]
fn test_toggling_proportional_off_pins_unselected() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let (mesh, options) = proportional_row();
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(1)), DVec3::new(1.5, 0.0, 0.0), 1e-12);

    op.feed_event(&Event::press(Key::O)).unwrap();
    assert!(!op.proportional().enabled);
    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    let mesh = mesh_of(&op);
    assert_vec_eq(mesh.position(VertexId(0)), DVec3::new(1.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(1)), DVec3::X, 1e-12);
}

#[test]
fn test_shift_o_cycles_falloff() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let (mesh, options) = proportional_row();
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    op.feed_event(&Event::press_with(Key::O, Modifiers::SHIFT)).unwrap();
    assert_eq!(op.proportional().curve, FalloffCurve::Linear.next());
}

#[test]
fn test_alt_c_switches_to_connected_distances() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    // vertex 2 sits next to the selection in space but far along the chain
    let mut mesh = wire_chain(&[DVec3::ZERO, DVec3::new(0.0, 3.0, 0.0), DVec3::new(0.5, 0.0, 0.0)]);
    mesh.select_vertex(VertexId(0), true);
    let options = TransformOptions {
        proportional: ProportionalSettings::with_radius(FalloffCurve::Linear, 1.0),
        ..translate_options()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(2)), DVec3::new(1.0, 0.0, 0.0), 1e-12);

    op.feed_event(&Event::press_with(Key::C, Modifiers::ALT)).unwrap();
    assert!(op.proportional().connected);
    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(2)), DVec3::new(0.5, 0.0, 0.0), 1e-12);
}

#[test]
fn test_alt_c_back_to_straight_distances() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let points: Vec<DVec3> = (0..5).map(|i| DVec3::new(f64::from(i), 0.0, 0.0)).collect();
    let mut mesh = wire_chain(&points);
    mesh.select_vertex(VertexId(0), true);
    let mut proportional = ProportionalSettings::with_radius(FalloffCurve::Linear, 2.0);
    proportional.connected = true;
    let options = TransformOptions {
        proportional,
        ..translate_options()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);

    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    assert_vec_eq(mesh_of(&op).position(VertexId(4)), DVec3::new(4.0, 0.0, 0.0), 1e-12);

    op.feed_event(&Event::press_with(Key::C, Modifiers::ALT)).unwrap();
    assert!(!op.proportional().connected);
    op.apply_values([1.0, 0.0, 0.0]).unwrap();
    let mesh = mesh_of(&op);
    assert_vec_eq(mesh.position(VertexId(0)), DVec3::new(1.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(1)), DVec3::new(1.5, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(2)), DVec3::new(2.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(4)), DVec3::new(4.0, 0.0, 0.0), 1e-12);
}

// =============================================================================
// SYMMETRY
// =============================================================================

fn mirror_x() -> Symmetry {
    Symmetry {
        mirror_x: true,
        clip: None,
    }
}

/// Two quads side by side, symmetric about X = 0.
fn symmetric_strip() -> EditMesh {
    let positions = [
        DVec3::new(-1.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 0.0),
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(-1.0, 1.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(1.0, 1.0, 0.0),
    ];
    EditMesh::from_polygons(&positions, &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]]).unwrap()
}

#[test]
fn test_mirror_resize_keeps_partners_reflected() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = symmetric_strip();
    for v in [1, 2, 4, 5] {
        mesh.select_vertex(VertexId(v), true);
    }
    let options = TransformOptions {
        mode: ModeKind::Resize,
        pivot: PivotMode::Cursor,
        symmetry: mirror_x(),
        values: Some([2.0, 2.0, 2.0]),
        ..TransformOptions::default()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    let mesh = mesh_of(&op);

    assert_vec_eq(mesh.position(VertexId(2)), DVec3::new(2.0, 0.0, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(5)), DVec3::new(2.0, 2.0, 0.0), 1e-12);
    for (v, partner) in [(2, 0), (5, 3)] {
        let p = mesh.position(VertexId(v));
        assert_vec_eq(mesh.position(VertexId(partner)), DVec3::new(-p.x, p.y, p.z), 1e-12);
    }
    assert_eq!(mesh.position(VertexId(4)).x, 0.0, "plane vertices stay on the plane");
    assert_vec_eq(mesh.position(VertexId(4)), DVec3::new(0.0, 2.0, 0.0), 1e-12);
}

#[test]
fn test_mirror_translate_across_plane() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = symmetric_strip();
    mesh.select_vertex(VertexId(2), true);
    let options = TransformOptions {
        symmetry: mirror_x(),
        values: Some([-2.0, 0.5, 0.0]),
        ..translate_options()
    };
    let op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    let mesh = mesh_of(&op);
    assert_vec_eq(mesh.position(VertexId(2)), DVec3::new(-1.0, 0.5, 0.0), 1e-12);
    assert_vec_eq(mesh.position(VertexId(0)), DVec3::new(1.0, 0.5, 0.0), 1e-12);
}

#[test]
fn test_mirror_cancel_restores_plane_vertex_exactly() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = EditMesh::new();
    let v = mesh.add_vertex(DVec3::new(5e-6, 1.0, 0.0));
    mesh.select_vertex(v, true);
    let options = TransformOptions {
        symmetry: mirror_x(),
        values: Some([1.0, 0.0, 0.0]),
        ..translate_options()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_eq!(mesh_of(&op).position(v).x, 0.0, "pinned to the plane while running");

    assert_eq!(op.feed_event(&Event::press(Key::Esc)).unwrap(), EventStatus::Cancelled);
    assert_eq!(mesh_of(&op).position(v), DVec3::new(5e-6, 1.0, 0.0));
}

#[test]
fn test_mirror_cancel_restores_asymmetric_partner() {
    let mut host = SimpleHost::new(DMat4::IDENTITY);
    let mut mesh = EditMesh::new();
    let right = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
    let left = mesh.add_vertex(DVec3::new(-1.000004, 0.0, 0.0));
    mesh.select_vertex(right, true);
    let options = TransformOptions {
        symmetry: mirror_x(),
        values: Some([0.5, 0.0, 0.0]),
        ..translate_options()
    };
    let mut op = start(EditTarget::Mesh(mesh), &mut host, DVec2::ZERO, options);
    assert_vec_eq(mesh_of(&op).position(left), DVec3::new(-1.5, 0.0, 0.0), 1e-12);

    op.feed_event(&Event::press(Key::Esc)).unwrap();
    let mesh = mesh_of(&op);
    assert_eq!(mesh.position(right), DVec3::new(1.0, 0.0, 0.0));
    assert_eq!(mesh.position(left), DVec3::new(-1.000004, 0.0, 0.0));
}

// =============================================================================
// OBJECTS
// =============================================================================

#[test]
fn test_objects_translate_and_invalidate() {
    let mut scene = Scene::new();
    let mut cube = SceneObject::new(ObjectId(1), "Cube");
    cube.selected = true;
    scene.add_object(cube);
    scene.add_object(SceneObject::new(ObjectId(2), "Lamp"));
    let mut host = SimpleHost::from_scene(&scene);

    let options = TransformOptions {
        values: Some([1.0, 2.0, 0.0]),
        ..translate_options()
    };
    let mut op = start(EditTarget::Objects(scene), &mut host, DVec2::ZERO, options);
    assert_eq!(op.feed_event(&Event::press(Key::Space)).unwrap(), EventStatus::Confirmed);

    let target = op.into_target();
    let scene = target.scene().unwrap();
    assert_vec_eq(scene.objects[0].location, DVec3::new(1.0, 2.0, 0.0), 1e-12);
    assert_eq!(scene.objects[1].location, DVec3::ZERO);
    assert_eq!(host.invalidated, vec![EntityRef::Object(ObjectId(1))]);
}
