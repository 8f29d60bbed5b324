//! # Edit Mesh
//!
//! Half-edge mesh used as the edit-mode source of transform elements.
//! Uses index-based references instead of pointers.
//!
//! ## Structure
//!
//! - **Vertex**: position, selection/hide state, incident edges in insertion order
//! - **Halfedge**: points TO a vertex, references twin, next, prev, face and edge;
//!   a halfedge with a face is a face corner ("loop") and carries a UV
//! - **Edge**: one of its two halfedges, selection/hide state, crease weight
//! - **Face**: one halfedge of its boundary, selection/hide state
//!
//! Both halfedges of an edge always exist. Boundary halfedges have no face and
//! no next/prev links, so an edge carries zero (wire), one (boundary) or two
//! (manifold) faces.
//!
//! ## Example
//!
//! ```rust
//! use mesh_transform::mesh::EditMesh;
//! use glam::DVec3;
//!
//! let mut mesh = EditMesh::new();
//! let v0 = mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
//! let v1 = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
//! let v2 = mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
//! mesh.add_face(&[v0, v1, v2]).unwrap();
//! assert_eq!(mesh.edge_count(), 3);
//! ```

use crate::error::{TransformError, TransformResult};
use crate::math::{polygon_normal, shell_normalized_to_dist};
use glam::{DVec2, DVec3};
use rayon::prelude::*;
use std::collections::HashMap;

/// Invalid/null reference constant.
const INVALID: u32 = u32::MAX;

macro_rules! mesh_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Null reference.
            pub const INVALID: Self = Self(INVALID);

            /// Position in the owning arena.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Returns true unless this is the null reference.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

mesh_id!(
    /// Index type for vertices in the mesh.
    VertexId
);
mesh_id!(
    /// Index type for halfedges in the mesh.
    HalfedgeId
);
mesh_id!(
    /// Index type for edges in the mesh.
    EdgeId
);
mesh_id!(
    /// Index type for faces in the mesh.
    FaceId
);

/// Vertex in the edit mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// 3D position of the vertex
    pub position: DVec3,
    /// Selection state
    pub selected: bool,
    /// Hidden vertices never take part in a transform
    pub hidden: bool,
    edges: Vec<EdgeId>,
}

impl Vertex {
    fn new(position: DVec3) -> Self {
        Self {
            position,
            selected: false,
            hidden: false,
            edges: Vec::new(),
        }
    }
}

/// Halfedge in the edit mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Halfedge {
    /// Vertex this halfedge points TO
    pub vertex: VertexId,
    /// Twin (opposite) halfedge
    pub twin: HalfedgeId,
    /// Next halfedge in face loop (invalid on boundary halfedges)
    pub next: HalfedgeId,
    /// Previous halfedge in face loop (invalid on boundary halfedges)
    pub prev: HalfedgeId,
    /// Face this halfedge belongs to (invalid for boundary)
    pub face: FaceId,
    /// Edge shared with the twin
    pub edge: EdgeId,
    /// Corner UV, meaningful when the halfedge has a face
    pub uv: DVec2,
}

/// Edge in the edit mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Halfedge running from the first to the second vertex of the edge
    pub halfedge: HalfedgeId,
    /// Selection state
    pub selected: bool,
    /// Hidden state
    pub hidden: bool,
    /// Subdivision crease weight in `[0, 1]`
    pub crease: f64,
}

/// Face in the edit mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// One halfedge on this face's boundary
    pub halfedge: HalfedgeId,
    /// Number of corners
    pub len: u32,
    /// Selection state
    pub selected: bool,
    /// Hidden state
    pub hidden: bool,
}

/// Half-edge mesh with selection state and a corner UV layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditMesh {
    vertices: Vec<Vertex>,
    halfedges: Vec<Halfedge>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    /// Edge lookup: (v_from, v_to) -> halfedge_id
    edge_map: HashMap<(u32, u32), HalfedgeId>,
    has_uv_layer: bool,
    active_vertex: Option<VertexId>,
}

impl EditMesh {
    /// Creates a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from positions and polygons given as vertex index lists.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidTopology`] when a polygon references an
    /// unknown vertex or cannot be linked consistently.
    pub fn from_polygons(positions: &[DVec3], polygons: &[Vec<u32>]) -> TransformResult<Self> {
        let mut mesh = Self::new();
        for p in positions {
            mesh.add_vertex(*p);
        }
        for (i, poly) in polygons.iter().enumerate() {
            let ids: Vec<VertexId> = poly.iter().map(|v| VertexId(*v)).collect();
            mesh.add_face(&ids).map_err(|e| {
                TransformError::invalid_topology(format!("polygon {i}: {e}"))
            })?;
        }
        Ok(mesh)
    }

    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Adds a vertex and returns its id.
    pub fn add_vertex(&mut self, position: DVec3) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Adds an edge between two vertices, or returns the existing one.
    ///
    /// # Errors
    ///
    /// Fails for unknown vertices and for degenerate (self-loop) edges.
    pub fn add_edge(&mut self, v0: VertexId, v1: VertexId) -> TransformResult<EdgeId> {
        self.check_vertex(v0)?;
        self.check_vertex(v1)?;
        if v0 == v1 {
            return Err(TransformError::invalid_topology(format!(
                "edge from vertex {} to itself",
                v0.0
            )));
        }
        if let Some(&he) = self.edge_map.get(&(v0.0, v1.0)) {
            return Ok(self.halfedges[he.index()].edge);
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        let he_id = HalfedgeId(self.halfedges.len() as u32);
        let twin_id = HalfedgeId(he_id.0 + 1);

        for (to, twin) in [(v1, twin_id), (v0, he_id)] {
            self.halfedges.push(Halfedge {
                vertex: to,
                twin,
                next: HalfedgeId::INVALID,
                prev: HalfedgeId::INVALID,
                face: FaceId::INVALID,
                edge: edge_id,
                uv: DVec2::ZERO,
            });
        }
        self.edges.push(Edge {
            halfedge: he_id,
            selected: false,
            hidden: false,
            crease: 0.0,
        });
        self.edge_map.insert((v0.0, v1.0), he_id);
        self.edge_map.insert((v1.0, v0.0), twin_id);
        self.vertices[v0.index()].edges.push(edge_id);
        self.vertices[v1.index()].edges.push(edge_id);
        Ok(edge_id)
    }

    /// Adds a face given vertex ids in counter-clockwise order.
    ///
    /// Missing edges are created. Every directed edge may carry one face only,
    /// so an edge never has more than two faces and neighbouring faces must
    /// agree on winding.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidTopology`] for fewer than three or
    /// repeated vertices, or an already used directed edge. The mesh is left
    /// untouched on error.
    pub fn add_face(&mut self, vertex_ids: &[VertexId]) -> TransformResult<FaceId> {
        let n = vertex_ids.len();
        if n < 3 {
            return Err(TransformError::invalid_topology(format!(
                "face needs at least 3 vertices, got {n}"
            )));
        }
        for (i, v) in vertex_ids.iter().enumerate() {
            self.check_vertex(*v)?;
            if vertex_ids[..i].contains(v) {
                return Err(TransformError::invalid_topology(format!(
                    "vertex {} repeated in face",
                    v.0
                )));
            }
        }
        for i in 0..n {
            let key = (vertex_ids[i].0, vertex_ids[(i + 1) % n].0);
            if let Some(&he) = self.edge_map.get(&key) {
                if self.halfedges[he.index()].face.is_valid() {
                    return Err(TransformError::invalid_topology(format!(
                        "directed edge {} -> {} already used by a face",
                        key.0, key.1
                    )));
                }
            }
        }

        let face_id = FaceId(self.faces.len() as u32);
        let mut loops = Vec::with_capacity(n);
        for i in 0..n {
            let v_from = vertex_ids[i];
            let v_to = vertex_ids[(i + 1) % n];
            self.add_edge(v_from, v_to)?;
            match self.edge_map.get(&(v_from.0, v_to.0)) {
                Some(&he) => loops.push(he),
                None => {
                    return Err(TransformError::invalid_topology("edge lookup failed"));
                }
            }
        }

        for i in 0..n {
            let he = &mut self.halfedges[loops[i].index()];
            he.next = loops[(i + 1) % n];
            he.prev = loops[(i + n - 1) % n];
            he.face = face_id;
        }
        self.faces.push(Face {
            halfedge: loops[0],
            len: n as u32,
            selected: false,
            hidden: false,
        });
        Ok(face_id)
    }

    fn check_vertex(&self, v: VertexId) -> TransformResult<()> {
        if v.index() < self.vertices.len() {
            Ok(())
        } else {
            Err(TransformError::invalid_topology(format!(
                "vertex {} out of range",
                v.0
            )))
        }
    }

    // =========================================================================
    // COUNTS & ACCESS
    // =========================================================================

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len() as u32).map(VertexId)
    }

    /// Iterates all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    /// Iterates all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len() as u32).map(FaceId)
    }

    /// Vertex by id.
    #[inline]
    pub fn vertex(&self, v: VertexId) -> &Vertex {
        &self.vertices[v.index()]
    }

    /// Mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, v: VertexId) -> &mut Vertex {
        &mut self.vertices[v.index()]
    }

    /// Vertex by id, if it exists.
    pub fn get_vertex(&self, v: VertexId) -> Option<&Vertex> {
        self.vertices.get(v.index())
    }

    /// Edge by id.
    #[inline]
    pub fn edge(&self, e: EdgeId) -> &Edge {
        &self.edges[e.index()]
    }

    /// Mutable edge by id.
    #[inline]
    pub fn edge_mut(&mut self, e: EdgeId) -> &mut Edge {
        &mut self.edges[e.index()]
    }

    /// Edge by id, if it exists.
    pub fn get_edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e.index())
    }

    /// Face by id.
    #[inline]
    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.index()]
    }

    /// Mutable face by id.
    #[inline]
    pub fn face_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.index()]
    }

    /// Halfedge by id.
    #[inline]
    pub fn halfedge(&self, h: HalfedgeId) -> &Halfedge {
        &self.halfedges[h.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> DVec3 {
        self.vertices[v.index()].position
    }

    /// Moves a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, position: DVec3) {
        self.vertices[v.index()].position = position;
    }

    /// Snapshot of all vertex positions.
    pub fn positions(&self) -> Vec<DVec3> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Edges incident to a vertex, in insertion order.
    #[inline]
    pub fn vertex_edges(&self, v: VertexId) -> &[EdgeId] {
        &self.vertices[v.index()].edges
    }

    /// Looks up the edge joining two vertices.
    pub fn find_edge(&self, v0: VertexId, v1: VertexId) -> Option<EdgeId> {
        self.edge_map
            .get(&(v0.0, v1.0))
            .map(|he| self.halfedges[he.index()].edge)
    }

    // =========================================================================
    // SELECTION & VISIBILITY
    // =========================================================================

    /// Selects or deselects a single vertex.
    pub fn select_vertex(&mut self, v: VertexId, select: bool) {
        self.vertices[v.index()].selected = select;
    }

    /// Selects or deselects an edge together with its two vertices.
    pub fn select_edge(&mut self, e: EdgeId, select: bool) {
        self.edges[e.index()].selected = select;
        let (a, b) = self.edge_vertices(e);
        self.vertices[a.index()].selected = select;
        self.vertices[b.index()].selected = select;
    }

    /// Selects or deselects a face together with its edges and vertices.
    pub fn select_face(&mut self, f: FaceId, select: bool) {
        self.faces[f.index()].selected = select;
        for l in self.face_loops(f) {
            let e = self.halfedges[l.index()].edge;
            self.select_edge(e, select);
        }
    }

    /// Clears every selection flag.
    pub fn deselect_all(&mut self) {
        self.vertices.iter_mut().for_each(|v| v.selected = false);
        self.edges.iter_mut().for_each(|e| e.selected = false);
        self.faces.iter_mut().for_each(|f| f.selected = false);
    }

    /// Hides a vertex and every edge and face using it; hidden elements are
    /// deselected.
    pub fn hide_vertex(&mut self, v: VertexId) {
        let vert = &mut self.vertices[v.index()];
        vert.hidden = true;
        vert.selected = false;
        let edges = vert.edges.clone();
        for e in edges {
            self.edges[e.index()].hidden = true;
            self.edges[e.index()].selected = false;
            for f in self.edge_faces(e).into_iter().flatten() {
                self.faces[f.index()].hidden = true;
                self.faces[f.index()].selected = false;
            }
        }
    }

    /// Hides a face only; its edges and vertices stay visible.
    pub fn hide_face(&mut self, f: FaceId) {
        let face = &mut self.faces[f.index()];
        face.hidden = true;
        face.selected = false;
    }

    /// Number of selected vertices.
    pub fn selected_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.selected && !v.hidden).count()
    }

    /// Marks the vertex last clicked by the user.
    pub fn set_active_vertex(&mut self, v: Option<VertexId>) {
        self.active_vertex = v;
    }

    /// Last clicked vertex, if it is still selected and visible.
    pub fn active_vertex(&self) -> Option<VertexId> {
        self.active_vertex
            .filter(|v| self.get_vertex(*v).is_some_and(|vert| vert.selected && !vert.hidden))
    }

    // =========================================================================
    // CORNER UV LAYER
    // =========================================================================

    /// Returns true when corners carry UVs worth preserving.
    #[inline]
    pub fn has_uv_layer(&self) -> bool {
        self.has_uv_layer
    }

    /// Enables or disables the corner UV layer.
    pub fn set_uv_layer(&mut self, enabled: bool) {
        self.has_uv_layer = enabled;
    }

    /// UV stored on a face corner.
    #[inline]
    pub fn loop_uv(&self, l: HalfedgeId) -> DVec2 {
        self.halfedges[l.index()].uv
    }

    /// Stores a UV on a face corner and enables the UV layer.
    pub fn set_loop_uv(&mut self, l: HalfedgeId, uv: DVec2) {
        self.halfedges[l.index()].uv = uv;
        self.has_uv_layer = true;
    }

    // =========================================================================
    // TOPOLOGY QUERIES
    // =========================================================================

    /// Vertex a halfedge starts from.
    #[inline]
    pub fn origin(&self, h: HalfedgeId) -> VertexId {
        let twin = self.halfedges[h.index()].twin;
        self.halfedges[twin.index()].vertex
    }

    /// Vertex a halfedge points to.
    #[inline]
    pub fn dest(&self, h: HalfedgeId) -> VertexId {
        self.halfedges[h.index()].vertex
    }

    /// Next corner of the same face.
    #[inline]
    pub fn next(&self, l: HalfedgeId) -> HalfedgeId {
        self.halfedges[l.index()].next
    }

    /// Previous corner of the same face.
    #[inline]
    pub fn prev(&self, l: HalfedgeId) -> HalfedgeId {
        self.halfedges[l.index()].prev
    }

    /// Edge of a halfedge.
    #[inline]
    pub fn loop_edge(&self, l: HalfedgeId) -> EdgeId {
        self.halfedges[l.index()].edge
    }

    /// Face of a halfedge, `None` on a boundary halfedge.
    #[inline]
    pub fn loop_face(&self, l: HalfedgeId) -> Option<FaceId> {
        let f = self.halfedges[l.index()].face;
        f.is_valid().then_some(f)
    }

    /// The two vertices of an edge.
    pub fn edge_vertices(&self, e: EdgeId) -> (VertexId, VertexId) {
        let he = self.edges[e.index()].halfedge;
        (self.origin(he), self.dest(he))
    }

    /// The vertex of `e` that is not `v`.
    pub fn edge_other_vertex(&self, e: EdgeId, v: VertexId) -> VertexId {
        let (a, b) = self.edge_vertices(e);
        if a == v {
            b
        } else {
            a
        }
    }

    /// Returns true when `v` is an endpoint of `e`.
    pub fn edge_has_vertex(&self, e: EdgeId, v: VertexId) -> bool {
        let (a, b) = self.edge_vertices(e);
        a == v || b == v
    }

    /// Faces on either side of an edge.
    pub fn edge_faces(&self, e: EdgeId) -> [Option<FaceId>; 2] {
        let he = self.edges[e.index()].halfedge;
        let twin = self.halfedges[he.index()].twin;
        [self.loop_face(he), self.loop_face(twin)]
    }

    /// Number of faces using an edge.
    pub fn edge_face_count(&self, e: EdgeId) -> usize {
        self.edge_faces(e).iter().flatten().count()
    }

    /// Edge with exactly one face.
    pub fn edge_is_boundary(&self, e: EdgeId) -> bool {
        self.edge_face_count(e) == 1
    }

    /// Edge with exactly two faces.
    pub fn edge_is_manifold(&self, e: EdgeId) -> bool {
        self.edge_face_count(e) == 2
    }

    /// Edge without faces.
    pub fn edge_is_wire(&self, e: EdgeId) -> bool {
        self.edge_face_count(e) == 0
    }

    /// A face corner lying on `e`, if the edge has any face.
    pub fn edge_loop(&self, e: EdgeId) -> Option<HalfedgeId> {
        let he = self.edges[e.index()].halfedge;
        if self.halfedges[he.index()].face.is_valid() {
            return Some(he);
        }
        let twin = self.halfedges[he.index()].twin;
        self.halfedges[twin.index()].face.is_valid().then_some(twin)
    }

    /// The corner on the other face of the same edge, or `l` itself when the
    /// edge is a boundary.
    pub fn radial_next(&self, l: HalfedgeId) -> HalfedgeId {
        let twin = self.halfedges[l.index()].twin;
        if self.halfedges[twin.index()].face.is_valid() {
            twin
        } else {
            l
        }
    }

    /// The neighbouring corner of the same face whose edge also uses `v`.
    pub fn loop_other_edge_loop(&self, l: HalfedgeId, v: VertexId) -> HalfedgeId {
        if self.origin(l) == v {
            self.prev(l)
        } else {
            self.next(l)
        }
    }

    /// The corner of face `f` located at vertex `v`.
    pub fn face_vert_share_loop(&self, f: FaceId, v: VertexId) -> Option<HalfedgeId> {
        self.face_loops(f).into_iter().find(|l| self.origin(*l) == v)
    }

    /// Corners of a face in winding order, starting at its first halfedge.
    pub fn face_loops(&self, f: FaceId) -> Vec<HalfedgeId> {
        let start = self.faces[f.index()].halfedge;
        let mut result = Vec::with_capacity(self.faces[f.index()].len as usize);
        if !start.is_valid() {
            return result;
        }
        let mut current = start;
        loop {
            result.push(current);
            current = self.halfedges[current.index()].next;
            if current == start || !current.is_valid() {
                break;
            }
        }
        result
    }

    /// Vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        self.face_loops(f)
            .into_iter()
            .map(|l| self.origin(l))
            .collect()
    }

    /// Newell normal of a face.
    pub fn face_normal(&self, f: FaceId) -> DVec3 {
        let points: Vec<DVec3> = self
            .face_vertices(f)
            .into_iter()
            .map(|v| self.position(v))
            .collect();
        polygon_normal(&points)
    }

    /// Average of the face corners.
    pub fn face_center_median(&self, f: FaceId) -> DVec3 {
        let verts = self.face_vertices(f);
        if verts.is_empty() {
            return DVec3::ZERO;
        }
        verts.iter().map(|v| self.position(*v)).sum::<DVec3>() / verts.len() as f64
    }

    /// Face corners located at a vertex.
    pub fn vertex_loops(&self, v: VertexId) -> Vec<HalfedgeId> {
        let mut loops = Vec::new();
        for e in &self.vertices[v.index()].edges {
            let he = self.edges[e.index()].halfedge;
            let twin = self.halfedges[he.index()].twin;
            for h in [he, twin] {
                if self.halfedges[h.index()].face.is_valid() && self.origin(h) == v {
                    loops.push(h);
                }
            }
        }
        loops
    }

    /// Number of incident edges that have at least one face.
    pub fn vertex_nonwire_edge_count(&self, v: VertexId) -> usize {
        self.vertices[v.index()]
            .edges
            .iter()
            .filter(|e| !self.edge_is_wire(**e))
            .count()
    }

    /// In-face direction at a corner, bisecting its two edges.
    pub fn loop_face_direction(&self, l: HalfedgeId) -> DVec3 {
        let co = self.position(self.origin(l));
        let co_prev = self.position(self.origin(self.prev(l)));
        let co_next = self.position(self.dest(l));
        let v_prev = (co - co_prev).normalize_or_zero();
        let v_next = (co_next - co).normalize_or_zero();
        (v_prev + v_next).normalize_or_zero()
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let (a, b) = self.edge_vertices(e);
        self.position(a).distance(self.position(b))
    }

    /// Angle-weighted vertex normal; loose vertices fall back to their
    /// normalized position.
    pub fn vertex_normal(&self, v: VertexId) -> DVec3 {
        let mut accum = DVec3::ZERO;
        for l in self.vertex_loops(v) {
            let f = self.halfedges[l.index()].face;
            let co = self.position(v);
            let a = (self.position(self.origin(self.prev(l))) - co).normalize_or_zero();
            let b = (self.position(self.dest(l)) - co).normalize_or_zero();
            let angle = a.dot(b).clamp(-1.0, 1.0).acos();
            accum += self.face_normal(f) * angle;
        }
        let n = accum.normalize_or_zero();
        if n == DVec3::ZERO {
            self.position(v).normalize_or_zero()
        } else {
            n
        }
    }

    /// Angle-weighted shell thickness factor of `v` against its selected
    /// faces; 1 when no selected face touches it.
    pub fn vertex_shell_factor(&self, v: VertexId, normal: DVec3) -> f64 {
        let co = self.position(v);
        let mut accum = 0.0;
        let mut total_angle = 0.0;
        for l in self.vertex_loops(v) {
            let f = self.halfedges[l.index()].face;
            if !self.faces[f.index()].selected {
                continue;
            }
            let a = (self.position(self.origin(self.prev(l))) - co).normalize_or_zero();
            let b = (self.position(self.dest(l)) - co).normalize_or_zero();
            let angle = a.dot(b).clamp(-1.0, 1.0).acos();
            accum += shell_normalized_to_dist(normal, self.face_normal(f)) * angle;
            total_angle += angle;
        }
        if total_angle != 0.0 {
            accum / total_angle
        } else {
            1.0
        }
    }

    /// Vertex normals of the whole mesh, computed in parallel.
    pub fn vertex_normals(&self) -> Vec<DVec3> {
        (0..self.vertices.len() as u32)
            .into_par_iter()
            .map(|i| self.vertex_normal(VertexId(i)))
            .collect()
    }

    /// Checks next/prev/twin consistency.
    pub fn is_valid(&self) -> bool {
        for (i, he) in self.halfedges.iter().enumerate() {
            let twin = &self.halfedges[he.twin.index()];
            if twin.twin.index() != i || twin.edge != he.edge {
                return false;
            }
            if he.face.is_valid() {
                if !he.next.is_valid() || !he.prev.is_valid() {
                    return false;
                }
                if self.halfedges[he.next.index()].prev.index() != i {
                    return false;
                }
                if self.halfedges[he.next.index()].face != he.face {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests;
