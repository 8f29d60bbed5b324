//! # Transform Elements
//!
//! Uniform per-element record shared by every source kind. An element keeps
//! its original value, the value computed by the active mode, the matrices
//! that map world deltas into the owner's local space and its falloff
//! weight. Elements never alias the owner's storage: they carry an
//! [`ElementHandle`] and [`EditTarget`] writes them back through setters.
//!
//! ## Ordering
//!
//! Selected elements always come first. Several modes stop at the first
//! element carrying [`ElementFlags::NOACTION`], which relies on that.

mod target;

pub use target::{ClipSettings, EditTarget, Symmetry};

use crate::curve::HandleType;
use crate::mesh::{EdgeId, VertexId};
use crate::scene::{ObjectId, ObjectRotation, TransformLocks};
use bitflags::bitflags;
use glam::{DMat3, DMat4, DVec3};

bitflags! {
    /// Per-element state bits.
    pub struct ElementFlags: u32 {
        /// Directly selected, full effect
        const SELECTED = 1 << 0;
        /// Unaffected; modes stop at the first such element
        const NOACTION = 1 << 1;
        /// Ignored by modes without ending the pass
        const SKIP = 1 << 2;
        /// Excluded from the pivot computation
        const NOCENTER = 1 << 3;
        /// Location is never written (objects moved through their parent)
        const NO_LOC = 1 << 4;
        /// No path to a selected element exists
        const NOTCONNECTED = 1 << 5;
        /// Lies on the mirror plane
        const MIRROR_EDGE = 1 << 6;
        /// Rotation is written as a quaternion
        const USEQUAT = 1 << 7;
        /// Point of a Bezier triple
        const BEZTRIPLE = 1 << 8;
    }
}

/// Where an element writes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementHandle {
    /// Position of a mesh vertex
    MeshVertex(VertexId),
    /// Scalar of a mesh edge
    MeshEdge(EdgeId),
    /// One of the three points of a Bezier control point
    CurveBezier {
        /// Spline index
        spline: usize,
        /// Control point index
        point: usize,
        /// 0 left handle, 1 center, 2 right handle
        slot: usize,
    },
    /// Point of a poly spline
    CurvePoint {
        /// Spline index
        spline: usize,
        /// Point index
        point: usize,
    },
    /// Whole scene object
    Object(ObjectId),
}

/// Scalar edited by scalar modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarChannel {
    /// No scalar
    #[default]
    None,
    /// Edge crease weight
    Crease,
    /// Curve point radius
    Radius,
    /// Curve point tilt
    Tilt,
}

/// Rotation and scale of an object element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectExt {
    /// Rotation written back
    pub rot: ObjectRotation,
    /// Rotation at the start of the operation
    pub irot: ObjectRotation,
    /// Scale written back
    pub size: DVec3,
    /// Scale at the start of the operation
    pub isize: DVec3,
    /// World matrix at the start of the operation
    pub obmat: DMat4,
}

impl ObjectExt {
    /// Extension snapshotting the given rotation and scale.
    pub fn new(rot: ObjectRotation, size: DVec3, obmat: DMat4) -> Self {
        Self {
            rot,
            irot: rot,
            size,
            isize: size,
            obmat,
        }
    }
}

/// One position- or scalar-bearing unit taking part in a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformElement {
    /// Storage the element writes to
    pub handle: ElementHandle,
    /// Original position, never modified after conversion
    pub iloc: DVec3,
    /// Position computed by the active mode
    pub loc: DVec3,
    /// Individual pivot in the owner's local space
    pub center: DVec3,
    /// Local to global
    pub mtx: DMat3,
    /// Global to local
    pub smtx: DMat3,
    /// Orientation used by individual origins and normal-based modes
    pub axismtx: DMat3,
    /// Falloff weight in `[0, 1]`
    pub factor: f64,
    /// Connectivity distance to the selection
    pub dist: f64,
    /// Straight distance to the selection
    pub rdist: f64,
    /// State bits
    pub flags: ElementFlags,
    /// Scalar computed by a scalar mode
    pub val: Option<f64>,
    /// Scalar at the start of the operation
    pub ival: f64,
    /// Which scalar `val` edits
    pub channel: ScalarChannel,
    /// Rotation and scale for objects
    pub ext: Option<ObjectExt>,
    /// Vertex receiving the mirrored position
    pub mirror: Option<VertexId>,
    /// Position of the mirror partner at the start of the operation
    pub mirror_iloc: DVec3,
    /// Even-thickness multiplier for shrink/fatten
    pub shell_factor: f64,
    /// Handle types of a Bezier point before the operation
    pub handle_types: Option<[HandleType; 2]>,
    /// Protected channels
    pub locks: TransformLocks,
}

impl TransformElement {
    /// Element at `loc` with identity matrices and full weight.
    pub fn new(handle: ElementHandle, loc: DVec3) -> Self {
        Self {
            handle,
            iloc: loc,
            loc,
            center: loc,
            mtx: DMat3::IDENTITY,
            smtx: DMat3::IDENTITY,
            axismtx: DMat3::IDENTITY,
            factor: 1.0,
            dist: 0.0,
            rdist: 0.0,
            flags: ElementFlags::empty(),
            val: None,
            ival: 0.0,
            channel: ScalarChannel::None,
            ext: None,
            mirror: None,
            mirror_iloc: DVec3::ZERO,
            shell_factor: 1.0,
            handle_types: None,
            locks: TransformLocks::default(),
        }
    }

    /// Attaches an edited scalar.
    pub fn with_scalar(mut self, channel: ScalarChannel, value: f64) -> Self {
        self.channel = channel;
        self.val = Some(value);
        self.ival = value;
        self
    }

    /// Local/global matrices of the owner.
    pub fn with_matrices(mut self, mtx: DMat3, smtx: DMat3) -> Self {
        self.mtx = mtx;
        self.smtx = smtx;
        self
    }

    /// Directly selected.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(ElementFlags::SELECTED)
    }

    /// Whether the element carries a position (edge elements only carry a
    /// scalar).
    pub fn has_location(&self) -> bool {
        !matches!(self.handle, ElementHandle::MeshEdge(_))
    }

    /// Resets every computed value to its original.
    pub fn restore(&mut self) {
        self.loc = self.iloc;
        if self.val.is_some() {
            self.val = Some(self.ival);
        }
        if let Some(ext) = &mut self.ext {
            ext.rot = ext.irot;
            ext.size = ext.isize;
        }
    }
}

/// Source kind the elements were built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Edit-mode mesh vertices
    Mesh,
    /// Edit-mode mesh edges
    Edges,
    /// Curve points and handles
    Curve,
    /// Scene objects
    Objects,
}

/// Element array of one operation plus the data shared by all elements.
#[derive(Debug, Clone)]
pub struct TransformData {
    /// Elements, selected ones first
    pub elements: Vec<TransformElement>,
    /// Source kind
    pub kind: DataKind,
    /// Side of the mirror plane the selection sits on, 0 without mirror
    pub mirror_side: f64,
    /// World matrix of the edited object (identity for objects)
    pub obmat: DMat4,
    /// Children left out because a selected parent carries them
    pub implied_children: Vec<ObjectId>,
}

impl TransformData {
    /// Empty data of the given kind.
    pub fn new(kind: DataKind) -> Self {
        Self {
            elements: Vec::new(),
            kind,
            mirror_side: 0.0,
            obmat: DMat4::IDENTITY,
            implied_children: Vec::new(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when there is nothing to transform.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of directly selected elements.
    pub fn selected_count(&self) -> usize {
        self.elements.iter().take_while(|td| td.is_selected()).count()
    }

    /// Edit mode data (anything but whole objects).
    pub fn is_edit_mode(&self) -> bool {
        self.kind != DataKind::Objects
    }

    /// Resets every element.
    pub fn restore(&mut self) {
        self.elements.iter_mut().for_each(TransformElement::restore);
    }
}
