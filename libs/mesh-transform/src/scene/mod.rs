//! # Scene Objects
//!
//! Minimal object graph for object-mode transforms: location, rotation in
//! one of three representations, scale, an optional parent and per-channel
//! protection locks.

use glam::{DMat3, DMat4, DQuat, DVec3, EulerRot};

/// Stable identifier of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Rotation of an object in the representation the user keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectRotation {
    /// Euler angles in radians
    Euler {
        /// Angles about the three axes
        angles: DVec3,
        /// Application order
        order: EulerRot,
    },
    /// Unit quaternion
    Quaternion(DQuat),
    /// Axis and angle in radians
    AxisAngle {
        /// Rotation axis
        axis: DVec3,
        /// Rotation angle
        angle: f64,
    },
}

impl Default for ObjectRotation {
    fn default() -> Self {
        Self::Euler {
            angles: DVec3::ZERO,
            order: EulerRot::XYZ,
        }
    }
}

impl ObjectRotation {
    /// Rotation matrix.
    pub fn to_mat3(&self) -> DMat3 {
        DMat3::from_quat(self.to_quat())
    }

    /// Rotation as a unit quaternion.
    pub fn to_quat(&self) -> DQuat {
        match *self {
            Self::Euler { angles, order } => DQuat::from_euler(order, angles.x, angles.y, angles.z),
            Self::Quaternion(q) => q.normalize(),
            Self::AxisAngle { axis, angle } => {
                let axis = axis.normalize_or_zero();
                if axis == DVec3::ZERO {
                    DQuat::IDENTITY
                } else {
                    DQuat::from_axis_angle(axis, angle)
                }
            }
        }
    }
}

/// Channels the user protected from interactive edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformLocks {
    /// Per-axis location locks
    pub location: [bool; 3],
    /// Per-axis rotation locks
    pub rotation: [bool; 3],
    /// Locks the W component of quaternion and axis-angle rotations
    pub rotation_w: bool,
    /// Quaternion and axis-angle locks act on all four components
    pub rotation_4d: bool,
    /// Per-axis scale locks
    pub scale: [bool; 3],
}

impl TransformLocks {
    /// True when any rotation channel is locked.
    pub fn any_rotation(&self) -> bool {
        self.rotation.iter().any(|l| *l) || (self.rotation_4d && self.rotation_w)
    }
}

/// Object of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Identifier
    pub id: ObjectId,
    /// Display name
    pub name: String,
    /// Location relative to the parent
    pub location: DVec3,
    /// Rotation relative to the parent
    pub rotation: ObjectRotation,
    /// Scale relative to the parent
    pub scale: DVec3,
    /// Index of the parent object
    pub parent: Option<usize>,
    /// Selection state
    pub selected: bool,
    /// Hidden objects are never transformed
    pub hidden: bool,
    /// Data linked from a library cannot be edited
    pub linked: bool,
    /// Protected channels
    pub locks: TransformLocks,
}

impl SceneObject {
    /// Unparented object at the origin.
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: DVec3::ZERO,
            rotation: ObjectRotation::default(),
            scale: DVec3::ONE,
            parent: None,
            selected: false,
            hidden: false,
            linked: false,
            locks: TransformLocks::default(),
        }
    }

    /// Location, rotation and scale composed as `T * R * S`.
    pub fn local_matrix(&self) -> DMat4 {
        DMat4::from_translation(self.location)
            * DMat4::from_mat3(self.rotation.to_mat3() * DMat3::from_diagonal(self.scale))
    }
}

/// Flat list of objects with parent links by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// All objects
    pub objects: Vec<SceneObject>,
    /// Index of the active object
    pub active: Option<usize>,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its index.
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Index of the object with the given id.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|ob| ob.id == id)
    }

    /// Object with the given id.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|ob| ob.id == id)
    }

    /// Mutable object with the given id.
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|ob| ob.id == id)
    }

    /// World matrix of the object at `index`.
    ///
    /// Parent chains longer than the object count are cut, so a cyclic
    /// parent link cannot loop forever.
    pub fn world_matrix(&self, index: usize) -> DMat4 {
        let mut matrix = DMat4::IDENTITY;
        let mut current = Some(index);
        let mut depth = 0;
        while let Some(i) = current {
            let Some(ob) = self.objects.get(i) else {
                break;
            };
            matrix = ob.local_matrix() * matrix;
            current = ob.parent;
            depth += 1;
            if depth > self.objects.len() {
                break;
            }
        }
        matrix
    }

    /// Returns true when any ancestor of `index` satisfies `pred`.
    pub fn has_ancestor(&self, index: usize, pred: impl Fn(&SceneObject) -> bool) -> bool {
        let mut current = self.objects.get(index).and_then(|ob| ob.parent);
        let mut depth = 0;
        while let Some(i) = current {
            let Some(ob) = self.objects.get(i) else {
                return false;
            };
            if pred(ob) {
                return true;
            }
            current = ob.parent;
            depth += 1;
            if depth > self.objects.len() {
                return false;
            }
        }
        false
    }
}
