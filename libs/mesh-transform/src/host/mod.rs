//! # Host Collaborators
//!
//! The transform core does not own object matrices, derived caches or
//! drawing. It asks the host through [`TransformHost`].

use crate::scene::{ObjectId, Scene};
use crate::view::RegionId;
use glam::DMat4;
use std::collections::HashMap;

/// Entity whose matrices or caches the core asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    /// The object owning the mesh or curve in edit mode
    EditObject,
    /// A scene object
    Object(ObjectId),
}

/// Services the host application provides to a running transform.
pub trait TransformHost {
    /// World matrix of an entity.
    fn world_matrix(&self, entity: EntityRef) -> DMat4;

    /// Matrix of an entity relative to its parent.
    fn local_matrix(&self, entity: EntityRef) -> DMat4;

    /// Called once when an operation ends so normals, bounds and render
    /// caches get rebuilt.
    fn invalidate_derived_caches(&mut self, entity: EntityRef);

    /// Called after every apply step.
    fn notify_redraw(&mut self, region: RegionId);
}

/// In-memory host recording the notifications it receives.
#[derive(Debug, Clone, Default)]
pub struct SimpleHost {
    /// World matrix of the object in edit mode
    pub edit_matrix: DMat4,
    /// `(world, local)` per scene object
    pub objects: HashMap<ObjectId, (DMat4, DMat4)>,
    /// Entities whose caches were invalidated, in call order
    pub invalidated: Vec<EntityRef>,
    /// Number of redraw requests
    pub redraws: usize,
}

impl SimpleHost {
    /// Host whose edit object sits at `edit_matrix`.
    pub fn new(edit_matrix: DMat4) -> Self {
        Self {
            edit_matrix,
            ..Self::default()
        }
    }

    /// Host mirroring the matrices of every object of `scene`.
    pub fn from_scene(scene: &Scene) -> Self {
        let objects = scene
            .objects
            .iter()
            .enumerate()
            .map(|(i, ob)| (ob.id, (scene.world_matrix(i), ob.local_matrix())))
            .collect();
        Self {
            edit_matrix: DMat4::IDENTITY,
            objects,
            ..Self::default()
        }
    }
}

impl TransformHost for SimpleHost {
    fn world_matrix(&self, entity: EntityRef) -> DMat4 {
        match entity {
            EntityRef::EditObject => self.edit_matrix,
            EntityRef::Object(id) => self
                .objects
                .get(&id)
                .map_or(DMat4::IDENTITY, |(world, _)| *world),
        }
    }

    fn local_matrix(&self, entity: EntityRef) -> DMat4 {
        match entity {
            EntityRef::EditObject => self.edit_matrix,
            EntityRef::Object(id) => self
                .objects
                .get(&id)
                .map_or(DMat4::IDENTITY, |(_, local)| *local),
        }
    }

    fn invalidate_derived_caches(&mut self, entity: EntityRef) {
        self.invalidated.push(entity);
    }

    fn notify_redraw(&mut self, _region: RegionId) {
        self.redraws += 1;
    }
}
