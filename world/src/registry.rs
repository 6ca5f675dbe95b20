//! Arena of game objects keyed by world-allocated identifiers.

use std::collections::BTreeMap;

use worms_core::{ObjectId, ObjectKind, OwnershipError, Position};

use crate::objects::GameObject;

/// Registry that stores attached objects and manages identifier allocation.
///
/// Identifiers grow monotonically, so iteration order is insertion order.
/// Once the last identifier is handed out the registry refuses new members.
#[derive(Debug)]
pub(crate) struct ObjectRegistry {
    entries: BTreeMap<ObjectId, GameObject>,
    next_object_id: Option<ObjectId>,
}

impl ObjectRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_object_id: Some(ObjectId::new(0)),
        }
    }

    pub(crate) fn insert(&mut self, object: GameObject) -> Result<ObjectId, OwnershipError> {
        let id = self
            .next_object_id
            .ok_or(OwnershipError::IdentifiersExhausted)?;
        self.next_object_id = id.get().checked_add(1).map(ObjectId::new);
        let _ = self.entries.insert(id, object);
        Ok(id)
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> Option<GameObject> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: ObjectId) -> Option<&GameObject> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> {
        self.entries.iter().map(|(id, object)| (*id, object))
    }

    /// Members of the requested kind whose bodies overlap the circle.
    pub(crate) fn overlapping(
        &self,
        kind: ObjectKind,
        center: Position,
        radius: f64,
    ) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, object)| object.kind() == kind && object.overlaps(center, radius))
            .map(|(id, _)| id)
            .collect()
    }
}
