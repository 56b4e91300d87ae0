//! The entities living in a world.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::physics::aabb::{Aabb, Contact};
use crate::engine_state::voxels::physics::entity::{Entity, EntityId};
use crate::engine_state::voxels::physics::{step_entity, TickReport};

/// Owns every entity and hands out ids.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_with(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(build(id));
        id
    }

    /// Adds a player body at `position` and returns its id.
    pub fn spawn_player(&mut self, position: Point3<f32>) -> EntityId {
        self.insert_with(|id| Entity::player(id, position))
    }

    /// Adds a prop body at `position` and returns its id.
    pub fn spawn_prop(&mut self, position: Point3<f32>, half_extents: Vector3<f32>) -> EntityId {
        self.insert_with(|id| Entity::prop(id, position, half_extents))
    }

    /// Looks up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// Removes an entity. Ids are never reused.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Entities in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Boxes of every entity other bodies can collide with.
    pub fn collision_bodies(&self) -> Vec<(EntityId, Aabb)> {
        self.entities
            .iter()
            .filter(|entity| entity.has_collision)
            .map(|entity| (entity.id, entity.aabb()))
            .collect()
    }

    /// Steps every active entity once, in spawn order.
    ///
    /// Each entity sees the others where they are at the moment it moves, so
    /// entities stepped earlier in the tick are seen at their new position.
    ///
    /// # Arguments
    /// * `gravity` - World gravity
    /// * `dt` - Step length in seconds
    /// * `check` - Collision query given the current bodies, the moving box and the moving entity
    pub fn step_all<F>(&mut self, gravity: f32, dt: f32, mut check: F) -> TickReport
    where
        F: FnMut(&[(EntityId, Aabb)], &Aabb, EntityId) -> Option<Contact>,
    {
        let mut report = TickReport::default();
        for index in 0..self.entities.len() {
            if !self.entities[index].active {
                continue;
            }
            let bodies = self.collision_bodies();
            let entity = &mut self.entities[index];
            let id = entity.id;
            let events = step_entity(entity, gravity, dt, |aabb| check(&bodies, aabb, id));
            report.entities_updated += 1;
            report.collisions.extend(events);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_stable() {
        let mut store = EntityStore::new();
        let a = store.spawn_player(Point3::new(0.0, 0.0, 0.0));
        let b = store.spawn_prop(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        assert_ne!(a, b);
        assert!(store.remove(a).is_some());
        let c = store.spawn_prop(Point3::new(2.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        assert_ne!(b, c);
        assert!(store.get(b).is_some());
        assert!(store.get(a).is_none());
    }

    #[test]
    fn inactive_entities_are_not_counted() {
        let mut store = EntityStore::new();
        let id = store.spawn_prop(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        store.spawn_prop(Point3::new(5.0, 10.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        if let Some(entity) = store.get_mut(id) {
            entity.active = false;
        }
        let report = store.step_all(9.81, 0.05, |_, _, _| None);
        assert_eq!(report.entities_updated, 1);
    }
}
