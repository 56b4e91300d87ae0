//! # Physics
//!
//! Fixed-step integration of entity bodies against the voxel world.
//!
//! Each step applies gravity, acceleration and drag to the velocity, then
//! moves the body one axis at a time in the order X, Y, Z. After each axis
//! move the body is tested against the world; on contact it is pushed out
//! along the contact normal by 101% of the penetration and its velocity and
//! acceleration along the normal's axis are cleared. The order matters: it
//! decides how a body slides along walls and lands on ledges.

pub mod aabb;
pub mod entity;

use cgmath::Vector3;

use aabb::{Aabb, Contact};
use entity::{Entity, EntityId};

/// Extra push-out factor that keeps a resolved body from touching the
/// obstacle again after float rounding.
pub const SEPARATION_FACTOR: f32 = 1.01;

/// What kind of surface a body ran into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// A wall
    Horizontal,
    /// A floor; the body is now grounded
    Ground,
    /// A ceiling
    Ceiling,
}

impl CollisionKind {
    fn from_normal(normal: Vector3<f32>) -> Self {
        if normal.y > 0.01 {
            CollisionKind::Ground
        } else if normal.y < -0.01 {
            CollisionKind::Ceiling
        } else {
            CollisionKind::Horizontal
        }
    }
}

/// One resolved contact.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionEvent {
    /// The body that collided
    pub entity: EntityId,
    /// Wall, floor or ceiling
    pub kind: CollisionKind,
    /// Unit normal pointing away from the surface
    pub normal: Vector3<f32>,
    /// Depth the body was pushed back by
    pub penetration: f32,
}

/// Everything that happened during one fixed step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Number of entities that were integrated
    pub entities_updated: usize,
    /// Every contact, in resolution order
    pub collisions: Vec<CollisionEvent>,
}

impl TickReport {
    /// Number of contacts of one kind.
    pub fn count(&self, kind: CollisionKind) -> usize {
        self.collisions.iter().filter(|event| event.kind == kind).count()
    }
}

#[derive(Copy, Clone, Debug)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn component(self, v: Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

fn advance(entity: &mut Entity, axis: Axis, distance: f32) {
    match axis {
        Axis::X => entity.position.x += distance,
        Axis::Y => entity.position.y += distance,
        Axis::Z => entity.position.z += distance,
    }
}

/// Clears velocity and acceleration along the dominant axis of `normal`.
fn stop_along(entity: &mut Entity, normal: Vector3<f32>) {
    if normal.x != 0.0 {
        entity.velocity.x = 0.0;
        entity.acceleration.x = 0.0;
    }
    if normal.y != 0.0 {
        entity.velocity.y = 0.0;
        entity.acceleration.y = 0.0;
    }
    if normal.z != 0.0 {
        entity.velocity.z = 0.0;
        entity.acceleration.z = 0.0;
    }
}

/// Advances one entity by `dt` seconds.
///
/// # Arguments
/// * `entity` - The body to move
/// * `gravity` - Downward acceleration before the entity's gravity scale
/// * `dt` - Step length in seconds
/// * `check` - Collision query against everything except this entity
///
/// # Returns
/// The contacts resolved during the step, in axis order.
pub fn step_entity<F>(entity: &mut Entity, gravity: f32, dt: f32, mut check: F) -> Vec<CollisionEvent>
where
    F: FnMut(&Aabb) -> Option<Contact>,
{
    let mut events = Vec::new();
    if !entity.active {
        return events;
    }

    entity.previous_position = entity.position;
    if entity.affected_by_gravity {
        entity.velocity.y -= gravity * entity.gravity_scale * dt;
    }
    entity.velocity += entity.acceleration * dt;
    entity.velocity *= (1.0 - entity.drag * dt).max(0.0);

    let movement = entity.velocity * dt;
    entity.on_ground = false;

    for axis in [Axis::X, Axis::Y, Axis::Z] {
        advance(entity, axis, axis.component(movement));
        if !entity.has_collision {
            continue;
        }

        if let Some(contact) = check(&entity.aabb()) {
            entity.position += contact.normal * (contact.penetration * SEPARATION_FACTOR);
            stop_along(entity, contact.normal);

            let kind = CollisionKind::from_normal(contact.normal);
            if kind == CollisionKind::Ground {
                entity.on_ground = true;
            }
            events.push(CollisionEvent {
                entity: entity.id,
                kind,
                normal: contact.normal,
                penetration: contact.penetration,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;

    fn floor_at(height: f32) -> Aabb {
        Aabb::new(Point3::new(-100.0, height - 10.0, -100.0), Point3::new(100.0, height, 100.0))
    }

    #[test]
    fn free_fall_accelerates_downward() {
        let mut body = Entity::prop(EntityId(7), Point3::new(0.0, 50.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        let events = step_entity(&mut body, 9.81, 0.05, |_| None);
        assert!(events.is_empty());
        assert!(body.velocity.y < 0.0);
        assert!(body.position.y < 50.0);
        assert_eq!(body.previous_position.y, 50.0);
    }

    #[test]
    fn landing_grounds_the_body() {
        let floor = floor_at(10.0);
        let mut body = Entity::prop(EntityId(7), Point3::new(0.0, 10.51, 0.0), Vector3::new(0.5, 0.5, 0.5));
        body.velocity.y = -2.0;

        let events = step_entity(&mut body, 9.81, 0.05, |aabb| aabb.penetration(&floor));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CollisionKind::Ground);
        assert!(body.on_ground);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.aabb().min.y >= 10.0);
    }

    #[test]
    fn wall_stops_horizontal_motion() {
        let wall = Aabb::new(Point3::new(1.0, -10.0, -10.0), Point3::new(2.0, 10.0, 10.0));
        let mut body = Entity::prop(EntityId(3), Point3::new(0.45, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        body.affected_by_gravity = false;
        body.velocity.x = 4.0;

        let events = step_entity(&mut body, 9.81, 0.05, |aabb| aabb.penetration(&wall));
        assert_eq!(events[0].kind, CollisionKind::Horizontal);
        assert_eq!(body.velocity.x, 0.0);
        assert!(body.aabb().max.x <= 1.0);
    }

    #[test]
    fn inactive_entities_do_not_move() {
        let mut body = Entity::prop(EntityId(1), Point3::new(0.0, 5.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        body.active = false;
        step_entity(&mut body, 9.81, 0.05, |_| None);
        assert_eq!(body.position.y, 5.0);
    }
}
