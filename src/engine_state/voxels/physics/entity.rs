//! # Entities
//!
//! Simulated bodies living in the world. An entity is a box given by its
//! center and half extents, moved by the fixed-step integrator in
//! [`super::step_entity`].

use cgmath::{InnerSpace, Point3, Vector3, Zero};

use crate::engine_state::voxels::block::block_type::BlockType;

use super::aabb::Aabb;

/// Stable handle of an entity inside a world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Blocks a new player starts with, one per hotbar slot.
pub const STARTING_INVENTORY: [BlockType; 9] = [
    BlockType::Dirt,
    BlockType::Grass,
    BlockType::Stone,
    BlockType::OakPlanks,
    BlockType::OakLog,
    BlockType::Sand,
    BlockType::Gravel,
    BlockType::SnowGrass,
    BlockType::Gravel,
];

/// Player-only data.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    /// Hotbar contents
    pub inventory: [BlockType; 9],
    /// Index into the hotbar
    pub selected_slot: usize,
    /// Horizontal speed in blocks per second
    pub move_speed: f32,
    /// Upward velocity set by a jump
    pub jump_force: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            inventory: STARTING_INVENTORY,
            selected_slot: 0,
            move_speed: 6.0,
            jump_force: 6.0,
        }
    }
}

impl PlayerState {
    /// The block the player would place right now.
    pub fn selected_block(&self) -> BlockType {
        self.inventory[self.selected_slot % self.inventory.len()]
    }
}

/// What an entity is, beyond its body.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    /// The player body with its input state
    Player(PlayerState),
    /// Any other body: crates, dropped items, test dummies
    Prop,
}

/// A simulated body.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    /// Unique within its world
    pub id: EntityId,
    /// Center of the body
    pub position: Point3<f32>,
    /// Center before the last step
    pub previous_position: Point3<f32>,
    /// Blocks per second
    pub velocity: Vector3<f32>,
    /// Applied every step until a collision on its axis clears it
    pub acceleration: Vector3<f32>,
    /// Half size of the collision box
    pub half_extents: Vector3<f32>,
    /// Inactive entities are skipped by the integrator
    pub active: bool,
    /// Whether other bodies collide with this one and whether it collides at all
    pub has_collision: bool,
    /// Whether gravity applies at all
    pub affected_by_gravity: bool,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Set when the last step ended on a floor
    pub on_ground: bool,
    /// Player or prop
    pub kind: EntityKind,
}

impl Entity {
    fn with_kind(id: EntityId, position: Point3<f32>, half_extents: Vector3<f32>, kind: EntityKind) -> Self {
        Self {
            id,
            position,
            previous_position: position,
            velocity: Vector3::zero(),
            acceleration: Vector3::zero(),
            half_extents,
            active: true,
            has_collision: true,
            affected_by_gravity: true,
            gravity_scale: 1.0,
            drag: 0.1,
            on_ground: false,
            kind,
        }
    }

    /// A player: a 0.6 × 1.8 × 0.6 body.
    pub fn player(id: EntityId, position: Point3<f32>) -> Self {
        Self::with_kind(
            id,
            position,
            Vector3::new(0.3, 0.9, 0.3),
            EntityKind::Player(PlayerState::default()),
        )
    }

    /// A generic body with the given half extents.
    pub fn prop(id: EntityId, position: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        Self::with_kind(id, position, half_extents, EntityKind::Prop)
    }

    /// Whether this is the player body.
    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    /// Player input and inventory, `None` for props.
    pub fn player_state(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            EntityKind::Prop => None,
        }
    }

    /// Collision box at the current position.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }

    /// Adds a continuous force; it stays applied until a collision clears it.
    pub fn add_force(&mut self, force: Vector3<f32>) {
        self.acceleration += force;
    }

    /// Adds an instantaneous change of velocity.
    pub fn add_impulse(&mut self, impulse: Vector3<f32>) {
        self.velocity += impulse;
    }

    /// Sets horizontal velocity from movement input relative to the camera.
    ///
    /// # Arguments
    /// * `input` - `x` strafes right, `z` moves forward; only the direction matters
    /// * `yaw_degrees` - Camera heading, 0 looking along +X
    ///
    /// Does nothing for non-player entities.
    pub fn move_input(&mut self, input: Vector3<f32>, yaw_degrees: f32) {
        let EntityKind::Player(state) = &self.kind else {
            return;
        };
        let yaw = yaw_degrees.to_radians();
        let forward = Vector3::new(yaw.cos(), 0.0, yaw.sin());
        let right = forward.cross(Vector3::unit_y()).normalize();

        let mut wish = forward * input.z + right * input.x;
        if wish.magnitude2() > 0.0 {
            wish = wish.normalize();
        }

        self.velocity.x = wish.x * state.move_speed;
        self.velocity.z = wish.z * state.move_speed;
    }

    /// Launches the player upwards if it stands on something.
    ///
    /// # Returns
    /// `true` if the jump happened.
    pub fn jump(&mut self) -> bool {
        let EntityKind::Player(state) = &self.kind else {
            return false;
        };
        if !self.on_ground {
            return false;
        }
        self.velocity.y = state.jump_force;
        self.on_ground = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::physics::step_entity;

    #[test]
    fn player_body_and_inventory() {
        let player = Entity::player(EntityId(1), Point3::new(0.0, 100.0, 0.0));
        let aabb = player.aabb();
        assert!((aabb.max.y - aabb.min.y - 1.8).abs() < 1e-5);
        assert_eq!(player.player_state().map(|s| s.selected_block()), Some(BlockType::Dirt));
    }

    #[test]
    fn forward_input_follows_yaw() {
        let mut player = Entity::player(EntityId(1), Point3::new(0.0, 0.0, 0.0));
        player.move_input(Vector3::new(0.0, 0.0, 1.0), 0.0);
        assert!((player.velocity.x - 6.0).abs() < 1e-4);
        assert!(player.velocity.z.abs() < 1e-4);

        player.move_input(Vector3::new(1.0, 0.0, 1.0), 90.0);
        let horizontal = Vector3::new(player.velocity.x, 0.0, player.velocity.z);
        assert!((horizontal.magnitude() - 6.0).abs() < 1e-3);
    }

    #[test]
    fn jump_needs_ground() {
        let mut player = Entity::player(EntityId(1), Point3::new(0.0, 0.0, 0.0));
        assert!(!player.jump());
        player.on_ground = true;
        assert!(player.jump());
        assert_eq!(player.velocity.y, 6.0);

        let mut prop = Entity::prop(EntityId(2), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        prop.on_ground = true;
        assert!(!prop.jump());
    }

    #[test]
    fn forces_persist_and_impulses_do_not() {
        let mut prop = Entity::prop(EntityId(3), Point3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.5, 0.5));
        prop.affected_by_gravity = false;
        prop.drag = 0.0;

        prop.add_force(Vector3::new(2.0, 0.0, 0.0));
        prop.add_force(Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(prop.acceleration, Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(prop.velocity, Vector3::zero());

        step_entity(&mut prop, 9.81, 0.5, |_| None);
        assert!((prop.velocity.x - 2.0).abs() < 1e-5);
        assert!((prop.position.x - 1.0).abs() < 1e-5);
        step_entity(&mut prop, 9.81, 0.5, |_| None);
        assert!((prop.velocity.x - 4.0).abs() < 1e-5);

        prop.add_impulse(Vector3::new(0.0, 3.0, 0.0));
        assert_eq!(prop.velocity.y, 3.0);
        assert_eq!(prop.acceleration, Vector3::new(4.0, 0.0, 0.0));
    }
}
