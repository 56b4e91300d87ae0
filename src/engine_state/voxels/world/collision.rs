//! World collision queries.
//!
//! A query visits a point-in-time copy of the chunk table, then the entity
//! bodies. Every intersecting candidate yields a contact from
//! [`Aabb::penetration`]; the one with the smallest penetration wins, and the
//! first one found wins ties. Chunks are visited in coordinate order.

use cgmath::Vector3;

use crate::core::MtResource;
use crate::engine_state::voxels::block::BlockRegistry;
use crate::engine_state::voxels::chunk::Chunk;
use crate::engine_state::voxels::physics::aabb::{Aabb, Contact};
use crate::engine_state::voxels::physics::entity::EntityId;

use super::chunk_table::ChunkTable;

fn keep_shallowest(best: &mut Option<Contact>, candidate: Option<Contact>) {
    if let Some(candidate) = candidate {
        match best {
            Some(current) if candidate.penetration >= current.penetration => {}
            _ => *best = Some(candidate),
        }
    }
}

/// Contact of `moving` against one chunk's merged boxes.
///
/// A chunk whose collision cache is dirty rebuilds it and reports no contact
/// for this query; the rebuilt boxes take part from the next query on.
fn chunk_contact(chunk: &MtResource<Chunk>, registry: &BlockRegistry, moving: &Aabb) -> Option<Contact> {
    {
        let guard = chunk.get();
        if !guard.state().has_blocks() || !guard.world_bounds().intersects(moving) {
            return None;
        }
        if !guard.is_collision_dirty() {
            return shallowest_box(&guard, moving);
        }
    }

    let mut guard = chunk.get_mut();
    if guard.is_collision_dirty() {
        guard.rebuild_collision(registry);
        return None;
    }
    shallowest_box(&guard, moving)
}

fn shallowest_box(chunk: &Chunk, moving: &Aabb) -> Option<Contact> {
    let (x, z) = chunk.coord().world_origin();
    let offset = Vector3::new(x as f32, 0.0, z as f32);
    let mut best = None;
    for local in chunk.collision_boxes() {
        keep_shallowest(&mut best, moving.penetration(&local.translated(offset)));
    }
    best
}

/// Finds how to push `moving` out of the world.
///
/// # Arguments
/// * `chunks` - Resident chunks
/// * `registry` - Block solidity, for collision rebuilds
/// * `bodies` - Collidable entity boxes
/// * `moving` - The box being tested
/// * `exclude` - The entity owning `moving`, skipped among `bodies`
///
/// # Returns
/// The contact with the smallest penetration, or `None` if nothing overlaps.
pub fn find_contact(
    chunks: &ChunkTable,
    registry: &BlockRegistry,
    bodies: &[(EntityId, Aabb)],
    moving: &Aabb,
    exclude: Option<EntityId>,
) -> Option<Contact> {
    let mut best = None;

    for (_, chunk) in chunks.snapshot() {
        keep_shallowest(&mut best, chunk_contact(&chunk, registry, moving));
    }

    for (id, body) in bodies {
        if Some(*id) == exclude {
            continue;
        }
        keep_shallowest(&mut best, moving.penetration(body));
    }

    best
}
