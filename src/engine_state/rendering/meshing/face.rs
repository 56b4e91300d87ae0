//! Corner tables for the two triangles that make up one block face.

use crate::engine_state::voxels::block::block_face::BlockFace;

use crate::engine_state::rendering::Vertex;

/// UV of each of the four face corners.
pub const FACE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// One triangle corner: offset from the block's minimum corner and the UV slot.
type Corner = ([u8; 3], usize);

/// Six corners, two triangles, per face. The bottom face lists its
/// triangles in reverse winding.
fn corners(face: BlockFace) -> [Corner; 6] {
    match face {
        BlockFace::Top => [
            ([0, 1, 1], 0),
            ([1, 1, 1], 1),
            ([1, 1, 0], 2),
            ([0, 1, 1], 0),
            ([1, 1, 0], 2),
            ([0, 1, 0], 3),
        ],
        BlockFace::Bottom => [
            ([1, 0, 0], 2),
            ([1, 0, 1], 1),
            ([0, 0, 1], 0),
            ([0, 0, 0], 3),
            ([1, 0, 0], 2),
            ([0, 0, 1], 0),
        ],
        BlockFace::North => [
            ([1, 0, 0], 0),
            ([0, 0, 0], 1),
            ([0, 1, 0], 2),
            ([1, 0, 0], 0),
            ([0, 1, 0], 2),
            ([1, 1, 0], 3),
        ],
        BlockFace::South => [
            ([0, 0, 1], 0),
            ([1, 0, 1], 1),
            ([1, 1, 1], 2),
            ([0, 0, 1], 0),
            ([1, 1, 1], 2),
            ([0, 1, 1], 3),
        ],
        BlockFace::West => [
            ([0, 0, 0], 0),
            ([0, 0, 1], 1),
            ([0, 1, 1], 2),
            ([0, 0, 0], 0),
            ([0, 1, 1], 2),
            ([0, 1, 0], 3),
        ],
        BlockFace::East => [
            ([1, 0, 1], 0),
            ([1, 0, 0], 1),
            ([1, 1, 0], 2),
            ([1, 0, 1], 0),
            ([1, 1, 0], 2),
            ([1, 1, 1], 3),
        ],
    }
}

/// Appends the six vertices of `face` of the block at `(x, y, z)`.
///
/// # Arguments
/// * `out` - Vertex list of the face's texture bucket
/// * `x`, `y`, `z` - Chunk-local block position
/// * `face` - Which face to emit
/// * `light` - Brightness shared by all six vertices
pub fn push_face(out: &mut Vec<Vertex>, x: usize, y: usize, z: usize, face: BlockFace, light: f32) {
    for (offset, uv) in corners(face) {
        let position = [
            (x + offset[0] as usize) as f32,
            (y + offset[1] as usize) as f32,
            (z + offset[2] as usize) as f32,
        ];
        out.push(Vertex::new(position, FACE_UVS[uv], light));
    }
}
