//! Vertex format handed to the render backend.
//!
//! Every vertex is nine `f32` values, tightly packed, so a bucket of vertices
//! can be uploaded as raw bytes with [`bytemuck::cast_slice`].

/// A vertex of a chunk mesh, in chunk-local space.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: 2x f32 (8 bytes)
/// - Tint: 3x f32 (12 bytes), reserved and always white
/// - Light: f32 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
    /// Per-vertex color multiplier
    pub tint: [f32; 3],
    /// Brightness in `0.0..=1.0`, already including directional shading
    pub light: f32,
}

impl Vertex {
    /// Number of `f32` values per vertex.
    pub const FLOATS: usize = 9;

    /// Creates a white vertex.
    ///
    /// # Arguments
    /// * `position` - Chunk-local corner position
    /// * `tex_coords` - Corner UV
    /// * `light` - Final brightness of the face
    pub fn new(position: [f32; 3], tex_coords: [f32; 2], light: f32) -> Self {
        Vertex {
            position,
            tex_coords,
            tint: [1.0; 3],
            light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_to_nine_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), Vertex::FLOATS * 4);
        let vertex = Vertex::new([1.0, 2.0, 3.0], [0.0, 1.0], 0.5);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.5]);
    }
}
