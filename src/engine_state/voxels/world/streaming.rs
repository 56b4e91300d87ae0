//! The streaming window: which chunks should be resident around an observer.

use std::collections::HashSet;

use crate::engine_state::voxels::chunk::ChunkCoord;

/// What one streaming update changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingUpdate {
    /// Chunk the window is centered on
    pub center: ChunkCoord,
    /// Chunks that left the window, sorted
    pub evicted: Vec<ChunkCoord>,
    /// Chunks that entered the window, nearest first
    pub created: Vec<ChunkCoord>,
}

impl StreamingUpdate {
    /// True when the update neither loaded nor evicted anything.
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.created.is_empty()
    }
}

/// Every coordinate within Chebyshev distance `radius` of `center`.
pub fn window(center: ChunkCoord, radius: i32) -> impl Iterator<Item = ChunkCoord> {
    (-radius..=radius)
        .flat_map(move |dx| (-radius..=radius).map(move |dz| ChunkCoord::new(center.x + dx, center.z + dz)))
}

/// Splits the difference between the resident set and the window around `center`.
///
/// # Arguments
/// * `center` - Observer chunk
/// * `radius` - Chebyshev radius of the window
/// * `resident` - Currently resident coordinates
pub fn plan(center: ChunkCoord, radius: i32, resident: &[ChunkCoord]) -> StreamingUpdate {
    let resident_set: HashSet<_> = resident.iter().copied().collect();

    let mut evicted: Vec<_> = resident
        .iter()
        .copied()
        .filter(|coord| coord.chebyshev_distance(center) > radius)
        .collect();
    evicted.sort();

    let mut created: Vec<_> = window(center, radius)
        .filter(|coord| !resident_set.contains(coord))
        .collect();
    created.sort_by_key(|coord| (coord.chebyshev_distance(center), *coord));

    StreamingUpdate {
        center,
        evicted,
        created,
    }
}
