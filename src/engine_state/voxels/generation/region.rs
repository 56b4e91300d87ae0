//! # Regional Maps
//!
//! Terrain for one chunk is shaped from a 48×48 window of height, moisture
//! and temperature samples centered on it (the chunk plus one chunk of
//! padding on every side). The padding lets the blur and the biome blend see
//! across chunk borders, so neighboring chunks agree on their shared edge.

use crate::engine_state::voxels::chunk::{ChunkCoord, CHUNK_DIMENSION, CHUNK_HEIGHT};
use crate::engine_state::voxels::noise::NoiseLibrary;

use super::biome::Biome;

/// Width of the regional window in columns.
pub const REGION_SIZE: usize = (CHUNK_DIMENSION * 3) as usize;

/// Radius of the inverse-distance blur applied to height and moisture.
pub const BLUR_RADIUS: usize = 3;

/// Column height before the noise term is added.
pub const BASE_HEIGHT: f64 = 64.0;

const TERRAIN_SCALE: f64 = 0.002;
const HEIGHT_SCALE: f64 = 80.0;
const BIOME_SCALE: f64 = 0.0005;
const LATITUDE_SPAN: f64 = 15000.0;

/// Sampled and classified fields around one chunk, indexed `rx + 48 * rz`.
#[derive(Clone, Debug)]
pub struct RegionMaps {
    height: Vec<f64>,
    moisture: Vec<f64>,
    temperature: Vec<f64>,
    biomes: Vec<Biome>,
}

#[inline]
fn region_index(rx: usize, rz: usize) -> usize {
    rx + REGION_SIZE * rz
}

impl RegionMaps {
    /// Samples, blurs and classifies the window around `coord`.
    pub fn build(noise: &NoiseLibrary, coord: ChunkCoord) -> Self {
        let area = REGION_SIZE * REGION_SIZE;
        let mut height = vec![0.0; area];
        let mut moisture = vec![0.0; area];
        let mut temperature = vec![0.0; area];

        let origin_x = (coord.x - 1) * CHUNK_DIMENSION;
        let origin_z = (coord.z - 1) * CHUNK_DIMENSION;

        for rz in 0..REGION_SIZE {
            for rx in 0..REGION_SIZE {
                let wx = (origin_x + rx as i32) as f64;
                let wz = (origin_z + rz as i32) as f64;
                let index = region_index(rx, rz);

                let continental = noise.octave2(wx, wz, 4, 0.6, TERRAIN_SCALE * 0.1);
                let rugged = noise.ridged2(wx, wz, TERRAIN_SCALE) * 0.5;
                let detail = noise.octave2(wx * 2.0, wz * 2.0, 2, 0.8, TERRAIN_SCALE * 2.0) * 0.2;
                height[index] = continental + rugged + detail;

                moisture[index] = noise.octave2(wx + 5000.0, wz + 5000.0, 2, 0.5, BIOME_SCALE);

                let latitude = 1.0 - wz.abs() / LATITUDE_SPAN;
                temperature[index] = latitude + noise.noise2(wx * 0.0001, wz * 0.0001) * 0.3;
            }
        }

        let height = blur(&height, BLUR_RADIUS);
        let moisture = blur(&moisture, BLUR_RADIUS);

        let biomes = (0..area)
            .map(|index| Biome::classify(height[index], moisture[index], temperature[index]))
            .collect();

        Self {
            height,
            moisture,
            temperature,
            biomes,
        }
    }

    /// Blended surface height at a region sample.
    #[inline]
    pub fn height(&self, rx: usize, rz: usize) -> f64 {
        self.height[region_index(rx, rz)]
    }

    /// Moisture at a region sample.
    #[inline]
    pub fn moisture(&self, rx: usize, rz: usize) -> f64 {
        self.moisture[region_index(rx, rz)]
    }

    /// Temperature at a region sample.
    #[inline]
    pub fn temperature(&self, rx: usize, rz: usize) -> f64 {
        self.temperature[region_index(rx, rz)]
    }

    /// Biome at a region sample.
    #[inline]
    pub fn biome(&self, rx: usize, rz: usize) -> Biome {
        self.biomes[region_index(rx, rz)]
    }

    /// Biome of a column given in chunk-local coordinates.
    #[inline]
    pub fn local_biome(&self, x: usize, z: usize) -> Biome {
        self.biome(x + CHUNK_DIMENSION as usize, z + CHUNK_DIMENSION as usize)
    }

    /// Surface height of a chunk-local column.
    ///
    /// The biome offset and multiplier are averaged over the 3×3 columns
    /// around it, weighted by `1 / (1 + distance)`. The result is clamped to
    /// `1..=255` so every column keeps its bedrock floor.
    pub fn surface_height(&self, x: usize, z: usize) -> i32 {
        let rx = x + CHUNK_DIMENSION as usize;
        let rz = z + CHUNK_DIMENSION as usize;

        let mut offset = 0.0;
        let mut multiplier = 0.0;
        let mut weight_sum = 0.0;
        for dz in -1i32..=1 {
            for dx in -1i32..=1 {
                let distance = ((dx * dx + dz * dz) as f64).sqrt();
                let weight = 1.0 / (1.0 + distance);
                let params = self
                    .biome((rx as i32 + dx) as usize, (rz as i32 + dz) as usize)
                    .params();
                offset += params.height_offset * weight;
                multiplier += params.height_multiplier * weight;
                weight_sum += weight;
            }
        }
        offset /= weight_sum;
        multiplier /= weight_sum;

        let noise_height = self.height(rx, rz) * HEIGHT_SCALE;
        let height = (BASE_HEIGHT + noise_height * multiplier + offset).round() as i32;
        height.clamp(1, CHUNK_HEIGHT - 1)
    }
}

/// Inverse-distance blur over a square `REGION_SIZE` grid.
///
/// Each output cell is the average of the `(2r+1)²` cells around it, weighted
/// by `1 / (dx² + dz² + 1)`. Cells closer than `radius` to the border keep
/// their input value.
pub fn blur(input: &[f64], radius: usize) -> Vec<f64> {
    let mut output = input.to_vec();
    let r = radius as i32;

    for z in radius..REGION_SIZE.saturating_sub(radius) {
        for x in radius..REGION_SIZE.saturating_sub(radius) {
            let mut sum = 0.0;
            let mut weight = 0.0;
            for dz in -r..=r {
                for dx in -r..=r {
                    let w = 1.0 / (dx * dx + dz * dz + 1) as f64;
                    let sx = (x as i32 + dx) as usize;
                    let sz = (z as i32 + dz) as usize;
                    sum += input[region_index(sx, sz)] * w;
                    weight += w;
                }
            }
            output[region_index(x, z)] = sum / weight;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_keeps_constant_fields() {
        let input = vec![0.25; REGION_SIZE * REGION_SIZE];
        let output = blur(&input, BLUR_RADIUS);
        for value in output {
            assert!((value - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn blur_spreads_a_spike_and_keeps_borders() {
        let mut input = vec![0.0; REGION_SIZE * REGION_SIZE];
        input[region_index(20, 20)] = 1.0;
        input[region_index(0, 0)] = 1.0;
        let output = blur(&input, BLUR_RADIUS);
        assert!(output[region_index(20, 20)] < 1.0);
        assert!(output[region_index(21, 20)] > 0.0);
        assert_eq!(output[region_index(0, 0)], 1.0);
    }

    #[test]
    fn neighbors_agree_on_shared_columns() {
        let noise = NoiseLibrary::new(99);
        let left = RegionMaps::build(&noise, ChunkCoord::new(0, 0));
        let right = RegionMaps::build(&noise, ChunkCoord::new(1, 0));
        // the interior column x=15 of chunk 0 sits at x=-1 of chunk 1's window
        for rz in BLUR_RADIUS..REGION_SIZE - BLUR_RADIUS {
            let a = left.temperature(31, rz);
            let b = right.temperature(15, rz);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn surface_height_stays_in_the_column() {
        let noise = NoiseLibrary::new(3);
        for cx in -2..2 {
            let maps = RegionMaps::build(&noise, ChunkCoord::new(cx, 5));
            for z in 0..16 {
                for x in 0..16 {
                    let height = maps.surface_height(x, z);
                    assert!((1..CHUNK_HEIGHT).contains(&height));
                }
            }
        }
    }
}
