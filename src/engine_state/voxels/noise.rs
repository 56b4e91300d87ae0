//! # Noise Library
//!
//! Deterministic gradient-noise primitives used by terrain generation. Every
//! sample is a pure function of the world seed and the coordinates passed in,
//! so two generators built from the same seed agree everywhere.
//!
//! Raw samples are clamped to `[-1, 1]`. Multi-octave sums are normalized by
//! the total amplitude, so they stay in the same range.

use noise::{NoiseFn, Perlin};

/// Seeded Perlin noise with the octave helpers terrain generation needs.
#[derive(Clone, Debug)]
pub struct NoiseLibrary {
    perlin: Perlin,
    seed: u32,
}

impl NoiseLibrary {
    /// Creates a noise library for `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// The seed this library was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Single-octave 2D sample.
    #[inline]
    pub fn noise2(&self, x: f64, z: f64) -> f64 {
        self.perlin.get([x, z]).clamp(-1.0, 1.0)
    }

    /// Single-octave 3D sample.
    #[inline]
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.perlin.get([x, y, z]).clamp(-1.0, 1.0)
    }

    /// Fractal 2D noise.
    ///
    /// Each octave doubles the frequency and multiplies the amplitude by
    /// `persistence`. Coordinates are multiplied by `scale` at every octave.
    ///
    /// # Arguments
    /// * `x`, `z` - Sample position
    /// * `octaves` - Number of layers summed; 0 yields 0
    /// * `persistence` - Amplitude falloff per octave
    /// * `scale` - Base frequency
    pub fn octave2(&self, x: f64, z: f64, octaves: u32, persistence: f64, scale: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.noise2(x * frequency * scale, z * frequency * scale) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            0.0
        } else {
            total / max_value
        }
    }

    /// Fractal 3D noise; the first octave samples at frequency `scale`.
    pub fn octave3(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        scale: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut frequency = scale;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.noise3(x * frequency, y * frequency, z * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            0.0
        } else {
            total / max_value
        }
    }

    /// Ridged noise: `1 - |noise|`, peaking along the zero lines of the
    /// underlying field. Lies in `[0, 1]`.
    #[inline]
    pub fn ridged2(&self, x: f64, z: f64, scale: f64) -> f64 {
        1.0 - self.noise2(x * scale, z * scale).abs()
    }

    /// A 2D sample remapped from `[-1, 1]` into `[0, 1]`.
    #[inline]
    pub fn normalized01(&self, x: f64, z: f64) -> f64 {
        ((self.noise2(x, z) + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_samples() {
        let a = NoiseLibrary::new(42);
        let b = NoiseLibrary::new(42);
        for i in 0..64 {
            let x = i as f64 * 0.37 - 11.0;
            let z = i as f64 * 1.13 + 3.0;
            assert_eq!(a.noise2(x, z), b.noise2(x, z));
            assert_eq!(a.octave3(x, z, x, 2, 0.5, 0.03), b.octave3(x, z, x, 2, 0.5, 0.03));
        }
    }

    #[test]
    fn octave_sums_stay_normalized() {
        let noise = NoiseLibrary::new(7);
        for i in 0..200 {
            let x = i as f64 * 13.7;
            let z = i as f64 * -5.3;
            let value = noise.octave2(x, z, 4, 0.6, 0.0002);
            assert!((-1.0..=1.0).contains(&value));
            let ridged = noise.ridged2(x, z, 0.002);
            assert!((0.0..=1.0).contains(&ridged));
            let unit = noise.normalized01(x * 0.1, z * 0.1);
            assert!((0.0..=1.0).contains(&unit));
        }
    }

    #[test]
    fn zero_octaves_is_flat() {
        let noise = NoiseLibrary::new(1);
        assert_eq!(noise.octave2(10.5, 3.25, 0, 0.5, 1.0), 0.0);
    }
}
