//! Biome classification and the per-biome terrain constants.

/// Classification of a world column. Drives the height blend and the choice
/// of surface block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    Ocean,
    Beach,
    Plains,
    Forest,
    Hills,
    Mountains,
    SnowyMountains,
    Swamp,
    River,
}

/// Height shaping constants of a biome.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BiomeParams {
    /// Blocks added to the column height
    pub height_offset: f64,
    /// Factor applied to the noise-derived part of the height
    pub height_multiplier: f64,
}

impl Biome {
    /// Picks a biome from normalized height, moisture and temperature.
    ///
    /// Extreme heights decide first (mountains above 0.7, water below 0.2);
    /// everything in between is bucketed by temperature, then moisture.
    pub fn classify(height: f64, moisture: f64, temperature: f64) -> Biome {
        if height > 0.7 {
            return if temperature < 0.3 {
                Biome::SnowyMountains
            } else if temperature < 0.6 {
                Biome::Mountains
            } else {
                Biome::Hills
            };
        }
        if height < 0.2 {
            return if height < 0.1 { Biome::Ocean } else { Biome::Beach };
        }

        if moisture < 0.33 {
            return Biome::Plains;
        }
        if moisture < 0.66 {
            return Biome::Forest;
        }

        if temperature < 0.3 {
            Biome::Swamp
        } else if temperature < 0.6 {
            if height > 0.4 {
                Biome::Hills
            } else {
                Biome::Swamp
            }
        } else if height < 0.4 {
            Biome::Swamp
        } else {
            Biome::Hills
        }
    }

    /// Height and surface parameters of the biome.
    pub fn params(self) -> BiomeParams {
        let (height_offset, height_multiplier) = match self {
            Biome::Mountains => (30.0, 1.4),
            Biome::Plains => (0.0, 1.0),
            Biome::Beach => (-5.0, 0.9),
            Biome::Ocean => (-12.0, 0.9),
            _ => (0.0, 1.0),
        };
        BiomeParams {
            height_offset,
            height_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_win_over_climate() {
        assert_eq!(Biome::classify(0.8, 0.9, 0.1), Biome::SnowyMountains);
        assert_eq!(Biome::classify(0.8, 0.9, 0.5), Biome::Mountains);
        assert_eq!(Biome::classify(0.8, 0.0, 0.9), Biome::Hills);
        assert_eq!(Biome::classify(0.05, 0.5, 0.5), Biome::Ocean);
        assert_eq!(Biome::classify(0.15, 0.5, 0.5), Biome::Beach);
    }

    #[test]
    fn climate_table() {
        assert_eq!(Biome::classify(0.5, 0.1, 0.1), Biome::Plains);
        assert_eq!(Biome::classify(0.5, 0.5, 0.9), Biome::Forest);
        assert_eq!(Biome::classify(0.5, 0.9, 0.1), Biome::Swamp);
        assert_eq!(Biome::classify(0.5, 0.9, 0.5), Biome::Hills);
        assert_eq!(Biome::classify(0.3, 0.9, 0.5), Biome::Swamp);
        assert_eq!(Biome::classify(0.3, 0.9, 0.9), Biome::Swamp);
        assert_eq!(Biome::classify(0.5, 0.9, 0.9), Biome::Hills);
    }

    #[test]
    fn unlisted_biomes_use_neutral_params() {
        let params = Biome::Forest.params();
        assert_eq!(params.height_offset, 0.0);
        assert_eq!(params.height_multiplier, 1.0);
        assert_eq!(Biome::Mountains.params().height_offset, 30.0);
    }
}
