use crate::{CellGrid, GridDims, LifeError, ALIVE, DEAD};
use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Probability used when none is configured.
pub const DEFAULT_PROBABILITY: f64 = 0.4;

/// Parameters for the randomized initial state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeedConfig {
    /// Chance that each cell starts alive, independently of the others.
    pub probability: f64,
    /// Fixed RNG seed for reproducible runs. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<(), LifeError> {
        if (0.0..=1.0).contains(&self.probability) {
            Ok(())
        } else {
            Err(LifeError::InvalidProbability(self.probability))
        }
    }
}

/// Generates a random grid where each cell is alive with `config.probability`.
pub fn seed_random(dims: GridDims, config: &SeedConfig) -> Result<CellGrid, LifeError> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let data = (0..dims.cell_count())
        .map(|_| {
            if rng.gen_bool(config.probability) {
                ALIVE
            } else {
                DEAD
            }
        })
        .collect();
    let grid = CellGrid::from_vec(dims, data)?;
    log::debug!(
        "Seeded {}x{} grid with {} live cells (p = {})",
        dims.width(),
        dims.height(),
        grid.population(),
        config.probability
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_grid() {
        let dims = GridDims::new(16, 9).unwrap();
        let config = SeedConfig {
            probability: 0.4,
            seed: Some(7),
        };
        assert_eq!(
            seed_random(dims, &config).unwrap(),
            seed_random(dims, &config).unwrap()
        );
    }

    #[test]
    fn extreme_probabilities() {
        let dims = GridDims::new(8, 8).unwrap();
        let none = SeedConfig {
            probability: 0.0,
            seed: Some(1),
        };
        let all = SeedConfig {
            probability: 1.0,
            seed: Some(1),
        };
        assert_eq!(seed_random(dims, &none).unwrap().population(), 0);
        assert_eq!(seed_random(dims, &all).unwrap().population(), 64);
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let dims = GridDims::new(2, 2).unwrap();
        let config = SeedConfig {
            probability: 1.5,
            seed: None,
        };
        assert_eq!(
            seed_random(dims, &config),
            Err(LifeError::InvalidProbability(1.5))
        );
    }
}
