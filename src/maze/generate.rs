//! Randomized depth-first maze generation
//!
//! Passages are carved from the start cell outwards: each popped cell visits
//! its neighbors in shuffled order and opens a passage into every neighbor
//! that has not been carved yet. With a small probability a passage into an
//! already-carved neighbor is opened as well, which introduces cycles.

use crate::maze::error::GridError;
use crate::maze::grid::Grid;
use crate::maze::types::{Direction, Point};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Default probability of opening a passage that closes a cycle.
pub const DEFAULT_CYCLE_PROBABILITY: f64 = 0.01;

/// Errors from maze generation
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cycle probability must lie in [0, 1), got {0}")]
    CycleProbability(f64),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Configuration for maze generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    /// Probability of opening a passage into an already-carved cell
    pub cycle_probability: f64,
    /// Seed for the random number generator (None = random seed)
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            cycle_probability: DEFAULT_CYCLE_PROBABILITY,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_cycle_probability(mut self, probability: f64) -> Self {
        self.cycle_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Generate a maze. Start is the center cell, end a randomly chosen corner.
pub fn generate(config: &GeneratorConfig) -> Result<Grid, GenerateError> {
    if !(0.0..1.0).contains(&config.cycle_probability) {
        return Err(GenerateError::CycleProbability(config.cycle_probability));
    }

    let mut rng: ChaCha8Rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    let width = config.width;
    let height = config.height;
    let start = Point::new((width / 2) as i32, (height / 2) as i32);
    let corner = rng.random_range(0..4);
    let end = Point::new(
        if corner / 2 == 0 { 0 } else { width as i32 - 1 },
        if corner % 2 == 0 { 0 } else { height as i32 - 1 },
    );

    let mut grid = Grid::new(width, height, start, end)?;
    carve(&mut grid, &mut rng, config.cycle_probability)?;

    tracing::debug!(
        width,
        height,
        start = %start,
        end = %end,
        seed = ?config.seed,
        "generated maze"
    );
    Ok(grid)
}

fn carve<R: Rng>(grid: &mut Grid, rng: &mut R, cycle_probability: f64) -> Result<(), GridError> {
    let mut pending = vec![grid.start()];
    let mut dirs = Direction::ALL;

    while let Some(current) = pending.pop() {
        dirs.shuffle(rng);
        for dir in dirs {
            let neighbor = current.neighbor(dir);
            if !grid.contains(neighbor) || grid.is_open(current, dir) {
                continue;
            }
            let uncarved = grid.passages_at(neighbor) == 0;
            if uncarved || rng.random_bool(cycle_probability) {
                grid.open_passage(current, dir)?;
                pending.push(neighbor);
            }
        }
    }
    Ok(())
}
