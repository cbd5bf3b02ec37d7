//! RNG module - seeded, weighted tile generation
//!
//! Every tile the engine creates comes from a [`TileSpawner`]: a seeded LCG plus
//! an optional per-category weight table supplied by the habitat lookup.
//! With no table the draw is uniform over the eight categories.
//!
//! The LCG keeps whole games reproducible from a single `u32` seed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{TileCategory, CATEGORY_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than the low ones.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Generate a float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u32() >> 8) as f64 / (1u32 << 24) as f64
    }

    /// Current internal state (reseeding from it continues the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Rejected weight table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("weight for {category} must be finite and non-negative, got {value}")]
    InvalidWeight { category: &'static str, value: f64 },

    #[error("at least one category needs a positive weight")]
    AllZero,
}

/// Relative draw weights for the eight tile categories
///
/// Categories missing from the source map get weight 0. A table always has at
/// least one positive weight, so a draw with no exclusions never fails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "HashMap<TileCategory, f64>",
    into = "HashMap<TileCategory, f64>"
)]
pub struct CategoryWeights {
    weights: [f64; CATEGORY_COUNT],
}

impl CategoryWeights {
    /// Equal weight for every category
    pub fn uniform() -> Self {
        Self {
            weights: [1.0; CATEGORY_COUNT],
        }
    }

    /// Build a table from `(category, weight)` pairs; later pairs win
    pub fn from_pairs<I>(pairs: I) -> Result<Self, WeightsError>
    where
        I: IntoIterator<Item = (TileCategory, f64)>,
    {
        let mut weights = [0.0; CATEGORY_COUNT];
        for (category, value) in pairs {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight {
                    category: category.as_str(),
                    value,
                });
            }
            weights[category.index()] = value;
        }
        if weights.iter().all(|w| *w == 0.0) {
            return Err(WeightsError::AllZero);
        }
        Ok(Self { weights })
    }

    /// Weight of one category
    pub fn get(&self, category: TileCategory) -> f64 {
        self.weights[category.index()]
    }

    /// Sum of the weights of every category not in `excluding`
    pub fn total_excluding(&self, excluding: &[TileCategory]) -> f64 {
        TileCategory::ALL
            .iter()
            .filter(|c| !excluding.contains(c))
            .map(|c| self.get(*c))
            .sum()
    }

    /// Number of categories that can actually be drawn
    pub fn positive_count(&self) -> usize {
        self.weights.iter().filter(|w| **w > 0.0).count()
    }

    /// Weighted draw skipping `excluding`.
    ///
    /// Returns `None` when every remaining category has zero weight.
    pub fn pick(&self, rng: &mut SimpleRng, excluding: &[TileCategory]) -> Option<TileCategory> {
        let total = self.total_excluding(excluding);
        if total <= 0.0 {
            return None;
        }

        let mut roll = rng.next_f64() * total;
        let mut last = None;
        for category in TileCategory::ALL {
            let weight = self.get(category);
            if weight <= 0.0 || excluding.contains(&category) {
                continue;
            }
            if roll < weight {
                return Some(category);
            }
            roll -= weight;
            last = Some(category);
        }

        // Float rounding can leave `roll` a hair above the last bucket.
        last
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::uniform()
    }
}

impl TryFrom<HashMap<TileCategory, f64>> for CategoryWeights {
    type Error = WeightsError;

    fn try_from(value: HashMap<TileCategory, f64>) -> Result<Self, Self::Error> {
        Self::from_pairs(value)
    }
}

impl From<CategoryWeights> for HashMap<TileCategory, f64> {
    fn from(value: CategoryWeights) -> Self {
        TileCategory::ALL
            .into_iter()
            .filter(|c| value.get(*c) > 0.0)
            .map(|c| (c, value.get(c)))
            .collect()
    }
}

/// Weighted tile category generator
///
/// Weight changes apply to every future draw only; tiles already on the grid
/// are never touched.
#[derive(Debug, Clone)]
pub struct TileSpawner {
    rng: SimpleRng,
    weights: Option<CategoryWeights>,
}

impl TileSpawner {
    /// Create a spawner; `None` weights means uniform
    pub fn new(seed: u32, weights: Option<CategoryWeights>) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            weights,
        }
    }

    /// Replace the weight table used by future draws (`None` reverts to uniform)
    pub fn set_weights(&mut self, weights: Option<CategoryWeights>) {
        self.weights = weights;
    }

    pub fn weights(&self) -> Option<&CategoryWeights> {
        self.weights.as_ref()
    }

    /// Draw any category using the current weights
    pub fn draw(&mut self) -> TileCategory {
        match self.draw_excluding(&[]) {
            Some(category) => category,
            // Unreachable with a validated table; stay total anyway.
            None => TileCategory::ALL[self.rng.next_range(CATEGORY_COUNT as u32) as usize],
        }
    }

    /// Draw a category other than those in `excluding`.
    ///
    /// Returns `None` when no allowed category has positive weight.
    pub fn draw_excluding(&mut self, excluding: &[TileCategory]) -> Option<TileCategory> {
        match self.weights {
            Some(ref weights) => weights.pick(&mut self.rng, excluding),
            None => {
                let allowed = CATEGORY_COUNT - excluding.len().min(CATEGORY_COUNT);
                if allowed == 0 {
                    return None;
                }
                let mut nth = self.rng.next_range(allowed as u32) as usize;
                for category in TileCategory::ALL {
                    if excluding.contains(&category) {
                        continue;
                    }
                    if nth == 0 {
                        return Some(category);
                    }
                    nth -= 1;
                }
                None
            }
        }
    }

    /// Current RNG state (for restarting with the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for TileSpawner {
    fn default() -> Self {
        Self::new(1, None)
    }
}
