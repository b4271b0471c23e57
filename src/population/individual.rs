//! Individual encoding and initialization
//!
//! An individual is one candidate solution: a fixed-size, partition-respecting
//! set of items encoded as two parallel arrays (prices, qualities). Slot `i`
//! of both arrays describes the same item, and the [`Layout`] fixes which
//! contiguous slot range draws from which pool partition.
//!
//! Operators never mutate an individual in place; every transformation
//! returns new buffers.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PoolError;
use crate::pool::{Item, Layout, Pool};

/// Bit-exact key for a `(price, quality)` pair
pub(crate) fn pair_key(price: f64, quality: f64) -> (u64, u64) {
    (price.to_bits(), quality.to_bits())
}

/// One candidate solution as dual parallel numeric arrays
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    prices: Vec<f64>,
    qualities: Vec<f64>,
}

impl Individual {
    /// Create an individual from pre-built parallel buffers
    ///
    /// Panics if the buffers differ in length; callers own the uniqueness
    /// invariant.
    pub fn from_parts(prices: Vec<f64>, qualities: Vec<f64>) -> Self {
        assert_eq!(
            prices.len(),
            qualities.len(),
            "parallel arrays must have equal length"
        );
        Self { prices, qualities }
    }

    /// Build a valid individual by partition-respecting sampling
    ///
    /// For each segment of the layout, samples the required number of
    /// distinct items without replacement from that segment's partition and
    /// concatenates the segments in layout order. Candidates are deduplicated
    /// by `(price, quality)` before sampling, and items already selected for
    /// an earlier segment are excluded, so the resulting individual holds
    /// pairwise-distinct pairs.
    pub fn generate<R: Rng>(pool: &Pool, layout: &Layout, rng: &mut R) -> Result<Self, PoolError> {
        let mut prices = Vec::with_capacity(layout.len());
        let mut qualities = Vec::with_capacity(layout.len());
        let mut used: HashSet<(u64, u64)> = HashSet::with_capacity(layout.len());

        for segment in layout.segments() {
            let candidates = pool.partition(&segment.partition).unwrap_or(&[]);

            // Distinct candidates not yet selected for an earlier segment.
            let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(candidates.len());
            let fresh: Vec<&Item> = candidates
                .iter()
                .filter(|item| {
                    let key = pair_key(item.price, item.quality);
                    !used.contains(&key) && seen.insert(key)
                })
                .collect();

            if fresh.len() < segment.len() {
                return Err(PoolError::Insufficient {
                    partition: segment.partition.clone(),
                    required: segment.len(),
                    available: fresh.len(),
                });
            }

            for item in fresh.choose_multiple(rng, segment.len()) {
                prices.push(item.price);
                qualities.push(item.quality);
                used.insert(pair_key(item.price, item.quality));
            }
        }

        Ok(Self { prices, qualities })
    }

    /// Number of slots N
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Check if the individual holds no slots
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// The price array
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// The quality array
    pub fn qualities(&self) -> &[f64] {
        &self.qualities
    }

    /// The `(price, quality)` pair at a slot
    pub fn pair(&self, slot: usize) -> (f64, f64) {
        (self.prices[slot], self.qualities[slot])
    }

    /// Iterate over all `(price, quality)` pairs in slot order
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.prices
            .iter()
            .copied()
            .zip(self.qualities.iter().copied())
    }

    /// Arithmetic mean of all prices
    pub fn mean_price(&self) -> f64 {
        self.prices.iter().sum::<f64>() / self.prices.len() as f64
    }

    /// Arithmetic mean of all quality scores
    pub fn mean_quality(&self) -> f64 {
        self.qualities.iter().sum::<f64>() / self.qualities.len() as f64
    }

    /// Check the uniqueness invariant: all pairs pairwise distinct
    pub fn is_valid(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.len());
        self.pairs().all(|(p, q)| seen.insert(pair_key(p, q)))
    }

    pub(crate) fn set_slot(&mut self, slot: usize, price: f64, quality: f64) {
        self.prices[slot] = price;
        self.qualities[slot] = quality;
    }
}
