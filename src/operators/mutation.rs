//! Mutation operator
//!
//! Replaces a fraction of each partition segment with fresh pool items, then
//! repairs any duplicate the replacement produced. Quality is the uniqueness
//! key throughout: two slots sharing a quality value are duplicates, equal
//! prices with distinct qualities are not.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::PoolError;
use crate::pool::{Item, Layout, Pool};
use crate::population::Individual;

/// Resampling mutation operator
///
/// Pure: returns a new individual and never touches the input buffers.
#[derive(Clone, Debug)]
pub struct ResampleMutation {
    /// Fraction of each segment to replace, in `[0, 1]`
    pub rate: f64,
}

impl ResampleMutation {
    /// Create a new resampling mutation with the given per-segment rate
    pub fn new(rate: f64) -> Self {
        assert!((0.0..=1.0).contains(&rate), "Rate must be in [0, 1]");
        Self { rate }
    }

    /// Mutate an individual, drawing replacements from the pool
    ///
    /// Per segment, `floor(len * rate)` distinct slots are resampled from the
    /// segment's partition, excluding every quality value already in use.
    /// The exclusion set only grows during the call, so no draw can reuse a
    /// quality the individual held at any point. A repair pass then rescans
    /// the whole individual and resamples every slot involved in a repeated
    /// quality value until none remain.
    pub fn mutate<R: Rng>(
        &self,
        individual: &Individual,
        pool: &Pool,
        layout: &Layout,
        rng: &mut R,
    ) -> Result<Individual, PoolError> {
        debug_assert_eq!(individual.len(), layout.len());

        let mut child = individual.clone();
        let mut used: HashSet<u64> = child.qualities().iter().map(|q| q.to_bits()).collect();

        for segment in layout.segments() {
            let replace_count = (segment.len() as f64 * self.rate) as usize;
            if replace_count == 0 {
                continue;
            }

            let slots: Vec<usize> = segment.range.clone().collect();
            for &slot in slots.choose_multiple(rng, replace_count) {
                let item = draw_replacement(pool, &segment.partition, &used, rng)?;
                used.insert(item.quality.to_bits());
                child.set_slot(slot, item.price, item.quality);
            }
        }

        self.repair(&mut child, pool, layout, &mut used, rng)?;
        Ok(child)
    }

    /// Resample every slot carrying a repeated quality value until clean
    fn repair<R: Rng>(
        &self,
        child: &mut Individual,
        pool: &Pool,
        layout: &Layout,
        used: &mut HashSet<u64>,
        rng: &mut R,
    ) -> Result<(), PoolError> {
        loop {
            let repeated = repeated_quality_slots(child);
            if repeated.is_empty() {
                return Ok(());
            }

            for segment in layout.segments() {
                for slot in segment.range.clone() {
                    if repeated.contains(&slot) {
                        let item = draw_replacement(pool, &segment.partition, used, rng)?;
                        used.insert(item.quality.to_bits());
                        child.set_slot(slot, item.price, item.quality);
                    }
                }
            }
        }
    }
}

/// Slots whose quality value occurs more than once in the individual
fn repeated_quality_slots(individual: &Individual) -> HashSet<usize> {
    let mut by_quality: HashMap<u64, Vec<usize>> = HashMap::new();
    for (slot, quality) in individual.qualities().iter().enumerate() {
        by_quality.entry(quality.to_bits()).or_default().push(slot);
    }
    by_quality
        .into_values()
        .filter(|slots| slots.len() > 1)
        .flatten()
        .collect()
}

/// Draw one item from a partition whose quality is not yet in use
fn draw_replacement<'a, R: Rng>(
    pool: &'a Pool,
    partition: &str,
    used: &HashSet<u64>,
    rng: &mut R,
) -> Result<&'a Item, PoolError> {
    let candidates: Vec<&Item> = pool
        .partition(partition)
        .unwrap_or(&[])
        .iter()
        .filter(|item| !used.contains(&item.quality.to_bits()))
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| PoolError::Exhausted {
            partition: partition.to_string(),
        })
}
