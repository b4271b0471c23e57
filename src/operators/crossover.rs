//! Crossover operator
//!
//! Recombines two parents partition by partition: the union of both parents'
//! items in a segment is split deterministically between the two children.
//! A segment whose union is too small to recombine safely is copied through
//! unchanged and tallied as a miss.

use serde::{Deserialize, Serialize};

use crate::pool::Layout;
use crate::population::individual::pair_key;
use crate::population::Individual;

/// Default diversity guard: a segment union must hold at least
/// `count * 1.25` distinct items before it is split between children
pub const DIVERSITY_FACTOR: f64 = 1.25;

/// Per-segment hit/miss tally for one or more crossover calls
///
/// Returned to the caller instead of being accumulated in process-global
/// counters, so concurrent runs never share state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverTally {
    /// Segments recombined through the union split
    pub hits: usize,
    /// Segments copied through unchanged by the diversity guard
    pub misses: usize,
}

impl CrossoverTally {
    /// Fraction of segment crossings that recombined, if any happened
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }

    /// Fold another tally into this one
    pub fn merge(&mut self, other: CrossoverTally) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

/// Union-split crossover operator
///
/// Never fails and never mutates its parents; diversity misses are reported
/// through the returned tally. The operator itself consumes no randomness:
/// the union is ordered by an explicit sort key (price ascending, quality
/// ascending) rather than by incidental container iteration order.
#[derive(Clone, Debug)]
pub struct UnionCrossover {
    /// Minimum union size as a multiple of the segment's required count
    pub diversity_factor: f64,
}

impl UnionCrossover {
    /// Create a crossover with the default diversity guard
    pub fn new() -> Self {
        Self {
            diversity_factor: DIVERSITY_FACTOR,
        }
    }

    /// Create a crossover with a custom diversity guard factor
    pub fn with_factor(diversity_factor: f64) -> Self {
        assert!(
            diversity_factor >= 1.0,
            "Diversity factor below 1.0 cannot fill both children"
        );
        Self { diversity_factor }
    }

    /// Produce two children from two parents
    ///
    /// Children's segments are either a deterministic split of the parents'
    /// segment union (first `count` items to child A, last `count` to child
    /// B, overlap accepted) or verbatim copies of the respective parent's
    /// segment when the union fails the diversity guard.
    pub fn cross(
        &self,
        parent_a: &Individual,
        parent_b: &Individual,
        layout: &Layout,
    ) -> (Individual, Individual, CrossoverTally) {
        debug_assert_eq!(parent_a.len(), layout.len());
        debug_assert_eq!(parent_b.len(), layout.len());

        let mut prices_a = Vec::with_capacity(layout.len());
        let mut qualities_a = Vec::with_capacity(layout.len());
        let mut prices_b = Vec::with_capacity(layout.len());
        let mut qualities_b = Vec::with_capacity(layout.len());
        let mut tally = CrossoverTally::default();

        for segment in layout.segments() {
            let count = segment.len();
            if count == 0 {
                continue;
            }

            let mut union: Vec<(f64, f64)> = segment
                .range
                .clone()
                .map(|slot| parent_a.pair(slot))
                .chain(segment.range.clone().map(|slot| parent_b.pair(slot)))
                .collect();
            union.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.total_cmp(&y.1)));
            union.dedup_by(|x, y| pair_key(x.0, x.1) == pair_key(y.0, y.1));

            if (union.len() as f64) < count as f64 * self.diversity_factor {
                // Too little diversity between the parents: copy through.
                for slot in segment.range.clone() {
                    let (p, q) = parent_a.pair(slot);
                    prices_a.push(p);
                    qualities_a.push(q);
                    let (p, q) = parent_b.pair(slot);
                    prices_b.push(p);
                    qualities_b.push(q);
                }
                tally.misses += 1;
            } else {
                for &(p, q) in &union[..count] {
                    prices_a.push(p);
                    qualities_a.push(q);
                }
                for &(p, q) in &union[union.len() - count..] {
                    prices_b.push(p);
                    qualities_b.push(q);
                }
                tally.hits += 1;
            }
        }

        (
            Individual::from_parts(prices_a, qualities_a),
            Individual::from_parts(prices_b, qualities_b),
            tally,
        )
    }
}

impl Default for UnionCrossover {
    fn default() -> Self {
        Self::new()
    }
}
