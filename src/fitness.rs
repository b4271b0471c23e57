//! Deviation-based fitness evaluation
//!
//! An individual is scored against the record's target mean price and target
//! mean quality. Each constraint contributes a flat bonus when satisfied and
//! a weighted penalty proportional to the overshoot when violated. The
//! quality weight is an order of magnitude above the price weight: a quality
//! violation ruins the downstream trade, an overpriced set merely earns less.

use serde::{Deserialize, Serialize};

use crate::pool::ConstraintRecord;
use crate::population::Individual;

/// Bonus for a satisfied price constraint
pub const PRICE_BONUS: f64 = 20.0;
/// Bonus for a satisfied quality constraint
pub const QUALITY_BONUS: f64 = 50.0;
/// Penalty weight per unit of positive price deviation
pub const PRICE_PENALTY_WEIGHT: f64 = 100.0;
/// Penalty weight per unit of positive quality deviation
pub const QUALITY_PENALTY_WEIGHT: f64 = 1000.0;

/// Fitness evaluator for one constraint record (maximize)
///
/// Pure value type: evaluating the same individual twice always yields the
/// identical fitness.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviationFitness {
    /// Target mean price
    pub target_price: f64,
    /// Target mean quality score
    pub target_quality: f64,
}

impl DeviationFitness {
    /// Create an evaluator from explicit targets
    pub fn new(target_price: f64, target_quality: f64) -> Self {
        Self {
            target_price,
            target_quality,
        }
    }

    /// Create an evaluator from a constraint record's targets
    pub fn from_record(record: &ConstraintRecord) -> Self {
        Self::new(record.target_price, record.target_quality)
    }

    /// Signed deviations `(mean_price - target_price, mean_quality - target_quality)`
    ///
    /// Non-positive deviations mean the constraint is satisfied.
    pub fn deviations(&self, individual: &Individual) -> (f64, f64) {
        (
            individual.mean_price() - self.target_price,
            individual.mean_quality() - self.target_quality,
        )
    }

    /// Score an individual; higher is better
    pub fn evaluate(&self, individual: &Individual) -> f64 {
        let (price_deviation, quality_deviation) = self.deviations(individual);

        let mut fitness = 0.0;
        if price_deviation <= 0.0 {
            fitness += PRICE_BONUS;
        } else {
            fitness -= price_deviation * PRICE_PENALTY_WEIGHT;
        }
        if quality_deviation <= 0.0 {
            fitness += QUALITY_BONUS;
        } else {
            fitness -= quality_deviation * QUALITY_PENALTY_WEIGHT;
        }
        fitness
    }

    /// Check if an individual satisfies both constraints
    pub fn is_feasible(&self, individual: &Individual) -> bool {
        let (price_deviation, quality_deviation) = self.deviations(individual);
        price_deviation <= 0.0 && quality_deviation <= 0.0
    }
}
