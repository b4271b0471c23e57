//! Error types for tradeup-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for item-pool failures
///
/// Both variants are fatal for the run that hits them: an undersized
/// partition can never produce a valid individual, and a drained partition
/// leaves the duplicate-repair pass with no legal replacement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A partition has fewer distinct candidates than its required count
    #[error("partition {partition:?} has {available} candidates, {required} required")]
    Insufficient {
        partition: String,
        required: usize,
        available: usize,
    },

    /// A partition ran out of replacement candidates during duplicate repair
    #[error("partition {partition:?} exhausted while repairing duplicates")]
    Exhausted { partition: String },
}

/// Top-level error type for optimization runs
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Pool error
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("empty population")]
    EmptyPopulation,
}

/// Result type alias for optimization operations
pub type EvoResult<T> = Result<T, EvolutionError>;
