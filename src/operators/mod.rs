//! Evolutionary operators
//!
//! Selection, crossover, and mutation. The operators are independent
//! capability types rather than a shared hierarchy: crossover is a pure
//! deterministic recombination, mutation is a randomized resampling that can
//! fail on a drained pool, and selection picks indices out of a scored
//! population.

pub mod crossover;
pub mod mutation;
pub mod selection;

pub use crossover::{CrossoverTally, UnionCrossover};
pub use mutation::ResampleMutation;
pub use selection::TournamentSelection;
