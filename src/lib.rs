//! # tradeup-evo
//!
//! Constrained genetic search for priced, quality-scored item sets.
//!
//! Given a pool of candidate items partitioned into named buckets and a
//! constraint record (per-partition slot counts plus target mean price and
//! target mean quality), the optimizer evolves fixed-size item sets that
//! satisfy both targets while every operator preserves three invariants:
//! fixed slot count, fixed per-partition slot allocation, and pool-wide
//! uniqueness of the selected items.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradeup_evo::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let optimizer = Optimizer::new(OptimizerConfig::default())?;
//! let outcome = optimizer.run(&pool, &record, &mut rng)?;
//!
//! let fitness = DeviationFitness::from_record(&record);
//! let report = RunReport::extract("my-record", &outcome.population, &fitness);
//! print!("{report}");
//! ```
//!
//! Market-data acquisition, pool ETL, and profitability simulation are
//! external collaborators; this crate only consumes their output through
//! [`pool::Pool`] and [`pool::ConstraintRecord`].

pub mod error;
pub mod fitness;
pub mod operators;
pub mod optimizer;
pub mod pool;
pub mod population;
pub mod report;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{EvoResult, EvolutionError, PoolError};
    pub use crate::fitness::DeviationFitness;
    pub use crate::operators::{
        CrossoverTally, ResampleMutation, TournamentSelection, UnionCrossover,
    };
    pub use crate::optimizer::{Optimizer, OptimizerConfig, RunOutcome, RunStats};
    pub use crate::pool::{ConstraintRecord, Item, Layout, PartitionCount, Pool, Segment};
    pub use crate::population::{Individual, Member, Population};
    pub use crate::report::{ReportEntry, RunReport};
}
