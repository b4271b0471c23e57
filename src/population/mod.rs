//! Population types
//!
//! Individual encoding, initialization, and the population container.

pub mod individual;
pub mod population;

pub use individual::Individual;
pub use population::{Member, Population};
