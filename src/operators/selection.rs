//! Selection operator
//!
//! Tournament selection over the current generation's members.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::population::Member;

/// Tournament selection operator
///
/// Selects the fittest individual from a random subset of the population.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Number of members competing per tournament
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }

    /// Select a single member, returning its index
    pub fn select<R: Rng>(&self, members: &[Member], rng: &mut R) -> usize {
        assert!(!members.is_empty(), "Population cannot be empty");

        let tournament_size = self.tournament_size.min(members.len());
        let indices: Vec<usize> = (0..members.len()).collect();

        indices
            .choose_multiple(rng, tournament_size)
            .copied()
            .max_by(|&a, &b| {
                members[a]
                    .fitness_or_worst()
                    .partial_cmp(&members[b].fitness_or_worst())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap()
    }
}
