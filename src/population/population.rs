//! Population container
//!
//! Holds one generation's members together with their fitness scalars.
//! Within a generation, members are independent of each other, so evaluation
//! is embarrassingly data-parallel; generations themselves are a strict
//! synchronous barrier enforced by the driver.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::PoolError;
use crate::fitness::DeviationFitness;
use crate::pool::{Layout, Pool};
use crate::population::individual::Individual;

/// An individual together with its fitness, once evaluated
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member {
    /// The candidate solution
    pub individual: Individual,
    /// Fitness value (None until evaluated)
    pub fitness: Option<f64>,
}

impl Member {
    /// Wrap an unevaluated individual
    pub fn new(individual: Individual) -> Self {
        Self {
            individual,
            fitness: None,
        }
    }

    /// Wrap an individual with a known fitness
    pub fn with_fitness(individual: Individual, fitness: f64) -> Self {
        Self {
            individual,
            fitness: Some(fitness),
        }
    }

    /// Check if this member has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness as f64, treating unevaluated members as worst possible
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Check if this member scores strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.fitness_or_worst() > other.fitness_or_worst()
    }
}

/// A population of members plus its generation counter
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Population {
    members: Vec<Member>,
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from existing members
    pub fn from_members(members: Vec<Member>) -> Self {
        Self {
            members,
            generation: 0,
        }
    }

    /// Build an initial population of `size` valid individuals
    pub fn init<R: Rng>(
        pool: &Pool,
        layout: &Layout,
        size: usize,
        rng: &mut R,
    ) -> Result<Self, PoolError> {
        let members = (0..size)
            .map(|_| Individual::generate(pool, layout, rng).map(Member::new))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            members,
            generation: 0,
        })
    }

    /// Current generation number
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Population size
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member
    pub fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Iterate over the members
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// The members as a slice
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Take the members out of this population
    pub fn into_members(self) -> Vec<Member> {
        self.members
    }

    /// The best member by fitness
    pub fn best(&self) -> Option<&Member> {
        self.members.iter().max_by(|a, b| {
            a.fitness_or_worst()
                .partial_cmp(&b.fitness_or_worst())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Sort members by fitness, best first
    pub fn sort_by_fitness(&mut self) {
        self.members.sort_by(|a, b| {
            b.fitness_or_worst()
                .partial_cmp(&a.fitness_or_worst())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    /// Keep only the `size` best members (elitist truncation)
    pub fn truncate_to_best(&mut self, size: usize) {
        self.sort_by_fitness();
        self.members.truncate(size);
    }

    /// Mean fitness over evaluated members
    pub fn mean_fitness(&self) -> Option<f64> {
        let evaluated: Vec<f64> = self.members.iter().filter_map(|m| m.fitness).collect();
        if evaluated.is_empty() {
            None
        } else {
            Some(evaluated.iter().sum::<f64>() / evaluated.len() as f64)
        }
    }

    /// Evaluate all unevaluated members sequentially
    pub fn evaluate(&mut self, fitness: &DeviationFitness) {
        for member in &mut self.members {
            if !member.is_evaluated() {
                member.fitness = Some(fitness.evaluate(&member.individual));
            }
        }
    }

    /// Evaluate all unevaluated members across threads
    ///
    /// No shared mutable state: the fitness function is pure and each member
    /// is scored independently.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(&mut self, fitness: &DeviationFitness) {
        self.members.par_iter_mut().for_each(|member| {
            if !member.is_evaluated() {
                member.fitness = Some(fitness.evaluate(&member.individual));
            }
        });
    }

    /// Fallback when the `parallel` feature is disabled
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_parallel(&mut self, fitness: &DeviationFitness) {
        self.evaluate(fitness);
    }
}
