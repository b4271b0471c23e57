//! Evolution driver
//!
//! Runs the generational loop for one constraint record: tournament
//! selection, union crossover, resampling mutation, evaluation, and an
//! elitist merge into the next generation. Generations are strictly
//! sequential; a generation only starts after the previous one is fully
//! evaluated.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::DeviationFitness;
use crate::operators::{CrossoverTally, ResampleMutation, TournamentSelection, UnionCrossover};
use crate::pool::{ConstraintRecord, Layout, Pool};
use crate::population::{Member, Population};

/// Configuration for the evolution driver
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Population size M
    pub population_size: usize,
    /// Number of generations G
    pub generations: usize,
    /// Per-segment mutation rate
    pub mutation_rate: f64,
    /// Tournament size for parent selection
    pub tournament_size: usize,
    /// Crossover diversity guard factor
    pub diversity_factor: f64,
    /// Whether to evaluate members across threads
    pub parallel_evaluation: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            generations: 400,
            mutation_rate: 0.2,
            tournament_size: 2,
            diversity_factor: crate::operators::crossover::DIVERSITY_FACTOR,
            parallel_evaluation: true,
        }
    }
}

/// Statistics returned from a completed run
///
/// Returned by value so concurrent runs never share counters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Generations completed
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Crossover segment hit/miss tally across the whole run
    pub crossover: CrossoverTally,
    /// Best fitness after initialization and after each generation
    pub best_fitness_history: Vec<f64>,
}

/// Final population plus run statistics
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// The fully evaluated final population
    pub population: Population,
    /// Statistics for the run
    pub stats: RunStats,
}

/// Evolution driver for one constraint record at a time
#[derive(Clone, Debug)]
pub struct Optimizer {
    config: OptimizerConfig,
    selection: TournamentSelection,
    crossover: UnionCrossover,
    mutation: ResampleMutation,
}

impl Optimizer {
    /// Create a driver, validating the configuration
    pub fn new(config: OptimizerConfig) -> EvoResult<Self> {
        if config.population_size < 2 {
            return Err(EvolutionError::Configuration(
                "population size must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&config.mutation_rate) {
            return Err(EvolutionError::Configuration(
                "mutation rate must be in [0, 1]".to_string(),
            ));
        }
        if config.tournament_size < 1 {
            return Err(EvolutionError::Configuration(
                "tournament size must be at least 1".to_string(),
            ));
        }
        if config.diversity_factor < 1.0 {
            return Err(EvolutionError::Configuration(
                "diversity factor must be at least 1.0".to_string(),
            ));
        }

        let selection = TournamentSelection::new(config.tournament_size);
        let crossover = UnionCrossover::with_factor(config.diversity_factor);
        let mutation = ResampleMutation::new(config.mutation_rate);
        Ok(Self {
            config,
            selection,
            crossover,
            mutation,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run the full evolution for one record
    ///
    /// The caller owns the RNG, so runs are seedable and independent; a
    /// distinct RNG stream per record keeps parallel record workers free of
    /// shared state.
    pub fn run<R: Rng>(
        &self,
        pool: &Pool,
        record: &ConstraintRecord,
        rng: &mut R,
    ) -> EvoResult<RunOutcome> {
        let layout = Layout::from_record(record);
        if layout.is_empty() {
            return Err(EvolutionError::Configuration(
                "constraint record requires zero slots".to_string(),
            ));
        }

        let fitness = DeviationFitness::from_record(record);
        let size = self.config.population_size;
        let mut stats = RunStats::default();

        // INIT: build and score the starting population.
        let mut population = Population::init(pool, &layout, size, rng)?;
        self.evaluate(&mut population, &fitness);
        stats.evaluations += size;
        stats
            .best_fitness_history
            .push(self.best_fitness(&population)?);

        // EVOLVING: each generation is a synchronous barrier.
        for generation in 1..=self.config.generations {
            let mut offspring = Population::with_capacity(size);

            for _ in 0..size / 2 {
                let first = self.selection.select(population.members(), rng);
                let second = self.selection.select(population.members(), rng);

                let (child_a, child_b, tally) = self.crossover.cross(
                    &population.members()[first].individual,
                    &population.members()[second].individual,
                    &layout,
                );
                stats.crossover.merge(tally);

                let child_a = self.mutation.mutate(&child_a, pool, &layout, rng)?;
                let child_b = self.mutation.mutate(&child_b, pool, &layout, rng)?;
                offspring.push(Member::new(child_a));
                offspring.push(Member::new(child_b));
            }

            self.evaluate(&mut offspring, &fitness);
            stats.evaluations += offspring.len();

            // Elitist merge: the next generation is the top M of parents
            // and children together, so the best individual always survives.
            for member in offspring.into_members() {
                population.push(member);
            }
            population.truncate_to_best(size);
            population.set_generation(generation);

            let best = self.best_fitness(&population)?;
            stats.best_fitness_history.push(best);
            debug!(generation, best_fitness = best, "generation complete");
        }

        stats.generations = self.config.generations;
        Ok(RunOutcome { population, stats })
    }

    fn evaluate(&self, population: &mut Population, fitness: &DeviationFitness) {
        if self.config.parallel_evaluation {
            population.evaluate_parallel(fitness);
        } else {
            population.evaluate(fitness);
        }
    }

    fn best_fitness(&self, population: &Population) -> EvoResult<f64> {
        population
            .best()
            .map(Member::fitness_or_worst)
            .ok_or(EvolutionError::EmptyPopulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolError;
    use crate::pool::{Item, PartitionCount};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_pool() -> Pool {
        let mut pool = Pool::new();
        pool.insert(
            "base",
            (0..20)
                .map(|i| Item::new(format!("b{i}"), 1.0 + i as f64, 0.01 + 0.01 * i as f64))
                .collect(),
        );
        pool.insert(
            "modifier",
            (0..20)
                .map(|i| Item::new(format!("m{i}"), 5.0 + i as f64, 0.3 + 0.01 * i as f64))
                .collect(),
        );
        pool
    }

    fn test_record() -> ConstraintRecord {
        ConstraintRecord {
            partition_counts: vec![
                PartitionCount {
                    partition: "base".to_string(),
                    count: 5,
                },
                PartitionCount {
                    partition: "modifier".to_string(),
                    count: 5,
                },
            ],
            target_price: 8.0,
            target_quality: 0.25,
        }
    }

    fn small_config() -> OptimizerConfig {
        OptimizerConfig {
            population_size: 30,
            generations: 15,
            parallel_evaluation: false,
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn test_config_validation() {
        let bad = OptimizerConfig {
            population_size: 1,
            ..OptimizerConfig::default()
        };
        assert!(matches!(
            Optimizer::new(bad),
            Err(EvolutionError::Configuration(_))
        ));

        let bad = OptimizerConfig {
            mutation_rate: 1.5,
            ..OptimizerConfig::default()
        };
        assert!(Optimizer::new(bad).is_err());

        let bad = OptimizerConfig {
            diversity_factor: 0.5,
            ..OptimizerConfig::default()
        };
        assert!(Optimizer::new(bad).is_err());
    }

    #[test]
    fn test_run_maintains_population_invariants() {
        let optimizer = Optimizer::new(small_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(99);

        let outcome = optimizer.run(&test_pool(), &test_record(), &mut rng).unwrap();

        assert_eq!(outcome.population.len(), 30);
        assert_eq!(outcome.population.generation(), 15);
        for member in outcome.population.iter() {
            assert!(member.is_evaluated());
            assert_eq!(member.individual.len(), 10);
            assert!(member.individual.is_valid());
        }
    }

    #[test]
    fn test_best_fitness_never_decreases() {
        let optimizer = Optimizer::new(small_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = optimizer.run(&test_pool(), &test_record(), &mut rng).unwrap();

        let history = &outcome.stats.best_fitness_history;
        assert_eq!(history.len(), 16); // init + 15 generations
        for pair in history.windows(2) {
            assert!(pair[1] >= pair[0], "elitism lost the best individual");
        }
    }

    #[test]
    fn test_stats_account_for_every_segment_crossing() {
        let config = small_config();
        let optimizer = Optimizer::new(config.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(13);

        let outcome = optimizer.run(&test_pool(), &test_record(), &mut rng).unwrap();

        let pairs_per_generation = config.population_size / 2;
        let segments = 2;
        assert_eq!(
            outcome.stats.crossover.hits + outcome.stats.crossover.misses,
            config.generations * pairs_per_generation * segments
        );
        assert_eq!(
            outcome.stats.evaluations,
            config.population_size + config.generations * pairs_per_generation * 2
        );
    }

    #[test]
    fn test_run_is_deterministic_under_a_fixed_seed() {
        let optimizer = Optimizer::new(small_config()).unwrap();

        let mut rng_a = StdRng::seed_from_u64(12345);
        let mut rng_b = StdRng::seed_from_u64(12345);
        let a = optimizer.run(&test_pool(), &test_record(), &mut rng_a).unwrap();
        let b = optimizer.run(&test_pool(), &test_record(), &mut rng_b).unwrap();

        assert_eq!(a.stats.best_fitness_history, b.stats.best_fitness_history);
        assert_eq!(
            a.population.best().unwrap().fitness,
            b.population.best().unwrap().fitness
        );
    }

    #[test]
    fn test_undersized_pool_aborts_the_record() {
        let optimizer = Optimizer::new(small_config()).unwrap();
        let mut record = test_record();
        record.partition_counts[0].count = 50;
        let mut rng = StdRng::seed_from_u64(3);

        let err = optimizer.run(&test_pool(), &record, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            EvolutionError::Pool(PoolError::Insufficient { .. })
        ));
    }

    #[test]
    fn test_zero_slot_record_is_a_configuration_error() {
        let optimizer = Optimizer::new(small_config()).unwrap();
        let record = ConstraintRecord {
            partition_counts: vec![],
            target_price: 1.0,
            target_quality: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(3);

        assert!(matches!(
            optimizer.run(&test_pool(), &record, &mut rng),
            Err(EvolutionError::Configuration(_))
        ));
    }
}
