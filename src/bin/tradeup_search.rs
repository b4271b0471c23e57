//! Batch search driver
//!
//! Processes an index range of constraint records from a JSON input file and
//! appends one report block per feasible (or best-effort) individual to a
//! range-named output file. Splitting the full record list into ranges for
//! parallel worker processes is the caller's concern; each record gets its
//! own RNG stream derived from the base seed and the record's absolute
//! index, so workers over disjoint ranges stay reproducible and independent.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tradeup_evo::prelude::*;

/// Search an index range of trade-up records for constraint-satisfying item sets
#[derive(Debug, Parser)]
#[command(name = "tradeup-search", version, about)]
struct Args {
    /// JSON file mapping record keys to constraints and per-partition items
    input: PathBuf,

    /// First record index to process (inclusive)
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Last record index to process (exclusive); defaults to all records
    #[arg(long)]
    end: Option<usize>,

    /// Output file; defaults to best_individuals_<start>_to_<end>.txt
    #[arg(long)]
    output: Option<PathBuf>,

    /// Base RNG seed; each record derives its stream from seed + index
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Population size per run
    #[arg(long, default_value_t = 200)]
    population_size: usize,

    /// Generations per run
    #[arg(long, default_value_t = 400)]
    generations: usize,

    /// Per-segment mutation rate
    #[arg(long, default_value_t = 0.2)]
    mutation_rate: f64,

    /// Evaluate fitness on a single thread
    #[arg(long)]
    sequential: bool,
}

/// One record's worth of input: the constraints plus its candidate pool
#[derive(Debug, Deserialize)]
struct RecordSpec {
    constraints: ConstraintRecord,
    pool: Pool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let records: BTreeMap<String, RecordSpec> =
        serde_json::from_str(&text).context("parsing record file")?;

    let end = args.end.unwrap_or(records.len()).min(records.len());
    let start = args.start.min(end);

    let output_path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("best_individuals_{start}_to_{end}.txt"))
    });
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output_path)
        .with_context(|| format!("opening {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let optimizer = Optimizer::new(OptimizerConfig {
        population_size: args.population_size,
        generations: args.generations,
        mutation_rate: args.mutation_rate,
        parallel_evaluation: !args.sequential,
        ..OptimizerConfig::default()
    })?;

    info!(
        records = end - start,
        output = %output_path.display(),
        "processing records {start}..{end}"
    );

    let mut tally = CrossoverTally::default();
    let mut reported = 0usize;
    let mut skipped = 0usize;

    for (index, (key, spec)) in records.iter().enumerate().skip(start).take(end - start) {
        let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(index as u64));

        let outcome = match optimizer.run(&spec.pool, &spec.constraints, &mut rng) {
            Ok(outcome) => outcome,
            Err(err) => {
                // Fatal for this record only; the rest of the batch continues.
                error!(record = %key, %err, "skipping record");
                skipped += 1;
                continue;
            }
        };
        tally.merge(outcome.stats.crossover);

        let fitness = DeviationFitness::from_record(&spec.constraints);
        let report = RunReport::extract(key.clone(), &outcome.population, &fitness);
        report
            .write_blocks(&mut writer)
            .with_context(|| format!("writing report for {key}"))?;
        reported += report.entries.len();

        if report.feasible {
            info!(record = %key, found = report.entries.len(), "feasible individuals found");
        } else {
            info!(record = %key, "no feasible individual, reported best effort");
        }
    }
    writer.flush().context("flushing report file")?;

    info!(
        reported,
        skipped,
        crossover_hits = tally.hits,
        crossover_misses = tally.misses,
        success_rate = tally.success_rate().map(|r| r * 100.0).unwrap_or(0.0),
        "batch complete"
    );
    Ok(())
}
