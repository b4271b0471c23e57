//! Result extraction and report blocks
//!
//! Splits a final population into feasible individuals and, when none
//! exists, falls back to the single best-fitness individual so every record
//! always produces a report. Blocks are append-only and line-oriented; the
//! quality deviation is written under its wire name `float_deviation`.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::fitness::DeviationFitness;
use crate::population::{Individual, Population};

/// One reported individual with its achieved deviations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The reported individual
    pub individual: Individual,
    /// Fitness at extraction time
    pub fitness: f64,
    /// Achieved mean price minus target price
    pub price_deviation: f64,
    /// Achieved mean quality minus target quality
    pub quality_deviation: f64,
}

impl ReportEntry {
    fn from_individual(individual: &Individual, fitness: &DeviationFitness) -> Self {
        let (price_deviation, quality_deviation) = fitness.deviations(individual);
        Self {
            individual: individual.clone(),
            fitness: fitness.evaluate(individual),
            price_deviation,
            quality_deviation,
        }
    }

    /// Check if this entry satisfies both constraints
    pub fn is_feasible(&self) -> bool {
        self.price_deviation <= 0.0 && self.quality_deviation <= 0.0
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<f64> = self
            .individual
            .prices()
            .iter()
            .chain(self.individual.qualities().iter())
            .copied()
            .collect();
        writeln!(f, "Best Individual: {values:?}")?;
        writeln!(f, "price_deviation: {:.4}", self.price_deviation)?;
        writeln!(f, "float_deviation: {:.4}", self.quality_deviation)?;
        write!(f, "------")
    }
}

/// The reported outcome of one record's run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Record key the run was driven by
    pub key: String,
    /// Whether the entries are feasible or a best-effort compromise
    pub feasible: bool,
    /// Reported individuals (all feasible ones, or the single best)
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    /// Partition a final population into a report
    ///
    /// All feasible members are reported; with none, the best-fitness member
    /// is reported as a compromise with its positive deviations visible. A
    /// degenerate outcome is a defined fallback, not an error.
    pub fn extract(key: impl Into<String>, population: &Population, fitness: &DeviationFitness) -> Self {
        let feasible_entries: Vec<ReportEntry> = population
            .iter()
            .filter(|member| fitness.is_feasible(&member.individual))
            .map(|member| ReportEntry::from_individual(&member.individual, fitness))
            .collect();

        if !feasible_entries.is_empty() {
            return Self {
                key: key.into(),
                feasible: true,
                entries: feasible_entries,
            };
        }

        let entries = population
            .best()
            .map(|member| vec![ReportEntry::from_individual(&member.individual, fitness)])
            .unwrap_or_default();
        Self {
            key: key.into(),
            feasible: false,
            entries,
        }
    }

    /// Append one block per entry to a writer
    pub fn write_blocks<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(writer, "Best Tradeup: {}", self.key)?;
            writeln!(writer, "{entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "Best Tradeup: {}", self.key)?;
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::Member;

    fn member(prices: &[f64], qualities: &[f64], fitness: f64) -> Member {
        Member::with_fitness(
            Individual::from_parts(prices.to_vec(), qualities.to_vec()),
            fitness,
        )
    }

    #[test]
    fn test_extract_reports_every_feasible_member() {
        let fitness = DeviationFitness::new(10.0, 0.5);
        let population = Population::from_members(vec![
            member(&[5.0, 5.0], &[0.1, 0.2], 70.0),  // feasible
            member(&[20.0, 20.0], &[0.1, 0.2], -900.0), // price violation
            member(&[5.0, 7.0], &[0.3, 0.4], 70.0),  // feasible
        ]);

        let report = RunReport::extract("record-1", &population, &fitness);
        assert!(report.feasible);
        assert_eq!(report.entries.len(), 2);
        assert!(report.entries.iter().all(ReportEntry::is_feasible));
    }

    #[test]
    fn test_extract_falls_back_to_best_effort() {
        let fitness = DeviationFitness::new(10.0, 0.5);
        let population = Population::from_members(vec![
            member(&[20.0, 20.0], &[0.6, 0.6], -1080.0),
            member(&[12.0, 12.0], &[0.6, 0.6], -300.0),
        ]);

        let report = RunReport::extract("record-2", &population, &fitness);
        assert!(!report.feasible);
        assert_eq!(report.entries.len(), 1);

        let entry = &report.entries[0];
        assert!(entry.price_deviation > 0.0);
        assert!(entry.quality_deviation > 0.0);
        assert_eq!(entry.individual.prices(), &[12.0, 12.0]);
    }

    #[test]
    fn test_block_format() {
        let fitness = DeviationFitness::new(10.0, 0.5);
        let population =
            Population::from_members(vec![member(&[5.0, 6.0], &[0.1, 0.2], 70.0)]);

        let report = RunReport::extract("AK-47 | Case Hardened", &population, &fitness);
        let mut buffer = Vec::new();
        report.write_blocks(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "Best Tradeup: AK-47 | Case Hardened\n\
             Best Individual: [5.0, 6.0, 0.1, 0.2]\n\
             price_deviation: -4.5000\n\
             float_deviation: -0.3500\n\
             ------\n"
        );
    }

    #[test]
    fn test_blocks_append_per_entry() {
        let fitness = DeviationFitness::new(10.0, 0.5);
        let population = Population::from_members(vec![
            member(&[5.0, 5.0], &[0.1, 0.2], 70.0),
            member(&[6.0, 6.0], &[0.2, 0.3], 70.0),
        ]);

        let report = RunReport::extract("r", &population, &fitness);
        let text = report.to_string();
        assert_eq!(text.matches("Best Tradeup: r\n").count(), 2);
        assert_eq!(text.matches("------\n").count(), 2);
    }

    #[test]
    fn test_display_matches_writer() {
        let fitness = DeviationFitness::new(10.0, 0.5);
        let population =
            Population::from_members(vec![member(&[5.0, 6.0], &[0.1, 0.2], 70.0)]);
        let report = RunReport::extract("r", &population, &fitness);

        let mut buffer = Vec::new();
        report.write_blocks(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), report.to_string());
    }
}
