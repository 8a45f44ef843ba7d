//! Selection and reproduction.
//!
//! Elitism keeps the runner-up verbatim and refreshes the top slot with a
//! crossover of the two best. Every other slot is recombined with a
//! roulette-selected mate, then the whole generation goes through mutation.

use crate::config::{Config, GeneRanges, TieBreak};
use crate::error::{EvolutionError, Result};
use crate::genetics::{mutate_population, uniform_crossover, Genome, MutationReport};
use crate::population::RankedPopulation;
use rand::Rng;

/// Next generation produced at a boundary
#[derive(Clone, Debug)]
pub struct Offspring {
    pub genomes: Vec<Genome>,
    pub mutation: MutationReport,
}

/// Stateless evolution engine; one call per generation boundary
#[derive(Clone, Debug)]
pub struct EvolutionEngine {
    pub mutation_probability: f32,
    pub gene_ranges: GeneRanges,
    pub tie_break: TieBreak,
}

impl EvolutionEngine {
    /// Create evolution engine from config
    pub fn from_config(config: &Config) -> Self {
        Self {
            mutation_probability: config.evolution.mutation_probability,
            gene_ranges: config.evolution.gene_ranges,
            tie_break: config.evolution.tie_break,
        }
    }

    /// Elitism pair plus roulette-filled remainder, before mutation.
    ///
    /// `ranked` is ordered best to worst and `weights` is aligned with it.
    /// Mates are always drawn from the pre-reproduction genomes.
    pub fn reproduce<R: Rng + ?Sized>(
        &self,
        ranked: &[Genome],
        weights: &[f32],
        rng: &mut R,
    ) -> Result<Vec<Genome>> {
        let n = ranked.len();
        if weights.len() != n {
            return Err(EvolutionError::SizeMismatch {
                expected: n,
                found: weights.len(),
            });
        }
        if n < 2 {
            return Err(EvolutionError::SizeMismatch {
                expected: 2,
                found: n,
            });
        }

        let best = &ranked[0];
        let second = &ranked[1];

        let mut next = Vec::with_capacity(n);
        next.push(uniform_crossover(best, second, rng));
        next.push(second.clone());

        for parent in &ranked[2..] {
            let mate = roulette_select(weights, rng).unwrap_or(n - 1);
            next.push(uniform_crossover(parent, &ranked[mate], rng));
        }

        Ok(next)
    }

    /// Point-mutate every slot, elites included, with the configured probability
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        genomes: Vec<Genome>,
        rng: &mut R,
    ) -> (Vec<Genome>, MutationReport) {
        mutate_population(genomes, self.mutation_probability, &self.gene_ranges, rng)
    }

    /// Reproduce from a settled snapshot and apply mutation
    pub fn next_generation<R: Rng + ?Sized>(
        &self,
        ranked: &RankedPopulation,
        rng: &mut R,
    ) -> Result<Offspring> {
        let children = self.reproduce(&ranked.genomes(), &ranked.weights(), rng)?;
        let (genomes, mutation) = self.mutate(children, rng);
        Ok(Offspring { genomes, mutation })
    }
}

/// Fitness-proportionate selection.
///
/// Draws `u * sum` and subtracts weights in order until the remainder is
/// `<= 0`. Falls back to the last index when nothing triggers, and always
/// picks the last index when the weights do not sum to a positive value.
/// Returns `None` only for an empty slice.
pub fn roulette_select<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let last = weights.len().checked_sub(1)?;

    let weight_sum: f32 = weights.iter().sum();
    if !(weight_sum > 0.0) {
        return Some(last);
    }

    let mut value = rng.gen::<f32>() * weight_sum;
    for (i, weight) in weights.iter().enumerate() {
        value -= weight;
        if value <= 0.0 {
            return Some(i);
        }
    }

    Some(last)
}
