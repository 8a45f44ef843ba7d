//! Fixed-length real-valued genome.

use super::codec::ActuationSchedule;
use crate::config::GeneRanges;
use crate::error::{EvolutionError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of genes in every genome for the three-block topology
pub const GENOME_LENGTH: usize = 18;

/// A creature's genome: 2 rhythm phases x 3 limbs x 3 force components.
///
/// Genomes are values. Crossover and mutation always build a new genome,
/// so a genome bound to a live creature never changes under it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: [f32; GENOME_LENGTH],
}

impl Genome {
    pub fn new(genes: [f32; GENOME_LENGTH]) -> Self {
        Self { genes }
    }

    /// Build a genome from an arbitrary slice, checking its length
    pub fn from_slice(genes: &[f32]) -> Result<Self> {
        let genes: [f32; GENOME_LENGTH] =
            genes
                .try_into()
                .map_err(|_| EvolutionError::InvalidGenomeLength {
                    expected: GENOME_LENGTH,
                    found: genes.len(),
                })?;
        Ok(Self { genes })
    }

    /// Random genome: gate genes and magnitude genes use their own ranges
    pub fn random<R: Rng + ?Sized>(rng: &mut R, ranges: &GeneRanges) -> Self {
        let mut genes = [0.0; GENOME_LENGTH];
        for (i, gene) in genes.iter_mut().enumerate() {
            *gene = rng.gen_range(ranges.initial(i));
        }
        Self { genes }
    }

    pub fn genes(&self) -> &[f32; GENOME_LENGTH] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        GENOME_LENGTH
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Copy of this genome with one gene replaced
    pub fn with_gene(&self, index: usize, value: f32) -> Self {
        let mut genes = self.genes;
        genes[index] = value;
        Self { genes }
    }

    /// Decode into the per-limb force schedule
    pub fn schedule(&self) -> ActuationSchedule {
        ActuationSchedule::from_genes(&self.genes)
    }

    /// Number of positions where two genomes hold different values
    pub fn differing_positions(&self, other: &Genome) -> usize {
        self.genes
            .iter()
            .zip(other.genes.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl Index<usize> for Genome {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.genes[index]
    }
}
