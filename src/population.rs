//! Population store: the current generation's genomes and fitness snapshots.

use crate::config::{GeneRanges, TieBreak};
use crate::creature::{CreatureId, CreatureRecord};
use crate::error::{EvolutionError, Result};
use crate::genetics::Genome;
use rand::Rng;

/// One scored creature in a snapshot
#[derive(Clone, Debug)]
pub struct FitnessEntry {
    pub id: CreatureId,
    /// Score used for ranking and roulette weights
    pub fitness: f32,
    /// Fitness as the record reported it, before any tie perturbation
    pub score: f32,
    pub distance: f32,
    pub genome: Genome,
}

/// Settled fitness snapshot ordered best to worst
#[derive(Clone, Debug)]
pub struct RankedPopulation {
    entries: Vec<FitnessEntry>,
}

impl RankedPopulation {
    /// Order entries by ascending fitness, then reverse so index 0 is the fittest
    pub fn from_entries(mut entries: Vec<FitnessEntry>) -> Self {
        entries.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        entries.reverse();
        Self { entries }
    }

    pub fn entries(&self) -> &[FitnessEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&FitnessEntry> {
        self.entries.first()
    }

    /// Genomes best to worst
    pub fn genomes(&self) -> Vec<Genome> {
        self.entries.iter().map(|e| e.genome.clone()).collect()
    }

    /// Fitness weights aligned with [`RankedPopulation::genomes`]
    pub fn weights(&self) -> Vec<f32> {
        self.entries.iter().map(|e| e.fitness).collect()
    }
}

/// Genomes of the current generation. Size never changes.
#[derive(Clone, Debug)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    /// Wrap existing genomes; at least two are needed for reproduction
    pub fn new(genomes: Vec<Genome>) -> Result<Self> {
        if genomes.len() < 2 {
            return Err(EvolutionError::SizeMismatch {
                expected: 2,
                found: genomes.len(),
            });
        }
        Ok(Self { genomes })
    }

    /// Random initial population
    pub fn random<R: Rng + ?Sized>(size: usize, ranges: &GeneRanges, rng: &mut R) -> Result<Self> {
        let genomes = (0..size).map(|_| Genome::random(rng, ranges)).collect();
        Self::new(genomes)
    }

    pub fn size(&self) -> usize {
        self.genomes.len()
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Score every record of the current generation.
    ///
    /// With [`TieBreak::Perturb`] an exact score collision is resolved by
    /// subtracting a uniform [0, 1) draw until the score is unique. A draw
    /// too small to change the score steps it down one ulp instead.
    /// Non-finite scores are left tied.
    pub fn snapshot_fitness<R: Rng + ?Sized>(
        &self,
        records: &[CreatureRecord],
        tie_break: TieBreak,
        rng: &mut R,
    ) -> Result<RankedPopulation> {
        if records.len() != self.size() {
            return Err(EvolutionError::SizeMismatch {
                expected: self.size(),
                found: records.len(),
            });
        }

        let mut entries: Vec<FitnessEntry> = Vec::with_capacity(records.len());
        for record in records {
            let score = record.fitness();
            let mut fitness = score;
            if tie_break == TieBreak::Perturb && fitness.is_finite() {
                while entries.iter().any(|e| e.fitness == fitness) {
                    log::trace!("Fitness collision at {} for creature {}", fitness, record.id);
                    let nudged = fitness - rng.gen::<f32>();
                    fitness = if nudged == fitness {
                        step_down(fitness)
                    } else {
                        nudged
                    };
                }
            }
            entries.push(FitnessEntry {
                id: record.id,
                fitness,
                score,
                distance: record.distance_to_target(),
                genome: record.genome.clone(),
            });
        }

        Ok(RankedPopulation::from_entries(entries))
    }

    /// Swap in the next generation; the size must match exactly
    pub fn replace(&mut self, genomes: Vec<Genome>) -> Result<()> {
        if genomes.len() != self.size() {
            return Err(EvolutionError::SizeMismatch {
                expected: self.size(),
                found: genomes.len(),
            });
        }
        self.genomes = genomes;
        Ok(())
    }
}

/// Next representable f32 below a finite `value`
fn step_down(value: f32) -> f32 {
    let bits = value.to_bits();
    if value > 0.0 {
        f32::from_bits(bits - 1)
    } else if value == 0.0 {
        -f32::from_bits(1)
    } else {
        f32::from_bits(bits + 1)
    }
}
