//! Genome to motor program decoding.
//!
//! The 18 genes split into two contiguous blocks of nine, one per rhythm
//! phase. Inside a block the first three genes are the left limb force,
//! the next three the right limb force and the last three the head force.

use super::genome::GENOME_LENGTH;
use crate::error::{EvolutionError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Rhythm phases per schedule
pub const PHASE_COUNT: usize = 2;
/// Genes consumed by one phase (3 limbs x 3 components)
pub const COMPONENTS_PER_PHASE: usize = 9;

const _: () = assert!(PHASE_COUNT * COMPONENTS_PER_PHASE == GENOME_LENGTH);

/// Actuated blocks of a creature, in firing order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Limb {
    Left,
    Right,
    Head,
}

impl Limb {
    pub const ALL: [Limb; 3] = [Limb::Left, Limb::Right, Limb::Head];

    pub fn index(self) -> usize {
        match self {
            Limb::Left => 0,
            Limb::Right => 1,
            Limb::Head => 2,
        }
    }

    /// Limb fired after this one
    pub fn next(self) -> Limb {
        match self {
            Limb::Left => Limb::Right,
            Limb::Right => Limb::Head,
            Limb::Head => Limb::Left,
        }
    }
}

/// Force vectors of one rhythm phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    pub left: Vector3<f32>,
    pub right: Vector3<f32>,
    pub head: Vector3<f32>,
}

impl Phase {
    fn from_block(block: &[f32]) -> Self {
        let vector = |offset: usize| Vector3::new(block[offset], block[offset + 1], block[offset + 2]);
        Self {
            left: vector(0),
            right: vector(3),
            head: vector(6),
        }
    }

    pub fn force(&self, limb: Limb) -> Vector3<f32> {
        match limb {
            Limb::Left => self.left,
            Limb::Right => self.right,
            Limb::Head => self.head,
        }
    }
}

/// Read-only cyclic actuation pattern derived from a genome
#[derive(Clone, Debug, PartialEq)]
pub struct ActuationSchedule {
    phases: [Phase; PHASE_COUNT],
}

impl ActuationSchedule {
    pub(crate) fn from_genes(genes: &[f32; GENOME_LENGTH]) -> Self {
        let (first, second) = genes.split_at(COMPONENTS_PER_PHASE);
        Self {
            phases: [Phase::from_block(first), Phase::from_block(second)],
        }
    }

    pub fn phases(&self) -> &[Phase; PHASE_COUNT] {
        &self.phases
    }

    /// Force for `limb` during rhythm phase `phase` (wraps modulo the phase count)
    pub fn force(&self, phase: usize, limb: Limb) -> Vector3<f32> {
        self.phases[phase % PHASE_COUNT].force(limb)
    }
}

/// Decode a raw gene sequence.
///
/// Fails with `InvalidGenomeLength` unless exactly 18 genes are given.
pub fn decode(genes: &[f32]) -> Result<ActuationSchedule> {
    let genes: &[f32; GENOME_LENGTH] =
        genes
            .try_into()
            .map_err(|_| EvolutionError::InvalidGenomeLength {
                expected: GENOME_LENGTH,
                found: genes.len(),
            })?;
    Ok(ActuationSchedule::from_genes(genes))
}
