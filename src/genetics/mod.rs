//! Genetics module - genomes, motor decoding, crossover and mutation.

pub mod codec;
pub mod crossover;
pub mod genome;
pub mod mutation;

pub use codec::{decode, ActuationSchedule, Limb, Phase};
pub use crossover::uniform_crossover;
pub use genome::{Genome, GENOME_LENGTH};
pub use mutation::{mutate_genome, mutate_population, MutationReport};
