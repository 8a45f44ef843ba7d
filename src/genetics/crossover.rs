//! Uniform crossover between two genomes.

use super::genome::{Genome, GENOME_LENGTH};
use rand::Rng;

/// Build a child taking every gene from either parent on a fair coin.
///
/// Positions are independent and values are copied, never blended.
pub fn uniform_crossover<R: Rng + ?Sized>(a: &Genome, b: &Genome, rng: &mut R) -> Genome {
    let mut genes = [0.0; GENOME_LENGTH];
    for (i, gene) in genes.iter_mut().enumerate() {
        *gene = if rng.gen_bool(0.5) { a[i] } else { b[i] };
    }
    Genome::new(genes)
}
