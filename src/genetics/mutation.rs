//! Point mutation with class-dependent redraw ranges.

use super::genome::{Genome, GENOME_LENGTH};
use crate::config::GeneRanges;
use rand::Rng;

const MAX_REDRAWS: usize = 16;

/// Outcome of one mutation pass over a population
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationReport {
    /// Slots that received a point mutation
    pub mutated: Vec<usize>,
}

/// Copy of `genome` with exactly one randomly chosen gene redrawn.
///
/// Gate genes (`index % 3 == 0`) redraw from the narrow gate range, the
/// others from the magnitude range. A redraw equal to the old value is
/// drawn again so the result always differs in one position.
pub fn mutate_genome<R: Rng + ?Sized>(genome: &Genome, ranges: &GeneRanges, rng: &mut R) -> Genome {
    let index = rng.gen_range(0..GENOME_LENGTH);
    let range = ranges.mutation(index);
    let old = genome[index];

    let mut value = rng.gen_range(range.clone());
    let mut attempts = 1;
    while value == old && attempts < MAX_REDRAWS {
        value = rng.gen_range(range.clone());
        attempts += 1;
    }
    if value == old {
        value = if range.start != old { range.start } else { range.end };
    }

    genome.with_gene(index, value)
}

/// Mutation pass over every slot, elites included.
///
/// Each genome draws one sample; below `probability` it gets one point mutation.
pub fn mutate_population<R: Rng + ?Sized>(
    genomes: Vec<Genome>,
    probability: f32,
    ranges: &GeneRanges,
    rng: &mut R,
) -> (Vec<Genome>, MutationReport) {
    let mut report = MutationReport::default();
    let mutated = genomes
        .into_iter()
        .enumerate()
        .map(|(slot, genome)| {
            if rng.gen::<f32>() < probability {
                report.mutated.push(slot);
                mutate_genome(&genome, ranges, rng)
            } else {
                genome
            }
        })
        .collect();
    (mutated, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population(rng: &mut ChaCha8Rng, n: usize) -> Vec<Genome> {
        let ranges = GeneRanges::default();
        (0..n).map(|_| Genome::random(rng, &ranges)).collect()
    }

    #[test]
    fn test_single_point_changes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ranges = GeneRanges::default();
        let genome = Genome::random(&mut rng, &ranges);

        for _ in 0..200 {
            let mutated = mutate_genome(&genome, &ranges, &mut rng);
            assert_eq!(genome.differing_positions(&mutated), 1);
        }
    }

    #[test]
    fn test_redraw_uses_class_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let ranges = GeneRanges::default();
        let genome = Genome::new([-1.0; GENOME_LENGTH]);

        for _ in 0..200 {
            let mutated = mutate_genome(&genome, &ranges, &mut rng);
            for i in 0..GENOME_LENGTH {
                if mutated[i] != genome[i] {
                    assert!(ranges.mutation(i).contains(&mutated[i]));
                }
            }
        }
    }

    #[test]
    fn test_probability_one_mutates_everyone() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let before = population(&mut rng, 5);

        let (after, report) =
            mutate_population(before.clone(), 1.0, &GeneRanges::default(), &mut rng);

        assert_eq!(report.mutated, vec![0, 1, 2, 3, 4]);
        for (old, new) in before.iter().zip(after.iter()) {
            assert_eq!(old.differing_positions(new), 1);
        }
    }

    #[test]
    fn test_probability_zero_changes_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let before = population(&mut rng, 5);

        let (after, report) =
            mutate_population(before.clone(), 0.0, &GeneRanges::default(), &mut rng);

        assert!(report.mutated.is_empty());
        assert_eq!(before, after);
    }

    #[test]
    fn test_degenerate_range_still_changes_gene() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let ranges = GeneRanges {
            mutation_gate: (1.0, 1.0 + f32::EPSILON),
            mutation_magnitude: (1.0, 1.0 + f32::EPSILON),
            ..GeneRanges::default()
        };
        let genome = Genome::new([1.0; GENOME_LENGTH]);

        let mutated = mutate_genome(&genome, &ranges, &mut rng);
        assert_eq!(genome.differing_positions(&mutated), 1);
    }
}
