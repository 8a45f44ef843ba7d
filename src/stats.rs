//! Per-generation statistics.

use crate::creature::CreatureRecord;
use crate::population::RankedPopulation;
use serde::{Deserialize, Serialize};

/// Statistics snapshot taken at a generation boundary
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation that just finished
    pub generation: u64,
    /// Creatures evaluated
    pub population: usize,
    /// Creatures still alive at the boundary
    pub alive: usize,
    /// Highest fitness in the generation
    pub best_fitness: f32,
    /// Mean fitness across the generation
    pub mean_fitness: f32,
    /// Distance to target of the fittest creature
    pub best_distance: f32,
    /// Genomes that received a point mutation for the next generation
    pub mutated: usize,
}

impl GenerationStats {
    /// Build stats from a settled snapshot.
    ///
    /// The best entry is picked by its ranking key but reported with its
    /// unperturbed score.
    pub fn from_snapshot(
        generation: u64,
        ranked: &RankedPopulation,
        records: &[CreatureRecord],
        mutated: usize,
    ) -> Self {
        let population = records.len();
        let mean_fitness = if population == 0 {
            0.0
        } else {
            records.iter().map(|r| r.fitness()).sum::<f32>() / population as f32
        };

        let (best_fitness, best_distance) = ranked
            .best()
            .map(|e| (e.score, e.distance))
            .unwrap_or((0.0, 0.0));

        Self {
            generation,
            population,
            alive: records.iter().filter(|r| r.is_alive()).count(),
            best_fitness,
            mean_fitness,
            best_distance,
            mutated,
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:5} | Pop:{:4} | Alive:{:4} | Best:{:8.3} | Mean:{:8.3} | Dist:{:7.2} | Mut:{:3}",
            self.generation,
            self.population,
            self.alive,
            self.best_fitness,
            self.mean_fitness,
            self.best_distance,
            self.mutated,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded generations, oldest first
    pub snapshots: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: GenerationStats) {
        self.snapshots.push(stats);
    }

    pub fn latest(&self) -> Option<&GenerationStats> {
        self.snapshots.last()
    }

    /// Generation with the highest best fitness so far
    pub fn best_ever(&self) -> Option<&GenerationStats> {
        self.snapshots
            .iter()
            .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
    }

    /// Best fitness over generations
    pub fn best_fitness_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.best_fitness))
            .collect()
    }

    /// Mean fitness over generations
    pub fn mean_fitness_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.mean_fitness))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load(path: &str) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::{CreatureId, CreatureState};
    use crate::genetics::{Genome, GENOME_LENGTH};
    use crate::population::FitnessEntry;
    use nalgebra::Vector3;

    fn record(id: u64, reward: f32, alive: bool) -> CreatureRecord {
        let state = CreatureState {
            position: Vector3::new(5.0, 0.0, 0.0),
            target: Vector3::zeros(),
            alive,
            step_reward: reward,
        };
        CreatureRecord::new(CreatureId(id), Genome::new([0.0; GENOME_LENGTH]), state)
    }

    #[test]
    fn test_from_snapshot() {
        let records = vec![record(0, 1.0, true), record(1, 3.0, false)];
        let entries = records
            .iter()
            .map(|r| FitnessEntry {
                id: r.id,
                fitness: r.fitness(),
                score: r.fitness(),
                distance: r.distance_to_target(),
                genome: r.genome.clone(),
            })
            .collect();
        let ranked = RankedPopulation::from_entries(entries);

        let stats = GenerationStats::from_snapshot(4, &ranked, &records, 1);

        assert_eq!(stats.generation, 4);
        assert_eq!(stats.population, 2);
        assert_eq!(stats.alive, 1);
        assert_eq!(stats.best_fitness, 3.0);
        assert_eq!(stats.mean_fitness, 2.0);
        assert_eq!(stats.best_distance, 5.0);
        assert!(stats.summary().contains("Gen:    4"));
    }

    #[test]
    fn test_best_fitness_ignores_perturbation() {
        let records = vec![record(0, 0.0, true), record(1, 0.0, true)];
        let entries = vec![
            FitnessEntry {
                id: CreatureId(0),
                fitness: -0.4,
                score: 0.0,
                distance: 5.0,
                genome: records[0].genome.clone(),
            },
            FitnessEntry {
                id: CreatureId(1),
                fitness: -0.9,
                score: 0.0,
                distance: 5.0,
                genome: records[1].genome.clone(),
            },
        ];
        let ranked = RankedPopulation::from_entries(entries);

        let stats = GenerationStats::from_snapshot(1, &ranked, &records, 0);

        assert_eq!(stats.best_fitness, 0.0);
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new();

        for i in 0..5 {
            history.record(GenerationStats {
                generation: i + 1,
                best_fitness: [1.0, 4.0, 2.0, 3.0, 0.5][i as usize],
                mean_fitness: i as f32 * 0.25,
                ..GenerationStats::default()
            });
        }

        let series = history.best_fitness_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (1, 1.0));
        assert_eq!(history.mean_fitness_series()[4], (5, 1.0));
        assert_eq!(history.best_ever().map(|s| s.generation), Some(2));
        assert_eq!(history.latest().map(|s| s.generation), Some(5));
    }

    #[test]
    fn test_history_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let path = path.to_str().unwrap();

        let mut history = StatsHistory::new();
        history.record(GenerationStats {
            generation: 1,
            best_fitness: 2.5,
            ..GenerationStats::default()
        });
        history.save(path).unwrap();

        let loaded = StatsHistory::load(path).unwrap();
        assert_eq!(loaded.snapshots.len(), 1);
        assert_eq!(loaded.snapshots[0].best_fitness, 2.5);
    }
}
