//! Checkpoint system for saving and resuming evolution.

use crate::config::Config;
use crate::genetics::Genome;
use crate::stats::StatsHistory;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

const MAGIC: &[u8; 4] = b"BMON";

/// Evolution state at a generation boundary
#[derive(Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Generation about to be evaluated
    pub generation: u64,
    /// Configuration
    pub config: Config,
    /// Genomes of that generation
    pub genomes: Vec<Genome>,
    /// Statistics so far
    pub history: StatsHistory,
    /// Random seed (for reproducibility)
    pub random_seed: u64,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    pub fn new(
        generation: u64,
        config: Config,
        genomes: Vec<Genome>,
        history: StatsHistory,
        random_seed: u64,
    ) -> Self {
        Self {
            version: Self::VERSION,
            generation,
            config,
            genomes,
            history,
            random_seed,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(CheckpointError::InvalidFormat("Invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }
        if checkpoint.genomes.len() != checkpoint.config.population.population_count {
            return Err(CheckpointError::InvalidFormat(format!(
                "{} genomes stored for a population of {}",
                checkpoint.genomes.len(),
                checkpoint.config.population.population_count
            )));
        }

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Checkpoint manager for automatic saving
pub struct CheckpointManager {
    /// Base directory for checkpoints
    pub base_dir: String,
    /// Generations between checkpoints (0 disables)
    pub interval: u64,
    /// Maximum checkpoints to keep
    pub max_checkpoints: usize,
    last_checkpoint: u64,
}

impl CheckpointManager {
    pub fn new(base_dir: String, interval: u64, max_checkpoints: usize) -> Self {
        std::fs::create_dir_all(&base_dir).ok();

        Self {
            base_dir,
            interval,
            max_checkpoints,
            last_checkpoint: 0,
        }
    }

    /// Check if a checkpoint should be saved
    pub fn should_save(&self, generation: u64) -> bool {
        self.interval > 0
            && generation > 1
            && (generation - 1) % self.interval == 0
            && generation != self.last_checkpoint
    }

    /// Generate checkpoint filename
    pub fn checkpoint_path(&self, generation: u64) -> String {
        format!("{}/checkpoint_{:08}.bin", self.base_dir, generation)
    }

    /// Save checkpoint and update state
    pub fn save(&mut self, checkpoint: &Checkpoint) -> Result<String, CheckpointError> {
        let path = self.checkpoint_path(checkpoint.generation);
        checkpoint.save(&path)?;
        self.last_checkpoint = checkpoint.generation;

        self.cleanup()?;

        Ok(path)
    }

    /// Remove old checkpoints beyond max limit
    fn cleanup(&self) -> Result<(), CheckpointError> {
        let mut checkpoints: Vec<_> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("checkpoint_")
            })
            .collect();

        if checkpoints.len() > self.max_checkpoints {
            // Names embed the zero-padded generation
            checkpoints.sort_by_key(|e| e.file_name());

            let to_remove = checkpoints.len() - self.max_checkpoints;
            for entry in checkpoints.into_iter().take(to_remove) {
                std::fs::remove_file(entry.path())?;
            }
        }

        Ok(())
    }

    /// Find latest checkpoint in directory
    pub fn find_latest(&self) -> Option<String> {
        std::fs::read_dir(&self.base_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("checkpoint_")
            })
            .max_by_key(|e| e.file_name())
            .map(|e| e.path().to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::GENOME_LENGTH;

    fn create_test_checkpoint(generation: u64) -> Checkpoint {
        let mut config = Config::default();
        config.population.population_count = 3;
        let genomes = (0..3)
            .map(|i| Genome::new([i as f32; GENOME_LENGTH]))
            .collect();
        Checkpoint::new(generation, config, genomes, StatsHistory::new(), 12345)
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_checkpoint.bin");
        let checkpoint = create_test_checkpoint(7);

        checkpoint.save(&path).unwrap();
        let loaded = Checkpoint::load(&path).unwrap();

        assert_eq!(loaded.generation, 7);
        assert_eq!(loaded.genomes, checkpoint.genomes);
        assert_eq!(loaded.random_seed, 12345);
        assert_eq!(loaded.config.population.target_position, checkpoint.config.population.target_position);
    }

    #[test]
    fn test_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"PRMDjunkjunk").unwrap();

        match Checkpoint::load(&path) {
            Err(CheckpointError::InvalidFormat(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|c| c.generation)),
        }
    }

    #[test]
    fn test_manager_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_string_lossy().to_string();
        let mut manager = CheckpointManager::new(base, 2, 2);

        assert!(!manager.should_save(1));
        assert!(manager.should_save(3));
        assert!(!manager.should_save(4));

        for generation in [3, 5, 7] {
            manager.save(&create_test_checkpoint(generation)).unwrap();
        }

        assert!(!manager.should_save(7));
        let latest = manager.find_latest().unwrap();
        assert!(latest.ends_with("checkpoint_00000007.bin"));
        let count = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_checkpoint_size() {
        let checkpoint = create_test_checkpoint(1);
        let size = checkpoint.size_bytes();
        assert!(size > 0);
        assert!(size < 100_000);
    }
}
