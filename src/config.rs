//! Configuration system for the block monster evolution.
//!
//! Supports YAML configuration files with sensible defaults.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub population: PopulationConfig,
    pub evolution: EvolutionConfig,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
    pub logging: LoggingConfig,
}

/// Population size and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of creatures per generation (constant across generations)
    pub population_count: usize,
    /// Where every creature is materialized
    pub start_position: Vector3<f32>,
    /// Fixed point every creature walks toward
    pub target_position: Vector3<f32>,
}

/// How ties between equal fitness values are ordered in the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep equal scores as-is; a stable sort keeps both entries
    #[default]
    Stable,
    /// Subtract a uniform [0, 1) draw from a colliding score until it is unique
    Perturb,
}

/// Genetic operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Probability that a genome receives one point mutation per generation
    pub mutation_probability: f32,
    /// Ordering policy for equal fitness scores
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Value ranges for random and mutated genes
    #[serde(default)]
    pub gene_ranges: GeneRanges,
}

/// Value ranges for the two gene classes.
///
/// Positions `i % 3 == 0` are gate genes (small scalar gain); the other two
/// thirds are magnitude genes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneRanges {
    pub initial_gate: (f32, f32),
    pub initial_magnitude: (f32, f32),
    pub mutation_gate: (f32, f32),
    pub mutation_magnitude: (f32, f32),
}

/// Clock and actuation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Simulated seconds per evaluation window
    pub generation_time_limit: f32,
    /// Multiplier applied to every delivered tick
    pub time_scale: f32,
    /// Multiplier applied to every limb force
    pub global_thrust: f32,
    /// Seconds between limb firings
    pub step_interval: f32,
    /// Reward credited per ground contact while alive
    pub step_reward: f32,
    /// Unscaled seconds per tick when the CLI drives the loop
    pub tick_seconds: f32,
}

/// Parameters of the bundled headless arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Mass of a creature body
    pub body_mass: f32,
    /// Downward acceleration
    pub gravity: f32,
    /// Fraction of horizontal speed lost per second on the ground
    pub ground_friction: f32,
    /// Landing speed above which a creature is considered fallen
    pub crash_speed: f32,
}

/// Record stream and checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for CSV streams and checkpoints
    pub output_dir: String,
    /// File name of the per-creature stream
    pub generation_log: String,
    /// File name of the fittest-only stream
    pub fittest_log: String,
    /// Generations between checkpoints (0 disables)
    pub checkpoint_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population: PopulationConfig::default(),
            evolution: EvolutionConfig::default(),
            simulation: SimulationConfig::default(),
            arena: ArenaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            population_count: 20,
            start_position: Vector3::new(0.0, 0.0, 0.0),
            target_position: Vector3::new(40.0, 0.0, 40.0),
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mutation_probability: 0.2,
            tie_break: TieBreak::Stable,
            gene_ranges: GeneRanges::default(),
        }
    }
}

impl Default for GeneRanges {
    fn default() -> Self {
        Self {
            initial_gate: (0.0, 5.0),
            initial_magnitude: (0.0, 60.0),
            mutation_gate: (0.0, 10.0),
            mutation_magnitude: (0.0, 50.0),
        }
    }
}

impl GeneRanges {
    /// Range a fresh random gene at `index` is drawn from
    pub fn initial(&self, index: usize) -> Range<f32> {
        let (lo, hi) = if index % 3 == 0 {
            self.initial_gate
        } else {
            self.initial_magnitude
        };
        lo..hi
    }

    /// Range a mutated gene at `index` is redrawn from
    pub fn mutation(&self, index: usize) -> Range<f32> {
        let (lo, hi) = if index % 3 == 0 {
            self.mutation_gate
        } else {
            self.mutation_magnitude
        };
        lo..hi
    }

    fn validate(&self) -> Result<(), String> {
        let ranges = [
            ("initial_gate", self.initial_gate),
            ("initial_magnitude", self.initial_magnitude),
            ("mutation_gate", self.mutation_gate),
            ("mutation_magnitude", self.mutation_magnitude),
        ];
        for (name, (lo, hi)) in ranges {
            if !(lo < hi) {
                return Err(format!("gene range {} must satisfy low < high", name));
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation_time_limit: 30.0,
            time_scale: 1.0,
            global_thrust: 1.0,
            step_interval: 0.5,
            step_reward: 0.01,
            tick_seconds: 1.0 / 60.0,
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            body_mass: 10.0,
            gravity: 9.81,
            ground_friction: 0.6,
            crash_speed: 9.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            generation_log: "GenerationData.csv".to_string(),
            fittest_log: "Fittest.csv".to_string(),
            checkpoint_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.population.population_count < 2 {
            return Err("population_count must be >= 2".to_string());
        }
        let sim = &self.simulation;
        if !(sim.generation_time_limit > 0.0) {
            return Err("generation_time_limit must be > 0".to_string());
        }
        if !(sim.time_scale > 0.0) {
            return Err("time_scale must be > 0".to_string());
        }
        if !(sim.step_interval > 0.0) {
            return Err("step_interval must be > 0".to_string());
        }
        if !(sim.tick_seconds > 0.0) {
            return Err("tick_seconds must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.evolution.mutation_probability) {
            return Err("mutation_probability must be within [0, 1]".to_string());
        }
        if !(self.arena.body_mass > 0.0) {
            return Err("arena body_mass must be > 0".to_string());
        }
        self.evolution.gene_ranges.validate()
    }
}
