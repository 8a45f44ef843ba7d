//! # BLOCKMONSTERS
//!
//! Evolves three-block creatures that walk toward a target using a genetic
//! algorithm scored by a physics simulation.
//!
//! ## Features
//!
//! - **Fixed genome**: 18 genes decode into a two-phase, three-limb force schedule
//! - **Elitism + roulette**: runner-up survives verbatim, the rest breed by fitness share
//! - **Uniform crossover** and single-point mutation with class-dependent ranges
//! - **Pluggable habitat**: any simulation implementing [`Habitat`] can host the loop
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blockmonsters::{Arena, Config, GenerationController};
//!
//! let config = Config::default();
//! let mut arena = Arena::from_config(&config);
//! let mut controller = GenerationController::new_with_seed(config, 42).unwrap();
//!
//! // Evolve ten generations
//! controller.run(&mut arena, 10).unwrap();
//!
//! if let Some(best) = controller.history().best_ever() {
//!     println!("Best fitness: {} (generation {})", best.best_fitness, best.generation);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use blockmonsters::Config;
//!
//! let mut config = Config::default();
//! config.population.population_count = 40;
//! config.evolution.mutation_probability = 0.1;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Decoding a genome
//!
//! ```rust
//! use blockmonsters::genetics::{decode, Limb};
//!
//! let genes: Vec<f32> = (0..18).map(|i| i as f32).collect();
//! let schedule = decode(&genes).unwrap();
//! assert_eq!(schedule.force(1, Limb::Head).x, 15.0);
//! assert!(decode(&genes[..17]).is_err());
//! ```

pub mod arena;
pub mod checkpoint;
pub mod config;
pub mod controller;
pub mod creature;
pub mod error;
pub mod evolution;
pub mod gait;
pub mod genetics;
pub mod habitat;
pub mod journal;
pub mod population;
pub mod stats;

// Re-export main types
pub use arena::Arena;
pub use config::Config;
pub use controller::GenerationController;
pub use error::EvolutionError;
pub use genetics::Genome;
pub use habitat::Habitat;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Evolve a population in the bundled arena and time it
pub fn benchmark(generations: u64, population: usize) -> Result<BenchmarkResult, EvolutionError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.population_count = population;

    let mut arena = Arena::from_config(&config);
    let mut controller = GenerationController::new_with_seed(config, 42)?;

    let start = Instant::now();
    controller.run(&mut arena, generations)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        generations,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: generations as f64 / elapsed.as_secs_f64(),
        best_fitness: controller
            .history()
            .best_ever()
            .map(|s| s.best_fitness)
            .unwrap_or(0.0),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u64,
    pub population: usize,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub best_fitness: f32,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.2} generations/s", self.generations_per_second)?;
        writeln!(f, "Best fitness: {:.3}", self.best_fitness)?;
        Ok(())
    }
}
