//! Generation controller - the main evolution loop.
//!
//! The controller is tick driven. Each tick it drives every creature's
//! gait, steps the habitat and refreshes the observed creature state. Once
//! the accumulated simulated time reaches the generation time limit it
//! scores the generation, breeds the next one, writes the record streams
//! and re-materializes the population.

use crate::checkpoint::Checkpoint;
use crate::config::Config;
use crate::creature::{CreatureId, CreatureRecord};
use crate::error::{EvolutionError, Result};
use crate::evolution::EvolutionEngine;
use crate::gait::Gait;
use crate::habitat::Habitat;
use crate::journal::{Journal, LogRow};
use crate::population::Population;
use crate::stats::{GenerationStats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    /// Accumulating simulated time toward the limit
    Evaluating,
    /// Scoring and breeding; only observable if a transition failed
    GenerationBoundary,
}

/// What a UI needs each frame
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub generation: u64,
    pub population: usize,
    pub elapsed: f32,
    pub time_scale: f32,
    pub fittest: Option<CreatureId>,
}

/// Drives timed generations over a [`Habitat`]
pub struct GenerationController {
    config: Config,
    population: Population,
    engine: EvolutionEngine,

    // Transient projection of the population, aligned by index
    records: Vec<CreatureRecord>,
    gaits: Vec<Gait>,

    generation: u64,
    elapsed: f32,
    state: ControllerState,
    fittest: Option<CreatureId>,

    journal: Journal,
    history: StatsHistory,

    rng: ChaCha8Rng,
    seed: u64,
}

impl GenerationController {
    /// Create a controller with a random seed
    pub fn new(config: Config) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a controller with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self> {
        config.validate().map_err(EvolutionError::InvalidConfig)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let population = Population::random(
            config.population.population_count,
            &config.evolution.gene_ranges,
            &mut rng,
        )?;

        Ok(Self::assemble(config, population, 1, StatsHistory::new(), rng, seed))
    }

    /// Resume from a checkpoint
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Result<Self> {
        checkpoint
            .config
            .validate()
            .map_err(EvolutionError::InvalidConfig)?;

        let expected = checkpoint.config.population.population_count;
        if checkpoint.genomes.len() != expected {
            return Err(EvolutionError::SizeMismatch {
                expected,
                found: checkpoint.genomes.len(),
            });
        }
        let population = Population::new(checkpoint.genomes)?;

        // Stream offset by generation
        let rng = ChaCha8Rng::seed_from_u64(checkpoint.random_seed.wrapping_add(checkpoint.generation));

        Ok(Self::assemble(
            checkpoint.config,
            population,
            checkpoint.generation,
            checkpoint.history,
            rng,
            checkpoint.random_seed,
        ))
    }

    fn assemble(
        config: Config,
        population: Population,
        generation: u64,
        history: StatsHistory,
        rng: ChaCha8Rng,
        seed: u64,
    ) -> Self {
        let engine = EvolutionEngine::from_config(&config);
        Self {
            config,
            population,
            engine,
            records: Vec::new(),
            gaits: Vec::new(),
            generation,
            elapsed: 0.0,
            state: ControllerState::Evaluating,
            fittest: None,
            journal: Journal::disabled(),
            history,
            rng,
            seed,
        }
    }

    /// Attach CSV record streams
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    /// Snapshot of the generation about to be (or being) evaluated
    pub fn create_checkpoint(&self) -> Checkpoint {
        Checkpoint::new(
            self.generation,
            self.config.clone(),
            self.population.genomes().to_vec(),
            self.history.clone(),
            self.seed,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Records of the generation under evaluation
    pub fn records(&self) -> &[CreatureRecord] {
        &self.records
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    pub fn fittest(&self) -> Option<CreatureId> {
        self.fittest
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale > 0.0 {
            self.config.simulation.time_scale = time_scale;
        }
    }

    pub fn status(&self) -> Status {
        Status {
            generation: self.generation,
            population: self.population.size(),
            elapsed: self.elapsed,
            time_scale: self.config.simulation.time_scale,
            fittest: self.fittest,
        }
    }

    /// Materialize the current generation if nothing is live yet
    pub fn start<H: Habitat>(&mut self, habitat: &mut H) {
        if self.records.is_empty() {
            self.materialize(habitat);
        }
    }

    /// Advance by `dt` unscaled seconds.
    ///
    /// Returns the finished generation's stats when this tick crossed the
    /// time limit. An error leaves the current generation in place.
    pub fn tick<H: Habitat>(&mut self, habitat: &mut H, dt: f32) -> Result<Option<GenerationStats>> {
        self.start(habitat);

        let dt = dt * self.config.simulation.time_scale;
        for (record, gait) in self.records.iter().zip(self.gaits.iter_mut()) {
            if let Some(forces) = gait.tick(dt, record.is_alive()) {
                habitat.actuate(record.id, &forces);
            }
        }
        habitat.step(dt);
        self.observe(habitat);

        self.elapsed += dt;
        if self.elapsed >= self.config.simulation.generation_time_limit {
            self.state = ControllerState::GenerationBoundary;
            let stats = self.boundary(habitat)?;
            self.state = ControllerState::Evaluating;
            return Ok(Some(stats));
        }

        self.track_fittest(habitat);
        Ok(None)
    }

    /// Tick with the configured tick length until one generation finishes
    pub fn run_generation<H: Habitat>(&mut self, habitat: &mut H) -> Result<GenerationStats> {
        let dt = self.config.simulation.tick_seconds;
        loop {
            if let Some(stats) = self.tick(habitat, dt)? {
                return Ok(stats);
            }
        }
    }

    /// Run `count` generations
    pub fn run<H: Habitat>(&mut self, habitat: &mut H, count: u64) -> Result<()> {
        for _ in 0..count {
            self.run_generation(habitat)?;
        }
        Ok(())
    }

    fn materialize<H: Habitat>(&mut self, habitat: &mut H) {
        let start = self.config.population.start_position;
        let target = self.config.population.target_position;
        let sim = &self.config.simulation;

        for genome in self.population.genomes() {
            let (id, state) = habitat.spawn(genome, start, target);
            self.records.push(CreatureRecord::new(id, genome.clone(), state));
            self.gaits
                .push(Gait::new(genome.schedule(), sim.step_interval, sim.global_thrust));
        }

        log::debug!(
            "Generation {} materialized: {} creatures",
            self.generation,
            self.records.len()
        );
    }

    fn observe<H: Habitat>(&mut self, habitat: &H) {
        for record in &mut self.records {
            match habitat.observe(record.id) {
                Some(state) => record.observe(state),
                None => log::trace!("Creature {} not found, keeping last state", record.id),
            }
        }
    }

    fn track_fittest<H: Habitat>(&mut self, habitat: &mut H) {
        if let Some(previous) = self.fittest.take() {
            habitat.highlight(previous, false);
        }
        self.fittest = fittest_record(&self.records).map(|r| r.id);
        if let Some(current) = self.fittest {
            habitat.highlight(current, true);
        }
    }

    fn boundary<H: Habitat>(&mut self, habitat: &mut H) -> Result<GenerationStats> {
        let ranked = self.population.snapshot_fitness(
            &self.records,
            self.engine.tie_break,
            &mut self.rng,
        )?;
        let offspring = self.engine.next_generation(&ranked, &mut self.rng)?;
        self.population.replace(offspring.genomes)?;

        let stats = GenerationStats::from_snapshot(
            self.generation,
            &ranked,
            &self.records,
            offspring.mutation.mutated.len(),
        );
        log::info!("{}", stats.summary());
        self.write_logs();
        self.history.record(stats.clone());

        if let Some(previous) = self.fittest.take() {
            habitat.highlight(previous, false);
        }
        habitat.clear();
        self.records.clear();
        self.gaits.clear();

        self.elapsed = 0.0;
        self.generation += 1;
        self.materialize(habitat);

        Ok(stats)
    }

    fn write_logs(&mut self) {
        let rows: Vec<LogRow> = self
            .records
            .iter()
            .map(|r| LogRow {
                generation: self.generation,
                fitness: r.fitness(),
                distance: r.distance_to_target(),
            })
            .collect();
        self.journal.record_generation(&rows);

        if let Some(best) = fittest_record(&self.records) {
            self.journal.record_fittest(&LogRow {
                generation: self.generation,
                fitness: best.fitness(),
                distance: best.distance_to_target(),
            });
        }
    }
}

/// Record with the highest fitness, first one on ties
pub fn fittest_record(records: &[CreatureRecord]) -> Option<&CreatureRecord> {
    let mut best: Option<(&CreatureRecord, f32)> = None;
    for record in records {
        let fitness = record.fitness();
        if best.map_or(true, |(_, top)| fitness > top) {
            best = Some((record, fitness));
        }
    }
    best.map(|(record, _)| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.population.population_count = 6;
        config.simulation.generation_time_limit = 2.0;
        config.simulation.tick_seconds = 0.0625;
        config
    }

    #[test]
    fn test_initial_state() {
        let controller = GenerationController::new_with_seed(small_config(), 1).unwrap();
        assert_eq!(controller.generation(), 1);
        assert_eq!(controller.state(), ControllerState::Evaluating);
        assert_eq!(controller.population().size(), 6);
        assert!(controller.records().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = small_config();
        config.population.population_count = 1;
        assert!(matches!(
            GenerationController::new_with_seed(config, 1),
            Err(EvolutionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_boundary_fires_once_per_window() {
        let config = small_config();
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 2).unwrap();

        let mut boundaries = Vec::new();
        // 2.0s window at 1/16s ticks: 32 ticks per generation
        for tick in 1..=100 {
            if controller.tick(&mut arena, 0.0625).unwrap().is_some() {
                boundaries.push(tick);
            }
        }

        assert_eq!(boundaries, vec![32, 64, 96]);
        assert_eq!(controller.generation(), 4);
        assert_eq!(arena.len(), 6);
        assert!(controller.elapsed() < 2.0);
    }

    #[test]
    fn test_time_scale_shortens_window() {
        let mut config = small_config();
        config.simulation.time_scale = 4.0;
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 3).unwrap();

        let mut ticks = 0;
        while controller.tick(&mut arena, 0.0625).unwrap().is_none() {
            ticks += 1;
        }
        // 2.0s / (0.0625s * 4) = 8 ticks, the 8th reaches the limit
        assert_eq!(ticks, 7);
    }

    #[test]
    fn test_population_size_is_constant() {
        let config = small_config();
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 4).unwrap();

        for _ in 0..3 {
            let stats = controller.run_generation(&mut arena).unwrap();
            assert_eq!(stats.population, 6);
            assert_eq!(controller.population().size(), 6);
            assert_eq!(controller.records().len(), 6);
        }
        assert_eq!(controller.history().snapshots.len(), 3);
    }

    #[test]
    fn test_exactly_one_highlight() {
        let config = small_config();
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 5).unwrap();

        for _ in 0..10 {
            controller.tick(&mut arena, 0.0625).unwrap();
            assert!(controller.fittest().is_some());
            assert_eq!(arena.highlighted(), controller.fittest());
        }
    }

    #[test]
    fn test_same_seed_same_evolution() {
        let config = small_config();
        let mut arena_a = Arena::from_config(&config);
        let mut arena_b = Arena::from_config(&config);
        let mut a = GenerationController::new_with_seed(config.clone(), 99).unwrap();
        let mut b = GenerationController::new_with_seed(config, 99).unwrap();

        a.run(&mut arena_a, 3).unwrap();
        b.run(&mut arena_b, 3).unwrap();

        assert_eq!(a.population().genomes(), b.population().genomes());
        assert_eq!(
            a.history().best_fitness_series(),
            b.history().best_fitness_series()
        );
    }

    #[test]
    fn test_checkpoint_resume() {
        let config = small_config();
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 6).unwrap();
        controller.run(&mut arena, 2).unwrap();

        let checkpoint = controller.create_checkpoint();
        let resumed = GenerationController::from_checkpoint(checkpoint).unwrap();

        assert_eq!(resumed.generation(), 3);
        assert_eq!(resumed.population().genomes(), controller.population().genomes());
        assert_eq!(resumed.history().snapshots.len(), 2);
        assert_eq!(resumed.seed(), 6);
    }

    #[test]
    fn test_status_and_time_scale() {
        let config = small_config();
        let mut arena = Arena::from_config(&config);
        let mut controller = GenerationController::new_with_seed(config, 7).unwrap();

        for _ in 0..3 {
            controller.tick(&mut arena, 0.0625).unwrap();
        }
        let status = controller.status();
        assert_eq!(status.generation, controller.generation());
        assert_eq!(status.population, 6);
        assert_eq!(status.elapsed, controller.elapsed());
        assert_eq!(status.elapsed, 0.1875);
        assert_eq!(status.time_scale, 1.0);
        assert_eq!(status.fittest, controller.fittest());
        assert!(status.fittest.is_some());

        controller.set_time_scale(2.0);
        controller.tick(&mut arena, 0.0625).unwrap();
        assert_eq!(controller.elapsed(), 0.3125);

        controller.set_time_scale(0.0);
        controller.set_time_scale(-1.0);
        assert_eq!(controller.status().time_scale, 2.0);
        controller.tick(&mut arena, 0.0625).unwrap();
        assert_eq!(controller.elapsed(), 0.4375);
    }

    #[test]
    fn test_fittest_record_first_on_ties() {
        use crate::creature::CreatureState;
        use crate::genetics::{Genome, GENOME_LENGTH};
        use nalgebra::Vector3;

        let state = CreatureState {
            position: Vector3::new(1.0, 0.0, 0.0),
            target: Vector3::zeros(),
            alive: true,
            step_reward: 0.2,
        };
        let records: Vec<_> = (0..3)
            .map(|i| CreatureRecord::new(CreatureId(i), Genome::new([0.0; GENOME_LENGTH]), state))
            .collect();

        assert_eq!(fittest_record(&records).map(|r| r.id), Some(CreatureId(0)));
        assert!(fittest_record(&[]).is_none());
    }
}
