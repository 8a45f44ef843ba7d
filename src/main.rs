//! BLOCKMONSTERS - CLI Entry Point
//!
//! Runs the evolution loop headless in the bundled arena.

use blockmonsters::checkpoint::{Checkpoint, CheckpointManager};
use blockmonsters::journal::Journal;
use blockmonsters::{benchmark, Arena, Config, GenerationController};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "blockmonsters")]
#[command(version)]
#[command(about = "Evolves block creatures that walk toward a target")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new evolution
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to evolve
        #[arg(short, long, default_value = "50")]
        generations: u64,

        /// Output directory for record streams and checkpoints
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume evolution from checkpoint
    Resume {
        /// Checkpoint file to resume from (latest in the output directory if omitted)
        #[arg(short, long)]
        checkpoint: Option<PathBuf>,

        /// Number of additional generations
        #[arg(short, long, default_value = "50")]
        generations: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "5")]
        generations: u64,

        /// Population size
        #[arg(short, long, default_value = "100")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a checkpoint file
    Analyze {
        /// Checkpoint file
        checkpoint: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match &cli.command {
        Commands::Run { config, .. } if config.exists() => Config::from_file(config)
            .map(|c| c.logging.log_level)
            .unwrap_or_else(|_| "info".to_string()),
        _ => "info".to_string(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run {
            config,
            generations,
            output,
            seed,
            quiet,
        } => run_evolution(config, generations, output, seed, quiet),

        Commands::Resume {
            checkpoint,
            generations,
            output,
        } => resume_evolution(checkpoint, generations, output),

        Commands::Benchmark {
            generations,
            population,
        } => run_benchmark(generations, population),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { checkpoint } => analyze_checkpoint(checkpoint),
    }
}

fn run_evolution(
    config_path: PathBuf,
    generations: u64,
    output: Option<PathBuf>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };
    if let Some(dir) = output {
        config.logging.output_dir = dir.to_string_lossy().to_string();
    }

    let controller = match seed {
        Some(s) => {
            println!("Using seed: {}", s);
            GenerationController::new_with_seed(config.clone(), s)?
        }
        None => GenerationController::new(config.clone())?,
    };

    println!("Starting evolution");
    println!("  Population: {}", config.population.population_count);
    println!("  Generation time: {}s", config.simulation.generation_time_limit);
    println!("  Mutation probability: {}", config.evolution.mutation_probability);
    println!("  Generations: {}", generations);
    println!();

    evolve(controller, generations, quiet, false)
}

fn resume_evolution(
    checkpoint_path: Option<PathBuf>,
    generations: u64,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let checkpoint_path = match checkpoint_path {
        Some(path) => path,
        None => {
            let manager = CheckpointManager::new(output.to_string_lossy().to_string(), 0, 0);
            let latest = manager.find_latest().ok_or_else(|| {
                format!("No checkpoint found in {:?}", output)
            })?;
            PathBuf::from(latest)
        }
    };
    println!("Loading checkpoint: {:?}", checkpoint_path);

    let mut checkpoint = Checkpoint::load(&checkpoint_path)?;
    checkpoint.config.logging.output_dir = output.to_string_lossy().to_string();
    let controller = GenerationController::from_checkpoint(checkpoint)?;

    println!("Resumed at generation {}", controller.generation());
    println!("Running {} additional generations", generations);
    println!();

    evolve(controller, generations, false, true)
}

fn evolve(
    controller: GenerationController,
    generations: u64,
    quiet: bool,
    resumed: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let logging = controller.config().logging.clone();
    std::fs::create_dir_all(&logging.output_dir)?;

    let journal = if resumed {
        Journal::resume_from_config(&logging)
    } else {
        Journal::from_config(&logging)
    };
    let mut controller = controller.with_journal(journal);
    let mut arena = Arena::from_config(controller.config());
    let mut checkpoint_mgr = CheckpointManager::new(
        logging.output_dir.clone(),
        logging.checkpoint_interval,
        10, // Keep last 10 checkpoints
    );

    let start = Instant::now();
    for _ in 0..generations {
        let stats = controller.run_generation(&mut arena)?;
        if !quiet {
            println!("{}", stats.summary());
        }

        if checkpoint_mgr.should_save(controller.generation()) {
            match checkpoint_mgr.save(&controller.create_checkpoint()) {
                Ok(path) => log::debug!("Checkpoint saved: {}", path),
                Err(e) => log::warn!("Checkpoint failed: {}", e),
            }
        }
    }
    let elapsed = start.elapsed();

    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", generations);
    println!("Next generation: {}", controller.generation());
    if let Some(best) = controller.history().best_ever() {
        println!(
            "Best fitness: {:.3} (generation {}, {:.2} from target)",
            best.best_fitness, best.generation, best.best_distance
        );
    }

    let output = PathBuf::from(&logging.output_dir);
    let final_path = output.join("checkpoint_final.bin");
    controller.create_checkpoint().save(&final_path)?;
    println!("Final checkpoint: {:?}", final_path);

    let stats_path = output.join("stats_history.json");
    controller
        .history()
        .save(&stats_path.to_string_lossy())?;
    println!("Stats history: {:?}", stats_path);

    Ok(())
}

fn run_benchmark(generations: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== BLOCKMONSTERS Benchmark ===");
    println!("Generations: {}", generations);
    println!("Population: {}", population);
    println!();

    let result = benchmark(generations, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_checkpoint(checkpoint_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Checkpoint Analysis ===");
    println!("File: {:?}", checkpoint_path);
    println!();

    let checkpoint = Checkpoint::load(&checkpoint_path)?;

    println!("Generation: {}", checkpoint.generation);
    println!("Population: {}", checkpoint.genomes.len());
    println!("Seed: {}", checkpoint.random_seed);
    println!();

    let history = &checkpoint.history;
    println!("Recorded generations: {}", history.snapshots.len());
    if let Some(best) = history.best_ever() {
        println!(
            "Best fitness: {:.3} at generation {} ({:.2} from target)",
            best.best_fitness, best.generation, best.best_distance
        );
    }
    if let Some(latest) = history.latest() {
        println!("Latest: {}", latest.summary());
    }
    let means = history.mean_fitness_series();
    if !means.is_empty() {
        let first = means[0];
        let last = means[means.len() - 1];
        println!(
            "Mean fitness: {:.3} (generation {}) -> {:.3} (generation {})",
            first.1, first.0, last.1, last.0
        );
    }

    // Per-position spread of the stored genomes
    if !checkpoint.genomes.is_empty() {
        println!();
        println!("Gene means:");
        let n = checkpoint.genomes.len() as f32;
        let means: Vec<String> = (0..blockmonsters::genetics::GENOME_LENGTH)
            .map(|i| {
                let mean = checkpoint.genomes.iter().map(|g| g[i]).sum::<f32>() / n;
                format!("{:.2}", mean)
            })
            .collect();
        for (phase, chunk) in means.chunks(9).enumerate() {
            println!("  phase {}: {}", phase, chunk.join(" "));
        }
    }

    println!();
    println!(
        "Checkpoint size: {:.2} KB",
        checkpoint.size_bytes() as f64 / 1_000.0
    );

    Ok(())
}
