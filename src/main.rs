use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::Result;
use neat::{
	params::{GenomeParams, PopulationParams},
	playback::Playback,
	prelude::*,
	problems::{Problem, ProblemAgent, ProblemSet},
	progress::ProgressRecorder,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
	#[command(subcommand)]
	pub command: Command,

	/// Problem to evolve networks for (xor, parity3, ...)
	#[arg(short = 'p', long = "problem", global = true)]
	pub problem: Option<String>,

	/// Generation cutoff, overriding the settings
	#[arg(short = 'g', long = "gens", global = true)]
	pub num_generations: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Start a new run
	Run {
		/// Seed for the run
		#[arg(short = 's', long = "seed")]
		seed: Option<u64>,

		/// Settings file
		#[arg(short = 'F', long = "config")]
		config: Option<PathBuf>,

		/// Population size
		#[arg(long = "popsize")]
		pop_size: Option<usize>,

		/// Folder to save the population into every generation
		#[arg(short = 'o', long = "save")]
		save_folder: Option<PathBuf>,
	},
	/// Resume a saved population
	Resume {
		/// Folder the population was saved into
		#[arg(short = 'f', long = "folder")]
		folder: PathBuf,
	},
	/// Evaluate the genomes saved by playback for one generation
	Playback {
		/// Playback folder
		#[arg(short = 'f', long = "folder")]
		folder: PathBuf,

		/// Generation to replay
		#[arg(short = 'G', long = "generation")]
		generation: usize,
	},
}

/// Helper to construct base params from CLI args
fn base_params(problem: &ProblemSet, seed: Option<u64>, pop_size: Option<usize>) -> NeatParams {
	NeatParams::builder()
		.seed(seed.unwrap_or_else(|| u64::from(rand::random::<u32>())))
		.genome(
			GenomeParams::builder()
				.input_count(problem.inputs())
				.output_count(problem.outputs())
				.build(),
		)
		.population(
			PopulationParams::builder()
				.size(pop_size.unwrap_or(150))
				.build(),
		)
		.build()
}

fn evolve(population: &mut Population<ProblemAgent>, problem: &ProblemSet) -> Result<()> {
	let mut recorder = ProgressRecorder::new(&population.params.progress, population.generation())?;
	population.run(|agent: ProblemAgent| agent.evaluate(problem), &mut recorder)?;

	if let Some(best) = population.best_genome() {
		let mut best = best.clone();
		log::info!(
			"Best genome ({}, fitness {:.5}):\n{best}",
			if problem.solved(&mut best) { "solved" } else { "unsolved" },
			problem.fitness(&mut best),
		);
	}
	Ok(())
}

fn replay(folder: &Path, generation: usize, problem: &ProblemSet) -> Result<()> {
	let playback = Playback::load(folder, generation)?;
	println!("Generation {generation}: {} species", playback.species_count());
	for (i, genomes) in playback.iter_species().enumerate() {
		for (rank, genome) in genomes.iter().enumerate() {
			problem.check_shape(genome.input_count(), genome.output_count())?;
			let mut genome = genome.clone();
			println!(
				"species {i} #{rank}: fitness {:.5}{}",
				problem.fitness(&mut genome),
				if problem.solved(&mut genome) { " (solved)" } else { "" }
			);
			for (input, expected) in problem.cases() {
				println!("\t{input:?} -> {:.3?} (expected {expected:?})", genome.propagate(input));
			}
		}
	}
	Ok(())
}

fn main() -> eyre::Result<()> {
	pretty_env_logger::init();

	let cli = Cli::parse();
	let problem = ProblemSet::from_name(cli.problem.as_deref().unwrap_or("xor"))?;

	match &cli.command {
		Command::Run {
			seed,
			config,
			pop_size,
			save_folder,
		} => {
			let mut params = match config {
				Some(path) => NeatParams::load(path)?,
				None => base_params(&problem, *seed, *pop_size),
			};
			if let Some(seed) = seed {
				params.seed = *seed;
			}
			if let Some(size) = pop_size {
				params.population.size = *size;
			}
			if let Some(gens) = cli.num_generations {
				params.generations = gens;
			}
			if save_folder.is_some() {
				params.population.save_folder = save_folder.clone();
			}
			problem.check_shape(params.genome.input_count, params.genome.output_count)?;
			let mut population = Population::new(params)?;
			evolve(&mut population, &problem)
		}
		Command::Resume { folder } => {
			let mut population = Population::load(folder)?;
			let genome = &population.params.genome;
			problem.check_shape(genome.input_count, genome.output_count)?;
			if let Some(gens) = cli.num_generations {
				population.params.generations = gens;
			}
			evolve(&mut population, &problem)
		}
		Command::Playback { folder, generation } => replay(folder, *generation, &problem),
	}
}
