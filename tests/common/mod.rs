#![allow(dead_code)]

use std::{fs, path::PathBuf};

use neat::{
	genetic::Agent,
	genome::Genome,
	params::{GenomeParams, NeatParams, PopulationParams},
};

#[derive(Debug, Clone)]
pub struct TestAgent {
	pub genome: Genome,
	pub fitness: f64,
	pub adjusted: f64,
}

impl TestAgent {
	pub fn with_fitness(genome: Genome, fitness: f64) -> Self {
		TestAgent {
			genome,
			fitness,
			adjusted: 0.0,
		}
	}
}

impl Agent for TestAgent {
	fn from_genome(genome: Genome) -> Self {
		TestAgent::with_fitness(genome, 0.0)
	}

	fn genome(&self) -> &Genome {
		&self.genome
	}

	fn genome_mut(&mut self) -> &mut Genome {
		&mut self.genome
	}

	fn fitness(&self) -> f64 {
		self.fitness
	}

	fn adjusted_fitness(&self) -> f64 {
		self.adjusted
	}

	fn set_adjusted_fitness(&mut self, adjusted: f64) {
		self.adjusted = adjusted;
	}

	fn observables(&self) -> Vec<(&'static str, f64)> {
		vec![("connections", self.genome.connection_count() as f64)]
	}
}

pub fn params(inputs: usize, outputs: usize, size: usize) -> NeatParams {
	NeatParams::builder()
		.seed(42)
		.generations(5)
		.genome(
			GenomeParams::builder()
				.input_count(inputs)
				.output_count(outputs)
				.build(),
		)
		.population(PopulationParams::builder().size(size).build())
		.build()
}

/// Fresh, empty folder under the system temp dir.
pub fn temp_folder(name: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("neat-{name}-{}", std::process::id()));
	let _ = fs::remove_dir_all(&dir);
	dir
}
