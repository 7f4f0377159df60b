//! Benchmark problems for the command line: evolving networks that reproduce a truth table.

mod parity;
mod xor;

use derive_more::{Display, From};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};

pub use parity::{Parity, MAX_PARITY_BITS};
pub use xor::Xor;

use crate::{genetic::Agent, genome::Genome};

/// A task a network is evaluated on.
pub trait Problem: Sync {
	fn name(&self) -> String;

	fn inputs(&self) -> usize;
	fn outputs(&self) -> usize;

	/// Input-output pairs the network is tested against.
	fn cases(&self) -> &[(Vec<f64>, Vec<f64>)];

	/// Squared closeness to the expected outputs over all cases, in [0, n²] for n outputs
	/// in total. Always non-negative.
	fn fitness(&self, genome: &mut Genome) -> f64 {
		let cases = self.cases();
		let total = (cases.len() * self.outputs()) as f64;
		let error: f64 = cases
			.iter()
			.map(|(input, expected)| {
				genome
					.propagate(input)
					.iter()
					.zip(expected)
					.map(|(out, exp)| (out - exp).abs())
					.sum::<f64>()
			})
			.sum();
		(total - error).max(0.0).powi(2)
	}

	/// Fails unless networks of `inputs` inputs and `outputs` outputs fit this problem.
	fn check_shape(&self, inputs: usize, outputs: usize) -> Result<()> {
		if (inputs, outputs) != (self.inputs(), self.outputs()) {
			return Err(eyre!(
				"networks have {inputs} inputs and {outputs} outputs, but {} needs {} and {}",
				self.name(),
				self.inputs(),
				self.outputs()
			));
		}
		Ok(())
	}

	/// Whether every output rounds to the expected value.
	fn solved(&self, genome: &mut Genome) -> bool {
		self.cases().iter().all(|(input, expected)| {
			genome
				.propagate(input)
				.iter()
				.zip(expected)
				.all(|(out, exp)| (out - exp).abs() < 0.5)
		})
	}
}

#[derive(Debug, Clone, Display, From, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum ProblemSet {
	Xor(Xor),
	Parity(Parity),
}

impl ProblemSet {
	/// `xor`, or `parity<bits>` such as `parity3`.
	pub fn from_name(name: &str) -> Result<Self> {
		match name {
			"xor" => Ok(Xor::new().into()),
			_ => match name.strip_prefix("parity").map(str::parse::<usize>) {
				Some(Ok(bits)) => Ok(Parity::new(bits)?.into()),
				_ => Err(eyre!("Unknown problem '{name}' (expected xor or parity<bits>)")),
			},
		}
	}

	fn inner(&self) -> &dyn Problem {
		match self {
			ProblemSet::Xor(p) => p,
			ProblemSet::Parity(p) => p,
		}
	}
}

impl Problem for ProblemSet {
	fn name(&self) -> String {
		self.inner().name()
	}

	fn inputs(&self) -> usize {
		self.inner().inputs()
	}

	fn outputs(&self) -> usize {
		self.inner().outputs()
	}

	fn cases(&self) -> &[(Vec<f64>, Vec<f64>)] {
		self.inner().cases()
	}
}

/// Agent evaluated on a [`Problem`].
#[derive(Debug, Clone)]
pub struct ProblemAgent {
	genome: Genome,
	fitness: f64,
	adjusted_fitness: f64,
}

impl ProblemAgent {
	pub fn evaluate(mut self, problem: &impl Problem) -> Self {
		self.fitness = problem.fitness(&mut self.genome);
		self
	}
}

impl Agent for ProblemAgent {
	fn from_genome(genome: Genome) -> Self {
		ProblemAgent {
			genome,
			fitness: 0.0,
			adjusted_fitness: 0.0,
		}
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
		self.adjusted_fitness
	}

	fn set_adjusted_fitness(&mut self, adjusted: f64) {
		self.adjusted_fitness = adjusted;
	}

	fn observables(&self) -> Vec<(&'static str, f64)> {
		vec![
			("nodes", self.genome.node_count() as f64),
			(
				"connections",
				self.genome.connections().filter(|c| c.enabled).count() as f64,
			),
		]
	}
}
