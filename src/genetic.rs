//! Traits connecting the engine to user code.

use eyre::Result;

use crate::{genome::Genome, species::Species};

/// An individual being evolved: a genome plus whatever the simulation attaches to it.
///
/// Fitness must be non-negative; higher is better.
pub trait Agent: Send + Sized {
	/// A fresh, unevaluated agent around `genome`.
	fn from_genome(genome: Genome) -> Self;

	fn genome(&self) -> &Genome;
	fn genome_mut(&mut self) -> &mut Genome;

	fn fitness(&self) -> f64;

	/// Fitness after sharing within its species.
	fn adjusted_fitness(&self) -> f64;
	fn set_adjusted_fitness(&mut self, adjusted: f64);

	/// Named values progress records can track next to `fitness`.
	fn observables(&self) -> Vec<(&'static str, f64)> {
		Vec::new()
	}
}

/// Hooks to record data during a run. Called once per generation, after speciation and fitness
/// sharing, with species ranked best first.
pub trait Results<A: Agent> {
	fn record_generation(&mut self, _generation: usize, _species: &[Species<A>]) -> Result<()> {
		Ok(())
	}

	fn finalize(&mut self, _generation: usize) -> Result<()> {
		Ok(())
	}
}

/// Records nothing.
impl<A: Agent> Results<A> for () {}
