//! Producing the next generation's agents from a species' survivors.

use eyre::Result;
use rand::Rng;

use crate::{
	context::Context,
	crossover::crossover,
	genetic::Agent,
	genome::Genome,
	mutations::{MutationSet, Mutator},
	params::{GenomeParams, ReproductionParams},
	selection::fitness_weighted_selection,
};

#[derive(Debug, Clone)]
pub struct Reproduction {
	input_count: usize,
	output_count: usize,
	crossover_rate: f64,
	disabled_rate: f64,
	mutations: MutationSet,
}

impl Reproduction {
	pub fn new(genome: &GenomeParams, params: &ReproductionParams) -> Self {
		Reproduction {
			input_count: genome.input_count,
			output_count: genome.output_count,
			crossover_rate: params.crossover_rate,
			disabled_rate: params.disabled_rate,
			mutations: MutationSet::new(params, genome.hidden_activation),
		}
	}

	pub fn new_genome(&self, ctx: &mut Context) -> Genome {
		Genome::new(ctx, self.input_count, self.output_count)
	}

	/// `total` agents with minimal genomes.
	pub fn new_agents<A: Agent>(&self, ctx: &mut Context, total: usize) -> Vec<A> {
		(0..total)
			.map(|_| A::from_genome(self.new_genome(ctx)))
			.collect()
	}

	/// Unevaluated copy of `agent`'s genome.
	pub fn clone_agent<A: Agent>(&self, agent: &A) -> A {
		A::from_genome(agent.genome().clone())
	}

	/// Breeds `total` mutated offspring from `parents`. Each child is a crossover of two
	/// fitness-weighted parents with probability `crossover_rate`, otherwise a copy of one.
	pub fn offspring<A: Agent>(&self, ctx: &mut Context, parents: &[A], total: usize) -> Result<Vec<A>> {
		let mut offspring = Vec::with_capacity(total);
		while offspring.len() < total {
			let mut genome = if ctx.rng.random_bool(self.crossover_rate) {
				let pair = fitness_weighted_selection(ctx, parents, 2)?;
				let (fitter, other) = if pair[0].fitness() >= pair[1].fitness() {
					(pair[0], pair[1])
				} else {
					(pair[1], pair[0])
				};
				crossover(ctx, fitter.genome(), other.genome(), self.disabled_rate)
			} else {
				let parent = fitness_weighted_selection(ctx, parents, 1)?[0];
				parent.genome().clone()
			};
			self.mutations.mutate(ctx, &mut genome)?;
			offspring.push(A::from_genome(genome));
		}
		Ok(offspring)
	}
}
