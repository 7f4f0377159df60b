//! Structural and weight mutations of genomes.

use eyre::Result;
use rand::{seq::IndexedRandom, Rng};
use rand_distr::{Distribution, Normal};

use crate::{
	activation::Activation,
	context::Context,
	error::NeatError,
	genome::{Genome, NodeId},
	history::InnovNum,
	params::ReproductionParams,
};

/// Standard deviation of weight perturbations.
pub const WEIGHT_PERTURBATION: f64 = 0.2;

/// How many connections [`AddNode`] samples before giving up.
pub const MAX_SPLIT_ATTEMPTS: usize = 100;

/// A mutation applied to a whole genome with some probability.
pub trait Mutator {
	/// Probability of applying this mutation to a genome. Should be between 0..=1.
	fn rate(&self) -> f64;

	/// Unconditionally mutate the genome.
	fn mutate_genome(&self, ctx: &mut Context, genome: &mut Genome) -> Result<()>;

	/// Roll against [`Mutator::rate`], then mutate. Returns whether the mutation was attempted.
	fn mutate(&self, ctx: &mut Context, genome: &mut Genome) -> Result<bool> {
		if !ctx.rng.random_bool(self.rate()) {
			return Ok(false);
		}
		self.mutate_genome(ctx, genome)?;
		Ok(true)
	}
}

/// Touches every weight: either replaces it with a uniform draw from [-1, 1], or nudges it by
/// Gaussian noise and clamps it back into [-1, 1].
#[derive(Debug, Clone)]
pub struct WeightMutation {
	rate: f64,
	replacement_rate: f64,
}

impl WeightMutation {
	pub fn from_rate(rate: f64, replacement_rate: f64) -> Self {
		WeightMutation {
			rate,
			replacement_rate,
		}
	}
}

impl Mutator for WeightMutation {
	fn rate(&self) -> f64 {
		self.rate
	}

	fn mutate_genome(&self, ctx: &mut Context, genome: &mut Genome) -> Result<()> {
		let perturbation = Normal::new(0.0, WEIGHT_PERTURBATION)?;
		for connection in genome.connections_mut() {
			if ctx.rng.random_bool(self.replacement_rate) {
				connection.weight = ctx.rng.random_range(-1.0..=1.0);
			} else {
				connection.weight =
					(connection.weight + perturbation.sample(&mut ctx.rng)).clamp(-1.0, 1.0);
			}
		}
		Ok(())
	}
}

/// Adds a connection between two random, unconnected nodes of different layers.
#[derive(Debug, Clone)]
pub struct AddConnection {
	rate: f64,
}

impl AddConnection {
	pub fn from_rate(rate: f64) -> Self {
		AddConnection { rate }
	}
}

impl Mutator for AddConnection {
	fn rate(&self) -> f64 {
		self.rate
	}

	fn mutate_genome(&self, ctx: &mut Context, genome: &mut Genome) -> Result<()> {
		if genome.fully_connected() {
			log::debug!("Genome fully connected, skipping add-connection");
			return Ok(());
		}

		let ids: Vec<NodeId> = genome.nodes().map(|n| n.id).collect();
		let (from, to) = loop {
			let a = genome.node(*ids.choose(&mut ctx.rng).expect("genome has nodes"));
			let b = genome.node(*ids.choose(&mut ctx.rng).expect("genome has nodes"));
			if a.layer == b.layer {
				continue;
			}
			let (from, to) = if a.layer < b.layer { (a, b) } else { (b, a) };
			if !from.connected_to(to.id) {
				break (from.id, to.id);
			}
		};
		genome.add_connection(ctx, from, to, None);
		Ok(())
	}
}

/// Splits a random enabled connection with a new hidden node. The bias node's connections are
/// never split.
#[derive(Debug, Clone)]
pub struct AddNode {
	rate: f64,
	activation: Activation,
}

impl AddNode {
	pub fn from_rate(rate: f64, activation: Activation) -> Self {
		AddNode { rate, activation }
	}
}

impl Mutator for AddNode {
	fn rate(&self) -> f64 {
		self.rate
	}

	fn mutate_genome(&self, ctx: &mut Context, genome: &mut Genome) -> Result<()> {
		let bias = genome.bias();
		let genes: Vec<(NodeId, InnovNum, bool)> = genome
			.connections()
			.map(|c| (c.from, c.innovation, c.enabled))
			.collect();

		for _ in 0..MAX_SPLIT_ATTEMPTS {
			let Some(&(from, innovation, enabled)) = genes.choose(&mut ctx.rng) else {
				break;
			};
			if enabled && from != bias {
				genome.split_connection(ctx, from, innovation, self.activation);
				return Ok(());
			}
		}
		Err(NeatError::SplitAttemptsExhausted {
			attempts: MAX_SPLIT_ATTEMPTS,
		}
		.into())
	}
}

/// The three mutations, each rolled independently per offspring.
#[derive(Debug, Clone)]
pub struct MutationSet {
	pub weights: WeightMutation,
	pub connection: AddConnection,
	pub node: AddNode,
}

impl MutationSet {
	pub fn new(params: &ReproductionParams, hidden_activation: Activation) -> Self {
		MutationSet {
			weights: WeightMutation::from_rate(params.weights_rate, params.weight_replacement_rate),
			connection: AddConnection::from_rate(params.connection_rate),
			node: AddNode::from_rate(params.node_rate, hidden_activation),
		}
	}
}

impl Mutator for MutationSet {
	fn rate(&self) -> f64 {
		1.0
	}

	/// Exhausting split attempts only skips the add-node mutation.
	fn mutate_genome(&self, ctx: &mut Context, genome: &mut Genome) -> Result<()> {
		self.weights.mutate(ctx, genome)?;
		self.connection.mutate(ctx, genome)?;
		match self.node.mutate(ctx, genome) {
			Err(e) if matches!(e.downcast_ref::<NeatError>(), Some(NeatError::SplitAttemptsExhausted { .. })) => {
				log::warn!("Skipped add-node mutation: {e}");
				Ok(())
			}
			other => other.map(|_| ()),
		}
	}
}
