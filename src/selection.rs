//! Parent selection.

use eyre::Result;
use rand::distr::{
	weighted::{Error as WeightError, WeightedIndex},
	Distribution,
};

use crate::{context::Context, error::NeatError, genetic::Agent};

/// Draws `total` parents with replacement, each with probability proportional to its fitness.
///
/// Fails with [`NeatError::NoPositiveFitness`] when no parent has a strictly positive fitness.
pub fn fitness_weighted_selection<'a, A: Agent>(
	ctx: &mut Context,
	parents: &'a [A],
	total: usize,
) -> Result<Vec<&'a A>> {
	if total == 0 {
		return Ok(Vec::new());
	}
	let weights = WeightedIndex::new(parents.iter().map(Agent::fitness)).map_err(|e| match e {
		WeightError::InsufficientNonZero => NeatError::NoPositiveFitness,
		other => NeatError::Sampling(other.to_string()),
	})?;
	Ok((0..total)
		.map(|_| &parents[weights.sample(&mut ctx.rng)])
		.collect())
}
