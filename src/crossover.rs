//! Recombination of two parent genomes.

use std::collections::HashMap;

use rand::Rng;

use crate::{
	context::Context,
	genome::{Connection, Genome},
	history::InnovNum,
};

/// Builds a child from two parents, `fitter` being the one with the higher (or equal) fitness.
///
/// The child takes every node of the fitter parent. Matching genes (same innovation number) take
/// their weight from either parent with equal probability; excess and disjoint genes come from
/// the fitter parent only. Genes start out enabled, but a matching gene disabled in either parent
/// is disabled in the child with probability `disabled_rate`.
pub fn crossover(ctx: &mut Context, fitter: &Genome, other: &Genome, disabled_rate: f64) -> Genome {
	let mut child = fitter.without_connections();
	let matching: HashMap<InnovNum, &Connection> =
		other.connections().map(|c| (c.innovation, c)).collect();

	for gene in fitter.connections() {
		let (weight, enabled) = match matching.get(&gene.innovation) {
			Some(&theirs) => {
				let disable =
					(!gene.enabled || !theirs.enabled) && ctx.rng.random_bool(disabled_rate);
				let weight = if ctx.rng.random_bool(0.5) {
					gene.weight
				} else {
					theirs.weight
				};
				(weight, !disable)
			}
			None => (gene.weight, true),
		};
		child.push_connection(Connection {
			weight,
			enabled,
			..gene.clone()
		});
	}
	child
}
