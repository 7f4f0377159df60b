use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{genetic::Agent, genome::Genome, history::InnovNum, params::SpeciesParams};

/// Connection count above which the compatibility distance is normalized by genome size.
const NORMALIZE_THRESHOLD: usize = 20;

/// Average weight difference used when two genomes share no gene at all.
const NO_MATCH_WEIGHT_DIFFERENCE: f64 = 100.0;

/// A niche of structurally similar agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Species<A> {
	/// genome new agents are compared against
	pub representative: Genome,
	/// current members, best first once ranked
	#[serde(skip)]
	pub members: Vec<A>,
	/// generations since the champion last improved
	pub staleness: usize,
	/// best champion fitness seen so far
	pub best_fitness: f64,
}

impl<A: Agent> Species<A> {
	pub fn new(founder: A) -> Self {
		Species {
			representative: founder.genome().clone(),
			members: vec![founder],
			staleness: 0,
			best_fitness: 0.0,
		}
	}

	pub fn size(&self) -> usize {
		self.members.len()
	}

	/// Best member. Only valid on a ranked, non-empty species.
	pub fn champion(&self) -> &A {
		self.members.first().expect("species has members")
	}

	pub fn total_adjusted_fitness(&self) -> f64 {
		self.members.iter().map(Agent::adjusted_fitness).sum()
	}

	pub fn gone_stale(&self, max_staleness: usize) -> bool {
		self.staleness > max_staleness
	}

	/// Counts genes of `genome` missing from the representative: excess beyond its highest
	/// innovation number, disjoint within it.
	pub fn excess_and_disjoint(&self, genome: &Genome) -> (usize, usize) {
		let known = self.representative.innovations();
		let highest = known.last().copied();
		genome
			.connections()
			.filter(|c| !known.contains(&c.innovation))
			.fold((0, 0), |(excess, disjoint), c| match highest {
				Some(highest) if c.innovation < highest => (excess, disjoint + 1),
				_ => (excess + 1, disjoint),
			})
	}

	/// Mean absolute weight difference over matching genes.
	pub fn average_weight_difference(&self, genome: &Genome) -> f64 {
		let weights: HashMap<InnovNum, f64> = self
			.representative
			.connections()
			.map(|c| (c.innovation, c.weight))
			.collect();
		let (total, matching) = genome
			.connections()
			.filter_map(|c| weights.get(&c.innovation).map(|w| (c.weight - w).abs()))
			.fold((0.0, 0usize), |(total, n), d| (total + d, n + 1));
		if matching == 0 {
			return NO_MATCH_WEIGHT_DIFFERENCE;
		}
		total / matching as f64
	}

	pub fn compatibility(&self, genome: &Genome, params: &SpeciesParams) -> f64 {
		let (excess, disjoint) = self.excess_and_disjoint(genome);
		let normalizer = self
			.representative
			.connection_count()
			.saturating_sub(NORMALIZE_THRESHOLD)
			.max(1) as f64;
		(params.excess_coefficient * excess as f64 + params.disjoint_coefficient * disjoint as f64)
			/ normalizer
			+ params.weight_difference_coefficient * self.average_weight_difference(genome)
	}

	pub fn is_same_species(&self, genome: &Genome, params: &SpeciesParams) -> bool {
		self.compatibility(genome, params) < params.compatibility_threshold
	}

	/// Sorts members by fitness, best first. Ties keep their order.
	pub fn rank(&mut self) {
		self.members
			.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
	}

	/// Resets staleness and adopts the champion as representative when it beats the best
	/// fitness so far; otherwise the species grows staler.
	pub fn check_progress(&mut self) {
		let champion = self.champion();
		if champion.fitness() > self.best_fitness {
			let (fitness, genome) = (champion.fitness(), champion.genome().clone());
			self.best_fitness = fitness;
			self.representative = genome;
			self.staleness = 0;
		} else {
			self.staleness += 1;
		}
	}

	/// Explicit fitness sharing: every member's fitness divided by the species size.
	pub fn fitness_share(&mut self) {
		let size = self.size() as f64;
		for member in &mut self.members {
			let adjusted = member.fitness() / size;
			member.set_adjusted_fitness(adjusted);
		}
	}

	/// Drops the worst `fraction` of a ranked species, always keeping at least the champion.
	pub fn cull(&mut self, fraction: f64) {
		let keep = (((1.0 - fraction) * self.size() as f64) as usize).max(1);
		self.members.truncate(keep);
	}
}
