use eyre::Result;
use neat::{
	activation::Activation, context::Context, genome::Genome, params::SpeciesParams, prelude::*,
};

mod common;
use common::TestAgent;

fn species_of(genome: &Genome, fitnesses: &[f64]) -> Species<TestAgent> {
	let mut agents = fitnesses
		.iter()
		.map(|&f| TestAgent::with_fitness(genome.clone(), f));
	let mut species = Species::new(agents.next().expect("at least one fitness"));
	species.members.extend(agents);
	species
}

#[test]
fn identical_genome_is_compatible() -> Result<()> {
	let mut ctx = Context::new(0);
	let g = Genome::new(&mut ctx, 3, 2);
	let species = species_of(&g, &[1.0]);
	let params = SpeciesParams::default();

	assert_eq!(species.compatibility(&g, &params), 0.0);
	assert!(species.is_same_species(&g, &params));
	Ok(())
}

#[test]
fn excess_and_disjoint() -> Result<()> {
	let mut ctx = Context::new(0);
	let a = Genome::new(&mut ctx, 2, 1);
	let mut b = a.clone();
	b.split_connection(&mut ctx, NodeId(0), InnovNum(0), Activation::Sigmoid);
	let mut c = a.clone();
	c.split_connection(&mut ctx, NodeId(1), InnovNum(1), Activation::Sigmoid);

	assert_eq!(species_of(&a, &[1.0]).excess_and_disjoint(&b), (3, 0));
	assert_eq!(species_of(&b, &[1.0]).excess_and_disjoint(&a), (0, 0));
	assert_eq!(species_of(&c, &[1.0]).excess_and_disjoint(&b), (0, 3));

	// matching weights are untouched by splitting, and small genomes are not normalized
	let params = SpeciesParams::default();
	let rep = species_of(&c, &[1.0]);
	assert_eq!(rep.average_weight_difference(&b), 0.0);
	assert_eq!(rep.compatibility(&b, &params), 3.0);
	assert!(!rep.is_same_species(&b, &params), "threshold is exclusive");
	Ok(())
}

#[test]
fn no_matching_genes() -> Result<()> {
	let a = Genome::new(&mut Context::new(0), 2, 1);
	let mut ctx = Context::new(0);
	let mut b = Genome::new(&mut ctx, 2, 1);
	// renumber b's genes out of a's range
	for c in b.connections_mut() {
		c.innovation = InnovNum(*c.innovation + 10);
	}
	let species = species_of(&a, &[1.0]);
	assert_eq!(species.average_weight_difference(&b), 100.0);
	Ok(())
}

#[test]
fn rank_and_cull() -> Result<()> {
	let g = Genome::new(&mut Context::new(0), 1, 1);
	let mut species = species_of(&g, &[1.0, 5.0, 3.0, 2.0, 4.0]);
	species.rank();
	let order: Vec<f64> = species.members.iter().map(|m| m.fitness).collect();
	assert_eq!(order, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
	assert_eq!(species.champion().fitness, 5.0);

	species.cull(0.5);
	assert_eq!(species.size(), 2, "floor of half of 5");
	species.cull(1.0);
	assert_eq!(species.size(), 1, "champion always survives");
	assert_eq!(species.champion().fitness, 5.0);
	Ok(())
}

#[test]
fn fitness_sharing() -> Result<()> {
	let g = Genome::new(&mut Context::new(0), 1, 1);
	let mut species = species_of(&g, &[4.0, 2.0]);
	species.fitness_share();
	assert_eq!(species.members[0].adjusted, 2.0);
	assert_eq!(species.members[1].adjusted, 1.0);
	assert_eq!(species.total_adjusted_fitness(), 3.0);
	Ok(())
}

#[test]
fn staleness() -> Result<()> {
	let mut ctx = Context::new(0);
	let g = Genome::new(&mut ctx, 1, 1);
	let better = Genome::new(&mut ctx, 1, 1);
	let mut species = species_of(&g, &[2.0]);

	species.check_progress();
	assert_eq!((species.staleness, species.best_fitness), (0, 2.0));
	species.check_progress();
	species.check_progress();
	assert_eq!(species.staleness, 2);
	assert!(species.gone_stale(1));
	assert!(!species.gone_stale(2));

	species.members = vec![TestAgent::with_fitness(better.clone(), 3.0)];
	species.check_progress();
	assert_eq!((species.staleness, species.best_fitness), (0, 3.0));
	assert_eq!(
		serde_json::to_value(&species.representative)?,
		serde_json::to_value(&better)?
	);
	Ok(())
}
