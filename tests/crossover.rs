use eyre::Result;
use neat::{activation::Activation, context::Context, crossover::crossover, genome::Genome, prelude::*};

/// A minimal genome and a copy with its first connection split.
fn parents(ctx: &mut Context) -> (Genome, Genome) {
	let mut a = Genome::new(ctx, 2, 1);
	for c in a.connections_mut() {
		c.weight = 0.5;
	}
	let mut b = a.clone();
	for c in b.connections_mut() {
		c.weight = -0.5;
	}
	let first = b.connections().next().expect("has connections").innovation;
	b.split_connection(ctx, NodeId(0), first, Activation::Sigmoid);
	(a, b)
}

#[test]
fn child_takes_fitter_structure() -> Result<()> {
	let mut ctx = Context::new(1);
	let (a, b) = parents(&mut ctx);

	let child = crossover(&mut ctx, &a, &b, 0.0);
	assert_eq!(child.node_count(), a.node_count());
	assert_eq!(child.innovations(), a.innovations());
	assert!(child.connections().all(|c| c.enabled));
	assert!(child
		.connections()
		.all(|c| c.weight == 0.5 || c.weight == -0.5));
	Ok(())
}

#[test]
fn excess_genes_from_fitter_parent() -> Result<()> {
	let mut ctx = Context::new(1);
	let (a, b) = parents(&mut ctx);

	let child = crossover(&mut ctx, &b, &a, 0.0);
	assert_eq!(child.node_count(), b.node_count());
	assert_eq!(child.innovations(), b.innovations());
	assert_eq!(child.layers(), b.layers());
	assert!(child.connections().all(|c| c.enabled), "no disabling at rate 0");

	// genes only b has keep b's weights
	let shared = a.innovations();
	for c in child.connections().filter(|c| !shared.contains(&c.innovation)) {
		let theirs = b.connection(c.innovation).expect("from b");
		assert_eq!(c.weight, theirs.weight);
	}
	Ok(())
}

#[test]
fn disabled_genes_stay_disabled() -> Result<()> {
	let mut ctx = Context::new(1);
	let (a, b) = parents(&mut ctx);
	let split = b.connections().find(|c| !c.enabled).expect("b has a split gene").innovation;

	let child = crossover(&mut ctx, &b, &a, 1.0);
	assert!(!child.connection(split).expect("matching gene").enabled);
	assert_eq!(child.connections().filter(|c| !c.enabled).count(), 1);
	Ok(())
}

#[test]
fn identical_parents() -> Result<()> {
	let mut ctx = Context::new(1);
	let (_, b) = parents(&mut ctx);
	let mut child = crossover(&mut ctx, &b, &b, 1.0);
	let mut parent = b.clone();
	assert_eq!(
		serde_json::to_value(&child)?,
		serde_json::to_value(&parent)?
	);
	assert_eq!(child.propagate(&[1.0, 1.0]), parent.propagate(&[1.0, 1.0]));
	Ok(())
}
