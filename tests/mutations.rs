use eyre::Result;
use neat::{
	activation::Activation,
	context::Context,
	genome::Genome,
	mutations::{AddConnection, AddNode, MutationSet, Mutator, WeightMutation},
	params::ReproductionParams,
	prelude::*,
};

#[test]
fn weights_stay_in_range() -> Result<()> {
	let mut ctx = Context::new(11);
	let mut g = Genome::new(&mut ctx, 4, 3);
	for c in g.connections_mut() {
		c.weight = 0.99;
	}
	let m = WeightMutation::from_rate(1.0, 0.0);
	for _ in 0..50 {
		assert!(m.mutate(&mut ctx, &mut g)?);
	}
	assert!(g.connections().all(|c| (-1.0..=1.0).contains(&c.weight)));
	assert!(g.connections().any(|c| c.weight != 0.99));
	Ok(())
}

#[test]
fn zero_rate_never_mutates() -> Result<()> {
	let mut ctx = Context::new(11);
	let mut g = Genome::new(&mut ctx, 2, 1);
	let before: Vec<f64> = g.connections().map(|c| c.weight).collect();
	let m = WeightMutation::from_rate(0.0, 1.0);
	assert!(!m.mutate(&mut ctx, &mut g)?);
	let after: Vec<f64> = g.connections().map(|c| c.weight).collect();
	assert_eq!(before, after);
	Ok(())
}

#[test]
fn add_node() -> Result<()> {
	let mut ctx = Context::new(5);
	let mut g = Genome::new(&mut ctx, 3, 2);
	AddNode::from_rate(1.0, Activation::ReLU).mutate_genome(&mut ctx, &mut g)?;

	assert_eq!(g.node_count(), 7);
	assert_eq!(g.connection_count(), 11);
	assert_eq!(g.connections().filter(|c| !c.enabled).count(), 1);
	let split = g.connections().find(|c| !c.enabled).expect("one disabled");
	assert_ne!(split.from, g.bias(), "bias connections are never split");
	assert!(g.nodes().any(|n| n.activation == Activation::ReLU));
	Ok(())
}

#[test]
fn add_node_needs_enabled_non_bias_connection() -> Result<()> {
	let mut ctx = Context::new(5);
	let mut g = Genome::new(&mut ctx, 1, 1);
	let bias = g.bias();
	for c in g.connections_mut() {
		if c.from != bias {
			c.enabled = false;
		}
	}

	let err = AddNode::from_rate(1.0, Activation::Sigmoid)
		.mutate_genome(&mut ctx, &mut g)
		.expect_err("only the bias connection is enabled");
	assert!(matches!(
		err.downcast_ref::<NeatError>(),
		Some(NeatError::SplitAttemptsExhausted { .. })
	));

	// tolerated as part of a full mutation pass
	let params = ReproductionParams::builder()
		.weights_rate(0.0)
		.connection_rate(0.0)
		.node_rate(1.0)
		.build();
	MutationSet::new(&params, Activation::Sigmoid).mutate(&mut ctx, &mut g)?;
	assert_eq!(g.node_count(), 3);
	Ok(())
}

#[test]
fn add_connection_until_full() -> Result<()> {
	let mut ctx = Context::new(9);
	let mut g = Genome::new(&mut ctx, 2, 1);
	let first = g.connections().next().expect("has connections").innovation;
	let hidden = g.split_connection(&mut ctx, NodeId(0), first, Activation::Sigmoid);
	assert!(!g.fully_connected());

	let m = AddConnection::from_rate(1.0);
	m.mutate_genome(&mut ctx, &mut g)?;
	assert_eq!(g.connection_count(), 7);
	assert!(g.node(NodeId(1)).connected_to(hidden));
	assert!(g.fully_connected());

	m.mutate_genome(&mut ctx, &mut g)?;
	assert_eq!(g.connection_count(), 7, "nothing left to connect");
	Ok(())
}

#[test]
fn new_connections_run_forward() -> Result<()> {
	let mut ctx = Context::new(21);
	let mut g = Genome::new(&mut ctx, 3, 2);
	let node = AddNode::from_rate(1.0, Activation::Sigmoid);
	let connection = AddConnection::from_rate(1.0);
	for _ in 0..10 {
		node.mutate_genome(&mut ctx, &mut g)?;
		connection.mutate_genome(&mut ctx, &mut g)?;
	}
	for c in g.connections() {
		assert!(g.node(c.from).layer < g.node(c.to).layer);
	}
	// outputs still come last
	let last: Vec<NodeId> = g.nodes().skip(g.node_count() - 2).map(|n| n.id).collect();
	assert_eq!(last, vec![NodeId(4), NodeId(5)]);
	Ok(())
}
