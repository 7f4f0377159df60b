use eyre::Result;
use neat::{activation::Activation, context::Context, genome::Genome, prelude::*};

#[test]
fn same_structure_same_innovations() -> Result<()> {
	let mut ctx = Context::new(0);
	let a = Genome::new(&mut ctx, 2, 1);
	let b = Genome::new(&mut ctx, 2, 1);
	assert_eq!(a.innovations(), b.innovations());
	assert_eq!(ctx.history.len(), 3);
	Ok(())
}

#[test]
fn same_innovation_set_reuses_number() -> Result<()> {
	let mut ctx = Context::new(0);
	let a = Genome::new(&mut ctx, 2, 1);
	let b = Genome::new(&mut ctx, 2, 1);

	let first = ctx.history.innovation(&a, NodeId(0), NodeId(4));
	let again = ctx.history.innovation(&b, NodeId(0), NodeId(4));
	assert_eq!(first, again);
	assert_eq!(first, InnovNum(3));

	let record = ctx.history.get(first).expect("recorded");
	assert_eq!((record.from, record.to), (NodeId(0), NodeId(4)));
	assert_eq!(record.present, a.innovations());
	Ok(())
}

#[test]
fn different_innovation_set_new_number() -> Result<()> {
	let mut ctx = Context::new(0);
	let a = Genome::new(&mut ctx, 2, 1);
	let mut b = a.clone();
	let last = b.connections().last().expect("has connections").clone();
	b.split_connection(&mut ctx, last.from, last.innovation, Activation::Sigmoid);

	let before = ctx.history.len();
	let x = ctx.history.innovation(&a, NodeId(1), NodeId(3));
	let y = ctx.history.innovation(&b, NodeId(1), NodeId(3));
	assert_ne!(x, y, "b holds more innovations than a");
	assert_eq!(ctx.history.len(), before + 2);
	Ok(())
}

#[test]
fn parallel_splits_match() -> Result<()> {
	let mut ctx = Context::new(0);
	let mut a = Genome::new(&mut ctx, 2, 1);
	let mut b = a.clone();
	let first = a.connections().next().expect("has connections").innovation;

	let ha = a.split_connection(&mut ctx, NodeId(0), first, Activation::Sigmoid);
	let hb = b.split_connection(&mut ctx, NodeId(0), first, Activation::Sigmoid);
	assert_eq!(ha, hb);
	assert_eq!(a.innovations(), b.innovations());
	assert_eq!(ctx.history.len(), 6);
	Ok(())
}

#[test]
fn serialized_history_keeps_lookup() -> Result<()> {
	let mut ctx = Context::new(0);
	let a = Genome::new(&mut ctx, 2, 1);
	let json = serde_json::to_string(&ctx.history)?;
	let mut history: History = serde_json::from_str(&json)?;
	assert_eq!(history, ctx.history);

	// registered under an empty genome
	let fresh = Genome::new(&mut Context::new(1), 2, 1);
	assert_eq!(fresh.innovations(), a.innovations());
	let len = history.len();
	let id = history.innovation(&a, NodeId(0), NodeId(4));
	assert_eq!(history.len(), len + 1);
	assert_eq!(history.innovation(&fresh, NodeId(0), NodeId(4)), id);
	Ok(())
}
