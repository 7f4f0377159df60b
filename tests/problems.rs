use eyre::Result;
use neat::{
	prelude::*,
	problems::{Parity, Problem, ProblemSet, MAX_PARITY_BITS},
};

#[test]
fn problems_by_name() -> Result<()> {
	let xor = ProblemSet::from_name("xor")?;
	assert_eq!((xor.inputs(), xor.outputs()), (2, 1));
	let parity = ProblemSet::from_name("parity3")?;
	assert_eq!(parity.inputs(), 3);
	assert_eq!(parity.cases().len(), 8);
	assert!(ProblemSet::from_name("sum3").is_err());
	Ok(())
}

#[test]
fn parity_bits_are_bounded() {
	assert!(ProblemSet::from_name("parity0").is_err());
	assert!(ProblemSet::from_name("parity64").is_err());
	assert!(ProblemSet::from_name(&format!("parity{}", MAX_PARITY_BITS + 1)).is_err());
	assert!(Parity::new(MAX_PARITY_BITS).is_ok());
	assert!(serde_json::from_str::<Parity>(r#"{"bits": 200}"#).is_err());
}

#[test]
fn mismatched_networks_are_rejected() -> Result<()> {
	let parity = ProblemSet::from_name("parity3")?;
	assert!(parity.check_shape(3, 1).is_ok());

	let mut ctx = Context::new(1);
	let genome = Genome::new(&mut ctx, 2, 1);
	let err = parity
		.check_shape(genome.input_count(), genome.output_count())
		.expect_err("xor sized network");
	assert!(err.to_string().contains("parity3"));
	Ok(())
}
