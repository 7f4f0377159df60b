use eyre::Result;
use neat::{
	params::{defaults, NeatParams, ReproductionParams, SpeciesParams},
	prelude::*,
};

mod common;

const MINIMAL: &str = r#"
seed = 7

[genome]
input_count = 2
output_count = 1

[population]
size = 50
"#;

fn expect_error(toml: &str) -> NeatError {
	let err = NeatParams::from_toml(toml).expect_err("invalid settings");
	err.downcast::<NeatError>().expect("typed error")
}

#[test]
fn minimal_settings_use_defaults() -> Result<()> {
	let params = NeatParams::from_toml(MINIMAL)?;
	assert_eq!(params.seed, 7);
	assert_eq!(params.generations, defaults::GENERATIONS);
	assert_eq!(params.genome.hidden_activation, Activation::Sigmoid);
	assert_eq!(params.population.size, 50);
	assert_eq!(params.population.cull_fraction, 0.5);
	assert_eq!(params.population.max_staleness, 20);
	assert_eq!(params.species, SpeciesParams::default());
	assert_eq!(params.species.compatibility_threshold, 3.0);
	assert_eq!(params.species.weight_difference_coefficient, 0.4);
	assert_eq!(params.reproduction, ReproductionParams::default());
	assert_eq!(params.reproduction.node_rate, 0.03);
	assert_eq!(params.playback.folder, None);
	assert_eq!(params.playback.number, Some(1));
	assert!(params.progress.print);
	assert!(!params.progress.record);
	Ok(())
}

#[test]
fn missing_required_setting() {
	let err = expect_error(
		r#"
[genome]
input_count = 2
output_count = 1

[population]
cull_fraction = 0.2
"#,
	);
	match err {
		NeatError::MissingSetting { key, section } => {
			assert_eq!((key.as_str(), section.as_str()), ("size", "population"));
		}
		other => panic!("unexpected error {other}"),
	}

	let err = expect_error("seed = 1\n");
	assert!(matches!(err, NeatError::MissingSetting { .. }));
}

#[test]
fn out_of_range_settings() {
	let err = expect_error(&format!("{MINIMAL}\n[reproduction]\ncrossover_rate = 1.5\n"));
	assert!(
		matches!(&err, NeatError::InvalidSetting { key, .. } if key == "crossover_rate"),
		"{err}"
	);

	let err = expect_error(&format!("{MINIMAL}\n[species]\nexcess_coefficient = -1.0\n"));
	assert!(matches!(err, NeatError::InvalidSetting { .. }));

	let err = expect_error(&format!("{MINIMAL}\n[playback]\nnumber = 0\n"));
	assert!(matches!(err, NeatError::InvalidSetting { .. }));

	let err = expect_error(&MINIMAL.replace("size = 50", "size = 0"));
	assert!(matches!(err, NeatError::InvalidSetting { .. }));
}

#[test]
fn unknown_activation() {
	let toml = MINIMAL.replace("output_count = 1", "output_count = 1\nhidden_activation = \"tanh\"");
	assert!(NeatParams::from_toml(&toml).is_err());

	let toml = MINIMAL.replace("output_count = 1", "output_count = 1\nhidden_activation = \"relu\"");
	let params = NeatParams::from_toml(&toml).expect("relu is known");
	assert_eq!(params.genome.hidden_activation, Activation::ReLU);
	assert_eq!("linear".parse::<Activation>().ok(), Some(Activation::Identity));
	assert!(matches!(
		"tanh".parse::<Activation>(),
		Err(NeatError::UnknownActivation(_))
	));
}

#[test]
fn whole_species_playback() -> Result<()> {
	let params = NeatParams::from_toml(&format!(
		"{MINIMAL}\n[playback]\nfolder = \"playback\"\nnumber = -1\n"
	))?;
	assert_eq!(params.playback.number, None);
	assert_eq!(params.playback.folder.as_deref(), Some(std::path::Path::new("playback")));
	Ok(())
}

#[test]
fn toml_round_trip() -> Result<()> {
	let mut params = common::params(4, 2, 80);
	params.playback.number = None;
	params.species.compatibility_threshold = 2.25;
	params.reproduction.disabled_rate = 0.6;
	params.progress.include_species = false;

	let toml = params.to_toml()?;
	assert_eq!(NeatParams::from_toml(&toml)?, params);
	Ok(())
}

#[test]
fn builder_defaults() {
	let params = common::params(1, 1, 1);
	assert_eq!(params.species.max_staleness, defaults::SPECIES_MAX_STALENESS);
	assert_eq!(params.reproduction.crossover_rate, defaults::CROSSOVER_RATE);
	assert_eq!(params.genome.hidden_activation, defaults::HIDDEN_ACTIVATION);
	assert!(params.validate().is_ok());
}

#[test]
fn progress_observables_from_toml() -> Result<()> {
	let params = NeatParams::from_toml(&format!(
		"{MINIMAL}\n[progress]\nbests = [\"fitness\", \"nodes\"]\naverages = []\ninclude_species = false\n"
	))?;
	assert_eq!(params.progress.bests, ["fitness", "nodes"]);
	assert!(params.progress.averages.is_empty());
	assert!(!params.progress.include_species);

	let unset = NeatParams::from_toml(MINIMAL)?;
	assert_eq!(unset.progress.bests, [defaults::PROGRESS_OBSERVABLE]);
	assert_eq!(unset.progress.averages, [defaults::PROGRESS_OBSERVABLE]);
	Ok(())
}
