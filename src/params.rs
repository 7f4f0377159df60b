//! Run settings. Built in code through the builders, or read from a TOML file through the
//! optional `*Opts` mirrors, where missing keys fall back to defaults (logged) or are reported.

use std::{fmt::Debug, fs, path::Path, path::PathBuf};

use bon::Builder;
use eyre::Result;
use serde::{Deserialize, Serialize};

use crate::{activation::Activation, error::NeatError};

/// Default values of optional settings.
pub mod defaults {
	use crate::activation::Activation;

	pub const GENERATIONS: usize = 100;

	pub const HIDDEN_ACTIVATION: Activation = Activation::Sigmoid;

	pub const CULL_FRACTION: f64 = 0.5;
	pub const POPULATION_MAX_STALENESS: usize = 20;

	pub const EXCESS_COEFFICIENT: f64 = 1.0;
	pub const DISJOINT_COEFFICIENT: f64 = 1.0;
	pub const WEIGHT_DIFFERENCE_COEFFICIENT: f64 = 0.4;
	pub const COMPATIBILITY_THRESHOLD: f64 = 3.0;
	pub const SPECIES_MAX_STALENESS: usize = 15;

	pub const CROSSOVER_RATE: f64 = 0.75;
	pub const DISABLED_RATE: f64 = 0.75;
	pub const WEIGHTS_RATE: f64 = 0.8;
	pub const WEIGHT_REPLACEMENT_RATE: f64 = 0.1;
	pub const CONNECTION_RATE: f64 = 0.1;
	pub const NODE_RATE: f64 = 0.03;

	pub const PLAYBACK_NUMBER: usize = 1;

	pub const PROGRESS_FILENAME: &str = "progress";
	pub const PROGRESS_OBSERVABLE: &str = "fitness";
}

/// Parameters for a whole run.
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct NeatParams {
	/// seed of the run's generator
	#[builder(default = u64::from(rand::random::<u32>()))]
	pub seed: u64,
	/// generations evaluated by [`crate::population::Population::run`]
	#[builder(default = defaults::GENERATIONS)]
	pub generations: usize,
	pub genome: GenomeParams,
	pub population: PopulationParams,
	#[builder(default)]
	pub species: SpeciesParams,
	#[builder(default)]
	pub reproduction: ReproductionParams,
	#[builder(default)]
	pub playback: PlaybackParams,
	#[builder(default)]
	pub progress: ProgressParams,
}

#[derive(Builder, Debug, Clone, PartialEq)]
pub struct GenomeParams {
	pub input_count: usize,
	pub output_count: usize,
	#[builder(default = defaults::HIDDEN_ACTIVATION)]
	pub hidden_activation: Activation,
}

#[derive(Builder, Debug, Clone, PartialEq)]
pub struct PopulationParams {
	pub size: usize,
	/// fraction of each species removed before breeding
	#[builder(default = defaults::CULL_FRACTION)]
	pub cull_fraction: f64,
	/// generations without improvement before a mass extinction
	#[builder(default = defaults::POPULATION_MAX_STALENESS)]
	pub max_staleness: usize,
	/// where to save the population after every generation, if anywhere
	pub save_folder: Option<PathBuf>,
}

#[derive(Builder, Debug, Clone, PartialEq)]
pub struct SpeciesParams {
	#[builder(default = defaults::EXCESS_COEFFICIENT)]
	pub excess_coefficient: f64,
	#[builder(default = defaults::DISJOINT_COEFFICIENT)]
	pub disjoint_coefficient: f64,
	#[builder(default = defaults::WEIGHT_DIFFERENCE_COEFFICIENT)]
	pub weight_difference_coefficient: f64,
	#[builder(default = defaults::COMPATIBILITY_THRESHOLD)]
	pub compatibility_threshold: f64,
	/// generations without improvement before a species is removed
	#[builder(default = defaults::SPECIES_MAX_STALENESS)]
	pub max_staleness: usize,
}

impl Default for SpeciesParams {
	fn default() -> Self {
		Self::builder().build()
	}
}

#[derive(Builder, Debug, Clone, PartialEq)]
pub struct ReproductionParams {
	#[builder(default = defaults::CROSSOVER_RATE)]
	pub crossover_rate: f64,
	/// chance a gene disabled in either parent stays disabled in the child
	#[builder(default = defaults::DISABLED_RATE)]
	pub disabled_rate: f64,
	#[builder(default = defaults::WEIGHTS_RATE)]
	pub weights_rate: f64,
	/// chance each weight is replaced rather than perturbed
	#[builder(default = defaults::WEIGHT_REPLACEMENT_RATE)]
	pub weight_replacement_rate: f64,
	#[builder(default = defaults::CONNECTION_RATE)]
	pub connection_rate: f64,
	#[builder(default = defaults::NODE_RATE)]
	pub node_rate: f64,
}

impl Default for ReproductionParams {
	fn default() -> Self {
		Self::builder().build()
	}
}

/// Saving the best genomes of every species, every generation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackParams {
	/// disabled when unset
	pub folder: Option<PathBuf>,
	/// genomes kept per species, `None` for the whole species
	pub number: Option<usize>,
}

impl Default for PlaybackParams {
	fn default() -> Self {
		PlaybackParams {
			folder: None,
			number: Some(defaults::PLAYBACK_NUMBER),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressParams {
	/// log fitness statistics every generation
	pub print: bool,
	/// append fitness statistics to `<filename>.csv`
	pub record: bool,
	pub filename: String,
	/// agent attributes whose best value is recorded
	pub bests: Vec<String>,
	/// agent attributes whose population average is recorded
	pub averages: Vec<String>,
	pub include_species: bool,
}

impl Default for ProgressParams {
	fn default() -> Self {
		ProgressParams {
			print: true,
			record: false,
			filename: defaults::PROGRESS_FILENAME.to_owned(),
			bests: vec![defaults::PROGRESS_OBSERVABLE.to_owned()],
			averages: vec![defaults::PROGRESS_OBSERVABLE.to_owned()],
			include_species: true,
		}
	}
}

impl NeatParams {
	/// Checks every setting is in range.
	pub fn validate(&self) -> Result<(), NeatError> {
		if self.seed > i64::MAX as u64 {
			return Err(NeatError::invalid(
				"seed",
				"settings",
				"must fit in a signed 64 bit integer",
			));
		}
		positive(self.generations, "generations", "settings")?;

		positive(self.genome.input_count, "input_count", "genome")?;
		positive(self.genome.output_count, "output_count", "genome")?;

		positive(self.population.size, "size", "population")?;
		unit_interval(self.population.cull_fraction, "cull_fraction", "population")?;
		positive(self.population.max_staleness, "max_staleness", "population")?;

		let species = &self.species;
		non_negative(species.excess_coefficient, "excess_coefficient", "species")?;
		non_negative(species.disjoint_coefficient, "disjoint_coefficient", "species")?;
		non_negative(
			species.weight_difference_coefficient,
			"weight_difference_coefficient",
			"species",
		)?;
		if !(species.compatibility_threshold > 0.0) || !species.compatibility_threshold.is_finite() {
			return Err(NeatError::invalid(
				"compatibility_threshold",
				"species",
				"must be a positive number",
			));
		}
		positive(species.max_staleness, "max_staleness", "species")?;

		let reproduction = &self.reproduction;
		for (value, key) in [
			(reproduction.crossover_rate, "crossover_rate"),
			(reproduction.disabled_rate, "disabled_rate"),
			(reproduction.weights_rate, "weights_rate"),
			(reproduction.weight_replacement_rate, "weight_replacement_rate"),
			(reproduction.connection_rate, "connection_rate"),
			(reproduction.node_rate, "node_rate"),
		] {
			unit_interval(value, key, "reproduction")?;
		}

		if let Some(number) = self.playback.number {
			positive(number, "number", "playback")?;
		}
		Ok(())
	}

	/// Reads settings from TOML text and validates them.
	pub fn from_toml(contents: &str) -> Result<Self> {
		let opts: NeatParamsOpts = toml::from_str(contents)?;
		let params = NeatParams::try_from(opts)?;
		params.validate()?;
		Ok(params)
	}

	pub fn to_toml(&self) -> Result<String> {
		Ok(toml::to_string(&NeatParamsOpts::from(self))?)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let contents = fs::read_to_string(path).map_err(|e| NeatError::io(path, e))?;
		NeatParams::from_toml(&contents).map_err(|e| match e.downcast::<NeatError>() {
			Ok(e) => e.into(),
			Err(e) => NeatError::SnapshotCorrupt {
				path: path.to_owned(),
				reason: e.to_string(),
			}
			.into(),
		})
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		fs::write(path, self.to_toml()?).map_err(|e| NeatError::io(path, e))?;
		Ok(())
	}
}

fn positive(value: usize, key: &str, section: &str) -> Result<(), NeatError> {
	if value == 0 {
		return Err(NeatError::invalid(key, section, "must be positive"));
	}
	Ok(())
}

fn non_negative(value: f64, key: &str, section: &str) -> Result<(), NeatError> {
	if !(value >= 0.0) || !value.is_finite() {
		return Err(NeatError::invalid(key, section, "must be a non-negative number"));
	}
	Ok(())
}

fn unit_interval(value: f64, key: &str, section: &str) -> Result<(), NeatError> {
	if !(0.0..=1.0).contains(&value) {
		return Err(NeatError::invalid(key, section, "must be between 0 and 1"));
	}
	Ok(())
}

fn required<T>(value: Option<T>, key: &str, section: &str) -> Result<T, NeatError> {
	value.ok_or_else(|| NeatError::missing(key, section))
}

fn or_default<T: Debug>(value: Option<T>, default: T, key: &str, section: &str) -> T {
	value.unwrap_or_else(|| {
		log::info!("Using default value {default:?} for '{key}' in {section}");
		default
	})
}

/// Settings file layout. Every key is optional here; see [`NeatParams::try_from`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeatParamsOpts {
	pub seed: Option<u64>,
	pub generations: Option<usize>,
	pub genome: Option<GenomeOpts>,
	pub population: Option<PopulationOpts>,
	pub species: Option<SpeciesOpts>,
	pub reproduction: Option<ReproductionOpts>,
	pub playback: Option<PlaybackOpts>,
	pub progress: Option<ProgressOpts>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenomeOpts {
	pub input_count: Option<usize>,
	pub output_count: Option<usize>,
	pub hidden_activation: Option<Activation>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PopulationOpts {
	pub size: Option<usize>,
	pub cull_fraction: Option<f64>,
	pub max_staleness: Option<usize>,
	pub save_folder: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesOpts {
	pub excess_coefficient: Option<f64>,
	pub disjoint_coefficient: Option<f64>,
	pub weight_difference_coefficient: Option<f64>,
	pub compatibility_threshold: Option<f64>,
	pub max_staleness: Option<usize>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReproductionOpts {
	pub crossover_rate: Option<f64>,
	pub disabled_rate: Option<f64>,
	pub weights_rate: Option<f64>,
	pub weight_replacement_rate: Option<f64>,
	pub connection_rate: Option<f64>,
	pub node_rate: Option<f64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaybackOpts {
	pub folder: Option<PathBuf>,
	/// -1 keeps the whole species
	pub number: Option<i64>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressOpts {
	pub print: Option<bool>,
	pub record: Option<bool>,
	pub filename: Option<String>,
	pub bests: Option<Vec<String>>,
	pub averages: Option<Vec<String>>,
	pub include_species: Option<bool>,
}

impl TryFrom<NeatParamsOpts> for NeatParams {
	type Error = NeatError;

	fn try_from(opts: NeatParamsOpts) -> Result<Self, Self::Error> {
		let genome = required(opts.genome, "genome", "settings")?;
		let population = required(opts.population, "population", "settings")?;
		let species = opts.species.unwrap_or_default();
		let reproduction = opts.reproduction.unwrap_or_default();
		let playback = opts.playback.unwrap_or_default();
		let progress = opts.progress.unwrap_or_default();

		let number = match playback.number {
			None => Some(defaults::PLAYBACK_NUMBER),
			Some(-1) => None,
			Some(n) if n > 0 => Some(n as usize),
			Some(_) => {
				return Err(NeatError::invalid(
					"number",
					"playback",
					"must be positive, or -1 for whole species",
				))
			}
		};

		Ok(NeatParams {
			seed: opts.seed.unwrap_or_else(|| {
				let seed = u64::from(rand::random::<u32>());
				log::info!("No seed given, using {seed}");
				seed
			}),
			generations: or_default(opts.generations, defaults::GENERATIONS, "generations", "settings"),
			genome: GenomeParams {
				input_count: required(genome.input_count, "input_count", "genome")?,
				output_count: required(genome.output_count, "output_count", "genome")?,
				hidden_activation: or_default(
					genome.hidden_activation,
					defaults::HIDDEN_ACTIVATION,
					"hidden_activation",
					"genome",
				),
			},
			population: PopulationParams {
				size: required(population.size, "size", "population")?,
				cull_fraction: or_default(
					population.cull_fraction,
					defaults::CULL_FRACTION,
					"cull_fraction",
					"population",
				),
				max_staleness: or_default(
					population.max_staleness,
					defaults::POPULATION_MAX_STALENESS,
					"max_staleness",
					"population",
				),
				save_folder: population.save_folder,
			},
			species: SpeciesParams {
				excess_coefficient: or_default(
					species.excess_coefficient,
					defaults::EXCESS_COEFFICIENT,
					"excess_coefficient",
					"species",
				),
				disjoint_coefficient: or_default(
					species.disjoint_coefficient,
					defaults::DISJOINT_COEFFICIENT,
					"disjoint_coefficient",
					"species",
				),
				weight_difference_coefficient: or_default(
					species.weight_difference_coefficient,
					defaults::WEIGHT_DIFFERENCE_COEFFICIENT,
					"weight_difference_coefficient",
					"species",
				),
				compatibility_threshold: or_default(
					species.compatibility_threshold,
					defaults::COMPATIBILITY_THRESHOLD,
					"compatibility_threshold",
					"species",
				),
				max_staleness: or_default(
					species.max_staleness,
					defaults::SPECIES_MAX_STALENESS,
					"max_staleness",
					"species",
				),
			},
			reproduction: ReproductionParams {
				crossover_rate: or_default(
					reproduction.crossover_rate,
					defaults::CROSSOVER_RATE,
					"crossover_rate",
					"reproduction",
				),
				disabled_rate: or_default(
					reproduction.disabled_rate,
					defaults::DISABLED_RATE,
					"disabled_rate",
					"reproduction",
				),
				weights_rate: or_default(
					reproduction.weights_rate,
					defaults::WEIGHTS_RATE,
					"weights_rate",
					"reproduction",
				),
				weight_replacement_rate: or_default(
					reproduction.weight_replacement_rate,
					defaults::WEIGHT_REPLACEMENT_RATE,
					"weight_replacement_rate",
					"reproduction",
				),
				connection_rate: or_default(
					reproduction.connection_rate,
					defaults::CONNECTION_RATE,
					"connection_rate",
					"reproduction",
				),
				node_rate: or_default(
					reproduction.node_rate,
					defaults::NODE_RATE,
					"node_rate",
					"reproduction",
				),
			},
			playback: PlaybackParams {
				folder: playback.folder,
				number,
			},
			progress: ProgressParams {
				print: progress.print.unwrap_or(true),
				record: progress.record.unwrap_or(false),
				filename: progress
					.filename
					.unwrap_or_else(|| defaults::PROGRESS_FILENAME.to_owned()),
				bests: progress
					.bests
					.unwrap_or_else(|| vec![defaults::PROGRESS_OBSERVABLE.to_owned()]),
				averages: progress
					.averages
					.unwrap_or_else(|| vec![defaults::PROGRESS_OBSERVABLE.to_owned()]),
				include_species: progress.include_species.unwrap_or(true),
			},
		})
	}
}

impl From<&NeatParams> for NeatParamsOpts {
	fn from(params: &NeatParams) -> Self {
		NeatParamsOpts {
			seed: Some(params.seed),
			generations: Some(params.generations),
			genome: Some(GenomeOpts {
				input_count: Some(params.genome.input_count),
				output_count: Some(params.genome.output_count),
				hidden_activation: Some(params.genome.hidden_activation),
			}),
			population: Some(PopulationOpts {
				size: Some(params.population.size),
				cull_fraction: Some(params.population.cull_fraction),
				max_staleness: Some(params.population.max_staleness),
				save_folder: params.population.save_folder.clone(),
			}),
			species: Some(SpeciesOpts {
				excess_coefficient: Some(params.species.excess_coefficient),
				disjoint_coefficient: Some(params.species.disjoint_coefficient),
				weight_difference_coefficient: Some(params.species.weight_difference_coefficient),
				compatibility_threshold: Some(params.species.compatibility_threshold),
				max_staleness: Some(params.species.max_staleness),
			}),
			reproduction: Some(ReproductionOpts {
				crossover_rate: Some(params.reproduction.crossover_rate),
				disabled_rate: Some(params.reproduction.disabled_rate),
				weights_rate: Some(params.reproduction.weights_rate),
				weight_replacement_rate: Some(params.reproduction.weight_replacement_rate),
				connection_rate: Some(params.reproduction.connection_rate),
				node_rate: Some(params.reproduction.node_rate),
			}),
			playback: Some(PlaybackOpts {
				folder: params.playback.folder.clone(),
				number: Some(params.playback.number.map_or(-1, |n| n as i64)),
			}),
			progress: Some(ProgressOpts {
				print: Some(params.progress.print),
				record: Some(params.progress.record),
				filename: Some(params.progress.filename.clone()),
				bests: Some(params.progress.bests.clone()),
				averages: Some(params.progress.averages.clone()),
				include_species: Some(params.progress.include_species),
			}),
		}
	}
}
