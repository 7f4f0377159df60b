//! Per-generation statistics, logged and optionally appended to a csv file.
//!
//! Tracked attributes are `fitness` plus anything an agent reports through
//! [`Agent::observables`]. Each is recorded as `best_<name>` and/or `average_<name>`.

use std::{
	fs::{File, OpenOptions},
	path::PathBuf,
};

use csv::{Reader, Writer, WriterBuilder};
use derive_more::Display;
use eyre::Result;

use crate::{
	error::NeatError,
	genetic::{Agent, Results},
	params::{defaults::PROGRESS_OBSERVABLE, ProgressParams},
	species::Species,
};

const GENERATION_COLUMN: &str = "generation";
const SPECIES_COLUMN: &str = "number_of_species";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
	#[display("best")]
	Best,
	#[display("average")]
	Average,
}

/// Attributes to track with their measures, in first-mention order (bests before averages).
pub fn tracked(params: &ProgressParams) -> Vec<(String, Vec<Measure>)> {
	let mut tracked: Vec<(String, Vec<Measure>)> = Vec::new();
	let mentions = params
		.bests
		.iter()
		.map(|name| (name, Measure::Best))
		.chain(params.averages.iter().map(|name| (name, Measure::Average)));
	for (name, measure) in mentions {
		match tracked.iter_mut().find(|(n, _)| n == name) {
			Some((_, measures)) if measures.contains(&measure) => {}
			Some((_, measures)) => measures.push(measure),
			None => tracked.push((name.clone(), vec![measure])),
		}
	}
	tracked
}

/// One value of `name` per agent.
fn observe<'a, A: Agent + 'a>(agents: impl Iterator<Item = &'a A>, name: &str) -> Result<Vec<f64>> {
	let values = agents
		.map(|agent| {
			if name == PROGRESS_OBSERVABLE {
				return Ok(agent.fitness());
			}
			agent
				.observables()
				.into_iter()
				.find(|(n, _)| *n == name)
				.map(|(_, value)| value)
				.ok_or_else(|| NeatError::UnknownObservable {
					name: name.to_owned(),
				})
		})
		.collect::<Result<Vec<f64>, NeatError>>()?;
	Ok(values)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
	pub generation: usize,
	pub best_fitness: f64,
	pub average_fitness: f64,
	pub number_of_species: Option<usize>,
	/// `(column, value)` for every tracked attribute and measure
	pub observations: Vec<(String, f64)>,
}

impl ProgressRecord {
	pub fn new<A: Agent>(
		generation: usize,
		species: &[Species<A>],
		tracked: &[(String, Vec<Measure>)],
	) -> Result<Self> {
		let members = || species.iter().flat_map(|s| s.members.iter());
		let fitnesses = observe(members(), PROGRESS_OBSERVABLE)?;
		let mut observations = Vec::new();
		for (name, measures) in tracked {
			let values = observe(members(), name)?;
			for measure in measures {
				let value = match measure {
					Measure::Best => best(&values),
					Measure::Average => average(&values),
				};
				observations.push((format!("{measure}_{name}"), value));
			}
		}
		Ok(ProgressRecord {
			generation,
			best_fitness: best(&fitnesses),
			average_fitness: average(&fitnesses),
			number_of_species: Some(species.len()),
			observations,
		})
	}

	/// Csv field for `column`, empty when this record has no such value.
	fn field(&self, column: &str) -> String {
		match column {
			GENERATION_COLUMN => self.generation.to_string(),
			SPECIES_COLUMN => self
				.number_of_species
				.map(|n| n.to_string())
				.unwrap_or_default(),
			_ => self
				.observations
				.iter()
				.find(|(c, _)| c == column)
				.map(|(_, value)| value.to_string())
				.unwrap_or_default(),
		}
	}
}

fn best(values: &[f64]) -> f64 {
	values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

fn average(values: &[f64]) -> f64 {
	if values.is_empty() {
		return 0.0;
	}
	values.iter().sum::<f64>() / values.len() as f64
}

pub struct ProgressRecorder {
	print: bool,
	include_species: bool,
	tracked: Vec<(String, Vec<Measure>)>,
	path: PathBuf,
	/// csv header; read back from an existing record so resumed rows line up with it
	columns: Vec<String>,
	writer: Option<Writer<File>>,
	pub history: Vec<ProgressRecord>,
}

impl ProgressRecorder {
	/// Opens `<filename>.csv` for appending when recording. A run starting at generation 1 refuses
	/// to append to an existing record; a resumed run continues it under the existing header.
	pub fn new(params: &ProgressParams, generation: usize) -> Result<Self> {
		let path = PathBuf::from(format!("{}.csv", params.filename));
		let tracked = tracked(params);
		let mut columns = vec![GENERATION_COLUMN.to_owned()];
		for (name, measures) in &tracked {
			columns.extend(measures.iter().map(|m| format!("{m}_{name}")));
		}
		if params.include_species {
			columns.push(SPECIES_COLUMN.to_owned());
		}

		let writer = if params.record {
			let exists = path.exists();
			if exists && generation <= 1 {
				return Err(NeatError::ProgressExists { path }.into());
			}
			if exists {
				let mut reader = Reader::from_path(&path)?;
				columns = reader.headers()?.iter().map(str::to_owned).collect();
			}
			let file = OpenOptions::new()
				.create(true)
				.append(true)
				.open(&path)
				.map_err(|e| NeatError::io(&path, e))?;
			let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
			if !exists {
				writer.write_record(&columns)?;
			}
			Some(writer)
		} else {
			None
		};
		Ok(ProgressRecorder {
			print: params.print,
			include_species: params.include_species,
			tracked,
			path,
			columns,
			writer,
			history: Vec::new(),
		})
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}
}

impl<A: Agent> Results<A> for ProgressRecorder {
	fn record_generation(&mut self, generation: usize, species: &[Species<A>]) -> Result<()> {
		let mut record = ProgressRecord::new(generation, species, &self.tracked)?;
		if !self.include_species {
			record.number_of_species = None;
		}

		if self.print {
			log::info!("Generation {generation}");
			for (column, value) in &record.observations {
				log::info!("\t{column} = {value:.5}");
			}
			if let Some(n) = record.number_of_species {
				log::info!("\t{n} species");
			}
		}

		if let Some(writer) = &mut self.writer {
			writer.write_record(self.columns.iter().map(|c| record.field(c)))?;
			writer.flush().map_err(|e| NeatError::io(&self.path, e))?;
		}
		self.history.push(record);
		Ok(())
	}

	fn finalize(&mut self, generation: usize) -> Result<()> {
		if let Some(best) = self
			.history
			.iter()
			.max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
		{
			log::info!(
				"Finished at generation {generation}, best fitness {:.5} (generation {})",
				best.best_fitness,
				best.generation
			);
		}
		Ok(())
	}
}
