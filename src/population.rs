//! The generational loop: speciation, ranking, fitness sharing, pruning, reproduction.

use std::{fs, mem, path::Path};

use eyre::{eyre, Result};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::{
	context::Context,
	error::NeatError,
	genetic::{Agent, Results},
	genome::Genome,
	history::History,
	params::NeatParams,
	playback,
	reproduction::Reproduction,
	species::Species,
};

/// Settings file written next to a saved population.
pub const CONFIG_FILE: &str = "config.toml";
/// Population state file.
pub const SNAPSHOT_FILE: &str = "population.json";

/// Species larger than this keep an unmutated copy of their champion.
const CHAMPION_SPECIES_SIZE: usize = 5;

/// Species kept by a mass extinction.
const EXTINCTION_SURVIVORS: usize = 2;

pub struct Population<A: Agent> {
	pub params: NeatParams,

	generation: usize,  // current generation, from 1
	staleness: usize,   // generations since the best fitness last improved
	best_fitness: f64,  // best champion fitness so far

	agents: Vec<A>,              // agents awaiting evaluation
	species: Vec<Species<A>>,    // ranked best first after speciation
	ctx: Context,                // generator and innovation history
	reproduction: Reproduction,
}

impl<A: Agent> Population<A> {
	/// A first generation of minimal genomes, unevaluated.
	pub fn new(params: NeatParams) -> Result<Self> {
		params.validate()?;
		let mut ctx = Context::new(params.seed);
		let reproduction = Reproduction::new(&params.genome, &params.reproduction);
		let agents = reproduction.new_agents(&mut ctx, params.population.size);
		log::info!(
			"New population of {} agents ({} inputs, {} outputs), seed {}",
			agents.len(),
			params.genome.input_count,
			params.genome.output_count,
			params.seed
		);
		Ok(Population {
			params,
			generation: 1,
			staleness: 0,
			best_fitness: 0.0,
			agents,
			species: Vec::new(),
			ctx,
			reproduction,
		})
	}

	pub fn generation(&self) -> usize {
		self.generation
	}

	pub fn staleness(&self) -> usize {
		self.staleness
	}

	pub fn best_fitness(&self) -> f64 {
		self.best_fitness
	}

	pub fn agents(&self) -> &[A] {
		&self.agents
	}

	pub fn agents_mut(&mut self) -> &mut [A] {
		&mut self.agents
	}

	pub fn species(&self) -> &[Species<A>] {
		&self.species
	}

	pub fn species_mut(&mut self) -> &mut [Species<A>] {
		&mut self.species
	}

	pub fn context(&self) -> &Context {
		&self.ctx
	}

	pub fn history(&self) -> &History {
		&self.ctx.history
	}

	/// Best genome found so far: the representative of the top species.
	pub fn best_genome(&self) -> Option<&Genome> {
		self.species.first().map(|s| &s.representative)
	}

	/// Runs `simulate` on every agent in parallel. It must set a non-negative fitness.
	pub fn evaluate<F>(&mut self, simulate: F) -> Result<()>
	where
		F: Fn(A) -> A + Sync + Send,
	{
		self.agents = mem::take(&mut self.agents)
			.into_par_iter()
			.map(simulate)
			.collect();
		if let Some(fitness) = self
			.agents
			.iter()
			.map(Agent::fitness)
			.find(|f| !(*f >= 0.0))
		{
			return Err(NeatError::InvalidFitness { fitness }.into());
		}
		Ok(())
	}

	/// Moves every agent into the first compatible species, founding new ones as needed.
	/// Species left without members are dropped.
	pub fn speciate(&mut self) {
		for agent in mem::take(&mut self.agents) {
			match self
				.species
				.iter_mut()
				.find(|s| s.is_same_species(agent.genome(), &self.params.species))
			{
				Some(species) => species.members.push(agent),
				None => self.species.push(Species::new(agent)),
			}
		}
		let before = self.species.len();
		self.species.retain(|s| s.size() > 0);
		log::debug!(
			"Speciated into {} species ({} extinct)",
			self.species.len(),
			before - self.species.len()
		);
	}

	/// Ranks members within each species, then species by champion fitness.
	pub fn rank_species(&mut self) {
		for species in &mut self.species {
			species.rank();
		}
		self.species.sort_by(|a, b| {
			b.champion()
				.fitness()
				.total_cmp(&a.champion().fitness())
		});
	}

	/// Updates species staleness, then the population's own from the top champion.
	pub fn check_progress(&mut self) {
		for species in &mut self.species {
			species.check_progress();
		}
		let top = self
			.species
			.first()
			.expect("population has species")
			.champion()
			.fitness();
		if top > self.best_fitness {
			log::info!("New best fitness {top:.5} (was {:.5})", self.best_fitness);
			self.best_fitness = top;
			self.staleness = 0;
		} else {
			self.staleness += 1;
		}
	}

	pub fn fitness_share(&mut self) {
		for species in &mut self.species {
			species.fitness_share();
		}
	}

	pub fn total_adjusted_fitness(&self) -> f64 {
		self.species
			.iter()
			.map(Species::total_adjusted_fitness)
			.sum()
	}

	pub fn gone_stale(&self) -> bool {
		self.staleness > self.params.population.max_staleness
	}

	/// Keeps only the top species when the whole population has gone stale.
	fn mass_extinction(&mut self) {
		log::info!(
			"Population stale for {} generations, keeping the top {EXTINCTION_SURVIVORS} species",
			self.staleness
		);
		self.species.truncate(EXTINCTION_SURVIVORS);
	}

	/// Removes stale species, then species whose share of the next generation would be below
	/// one agent. A stale population instead goes through a mass extinction, as does one that
	/// would otherwise lose every species.
	pub fn prune(&mut self) -> Result<()> {
		if !(self.total_adjusted_fitness() > 0.0) {
			return Err(NeatError::NoPositiveFitness.into());
		}
		if self.gone_stale() {
			self.mass_extinction();
			return Ok(());
		}

		let max_staleness = self.params.species.max_staleness;
		let size = self.params.population.size as f64;
		let fresh_total: f64 = self
			.species
			.iter()
			.filter(|s| !s.gone_stale(max_staleness))
			.map(Species::total_adjusted_fitness)
			.sum();
		let keep: Vec<bool> = self
			.species
			.iter()
			.map(|s| {
				!s.gone_stale(max_staleness)
					&& s.total_adjusted_fitness() / fresh_total * size >= 1.0
			})
			.collect();

		if !keep.contains(&true) {
			log::warn!("Pruning would remove every species");
			self.mass_extinction();
			return Ok(());
		}
		let before = self.species.len();
		let mut keep = keep.into_iter();
		self.species.retain(|_| keep.next().unwrap_or(false));
		log::debug!("Pruned {} species", before - self.species.len());
		Ok(())
	}

	/// Replaces the population with offspring of the surviving species, each getting a share of
	/// the population size proportional to its adjusted fitness. Members are cleared afterwards.
	pub fn next_generation(&mut self) -> Result<()> {
		let total = self.total_adjusted_fitness();
		let size = self.params.population.size;
		let mut next = Vec::with_capacity(size);

		for (i, species) in self.species.iter_mut().enumerate() {
			let mut count = (species.total_adjusted_fitness() / total * size as f64) as usize;
			if species.size() > CHAMPION_SPECIES_SIZE {
				next.push(self.reproduction.clone_agent(species.champion()));
				count = count.saturating_sub(1);
			}
			species.cull(self.params.population.cull_fraction);
			let offspring = self
				.reproduction
				.offspring(&mut self.ctx, &species.members, count)?;
			log::debug!("Species {i}: {} offspring", offspring.len());
			next.extend(offspring);
			species.members.clear();
		}

		if next.is_empty() {
			return Err(eyre!("generation {} produced no offspring", self.generation));
		}
		if next.len() < size {
			log::debug!("Next generation short by {} agents", size - next.len());
		}
		self.agents = next;
		self.generation += 1;
		Ok(())
	}

	/// One full generation on an evaluated population.
	pub fn evolve(&mut self) -> Result<()> {
		self.evolve_with(&mut ())
	}

	/// [`Population::evolve`], reporting to `results` once species are ranked and shared.
	pub fn evolve_with<R: Results<A>>(&mut self, results: &mut R) -> Result<()> {
		log::info!("Evolving generation {}", self.generation);
		self.speciate();
		self.rank_species();
		self.check_progress();
		self.fitness_share();
		results.record_generation(self.generation, &self.species)?;

		if let Some(folder) = &self.params.playback.folder {
			playback::save_playback(
				folder,
				self.generation,
				&self.species,
				self.params.playback.number,
			)?;
		}

		self.prune()?;
		self.next_generation()?;

		if let Some(folder) = self.params.population.save_folder.clone() {
			self.save(&folder)?;
		}
		Ok(())
	}

	/// Evaluates and evolves until the configured generation count is reached.
	pub fn run<F, R>(&mut self, simulate: F, results: &mut R) -> Result<()>
	where
		F: Fn(A) -> A + Sync + Send,
		R: Results<A>,
	{
		while self.generation <= self.params.generations {
			self.evaluate(&simulate)?;
			self.evolve_with(results)?;
		}
		results.finalize(self.generation)
	}

	/// Writes `config.toml` and `population.json` into `folder`.
	pub fn save(&self, folder: &Path) -> Result<()> {
		fs::create_dir_all(folder).map_err(|e| NeatError::io(folder, e))?;
		self.params.save(&folder.join(CONFIG_FILE))?;

		let snapshot = SnapshotRef {
			generation: self.generation,
			staleness: self.staleness,
			best_fitness: self.best_fitness,
			context: &self.ctx,
			genomes: self.agents.iter().map(Agent::genome).collect(),
			species: &self.species,
		};
		let path = folder.join(SNAPSHOT_FILE);
		fs::write(&path, serde_json::to_string(&snapshot)?).map_err(|e| NeatError::io(&path, e))?;
		log::debug!("Saved generation {} to {}", self.generation, folder.display());
		Ok(())
	}

	/// Restores a population saved by [`Population::save`].
	pub fn load(folder: &Path) -> Result<Self> {
		let params = NeatParams::load(&folder.join(CONFIG_FILE))?;
		let path = folder.join(SNAPSHOT_FILE);
		let json = fs::read_to_string(&path).map_err(|e| NeatError::io(&path, e))?;
		let snapshot: Snapshot<A> =
			serde_json::from_str(&json).map_err(|e| NeatError::SnapshotCorrupt {
				path: path.clone(),
				reason: e.to_string(),
			})?;
		let reproduction = Reproduction::new(&params.genome, &params.reproduction);
		log::info!(
			"Loaded generation {} ({} agents, {} species) from {}",
			snapshot.generation,
			snapshot.genomes.len(),
			snapshot.species.len(),
			folder.display()
		);
		Ok(Population {
			params,
			generation: snapshot.generation,
			staleness: snapshot.staleness,
			best_fitness: snapshot.best_fitness,
			agents: snapshot.genomes.into_iter().map(A::from_genome).collect(),
			species: snapshot.species,
			ctx: snapshot.context,
			reproduction,
		})
	}
}

#[derive(Serialize)]
#[serde(bound = "")]
struct SnapshotRef<'a, A> {
	generation: usize,
	staleness: usize,
	best_fitness: f64,
	context: &'a Context,
	genomes: Vec<&'a Genome>,
	species: &'a [Species<A>],
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct Snapshot<A> {
	generation: usize,
	staleness: usize,
	best_fitness: f64,
	context: Context,
	genomes: Vec<Genome>,
	species: Vec<Species<A>>,
}
