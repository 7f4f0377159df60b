//! Saving the best genomes of each species every generation, and reading them back.
//!
//! Layout: `<folder>/<generation>/<species index>/<rank>.json`.

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use eyre::Result;

use crate::{error::NeatError, genetic::Agent, genome::Genome, species::Species};

/// Saves the top `number` members (all of them when `None`) of each ranked species.
/// Refuses to overwrite a generation that was already saved.
pub fn save_playback<A: Agent>(
	folder: &Path,
	generation: usize,
	species: &[Species<A>],
	number: Option<usize>,
) -> Result<()> {
	fs::create_dir_all(folder).map_err(|e| NeatError::io(folder, e))?;
	let destination = folder.join(generation.to_string());
	match fs::create_dir(&destination) {
		Ok(()) => {}
		Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
			return Err(NeatError::PlaybackExists { path: destination }.into());
		}
		Err(e) => return Err(NeatError::io(&destination, e).into()),
	}

	for (i, s) in species.iter().enumerate() {
		let dir = destination.join(i.to_string());
		fs::create_dir(&dir).map_err(|e| NeatError::io(&dir, e))?;
		let count = number.map_or(s.size(), |n| n.min(s.size()));
		for (rank, member) in s.members.iter().take(count).enumerate() {
			member.genome().save(&dir.join(format!("{rank}.json")))?;
		}
	}
	log::debug!(
		"Saved playback of generation {generation} ({} species) to {}",
		species.len(),
		destination.display()
	);
	Ok(())
}

/// A saved generation: genomes by species, best first.
#[derive(Debug, Clone)]
pub struct Playback {
	generation: usize,
	species: Vec<Vec<Genome>>,
}

impl Playback {
	pub fn load(folder: &Path, generation: usize) -> Result<Self> {
		let source = folder.join(generation.to_string());
		let species = numbered_entries(&source)?
			.into_iter()
			.map(|dir| {
				numbered_entries(&dir)?
					.iter()
					.map(|file| Genome::load(file))
					.collect::<Result<Vec<_>>>()
			})
			.collect::<Result<Vec<_>>>()?;
		Ok(Playback {
			generation,
			species,
		})
	}

	pub fn generation(&self) -> usize {
		self.generation
	}

	pub fn species_count(&self) -> usize {
		self.species.len()
	}

	/// Saved genomes of species `index`, best first.
	pub fn species(&self, index: usize) -> Option<&[Genome]> {
		self.species.get(index).map(Vec::as_slice)
	}

	pub fn iter_species(&self) -> impl Iterator<Item = &[Genome]> {
		self.species.iter().map(Vec::as_slice)
	}

	/// Every saved genome of the generation.
	pub fn all(&self) -> impl Iterator<Item = &Genome> {
		self.species.iter().flatten()
	}
}

/// Entries of `dir` named by their index, sorted by it.
fn numbered_entries(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut entries = Vec::new();
	for entry in fs::read_dir(dir).map_err(|e| NeatError::io(dir, e))? {
		let path = entry.map_err(|e| NeatError::io(dir, e))?.path();
		let index = path
			.file_stem()
			.and_then(|stem| stem.to_str())
			.and_then(|stem| stem.parse::<usize>().ok())
			.ok_or_else(|| NeatError::SnapshotCorrupt {
				path: path.clone(),
				reason: "unexpected entry in playback folder".to_owned(),
			})?;
		entries.push((index, path));
	}
	entries.sort_by_key(|&(index, _)| index);
	Ok(entries.into_iter().map(|(_, path)| path).collect())
}
