//! Domain errors. Library functions return `eyre::Result`; these are the typed causes inside.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeatError {
	#[error("setting '{key}' not found in {section}")]
	MissingSetting { key: String, section: String },

	#[error("setting '{key}' in {section} {reason}")]
	InvalidSetting {
		key: String,
		section: String,
		reason: String,
	},

	#[error("invalid activation function '{0}' (expected identity, sigmoid or relu)")]
	UnknownActivation(String),

	#[error(
		"fitness weighted selection needs at least one parent with a strictly positive fitness, \
		 please check the fitness assigned by your simulation"
	)]
	NoPositiveFitness,

	#[error("fitness weighted selection failed: {0}")]
	Sampling(String),

	#[error("simulation assigned invalid fitness {fitness} (must be a non-negative number)")]
	InvalidFitness { fitness: f64 },

	#[error("no enabled connection outside the bias node found after {attempts} attempts")]
	SplitAttemptsExhausted { attempts: usize },

	#[error("unable to open '{}': it does not exist", path.display())]
	SnapshotMissing { path: PathBuf },

	#[error("unable to read '{}': {reason}", path.display())]
	SnapshotCorrupt { path: PathBuf, reason: String },

	#[error(
		"unable to save playback in '{}': it already exists, set a different playback folder or \
		 delete previous saves",
		path.display()
	)]
	PlaybackExists { path: PathBuf },

	#[error(
		"a progress record already exists in '{}', move it or change the progress filename",
		path.display()
	)]
	ProgressExists { path: PathBuf },

	#[error("attribute '{name}' is not observable on the agent, check the progress bests and averages")]
	UnknownObservable { name: String },

	#[error("io failure on '{}': {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

impl NeatError {
	pub(crate) fn missing(key: &str, section: &str) -> Self {
		NeatError::MissingSetting {
			key: key.to_owned(),
			section: section.to_owned(),
		}
	}

	pub(crate) fn invalid(key: &str, section: &str, reason: impl Into<String>) -> Self {
		NeatError::InvalidSetting {
			key: key.to_owned(),
			section: section.to_owned(),
			reason: reason.into(),
		}
	}

	/// Wraps an io error, mapping `NotFound` onto [`NeatError::SnapshotMissing`].
	pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		let path = path.into();
		if source.kind() == io::ErrorKind::NotFound {
			NeatError::SnapshotMissing { path }
		} else {
			NeatError::Io { path, source }
		}
	}
}
