//! NeuroEvolution of Augmenting Topologies: evolving both the weights and the structure of
//! feed-forward networks, protecting new structure through speciation.

pub mod activation;
pub mod context;
pub mod crossover;
pub mod error;
pub mod genetic;
pub mod genome;
pub mod history;
pub mod mutations;
pub mod params;
pub mod playback;
pub mod population;
pub mod problems;
pub mod progress;
pub mod reproduction;
pub mod selection;
pub mod species;

pub mod prelude {
	pub use crate::{
		activation::Activation,
		context::Context,
		error::NeatError,
		genetic::{Agent, Results},
		genome::{Connection, Genome, Node, NodeId},
		history::{History, InnovNum},
		params::NeatParams,
		population::Population,
		species::Species,
	};
}
