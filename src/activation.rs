//! Node activation functions.

use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::NeatError;

/// Steepness of the sigmoid, keeping it close to linear on [-0.5, 0.5].
const SIGMOID_STEEPNESS: f64 = 4.9;

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
	/// f(x) = x
	#[default]
	#[display("identity")]
	#[serde(alias = "linear")]
	Identity,
	/// f(x) = 1 / (1 + e^(-4.9x))
	#[display("sigmoid")]
	Sigmoid,
	/// f(x) = max(0, x)
	#[display("relu")]
	ReLU,
}

impl Activation {
	#[inline]
	pub fn apply(self, x: f64) -> f64 {
		match self {
			Activation::Identity => x,
			Activation::Sigmoid => 1.0 / (1.0 + (-SIGMOID_STEEPNESS * x).exp()),
			Activation::ReLU => x.max(0.0),
		}
	}
}

impl FromStr for Activation {
	type Err = NeatError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		match name {
			"identity" | "linear" => Ok(Activation::Identity),
			"sigmoid" => Ok(Activation::Sigmoid),
			"relu" => Ok(Activation::ReLU),
			other => Err(NeatError::UnknownActivation(other.to_owned())),
		}
	}
}
