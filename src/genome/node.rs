use std::ops::Deref;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::activation::Activation;

use super::Connection;

/// Number of a node within its genome. Assigned in insertion order, never reused.
#[derive(
	Debug, Display, From, Into, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub usize);
impl Deref for NodeId {
	type Target = usize;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// A neuron. Owns its outgoing connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
	pub id: NodeId,
	pub layer: usize,
	pub activation: Activation,

	#[serde(skip)]
	pub(crate) input: f64, // accumulator, only meaningful during propagation
	pub(crate) outputs: Vec<Connection>,
}

impl Node {
	pub fn new(id: NodeId, layer: usize, activation: Activation) -> Self {
		Node {
			id,
			layer,
			activation,
			input: 0.0,
			outputs: Vec::new(),
		}
	}

	/// Accumulated input from the last propagation.
	pub fn input(&self) -> f64 {
		self.input
	}

	#[inline]
	pub fn output(&self) -> f64 {
		self.activation.apply(self.input)
	}

	pub fn outputs(&self) -> &[Connection] {
		&self.outputs
	}

	/// Whether any outgoing connection (enabled or not) already targets `other`.
	pub fn connected_to(&self, other: NodeId) -> bool {
		self.outputs.iter().any(|c| c.to == other)
	}

	/// Copy of this node without its connections.
	pub(crate) fn bare(&self) -> Self {
		Node::new(self.id, self.layer, self.activation)
	}
}
