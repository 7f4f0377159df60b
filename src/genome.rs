//! Network genomes: a layered arena of nodes, each owning its outgoing connections.

use std::{collections::BTreeSet, fmt, fs, path::Path};

use eyre::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slab::Slab;

use crate::{activation::Activation, context::Context, error::NeatError, history::InnovNum};

pub mod connection;
pub mod node;

pub use connection::Connection;
pub use node::{Node, NodeId};

/// A network genome. Nodes are stored in a slab keyed by [`NodeId`], and kept in evaluation
/// order: by layer, then by id. Input nodes come first, then the bias node, and the output nodes
/// are always the last `output_count` nodes of the evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
	nodes: Slab<Node>,
	order: Vec<NodeId>, // evaluation order, (layer, id)
	input_count: usize,
	output_count: usize,
	bias: NodeId,
	layers: usize,
}

impl Genome {
	fn empty(input_count: usize, output_count: usize) -> Self {
		Genome {
			nodes: Slab::with_capacity(input_count + output_count + 1),
			order: Vec::new(),
			input_count,
			output_count,
			bias: NodeId(input_count),
			layers: 0,
		}
	}

	/// Minimal genome: inputs and bias in layer 0, sigmoid outputs in layer 1, fully connected.
	/// Every connection goes through the innovation history of `ctx`.
	pub fn new(ctx: &mut Context, input_count: usize, output_count: usize) -> Self {
		let mut genome = Genome::empty(input_count, output_count);

		let inputs: Vec<NodeId> = (0..input_count)
			.map(|_| genome.push_node(0, Activation::Identity))
			.collect();
		genome.bias = genome.push_node(0, Activation::Identity);
		let outputs: Vec<NodeId> = (0..output_count)
			.map(|_| genome.push_node(1, Activation::Sigmoid))
			.collect();
		genome.layers = 2;
		genome.sort_nodes();

		let bias = genome.bias;
		for &from in inputs.iter().chain(Some(&bias)) {
			for &to in &outputs {
				genome.add_connection(ctx, from, to, None);
			}
		}
		genome
	}

	/// Same nodes, no connections.
	pub(crate) fn without_connections(&self) -> Self {
		let mut nodes = Slab::with_capacity(self.nodes.capacity());
		for (key, node) in &self.nodes {
			let entry = nodes.vacant_entry();
			debug_assert_eq!(entry.key(), key, "genome node keys are contiguous");
			entry.insert(node.bare());
		}
		Genome {
			nodes,
			order: self.order.clone(),
			input_count: self.input_count,
			output_count: self.output_count,
			bias: self.bias,
			layers: self.layers,
		}
	}

	fn push_node(&mut self, layer: usize, activation: Activation) -> NodeId {
		let entry = self.nodes.vacant_entry();
		let id = NodeId(entry.key());
		entry.insert(Node::new(id, layer, activation));
		id
	}

	fn sort_nodes(&mut self) {
		let mut order: Vec<NodeId> = self.nodes.iter().map(|(key, _)| NodeId(key)).collect();
		order.sort_by_key(|&id| (self.nodes[*id].layer, id));
		self.order = order;
	}

	pub fn input_count(&self) -> usize {
		self.input_count
	}

	pub fn output_count(&self) -> usize {
		self.output_count
	}

	pub fn bias(&self) -> NodeId {
		self.bias
	}

	pub fn layers(&self) -> usize {
		self.layers
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn node(&self, id: NodeId) -> &Node {
		self.nodes.get(*id).expect("valid node id")
	}

	pub fn get_node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(*id)
	}

	/// Nodes in evaluation order.
	pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
		self.order.iter().map(move |&id| &self.nodes[*id])
	}

	/// All connections, grouped by source node in evaluation order.
	pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
		self.nodes().flat_map(|node| node.outputs.iter())
	}

	pub fn connections_mut(&mut self) -> impl Iterator<Item = &mut Connection> + '_ {
		self.nodes
			.iter_mut()
			.flat_map(|(_, node)| node.outputs.iter_mut())
	}

	pub fn connection_count(&self) -> usize {
		self.nodes.iter().map(|(_, node)| node.outputs.len()).sum()
	}

	pub fn connection(&self, innovation: InnovNum) -> Option<&Connection> {
		self.connections().find(|c| c.innovation == innovation)
	}

	/// Innovation numbers of every connection, enabled or not.
	pub fn innovations(&self) -> BTreeSet<InnovNum> {
		self.connections().map(|c| c.innovation).collect()
	}

	pub fn max_innovation(&self) -> Option<InnovNum> {
		self.connections().map(|c| c.innovation).max()
	}

	/// Whether every node already connects to every node in all later layers.
	pub fn fully_connected(&self) -> bool {
		let mut per_layer = vec![0usize; self.layers];
		for (_, node) in &self.nodes {
			per_layer[node.layer] += 1;
		}
		let mut possible = 0;
		let mut in_front = 0;
		for &count in per_layer.iter().rev() {
			possible += count * in_front;
			in_front += count;
		}
		self.connection_count() == possible
	}

	/// Connects `from` to `to`, registering the gene in the innovation history. A missing weight is
	/// drawn uniformly from [-1, 1].
	pub fn add_connection(
		&mut self,
		ctx: &mut Context,
		from: NodeId,
		to: NodeId,
		weight: Option<f64>,
	) -> InnovNum {
		debug_assert!(
			self.node(from).layer < self.node(to).layer,
			"connection {from} -> {to} must run forward"
		);
		let innovation = ctx.history.innovation(self, from, to);
		let weight = weight.unwrap_or_else(|| ctx.rng.random_range(-1.0..=1.0));
		self.nodes[*from]
			.outputs
			.push(Connection::new(from, to, weight, innovation));
		innovation
	}

	/// Appends an already numbered gene. Used when assembling offspring.
	pub(crate) fn push_connection(&mut self, connection: Connection) {
		self.nodes[*connection.from].outputs.push(connection);
	}

	/// Splits the connection `innovation` leaving `from` with a new hidden node. The old connection
	/// is disabled; the new node receives weight 1 from the source, passes the old weight on to the
	/// target, and gets a zero weight from the bias. When source and target sit in adjacent layers,
	/// every later layer shifts up by one to make room.
	pub fn split_connection(
		&mut self,
		ctx: &mut Context,
		from: NodeId,
		innovation: InnovNum,
		activation: Activation,
	) -> NodeId {
		let (to, weight) = {
			let connection = self.nodes[*from]
				.outputs
				.iter_mut()
				.find(|c| c.innovation == innovation)
				.expect("connection leaves its source node");
			connection.enabled = false;
			(connection.to, connection.weight)
		};

		let layer = self.node(from).layer;
		if self.node(to).layer == layer + 1 {
			for (_, node) in self.nodes.iter_mut() {
				if node.layer > layer {
					node.layer += 1;
				}
			}
			self.layers += 1;
		}

		let hidden = self.push_node(layer + 1, activation);
		self.sort_nodes();

		let bias = self.bias;
		self.add_connection(ctx, from, hidden, Some(1.0));
		self.add_connection(ctx, hidden, to, Some(weight));
		self.add_connection(ctx, bias, hidden, Some(0.0));
		hidden
	}

	/// Feeds `inputs` through the network and returns the output node values, in order.
	pub fn propagate(&mut self, inputs: &[f64]) -> Vec<f64> {
		assert_eq!(
			inputs.len(),
			self.input_count,
			"genome expects {} inputs",
			self.input_count
		);

		for (_, node) in self.nodes.iter_mut() {
			node.input = 0.0;
		}
		for (i, &value) in inputs.iter().enumerate() {
			self.nodes[i].input = value;
		}
		self.nodes[*self.bias].input = 1.0;

		for &id in &self.order {
			let output = self.nodes[*id].output();
			for k in 0..self.nodes[*id].outputs.len() {
				let connection = &self.nodes[*id].outputs[k];
				if !connection.enabled {
					continue;
				}
				let (to, weight) = (connection.to, connection.weight);
				self.nodes[*to].input += output * weight;
			}
		}

		self.order[self.order.len() - self.output_count..]
			.iter()
			.map(|&id| self.nodes[*id].output())
			.collect()
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		let json = serde_json::to_string(self)?;
		fs::write(path, json).map_err(|e| NeatError::io(path, e))?;
		Ok(())
	}

	pub fn load(path: &Path) -> Result<Self> {
		let json = fs::read_to_string(path).map_err(|e| NeatError::io(path, e))?;
		let genome = serde_json::from_str(&json).map_err(|e| NeatError::SnapshotCorrupt {
			path: path.to_owned(),
			reason: e.to_string(),
		})?;
		Ok(genome)
	}
}

impl fmt::Display for Genome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"Genome({} inputs, {} outputs, {} layers)",
			self.input_count, self.output_count, self.layers
		)?;
		for node in self.nodes() {
			write!(f, "\t{} [layer {}, {}]", node.id, node.layer, node.activation)?;
			for c in node.outputs() {
				write!(f, " ->{}", c.to)?;
				if !c.enabled {
					write!(f, "(off)")?;
				}
				write!(f, " {:.3} #{};", c.weight, c.innovation)?;
			}
			writeln!(f)?;
		}
		Ok(())
	}
}
