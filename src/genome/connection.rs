use serde::{Deserialize, Serialize};

use crate::history::InnovNum;

use super::NodeId;

/// Directed, weighted edge between two nodes of the same genome, from a lower layer to a higher one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	pub from: NodeId,
	pub to: NodeId,
	pub weight: f64,
	pub innovation: InnovNum,
	pub enabled: bool,
}

impl Connection {
	pub fn new(from: NodeId, to: NodeId, weight: f64, innovation: InnovNum) -> Self {
		Connection {
			from,
			to,
			weight,
			innovation,
			enabled: true,
		}
	}
}
