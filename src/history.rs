//! Global innovation history. Two genes are the same innovation when they join the same pair of
//! nodes in genomes holding exactly the same set of innovations.

use std::{
	collections::{BTreeSet, HashMap},
	ops::{Deref, DerefMut},
};

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::genome::{Genome, NodeId};

/// Historical marking of a connection gene. Dense, starting at 0.
#[derive(
	Debug, Display, From, Into, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InnovNum(pub usize);
impl Deref for InnovNum {
	type Target = usize;
	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl DerefMut for InnovNum {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Innovation {
	pub id: InnovNum,
	pub from: NodeId,
	pub to: NodeId,
	/// Innovations the genome held when the gene first appeared.
	pub present: BTreeSet<InnovNum>,
}

/// Append-only innovation ledger, shared by a whole run. Persisted as its list of entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Innovation>", into = "Vec<Innovation>")]
pub struct History {
	innovations: Vec<Innovation>,
	by_endpoints: HashMap<(NodeId, NodeId), Vec<usize>>,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	/// Innovation number for a `from -> to` gene appearing in `genome`. Reuses an entry recorded
	/// for the same endpoints and the same set of existing innovations, or appends a new one.
	pub fn innovation(&mut self, genome: &Genome, from: NodeId, to: NodeId) -> InnovNum {
		let present = genome.innovations();
		let candidates = self.by_endpoints.entry((from, to)).or_default();
		if let Some(&i) = candidates
			.iter()
			.find(|&&i| self.innovations[i].present == present)
		{
			return self.innovations[i].id;
		}

		let id = InnovNum(self.innovations.len());
		candidates.push(self.innovations.len());
		self.innovations.push(Innovation {
			id,
			from,
			to,
			present,
		});
		log::trace!("New innovation {id}: {from} -> {to}");
		id
	}

	pub fn len(&self) -> usize {
		self.innovations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.innovations.is_empty()
	}

	pub fn get(&self, id: InnovNum) -> Option<&Innovation> {
		self.innovations.get(*id)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Innovation> {
		self.innovations.iter()
	}
}

impl PartialEq for History {
	fn eq(&self, other: &Self) -> bool {
		self.innovations == other.innovations
	}
}

impl From<Vec<Innovation>> for History {
	fn from(innovations: Vec<Innovation>) -> Self {
		let mut by_endpoints: HashMap<_, Vec<usize>> = HashMap::new();
		for (i, innovation) in innovations.iter().enumerate() {
			by_endpoints
				.entry((innovation.from, innovation.to))
				.or_default()
				.push(i);
		}
		History {
			innovations,
			by_endpoints,
		}
	}
}

impl From<History> for Vec<Innovation> {
	fn from(history: History) -> Self {
		history.innovations
	}
}
