use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::history::History;

/// Run-wide mutable state: the seeded generator and the innovation history.
/// Passed explicitly to everything that draws randomness or creates genes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
	pub(crate) rng: Pcg64Mcg,
	pub history: History,
}

impl Context {
	pub fn new(seed: u64) -> Self {
		Self {
			rng: Pcg64Mcg::seed_from_u64(seed),
			history: History::new(),
		}
	}

	#[inline]
	pub fn rng(&mut self) -> &mut impl Rng {
		&mut self.rng
	}
}
