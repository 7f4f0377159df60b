use derive_more::Display;
use eyre::{eyre, Result};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use super::Problem;

/// Largest supported input count; the truth table has 2^bits rows.
pub const MAX_PARITY_BITS: usize = 16;

/// Even parity of `bits` inputs: the output is 1 when an odd number of inputs are set.
#[derive(Debug, Clone, Display, Serialize)]
#[display("parity{bits}")]
pub struct Parity {
	pub bits: usize,

	#[serde(skip)]
	cases: Vec<(Vec<f64>, Vec<f64>)>,
}

impl Parity {
	pub fn new(bits: usize) -> Result<Self> {
		if bits == 0 || bits > MAX_PARITY_BITS {
			return Err(eyre!("parity needs between 1 and {MAX_PARITY_BITS} bits, got {bits}"));
		}
		let cases = (0..1usize << bits)
			.map(|n| {
				let input: Vec<f64> = (0..bits).map(|b| ((n >> b) & 1) as f64).collect();
				let odd = n.count_ones() % 2;
				(input, vec![odd as f64])
			})
			.collect();
		Ok(Parity { bits, cases })
	}
}

impl<'de> Deserialize<'de> for Parity {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		struct Bits {
			bits: usize,
		}
		let Bits { bits } = Bits::deserialize(deserializer)?;
		Parity::new(bits).map_err(D::Error::custom)
	}
}

impl Problem for Parity {
	fn name(&self) -> String {
		self.to_string()
	}

	fn inputs(&self) -> usize {
		self.bits
	}

	fn outputs(&self) -> usize {
		1
	}

	fn cases(&self) -> &[(Vec<f64>, Vec<f64>)] {
		&self.cases
	}
}
