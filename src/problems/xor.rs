use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::Problem;

/// Two-input exclusive or.
#[derive(Debug, Clone, Display, Serialize, Deserialize)]
#[display("xor")]
pub struct Xor {
	#[serde(skip, default = "truth_table")]
	cases: Vec<(Vec<f64>, Vec<f64>)>,
}

fn truth_table() -> Vec<(Vec<f64>, Vec<f64>)> {
	vec![
		(vec![0.0, 0.0], vec![0.0]),
		(vec![0.0, 1.0], vec![1.0]),
		(vec![1.0, 0.0], vec![1.0]),
		(vec![1.0, 1.0], vec![0.0]),
	]
}

impl Xor {
	pub fn new() -> Self {
		Xor {
			cases: truth_table(),
		}
	}
}

impl Default for Xor {
	fn default() -> Self {
		Self::new()
	}
}

impl Problem for Xor {
	fn name(&self) -> String {
		self.to_string()
	}

	fn inputs(&self) -> usize {
		2
	}

	fn outputs(&self) -> usize {
		1
	}

	fn cases(&self) -> &[(Vec<f64>, Vec<f64>)] {
		&self.cases
	}
}
