use crate::error::{BuildconfError, Result};
use std::fmt;
use std::str::FromStr;

/// A tool version as ordered integer components, most significant first.
///
/// Ordering is lexicographic over the components. Only tuples of the same
/// arity are meaningfully compared; constraint evaluation checks that first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTuple(Vec<u64>);

impl VersionTuple {
	pub fn new(components: impl Into<Vec<u64>>) -> Self {
		VersionTuple(components.into())
	}

	/// Number of components.
	pub fn arity(&self) -> usize {
		self.0.len()
	}

	pub fn components(&self) -> &[u64] {
		&self.0
	}
}

impl From<&[u64]> for VersionTuple {
	fn from(components: &[u64]) -> Self {
		VersionTuple(components.to_vec())
	}
}

impl<const N: usize> From<[u64; N]> for VersionTuple {
	fn from(components: [u64; N]) -> Self {
		VersionTuple(components.to_vec())
	}
}

impl FromStr for VersionTuple {
	type Err = BuildconfError;

	/// Parse a dot-separated version such as `3.28.1`.
	fn from_str(s: &str) -> Result<Self> {
		let invalid = || BuildconfError::InvalidVersion {
			version: s.to_string(),
		};

		let trimmed = s.trim();
		if trimmed.is_empty() {
			return Err(invalid());
		}

		trimmed
			.split('.')
			.map(|part| {
				if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
					return Err(invalid());
				}
				part.parse::<u64>().map_err(|_| invalid())
			})
			.collect::<Result<Vec<_>>>()
			.map(VersionTuple)
	}
}

impl fmt::Display for VersionTuple {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self.0.iter().map(u64::to_string).collect();
		f.write_str(&parts.join("."))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_three_components() {
		let v: VersionTuple = "3.28.1".parse().unwrap();
		assert_eq!(v.components(), &[3, 28, 1]);
		assert_eq!(v.arity(), 3);
	}

	#[test]
	fn test_parse_rejects_garbage() {
		for input in ["", "1..2", "1.a", "v1.2", "1.2.", "-1.0", "1.+2"] {
			assert!(
				input.parse::<VersionTuple>().is_err(),
				"{input:?} should not parse"
			);
		}
	}

	#[test]
	fn test_ordering_is_lexicographic() {
		let a = VersionTuple::from([1, 10, 0]);
		let b = VersionTuple::from([1, 9, 99]);
		assert!(a > b);
		assert!(VersionTuple::from([2, 0]) > VersionTuple::from([1, 99]));
		assert_eq!(VersionTuple::from([3, 11]), VersionTuple::from([3, 11]));
	}

	#[test]
	fn test_display_round_trips() {
		let v = VersionTuple::from([2024, 1, 12]);
		assert_eq!(v.to_string(), "2024.1.12");
	}
}
