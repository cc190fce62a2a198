use crate::error::{BuildconfError, Result};
use crate::version::tuple::VersionTuple;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(<=|>=|<|>|=)(\d+(?:\.\d+)*)\s*$").expect("clause regex is valid")
});

/// Comparison operator of a constraint clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
	Eq,
	Lt,
	Le,
	Gt,
	Ge,
}

impl Comparator {
	fn from_token(token: &str) -> Option<Self> {
		match token {
			"=" => Some(Comparator::Eq),
			"<" => Some(Comparator::Lt),
			"<=" => Some(Comparator::Le),
			">" => Some(Comparator::Gt),
			">=" => Some(Comparator::Ge),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Comparator::Eq => "=",
			Comparator::Lt => "<",
			Comparator::Le => "<=",
			Comparator::Gt => ">",
			Comparator::Ge => ">=",
		}
	}

	/// Whether `version <op> reference` holds, given `version.cmp(reference)`.
	pub fn accepts(&self, ordering: Ordering) -> bool {
		match self {
			Comparator::Eq => ordering == Ordering::Equal,
			Comparator::Lt => ordering == Ordering::Less,
			Comparator::Le => ordering != Ordering::Greater,
			Comparator::Gt => ordering == Ordering::Greater,
			Comparator::Ge => ordering != Ordering::Less,
		}
	}
}

/// One comparator and reference version, e.g. `>=1.2.3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
	pub comparator: Comparator,
	pub reference: VersionTuple,
}

impl Clause {
	/// Parse a single clause.
	///
	/// With `arity` set, the reference version must have exactly that many
	/// components. `constraint` is the full constraint text, reported on
	/// failure.
	fn parse(text: &str, arity: Option<usize>, constraint: &str) -> Result<Self> {
		let malformed = || BuildconfError::MalformedConstraint {
			constraint: constraint.to_string(),
		};

		let captures = CLAUSE_RE.captures(text).ok_or_else(malformed)?;
		let comparator = Comparator::from_token(&captures[1]).ok_or_else(malformed)?;
		let reference = captures[2]
			.split('.')
			.map(|part| part.parse::<u64>().map_err(|_| malformed()))
			.collect::<Result<Vec<_>>>()
			.map(VersionTuple::new)?;

		if arity.is_some_and(|n| n != reference.arity()) {
			return Err(malformed());
		}

		Ok(Clause {
			comparator,
			reference,
		})
	}

	pub fn holds(&self, version: &VersionTuple) -> bool {
		self.comparator.accepts(version.cmp(&self.reference))
	}
}

impl fmt::Display for Clause {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.comparator.as_str(), self.reference)
	}
}

/// A comma-separated list of clauses that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
	clauses: Vec<Clause>,
}

impl Constraint {
	/// Parse every clause, requiring references of the given arity.
	pub fn parse(constraint: &str, arity: usize) -> Result<Self> {
		Self::parse_clauses(constraint, Some(arity))
	}

	/// Parse every clause without fixing the arity of the references.
	///
	/// Used to check configured constraints before any tool version is known.
	pub fn parse_unchecked(constraint: &str) -> Result<Self> {
		Self::parse_clauses(constraint, None)
	}

	fn parse_clauses(constraint: &str, arity: Option<usize>) -> Result<Self> {
		let clauses = constraint
			.split(',')
			.map(|text| Clause::parse(text, arity, constraint))
			.collect::<Result<Vec<_>>>()?;
		Ok(Constraint { clauses })
	}

	pub fn clauses(&self) -> &[Clause] {
		&self.clauses
	}

	/// Whether every clause holds for `version`.
	pub fn matches(&self, version: &VersionTuple) -> bool {
		self.clauses.iter().all(|clause| clause.holds(version))
	}
}

impl fmt::Display for Constraint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts: Vec<String> = self.clauses.iter().map(Clause::to_string).collect();
		f.write_str(&parts.join(","))
	}
}

/// Check a discovered version against a constraint string.
///
/// Clauses are parsed and evaluated in order. The first clause that does not
/// hold makes the result `false`; clauses after it are not looked at. A
/// clause that cannot be parsed, or whose reference has a different number
/// of components than `version`, fails with
/// [`BuildconfError::MalformedConstraint`].
pub fn satisfies(version: &VersionTuple, constraint: &str) -> Result<bool> {
	for text in constraint.split(',') {
		let clause = Clause::parse(text, Some(version.arity()), constraint)?;
		if !clause.holds(version) {
			return Ok(false);
		}
	}
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn v<const N: usize>(components: [u64; N]) -> VersionTuple {
		VersionTuple::from(components)
	}

	#[test]
	fn test_range_with_three_components() {
		assert!(satisfies(&v([1, 2, 3]), ">=1.2.0,<2.0.0").unwrap());
		assert!(!satisfies(&v([2, 0, 0]), ">=1.2.0,<2.0.0").unwrap());
	}

	#[test]
	fn test_equality_with_two_components() {
		assert!(satisfies(&v([3, 11]), "=3.11").unwrap());
		assert!(!satisfies(&v([3, 10]), "=3.11").unwrap());
	}

	#[test]
	fn test_second_clause_fails() {
		assert!(!satisfies(&v([1, 5, 0]), ">=1.0.0,<1.4.0").unwrap());
	}

	#[test]
	fn test_each_comparator() {
		let version = v([1, 2, 3]);
		assert!(satisfies(&version, "<1.2.4").unwrap());
		assert!(!satisfies(&version, "<1.2.3").unwrap());
		assert!(satisfies(&version, "<=1.2.3").unwrap());
		assert!(!satisfies(&version, "<=1.2.2").unwrap());
		assert!(satisfies(&version, ">1.2.2").unwrap());
		assert!(!satisfies(&version, ">1.2.3").unwrap());
		assert!(satisfies(&version, ">=1.2.3").unwrap());
		assert!(!satisfies(&version, ">=1.3.0").unwrap());
	}

	#[test]
	fn test_comparison_is_numeric_not_textual() {
		assert!(satisfies(&v([1, 10, 0]), ">1.9.0").unwrap());
		assert!(satisfies(&v([2024, 2, 14]), ">=2023.12.31").unwrap());
	}

	#[test]
	fn test_unknown_comparator_is_malformed() {
		let err = satisfies(&v([1, 2, 3]), "~>1.2.3").unwrap_err();
		match err {
			BuildconfError::MalformedConstraint { constraint } => {
				assert_eq!(constraint, "~>1.2.3");
			}
			_ => panic!("Expected MalformedConstraint error"),
		}
	}

	#[test]
	fn test_arity_mismatch_is_malformed() {
		assert!(matches!(
			satisfies(&v([1, 2, 3]), ">=1.2"),
			Err(BuildconfError::MalformedConstraint { .. })
		));
		assert!(matches!(
			satisfies(&v([3, 11]), "=3.11.0"),
			Err(BuildconfError::MalformedConstraint { .. })
		));
	}

	#[test]
	fn test_malformed_clause_reports_whole_constraint() {
		let err = satisfies(&v([1, 2, 3]), ">=1.0.0,<2.x.0").unwrap_err();
		assert!(matches!(
			err,
			BuildconfError::MalformedConstraint { ref constraint } if constraint == ">=1.0.0,<2.x.0"
		));
	}

	#[test]
	fn test_empty_constraint_is_malformed() {
		assert!(satisfies(&v([1, 0, 0]), "").is_err());
		assert!(satisfies(&v([1, 0, 0]), ">=1.0.0,").is_err());
	}

	#[test]
	fn test_evaluation_stops_at_first_failing_clause() {
		// The trailing clause is never parsed once an earlier one fails.
		assert!(!satisfies(&v([2, 0, 0]), "<1.0.0,garbage").unwrap());
		assert!(satisfies(&v([0, 5, 0]), "<1.0.0,garbage").is_err());
	}

	#[test]
	fn test_whitespace_around_clauses_is_tolerated() {
		assert!(satisfies(&v([1, 2, 3]), ">=1.2.0, <2.0.0").unwrap());
	}

	#[test]
	fn test_parse_builds_typed_clauses() {
		let constraint = Constraint::parse(">=1.2.0,<2.0.0", 3).unwrap();
		assert_eq!(
			constraint.clauses(),
			&[
				Clause {
					comparator: Comparator::Ge,
					reference: v([1, 2, 0]),
				},
				Clause {
					comparator: Comparator::Lt,
					reference: v([2, 0, 0]),
				},
			]
		);
		assert_eq!(constraint.to_string(), ">=1.2.0,<2.0.0");
		assert!(constraint.matches(&v([1, 9, 9])));
		assert!(!constraint.matches(&v([2, 0, 0])));
	}

	#[test]
	fn test_parse_unchecked_allows_any_arity() {
		let constraint = Constraint::parse_unchecked(">=2023.1.1,<3").unwrap();
		assert_eq!(constraint.clauses().len(), 2);
		assert!(Constraint::parse(">=2023.1.1,<3", 3).is_err());
		assert!(Constraint::parse_unchecked("==1.0").is_err());
	}
}
