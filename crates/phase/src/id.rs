//! Namespaced identifiers.
//!
//! An [`Identifier`] is a `namespace:path` pair stored as one shared string so
//! clones are a refcount bump. Phases and buses are both named by identifiers.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use crate::error::PhaseError;

/// Namespace applied when a parsed identifier has none.
pub const DEFAULT_NAMESPACE: &str = "phasebus";

/// The phase every event owns; callbacks registered without a phase land here.
pub static DEFAULT_PHASE: LazyLock<PhaseId> =
	LazyLock::new(|| Identifier::from_parts_unchecked(DEFAULT_NAMESPACE, "default"));

/// Phase names are plain identifiers.
pub type PhaseId = Identifier;

/// A `namespace:path` identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
	full: Arc<str>,
	split: usize,
}

impl Identifier {
	/// Builds an identifier from its two halves, validating both.
	pub fn new(namespace: &str, path: &str) -> Result<Self, PhaseError> {
		let input = || format!("{namespace}:{path}");
		if namespace.is_empty() {
			return Err(PhaseError::InvalidIdentifier {
				input: input(),
				reason: "empty namespace",
			});
		}
		if path.is_empty() {
			return Err(PhaseError::InvalidIdentifier {
				input: input(),
				reason: "empty path",
			});
		}
		if !namespace.bytes().all(is_namespace_byte) {
			return Err(PhaseError::InvalidIdentifier {
				input: input(),
				reason: "namespace may only contain [a-z0-9_.-]",
			});
		}
		if !path.bytes().all(is_path_byte) {
			return Err(PhaseError::InvalidIdentifier {
				input: input(),
				reason: "path may only contain [a-z0-9_.-/]",
			});
		}
		Ok(Self::from_parts_unchecked(namespace, path))
	}

	/// Parses `namespace:path`, or a bare `path` in [`DEFAULT_NAMESPACE`].
	pub fn parse(s: &str) -> Result<Self, PhaseError> {
		match s.split_once(':') {
			Some((namespace, path)) => Self::new(namespace, path),
			None => Self::new(DEFAULT_NAMESPACE, s),
		}
	}

	fn from_parts_unchecked(namespace: &str, path: &str) -> Self {
		Self {
			full: Arc::from(format!("{namespace}:{path}")),
			split: namespace.len(),
		}
	}

	#[inline]
	pub fn namespace(&self) -> &str {
		&self.full[..self.split]
	}

	#[inline]
	pub fn path(&self) -> &str {
		&self.full[self.split + 1..]
	}

	#[inline]
	pub fn as_str(&self) -> &str {
		&self.full
	}
}

fn is_namespace_byte(b: u8) -> bool {
	matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'.' | b'-')
}

fn is_path_byte(b: u8) -> bool {
	is_namespace_byte(b) || b == b'/'
}

impl FromStr for Identifier {
	type Err = PhaseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.full)
	}
}

impl fmt::Debug for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Identifier({})", self.full)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_with_namespace() {
		let id = Identifier::parse("mymod:early").unwrap();
		assert_eq!(id.namespace(), "mymod");
		assert_eq!(id.path(), "early");
		assert_eq!(id.to_string(), "mymod:early");
	}

	#[test]
	fn test_parse_bare_path_uses_default_namespace() {
		let id: Identifier = "late".parse().unwrap();
		assert_eq!(id.namespace(), DEFAULT_NAMESPACE);
		assert_eq!(id, Identifier::new("phasebus", "late").unwrap());
	}

	#[test]
	fn test_default_phase() {
		assert_eq!(DEFAULT_PHASE.as_str(), "phasebus:default");
		assert_eq!(DEFAULT_PHASE.path(), "default");
	}

	#[test]
	fn test_rejects_bad_identifiers() {
		for bad in ["", ":x", "x:", "Upper:case", "a:b c", "a:b:c"] {
			let err = Identifier::parse(bad).unwrap_err();
			assert_eq!(err.as_label(), "phase_invalid_identifier", "input {bad:?}");
		}
	}

	#[test]
	fn test_path_may_contain_slashes() {
		let id = Identifier::parse("mymod:render/late").unwrap();
		assert_eq!(id.path(), "render/late");
	}
}
