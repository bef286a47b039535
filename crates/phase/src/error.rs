use crate::id::PhaseId;

/// Errors raised while naming or ordering phases.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
	/// A phase was asked to run before itself.
	#[error("tried to add a phase that depends on itself: {phase}")]
	SelfOrdering { phase: PhaseId },

	/// An identifier string did not have the `namespace:path` shape.
	#[error("invalid identifier {input:?}: {reason}")]
	InvalidIdentifier { input: String, reason: &'static str },
}

impl PhaseError {
	/// Short stable label for log fields.
	pub fn as_label(&self) -> &'static str {
		match self {
			PhaseError::SelfOrdering { .. } => "phase_self_ordering",
			PhaseError::InvalidIdentifier { .. } => "phase_invalid_identifier",
		}
	}
}
