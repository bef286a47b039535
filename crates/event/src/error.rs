//! Error taxonomy.
//!
//! Two layers of differing strictness:
//!
//! - [`CollectionError`] is raised by per-phase storage and treats a missing or
//!   repeated key as misuse.
//! - [`EventError`] is what the public API returns. Duplicate registration and
//!   unregistering an unknown key are not errors at this layer.

use phasebus_phase::{PhaseError, PhaseId};

use crate::key::EventKey;

/// Per-phase storage errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
	#[error("no listener key: {key}")]
	UnknownKey { key: String },

	#[error("listener key already registered: {key}")]
	DuplicateKey { key: String },
}

impl CollectionError {
	pub(crate) fn unknown(key: &impl std::fmt::Debug) -> Self {
		Self::UnknownKey {
			key: format!("{key:?}"),
		}
	}

	pub(crate) fn duplicate(key: &impl std::fmt::Debug) -> Self {
		Self::DuplicateKey {
			key: format!("{key:?}"),
		}
	}

	/// Short stable label for log fields.
	pub fn as_label(&self) -> &'static str {
		match self {
			CollectionError::UnknownKey { .. } => "collection_unknown_key",
			CollectionError::DuplicateKey { .. } => "collection_duplicate_key",
		}
	}
}

/// Errors surfaced by events, buses and the listener catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
	#[error(transparent)]
	Phase(#[from] PhaseError),

	/// A phase list handed to an event constructor lacks the default phase.
	#[error("default phases must contain {default}")]
	MissingDefaultPhase { default: PhaseId },

	/// A phase list handed to an event constructor names a phase twice.
	#[error("duplicate event phase: {phase}")]
	DuplicatePhase { phase: PhaseId },

	#[error("no event registered under {key}")]
	UnknownEvent { key: EventKey },

	/// The event under `key` does not carry callbacks of the requested type.
	#[error("event {key} does not hold callbacks of type {expected}")]
	EventTypeMismatch { key: EventKey, expected: &'static str },

	/// A discovered listener produced a callback of the wrong type.
	#[error("listener for {event} did not produce a callback of type {expected}")]
	CallbackTypeMismatch { event: EventKey, expected: &'static str },

	/// A listener source failed to scan.
	#[error("listener source {source_name:?} failed: {message}")]
	Scan { source_name: String, message: String },
}

impl EventError {
	/// Short stable label for log fields.
	pub fn as_label(&self) -> &'static str {
		match self {
			EventError::Phase(err) => err.as_label(),
			EventError::MissingDefaultPhase { .. } => "event_missing_default_phase",
			EventError::DuplicatePhase { .. } => "event_duplicate_phase",
			EventError::UnknownEvent { .. } => "event_unknown",
			EventError::EventTypeMismatch { .. } => "event_type_mismatch",
			EventError::CallbackTypeMismatch { .. } => "event_callback_type_mismatch",
			EventError::Scan { .. } => "event_scan_failed",
		}
	}
}
