use std::sync::Arc;

use phasebus_phase::PhaseId;
use rustc_hash::FxHashSet;

use super::{Callback, Event, EventHasher, ListenerKey};
use crate::catalog::ListenerCatalog;
use crate::collection::CallbackOrder;
use crate::compose::{self, Composer};
use crate::error::EventError;
use crate::key::{DEFAULT_QUALIFIER, EventKey};

/// Configures an [`Event`] before creating it.
pub struct EventBuilder<'a, T, K, S> {
	compose: Composer<T>,
	empty: Option<T>,
	qualifier: String,
	default_phases: Vec<PhaseId>,
	order: CallbackOrder,
	hasher: S,
	catalog: Option<&'a ListenerCatalog<K>>,
}

impl<'a, T, K> EventBuilder<'a, T, K, rustc_hash::FxBuildHasher> {
	pub(crate) fn new(compose: Composer<T>) -> Self {
		Self {
			compose,
			empty: None,
			qualifier: DEFAULT_QUALIFIER.to_owned(),
			default_phases: Vec::new(),
			order: CallbackOrder::default(),
			hasher: rustc_hash::FxBuildHasher,
			catalog: None,
		}
	}
}

impl<'a, T, K, S> EventBuilder<'a, T, K, S>
where
	T: Callback,
	K: ListenerKey,
	S: EventHasher,
{
	/// Published when no callbacks are registered; a single callback is then
	/// published directly instead of being composed.
	pub fn empty_implementation(mut self, empty: T) -> Self {
		self.empty = Some(empty);
		self
	}

	pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
		self.qualifier = qualifier.into();
		self
	}

	/// Phases that run in the order given. Repeated calls append.
	pub fn default_phases(mut self, phases: impl IntoIterator<Item = PhaseId>) -> Self {
		self.default_phases.extend(phases);
		self
	}

	/// Keeps each phase ordered by key hash, trading registration order for
	/// logarithmic key search on removal.
	pub fn optimize_removal(mut self, optimize: bool) -> Self {
		self.order = if optimize {
			CallbackOrder::KeyHash
		} else {
			CallbackOrder::Registration
		};
		self
	}

	/// Hasher for the key index, also used for key-hash ordering.
	pub fn hasher<S2: EventHasher>(self, hasher: S2) -> EventBuilder<'a, T, K, S2> {
		EventBuilder {
			compose: self.compose,
			empty: self.empty,
			qualifier: self.qualifier,
			default_phases: self.default_phases,
			order: self.order,
			hasher,
			catalog: self.catalog,
		}
	}

	/// Registers the catalog's listeners for this event once it is built.
	pub fn scanned_from(mut self, catalog: &'a ListenerCatalog<K>) -> Self {
		self.catalog = Some(catalog);
		self
	}

	pub fn build(self) -> Result<Event<T, K, S>, EventError> {
		let mut seen = FxHashSet::default();
		for phase in &self.default_phases {
			if !seen.insert(phase) {
				return Err(EventError::DuplicatePhase {
					phase: phase.clone(),
				});
			}
		}

		let compose: Composer<T> = match self.empty {
			Some(empty) => {
				let inner = self.compose;
				Arc::new(compose::with_empty(empty, move |callbacks: &[T]| inner(callbacks)))
			}
			None => self.compose,
		};

		let event = Event::new(
			EventKey::of::<T>(&self.qualifier),
			compose,
			self.order,
			self.hasher,
		);

		for pair in self.default_phases.windows(2) {
			event.add_phase_ordering(&pair[0], &pair[1])?;
		}

		if let Some(catalog) = self.catalog {
			catalog.add_scanned_listeners(&event);
		}

		Ok(event)
	}
}
