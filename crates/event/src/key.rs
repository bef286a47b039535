//! Event identity.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Qualifier used when an event does not name one.
pub const DEFAULT_QUALIFIER: &str = "phasebus_default";

/// Identifies an event by its callback type and a qualifier string.
///
/// Two events with the same callback type are told apart by qualifier.
#[derive(Clone)]
pub struct EventKey {
	type_id: TypeId,
	type_name: &'static str,
	qualifier: Arc<str>,
}

impl EventKey {
	pub fn of<T: 'static>(qualifier: &str) -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			type_name: type_name::<T>(),
			qualifier: Arc::from(qualifier),
		}
	}

	/// Key for `T` under [`DEFAULT_QUALIFIER`].
	pub fn of_default<T: 'static>() -> Self {
		Self::of::<T>(DEFAULT_QUALIFIER)
	}

	#[inline]
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	#[inline]
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	#[inline]
	pub fn qualifier(&self) -> &str {
		&self.qualifier
	}

	#[inline]
	pub fn is_default_qualifier(&self) -> bool {
		&*self.qualifier == DEFAULT_QUALIFIER
	}

	/// True if this key names an event whose callbacks are `T`.
	#[inline]
	pub fn holds<T: 'static>(&self) -> bool {
		self.type_id == TypeId::of::<T>()
	}
}

impl PartialEq for EventKey {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id && self.qualifier == other.qualifier
	}
}

impl Eq for EventKey {}

impl Hash for EventKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
		self.qualifier.hash(state);
	}
}

impl fmt::Display for EventKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_default_qualifier() {
			f.write_str(self.type_name)
		} else {
			write!(f, "({}|{})", self.type_name, self.qualifier)
		}
	}
}

impl fmt::Debug for EventKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EventKey({self})")
	}
}
