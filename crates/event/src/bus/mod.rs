//! Named collections of events.
//!
//! # Role
//!
//! An [`EventBus`] maps [`EventKey`]s to events of any callback type sharing
//! one listener key type, so a listener can be registered by event key and
//! removed from every event at once.
//!
//! # Invariants
//!
//! - At most one event per key; adding again replaces the previous entry.
//! - Entries are never removed for the bus's lifetime.
//! - The bus lock is never held while an event is mutated.

#[cfg(test)]
mod tests;

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use phasebus_phase::{Identifier, PhaseId};
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::debug;

use crate::error::EventError;
use crate::event::{Callback, Event, EventHasher, ListenerKey};
use crate::key::EventKey;

/// The key-typed, callback-erased view of an event the bus stores.
trait ErasedEvent<K>: Send + Sync {
	fn unregister_key(&self, key: &K) -> bool;

	fn is_key_registered(&self, key: &K) -> bool;

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T, K, S> ErasedEvent<K> for Event<T, K, S>
where
	T: Callback,
	K: ListenerKey,
	S: EventHasher,
{
	fn unregister_key(&self, key: &K) -> bool {
		self.unregister(key)
	}

	fn is_key_registered(&self, key: &K) -> bool {
		self.is_registered(key)
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

/// A named mapping from event key to event.
pub struct EventBus<K, S = FxBuildHasher> {
	name: Identifier,
	events: RwLock<FxHashMap<EventKey, Arc<dyn ErasedEvent<K>>>>,
	_hasher: PhantomData<fn() -> S>,
}

impl<K, S> EventBus<K, S>
where
	K: ListenerKey,
	S: EventHasher,
{
	pub fn new(name: Identifier) -> Self {
		Self {
			name,
			events: RwLock::new(FxHashMap::default()),
			_hasher: PhantomData,
		}
	}

	#[inline]
	pub fn name(&self) -> &Identifier {
		&self.name
	}

	pub fn len(&self) -> usize {
		self.events.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.read().is_empty()
	}

	pub fn contains(&self, key: &EventKey) -> bool {
		self.events.read().contains_key(key)
	}

	pub fn event_keys(&self) -> Vec<EventKey> {
		self.events.read().keys().cloned().collect()
	}

	/// Adds `event` under `key`, replacing any event already there.
	pub fn add_event<T: Callback>(&self, key: EventKey, event: Arc<Event<T, K, S>>) {
		let replaced = self.events.write().insert(key.clone(), event).is_some();
		debug!(bus = %self.name, event = %key, replaced, "added event to bus");
	}

	/// Adds `event` under its own key.
	pub fn add<T: Callback>(&self, event: Arc<Event<T, K, S>>) {
		self.add_event(event.key().clone(), event);
	}

	/// The event under `key`, typed.
	pub fn event<T: Callback>(&self, key: &EventKey) -> Result<Arc<Event<T, K, S>>, EventError> {
		let erased = self
			.events
			.read()
			.get(key)
			.cloned()
			.ok_or_else(|| EventError::UnknownEvent { key: key.clone() })?;

		erased
			.into_any()
			.downcast::<Event<T, K, S>>()
			.map_err(|_| EventError::EventTypeMismatch {
				key: key.clone(),
				expected: type_name::<T>(),
			})
	}

	/// Registers `callback` under `listener` in `phase` of the event under `key`.
	///
	/// Returns `Ok(false)` if `listener` was already registered there.
	pub fn register_listener<T: Callback>(
		&self,
		key: &EventKey,
		phase: &PhaseId,
		listener: K,
		callback: T,
	) -> Result<bool, EventError> {
		Ok(self
			.event::<T>(key)?
			.register_keyed_in(phase, listener, callback))
	}

	/// Removes `listener` from every event on this bus.
	///
	/// Returns how many events it was removed from.
	pub fn unregister_all(&self, listener: &K) -> usize {
		let events: Vec<_> = self.events.read().values().cloned().collect();
		let removed = events
			.iter()
			.filter(|event| event.unregister_key(listener))
			.count();
		debug!(bus = %self.name, ?listener, removed, "unregistered listener from bus");
		removed
	}

	/// True if `listener` is registered in any event on this bus.
	pub fn is_registered_anywhere(&self, listener: &K) -> bool {
		self.events
			.read()
			.values()
			.any(|event| event.is_key_registered(listener))
	}

	/// The current invoker of the event under `key`.
	pub fn invoker<T: Callback>(&self, key: &EventKey) -> Result<T, EventError> {
		Ok(self.event::<T>(key)?.invoker())
	}

	/// Like [`invoker`](Self::invoker), but `None` for unknown or mistyped keys.
	pub fn try_invoker<T: Callback>(&self, key: &EventKey) -> Option<T> {
		self.invoker(key).ok()
	}
}

impl<K, S> fmt::Debug for EventBus<K, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let events: Vec<_> = self.events.read().keys().cloned().collect();
		f.debug_struct("EventBus")
			.field("name", &self.name)
			.field("events", &events)
			.finish()
	}
}
