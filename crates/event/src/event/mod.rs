//! Phased callback events with atomic invoker publication.
//!
//! # Role
//!
//! An [`Event`] owns the phases of one topic, their callback collections, a
//! key index, and the currently published invoker. Readers load the invoker
//! without locking; writers serialize on one mutex per event.
//!
//! # Invariants
//!
//! - The published callback sequence is exactly the concatenation of every
//!   phase's callbacks in current phase order.
//! - A key is registered in at most one phase at a time.
//! - Mutation is all-or-nothing: changes are staged on a copy of the phase
//!   table, composed, and only then committed and published. A panicking
//!   composer leaves the previous state and invoker in place.
//! - A composer must not mutate the event that is composing it; the writer
//!   lock is held while it runs.

mod builder;

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use arc_swap::ArcSwap;
pub use builder::EventBuilder;
use dashmap::DashMap;
use parking_lot::Mutex;
use phasebus_phase::{DEFAULT_PHASE, PhaseError, PhaseGraph, PhaseId};
use rustc_hash::FxBuildHasher;
use tracing::{debug, error};

use crate::collection::{CallbackOrder, PhaseCallbacks, PhaseCollection};
use crate::compose::{self, Composer};
use crate::error::EventError;
use crate::key::EventKey;

/// Marker for types usable as event callbacks.
pub trait Callback: Clone + Send + Sync + 'static {}
impl<T> Callback for T where T: Clone + Send + Sync + 'static {}

/// Marker for types usable as listener keys.
pub trait ListenerKey: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}
impl<K> ListenerKey for K where K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static {}

/// Marker for hashers usable by events.
pub trait EventHasher: BuildHasher + Clone + Send + Sync + 'static {}
impl<S> EventHasher for S where S: BuildHasher + Clone + Send + Sync + 'static {}

/// One atomically published state: the flat callback sequence and the
/// invoker composed from it.
pub struct Published<T> {
	callbacks: Arc<[T]>,
	invoker: T,
}

impl<T> Published<T> {
	#[inline]
	pub fn callbacks(&self) -> &Arc<[T]> {
		&self.callbacks
	}

	#[inline]
	pub fn invoker(&self) -> &T {
		&self.invoker
	}
}

/// Writer-side state; only touched under the event's lock.
#[derive(Clone)]
struct EventState<T, K, S> {
	phases: PhaseGraph<PhaseCallbacks<T, K, S>>,
}

/// A set of callbacks grouped into ordered phases.
pub struct Event<T, K, S = FxBuildHasher> {
	key: EventKey,
	compose: Composer<T>,
	order: CallbackOrder,
	hasher: S,
	state: Mutex<EventState<T, K, S>>,
	index: DashMap<K, PhaseId, S>,
	published: ArcSwap<Published<T>>,
}

impl<T, K> Event<T, K, FxBuildHasher>
where
	T: Callback,
	K: ListenerKey,
{
	/// Creates an event whose invoker is built by `compose`.
	pub fn create(compose: impl Fn(&[T]) -> T + Send + Sync + 'static) -> Self {
		Self::new(
			EventKey::of_default::<T>(),
			Arc::new(compose),
			CallbackOrder::default(),
			FxBuildHasher,
		)
	}

	/// Creates an event that publishes `empty` with no callbacks, the callback
	/// itself with exactly one, and `compose`'s output otherwise.
	pub fn create_with_empty(
		empty: T,
		compose: impl Fn(&[T]) -> T + Send + Sync + 'static,
	) -> Self {
		Self::create(compose::with_empty(empty, compose))
	}

	/// Creates an event whose phases run in the order given.
	///
	/// `phases` must contain [`DEFAULT_PHASE`] and no duplicates.
	pub fn create_with_phases(
		compose: impl Fn(&[T]) -> T + Send + Sync + 'static,
		phases: &[PhaseId],
	) -> Result<Self, EventError> {
		if !phases.contains(&*DEFAULT_PHASE) {
			return Err(EventError::MissingDefaultPhase {
				default: DEFAULT_PHASE.clone(),
			});
		}
		Self::builder(compose).default_phases(phases.iter().cloned()).build()
	}

	pub fn builder<'a>(
		compose: impl Fn(&[T]) -> T + Send + Sync + 'static,
	) -> EventBuilder<'a, T, K, FxBuildHasher> {
		EventBuilder::new(Arc::new(compose))
	}
}

impl<T, K, S> Event<T, K, S>
where
	T: Callback,
	K: ListenerKey,
	S: EventHasher,
{
	pub(crate) fn new(key: EventKey, compose: Composer<T>, order: CallbackOrder, hasher: S) -> Self {
		let callbacks: Arc<[T]> = Arc::from(Vec::new());
		let invoker = compose(&callbacks);
		Self {
			key,
			compose,
			order,
			index: DashMap::with_hasher(hasher.clone()),
			hasher,
			state: Mutex::new(EventState {
				phases: PhaseGraph::new(),
			}),
			published: ArcSwap::from_pointee(Published { callbacks, invoker }),
		}
	}

	#[inline]
	pub fn key(&self) -> &EventKey {
		&self.key
	}

	#[inline]
	pub fn qualifier(&self) -> &str {
		self.key.qualifier()
	}

	#[inline]
	pub fn callback_order(&self) -> CallbackOrder {
		self.order
	}

	/// Registers `callback` under `key` in the default phase.
	pub fn register_keyed(&self, key: K, callback: T) -> bool {
		self.register_keyed_in(&DEFAULT_PHASE, key, callback)
	}

	/// Registers `callback` under `key` in `phase`, creating the phase if needed.
	///
	/// Returns `false` without changing anything if `key` is already
	/// registered in any phase of this event.
	pub fn register_keyed_in(&self, phase: &PhaseId, key: K, callback: T) -> bool {
		let mut state = self.state.lock();
		if self.index.contains_key(&key) {
			debug!(event = %self.key, ?key, "listener key already registered; ignoring");
			return false;
		}

		let mut next = state.clone();
		let collection = next
			.phases
			.get_or_insert_with(phase, true, || self.order.new_collection(&self.hasher));
		if let Err(err) = collection.add(key.clone(), callback) {
			error!(event = %self.key, %phase, error = %err, label = err.as_label(), "phase storage rejected listener");
			return false;
		}

		let published = self.compose_published(&next);
		*state = next;
		self.index.insert(key.clone(), phase.clone());
		self.published.store(Arc::new(published));
		debug!(event = %self.key, %phase, ?key, "registered listener");
		true
	}

	/// Removes the callback registered under `key`.
	///
	/// Returns `false` if `key` is not registered.
	pub fn unregister(&self, key: &K) -> bool {
		let mut state = self.state.lock();
		let Some(phase) = self.index.get(key).map(|entry| entry.value().clone()) else {
			return false;
		};

		let mut next = state.clone();
		let removed = match next.phases.get_mut(&phase) {
			Some(collection) => collection.remove(key),
			None => {
				error!(event = %self.key, %phase, ?key, "key index points at a missing phase");
				return false;
			}
		};
		if let Err(err) = removed {
			error!(event = %self.key, %phase, error = %err, label = err.as_label(), "phase storage out of sync with key index");
			return false;
		}

		let published = self.compose_published(&next);
		*state = next;
		self.index.remove(key);
		self.published.store(Arc::new(published));
		debug!(event = %self.key, %phase, ?key, "unregistered listener");
		true
	}

	/// True if `key` is registered in any phase. Never blocks on writers.
	#[inline]
	pub fn is_registered(&self, key: &K) -> bool {
		self.index.contains_key(key)
	}

	/// Phase `key` is registered in.
	pub fn phase_of(&self, key: &K) -> Option<PhaseId> {
		self.index.get(key).map(|entry| entry.value().clone())
	}

	/// Requires callbacks in `first` to run before callbacks in `second`.
	///
	/// Both phases are created if unknown. Orderings that close a cycle are
	/// accepted and logged; the phases then keep a stable fallback order.
	pub fn add_phase_ordering(&self, first: &PhaseId, second: &PhaseId) -> Result<(), EventError> {
		if first == second {
			return Err(PhaseError::SelfOrdering {
				phase: first.clone(),
			}
			.into());
		}

		let mut state = self.state.lock();
		let mut next = state.clone();
		let report = next
			.phases
			.link(first, second, || self.order.new_collection(&self.hasher))?;

		let published = self.compose_published(&next);
		*state = next;
		self.published.store(Arc::new(published));
		debug!(
			event = %self.key,
			%first,
			%second,
			cycles = report.cycles.len(),
			"added phase ordering"
		);
		Ok(())
	}

	/// The currently published invoker.
	///
	/// Do not hold on to it across registration changes; a newer one may be
	/// published at any time.
	#[inline]
	pub fn invoker(&self) -> T {
		self.published.load().invoker.clone()
	}

	/// The currently published state, invoker and callbacks together.
	#[inline]
	pub fn published(&self) -> Arc<Published<T>> {
		self.published.load_full()
	}

	/// The flat callback sequence behind the current invoker.
	#[inline]
	pub fn callbacks(&self) -> Arc<[T]> {
		self.published.load().callbacks.clone()
	}

	/// Number of registered callbacks across all phases.
	#[inline]
	pub fn len(&self) -> usize {
		self.published.load().callbacks.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Phase ids in current sorted order.
	pub fn phases(&self) -> Vec<PhaseId> {
		self.state.lock().phases.sorted_ids()
	}

	fn compose_published(&self, state: &EventState<T, K, S>) -> Published<T> {
		let callbacks = flatten(&state.phases);
		let invoker = (self.compose)(&callbacks);
		Published { callbacks, invoker }
	}
}

/// Self-keyed registration, for callbacks that can serve as their own key.
impl<T, S> Event<T, T, S>
where
	T: Callback + ListenerKey,
	S: EventHasher,
{
	/// Registers `callback` in the default phase, keyed by itself.
	pub fn register(&self, callback: T) -> bool {
		self.register_keyed(callback.clone(), callback)
	}

	/// Registers `callback` in `phase`, keyed by itself.
	pub fn register_in(&self, phase: &PhaseId, callback: T) -> bool {
		self.register_keyed_in(phase, callback.clone(), callback)
	}
}

/// Concatenates every phase's callbacks in sorted order.
///
/// A lone phase's array is shared rather than copied.
fn flatten<T, K, S>(phases: &PhaseGraph<PhaseCallbacks<T, K, S>>) -> Arc<[T]>
where
	T: Clone,
	K: Eq + Hash + fmt::Debug,
	S: BuildHasher,
{
	if phases.len() == 1
		&& let Some((_, only)) = phases.iter_sorted().next()
	{
		return only.snapshot();
	}

	let total = phases.iter_sorted().map(|(_, c)| c.len()).sum();
	let mut callbacks = Vec::with_capacity(total);
	for (_, collection) in phases.iter_sorted() {
		callbacks.extend_from_slice(collection.callbacks());
	}
	Arc::from(callbacks)
}

impl<T, K, S> fmt::Debug for Event<T, K, S>
where
	K: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let phases = self.state.lock().phases.sorted_ids();
		f.debug_struct("Event")
			.field("key", &self.key)
			.field("order", &self.order)
			.field("phases", &phases)
			.field("len", &self.published.load().callbacks.len())
			.finish_non_exhaustive()
	}
}
