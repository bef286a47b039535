//! Per-phase callback storage.
//!
//! # Role
//!
//! Each phase of an event keeps its `(key, callback)` pairs in one
//! [`PhaseCollection`]. Two strategies exist and one is chosen per event:
//!
//! - [`UnsortedCallbacks`]: registration order, O(1) add, O(n) remove.
//! - [`SortedCallbacks`]: ordered by key hash, O(log n) search on add and remove.
//!
//! # Invariants
//!
//! - The callback array is copy-on-write: a mutation always allocates a new
//!   `Arc<[T]>`, so a [`PhaseCollection::snapshot`] is never changed in place.
//! - A key appears at most once per collection.

mod sorted;
mod unsorted;

use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

pub use sorted::SortedCallbacks;
pub use unsorted::UnsortedCallbacks;

use crate::error::CollectionError;

/// Keyed callback storage for one phase.
pub trait PhaseCollection<T, K> {
	/// Adds `callback` under `key`.
	///
	/// Adding a key already held is an error at this layer.
	fn add(&mut self, key: K, callback: T) -> Result<(), CollectionError>;

	/// Removes the callback stored under `key` and returns it.
	///
	/// Removing an absent key is an error at this layer.
	fn remove(&mut self, key: &K) -> Result<T, CollectionError>;

	/// The current callbacks, in this collection's order.
	fn callbacks(&self) -> &[T];

	/// Shared handle to the current callback array.
	fn snapshot(&self) -> Arc<[T]>;

	fn contains(&self, key: &K) -> bool;

	fn len(&self) -> usize {
		self.callbacks().len()
	}

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Which storage strategy an event uses for every one of its phases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallbackOrder {
	/// Registration order.
	#[default]
	Registration,
	/// Ascending key hash; equal hashes keep registration order.
	KeyHash,
}

impl CallbackOrder {
	pub(crate) fn new_collection<T, K, S>(self, hasher: &S) -> PhaseCallbacks<T, K, S>
	where
		S: Clone,
	{
		match self {
			CallbackOrder::Registration => PhaseCallbacks::Unsorted(UnsortedCallbacks::new()),
			CallbackOrder::KeyHash => PhaseCallbacks::Sorted(SortedCallbacks::with_hasher(hasher.clone())),
		}
	}
}

/// A phase collection of either strategy.
#[derive(Clone, Debug)]
pub enum PhaseCallbacks<T, K, S> {
	Unsorted(UnsortedCallbacks<T, K>),
	Sorted(SortedCallbacks<T, K, S>),
}

impl<T, K, S> PhaseCollection<T, K> for PhaseCallbacks<T, K, S>
where
	T: Clone,
	K: Eq + Hash + Debug,
	S: BuildHasher,
{
	fn add(&mut self, key: K, callback: T) -> Result<(), CollectionError> {
		match self {
			PhaseCallbacks::Unsorted(c) => c.add(key, callback),
			PhaseCallbacks::Sorted(c) => c.add(key, callback),
		}
	}

	fn remove(&mut self, key: &K) -> Result<T, CollectionError> {
		match self {
			PhaseCallbacks::Unsorted(c) => c.remove(key),
			PhaseCallbacks::Sorted(c) => c.remove(key),
		}
	}

	fn callbacks(&self) -> &[T] {
		match self {
			PhaseCallbacks::Unsorted(c) => c.callbacks(),
			PhaseCallbacks::Sorted(c) => c.callbacks(),
		}
	}

	fn snapshot(&self) -> Arc<[T]> {
		match self {
			PhaseCallbacks::Unsorted(c) => c.snapshot(),
			PhaseCallbacks::Sorted(c) => c.snapshot(),
		}
	}

	fn contains(&self, key: &K) -> bool {
		match self {
			PhaseCallbacks::Unsorted(c) => c.contains(key),
			PhaseCallbacks::Sorted(c) => c.contains(key),
		}
	}
}

/// Copies `callbacks` into a new array with `callback` inserted at `index`.
pub(crate) fn inserted<T: Clone>(callbacks: &[T], index: usize, callback: T) -> Arc<[T]> {
	let mut next = Vec::with_capacity(callbacks.len() + 1);
	next.extend_from_slice(&callbacks[..index]);
	next.push(callback);
	next.extend_from_slice(&callbacks[index..]);
	Arc::from(next)
}

/// Copies `callbacks` into a new array without the element at `index`.
pub(crate) fn removed<T: Clone>(callbacks: &[T], index: usize) -> (Arc<[T]>, T) {
	let mut next = Vec::with_capacity(callbacks.len() - 1);
	next.extend_from_slice(&callbacks[..index]);
	next.extend_from_slice(&callbacks[index + 1..]);
	(Arc::from(next), callbacks[index].clone())
}
