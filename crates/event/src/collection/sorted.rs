use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};
use std::ops::Range;
use std::sync::Arc;

use super::{PhaseCollection, inserted, removed};
use crate::error::CollectionError;

/// Callbacks ordered by the hash of their key.
///
/// Keys with equal hashes form a run in registration order; lookups binary
/// search for the run and then compare keys inside it, so hash collisions
/// never make two distinct keys ambiguous.
#[derive(Clone, Debug)]
pub struct SortedCallbacks<T, K, S> {
	callbacks: Arc<[T]>,
	keys: Vec<(u64, K)>,
	hasher: S,
}

impl<T, K, S: Default> Default for SortedCallbacks<T, K, S> {
	fn default() -> Self {
		Self::with_hasher(S::default())
	}
}

impl<T, K, S> SortedCallbacks<T, K, S> {
	pub fn with_hasher(hasher: S) -> Self {
		Self {
			callbacks: Arc::from(Vec::new()),
			keys: Vec::new(),
			hasher,
		}
	}

	/// Keys in stored order.
	pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
		self.keys.iter().map(|(_, k)| k)
	}

	/// Index range of the run of keys whose hash equals `hash`.
	fn run(&self, hash: u64) -> Range<usize> {
		let start = self.keys.partition_point(|(h, _)| *h < hash);
		let end = start + self.keys[start..].partition_point(|(h, _)| *h == hash);
		start..end
	}
}

impl<T, K, S> SortedCallbacks<T, K, S>
where
	K: Eq + Hash,
	S: BuildHasher,
{
	fn find(&self, hash: u64, key: &K) -> Result<usize, usize> {
		let run = self.run(hash);
		let end = run.end;
		match self.keys[run.clone()].iter().position(|(_, k)| k == key) {
			Some(offset) => Ok(run.start + offset),
			None => Err(end),
		}
	}
}

impl<T, K, S> PhaseCollection<T, K> for SortedCallbacks<T, K, S>
where
	T: Clone,
	K: Eq + Hash + Debug,
	S: BuildHasher,
{
	fn add(&mut self, key: K, callback: T) -> Result<(), CollectionError> {
		let hash = self.hasher.hash_one(&key);
		let index = match self.find(hash, &key) {
			Ok(_) => return Err(CollectionError::duplicate(&key)),
			Err(index) => index,
		};

		self.callbacks = inserted(&self.callbacks, index, callback);
		self.keys.insert(index, (hash, key));
		Ok(())
	}

	fn remove(&mut self, key: &K) -> Result<T, CollectionError> {
		let hash = self.hasher.hash_one(key);
		let index = self
			.find(hash, key)
			.map_err(|_| CollectionError::unknown(key))?;

		let (next, callback) = removed(&self.callbacks, index);
		self.callbacks = next;
		self.keys.remove(index);
		Ok(callback)
	}

	fn callbacks(&self) -> &[T] {
		&self.callbacks
	}

	fn snapshot(&self) -> Arc<[T]> {
		self.callbacks.clone()
	}

	fn contains(&self, key: &K) -> bool {
		let hash = self.hasher.hash_one(key);
		self.find(hash, key).is_ok()
	}
}
