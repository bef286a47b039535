use std::fmt::Debug;
use std::sync::Arc;

use super::{PhaseCollection, inserted, removed};
use crate::error::CollectionError;

/// Callbacks in registration order.
///
/// Add appends after a linear duplicate check; remove scans the keys
/// linearly and compacts.
#[derive(Clone, Debug)]
pub struct UnsortedCallbacks<T, K> {
	callbacks: Arc<[T]>,
	keys: Vec<K>,
}

impl<T, K> Default for UnsortedCallbacks<T, K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T, K> UnsortedCallbacks<T, K> {
	pub fn new() -> Self {
		Self {
			callbacks: Arc::from(Vec::new()),
			keys: Vec::new(),
		}
	}

	pub fn keys(&self) -> &[K] {
		&self.keys
	}
}

impl<T, K> PhaseCollection<T, K> for UnsortedCallbacks<T, K>
where
	T: Clone,
	K: Eq + Debug,
{
	fn add(&mut self, key: K, callback: T) -> Result<(), CollectionError> {
		if self.keys.contains(&key) {
			return Err(CollectionError::duplicate(&key));
		}
		self.callbacks = inserted(&self.callbacks, self.callbacks.len(), callback);
		self.keys.push(key);
		Ok(())
	}

	fn remove(&mut self, key: &K) -> Result<T, CollectionError> {
		let index = self
			.keys
			.iter()
			.position(|k| k == key)
			.ok_or_else(|| CollectionError::unknown(key))?;

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
		self.keys.contains(key)
	}
}
