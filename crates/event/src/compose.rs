//! Composition functions.
//!
//! A composer turns the ordered callback sequence of an event into the single
//! invoker callers hold. It must be pure: it may read the slice but must not
//! keep it or depend on anything that changes between registrations.

use std::sync::Arc;

/// Shared composition function.
pub type Composer<T> = Arc<dyn Fn(&[T]) -> T + Send + Sync>;

/// Wraps `compose` so that an empty sequence yields `empty` and a single
/// callback is used directly; only longer sequences reach `compose`.
pub fn with_empty<T, F>(empty: T, compose: F) -> impl Fn(&[T]) -> T + Send + Sync + 'static
where
	T: Clone + Send + Sync + 'static,
	F: Fn(&[T]) -> T + Send + Sync + 'static,
{
	move |callbacks: &[T]| match callbacks {
		[] => empty.clone(),
		[only] => only.clone(),
		_ => compose(callbacks),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_with_empty_short_circuits() {
		let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
		let counted = calls.clone();
		let compose = with_empty(0u32, move |cbs: &[u32]| {
			counted.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
			cbs.iter().sum()
		});

		assert_eq!(compose(&[]), 0);
		assert_eq!(compose(&[7]), 7);
		assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

		assert_eq!(compose(&[1, 2, 3]), 6);
		assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
	}
}
