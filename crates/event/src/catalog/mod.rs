//! Discovered listeners awaiting their events.
//!
//! # Role
//!
//! A [`ListenerCatalog`] is filled once from external [`ListenerSource`]s (or
//! by hand with [`ListenerCatalog::offer`]) and consumed by events as they are
//! created. The catalog is owned by the caller; nothing here is global.
//!
//! # Invariants
//!
//! - Listeners for one event are handed out in the order they were discovered,
//!   sources in the order given, so unsorted phases see a deterministic order.
//! - A listener whose factory produces the wrong callback type is logged and
//!   skipped; it never reaches an event.


use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use phasebus_phase::PhaseId;
use rustc_hash::FxHashMap;
use tracing::{error, info, warn};

use crate::config::ScanConfig;
use crate::error::EventError;
use crate::event::{Callback, Event, EventHasher, ListenerKey};
use crate::key::EventKey;

type CallbackFactory = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Error type listener sources may fail with.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// A listener found by discovery: which event and phase it belongs to, the
/// key to register it under, and how to make its callback.
#[derive(Clone)]
pub struct DiscoveredListener<K> {
	event: EventKey,
	phase: PhaseId,
	key: K,
	origin: Arc<str>,
	factory: CallbackFactory,
}

impl<K> DiscoveredListener<K> {
	pub fn new<T, F>(event: EventKey, phase: PhaseId, key: K, factory: F) -> Self
	where
		T: Send + 'static,
		F: Fn() -> T + Send + Sync + 'static,
	{
		Self {
			event,
			phase,
			key,
			origin: Arc::from("<unknown>"),
			factory: Arc::new(move || Box::new(factory()) as Box<dyn Any + Send>),
		}
	}

	/// Names where this listener came from, for diagnostics.
	pub fn with_origin(mut self, origin: &str) -> Self {
		self.origin = Arc::from(origin);
		self
	}

	#[inline]
	pub fn event(&self) -> &EventKey {
		&self.event
	}

	#[inline]
	pub fn phase(&self) -> &PhaseId {
		&self.phase
	}

	#[inline]
	pub fn key(&self) -> &K {
		&self.key
	}

	#[inline]
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Runs the factory and checks the callback has type `T`.
	pub fn create_callback<T: 'static>(&self) -> Result<T, EventError> {
		(self.factory)()
			.downcast::<T>()
			.map(|boxed| *boxed)
			.map_err(|_| EventError::CallbackTypeMismatch {
				event: self.event.clone(),
				expected: type_name::<T>(),
			})
	}
}

impl<K: fmt::Debug> fmt::Debug for DiscoveredListener<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DiscoveredListener")
			.field("event", &self.event)
			.field("phase", &self.phase)
			.field("key", &self.key)
			.field("origin", &self.origin)
			.finish_non_exhaustive()
	}
}

/// Something that can enumerate listeners, such as a plugin scanner.
pub trait ListenerSource<K>: Send + Sync {
	fn name(&self) -> &str;

	fn scan(&self) -> Result<Vec<DiscoveredListener<K>>, SourceError>;
}

/// Outcome of [`ListenerCatalog::scan_sources`].
#[derive(Debug, Default)]
pub struct ScanSummary {
	pub sources: usize,
	pub listeners: usize,
	pub failures: Vec<EventError>,
	pub elapsed: Duration,
	pub parallel: bool,
}

/// Caller-owned store of discovered listeners, keyed by event.
pub struct ListenerCatalog<K> {
	config: ScanConfig,
	listeners: RwLock<FxHashMap<EventKey, Vec<DiscoveredListener<K>>>>,
}

impl<K> Default for ListenerCatalog<K> {
	fn default() -> Self {
		Self::new(ScanConfig::default())
	}
}

impl<K> ListenerCatalog<K> {
	pub fn new(config: ScanConfig) -> Self {
		Self {
			config,
			listeners: RwLock::new(FxHashMap::default()),
		}
	}

	#[inline]
	pub fn config(&self) -> &ScanConfig {
		&self.config
	}

	/// Total number of listeners held, across all events.
	pub fn len(&self) -> usize {
		self.listeners.read().values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drops every held listener.
	pub fn clear(&self) {
		self.listeners.write().clear();
	}

	/// Appends one discovered listener.
	pub fn offer(&self, listener: DiscoveredListener<K>) {
		self.listeners
			.write()
			.entry(listener.event.clone())
			.or_default()
			.push(listener);
	}

	fn merge(&self, found: Vec<DiscoveredListener<K>>) {
		let mut listeners = self.listeners.write();
		for listener in found {
			listeners
				.entry(listener.event.clone())
				.or_default()
				.push(listener);
		}
	}
}

impl<K: Clone> ListenerCatalog<K> {
	/// Listeners held for `event`, in discovery order.
	pub fn listeners_for(&self, event: &EventKey) -> Vec<DiscoveredListener<K>> {
		self.listeners
			.read()
			.get(event)
			.cloned()
			.unwrap_or_default()
	}
}

impl<K: ListenerKey> ListenerCatalog<K> {
	/// Scans every source and merges the results in source order.
	///
	/// Sources are scanned on scoped threads once their count reaches
	/// [`ScanConfig::multi_thread_threshold`]. A failing source is logged and
	/// reported in the summary; the others still contribute.
	pub fn scan_sources(&self, sources: &[Arc<dyn ListenerSource<K>>]) -> ScanSummary {
		let start = Instant::now();
		let parallel = sources.len() >= self.config.multi_thread_threshold.max(1);
		info!(sources = sources.len(), parallel, "scanning listener sources");

		let results: Vec<Result<Vec<DiscoveredListener<K>>, EventError>> = if parallel {
			std::thread::scope(|scope| {
				let handles: Vec<_> = sources
					.iter()
					.map(|source| scope.spawn(move || scan_one(source.as_ref())))
					.collect();
				handles
					.into_iter()
					.zip(sources)
					.map(|(handle, source)| {
						handle.join().unwrap_or_else(|_| {
							Err(EventError::Scan {
								source_name: source.name().to_owned(),
								message: "scanner panicked".to_owned(),
							})
						})
					})
					.collect()
			})
		} else {
			sources.iter().map(|source| scan_one(source.as_ref())).collect()
		};

		let mut summary = ScanSummary {
			sources: sources.len(),
			parallel,
			..ScanSummary::default()
		};
		for result in results {
			match result {
				Ok(found) => {
					summary.listeners += found.len();
					self.merge(found);
				}
				Err(err) => {
					warn!(error = %err, label = err.as_label(), "listener source failed; skipping");
					summary.failures.push(err);
				}
			}
		}

		summary.elapsed = start.elapsed();
		info!(
			sources = summary.sources,
			listeners = summary.listeners,
			failures = summary.failures.len(),
			elapsed = ?summary.elapsed,
			"scanned listener sources"
		);
		summary
	}

	/// Registers every held listener for `event` into it.
	///
	/// Returns how many were newly registered.
	pub fn add_scanned_listeners<T, S>(&self, event: &Event<T, K, S>) -> usize
	where
		T: Callback,
		S: EventHasher,
	{
		let mut added = 0;
		for listener in self.listeners_for(event.key()) {
			match listener.create_callback::<T>() {
				Ok(callback) => {
					if event.register_keyed_in(&listener.phase, listener.key.clone(), callback) {
						added += 1;
					}
				}
				Err(err) => {
					error!(
						event = %event.key(),
						origin = listener.origin(),
						key = ?listener.key,
						error = %err,
						"error creating callback instance for discovered listener"
					);
				}
			}
		}
		added
	}
}

fn scan_one<K>(source: &dyn ListenerSource<K>) -> Result<Vec<DiscoveredListener<K>>, EventError> {
	source.scan().map_err(|err| EventError::Scan {
		source_name: source.name().to_owned(),
		message: err.to_string(),
	})
}
