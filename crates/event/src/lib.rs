//! Phased callback events.
//!
//! Callers obtain a single invoker per event that fans out to an ordered,
//! dynamically mutable set of callbacks. Callbacks are grouped into named
//! phases ordered against each other; every registration change republishes
//! a freshly composed invoker with one atomic swap, so readers never lock and
//! never observe a half-applied change.
//!
//! ```text
//!   EventBus ──► Event ──► PhaseGraph ──► PhaseCollection (per phase)
//!                  │                            │
//!                  │  flatten in phase order ◄──┘
//!                  ▼
//!             compose(&[T]) ──► ArcSwap<Published> ──► invoker()
//! ```
//!
//! # Modules
//!
//! - [`event`] - The per-topic callback set and its builder
//! - [`collection`] - Per-phase storage strategies
//! - [`bus`] - Named collections of events
//! - [`catalog`] - Caller-owned discovery of listeners
//! - [`compose`] - Composition helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use phasebus_event::Event;
//! use phasebus_phase::Identifier;
//!
//! type Hook = Arc<dyn Fn(&mut Vec<&'static str>) + Send + Sync>;
//!
//! let event: Event<Hook, &'static str> = Event::create(|hooks: &[Hook]| {
//! 	let hooks: Vec<Hook> = hooks.to_vec();
//! 	Arc::new(move |log: &mut Vec<&'static str>| {
//! 		for hook in &hooks {
//! 			hook(log);
//! 		}
//! 	}) as Hook
//! });
//!
//! let early = Identifier::parse("demo:early").unwrap();
//! event.add_phase_ordering(&early, &phasebus_phase::DEFAULT_PHASE).unwrap();
//! let late: Hook = Arc::new(|log: &mut Vec<&'static str>| log.push("late"));
//! let first: Hook = Arc::new(|log: &mut Vec<&'static str>| log.push("early"));
//! event.register_keyed("late", late);
//! event.register_keyed_in(&early, "early", first);
//!
//! let mut log = Vec::new();
//! (event.invoker())(&mut log);
//! assert_eq!(log, ["early", "late"]);
//! ```

pub mod bus;
pub mod catalog;
pub mod collection;
pub mod compose;
pub mod config;
pub mod error;
pub mod event;
pub mod key;

#[cfg(test)]
mod test_support;

pub use bus::EventBus;
pub use catalog::{DiscoveredListener, ListenerCatalog, ListenerSource, ScanSummary, SourceError};
pub use collection::{
	CallbackOrder, PhaseCallbacks, PhaseCollection, SortedCallbacks, UnsortedCallbacks,
};
pub use compose::Composer;
pub use config::{SCAN_THREAD_THRESHOLD_ENV, ScanConfig};
pub use error::{CollectionError, EventError};
pub use event::{Callback, Event, EventBuilder, EventHasher, ListenerKey, Published};
pub use key::{DEFAULT_QUALIFIER, EventKey};
pub use phasebus_phase::{DEFAULT_PHASE, PhaseId};
