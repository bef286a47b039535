//! Named, inter-ordered phases.
//!
//! A phase is a named group inside one event. Phases are ordered against each
//! other with "must run before" edges and linearized with a depth-first
//! topological sort that tolerates cycles.
//!
//! # Sub-modules
//!
//! - [`id`] - Namespaced identifiers used to name phases and buses
//! - [`graph`] - The phase graph and its sort
//! - [`error`] - Phase-level errors

pub mod error;
pub mod graph;
pub mod id;

pub use error::PhaseError;
pub use graph::{CycleEdge, PhaseGraph, PhaseNode, SortReport, VisitStatus, sort_phases};
pub use id::{DEFAULT_NAMESPACE, DEFAULT_PHASE, Identifier, PhaseId};
