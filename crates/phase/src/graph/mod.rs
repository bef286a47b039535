//! Phase graph with "must run before" edges.
//!
//! # Role
//!
//! [`PhaseGraph`] owns every phase of one event together with a payload `D`
//! per phase, and keeps a sorted order over them that is refreshed after
//! every structural change.
//!
//! # Invariants
//!
//! - Phases are never removed once created.
//! - `order` always holds every node index exactly once.
//! - A phase is never linked to itself.

mod sort;
#[cfg(test)]
mod tests;

use rustc_hash::FxHashMap;
pub use sort::{CycleEdge, SortReport, sort_phases};

use crate::error::PhaseError;
use crate::id::PhaseId;

/// Visit tag used while sorting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisitStatus {
	#[default]
	NotVisited,
	Visiting,
	Visited,
}

/// One phase and its edges, stored by index inside a [`PhaseGraph`].
#[derive(Clone, Debug)]
pub struct PhaseNode<D> {
	id: PhaseId,
	data: D,
	/// Phases that must run before this one.
	previous: Vec<usize>,
	/// Phases that must run after this one.
	subsequent: Vec<usize>,
	visit: VisitStatus,
}

impl<D> PhaseNode<D> {
	pub fn new(id: PhaseId, data: D) -> Self {
		Self {
			id,
			data,
			previous: Vec::new(),
			subsequent: Vec::new(),
			visit: VisitStatus::NotVisited,
		}
	}

	#[inline]
	pub fn id(&self) -> &PhaseId {
		&self.id
	}

	#[inline]
	pub fn data(&self) -> &D {
		&self.data
	}

	#[inline]
	pub fn previous(&self) -> &[usize] {
		&self.previous
	}

	#[inline]
	pub fn subsequent(&self) -> &[usize] {
		&self.subsequent
	}
}

/// Every phase of one event, plus their current sorted order.
#[derive(Clone, Debug)]
pub struct PhaseGraph<D> {
	nodes: Vec<PhaseNode<D>>,
	by_id: FxHashMap<PhaseId, usize>,
	order: Vec<usize>,
}

impl<D> Default for PhaseGraph<D> {
	fn default() -> Self {
		Self::new()
	}
}

impl<D> PhaseGraph<D> {
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			by_id: FxHashMap::default(),
			order: Vec::new(),
		}
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	#[inline]
	pub fn contains(&self, id: &PhaseId) -> bool {
		self.by_id.contains_key(id)
	}

	pub fn get(&self, id: &PhaseId) -> Option<&D> {
		self.by_id.get(id).map(|&i| &self.nodes[i].data)
	}

	pub fn get_mut(&mut self, id: &PhaseId) -> Option<&mut D> {
		self.by_id.get(id).map(|&i| &mut self.nodes[i].data)
	}

	/// Returns the payload of `id`, creating the phase with `make` if it is unknown.
	///
	/// A newly created phase is appended to the sorted order; the graph is
	/// re-sorted only when `resort` is set.
	pub fn get_or_insert_with(
		&mut self,
		id: &PhaseId,
		resort: bool,
		make: impl FnOnce() -> D,
	) -> &mut D {
		let index = self.index_or_insert(id, resort, make);
		&mut self.nodes[index].data
	}

	fn index_or_insert(&mut self, id: &PhaseId, resort: bool, make: impl FnOnce() -> D) -> usize {
		if let Some(&index) = self.by_id.get(id) {
			return index;
		}

		let index = self.nodes.len();
		self.nodes.push(PhaseNode::new(id.clone(), make()));
		self.by_id.insert(id.clone(), index);
		self.order.push(index);

		if resort {
			self.sort();
		}
		index
	}

	/// Records that `first` runs before `second`, creating either phase with
	/// `make` if needed, then re-sorts.
	///
	/// Contradictory orderings are accepted; the returned report lists the
	/// back-edges the sort had to ignore.
	pub fn link(
		&mut self,
		first: &PhaseId,
		second: &PhaseId,
		mut make: impl FnMut() -> D,
	) -> Result<SortReport, PhaseError> {
		if first == second {
			return Err(PhaseError::SelfOrdering {
				phase: first.clone(),
			});
		}

		let a = self.index_or_insert(first, false, &mut make);
		let b = self.index_or_insert(second, false, &mut make);
		self.nodes[a].subsequent.push(b);
		self.nodes[b].previous.push(a);

		Ok(self.sort())
	}

	/// Re-sorts the phase order in place.
	pub fn sort(&mut self) -> SortReport {
		sort_phases(&mut self.nodes, &mut self.order)
	}

	/// Phases and payloads in sorted order.
	pub fn iter_sorted(&self) -> impl ExactSizeIterator<Item = (&PhaseId, &D)> + '_ {
		self.order.iter().map(|&i| {
			let node = &self.nodes[i];
			(&node.id, &node.data)
		})
	}

	/// Phase ids in sorted order.
	pub fn sorted_ids(&self) -> Vec<PhaseId> {
		self.iter_sorted().map(|(id, _)| id.clone()).collect()
	}

	/// Phases that were explicitly ordered before `id`, in link order.
	pub fn before(&self, id: &PhaseId) -> Vec<&PhaseId> {
		self.neighbors(id, |n| &n.previous)
	}

	/// Phases that were explicitly ordered after `id`, in link order.
	pub fn after(&self, id: &PhaseId) -> Vec<&PhaseId> {
		self.neighbors(id, |n| &n.subsequent)
	}

	fn neighbors<'a>(
		&'a self,
		id: &PhaseId,
		edges: impl Fn(&'a PhaseNode<D>) -> &'a Vec<usize>,
	) -> Vec<&'a PhaseId> {
		match self.by_id.get(id) {
			Some(&i) => edges(&self.nodes[i])
				.iter()
				.map(|&j| &self.nodes[j].id)
				.collect(),
			None => Vec::new(),
		}
	}
}
