//! Depth-first topological sort with cycle tolerance.
//!
//! Each phase is visited in creation order; a visit first descends into the
//! phases that must run before it, then emits the phase (post-order). The
//! descent uses an explicit stack, so long chains cannot exhaust the thread
//! stack.
//!
//! Reaching a phase that is still being visited means a cycle. That back-edge
//! is treated as already satisfied, logged, and skipped, so contradictory
//! orderings produce a stable order instead of an error.

use tracing::warn;

use super::{PhaseNode, VisitStatus};
use crate::id::PhaseId;

/// An ordering edge that was ignored because it closed a cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleEdge {
	/// Phase that was supposed to run first.
	pub before: PhaseId,
	/// Phase whose visit reached `before` while `before` was still open.
	pub after: PhaseId,
}

/// Outcome of a sort.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortReport {
	pub cycles: Vec<CycleEdge>,
}

impl SortReport {
	#[inline]
	pub fn has_cycles(&self) -> bool {
		!self.cycles.is_empty()
	}
}

/// Writes into `order` a topological order of the "before" relation.
///
/// Roots are taken in node index order, which is phase creation order, so the
/// result depends only on the graph and never on a previous sort. Unconstrained
/// phases keep their creation order.
pub fn sort_phases<D>(nodes: &mut [PhaseNode<D>], order: &mut Vec<usize>) -> SortReport {
	for node in nodes.iter_mut() {
		node.visit = VisitStatus::NotVisited;
	}

	let mut sorted = Vec::with_capacity(nodes.len());
	let mut report = SortReport::default();
	// (node, next predecessor to look at)
	let mut stack: Vec<(usize, usize)> = Vec::new();

	for root in 0..nodes.len() {
		if nodes[root].visit != VisitStatus::NotVisited {
			continue;
		}
		nodes[root].visit = VisitStatus::Visiting;
		stack.push((root, 0));

		while let Some(top) = stack.last_mut() {
			let (index, cursor) = *top;
			let Some(&prev) = nodes[index].previous.get(cursor) else {
				nodes[index].visit = VisitStatus::Visited;
				sorted.push(index);
				stack.pop();
				continue;
			};
			top.1 += 1;

			match nodes[prev].visit {
				VisitStatus::NotVisited => {
					nodes[prev].visit = VisitStatus::Visiting;
					stack.push((prev, 0));
				}
				VisitStatus::Visiting => {
					let cycle = CycleEdge {
						before: nodes[prev].id.clone(),
						after: nodes[index].id.clone(),
					};
					warn!(
						before = %cycle.before,
						after = %cycle.after,
						"phase ordering cycle detected; ignoring edge"
					);
					report.cycles.push(cycle);
				}
				VisitStatus::Visited => {}
			}
		}
	}

	*order = sorted;
	report
}
