use pretty_assertions::assert_eq;

use super::*;
use crate::id::Identifier;

fn id(s: &str) -> PhaseId {
	Identifier::parse(s).unwrap()
}

fn ids(list: &[&str]) -> Vec<PhaseId> {
	list.iter().map(|s| id(s)).collect()
}

#[test]
fn test_unconstrained_phases_keep_insertion_order() {
	let mut graph = PhaseGraph::<()>::new();
	for name in ["c", "a", "b"] {
		graph.get_or_insert_with(&id(name), true, || ());
	}
	assert_eq!(graph.sorted_ids(), ids(&["c", "a", "b"]));
}

#[test]
fn test_chain_sorts_regardless_of_link_order() {
	let mut graph = PhaseGraph::<u32>::new();
	graph.get_or_insert_with(&id("c"), true, || 3);
	graph.get_or_insert_with(&id("b"), true, || 2);
	graph.get_or_insert_with(&id("a"), true, || 1);

	graph.link(&id("b"), &id("c"), || 0).unwrap();
	graph.link(&id("a"), &id("b"), || 0).unwrap();

	assert_eq!(graph.sorted_ids(), ids(&["a", "b", "c"]));
	let payloads: Vec<u32> = graph.iter_sorted().map(|(_, d)| *d).collect();
	assert_eq!(payloads, vec![1, 2, 3]);
}

#[test]
fn test_link_creates_missing_phases() {
	let mut graph = PhaseGraph::<&'static str>::new();
	let report = graph.link(&id("early"), &id("late"), || "made").unwrap();

	assert!(!report.has_cycles());
	assert_eq!(graph.len(), 2);
	assert_eq!(graph.get(&id("early")), Some(&"made"));
	assert_eq!(graph.sorted_ids(), ids(&["early", "late"]));
}

#[test]
fn test_link_moves_existing_phase_forward() {
	let mut graph = PhaseGraph::<()>::new();
	graph.get_or_insert_with(&id("default"), true, || ());
	graph.get_or_insert_with(&id("early"), true, || ());
	assert_eq!(graph.sorted_ids(), ids(&["default", "early"]));

	graph.link(&id("early"), &id("default"), || ()).unwrap();
	assert_eq!(graph.sorted_ids(), ids(&["early", "default"]));
}

#[test]
fn test_self_ordering_is_rejected() {
	let mut graph = PhaseGraph::<()>::new();
	let err = graph.link(&id("a"), &id("a"), || ()).unwrap_err();
	assert_eq!(err, PhaseError::SelfOrdering { phase: id("a") });
	assert!(graph.is_empty(), "rejected ordering must not create phases");
}

#[test]
fn test_cycle_is_tolerated() {
	let mut graph = PhaseGraph::<()>::new();
	let first = graph.link(&id("a"), &id("b"), || ()).unwrap();
	assert!(!first.has_cycles());

	let second = graph.link(&id("b"), &id("a"), || ()).unwrap();
	assert!(second.has_cycles());

	let sorted = graph.sorted_ids();
	assert_eq!(sorted.len(), 2);
	assert!(sorted.contains(&id("a")));
	assert!(sorted.contains(&id("b")));

	// Re-sorting a cyclic graph is stable.
	graph.sort();
	assert_eq!(graph.sorted_ids(), sorted);
}

#[test]
fn test_cycle_order_survives_later_changes() {
	let mut graph = PhaseGraph::<()>::new();
	graph.link(&id("a"), &id("b"), || ()).unwrap();
	graph.link(&id("b"), &id("a"), || ()).unwrap();
	let cyclic = graph.sorted_ids();

	for _ in 0..3 {
		graph.sort();
		assert_eq!(graph.sorted_ids(), cyclic);
	}

	graph.get_or_insert_with(&id("c"), true, || ());
	graph.link(&id("c"), &id("d"), || ()).unwrap();
	let sorted = graph.sorted_ids();
	assert_eq!(&sorted[..2], &cyclic[..]);
	assert_eq!(&sorted[2..], &ids(&["c", "d"])[..]);
}

#[test]
fn test_long_chain_sorts() {
	const LEN: usize = 20_000;
	let mut nodes: Vec<PhaseNode<()>> = (0..LEN)
		.map(|i| PhaseNode::new(id(&format!("p{i}")), ()))
		.collect();
	// Node i runs after node i + 1, so the first root reaches every node.
	for i in 0..LEN - 1 {
		nodes[i].previous.push(i + 1);
		nodes[i + 1].subsequent.push(i);
	}
	let mut order = Vec::new();

	let report = sort_phases(&mut nodes, &mut order);

	assert!(!report.has_cycles());
	assert_eq!(order, (0..LEN).rev().collect::<Vec<_>>());
}

#[test]
fn test_cycle_does_not_disturb_unrelated_constraints() {
	let mut graph = PhaseGraph::<()>::new();
	graph.link(&id("a"), &id("b"), || ()).unwrap();
	graph.link(&id("b"), &id("a"), || ()).unwrap();
	graph.link(&id("x"), &id("y"), || ()).unwrap();

	let sorted = graph.sorted_ids();
	let pos = |name: &str| sorted.iter().position(|p| *p == id(name)).unwrap();
	assert!(pos("x") < pos("y"));
	assert_eq!(sorted.len(), 4);
}

#[test]
fn test_duplicate_edges_are_kept_but_harmless() {
	let mut graph = PhaseGraph::<()>::new();
	graph.link(&id("a"), &id("b"), || ()).unwrap();
	let report = graph.link(&id("a"), &id("b"), || ()).unwrap();

	assert!(!report.has_cycles());
	assert_eq!(graph.after(&id("a")), vec![&id("b"), &id("b")]);
	assert_eq!(graph.before(&id("b")), vec![&id("a"), &id("a")]);
	assert_eq!(graph.sorted_ids(), ids(&["a", "b"]));
}

#[test]
fn test_diamond() {
	let mut graph = PhaseGraph::<()>::new();
	graph.link(&id("b"), &id("d"), || ()).unwrap();
	graph.link(&id("c"), &id("d"), || ()).unwrap();
	graph.link(&id("a"), &id("b"), || ()).unwrap();
	graph.link(&id("a"), &id("c"), || ()).unwrap();

	let sorted = graph.sorted_ids();
	let pos = |name: &str| sorted.iter().position(|p| *p == id(name)).unwrap();
	assert!(pos("a") < pos("b"));
	assert!(pos("a") < pos("c"));
	assert!(pos("b") < pos("d"));
	assert!(pos("c") < pos("d"));
}

#[test]
fn test_sort_phases_on_raw_nodes() {
	let mut nodes = vec![
		PhaseNode::new(id("late"), ()),
		PhaseNode::new(id("early"), ()),
	];
	nodes[0].previous.push(1);
	nodes[1].subsequent.push(0);
	let mut order = vec![0, 1];

	let report = sort_phases(&mut nodes, &mut order);

	assert!(!report.has_cycles());
	assert_eq!(order, vec![1, 0]);
	assert!(nodes.iter().all(|n| n.visit == VisitStatus::Visited));
}
