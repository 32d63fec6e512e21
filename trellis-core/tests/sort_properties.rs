//! Property tests for dependency ordering.

mod common;

use common::{chain, node, system, Relay};
use proptest::prelude::*;
use trellis_core::LinkableSorter;

/// Item count, a shuffled rank per item, and candidate edges by index.
fn dag() -> impl Strategy<Value = (Vec<usize>, Vec<(usize, usize)>)> {
    (2usize..16).prop_flat_map(|count| {
        let ranks = Just((0..count).collect::<Vec<_>>()).prop_shuffle();
        let edges = prop::collection::vec((0..count, 0..count), 0..count * 2);
        (ranks, edges)
    })
}

/// Orient every edge from lower to higher rank so the result is acyclic.
fn oriented(ranks: &[usize], edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    edges
        .iter()
        .filter(|(a, b)| a != b)
        .map(|&(a, b)| if ranks[a] < ranks[b] { (a, b) } else { (b, a) })
        .collect()
}

fn dependencies(edges: &[(usize, usize)], item: usize) -> Vec<usize> {
    edges
        .iter()
        .filter(|(_, to)| *to == item)
        .map(|(from, _)| *from)
        .collect()
}

/// Whether `to` can be reached from `from` along one or more edges.
fn reaches(edges: &[(usize, usize)], from: usize, to: usize) -> bool {
    let mut seen = vec![from];
    let mut stack = vec![from];
    while let Some(item) = stack.pop() {
        for &(_, next) in edges.iter().filter(|(source, _)| *source == item) {
            if next == to {
                return true;
            }
            if !seen.contains(&next) {
                seen.push(next);
                stack.push(next);
            }
        }
    }
    false
}

fn position<T: PartialEq>(order: &[T], item: &T) -> usize {
    order.iter().position(|other| other == item).unwrap()
}

proptest! {
    #[test]
    fn sorted_order_respects_dependencies((ranks, edges) in dag()) {
        let edges = oriented(&ranks, &edges);
        let items: Vec<usize> = (0..ranks.len()).collect();

        let outcome = LinkableSorter::new().sort(&items, |item| dependencies(&edges, item));

        prop_assert!(!outcome.has_cycles());
        prop_assert_eq!(outcome.order.len(), items.len());
        for (from, to) in &edges {
            prop_assert!(position(&outcome.order, from) < position(&outcome.order, to));
        }
    }

    #[test]
    fn sorting_is_deterministic((ranks, edges) in dag()) {
        let edges = oriented(&ranks, &edges);
        let items: Vec<usize> = (0..ranks.len()).collect();
        let sorter = LinkableSorter::new();

        let first = sorter.sort(&items, |item| dependencies(&edges, item));
        let second = sorter.sort(&items, |item| dependencies(&edges, item));
        prop_assert_eq!(&first, &second);

        let mut extended = items.clone();
        extended.push(items.len());
        let third = sorter.sort(&extended, |item| dependencies(&edges, item));
        let without: Vec<usize> = third.order.iter().copied().filter(|&item| item != items.len()).collect();
        prop_assert_eq!(without, first.order);
    }

    #[test]
    fn cycles_still_yield_every_item(
        count in 1usize..16,
        edges in prop::collection::vec((0usize..16, 0usize..16), 0..48),
        duplicates in prop::collection::vec(0usize..16, 0..4),
    ) {
        let mut items: Vec<usize> = (0..count).collect();
        items.extend(duplicates.into_iter().filter(|&item| item < count));

        let outcome = LinkableSorter::new().sort(&items, |item| dependencies(&edges, item));

        let mut order = outcome.order.clone();
        order.sort_unstable();
        prop_assert_eq!(order, (0..count).collect::<Vec<_>>());
        prop_assert!(outcome.broken_cycles.len() <= count);
    }

    #[test]
    fn only_links_inside_cycles_are_violated(
        count in 1usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..30),
    ) {
        let edges: Vec<(usize, usize)> = edges
            .into_iter()
            .filter(|&(from, to)| from != to && from < count && to < count)
            .collect();
        let items: Vec<usize> = (0..count).collect();

        let outcome = LinkableSorter::new().sort(&items, |item| dependencies(&edges, item));

        for &(from, to) in &edges {
            if !reaches(&edges, to, from) {
                prop_assert!(position(&outcome.order, &from) < position(&outcome.order, &to));
            }
        }
        for item in &outcome.broken_cycles {
            prop_assert!(reaches(&edges, *item, *item));
        }
    }

    #[test]
    fn cycles_feeding_downstream_items_run_first(
        (ranks, edges) in dag(),
        back in (0usize..16, 0usize..16),
    ) {
        // Close one cycle inside an otherwise acyclic graph.
        let mut edges = oriented(&ranks, &edges);
        let count = ranks.len();
        let (a, b) = (back.0 % count, back.1 % count);
        if a != b {
            let (low, high) = if ranks[a] < ranks[b] { (a, b) } else { (b, a) };
            edges.push((low, high));
            edges.push((high, low));
        }
        let items: Vec<usize> = (0..count).collect();

        let outcome = LinkableSorter::new().sort(&items, |item| dependencies(&edges, item));

        prop_assert_eq!(outcome.has_cycles(), a != b);
        for item in &outcome.broken_cycles {
            prop_assert!(reaches(&edges, *item, *item));
        }
        for &(from, to) in &edges {
            if !reaches(&edges, to, from) {
                prop_assert!(position(&outcome.order, &from) < position(&outcome.order, &to));
            }
        }
    }

    #[test]
    fn graph_order_follows_links((ranks, edges) in dag()) {
        let mut system = system();
        let n = node(&mut system, "n");
        let components: Vec<_> = ranks
            .iter()
            .map(|_| system.create_component_of::<Relay>(n).unwrap())
            .collect();
        let mut linked = Vec::new();
        for (from, to) in oriented(&ranks, &edges) {
            if linked.contains(&(from, to)) {
                continue;
            }
            chain(&system, components[from], components[to]);
            linked.push((from, to));
        }

        let root = system.root();
        system.sort_graph(root).unwrap();
        let graph = system.graph(root).unwrap();
        let order = graph.sorted_components();

        prop_assert_eq!(order.len(), components.len());
        prop_assert!(graph.broken_cycles().is_empty());
        for (from, to) in linked {
            prop_assert!(position(order, &components[from]) < position(order, &components[to]));
        }
    }
}
