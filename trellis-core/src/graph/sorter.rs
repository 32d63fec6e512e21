//! Dependency ordering of linked components.
//!
//! # Algorithm
//!
//! Kahn's algorithm over the induced dependency graph, with the ready set
//! kept in a min-heap keyed by insertion position:
//!
//! 1. Index the items in insertion order, dropping duplicates
//! 2. Count each item's distinct dependencies within the item set
//! 3. Repeatedly emit the lowest-positioned item with no pending
//!    dependencies and release its dependents
//! 4. If nothing is ready but items remain, they sit on or behind a cycle.
//!    Among the cycles whose outside dependencies are all emitted, emit
//!    the lowest-positioned member anyway and record it
//!
//! Only links inside a cycle are ever violated: an item downstream of a
//! cycle still waits for it. Without cycles the result is the
//! lexicographically smallest topological order by insertion position, so
//! unlinked items keep their relative order and the same input always
//! produces the same output.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

use indexmap::IndexSet;
use smallvec::SmallVec;

/// Result of a sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome<K> {
    /// Every distinct input item exactly once.
    pub order: Vec<K>,
    /// Items emitted before all their dependencies. Each one sits on a
    /// cycle; a cycle may need more than one break.
    pub broken_cycles: Vec<K>,
}

impl<K> SortOutcome<K> {
    pub fn has_cycles(&self) -> bool {
        !self.broken_cycles.is_empty()
    }
}

/// Computes a dependency-respecting order over linkable items.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkableSorter;

impl LinkableSorter {
    pub fn new() -> Self {
        Self
    }

    /// Order `items` so each comes after the items `dependencies` returns
    /// for it. Dependencies outside `items` and self-dependencies are
    /// ignored.
    pub fn sort<K, F, I>(&self, items: &[K], mut dependencies: F) -> SortOutcome<K>
    where
        K: Copy + Eq + Hash,
        F: FnMut(K) -> I,
        I: IntoIterator<Item = K>,
    {
        let keys: IndexSet<K> = items.iter().copied().collect();
        let count = keys.len();

        let mut pending = vec![0usize; count];
        let mut requires: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); count];
        let mut dependents: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); count];

        for (index, &key) in keys.iter().enumerate() {
            for dependency in dependencies(key) {
                let Some(position) = keys.get_index_of(&dependency) else {
                    continue;
                };
                if position == index || requires[index].contains(&position) {
                    continue;
                }
                requires[index].push(position);
                dependents[position].push(index);
                pending[index] += 1;
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
            .filter(|&index| pending[index] == 0)
            .map(Reverse)
            .collect();
        let mut emitted = vec![false; count];
        let mut order = Vec::with_capacity(count);
        let mut broken_cycles = Vec::new();
        let mut lowest = 0;

        while order.len() < count {
            let index = match ready.pop() {
                Some(Reverse(index)) if emitted[index] => continue,
                Some(Reverse(index)) => index,
                None => {
                    while emitted[lowest] {
                        lowest += 1;
                    }
                    let forced = cycle_entry(&requires, &emitted).unwrap_or(lowest);
                    broken_cycles.push(keys[forced]);
                    forced
                }
            };

            emitted[index] = true;
            order.push(keys[index]);

            for &dependent in &dependents[index] {
                if emitted[dependent] {
                    continue;
                }
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        SortOutcome {
            order,
            broken_cycles,
        }
    }
}

/// Lowest position on a cycle whose dependencies outside the cycle are all
/// emitted, found with Tarjan's algorithm over the items not yet emitted.
fn cycle_entry(requires: &[SmallVec<[usize; 4]>], emitted: &[bool]) -> Option<usize> {
    const UNVISITED: usize = usize::MAX;
    let count = requires.len();
    let mut order = vec![UNVISITED; count];
    let mut low = vec![0usize; count];
    let mut component = vec![UNVISITED; count];
    let mut on_stack = vec![false; count];
    let mut stack = Vec::new();
    let mut next = 0;
    let mut components = 0;

    for root in 0..count {
        if emitted[root] || order[root] != UNVISITED {
            continue;
        }
        order[root] = next;
        low[root] = next;
        next += 1;
        stack.push(root);
        on_stack[root] = true;
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let (node, edge) = *frame;
            if let Some(&dependency) = requires[node].get(edge) {
                frame.1 += 1;
                if emitted[dependency] {
                    continue;
                }
                if order[dependency] == UNVISITED {
                    order[dependency] = next;
                    low[dependency] = next;
                    next += 1;
                    stack.push(dependency);
                    on_stack[dependency] = true;
                    frames.push((dependency, 0));
                } else if on_stack[dependency] {
                    low[node] = low[node].min(order[dependency]);
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                low[parent] = low[parent].min(low[node]);
            }
            if low[node] == order[node] {
                while let Some(member) = stack.pop() {
                    on_stack[member] = false;
                    component[member] = components;
                    if member == node {
                        break;
                    }
                }
                components += 1;
            }
        }
    }

    // A component with no pending dependency outside itself can be entered
    // without violating any link that leaves a cycle.
    let mut blocked = vec![false; components];
    for index in (0..count).filter(|&index| !emitted[index]) {
        let outside = requires[index]
            .iter()
            .any(|&dependency| !emitted[dependency] && component[dependency] != component[index]);
        if outside {
            blocked[component[index]] = true;
        }
    }
    (0..count).find(|&index| !emitted[index] && !blocked[component[index]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sort(items: &[u32], edges: &[(u32, u32)]) -> SortOutcome<u32> {
        // (dependency, dependent)
        let mut deps: HashMap<u32, Vec<u32>> = HashMap::new();
        for &(from, to) in edges {
            deps.entry(to).or_default().push(from);
        }
        LinkableSorter::new().sort(items, |item| deps.get(&item).cloned().unwrap_or_default())
    }

    #[test]
    fn unlinked_items_keep_insertion_order() {
        let outcome = sort(&[3, 1, 2], &[]);
        assert_eq!(outcome.order, vec![3, 1, 2]);
        assert!(!outcome.has_cycles());
    }

    #[test]
    fn dependencies_come_first() {
        let outcome = sort(&[1, 2, 3], &[(3, 1), (2, 3)]);
        assert_eq!(outcome.order, vec![2, 3, 1]);
    }

    #[test]
    fn released_items_reclaim_their_position() {
        // 4 depends on 1; 2 and 3 are free.
        let outcome = sort(&[4, 1, 2, 3], &[(1, 4)]);
        assert_eq!(outcome.order, vec![1, 4, 2, 3]);
    }

    #[test]
    fn cycles_are_broken_at_the_lowest_position() {
        let outcome = sort(&[1, 2, 3, 4], &[(1, 2), (2, 3), (3, 1), (3, 4)]);
        assert_eq!(outcome.order, vec![1, 2, 3, 4]);
        assert_eq!(outcome.broken_cycles, vec![1]);
    }

    #[test]
    fn items_behind_a_cycle_wait_for_it() {
        // 0 depends on 1; 1 and 2 form a cycle.
        let outcome = sort(&[0, 1, 2], &[(1, 0), (1, 2), (2, 1)]);
        assert_eq!(outcome.order, vec![1, 0, 2]);
        assert_eq!(outcome.broken_cycles, vec![1]);
    }

    #[test]
    fn upstream_cycles_are_broken_first() {
        // Cycle {3, 4} feeds cycle {1, 2}, which feeds 5.
        let outcome = sort(
            &[1, 2, 3, 4, 5],
            &[(1, 2), (2, 1), (3, 4), (4, 3), (4, 1), (2, 5)],
        );
        assert_eq!(outcome.order, vec![3, 4, 1, 2, 5]);
        assert_eq!(outcome.broken_cycles, vec![3, 1]);
    }

    #[test]
    fn duplicates_and_self_edges_are_ignored() {
        let outcome = sort(&[1, 2, 1], &[(1, 1), (1, 2), (1, 2)]);
        assert_eq!(outcome.order, vec![1, 2]);
        assert!(!outcome.has_cycles());
    }

    #[test]
    fn foreign_dependencies_are_ignored() {
        let outcome = sort(&[1, 2], &[(9, 1)]);
        assert_eq!(outcome.order, vec![1, 2]);
    }

    #[test]
    fn empty_input() {
        let outcome = sort(&[], &[]);
        assert!(outcome.order.is_empty());
    }
}
