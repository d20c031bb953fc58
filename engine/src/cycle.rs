//! FILENAME: engine/src/cycle.rs
//! PURPOSE: Cycle detection for a proposed formula's forward-reference set.
//! CONTEXT: Grounded on `would_create_cycle`/`can_reach` from a full
//! dependency-graph abstraction, but simplified to walk the `used` edges a
//! `Sheet` already stores on each `Cell`, since that's the only structure
//! this engine keeps. Full DFS over every out-edge, not just the first
//! reachable neighbor -- the bug in the original `LoopFinder` (which
//! recursed into only one neighbor per call and so missed cycles that
//! closed through a later sibling) is deliberately not reproduced here.

use std::collections::{HashMap, HashSet};

use crate::cell::Cell;
use crate::position::Position;

/// True iff installing `new_used` as `origin`'s forward references would
/// create a cycle, given the rest of the sheet's current edges.
///
/// A cell referencing itself is the trivial case. Otherwise this is
/// reachability: if any of `origin`'s new precedents can, by following
/// `used` edges, reach back to `origin`, the new edge set closes a loop.
pub fn would_create_cycle(
    cells: &HashMap<Position, Cell>,
    origin: Position,
    new_used: &HashSet<Position>,
) -> bool {
    if new_used.contains(&origin) {
        return true;
    }
    new_used.iter().any(|&start| can_reach(cells, start, origin))
}

fn can_reach(cells: &HashMap<Position, Cell>, start: Position, target: Position) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if current == target {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(cell) = cells.get(&current) {
            for &next in &cell.used {
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellContent;

    fn build(edges: &[(Position, &[Position])]) -> HashMap<Position, Cell> {
        let mut map = HashMap::new();
        for (pos, used) in edges {
            let mut cell = Cell::empty();
            cell.install(CellContent::Empty, used.iter().copied().collect());
            map.insert(*pos, cell);
        }
        map
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let a1 = Position::new(0, 0);
        let map: HashMap<Position, Cell> = HashMap::new();
        let mut new_used = HashSet::new();
        new_used.insert(a1);
        assert!(would_create_cycle(&map, a1, &new_used));
    }

    #[test]
    fn transitive_cycle_is_detected() {
        let a1 = Position::new(0, 0);
        let a2 = Position::new(1, 0);
        let a3 = Position::new(2, 0);
        // a2 depends on a1, a3 depends on a2.
        let map = build(&[(a2, &[a1]), (a3, &[a2])]);
        let mut new_used = HashSet::new();
        new_used.insert(a3);
        // a1 depending on a3 would close a1 -> a3 -> a2 -> a1.
        assert!(would_create_cycle(&map, a1, &new_used));
    }

    #[test]
    fn independent_references_are_not_a_cycle() {
        let a1 = Position::new(0, 0);
        let a2 = Position::new(1, 0);
        let b1 = Position::new(0, 1);
        let map = build(&[(a2, &[a1])]);
        let mut new_used = HashSet::new();
        new_used.insert(a1);
        assert!(!would_create_cycle(&map, b1, &new_used));
    }

    #[test]
    fn diamond_shaped_references_are_not_a_false_positive() {
        let a1 = Position::new(0, 0);
        let a2 = Position::new(1, 0);
        let a3 = Position::new(2, 0);
        let a4 = Position::new(3, 0);
        // a2 and a3 both depend on a1; a4 would depend on both.
        let map = build(&[(a2, &[a1]), (a3, &[a1])]);
        let mut new_used = HashSet::new();
        new_used.insert(a2);
        new_used.insert(a3);
        assert!(!would_create_cycle(&map, a4, &new_used));
    }
}
