use super::helper::Estimate;

use crate::action::Action;

use std::cmp::Ordering;

/// A frontier entry. `BinaryHeap` is a max-heap, so the ordering is reversed:
/// lowest `f` first, then lowest `seq` (first pushed) among equal `f`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpenEntry {
    pub id: u32,
    pub seq: u64,
    pub estimate: Estimate,
}

impl OpenEntry {
    pub fn new(id: u32, seq: u64, estimate: Estimate) -> Self {
        OpenEntry { id, seq, estimate }
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total()
            .cmp(&self.estimate.total())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-state bookkeeping, indexed by the interned state id.
#[derive(Debug, Copy, Clone)]
pub struct StateNode {
    pub best_g: u32,
    pub came_from: Option<(u32, Action)>,
}

impl StateNode {
    pub fn root() -> Self {
        StateNode {
            best_g: 0,
            came_from: None,
        }
    }

    pub fn unreached() -> Self {
        StateNode {
            best_g: u32::MAX,
            came_from: None,
        }
    }

    /// Walks `came_from` links back to the root and returns the actions in play order.
    pub fn path(id: u32, nodes: &[StateNode]) -> Vec<Action> {
        let mut actions = vec![];
        let mut current = id;
        while let Some((parent, action)) = nodes[current as usize].came_from {
            actions.push(action);
            current = parent;
        }
        actions.reverse();
        actions
    }
}
