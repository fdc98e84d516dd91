use super::state::SearchState;

/// Cost so far plus a lower bound on the turns still needed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Estimate {
    pub current: u32,
    pub remaining: u32,
}

impl Estimate {
    pub fn new(current: u32, state: &SearchState, total_pairs: usize) -> Self {
        Self {
            current,
            remaining: remaining_turns(state, total_pairs),
        }
    }

    pub fn total(&self) -> u32 {
        self.current.saturating_add(self.remaining)
    }
}

/// One turn resolves at most one pair, so the unmatched pair count never overestimates.
pub fn remaining_turns(state: &SearchState, total_pairs: usize) -> u32 {
    total_pairs.saturating_sub(state.matched_pairs()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Position};

    use rustc_hash::{FxHashMap, FxHashSet};
    use std::collections::VecDeque;

    /// Every distinct pair of unmatched cells, including turns the planner never generates.
    fn all_turns(state: &SearchState, board: &Board) -> Vec<SearchState> {
        let unmatched: Vec<Position> = board
            .all_positions()
            .filter(|&p| !state.is_matched(p))
            .collect();
        let mut next = vec![];
        for (i, &p1) in unmatched.iter().enumerate() {
            for &p2 in &unmatched[i + 1..] {
                next.push(state.reveal(p1, p2, board));
            }
        }
        next
    }

    fn min_turns(
        state: &SearchState,
        board: &Board,
        memo: &mut FxHashMap<SearchState, u32>,
    ) -> u32 {
        if let Some(&turns) = memo.get(state) {
            return turns;
        }
        let mut queue = VecDeque::from([(state.clone(), 0)]);
        let mut visited = FxHashSet::default();
        visited.insert(state.clone());
        let mut result = u32::MAX;
        while let Some((current, depth)) = queue.pop_front() {
            if current.is_goal(board.total_pairs()) {
                result = depth;
                break;
            }
            for next in all_turns(&current, board) {
                if visited.insert(next.clone()) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        memo.insert(state.clone(), result);
        result
    }

    fn small_boards() -> Vec<Board> {
        let layouts: [[u16; 4]; 6] = [
            [1, 1, 2, 2],
            [1, 2, 1, 2],
            [1, 2, 2, 1],
            [2, 1, 1, 2],
            [2, 1, 2, 1],
            [2, 2, 1, 1],
        ];
        layouts
            .iter()
            .map(|l| Board::from_rows(vec![l[..2].to_vec(), l[2..].to_vec()]).unwrap())
            .collect()
    }

    #[test]
    fn test_total() {
        let estimate = Estimate {
            current: 3,
            remaining: 4,
        };
        assert_eq!(estimate.total(), 7);
        let saturated = Estimate {
            current: u32::MAX,
            remaining: 1,
        };
        assert_eq!(saturated.total(), u32::MAX);
    }

    #[test]
    fn test_remaining_turns() {
        let state = SearchState::new(
            [Position::new(0, 0), Position::new(1, 1)],
            [(Position::new(0, 1), 2)],
        );
        assert_eq!(remaining_turns(&state, 2), 1);
        assert_eq!(remaining_turns(&SearchState::default(), 18), 18);
        assert_eq!(Estimate::new(5, &state, 2).total(), 6);
    }

    #[test]
    fn test_admissible_on_every_reachable_state() {
        for board in small_boards() {
            let mut memo = FxHashMap::default();
            let root = SearchState::default();
            let mut queue = VecDeque::from([root.clone()]);
            let mut reachable = FxHashSet::default();
            reachable.insert(root);
            while let Some(state) = queue.pop_front() {
                for next in all_turns(&state, &board) {
                    if reachable.insert(next.clone()) {
                        queue.push_back(next);
                    }
                }
            }
            assert!(reachable.len() > 1);
            for state in &reachable {
                let optimal = min_turns(state, &board, &mut memo);
                assert!(remaining_turns(state, board.total_pairs()) <= optimal);
            }
        }
    }
}
