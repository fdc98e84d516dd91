//! A* planning over abstracted knowledge states of a Memory game.
//!
//! The planner looks at the true board values when a speculative turn reveals
//! unseen cards. It is a planning oracle, not a partial-information solver: plans
//! it returns are feasible for the real board, and their turns succeed exactly as
//! predicted when replayed against it.
mod fallback;
mod helper;
mod node;
mod state;
mod successors;

pub use self::fallback::fallback_action;
pub use self::helper::{Estimate, remaining_turns};
pub use self::state::{PositionList, SearchState};
pub use self::successors::{Successor, TURN_COST, successors};

use self::node::{OpenEntry, StateNode};

use crate::action::Action;
use crate::board::Board;

use rustc_hash::FxHashMap;
use std::{
    collections::BinaryHeap,
    time::{Duration, Instant},
};

pub const DEFAULT_MAX_EXPANSIONS: usize = 150_000;
pub const DEFAULT_BRANCH_CAP: usize = 6;

/// Search knobs.
///
/// `branch_cap` bounds how many unseen cards are tried per node and how many
/// partners each gets: larger values explore more alternatives per node but grow
/// the frontier quickly. `max_expansions` bounds the number of nodes expanded,
/// trading plan quality for bounded latency.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub max_expansions: usize,
    pub branch_cap: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            branch_cap: DEFAULT_BRANCH_CAP,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Solved,
    /// More than `max_expansions` nodes would have been expanded.
    BudgetExhausted,
    /// The frontier emptied without reaching a finished state.
    FrontierExhausted,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SearchStatus,
    /// The plan, present only when `status` is `Solved`.
    pub actions: Option<Vec<Action>>,
    pub expansions: usize,
    pub states: usize,
    pub elapsed: Duration,
}

/// Plans from `initial` with the default branching cap.
///
/// Returns `None` when no finished state was reached within `max_expansions`; the
/// caller is expected to fall back to [`fallback_action`].
pub fn plan(initial: &SearchState, board: &Board, max_expansions: usize) -> Option<Vec<Action>> {
    let config = PlannerConfig {
        max_expansions,
        ..Default::default()
    };
    Planner::new(board, config).search(initial).actions
}

pub struct Planner<'a> {
    board: &'a Board,
    config: PlannerConfig,
}

impl<'a> Planner<'a> {
    pub fn new(board: &'a Board, config: PlannerConfig) -> Self {
        Self { board, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn search(&self, initial: &SearchState) -> SolveResult {
        let total_pairs = self.board.total_pairs();
        let timer = Instant::now();

        let mut ids: FxHashMap<SearchState, u32> = FxHashMap::default();
        let mut states: Vec<SearchState> = vec![];
        let mut nodes: Vec<StateNode> = vec![];
        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut expansions = 0;

        ids.insert(initial.clone(), 0);
        states.push(initial.clone());
        nodes.push(StateNode::root());
        open.push(OpenEntry::new(0, seq, Estimate::new(0, initial, total_pairs)));

        let status = loop {
            let Some(entry) = open.pop() else {
                break SearchStatus::FrontierExhausted;
            };
            let id = entry.id as usize;
            let g = entry.estimate.current;

            if states[id].is_goal(total_pairs) {
                let actions = StateNode::path(entry.id, &nodes);
                log::debug!(
                    "Plan found: {} turns, {expansions} expansions, {} states",
                    actions.len(),
                    states.len()
                );
                return SolveResult {
                    status: SearchStatus::Solved,
                    actions: Some(actions),
                    expansions,
                    states: states.len(),
                    elapsed: timer.elapsed(),
                };
            }

            expansions += 1;
            if expansions > self.config.max_expansions {
                break SearchStatus::BudgetExhausted;
            }
            if g > nodes[id].best_g {
                // superseded by a cheaper path pushed later; still counts against the budget
                continue;
            }

            let current = states[id].clone();
            for Successor {
                action,
                state,
                cost,
            } in successors(&current, self.board, self.config.branch_cap)
            {
                let tentative = g + cost;
                let next_id = match ids.get(&state) {
                    Some(&next_id) => {
                        if tentative >= nodes[next_id as usize].best_g {
                            continue;
                        }
                        next_id
                    }
                    None => {
                        let next_id = states.len() as u32;
                        ids.insert(state.clone(), next_id);
                        states.push(state);
                        nodes.push(StateNode::unreached());
                        next_id
                    }
                };
                let node = &mut nodes[next_id as usize];
                node.best_g = tentative;
                node.came_from = Some((entry.id, action));

                seq += 1;
                let estimate = Estimate::new(tentative, &states[next_id as usize], total_pairs);
                open.push(OpenEntry::new(next_id, seq, estimate));
            }
        };

        log::debug!(
            "No plan ({status:?}) after {expansions} expansions, {} states",
            states.len()
        );
        SolveResult {
            status,
            actions: None,
            expansions,
            states: states.len(),
            elapsed: timer.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::apply_action;
    use crate::board::Position;
    use crate::game::Game;

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn replay(board: &Board, actions: &[Action]) -> Game {
        let mut game = Game::new(board.clone());
        for action in actions {
            apply_action(&mut game, action);
        }
        game
    }

    #[test]
    fn test_two_by_two_scenario() {
        let board = Board::from_rows(vec![vec![1, 2], vec![2, 1]]).unwrap();
        let root = SearchState::from_game(&Game::new(board.clone()));
        assert_eq!(root, SearchState::default());

        let first = successors(&root, &board, DEFAULT_BRANCH_CAP);
        assert!(first.iter().any(|s| matches!(s.action, Action::Turn(..))));
        let revealed = root.after(&Action::Turn(p(0, 0), p(1, 1)), &board);
        assert_eq!(revealed.matched(), &[p(0, 0), p(1, 1)]);

        let actions = plan(&root, &board, 1_000).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Turn(p(0, 0), p(1, 1)),
                Action::Turn(p(0, 1), p(1, 0))
            ]
        );
        let game = replay(&board, &actions);
        assert!(game.is_finished());
        assert_eq!(game.moves(), 2);
    }

    #[test]
    fn test_budget_exhaustion() {
        let board = Board::new_from_seed(4, 1).unwrap();
        let root = SearchState::default();
        assert_eq!(plan(&root, &board, 0), None);

        let result = Planner::new(
            &board,
            PlannerConfig {
                max_expansions: 0,
                ..Default::default()
            },
        )
        .search(&root);
        assert_eq!(result.status, SearchStatus::BudgetExhausted);
        assert_eq!(result.expansions, 1);
        assert!(result.actions.is_none());
    }

    #[test]
    fn test_budget_boundary() {
        for seed in 0..4 {
            let board = Board::new_from_seed(4, seed).unwrap();
            let search = |max_expansions| {
                Planner::new(
                    &board,
                    PlannerConfig {
                        max_expansions,
                        ..Default::default()
                    },
                )
                .search(&SearchState::default())
            };
            let solved = search(DEFAULT_MAX_EXPANSIONS);
            assert_eq!(solved.status, SearchStatus::Solved);
            let needed = solved.expansions;

            let exact = search(needed);
            assert_eq!(exact.status, SearchStatus::Solved, "seed {seed}");
            assert_eq!(exact.actions, solved.actions);

            let short = search(needed - 1);
            assert_eq!(short.status, SearchStatus::BudgetExhausted, "seed {seed}");
            assert_eq!(short.expansions, needed);
        }
    }

    #[test]
    fn test_finished_game_needs_no_turns() {
        let board = Board::from_rows(vec![vec![1, 2], vec![2, 1]]).unwrap();
        let done = SearchState::new(board.all_positions(), []);
        assert_eq!(plan(&done, &board, 0), Some(vec![]));
    }

    #[test]
    fn test_empty_branching_exhausts_frontier() {
        let board = Board::new_from_seed(4, 2).unwrap();
        let result = Planner::new(
            &board,
            PlannerConfig {
                max_expansions: 10,
                branch_cap: 0,
            },
        )
        .search(&SearchState::default());
        assert_eq!(result.status, SearchStatus::FrontierExhausted);
        assert_eq!(result.expansions, 1);
    }

    #[test]
    fn test_plan_validity() {
        for seed in 0..8 {
            let board = Board::new_from_seed(4, seed).unwrap();
            let size = board.size();
            let result =
                Planner::new(&board, PlannerConfig::default()).search(&SearchState::default());
            assert_eq!(result.status, SearchStatus::Solved, "seed {seed}");
            let actions = result.actions.unwrap();
            assert!(actions.len() >= board.total_pairs());
            assert!(actions.len() <= board.total_pairs() * size * size);

            let game = replay(&board, &actions);
            assert!(game.is_finished(), "seed {seed}");
            assert_eq!(game.moves(), actions.len());
        }
    }

    #[test]
    fn test_plan_from_partial_knowledge() {
        let board = Board::new_from_seed(4, 7).unwrap();
        let mut game = Game::new(board.clone());
        let positions: Vec<_> = board.all_positions().collect();
        game.apply_turn(positions[0], positions[5]);
        game.apply_turn(positions[9], positions[14]);

        let actions = plan(&SearchState::from_game(&game), &board, 50_000).unwrap();
        for action in &actions {
            let (p1, p2) = action.positions();
            assert!(!game.is_matched(p1) && !game.is_matched(p2));
            apply_action(&mut game, action);
        }
        assert!(game.is_finished());
    }

    #[test]
    fn test_known_pair_is_played_as_match() {
        let board = Board::from_rows(vec![vec![1, 2], vec![2, 1]]).unwrap();
        let mut game = Game::new(board.clone());
        game.apply_turn(p(0, 0), p(0, 1));
        game.apply_turn(p(1, 0), p(1, 0));

        let actions = plan(&SearchState::from_game(&game), &board, 100).unwrap();
        assert_eq!(actions[0], Action::Match(p(0, 1), p(1, 0)));
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn test_search_is_reproducible() {
        let board = Board::new_from_seed(6, 21).unwrap();
        let config = PlannerConfig {
            max_expansions: 2_000,
            branch_cap: 4,
        };
        let a = Planner::new(&board, config).search(&SearchState::default());
        let b = Planner::new(&board, config).search(&SearchState::default());
        assert_eq!(a.status, b.status);
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.expansions, b.expansions);
    }
}
