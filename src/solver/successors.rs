use super::state::SearchState;

use crate::action::Action;
use crate::board::{Board, Position};

use smallvec::SmallVec;

/// Every transition is one physical turn.
pub const TURN_COST: u32 = 1;

type Positions = SmallVec<[Position; 36]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successor {
    pub action: Action,
    pub state: SearchState,
    pub cost: u32,
}

/// Enumerates the turns worth considering from `state`.
///
/// Certain pairs dominate: when any value is remembered at two places, only those
/// matches are returned, one per value. Otherwise up to `branch_cap` unseen cards are
/// each tried against every remembered card and against up to `branch_cap` other
/// unseen cards. When nothing is unseen any more, all unmatched cards stand in for the
/// unseen ones. Output order is a pure function of the state and the board.
pub fn successors(state: &SearchState, board: &Board, branch_cap: usize) -> Vec<Successor> {
    let mut result: Vec<Successor> = state
        .known_pairs()
        .map(|(p1, p2)| {
            let action = Action::Match(p1, p2);
            Successor {
                state: state.after(&action, board),
                action,
                cost: TURN_COST,
            }
        })
        .collect();
    if !result.is_empty() {
        return result;
    }

    let mut remembered: Positions = state.remembered_positions().map(|(p, _)| p).collect();
    remembered.sort_unstable();

    let unmatched: Positions = board
        .all_positions()
        .filter(|&p| !state.is_matched(p))
        .collect();
    let mut pool: Positions = unmatched
        .iter()
        .copied()
        .filter(|p| remembered.binary_search(p).is_err())
        .collect();
    if pool.is_empty() {
        pool = unmatched;
    }

    let mut push_turn = |c: Position, d: Position| {
        let action = Action::Turn(c, d);
        result.push(Successor {
            state: state.after(&action, board),
            action,
            cost: TURN_COST,
        });
    };

    for &c in pool.iter().take(branch_cap) {
        for &d in remembered.iter().filter(|&&d| d != c) {
            push_turn(c, d);
        }
        for &d in pool.iter().filter(|&&d| d != c).take(branch_cap) {
            push_turn(c, d);
        }
    }

    result
}
