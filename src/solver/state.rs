use crate::action::Action;
use crate::board::{Board, CardValue, Position};
use crate::game::Game;

use smallvec::SmallVec;
use std::collections::BTreeMap;

pub type PositionList = SmallVec<[Position; 2]>;

/// Canonical snapshot of what the player knows: matched cells plus remembered,
/// unmatched cells grouped by value.
///
/// Both parts are kept sorted, so two snapshots holding the same knowledge compare
/// and hash equal no matter in which order it was gathered. States are never
/// mutated; every transition builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SearchState {
    matched: Vec<Position>,
    remembered: Vec<(CardValue, PositionList)>,
}

impl SearchState {
    /// Builds the canonical form. Remembered entries for matched positions are dropped.
    pub fn new<M, S>(matched: M, seen: S) -> Self
    where
        M: IntoIterator<Item = Position>,
        S: IntoIterator<Item = (Position, CardValue)>,
    {
        let mut matched: Vec<Position> = matched.into_iter().collect();
        matched.sort_unstable();
        matched.dedup();

        let mut groups: BTreeMap<CardValue, PositionList> = BTreeMap::new();
        for (pos, value) in seen {
            if matched.binary_search(&pos).is_ok() {
                continue;
            }
            groups.entry(value).or_default().push(pos);
        }
        let remembered = groups
            .into_iter()
            .map(|(value, mut positions)| {
                positions.sort_unstable();
                positions.dedup();
                (value, positions)
            })
            .collect();

        let state = Self {
            matched,
            remembered,
        };
        debug_assert!(state.is_consistent());
        state
    }

    pub fn from_game(game: &Game) -> Self {
        Self::new(
            game.matched().iter().copied(),
            game.seen().iter().map(|(&pos, &value)| (pos, value)),
        )
    }

    pub fn matched(&self) -> &[Position] {
        &self.matched
    }

    pub fn remembered(&self) -> &[(CardValue, PositionList)] {
        &self.remembered
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.len() / 2
    }

    pub fn is_matched(&self, pos: Position) -> bool {
        self.matched.binary_search(&pos).is_ok()
    }

    pub fn is_remembered(&self, pos: Position) -> bool {
        self.remembered_positions().any(|(p, _)| p == pos)
    }

    pub fn is_goal(&self, total_pairs: usize) -> bool {
        self.matched_pairs() == total_pairs
    }

    /// Remembered positions with their values, ordered by value then position.
    pub fn remembered_positions(&self) -> impl Iterator<Item = (Position, CardValue)> + '_ {
        self.remembered
            .iter()
            .flat_map(|(value, positions)| positions.iter().map(move |&p| (p, *value)))
    }

    /// First two remembered positions of every value known at two places.
    pub fn known_pairs(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.remembered
            .iter()
            .filter(|(_, positions)| positions.len() >= 2)
            .map(|(_, positions)| (positions[0], positions[1]))
    }

    /// The state reached by flipping `p1` and `p2`.
    ///
    /// Reveals use the true board values, which makes the search an oracle over the
    /// cards it has not seen yet. The pair is matched only when the values agree.
    pub fn reveal(&self, p1: Position, p2: Position, board: &Board) -> Self {
        let mut seen: BTreeMap<Position, CardValue> = self.remembered_positions().collect();
        let mut matched = self.matched.clone();
        let v1 = board.value_at(p1);
        let v2 = board.value_at(p2);
        if !self.is_matched(p1) {
            seen.insert(p1, v1);
        }
        if !self.is_matched(p2) {
            seen.insert(p2, v2);
        }
        if v1 == v2 && p1 != p2 && !self.is_matched(p1) {
            matched.push(p1);
            matched.push(p2);
        }
        Self::new(matched, seen)
    }

    pub fn after(&self, action: &Action, board: &Board) -> Self {
        let (p1, p2) = action.positions();
        self.reveal(p1, p2, board)
    }

    /// No position is both matched and remembered, and every remembered group is
    /// non-empty without duplicates.
    pub fn is_consistent(&self) -> bool {
        self.remembered.iter().all(|(_, positions)| {
            !positions.is_empty()
                && positions.windows(2).all(|w| w[0] < w[1])
                && positions.iter().all(|p| !self.is_matched(*p))
        }) && self.remembered.windows(2).all(|w| w[0].0 < w[1].0)
            && self.matched.windows(2).all(|w| w[0] < w[1])
    }
}
