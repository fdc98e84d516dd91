use crate::board::{Board, CardValue, Position};

use std::collections::{BTreeMap, BTreeSet};

/// The live game: a board plus what has been matched and what the player remembers.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    matched: BTreeSet<Position>,
    seen: BTreeMap<Position, CardValue>,
    moves: usize,
}

impl Game {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            matched: BTreeSet::new(),
            seen: BTreeMap::new(),
            moves: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn value_at(&self, pos: Position) -> CardValue {
        self.board.value_at(pos)
    }

    pub fn matched(&self) -> &BTreeSet<Position> {
        &self.matched
    }

    /// Remembered values of revealed cards that are not matched yet.
    pub fn seen(&self) -> &BTreeMap<Position, CardValue> {
        &self.seen
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn is_matched(&self, pos: Position) -> bool {
        self.matched.contains(&pos)
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched.len() / 2
    }

    pub fn unmatched_positions(&self) -> Vec<Position> {
        self.board
            .all_positions()
            .filter(|p| !self.matched.contains(p))
            .collect()
    }

    /// Groups remembered, unmatched positions by value.
    pub fn seen_pairs(&self) -> BTreeMap<CardValue, Vec<Position>> {
        let mut pairs: BTreeMap<CardValue, Vec<Position>> = BTreeMap::new();
        for (&pos, &value) in &self.seen {
            if !self.matched.contains(&pos) {
                pairs.entry(value).or_default().push(pos);
            }
        }
        pairs
    }

    /// Flips two cards. Returns whether they formed a new pair.
    ///
    /// Turning the same position twice is a legal no-op turn: it still costs a move.
    pub fn apply_turn(&mut self, pos1: Position, pos2: Position) -> bool {
        self.moves += 1;
        let value1 = self.board.value_at(pos1);
        let value2 = self.board.value_at(pos2);
        if !self.matched.contains(&pos1) {
            self.seen.insert(pos1, value1);
        }
        if !self.matched.contains(&pos2) {
            self.seen.insert(pos2, value2);
        }
        if value1 == value2 && pos1 != pos2 && !self.matched.contains(&pos1) {
            self.matched.insert(pos1);
            self.matched.insert(pos2);
            self.seen.remove(&pos1);
            self.seen.remove(&pos2);
            return true;
        }
        false
    }

    pub fn is_finished(&self) -> bool {
        self.matched_pairs() == self.board.total_pairs()
    }

    /// Renders the board from the player's point of view: matched cells show their
    /// value, remembered cells show `value?` and hidden cells show `·`.
    pub fn pretty_print(&self) -> String {
        let width = self.board.total_pairs().to_string().len() + 1;
        let size = self.board.size();
        let mut output = String::new();
        for (i, pos) in self.board.all_positions().enumerate() {
            let cell = if self.matched.contains(&pos) {
                self.value_at(pos).to_string()
            } else if let Some(value) = self.seen.get(&pos) {
                format!("{value}?")
            } else {
                "·".to_string()
            };
            output.push_str(&format!("{cell:>width$}"));
            if (i + 1) % size == 0 {
                output.push('\n');
            } else {
                output.push(' ');
            }
        }
        output.push_str(&format!(
            "Turns: {}    Matches: {}/{}",
            self.moves,
            self.matched_pairs(),
            self.board.total_pairs()
        ));
        output
    }
}
