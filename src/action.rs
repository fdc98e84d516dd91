use crate::board::Position;
use crate::game::Game;

/// One physical turn: two cards flipped together.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Both positions are remembered with the same value, the turn is a certain pair.
    Match(Position, Position),
    /// At least one card is not known to pair with the other.
    Turn(Position, Position),
}

impl Action {
    pub fn positions(&self) -> (Position, Position) {
        match *self {
            Action::Match(p1, p2) | Action::Turn(p1, p2) => (p1, p2),
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Action::Match(..))
    }

    pub fn is_degenerate(&self) -> bool {
        let (p1, p2) = self.positions();
        p1 == p2
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Match(p1, p2) => write!(f, "{},{}={},{}", p1.row, p1.col, p2.row, p2.col),
            Action::Turn(p1, p2) => write!(f, "{},{}~{},{}", p1.row, p1.col, p2.row, p2.col),
        }
    }
}

pub fn format_actions(actions: &[Action]) -> String {
    let list: Vec<String> = actions.iter().map(|a| a.to_string()).collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

/// Applies `action` to the live game, returning whether it produced a pair.
pub fn apply_action(game: &mut Game, action: &Action) -> bool {
    let (p1, p2) = action.positions();
    game.apply_turn(p1, p2)
}

pub fn describe_action(game: &Game, action: &Action) -> String {
    let (p1, p2) = action.positions();
    let v1 = game.value_at(p1);
    let v2 = game.value_at(p2);
    let kind = if action.is_match() { "Match" } else { "Turn" };
    let outcome = if v1 == v2 && p1 != p2 { "✓" } else { "✗" };
    format!("{kind} {p1}={v1} {p2}={v2} {outcome}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_format_actions() {
        let actions = vec![
            Action::Turn(Position::new(0, 0), Position::new(0, 1)),
            Action::Match(Position::new(0, 0), Position::new(1, 1)),
        ];
        assert_eq!(format_actions(&actions), "0,0~0,1 0,0=1,1 \n");
        assert_eq!(format_actions(&[]), "");

        let many = vec![Action::Turn(Position::new(1, 0), Position::new(0, 1)); 11];
        assert_eq!(format_actions(&many).lines().count(), 2);
    }

    #[test]
    fn test_apply_and_describe() {
        let mut game = Game::new(Board::from_rows(vec![vec![1, 2], vec![2, 1]]).unwrap());
        let action = Action::Turn(Position::new(0, 1), Position::new(1, 0));
        assert_eq!(describe_action(&game, &action), "Turn (0,1)=2 (1,0)=2 ✓");
        assert!(apply_action(&mut game, &action));

        let degenerate = Action::Turn(Position::new(0, 0), Position::new(0, 0));
        assert!(degenerate.is_degenerate());
        assert_eq!(describe_action(&game, &degenerate), "Turn (0,0)=1 (0,0)=1 ✗");
        assert!(!apply_action(&mut game, &degenerate));
    }
}
