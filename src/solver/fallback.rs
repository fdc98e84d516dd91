use crate::action::Action;
use crate::game::Game;

use rand::{Rng, seq::IndexedRandom};

/// Picks a single next turn without searching.
///
/// A remembered pair is taken first. Otherwise a random unseen card is flipped
/// (any unmatched card once all have been seen); if its value is already
/// remembered elsewhere it is paired with that card, else with a random other
/// unmatched card. With one unmatched card left the same position is returned
/// twice, a turn that changes nothing but the move count.
///
/// Returns `None` only when the game is finished.
pub fn fallback_action<R: Rng + ?Sized>(game: &Game, rng: &mut R) -> Option<Action> {
    if let Some(positions) = game.seen_pairs().into_values().find(|p| p.len() >= 2) {
        return Some(Action::Turn(positions[0], positions[1]));
    }

    let unmatched = game.unmatched_positions();
    let unseen: Vec<_> = unmatched
        .iter()
        .copied()
        .filter(|p| !game.seen().contains_key(p))
        .collect();
    let first = if unseen.is_empty() {
        *unmatched.choose(rng)?
    } else {
        *unseen.choose(rng)?
    };

    let value = game.value_at(first);
    if let Some((&known, _)) = game
        .seen()
        .iter()
        .find(|&(&pos, &v)| v == value && pos != first && !game.is_matched(pos))
    {
        return Some(Action::Turn(first, known));
    }

    let remaining: Vec<_> = unmatched.into_iter().filter(|&p| p != first).collect();
    let second = remaining.choose(rng).copied().unwrap_or(first);
    Some(Action::Turn(first, second))
}
