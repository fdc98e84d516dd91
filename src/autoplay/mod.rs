//! Drives a live game to completion with the planner, falling back to the
//! single-step policy whenever a plan cannot be found within budget.

use crate::{
    action::{Action, apply_action, describe_action},
    game::Game,
    solver::{Planner, PlannerConfig, SearchState, fallback_action},
};

use rand::Rng;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActionSource {
    Plan,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub action: Action,
    pub source: ActionSource,
    pub matched: bool,
    /// The live state after the turn differed from the planner's prediction.
    pub diverged: bool,
}

/// A queued action with the state the planner expects once it has been played.
#[derive(Debug, Clone)]
struct Pending {
    action: Action,
    source: ActionSource,
    expected: SearchState,
}

#[derive(Debug, Clone)]
pub struct PlayResult {
    pub finished: bool,
    pub turns: usize,
    pub plans: usize,
    pub fallbacks: usize,
    pub replans: usize,
    pub elapsed: Duration,
    pub history: Vec<TurnRecord>,
}

/// Owns the live game and feeds it one action at a time.
pub struct Agent<R: Rng> {
    game: Game,
    config: PlannerConfig,
    rng: R,
    pending: VecDeque<Pending>,
    plans: usize,
    fallbacks: usize,
    replans: usize,
}

impl<R: Rng> Agent<R> {
    pub fn new(game: Game, config: PlannerConfig, rng: R) -> Self {
        Self {
            game,
            config,
            rng,
            pending: VecDeque::new(),
            plans: 0,
            fallbacks: 0,
            replans: 0,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    /// Number of plans the search produced so far.
    pub fn plans(&self) -> usize {
        self.plans
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Number of times a pending plan was thrown away before it was used up.
    pub fn replans(&self) -> usize {
        self.replans
    }

    /// Plays one turn, planning first if no actions are pending.
    /// Returns `None` once the game is finished.
    pub fn step(&mut self) -> Option<TurnRecord> {
        if self.game.is_finished() {
            return None;
        }
        if self.pending.is_empty() {
            self.refill();
        }

        let Pending {
            action,
            source,
            expected,
        } = self.pending.pop_front()?;
        let (p1, p2) = action.positions();
        if self.game.is_matched(p1) || self.game.is_matched(p2) {
            log::debug!("Dropping stale plan at {action}");
            self.replans += 1;
            self.pending.clear();
            return self.step();
        }

        log::trace!("{}", describe_action(&self.game, &action));
        let matched = apply_action(&mut self.game, &action);
        // Planned reveals use true values, so this only trips when the plan started
        // from a view of the game that disagrees with the live one.
        let diverged = SearchState::from_game(&self.game) != expected;
        if diverged {
            log::debug!("Outcome of {action} diverged from the plan");
            self.discard_plan();
        }

        Some(TurnRecord {
            action,
            source,
            matched,
            diverged,
        })
    }

    /// Plays until the game is finished or `max_turns` turns have been taken.
    pub fn run(&mut self, max_turns: usize) -> PlayResult {
        let timer = Instant::now();
        let mut history = vec![];
        while history.len() < max_turns {
            match self.step() {
                Some(record) => history.push(record),
                None => break,
            }
        }
        PlayResult {
            finished: self.game.is_finished(),
            turns: self.game.moves(),
            plans: self.plans,
            fallbacks: self.fallbacks,
            replans: self.replans,
            elapsed: timer.elapsed(),
            history,
        }
    }

    fn refill(&mut self) {
        let initial = SearchState::from_game(&self.game);
        let result = Planner::new(self.game.board(), self.config).search(&initial);
        match result.actions {
            Some(actions) => {
                self.plans += 1;
                log::debug!(
                    "Planned {} turns in {:?} ({} expansions)",
                    actions.len(),
                    result.elapsed,
                    result.expansions
                );
                self.enqueue(initial, actions, ActionSource::Plan);
            }
            None => {
                if let Some(action) = fallback_action(&self.game, &mut self.rng) {
                    self.fallbacks += 1;
                    log::debug!("Planner gave up ({:?}), falling back to {action}", result.status);
                    self.enqueue(initial, [action], ActionSource::Fallback);
                }
            }
        }
    }

    /// Queues `actions`, recording the state each one is predicted to lead to from `from`.
    fn enqueue<I>(&mut self, from: SearchState, actions: I, source: ActionSource)
    where
        I: IntoIterator<Item = Action>,
    {
        let mut state = from;
        for action in actions {
            state = state.after(&action, self.game.board());
            self.pending.push_back(Pending {
                action,
                source,
                expected: state.clone(),
            });
        }
    }

    fn discard_plan(&mut self) {
        if !self.pending.is_empty() {
            self.replans += 1;
            self.pending.clear();
        }
    }
}

/// Upper bound on turns for a full game: `total_pairs * size²`.
pub fn turn_limit(game: &Game) -> usize {
    let size = game.board().size();
    game.board().total_pairs() * size * size
}

/// Plays `game` to the end and returns the finished game along with the statistics.
pub fn autoplay<R: Rng>(game: Game, config: PlannerConfig, rng: R) -> (Game, PlayResult) {
    let limit = turn_limit(&game);
    let mut agent = Agent::new(game, config, rng);
    let result = agent.run(limit);
    (agent.into_game(), result)
}
