//! Plans move sequences for an agent playing Memory (Concentration) using A* search
//! over abstracted knowledge states, with a single-step fallback policy when the
//! search runs out of budget.
pub mod action;
pub mod autoplay;
pub mod board;
pub mod game;
pub mod solver;
