//! Core types: board, players, spaces and the RNG.
//!
//! Nothing here knows about rewards or opponents; environments build on
//! these pieces.

pub mod board;
pub mod rng;
pub mod space;

pub use board::{
    Board, LegalActions, Observation, Outcome, Player, BOARD_CELLS, EMPTY, LINES, OBS_EMPTY,
};
pub use rng::EnvRng;
pub use space::{Discrete, MultiDiscrete};
