//! Reinforcement-learning environments.
//!
//! Both environments follow the step/reset/render convention:
//!
//! ```
//! use tictactoe_gym::env::{Environment, TicTacToeEnv};
//!
//! let mut env = TicTacToeEnv::new(0).unwrap();
//! let obs = env.reset();
//! assert_eq!(obs, [1; 9]);
//!
//! let (obs, reward, done, _info) = env.step(4).unwrap().into_tuple();
//! assert_eq!(obs[4], 2);
//! assert_eq!(reward, 0.0);
//! assert!(!done);
//! ```
//!
//! - `TicTacToeEnv`: the caller plays both sides in turn
//! - `OpponentEnv`: the caller plays one side against a `Policy`

pub mod config;
mod opponent;
mod state;
mod tictactoe;

pub use config::{EnvConfig, RewardConfig};
pub use opponent::OpponentEnv;
pub use tictactoe::TicTacToeEnv;

use serde::{Deserialize, Serialize};

use crate::core::{Board, Discrete, EnvRng, MultiDiscrete, Observation, Outcome, Player, BOARD_CELLS};
use crate::error::EnvError;
use crate::render::{RenderMode, RenderOutput};

/// Extra details about a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Game state after the step.
    pub outcome: Outcome,

    /// The chosen cell was occupied; nothing was placed.
    pub rejected: bool,

    /// Cell the opponent answered with, if it moved.
    pub opponent_action: Option<usize>,

    /// Calls made after the episode finished (0 on the finishing step).
    pub steps_beyond_done: Option<u32>,
}

impl StepInfo {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            rejected: false,
            opponent_action: None,
            steps_beyond_done: None,
        }
    }

    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.outcome.winner()
    }
}

/// The result of one `step`: observation, reward, done flag and info.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub observation: Observation,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

impl StepResult {
    /// Destructure into the conventional four-tuple.
    pub fn into_tuple(self) -> (Observation, f32, bool, StepInfo) {
        (self.observation, self.reward, self.done, self.info)
    }
}

/// Step/reset/render interface.
pub trait Environment {
    /// Start a new episode and return the first observation.
    ///
    /// Also releases the viewer, like `close`.
    fn reset(&mut self) -> Observation;

    /// Play `action` (a cell index in `0..9`).
    ///
    /// Fails only for actions outside the action space or before the first
    /// `reset`. Occupied cells are answered with the invalid-move reward.
    fn step(&mut self, action: usize) -> Result<StepResult, EnvError>;

    /// Render the current board. Returns `None` for `Human` mode and before
    /// the first `reset`.
    fn render(&mut self, mode: RenderMode) -> Option<RenderOutput>;

    /// Release the viewer.
    fn close(&mut self);

    /// Reseed the environment RNG; `None` draws from entropy.
    ///
    /// Returns the seeds in use.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64>;

    /// Current board, `None` before the first `reset`.
    fn board(&self) -> Option<&Board>;

    /// The environment RNG, shared with scripted agents for reproducibility.
    fn rng_mut(&mut self) -> &mut EnvRng;

    fn action_space(&self) -> Discrete {
        Discrete::new(BOARD_CELLS)
    }

    fn observation_space(&self) -> MultiDiscrete {
        MultiDiscrete::board()
    }
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn reset(&mut self) -> Observation {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<StepResult, EnvError> {
        (**self).step(action)
    }

    fn render(&mut self, mode: RenderMode) -> Option<RenderOutput> {
        (**self).render(mode)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        (**self).seed(seed)
    }

    fn board(&self) -> Option<&Board> {
        (**self).board()
    }

    fn rng_mut(&mut self) -> &mut EnvRng {
        (**self).rng_mut()
    }
}
