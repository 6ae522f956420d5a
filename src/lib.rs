//! # tictactoe-gym
//!
//! A tic-tac-toe reinforcement-learning environment with the conventional
//! step/reset/render interface, plus a variant played against a
//! pre-trained neural-network opponent.
//!
//! ## Design Principles
//!
//! 1. **Stable encoding**: Observations use the `(cell + 2) mod 3` encoding
//!    that pre-trained opponents were trained on. Empty cells read as `1`.
//!
//! 2. **Typed errors**: Out-of-range actions are errors; occupied cells are
//!    a penalised move, not a failure.
//!
//! 3. **Deterministic when seeded**: One ChaCha8 stream per environment
//!    drives random opponents and scripted agents.
//!
//! ## Modules
//!
//! - `core`: Board, win detection, spaces, RNG
//! - `env`: `Environment` trait, `TicTacToeEnv`, `OpponentEnv`, configuration
//! - `policy`: Random, Q-network and minimax move selection
//! - `nn`: `QNetwork` trait and the dense `Mlp` used for DQN opponents
//! - `render`: Text and RGB-frame rendering
//! - `episode`: Rollouts and evaluation

pub mod core;
pub mod env;
pub mod episode;
pub mod error;
pub mod nn;
pub mod policy;
pub mod render;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used types
pub use crate::core::{Board, Discrete, EnvRng, MultiDiscrete, Observation, Outcome, Player};

pub use crate::env::{
    EnvConfig, Environment, OpponentEnv, RewardConfig, StepInfo, StepResult, TicTacToeEnv,
};

pub use crate::episode::{evaluate, run_episode, EpisodeOptions, EpisodeSummary, EvaluationStats};

pub use crate::error::{ConfigError, EnvError, ModelError};

pub use crate::nn::{Activation, DenseLayer, EncodedState, Mlp, QNetwork};

pub use crate::policy::{masked_argmax, MinimaxPolicy, Policy, QNetworkPolicy, RandomPolicy};

pub use crate::render::{Frame, RenderMode, RenderOutput, ViewerConfig};
