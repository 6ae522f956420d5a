//! Neural network support for the model-driven opponent.
//!
//! ## Overview
//!
//! - **Traits**: `QNetwork` maps an `EncodedState` to 9 Q-values
//! - **Mlp**: dense network whose weights load from JSON or bincode
//! - **Baselines**: `UniformQ`, `FixedQ` for testing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tictactoe_gym::nn::{EncodedState, Mlp, QNetwork};
//!
//! let net = Mlp::load_for_player("models", 1)?;
//! let q = net.predict(&EncodedState::from_observation(&obs));
//! ```

pub mod mlp;
pub mod traits;

pub use mlp::{model_stem, Activation, DenseLayer, Mlp};
pub use traits::{EncodedState, FixedQ, QNetwork, UniformQ};
