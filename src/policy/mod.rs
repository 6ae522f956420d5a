//! Move-selection policies for opponents and scripted agents.
//!
//! Policies are trait-based so environments can be paired with any opponent:
//! - `RandomPolicy`: uniform over empty cells
//! - `QNetworkPolicy`: masked argmax over a network's Q-values
//! - `MinimaxPolicy`: perfect play, memoized

mod minimax;
mod network;
mod random;

pub use minimax::MinimaxPolicy;
pub use network::{masked_argmax, QNetworkPolicy};
pub use random::RandomPolicy;

use crate::core::{EnvRng, Observation};

/// Chooses a cell given the current observation.
///
/// Observations use the agent encoding, so empty cells read as `1`.
pub trait Policy {
    /// Pick a cell index, or `None` when the policy has nothing to offer.
    fn select_action(&mut self, observation: &Observation, rng: &mut EnvRng) -> Option<usize>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn select_action(&mut self, observation: &Observation, rng: &mut EnvRng) -> Option<usize> {
        (**self).select_action(observation, rng)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
