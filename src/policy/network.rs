use tracing::trace;

use crate::core::{EnvRng, Observation, BOARD_CELLS, OBS_EMPTY};
use crate::nn::{EncodedState, QNetwork};

use super::Policy;

/// Index of the largest `q` among cells where `mask` is true.
///
/// Ties go to the lowest index. Cells beyond `q.len()` count as masked out.
/// Returns `None` if no cell is both valid and scored, or a score is NaN.
pub fn masked_argmax(q: &[f32], mask: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, (&v, &ok)) in q.iter().zip(mask).enumerate() {
        if !ok || v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Greedy policy over a Q-network: one forward pass, occupied cells masked.
#[derive(Clone, Debug)]
pub struct QNetworkPolicy<N> {
    network: N,
}

impl<N: QNetwork> QNetworkPolicy<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Q-values for an observation.
    pub fn q_values(&self, observation: &Observation) -> Vec<f32> {
        self.network
            .predict(&EncodedState::from_observation(observation))
    }
}

impl<N: QNetwork> Policy for QNetworkPolicy<N> {
    fn select_action(&mut self, observation: &Observation, _rng: &mut EnvRng) -> Option<usize> {
        let mask: [bool; BOARD_CELLS] = std::array::from_fn(|i| observation[i] == OBS_EMPTY);
        if !mask.iter().any(|&m| m) {
            // A full board has no valid cell; report cell 0 like a raw argmax would.
            return Some(0);
        }

        let q = self.q_values(observation);
        let action = masked_argmax(&q, &mask);
        trace!(?q, ?action, "q-network move");
        action
    }

    fn name(&self) -> &str {
        "q-network"
    }
}
