use crate::core::{EnvRng, Observation, BOARD_CELLS, OBS_EMPTY};

use super::Policy;

/// Uniform choice among empty cells.
///
/// Draws from a probability vector over all nine cells with zero weight on
/// occupied ones.
#[derive(Clone, Debug, Default)]
pub struct RandomPolicy;

impl RandomPolicy {
    /// Selection probability of each cell for `observation`.
    #[must_use]
    pub fn action_probabilities(observation: &Observation) -> [f32; BOARD_CELLS] {
        let empty = observation.iter().filter(|&&v| v == OBS_EMPTY).count();
        let mut probs = [0.0; BOARD_CELLS];
        if empty > 0 {
            let p = 1.0 / empty as f32;
            for (prob, &v) in probs.iter_mut().zip(observation) {
                if v == OBS_EMPTY {
                    *prob = p;
                }
            }
        }
        probs
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, observation: &Observation, rng: &mut EnvRng) -> Option<usize> {
        rng.choose_weighted(&Self::action_probabilities(observation))
    }

    fn name(&self) -> &str {
        "random"
    }
}
