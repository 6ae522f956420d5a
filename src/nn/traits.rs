//! Q-network interface used by the model-driven opponent.
//!
//! The opponent network maps a board observation to one Q-value per cell.
//! Implementations may live in Rust (`Mlp`) or in Python behind the
//! `python` feature.

use serde::{Deserialize, Serialize};

use crate::core::{Observation, BOARD_CELLS};

/// Network input as a flat tensor plus its shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor.
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// The observation reshaped to `[1, 1, 9]`, the input layout the DQN
    /// opponents were trained with (batch, window, cells).
    pub fn from_observation(obs: &Observation) -> Self {
        let tensor = obs.iter().map(|&v| f32::from(v)).collect();
        Self::new(tensor, vec![1, 1, BOARD_CELLS])
    }

    /// Create a zero-filled encoded state with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }
}

/// A network producing one Q-value per board cell.
pub trait QNetwork: Send + Sync {
    /// Predict Q-values for the given state.
    ///
    /// The output should have `BOARD_CELLS` entries. Shorter outputs are
    /// treated as missing actions by the policy.
    fn predict(&self, encoded: &EncodedState) -> Vec<f32>;

    /// Batch prediction for multiple states.
    fn predict_batch(&self, encoded: &[EncodedState]) -> Vec<Vec<f32>> {
        encoded.iter().map(|e| self.predict(e)).collect()
    }
}

impl<N: QNetwork + ?Sized> QNetwork for Box<N> {
    fn predict(&self, encoded: &EncodedState) -> Vec<f32> {
        (**self).predict(encoded)
    }
}

/// Constant zero Q-values (baseline for testing).
#[derive(Clone, Debug, Default)]
pub struct UniformQ;

impl QNetwork for UniformQ {
    fn predict(&self, _encoded: &EncodedState) -> Vec<f32> {
        vec![0.0; BOARD_CELLS]
    }
}

/// Returns the same Q-values for every state.
///
/// Handy for scripting a deterministic opponent in tests.
#[derive(Clone, Debug)]
pub struct FixedQ {
    values: Vec<f32>,
}

impl FixedQ {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Prefer cells in the given order: the first cell gets the highest value.
    pub fn preferring(order: &[usize]) -> Self {
        let mut values = vec![0.0; BOARD_CELLS];
        for (rank, &cell) in order.iter().enumerate() {
            if let Some(v) = values.get_mut(cell) {
                *v = (order.len() - rank) as f32;
            }
        }
        Self { values }
    }
}

impl QNetwork for FixedQ {
    fn predict(&self, _encoded: &EncodedState) -> Vec<f32> {
        self.values.clone()
    }
}
