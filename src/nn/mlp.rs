//! Dense feed-forward network for pre-trained DQN opponents.
//!
//! Weights are stored as serde documents: JSON for files ending in `.json`,
//! bincode for everything else. A file holds a list of layers; each layer
//! keeps its weight matrix in row-major `out x in` order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ModelError;
use crate::nn::traits::{EncodedState, QNetwork};

/// File stem of the opponent model for player `id`.
pub fn model_stem(id: usize) -> String {
    format!("dqn_ttt{}", id)
}

/// Element-wise activation applied after a layer's affine transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }
}

/// One fully connected layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub in_features: usize,
    pub out_features: usize,
    /// Row-major `out_features x in_features`.
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    pub fn new(
        in_features: usize,
        out_features: usize,
        weights: Vec<f32>,
        bias: Vec<f32>,
        activation: Activation,
    ) -> Self {
        Self {
            in_features,
            out_features,
            weights,
            bias,
            activation,
        }
    }

    /// A zero-initialised layer.
    pub fn zeros(in_features: usize, out_features: usize, activation: Activation) -> Self {
        Self::new(
            in_features,
            out_features,
            vec![0.0; in_features * out_features],
            vec![0.0; out_features],
            activation,
        )
    }

    fn check(&self, layer: usize) -> Result<(), ModelError> {
        let expected = self.in_features * self.out_features;
        if self.weights.len() != expected {
            return Err(ModelError::ShapeMismatch {
                layer,
                expected,
                got: self.weights.len(),
            });
        }
        if self.bias.len() != self.out_features {
            return Err(ModelError::ShapeMismatch {
                layer,
                expected: self.out_features,
                got: self.bias.len(),
            });
        }
        Ok(())
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks_exact(self.in_features.max(1))
            .zip(&self.bias)
            .map(|(row, &b)| {
                let z: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Multi-layer perceptron.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mlp {
    pub layers: Vec<DenseLayer>,
}

impl Mlp {
    /// Build a network, checking that layer shapes line up.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        let mlp = Self { layers };
        mlp.validate()?;
        Ok(mlp)
    }

    /// Every layer's buffers match its declared shape and consecutive
    /// layers agree on their shared dimension.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::Empty);
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.check(i)?;
            if i > 0 {
                let prev = self.layers[i - 1].out_features;
                if layer.in_features != prev {
                    return Err(ModelError::ShapeMismatch {
                        layer: i,
                        expected: prev,
                        got: layer.in_features,
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.in_features)
    }

    #[must_use]
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.out_features)
    }

    /// Run the network on a flat input vector.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, ModelError> {
        if input.len() != self.input_size() {
            return Err(ModelError::ShapeMismatch {
                layer: 0,
                expected: self.input_size(),
                got: input.len(),
            });
        }
        let mut x = input.to_vec();
        for layer in &self.layers {
            x = layer.forward(&x);
        }
        Ok(x)
    }

    /// Load weights from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mlp: Mlp = if is_json(path) {
            serde_json::from_slice(&bytes).map_err(|e| ModelError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            bincode::deserialize(&bytes).map_err(|e| ModelError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };
        mlp.validate()?;

        debug!(
            path = %path.display(),
            layers = mlp.layers.len(),
            "loaded opponent model"
        );
        Ok(mlp)
    }

    /// Locate and load `dqn_ttt{id}` in `dir`, trying `.json` then `.bin`.
    pub fn load_for_player(dir: impl AsRef<Path>, id: usize) -> Result<Self, ModelError> {
        let dir = dir.as_ref();
        let stem = model_stem(id);
        let path = ["json", "bin"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file())
            .ok_or_else(|| ModelError::NotFound {
                stem: stem.clone(),
                dir: dir.to_path_buf(),
            })?;
        Self::load(path)
    }

    /// Write weights to `path` in the format implied by its extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(self).map_err(|e| ModelError::Encode(e.to_string()))?
        } else {
            bincode::serialize(self).map_err(|e| ModelError::Encode(e.to_string()))?
        };
        fs::write(path, bytes).map_err(|source| ModelError::Io {
            path: PathBuf::from(path),
            source,
        })
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

impl QNetwork for Mlp {
    fn predict(&self, encoded: &EncodedState) -> Vec<f32> {
        match self.forward(&encoded.tensor) {
            Ok(q) => q,
            Err(e) => {
                tracing::warn!(error = %e, "opponent forward pass failed, returning no Q-values");
                Vec::new()
            }
        }
    }
}
