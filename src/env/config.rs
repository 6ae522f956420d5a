//! Environment configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Player;
use crate::error::ConfigError;
use crate::render::ViewerConfig;

/// Reward table.
///
/// A finished game that is not a win for the rewarded player scores
/// `draw` when nobody completed a line and `loss` otherwise. In the
/// opponent environment a draw finished by the agent's own move scores
/// `completed_draw` instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// The rewarded player completed a line.
    pub win: f32,

    /// The other player completed a line.
    pub loss: f32,

    /// Board full without a line (default: same as a loss).
    pub draw: f32,

    /// Opponent environment only: the agent's own move filled the board
    /// without a line. Scored like a win by default.
    pub completed_draw: f32,

    /// The chosen cell was already occupied. The board is left unchanged.
    pub invalid: f32,

    /// Any other move.
    pub step: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            win: 10.0,
            loss: -10.0,
            draw: -10.0,
            completed_draw: 10.0,
            invalid: -1.0,
            step: 0.0,
        }
    }
}

/// Configuration shared by both environments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Player index (0 or 1) whose perspective defines rewards.
    ///
    /// For the opponent environment this is the opponent's index.
    pub player_id: usize,

    /// Reward table.
    pub rewards: RewardConfig,

    /// Initial seed; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Viewer geometry for `rgb_array` rendering.
    pub viewer: ViewerConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            player_id: 0,
            rewards: RewardConfig::default(),
            seed: None,
            viewer: ViewerConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Set the rewarded player.
    pub fn with_player_id(mut self, id: usize) -> Self {
        self.player_id = id;
        self
    }

    /// Set the reward table.
    pub fn with_rewards(mut self, rewards: RewardConfig) -> Self {
        self.rewards = rewards;
        self
    }

    /// Set the initial seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the viewer geometry.
    pub fn with_viewer(mut self, viewer: ViewerConfig) -> Self {
        self.viewer = viewer;
        self
    }

    /// The configured player.
    pub fn player(&self) -> Result<Player, ConfigError> {
        Player::from_index(self.player_id).ok_or_else(|| ConfigError::Invalid {
            message: format!("player_id must be 0 or 1, got {}", self.player_id),
        })
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player()?;
        let r = &self.rewards;
        if [r.win, r.loss, r.draw, r.completed_draw, r.invalid, r.step]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(ConfigError::Invalid {
                message: "rewards must be finite".to_string(),
            });
        }
        self.viewer.validate()
    }

    /// Load and validate a JSON config. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EnvConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
