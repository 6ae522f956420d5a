//! Single-agent environment against a fixed opponent policy.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::{Board, EnvRng, Observation, Outcome, Player};
use crate::error::EnvError;
use crate::nn::Mlp;
use crate::policy::{Policy, QNetworkPolicy};
use crate::render::{RenderMode, RenderOutput};

use super::config::EnvConfig;
use super::state::EnvState;
use super::{Environment, StepInfo, StepResult};

/// Tic-tac-toe against an opponent policy.
///
/// The configured player id belongs to the opponent; the caller plays the
/// other side. When the opponent is player 0 it opens the game on `reset`.
/// Rewards are always from the caller's point of view.
pub struct OpponentEnv<P> {
    state: EnvState,
    opponent: P,
    opponent_rng: EnvRng,
}

impl<P: Policy> OpponentEnv<P> {
    /// Opponent playing as player `id` with default settings.
    pub fn new(id: usize, opponent: P) -> Result<Self, EnvError> {
        Self::from_config(EnvConfig::default().with_player_id(id), opponent)
    }

    pub fn from_config(config: EnvConfig, opponent: P) -> Result<Self, EnvError> {
        let mut state = EnvState::new(config)?;
        let opponent_rng = state.rng.fork();
        Ok(Self {
            state,
            opponent,
            opponent_rng,
        })
    }

    /// The opponent's side.
    pub fn opponent_player(&self) -> Player {
        self.state.player
    }

    /// The caller's side.
    pub fn agent_player(&self) -> Player {
        self.state.player.other()
    }

    pub fn opponent(&self) -> &P {
        &self.opponent
    }

    pub fn config(&self) -> &EnvConfig {
        &self.state.config
    }

    pub fn has_viewer(&self) -> bool {
        self.state.has_viewer()
    }

    /// Let the opponent move on the current board.
    ///
    /// A missing or illegal choice falls back to the first empty cell.
    /// Returns the cell played, or `None` if the board is full.
    fn opponent_move(&mut self) -> Result<Option<usize>, EnvError> {
        let me = self.state.player;
        let board = self.state.board_mut()?;
        let Some(&fallback) = board.legal_actions().first() else {
            return Ok(None);
        };

        let choice = self
            .opponent
            .select_action(&board.observation(), &mut self.opponent_rng);
        let action = match choice {
            Some(a) if board.is_empty(a) => a,
            other => {
                warn!(
                    policy = self.opponent.name(),
                    choice = ?other,
                    fallback,
                    "opponent chose an unavailable cell"
                );
                fallback
            }
        };

        // The chosen cell is empty, so this cannot fail on a consistent board.
        board.place(action, me)?;
        debug!(action, policy = self.opponent.name(), "opponent move");
        Ok(Some(action))
    }
}

impl OpponentEnv<QNetworkPolicy<Mlp>> {
    /// Opponent driven by the pre-trained `dqn_ttt{id}` model in `dir`.
    pub fn from_model_dir(id: usize, dir: impl AsRef<Path>) -> Result<Self, EnvError> {
        let model = Mlp::load_for_player(dir, id)?;
        Self::new(id, QNetworkPolicy::new(model))
    }
}

impl<P: Policy> Environment for OpponentEnv<P> {
    fn reset(&mut self) -> Observation {
        self.state.reset();
        if self.state.player == Player::Zero {
            if let Err(e) = self.opponent_move() {
                warn!(error = %e, "opponent could not open the game");
            }
        }
        self.state
            .board
            .map(|b| b.observation())
            .unwrap_or_else(|| Board::new().observation())
    }

    fn step(&mut self, action: usize) -> Result<StepResult, EnvError> {
        self.state.begin_step(action)?;
        let agent = self.agent_player();
        let board = self.state.board_mut()?;
        let turn = board.to_move();

        if !board.is_empty(action) {
            let observation = board.observation();
            let mut info = StepInfo::new(board.outcome());
            info.rejected = true;
            info.steps_beyond_done = self.state.finish_step(false);
            debug!(action, "occupied cell");
            return Ok(StepResult {
                observation,
                reward: self.state.config.rewards.invalid,
                done: false,
                info,
            });
        }

        board.place(action, turn)?;
        let mut outcome = board.outcome();
        let mut opponent_action = None;

        if !outcome.is_done() {
            opponent_action = self.opponent_move()?;
            outcome = self.state.board_mut()?.outcome();
        }

        let done = outcome.is_done();
        let reward = match outcome {
            // The agent's own move filled the board.
            Outcome::Draw if opponent_action.is_none() => {
                self.state.config.rewards.completed_draw
            }
            _ => self.state.reward_for(outcome, agent),
        };
        let observation = self.state.board_mut()?.observation();

        let mut info = StepInfo::new(outcome);
        info.opponent_action = opponent_action;
        info.steps_beyond_done = self.state.finish_step(done);
        debug!(action, ?opponent_action, reward, done, "step");

        Ok(StepResult {
            observation,
            reward,
            done,
            info,
        })
    }

    fn render(&mut self, mode: RenderMode) -> Option<RenderOutput> {
        self.state.render(mode)
    }

    fn close(&mut self) {
        self.state.close();
    }

    /// Reseeds the environment and re-derives the opponent's stream.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let seeds = self.state.seed(seed);
        self.opponent_rng = self.state.rng.fork();
        seeds
    }

    fn board(&self) -> Option<&Board> {
        self.state.board.as_ref()
    }

    fn rng_mut(&mut self) -> &mut EnvRng {
        &mut self.state.rng
    }
}
