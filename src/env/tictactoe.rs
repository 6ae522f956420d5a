//! Two-player environment: the caller supplies both players' moves.

use tracing::debug;

use crate::core::{Board, EnvRng, Observation, Player};
use crate::error::{ConfigError, EnvError};
use crate::render::{RenderMode, RenderOutput};

use super::config::EnvConfig;
use super::state::EnvState;
use super::{Environment, StepInfo, StepResult};

/// Tic-tac-toe where successive `step` calls alternate between players.
///
/// The mover is derived from the board (player 0 when an odd number of
/// cells is empty). Rewards are computed for the configured player id.
#[derive(Debug)]
pub struct TicTacToeEnv {
    state: EnvState,
}

impl TicTacToeEnv {
    /// Environment rewarding player `id` with default settings.
    pub fn new(id: usize) -> Result<Self, ConfigError> {
        Self::from_config(EnvConfig::default().with_player_id(id))
    }

    pub fn from_config(config: EnvConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            state: EnvState::new(config)?,
        })
    }

    /// The rewarded player.
    pub fn player(&self) -> Player {
        self.state.player
    }

    pub fn config(&self) -> &EnvConfig {
        &self.state.config
    }

    /// Whether a viewer is currently open.
    pub fn has_viewer(&self) -> bool {
        self.state.has_viewer()
    }
}

impl Environment for TicTacToeEnv {
    fn reset(&mut self) -> Observation {
        self.state.reset().observation()
    }

    fn step(&mut self, action: usize) -> Result<StepResult, EnvError> {
        self.state.begin_step(action)?;
        let perspective = self.state.player;
        let board = self.state.board_mut()?;
        let turn = board.to_move();

        if !board.is_empty(action) {
            let observation = board.observation();
            let outcome = board.outcome();
            let mut info = StepInfo::new(outcome);
            info.rejected = true;
            info.steps_beyond_done = self.state.finish_step(false);
            debug!(action, %turn, "occupied cell");
            return Ok(StepResult {
                observation,
                reward: self.state.config.rewards.invalid,
                done: false,
                info,
            });
        }

        board.place(action, turn)?;
        let observation = board.observation();
        let outcome = board.outcome();
        let done = outcome.is_done();
        let reward = self.state.reward_for(outcome, perspective);

        let mut info = StepInfo::new(outcome);
        info.steps_beyond_done = self.state.finish_step(done);
        debug!(action, %turn, reward, done, "step");

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

    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        self.state.seed(seed)
    }

    fn board(&self) -> Option<&Board> {
        self.state.board.as_ref()
    }

    fn rng_mut(&mut self) -> &mut EnvRng {
        &mut self.state.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Outcome;

    fn env(id: usize) -> TicTacToeEnv {
        TicTacToeEnv::from_config(EnvConfig::default().with_player_id(id).with_seed(42)).unwrap()
    }

    fn play(env: &mut TicTacToeEnv, actions: &[usize]) -> StepResult {
        let mut last = None;
        for &a in actions {
            last = Some(env.step(a).unwrap());
        }
        last.unwrap()
    }

    #[test]
    fn test_reset_returns_all_empty() {
        let mut env = env(0);
        assert_eq!(env.reset(), [1; 9]);
        assert_eq!(env.board(), Some(&Board::new()));
    }

    #[test]
    fn test_step_before_reset() {
        let mut env = env(0);
        assert!(matches!(env.step(0), Err(EnvError::NotReset)));
    }

    #[test]
    fn test_step_out_of_range() {
        let mut env = env(0);
        env.reset();
        assert!(matches!(env.step(9), Err(EnvError::InvalidAction { .. })));
    }

    #[test]
    fn test_players_alternate() {
        let mut env = env(0);
        env.reset();
        let r = env.step(0).unwrap();
        assert_eq!(r.observation[0], 2);
        let r = env.step(1).unwrap();
        assert_eq!(r.observation[1], 0);
    }

    #[test]
    fn test_occupied_cell_penalised_without_change() {
        let mut env = env(0);
        env.reset();
        env.step(4).unwrap();
        let before = *env.board().unwrap();

        let r = env.step(4).unwrap();
        assert_eq!(r.reward, -1.0);
        assert!(!r.done);
        assert!(r.info.rejected);
        assert_eq!(env.board(), Some(&before));
        // Still player 1's turn.
        assert_eq!(env.board().unwrap().to_move(), Player::One);
    }

    #[test]
    fn test_player_zero_win_rewarded() {
        let mut env = env(0);
        env.reset();
        // X: 0, 1, 2   O: 3, 4
        let r = play(&mut env, &[0, 3, 1, 4, 2]);
        assert!(r.done);
        assert_eq!(r.reward, 10.0);
        assert_eq!(r.info.winner(), Some(Player::Zero));
        assert_eq!(r.info.steps_beyond_done, Some(0));
    }

    #[test]
    fn test_win_from_other_perspective_is_loss() {
        let mut env = env(1);
        env.reset();
        let r = play(&mut env, &[0, 3, 1, 4, 2]);
        assert!(r.done);
        assert_eq!(r.reward, -10.0);
    }

    #[test]
    fn test_draw_scores_draw_reward() {
        let mut env = env(0);
        env.reset();
        // X O X / X O O / O X X
        let r = play(&mut env, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert!(r.done);
        assert_eq!(r.info.outcome, Outcome::Draw);
        assert_eq!(r.reward, -10.0);
    }

    #[test]
    fn test_intermediate_reward_zero() {
        let mut env = env(0);
        env.reset();
        let r = env.step(0).unwrap();
        assert_eq!(r.reward, 0.0);
        assert!(!r.done);
        assert_eq!(r.info.steps_beyond_done, None);
    }

    #[test]
    fn test_steps_after_done_are_counted() {
        let mut env = env(0);
        env.reset();
        play(&mut env, &[0, 3, 1, 4, 2]);
        let r = env.step(8).unwrap();
        assert_eq!(r.info.steps_beyond_done, Some(1));
        assert!(r.done);
    }

    #[test]
    fn test_reset_clears_episode() {
        let mut env = env(0);
        env.reset();
        play(&mut env, &[0, 3, 1, 4, 2]);
        assert_eq!(env.reset(), [1; 9]);
        let r = env.step(0).unwrap();
        assert_eq!(r.info.steps_beyond_done, None);
    }

    #[test]
    fn test_render_modes() {
        let mut env = env(0);
        assert!(env.render(RenderMode::Ansi).is_none());

        env.reset();
        env.step(0).unwrap();
        let text = env.render(RenderMode::Ansi).unwrap();
        assert_eq!(text.as_text(), Some("X . .\n. . .\n. . .\n"));

        let frame = env.render(RenderMode::RgbArray).unwrap().into_frame().unwrap();
        assert_eq!(frame.shape(), [400, 600, 3]);
        assert!(env.has_viewer());

        env.close();
        assert!(!env.has_viewer());
    }

    #[test]
    fn test_seed_reports_seed() {
        let mut env = env(0);
        assert_eq!(env.seed(Some(5)), vec![5]);
        assert_eq!(env.seed(None).len(), 1);
    }

    #[test]
    fn test_spaces() {
        let env = env(0);
        assert_eq!(env.action_space().n, 9);
        assert_eq!(env.observation_space().nvec, vec![3; 9]);
    }
}
