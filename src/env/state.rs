//! Bookkeeping shared by both environments: board, RNG, viewer and the
//! past-the-end counter.

use tracing::warn;

use crate::core::{Board, EnvRng, Outcome, Player, BOARD_CELLS};
use crate::error::{ConfigError, EnvError};
use crate::render::{RenderMode, RenderOutput, Viewer};

use super::config::EnvConfig;

#[derive(Debug)]
pub(crate) struct EnvState {
    pub config: EnvConfig,
    pub player: Player,
    pub board: Option<Board>,
    pub rng: EnvRng,
    viewer: Option<Viewer>,
    done: bool,
    steps_beyond_done: Option<u32>,
}

impl EnvState {
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let player = config.player()?;
        let rng = match config.seed {
            Some(seed) => EnvRng::new(seed),
            None => EnvRng::from_entropy(),
        };
        Ok(Self {
            config,
            player,
            board: None,
            rng,
            viewer: None,
            done: false,
            steps_beyond_done: None,
        })
    }

    /// Close the viewer and start from an empty board.
    pub fn reset(&mut self) -> &mut Board {
        self.close();
        self.done = false;
        self.steps_beyond_done = None;
        self.board.insert(Board::new())
    }

    /// Validate `action` and note calls made after the episode ended.
    pub fn begin_step(&mut self, action: usize) -> Result<(), EnvError> {
        if action >= BOARD_CELLS {
            return Err(EnvError::InvalidAction {
                action,
                n: BOARD_CELLS,
            });
        }
        if self.board.is_none() {
            return Err(EnvError::NotReset);
        }
        if self.done {
            self.note_step_past_done();
        }
        Ok(())
    }

    /// Count a step taken after the episode finished. Only the first such
    /// step logs a warning; returns whether this call did.
    fn note_step_past_done(&mut self) -> bool {
        let n = self.steps_beyond_done.get_or_insert(0);
        let first = *n == 0;
        if first {
            warn!(
                "step() called after the episode finished; \
                 call reset() once done is true"
            );
        }
        *n += 1;
        first
    }

    /// Record whether the step ended the episode; returns the counter for
    /// `StepInfo`.
    pub fn finish_step(&mut self, done: bool) -> Option<u32> {
        if done && !self.done {
            self.done = true;
            self.steps_beyond_done = Some(0);
        }
        self.steps_beyond_done
    }

    pub fn board_mut(&mut self) -> Result<&mut Board, EnvError> {
        self.board.as_mut().ok_or(EnvError::NotReset)
    }

    /// Reward for a finished or ongoing game, seen by `perspective`.
    pub fn reward_for(&self, outcome: Outcome, perspective: Player) -> f32 {
        let r = &self.config.rewards;
        match outcome {
            Outcome::Win(p) if p == perspective => r.win,
            Outcome::Win(_) => r.loss,
            Outcome::Draw => r.draw,
            Outcome::InProgress => r.step,
        }
    }

    pub fn render(&mut self, mode: RenderMode) -> Option<RenderOutput> {
        let board = self.board?;
        match mode {
            RenderMode::Human => {
                println!("{}", board);
                None
            }
            RenderMode::Ansi => Some(RenderOutput::Text(board.to_string())),
            RenderMode::RgbArray => {
                let viewer = self
                    .viewer
                    .get_or_insert_with(|| Viewer::new(self.config.viewer.clone()));
                Some(RenderOutput::Frame(viewer.draw(&board)))
            }
        }
    }

    pub fn has_viewer(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn close(&mut self) {
        self.viewer = None;
    }

    pub fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        vec![self.rng.reseed(seed)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> EnvState {
        EnvState::new(EnvConfig::default().with_seed(1)).unwrap()
    }

    #[test]
    fn test_begin_step_requires_reset() {
        let mut s = state();
        assert!(matches!(s.begin_step(0), Err(EnvError::NotReset)));
        s.reset();
        assert!(s.begin_step(0).is_ok());
    }

    #[test]
    fn test_begin_step_rejects_out_of_range() {
        let mut s = state();
        s.reset();
        assert!(matches!(
            s.begin_step(9),
            Err(EnvError::InvalidAction { action: 9, n: 9 })
        ));
    }

    #[test]
    fn test_steps_beyond_done_counter() {
        let mut s = state();
        s.reset();
        assert_eq!(s.finish_step(false), None);
        assert_eq!(s.finish_step(true), Some(0));

        s.begin_step(0).unwrap();
        assert_eq!(s.finish_step(true), Some(1));
        s.begin_step(0).unwrap();
        assert_eq!(s.finish_step(true), Some(2));

        s.reset();
        assert_eq!(s.finish_step(false), None);
    }

    #[test]
    fn test_past_done_warning_only_once() {
        let mut s = state();
        s.reset();
        s.finish_step(true);

        assert!(s.note_step_past_done());
        assert!(!s.note_step_past_done());
        assert!(!s.note_step_past_done());
        assert_eq!(s.steps_beyond_done, Some(3));

        // A new episode warns again.
        s.reset();
        s.finish_step(true);
        assert!(s.note_step_past_done());
    }

    #[test]
    fn test_reward_for() {
        let s = state();
        assert_eq!(s.reward_for(Outcome::Win(Player::Zero), Player::Zero), 10.0);
        assert_eq!(s.reward_for(Outcome::Win(Player::One), Player::Zero), -10.0);
        assert_eq!(s.reward_for(Outcome::Draw, Player::Zero), -10.0);
        assert_eq!(s.reward_for(Outcome::InProgress, Player::Zero), 0.0);
    }

    #[test]
    fn test_viewer_lifecycle() {
        let mut s = state();
        assert!(s.render(RenderMode::RgbArray).is_none());
        assert!(!s.has_viewer());

        s.reset();
        assert!(s.render(RenderMode::RgbArray).is_some());
        assert!(s.has_viewer());

        s.close();
        assert!(!s.has_viewer());

        s.render(RenderMode::RgbArray);
        s.reset();
        assert!(!s.has_viewer());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(EnvState::new(EnvConfig::default().with_player_id(5)).is_err());
    }
}
