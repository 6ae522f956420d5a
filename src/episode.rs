//! Episode rollouts and evaluation.
//!
//! Drives any `Environment` with a `Policy` as the agent: reset, then step
//! until `done` or the step limit, optionally rendering each frame.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::Observation;
use crate::env::Environment;
use crate::error::EnvError;
use crate::policy::Policy;
use crate::render::{RenderMode, RenderOutput};

/// Step limit used by `run_episode` callers that do not pick one.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// One recorded step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub action: usize,
    pub reward: f32,
    pub next_observation: Observation,
    pub done: bool,
}

/// Summary of a finished rollout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_reward: f32,
    /// Reward of the last step.
    pub final_reward: f32,
    /// The episode ended (rather than hitting the step limit or running
    /// out of agent moves).
    pub done: bool,
    /// Occupied-cell moves the agent attempted.
    pub invalid_moves: usize,
    pub transitions: Vec<Transition>,
}

/// Rollout options.
#[derive(Clone, Debug)]
pub struct EpisodeOptions {
    pub max_steps: usize,
    /// Render after reset and after every step.
    pub render: Option<RenderMode>,
}

impl Default for EpisodeOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            render: None,
        }
    }
}

impl EpisodeOptions {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_render(mut self, mode: RenderMode) -> Self {
        self.render = Some(mode);
        self
    }
}

/// Play one episode with `agent` choosing every action.
///
/// Rendered outputs (for non-human modes) are passed to `on_render`.
pub fn run_episode<E, P, F>(
    env: &mut E,
    agent: &mut P,
    options: &EpisodeOptions,
    mut on_render: F,
) -> Result<EpisodeSummary, EnvError>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
    F: FnMut(RenderOutput),
{
    let mut summary = EpisodeSummary::default();
    let mut observation = env.reset();
    render_into(env, options, &mut on_render);

    for _ in 0..options.max_steps {
        let Some(action) = agent.select_action(&observation, env.rng_mut()) else {
            debug!("agent has no move");
            break;
        };

        let result = env.step(action)?;
        debug!(action, reward = result.reward, done = result.done, "episode step");
        render_into(env, options, &mut on_render);

        summary.steps += 1;
        summary.total_reward += result.reward;
        summary.final_reward = result.reward;
        if result.info.rejected {
            summary.invalid_moves += 1;
        }
        summary.transitions.push(Transition {
            observation,
            action,
            reward: result.reward,
            next_observation: result.observation,
            done: result.done,
        });

        observation = result.observation;
        if result.done {
            summary.done = true;
            break;
        }
    }

    Ok(summary)
}

fn render_into<E, F>(env: &mut E, options: &EpisodeOptions, on_render: &mut F)
where
    E: Environment + ?Sized,
    F: FnMut(RenderOutput),
{
    if let Some(mode) = options.render {
        if let Some(output) = env.render(mode) {
            on_render(output);
        }
    }
}

/// Aggregate results over many episodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub episodes: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Episodes cut off by the step limit.
    pub unfinished: usize,
    pub invalid_moves: usize,
    pub mean_reward: f32,
}

impl EvaluationStats {
    /// Fraction of episodes won.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins as f64 / self.episodes as f64
        }
    }
}

/// Run `episodes` rollouts and classify each by its final step.
///
/// `agent` is the side rewarded by the environment: a finished episode
/// whose outcome has a winner counts as a win when the final reward is
/// positive, otherwise as a loss.
pub fn evaluate<E, P>(
    env: &mut E,
    agent: &mut P,
    episodes: usize,
    seed: Option<u64>,
) -> Result<EvaluationStats, EnvError>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
{
    if seed.is_some() {
        env.seed(seed);
    }

    // A full game never needs more than 9 legal moves; leave room for
    // rejected ones.
    let options = EpisodeOptions::default().with_max_steps(64);
    let mut stats = EvaluationStats {
        episodes,
        ..EvaluationStats::default()
    };
    let mut total = 0.0f32;

    for _ in 0..episodes {
        let summary = run_episode(env, agent, &options, |_| {})?;
        total += summary.total_reward;
        stats.invalid_moves += summary.invalid_moves;

        let outcome = env.board().map(|b| b.outcome());
        match (summary.done, outcome.and_then(|o| o.winner())) {
            (false, _) => stats.unfinished += 1,
            (true, None) => stats.draws += 1,
            (true, Some(_)) if summary.final_reward > 0.0 => stats.wins += 1,
            (true, Some(_)) => stats.losses += 1,
        }
    }

    if episodes > 0 {
        stats.mean_reward = total / episodes as f32;
    }
    info!(
        episodes,
        wins = stats.wins,
        losses = stats.losses,
        draws = stats.draws,
        "evaluation finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EnvRng;
    use crate::env::{EnvConfig, OpponentEnv, TicTacToeEnv};
    use crate::nn::FixedQ;
    use crate::policy::{MinimaxPolicy, QNetworkPolicy, RandomPolicy};

    /// Agent that replays a fixed list of moves.
    struct Scripted(Vec<usize>);

    impl Policy for Scripted {
        fn select_action(&mut self, _obs: &Observation, _rng: &mut EnvRng) -> Option<usize> {
            if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_run_episode_to_win() {
        let mut env = TicTacToeEnv::from_config(EnvConfig::default().with_seed(1)).unwrap();
        let mut agent = Scripted(vec![0, 3, 1, 4, 2]);

        let summary = run_episode(&mut env, &mut agent, &EpisodeOptions::default(), |_| {}).unwrap();
        assert!(summary.done);
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.final_reward, 10.0);
        assert_eq!(summary.total_reward, 10.0);
        assert_eq!(summary.transitions.len(), 5);
        assert_eq!(summary.transitions[0].observation, [1; 9]);
        assert!(summary.transitions[4].done);
    }

    #[test]
    fn test_run_episode_respects_max_steps() {
        let mut env = TicTacToeEnv::from_config(EnvConfig::default().with_seed(1)).unwrap();
        let mut agent = Scripted(vec![0, 0, 0, 0]);
        let options = EpisodeOptions::default().with_max_steps(3);

        let summary = run_episode(&mut env, &mut agent, &options, |_| {}).unwrap();
        assert!(!summary.done);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.invalid_moves, 2);
        assert_eq!(summary.total_reward, -2.0);
    }

    #[test]
    fn test_run_episode_stops_when_agent_has_no_move() {
        let mut env = TicTacToeEnv::from_config(EnvConfig::default().with_seed(1)).unwrap();
        let mut agent = Scripted(vec![4]);
        let summary = run_episode(&mut env, &mut agent, &EpisodeOptions::default(), |_| {}).unwrap();
        assert_eq!(summary.steps, 1);
        assert!(!summary.done);
    }

    #[test]
    fn test_run_episode_renders_each_step() {
        let mut env = TicTacToeEnv::from_config(EnvConfig::default().with_seed(1)).unwrap();
        let mut agent = Scripted(vec![0, 3, 1, 4, 2]);
        let options = EpisodeOptions::default().with_render(RenderMode::Ansi);

        let mut frames = Vec::new();
        run_episode(&mut env, &mut agent, &options, |out| frames.push(out)).unwrap();
        // reset + 5 steps
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[0].as_text(), Some(". . .\n. . .\n. . .\n"));
    }

    #[test]
    fn test_evaluate_random_against_minimax() {
        let config = EnvConfig::default().with_player_id(1).with_seed(5);
        let mut env = OpponentEnv::from_config(config, MinimaxPolicy::new()).unwrap();
        let mut agent = RandomPolicy;

        let stats = evaluate(&mut env, &mut agent, 30, Some(11)).unwrap();
        assert_eq!(stats.episodes, 30);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.wins + stats.losses + stats.draws + stats.unfinished, 30);
        assert_eq!(stats.unfinished, 0);
        assert_eq!(stats.invalid_moves, 0);
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn test_evaluate_minimax_beats_first_cell_opponent() {
        // Opponent always takes the lowest free cell.
        let opponent = QNetworkPolicy::new(FixedQ::preferring(&[0, 1, 2, 3, 4, 5, 6, 7, 8]));
        let config = EnvConfig::default().with_player_id(1).with_seed(5);
        let mut env = OpponentEnv::from_config(config, opponent).unwrap();
        let mut agent = MinimaxPolicy::new();

        let stats = evaluate(&mut env, &mut agent, 3, None).unwrap();
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.mean_reward, 10.0);
    }

    #[test]
    fn test_evaluate_is_reproducible() {
        let make = || {
            let config = EnvConfig::default().with_player_id(1).with_seed(5);
            OpponentEnv::from_config(config, RandomPolicy).unwrap()
        };
        let mut a = make();
        let mut b = make();
        let sa = evaluate(&mut a, &mut RandomPolicy, 20, Some(99)).unwrap();
        let sb = evaluate(&mut b, &mut RandomPolicy, 20, Some(99)).unwrap();
        assert_eq!(sa, sb);
    }
}
