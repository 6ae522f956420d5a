//! ttt-demo: play episodes against an opponent and print the results.
//!
//! The agent side picks uniformly among empty cells; the opponent is a
//! random player, a perfect minimax player, or a pre-trained DQN model.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tictactoe_gym::episode::{run_episode, EpisodeOptions};
use tictactoe_gym::nn::Mlp;
use tictactoe_gym::policy::{MinimaxPolicy, Policy, QNetworkPolicy, RandomPolicy};
use tictactoe_gym::{EnvConfig, Environment, OpponentEnv, RenderMode, RenderOutput};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Opponent {
    Random,
    Minimax,
    Model,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Render {
    None,
    Ansi,
    Human,
}

#[derive(Parser)]
#[command(name = "ttt-demo")]
#[command(version, about = "Play tic-tac-toe episodes against an opponent policy", long_about = None)]
struct Cli {
    /// Number of episodes to play
    #[arg(long, default_value_t = 20)]
    episodes: usize,

    /// Opponent policy
    #[arg(long, value_enum, default_value_t = Opponent::Model)]
    opponent: Opponent,

    /// Directory containing dqn_ttt{id}.json / .bin
    #[arg(long, default_value = ".")]
    model_dir: PathBuf,

    /// Side the opponent plays (0 moves first) [default: 0]
    #[arg(long)]
    player_id: Option<usize>,

    /// Seed for the environment RNG
    #[arg(long)]
    seed: Option<u64>,

    /// JSON environment config; flags above override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to show each step
    #[arg(long, value_enum, default_value_t = Render::None)]
    render: Render,

    /// Pause between rendered frames, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Maximum steps per episode
    #[arg(long, default_value_t = 10)]
    max_steps: usize,
}

fn opponent_policy(cli: &Cli, player_id: usize) -> Result<Box<dyn Policy>> {
    Ok(match cli.opponent {
        Opponent::Random => Box::new(RandomPolicy),
        Opponent::Minimax => Box::new(MinimaxPolicy::new()),
        Opponent::Model => {
            let mlp = Mlp::load_for_player(&cli.model_dir, player_id)
                .with_context(|| format!("loading model from {}", cli.model_dir.display()))?;
            Box::new(QNetworkPolicy::new(mlp))
        }
    })
}

/// The config file (or defaults) with command-line overrides applied.
fn env_config(cli: &Cli) -> Result<EnvConfig> {
    let mut config = match &cli.config {
        Some(path) => EnvConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EnvConfig::default(),
    };
    if let Some(id) = cli.player_id {
        config.player_id = id;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = env_config(&cli)?;
    let opponent = opponent_policy(&cli, config.player_id)?;
    let mut env = OpponentEnv::from_config(config, opponent)?;
    let mut agent = RandomPolicy;

    let mut options = EpisodeOptions::default().with_max_steps(cli.max_steps);
    options.render = match cli.render {
        Render::None => None,
        Render::Ansi => Some(RenderMode::Ansi),
        Render::Human => Some(RenderMode::Human),
    };
    let delay = Duration::from_millis(cli.delay_ms);

    let mut total = 0.0f32;
    for episode in 0..cli.episodes {
        let summary = run_episode(&mut env, &mut agent, &options, |out| {
            if let RenderOutput::Text(text) = out {
                println!("{}", text);
            }
            thread::sleep(delay);
        })?;
        for t in &summary.transitions {
            info!(action = t.action, reward = t.reward, done = t.done, "step");
        }
        if summary.done {
            info!(episode, steps = summary.steps, reward = summary.final_reward, "episode finished");
        } else {
            info!(episode, steps = summary.steps, "episode cut off");
        }
        total += summary.total_reward;
    }

    env.close();
    if cli.episodes > 0 {
        info!(mean_reward = total / cli.episodes as f32, "done");
    }
    Ok(())
}
