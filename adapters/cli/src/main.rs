#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Tank Combat session.

mod input;
mod level_files;
mod presenter;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tank_combat_game::{latest_action_channel, Game, GameConfig, RunOutcome, ScriptedInput};
use tracing::info;

use crate::{level_files::DirectoryLevelSource, presenter::TracingPresenter};

/// Grid-based tank combat against AI-controlled enemies.
#[derive(Debug, Parser)]
#[command(name = "tank-combat", version)]
struct Cli {
    /// Directory holding `level{n}.txt` layouts.
    #[arg(long, default_value = "levels")]
    levels: PathBuf,
    /// TOML file with session parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random choice; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Milliseconds between simulation ticks; overrides the config file.
    #[arg(long = "tick-ms", value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: Option<u64>,
    /// Run headless with one action per tick (`up`, `fire`, `.` for none, ...).
    #[arg(long)]
    script: Option<String>,
    /// Print the run summary as JSON instead of the final board.
    #[arg(long)]
    summary_json: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Entry point for the Tank Combat command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if config.seed.is_none() {
        let seed = rand::random::<u64>();
        info!(seed, "no seed configured, drew one from entropy");
        config.seed = Some(seed);
    }

    let levels = DirectoryLevelSource::new(&cli.levels);
    info!(levels = %levels.root().display(), "reading levels");

    let (outcome, frame) = match cli.script.as_deref() {
        Some(script) => {
            let actions = input::parse_script(script).context("invalid --script")?;
            let mut game = Game::new(
                config,
                ScriptedInput::new(actions),
                TracingPresenter::new(),
                levels,
            )
            .context("failed to start session")?;
            let outcome = game.run_to_end().context("session aborted")?;
            (outcome, game.presenter().frame())
        }
        None => {
            let (sender, receiver) = latest_action_channel();
            let _reader =
                input::spawn_stdin_reader(sender).context("failed to start stdin reader")?;
            let mut game = Game::new(config, receiver, TracingPresenter::new(), levels)
                .context("failed to start session")?;
            let outcome = game.run().context("session aborted")?;
            (outcome, game.presenter().frame())
        }
    };

    if cli.summary_json {
        let json = serde_json::to_string(&outcome).context("failed to encode run summary")?;
        println!("{json}");
    } else {
        println!("{frame}");
        println!("{}", summary_line(&outcome));
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse_config(contents: &str) -> Result<GameConfig> {
    toml::from_str(contents).context("failed to parse config toml contents")
}

fn summary_line(outcome: &RunOutcome) -> String {
    format!(
        "Level: {} | Health {} | {:?} after {} ticks",
        outcome.level, outcome.player_health, outcome.reason, outcome.ticks
    )
}
