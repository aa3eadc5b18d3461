#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Flappy experience.

mod config_file;
mod score_file;
mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use flappy_rendering::{FrameInput, Presentation, RenderingBackend, ScenePhase};
use flappy_rendering_macroquad::MacroquadBackend;
use flappy_system_scoring::ScoreStore;
use flappy_world::query;
use tracing_subscriber::EnvFilter;

use self::{config_file::load_config, score_file::FileScoreStore, session::Session};

/// Command-line arguments accepted by the `flappy` binary.
#[derive(Debug, Parser)]
#[command(name = "flappy", version, about = "A Flappy Bird clone")]
struct Args {
    /// TOML file overriding the default game configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for the pipe generator; overrides the configuration file.
    #[arg(long)]
    seed: Option<u64>,
    /// File holding the best score; defaults to `~/.flappy/scores.txt`.
    #[arg(long, value_name = "PATH")]
    score_file: Option<PathBuf>,
    /// Runs the simulation without a window and prints a summary.
    #[arg(long)]
    headless: bool,
    /// Maximum number of frames simulated in headless mode.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated frame length in milliseconds for headless mode.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Flap every N frames in headless mode; 0 never flaps.
    #[arg(long, default_value_t = 0)]
    flap_every: u32,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Draws the frame rate in the corner of the window.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Flappy command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.seed)?;
    let store = match &args.score_file {
        Some(path) => FileScoreStore::new(path),
        None => FileScoreStore::in_home_directory().context("failed to locate score file")?,
    };
    tracing::debug!(path = %store.path().display(), "using score file");

    let session = Session::new(&config, store)?;
    if args.headless {
        run_headless(session, &args)
    } else {
        run_windowed(session, &args)
    }
}

fn run_windowed(mut session: Session<FileScoreStore>, args: &Args) -> Result<()> {
    let scene = session.scene()?;
    let title = scene.banner.clone();
    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps);

    backend.run(
        Presentation::new(title, session::SKY_COLOR, scene),
        move |dt, input, scene| {
            session.frame(dt, input);
            session.populate_scene(scene);
        },
    )
}

/// Plays one run with a scripted flap cadence and reports the outcome.
fn run_headless<S: ScoreStore>(mut session: Session<S>, args: &Args) -> Result<()> {
    let dt = Duration::from_millis(args.tick_ms);
    session.frame(
        Duration::ZERO,
        FrameInput {
            flap: false,
            confirm: true,
        },
    );

    for frame in 0..args.ticks {
        if !matches!(session.phase(), ScenePhase::Playing) {
            break;
        }
        let flap = args.flap_every > 0 && frame % args.flap_every == 0;
        session.frame(
            dt,
            FrameInput {
                flap,
                confirm: false,
            },
        );
    }

    let ticks = query::tick_index(session.world());
    let ended = matches!(session.phase(), ScenePhase::GameOver { .. });
    tracing::info!(ticks, ended, "headless session finished");
    println!(
        "score={} best={} ticks={ticks} ended={ended}",
        session.score(),
        session.best_score()
    );
    Ok(())
}
