#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scoring system that tracks the current run, ramps the scroll speed and
//! remembers the best score.

mod store;

use flappy_core::{Command, Event, GameConfig, PipeIndex, BEST_SCORE_KEY};

pub use store::{MemoryScoreStore, ScoreStore, ScoreStoreError};

/// Difficulty parameters consumed by [`RunState`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    base_velocity: f32,
    scroll_speed_step: f32,
    speed_up_every: u32,
}

impl Tuning {
    /// Creates tuning from explicit values.
    ///
    /// `base_velocity` is signed (negative scrolls left); each ramp subtracts
    /// `scroll_speed_step` from it after every `speed_up_every` completed pairs.
    #[must_use]
    pub const fn new(base_velocity: f32, scroll_speed_step: f32, speed_up_every: u32) -> Self {
        Self {
            base_velocity,
            scroll_speed_step,
            speed_up_every,
        }
    }

    /// Extracts the difficulty parameters from a game configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.base_velocity(),
            config.scroll_speed_step,
            config.speed_up_every,
        )
    }

    /// Scroll velocity every run starts with.
    #[must_use]
    pub const fn base_velocity(&self) -> f32 {
        self.base_velocity
    }
}

/// Per-run score bookkeeping backed by an injected [`ScoreStore`].
#[derive(Debug)]
pub struct RunState<S> {
    store: S,
    tuning: Tuning,
    score: u32,
    best_score: u32,
    velocity: f32,
}

impl<S: ScoreStore> RunState<S> {
    /// Creates the run state, reading the best score from `store` once.
    ///
    /// A store that cannot be read is treated as holding no best score.
    pub fn new(store: S, tuning: Tuning) -> Self {
        let best_score = load_best(&store);
        Self {
            store,
            tuning,
            score: 0,
            best_score,
            velocity: tuning.base_velocity,
        }
    }

    /// Clears the score and velocity for a new run and re-reads the best score.
    pub fn begin_run(&mut self, velocity: f32) {
        self.score = 0;
        self.velocity = velocity;
        self.best_score = load_best(&self.store);
    }

    /// Records a pipe crossing.
    ///
    /// Only the upper (even-indexed) pipe of each pair scores, so every pair
    /// counts once. Returns the new scroll velocity when the crossing
    /// completed a ramp interval.
    pub fn on_pipe_passed(&mut self, index: PipeIndex) -> Option<f32> {
        if !index.is_even() {
            return None;
        }

        self.score = self.score.saturating_add(1);
        if self.tuning.speed_up_every == 0 || self.score % self.tuning.speed_up_every != 0 {
            return None;
        }

        self.velocity -= self.tuning.scroll_speed_step;
        tracing::debug!(
            score = self.score,
            velocity = self.velocity,
            "scroll speed increased"
        );
        Some(self.velocity)
    }

    /// Finalises a run, persisting `final_score` when it beats the best score.
    pub fn on_run_end(&mut self, final_score: u32) {
        if final_score <= self.best_score {
            tracing::info!(
                score = final_score,
                best = self.best_score,
                "run finished"
            );
            return;
        }

        self.best_score = final_score;
        tracing::info!(score = final_score, "new best score");
        if let Err(error) = self.store.set(BEST_SCORE_KEY, final_score) {
            tracing::warn!(%error, "failed to persist best score");
        }
    }

    /// Consumes world events and emits the commands they imply.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunStarted { velocity } => self.begin_run(*velocity),
                Event::PipePassed { index } => {
                    if let Some(velocity) = self.on_pipe_passed(*index) {
                        out.push(Command::SetScrollVelocity { velocity });
                    }
                }
                Event::RunEnded { .. } => self.on_run_end(self.score),
                _ => {}
            }
        }
    }

    /// Replaces the difficulty parameters used by subsequent runs.
    pub fn retune(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    /// Pairs passed during the current run.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Highest score known to the store, including the current session.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    /// Scroll velocity the current run should be using.
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }
}

fn load_best<S: ScoreStore>(store: &S) -> u32 {
    match store.get(BEST_SCORE_KEY) {
        Ok(best) => best.unwrap_or(0),
        Err(error) => {
            tracing::warn!(%error, "failed to read best score");
            0
        }
    }
}
