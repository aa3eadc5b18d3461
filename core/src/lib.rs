#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Flappy engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams and respond
//! exclusively with new command batches.

mod config;

use std::time::Duration;

pub use config::{ConfigError, GameConfig, PipeLayout, SpawnRange};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Flappy Bird Clone";

/// Key under which the best score is persisted by score stores.
pub const BEST_SCORE_KEY: &str = "flappy.best_score";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the world configuration after validating it.
    ConfigureGame {
        /// Configuration the world should adopt for subsequent runs.
        config: GameConfig,
    },
    /// Resets the pipe field and the bird and begins a new run.
    StartRun,
    /// Requests that the bird flap upward on the current tick.
    Flap,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Overrides the field-wide horizontal scroll velocity.
    SetScrollVelocity {
        /// New velocity in world units per second; negative values scroll left.
        velocity: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a new configuration was accepted.
    GameConfigured,
    /// Reports that a configuration was rejected and the previous one kept.
    ConfigurationRejected {
        /// Validation failure describing the offending value.
        error: ConfigError,
    },
    /// Announces that a fresh run began.
    RunStarted {
        /// Scroll velocity the pipe field starts the run with.
        velocity: f32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the bird received an upward impulse.
    BirdFlapped,
    /// Reports that the bird crossed a pipe for the first time.
    PipePassed {
        /// Index of the pipe that was passed.
        index: PipeIndex,
    },
    /// Reports that a pair left the screen and was replaced by a new pair.
    PipePairRecycled {
        /// Pair removed from the field.
        retired: PairId,
        /// Pair appended at the right of the field.
        spawned: PairId,
    },
    /// Confirms that the field-wide scroll velocity changed.
    ScrollVelocityChanged {
        /// Velocity now applied to every live pipe.
        velocity: f32,
    },
    /// Announces that the active run terminated.
    RunEnded {
        /// Why the run ended.
        reason: RunEndReason,
    },
}

/// Reasons a run can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunEndReason {
    /// The bird overlapped a pipe.
    Collision {
        /// Pipe the bird hit.
        pipe: PipeIndex,
    },
    /// The bird touched or left the top or bottom edge of the screen.
    OutOfBounds,
}

/// Which half of a pipe pair a pipe represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipeKind {
    /// Pipe hanging from the top of the screen.
    Upper,
    /// Pipe rising from the bottom of the screen.
    Lower,
}

/// Ordinal of a single pipe within the spawn sequence of a run.
///
/// The upper half of the n-th spawned pair carries index `2n` and the lower
/// half `2n + 1`, so only even indices belong to upper pipes. Scoring relies
/// on this: a pair counts once, when its even-indexed pipe is passed.
///
/// Indices are twice as wide as [`PairId`] so every pair maps to both of its
/// pipes without overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipeIndex(u64);

impl PipeIndex {
    /// Creates a new pipe index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Pair this pipe belongs to.
    #[must_use]
    pub const fn pair(&self) -> PairId {
        // Indices are only minted from a PairId, so the quotient fits.
        PairId((self.0 / 2) as u32)
    }

    /// Half of the pair this pipe represents.
    #[must_use]
    pub const fn kind(&self) -> PipeKind {
        if self.0 % 2 == 0 {
            PipeKind::Upper
        } else {
            PipeKind::Lower
        }
    }

    /// Whether the index is even, i.e. the scoring half of its pair.
    #[must_use]
    pub const fn is_even(&self) -> bool {
        self.0 % 2 == 0
    }
}

/// Ordinal of a pipe pair within the spawn sequence of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairId(u32);

impl PairId {
    /// Creates a new pair identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the pair's upper pipe.
    #[must_use]
    pub const fn upper(&self) -> PipeIndex {
        PipeIndex(self.0 as u64 * 2)
    }

    /// Index of the pair's lower pipe.
    #[must_use]
    pub const fn lower(&self) -> PipeIndex {
        PipeIndex(self.0 as u64 * 2 + 1)
    }
}

/// Immutable representation of a single pipe used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeSnapshot {
    /// Ordinal of the pipe within the run's spawn sequence.
    pub index: PipeIndex,
    /// Half of the pair the pipe represents.
    pub kind: PipeKind,
    /// Horizontal center of the pipe in world units.
    pub x: f32,
    /// Vertical center of the pipe in world units.
    pub center_y: f32,
    /// Whether the bird already crossed the pipe.
    pub passed: bool,
}

/// Immutable representation of the bird used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdSnapshot {
    /// Horizontal center of the bird in world units.
    pub x: f32,
    /// Vertical center of the bird in world units; zero is the top edge.
    pub y: f32,
    /// Vertical velocity in world units per second; negative is upward.
    pub velocity: f32,
    /// Width of the bird's collision box.
    pub width: f32,
    /// Height of the bird's collision box.
    pub height: f32,
}
