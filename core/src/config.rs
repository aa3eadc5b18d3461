//! Tunable parameters for a game session and their validation rules.

use serde::Deserialize;
use thiserror::Error;

/// Inclusive integer range sampled when spawning pipes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct SpawnRange {
    /// Smallest value that may be drawn.
    pub min: i32,
    /// Largest value that may be drawn.
    pub max: i32,
}

impl SpawnRange {
    /// Creates a new inclusive range.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Reports whether `value` lies within the range.
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        self.min <= value && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Errors reported when a configuration cannot produce a playable game.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A sampling range has its bounds reversed.
    #[error("{name} range is empty: min {min} exceeds max {max}")]
    InvalidRange {
        /// Configuration field holding the range.
        name: &'static str,
        /// Lower bound provided.
        min: i32,
        /// Upper bound provided.
        max: i32,
    },
    /// The pipe field must hold at least one pair.
    #[error("pipes_to_render must be positive")]
    NonPositivePipeCount,
    /// The screen must have a positive area.
    #[error("screen dimensions must be positive (received {width}x{height})")]
    NonPositiveScreen {
        /// Width provided.
        width: f32,
        /// Height provided.
        height: f32,
    },
    /// A sprite dimension is zero, negative or not a number.
    #[error("{name} must be positive (received {value})")]
    NonPositiveDimension {
        /// Configuration field holding the dimension.
        name: &'static str,
        /// Value provided.
        value: f32,
    },
    /// The difficulty ramp cadence must be at least one pair.
    #[error("speed_up_every must be positive")]
    NonPositiveCadence,
    /// A magnitude that must not be negative was negative or not a number.
    #[error("{name} must not be negative (received {value})")]
    NegativeValue {
        /// Configuration field holding the magnitude.
        name: &'static str,
        /// Value provided.
        value: f32,
    },
    /// A coordinate is infinite or not a number.
    #[error("{name} must be finite (received {value})")]
    NonFinite {
        /// Configuration field holding the coordinate.
        name: &'static str,
        /// Value provided.
        value: f32,
    },
    /// Consecutive pairs could be drawn closer than one pipe width apart,
    /// which would overlap them or spawn them out of order.
    #[error("horizontal_range minimum {min} is narrower than pipe_width {pipe_width}")]
    OverlappingPairs {
        /// Lower bound of `horizontal_range`.
        min: i32,
        /// Width of a single pipe.
        pipe_width: f32,
    },
    /// A pair's pipes could overlap and leave no gap to fly through.
    #[error("vertical_gap_range minimum {min} does not exceed pipe_height {pipe_height}")]
    ClosedGap {
        /// Lower bound of `vertical_gap_range`.
        min: i32,
        /// Height of a single pipe.
        pipe_height: f32,
    },
    /// A fraction lies outside `0.0..=1.0`.
    #[error("{name} must lie within 0.0..=1.0 (received {value})")]
    FractionOutOfRange {
        /// Configuration field holding the fraction.
        name: &'static str,
        /// Value provided.
        value: f32,
    },
}

/// Complete set of tunables for a game session.
///
/// Every field has a default matching the classic layout of an 800x600
/// screen, so configuration files only need to list what they change.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Width of the play area in world units.
    pub screen_width: f32,
    /// Height of the play area in world units.
    pub screen_height: f32,
    /// Downward acceleration applied to the bird, in units per second squared.
    pub gravity: f32,
    /// Vertical velocity assigned to the bird on every flap; negative is upward.
    pub flap_velocity: f32,
    /// Horizontal position of the bird as a fraction of the screen width.
    pub bird_x_fraction: f32,
    /// Width of the bird's collision box.
    pub bird_width: f32,
    /// Height of the bird's collision box.
    pub bird_height: f32,
    /// Number of pipe pairs kept alive in the field.
    pub pipes_to_render: u32,
    /// Width of a single pipe.
    pub pipe_width: f32,
    /// Height of a single pipe.
    pub pipe_height: f32,
    /// Horizontal anchor used for the first pair when the field is empty.
    pub initial_offset: f32,
    /// Horizontal distance drawn between consecutive pairs.
    pub horizontal_range: SpawnRange,
    /// Vertical distance drawn between the centers of a pair's pipes.
    pub vertical_gap_range: SpawnRange,
    /// Vertical center drawn for each upper pipe.
    pub upper_offset_range: SpawnRange,
    /// Scroll speed magnitude at the start of a run.
    pub base_scroll_speed: f32,
    /// Speed added to the scroll magnitude whenever the difficulty ramps.
    pub scroll_speed_step: f32,
    /// Number of completed pairs between difficulty ramps.
    pub speed_up_every: u32,
    /// Seed of the generator that lays out the pipe field.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            gravity: 300.0,
            flap_velocity: -150.0,
            bird_x_fraction: 0.1,
            bird_width: 34.0,
            bird_height: 24.0,
            pipes_to_render: 10,
            pipe_width: 52.0,
            pipe_height: 400.0,
            initial_offset: 0.0,
            horizontal_range: SpawnRange::new(400, 600),
            vertical_gap_range: SpawnRange::new(550, 620),
            upper_offset_range: SpawnRange::new(-100, 100),
            base_scroll_speed: 200.0,
            scroll_speed_step: 20.0,
            speed_up_every: 5,
            seed: 0x5eed_f1a9_b12d_0001,
        }
    }
}

impl GameConfig {
    /// Checks that the configuration describes a playable game.
    ///
    /// Malformed values are rejected rather than clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.screen_width > 0.0 && self.screen_height > 0.0) {
            return Err(ConfigError::NonPositiveScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        positive("bird_width", self.bird_width)?;
        positive("bird_height", self.bird_height)?;
        non_negative("gravity", self.gravity)?;
        if !self.flap_velocity.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "flap_velocity",
                value: self.flap_velocity,
            });
        }
        non_negative("base_scroll_speed", self.base_scroll_speed)?;
        non_negative("scroll_speed_step", self.scroll_speed_step)?;
        if !(0.0..=1.0).contains(&self.bird_x_fraction) {
            return Err(ConfigError::FractionOutOfRange {
                name: "bird_x_fraction",
                value: self.bird_x_fraction,
            });
        }
        if self.speed_up_every == 0 {
            return Err(ConfigError::NonPositiveCadence);
        }
        self.pipe_layout().validate()
    }

    /// Extracts the parameters consumed by the pipe field.
    #[must_use]
    pub const fn pipe_layout(&self) -> PipeLayout {
        PipeLayout {
            pipes_to_render: self.pipes_to_render,
            pipe_width: self.pipe_width,
            pipe_height: self.pipe_height,
            initial_offset: self.initial_offset,
            horizontal_range: self.horizontal_range,
            vertical_gap_range: self.vertical_gap_range,
            upper_offset_range: self.upper_offset_range,
        }
    }

    /// Scroll velocity a run starts with; negative so pipes travel left.
    #[must_use]
    pub fn base_velocity(&self) -> f32 {
        -self.base_scroll_speed
    }
}

/// Subset of [`GameConfig`] that governs pipe spawning and recycling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeLayout {
    /// Number of pipe pairs kept alive in the field.
    pub pipes_to_render: u32,
    /// Width of a single pipe.
    pub pipe_width: f32,
    /// Height of a single pipe.
    pub pipe_height: f32,
    /// Horizontal anchor used for the first pair when the field is empty.
    pub initial_offset: f32,
    /// Horizontal distance drawn between consecutive pairs.
    pub horizontal_range: SpawnRange,
    /// Vertical distance drawn between the centers of a pair's pipes.
    pub vertical_gap_range: SpawnRange,
    /// Vertical center drawn for each upper pipe.
    pub upper_offset_range: SpawnRange,
}

impl PipeLayout {
    /// Checks that the layout can always spawn a valid pair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipes_to_render == 0 {
            return Err(ConfigError::NonPositivePipeCount);
        }
        positive("pipe_width", self.pipe_width)?;
        positive("pipe_height", self.pipe_height)?;
        if !self.initial_offset.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "initial_offset",
                value: self.initial_offset,
            });
        }
        self.horizontal_range.validate("horizontal_range")?;
        self.vertical_gap_range.validate("vertical_gap_range")?;
        self.upper_offset_range.validate("upper_offset_range")?;

        if (self.horizontal_range.min as f32) < self.pipe_width {
            return Err(ConfigError::OverlappingPairs {
                min: self.horizontal_range.min,
                pipe_width: self.pipe_width,
            });
        }
        // Centers closer than one pipe height put the lower pipe over the upper one.
        if (self.vertical_gap_range.min as f32) <= self.pipe_height {
            return Err(ConfigError::ClosedGap {
                min: self.vertical_gap_range.min,
                pipe_height: self.pipe_height,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDimension { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { name, value })
    }
}
