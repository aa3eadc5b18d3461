//! Player avatar physics and the geometry used for overlap checks.

use std::time::Duration;

use flappy_core::{BirdSnapshot, GameConfig};

/// Bird state integrated by the world every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Bird {
    x: f32,
    y: f32,
    velocity: f32,
    width: f32,
    height: f32,
}

impl Bird {
    /// Places a motionless bird at the configured column, halfway down the screen.
    pub(crate) fn spawn(config: &GameConfig) -> Self {
        Self {
            x: config.screen_width * config.bird_x_fraction,
            y: config.screen_height * 0.5,
            velocity: 0.0,
            width: config.bird_width,
            height: config.bird_height,
        }
    }

    pub(crate) fn x(&self) -> f32 {
        self.x
    }

    pub(crate) fn y(&self) -> f32 {
        self.y
    }

    /// Replaces the vertical velocity with the flap impulse.
    pub(crate) fn flap(&mut self, flap_velocity: f32) {
        self.velocity = flap_velocity;
    }

    /// Applies gravity, then moves the bird by its updated velocity.
    pub(crate) fn integrate(&mut self, gravity: f32, dt: Duration) {
        let seconds = dt.as_secs_f32();
        self.velocity += gravity * seconds;
        self.y += self.velocity * seconds;
    }

    pub(crate) fn bounds(&self) -> Aabb {
        Aabb::from_center(self.x, self.y, self.width, self.height)
    }

    pub(crate) fn snapshot(&self) -> BirdSnapshot {
        BirdSnapshot {
            x: self.x,
            y: self.y,
            velocity: self.velocity,
            width: self.width,
            height: self.height,
        }
    }

    #[cfg(test)]
    pub(crate) fn place_at(&mut self, y: f32) {
        self.y = y;
    }
}

/// Axis-aligned box expressed by its minimum and maximum corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Aabb {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Aabb {
    pub(crate) fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        let half_width = width * 0.5;
        let half_height = height * 0.5;
        Self {
            min_x: x - half_width,
            min_y: y - half_height,
            max_x: x + half_width,
            max_y: y + half_height,
        }
    }

    /// Reports whether the boxes share interior area; touching edges do not count.
    pub(crate) fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

/// Reports whether a vertical position lies outside the playable band.
///
/// Both edges are inclusive: a bird exactly at `0.0` or exactly at
/// `screen_height` is already out of bounds.
#[must_use]
pub fn is_out_of_bounds(y: f32, screen_height: f32) -> bool {
    y <= 0.0 || y >= screen_height
}
