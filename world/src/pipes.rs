//! Procedural pipe field that spawns, scrolls and recycles obstacle pairs.

use std::{collections::VecDeque, time::Duration};

use flappy_core::{ConfigError, PairId, PipeIndex, PipeKind, PipeLayout, PipeSnapshot, SpawnRange};
use rand::Rng;

/// Single pipe record tracked by the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pipe {
    index: PipeIndex,
    x: f32,
    center_y: f32,
    passed: bool,
}

impl Pipe {
    /// Ordinal of the pipe within the run's spawn sequence.
    #[must_use]
    pub const fn index(&self) -> PipeIndex {
        self.index
    }

    /// Half of the pair the pipe represents.
    #[must_use]
    pub const fn kind(&self) -> PipeKind {
        self.index.kind()
    }

    /// Horizontal center in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical center in world units.
    #[must_use]
    pub const fn center_y(&self) -> f32 {
        self.center_y
    }

    /// Whether the avatar already crossed this pipe.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Captures an immutable snapshot for queries and rendering.
    #[must_use]
    pub const fn snapshot(&self) -> PipeSnapshot {
        PipeSnapshot {
            index: self.index,
            kind: self.index.kind(),
            x: self.x,
            center_y: self.center_y,
            passed: self.passed,
        }
    }
}

/// Notification that the avatar crossed a pipe for the first time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipePassed {
    /// Index of the pipe that was crossed.
    pub index: PipeIndex,
}

/// Record of a pair that left the screen and the pair spawned in its place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecycledPair {
    /// Pair removed from the left of the field.
    pub retired: PairId,
    /// Pair appended at the right of the field.
    pub spawned: PairId,
}

/// Rolling buffer of pipe pairs scrolling at a shared velocity.
///
/// Pipes are stored in spawn order, which is also left-to-right order because
/// every pipe moves with the same velocity. Halves of a pair are stored
/// adjacently, upper first. The field owns its random generator so that a
/// seeded generator reproduces the exact same layout.
#[derive(Debug)]
pub struct PipeField<R> {
    layout: PipeLayout,
    pipes: VecDeque<Pipe>,
    next_pair: u32,
    velocity: f32,
    rng: R,
}

impl<R: Rng> PipeField<R> {
    /// Creates a field filled with `layout.pipes_to_render` pairs.
    pub fn new(layout: PipeLayout, velocity: f32, rng: R) -> Result<Self, ConfigError> {
        let mut field = Self {
            layout,
            pipes: VecDeque::new(),
            next_pair: 0,
            velocity,
            rng,
        };
        field.reset(layout)?;
        Ok(field)
    }

    /// Clears the field and spawns pairs until the configured count is reached.
    ///
    /// The layout is validated first; on failure the field is left untouched.
    pub fn reset(&mut self, layout: PipeLayout) -> Result<(), ConfigError> {
        layout.validate()?;

        self.layout = layout;
        self.pipes.clear();
        self.next_pair = 0;
        let target = usize::try_from(layout.pipes_to_render).unwrap_or(usize::MAX);
        while self.pair_count() < target {
            let _ = self.spawn_pair();
        }
        Ok(())
    }

    /// Appends one pair to the right of the field.
    ///
    /// The pair is placed a freshly drawn horizontal distance after the
    /// rightmost pair, or after `initial_offset` when the field is empty. The
    /// upper pipe's center and the distance to the lower pipe's center are drawn
    /// independently.
    pub fn spawn_pair(&mut self) -> PairId {
        let anchor = self
            .pipes
            .back()
            .map_or(self.layout.initial_offset, |pipe| pipe.x);
        let x = anchor + draw(&mut self.rng, self.layout.horizontal_range);
        let upper_y = draw(&mut self.rng, self.layout.upper_offset_range);
        let lower_y = upper_y + draw(&mut self.rng, self.layout.vertical_gap_range);

        let pair = PairId::new(self.next_pair);
        self.next_pair = self.next_pair.saturating_add(1);

        self.pipes.push_back(Pipe {
            index: pair.upper(),
            x,
            center_y: upper_y,
            passed: false,
        });
        self.pipes.push_back(Pipe {
            index: pair.lower(),
            x,
            center_y: lower_y,
            passed: false,
        });
        pair
    }

    /// Moves every live pipe by the current velocity over `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let delta = self.velocity * dt.as_secs_f32();
        for pipe in &mut self.pipes {
            pipe.x += delta;
        }
    }

    /// Retires pairs that scrolled fully off the left edge and replaces each
    /// with exactly one new pair.
    ///
    /// A pipe is off screen once its right edge reaches zero. A pair is only
    /// retired when both of its halves are off screen, so a lone half waits
    /// for its sibling.
    pub fn recycle(&mut self) -> Vec<RecycledPair> {
        let half_width = self.layout.pipe_width * 0.5;
        let offscreen: Vec<PipeIndex> = self
            .pipes
            .iter()
            .filter(|pipe| pipe.x + half_width <= 0.0)
            .map(|pipe| pipe.index)
            .collect();

        let retired: Vec<PairId> = offscreen
            .iter()
            .filter(|index| index.is_even())
            .map(PipeIndex::pair)
            .filter(|pair| offscreen.contains(&pair.lower()))
            .collect();

        if retired.is_empty() {
            return Vec::new();
        }

        self.pipes.retain(|pipe| !retired.contains(&pipe.index.pair()));

        retired
            .into_iter()
            .map(|retired| {
                let spawned = self.spawn_pair();
                tracing::trace!(
                    retired = retired.get(),
                    spawned = spawned.get(),
                    "recycled pipe pair"
                );
                RecycledPair { retired, spawned }
            })
            .collect()
    }

    /// Marks every pipe left of `avatar_x` as passed, reporting each pipe the
    /// first time it is crossed.
    pub fn check_passage(&mut self, avatar_x: f32) -> Vec<PipePassed> {
        let mut passed = Vec::new();
        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x < avatar_x {
                pipe.passed = true;
                passed.push(PipePassed { index: pipe.index });
            }
        }
        passed
    }
}

impl<R> PipeField<R> {
    /// Iterator over the live pipes in left-to-right order.
    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    /// Captures snapshots of every live pipe in left-to-right order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<PipeSnapshot> {
        self.pipes.iter().map(Pipe::snapshot).collect()
    }

    /// Number of live pipes, counting both halves of every pair.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    /// Reports whether the field holds no pipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    /// Number of live pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pipes.len() / 2
    }

    /// Field-wide horizontal velocity applied to every pipe.
    #[must_use]
    pub const fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Replaces the field-wide horizontal velocity.
    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Layout the field was last reset with.
    #[must_use]
    pub const fn layout(&self) -> &PipeLayout {
        &self.layout
    }
}

fn draw<R: Rng>(rng: &mut R, range: SpawnRange) -> f32 {
    rng.gen_range(range.min..=range.max) as f32
}
