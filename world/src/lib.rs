#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Flappy.

mod bird;
mod pipes;

use std::time::Duration;

use flappy_core::{
    Command, ConfigError, Event, GameConfig, PipeIndex, RunEndReason, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use self::bird::{Aabb, Bird};

pub use self::bird::is_out_of_bounds;
pub use self::pipes::{Pipe, PipeField, PipePassed, RecycledPair};

/// Represents the authoritative Flappy world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    field: PipeField<ChaCha8Rng>,
    bird: Bird,
    running: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world laid out from the provided configuration.
    ///
    /// The configuration is validated up front; the pipe field is seeded from
    /// `config.seed` so identical configurations produce identical layouts.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let field = seeded_field(&config)?;
        let bird = Bird::spawn(&config);
        Ok(Self {
            banner: WELCOME_BANNER,
            config,
            field,
            bird,
            running: false,
            tick_index: 0,
        })
    }

    fn configure(&mut self, config: GameConfig, out_events: &mut Vec<Event>) {
        let field = match config.validate().and_then(|()| seeded_field(&config)) {
            Ok(field) => field,
            Err(error) => {
                tracing::warn!(%error, "rejected game configuration");
                out_events.push(Event::ConfigurationRejected { error });
                return;
            }
        };

        self.bird = Bird::spawn(&config);
        self.field = field;
        self.config = config;
        self.running = false;
        out_events.push(Event::GameConfigured);
    }

    fn start_run(&mut self, out_events: &mut Vec<Event>) {
        if let Err(error) = self.field.reset(self.config.pipe_layout()) {
            out_events.push(Event::ConfigurationRejected { error });
            return;
        }

        let velocity = self.config.base_velocity();
        self.field.set_velocity(velocity);
        self.bird = Bird::spawn(&self.config);
        self.running = true;
        self.tick_index = 0;
        tracing::info!(velocity, pairs = self.field.pair_count(), "run started");
        out_events.push(Event::RunStarted { velocity });
    }

    fn step(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        self.bird.integrate(self.config.gravity, dt);
        self.field.advance(dt);

        for PipePassed { index } in self.field.check_passage(self.bird.x()) {
            out_events.push(Event::PipePassed { index });
        }

        for RecycledPair { retired, spawned } in self.field.recycle() {
            out_events.push(Event::PipePairRecycled { retired, spawned });
        }

        if let Some(pipe) = self.colliding_pipe() {
            self.end_run(RunEndReason::Collision { pipe }, out_events);
        } else if is_out_of_bounds(self.bird.y(), self.config.screen_height) {
            self.end_run(RunEndReason::OutOfBounds, out_events);
        }
    }

    fn end_run(&mut self, reason: RunEndReason, out_events: &mut Vec<Event>) {
        self.running = false;
        tracing::info!(?reason, ticks = self.tick_index, "run ended");
        out_events.push(Event::RunEnded { reason });
    }

    fn colliding_pipe(&self) -> Option<PipeIndex> {
        let bird = self.bird.bounds();
        let layout = self.field.layout();
        self.field
            .pipes()
            .find(|pipe| {
                Aabb::from_center(
                    pipe.x(),
                    pipe.center_y(),
                    layout.pipe_width,
                    layout.pipe_height,
                )
                .overlaps(&bird)
            })
            .map(Pipe::index)
    }
}

fn seeded_field(config: &GameConfig) -> Result<PipeField<ChaCha8Rng>, ConfigError> {
    PipeField::new(
        config.pipe_layout(),
        config.base_velocity(),
        ChaCha8Rng::seed_from_u64(config.seed),
    )
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGame { config } => world.configure(config, out_events),
        Command::StartRun => world.start_run(out_events),
        Command::Flap => {
            if world.running {
                world.bird.flap(world.config.flap_velocity);
                out_events.push(Event::BirdFlapped);
            }
        }
        Command::Tick { dt } => {
            if world.running {
                world.step(dt, out_events);
            }
        }
        Command::SetScrollVelocity { velocity } => {
            world.field.set_velocity(velocity);
            tracing::debug!(velocity, "scroll velocity changed");
            out_events.push(Event::ScrollVelocityChanged { velocity });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use flappy_core::{BirdSnapshot, GameConfig, PipeSnapshot};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the active configuration.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Captures the bird's current state.
    #[must_use]
    pub fn bird(world: &World) -> BirdSnapshot {
        world.bird.snapshot()
    }

    /// Captures every live pipe in left-to-right order.
    #[must_use]
    pub fn pipes(world: &World) -> Vec<PipeSnapshot> {
        world.field.snapshots()
    }

    /// Field-wide horizontal scroll velocity.
    #[must_use]
    pub fn scroll_velocity(world: &World) -> f32 {
        world.field.velocity()
    }

    /// Reports whether a run is in progress.
    #[must_use]
    pub fn is_running(world: &World) -> bool {
        world.running
    }

    /// Number of ticks simulated since the current run started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::{PairId, SpawnRange};

    fn started_world(config: GameConfig) -> (World, Vec<Event>) {
        let mut world = World::new(config).expect("valid configuration");
        let mut events = Vec::new();
        apply(&mut world, Command::StartRun, &mut events);
        (world, events)
    }

    #[test]
    fn new_world_rejects_invalid_configuration() {
        let config = GameConfig {
            pipes_to_render: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            World::new(config).err(),
            Some(ConfigError::NonPositivePipeCount)
        );
    }

    #[test]
    fn start_run_resets_field_and_reports_base_velocity() {
        let (world, events) = started_world(GameConfig::default());

        assert_eq!(events, vec![Event::RunStarted { velocity: -200.0 }]);
        assert!(query::is_running(&world));
        assert_eq!(query::pipes(&world).len(), 20);
        assert_eq!(query::scroll_velocity(&world), -200.0);
    }

    #[test]
    fn ticks_are_ignored_before_a_run_starts() {
        let mut world = World::new(GameConfig::default()).expect("valid configuration");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(&mut world, Command::Flap, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn flap_sets_configured_velocity() {
        let (mut world, _) = started_world(GameConfig::default());
        let mut events = Vec::new();
        apply(&mut world, Command::Flap, &mut events);

        assert_eq!(events, vec![Event::BirdFlapped]);
        assert_eq!(query::bird(&world).velocity, -150.0);
    }

    #[test]
    fn bird_at_top_edge_ends_run() {
        let (mut world, _) = started_world(GameConfig::default());
        world.bird.place_at(0.0);

        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);

        assert_eq!(
            events.last(),
            Some(&Event::RunEnded {
                reason: RunEndReason::OutOfBounds
            })
        );
        assert!(!query::is_running(&world));
    }

    #[test]
    fn bird_at_bottom_edge_ends_run() {
        let (mut world, _) = started_world(GameConfig::default());
        world.bird.place_at(600.0);

        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);

        assert_eq!(
            events.last(),
            Some(&Event::RunEnded {
                reason: RunEndReason::OutOfBounds
            })
        );
    }

    #[test]
    fn overlapping_pipe_ends_run_with_collision() {
        let config = GameConfig {
            initial_offset: -320.0,
            horizontal_range: SpawnRange::new(400, 400),
            upper_offset_range: SpawnRange::new(-100, -100),
            vertical_gap_range: SpawnRange::new(550, 550),
            ..GameConfig::default()
        };
        let (mut world, _) = started_world(config);

        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { dt: Duration::ZERO },
                Event::RunEnded {
                    reason: RunEndReason::Collision {
                        pipe: PairId::new(0).lower()
                    }
                },
            ]
        );
    }

    #[test]
    fn ticks_after_run_end_are_ignored() {
        let (mut world, _) = started_world(GameConfig::default());
        world.bird.place_at(0.0);
        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }

    #[test]
    fn scroll_velocity_command_updates_field() {
        let (mut world, _) = started_world(GameConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetScrollVelocity { velocity: -220.0 },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ScrollVelocityChanged { velocity: -220.0 }]
        );
        assert_eq!(query::scroll_velocity(&world), -220.0);
    }

    #[test]
    fn rejected_configuration_keeps_previous_one() {
        let (mut world, _) = started_world(GameConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGame {
                config: GameConfig {
                    horizontal_range: SpawnRange::new(600, 400),
                    ..GameConfig::default()
                },
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::ConfigurationRejected {
                error: ConfigError::InvalidRange { .. }
            }]
        ));
        assert_eq!(query::config(&world), &GameConfig::default());
        assert!(query::is_running(&world));
    }

    #[test]
    fn impossible_layouts_are_rejected_before_spawning() {
        for config in [
            GameConfig {
                horizontal_range: SpawnRange::new(-600, -400),
                ..GameConfig::default()
            },
            GameConfig {
                vertical_gap_range: SpawnRange::new(100, 100),
                ..GameConfig::default()
            },
        ] {
            assert!(matches!(
                World::new(config),
                Err(ConfigError::OverlappingPairs { .. } | ConfigError::ClosedGap { .. })
            ));
        }
    }

    #[test]
    fn accepted_configuration_stops_active_run() {
        let (mut world, _) = started_world(GameConfig::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureGame {
                config: GameConfig {
                    pipes_to_render: 3,
                    ..GameConfig::default()
                },
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::GameConfigured]);
        assert!(!query::is_running(&world));
        assert_eq!(query::pipes(&world).len(), 6);
    }
}
