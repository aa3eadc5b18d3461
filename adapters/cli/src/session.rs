//! Session loop tying the world, the scoring system and the scene flow together.

use std::time::Duration;

use anyhow::{bail, Result};
use flappy_core::{Command, Event, GameConfig};
use flappy_rendering::{
    BirdPresentation, Color, FrameInput, HudPresentation, PipePresentation, PlayfieldPresentation,
    Scene, ScenePhase,
};
use flappy_system_bootstrap::Bootstrap;
use flappy_system_scoring::{RunState, ScoreStore, Tuning};
use flappy_world::{self as world, query, World};
use glam::Vec2;

/// Longest simulated step; slower frames are truncated so a stalled window
/// cannot tunnel the bird through a pipe.
const MAX_FRAME_DT: Duration = Duration::from_millis(50);

/// Time the game-over screen ignores confirmation, so a flap pressed just
/// after the crash does not dismiss it.
const GAME_OVER_GRACE: Duration = Duration::from_millis(500);

pub(crate) const SKY_COLOR: Color = Color::from_rgb_u8(0x70, 0xc5, 0xce);
const PIPE_COLOR: Color = Color::from_rgb_u8(0x73, 0xbf, 0x2e);
const BIRD_COLOR: Color = Color::from_rgb_u8(0xf7, 0xd5, 0x1d);
const TEXT_COLOR: Color = Color::from_rgb_u8(0xff, 0xff, 0xff);

/// Owns the simulation for one player and drives the three-scene flow.
#[derive(Debug)]
pub(crate) struct Session<S> {
    world: World,
    scoring: RunState<S>,
    bootstrap: Bootstrap,
    phase: ScenePhase,
    since_game_over: Duration,
}

impl<S: ScoreStore> Session<S> {
    /// Boots a world with `config` and reads the best score from `store`.
    pub(crate) fn new(config: &GameConfig, store: S) -> Result<Self> {
        let bootstrap = Bootstrap;
        let mut world = World::new(GameConfig::default())?;
        let mut events = Vec::new();
        for command in bootstrap.opening_commands(config) {
            world::apply(&mut world, command, &mut events);
        }
        if let Some(Event::ConfigurationRejected { error }) = events
            .iter()
            .find(|event| matches!(event, Event::ConfigurationRejected { .. }))
        {
            bail!("game configuration rejected: {error}");
        }

        let scoring = RunState::new(store, Tuning::from_config(query::config(&world)));
        tracing::info!(
            banner = bootstrap.welcome_banner(&world),
            best = scoring.best_score(),
            "session ready"
        );
        Ok(Self {
            world,
            scoring,
            bootstrap,
            phase: ScenePhase::MainMenu,
            since_game_over: Duration::ZERO,
        })
    }

    /// Advances the session by one presented frame.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput) {
        match self.phase {
            ScenePhase::MainMenu => {
                if input.confirm {
                    let _ = self.pump(vec![Command::StartRun]);
                    self.phase = ScenePhase::Playing;
                }
            }
            ScenePhase::Playing => {
                let mut commands = Vec::with_capacity(2);
                if input.flap {
                    commands.push(Command::Flap);
                }
                commands.push(Command::Tick {
                    dt: dt.min(MAX_FRAME_DT),
                });

                let events = self.pump(commands);
                if events
                    .iter()
                    .any(|event| matches!(event, Event::RunEnded { .. }))
                {
                    self.phase = ScenePhase::GameOver {
                        score: self.scoring.score(),
                        best: self.scoring.best_score(),
                    };
                    self.since_game_over = Duration::ZERO;
                }
            }
            ScenePhase::GameOver { .. } => {
                self.since_game_over = self.since_game_over.saturating_add(dt);
                if input.confirm && self.since_game_over >= GAME_OVER_GRACE {
                    self.phase = ScenePhase::MainMenu;
                }
            }
        }
    }

    /// Applies `commands` and feeds the events through the scoring system until
    /// it stops producing commands. Returns every event observed.
    fn pump(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut observed = Vec::new();
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            if events.contains(&Event::GameConfigured) {
                self.scoring
                    .retune(Tuning::from_config(query::config(&self.world)));
            }
            self.scoring.handle(&events, &mut pending);
            observed.extend(events);
        }
        observed
    }

    pub(crate) fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub(crate) fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub(crate) fn best_score(&self) -> u32 {
        self.scoring.best_score()
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Builds the initial scene presented when the window opens.
    pub(crate) fn scene(&self) -> Result<Scene> {
        let config = query::config(&self.world);
        let playfield =
            PlayfieldPresentation::new(config.screen_width, config.screen_height, SKY_COLOR)?;
        let mut scene = Scene::new(
            playfield,
            self.phase,
            self.bootstrap.welcome_banner(&self.world),
            Vec::new(),
            BirdPresentation::from_snapshot(&query::bird(&self.world), BIRD_COLOR),
            HudPresentation {
                score: 0,
                best: 0,
                color: TEXT_COLOR,
            },
        );
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Rewrites the dynamic parts of `scene` from the current world state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let config = query::config(&self.world);
        let pipe_size = Vec2::new(config.pipe_width, config.pipe_height);

        scene.phase = self.phase;
        scene.pipes.clear();
        scene.pipes.extend(
            query::pipes(&self.world)
                .iter()
                .map(|pipe| PipePresentation::from_snapshot(pipe, pipe_size, PIPE_COLOR)),
        );
        scene.bird = BirdPresentation::from_snapshot(&query::bird(&self.world), BIRD_COLOR);
        scene.hud.score = self.scoring.score();
        scene.hud.best = self.scoring.best_score();
    }
}
