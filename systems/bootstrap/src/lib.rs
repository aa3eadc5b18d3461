#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Flappy session.

use flappy_core::{Command, GameConfig};
use flappy_world::{query, World};

/// Produces data required to greet the player and open a session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Commands that bring a freshly created world in line with `config`.
    ///
    /// The world stays idle afterwards; runs are started from the main menu.
    #[must_use]
    pub fn opening_commands(&self, config: &GameConfig) -> Vec<Command> {
        vec![Command::ConfigureGame {
            config: config.clone(),
        }]
    }
}
