#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Flappy adapters.

use anyhow::Result as AnyResult;
use flappy_core::{BirdSnapshot, PipeKind, PipeSnapshot};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a copy darkened towards black by the provided amount.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        Self {
            red: self.red * keep,
            green: self.green * keep,
            blue: self.blue * keep,
            alpha: self.alpha,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether a flap was requested on this frame.
    pub flap: bool,
    /// Whether the player confirmed a menu prompt on this frame.
    pub confirm: bool,
}

/// Scene currently shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScenePhase {
    /// Title screen waiting for the player to start.
    #[default]
    MainMenu,
    /// A run is in progress.
    Playing,
    /// The last run ended.
    GameOver {
        /// Score of the run that just ended.
        score: u32,
        /// Best score after the run was recorded.
        best: u32,
    },
}

/// Bounds of the play area in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayfieldPresentation {
    /// Width of the play area.
    pub width: f32,
    /// Height of the play area.
    pub height: f32,
    /// Color used to fill the play area.
    pub background: Color,
}

impl PlayfieldPresentation {
    /// Creates a new playfield descriptor.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(
        width: f32,
        height: f32,
        background: Color,
    ) -> std::result::Result<Self, RenderingError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderingError::InvalidPlayfield { width, height });
        }

        Ok(Self {
            width,
            height,
            background,
        })
    }

    /// Size of the playfield as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Pipe drawn as a filled rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipePresentation {
    /// Whether the pipe hangs from the top or rises from the bottom.
    pub kind: PipeKind,
    /// Top-left corner in world units.
    pub origin: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

impl PipePresentation {
    /// Maps a pipe record centered on `(x, center_y)` to its drawable rectangle.
    #[must_use]
    pub fn from_snapshot(snapshot: &PipeSnapshot, size: Vec2, color: Color) -> Self {
        let center = Vec2::new(snapshot.x, snapshot.center_y);
        Self {
            kind: snapshot.kind,
            origin: center - size * 0.5,
            size,
            color,
        }
    }

    /// Reports whether any part of the rectangle lies horizontally within `0..width`.
    #[must_use]
    pub fn is_visible(&self, playfield_width: f32) -> bool {
        self.origin.x < playfield_width && self.origin.x + self.size.x > 0.0
    }
}

/// Bird drawn as a tilted rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BirdPresentation {
    /// Center of the bird in world units.
    pub center: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
    /// Clockwise tilt in radians; nose up while rising, nose down while falling.
    pub rotation: f32,
    /// Body color.
    pub color: Color,
}

impl BirdPresentation {
    /// Vertical speed at which the bird reaches its steepest tilt.
    pub const TILT_REFERENCE_SPEED: f32 = 300.0;

    /// Steepest tilt in radians.
    pub const MAX_TILT: f32 = std::f32::consts::FRAC_PI_4;

    /// Derives the drawable bird from the world's snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &BirdSnapshot, color: Color) -> Self {
        let tilt = (snapshot.velocity / Self::TILT_REFERENCE_SPEED).clamp(-1.0, 1.0);
        Self {
            center: Vec2::new(snapshot.x, snapshot.y),
            size: Vec2::new(snapshot.width, snapshot.height),
            rotation: tilt * Self::MAX_TILT,
            color,
        }
    }
}

/// Heads-up display content.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Score of the current run.
    pub score: u32,
    /// Best score known to the session.
    pub best: u32,
    /// Text color.
    pub color: Color,
}

/// Scene description combining the playfield, obstacles, avatar and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Bounds and background of the play area.
    pub playfield: PlayfieldPresentation,
    /// Scene the session is in.
    pub phase: ScenePhase,
    /// Banner shown on the title screen.
    pub banner: String,
    /// Live pipes in left-to-right order.
    pub pipes: Vec<PipePresentation>,
    /// The player's avatar.
    pub bird: BirdPresentation,
    /// Score overlay.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new<T>(
        playfield: PlayfieldPresentation,
        phase: ScenePhase,
        banner: T,
        pipes: Vec<PipePresentation>,
        bird: BirdPresentation,
        hud: HudPresentation,
    ) -> Self
    where
        T: Into<String>,
    {
        Self {
            playfield,
            phase,
            banner: banner.into(),
            pipes,
            bird,
            hud,
        }
    }

    /// Pipes that intersect the visible playfield.
    pub fn visible_pipes(&self) -> impl Iterator<Item = &PipePresentation> {
        let width = self.playfield.width;
        self.pipes.iter().filter(move |pipe| pipe.is_visible(width))
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Flappy scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter on that frame, and rewrites the scene
    /// before it is drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The playfield must have a positive area.
    InvalidPlayfield {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayfield { width, height } => {
                write!(
                    f,
                    "playfield must have a positive area (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::PipeIndex;

    const GREEN: Color = Color::from_rgb_u8(0x4c, 0xaf, 0x50);

    fn snapshot(kind: PipeKind, x: f32, center_y: f32) -> PipeSnapshot {
        PipeSnapshot {
            index: PipeIndex::new(0),
            kind,
            x,
            center_y,
            passed: false,
        }
    }

    #[test]
    fn playfield_rejects_degenerate_dimensions() {
        let error = PlayfieldPresentation::new(0.0, 600.0, GREEN)
            .expect_err("zero width must be rejected");
        assert_eq!(
            error,
            RenderingError::InvalidPlayfield {
                width: 0.0,
                height: 600.0
            }
        );
        assert!(PlayfieldPresentation::new(800.0, f32::NAN, GREEN).is_err());
        assert!(PlayfieldPresentation::new(800.0, 600.0, GREEN).is_ok());
    }

    #[test]
    fn pipe_rectangle_is_centered_on_record() {
        let pipe = PipePresentation::from_snapshot(
            &snapshot(PipeKind::Upper, 300.0, -100.0),
            Vec2::new(52.0, 400.0),
            GREEN,
        );

        assert_eq!(pipe.origin, Vec2::new(274.0, -300.0));
        assert_eq!(pipe.size, Vec2::new(52.0, 400.0));
        assert_eq!(pipe.kind, PipeKind::Upper);
    }

    #[test]
    fn pipes_outside_playfield_are_culled() {
        let size = Vec2::new(52.0, 400.0);
        let at = |x: f32| {
            PipePresentation::from_snapshot(&snapshot(PipeKind::Lower, x, 500.0), size, GREEN)
        };
        let left = at(-26.0);
        let edge = at(-25.0);
        let right = at(826.0);

        assert!(!left.is_visible(800.0));
        assert!(edge.is_visible(800.0));
        assert!(!right.is_visible(800.0));
    }

    #[test]
    fn bird_tilt_follows_vertical_velocity() {
        let bird = |velocity: f32| BirdSnapshot {
            x: 80.0,
            y: 300.0,
            velocity,
            width: 34.0,
            height: 24.0,
        };

        let rising = BirdPresentation::from_snapshot(&bird(-150.0), GREEN);
        let plunging = BirdPresentation::from_snapshot(&bird(900.0), GREEN);

        assert!(rising.rotation < 0.0);
        assert!((plunging.rotation - BirdPresentation::MAX_TILT).abs() < f32::EPSILON);
        assert_eq!(rising.center, Vec2::new(80.0, 300.0));
    }

    #[test]
    fn darken_scales_channels_but_keeps_alpha() {
        let color = Color::new(1.0, 0.5, 0.0, 0.25).darken(0.5);
        assert_eq!(color, Color::new(0.5, 0.25, 0.0, 0.25));
    }
}
