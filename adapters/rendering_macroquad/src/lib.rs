#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Flappy.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature. The game has no sound, which keeps `cargo test` usable on hosts
//! without those libraries.

use anyhow::Result;
use flappy_core::PipeKind;
use flappy_rendering::{
    BirdPresentation, Color, FrameInput, PipePresentation, PlayfieldPresentation, Presentation,
    RenderingBackend, Scene, ScenePhase,
};
use glam::Vec2;
use macroquad::input::{is_key_pressed, is_mouse_button_pressed, KeyCode, MouseButton};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::Duration;

const PIPE_CAP_HEIGHT: f32 = 24.0;
const PIPE_CAP_OVERHANG: f32 = 4.0;
const HUD_FONT_SIZE: f32 = 48.0;
const TITLE_FONT_SIZE: f32 = 56.0;
const PROMPT_FONT_SIZE: f32 = 28.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `Space`, `Up` or a left click flaps.
    flap: bool,
    /// `Enter` or `Space` confirms menu prompts.
    confirm: bool,
    /// `F` toggles the frame rate readout.
    toggle_fps: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let space = is_key_pressed(KeyCode::Space);
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            flap: space
                || is_key_pressed(KeyCode::Up)
                || is_mouse_button_pressed(MouseButton::Left),
            confirm: space || is_key_pressed(KeyCode::Enter),
            toggle_fps: is_key_pressed(KeyCode::F),
        }
    }

    fn frame_input(self) -> FrameInput {
        FrameInput {
            flap: self.flap,
            confirm: self.confirm,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the frame rate is drawn in the corner of the window.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Averages frame durations over one-second windows.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    latest: Option<f32>,
}

impl FpsCounter {
    /// Records a rendered frame and returns the most recent per-second average, if any.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed >= Duration::from_secs(1) {
            let seconds = self.elapsed.as_secs_f32();
            self.latest = Some(self.frames as f32 / seconds);
            self.elapsed = Duration::ZERO;
            self.frames = 0;
        }
        self.latest
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.playfield.width.round() as i32,
            window_height: scene.playfield.height.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut show_fps = show_fps;
            let mut fps_counter = FpsCounter::default();
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }
                if keyboard.toggle_fps {
                    show_fps = !show_fps;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                update_scene(frame_dt, keyboard.frame_input(), &mut scene);

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_playfield(
                    &scene.playfield,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                draw_playfield(&scene.playfield, &metrics);
                draw_pipes(&scene, &metrics);
                draw_bird(&scene.bird, &metrics);
                draw_overlay(&scene, &metrics);

                let fps = fps_counter.record_frame(frame_dt);
                if show_fps {
                    if let Some(fps) = fps {
                        let _ = macroquad::text::draw_text(
                            &format!("{fps:.0} fps"),
                            8.0,
                            20.0,
                            20.0,
                            macroquad::color::WHITE,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offsets mapping world units to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_playfield(
        playfield: &PlayfieldPresentation,
        screen_width: f32,
        screen_height: f32,
    ) -> Self {
        let scale = (screen_width / playfield.width)
            .min(screen_height / playfield.height)
            .max(0.0);
        let offset_x = ((screen_width - playfield.width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - playfield.height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + world.x * self.scale,
            self.offset_y + world.y * self.scale,
        )
    }
}

/// Portion of a pipe rectangle inside the playfield, as `(origin, size)`.
fn clip_to_playfield(
    pipe: &PipePresentation,
    playfield: &PlayfieldPresentation,
) -> Option<(Vec2, Vec2)> {
    let min = pipe.origin.max(Vec2::ZERO);
    let max = (pipe.origin + pipe.size).min(playfield.size());
    let size = max - min;
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some((min, size))
}

/// Cap drawn across the open end of a pipe, facing the gap.
fn pipe_cap(pipe: &PipePresentation) -> (Vec2, Vec2) {
    let size = Vec2::new(
        pipe.size.x + 2.0 * PIPE_CAP_OVERHANG,
        PIPE_CAP_HEIGHT.min(pipe.size.y),
    );
    let y = match pipe.kind {
        PipeKind::Upper => pipe.origin.y + pipe.size.y - size.y,
        PipeKind::Lower => pipe.origin.y,
    };
    (Vec2::new(pipe.origin.x - PIPE_CAP_OVERHANG, y), size)
}

/// Corners of the bird's body rotated about its center, clockwise from top-left.
fn bird_corners(bird: &BirdPresentation) -> [Vec2; 4] {
    let half = bird.size * 0.5;
    let rotation = Vec2::from_angle(bird.rotation);
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
    .map(|corner| bird.center + rotation.rotate(corner))
}

fn draw_playfield(playfield: &PlayfieldPresentation, metrics: &SceneMetrics) {
    let origin = metrics.to_screen(Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        playfield.width * metrics.scale,
        playfield.height * metrics.scale,
        to_macroquad_color(playfield.background),
    );
}

fn draw_pipes(scene: &Scene, metrics: &SceneMetrics) {
    for pipe in scene.visible_pipes() {
        let Some((origin, size)) = clip_to_playfield(pipe, &scene.playfield) else {
            continue;
        };
        draw_world_rectangle(origin, size, pipe.color, metrics);

        let (cap_origin, cap_size) = pipe_cap(pipe);
        let cap = PipePresentation {
            origin: cap_origin,
            size: cap_size,
            ..*pipe
        };
        if let Some((origin, size)) = clip_to_playfield(&cap, &scene.playfield) {
            draw_world_rectangle(origin, size, pipe.color.darken(0.25), metrics);
        }
    }
}

fn draw_world_rectangle(origin: Vec2, size: Vec2, color: Color, metrics: &SceneMetrics) {
    let screen = metrics.to_screen(origin);
    macroquad::shapes::draw_rectangle(
        screen.x,
        screen.y,
        size.x * metrics.scale,
        size.y * metrics.scale,
        to_macroquad_color(color),
    );
}

fn draw_bird(bird: &BirdPresentation, metrics: &SceneMetrics) {
    let [a, b, c, d] = bird_corners(bird).map(|corner| {
        let screen = metrics.to_screen(corner);
        MacroquadVec2::new(screen.x, screen.y)
    });
    let color = to_macroquad_color(bird.color);
    macroquad::shapes::draw_triangle(a, b, c, color);
    macroquad::shapes::draw_triangle(a, c, d, color);
}

fn draw_overlay(scene: &Scene, metrics: &SceneMetrics) {
    let text_color = to_macroquad_color(scene.hud.color);
    let width = scene.playfield.width;
    let height = scene.playfield.height;

    match scene.phase {
        ScenePhase::MainMenu => {
            draw_centered_text(
                &scene.banner,
                height * 0.3,
                TITLE_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
            draw_centered_text(
                "Press Enter or Space to start",
                height * 0.55,
                PROMPT_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
            draw_centered_text(
                &format!("Best: {}", scene.hud.best),
                height * 0.65,
                PROMPT_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
        }
        ScenePhase::Playing => {
            draw_centered_text(
                &scene.hud.score.to_string(),
                height * 0.12,
                HUD_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
        }
        ScenePhase::GameOver { score, best } => {
            draw_centered_text(
                "Game Over",
                height * 0.3,
                TITLE_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
            draw_centered_text(
                &format!("Score: {score}   Best: {best}"),
                height * 0.45,
                PROMPT_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
            draw_centered_text(
                "Press Enter or Space to continue",
                height * 0.6,
                PROMPT_FONT_SIZE,
                text_color,
                width,
                metrics,
            );
        }
    }
}

fn draw_centered_text(
    text: &str,
    baseline_y: f32,
    font_size: f32,
    color: macroquad::color::Color,
    playfield_width: f32,
    metrics: &SceneMetrics,
) {
    let scaled_size = (font_size * metrics.scale).max(1.0);
    let dimensions = macroquad::text::measure_text(text, None, scaled_size.round() as u16, 1.0);
    let anchor = metrics.to_screen(Vec2::new(playfield_width * 0.5, baseline_y));
    let _ = macroquad::text::draw_text(
        text,
        anchor.x - dimensions.width * 0.5,
        anchor.y,
        scaled_size,
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::PipeIndex;

    const GREEN: Color = Color::from_rgb_u8(0x4c, 0xaf, 0x50);

    fn playfield() -> PlayfieldPresentation {
        PlayfieldPresentation::new(800.0, 600.0, Color::from_rgb_u8(0x70, 0xc5, 0xce))
            .expect("valid playfield")
    }

    fn pipe(kind: PipeKind, x: f32, center_y: f32) -> PipePresentation {
        PipePresentation::from_snapshot(
            &flappy_core::PipeSnapshot {
                index: PipeIndex::new(0),
                kind,
                x,
                center_y,
                passed: false,
            },
            Vec2::new(52.0, 400.0),
            GREEN,
        )
    }

    #[test]
    fn scene_metrics_letterbox_wide_windows() {
        let metrics = SceneMetrics::from_playfield(&playfield(), 1600.0, 600.0);

        assert!((metrics.scale - 1.0).abs() <= f32::EPSILON);
        assert!((metrics.offset_x - 400.0).abs() <= f32::EPSILON);
        assert!(metrics.offset_y.abs() <= f32::EPSILON);
        assert_eq!(
            metrics.to_screen(Vec2::new(10.0, 20.0)),
            Vec2::new(410.0, 20.0)
        );
    }

    #[test]
    fn scene_metrics_shrink_to_fit_small_windows() {
        let metrics = SceneMetrics::from_playfield(&playfield(), 400.0, 600.0);

        assert!((metrics.scale - 0.5).abs() <= f32::EPSILON);
        assert!((metrics.offset_y - 150.0).abs() <= f32::EPSILON);
    }

    #[test]
    fn upper_pipe_is_clipped_at_top_edge() {
        let upper = pipe(PipeKind::Upper, 300.0, -100.0);
        let (origin, size) = clip_to_playfield(&upper, &playfield()).expect("pipe is on screen");

        assert_eq!(origin, Vec2::new(274.0, 0.0));
        assert_eq!(size, Vec2::new(52.0, 100.0));
    }

    #[test]
    fn pipe_fully_above_playfield_is_skipped() {
        let hidden = pipe(PipeKind::Upper, 300.0, -250.0);
        assert!(clip_to_playfield(&hidden, &playfield()).is_none());
    }

    #[test]
    fn caps_face_the_gap() {
        let upper = pipe(PipeKind::Upper, 300.0, -100.0);
        let lower = pipe(PipeKind::Lower, 300.0, 500.0);

        let (upper_origin, upper_size) = pipe_cap(&upper);
        let (lower_origin, _) = pipe_cap(&lower);

        assert!((upper_origin.y + upper_size.y - 100.0).abs() <= f32::EPSILON);
        assert!((lower_origin.y - 300.0).abs() <= f32::EPSILON);
        assert!((upper_size.x - 60.0).abs() <= f32::EPSILON);
    }

    #[test]
    fn level_bird_corners_match_its_box() {
        let bird = BirdPresentation {
            center: Vec2::new(80.0, 300.0),
            size: Vec2::new(34.0, 24.0),
            rotation: 0.0,
            color: GREEN,
        };

        let corners = bird_corners(&bird);
        assert!(corners[0].abs_diff_eq(Vec2::new(63.0, 288.0), 1e-4));
        assert!(corners[2].abs_diff_eq(Vec2::new(97.0, 312.0), 1e-4));
    }

    #[test]
    fn keyboard_shortcuts_map_to_frame_input() {
        let keyboard = KeyboardShortcuts {
            flap: true,
            confirm: false,
            ..KeyboardShortcuts::default()
        };
        assert_eq!(
            keyboard.frame_input(),
            FrameInput {
                flap: true,
                confirm: false
            }
        );
    }

    #[test]
    fn fps_counter_reports_after_one_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert_eq!(counter.record_frame(Duration::from_millis(16)), None);
        }
        let fps = counter
            .record_frame(Duration::from_millis(56))
            .expect("a full second has elapsed");
        assert!((fps - 60.0).abs() < 1e-3);
    }
}
