#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the Savings Arcade.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter translates keyboard, mouse and touch input into
//! [`InputEvent`]s whose horizontal coordinate is a fraction of the play
//! field width, so the input controller never sees screen pixels.

use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{
        is_key_pressed, is_key_released, is_mouse_button_down, is_mouse_button_pressed,
        is_mouse_button_released, mouse_position, touches, KeyCode, MouseButton, TouchPhase,
    },
};
use savings_arcade_core::{InputEvent, Key, PointerButton, PointerId, RunStatus};
use savings_arcade_rendering::{
    AsteroidPresentation, Color, FrameInput, PowerUpPresentation, Presentation,
    ProjectilePresentation, RenderingBackend, Scene, ShipPresentation,
};
use std::time::Duration;

const HUD_FONT_SIZE: f32 = 22.0;
const MESSAGE_FONT_SIZE: f32 = 26.0;
const LABEL_FONT_SIZE: f32 = 16.0;
const FIELD_COLOR: Color = Color::from_rgb_u8(14, 16, 30);
const FIELD_BORDER: Color = Color::from_rgb_u8(60, 66, 100);
const PROJECTILE_COLOR: Color = Color::from_rgb_u8(255, 255, 210);
const SHIELD_COLOR: Color = Color::new(0.4, 0.8, 1.0, 0.6);

/// Keyboard keys forwarded to the input controller.
const KEY_BINDINGS: [(KeyCode, Key); 6] = [
    (KeyCode::Left, Key::ArrowLeft),
    (KeyCode::Right, Key::ArrowRight),
    (KeyCode::A, Key::A),
    (KeyCode::D, Key::D),
    (KeyCode::Space, Key::Space),
    (KeyCode::B, Key::B),
];

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `R` or `Enter` starts a new run.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            restart: is_key_pressed(KeyCode::R) || is_key_pressed(KeyCode::Enter),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
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
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self { swap_interval } = self;
        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 540,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            macroquad::input::simulate_mouse_with_touch(false);
            let mut scene = scene;
            let mut pointer = PointerTracker::default();
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&metrics, &mut pointer, keyboard);

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                draw_field(&metrics);
                draw_power_ups(&scene.power_ups, &metrics);
                draw_asteroids(&scene.asteroids, &metrics);
                draw_projectiles(&scene.projectiles, &metrics);
                if let Some(ship) = scene.ship {
                    draw_ship(ship, &metrics);
                }
                draw_hud(&scene, &metrics);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps field units onto the window, letterboxing the field in the middle.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    width: f32,
    height: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let field = scene.field;
        let scale = (screen_width / field.width)
            .min(screen_height / field.height)
            .max(f32::EPSILON);
        let width = field.width * scale;
        let height = field.height * scale;

        Self {
            scale,
            offset_x: (screen_width - width) * 0.5,
            offset_y: (screen_height - height) * 0.5,
            width,
            height,
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }

    /// Horizontal screen coordinate as a fraction of the field width, clamped to `0.0..=1.0`.
    fn field_fraction(&self, screen_x: f32) -> f32 {
        ((screen_x - self.offset_x) / self.width).clamp(0.0, 1.0)
    }
}

/// Remembers the mouse position so movement is only reported while a button is held.
#[derive(Clone, Copy, Debug, Default)]
struct PointerTracker {
    last_x: Option<f32>,
}

fn gather_frame_input(
    metrics: &SceneMetrics,
    pointer: &mut PointerTracker,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let mut events = Vec::new();

    for (code, key) in KEY_BINDINGS {
        if is_key_pressed(code) {
            events.push(InputEvent::KeyDown(key));
        }
        if is_key_released(code) {
            events.push(InputEvent::KeyUp(key));
        }
    }

    let (mouse_x, _) = mouse_position();
    let x = metrics.field_fraction(mouse_x);
    let held = is_mouse_button_down(MouseButton::Left) || is_mouse_button_down(MouseButton::Right);
    let mouse = MouseObservation {
        x,
        pressed_primary: is_mouse_button_pressed(MouseButton::Left),
        pressed_secondary: is_mouse_button_pressed(MouseButton::Right),
        released: is_mouse_button_released(MouseButton::Left)
            || is_mouse_button_released(MouseButton::Right),
        held,
    };
    events.extend(mouse_events(pointer, mouse));

    for touch in touches() {
        let x = metrics.field_fraction(touch.position.x);
        if let Some(event) = touch_event(touch.id, touch.phase, x) {
            events.push(event);
        }
    }

    FrameInput {
        events,
        restart: keyboard.restart,
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct MouseObservation {
    x: f32,
    pressed_primary: bool,
    pressed_secondary: bool,
    released: bool,
    held: bool,
}

fn mouse_events(pointer: &mut PointerTracker, mouse: MouseObservation) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let pressed = if mouse.pressed_secondary {
        Some(PointerButton::Secondary)
    } else if mouse.pressed_primary {
        Some(PointerButton::Primary)
    } else {
        None
    };

    if let Some(button) = pressed {
        events.push(InputEvent::PointerDown {
            pointer: PointerId::MOUSE,
            x: mouse.x,
            button,
        });
        pointer.last_x = Some(mouse.x);
    } else if mouse.held && pointer.last_x.is_some_and(|last| last != mouse.x) {
        events.push(InputEvent::PointerMoved {
            pointer: PointerId::MOUSE,
            x: mouse.x,
        });
        pointer.last_x = Some(mouse.x);
    }

    if mouse.released && !mouse.held {
        events.push(InputEvent::PointerUp {
            pointer: PointerId::MOUSE,
        });
        pointer.last_x = None;
    }

    events
}

fn touch_event(id: u64, phase: TouchPhase, x: f32) -> Option<InputEvent> {
    let pointer = PointerId::new(id);
    match phase {
        TouchPhase::Started => Some(InputEvent::PointerDown {
            pointer,
            x,
            button: PointerButton::Primary,
        }),
        TouchPhase::Moved => Some(InputEvent::PointerMoved { pointer, x }),
        TouchPhase::Ended | TouchPhase::Cancelled => Some(InputEvent::PointerUp { pointer }),
        TouchPhase::Stationary => None,
    }
}

fn draw_field(metrics: &SceneMetrics) {
    macroquad::shapes::draw_rectangle(
        metrics.offset_x,
        metrics.offset_y,
        metrics.width,
        metrics.height,
        to_macroquad_color(FIELD_COLOR),
    );
    macroquad::shapes::draw_rectangle_lines(
        metrics.offset_x,
        metrics.offset_y,
        metrics.width,
        metrics.height,
        2.0,
        to_macroquad_color(FIELD_BORDER),
    );
}

fn draw_asteroids(asteroids: &[AsteroidPresentation], metrics: &SceneMetrics) {
    for asteroid in asteroids {
        let center = metrics.to_screen(asteroid.position);
        let radius = asteroid.radius * metrics.scale;
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius,
            to_macroquad_color(asteroid.fill()),
        );
        macroquad::shapes::draw_circle_lines(center.x, center.y, radius, 2.0, BLACK);

        if asteroid.hit_points > 1 {
            let label = asteroid.hit_points.to_string();
            draw_centered_text(&label, center, LABEL_FONT_SIZE, BLACK);
        }
        if !asteroid.label.is_empty() {
            let below = center + Vec2::new(0.0, radius + LABEL_FONT_SIZE * 0.6);
            draw_centered_text(&asteroid.label, below, LABEL_FONT_SIZE, WHITE);
        }
    }
}

fn draw_projectiles(projectiles: &[ProjectilePresentation], metrics: &SceneMetrics) {
    let color = to_macroquad_color(PROJECTILE_COLOR);
    for projectile in projectiles {
        let center = metrics.to_screen(projectile.position);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            (projectile.radius * metrics.scale).max(1.0),
            color,
        );
    }
}

fn draw_power_ups(power_ups: &[PowerUpPresentation], metrics: &SceneMetrics) {
    for power_up in power_ups {
        let center = metrics.to_screen(power_up.position);
        let radius = power_up.radius * metrics.scale;
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius,
            to_macroquad_color(power_up.color().with_alpha(0.85)),
        );
        macroquad::shapes::draw_circle_lines(center.x, center.y, radius, 2.0, WHITE);
        draw_centered_text(power_up.glyph(), center, LABEL_FONT_SIZE, BLACK);
    }
}

fn draw_ship(ship: ShipPresentation, metrics: &SceneMetrics) {
    let center = metrics.to_screen(ship.position);
    let radius = ship.radius * metrics.scale;
    let nose = center - Vec2::new(0.0, radius);
    let left = center + Vec2::new(-radius, radius * 0.8);
    let right = center + Vec2::new(radius, radius * 0.8);

    macroquad::shapes::draw_triangle(
        MacroquadVec2::new(nose.x, nose.y),
        MacroquadVec2::new(left.x, left.y),
        MacroquadVec2::new(right.x, right.y),
        to_macroquad_color(ship.fill()),
    );

    if ship.shielded {
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius * 1.4,
            2.0,
            to_macroquad_color(SHIELD_COLOR),
        );
    }
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let hud = &scene.hud;
    if hud.status != RunStatus::Idle {
        let left = metrics.offset_x + 10.0;
        let mut baseline = metrics.offset_y + HUD_FONT_SIZE;
        for line in hud.lines() {
            let _ = macroquad::text::draw_text(&line, left, baseline, HUD_FONT_SIZE, WHITE);
            baseline += HUD_FONT_SIZE;
        }
    }

    if let Some(message) = &hud.message {
        let center = Vec2::new(
            metrics.offset_x + metrics.width * 0.5,
            metrics.offset_y + metrics.height * 0.5,
        );
        draw_centered_text(message, center, MESSAGE_FONT_SIZE, WHITE);
        if hud.status != RunStatus::Running {
            let hint = center + Vec2::new(0.0, MESSAGE_FONT_SIZE * 1.5);
            draw_centered_text("Press R to play", hint, HUD_FONT_SIZE, WHITE);
        }
    }
}

fn draw_centered_text(text: &str, center: Vec2, font_size: f32, color: macroquad::color::Color) {
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    let _ = macroquad::text::draw_text(
        text,
        center.x - dimensions.width * 0.5,
        center.y + dimensions.height * 0.5,
        font_size,
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
