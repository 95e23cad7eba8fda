#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Savings Arcade adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use savings_arcade_core::{InputEvent, PlayField, PowerUpKind, Rgb, RunStatus};
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

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Raw input events observed this frame, in arrival order.
    pub events: Vec<InputEvent>,
    /// Whether the player asked to start a new run this frame.
    pub restart: bool,
}

/// Player ship as presented on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipPresentation {
    /// Ship center in field units.
    pub position: Vec2,
    /// Collision radius in field units.
    pub radius: f32,
    /// Remaining damage flash as a fraction of its full length.
    pub flash: f32,
    /// Whether at least one shield charge is left.
    pub shielded: bool,
}

impl ShipPresentation {
    /// Base hull color of the ship.
    pub const COLOR: Color = Color::from_rgb_u8(120, 220, 255);

    /// Fill color with the damage flash applied.
    #[must_use]
    pub fn fill(&self) -> Color {
        Self::COLOR.lighten(self.flash)
    }
}

/// Asteroid as presented on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct AsteroidPresentation {
    /// Asteroid center in field units.
    pub position: Vec2,
    /// Radius in field units.
    pub radius: f32,
    /// Category color.
    pub color: Color,
    /// Remaining hit flash as a fraction of its full length.
    pub flash: f32,
    /// Hits left before the asteroid breaks.
    pub hit_points: u32,
    /// Category label drawn next to large asteroids.
    pub label: String,
}

impl AsteroidPresentation {
    /// Fill color with the hit flash applied.
    #[must_use]
    pub fn fill(&self) -> Color {
        self.color.lighten(self.flash * 0.8)
    }
}

/// Projectile as presented on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Projectile center in field units.
    pub position: Vec2,
    /// Radius in field units.
    pub radius: f32,
}

/// Falling power-up as presented on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerUpPresentation {
    /// Power-up center in field units.
    pub position: Vec2,
    /// Radius in field units.
    pub radius: f32,
    /// Effect granted on pickup.
    pub kind: PowerUpKind,
}

impl PowerUpPresentation {
    /// Color identifying the power-up kind.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self.kind {
            PowerUpKind::Shield => Color::from_rgb_u8(80, 200, 255),
            PowerUpKind::SmartBomb => Color::from_rgb_u8(255, 120, 60),
            PowerUpKind::RapidFire => Color::from_rgb_u8(250, 230, 90),
        }
    }

    /// Single-letter glyph drawn inside the power-up.
    #[must_use]
    pub const fn glyph(&self) -> &'static str {
        match self.kind {
            PowerUpKind::Shield => "S",
            PowerUpKind::SmartBomb => "B",
            PowerUpKind::RapidFire => "R",
        }
    }
}

/// Heads-up display content.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    /// Run lifecycle status.
    pub status: RunStatus,
    /// Current score.
    pub score: f64,
    /// Simulated time elapsed in the run.
    pub elapsed: Duration,
    /// Total run length.
    pub run_duration: Duration,
    /// Hull integrity left.
    pub hull: u32,
    /// Shield charges left.
    pub shields: u32,
    /// Smart bombs left.
    pub smart_bombs: u32,
    /// Rapid-fire time left.
    pub rapid_fire: Duration,
    /// Best score recorded so far.
    pub best_score: Option<f64>,
    /// Banner or terminal message displayed in the middle of the field.
    pub message: Option<String>,
}

impl Hud {
    /// Creates an idle HUD showing the provided banner.
    #[must_use]
    pub fn idle(run_duration: Duration, message: Option<String>) -> Self {
        Self {
            status: RunStatus::Idle,
            score: 0.0,
            elapsed: Duration::ZERO,
            run_duration,
            hull: 0,
            shields: 0,
            smart_bombs: 0,
            rapid_fire: Duration::ZERO,
            best_score: None,
            message,
        }
    }

    /// Time left before the run completes.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.run_duration.saturating_sub(self.elapsed)
    }

    /// Text lines rendered in the status strip, top to bottom.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Score {:.0}", self.score),
            format!("Time {:.1}s", self.remaining().as_secs_f32()),
            format!(
                "Hull {}  Shields {}  Bombs {}",
                self.hull, self.shields, self.smart_bombs
            ),
        ];
        if !self.rapid_fire.is_zero() {
            lines.push(format!("Rapid fire {:.1}s", self.rapid_fire.as_secs_f32()));
        }
        if let Some(best) = self.best_score {
            lines.push(format!("Best {best:.0}"));
        }
        lines
    }
}

/// Describes the content that should be rendered for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Play field the scene is laid out in.
    pub field: PlayField,
    /// Ship, absent while no run is active.
    pub ship: Option<ShipPresentation>,
    /// Live asteroids.
    pub asteroids: Vec<AsteroidPresentation>,
    /// Projectiles in flight.
    pub projectiles: Vec<ProjectilePresentation>,
    /// Falling power-ups.
    pub power_ups: Vec<PowerUpPresentation>,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene for the provided field.
    pub fn new(field: PlayField, hud: Hud) -> Result<Self, RenderingError> {
        if !(field.width > 0.0 && field.height > 0.0) {
            return Err(RenderingError::InvalidPlayField {
                width: field.width,
                height: field.height,
            });
        }

        Ok(Self {
            field,
            ship: None,
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            hud,
        })
    }

    /// Removes every entity, keeping the field and HUD.
    pub fn clear_entities(&mut self) {
        self.ship = None;
        self.asteroids.clear();
        self.projectiles.clear();
        self.power_ups.clear();
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

/// Rendering backend capable of presenting Savings Arcade scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, the
    /// input captured by the adapter during that frame, and may mutate the
    /// scene before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The play field must have a positive, finite extent.
    InvalidPlayField {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlayField { width, height } => {
                write!(
                    f,
                    "play field must have a positive extent (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
