#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Savings Arcade engine.
//!
//! This crate defines the message surface that connects the financial data
//! layer, the authoritative world, and pure systems. Transactions are turned
//! into a [`DifficultyProfile`] and an immutable [`Timeline`] of
//! [`SpawnEvent`] values before a run starts. During the run the engine submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a single run measured in simulated milliseconds.
pub const RUN_DURATION_MS: u64 = 60_000;

/// Length of a single run as a [`Duration`].
pub const RUN_DURATION: Duration = Duration::from_millis(RUN_DURATION_MS);

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Savings Arcade.";

/// Direction of money flow recorded by a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received. Becomes a collectible power-up.
    Income,
    /// Money spent. Becomes an asteroid to destroy.
    Expense,
}

/// Single ledger entry supplied by the external data cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Calendar day the transaction was booked on.
    pub date: NaiveDate,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Free-form category label, e.g. "Food".
    pub category: String,
    /// Non-negative transaction amount.
    pub amount: f64,
    /// Optional human readable note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransactionRecord {
    /// Creates an income record without a description.
    #[must_use]
    pub fn income(date: NaiveDate, category: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            kind: TransactionKind::Income,
            category: category.into(),
            amount,
            description: None,
        }
    }

    /// Creates an expense record without a description.
    #[must_use]
    pub fn expense(date: NaiveDate, category: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            kind: TransactionKind::Expense,
            category: category.into(),
            amount,
            description: None,
        }
    }

    /// Attaches a description to the record.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Inclusive range of calendar days `[today - days, today]` a run draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookbackWindow {
    today: NaiveDate,
    days: u32,
}

impl LookbackWindow {
    /// Creates a window ending on `today` and reaching `days` back.
    #[must_use]
    pub const fn new(today: NaiveDate, days: u32) -> Self {
        Self { today, days }
    }

    /// Last day included in the window.
    #[must_use]
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Number of days the window reaches back from `today`.
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// First day included in the window.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Reports whether the provided date falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.today
    }
}

/// Game parameters derived once per run from the user's cash flow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Cadence of late-run pressure spawns in milliseconds. Always positive.
    pub spawn_interval_ms: u32,
    /// Baseline downward asteroid speed in field units per second.
    pub rock_speed: f32,
    /// Shield charges granted at run start.
    pub shields: u32,
    /// Smart bombs granted at run start.
    pub smart_bombs: u32,
    /// Duration a collected rapid-fire power-up stays active.
    pub rapid_fire_ms: u32,
    /// Normalised difficulty in `[0, 1]`; higher is harder.
    pub difficulty_factor: f32,
    /// `net / income`, absent when income is not positive.
    pub savings_rate: Option<f64>,
    /// Set when no transactions fell inside the window; runs must not start.
    pub empty: bool,
}

impl DifficultyProfile {
    /// Rapid-fire window length as a [`Duration`].
    #[must_use]
    pub fn rapid_fire(&self) -> Duration {
        Duration::from_millis(u64::from(self.rapid_fire_ms))
    }

    /// Pressure spawn cadence as a [`Duration`].
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.spawn_interval_ms.max(1)))
    }
}

/// Identifier of a spawn event, unique within a timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnId(u32);

impl SpawnId {
    /// Creates a new spawn identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned by the world to a live entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Size tier of an asteroid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AsteroidSize {
    /// Terminal tier; breaks apart without fragments.
    Small,
    /// Splits into two small asteroids.
    Medium,
    /// Splits into two medium asteroids.
    Large,
}

impl AsteroidSize {
    /// Fragments produced when an asteroid of this size is destroyed.
    #[must_use]
    pub const fn fragments(self) -> &'static [AsteroidSize] {
        match self {
            Self::Large => &[Self::Medium, Self::Medium],
            Self::Medium => &[Self::Small, Self::Small],
            Self::Small => &[],
        }
    }

    /// Projectile hits required to destroy an asteroid of this size.
    #[must_use]
    pub const fn hit_points(self) -> u32 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }

    /// Collision radius in field units.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::Small => 14.0,
            Self::Medium => 22.0,
            Self::Large => 32.0,
        }
    }

    /// Multiplier applied to the profile's rock speed. Smaller rocks fall faster.
    #[must_use]
    pub const fn speed_factor(self) -> f32 {
        match self {
            Self::Small => 1.2,
            Self::Medium => 1.0,
            Self::Large => 0.8,
        }
    }
}

/// Kind of power-up materialised from an income transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    /// Adds one shield charge.
    Shield,
    /// Adds one smart bomb.
    SmartBomb,
    /// Starts or extends the rapid-fire window.
    RapidFire,
}

impl PowerUpKind {
    /// Every power-up kind in the canonical cycling order.
    pub const ALL: [PowerUpKind; 3] = [Self::Shield, Self::SmartBomb, Self::RapidFire];
}

/// Opaque RGB color used for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Planar velocity in field units per second. Positive `y` points down.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Velocity {
    /// Creates a new velocity.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Scheduled appearance of an asteroid derived from an expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AsteroidSpawn {
    /// Identifier unique within the timeline.
    pub id: SpawnId,
    /// Simulated time offset at which the asteroid enters the field.
    pub spawn_at_ms: u64,
    /// Size tier derived from the expense amount.
    pub size: AsteroidSize,
    /// Stable color derived from the category.
    pub color: Rgb,
    /// Horizontal spawn position as a fraction of the field width.
    pub lane: f32,
    /// Initial velocity.
    pub velocity: Velocity,
    /// Hits required to destroy the asteroid.
    pub hit_points: u32,
    /// Sizes spawned when the asteroid is destroyed.
    pub fragments: Vec<AsteroidSize>,
    /// Value credited when the asteroid is cleared.
    pub amount: f64,
    /// Category of the originating expense.
    pub category: String,
    /// Description of the originating expense.
    pub description: Option<String>,
}

/// Scheduled appearance of a power-up derived from income.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawn {
    /// Identifier unique within the timeline.
    pub id: SpawnId,
    /// Simulated time offset at which the power-up enters the field.
    pub spawn_at_ms: u64,
    /// Effect granted on collection.
    pub kind: PowerUpKind,
    /// Horizontal spawn position as a fraction of the field width.
    pub lane: f32,
    /// Amount of the originating income.
    pub amount: f64,
    /// Category of the originating income.
    pub category: String,
    /// Description of the originating income.
    pub description: Option<String>,
}

/// Single scheduled entry of a run timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SpawnEvent {
    /// An expense asteroid.
    Asteroid(AsteroidSpawn),
    /// An income power-up.
    PowerUp(PowerUpSpawn),
}

impl SpawnEvent {
    /// Identifier of the event.
    #[must_use]
    pub fn id(&self) -> SpawnId {
        match self {
            Self::Asteroid(spawn) => spawn.id,
            Self::PowerUp(spawn) => spawn.id,
        }
    }

    /// Simulated time offset at which the event fires.
    #[must_use]
    pub fn spawn_at_ms(&self) -> u64 {
        match self {
            Self::Asteroid(spawn) => spawn.spawn_at_ms,
            Self::PowerUp(spawn) => spawn.spawn_at_ms,
        }
    }
}

/// Reasons a hand-assembled timeline is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// Events must be ordered by ascending spawn offset.
    #[error("event {index} fires before its predecessor")]
    OutOfOrder {
        /// Position of the offending event.
        index: usize,
    },
    /// Events must fire inside the run.
    #[error("event {index} fires at {spawn_at_ms}ms, after the run ends")]
    BeyondRun {
        /// Position of the offending event.
        index: usize,
        /// Offending spawn offset.
        spawn_at_ms: u64,
    },
}

/// Immutable, ordered sequence of spawn events covering one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<SpawnEvent>,
}

impl Timeline {
    /// Validates and wraps the provided events.
    pub fn new(events: Vec<SpawnEvent>) -> Result<Self, TimelineError> {
        let mut previous = 0;
        for (index, event) in events.iter().enumerate() {
            let spawn_at_ms = event.spawn_at_ms();
            if spawn_at_ms >= RUN_DURATION_MS {
                return Err(TimelineError::BeyondRun { index, spawn_at_ms });
            }
            if spawn_at_ms < previous {
                return Err(TimelineError::OutOfOrder { index });
            }
            previous = spawn_at_ms;
        }
        Ok(Self { events })
    }

    /// Events in firing order.
    #[must_use]
    pub fn events(&self) -> &[SpawnEvent] {
        &self.events
    }

    /// Number of scheduled events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Reports whether the timeline schedules nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterator over the scheduled asteroid spawns in firing order.
    pub fn asteroids(&self) -> impl Iterator<Item = &AsteroidSpawn> {
        self.events.iter().filter_map(|event| match event {
            SpawnEvent::Asteroid(spawn) => Some(spawn),
            SpawnEvent::PowerUp(_) => None,
        })
    }

    /// Iterator over the scheduled power-up spawns in firing order.
    pub fn power_ups(&self) -> impl Iterator<Item = &PowerUpSpawn> {
        self.events.iter().filter_map(|event| match event {
            SpawnEvent::PowerUp(spawn) => Some(spawn),
            SpawnEvent::Asteroid(_) => None,
        })
    }
}

/// Dimensions of the rectangular play field. Origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayField {
    /// Width in field units.
    pub width: f32,
    /// Height in field units.
    pub height: f32,
}

impl PlayField {
    /// Canonical portrait field.
    pub const DEFAULT: PlayField = PlayField {
        width: 480.0,
        height: 640.0,
    };

    /// Converts a lane fraction into a horizontal coordinate.
    #[must_use]
    pub fn lane_to_x(&self, lane: f32) -> f32 {
        lane.clamp(0.0, 1.0) * self.width
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// No run is active.
    Idle,
    /// A run is being simulated.
    Running,
    /// The run reached a terminal state and is frozen.
    Finished,
}

/// Reason a run finished.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The hull reached zero.
    HullFailed,
    /// The full run duration elapsed with the hull intact.
    RunComplete,
    /// An internal fault ended the run early.
    Faulted {
        /// Diagnostic describing the fault.
        message: String,
    },
}

impl RunOutcome {
    /// Player-facing message describing the outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::HullFailed => {
                "Hull destroyed! Your spending broke through the defences.".to_owned()
            }
            Self::RunComplete => "Run complete! You held the line for the full minute.".to_owned(),
            Self::Faulted { message } => format!("Run aborted: {message}"),
        }
    }
}

/// Observable resource and status record of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    /// Current lifecycle status.
    pub status: RunStatus,
    /// Simulated time elapsed since the run started.
    pub elapsed: Duration,
    /// Remaining hull points.
    pub hull: u32,
    /// Remaining shield charges.
    pub shields: u32,
    /// Remaining smart bombs.
    pub smart_bombs: u32,
    /// Time-survived bonus plus value-cleared bonus.
    pub score: f64,
    /// Total value of asteroids destroyed by projectiles or smart bombs.
    pub cleared_amount: f64,
    /// Time left on the rapid-fire window.
    pub rapid_fire_remaining: Duration,
    /// Terminal outcome, present once `status` is [`RunStatus::Finished`].
    pub outcome: Option<RunOutcome>,
}

impl RuntimeState {
    /// State reported while no run exists.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            status: RunStatus::Idle,
            elapsed: Duration::ZERO,
            hull: 0,
            shields: 0,
            smart_bombs: 0,
            score: 0.0,
            cleared_amount: 0.0,
            rapid_fire_remaining: Duration::ZERO,
            outcome: None,
        }
    }

    /// Elapsed simulated time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Reports whether the run reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == RunStatus::Finished
    }
}

/// Logical keys understood by the input controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// `A`, alternate steer left.
    A,
    /// `D`, alternate steer right.
    D,
    /// Space bar, fire.
    Space,
    /// `B`, smart bomb.
    B,
    /// Any key the controller ignores.
    Other,
}

/// Identifier distinguishing simultaneous pointers (mouse, touches).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(u64);

impl PointerId {
    /// Pointer id reserved for the mouse.
    pub const MOUSE: PointerId = PointerId(u64::MAX);

    /// Creates a new pointer identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }
}

/// Pointer button that initiated a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary button or a touch.
    Primary,
    /// Secondary button; triggers a smart bomb.
    Secondary,
}

/// Raw input delivered by the host environment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown(Key),
    /// A key was released.
    KeyUp(Key),
    /// A pointer or touch was pressed at `x`, a fraction of the field width.
    PointerDown {
        /// Pointer that was pressed.
        pointer: PointerId,
        /// Horizontal position as a fraction of the field width.
        x: f32,
        /// Button that initiated the press.
        button: PointerButton,
    },
    /// A pressed pointer moved to `x`, a fraction of the field width.
    PointerMoved {
        /// Pointer that moved.
        pointer: PointerId,
        /// Horizontal position as a fraction of the field width.
        x: f32,
    },
    /// A pointer or touch was released.
    PointerUp {
        /// Pointer that was released.
        pointer: PointerId,
    },
    /// The host lost focus; every held input is released.
    FocusLost,
}

/// Horizontal steering derived from held intents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Steering {
    /// Move toward decreasing x.
    Left,
    /// Move toward increasing x.
    Right,
    /// Hold position.
    Idle,
}

impl Steering {
    /// Signed unit direction of the steering.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Idle => 0.0,
        }
    }
}

/// Mutable intent record shared between the input controller and the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Intent {
    /// Held: steer left.
    pub left: bool,
    /// Held: steer right.
    pub right: bool,
    /// Held: keep firing.
    pub fire: bool,
    /// One-shot: detonate a smart bomb. Cleared by the engine after reading.
    pub bomb: bool,
}

impl Intent {
    /// Resolves the held steering flags. Opposing flags cancel out.
    #[must_use]
    pub const fn steering(&self) -> Steering {
        match (self.left, self.right) {
            (true, false) => Steering::Left,
            (false, true) => Steering::Right,
            _ => Steering::Idle,
        }
    }

    /// Returns the one-shot bomb flag and clears it.
    pub fn take_bomb(&mut self) -> bool {
        std::mem::replace(&mut self.bomb, false)
    }
}

/// Whether an asteroid struck the ship or slipped past the bottom edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImpactCause {
    /// The asteroid overlapped the ship.
    Collision,
    /// The asteroid crossed the bottom boundary.
    Escaped,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock and decays transient counters.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Materialises an asteroid at its deterministic spawn position.
    SpawnAsteroid {
        /// Spawn description.
        spawn: AsteroidSpawn,
    },
    /// Materialises a power-up at its deterministic spawn position.
    SpawnPowerUp {
        /// Spawn description.
        spawn: PowerUpSpawn,
    },
    /// Moves the ship horizontally, clamped to the field.
    SteerShip {
        /// Requested direction.
        steering: Steering,
        /// Duration the steering was held for.
        dt: Duration,
    },
    /// Consumes a smart bomb, if available, clearing every live asteroid.
    DetonateSmartBomb,
    /// Launches a projectile from the ship's nose.
    FireProjectile,
    /// Integrates motion of every live entity.
    Integrate {
        /// Duration to integrate over.
        dt: Duration,
        /// Multiplier applied to asteroid and power-up motion.
        speed_scale: f32,
    },
    /// Removes off-field projectiles and resolves asteroid impacts on the ship.
    ResolveHazards,
    /// Resolves projectile and asteroid overlaps.
    ResolveProjectileHits,
    /// Resolves ship and power-up overlaps.
    CollectPowerUps,
    /// Recomputes the score and checks terminal conditions.
    Settle,
    /// Ends the run with a fault diagnostic.
    Abort {
        /// Diagnostic describing the fault.
        message: String,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Total simulated time after the tick.
        elapsed: Duration,
    },
    /// Confirms that an asteroid entered the field.
    AsteroidSpawned {
        /// Identifier assigned to the live asteroid.
        asteroid: EntityId,
        /// Size tier of the asteroid.
        size: AsteroidSize,
    },
    /// Confirms that a power-up entered the field.
    PowerUpSpawned {
        /// Identifier assigned to the live power-up.
        power_up: EntityId,
        /// Kind of the power-up.
        kind: PowerUpKind,
    },
    /// Confirms that a smart bomb cleared the field.
    SmartBombDetonated {
        /// Number of asteroids cleared.
        cleared: u32,
        /// Total value credited.
        value: f64,
    },
    /// Reports a bomb request that found no smart bombs left.
    SmartBombUnavailable,
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: EntityId,
    },
    /// Reports a projectile hit that did not destroy the asteroid.
    AsteroidDamaged {
        /// Asteroid that was hit.
        asteroid: EntityId,
        /// Hits still required to destroy it.
        remaining: u32,
    },
    /// Reports an asteroid destroyed by a projectile.
    AsteroidDestroyed {
        /// Asteroid that was destroyed.
        asteroid: EntityId,
        /// Value credited for the asteroid.
        amount: f64,
        /// Number of fragments spawned in its place.
        fragments: u32,
    },
    /// Reports an asteroid that struck the ship or escaped the field.
    HazardImpact {
        /// Asteroid that caused the impact.
        asteroid: EntityId,
        /// How the impact happened.
        cause: ImpactCause,
        /// Whether a shield charge absorbed the hit.
        absorbed: bool,
    },
    /// Confirms that the ship collected a power-up.
    PowerUpCollected {
        /// Power-up that was collected.
        power_up: EntityId,
        /// Kind of the power-up.
        kind: PowerUpKind,
    },
    /// Reports a power-up that left the field uncollected.
    PowerUpMissed {
        /// Power-up that was missed.
        power_up: EntityId,
    },
    /// Announces that the run reached a terminal state.
    RunFinished {
        /// Reason the run finished.
        outcome: RunOutcome,
    },
}

/// Raised when a run cannot start.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StartError {
    /// No qualifying transactions fall inside the selected window.
    #[error("no transactions fall within the lookback window")]
    DataUnavailable,
    /// The generated timeline violated its ordering rules.
    #[error("timeline rejected: {0}")]
    InvalidTimeline(#[from] TimelineError),
    /// The gameplay tuning failed validation.
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

/// Invariant violation detected while simulating a frame.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RuntimeFault {
    /// An entity acquired a non-finite coordinate.
    #[error("{entity} {id} has a non-finite position")]
    NonFinitePosition {
        /// Kind of entity.
        entity: &'static str,
        /// Numeric entity identifier.
        id: u32,
    },
    /// A resource counter moved in a forbidden direction.
    #[error("{resource} moved from {before} to {after}")]
    ResourceRegression {
        /// Name of the resource.
        resource: &'static str,
        /// Value before the frame.
        before: f64,
        /// Value after the frame.
        after: f64,
    },
    /// The timeline cursor observed events out of order.
    #[error("spawn {id} scheduled at {spawn_at_ms}ms precedes the cursor at {cursor_ms}ms")]
    TimelineRegression {
        /// Offending spawn identifier.
        id: u32,
        /// Offending spawn offset.
        spawn_at_ms: u64,
        /// Cursor offset when the event was observed.
        cursor_ms: u64,
    },
}
