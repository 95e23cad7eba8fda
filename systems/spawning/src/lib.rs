#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting spawn commands.
//!
//! The system walks the run's immutable [`Timeline`] with a cursor, emitting
//! every event whose offset has been reached. Once the late-run threshold is
//! crossed it additionally emits zero-value pressure asteroids at the profile's
//! spawn cadence.

use std::time::Duration;

use savings_arcade_core::{
    AsteroidSize, AsteroidSpawn, Command, Event, Rgb, RuntimeFault, SpawnEvent, SpawnId, Timeline,
    Velocity, RUN_DURATION,
};

const RNG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const RNG_INCREMENT: u64 = 1;
const PRESSURE_LANE_MIN: f32 = 0.08;
const PRESSURE_LANE_SPAN: f32 = 0.84;
const PRESSURE_CATEGORY: &str = "Pressure";
const PRESSURE_COLOR: Rgb = Rgb::new(0x78, 0x78, 0x78);

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rock_speed: f32,
    pressure_start: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `spawn_interval` is the pressure cadence, `rock_speed` the base fall
    /// speed of pressure asteroids and `pressure_start` the elapsed time at
    /// which the pressure ramp begins.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        rock_speed: f32,
        pressure_start: Duration,
        rng_seed: u64,
    ) -> Self {
        Self {
            spawn_interval,
            rock_speed,
            pressure_start,
            rng_seed,
        }
    }
}

/// Pure system that emits timeline and pressure spawn commands.
#[derive(Debug)]
pub struct Spawning {
    timeline: Timeline,
    cursor: usize,
    cursor_ms: u64,
    spawn_interval: Duration,
    rock_speed: f32,
    pressure_start: Duration,
    accumulator: Duration,
    rng_state: u64,
    categories: Vec<(String, Rgb)>,
    category_index: usize,
    next_pressure_id: u32,
}

impl Spawning {
    /// Creates a new spawning system that replays the provided timeline.
    #[must_use]
    pub fn new(timeline: Timeline, config: Config) -> Self {
        let mut categories: Vec<(String, Rgb)> = Vec::new();
        for spawn in timeline.asteroids() {
            if !categories.iter().any(|(name, _)| *name == spawn.category) {
                categories.push((spawn.category.clone(), spawn.color));
            }
        }
        let next_pressure_id = u32::try_from(timeline.len()).unwrap_or(u32::MAX);

        Self {
            timeline,
            cursor: 0,
            cursor_ms: 0,
            spawn_interval: config.spawn_interval,
            rock_speed: config.rock_speed,
            pressure_start: config.pressure_start,
            accumulator: Duration::ZERO,
            rng_state: config.rng_seed,
            categories,
            category_index: 0,
            next_pressure_id,
        }
    }

    /// Number of timeline events that have not fired yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timeline.len() - self.cursor
    }

    /// Consumes events to emit spawn commands.
    ///
    /// Fails when the timeline cursor would move backwards in time.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) -> Result<(), RuntimeFault> {
        for event in events {
            if let Event::TimeAdvanced { dt, elapsed } = event {
                self.release_due(*elapsed, out)?;
                self.accumulate_pressure(*dt, *elapsed);
                let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                for _ in 0..self.resolve_spawn_attempts() {
                    let spawn = self.next_pressure_asteroid(elapsed_ms);
                    out.push(Command::SpawnAsteroid { spawn });
                }
            }
        }
        Ok(())
    }

    fn release_due(&mut self, elapsed: Duration, out: &mut Vec<Command>) -> Result<(), RuntimeFault> {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        while let Some(event) = self.timeline.events().get(self.cursor) {
            let spawn_at_ms = event.spawn_at_ms();
            if spawn_at_ms > elapsed_ms {
                break;
            }
            if spawn_at_ms < self.cursor_ms {
                return Err(RuntimeFault::TimelineRegression {
                    id: event.id().get(),
                    spawn_at_ms,
                    cursor_ms: self.cursor_ms,
                });
            }

            out.push(match event.clone() {
                SpawnEvent::Asteroid(spawn) => Command::SpawnAsteroid { spawn },
                SpawnEvent::PowerUp(spawn) => Command::SpawnPowerUp { spawn },
            });
            self.cursor_ms = spawn_at_ms;
            self.cursor += 1;
        }
        Ok(())
    }

    fn accumulate_pressure(&mut self, dt: Duration, elapsed: Duration) {
        let previous = elapsed.saturating_sub(dt).min(RUN_DURATION);
        let elapsed = elapsed.min(RUN_DURATION);
        let active_from = previous.max(self.pressure_start);
        if elapsed > active_from {
            self.accumulator = self.accumulator.saturating_add(elapsed - active_from);
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        if self.spawn_interval.is_zero() {
            return 0;
        }

        let interval = self.spawn_interval.as_nanos();
        let pending = self.accumulator.as_nanos();
        let remainder = u64::try_from(pending % interval).unwrap_or(u64::MAX);
        self.accumulator = Duration::from_nanos(remainder);
        usize::try_from(pending / interval).unwrap_or(usize::MAX)
    }

    fn next_pressure_asteroid(&mut self, elapsed_ms: u64) -> AsteroidSpawn {
        let (category, color) = self.next_category();
        let roll = (self.advance_rng() >> 40) as f32 / (1_u64 << 24) as f32;
        let size = AsteroidSize::Small;
        let id = SpawnId::new(self.next_pressure_id);
        self.next_pressure_id = self.next_pressure_id.saturating_add(1);

        AsteroidSpawn {
            id,
            spawn_at_ms: elapsed_ms,
            size,
            color,
            lane: PRESSURE_LANE_MIN + PRESSURE_LANE_SPAN * roll,
            velocity: Velocity::new(0.0, self.rock_speed * size.speed_factor()),
            hit_points: size.hit_points(),
            fragments: Vec::new(),
            amount: 0.0,
            category,
            description: None,
        }
    }

    fn next_category(&mut self) -> (String, Rgb) {
        if self.categories.is_empty() {
            return (PRESSURE_CATEGORY.to_owned(), PRESSURE_COLOR);
        }
        let entry = self.categories[self.category_index % self.categories.len()].clone();
        self.category_index = (self.category_index + 1) % self.categories.len();
        entry
    }

    fn advance_rng(&mut self) -> u64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(RNG_MULTIPLIER)
            .wrapping_add(RNG_INCREMENT);
        self.rng_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_spawn_attempts_without_interval() {
        let config = Config::new(Duration::ZERO, 90.0, Duration::ZERO, 1);
        let mut spawning = Spawning::new(Timeline::default(), config);
        spawning.accumulator = Duration::from_secs(10);
        assert_eq!(spawning.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn pressure_only_accumulates_past_the_threshold() {
        let config = Config::new(
            Duration::from_millis(500),
            90.0,
            Duration::from_secs(30),
            1,
        );
        let mut spawning = Spawning::new(Timeline::default(), config);
        spawning.accumulate_pressure(Duration::from_secs(1), Duration::from_millis(30_400));
        assert_eq!(spawning.accumulator, Duration::from_millis(400));
    }

    #[test]
    fn pressure_stops_accumulating_at_the_end_of_the_run() {
        let config = Config::new(
            Duration::from_millis(500),
            90.0,
            Duration::from_secs(30),
            1,
        );
        let mut spawning = Spawning::new(Timeline::default(), config);
        spawning.accumulate_pressure(Duration::from_secs(3_600), Duration::from_secs(3_600));
        assert_eq!(spawning.accumulator, Duration::from_secs(30));

        spawning.accumulate_pressure(Duration::from_secs(1), Duration::from_secs(3_601));
        assert_eq!(spawning.accumulator, Duration::from_secs(30));
    }

    #[test]
    fn spawn_attempts_keep_the_remainder() {
        let config = Config::new(Duration::from_millis(300), 90.0, Duration::ZERO, 1);
        let mut spawning = Spawning::new(Timeline::default(), config);
        spawning.accumulator = Duration::from_millis(1_000);

        assert_eq!(spawning.resolve_spawn_attempts(), 3);
        assert_eq!(spawning.accumulator, Duration::from_millis(100));
        assert_eq!(spawning.resolve_spawn_attempts(), 0);
    }

    #[test]
    fn oversized_frames_emit_only_in_run_pressure() {
        let config = Config::new(
            Duration::from_millis(500),
            90.0,
            Duration::from_secs(30),
            1,
        );
        let mut spawning = Spawning::new(Timeline::default(), config);
        let mut out = Vec::new();
        let events = [Event::TimeAdvanced {
            dt: Duration::from_secs(86_400),
            elapsed: Duration::from_secs(86_400),
        }];

        spawning.handle(&events, &mut out).expect("no fault");

        assert_eq!(out.len(), 60);
    }

    #[test]
    fn pressure_lanes_stay_inside_the_field() {
        let config = Config::new(Duration::from_millis(1), 90.0, Duration::ZERO, 7);
        let mut spawning = Spawning::new(Timeline::default(), config);
        for _ in 0..256 {
            let spawn = spawning.next_pressure_asteroid(0);
            assert!((0.08..=0.92).contains(&spawn.lane));
            assert_eq!(spawn.amount, 0.0);
            assert_eq!(spawn.category, PRESSURE_CATEGORY);
        }
    }
}
