//! Scripted pilot used for headless runs.
//!
//! The pilot holds fire for the whole run, steers toward the asteroid closest
//! to the ship's line and drops a smart bomb whenever the field gets crowded.
//! It only emits [`InputEvent`]s, so it drives the arcade exactly like a
//! player would.

use std::time::Duration;

use anyhow::{bail, Result};
use savings_arcade_core::{InputEvent, Key, LookbackWindow, TransactionRecord, RUN_DURATION};
use savings_arcade_engine::{Arcade, RunSummary};
use savings_arcade_persistence::ScoreStorage;
use savings_arcade_world::{query, World};

/// Live asteroid count at which the pilot detonates a smart bomb.
const CROWDED: usize = 4;
/// Horizontal distance within which the pilot stops steering.
const DEAD_ZONE: f32 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Held {
    Left,
    Right,
    Nothing,
}

impl Held {
    fn key(self) -> Option<Key> {
        match self {
            Self::Left => Some(Key::ArrowLeft),
            Self::Right => Some(Key::ArrowRight),
            Self::Nothing => None,
        }
    }
}

/// Deterministic input script reacting to the world each frame.
#[derive(Debug)]
pub(crate) struct Autopilot {
    firing: bool,
    held: Held,
}

impl Autopilot {
    pub(crate) fn new() -> Self {
        Self {
            firing: false,
            held: Held::Nothing,
        }
    }

    /// Input events for the next frame given the current world.
    pub(crate) fn inputs(&mut self, world: &World) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if !self.firing {
            self.firing = true;
            events.push(InputEvent::KeyDown(Key::Space));
        }

        let ship = query::ship(world);
        let asteroids = query::asteroids(world);
        let target = asteroids
            .iter()
            .filter(|asteroid| asteroid.position.y < ship.position.y)
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y));

        let wanted = match target {
            Some(asteroid) if asteroid.position.x < ship.position.x - DEAD_ZONE => Held::Left,
            Some(asteroid) if asteroid.position.x > ship.position.x + DEAD_ZONE => Held::Right,
            _ => Held::Nothing,
        };
        if wanted != self.held {
            if let Some(key) = self.held.key() {
                events.push(InputEvent::KeyUp(key));
            }
            if let Some(key) = wanted.key() {
                events.push(InputEvent::KeyDown(key));
            }
            self.held = wanted;
        }

        if asteroids.len() >= CROWDED && query::runtime_state(world).smart_bombs > 0 {
            events.push(InputEvent::KeyDown(Key::B));
            events.push(InputEvent::KeyUp(Key::B));
        }

        events
    }
}

/// Plays one full run with the autopilot at a fixed frame delta.
pub(crate) fn play<S: ScoreStorage>(
    arcade: &mut Arcade<S>,
    transactions: &[TransactionRecord],
    window: LookbackWindow,
    frame: Duration,
) -> Result<RunSummary> {
    if frame.is_zero() {
        bail!("frame delta must be positive");
    }
    arcade.start(transactions, window)?;

    let mut pilot = Autopilot::new();
    let frame_budget = RUN_DURATION.as_nanos() / frame.as_nanos() + 2;
    for _ in 0..frame_budget {
        let events = arcade
            .engine()
            .map(|engine| pilot.inputs(engine.world()))
            .unwrap_or_default();
        for event in events {
            arcade.handle_input(event);
        }
        if arcade.tick(frame).is_finished() {
            break;
        }
    }

    match arcade.summary() {
        Some(summary) if summary.outcome.is_some() => Ok(summary),
        _ => bail!("run did not finish within {frame_budget} frames"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use savings_arcade_engine::Tuning;
    use savings_arcade_persistence::MemoryStorage;
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    const FRAME: Duration = Duration::from_millis(16);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date")
    }

    fn window() -> LookbackWindow {
        LookbackWindow::new(today(), 30)
    }

    fn fingerprint(summary: &RunSummary) -> u64 {
        let mut hasher = DefaultHasher::new();
        summary.outcome.hash(&mut hasher);
        summary.score.to_bits().hash(&mut hasher);
        summary.cleared_amount.to_bits().hash(&mut hasher);
        summary.elapsed.hash(&mut hasher);
        summary.asteroids_destroyed.hash(&mut hasher);
        summary.power_ups_collected.hash(&mut hasher);
        summary.shots_fired.hash(&mut hasher);
        hasher.finish()
    }

    fn autopilot_run() -> RunSummary {
        let mut arcade = Arcade::new(Tuning::default(), MemoryStorage::new());
        play(&mut arcade, &crate::ledger::demo(today()), window(), FRAME).expect("run finishes")
    }

    #[test]
    fn autopilot_finishes_the_demo_run() {
        let summary = autopilot_run();

        assert!(summary.outcome.is_some());
        assert!(summary.shots_fired > 0);
        assert!(summary.new_best || summary.score == 0.0);
    }

    #[test]
    fn autopilot_replays_are_identical() {
        let first = autopilot_run();
        let second = autopilot_run();

        assert_eq!(first, second);
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn play_rejects_a_zero_frame_delta() {
        let mut arcade = Arcade::new(Tuning::default(), MemoryStorage::new());

        let error = play(&mut arcade, &crate::ledger::demo(today()), window(), Duration::ZERO)
            .expect_err("zero frame delta");

        assert!(error.to_string().contains("frame delta"));
    }

    #[test]
    fn play_surfaces_missing_data() {
        let mut arcade = Arcade::new(Tuning::default(), MemoryStorage::new());

        let result = play(&mut arcade, &[], window(), FRAME);

        assert!(result.is_err());
        assert!(arcade.engine().is_none());
    }

    #[test]
    fn pilot_presses_fire_once() {
        let arcade = {
            let mut arcade = Arcade::new(Tuning::default(), MemoryStorage::new());
            arcade
                .start(&crate::ledger::demo(today()), window())
                .expect("run starts");
            arcade
        };
        let world = arcade.engine().expect("engine").world();
        let mut pilot = Autopilot::new();

        let first = pilot.inputs(world);
        let second = pilot.inputs(world);

        assert!(first.contains(&InputEvent::KeyDown(Key::Space)));
        assert!(!second.contains(&InputEvent::KeyDown(Key::Space)));
    }
}
