#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands while fire is held.

use std::time::Duration;

use savings_arcade_core::{Command, Event};

/// Cooldowns that govern the ship's rate of fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    cooldown: Duration,
    rapid_fire_cooldown: Duration,
}

impl Config {
    /// Creates a configuration from the normal and rapid-fire cooldowns.
    #[must_use]
    pub const fn new(cooldown: Duration, rapid_fire_cooldown: Duration) -> Self {
        Self {
            cooldown,
            rapid_fire_cooldown,
        }
    }
}

/// Weapons system that tracks the shot timer and queues firing commands.
#[derive(Debug)]
pub struct Weapons {
    config: Config,
    since_last_shot: Option<Duration>,
}

impl Weapons {
    /// Creates a weapons system that may fire immediately.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            since_last_shot: None,
        }
    }

    /// Cooldown in effect for the provided rapid-fire state.
    #[must_use]
    pub fn cooldown(&self, rapid_fire_active: bool) -> Duration {
        if rapid_fire_active {
            self.config.rapid_fire_cooldown
        } else {
            self.config.cooldown
        }
    }

    /// Advances the shot timer and emits `Command::FireProjectile` when ready.
    pub fn handle(
        &mut self,
        events: &[Event],
        fire_held: bool,
        rapid_fire_active: bool,
        out: &mut Vec<Command>,
    ) {
        if let Some(since) = self.since_last_shot.as_mut() {
            for event in events {
                if let Event::TimeAdvanced { dt, .. } = event {
                    *since = since.saturating_add(*dt);
                }
            }
        }

        if !fire_held {
            return;
        }

        let cooldown = self.cooldown(rapid_fire_active);
        let ready = self
            .since_last_shot
            .map_or(true, |since| since >= cooldown);
        if ready {
            out.push(Command::FireProjectile);
            self.since_last_shot = Some(Duration::ZERO);
        }
    }
}
