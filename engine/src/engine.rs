//! Runtime engine that advances a single run frame by frame.

use std::time::Duration;

use savings_arcade_core::{
    Command, DifficultyProfile, Event, Intent, RunOutcome, RunStatus, RuntimeFault, RuntimeState,
    StartError, Timeline,
};
use savings_arcade_system_spawning::{Config as SpawningConfig, Spawning};
use savings_arcade_system_weapons::Weapons;
use savings_arcade_world::{self as world, query, Loadout, RunTally, World};

use crate::{snapshot::SnapshotThrottle, tuning::Tuning};

/// Final report of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Why the run ended, if it has ended.
    pub outcome: Option<RunOutcome>,
    /// Final score.
    pub score: f64,
    /// Total value of asteroids cleared.
    pub cleared_amount: f64,
    /// Simulated time the run lasted.
    pub elapsed: Duration,
    /// Asteroids destroyed by projectiles or smart bombs.
    pub asteroids_destroyed: u32,
    /// Power-ups collected.
    pub power_ups_collected: u32,
    /// Projectiles fired.
    pub shots_fired: u32,
    /// Whether the score beat the previously recorded best.
    pub new_best: bool,
}

/// Owns all mutable state of one run and advances it with [`RuntimeEngine::tick`].
#[derive(Debug)]
pub struct RuntimeEngine {
    world: World,
    spawning: Spawning,
    weapons: Weapons,
    throttle: SnapshotThrottle,
    tuning: Tuning,
    profile: DifficultyProfile,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl RuntimeEngine {
    /// Creates a running engine for the provided profile and timeline.
    ///
    /// Fails with [`StartError::InvalidTuning`] when the tuning is out of
    /// range, and with [`StartError::DataUnavailable`] when the profile is
    /// flagged empty or the timeline schedules nothing.
    pub fn new(
        profile: DifficultyProfile,
        timeline: Timeline,
        tuning: &Tuning,
    ) -> Result<Self, StartError> {
        tuning
            .validate()
            .map_err(|error| StartError::InvalidTuning(error.to_string()))?;
        if profile.empty || timeline.is_empty() {
            return Err(StartError::DataUnavailable);
        }

        let loadout = Loadout {
            hull: tuning.starting_hull,
            shields: profile.shields,
            smart_bombs: profile.smart_bombs,
            rapid_fire: profile.rapid_fire(),
        };
        let spawning = Spawning::new(
            timeline,
            SpawningConfig::new(
                profile.spawn_interval(),
                profile.rock_speed,
                tuning.pressure_start(),
                tuning.pressure_seed,
            ),
        );

        let mut engine = Self {
            world: World::new(tuning.world_config(), loadout),
            spawning,
            weapons: Weapons::new(tuning.weapons_config()),
            throttle: SnapshotThrottle::new(tuning.snapshot_interval()),
            tuning: tuning.clone(),
            profile,
            events: Vec::new(),
            commands: Vec::new(),
        };
        let initial = engine.state();
        let _ = engine.throttle.offer(&initial, Duration::ZERO);
        Ok(engine)
    }

    /// Advances the run by `dt` of simulated time, reading and clearing one-shot intents.
    ///
    /// Never fails: an invariant violation ends the run with a
    /// [`RunOutcome::Faulted`] outcome while keeping the accumulated score.
    /// Calls after the run finished return the frozen state unchanged.
    pub fn tick(&mut self, dt: Duration, intent: &mut Intent) -> RuntimeState {
        let before = self.state();
        if before.status != RunStatus::Running {
            return before;
        }

        if let Err(fault) = self.step(dt, intent).and_then(|()| self.check_invariants(&before)) {
            tracing::warn!(%fault, elapsed_ms = before.elapsed_ms(), "aborting run after fault");
            world::apply(
                &mut self.world,
                Command::Abort {
                    message: fault.to_string(),
                },
                &mut self.events,
            );
        }

        let after = self.state();
        if let Some(outcome) = after.outcome.as_ref().filter(|_| after.is_finished()) {
            tracing::info!(
                outcome = %outcome.message(),
                score = after.score,
                cleared = after.cleared_amount,
                elapsed_ms = after.elapsed_ms(),
                "run finished"
            );
        }
        let _ = self.throttle.offer(&after, dt);
        after
    }

    fn step(&mut self, dt: Duration, intent: &mut Intent) -> Result<(), RuntimeFault> {
        self.events.clear();
        self.commands.clear();

        self.apply(Command::Tick { dt });
        let tick_events = std::mem::take(&mut self.events);

        self.spawning.handle(&tick_events, &mut self.commands)?;
        self.flush_commands();

        self.apply(Command::SteerShip {
            steering: intent.steering(),
            dt,
        });

        if intent.take_bomb() {
            self.apply(Command::DetonateSmartBomb);
        }

        let rapid_fire_active = query::rapid_fire_active(&self.world);
        self.weapons
            .handle(&tick_events, intent.fire, rapid_fire_active, &mut self.commands);
        self.flush_commands();

        let speed_scale = self.tuning.speed_scale(query::runtime_state(&self.world).elapsed);
        self.apply(Command::Integrate { dt, speed_scale });
        self.apply(Command::ResolveHazards);
        self.apply(Command::ResolveProjectileHits);
        self.apply(Command::CollectPowerUps);
        self.apply(Command::Settle);
        Ok(())
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn flush_commands(&mut self) {
        for command in std::mem::take(&mut self.commands) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn check_invariants(&self, before: &RuntimeState) -> Result<(), RuntimeFault> {
        let ship = query::ship(&self.world);
        if !ship.position.is_finite() {
            return Err(RuntimeFault::NonFinitePosition { entity: "ship", id: 0 });
        }
        if let Some(asteroid) = query::asteroids(&self.world)
            .into_iter()
            .find(|asteroid| !asteroid.position.is_finite())
        {
            return Err(RuntimeFault::NonFinitePosition {
                entity: "asteroid",
                id: asteroid.id.get(),
            });
        }
        if let Some(projectile) = query::projectiles(&self.world)
            .into_iter()
            .find(|projectile| !projectile.position.is_finite())
        {
            return Err(RuntimeFault::NonFinitePosition {
                entity: "projectile",
                id: projectile.id.get(),
            });
        }
        if let Some(power_up) = query::power_ups(&self.world)
            .into_iter()
            .find(|power_up| !power_up.position.is_finite())
        {
            return Err(RuntimeFault::NonFinitePosition {
                entity: "power-up",
                id: power_up.id.get(),
            });
        }

        let after = query::runtime_state(&self.world);
        if !(after.score >= before.score) {
            return Err(RuntimeFault::ResourceRegression {
                resource: "score",
                before: before.score,
                after: after.score,
            });
        }
        if !(after.cleared_amount >= before.cleared_amount) {
            return Err(RuntimeFault::ResourceRegression {
                resource: "cleared amount",
                before: before.cleared_amount,
                after: after.cleared_amount,
            });
        }
        if after.hull > before.hull {
            return Err(RuntimeFault::ResourceRegression {
                resource: "hull",
                before: f64::from(before.hull),
                after: f64::from(after.hull),
            });
        }
        Ok(())
    }

    /// Current observable state.
    #[must_use]
    pub fn state(&self) -> RuntimeState {
        query::runtime_state(&self.world)
    }

    /// Takes the latest throttled snapshot, if a new one was published.
    pub fn take_snapshot(&mut self) -> Option<RuntimeState> {
        self.throttle.take()
    }

    /// Read-only access to the world for presentation queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Difficulty profile the run was started with.
    #[must_use]
    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Timeline events that have not fired yet.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawning.pending()
    }

    /// Counters describing the run so far.
    #[must_use]
    pub fn tally(&self) -> RunTally {
        query::tally(&self.world)
    }

    /// Summary of the run so far. `new_best` is left unset.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let state = self.state();
        let tally = self.tally();
        RunSummary {
            outcome: state.outcome,
            score: state.score,
            cleared_amount: state.cleared_amount,
            elapsed: state.elapsed,
            asteroids_destroyed: tally.asteroids_destroyed,
            power_ups_collected: tally.power_ups_collected,
            shots_fired: tally.shots_fired,
            new_best: false,
        }
    }
}
