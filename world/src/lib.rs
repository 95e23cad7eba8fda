#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Savings Arcade.
//!
//! The world owns every live entity of a run together with the resource
//! counters. It is mutated exclusively through [`apply`], which executes a
//! single [`Command`] and reports what happened as [`Event`] values. Once the
//! run is finished every command becomes a no-op, freezing the observable
//! state.

mod entities;

use std::time::Duration;

use glam::Vec2;
use savings_arcade_core::{
    AsteroidSpawn, Command, EntityId, Event, ImpactCause, PlayField, PowerUpKind, PowerUpSpawn,
    RunOutcome, RunStatus, Steering, RUN_DURATION,
};

use entities::{circles_overlap, Asteroid, PowerUp, Projectile, Ship};

/// Geometry and motion constants the world simulates with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// Dimensions of the play field.
    pub field: PlayField,
    /// Collision radius of the ship.
    pub ship_radius: f32,
    /// Horizontal ship speed in units per second.
    pub ship_speed: f32,
    /// Distance between the ship's centre and the bottom edge.
    pub ship_offset: f32,
    /// Upward projectile speed in units per second.
    pub projectile_speed: f32,
    /// Collision radius of projectiles.
    pub projectile_radius: f32,
    /// Collision radius of power-ups.
    pub power_up_radius: f32,
    /// Downward power-up speed in units per second.
    pub power_up_speed: f32,
    /// Lateral speed fragments gain when an asteroid splits.
    pub fragment_lateral_speed: f32,
    /// Highlight applied to an asteroid that survives a hit.
    pub asteroid_flash: Duration,
    /// Highlight applied to the ship after an impact.
    pub ship_flash: Duration,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            field: PlayField::DEFAULT,
            ship_radius: 16.0,
            ship_speed: 320.0,
            ship_offset: 56.0,
            projectile_speed: 560.0,
            projectile_radius: 3.0,
            power_up_radius: 12.0,
            power_up_speed: 110.0,
            fragment_lateral_speed: 60.0,
            asteroid_flash: Duration::from_millis(120),
            ship_flash: Duration::from_millis(400),
        }
    }
}

/// Resources granted to the player when a run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loadout {
    /// Starting hull points.
    pub hull: u32,
    /// Starting shield charges.
    pub shields: u32,
    /// Starting smart bombs.
    pub smart_bombs: u32,
    /// Rapid-fire time granted per collected power-up.
    pub rapid_fire: Duration,
}

/// Counters describing what happened during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RunTally {
    /// Asteroids destroyed by projectiles or smart bombs.
    pub asteroids_destroyed: u32,
    /// Power-ups the ship collected.
    pub power_ups_collected: u32,
    /// Projectiles launched.
    pub shots_fired: u32,
    /// Impacts absorbed by shields.
    pub shield_absorbs: u32,
    /// Impacts that damaged the hull.
    pub hull_hits: u32,
}

/// Represents the authoritative Savings Arcade world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    rapid_fire_grant: Duration,
    status: RunStatus,
    outcome: Option<RunOutcome>,
    elapsed: Duration,
    hull: u32,
    shields: u32,
    smart_bombs: u32,
    score: f64,
    cleared_amount: f64,
    rapid_fire_remaining: Duration,
    ship: Ship,
    asteroids: Vec<Asteroid>,
    projectiles: Vec<Projectile>,
    power_ups: Vec<PowerUp>,
    next_entity_id: u32,
    tally: RunTally,
}

impl World {
    /// Creates a running world with the ship centred near the bottom edge.
    #[must_use]
    pub fn new(config: WorldConfig, loadout: Loadout) -> Self {
        let ship = Ship {
            position: Vec2::new(
                config.field.width * 0.5,
                config.field.height - config.ship_offset,
            ),
            radius: config.ship_radius,
            flash: Duration::ZERO,
        };

        Self {
            config,
            rapid_fire_grant: loadout.rapid_fire,
            status: RunStatus::Running,
            outcome: None,
            elapsed: Duration::ZERO,
            hull: loadout.hull,
            shields: loadout.shields,
            smart_bombs: loadout.smart_bombs,
            score: 0.0,
            cleared_amount: 0.0,
            rapid_fire_remaining: Duration::ZERO,
            ship,
            asteroids: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            next_entity_id: 0,
            tally: RunTally::default(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    fn spawn_asteroid(&mut self, spawn: AsteroidSpawn, out_events: &mut Vec<Event>) {
        let id = self.allocate_id();
        let radius = spawn.size.radius();
        let asteroid = Asteroid {
            id,
            size: spawn.size,
            color: spawn.color,
            position: Vec2::new(self.config.field.lane_to_x(spawn.lane), -radius),
            velocity: Vec2::new(spawn.velocity.x, spawn.velocity.y),
            radius,
            hit_points: spawn.hit_points.max(1),
            fragments: spawn.fragments,
            amount: spawn.amount,
            category: spawn.category,
            flash: Duration::ZERO,
        };
        self.asteroids.push(asteroid);
        out_events.push(Event::AsteroidSpawned {
            asteroid: id,
            size: spawn.size,
        });
    }

    fn spawn_power_up(&mut self, spawn: PowerUpSpawn, out_events: &mut Vec<Event>) {
        let id = self.allocate_id();
        let radius = self.config.power_up_radius;
        self.power_ups.push(PowerUp {
            id,
            kind: spawn.kind,
            position: Vec2::new(self.config.field.lane_to_x(spawn.lane), -radius),
            velocity: Vec2::new(0.0, self.config.power_up_speed),
            radius,
            amount: spawn.amount,
            category: spawn.category,
        });
        out_events.push(Event::PowerUpSpawned {
            power_up: id,
            kind: spawn.kind,
        });
    }

    fn steer_ship(&mut self, steering: Steering, dt: Duration) {
        let travel = steering.sign() * self.config.ship_speed * dt.as_secs_f32();
        let min_x = self.ship.radius;
        let max_x = (self.config.field.width - self.ship.radius).max(min_x);
        self.ship.position.x = (self.ship.position.x + travel).clamp(min_x, max_x);
    }

    fn detonate_smart_bomb(&mut self, out_events: &mut Vec<Event>) {
        if self.smart_bombs == 0 {
            out_events.push(Event::SmartBombUnavailable);
            return;
        }

        self.smart_bombs -= 1;
        let cleared = self.asteroids.len();
        let value: f64 = self.asteroids.drain(..).map(|asteroid| asteroid.amount).sum();
        self.cleared_amount += value;
        let cleared = u32::try_from(cleared).unwrap_or(u32::MAX);
        self.tally.asteroids_destroyed = self.tally.asteroids_destroyed.saturating_add(cleared);
        out_events.push(Event::SmartBombDetonated { cleared, value });
    }

    fn fire_projectile(&mut self, out_events: &mut Vec<Event>) {
        let id = self.allocate_id();
        let radius = self.config.projectile_radius;
        let nose = self.ship.position - Vec2::new(0.0, self.ship.radius + radius);
        self.projectiles.push(Projectile {
            id,
            position: nose,
            velocity: Vec2::new(0.0, -self.config.projectile_speed),
            radius,
        });
        self.tally.shots_fired = self.tally.shots_fired.saturating_add(1);
        out_events.push(Event::ProjectileFired { projectile: id });
    }

    fn integrate(&mut self, dt: Duration, speed_scale: f32) {
        let seconds = dt.as_secs_f32();
        let scaled = seconds * speed_scale.max(0.0);
        let width = self.config.field.width;

        for projectile in &mut self.projectiles {
            projectile.position += projectile.velocity * seconds;
        }

        for asteroid in &mut self.asteroids {
            asteroid.position += asteroid.velocity * scaled;
            if asteroid.position.x < asteroid.radius {
                asteroid.position.x = asteroid.radius;
                asteroid.velocity.x = asteroid.velocity.x.abs();
            } else if asteroid.position.x > width - asteroid.radius {
                asteroid.position.x = width - asteroid.radius;
                asteroid.velocity.x = -asteroid.velocity.x.abs();
            }
        }

        for power_up in &mut self.power_ups {
            power_up.position += power_up.velocity * scaled;
        }
    }

    fn resolve_hazards(&mut self, out_events: &mut Vec<Event>) {
        self.projectiles
            .retain(|projectile| projectile.position.y + projectile.radius >= 0.0);

        let height = self.config.field.height;
        let ship_position = self.ship.position;
        let ship_radius = self.ship.radius;
        let mut impacts = Vec::new();
        self.asteroids.retain(|asteroid| {
            let cause = if asteroid.position.y - asteroid.radius >= height {
                ImpactCause::Escaped
            } else if circles_overlap(
                asteroid.position,
                asteroid.radius,
                ship_position,
                ship_radius,
            ) {
                ImpactCause::Collision
            } else {
                return true;
            };
            impacts.push((asteroid.id, cause));
            false
        });

        for (asteroid, cause) in impacts {
            let absorbed = self.shields > 0;
            if absorbed {
                self.shields -= 1;
                self.tally.shield_absorbs = self.tally.shield_absorbs.saturating_add(1);
            } else {
                self.hull = self.hull.saturating_sub(1);
                self.tally.hull_hits = self.tally.hull_hits.saturating_add(1);
            }
            self.ship.flash = self.config.ship_flash;
            out_events.push(Event::HazardImpact {
                asteroid,
                cause,
                absorbed,
            });
        }

        let mut missed = Vec::new();
        self.power_ups.retain(|power_up| {
            let gone = power_up.position.y - power_up.radius >= height;
            if gone {
                missed.push(power_up.id);
            }
            !gone
        });
        out_events.extend(
            missed
                .into_iter()
                .map(|power_up| Event::PowerUpMissed { power_up }),
        );
    }

    fn resolve_projectile_hits(&mut self, out_events: &mut Vec<Event>) {
        let projectiles = std::mem::take(&mut self.projectiles);
        let mut survivors = Vec::with_capacity(projectiles.len());
        let mut fragments = Vec::new();

        for projectile in projectiles {
            let target = self.asteroids.iter().position(|asteroid| {
                circles_overlap(
                    asteroid.position,
                    asteroid.radius,
                    projectile.position,
                    projectile.radius,
                )
            });
            let Some(index) = target else {
                survivors.push(projectile);
                continue;
            };

            let asteroid = &mut self.asteroids[index];
            asteroid.hit_points = asteroid.hit_points.saturating_sub(1);
            if asteroid.hit_points > 0 {
                asteroid.flash = self.config.asteroid_flash;
                out_events.push(Event::AsteroidDamaged {
                    asteroid: asteroid.id,
                    remaining: asteroid.hit_points,
                });
                continue;
            }

            let destroyed = self.asteroids.remove(index);
            self.cleared_amount += destroyed.amount;
            self.tally.asteroids_destroyed = self.tally.asteroids_destroyed.saturating_add(1);
            for (slot, size) in destroyed.fragments.iter().copied().enumerate() {
                let id = self.allocate_id();
                fragments.push(destroyed.fragment(
                    id,
                    size,
                    slot,
                    self.config.fragment_lateral_speed,
                ));
            }
            out_events.push(Event::AsteroidDestroyed {
                asteroid: destroyed.id,
                amount: destroyed.amount,
                fragments: u32::try_from(destroyed.fragments.len()).unwrap_or(u32::MAX),
            });
        }

        for fragment in &fragments {
            out_events.push(Event::AsteroidSpawned {
                asteroid: fragment.id,
                size: fragment.size,
            });
        }
        self.asteroids.extend(fragments);
        self.projectiles = survivors;
    }

    fn collect_power_ups(&mut self, out_events: &mut Vec<Event>) {
        let ship_position = self.ship.position;
        let ship_radius = self.ship.radius;
        let mut collected = Vec::new();
        self.power_ups.retain(|power_up| {
            let touching = circles_overlap(
                power_up.position,
                power_up.radius,
                ship_position,
                ship_radius,
            );
            if touching {
                collected.push((power_up.id, power_up.kind));
            }
            !touching
        });

        for (power_up, kind) in collected {
            match kind {
                PowerUpKind::Shield => self.shields = self.shields.saturating_add(1),
                PowerUpKind::SmartBomb => self.smart_bombs = self.smart_bombs.saturating_add(1),
                PowerUpKind::RapidFire => {
                    self.rapid_fire_remaining =
                        self.rapid_fire_remaining.saturating_add(self.rapid_fire_grant);
                }
            }
            self.tally.power_ups_collected = self.tally.power_ups_collected.saturating_add(1);
            out_events.push(Event::PowerUpCollected { power_up, kind });
        }
    }

    fn settle(&mut self, out_events: &mut Vec<Event>) {
        self.score = self.elapsed.as_secs_f64() + self.cleared_amount;

        if self.hull == 0 {
            self.finish(RunOutcome::HullFailed, out_events);
        } else if self.elapsed >= RUN_DURATION {
            self.finish(RunOutcome::RunComplete, out_events);
        }
    }

    fn finish(&mut self, outcome: RunOutcome, out_events: &mut Vec<Event>) {
        self.status = RunStatus::Finished;
        self.outcome = Some(outcome.clone());
        self.asteroids.clear();
        self.projectiles.clear();
        self.power_ups.clear();
        out_events.push(Event::RunFinished { outcome });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands received after the run finished are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.status != RunStatus::Running {
        return;
    }

    match command {
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            world.rapid_fire_remaining = world.rapid_fire_remaining.saturating_sub(dt);
            world.ship.flash = world.ship.flash.saturating_sub(dt);
            for asteroid in &mut world.asteroids {
                asteroid.flash = asteroid.flash.saturating_sub(dt);
            }
            out_events.push(Event::TimeAdvanced {
                dt,
                elapsed: world.elapsed,
            });
        }
        Command::SpawnAsteroid { spawn } => world.spawn_asteroid(spawn, out_events),
        Command::SpawnPowerUp { spawn } => world.spawn_power_up(spawn, out_events),
        Command::SteerShip { steering, dt } => world.steer_ship(steering, dt),
        Command::DetonateSmartBomb => world.detonate_smart_bomb(out_events),
        Command::FireProjectile => world.fire_projectile(out_events),
        Command::Integrate { dt, speed_scale } => world.integrate(dt, speed_scale),
        Command::ResolveHazards => world.resolve_hazards(out_events),
        Command::ResolveProjectileHits => world.resolve_projectile_hits(out_events),
        Command::CollectPowerUps => world.collect_power_ups(out_events),
        Command::Settle => world.settle(out_events),
        Command::Abort { message } => world.finish(RunOutcome::Faulted { message }, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use savings_arcade_core::{
        AsteroidSize, EntityId, PowerUpKind, Rgb, RuntimeState,
    };

    use super::{RunTally, World, WorldConfig};

    /// Provides read-only access to the configuration the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Captures the observable resource and status record.
    #[must_use]
    pub fn runtime_state(world: &World) -> RuntimeState {
        RuntimeState {
            status: world.status,
            elapsed: world.elapsed,
            hull: world.hull,
            shields: world.shields,
            smart_bombs: world.smart_bombs,
            score: world.score,
            cleared_amount: world.cleared_amount,
            rapid_fire_remaining: world.rapid_fire_remaining,
            outcome: world.outcome.clone(),
        }
    }

    /// Reports whether the rapid-fire window is currently open.
    #[must_use]
    pub fn rapid_fire_active(world: &World) -> bool {
        !world.rapid_fire_remaining.is_zero()
    }

    /// Counters describing the run so far.
    #[must_use]
    pub fn tally(world: &World) -> RunTally {
        world.tally
    }

    /// Number of live asteroids.
    #[must_use]
    pub fn asteroid_count(world: &World) -> usize {
        world.asteroids.len()
    }

    /// Captures the ship's presentation state.
    #[must_use]
    pub fn ship(world: &World) -> ShipSnapshot {
        ShipSnapshot {
            position: world.ship.position,
            radius: world.ship.radius,
            flash: world.ship.flash,
            shielded: world.shields > 0,
        }
    }

    /// Captures every live asteroid in spawn order.
    #[must_use]
    pub fn asteroids(world: &World) -> Vec<AsteroidSnapshot> {
        world
            .asteroids
            .iter()
            .map(|asteroid| AsteroidSnapshot {
                id: asteroid.id,
                size: asteroid.size,
                color: asteroid.color,
                position: asteroid.position,
                velocity: asteroid.velocity,
                radius: asteroid.radius,
                hit_points: asteroid.hit_points,
                fragments: asteroid.fragments.len(),
                amount: asteroid.amount,
                category: asteroid.category.clone(),
                flash: asteroid.flash,
            })
            .collect()
    }

    /// Captures every live projectile in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                radius: projectile.radius,
            })
            .collect()
    }

    /// Captures every live power-up in spawn order.
    #[must_use]
    pub fn power_ups(world: &World) -> Vec<PowerUpSnapshot> {
        world
            .power_ups
            .iter()
            .map(|power_up| PowerUpSnapshot {
                id: power_up.id,
                kind: power_up.kind,
                position: power_up.position,
                radius: power_up.radius,
                amount: power_up.amount,
                category: power_up.category.clone(),
            })
            .collect()
    }

    /// Read-only snapshot of the player ship.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ShipSnapshot {
        /// Centre of the ship in field units.
        pub position: Vec2,
        /// Collision radius of the ship.
        pub radius: f32,
        /// Remaining damage highlight.
        pub flash: Duration,
        /// Whether at least one shield charge is available.
        pub shielded: bool,
    }

    /// Read-only snapshot of a live asteroid.
    #[derive(Clone, Debug, PartialEq)]
    pub struct AsteroidSnapshot {
        /// Identifier of the asteroid.
        pub id: EntityId,
        /// Size tier of the asteroid.
        pub size: AsteroidSize,
        /// Presentation colour derived from the category.
        pub color: Rgb,
        /// Centre of the asteroid in field units.
        pub position: Vec2,
        /// Current velocity in units per second.
        pub velocity: Vec2,
        /// Collision radius.
        pub radius: f32,
        /// Hits still required to destroy the asteroid.
        pub hit_points: u32,
        /// Number of fragments released on destruction.
        pub fragments: usize,
        /// Value credited when the asteroid is cleared.
        pub amount: f64,
        /// Category of the originating expense.
        pub category: String,
        /// Remaining hit highlight.
        pub flash: Duration,
    }

    /// Read-only snapshot of a live projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier of the projectile.
        pub id: EntityId,
        /// Centre of the projectile in field units.
        pub position: Vec2,
        /// Collision radius.
        pub radius: f32,
    }

    /// Read-only snapshot of a live power-up.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PowerUpSnapshot {
        /// Identifier of the power-up.
        pub id: EntityId,
        /// Effect granted on collection.
        pub kind: PowerUpKind,
        /// Centre of the power-up in field units.
        pub position: Vec2,
        /// Collision radius.
        pub radius: f32,
        /// Amount of the originating income.
        pub amount: f64,
        /// Category of the originating income.
        pub category: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savings_arcade_core::{AsteroidSize, Rgb, SpawnId, Velocity};

    fn loadout(hull: u32, shields: u32, smart_bombs: u32) -> Loadout {
        Loadout {
            hull,
            shields,
            smart_bombs,
            rapid_fire: Duration::from_millis(6_000),
        }
    }

    fn asteroid_spawn(id: u32, size: AsteroidSize, lane: f32, amount: f64) -> AsteroidSpawn {
        AsteroidSpawn {
            id: SpawnId::new(id),
            spawn_at_ms: 0,
            size,
            color: Rgb::new(200, 80, 40),
            lane,
            velocity: Velocity::new(0.0, 100.0),
            hit_points: size.hit_points(),
            fragments: size.fragments().to_vec(),
            amount,
            category: "Food".to_owned(),
            description: None,
        }
    }

    fn power_up_spawn(kind: PowerUpKind) -> PowerUpSpawn {
        PowerUpSpawn {
            id: SpawnId::new(99),
            spawn_at_ms: 0,
            kind,
            lane: 0.5,
            amount: 500.0,
            category: "Salary".to_owned(),
            description: None,
        }
    }

    fn run(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(world, command, &mut events);
        }
        events
    }

    fn drop_onto_ship(world: &mut World) {
        let ship = query::ship(world).position;
        let asteroid = world
            .asteroids
            .last_mut()
            .expect("an asteroid was spawned");
        asteroid.position = ship;
    }

    #[test]
    fn smart_bomb_clears_field_and_credits_value() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 1));
        let _ = run(
            &mut world,
            vec![
                Command::SpawnAsteroid {
                    spawn: asteroid_spawn(0, AsteroidSize::Small, 0.2, 10.0),
                },
                Command::SpawnAsteroid {
                    spawn: asteroid_spawn(1, AsteroidSize::Medium, 0.5, 20.0),
                },
                Command::SpawnAsteroid {
                    spawn: asteroid_spawn(2, AsteroidSize::Large, 0.8, 30.0),
                },
            ],
        );

        let events = run(&mut world, vec![Command::DetonateSmartBomb]);
        assert_eq!(
            events,
            vec![Event::SmartBombDetonated {
                cleared: 3,
                value: 60.0
            }]
        );
        let state = query::runtime_state(&world);
        assert_eq!(state.cleared_amount, 60.0);
        assert_eq!(state.smart_bombs, 0);
        assert_eq!(query::asteroid_count(&world), 0);

        let events = run(&mut world, vec![Command::DetonateSmartBomb]);
        assert_eq!(events, vec![Event::SmartBombUnavailable]);
        assert_eq!(query::runtime_state(&world).cleared_amount, 60.0);
    }

    #[test]
    fn collision_on_last_hull_point_fails_the_run() {
        let mut world = World::new(WorldConfig::default(), loadout(1, 0, 0));
        let _ = run(
            &mut world,
            vec![Command::SpawnAsteroid {
                spawn: asteroid_spawn(0, AsteroidSize::Small, 0.5, 15.0),
            }],
        );
        drop_onto_ship(&mut world);

        let events = run(&mut world, vec![Command::ResolveHazards, Command::Settle]);

        let state = query::runtime_state(&world);
        assert_eq!(state.hull, 0);
        assert_eq!(state.status, RunStatus::Finished);
        assert_eq!(state.outcome, Some(RunOutcome::HullFailed));
        assert_eq!(state.cleared_amount, 0.0);
        assert!(events.contains(&Event::RunFinished {
            outcome: RunOutcome::HullFailed
        }));
    }

    #[test]
    fn shields_absorb_impacts_before_the_hull() {
        let mut world = World::new(WorldConfig::default(), loadout(2, 1, 0));
        let _ = run(
            &mut world,
            vec![Command::SpawnAsteroid {
                spawn: asteroid_spawn(0, AsteroidSize::Small, 0.5, 15.0),
            }],
        );
        drop_onto_ship(&mut world);
        let events = run(&mut world, vec![Command::ResolveHazards]);

        let state = query::runtime_state(&world);
        assert_eq!((state.hull, state.shields), (2, 0));
        assert!(matches!(
            events.as_slice(),
            [Event::HazardImpact {
                cause: ImpactCause::Collision,
                absorbed: true,
                ..
            }]
        ));
        assert_eq!(query::ship(&world).flash, Duration::from_millis(400));
    }

    #[test]
    fn escaped_asteroids_damage_without_credit() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 0));
        let _ = run(
            &mut world,
            vec![Command::SpawnAsteroid {
                spawn: asteroid_spawn(0, AsteroidSize::Small, 0.1, 15.0),
            }],
        );
        let _ = run(
            &mut world,
            vec![Command::Integrate {
                dt: Duration::from_secs(10),
                speed_scale: 1.0,
            }],
        );
        let events = run(&mut world, vec![Command::ResolveHazards]);

        assert!(matches!(
            events.as_slice(),
            [Event::HazardImpact {
                cause: ImpactCause::Escaped,
                absorbed: false,
                ..
            }]
        ));
        let state = query::runtime_state(&world);
        assert_eq!(state.hull, 2);
        assert_eq!(state.cleared_amount, 0.0);
    }

    #[test]
    fn destroyed_asteroids_split_and_conserve_value() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 0));
        let _ = run(
            &mut world,
            vec![Command::SpawnAsteroid {
                spawn: asteroid_spawn(0, AsteroidSize::Medium, 0.5, 45.0),
            }],
        );
        world.asteroids[0].position = Vec2::new(240.0, 300.0);

        for _ in 0..2 {
            let _ = run(&mut world, vec![Command::FireProjectile]);
            world
                .projectiles
                .last_mut()
                .expect("projectile fired")
                .position = Vec2::new(240.0, 300.0);
            let _ = run(&mut world, vec![Command::ResolveProjectileHits]);
        }

        let state = query::runtime_state(&world);
        assert_eq!(state.cleared_amount, 45.0);
        let fragments = query::asteroids(&world);
        assert_eq!(fragments.len(), 2);
        assert!(fragments
            .iter()
            .all(|fragment| fragment.size == AsteroidSize::Small));
        let total: f64 = fragments.iter().map(|fragment| fragment.amount).sum();
        assert!((total - 45.0).abs() < 1e-9);
        assert!(fragments[0].velocity.x < 0.0 && fragments[1].velocity.x > 0.0);
        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn surviving_asteroids_flash_after_a_hit() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 0));
        let _ = run(
            &mut world,
            vec![Command::SpawnAsteroid {
                spawn: asteroid_spawn(0, AsteroidSize::Large, 0.5, 90.0),
            }],
        );
        world.asteroids[0].position = Vec2::new(240.0, 200.0);
        let _ = run(&mut world, vec![Command::FireProjectile]);
        world.projectiles[0].position = Vec2::new(240.0, 200.0);

        let events = run(&mut world, vec![Command::ResolveProjectileHits]);
        assert!(matches!(
            events.as_slice(),
            [Event::AsteroidDamaged { remaining: 2, .. }]
        ));
        assert_eq!(query::asteroids(&world)[0].flash, Duration::from_millis(120));

        let _ = run(
            &mut world,
            vec![Command::Tick {
                dt: Duration::from_millis(200),
            }],
        );
        assert_eq!(query::asteroids(&world)[0].flash, Duration::ZERO);
    }

    #[test]
    fn rapid_fire_collection_extends_the_window() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 0));
        for _ in 0..2 {
            let _ = run(
                &mut world,
                vec![Command::SpawnPowerUp {
                    spawn: power_up_spawn(PowerUpKind::RapidFire),
                }],
            );
            world.power_ups[0].position = query::ship(&world).position;
            let _ = run(&mut world, vec![Command::CollectPowerUps]);
        }

        let state = query::runtime_state(&world);
        assert_eq!(state.rapid_fire_remaining, Duration::from_millis(12_000));
        assert_eq!(query::tally(&world).power_ups_collected, 2);
        assert!(query::rapid_fire_active(&world));
    }

    #[test]
    fn steering_is_clamped_to_the_field() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 0));
        let _ = run(
            &mut world,
            vec![Command::SteerShip {
                steering: Steering::Left,
                dt: Duration::from_secs(10),
            }],
        );
        assert_eq!(query::ship(&world).position.x, 16.0);

        let _ = run(
            &mut world,
            vec![Command::SteerShip {
                steering: Steering::Right,
                dt: Duration::from_secs(10),
            }],
        );
        assert_eq!(query::ship(&world).position.x, 480.0 - 16.0);
    }

    #[test]
    fn finished_world_ignores_further_commands() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 2, 1));
        let _ = run(
            &mut world,
            vec![
                Command::Tick { dt: RUN_DURATION },
                Command::Settle,
            ],
        );
        let frozen = query::runtime_state(&world);
        assert_eq!(frozen.outcome, Some(RunOutcome::RunComplete));

        let events = run(
            &mut world,
            vec![
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                Command::DetonateSmartBomb,
                Command::Settle,
                Command::Abort {
                    message: "late".to_owned(),
                },
            ],
        );
        assert!(events.is_empty());
        assert_eq!(query::runtime_state(&world), frozen);
    }

    #[test]
    fn score_combines_survival_time_and_cleared_value() {
        let mut world = World::new(WorldConfig::default(), loadout(3, 0, 1));
        let _ = run(
            &mut world,
            vec![
                Command::SpawnAsteroid {
                    spawn: asteroid_spawn(0, AsteroidSize::Small, 0.5, 12.5),
                },
                Command::DetonateSmartBomb,
                Command::Tick {
                    dt: Duration::from_millis(2_500),
                },
                Command::Settle,
            ],
        );
        assert!((query::runtime_state(&world).score - 15.0).abs() < 1e-9);
    }
}
