use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use savings_arcade_core::{
    AsteroidSize, AsteroidSpawn, Command, Event, PowerUpKind, PowerUpSpawn, Rgb, SpawnEvent,
    SpawnId, Timeline, Velocity,
};
use savings_arcade_system_spawning::{Config, Spawning};
use savings_arcade_world::{self as world, query, Loadout, World, WorldConfig};

const SEED: u64 = 0x4d59_5df4_d0f3_3173;

fn asteroid(id: u32, spawn_at_ms: u64, category: &str, color: Rgb) -> SpawnEvent {
    SpawnEvent::Asteroid(AsteroidSpawn {
        id: SpawnId::new(id),
        spawn_at_ms,
        size: AsteroidSize::Medium,
        color,
        lane: 0.4,
        velocity: Velocity::new(5.0, 120.0),
        hit_points: 2,
        fragments: AsteroidSize::Medium.fragments().to_vec(),
        amount: 25.0,
        category: category.to_owned(),
        description: None,
    })
}

fn power_up(id: u32, spawn_at_ms: u64) -> SpawnEvent {
    SpawnEvent::PowerUp(PowerUpSpawn {
        id: SpawnId::new(id),
        spawn_at_ms,
        kind: PowerUpKind::Shield,
        lane: 0.6,
        amount: 800.0,
        category: "Salary".to_owned(),
        description: None,
    })
}

fn sample_timeline() -> Timeline {
    Timeline::new(vec![
        asteroid(0, 0, "Food", Rgb::new(10, 20, 30)),
        power_up(1, 1_000),
        asteroid(2, 2_000, "Rent", Rgb::new(40, 50, 60)),
        asteroid(3, 2_000, "Food", Rgb::new(10, 20, 30)),
    ])
    .expect("valid timeline")
}

fn tick(dt_ms: u64, elapsed_ms: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(dt_ms),
        elapsed: Duration::from_millis(elapsed_ms),
    }
}

#[test]
fn releases_due_events_in_timeline_order() {
    let config = Config::new(
        Duration::from_millis(500),
        100.0,
        Duration::from_secs(30),
        SEED,
    );
    let mut spawning = Spawning::new(sample_timeline(), config);

    let mut commands = Vec::new();
    spawning
        .handle(&[tick(16, 16)], &mut commands)
        .expect("cursor advances");
    assert_eq!(commands.len(), 1, "the first event fires at zero");

    commands.clear();
    spawning
        .handle(&[tick(2_500, 2_516)], &mut commands)
        .expect("cursor advances");

    let ids: Vec<u32> = commands
        .iter()
        .map(|command| match command {
            Command::SpawnAsteroid { spawn } => spawn.id.get(),
            Command::SpawnPowerUp { spawn } => spawn.id.get(),
            other => panic!("unexpected command emitted: {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(spawning.pending(), 0);
}

#[test]
fn pressure_asteroids_cycle_expense_categories_after_threshold() {
    let config = Config::new(
        Duration::from_millis(500),
        100.0,
        Duration::from_secs(30),
        SEED,
    );
    let mut spawning = Spawning::new(sample_timeline(), config);
    let mut commands = Vec::new();
    spawning
        .handle(&[tick(29_000, 29_000)], &mut commands)
        .expect("cursor advances");
    commands.clear();

    spawning
        .handle(&[tick(2_600, 31_600)], &mut commands)
        .expect("cursor advances");

    let pressure: Vec<&AsteroidSpawn> = commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnAsteroid { spawn } => Some(spawn),
            _ => None,
        })
        .collect();
    assert_eq!(pressure.len(), 3, "1.6s past the threshold at a 500ms cadence");
    let categories: Vec<&str> = pressure.iter().map(|spawn| spawn.category.as_str()).collect();
    assert_eq!(categories, vec!["Food", "Rent", "Food"]);
    assert!(pressure.iter().all(|spawn| spawn.amount == 0.0));
    assert!(pressure.iter().all(|spawn| spawn.size == AsteroidSize::Small));
    assert!(pressure.iter().all(|spawn| spawn.id.get() >= 4));
}

#[test]
fn no_pressure_before_threshold() {
    let config = Config::new(
        Duration::from_millis(100),
        100.0,
        Duration::from_secs(30),
        SEED,
    );
    let mut spawning = Spawning::new(Timeline::default(), config);
    let mut commands = Vec::new();
    for step in 1..=299 {
        spawning
            .handle(&[tick(100, step * 100)], &mut commands)
            .expect("cursor advances");
    }
    assert!(commands.is_empty());
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.asteroids > 0);
}

fn replay() -> ReplayOutcome {
    let loadout = Loadout {
        hull: 50,
        shields: 0,
        smart_bombs: 0,
        rapid_fire: Duration::from_secs(6),
    };
    let mut world = World::new(WorldConfig::default(), loadout);
    let config = Config::new(
        Duration::from_millis(750),
        100.0,
        Duration::from_secs(30),
        SEED,
    );
    let mut spawning = Spawning::new(sample_timeline(), config);
    let mut spawns = Vec::new();

    for _ in 0..3_000 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        spawning
            .handle(&events, &mut commands)
            .expect("cursor advances");
        for command in commands {
            if let Command::SpawnAsteroid { spawn } = &command {
                spawns.push(SpawnRecord {
                    id: spawn.id.get(),
                    lane_bits: spawn.lane.to_bits(),
                    category: spawn.category.clone(),
                });
            }
            world::apply(&mut world, command, &mut events);
        }
        world::apply(
            &mut world,
            Command::Integrate {
                dt: Duration::from_millis(16),
                speed_scale: 1.0,
            },
            &mut events,
        );
        world::apply(&mut world, Command::ResolveHazards, &mut events);
        world::apply(&mut world, Command::Settle, &mut events);
    }

    let state = query::runtime_state(&world);
    ReplayOutcome {
        spawns,
        asteroids: query::asteroid_count(&world),
        hull: state.hull,
        elapsed_ms: state.elapsed_ms(),
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct SpawnRecord {
    id: u32,
    lane_bits: u32,
    category: String,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    spawns: Vec<SpawnRecord>,
    asteroids: usize,
    hull: u32,
    elapsed_ms: u64,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
