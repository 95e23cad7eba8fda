//! Populates the rendering scene from the arcade's world queries.

use std::time::Duration;

use savings_arcade_core::{AsteroidSize, RunStatus, RuntimeState, RUN_DURATION};
use savings_arcade_engine::Arcade;
use savings_arcade_persistence::ScoreStorage;
use savings_arcade_rendering::{
    AsteroidPresentation, Color, Hud, PowerUpPresentation, ProjectilePresentation, Scene,
    ShipPresentation,
};
use savings_arcade_world::query;

/// Builds an idle HUD carrying the provided banner.
pub(crate) fn idle_hud(message: impl Into<String>) -> Hud {
    Hud::idle(RUN_DURATION, Some(message.into()))
}

/// Refreshes the scene entities every frame and the HUD from the throttled snapshot.
///
/// `notice` replaces the HUD message while no run is active, e.g. to explain
/// why a run could not start.
pub(crate) fn populate<S: ScoreStorage>(
    scene: &mut Scene,
    arcade: &mut Arcade<S>,
    notice: Option<&str>,
) {
    scene.clear_entities();

    if let Some(engine) = arcade.engine() {
        let world = engine.world();
        let config = query::config(world);

        let ship = query::ship(world);
        scene.ship = Some(ShipPresentation {
            position: ship.position,
            radius: ship.radius,
            flash: flash_fraction(ship.flash, config.ship_flash),
            shielded: ship.shielded,
        });

        scene.asteroids.extend(query::asteroids(world).into_iter().map(|asteroid| {
            let label = if asteroid.size == AsteroidSize::Large {
                asteroid.category
            } else {
                String::new()
            };
            AsteroidPresentation {
                position: asteroid.position,
                radius: asteroid.radius,
                color: Color::from(asteroid.color),
                flash: flash_fraction(asteroid.flash, config.asteroid_flash),
                hit_points: asteroid.hit_points,
                label,
            }
        }));

        scene
            .projectiles
            .extend(query::projectiles(world).into_iter().map(|projectile| {
                ProjectilePresentation {
                    position: projectile.position,
                    radius: projectile.radius,
                }
            }));

        scene
            .power_ups
            .extend(query::power_ups(world).into_iter().map(|power_up| {
                PowerUpPresentation {
                    position: power_up.position,
                    radius: power_up.radius,
                    kind: power_up.kind,
                }
            }));
    }

    if let Some(snapshot) = arcade.take_snapshot() {
        apply_snapshot(&mut scene.hud, &snapshot);
    } else if arcade.engine().is_none() {
        apply_snapshot(&mut scene.hud, &RuntimeState::idle());
    }
    scene.hud.best_score = arcade.best_score();
    if scene.hud.status == RunStatus::Idle {
        if let Some(notice) = notice {
            scene.hud.message = Some(notice.to_owned());
        }
    }
}

fn apply_snapshot(hud: &mut Hud, state: &RuntimeState) {
    hud.status = state.status;
    hud.score = state.score;
    hud.elapsed = state.elapsed;
    hud.hull = state.hull;
    hud.shields = state.shields;
    hud.smart_bombs = state.smart_bombs;
    hud.rapid_fire = state.rapid_fire_remaining;
    hud.message = match state.status {
        RunStatus::Idle => hud.message.take(),
        RunStatus::Running => None,
        RunStatus::Finished => state.outcome.as_ref().map(|outcome| outcome.message()),
    };
}

fn flash_fraction(remaining: Duration, full: Duration) -> f32 {
    if full.is_zero() {
        return 0.0;
    }
    (remaining.as_secs_f32() / full.as_secs_f32()).clamp(0.0, 1.0)
}
