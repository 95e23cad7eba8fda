//! Live entities owned by the world while a run is active.

use std::time::Duration;

use glam::Vec2;
use savings_arcade_core::{AsteroidSize, EntityId, PowerUpKind, Rgb};

/// Player ship anchored near the bottom edge of the field.
#[derive(Clone, Debug)]
pub(crate) struct Ship {
    /// Centre of the ship in field units.
    pub(crate) position: Vec2,
    /// Collision radius of the ship.
    pub(crate) radius: f32,
    /// Remaining damage highlight.
    pub(crate) flash: Duration,
}

/// Asteroid instance derived from an expense or a pressure spawn.
#[derive(Clone, Debug)]
pub(crate) struct Asteroid {
    pub(crate) id: EntityId,
    pub(crate) size: AsteroidSize,
    pub(crate) color: Rgb,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) radius: f32,
    pub(crate) hit_points: u32,
    pub(crate) fragments: Vec<AsteroidSize>,
    pub(crate) amount: f64,
    pub(crate) category: String,
    /// Remaining hit highlight.
    pub(crate) flash: Duration,
}

impl Asteroid {
    /// Builds the fragment emitted at `index` when this asteroid breaks apart.
    ///
    /// Fragments alternate left and right, keep the parent's colour and
    /// category, and share the parent's value evenly.
    pub(crate) fn fragment(
        &self,
        id: EntityId,
        size: AsteroidSize,
        index: usize,
        lateral_speed: f32,
    ) -> Asteroid {
        let side = if index % 2 == 0 { -1.0 } else { 1.0 };
        let share = self.amount / self.fragments.len().max(1) as f64;
        let fall_speed = self.velocity.y / self.size.speed_factor() * size.speed_factor();

        Asteroid {
            id,
            size,
            color: self.color,
            position: self.position + Vec2::new(side * self.radius * 0.5, 0.0),
            velocity: Vec2::new(self.velocity.x + side * lateral_speed, fall_speed),
            radius: size.radius(),
            hit_points: size.hit_points(),
            fragments: size.fragments().to_vec(),
            amount: share,
            category: self.category.clone(),
            flash: Duration::ZERO,
        }
    }
}

/// Projectile travelling upward from the ship.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: EntityId,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) radius: f32,
}

/// Collectible derived from an income transaction.
#[derive(Clone, Debug)]
pub(crate) struct PowerUp {
    pub(crate) id: EntityId,
    pub(crate) kind: PowerUpKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) radius: f32,
    pub(crate) amount: f64,
    pub(crate) category: String,
}

/// Reports whether two circles overlap or touch.
pub(crate) fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}
