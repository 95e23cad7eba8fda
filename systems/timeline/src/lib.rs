#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic timeline builder that turns transactions into spawn events.
//!
//! Every qualifying expense becomes an [`AsteroidSpawn`] and every qualifying
//! income becomes a [`PowerUpSpawn`]. Events are spread evenly across the run
//! in chronological order. Cosmetic jitter comes from a ChaCha8 stream seeded
//! by hashing the event's identifier and amount, so identical ledgers always
//! produce byte-identical timelines.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use savings_arcade_core::{
    AsteroidSize, AsteroidSpawn, DifficultyProfile, PowerUpKind, PowerUpSpawn, Rgb, SpawnEvent,
    SpawnId, Timeline, TimelineError, TransactionKind, TransactionRecord, Velocity,
    RUN_DURATION_MS,
};
use sha2::{Digest, Sha256};

const CATEGORY_PALETTE: [Rgb; 8] = [
    Rgb::new(0xe6, 0x4a, 0x19),
    Rgb::new(0xf9, 0xa8, 0x25),
    Rgb::new(0x7c, 0xb3, 0x42),
    Rgb::new(0x00, 0x89, 0x7b),
    Rgb::new(0x1e, 0x88, 0xe5),
    Rgb::new(0x5e, 0x35, 0xb1),
    Rgb::new(0xd8, 0x1b, 0x60),
    Rgb::new(0x8d, 0x6e, 0x63),
];

const LANE_MIN: f32 = 0.08;
const LANE_MAX: f32 = 0.92;
/// Largest horizontal drift applied to an asteroid, in units per second.
const MAX_DRIFT: f32 = 30.0;

/// Amount thresholds separating the asteroid size tiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeTiers {
    small_max: f64,
    medium_max: f64,
}

impl SizeTiers {
    /// Derives tier boundaries from the lower and upper terciles of the amounts.
    ///
    /// Terciles use the nearest-rank method. An empty set yields boundaries
    /// that classify every amount as large.
    #[must_use]
    pub fn from_amounts(amounts: &[f64]) -> Self {
        let mut sorted: Vec<f64> = amounts.iter().copied().filter(|a| a.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        Self {
            small_max: nearest_rank(&sorted, 1, 3),
            medium_max: nearest_rank(&sorted, 2, 3),
        }
    }

    /// Classifies an amount into a size tier.
    #[must_use]
    pub fn classify(&self, amount: f64) -> AsteroidSize {
        if amount <= self.small_max {
            AsteroidSize::Small
        } else if amount <= self.medium_max {
            AsteroidSize::Medium
        } else {
            AsteroidSize::Large
        }
    }
}

fn nearest_rank(sorted: &[f64], numerator: usize, denominator: usize) -> f64 {
    if sorted.is_empty() {
        return f64::NEG_INFINITY;
    }
    let rank = (sorted.len() * numerator).div_ceil(denominator).max(1);
    sorted[rank - 1]
}

/// Builds the immutable spawn timeline for a run.
///
/// Transactions are expected to be the qualifying set produced by calibration;
/// records with a non-positive or non-finite amount are skipped regardless, and
/// the order is re-stabilised by date.
pub fn build_timeline(
    transactions: &[TransactionRecord],
    profile: &DifficultyProfile,
) -> Result<Timeline, TimelineError> {
    let mut ordered: Vec<&TransactionRecord> = transactions
        .iter()
        .filter(|record| record.amount.is_finite() && record.amount > 0.0)
        .collect();
    ordered.sort_by_key(|record| record.date);

    let expense_amounts: Vec<f64> = ordered
        .iter()
        .filter(|record| record.kind == TransactionKind::Expense)
        .map(|record| record.amount)
        .collect();
    let tiers = SizeTiers::from_amounts(&expense_amounts);

    let count = ordered.len() as u64;
    let mut income_ordinal = 0_u64;
    let mut events = Vec::with_capacity(ordered.len());

    for (index, record) in ordered.into_iter().enumerate() {
        let id = SpawnId::new(u32::try_from(index).unwrap_or(u32::MAX));
        let spawn_at_ms = index as u64 * RUN_DURATION_MS / count;
        let mut jitter = jitter_stream(id, record.amount);
        let lane = jitter.gen_range(LANE_MIN..=LANE_MAX);

        let event = match record.kind {
            TransactionKind::Expense => {
                let size = tiers.classify(record.amount);
                let drift = jitter.gen_range(-MAX_DRIFT..=MAX_DRIFT);
                SpawnEvent::Asteroid(AsteroidSpawn {
                    id,
                    spawn_at_ms,
                    size,
                    color: category_color(&record.category),
                    lane,
                    velocity: Velocity::new(drift, profile.rock_speed * size.speed_factor()),
                    hit_points: size.hit_points(),
                    fragments: size.fragments().to_vec(),
                    amount: record.amount,
                    category: record.category.clone(),
                    description: record.description.clone(),
                })
            }
            TransactionKind::Income => {
                let kind = power_up_kind(&record.category, income_ordinal);
                income_ordinal += 1;
                SpawnEvent::PowerUp(PowerUpSpawn {
                    id,
                    spawn_at_ms,
                    kind,
                    lane,
                    amount: record.amount,
                    category: record.category.clone(),
                    description: record.description.clone(),
                })
            }
        };
        events.push(event);
    }

    let timeline = Timeline::new(events)?;
    tracing::debug!(
        asteroids = timeline.asteroids().count(),
        power_ups = timeline.power_ups().count(),
        "built spawn timeline"
    );
    Ok(timeline)
}

/// Stable colour assigned to a category.
#[must_use]
pub fn category_color(category: &str) -> Rgb {
    let index = (category_hash(category) % CATEGORY_PALETTE.len() as u64) as usize;
    CATEGORY_PALETTE[index]
}

/// Power-up kind for the `ordinal`-th income of a category.
///
/// The category picks a starting point and consecutive incomes rotate through
/// every kind.
#[must_use]
pub fn power_up_kind(category: &str, ordinal: u64) -> PowerUpKind {
    let kinds = PowerUpKind::ALL.len() as u64;
    let slot = (category_hash(category) % kinds + ordinal % kinds) % kinds;
    PowerUpKind::ALL[slot as usize]
}

fn category_hash(category: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(category.as_bytes());
    finalize_seed(hasher)
}

fn jitter_stream(id: SpawnId, amount: f64) -> ChaCha8Rng {
    let mut hasher = Sha256::new();
    hasher.update(id.get().to_le_bytes());
    hasher.update(amount.to_bits().to_le_bytes());
    ChaCha8Rng::seed_from_u64(finalize_seed(hasher))
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}
