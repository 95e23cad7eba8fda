#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Difficulty calibration derived from the player's recent cash flow.
//!
//! Calibration runs once when a run starts. It filters the ledger to the
//! lookback window, aggregates income and expenses, and maps the resulting
//! savings rate and transaction volume onto a [`DifficultyProfile`]. Lower
//! savings rates produce harder runs: denser spawns, faster rocks, and fewer
//! starting shields and smart bombs.

use savings_arcade_core::{DifficultyProfile, LookbackWindow, TransactionKind, TransactionRecord};

/// Base cadence of pressure spawns at zero difficulty.
const BASE_SPAWN_INTERVAL_MS: f64 = 1_400.0;
/// Growth of the spawn rate at full difficulty.
const SPAWN_RATE_GAIN: f64 = 1.5;
const BASE_ROCK_SPEED: f32 = 90.0;
const ROCK_SPEED_GAIN: f32 = 110.0;
const MAX_SHIELDS: f32 = 3.0;
const MAX_SMART_BOMBS: f32 = 2.0;
/// Duration of a collected rapid-fire boost.
pub const RAPID_FIRE_MS: u32 = 6_000;
/// Transaction count at which volume pressure saturates.
const VOLUME_SATURATION: f64 = 60.0;
/// Savings rate at or below which savings pressure is maximal.
const SAVINGS_RATE_FLOOR: f64 = -0.25;
/// Width of the savings rate band mapped onto `[0, 1]`.
const SAVINGS_RATE_SPAN: f64 = 0.75;
const SAVINGS_WEIGHT: f64 = 0.75;
const VOLUME_WEIGHT: f64 = 0.25;

/// Aggregate cash flow over the lookback window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CashFlowStats {
    /// Sum of qualifying income amounts.
    pub total_income: f64,
    /// Sum of qualifying expense amounts.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub net_cash_flow: f64,
    /// `net_cash_flow / total_income`, absent when income is not positive.
    pub savings_rate: Option<f64>,
    /// Number of qualifying transactions.
    pub transaction_count: usize,
}

/// Result of calibrating a run against a ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    /// Aggregate statistics for the host UI.
    pub stats: CashFlowStats,
    /// Difficulty parameters for the run.
    pub profile: DifficultyProfile,
    /// Qualifying transactions, stably ordered by date.
    pub transactions: Vec<TransactionRecord>,
}

impl Calibration {
    /// Reports whether the window held no qualifying transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profile.empty
    }
}

/// Filters the ledger to the transactions that take part in a run.
///
/// A transaction qualifies when its date lies inside the window and its amount
/// is finite and strictly positive. The result is stably sorted by date so that
/// same-day transactions keep their ledger order.
#[must_use]
pub fn qualifying_transactions(
    transactions: &[TransactionRecord],
    window: LookbackWindow,
) -> Vec<TransactionRecord> {
    let mut qualifying: Vec<TransactionRecord> = transactions
        .iter()
        .filter(|record| window.contains(record.date))
        .filter(|record| record.amount.is_finite() && record.amount > 0.0)
        .cloned()
        .collect();
    qualifying.sort_by_key(|record| record.date);
    qualifying
}

/// Aggregates income and expenses of already filtered transactions.
#[must_use]
pub fn cash_flow(transactions: &[TransactionRecord]) -> CashFlowStats {
    let (total_income, total_expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), record| match record.kind {
                TransactionKind::Income => (income + record.amount, expense),
                TransactionKind::Expense => (income, expense + record.amount),
            });
    let net_cash_flow = total_income - total_expense;
    let savings_rate = (total_income > 0.0).then(|| net_cash_flow / total_income);

    CashFlowStats {
        total_income,
        total_expense,
        net_cash_flow,
        savings_rate,
        transaction_count: transactions.len(),
    }
}

/// Maps aggregate cash flow onto a normalised difficulty in `[0, 1]`.
///
/// Difficulty never increases as the savings rate improves and never decreases
/// as the transaction volume grows.
#[must_use]
pub fn difficulty_factor(stats: &CashFlowStats) -> f64 {
    let savings_pressure = match stats.savings_rate {
        Some(rate) if rate.is_finite() => {
            1.0 - ((rate - SAVINGS_RATE_FLOOR) / SAVINGS_RATE_SPAN).clamp(0.0, 1.0)
        }
        _ => 1.0,
    };
    let volume = (stats.transaction_count as f64 / VOLUME_SATURATION).clamp(0.0, 1.0);
    (SAVINGS_WEIGHT * savings_pressure + VOLUME_WEIGHT * volume).clamp(0.0, 1.0)
}

/// Derives the run parameters for a normalised difficulty.
#[must_use]
pub fn profile_for(stats: &CashFlowStats) -> DifficultyProfile {
    let difficulty = difficulty_factor(stats);
    let spawn_interval_ms =
        (BASE_SPAWN_INTERVAL_MS / (1.0 + SPAWN_RATE_GAIN * difficulty)).round() as u32;
    let difficulty_f32 = difficulty as f32;

    DifficultyProfile {
        spawn_interval_ms: spawn_interval_ms.max(1),
        rock_speed: BASE_ROCK_SPEED + ROCK_SPEED_GAIN * difficulty_f32,
        shields: (MAX_SHIELDS - 2.0 * difficulty_f32).round().max(0.0) as u32,
        smart_bombs: (MAX_SMART_BOMBS - 2.0 * difficulty_f32).round().max(0.0) as u32,
        rapid_fire_ms: RAPID_FIRE_MS,
        difficulty_factor: difficulty_f32,
        savings_rate: stats.savings_rate,
        empty: stats.transaction_count == 0,
    }
}

/// Calibrates a run from the ledger and the selected lookback window.
#[must_use]
pub fn calibrate(transactions: &[TransactionRecord], window: LookbackWindow) -> Calibration {
    let transactions = qualifying_transactions(transactions, window);
    let stats = cash_flow(&transactions);
    let profile = profile_for(&stats);

    tracing::debug!(
        window_start = %window.start(),
        window_end = %window.today(),
        transactions = stats.transaction_count,
        income = stats.total_income,
        expense = stats.total_expense,
        savings_rate = ?stats.savings_rate,
        difficulty = profile.difficulty_factor,
        "calibrated run difficulty"
    );

    Calibration {
        stats,
        profile,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(savings_rate: Option<f64>, transaction_count: usize) -> CashFlowStats {
        CashFlowStats {
            total_income: 0.0,
            total_expense: 0.0,
            net_cash_flow: 0.0,
            savings_rate,
            transaction_count,
        }
    }

    #[test]
    fn undefined_savings_rate_is_treated_as_maximal_pressure() {
        assert_eq!(difficulty_factor(&stats(None, 0)), 0.75);
        assert_eq!(difficulty_factor(&stats(Some(-0.25), 0)), 0.75);
    }

    #[test]
    fn healthy_savings_with_low_volume_is_easiest() {
        let profile = profile_for(&stats(Some(0.6), 0));
        assert_eq!(profile.difficulty_factor, 0.0);
        assert_eq!(profile.spawn_interval_ms, 1_400);
        assert_eq!(profile.rock_speed, 90.0);
        assert_eq!((profile.shields, profile.smart_bombs), (3, 2));
    }

    #[test]
    fn hardest_profile_still_grants_a_shield() {
        let profile = profile_for(&stats(None, 500));
        assert_eq!(profile.difficulty_factor, 1.0);
        assert_eq!(profile.spawn_interval_ms, 560);
        assert_eq!(profile.rock_speed, 200.0);
        assert_eq!((profile.shields, profile.smart_bombs), (1, 0));
        assert_eq!(profile.rapid_fire_ms, RAPID_FIRE_MS);
    }

    #[test]
    fn cash_flow_separates_income_from_expenses() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date");
        let stats = cash_flow(&[
            TransactionRecord::income(day, "Salary", 1_000.0),
            TransactionRecord::expense(day, "Rent", 600.0),
            TransactionRecord::expense(day, "Food", 150.0),
        ]);
        assert_eq!(stats.total_income, 1_000.0);
        assert_eq!(stats.total_expense, 750.0);
        assert_eq!(stats.net_cash_flow, 250.0);
        assert_eq!(stats.savings_rate, Some(0.25));
        assert_eq!(stats.transaction_count, 3);
    }
}
