use chrono::NaiveDate;
use proptest::prelude::*;
use savings_arcade_core::{LookbackWindow, TransactionKind, TransactionRecord};
use savings_arcade_system_calibration::{calibrate, cash_flow, profile_for, qualifying_transactions};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date")
}

fn days_ago(days: u64) -> NaiveDate {
    today()
        .checked_sub_days(chrono::Days::new(days))
        .expect("date in range")
}

#[test]
fn empty_window_is_flagged() {
    let ledger = vec![
        TransactionRecord::expense(days_ago(45), "Food", 40.0),
        TransactionRecord::income(days_ago(31), "Salary", 2_000.0),
    ];

    let calibration = calibrate(&ledger, LookbackWindow::new(today(), 30));

    assert!(calibration.is_empty());
    assert!(calibration.transactions.is_empty());
    assert_eq!(calibration.stats.transaction_count, 0);
    assert_eq!(calibration.stats.savings_rate, None);
}

#[test]
fn zero_and_non_finite_amounts_do_not_qualify() {
    let ledger = vec![
        TransactionRecord::expense(days_ago(2), "Food", 0.0),
        TransactionRecord::expense(days_ago(2), "Food", f64::NAN),
        TransactionRecord::expense(days_ago(2), "Food", f64::INFINITY),
        TransactionRecord::expense(days_ago(2), "Food", -5.0),
    ];

    let calibration = calibrate(&ledger, LookbackWindow::new(today(), 30));

    assert!(calibration.is_empty());
}

#[test]
fn qualifying_transactions_are_stably_ordered_by_date() {
    let ledger = vec![
        TransactionRecord::expense(days_ago(1), "Transport", 12.0),
        TransactionRecord::expense(days_ago(5), "Food", 40.0),
        TransactionRecord::income(days_ago(1), "Salary", 900.0),
        TransactionRecord::expense(days_ago(5), "Rent", 700.0),
    ];

    let ordered = qualifying_transactions(&ledger, LookbackWindow::new(today(), 30));
    let categories: Vec<&str> = ordered.iter().map(|record| record.category.as_str()).collect();

    assert_eq!(categories, vec!["Food", "Rent", "Transport", "Salary"]);
}

#[test]
fn overspending_is_harder_than_saving() {
    let saver = vec![
        TransactionRecord::income(days_ago(3), "Salary", 3_000.0),
        TransactionRecord::expense(days_ago(2), "Rent", 900.0),
    ];
    let spender = vec![
        TransactionRecord::income(days_ago(3), "Salary", 3_000.0),
        TransactionRecord::expense(days_ago(2), "Rent", 2_900.0),
    ];
    let window = LookbackWindow::new(today(), 30);

    let easy = calibrate(&saver, window).profile;
    let hard = calibrate(&spender, window).profile;

    assert!(hard.difficulty_factor > easy.difficulty_factor);
    assert!(hard.spawn_interval_ms < easy.spawn_interval_ms);
    assert!(hard.rock_speed > easy.rock_speed);
    assert!(hard.shields <= easy.shields);
    assert!(hard.smart_bombs <= easy.smart_bombs);
}

fn arbitrary_record() -> impl Strategy<Value = TransactionRecord> {
    (
        0u64..200,
        prop::bool::ANY,
        0u32..4,
        prop_oneof![0.0f64..5_000.0, Just(0.0), Just(f64::NAN)],
    )
        .prop_map(|(age, income, category, amount)| TransactionRecord {
            date: days_ago(age),
            kind: if income {
                TransactionKind::Income
            } else {
                TransactionKind::Expense
            },
            category: format!("Category {category}"),
            amount,
            description: None,
        })
}

proptest! {
    #[test]
    fn profiles_stay_within_bounds(
        ledger in prop::collection::vec(arbitrary_record(), 0..120),
        days in 1u32..400,
    ) {
        let calibration = calibrate(&ledger, LookbackWindow::new(today(), days));
        let profile = calibration.profile;

        prop_assert!(profile.spawn_interval_ms > 0);
        prop_assert!((0.0..=1.0).contains(&profile.difficulty_factor));
        prop_assert!(profile.shields <= 3);
        prop_assert!(profile.smart_bombs <= 2);
        prop_assert_eq!(profile.empty, calibration.transactions.is_empty());
    }

    #[test]
    fn difficulty_never_rises_with_the_savings_rate(
        income in 1.0f64..10_000.0,
        lower in 0.0f64..1.0,
        delta in 0.0f64..1.0,
        count in 0usize..100,
    ) {
        let higher = (lower + delta).min(1.0);
        let mut worse = cash_flow(&[]);
        worse.total_income = income;
        worse.savings_rate = Some(lower);
        worse.transaction_count = count;
        let mut better = worse;
        better.savings_rate = Some(higher);

        prop_assert!(profile_for(&better).difficulty_factor <= profile_for(&worse).difficulty_factor);
    }
}
