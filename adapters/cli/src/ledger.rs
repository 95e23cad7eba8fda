//! Transaction ledger loading for the command-line host.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use savings_arcade_core::TransactionRecord;

/// Reads a JSON array of transaction records.
pub(crate) fn load(path: &Path) -> Result<Vec<TransactionRecord>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger {}", path.display()))?;
    let records: Vec<TransactionRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse ledger {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "ledger loaded");
    Ok(records)
}

/// Deterministic month of household cash flow ending on `today`.
pub(crate) fn demo(today: NaiveDate) -> Vec<TransactionRecord> {
    let day = |offset: u64| today.checked_sub_days(Days::new(offset)).unwrap_or(today);

    let mut records = vec![
        TransactionRecord::income(day(28), "Salary", 3_200.0).with_description("Monthly pay"),
        TransactionRecord::expense(day(27), "Rent", 1_150.0),
        TransactionRecord::expense(day(21), "Utilities", 140.0),
        TransactionRecord::income(day(14), "Freelance", 420.0),
        TransactionRecord::expense(day(12), "Transport", 95.0),
        TransactionRecord::expense(day(9), "Dining", 64.5).with_description("Birthday dinner"),
        TransactionRecord::income(day(3), "Refund", 35.0),
    ];

    for week in 0..4u64 {
        let amount = 48.0 + (week * 17 % 40) as f64;
        records.push(TransactionRecord::expense(day(26 - week * 7), "Groceries", amount));
        records.push(TransactionRecord::expense(
            day(24 - week * 7),
            "Coffee",
            4.5 + week as f64,
        ));
    }

    records.sort_by_key(|record| record.date);
    records
}
