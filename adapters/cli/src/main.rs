#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that hosts the Savings Arcade.
//!
//! Loads a transaction ledger (or a built-in demo month), then either opens
//! the macroquad window or plays a headless run with the autopilot and prints
//! its summary.

mod autopilot;
mod ledger;
mod scene;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use savings_arcade_core::{LookbackWindow, TransactionRecord, WELCOME_BANNER};
use savings_arcade_engine::{Arcade, RunSummary, Tuning};
use savings_arcade_persistence::{FileStorage, MemoryStorage, ScoreStorage};
use savings_arcade_rendering::{Color, Presentation, RenderingBackend, Scene};
use savings_arcade_rendering_macroquad::MacroquadBackend;

/// Arcade shooter calibrated by your recent cash flow.
#[derive(Debug, Parser)]
#[command(name = "savings-arcade", version)]
struct Args {
    /// JSON array of transaction records; a demo month is used when omitted.
    #[arg(long, value_name = "FILE")]
    transactions: Option<PathBuf>,
    /// Days of history the run draws from.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=3650))]
    lookback_days: u32,
    /// Last day of the lookback window, defaults to the local date.
    #[arg(long, value_name = "YYYY-MM-DD")]
    today: Option<NaiveDate>,
    /// TOML file overriding gameplay tuning.
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,
    /// File the best score is persisted to; kept in memory when omitted.
    #[arg(long, value_name = "FILE")]
    best_score_file: Option<PathBuf>,
    /// Play one run with the autopilot instead of opening a window.
    #[arg(long)]
    headless: bool,
    /// Frame delta in milliseconds used by headless runs.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    frame_ms: u64,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,
    /// Render as fast as possible.
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,
}

impl Args {
    fn vsync(&self) -> bool {
        self.vsync || !self.no_vsync
    }
}

/// Entry point for the Savings Arcade command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("failed to load tuning {}", path.display()))?,
        None => Tuning::default(),
    };
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let window = LookbackWindow::new(today, args.lookback_days);
    let transactions = match &args.transactions {
        Some(path) => ledger::load(path)?,
        None => {
            tracing::info!("no ledger provided; using the demo month");
            ledger::demo(today)
        }
    };

    match args.best_score_file.clone() {
        Some(path) => run(&args, tuning, FileStorage::new(path), transactions, window),
        None => run(&args, tuning, MemoryStorage::new(), transactions, window),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run<S: ScoreStorage + 'static>(
    args: &Args,
    tuning: Tuning,
    storage: S,
    transactions: Vec<TransactionRecord>,
    window: LookbackWindow,
) -> Result<()> {
    let mut arcade = Arcade::new(tuning, storage);

    if args.headless {
        let frame = Duration::from_millis(args.frame_ms);
        let summary = autopilot::play(&mut arcade, &transactions, window, frame)
            .context("headless run failed")?;
        if let Some(calibration) = arcade.calibration() {
            let stats = calibration.stats;
            println!(
                "Calibration: income {:.2}, expenses {:.2}, net {:.2}, difficulty {:.2}",
                stats.total_income,
                stats.total_expense,
                stats.net_cash_flow,
                calibration.profile.difficulty_factor,
            );
        }
        print_summary(&summary, arcade.best_score());
        return Ok(());
    }

    let field = arcade.tuning().field();
    let scene = Scene::new(field, scene::idle_hud(WELCOME_BANNER))
        .context("tuning describes an invalid play field")?;
    let presentation = Presentation::new(
        "Savings Arcade",
        Color::from_rgb_u8(6, 7, 16),
        scene,
    );
    let backend = MacroquadBackend::new().with_vsync(args.vsync());

    let mut notice: Option<String> = None;
    backend.run(presentation, move |dt, input, scene| {
        for event in input.events {
            arcade.handle_input(event);
        }
        if input.restart {
            notice = match arcade.start(&transactions, window) {
                Ok(()) => None,
                Err(error) => {
                    tracing::warn!(%error, "run could not start");
                    Some(format!("Cannot start: {error}"))
                }
            };
        }
        let _ = arcade.tick(dt);
        scene::populate(scene, &mut arcade, notice.as_deref());
    })
}

fn print_summary(summary: &RunSummary, best_score: Option<f64>) {
    if let Some(outcome) = &summary.outcome {
        println!("{}", outcome.message());
    }
    println!(
        "Score {:.0} | cleared {:.2} | {:.1}s | destroyed {} | power-ups {} | shots {}",
        summary.score,
        summary.cleared_amount,
        summary.elapsed.as_secs_f64(),
        summary.asteroids_destroyed,
        summary.power_ups_collected,
        summary.shots_fired,
    );
    match best_score {
        Some(best) if summary.new_best => println!("New best score: {best:.0}"),
        Some(best) => println!("Best score: {best:.0}"),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_canonical_game() {
        let args = Args::try_parse_from(["savings-arcade"]).expect("defaults parse");

        assert_eq!(args.lookback_days, 30);
        assert_eq!(args.frame_ms, 16);
        assert!(!args.headless);
        assert!(args.vsync());
        assert!(args.today.is_none());
    }

    #[test]
    fn lookback_days_outside_the_accepted_range_are_rejected() {
        assert!(Args::try_parse_from(["savings-arcade", "--lookback-days", "0"]).is_err());
        assert!(Args::try_parse_from(["savings-arcade", "--lookback-days", "3651"]).is_err());
        assert!(Args::try_parse_from(["savings-arcade", "--lookback-days", "3650"]).is_ok());
    }

    #[test]
    fn today_parses_iso_dates() {
        let args = Args::try_parse_from(["savings-arcade", "--today", "2024-02-29", "--headless"])
            .expect("date parses");

        assert_eq!(args.today, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert!(args.headless);
        assert!(Args::try_parse_from(["savings-arcade", "--today", "yesterday"]).is_err());
    }

    #[test]
    fn the_last_vsync_flag_wins() {
        let args = Args::try_parse_from(["savings-arcade", "--vsync", "--no-vsync"])
            .expect("flags parse");
        assert!(!args.vsync());

        let args = Args::try_parse_from(["savings-arcade", "--no-vsync", "--vsync"])
            .expect("flags parse");
        assert!(!args.no_vsync);
    }

    #[test]
    fn headless_runs_persist_the_best_score() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("best.json");
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date");
        let args = Args::try_parse_from(["savings-arcade", "--headless"]).expect("flags parse");

        run(
            &args,
            Tuning::default(),
            FileStorage::new(&path),
            ledger::demo(today),
            LookbackWindow::new(today, 30),
        )
        .expect("headless run succeeds");

        assert!(path.exists());
    }
}
