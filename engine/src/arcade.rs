//! Session host that owns the current run, the input controller and the best score.

use std::time::Duration;

use savings_arcade_core::{InputEvent, LookbackWindow, RuntimeState, StartError, TransactionRecord};
use savings_arcade_persistence::{BestScoreStore, ScoreStorage};
use savings_arcade_system_calibration::{calibrate, Calibration};
use savings_arcade_system_input::InputController;
use savings_arcade_system_timeline::build_timeline;

use crate::{
    engine::{RunSummary, RuntimeEngine},
    tuning::Tuning,
};

#[derive(Debug)]
struct Session {
    engine: RuntimeEngine,
    recorded: bool,
    new_best: bool,
}

/// Hosts at most one run at a time.
///
/// Starting a run tears down the previous one before the new engine is built,
/// so two engines never tick against the same host. The best score is the only
/// state that survives across runs.
#[derive(Debug)]
pub struct Arcade<S> {
    tuning: Tuning,
    store: BestScoreStore<S>,
    best_score: Option<f64>,
    controller: InputController,
    calibration: Option<Calibration>,
    session: Option<Session>,
}

impl<S: ScoreStorage> Arcade<S> {
    /// Creates an idle arcade, loading the recorded best score.
    #[must_use]
    pub fn new(tuning: Tuning, storage: S) -> Self {
        let store = BestScoreStore::new(storage);
        let best_score = store.read();
        Self {
            tuning,
            store,
            best_score,
            controller: InputController::new(),
            calibration: None,
            session: None,
        }
    }

    /// Calibrates against the ledger and starts a new run.
    ///
    /// Any previous run is discarded first. An out-of-range tuning fails with
    /// [`StartError::InvalidTuning`] before the ledger is calibrated. When the
    /// window holds no qualifying transactions the arcade stays idle, the
    /// calibration is kept for display, and [`StartError::DataUnavailable`]
    /// is returned.
    pub fn start(
        &mut self,
        transactions: &[TransactionRecord],
        window: LookbackWindow,
    ) -> Result<(), StartError> {
        self.teardown();
        self.tuning
            .validate()
            .map_err(|error| StartError::InvalidTuning(error.to_string()))?;

        let calibration = calibrate(transactions, window);
        if calibration.is_empty() {
            tracing::info!(days = window.days(), "no transactions in window; run not started");
            self.calibration = Some(calibration);
            return Err(StartError::DataUnavailable);
        }

        let timeline = build_timeline(&calibration.transactions, &calibration.profile)?;
        let engine = RuntimeEngine::new(calibration.profile, timeline, &self.tuning)?;
        tracing::info!(
            days = window.days(),
            difficulty = calibration.profile.difficulty_factor,
            shields = calibration.profile.shields,
            smart_bombs = calibration.profile.smart_bombs,
            events = engine.pending_spawns(),
            "run started"
        );

        self.calibration = Some(calibration);
        self.controller.attach();
        self.session = Some(Session {
            engine,
            recorded: false,
            new_best: false,
        });
        Ok(())
    }

    /// Advances the active run. Returns the idle state when no run exists.
    pub fn tick(&mut self, dt: Duration) -> RuntimeState {
        let Some(session) = self.session.as_mut() else {
            return RuntimeState::idle();
        };

        let state = session.engine.tick(dt, self.controller.intent_mut());
        if state.is_finished() && !session.recorded {
            session.recorded = true;
            session.new_best = self.store.write(state.score);
            if session.new_best {
                self.best_score = Some(state.score);
            }
            self.controller.detach();
        }
        state
    }

    /// Forwards a raw input event to the controller.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.controller.handle(event);
    }

    /// Discards the current run and returns to idle.
    pub fn reset(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                status = ?session.engine.state().status,
                "tearing down run"
            );
        }
        self.controller.detach();
    }

    /// Current observable state.
    #[must_use]
    pub fn state(&self) -> RuntimeState {
        self.session
            .as_ref()
            .map_or_else(RuntimeState::idle, |session| session.engine.state())
    }

    /// Takes the latest throttled snapshot of the active run.
    pub fn take_snapshot(&mut self) -> Option<RuntimeState> {
        self.session
            .as_mut()
            .and_then(|session| session.engine.take_snapshot())
    }

    /// Best score recorded so far, including the current session.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// Calibration of the most recent start attempt.
    #[must_use]
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Engine of the active run, if any.
    #[must_use]
    pub fn engine(&self) -> Option<&RuntimeEngine> {
        self.session.as_ref().map(|session| &session.engine)
    }

    /// Input controller feeding the active run.
    #[must_use]
    pub fn controller(&self) -> &InputController {
        &self.controller
    }

    /// Summary of the active run, with `new_best` filled in once it finished.
    #[must_use]
    pub fn summary(&self) -> Option<RunSummary> {
        self.session.as_ref().map(|session| RunSummary {
            new_best: session.new_best,
            ..session.engine.summary()
        })
    }

    /// Tuning the arcade builds runs with.
    #[must_use]
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}
