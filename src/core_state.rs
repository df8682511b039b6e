//! Shared application state — the request-lifecycle state machine.
//!
//! Exactly one analysis may be in flight per process. The lifecycle is a
//! tagged union, not three independent flags: `Idle`, `Loading`,
//! `Success(report)` or `Failure(message)`, and every transition goes
//! through `CoreState`. Acquiring an [`AnalysisGuard`] is the only way to
//! enter `Loading`, so a second submission while one is running cannot
//! fire a second model request.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::LabReport;

/// Failure recorded if an analysis is dropped without finishing
/// (worker panic, task abort).
const ABORTED_MESSAGE: &str = "El análisis se interrumpió inesperadamente. Vuelve a intentarlo.";

/// The single lifecycle state. Owned by [`CoreState`], cloned for snapshots.
/// The wire representation lives in the API layer's state view.
#[derive(Debug, Clone)]
pub enum AnalysisState {
    Idle,
    Loading {
        analysis_id: Uuid,
        started_at: DateTime<Utc>,
    },
    Success {
        analysis_id: Uuid,
        completed_at: DateTime<Utc>,
        report: LabReport,
    },
    Failure {
        message: String,
    },
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Errors from state transitions.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("An analysis is already in flight")]
    AnalysisInFlight,
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Transport-agnostic application state, shared via `Arc`.
pub struct CoreState {
    analysis: Mutex<AnalysisState>,
}

impl CoreState {
    pub fn new() -> Self {
        Self {
            analysis: Mutex::new(AnalysisState::Idle),
        }
    }

    /// Snapshot of the current lifecycle state.
    pub fn snapshot(&self) -> Result<AnalysisState, CoreError> {
        Ok(self
            .analysis
            .lock()
            .map_err(|_| CoreError::LockPoisoned)?
            .clone())
    }

    /// The current report, if the last analysis succeeded.
    pub fn current_report(&self) -> Result<Option<(Uuid, LabReport)>, CoreError> {
        let state = self.analysis.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(match &*state {
            AnalysisState::Success {
                analysis_id,
                report,
                ..
            } => Some((*analysis_id, report.clone())),
            _ => None,
        })
    }

    /// Transition into `Loading`, clearing any prior report or error.
    ///
    /// Fails with [`CoreError::AnalysisInFlight`] while another analysis is
    /// loading — the caller treats that as a no-op submission. The returned
    /// guard must be finished with [`AnalysisGuard::succeed`] or
    /// [`AnalysisGuard::fail`]; dropping it unfinished records a failure so
    /// the state can never be stuck in `Loading`.
    pub fn begin_analysis(self: &Arc<Self>) -> Result<AnalysisGuard, CoreError> {
        let mut state = self.analysis.lock().map_err(|_| CoreError::LockPoisoned)?;
        if state.is_loading() {
            return Err(CoreError::AnalysisInFlight);
        }

        let analysis_id = Uuid::new_v4();
        *state = AnalysisState::Loading {
            analysis_id,
            started_at: Utc::now(),
        };

        Ok(AnalysisGuard {
            core: Arc::clone(self),
            analysis_id,
            finished: false,
        })
    }

    fn finish(&self, next: AnalysisState) {
        if let Ok(mut state) = self.analysis.lock() {
            *state = next;
        }
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive token for one running analysis.
///
/// Same shape as an RAII operation guard: hold it for the duration of the
/// pipeline run, then consume it with the outcome.
pub struct AnalysisGuard {
    core: Arc<CoreState>,
    analysis_id: Uuid,
    finished: bool,
}

impl AnalysisGuard {
    pub fn analysis_id(&self) -> Uuid {
        self.analysis_id
    }

    /// Record the finished report. Atomic: the report only becomes visible
    /// here, after both stages succeeded.
    pub fn succeed(mut self, report: LabReport) {
        self.finished = true;
        self.core.finish(AnalysisState::Success {
            analysis_id: self.analysis_id,
            completed_at: Utc::now(),
            report,
        });
    }

    /// Record a user-facing failure message.
    pub fn fail(mut self, message: String) {
        self.finished = true;
        self.core.finish(AnalysisState::Failure { message });
    }
}

impl Drop for AnalysisGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                analysis_id = %self.analysis_id,
                "Analysis guard dropped unfinished; recording failure"
            );
            self.core.finish(AnalysisState::Failure {
                message: ABORTED_MESSAGE.to_string(),
            });
        }
    }
}
