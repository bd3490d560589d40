//! Progress spinner and live store reporting
//!
//! [`ProgressBar`] wraps an `indicatif` spinner with the crate's styling; it is hidden
//! when `OCL_NO_PROGRESS` is set or when the caller asks for it (`--no-progress`).
//!
//! [`ProgressReporter`] subscribes to an [`AppState`] and mirrors the latest progress
//! message of every action onto a spinner while an operation runs.
//!
//! ```rust,no_run
//! use ocl_dict::store::AppState;
//! use ocl_dict::utils::progress::{ProgressBar, ProgressReporter};
//!
//! # async fn example() {
//! let state = AppState::shared();
//! let reporter = ProgressReporter::spawn(&state, ProgressBar::new_spinner(false));
//! // run an orchestrated operation against `state`...
//! reporter.finish().await;
//! # }
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::store::{AppState, StoreEvent};

/// Set to any value to hide every spinner.
pub const ENV_NO_PROGRESS: &str = "OCL_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var_os(ENV_NO_PROGRESS).is_some()
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}

/// Spinner with consistent styling.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Spinner ticking every 100ms, or a hidden one when `hidden` is set or
    /// `OCL_NO_PROGRESS` is present.
    #[must_use]
    pub fn new_spinner(hidden: bool) -> Self {
        let inner = if hidden || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner,
        }
    }

    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    #[must_use]
    pub fn message(&self) -> String {
        self.inner.message()
    }

    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.inner.finish_with_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}

/// Background task showing store progress on a spinner.
pub struct ProgressReporter {
    spinner: ProgressBar,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Subscribe to `state` and start mirroring its events onto `spinner`.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(state: &AppState, spinner: ProgressBar) -> Self {
        let mut events = state.subscribe();
        let task_spinner = spinner.clone();
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(StoreEvent::Started(key)) => task_spinner.set_message(key.action.to_string()),
                    Ok(StoreEvent::Progress(_, message)) => task_spinner.set_message(message),
                    Ok(StoreEvent::Failed(_, failure)) => task_spinner.set_message(failure.message),
                    Ok(StoreEvent::Completed(_)) => {}
                    // Only the latest message matters
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self {
            spinner,
            handle,
        }
    }

    #[must_use]
    pub const fn spinner(&self) -> &ProgressBar {
        &self.spinner
    }

    /// Stop reporting and clear the spinner.
    pub async fn finish(self) {
        self.handle.abort();
        // Cancelled is the expected outcome
        let _ = self.handle.await;
        self.spinner.finish_and_clear();
    }
}
