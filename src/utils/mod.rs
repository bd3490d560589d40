//! User interface helpers
//!
//! - [`progress`] - Spinners and live reporting of store progress

pub mod progress;

pub use progress::{ProgressBar, ProgressReporter};
