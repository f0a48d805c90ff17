#![deny(missing_docs)]
//! Shared logging utilities for the concierge workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the submission the current thread is working on, so log
//! lines of overlapping requests can be told apart.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

thread_local! {
    /// Submission id the current thread is handling; 0 means none.
    static SUBMISSION: Cell<u64> = const { Cell::new(0) };
}

/// Sets the submission id for the current thread.
/// Call with 0 once the submission is finished.
pub fn set_submission(submission: u64) {
    SUBMISSION.with(|v| v.set(submission));
}

/// Retrieves the submission id for the current thread.
/// Returns 0 if no submission is active.
pub fn current_submission() -> u64 {
    SUBMISSION.with(|v| v.get())
}

/// Runs `future` with `submission` as the log context on every poll, so the
/// prefix follows an async task across worker threads.
pub fn with_submission<F: Future>(submission: u64, future: F) -> WithSubmission<F> {
    WithSubmission {
        submission,
        inner: Box::pin(future),
    }
}

/// Future returned by [`with_submission`].
pub struct WithSubmission<F> {
    submission: u64,
    inner: Pin<Box<F>>,
}

impl<F: Future> Future for WithSubmission<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<F::Output> {
        let previous = current_submission();
        set_submission(self.submission);
        let poll = self.inner.as_mut().poll(cx);
        set_submission(previous);
        poll
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[sub {}] {}", $crate::current_submission(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[sub {}] {}", $crate::current_submission(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[sub {}] {}", $crate::current_submission(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[sub {}] {}", $crate::current_submission(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[sub {}] {}", $crate::current_submission(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
