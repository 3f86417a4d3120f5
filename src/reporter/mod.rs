//! Reporting module for session results.
//!
//! This module defines the `SessionReporter` trait and a console
//! implementation. The session only returns data; reporters decide how it
//! is shown to the operator.

mod console_reporter;

pub use console_reporter::ConsoleReporter;

use crate::session::{
    CaptureReport, FilterReport, FrameListing, ReplayReport, RetryReport, SessionStats,
};

/// Trait for presenting session results to the operator.
pub trait SessionReporter {
    /// Called once the session is bound to an interface.
    fn on_start(&self, interface: &str);

    fn capture(&self, report: &CaptureReport);

    fn captured_listing(&self, listing: &FrameListing<'_>);

    fn filtered_listing(&self, listing: &FrameListing<'_>);

    fn details(&self, details: &str);

    fn filter(&self, report: &FilterReport);

    fn replay(&self, report: &ReplayReport);

    fn retry(&self, report: &RetryReport);

    fn stats(&self, stats: &SessionStats);

    /// Report a non-fatal problem (unknown command, lookup miss).
    fn problem(&self, message: &str);

    /// Called when the session shuts down.
    fn on_stop(&self, stats: &SessionStats);
}
