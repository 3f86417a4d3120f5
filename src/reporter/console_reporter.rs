//! Console-based session reporter.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::reporter::SessionReporter;
use crate::session::{
    CaptureReport, FilterReport, FrameListing, ReplayReport, RetryReport, SessionStats,
};

const RULE: &str = "----------------------------------------------------------------------";

/// Reports session results to stdout in a tabular, human-readable form.
pub struct ConsoleReporter {
    /// Whether listings include the one-line protocol summary
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable or disable verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn format_capture(&self, report: &CaptureReport) -> String {
        let reason = if report.cancelled {
            "stopped early"
        } else {
            "duration elapsed"
        };
        let mut out = format!(
            "Capture complete ({}, {:.1}s): {} frames captured, {} total",
            reason,
            report.elapsed.as_secs_f64(),
            report.captured,
            report.total_captured
        );
        if report.read_errors > 0 {
            let _ = write!(out, ", {} read errors skipped", report.read_errors);
        }
        out
    }

    pub fn format_captured_listing(&self, listing: &FrameListing<'_>) -> String {
        if listing.total == 0 {
            return "No frames captured yet.".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<6} {:<39} {:<39} {:<8} {:>6}  {}",
            "ID", "Source", "Destination", "Proto", "Size", "Time"
        );
        let _ = writeln!(out, "{}", RULE);
        for frame in &listing.frames {
            let _ = write!(
                out,
                "{:<6} {:<39} {:<39} {:<8} {:>6}  {}",
                frame.id(),
                frame.source_address().unwrap_or("-"),
                frame.destination_address().unwrap_or("-"),
                frame.protocol(),
                frame.size_bytes(),
                frame.timestamp_str()
            );
            if self.verbose && !frame.summary().is_empty() {
                let _ = write!(out, "  {}", frame.summary());
            }
            out.push('\n');
        }
        if listing.remaining > 0 {
            let _ = writeln!(out, "... and {} more frames", listing.remaining);
        }
        let _ = writeln!(out, "{}", RULE);
        let _ = write!(out, "Total frames: {}", listing.total);
        out
    }

    pub fn format_filtered_listing(&self, listing: &FrameListing<'_>) -> String {
        if listing.total == 0 {
            return "No filtered frames available.".to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<6} {:<39} {:<39} {:>6} {:>9}",
            "ID", "Source", "Destination", "Size", "Delay(ms)"
        );
        let _ = writeln!(out, "{}", RULE);
        for frame in &listing.frames {
            let _ = writeln!(
                out,
                "{:<6} {:<39} {:<39} {:>6} {:>9}",
                frame.id(),
                frame.source_address().unwrap_or("-"),
                frame.destination_address().unwrap_or("-"),
                frame.size_bytes(),
                frame.estimated_delay_ms()
            );
        }
        let _ = writeln!(out, "{}", RULE);
        let _ = write!(out, "Total filtered frames: {}", listing.total);
        out
    }

    pub fn format_filter(&self, report: &FilterReport) -> String {
        let mut out = format!(
            "Filtered {} frames from {} -> {}",
            report.matched, report.source, report.destination
        );
        if !report.admitted_ids.is_empty() {
            let ids: Vec<_> = report.admitted_ids.iter().map(u64::to_string).collect();
            let _ = write!(out, "\nAdmitted frame ids: {}", ids.join(", "));
        }
        if report.skipped_oversized > 0 {
            let _ = write!(
                out,
                "\nSkipped {} oversized frames (threshold exceeded)",
                report.skipped_oversized
            );
        }
        out
    }

    pub fn format_replay(&self, report: &ReplayReport) -> String {
        if report.replayed == 0 {
            return "No filtered frames to replay.".to_string();
        }

        let mut out = format!(
            "Replay summary: {} successful, {} failed",
            report.succeeded, report.failed
        );
        if report.failed > 0 {
            let _ = write!(out, "\n{} frames moved to backup queue for retry", report.failed);
        }
        if let Some(retry) = &report.retry {
            let _ = write!(out, "\n{}", self.format_retry(retry));
        }
        out
    }

    pub fn format_retry(&self, report: &RetryReport) -> String {
        let mut out = format!(
            "Retry pass: {} attempted, {} succeeded, {} failed",
            report.attempted, report.succeeded, report.failed
        );
        if report.exhausted > 0 {
            let _ = write!(out, ", {} discarded (max retries)", report.exhausted);
        }
        if report.skipped_oversized > 0 {
            let _ = write!(out, ", {} discarded (oversized)", report.skipped_oversized);
        }
        let _ = write!(out, "\nRemaining frames in backup: {}", report.remaining);
        out
    }

    pub fn format_stats(&self, stats: &SessionStats) -> String {
        format!(
            "Interface:        {}\n\
             Captured frames:  {}\n\
             Filtered frames:  {}\n\
             Backup queue:     {}\n\
             Next frame id:    {}",
            stats.interface, stats.captured, stats.filtered, stats.backup, stats.next_id
        )
    }

    fn emit(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionReporter for ConsoleReporter {
    fn on_start(&self, interface: &str) {
        println!("Session bound to interface: {}", interface);
        println!("Type 'help' for commands. Ctrl+C stops a running capture.\n");
    }

    fn capture(&self, report: &CaptureReport) {
        self.emit(&self.format_capture(report));
    }

    fn captured_listing(&self, listing: &FrameListing<'_>) {
        self.emit(&self.format_captured_listing(listing));
    }

    fn filtered_listing(&self, listing: &FrameListing<'_>) {
        self.emit(&self.format_filtered_listing(listing));
    }

    fn details(&self, details: &str) {
        self.emit(details.trim_end());
    }

    fn filter(&self, report: &FilterReport) {
        self.emit(&self.format_filter(report));
    }

    fn replay(&self, report: &ReplayReport) {
        self.emit(&self.format_replay(report));
    }

    fn retry(&self, report: &RetryReport) {
        if report == &RetryReport::default() {
            self.emit("No frames in backup queue.");
            return;
        }
        self.emit(&self.format_retry(report));
    }

    fn stats(&self, stats: &SessionStats) {
        self.emit(&self.format_stats(stats));
    }

    fn problem(&self, message: &str) {
        self.emit(&format!("error: {}", message));
    }

    fn on_stop(&self, stats: &SessionStats) {
        println!(
            "\nShutting down ({} captured, {} left in backup).",
            stats.captured, stats.backup
        );
    }
}
