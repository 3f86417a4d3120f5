//! Result types returned by session operations.

use std::time::Duration;

use crate::domain::FrameRecord;

/// Outcome of one capture run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    /// Frames captured during this run
    pub captured: usize,
    /// Size of the captured queue after the run
    pub total_captured: usize,
    /// Non-timeout read errors that were skipped
    pub read_errors: usize,
    pub elapsed: Duration,
    /// Whether the run ended on the cancel token rather than the deadline
    pub cancelled: bool,
}

/// A bounded, read-only view of a queue.
#[derive(Debug)]
pub struct FrameListing<'a> {
    pub frames: Vec<&'a FrameRecord>,
    /// Frames left out of `frames` because of the listing cap
    pub remaining: usize,
    /// Queue length at the time of listing
    pub total: usize,
}

/// Outcome of a filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub source: String,
    pub destination: String,
    /// Frames admitted to the filtered queue
    pub matched: usize,
    /// Matching oversized frames beyond the configured threshold
    pub skipped_oversized: usize,
    /// Ids of the admitted frames, in queue order
    pub admitted_ids: Vec<u64>,
}

/// Outcome of a replay pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Filtered frames at the start of the pass
    pub replayed: usize,
    pub succeeded: usize,
    /// Frames moved to the backup queue
    pub failed: usize,
    /// The automatic retry pass, run only when something failed
    pub retry: Option<RetryReport>,
}

/// Outcome of one pass over the backup queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    /// Frames actually handed to the link
    pub attempted: usize,
    pub succeeded: usize,
    /// Attempted frames kept for a later pass
    pub failed: usize,
    /// Frames discarded because the retry budget was spent
    pub exhausted: usize,
    /// Oversized frames discarded without an attempt
    pub skipped_oversized: usize,
    /// Backup queue size after the pass
    pub remaining: usize,
}

/// Queue sizes and binding of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub interface: String,
    pub captured: usize,
    pub filtered: usize,
    pub backup: usize,
    /// Id the next captured frame will receive
    pub next_id: u64,
}
