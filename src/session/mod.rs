//! Capture/replay session.
//!
//! The session owns the three frame queues (captured, filtered, backup), the
//! analyzer and the link handle. Operations are meant to be called one at a
//! time from a single thread; none of them fail except for lookups, every
//! steady-state problem degrades into counters on the returned report.

mod pipeline;
mod report;

pub use report::{
    CaptureReport, FilterReport, FrameListing, ReplayReport, RetryReport, SessionStats,
};

use std::time::Duration;

use crate::analyzer::{FrameAnalyzer, PnetAnalyzer};
use crate::capture::LinkHandle;
use crate::domain::{FrameQueue, FrameRecord};
use crate::error::SessionError;

/// Default number of matching oversized frames admitted per filter pass.
pub const DEFAULT_OVERSIZED_THRESHOLD: usize = 5;
/// Default pause before each retry attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Default cap on frames shown by `list_captured`.
pub const DEFAULT_LIST_LIMIT: usize = 50;
/// Default capture progress cadence, in frames.
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

/// Tunables for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub oversized_threshold: usize,
    pub retry_delay: Duration,
    pub list_limit: usize,
    /// Log a progress line every this many captured frames (0 disables)
    pub progress_every: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            oversized_threshold: DEFAULT_OVERSIZED_THRESHOLD,
            retry_delay: DEFAULT_RETRY_DELAY,
            list_limit: DEFAULT_LIST_LIMIT,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Capture, filter, replay and retry pipeline bound to one interface.
pub struct ReplaySession<H: LinkHandle, A: FrameAnalyzer = PnetAnalyzer> {
    link: H,
    analyzer: A,
    config: SessionConfig,
    captured: FrameQueue<FrameRecord>,
    filtered: FrameQueue<FrameRecord>,
    backup: FrameQueue<FrameRecord>,
    next_id: u64,
}

impl<H: LinkHandle, A: FrameAnalyzer> ReplaySession<H, A> {
    /// Create a session over an already opened link.
    pub fn new(link: H, analyzer: A, config: SessionConfig) -> Self {
        tracing::info!("Session ready on interface {}", link.interface_name());
        Self {
            link,
            analyzer,
            config,
            captured: FrameQueue::new(),
            filtered: FrameQueue::new(),
            backup: FrameQueue::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn link(&self) -> &H {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut H {
        &mut self.link
    }

    pub fn captured(&self) -> &FrameQueue<FrameRecord> {
        &self.captured
    }

    pub fn filtered(&self) -> &FrameQueue<FrameRecord> {
        &self.filtered
    }

    pub fn backup(&self) -> &FrameQueue<FrameRecord> {
        &self.backup
    }

    /// First `list_limit` captured frames and how many were left out.
    pub fn list_captured(&self) -> FrameListing<'_> {
        let total = self.captured.len();
        let frames: Vec<_> = self.captured.iter().take(self.config.list_limit).collect();
        FrameListing {
            remaining: total - frames.len(),
            frames,
            total,
        }
    }

    /// Every frame waiting for replay.
    pub fn list_filtered(&self) -> FrameListing<'_> {
        FrameListing {
            frames: self.filtered.iter().collect(),
            remaining: 0,
            total: self.filtered.len(),
        }
    }

    /// Detail report for a captured frame.
    ///
    /// Only the captured queue is searched.
    pub fn show_details(&self, id: u64) -> Result<String, SessionError> {
        self.captured
            .iter()
            .find(|frame| frame.id() == id)
            .map(|frame| self.analyzer.render_details(frame))
            .ok_or(SessionError::FrameNotFound(id))
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            interface: self.link.interface_name().to_string(),
            captured: self.captured.len(),
            filtered: self.filtered.len(),
            backup: self.backup.len(),
            next_id: self.next_id,
        }
    }

    /// End the session and release the link.
    ///
    /// Frames still waiting in the backup queue are dropped.
    pub fn shutdown(self) -> SessionStats {
        let stats = self.stats();
        if stats.backup > 0 {
            tracing::warn!("Dropping {} unsent frames from the backup queue", stats.backup);
        }
        tracing::info!(
            "Shutting down session on {} ({} captured, {} filtered)",
            stats.interface,
            stats.captured,
            stats.filtered
        );
        stats
    }
}
