//! Capture, filter, replay and retry passes.

use std::thread;
use std::time::{Duration, Instant};

use super::{CaptureReport, FilterReport, ReplayReport, ReplaySession, RetryReport};
use crate::analyzer::FrameAnalyzer;
use crate::capture::{CancelToken, LinkHandle};
use crate::domain::{FrameQueue, FrameRecord};
use crate::error::TransmitError;

impl<H: LinkHandle, A: FrameAnalyzer> ReplaySession<H, A> {
    /// Capture frames until `duration` elapses or `cancel` fires.
    ///
    /// Both conditions are checked between reads, and each read waits at
    /// most the link's poll interval. Empty reads and read errors do not
    /// consume an id. A duration too large to represent as a deadline means
    /// the capture only ends on cancellation.
    ///
    /// While the loop runs the token is armed, so an interrupt stops this
    /// capture instead of the process.
    pub fn capture(&mut self, duration: Duration, cancel: &CancelToken) -> CaptureReport {
        let start = Instant::now();
        let deadline = start.checked_add(duration);
        let mut captured = 0;
        let mut read_errors = 0;

        match deadline {
            Some(_) => tracing::info!(
                "Starting capture on {} for {}s",
                self.link.interface_name(),
                duration.as_secs()
            ),
            None => tracing::info!(
                "Starting capture on {} until interrupted",
                self.link.interface_name()
            ),
        }

        let _armed = cancel.arm();
        while !cancel.is_cancelled() && deadline.map_or(true, |d| Instant::now() < d) {
            match self.link.recv_frame() {
                Ok(Some(raw)) if !raw.is_empty() => {
                    let id = self.record(raw);
                    captured += 1;
                    tracing::trace!("Captured frame {}", id);

                    let every = self.config.progress_every;
                    if every > 0 && captured % every == 0 {
                        tracing::info!("Captured {} frames...", captured);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    read_errors += 1;
                    tracing::warn!("Capture read error: {}", e);
                }
            }
        }

        let report = CaptureReport {
            captured,
            total_captured: self.captured.len(),
            read_errors,
            elapsed: start.elapsed(),
            cancelled: cancel.is_cancelled(),
        };

        tracing::info!(
            "Capture complete: {} frames this run, {} total",
            report.captured,
            report.total_captured
        );
        report
    }

    /// Assign the next id, dissect and append to the captured queue.
    fn record(&mut self, raw: Vec<u8>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let dissection = self.analyzer.dissect(&raw);
        self.captured.enqueue(FrameRecord::new(id, raw, dissection));
        id
    }

    /// Rebuild the filtered queue from captured frames matching both
    /// addresses exactly.
    ///
    /// Matching oversized frames are admitted only up to the configured
    /// threshold; the rest are counted as skipped. The captured queue is
    /// read, never drained, so repeating a filter gives the same result.
    pub fn filter(&mut self, source: &str, destination: &str) -> FilterReport {
        self.filtered.clear();

        let threshold = self.config.oversized_threshold;
        let mut oversized_seen = 0;
        let mut report = FilterReport {
            source: source.to_string(),
            destination: destination.to_string(),
            matched: 0,
            skipped_oversized: 0,
            admitted_ids: Vec::new(),
        };

        for frame in self.captured.iter() {
            if !frame.matches(source, destination) {
                continue;
            }

            if frame.is_oversized() {
                oversized_seen += 1;
                if oversized_seen > threshold {
                    report.skipped_oversized += 1;
                    tracing::debug!(
                        "Skipping oversized frame {} ({} bytes)",
                        frame.id(),
                        frame.size_bytes()
                    );
                    continue;
                }
            }

            self.filtered.enqueue(frame.clone());
            report.matched += 1;
            report.admitted_ids.push(frame.id());
        }

        tracing::info!(
            "Filtered {} frames for {} -> {} ({} oversized skipped)",
            report.matched,
            source,
            destination,
            report.skipped_oversized
        );
        report
    }

    /// Replay the filtered queue oldest first, pacing each frame by its
    /// estimated delay.
    ///
    /// Failed frames move to the backup queue and, if there were any, one
    /// retry pass runs before returning. The filtered queue is always empty
    /// afterwards.
    pub fn replay(&mut self) -> ReplayReport {
        let replayed = self.filtered.len();
        let (succeeded, failed) = self.drain_filtered();

        tracing::info!(
            "Replay complete: {} succeeded, {} failed",
            succeeded,
            failed
        );

        let retry = if failed > 0 {
            tracing::info!("{} frames moved to backup queue for retry", failed);
            Some(self.retry_backup())
        } else {
            None
        };

        ReplayReport {
            replayed,
            succeeded,
            failed,
            retry,
        }
    }

    fn drain_filtered(&mut self) -> (usize, usize) {
        let mut succeeded = 0;
        let mut failed = 0;

        while let Some(frame) = self.filtered.dequeue() {
            thread::sleep(frame.estimated_delay());

            match transmit(&mut self.link, &frame) {
                Ok(sent) => {
                    succeeded += 1;
                    tracing::debug!("Replayed frame {} ({} bytes)", frame.id(), sent);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!("Replay of frame {} failed: {}", frame.id(), e);
                    self.backup.enqueue(frame);
                }
            }
        }

        (succeeded, failed)
    }

    /// One pass over the backup queue.
    ///
    /// Frames whose retry budget is spent are discarded untouched. Every
    /// other frame spends one retry; oversized frames are then discarded
    /// without an attempt, the rest are sent after the fixed retry delay.
    /// Failures form the new backup queue, which replaces the old one once
    /// the pass is over.
    pub fn retry_backup(&mut self) -> RetryReport {
        let pending = std::mem::take(&mut self.backup);
        let mut survivors = FrameQueue::new();
        let mut report = RetryReport::default();

        for mut frame in pending {
            if !frame.can_retry() {
                report.exhausted += 1;
                tracing::debug!(
                    "Frame {} exceeded max retries ({}), discarding",
                    frame.id(),
                    frame.retry_count()
                );
                continue;
            }

            frame.increment_retry();

            if frame.is_oversized() {
                report.skipped_oversized += 1;
                tracing::debug!(
                    "Frame {} not retried (oversized: {} bytes)",
                    frame.id(),
                    frame.size_bytes()
                );
                continue;
            }

            report.attempted += 1;
            thread::sleep(self.config.retry_delay);

            match transmit(&mut self.link, &frame) {
                Ok(_) => {
                    report.succeeded += 1;
                    tracing::debug!(
                        "Retry #{} of frame {} succeeded",
                        frame.retry_count(),
                        frame.id()
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "Retry #{} of frame {} failed: {}",
                        frame.retry_count(),
                        frame.id(),
                        e
                    );
                    survivors.enqueue(frame);
                }
            }
        }

        self.backup = survivors;
        report.remaining = self.backup.len();

        tracing::info!(
            "Retry pass complete: {} succeeded, {} remaining in backup",
            report.succeeded,
            report.remaining
        );
        report
    }
}

/// Send a frame; anything short of the full frame is a failure.
fn transmit<H: LinkHandle>(link: &mut H, frame: &FrameRecord) -> Result<usize, TransmitError> {
    let expected = frame.size_bytes();
    let sent = link.send_frame(frame.payload())?;
    if sent != expected {
        return Err(TransmitError::ShortWrite { sent, expected });
    }
    Ok(sent)
}
