//! Link-layer capture and transmit abstraction.
//!
//! This module defines the `LinkHandle` trait and provides a pnet-based
//! implementation. The session depends only on the trait, so tests drive it
//! with a scripted link instead of a real interface.

mod pnet_capture;

pub use pnet_capture::PnetHandle;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handle bound to one network interface that can receive and send frames.
///
/// Dropping the handle releases the underlying socket.
pub trait LinkHandle {
    /// Name of the bound interface.
    fn interface_name(&self) -> &str;

    /// Wait for the next frame, at most one poll interval.
    ///
    /// Returns `Ok(None)` when the poll interval passes without traffic.
    fn recv_frame(&mut self) -> io::Result<Option<Vec<u8>>>;

    /// Transmit one frame and report how many bytes went out.
    fn send_frame(&mut self, frame: &[u8]) -> io::Result<usize>;
}

/// Cooperative cancellation flag for long-running capture.
///
/// Clones share the same flags, so a signal handler can hold one clone while
/// the capture loop polls another. The token is armed only while a capture
/// is running; `interrupt` reports whether there was one to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    armed: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the current capture stop at its next poll boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation before starting a new capture.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Mark a capture as running until the returned guard is dropped.
    pub fn arm(&self) -> ArmGuard<'_> {
        self.armed.store(true, Ordering::SeqCst);
        ArmGuard { token: self }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Cancel the running capture, if any.
    ///
    /// Returns `false` when no capture is armed; the caller decides what an
    /// interrupt means outside a capture.
    pub fn interrupt(&self) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.cancel();
        true
    }
}

/// Keeps a [`CancelToken`] armed for the lifetime of a capture.
#[derive(Debug)]
pub struct ArmGuard<'a> {
    token: &'a CancelToken,
}

impl Drop for ArmGuard<'_> {
    fn drop(&mut self) {
        self.token.armed.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let handler_side = token.clone();
        assert!(!token.is_cancelled());

        handler_side.cancel();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!handler_side.is_cancelled());
    }

    #[test]
    fn test_interrupt_only_cancels_armed_token() {
        let token = CancelToken::new();
        let handler_side = token.clone();

        assert!(!handler_side.interrupt());
        assert!(!token.is_cancelled());

        {
            let _armed = token.arm();
            assert!(handler_side.is_armed());
            assert!(handler_side.interrupt());
            assert!(token.is_cancelled());
        }

        assert!(!handler_side.is_armed());
        token.reset();
        assert!(!handler_side.interrupt());
        assert!(!token.is_cancelled());
    }
}
