//! Domain models for frame capture and replay.
//!
//! These types are independent of the capture backend and the analyzer
//! implementation.

mod frame;
mod queue;

pub use frame::{Dissection, FrameRecord, MAX_RETRIES, OVERSIZED_BYTES};
pub use queue::FrameQueue;
