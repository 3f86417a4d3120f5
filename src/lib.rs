//! netreplay - capture link-layer frames, select them by address pair and
//! replay them with pacing and bounded retry.
//!
//! The pipeline lives in [`session::ReplaySession`]; the link and the
//! dissector are behind the [`capture::LinkHandle`] and
//! [`analyzer::FrameAnalyzer`] traits.

pub mod analyzer;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod reporter;
pub mod session;
pub mod shell;

#[cfg(test)]
mod test_utils;

pub use analyzer::{FrameAnalyzer, PnetAnalyzer};
pub use capture::{CancelToken, LinkHandle, PnetHandle};
pub use config::Config;
pub use domain::{FrameQueue, FrameRecord};
pub use session::{ReplaySession, SessionConfig};
