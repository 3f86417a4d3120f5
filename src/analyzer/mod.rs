//! Frame dissection module.
//!
//! This module turns raw link-layer bytes into the structured fields a
//! `FrameRecord` carries and renders the per-frame detail view.

mod pnet_analyzer;

pub use pnet_analyzer::PnetAnalyzer;

use crate::domain::{Dissection, FrameRecord};

/// Trait for frame analyzers.
///
/// Dissection never fails: bytes that cannot be parsed still produce a
/// record, just without network-layer addresses.
pub trait FrameAnalyzer {
    /// Extract addresses, protocol label and pacing delay from raw bytes.
    fn dissect(&self, raw: &[u8]) -> Dissection;

    /// Render a multi-line, human-readable report for one frame.
    fn render_details(&self, frame: &FrameRecord) -> String;
}
