//! Captured frame record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use macaddr::MacAddr6;

/// Frames larger than this many bytes are considered oversized (Ethernet MTU).
pub const OVERSIZED_BYTES: usize = 1500;

/// A frame whose retry count reached this value is never transmitted again.
pub const MAX_RETRIES: u32 = 2;

/// Structured fields extracted from a raw frame by an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissection {
    /// Link-layer source, absent for runt frames
    pub source_mac: Option<MacAddr6>,
    /// Link-layer destination, absent for runt frames
    pub destination_mac: Option<MacAddr6>,
    /// Network-layer source address
    pub source_address: Option<String>,
    /// Network-layer destination address
    pub destination_address: Option<String>,
    /// Short protocol label (e.g. "TCP", "ARP", "0x88cc")
    pub protocol: String,
    /// One-line description used by listings
    pub summary: String,
    /// Pacing delay applied before this frame is replayed
    pub estimated_delay_ms: u64,
}

impl Dissection {
    /// Dissection for bytes the analyzer could not make sense of.
    pub fn unparsed(estimated_delay_ms: u64) -> Self {
        Self {
            source_mac: None,
            destination_mac: None,
            source_address: None,
            destination_address: None,
            protocol: "RAW".to_string(),
            summary: "Unparsed frame".to_string(),
            estimated_delay_ms,
        }
    }
}

/// One captured link-layer frame.
///
/// Everything except the retry counter is fixed once the record is built.
/// The captured size is the payload length, so the two can never disagree.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    id: u64,
    timestamp: DateTime<Utc>,
    payload: Vec<u8>,
    dissection: Dissection,
    retry_count: u32,
}

impl FrameRecord {
    /// Build a record from raw bytes and the analyzer's view of them.
    pub fn new(id: u64, payload: Vec<u8>, dissection: Dissection) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            payload,
            dissection,
            retry_count: 0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Capture time formatted for listings (`HH:MM:SS.mmm`).
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format("%H:%M:%S%.3f").to_string()
    }

    pub fn source_address(&self) -> Option<&str> {
        self.dissection.source_address.as_deref()
    }

    pub fn destination_address(&self) -> Option<&str> {
        self.dissection.destination_address.as_deref()
    }

    pub fn source_mac(&self) -> Option<MacAddr6> {
        self.dissection.source_mac
    }

    pub fn destination_mac(&self) -> Option<MacAddr6> {
        self.dissection.destination_mac
    }

    pub fn protocol(&self) -> &str {
        &self.dissection.protocol
    }

    pub fn summary(&self) -> &str {
        &self.dissection.summary
    }

    pub fn size_bytes(&self) -> usize {
        self.payload.len()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn estimated_delay_ms(&self) -> u64 {
        self.dissection.estimated_delay_ms
    }

    pub fn estimated_delay(&self) -> Duration {
        Duration::from_millis(self.dissection.estimated_delay_ms)
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Whether the retry budget still allows another attempt.
    pub fn can_retry(&self) -> bool {
        self.retry_count < MAX_RETRIES
    }

    pub fn is_oversized(&self) -> bool {
        self.size_bytes() > OVERSIZED_BYTES
    }

    /// Exact match on both network-layer addresses.
    ///
    /// Frames without a network layer never match.
    pub fn matches(&self, source: &str, destination: &str) -> bool {
        self.source_address() == Some(source) && self.destination_address() == Some(destination)
    }

    pub(crate) fn increment_retry(&mut self) {
        self.retry_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dissection(src: &str, dst: &str) -> Dissection {
        Dissection {
            source_mac: Some(MacAddr6::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff)),
            destination_mac: Some(MacAddr6::new(0x11, 0x22, 0x33, 0x44, 0x55, 0x66)),
            source_address: Some(src.to_string()),
            destination_address: Some(dst.to_string()),
            protocol: "UDP".to_string(),
            summary: "1234 -> 53".to_string(),
            estimated_delay_ms: 7,
        }
    }

    #[test]
    fn test_size_follows_payload() {
        let frame = FrameRecord::new(1, vec![0u8; 1600], dissection("10.0.0.1", "10.0.0.2"));

        assert_eq!(frame.size_bytes(), 1600);
        assert_eq!(frame.payload().len(), frame.size_bytes());
        assert!(frame.is_oversized());
    }

    #[test]
    fn test_mtu_sized_frame_is_not_oversized() {
        let frame = FrameRecord::new(1, vec![0u8; OVERSIZED_BYTES], dissection("a", "b"));
        assert!(!frame.is_oversized());
    }

    #[test]
    fn test_matches_requires_both_addresses() {
        let frame = FrameRecord::new(1, vec![0u8; 60], dissection("10.0.0.1", "10.0.0.2"));

        assert!(frame.matches("10.0.0.1", "10.0.0.2"));
        assert!(!frame.matches("10.0.0.2", "10.0.0.1"));
        assert!(!frame.matches("10.0.0.1", "10.0.0.3"));
    }

    #[test]
    fn test_frame_without_network_layer_never_matches() {
        let frame = FrameRecord::new(1, vec![0u8; 10], Dissection::unparsed(15));

        assert!(frame.source_address().is_none());
        assert!(!frame.matches("", ""));
    }

    #[test]
    fn test_retry_budget() {
        let mut frame = FrameRecord::new(3, vec![0u8; 60], dissection("a", "b"));
        assert_eq!(frame.retry_count(), 0);
        assert!(frame.can_retry());

        frame.increment_retry();
        assert!(frame.can_retry());

        frame.increment_retry();
        assert_eq!(frame.retry_count(), MAX_RETRIES);
        assert!(!frame.can_retry());
    }

    #[test]
    fn test_estimated_delay() {
        let frame = FrameRecord::new(1, vec![0u8; 60], dissection("a", "b"));
        assert_eq!(frame.estimated_delay(), Duration::from_millis(7));
    }

    #[test]
    fn test_timestamp_is_set() {
        let before = Utc::now();
        let frame = FrameRecord::new(1, vec![0u8; 60], dissection("a", "b"));
        let after = Utc::now();

        assert!(frame.timestamp() >= before);
        assert!(frame.timestamp() <= after);
        assert_eq!(frame.timestamp_str().len(), "00:00:00.000".len());
    }
}
