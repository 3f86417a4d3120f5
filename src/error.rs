//! Error types for netreplay.

use thiserror::Error;

/// Errors raised while opening the link-layer handle.
///
/// These are the only failures that prevent a session from existing.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("network interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("failed to create datalink channel: {0}")]
    ChannelCreation(String),

    #[error("insufficient permissions (run as root or with CAP_NET_RAW)")]
    InsufficientPermissions,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// A single failed transmission during replay or retry.
///
/// Never fatal: the frame is queued for retry or discarded under the cap.
#[derive(Error, Debug)]
pub enum TransmitError {
    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal errors returned by session operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("frame with id {0} not found")]
    FrameNotFound(u64),
}

/// Errors raised while parsing an operator command line.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("empty command")]
    Empty,

    #[error("{0}")]
    Invalid(String),
}
