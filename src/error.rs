//! Error types for the BACnet gateway mirror
//!
//! This module provides the crate-wide error taxonomy. Transport-level
//! failures degrade a session instead of crashing it; normalization
//! precondition violations are propagated to the caller.

use thiserror::Error;

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Error types for BACnet mirror operations
#[derive(Error, Debug)]
pub enum MirrorError {
    /// The gateway is unreachable or returned a protocol-level error during
    /// a poll or write. The session keeps serving the last known tree.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The push channel closed gracefully. Expected during shutdown and
    /// never surfaced to listeners.
    #[error("Push channel closed")]
    ChannelClosed,

    /// Precondition violation in the normalization engine
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl MirrorError {
    /// Create an upstream-unavailable error
    pub fn upstream<S: Into<String>>(msg: S) -> Self {
        MirrorError::UpstreamUnavailable(msg.into())
    }

    /// Create an invalid-argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        MirrorError::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MirrorError::Config(msg.into())
    }

    /// Check if error is retryable on the next scheduled refresh
    pub fn is_retryable(&self) -> bool {
        matches!(self, MirrorError::UpstreamUnavailable(_))
    }

    /// Check if error is the benign shutdown signal
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, MirrorError::ChannelClosed)
    }
}
