//! BACnet gateway state mirror in Rust
//!
//! This crate maintains a live, queryable mirror of a BACnet/IP gateway's
//! device/object tree inside a host application and presents derived values
//! (engineering-unit conversion, rounding, enumerated-state decoding) to
//! consumers that do not speak the wire protocol.
//!
//! # Features
//!
//! - Periodic full/incremental polling with opportunistic switch to a
//!   push-update channel
//! - Degraded-mode recovery: the last known tree keeps serving while the
//!   next refresh is forced to a full poll
//! - Topology watchdog requesting a session reload when new devices or
//!   objects appear
//! - Pure value normalization: unit mapping, device-class inference,
//!   resolution-driven rounding, multi-state and binary decoding
//! - Write-back path translating host keys into protocol
//!   property/value/priority tuples

// Core modules
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod units;
pub mod watchdog;

// Test support
pub mod mock;

// Re-export main types for convenience
pub use config::GatewayConfig;
pub use coordinator::{SessionEvent, SessionState, SyncCoordinator};
pub use error::{MirrorError, Result};
pub use model::DeviceTree;
pub use watchdog::TopologyWatchdog;
