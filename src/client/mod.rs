//! Gateway transport contract
//!
//! The narrow async contract the synchronization coordinator speaks to the
//! transport/protocol client through. The wire protocol itself (BACnet/IP
//! framing, gateway authentication) lives behind implementations of
//! [`GatewayClient`] and is out of scope for this crate.

use crate::error::Result;
use crate::model::{DeviceTree, ObjectUpdate};
use crate::normalize::PropertyKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A protocol-level write request: device, object, resolved property and
/// value, plus the optional array index and priority slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub device_id: String,
    pub object_id: String,
    /// `None` forwards unset and lets the gateway pick the protocol default
    pub property: Option<PropertyKey>,
    /// `None` relinquishes a priority-array write
    pub value: Option<serde_json::Value>,
    pub array_index: Option<u32>,
    pub priority: Option<u8>,
}

impl WriteRequest {
    pub fn new(device_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            object_id: object_id.into(),
            property: None,
            value: None,
            array_index: None,
            priority: None,
        }
    }

    /// An empty write that releases a priority-array slot
    pub fn release(device_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self::new(device_id, object_id)
    }

    pub fn with_property(mut self, property: Option<PropertyKey>) -> Self {
        self.property = property;
        self
    }

    pub fn with_value(mut self, value: Option<serde_json::Value>) -> Self {
        self.value = value;
        self
    }

    pub fn with_array_index(mut self, array_index: Option<u32>) -> Self {
        self.array_index = array_index;
        self
    }

    pub fn with_priority(mut self, priority: Option<u8>) -> Self {
        self.priority = priority;
        self
    }
}

/// Transport/protocol client contract.
///
/// Failure signals: [`MirrorError::ChannelClosed`](crate::MirrorError) is
/// the benign connection-closed condition; any other error is a protocol
/// failure and degrades the session.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Open the push channel
    async fn connect(&self) -> Result<()>;

    /// Close the push channel. Must be safe to call when already closed.
    async fn disconnect(&self) -> Result<()>;

    /// Receive push messages into `sink` until the channel closes. Returns
    /// `ChannelClosed` on graceful close, any other error on failure.
    async fn listen(&self, sink: mpsc::UnboundedSender<ObjectUpdate>) -> Result<()>;

    /// Poll the gateway for the device tree, either a full snapshot or an
    /// incremental delta.
    async fn update(&self, full_update: bool) -> Result<DeviceTree>;

    /// Forward a property write to the gateway
    async fn write_property(&self, request: WriteRequest) -> Result<()>;
}
