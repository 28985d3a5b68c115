//! Mock implementations for testing
//!
//! A scriptable [`GatewayClient`] used by the integration tests: polls
//! serve a configurable tree, the push channel replays injected messages
//! and can be closed or failed on demand, and every write request is
//! recorded for assertions.

use crate::client::{GatewayClient, WriteRequest};
use crate::error::{MirrorError, Result};
use crate::model::{DeviceTree, ObjectUpdate};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::{mpsc, Notify};

/// Scripted push-channel event
#[derive(Debug, Clone)]
enum PushScript {
    Update(ObjectUpdate),
    Close,
    Fail(String),
}

/// Mock gateway client for testing
#[derive(Default)]
pub struct MockGatewayClient {
    connected: AtomicBool,
    fail_connect: AtomicBool,
    fail_next_update: AtomicBool,
    fail_writes: AtomicBool,
    tree: Mutex<DeviceTree>,
    script: Mutex<VecDeque<PushScript>>,
    script_ready: Notify,
    update_calls: Mutex<Vec<bool>>,
    write_requests: Mutex<Vec<WriteRequest>>,
    disconnects: AtomicUsize,
}

impl MockGatewayClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tree served by subsequent polls
    pub fn with_tree(self, tree: DeviceTree) -> Self {
        *self.tree.lock().expect("tree lock") = tree;
        self
    }

    pub fn set_tree(&self, tree: DeviceTree) {
        *self.tree.lock().expect("tree lock") = tree;
    }

    /// Make the next poll fail with a protocol error
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    /// Make connect attempts fail
    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Make write requests fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Inject a push message into the open channel
    pub fn push_update(&self, update: ObjectUpdate) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(PushScript::Update(update));
        self.script_ready.notify_one();
    }

    /// Close the push channel gracefully
    pub fn close_channel(&self) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(PushScript::Close);
        self.script_ready.notify_one();
    }

    /// Fail the push channel with a protocol error
    pub fn fail_channel(&self, msg: impl Into<String>) {
        self.script
            .lock()
            .expect("script lock")
            .push_back(PushScript::Fail(msg.into()));
        self.script_ready.notify_one();
    }

    /// The `full_update` flag of every poll made so far
    pub fn update_calls(&self) -> Vec<bool> {
        self.update_calls.lock().expect("update calls lock").clone()
    }

    /// Every write request forwarded so far
    pub fn write_requests(&self) -> Vec<WriteRequest> {
        self.write_requests
            .lock()
            .expect("write requests lock")
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayClient for MockGatewayClient {
    async fn connect(&self) -> Result<()> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(MirrorError::upstream("mock connect refused"));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn listen(&self, sink: mpsc::UnboundedSender<ObjectUpdate>) -> Result<()> {
        loop {
            let item = self.script.lock().expect("script lock").pop_front();
            match item {
                Some(PushScript::Update(update)) => {
                    if sink.send(update).is_err() {
                        return Err(MirrorError::ChannelClosed);
                    }
                }
                Some(PushScript::Close) => return Err(MirrorError::ChannelClosed),
                Some(PushScript::Fail(msg)) => return Err(MirrorError::upstream(msg)),
                None => self.script_ready.notified().await,
            }
        }
    }

    async fn update(&self, full_update: bool) -> Result<DeviceTree> {
        self.update_calls
            .lock()
            .expect("update calls lock")
            .push(full_update);
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(MirrorError::upstream("mock poll failure"));
        }
        Ok(self.tree.lock().expect("tree lock").clone())
    }

    async fn write_property(&self, request: WriteRequest) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MirrorError::upstream("mock write refused"));
        }
        self.write_requests
            .lock()
            .expect("write requests lock")
            .push(request);
        Ok(())
    }
}
