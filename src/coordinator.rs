//! Synchronization coordinator
//!
//! Owns the refresh/push lifecycle for one gateway session: an initial full
//! poll populates the device tree, a push channel is then opened
//! opportunistically, and on channel failure the session degrades and falls
//! back to periodic polls until the next successful refresh restarts the
//! push loop. All tree mutation is funneled through this type; listeners
//! receive read-only views.

use crate::client::{GatewayClient, WriteRequest};
use crate::error::{MirrorError, Result};
use crate::model::DeviceTree;
use crate::normalize::PropertyKey;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Session lifecycle state. `Idle` is the only initial state; there is no
/// terminal state while the session lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Polling,
    PushActive,
    PollingFallback,
    Degraded,
}

/// Notification fanned out to session listeners
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The tree changed: one per applied poll and one per applied push
    /// message, carrying the latest tree.
    Updated {
        tree: Arc<DeviceTree>,
        at: DateTime<Utc>,
    },
    /// The session degraded: once per failure transition, no payload
    Degraded,
}

/// Synchronization coordinator for one gateway session
pub struct SyncCoordinator {
    client: Arc<dyn GatewayClient>,
    tree: Arc<RwLock<DeviceTree>>,
    state: RwLock<SessionState>,
    listeners: RwLock<Vec<mpsc::UnboundedSender<SessionEvent>>>,
    /// Single-flight guard: at most one push loop per session. Restart
    /// happens only via the next successful refresh, never from inside the
    /// loop, so a reconnect storm cannot race the poll path.
    push_loop_active: AtomicBool,
    push_task: Mutex<Option<JoinHandle<()>>>,
    last_refresh_ok: AtomicBool,
    shutdown_token: Mutex<CancellationToken>,
    shutdown_done: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(client: Arc<dyn GatewayClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            tree: Arc::new(RwLock::new(DeviceTree::new())),
            state: RwLock::new(SessionState::Idle),
            listeners: RwLock::new(Vec::new()),
            push_loop_active: AtomicBool::new(false),
            push_task: Mutex::new(None),
            last_refresh_ok: AtomicBool::new(true),
            shutdown_token: Mutex::new(CancellationToken::new()),
            shutdown_done: AtomicBool::new(false),
        })
    }

    /// Shared handle to the mirrored tree, read-only by convention. The
    /// topology watchdog observes cardinality through this.
    pub fn tree(&self) -> Arc<RwLock<DeviceTree>> {
        Arc::clone(&self.tree)
    }

    /// Clone of the current tree
    pub async fn snapshot(&self) -> DeviceTree {
        self.tree.read().await.clone()
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn is_degraded(&self) -> bool {
        self.state().await == SessionState::Degraded
    }

    /// Register a session listener
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.write().await.push(tx);
        rx
    }

    /// Poll the gateway and apply the result to the tree.
    ///
    /// A full update is forced whenever the previous refresh failed, since
    /// staleness cannot be trusted incrementally. On success the push
    /// channel is (re)established as a fire-and-forget background activity;
    /// on failure the previous tree is retained and the session degrades.
    pub async fn refresh(self: &Arc<Self>, full_update: bool) -> Result<DeviceTree> {
        let force_full = full_update || !self.last_refresh_ok.load(Ordering::SeqCst);
        self.set_state(SessionState::Polling).await;

        match self.client.update(force_full).await {
            Ok(snapshot) => {
                let tree = {
                    let mut guard = self.tree.write().await;
                    guard.apply_snapshot(snapshot);
                    guard.clone()
                };
                self.last_refresh_ok.store(true, Ordering::SeqCst);
                self.set_state(SessionState::PollingFallback).await;
                self.notify(SessionEvent::Updated {
                    tree: Arc::new(tree.clone()),
                    at: Utc::now(),
                })
                .await;
                self.spawn_push_loop();
                Ok(tree)
            }
            Err(e) => {
                self.last_refresh_ok.store(false, Ordering::SeqCst);
                self.enter_degraded().await;
                Err(MirrorError::upstream(format!(
                    "invalid response from gateway: {e}"
                )))
            }
        }
    }

    /// Translate a host write request into a protocol property/value tuple
    /// and forward it. No retry, no queueing; a degraded session rejects
    /// writes immediately.
    pub async fn write_property(
        &self,
        device_id: &str,
        object_id: &str,
        property_key: Option<&str>,
        value: Option<serde_json::Value>,
        array_index: Option<u32>,
        priority: Option<u8>,
    ) -> Result<()> {
        if self.is_degraded().await {
            return Err(MirrorError::upstream(
                "session degraded, write rejected".to_string(),
            ));
        }
        if priority.is_some() {
            // Known limitation carried from the gateway: the priority slot
            // is accepted but not honored by the observed write path.
            warn!("Write priority is currently not functioning; forwarding as-is");
        }
        let request = WriteRequest::new(device_id, object_id)
            .with_property(PropertyKey::resolve(property_key))
            .with_value(value)
            .with_array_index(array_index)
            .with_priority(priority);
        self.client.write_property(request).await
    }

    /// Write an empty present value to release a higher-priority write slot
    pub async fn write_release(&self, device_id: &str, object_id: &str) -> Result<()> {
        if self.is_degraded().await {
            return Err(MirrorError::upstream(
                "session degraded, write rejected".to_string(),
            ));
        }
        self.client
            .write_property(WriteRequest::release(device_id, object_id))
            .await
    }

    /// Shut the session down. Idempotent: the cancellation token fires once
    /// and the push channel is closed by the loop's own cleanup, so the
    /// connection is never double-closed.
    pub async fn shutdown(&self) {
        if self.shutdown_done.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down gateway session");
        self.current_token().cancel();
        let task = self.push_task.lock().expect("push task lock").take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Re-initialize the session at `Idle`, the reload entry point used
    /// after the watchdog detects topology growth. The old push loop
    /// observes cancellation before the new session state is entered, so a
    /// stale loop can never mutate the reloaded tree.
    pub async fn reset(&self) {
        let old_token = self.current_token();
        old_token.cancel();
        let task = self.push_task.lock().expect("push task lock").take();
        if let Some(task) = task {
            let _ = task.await;
        }
        *self.shutdown_token.lock().expect("shutdown token lock") = CancellationToken::new();
        self.shutdown_done.store(false, Ordering::SeqCst);
        // Force the next poll to be full; the reloaded session starts from
        // an untrusted tree.
        self.last_refresh_ok.store(false, Ordering::SeqCst);
        self.set_state(SessionState::Idle).await;
    }

    fn current_token(&self) -> CancellationToken {
        self.shutdown_token
            .lock()
            .expect("shutdown token lock")
            .clone()
    }

    /// Start the push loop unless one is already running for this session
    fn spawn_push_loop(self: &Arc<Self>) {
        if self
            .push_loop_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let this = Arc::clone(self);
        let cancel = self.current_token();
        let task = tokio::spawn(async move {
            this.maintain_push_channel(cancel).await;
        });
        *self.push_task.lock().expect("push task lock") = Some(task);
    }

    /// Long-lived push-channel activity, one instance at a time per session.
    ///
    /// A graceful close exits silently; any other channel error marks the
    /// session degraded and notifies listeners once. The loop never
    /// restarts itself; restart is triggered only by the next successful
    /// refresh.
    async fn maintain_push_channel(self: Arc<Self>, cancel: CancellationToken) {
        match self.run_push_channel(&cancel).await {
            Ok(()) | Err(MirrorError::ChannelClosed) => {
                debug!("Push channel closed");
            }
            Err(e) => {
                warn!(error = %e, "Push channel failed");
                self.last_refresh_ok.store(false, Ordering::SeqCst);
                self.enter_degraded().await;
            }
        }
        if let Err(e) = self.client.disconnect().await {
            debug!(error = %e, "Push channel disconnect reported an error");
        }
        self.push_loop_active.store(false, Ordering::SeqCst);
    }

    async fn run_push_channel(&self, cancel: &CancellationToken) -> Result<()> {
        let connected = tokio::select! {
            res = self.client.connect() => res,
            _ = cancel.cancelled() => return Err(MirrorError::ChannelClosed),
        };
        if let Err(e) = connected {
            // Push stays unavailable until the next refresh retries it;
            // polling continues meanwhile.
            info!(error = %e, "Push channel unavailable, staying on polling fallback");
            return Ok(());
        }

        self.set_state(SessionState::PushActive).await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let listen = self.client.listen(tx);
        tokio::pin!(listen);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(MirrorError::ChannelClosed),
                res = &mut listen => return res,
                maybe_update = rx.recv() => {
                    let Some(update) = maybe_update else {
                        return Err(MirrorError::ChannelClosed);
                    };
                    let applied = {
                        let mut guard = self.tree.write().await;
                        guard.apply_update(update)
                    };
                    if applied {
                        let tree = Arc::new(self.tree.read().await.clone());
                        self.notify(SessionEvent::Updated { tree, at: Utc::now() }).await;
                    }
                }
            }
        }
    }

    async fn enter_degraded(&self) {
        {
            let mut state = self.state.write().await;
            if *state == SessionState::Degraded {
                return;
            }
            debug!(from = ?*state, "Session state -> Degraded");
            *state = SessionState::Degraded;
        }
        self.notify(SessionEvent::Degraded).await;
    }

    async fn set_state(&self, next: SessionState) {
        let mut state = self.state.write().await;
        if *state != next {
            debug!(from = ?*state, to = ?next, "Session state transition");
            *state = next;
        }
    }

    async fn notify(&self, event: SessionEvent) {
        let mut listeners = self.listeners.write().await;
        listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
