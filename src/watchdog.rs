//! Topology watchdog
//!
//! The push channel's message schema never announces newly appeared
//! devices or objects, so topology growth can only be detected by polling
//! cardinality. The watchdog ticks on a fixed interval, compares the tree
//! against its last-recorded snapshot and requests a full session reload
//! when either the device count or any known device's object count grew.
//! The reload is requested, never awaited, so a tick can never block.

use crate::model::{DeviceTree, TreeSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default tick interval
pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(30);

/// Request for a full session reload, sent to the owning host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadRequest;

/// Periodic cardinality check over the mirrored tree
pub struct TopologyWatchdog {
    tree: Arc<RwLock<DeviceTree>>,
    interval: Duration,
    snapshot: RwLock<TreeSnapshot>,
    /// Set while a requested reload is outstanding; suppresses duplicate
    /// requests until the host acknowledges completion.
    reload_pending: AtomicBool,
}

impl TopologyWatchdog {
    pub fn new(tree: Arc<RwLock<DeviceTree>>, interval: Duration) -> Arc<Self> {
        Arc::new(Self {
            tree,
            interval,
            snapshot: RwLock::new(TreeSnapshot::default()),
            reload_pending: AtomicBool::new(false),
        })
    }

    pub fn with_default_interval(tree: Arc<RwLock<DeviceTree>>) -> Arc<Self> {
        Self::new(tree, DEFAULT_WATCHDOG_INTERVAL)
    }

    /// Whether a requested reload is still outstanding
    pub fn reload_pending(&self) -> bool {
        self.reload_pending.load(Ordering::SeqCst)
    }

    /// Called by the host once the session reload completed: refreshes the
    /// cardinality snapshot and re-arms growth detection.
    pub async fn acknowledge_reload(&self) {
        let snapshot = TreeSnapshot::capture(&*self.tree.read().await);
        *self.snapshot.write().await = snapshot;
        self.reload_pending.store(false, Ordering::SeqCst);
        debug!("Topology snapshot refreshed after reload");
    }

    /// Run the watchdog until cancelled. Captures the initial snapshot once
    /// at startup, then compares cardinality on every tick.
    pub async fn run(
        self: Arc<Self>,
        reload_tx: mpsc::UnboundedSender<ReloadRequest>,
        cancel: CancellationToken,
    ) {
        {
            let snapshot = TreeSnapshot::capture(&*self.tree.read().await);
            *self.snapshot.write().await = snapshot;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => {
                    debug!("Topology watchdog stopped");
                    return;
                }
            }

            if self.reload_pending.load(Ordering::SeqCst) {
                continue;
            }

            let grew = {
                let tree = self.tree.read().await;
                self.snapshot.read().await.grew_since(&tree)
            };
            if grew {
                info!("Topology growth detected, requesting session reload");
                self.reload_pending.store(true, Ordering::SeqCst);
                if reload_tx.send(ReloadRequest).is_err() {
                    debug!("Reload receiver dropped, stopping topology watchdog");
                    return;
                }
            }
        }
    }
}
