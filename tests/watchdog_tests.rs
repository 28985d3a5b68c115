//! Integration tests for the topology watchdog
//!
//! Runs on a paused tokio clock: sleeps auto-advance while the runtime is
//! idle, so tick timing is deterministic.

use bacnet_mirror_rust::mock::MockGatewayClient;
use bacnet_mirror_rust::model::{Device, DeviceTree, TreeSnapshot};
use bacnet_mirror_rust::watchdog::{ReloadRequest, TopologyWatchdog};
use bacnet_mirror_rust::SyncCoordinator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

fn tree_with_devices(count: usize) -> DeviceTree {
    let mut tree = DeviceTree::new();
    for i in 0..count {
        tree.devices
            .insert(format!("device:{i}"), Device::default());
    }
    tree
}

#[tokio::test(start_paused = true)]
async fn growth_triggers_exactly_one_reload_request() {
    let tree = Arc::new(RwLock::new(tree_with_devices(2)));
    let watchdog = TopologyWatchdog::new(Arc::clone(&tree), Duration::from_secs(30));
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel::<ReloadRequest>();
    let cancel = CancellationToken::new();

    tokio::spawn(Arc::clone(&watchdog).run(reload_tx, cancel.clone()));
    // Let the watchdog capture its initial snapshot before mutating
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Device count grows from 2 to 3 between ticks
    tree.write().await.devices.insert(
        "device:99".to_string(),
        Device::default(),
    );

    timeout(Duration::from_secs(60), reload_rx.recv())
        .await
        .expect("watchdog never requested a reload")
        .expect("reload channel closed");
    assert!(watchdog.reload_pending());

    // No duplicate requests while the reload is outstanding
    assert!(
        timeout(Duration::from_secs(120), reload_rx.recv())
            .await
            .is_err(),
        "watchdog requested a second reload before acknowledgement"
    );

    // After the reload completes the snapshot is refreshed and growth
    // detection re-arms
    watchdog.acknowledge_reload().await;
    assert!(!watchdog.reload_pending());
    tree.write().await.devices.insert(
        "device:100".to_string(),
        Device::default(),
    );
    timeout(Duration::from_secs(60), reload_rx.recv())
        .await
        .expect("watchdog missed growth after acknowledgement")
        .expect("reload channel closed");

    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn steady_topology_never_requests_reload() {
    let tree = Arc::new(RwLock::new(tree_with_devices(3)));
    let watchdog = TopologyWatchdog::new(Arc::clone(&tree), Duration::from_secs(30));
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel::<ReloadRequest>();
    let cancel = CancellationToken::new();

    tokio::spawn(Arc::clone(&watchdog).run(reload_tx, cancel.clone()));

    assert!(
        timeout(Duration::from_secs(300), reload_rx.recv())
            .await
            .is_err(),
        "watchdog requested a reload without topology growth"
    );
    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn reload_request_drives_session_reset() {
    let client = Arc::new(MockGatewayClient::new().with_tree(tree_with_devices(2)));
    let coordinator = SyncCoordinator::new(client.clone());
    coordinator.refresh(true).await.unwrap();

    let watchdog = TopologyWatchdog::new(coordinator.tree(), Duration::from_secs(30));
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    tokio::spawn(Arc::clone(&watchdog).run(reload_tx, cancel.clone()));
    tokio::time::sleep(Duration::from_millis(1)).await;

    // A new device appears at the gateway and the next poll picks it up
    client.set_tree(tree_with_devices(3));
    coordinator.refresh(false).await.unwrap();

    timeout(Duration::from_secs(60), reload_rx.recv())
        .await
        .expect("watchdog never requested a reload")
        .expect("reload channel closed");

    // Host-side reload: reset the session, re-poll, acknowledge
    coordinator.reset().await;
    coordinator.refresh(true).await.unwrap();
    watchdog.acknowledge_reload().await;

    let snapshot = TreeSnapshot::capture(&*coordinator.tree().read().await);
    assert_eq!(snapshot.device_count, 3);
    assert!(!watchdog.reload_pending());

    cancel.cancel();
    coordinator.shutdown().await;
}
