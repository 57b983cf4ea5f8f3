//! Fan-out of ingested readings to live connections.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{counter, gauge};
use pitwall_core::Reading;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use super::client::{LiveClient, Outbound};
use super::protocol::ReadingFrame;
use crate::metrics::{
    WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DELIVERY_DROPS_TOTAL,
    WS_DISCONNECTIONS_TOTAL, WS_SLOW_DISCONNECTS_TOTAL,
};

/// Registry of live connections and the broadcast entry point.
///
/// The dispatcher is identity-agnostic: every registered client is handed
/// every frame and filters in its own deliverer, so adding clients never
/// changes the broadcast path. A client whose inbox is full loses that
/// frame rather than stalling the others, and is cut off once its
/// cumulative losses reach `max_dropped_frames`.
pub struct Dispatcher {
    clients: RwLock<HashMap<String, Arc<LiveClient>>>,
    inbox_capacity: usize,
    max_dropped_frames: u64,
}

impl Dispatcher {
    /// Empty registry with the given per-client inbox policy.
    pub fn new(inbox_capacity: usize, max_dropped_frames: u64) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            inbox_capacity,
            max_dropped_frames,
        }
    }

    /// Create a client, add it to the broadcast set, and hand back its inbox.
    pub async fn register(&self) -> (Arc<LiveClient>, mpsc::Receiver<Outbound>) {
        let (client, inbox) = LiveClient::new(self.inbox_capacity);
        let count = {
            let mut clients = self.clients.write().await;
            let _ = clients.insert(client.id.clone(), client.clone());
            clients.len()
        };
        counter!(WS_CONNECTIONS_TOTAL).increment(1);
        gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
        info!(client_id = %client.id, connections = count, "live client registered");
        (client, inbox)
    }

    /// Remove a client from the broadcast set. Safe to call twice.
    ///
    /// Does not cancel the client; teardown order is the session's call.
    pub async fn deregister(&self, client_id: &str) {
        let (removed, count) = {
            let mut clients = self.clients.write().await;
            (clients.remove(client_id).is_some(), clients.len())
        };
        if removed {
            counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
            gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
            debug!(client_id, connections = count, "live client deregistered");
        }
    }

    /// Broadcast one ingested reading to every live client.
    ///
    /// The frame is serialized once and shared; per-client failures only
    /// affect that client.
    pub async fn broadcast(&self, reading: &Reading) {
        let frame = match ReadingFrame::new(reading) {
            Ok(frame) => Arc::new(frame),
            Err(err) => {
                warn!(error = %err, "failed to render reading frame");
                return;
            }
        };

        let mut slow = Vec::new();
        {
            let clients = self.clients.read().await;
            for client in clients.values() {
                if let Err(drops) = client.push_frame(frame.clone()) {
                    counter!(WS_DELIVERY_DROPS_TOTAL).increment(1);
                    warn!(client_id = %client.id, drops, "delivery inbox full, frame dropped");
                    if drops >= self.max_dropped_frames {
                        slow.push(client.id.clone());
                    }
                }
            }
        }

        for client_id in slow {
            self.disconnect_slow(&client_id).await;
        }
    }

    /// Number of currently registered clients.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Cancel every client; used during server shutdown.
    pub async fn shutdown_all(&self) {
        let clients: Vec<Arc<LiveClient>> = {
            let mut registry = self.clients.write().await;
            registry.drain().map(|(_, client)| client).collect()
        };
        if clients.is_empty() {
            return;
        }
        info!(count = clients.len(), "closing live connections");
        gauge!(WS_CONNECTIONS_ACTIVE).set(0.0);
        for client in clients {
            client.disconnect();
        }
    }

    async fn disconnect_slow(&self, client_id: &str) {
        let (removed, count) = {
            let mut clients = self.clients.write().await;
            (clients.remove(client_id), clients.len())
        };
        if let Some(client) = removed {
            counter!(WS_SLOW_DISCONNECTS_TOTAL).increment(1);
            counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
            gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
            warn!(
                client_id = %client.id,
                drops = client.dropped_frames(),
                "disconnecting slow consumer"
            );
            client.disconnect();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
