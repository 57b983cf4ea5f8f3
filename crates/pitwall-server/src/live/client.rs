//! Per-connection state shared between the control reader and deliverer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::protocol::ReadingFrame;
use super::subscriptions::Subscriptions;

/// Messages queued for one connection's deliverer.
#[derive(Debug)]
pub enum Outbound {
    /// A broadcast reading, filtered against subscriptions at send time.
    Reading(Arc<ReadingFrame>),
    /// Literal text, used for protocol notices.
    Text(String),
    /// Close marker: everything queued ahead of it is flushed first.
    Shutdown,
}

/// One live connection.
///
/// Handles are shared between the dispatcher, the control reader, and the
/// deliverer. The control reader is the only writer of [`Subscriptions`];
/// everything else reads.
pub struct LiveClient {
    /// Process-unique id, also the dispatcher registry key.
    pub id: String,
    tx: mpsc::Sender<Outbound>,
    subscriptions: Subscriptions,
    cancel: CancellationToken,
    dropped_frames: AtomicU64,
    last_pong: Mutex<Instant>,
}

impl LiveClient {
    /// Create a client together with the receiving end of its inbox.
    pub(crate) fn new(inbox_capacity: usize) -> (Arc<Self>, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(inbox_capacity);
        let client = Arc::new(Self {
            id: format!("client_{}", Uuid::now_v7()),
            tx,
            subscriptions: Subscriptions::new(),
            cancel: CancellationToken::new(),
            dropped_frames: AtomicU64::new(0),
            last_pong: Mutex::new(Instant::now()),
        });
        (client, rx)
    }

    /// This connection's interest set.
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Token cancelled when either connection task has to stop.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel both connection tasks.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }

    /// Queue a broadcast frame without blocking.
    ///
    /// A full or closed inbox drops the frame; the error carries the
    /// cumulative drop count so the caller can apply its slow-consumer
    /// policy.
    pub(crate) fn push_frame(&self, frame: Arc<ReadingFrame>) -> Result<(), u64> {
        match self.tx.try_send(Outbound::Reading(frame)) {
            Ok(()) => Ok(()),
            Err(_) => Err(self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1),
        }
    }

    /// Queue literal text; silently dropped if the inbox is full or closed.
    pub(crate) fn push_text(&self, text: impl Into<String>) {
        let _ = self.tx.try_send(Outbound::Text(text.into()));
    }

    /// Queue the close marker behind everything already in the inbox.
    pub(crate) fn begin_shutdown(&self) {
        let _ = self.tx.try_send(Outbound::Shutdown);
    }

    /// Frames lost to a full inbox over this connection's lifetime.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Record client activity for liveness tracking.
    pub fn mark_alive(&self) {
        *self.last_pong.lock() = Instant::now();
    }

    /// Time since the client last showed signs of life.
    pub fn last_activity_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pitwall_core::{Reading, SensorIdentity};

    use super::*;

    fn make_frame() -> Arc<ReadingFrame> {
        let reading = Reading::new(
            SensorIdentity::new("battery", "module1", "ntc3"),
            23.5,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        );
        Arc::new(ReadingFrame::new(&reading).unwrap())
    }

    #[tokio::test]
    async fn ids_are_unique_and_prefixed() {
        let (a, _rx_a) = LiveClient::new(4);
        let (b, _rx_b) = LiveClient::new(4);
        assert!(a.id.starts_with("client_"));
        assert!(b.id.starts_with("client_"));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn push_frame_counts_drops_once_full() {
        let (client, _rx) = LiveClient::new(1);
        assert!(client.push_frame(make_frame()).is_ok());
        assert_eq!(client.push_frame(make_frame()), Err(1));
        assert_eq!(client.push_frame(make_frame()), Err(2));
        assert_eq!(client.dropped_frames(), 2);
    }

    #[tokio::test]
    async fn queued_text_is_flushed_before_shutdown_marker() {
        let (client, mut rx) = LiveClient::new(4);
        client.push_text("bad request");
        client.begin_shutdown();

        assert!(matches!(rx.recv().await, Some(Outbound::Text(text)) if text == "bad request"));
        assert!(matches!(rx.recv().await, Some(Outbound::Shutdown)));
    }

    #[tokio::test]
    async fn push_to_closed_inbox_does_not_panic() {
        let (client, rx) = LiveClient::new(1);
        drop(rx);
        client.push_text("late");
        client.begin_shutdown();
        assert_eq!(client.push_frame(make_frame()), Err(1));
    }

    #[tokio::test]
    async fn disconnect_cancels_token() {
        let (client, _rx) = LiveClient::new(1);
        let token = client.cancel_token();
        assert!(!token.is_cancelled());
        client.disconnect();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn mark_alive_resets_activity_clock() {
        let (client, _rx) = LiveClient::new(1);
        client.mark_alive();
        assert!(client.last_activity_elapsed() < Duration::from_secs(1));
    }
}
