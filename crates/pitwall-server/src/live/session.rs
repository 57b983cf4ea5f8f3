//! Live connection lifecycle: control loop, delivery loop, teardown.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::{LiveClient, Outbound};
use super::protocol::{self, ControlMessage};
use crate::server::AppState;

/// How long queued frames may keep flushing after the control loop ends.
const FLUSH_GRACE: Duration = Duration::from_secs(5);

/// Drive one upgraded live connection until either side ends it.
///
/// The control reader runs inline and owns the read half; the deliverer
/// runs as a task and owns the write half. Whichever stops first drags
/// the other down through the client's cancellation token.
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sink, stream) = socket.split();
    let (client, inbox) = state.dispatcher.register().await;
    let cancel = client.cancel_token();

    let mut deliverer = tokio::spawn(deliver(
        client.clone(),
        sink,
        inbox,
        state.config.ping_interval,
        state.config.pong_timeout,
        cancel.clone(),
    ));

    read_controls(&client, stream, &cancel).await;

    state.dispatcher.deregister(&client.id).await;
    client.begin_shutdown();
    if timeout(FLUSH_GRACE, &mut deliverer).await.is_err() {
        deliverer.abort();
    }
    cancel.cancel();
    info!(client_id = %client.id, "live client disconnected");
}

/// Apply track/untrack requests until the client leaves, sends something
/// unreadable, or the connection is cancelled from the delivery side.
async fn read_controls(
    client: &Arc<LiveClient>,
    mut stream: SplitStream<WebSocket>,
    cancel: &CancellationToken,
) {
    loop {
        let message = tokio::select! {
            next = stream.next() => match next {
                Some(Ok(message)) => message,
                Some(Err(err)) => {
                    debug!(client_id = %client.id, error = %err, "live read failed");
                    return;
                }
                None => return,
            },
            () = cancel.cancelled() => return,
        };

        match message {
            Message::Text(text) => {
                client.mark_alive();
                match protocol::parse_control(text.as_str()) {
                    Ok(control) => apply_control(client, &control),
                    Err(err) => {
                        warn!(client_id = %client.id, error = %err, "rejecting control message");
                        client.push_text(protocol::BAD_REQUEST);
                        return;
                    }
                }
            }
            Message::Pong(_) | Message::Ping(_) => client.mark_alive(),
            Message::Close(_) => return,
            Message::Binary(_) => {}
        }
    }
}

fn apply_control(client: &Arc<LiveClient>, control: &ControlMessage) {
    let identity = control.identity();
    if control.track {
        debug!(client_id = %client.id, topic = %identity, "tracking sensor");
        client.subscriptions().track(identity);
    } else {
        debug!(client_id = %client.id, topic = %identity, "untracking sensor");
        client.subscriptions().untrack(&identity);
    }
}

/// Forward matching frames to the client and keep the socket alive with
/// pings; exits on write failure, cancellation, or the shutdown marker.
async fn deliver(
    client: Arc<LiveClient>,
    mut sink: SplitSink<WebSocket, Message>,
    mut inbox: mpsc::Receiver<Outbound>,
    ping_interval: Duration,
    pong_timeout: Duration,
    cancel: CancellationToken,
) {
    let mut ping = interval(ping_interval);
    ping.tick().await; // the first tick completes immediately

    loop {
        tokio::select! {
            queued = inbox.recv() => match queued {
                Some(Outbound::Reading(frame)) => {
                    if !client.subscriptions().matches(&frame.identity) {
                        continue;
                    }
                    if sink.send(Message::Text(frame.json.clone().into())).await.is_err() {
                        debug!(client_id = %client.id, "live write failed");
                        break;
                    }
                }
                Some(Outbound::Text(text)) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(Outbound::Shutdown) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = ping.tick() => {
                if client.last_activity_elapsed() > pong_timeout {
                    warn!(client_id = %client.id, "no pong within timeout, closing");
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            () = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
        }
    }

    // Drag the control loop down with us.
    cancel.cancel();
}
