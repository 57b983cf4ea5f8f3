//! HTTP and WebSocket surface of the telemetry server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pitwall_store::ReadingStore;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::health::{HealthResponse, health_check};
use crate::ingest::{IngestError, Ingestor};
use crate::live::{Dispatcher, session};
use crate::shutdown::ShutdownCoordinator;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    /// Fan-out registry for live connections.
    pub dispatcher: Arc<Dispatcher>,
    /// Ingestion pipeline.
    pub ingestor: Arc<Ingestor>,
    /// Connection limits and timings.
    pub config: Arc<ServerConfig>,
    /// Process start, for health uptime.
    pub started_at: Instant,
}

/// The telemetry server: ingestion endpoint, live fan-out, health.
pub struct TelemetryServer {
    config: Arc<ServerConfig>,
    state: AppState,
    shutdown: ShutdownCoordinator,
}

impl TelemetryServer {
    /// Wire the pipeline onto `store` with the given config.
    pub fn new(config: ServerConfig, store: Arc<dyn ReadingStore>) -> Self {
        let config = Arc::new(config);
        let dispatcher = Arc::new(Dispatcher::new(
            config.inbox_capacity,
            config.max_dropped_frames,
        ));
        let ingestor = Arc::new(Ingestor::new(store, dispatcher.clone()));
        let state = AppState {
            dispatcher,
            ingestor,
            config: config.clone(),
            started_at: Instant::now(),
        };
        Self {
            config,
            state,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Shutdown coordinator shared with the process entry point.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Build the router; split out so tests can drive it without a socket.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown.
    ///
    /// Returns the bound address once the listener is accepting, which is
    /// how a port `0` config learns its real port.
    pub async fn listen(&self) -> std::io::Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "telemetry server listening");

        let router = self.router();
        let token = self.shutdown.token();
        self.shutdown.register_task(tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned());
            if let Err(err) = serve.await {
                error!(error = %err, "server error");
            }
        }));

        // Live connections only unwind once their clients are cancelled.
        let dispatcher = self.state.dispatcher.clone();
        let token = self.shutdown.token();
        self.shutdown.register_task(tokio::spawn(async move {
            token.cancelled().await;
            dispatcher.shutdown_all().await;
        }));

        Ok(local_addr)
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ingest/{*topic}", post(ingest_reading))
        .route("/live", get(live_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /health`
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_check(
        state.started_at,
        state.dispatcher.connection_count().await,
        state.ingestor.readings_ingested(),
    ))
}

/// `POST /ingest/{*topic}` — one publish: raw payload in, stored reading out.
async fn ingest_reading(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    body: Bytes,
) -> Response {
    match state.ingestor.ingest(&topic, &body).await {
        Ok(reading) => (StatusCode::ACCEPTED, Json(reading)).into_response(),
        Err(err) => {
            let status = error_status(&err);
            (status, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

fn error_status(err: &IngestError) -> StatusCode {
    match err {
        IngestError::Topic(_) | IngestError::Payload(_) => StatusCode::BAD_REQUEST,
        IngestError::UnknownSensor { .. } => StatusCode::NOT_FOUND,
        IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /live` — upgrade to the live delivery protocol.
async fn live_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| session::handle_socket(socket, state))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use pitwall_core::{PayloadError, SensorIdentity, TopicError, encode_payload};
    use pitwall_store::{StoreError, TelemetryStore, new_in_memory_pool};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn make_server() -> TelemetryServer {
        let pool = new_in_memory_pool().unwrap();
        let store = TelemetryStore::new(pool).unwrap();
        store
            .seed(&[SensorIdentity::new("battery", "module1", "ntc3")])
            .unwrap();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..ServerConfig::default()
        };
        TelemetryServer::new(config, Arc::new(store))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn publish(topic: &str, payload: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/ingest/{topic}"))
            .body(Body::from(payload.to_vec()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let server = make_server();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(server.router(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connections"], 0);
        assert_eq!(body["readings_ingested"], 0);
    }

    #[tokio::test]
    async fn ingest_accepts_known_sensor() {
        let server = make_server();
        let payload = encode_payload(1_700_000_000, 23.5);
        let (status, body) =
            send(server.router(), publish("battery/module1/ntc3", &payload)).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["section"], "battery");
        assert_eq!(body["module"], "module1");
        assert_eq!(body["sensor"], "ntc3");
        assert_eq!(body["value"], 23.5);
        assert_eq!(body["observedAt"], "2023-11-14T22:13:20Z");
    }

    #[tokio::test]
    async fn ingest_increments_the_health_counter() {
        let server = make_server();
        let payload = encode_payload(1, 1.0);
        let (status, _) =
            send(server.router(), publish("battery/module1/ntc3", &payload)).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, body) = send(server.router(), request).await;
        assert_eq!(body["readings_ingested"], 1);
    }

    #[tokio::test]
    async fn ingest_rejects_two_segment_topic() {
        let server = make_server();
        let (status, body) =
            send(server.router(), publish("battery/ntc3", &encode_payload(1, 1.0))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid topic: battery/ntc3");
    }

    #[tokio::test]
    async fn ingest_rejects_one_segment_topic() {
        let server = make_server();
        let (status, body) =
            send(server.router(), publish("battery", &encode_payload(1, 1.0))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid topic: battery");
    }

    #[tokio::test]
    async fn ingest_rejects_wrong_payload_length() {
        let server = make_server();
        let (status, body) =
            send(server.router(), publish("battery/module1/ntc3", &[0u8; 7])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid payload length: 7");
    }

    #[tokio::test]
    async fn ingest_unknown_sensor_is_not_found() {
        let server = make_server();
        let (status, body) = send(
            server.router(),
            publish("battery/module1/ntc9", &encode_payload(1, 1.0)),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown sensor: battery/module1/ntc9");
    }

    #[tokio::test]
    async fn live_route_requires_an_upgrade() {
        let server = make_server();
        let request = Request::builder().uri("/live").body(Body::empty()).unwrap();
        let (status, _) = send(server.router(), request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = make_server();
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let (status, _) = send(server.router(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_statuses_follow_the_error_class() {
        assert_eq!(
            error_status(&IngestError::Topic(TopicError("a/b".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&IngestError::Payload(PayloadError::Length(7))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&IngestError::UnknownSensor {
                identity: SensorIdentity::new("a", "b", "c")
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&IngestError::Store(StoreError::InvalidIdentity("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
