//! # pitwall-server
//!
//! HTTP + WebSocket surface of the telemetry pipeline. Publishers POST
//! binary readings per topic; the server decodes and persists each one,
//! then fans it out to every live WebSocket client tracking that sensor.
//!
//! - [`ingest`]: the parse → resolve → decode → persist → broadcast
//!   pipeline
//! - [`live`]: connection registry, per-connection subscriptions, wire
//!   protocol
//! - [`server`]: router, handlers, and the listener lifecycle

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod ingest;
pub mod live;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use ingest::{IngestError, Ingestor};
pub use live::Dispatcher;
pub use server::{AppState, TelemetryServer};
pub use shutdown::ShutdownCoordinator;
