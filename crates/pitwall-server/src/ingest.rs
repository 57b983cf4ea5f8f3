//! Ingestion pipeline: topic and payload in, persisted and broadcast
//! reading out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use pitwall_core::{PayloadError, Reading, SensorIdentity, TopicError, decode_payload};
use pitwall_store::{ReadingStore, StoreError};
use tracing::{debug, warn};

use crate::live::Dispatcher;
use crate::metrics::{INGEST_ERRORS_TOTAL, INGEST_READINGS_TOTAL};

/// Why a publish was rejected.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Topic did not split into exactly three segments.
    #[error(transparent)]
    Topic(#[from] TopicError),
    /// Payload was not a decodable 8-byte frame.
    #[error(transparent)]
    Payload(#[from] PayloadError),
    /// Identity parsed fine but names no sensor in the catalog.
    #[error("unknown sensor: {identity}")]
    UnknownSensor {
        /// The identity that missed.
        identity: SensorIdentity,
    },
    /// The store failed to resolve or persist.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Topic(_) => "topic",
            Self::Payload(_) => "payload",
            Self::UnknownSensor { .. } => "unknown_sensor",
            Self::Store(_) => "store",
        }
    }
}

/// Orchestrates one publish: parse, resolve, decode, persist, broadcast.
///
/// Holds no cross-call state beyond counters, so concurrent publishes
/// only interact through the store and the dispatcher.
pub struct Ingestor {
    store: Arc<dyn ReadingStore>,
    dispatcher: Arc<Dispatcher>,
    ingested: AtomicU64,
}

impl Ingestor {
    /// Wire the pipeline onto its store and fan-out point.
    pub fn new(store: Arc<dyn ReadingStore>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            store,
            dispatcher,
            ingested: AtomicU64::new(0),
        }
    }

    /// Ingest one publish; errors affect only this call.
    pub async fn ingest(&self, topic: &str, payload: &[u8]) -> Result<Reading, IngestError> {
        let result = self.pipeline(topic, payload).await;
        match &result {
            Ok(reading) => {
                counter!(INGEST_READINGS_TOTAL).increment(1);
                debug!(topic, value = reading.value, "reading ingested");
            }
            Err(err) => {
                counter!(INGEST_ERRORS_TOTAL, "kind" => err.kind()).increment(1);
                warn!(topic, error = %err, "publish rejected");
            }
        }
        result
    }

    async fn pipeline(&self, topic: &str, payload: &[u8]) -> Result<Reading, IngestError> {
        let identity = SensorIdentity::from_topic(topic)?;
        let sensor_id = self
            .store
            .resolve_sensor(&identity)?
            .ok_or_else(|| IngestError::UnknownSensor {
                identity: identity.clone(),
            })?;
        let (observed_at, value) = decode_payload(payload)?;
        let reading = Reading::new(identity, value, observed_at);

        // Persistence first: a reading is only visible live once stored.
        self.store.insert_reading(sensor_id, &reading)?;
        let _ = self.ingested.fetch_add(1, Ordering::Relaxed);
        self.dispatcher.broadcast(&reading).await;
        Ok(reading)
    }

    /// Readings accepted since startup.
    pub fn readings_ingested(&self) -> u64 {
        self.ingested.load(Ordering::Relaxed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
