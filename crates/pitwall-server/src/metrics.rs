//! Metric name constants.
//!
//! Counters and gauges are recorded through the `metrics` facade; the
//! process decides at startup whether any recorder is installed.

/// Readings accepted by the ingestion pipeline (counter).
pub const INGEST_READINGS_TOTAL: &str = "ingest_readings_total";
/// Publishes rejected before persistence (counter, labels: kind).
pub const INGEST_ERRORS_TOTAL: &str = "ingest_errors_total";
/// Live connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Live disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active live connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Frames dropped because a delivery inbox was full (counter).
pub const WS_DELIVERY_DROPS_TOTAL: &str = "ws_delivery_drops_total";
/// Clients cut off for falling too far behind (counter).
pub const WS_SLOW_DISCONNECTS_TOTAL: &str = "ws_slow_disconnects_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            INGEST_READINGS_TOTAL,
            INGEST_ERRORS_TOTAL,
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            WS_DELIVERY_DROPS_TOTAL,
            WS_SLOW_DISCONNECTS_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
