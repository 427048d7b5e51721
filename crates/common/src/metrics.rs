//! Process-wide Prometheus metrics (default registry).

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

/// Record operations by collection, operation and outcome.
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "recipe_api_operations_total",
        "Total record operations handled, by collection, operation and outcome",
        &["collection", "operation", "outcome"]
    )
    .expect("register operations_total")
});

/// Count one finished operation.
pub fn record_operation(collection: &str, operation: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    OPERATIONS_TOTAL
        .with_label_values(&[collection, operation, outcome])
        .inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
