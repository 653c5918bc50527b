//! Metrics module for subscription-service.
//! Provides Prometheus metrics for store queries and subscription operations.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

/// Database query duration histogram
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "subscription_db_query_duration_seconds",
            "Database query duration"
        ),
        &["operation"]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

/// Subscription operations by operation type and outcome
pub static SUBSCRIPTION_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "subscription_operations_total",
            "Total subscription operations by operation type and status"
        ),
        &["operation", "status"]
    )
    .expect("Failed to register SUBSCRIPTION_OPERATIONS_TOTAL")
});

/// Force registration so `/metrics` lists every series from the first scrape.
pub fn init_metrics() {
    Lazy::force(&DB_QUERY_DURATION);
    Lazy::force(&SUBSCRIPTION_OPERATIONS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUESTS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUEST_DURATION);
}

/// Record the outcome of a service-level operation.
pub fn record_subscription_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    SUBSCRIPTION_OPERATIONS_TOTAL
        .with_label_values(&[operation, status])
        .inc();
}

/// Render the default registry in the Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
