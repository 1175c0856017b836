//! Prometheus metrics for search and ingestion.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of hybrid search requests
    pub static ref SEARCH_REQUESTS: Counter = Counter::with_opts(
        Opts::new("qasearch_search_requests_total", "Total number of search requests")
    ).expect("Failed to create SEARCH_REQUESTS counter");

    /// Search requests that failed on an upstream backend, by backend
    pub static ref SEARCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("qasearch_search_failures_total", "Search requests failed by backend"),
        &["backend"]
    ).expect("Failed to create SEARCH_FAILURES counter");

    /// End-to-end hybrid search latency in seconds
    pub static ref SEARCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new("qasearch_search_latency_seconds", "Search request latency in seconds")
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("Failed to create SEARCH_LATENCY histogram");

    /// Number of fused results returned per request
    pub static ref SEARCH_RESULTS: Histogram = Histogram::with_opts(
        HistogramOpts::new("qasearch_search_results_count", "Number of fused results per request")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0])
    ).expect("Failed to create SEARCH_RESULTS histogram");

    /// Rows written to the relational store, by table
    pub static ref ROWS_LOADED: IntCounterVec = IntCounterVec::new(
        Opts::new("qasearch_rows_loaded_total", "Rows upserted into PostgreSQL"),
        &["table"]
    ).expect("Failed to create ROWS_LOADED counter");

    /// Records upserted into the vector index
    pub static ref VECTOR_RECORDS_UPSERTED: Counter = Counter::with_opts(
        Opts::new("qasearch_vector_records_upserted_total", "Records upserted into the vector index")
    ).expect("Failed to create VECTOR_RECORDS_UPSERTED counter");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; repeated registrations are ignored.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_FAILURES.clone()),
        Box::new(SEARCH_LATENCY.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(ROWS_LOADED.clone()),
        Box::new(VECTOR_RECORDS_UPSERTED.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to register metric"),
        }
    }
}

/// Encode every registered metric in the Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}
