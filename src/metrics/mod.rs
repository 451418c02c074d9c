//! Prometheus metrics for the site server
//!
//! This module provides metrics tracking for:
//! - Page requests: count and latency by route and status
//! - Content API: fetches by resource and outcome, fetch latency
//! - Query cache: hits and misses
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::{Mutex, OnceLock, PoisonError};

// ============================================================================
// Metrics Storage
// ============================================================================

struct SiteMetrics {
    page_requests: CounterVec,
    page_duration: HistogramVec,
    api_fetches: CounterVec,
    api_duration: HistogramVec,
    cache_lookups: CounterVec,
}

static SITE_METRICS: OnceLock<SiteMetrics> = OnceLock::new();

/// Set once initialization was attempted, successful or not
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = kosen_web::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = SiteMetrics {
        page_requests: register_counter_vec!(
            "kosen_page_requests_total",
            "Total page requests by route and status",
            &["route", "status"]
        )?,
        page_duration: register_histogram_vec!(
            "kosen_page_request_duration_seconds",
            "Page request duration in seconds",
            &["route"],
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
        api_fetches: register_counter_vec!(
            "kosen_api_fetches_total",
            "Content API fetches by resource and outcome",
            &["resource", "outcome"]
        )?,
        api_duration: register_histogram_vec!(
            "kosen_api_fetch_duration_seconds",
            "Content API fetch duration in seconds",
            &["resource"],
            vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        )?,
        cache_lookups: register_counter_vec!(
            "kosen_cache_lookups_total",
            "Query cache lookups by result",
            &["result"]
        )?,
    };

    SITE_METRICS.set(metrics).ok();

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    SITE_METRICS.get().is_some()
}

// ============================================================================
// Recording
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a served page
pub fn record_page_request(route: &str, status: u16, duration_secs: f64) {
    let Some(m) = SITE_METRICS.get() else {
        return;
    };

    let status_str = status.to_string();
    m.page_requests
        .with_label_values(&[route, status_str.as_str()])
        .inc();
    m.page_duration
        .with_label_values(&[route])
        .observe(duration_secs);
}

/// Record the outcome of one content API fetch
///
/// `outcome` is a short label such as `ok`, `not_found` or `error`.
pub fn record_api_fetch(resource: &str, outcome: &str) {
    if let Some(m) = SITE_METRICS.get() {
        m.api_fetches.with_label_values(&[resource, outcome]).inc();
    }
}

/// Record a query cache lookup
pub fn record_cache_lookup(hit: bool) {
    if let Some(m) = SITE_METRICS.get() {
        let result = if hit { "hit" } else { "miss" };
        m.cache_lookups.with_label_values(&[result]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start timing a content API fetch
pub fn start_fetch_timer(resource: &str) -> MetricsTimer {
    match SITE_METRICS.get() {
        Some(m) => MetricsTimer::new(m.api_duration.with_label_values(&[resource]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
        assert!(metrics_initialized());
    }

    #[test]
    fn test_encode_metrics() {
        let _ = init_metrics();
        record_page_request("/content/{id}", 200, 0.01);
        let text = encode_metrics().unwrap();
        assert!(text.contains("kosen_page_requests_total"));
    }

    #[test]
    fn test_recording_does_not_panic() {
        let _ = init_metrics();
        record_api_fetch("contents", "ok");
        record_cache_lookup(true);
        record_cache_lookup(false);
        let _timer = start_fetch_timer("tags");
    }
}
