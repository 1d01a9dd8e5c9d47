//! Request metrics for production monitoring
//!
//! Tracks request totals, outcomes, and inference latency. Exposed in
//! Prometheus text format at `GET /metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector shared across handlers
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    total_requests: Arc<AtomicUsize>,
    successful_requests: Arc<AtomicUsize>,
    failed_requests: Arc<AtomicUsize>,
    total_inference_time_us: Arc<AtomicU64>,
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_inference_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction and its latency
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_inference_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed request
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a consistent snapshot of the counters
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_time_us = self.total_inference_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            uptime_secs: uptime.as_secs(),
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Render counters in Prometheus text exposition format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        format!(
            "# HELP predecir_requests_total Total number of prediction requests\n\
             # TYPE predecir_requests_total counter\n\
             predecir_requests_total {}\n\
             # HELP predecir_requests_success Successful prediction requests\n\
             # TYPE predecir_requests_success counter\n\
             predecir_requests_success {}\n\
             # HELP predecir_requests_failed Failed prediction requests\n\
             # TYPE predecir_requests_failed counter\n\
             predecir_requests_failed {}\n\
             # HELP predecir_avg_latency_ms Average inference latency in milliseconds\n\
             # TYPE predecir_avg_latency_ms gauge\n\
             predecir_avg_latency_ms {:.3}\n\
             # HELP predecir_uptime_seconds Seconds since service start\n\
             # TYPE predecir_uptime_seconds gauge\n\
             predecir_uptime_seconds {}\n",
            s.total_requests, s.successful_requests, s.failed_requests, s.avg_latency_ms, s.uptime_secs
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the collected metrics
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total requests processed
    pub total_requests: usize,
    /// Requests that produced a prediction
    pub successful_requests: usize,
    /// Requests that failed validation or inference
    pub failed_requests: usize,
    /// Seconds since the collector was created
    pub uptime_secs: u64,
    /// Mean inference latency over successful requests
    pub avg_latency_ms: f64,
    /// Failed requests as a fraction of total
    pub error_rate: f64,
}
