//! Request metrics and statistics tracking for the scoring service.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

const MAX_LATENCY_SAMPLES: usize = 10_000;

/// Metrics collector for the scoring endpoint
pub struct ServiceMetrics {
    /// Scoring requests received
    pub requests_received: AtomicU64,
    /// Requests answered with a prediction
    pub predictions_served: AtomicU64,
    /// Error responses by error kind
    errors_by_kind: RwLock<BTreeMap<String, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Approval percentage distribution, ten 10-point buckets
    prediction_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            predictions_served: AtomicU64::new(0),
            errors_by_kind: RwLock::new(BTreeMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            prediction_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a request that returned a prediction
    pub fn record_prediction(&self, latency: Duration, percentage: f64) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency);

        let bucket = (percentage / 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.prediction_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request that returned an error body
    pub fn record_error(&self, latency: Duration, kind: &str) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
        self.record_latency(latency);

        if let Ok(mut by_kind) = self.errors_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    fn record_latency(&self, latency: Duration) {
        if let Ok(mut times) = self.latencies.write() {
            times.push(latency.as_micros() as u64);
            if times.len() > MAX_LATENCY_SAMPLES {
                times.drain(0..MAX_LATENCY_SAMPLES / 2);
            }
        }
    }

    /// Get latency statistics
    pub fn latency_stats(&self) -> LatencyStats {
        let sorted = match self.latencies.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return LatencyStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: at(0.50),
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (requests per second)
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_received.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Point-in-time view of every metric
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests_received: self.requests_received.load(Ordering::Relaxed),
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            errors_by_kind: self
                .errors_by_kind
                .read()
                .map(|m| m.clone())
                .unwrap_or_default(),
            throughput_rps: self.throughput(),
            latency: self.latency_stats(),
            prediction_distribution: self
                .prediction_buckets
                .read()
                .map(|b| *b)
                .unwrap_or_default(),
        }
    }

    /// Log summary statistics
    pub fn log_summary(&self) {
        let snapshot = self.snapshot();
        let errors: u64 = snapshot.errors_by_kind.values().sum();

        info!(
            requests = snapshot.requests_received,
            predictions = snapshot.predictions_served,
            errors = errors,
            throughput = format!("{:.2} req/s", snapshot.throughput_rps),
            mean_us = snapshot.latency.mean_us,
            p50_us = snapshot.latency.p50_us,
            p99_us = snapshot.latency.p99_us,
            "Service metrics summary"
        );

        for (kind, count) in &snapshot.errors_by_kind {
            info!(kind = %kind, count = count, "Errors by kind");
        }

        let total: u64 = snapshot.prediction_distribution.iter().sum();
        if total > 0 {
            for (i, &count) in snapshot.prediction_distribution.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                info!(
                    "  approval {:>3}-{:<3}%: {:>6} ({:>5.1}%) {}",
                    i * 10,
                    (i + 1) * 10,
                    count,
                    pct,
                    "█".repeat(((pct / 5.0) as usize).min(20))
                );
            }
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable view served by the metrics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub requests_received: u64,
    pub predictions_served: u64,
    pub errors_by_kind: BTreeMap<String, u64>,
    pub throughput_rps: f64,
    pub latency: LatencyStats,
    pub prediction_distribution: [u64; 10],
}

/// Periodic metrics reporter that logs summaries
pub struct MetricsReporter {
    metrics: Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.log_summary();
        }
    }
}
