//! Prometheus-compatible metrics
//!
//! Counters for scoring requests, exposed by the scoring server on
//! `/metrics` (Prometheus text) and `/metrics/json`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::game::constants::metrics::{MIN_PERCENTILE_SAMPLES, TIMING_WINDOW};
use crate::game::cumulative::ScoreReport;

/// Metrics registry for the scoring server
#[derive(Debug)]
pub struct Metrics {
    // Requests
    pub score_requests: AtomicU64,
    pub status_requests: AtomicU64,
    pub request_errors: AtomicU64,

    // Replay work
    pub pings_replayed: AtomicU64,
    pub pings_after_end: AtomicU64,
    pub claim_changes: AtomicU64,
    pub zones_reported: AtomicU64,

    // Engine compute time (microseconds)
    pub compute_time_us: AtomicU64,
    pub compute_time_p95_us: AtomicU64,
    pub compute_time_p99_us: AtomicU64,
    pub compute_time_max_us: AtomicU64,

    start_time: Instant,

    // Rolling compute times for percentile calculation
    compute_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            score_requests: AtomicU64::new(0),
            status_requests: AtomicU64::new(0),
            request_errors: AtomicU64::new(0),
            pings_replayed: AtomicU64::new(0),
            pings_after_end: AtomicU64::new(0),
            claim_changes: AtomicU64::new(0),
            zones_reported: AtomicU64::new(0),
            compute_time_us: AtomicU64::new(0),
            compute_time_p95_us: AtomicU64::new(0),
            compute_time_p99_us: AtomicU64::new(0),
            compute_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            compute_history: RwLock::new(VecDeque::with_capacity(TIMING_WINDOW)),
        }
    }

    /// Record one engine call's duration and refresh percentiles
    pub fn record_compute_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.compute_time_us.store(us, Ordering::Relaxed);

        let mut history = self.compute_history.write();
        history.push_back(us);
        while history.len() > TIMING_WINDOW {
            history.pop_front();
        }

        if history.len() >= MIN_PERCENTILE_SAMPLES {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f64 * 0.95) as usize;
            let p99_idx = (sorted.len() as f64 * 0.99) as usize;

            self.compute_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.compute_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.compute_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    pub fn record_score(&self, report: &ScoreReport, elapsed: Duration) {
        self.score_requests.fetch_add(1, Ordering::Relaxed);
        self.pings_replayed.fetch_add(report.pings_replayed as u64, Ordering::Relaxed);
        self.pings_after_end.fetch_add(report.pings_after_end as u64, Ordering::Relaxed);
        self.claim_changes.fetch_add(report.claim_changes as u64, Ordering::Relaxed);
        self.record_compute_time(elapsed);
    }

    pub fn record_status(&self, zones: usize, elapsed: Duration) {
        self.status_requests.fetch_add(1, Ordering::Relaxed);
        self.zones_reported.fetch_add(zones as u64, Ordering::Relaxed);
        self.record_compute_time(elapsed);
    }

    pub fn record_error(&self) {
        self.request_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("zone_control_score_requests_total", "Cumulative score requests served", "counter",
            self.score_requests.load(Ordering::Relaxed));
        metric!("zone_control_status_requests_total", "Zone status requests served", "counter",
            self.status_requests.load(Ordering::Relaxed));
        metric!("zone_control_request_errors_total", "Requests answered with an error", "counter",
            self.request_errors.load(Ordering::Relaxed));

        metric!("zone_control_pings_replayed_total", "Pings replayed by the cumulative scorer", "counter",
            self.pings_replayed.load(Ordering::Relaxed));
        metric!("zone_control_pings_after_end_total", "Pings skipped for being past the contest end", "counter",
            self.pings_after_end.load(Ordering::Relaxed));
        metric!("zone_control_claim_changes_total", "Successful zone challenges during replay", "counter",
            self.claim_changes.load(Ordering::Relaxed));
        metric!("zone_control_zones_reported_total", "Zones reported by status requests", "counter",
            self.zones_reported.load(Ordering::Relaxed));

        metric!("zone_control_compute_time_microseconds", "Last engine compute time", "gauge",
            self.compute_time_us.load(Ordering::Relaxed));
        metric!("zone_control_compute_time_p95_microseconds", "95th percentile engine compute time", "gauge",
            self.compute_time_p95_us.load(Ordering::Relaxed));
        metric!("zone_control_compute_time_p99_microseconds", "99th percentile engine compute time", "gauge",
            self.compute_time_p99_us.load(Ordering::Relaxed));
        metric!("zone_control_compute_time_max_microseconds", "Maximum engine compute time in the window", "gauge",
            self.compute_time_max_us.load(Ordering::Relaxed));

        metric!("zone_control_uptime_seconds", "Server uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// Metrics as JSON (alternative for direct API access)
    pub fn to_json(&self) -> Value {
        json!({
            "requests": {
                "score": self.score_requests.load(Ordering::Relaxed),
                "status": self.status_requests.load(Ordering::Relaxed),
                "errors": self.request_errors.load(Ordering::Relaxed),
            },
            "replay": {
                "pings_replayed": self.pings_replayed.load(Ordering::Relaxed),
                "pings_after_end": self.pings_after_end.load(Ordering::Relaxed),
                "claim_changes": self.claim_changes.load(Ordering::Relaxed),
                "zones_reported": self.zones_reported.load(Ordering::Relaxed),
            },
            "performance": {
                "compute_time_us": self.compute_time_us.load(Ordering::Relaxed),
                "compute_time_p95_us": self.compute_time_p95_us.load(Ordering::Relaxed),
                "compute_time_p99_us": self.compute_time_p99_us.load(Ordering::Relaxed),
                "compute_time_max_us": self.compute_time_max_us.load(Ordering::Relaxed),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
