//! Process-wide validation metrics.
//!
//! Counters are atomic; the rolling average and the last-request timestamp
//! live behind a small mutex. The counter invariant is exact — after every
//! completed validation `total == valid + invalid` — while the average is
//! advisory.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
struct TimingState {
    completed: u64,
    average: Duration,
    last_request_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct ValidationMetrics {
    total_requests: AtomicU64,
    valid_requests: AtomicU64,
    invalid_requests: AtomicU64,
    timing: Mutex<TimingState>,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per validation, on every exit path.
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.timing.lock().unwrap().last_request_time = Some(Utc::now());
    }

    pub fn record_valid(&self) {
        self.valid_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold one duration into the rolling average:
    /// `avg_n = (avg_{n-1} * (n-1) + d_n) / n`.
    pub fn record_duration(&self, duration: Duration) {
        let mut timing = self.timing.lock().unwrap();
        timing.completed += 1;
        let n = timing.completed as u32;
        timing.average = (timing.average * (n - 1) + duration) / n;
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn valid_requests(&self) -> u64 {
        self.valid_requests.load(Ordering::Relaxed)
    }

    pub fn invalid_requests(&self) -> u64 {
        self.invalid_requests.load(Ordering::Relaxed)
    }

    pub fn average_duration(&self) -> Duration {
        self.timing.lock().unwrap().average
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.total_requests();
        let valid = self.valid_requests();
        let timing = self.timing.lock().unwrap();
        MetricsSnapshot {
            total_requests: total,
            valid_requests: valid,
            invalid_requests: self.invalid_requests(),
            success_rate: if total > 0 {
                valid as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            average_duration_ms: timing.average.as_secs_f64() * 1000.0,
            last_request_time: timing.last_request_time.map(|t| t.to_rfc3339()),
        }
    }
}

/// Point-in-time view served by the metrics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub valid_requests: u64,
    pub invalid_requests: u64,
    pub success_rate: f64,
    pub average_duration_ms: f64,
    pub last_request_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_add_up() {
        let metrics = ValidationMetrics::new();
        for valid in [true, true, false] {
            if valid {
                metrics.record_valid();
            } else {
                metrics.record_invalid();
            }
            metrics.record_request();
        }
        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(
            metrics.total_requests(),
            metrics.valid_requests() + metrics.invalid_requests()
        );
    }

    #[test]
    fn rolling_average_is_incremental() {
        let metrics = ValidationMetrics::new();
        metrics.record_duration(Duration::from_millis(10));
        assert_eq!(metrics.average_duration(), Duration::from_millis(10));
        metrics.record_duration(Duration::from_millis(20));
        assert_eq!(metrics.average_duration(), Duration::from_millis(15));
        metrics.record_duration(Duration::from_millis(30));
        assert_eq!(metrics.average_duration(), Duration::from_millis(20));
    }

    #[test]
    fn snapshot_reports_success_rate() {
        let metrics = ValidationMetrics::new();
        let empty = metrics.snapshot();
        assert_eq!(empty.success_rate, 0.0);
        assert!(empty.last_request_time.is_none());

        metrics.record_valid();
        metrics.record_request();
        metrics.record_invalid();
        metrics.record_request();

        let snap = metrics.snapshot();
        assert_eq!(snap.total_requests, 2);
        assert_eq!(snap.success_rate, 50.0);
        assert!(snap.last_request_time.is_some());
    }
}
