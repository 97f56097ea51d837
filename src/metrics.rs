//! Service metrics with Prometheus text exposition.
//!
//! One counter (tickets processed) and one duration histogram (run durations).
//! Owned by the API state and passed by handle, never a process-wide global.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Histogram bucket upper bounds, in seconds
const DURATION_BUCKETS: [f64; 8] = [0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Counter and histogram for the analysis pipeline
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    tickets_processed: AtomicU64,
    run_duration: DurationHistogram,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the tickets-processed counter
    pub fn inc_tickets_processed(&self, count: u64) {
        self.tickets_processed.fetch_add(count, Ordering::Relaxed);
    }

    /// Record one run's duration into the histogram
    pub fn observe_run_duration(&self, duration: Duration) {
        self.run_duration.observe(duration);
    }

    pub fn tickets_processed(&self) -> u64 {
        self.tickets_processed.load(Ordering::Relaxed)
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# HELP triager_tickets_processed_total Total number of feedback tickets processed\n");
        out.push_str("# TYPE triager_tickets_processed_total counter\n");
        out.push_str(&format!(
            "triager_tickets_processed_total {}\n",
            self.tickets_processed()
        ));

        out.push_str("# HELP triager_run_duration_seconds Duration of analysis runs in seconds\n");
        out.push_str("# TYPE triager_run_duration_seconds histogram\n");
        self.run_duration
            .render_into(&mut out, "triager_run_duration_seconds");

        out
    }
}

/// Fixed-bucket cumulative histogram of durations
#[derive(Debug, Default)]
struct DurationHistogram {
    /// Per-bucket observation counts (non-cumulative; accumulated at render time)
    bucket_counts: [AtomicU64; 8],
    overflow: AtomicU64,
    sum_micros: AtomicU64,
    count: AtomicU64,
}

impl DurationHistogram {
    fn observe(&self, duration: Duration) {
        let seconds = duration.as_secs_f64();

        match DURATION_BUCKETS.iter().position(|&bound| seconds <= bound) {
            Some(idx) => self.bucket_counts[idx].fetch_add(1, Ordering::Relaxed),
            None => self.overflow.fetch_add(1, Ordering::Relaxed),
        };

        self.sum_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn render_into(&self, out: &mut String, name: &str) {
        let mut cumulative = 0u64;
        for (idx, bound) in DURATION_BUCKETS.iter().enumerate() {
            cumulative += self.bucket_counts[idx].load(Ordering::Relaxed);
            out.push_str(&format!("{name}_bucket{{le=\"{bound}\"}} {cumulative}\n"));
        }

        let total = self.count.load(Ordering::Relaxed);
        out.push_str(&format!("{name}_bucket{{le=\"+Inf\"}} {total}\n"));

        let sum_seconds = self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
        out.push_str(&format!("{name}_sum {sum_seconds}\n"));
        out.push_str(&format!("{name}_count {total}\n"));
    }
}
