use std::collections::VecDeque;
use std::sync::Mutex;

/// Bounded ring of recent per-query latencies in milliseconds
///
/// The mutex is held only for a push/pop or a copy-out, never across a
/// suspension point.
#[derive(Debug)]
pub struct LatencyWindow {
    samples: Mutex<VecDeque<u64>>,
    capacity: usize,
}

/// Percentile snapshot over the current window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LatencyPercentiles {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub samples: usize,
}

impl LatencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Record one latency sample, evicting the oldest past capacity
    pub fn record(&self, latency_ms: u64) {
        let mut samples = self.samples.lock().expect("latency window poisoned");
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(latency_ms);
    }

    /// Nearest-rank p50/p95/p99 over the current window
    pub fn percentiles(&self) -> LatencyPercentiles {
        let mut sorted: Vec<u64> = {
            let samples = self.samples.lock().expect("latency window poisoned");
            samples.iter().copied().collect()
        };
        if sorted.is_empty() {
            return LatencyPercentiles::default();
        }
        sorted.sort_unstable();

        LatencyPercentiles {
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
            samples: sorted.len(),
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn nearest_rank(sorted: &[u64], quantile: f64) -> u64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_window_reports_zeroes() {
        let window = LatencyWindow::new(8);
        assert_eq!(window.percentiles(), LatencyPercentiles::default());
    }

    #[test]
    fn percentiles_over_known_distribution() {
        let window = LatencyWindow::new(100);
        for ms in 1..=100 {
            window.record(ms);
        }
        let p = window.percentiles();
        assert_eq!(p.p50, 50);
        assert_eq!(p.p95, 95);
        assert_eq!(p.p99, 99);
        assert_eq!(p.samples, 100);
    }

    #[test]
    fn window_is_bounded_and_evicts_oldest() {
        let window = LatencyWindow::new(4);
        for ms in [1, 2, 3, 4, 1000, 1000, 1000, 1000] {
            window.record(ms);
        }
        let p = window.percentiles();
        assert_eq!(p.samples, 4);
        assert_eq!(p.p50, 1000);
    }

    #[test]
    fn single_sample_is_every_percentile() {
        let window = LatencyWindow::new(8);
        window.record(42);
        let p = window.percentiles();
        assert_eq!((p.p50, p.p95, p.p99), (42, 42, 42));
    }
}
