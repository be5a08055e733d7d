//! Rolling provider health with a simple trip/recover circuit
//!
//! Counters are in-memory and lossy by design; a restart forgets history.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// Errors within the window before a provider is tripped
const ERROR_THRESHOLD: u32 = 5;
/// Sliding error window
const WINDOW_SECONDS: u64 = 60;
/// How long a tripped provider rests before being probed again
const RECOVERY_SECONDS: u64 = 30;

struct ProviderHealth {
    error_count: AtomicU32,
    window_start: AtomicU64,
    /// Unix seconds when the circuit tripped, 0 when closed
    tripped_at: AtomicU64,
}

impl ProviderHealth {
    fn new() -> Self {
        Self {
            error_count: AtomicU32::new(0),
            window_start: AtomicU64::new(now_secs()),
            tripped_at: AtomicU64::new(0),
        }
    }
}

/// Shared health view over every pooled provider
#[derive(Default)]
pub struct HealthTracker {
    providers: DashMap<String, ProviderHealth>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether requests may be sent to this provider right now
    ///
    /// A tripped provider becomes available again once its recovery rest
    /// has elapsed; the next outcome then closes or re-trips the circuit.
    pub fn is_available(&self, provider_id: &str) -> bool {
        let Some(health) = self.providers.get(provider_id) else {
            return true;
        };
        let tripped_at = health.tripped_at.load(Ordering::Relaxed);
        if tripped_at == 0 {
            return true;
        }
        now_secs().saturating_sub(tripped_at) >= RECOVERY_SECONDS
    }

    pub fn record_success(&self, provider_id: &str) {
        let health = self
            .providers
            .entry(provider_id.to_owned())
            .or_insert_with(ProviderHealth::new);

        health.tripped_at.store(0, Ordering::Relaxed);
        health.error_count.store(0, Ordering::Relaxed);
        health.window_start.store(now_secs(), Ordering::Relaxed);
    }

    pub fn record_failure(&self, provider_id: &str) {
        let health = self
            .providers
            .entry(provider_id.to_owned())
            .or_insert_with(ProviderHealth::new);

        let now = now_secs();
        let window_start = health.window_start.load(Ordering::Relaxed);

        if now.saturating_sub(window_start) >= WINDOW_SECONDS {
            health.error_count.store(1, Ordering::Relaxed);
            health.window_start.store(now, Ordering::Relaxed);
        } else {
            let count = health.error_count.fetch_add(1, Ordering::Relaxed) + 1;
            if count >= ERROR_THRESHOLD {
                health.tripped_at.store(now, Ordering::Relaxed);
                drop(health);
                tracing::warn!(provider = provider_id, error_count = count, "provider circuit tripped");
            }
        }
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
