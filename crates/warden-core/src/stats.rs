//! Process-lifetime request counters.

use serde::{Deserialize, Serialize};

/// Aggregate counters over a wrapper's lifetime.
///
/// Updated exactly once per request, read only for monitoring; no
/// blocking decision ever consults these values. The wrapper owns the
/// instance behind its statistics lock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardStats {
    /// Requests processed, regardless of outcome.
    pub total_requests: u64,
    /// Requests that ended blocked.
    pub blocked_requests: u64,
    /// Secret matches found across all requests.
    pub secrets_detected: u64,
    /// Entropy alerts raised across all requests.
    pub entropy_alerts: u64,
    /// Running mean of end-to-end processing time.
    pub avg_processing_ms: f64,
}

impl GuardStats {
    /// Record one finished request.
    pub fn record(&mut self, blocked: bool, secrets: usize, alerts: usize, elapsed_ms: f64) {
        self.total_requests += 1;
        if blocked {
            self.blocked_requests += 1;
        }
        self.secrets_detected += secrets as u64;
        self.entropy_alerts += alerts as u64;

        let n = self.total_requests as f64;
        self.avg_processing_ms = (self.avg_processing_ms * (n - 1.0) + elapsed_ms) / n;
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
