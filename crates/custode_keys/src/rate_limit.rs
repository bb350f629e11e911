//! Sliding-window-log rate limiting.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use custode_core::ApiKey;
use custode_error::{CustodeError, CustodeResult, KeyError, KeyErrorKind};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

const BURST_WINDOW: Duration = Duration::from_secs(1);

/// Outcome of an admitted rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowance {
    /// Requests left in the most constrained rule's window
    pub remaining: u32,
    /// When that window next frees a slot
    pub reset_at: DateTime<Utc>,
}

/// Sliding-window-log rate limiter.
///
/// One log of request timestamps is kept per `(key, rule)`. On each check
/// the log is pruned of entries older than the rule's window, every rule
/// is evaluated, and only an admitted request is appended, so a rejected
/// request consumes no capacity on any rule. Each rule's `burst_allowance`
/// additionally caps requests within the trailing second and can reject
/// even when the main window has headroom.
///
/// The logs for a key live under a single sharded-map entry, making the
/// whole check-then-append sequence atomic across concurrent callers.
/// Counters are ephemeral; they are rebuilt from an empty log on restart.
#[derive(Debug, Default)]
pub struct RateLimiter {
    logs: DashMap<Uuid, Vec<Vec<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter with no recorded requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit or reject a request against every rule attached to `key`.
    /// A key with no rules is unlimited: every request is admitted and
    /// nothing is logged.
    pub fn check(&self, key: &ApiKey) -> CustodeResult<Allowance> {
        if key.rate_limit_rules.is_empty() {
            debug!(key_id = %key.id, "No rate-limit rules; admitting");
            return Ok(Allowance {
                remaining: u32::MAX,
                reset_at: Utc::now(),
            });
        }
        let now = Instant::now();
        let mut entry = self.logs.entry(key.id).or_default();
        let logs = entry.value_mut();
        if logs.len() < key.rate_limit_rules.len() {
            logs.resize_with(key.rate_limit_rules.len(), Vec::new);
        }

        // First pass: prune and evaluate. Nothing is logged unless every
        // rule admits the request.
        for (log, rule) in logs.iter_mut().zip(&key.rate_limit_rules) {
            let window = Duration::from_secs(rule.window_seconds);
            log.retain(|&ts| now.duration_since(ts) < window);

            if rule.burst_allowance > 0
                && let Some(&oldest_burst) = log
                    .iter()
                    .find(|&&ts| now.duration_since(ts) < BURST_WINDOW)
                && log
                    .iter()
                    .filter(|&&ts| now.duration_since(ts) < BURST_WINDOW)
                    .count() as u32
                    >= rule.burst_allowance
            {
                let retry = BURST_WINDOW - now.duration_since(oldest_burst);
                warn!(key_id = %key.id, "Burst allowance exceeded");
                return Err(rate_limited("burst", retry));
            }

            if log.len() as u32 >= rule.max_requests {
                // The oldest entry frees a slot once it ages past the
                // window.
                let retry = window - now.duration_since(log[0]);
                warn!(key_id = %key.id, rule = %rule.window_kind, "Rate limit exceeded");
                return Err(rate_limited(&rule.window_kind.to_string(), retry));
            }
        }

        // Second pass: record the admitted request on every rule.
        let mut remaining = u32::MAX;
        let mut reset_at = Utc::now();
        for (log, rule) in logs.iter_mut().zip(&key.rate_limit_rules) {
            log.push(now);
            let left = rule.max_requests.saturating_sub(log.len() as u32);
            if left < remaining {
                remaining = left;
                let window = Duration::from_secs(rule.window_seconds);
                let frees_in = window.saturating_sub(now.duration_since(log[0]));
                reset_at =
                    Utc::now() + ChronoDuration::from_std(frees_in).unwrap_or_default();
            }
        }
        debug!(key_id = %key.id, remaining, "Request admitted");
        Ok(Allowance { remaining, reset_at })
    }

    /// Drop the logs for a key, e.g. after revocation.
    pub fn forget(&self, key_id: Uuid) {
        self.logs.remove(&key_id);
    }
}

fn rate_limited(rule: &str, retry: Duration) -> CustodeError {
    KeyError::new(KeyErrorKind::RateLimited {
        rule: rule.to_string(),
        // Round sub-millisecond waits up so retry-after is never zero.
        retry_after_ms: (retry.as_millis() as u64).max(1),
    })
    .into()
}
