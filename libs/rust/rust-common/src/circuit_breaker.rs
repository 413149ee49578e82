//! Circuit breaker guarding calls to remote collaborators.
//!
//! The gateway wraps its Login RPC in a breaker so that an unreachable
//! authentication service fails fast instead of tying up request handlers
//! for a full timeout on every login attempt.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally
    Closed,
    /// Requests are rejected without reaching the collaborator
    Open,
    /// A limited number of trial requests are let through
    HalfOpen,
}

impl CircuitState {
    /// Lowercase name used in log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Consecutive half-open successes before the circuit closes
    pub success_threshold: u32,
    /// How long the circuit stays open before probing
    pub open_duration: Duration,
    /// Trial requests allowed while half-open
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 1,
            open_duration: Duration::from_secs(10),
            half_open_max_requests: 1,
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the success threshold.
    #[must_use]
    pub const fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set how long the circuit stays open.
    #[must_use]
    pub const fn with_open_duration(mut self, duration: Duration) -> Self {
        self.open_duration = duration;
        self
    }
}

/// Circuit breaker for one named collaborator.
pub struct CircuitBreaker {
    service: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    failures: AtomicU32,
    successes: AtomicU32,
    // When the circuit opened, or when the current half-open trial call was admitted.
    since: RwLock<Option<Instant>>,
    half_open_requests: AtomicU32,
}

impl CircuitBreaker {
    /// Create a breaker for `service` with the given configuration.
    #[must_use]
    pub fn new(service: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            service: service.into(),
            config,
            state: RwLock::new(CircuitState::Closed),
            failures: AtomicU32::new(0),
            successes: AtomicU32::new(0),
            since: RwLock::new(None),
            half_open_requests: AtomicU32::new(0),
        }
    }

    /// Name of the guarded collaborator.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Check if a request may proceed.
    ///
    /// While open, only the caller that moves the circuit to half-open is
    /// admitted. A half-open trial call that records no result within
    /// `open_duration` is treated as abandoned and its slot is handed to the
    /// next caller.
    pub async fn allow_request(&self) -> bool {
        let state = *self.state.read().await;
        match state {
            CircuitState::Closed => true,
            CircuitState::Open => self.try_half_open().await,
            CircuitState::HalfOpen => self.admit_trial().await,
        }
    }

    async fn try_half_open(&self) -> bool {
        let mut state = self.state.write().await;
        match *state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                drop(state);
                self.admit_trial().await
            }
            CircuitState::Open => {
                let mut since = self.since.write().await;
                let elapsed = since.map_or(false, |at| at.elapsed() >= self.config.open_duration);
                if !elapsed {
                    return false;
                }
                *since = Some(Instant::now());
                self.half_open_requests.store(1, Ordering::SeqCst);
                self.successes.store(0, Ordering::SeqCst);
                *state = CircuitState::HalfOpen;
                self.log_transition(CircuitState::Open, CircuitState::HalfOpen);
                true
            }
        }
    }

    async fn admit_trial(&self) -> bool {
        let current = self.half_open_requests.fetch_add(1, Ordering::SeqCst);
        if current < self.config.half_open_max_requests {
            return true;
        }
        let mut since = self.since.write().await;
        let stale = since.map_or(true, |at| at.elapsed() >= self.config.open_duration);
        if stale {
            *since = Some(Instant::now());
            self.half_open_requests.store(1, Ordering::SeqCst);
            warn!(service = %self.service, "Half-open trial call never completed, admitting another");
        }
        stale
    }

    /// Record a successful call.
    pub async fn record_success(&self) {
        let state = *self.state.read().await;
        match state {
            CircuitState::HalfOpen => {
                let successes = self.successes.fetch_add(1, Ordering::SeqCst) + 1;
                if successes >= self.config.success_threshold {
                    self.failures.store(0, Ordering::SeqCst);
                    self.successes.store(0, Ordering::SeqCst);
                    self.transition(CircuitState::Closed).await;
                }
            }
            CircuitState::Closed => self.failures.store(0, Ordering::SeqCst),
            CircuitState::Open => {}
        }
    }

    /// Record a failed call.
    pub async fn record_failure(&self) {
        let failures = self.failures.fetch_add(1, Ordering::SeqCst) + 1;
        let state = *self.state.read().await;
        let trips = match state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => failures >= self.config.failure_threshold,
            CircuitState::Open => false,
        };
        if trips {
            *self.since.write().await = Some(Instant::now());
            self.successes.store(0, Ordering::SeqCst);
            self.transition(CircuitState::Open).await;
        }
    }

    /// Get the current circuit state.
    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    /// Get the current consecutive failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    async fn transition(&self, to: CircuitState) {
        let mut state = self.state.write().await;
        if *state == to {
            return;
        }
        let from = *state;
        *state = to;
        self.log_transition(from, to);
    }

    fn log_transition(&self, from: CircuitState, to: CircuitState) {
        if to == CircuitState::Open {
            warn!(
                service = %self.service,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker opened"
            );
        } else {
            info!(
                service = %self.service,
                from = from.as_str(),
                to = to.as_str(),
                "Circuit breaker state changed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn quick_config() -> CircuitBreakerConfig {
        CircuitBreakerConfig::default()
            .with_failure_threshold(2)
            .with_open_duration(Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_initial_state_closed() {
        let cb = CircuitBreaker::new("user-service", CircuitBreakerConfig::default());
        assert_eq!(cb.state().await, CircuitState::Closed);
        assert!(cb.allow_request().await);
        assert_eq!(cb.service(), "user-service");
    }

    #[tokio::test]
    async fn test_opens_after_failures() {
        let cb = CircuitBreaker::new(
            "user-service",
            CircuitBreakerConfig::default().with_failure_threshold(3),
        );

        for _ in 0..3 {
            cb.record_failure().await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
        assert!(!cb.allow_request().await);
    }

    #[tokio::test]
    async fn test_success_resets_failures() {
        let cb = CircuitBreaker::new(
            "user-service",
            CircuitBreakerConfig::default().with_failure_threshold(3),
        );

        cb.record_failure().await;
        cb.record_failure().await;
        cb.record_success().await;

        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_trial_then_close() {
        let cb = CircuitBreaker::new("user-service", quick_config());
        cb.record_failure().await;
        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cb.allow_request().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
        // Only one trial call is allowed at a time.
        assert!(!cb.allow_request().await);

        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_failed_trial_reopens() {
        let cb = CircuitBreaker::new("user-service", quick_config());
        cb.record_failure().await;
        cb.record_failure().await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cb.allow_request().await);

        cb.record_failure().await;
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_abandoned_trial_is_replaced() {
        let cb = CircuitBreaker::new("user-service", quick_config());
        cb.record_failure().await;
        cb.record_failure().await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        // Admitted trial call that never records a result.
        assert!(cb.allow_request().await);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cb.allow_request().await);
        cb.record_success().await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_trial_when_open_window_ends() {
        let cb = Arc::new(CircuitBreaker::new("user-service", quick_config()));
        cb.record_failure().await;
        cb.record_failure().await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cb = Arc::clone(&cb);
                tokio::spawn(async move { cb.allow_request().await })
            })
            .collect();
        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
    }
}
