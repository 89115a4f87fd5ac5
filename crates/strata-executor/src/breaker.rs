//! Circuit breaker: one per operation class, in-memory only, never persisted
//! across restarts.
//!
//! Closed: calls pass, consecutive failures count up to the threshold.
//! Open: calls short-circuit to the fallback chain; after the reset timeout
//! the breaker admits probes. HalfOpen: a bounded probe count passes through;
//! any success closes the circuit, any failure reopens it and restarts the
//! reset timer.

use std::sync::RwLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strata_core::config::BreakerConfig;
use tracing::{debug, info, warn};

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Point-in-time view for `info()` and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub op_class: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub open_for_ms: Option<u64>,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_probes: u32,
    opened_at: Option<Instant>,
}

/// Per-operation-class breaker. All mutation happens under one exclusive
/// region; breakers for distinct classes are fully independent.
pub struct CircuitBreaker {
    op_class: String,
    config: BreakerConfig,
    inner: RwLock<Inner>,
}

impl CircuitBreaker {
    pub fn new(op_class: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            op_class: op_class.into(),
            config,
            inner: RwLock::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_probes: 0,
                opened_at: None,
            }),
        }
    }

    /// Whether a call may proceed. Admitting a probe while half-open counts
    /// against the probe budget.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.write().unwrap();

        if inner.state == CircuitState::Open {
            let elapsed = inner.opened_at.map(|at| at.elapsed());
            if elapsed.is_some_and(|e| e >= self.config.reset_timeout()) {
                debug!(op_class = %self.op_class, "reset timeout elapsed, circuit half-open");
                inner.state = CircuitState::HalfOpen;
                inner.half_open_probes = 0;
                inner.opened_at = Some(Instant::now());
            }
        }

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                // An admitted probe whose caller never reported back must not
                // wedge the class: once a full reset interval passes with the
                // budget spent and no recorded result, the budget refills.
                if inner.half_open_probes >= self.config.half_open_max_probes
                    && inner
                        .opened_at
                        .is_some_and(|at| at.elapsed() >= self.config.reset_timeout())
                {
                    debug!(op_class = %self.op_class, "half-open probes abandoned, budget refilled");
                    inner.half_open_probes = 0;
                    inner.opened_at = Some(Instant::now());
                }
                if inner.half_open_probes < self.config.half_open_max_probes {
                    inner.half_open_probes += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.write().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                info!(op_class = %self.op_class, "probe succeeded, circuit closed");
                inner.state = CircuitState::Closed;
                inner.consecutive_failures = 0;
                inner.opened_at = None;
            }
            CircuitState::Open => {
                // A late result from an abandoned call; the breaker's own
                // timer governs recovery.
            }
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.write().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        op_class = %self.op_class,
                        failures = inner.consecutive_failures,
                        "failure threshold reached, circuit open"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                warn!(op_class = %self.op_class, "probe failed, circuit reopened");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.read().unwrap().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.inner.read().unwrap();
        CircuitSnapshot {
            op_class: self.op_class.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            open_for_ms: (inner.state != CircuitState::Closed)
                .then(|| inner.opened_at.map(|at| at.elapsed().as_millis() as u64))
                .flatten(),
        }
    }
}
