use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use strata_core::config::ExecutorConfig;
use strata_core::errors::{ExecuteError, FailureKind, FallbackStage, StrataResult};
use strata_core::TimeoutTier;
use strata_events::EventBus;
use tracing::{debug, warn};

use crate::breaker::{CircuitBreaker, CircuitSnapshot};
use crate::fallback::FallbackChain;
use crate::scope::EventScope;

/// Which stage of the degradation ladder produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    Primary,
    StaleCache,
    DefaultValue,
}

impl OutcomeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::StaleCache => "stale_cache",
            Self::DefaultValue => "default_value",
        }
    }
}

impl From<FallbackStage> for OutcomeSource {
    fn from(stage: FallbackStage) -> Self {
        match stage {
            FallbackStage::StaleCache => Self::StaleCache,
            FallbackStage::DefaultValue => Self::DefaultValue,
        }
    }
}

/// Result of an executor-wrapped call. Degraded outcomes carry the failure
/// kind that pushed them onto the fallback chain.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub source: OutcomeSource,
    pub degraded_by: Option<FailureKind>,
}

impl<T> Outcome<T> {
    fn primary(value: T) -> Self {
        Self {
            value,
            source: OutcomeSource::Primary,
            degraded_by: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.source != OutcomeSource::Primary
    }
}

/// Runs every operation under a timeout tier with a circuit breaker and a
/// fallback chain. Owns the per-operation-class breaker map; breakers are
/// created lazily and live only as long as the process.
pub struct Executor {
    config: ExecutorConfig,
    bus: Arc<EventBus>,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl Executor {
    pub fn new(config: ExecutorConfig, bus: Arc<EventBus>) -> Self {
        Self {
            config,
            bus,
            breakers: DashMap::new(),
        }
    }

    /// Execute `f` bound to `tier`. On failure or timeout the fallback chain
    /// is tried strictly in order; non-recoverable errors surface directly.
    ///
    /// Publishes `{op_class}.started` before invocation and exactly one
    /// terminal `{op_class}.completed` / `{op_class}.failed` on every path.
    pub async fn execute<T, F, Fut>(
        &self,
        op_class: &str,
        tier: TimeoutTier,
        f: F,
        fallback: FallbackChain<T>,
    ) -> StrataResult<Outcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StrataResult<T>>,
    {
        let scope = EventScope::begin(self.bus.clone(), op_class, tier);
        let breaker = self.breaker(op_class);

        if !breaker.allow_request() {
            debug!(op_class, "circuit open, short-circuiting to fallback");
            return self.degrade(scope, op_class, tier, FailureKind::CircuitOpen, fallback);
        }

        let bound = self.config.tier_bounds.bound(tier);
        match tokio::time::timeout(bound, f()).await {
            Ok(Ok(value)) => {
                breaker.record_success();
                scope.completed(OutcomeSource::Primary, None);
                Ok(Outcome::primary(value))
            }
            Ok(Err(err)) => {
                breaker.record_failure();
                if !err.is_recoverable() {
                    // Plugin and configuration errors are never swallowed by
                    // the fallback chain.
                    scope.failed(err.failure_kind(), None);
                    return Err(err);
                }
                debug!(op_class, %err, "primary failed, trying fallback chain");
                self.degrade(scope, op_class, tier, err.failure_kind(), fallback)
            }
            Err(_elapsed) => {
                breaker.record_failure();
                warn!(
                    op_class,
                    tier = tier.as_str(),
                    bound_ms = bound.as_millis() as u64,
                    "operation timed out, work abandoned"
                );
                self.degrade(scope, op_class, tier, FailureKind::Timeout, fallback)
            }
        }
    }

    /// Current breaker state for one operation class, if it exists yet.
    pub fn circuit_snapshot(&self, op_class: &str) -> Option<CircuitSnapshot> {
        self.breakers.get(op_class).map(|b| b.snapshot())
    }

    /// Breaker states across all operation classes seen so far.
    pub fn circuit_snapshots(&self) -> Vec<CircuitSnapshot> {
        let mut snapshots: Vec<CircuitSnapshot> =
            self.breakers.iter().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.op_class.cmp(&b.op_class));
        snapshots
    }

    fn breaker(&self, op_class: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(op_class.to_string())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(op_class, self.config.breaker.clone()))
            })
            .clone()
    }

    fn degrade<T>(
        &self,
        scope: EventScope,
        op_class: &str,
        tier: TimeoutTier,
        kind: FailureKind,
        fallback: FallbackChain<T>,
    ) -> StrataResult<Outcome<T>> {
        match fallback.resolve() {
            Ok((value, stage)) => {
                scope.completed(stage.into(), Some(kind));
                Ok(Outcome {
                    value,
                    source: stage.into(),
                    degraded_by: Some(kind),
                })
            }
            Err(last_stage @ Some(_)) => {
                scope.failed(kind, last_stage);
                Err(ExecuteError::Exhausted {
                    op_class: op_class.to_string(),
                    kind,
                    last_stage,
                }
                .into())
            }
            // With no fallback configured, the caller gets the primary
            // failure itself rather than an exhaustion wrapper.
            Err(None) => {
                scope.failed(kind, None);
                let err = match kind {
                    FailureKind::Timeout => ExecuteError::Timeout {
                        op_class: op_class.to_string(),
                        tier: tier.as_str(),
                        bound_ms: self.config.tier_bounds.bound_ms(tier),
                    },
                    FailureKind::CircuitOpen => ExecuteError::CircuitOpen {
                        op_class: op_class.to_string(),
                    },
                    _ => ExecuteError::Exhausted {
                        op_class: op_class.to_string(),
                        kind,
                        last_stage: None,
                    },
                };
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use strata_core::config::{BreakerConfig, TierBounds};
    use strata_core::errors::{ResolveError, StrataError};
    use strata_core::Event;

    fn rt() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("tokio runtime")
    }

    fn fast_executor(bus: Arc<EventBus>) -> Executor {
        Executor::new(
            ExecutorConfig {
                tier_bounds: TierBounds {
                    instant_ms: 20,
                    fast_ms: 40,
                    standard_ms: 60,
                    slow_ms: 80,
                    expensive_ms: 100,
                },
                breaker: BreakerConfig {
                    failure_threshold: 5,
                    reset_timeout_ms: 50,
                    half_open_max_probes: 1,
                },
                ..Default::default()
            },
            bus,
        )
    }

    fn event_log(bus: &EventBus) -> Arc<std::sync::Mutex<Vec<String>>> {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let inner = log.clone();
        bus.subscribe("*", move |event: &Event| {
            inner.lock().unwrap().push(event.event_type.clone());
            Ok(())
        });
        log
    }

    #[test]
    fn primary_success_passes_through() {
        let rt = rt();
        let bus = Arc::new(EventBus::new());
        let log = event_log(&bus);
        let exec = fast_executor(bus);

        let outcome = rt
            .block_on(exec.execute(
                "load",
                TimeoutTier::Standard,
                || async { Ok::<_, StrataError>(42) },
                FallbackChain::new(),
            ))
            .unwrap();

        assert_eq!(outcome.value, 42);
        assert_eq!(outcome.source, OutcomeSource::Primary);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["load.started".to_string(), "load.completed".to_string()]
        );
    }

    #[test]
    fn timeout_falls_back_to_stale_then_default() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));

        // Stale cache present: it wins.
        let outcome = rt
            .block_on(exec.execute(
                "load",
                TimeoutTier::Instant,
                || async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, StrataError>("fresh")
                },
                FallbackChain::new()
                    .stale_cache(|| Some("stale"))
                    .default_value("default"),
            ))
            .unwrap();
        assert_eq!(outcome.value, "stale");
        assert_eq!(outcome.source, OutcomeSource::StaleCache);
        assert_eq!(outcome.degraded_by, Some(FailureKind::Timeout));

        // No stale value: the default wins.
        let outcome = rt
            .block_on(exec.execute(
                "load",
                TimeoutTier::Instant,
                || async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, StrataError>("fresh")
                },
                FallbackChain::new()
                    .stale_cache(|| None)
                    .default_value("default"),
            ))
            .unwrap();
        assert_eq!(outcome.value, "default");
    }

    #[test]
    fn timeout_returns_within_bound_plus_slack() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));

        let started = std::time::Instant::now();
        let result: StrataResult<Outcome<&str>> = rt.block_on(exec.execute(
            "load",
            TimeoutTier::Instant, // 20ms bound
            || async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("never")
            },
            FallbackChain::new().default_value("fallback"),
        ));
        let elapsed = started.elapsed();

        assert_eq!(result.unwrap().value, "fallback");
        assert!(elapsed < Duration::from_millis(500), "took {elapsed:?}");
    }

    #[test]
    fn exhausted_fallback_surfaces_structured_error() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));

        let result: StrataResult<Outcome<&str>> = rt.block_on(exec.execute(
            "load",
            TimeoutTier::Standard,
            || async {
                Err(ResolveError::NotFound {
                    key: "missing".into(),
                }
                .into())
            },
            FallbackChain::new().stale_cache(|| None),
        ));

        match result.unwrap_err() {
            StrataError::Execute(ExecuteError::Exhausted {
                op_class,
                kind,
                last_stage,
            }) => {
                assert_eq!(op_class, "load");
                assert_eq!(kind, FailureKind::NotFound);
                assert_eq!(last_stage, Some(FallbackStage::StaleCache));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn timeout_without_fallback_surfaces_timeout_error() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));

        let result: StrataResult<Outcome<&str>> = rt.block_on(exec.execute(
            "load",
            TimeoutTier::Instant,
            || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok("never")
            },
            FallbackChain::new(),
        ));

        match result.unwrap_err() {
            StrataError::Execute(ExecuteError::Timeout {
                op_class,
                tier,
                bound_ms,
            }) => {
                assert_eq!(op_class, "load");
                assert_eq!(tier, "instant");
                assert_eq!(bound_ms, 20);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn open_circuit_without_fallback_surfaces_circuit_open() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));

        rt.block_on(async {
            for _ in 0..5 {
                let _ = exec
                    .execute(
                        "flaky",
                        TimeoutTier::Standard,
                        || async { Err::<(), _>(ResolveError::NotFound { key: "k".into() }.into()) },
                        FallbackChain::<()>::new(),
                    )
                    .await;
            }

            let result: StrataResult<Outcome<&str>> = exec
                .execute(
                    "flaky",
                    TimeoutTier::Standard,
                    || async { Ok("unreached") },
                    FallbackChain::new(),
                )
                .await;

            match result.unwrap_err() {
                StrataError::Execute(ExecuteError::CircuitOpen { op_class }) => {
                    assert_eq!(op_class, "flaky");
                }
                other => panic!("unexpected error: {other}"),
            }
        });
    }

    #[test]
    fn breaker_short_circuits_after_threshold() {
        let rt = rt();
        let exec = fast_executor(Arc::new(EventBus::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        rt.block_on(async {
            // 5 consecutive failures trip the breaker.
            for _ in 0..5 {
                let calls = calls.clone();
                let _ = exec
                    .execute(
                        "flaky",
                        TimeoutTier::Standard,
                        move || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Err::<(), _>(ResolveError::NotFound { key: "k".into() }.into())
                        },
                        FallbackChain::<()>::new(),
                    )
                    .await;
            }
            assert_eq!(calls.load(Ordering::SeqCst), 5);

            // 6th call short-circuits: fn is not invoked.
            let calls6 = calls.clone();
            let outcome = exec
                .execute(
                    "flaky",
                    TimeoutTier::Standard,
                    move || async move {
                        calls6.fetch_add(1, Ordering::SeqCst);
                        Ok("primary")
                    },
                    FallbackChain::new().default_value("short-circuited"),
                )
                .await
                .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 5);
            assert_eq!(outcome.value, "short-circuited");
            assert_eq!(outcome.degraded_by, Some(FailureKind::CircuitOpen));

            // After the reset timeout, exactly one probe goes through and
            // closes the circuit on success.
            tokio::time::sleep(Duration::from_millis(80)).await;
            let calls7 = calls.clone();
            let outcome = exec
                .execute(
                    "flaky",
                    TimeoutTier::Standard,
                    move || async move {
                        calls7.fetch_add(1, Ordering::SeqCst);
                        Ok("recovered")
                    },
                    FallbackChain::<&str>::new(),
                )
                .await
                .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 6);
            assert_eq!(outcome.source, OutcomeSource::Primary);
            assert_eq!(outcome.value, "recovered");
        });
    }

    #[test]
    fn terminal_event_fires_exactly_once_per_call() {
        let rt = rt();
        let bus = Arc::new(EventBus::new());
        let log = event_log(&bus);
        let exec = fast_executor(bus);

        rt.block_on(async {
            // Success, fallback, and exhaustion paths.
            let _ = exec
                .execute(
                    "op",
                    TimeoutTier::Standard,
                    || async { Ok::<_, StrataError>(1) },
                    FallbackChain::new(),
                )
                .await;
            let _ = exec
                .execute(
                    "op",
                    TimeoutTier::Instant,
                    || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, StrataError>(2)
                    },
                    FallbackChain::new().default_value(0),
                )
                .await;
            let _ = exec
                .execute(
                    "op",
                    TimeoutTier::Standard,
                    || async { Err::<i32, _>(ResolveError::NotFound { key: "k".into() }.into()) },
                    FallbackChain::new(),
                )
                .await;
        });

        let log = log.lock().unwrap();
        let started = log.iter().filter(|t| *t == "op.started").count();
        let terminal = log
            .iter()
            .filter(|t| *t == "op.completed" || *t == "op.failed")
            .count();
        assert_eq!(started, 3);
        assert_eq!(terminal, 3);
    }
}
