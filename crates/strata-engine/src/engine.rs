use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use strata_core::config::StrataConfig;
use strata_core::constants::VERSION;
use strata_core::entry::{CacheTier, Content, Entry, EntryKey, LayerName};
use strata_core::errors::{FailureKind, ResolveError, StrataError, StrataResult};
use strata_core::traits::Loader;
use strata_core::{Event, TimeoutTier};
use strata_events::{EventBus, SubscriptionId};
use strata_executor::{retry_idempotent, CircuitSnapshot, Executor, FallbackChain, Outcome, OutcomeSource};
use strata_plugin::{HookContext, HookPoint, Plugin, PluginPipeline};
use strata_resolver::Resolver;
use strata_search::{SearchEngine, SearchResults};
use strata_store::{LoadGate, TieredStore};
use tracing::{debug, info};

const OP_LOAD: &str = "load";
const OP_SEARCH: &str = "search";
const OP_INFO: &str = "info";

/// Point-in-time view of the engine for the info boundary op.
#[derive(Debug, Serialize)]
pub struct EngineInfo {
    pub version: &'static str,
    pub uptime_ms: u64,
    pub layers: Vec<String>,
    pub tiers: Vec<TierInfo>,
    pub circuits: Vec<CircuitSnapshot>,
    pub plugin_count: usize,
    pub subscriber_count: usize,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TierInfo {
    pub tier: CacheTier,
    pub count: usize,
    pub bytes: usize,
}

/// One resolution engine instance. All subsystems hang off this value; drop
/// it and everything goes with it.
pub struct Engine {
    config: StrataConfig,
    store: Arc<TieredStore>,
    resolver: Resolver,
    executor: Executor,
    pipeline: PluginPipeline,
    bus: Arc<EventBus>,
    search: SearchEngine,
    loader: Arc<dyn Loader>,
    gate: LoadGate,
    started_at: Instant,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl Engine {
    /// Build an engine from a validated config. Configuration errors are
    /// fatal here; nothing is constructed on a bad config.
    pub fn new(config: StrataConfig, loader: Arc<dyn Loader>) -> StrataResult<Self> {
        config.validate()?;
        let bus = Arc::new(EventBus::new());
        let store = Arc::new(TieredStore::new(
            config.store.clone(),
            config.retention_policies(),
        ));
        let layers = config.ordered_layers();
        let resolver = Resolver::new(layers.clone(), store.clone());
        let executor = Executor::new(config.executor.clone(), bus.clone());
        let search = SearchEngine::new(store.clone(), &layers);

        Ok(Self {
            config,
            store,
            resolver,
            executor,
            pipeline: PluginPipeline::new(),
            bus,
            search,
            loader,
            gate: LoadGate::new(),
            started_at: Instant::now(),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    /// Run startup hooks and announce the engine. Idempotent: hooks run at
    /// most once per engine instance, repeat calls are no-ops.
    pub fn startup(&self) -> StrataResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut ctx = HookContext::default();
        self.pipeline.invoke(HookPoint::OnStartup, &mut ctx)?;
        self.bus.publish(&Event::new("engine.started"));
        info!(version = VERSION, "engine started");
        Ok(())
    }

    /// Run shutdown hooks and announce the stop. Also at most once.
    pub fn shutdown(&self) -> StrataResult<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut ctx = HookContext::default();
        self.pipeline.invoke(HookPoint::OnShutdown, &mut ctx)?;
        self.bus.publish(&Event::new("engine.stopped"));
        info!("engine stopped");
        Ok(())
    }

    /// Resolve `key`, loading it on a miss.
    ///
    /// A hit runs the cache-hit hook and returns merged content across
    /// layers (or the single layer's entry when one is named). A miss takes
    /// the per-key load gate, re-checks, runs pre-load hooks (which may
    /// short-circuit with their own content), loads with idempotent retry,
    /// runs post-load hooks, and stores the result hot.
    ///
    /// The whole call is executor-wrapped: timeout tier from config,
    /// breaker per op class, and a stale-cache-then-default fallback chain.
    pub async fn get(
        &self,
        layer: Option<&LayerName>,
        key: &str,
    ) -> StrataResult<Outcome<Entry>> {
        let tier = self.config.tier_for(OP_LOAD);
        let fallback = self.load_fallback(layer, key);
        let outcome = self
            .executor
            .execute(OP_LOAD, tier, || self.load_primary(layer, key), fallback)
            .await;
        self.fire_degradation_hooks(layer, key, &outcome)?;
        outcome
    }

    async fn load_primary(
        &self,
        layer: Option<&LayerName>,
        key: &str,
    ) -> StrataResult<Entry> {
        if let Some(entry) = self.lookup(layer, key)? {
            self.fire_cache_hit(&entry)?;
            return Ok(entry);
        }

        let target = match layer {
            Some(l) => l.clone(),
            None => self.resolver.layers()[0].name.clone(),
        };
        let gate_key = EntryKey::new(target.clone(), key);
        let _permit = self.gate.lock(&gate_key).await;

        // Another caller may have loaded while we waited.
        if let Some(entry) = self.lookup(layer, key)? {
            self.fire_cache_hit(&entry)?;
            return Ok(entry);
        }

        self.load_and_store(&target, key).await
    }

    async fn load_and_store(&self, target: &LayerName, key: &str) -> StrataResult<Entry> {
        let mut ctx = HookContext::for_key(Some(target.clone()), key);
        let pre = self.pipeline.invoke(HookPoint::PreLoad, &mut ctx)?;

        let content = if pre.short_circuited {
            // The plugin supplied the content itself; it is still cached so
            // repeat gets hit without re-invoking the pipeline.
            debug!(layer = %target, key, "pre-load hook short-circuited the load");
            ctx.content.take().ok_or_else(|| StrataError::Loader {
                layer: target.to_string(),
                key: key.to_string(),
                reason: "pre-load short-circuit supplied no content".to_string(),
            })?
        } else {
            let content = retry_idempotent(&self.config.executor.retry, OP_LOAD, || {
                self.loader.load(target, key)
            })
            .await?;

            let mut post_ctx =
                HookContext::for_key(Some(target.clone()), key).with_content(content);
            self.pipeline.invoke(HookPoint::PostLoad, &mut post_ctx)?;
            post_ctx.content.take().ok_or_else(|| StrataError::Loader {
                layer: target.to_string(),
                key: key.to_string(),
                reason: "post-load hook removed the loaded content".to_string(),
            })?
        };

        let entry = Entry::new(target.clone(), key, content);
        self.store.put(entry.clone())?;

        let mut miss_ctx =
            HookContext::for_key(Some(target.clone()), key).with_content(entry.content.clone());
        self.pipeline.invoke(HookPoint::OnCacheMiss, &mut miss_ctx)?;
        Ok(entry)
    }

    /// Hit check: scoped to one layer when named, merged across all layers
    /// otherwise. A miss is `Ok(None)`; anything else propagates.
    fn lookup(&self, layer: Option<&LayerName>, key: &str) -> StrataResult<Option<Entry>> {
        let resolved = match layer {
            Some(l) => self.resolver.resolve_in(l, key),
            None => self.resolver.resolve(key),
        };
        match resolved {
            Ok(entry) => Ok(Some(entry)),
            Err(StrataError::Resolve(ResolveError::NotFound { .. }))
            | Err(StrataError::Resolve(ResolveError::NotFoundInLayer { .. })) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn fire_cache_hit(&self, entry: &Entry) -> StrataResult<()> {
        let mut ctx = HookContext::for_key(Some(entry.layer.clone()), entry.key.clone())
            .with_content(entry.content.clone());
        self.pipeline.invoke(HookPoint::OnCacheHit, &mut ctx)?;
        Ok(())
    }

    /// Timeout and error hooks fire after the executor settles, whether the
    /// fallback chain saved the call or not.
    fn fire_degradation_hooks(
        &self,
        layer: Option<&LayerName>,
        key: &str,
        outcome: &StrataResult<Outcome<Entry>>,
    ) -> StrataResult<()> {
        let kind = match outcome {
            Ok(o) => o.degraded_by,
            Err(err) => Some(err.failure_kind()),
        };
        let Some(kind) = kind else {
            return Ok(());
        };

        let hook = match kind {
            FailureKind::Timeout => HookPoint::OnTimeout,
            _ => HookPoint::OnError,
        };
        let mut ctx = HookContext::for_key(layer.cloned(), key);
        ctx.set("failure_kind", kind.to_string());
        self.pipeline.invoke(hook, &mut ctx)?;
        Ok(())
    }

    /// Stale cache first, then the configured per-key default, then nothing.
    fn load_fallback(&self, layer: Option<&LayerName>, key: &str) -> FallbackChain<Entry> {
        let store = self.store.clone();
        let scan_layers: Vec<LayerName> = match layer {
            Some(l) => vec![l.clone()],
            None => self.resolver.layers().iter().map(|l| l.name.clone()).collect(),
        };
        let key_owned = key.to_string();
        let mut chain = FallbackChain::new().stale_cache(move || {
            // peek skips access bookkeeping and promotion; anything still
            // held in any tier counts.
            scan_layers.iter().find_map(|l| store.peek(l, &key_owned))
        });

        if let Some(text) = self.config.fallback_defaults.get(key) {
            let target = match layer {
                Some(l) => l.clone(),
                None => self.resolver.layers()[0].name.clone(),
            };
            chain = chain.default_value(Entry::new(target, key, Content::from(text.clone())));
        }
        chain
    }

    /// Scan for `query`, optionally within one layer.
    ///
    /// Pre-search hooks may rewrite the query (via the context key) or
    /// short-circuit, which vetoes the scan and returns no hits. The scan
    /// itself runs executor-wrapped with a partial-results default, so a
    /// timed-out search degrades instead of failing.
    pub async fn search(
        &self,
        query: &str,
        layer: Option<&LayerName>,
    ) -> StrataResult<Outcome<SearchResults>> {
        let mut ctx = HookContext::for_key(layer.cloned(), query);
        let pre = self.pipeline.invoke(HookPoint::PreSearch, &mut ctx)?;
        if pre.short_circuited {
            debug!(query, "pre-search hook vetoed the scan");
            return Ok(Outcome {
                value: SearchResults::default(),
                source: OutcomeSource::Primary,
                degraded_by: None,
            });
        }
        let query = ctx.key.clone().unwrap_or_else(|| query.to_string());

        let tier = self.config.tier_for(OP_SEARCH);
        let bound = self.config.executor.tier_bounds.bound(tier);
        let fallback = FallbackChain::new().default_value(SearchResults {
            hits: Vec::new(),
            partial: true,
            scanned: 0,
        });

        let outcome = self
            .executor
            .execute(
                OP_SEARCH,
                tier,
                || async {
                    let deadline = Instant::now() + bound;
                    Ok(self.search.search(&query, layer, Some(deadline)))
                },
                fallback,
            )
            .await?;

        let mut post_ctx = HookContext::for_key(layer.cloned(), query);
        post_ctx.set("hits", outcome.value.hits.len());
        post_ctx.set("partial", outcome.value.partial);
        self.pipeline.invoke(HookPoint::PostSearch, &mut post_ctx)?;
        Ok(outcome)
    }

    /// Point-in-time view of the engine, executor-wrapped like every other
    /// boundary op: it publishes `info.started`/`info.completed` and shares
    /// the breaker and timeout discipline. Building the snapshot cannot
    /// fail, so no fallback chain is configured.
    pub async fn info(&self) -> StrataResult<Outcome<EngineInfo>> {
        let tier = self
            .config
            .operations
            .get(OP_INFO)
            .copied()
            .unwrap_or(TimeoutTier::Instant);
        self.executor
            .execute(OP_INFO, tier, || async { Ok(self.collect_info()) }, FallbackChain::new())
            .await
    }

    fn collect_info(&self) -> EngineInfo {
        let stats = self.store.tier_stats();
        let tiers = CacheTier::all()
            .into_iter()
            .map(|tier| {
                let s = stats.get(&tier).copied().unwrap_or_default();
                TierInfo {
                    tier,
                    count: s.count,
                    bytes: s.bytes,
                }
            })
            .collect();

        EngineInfo {
            version: VERSION,
            uptime_ms: self.started_at.elapsed().as_millis() as u64,
            layers: self
                .resolver
                .layers()
                .iter()
                .map(|l| l.name.to_string())
                .collect(),
            tiers,
            circuits: self.executor.circuit_snapshots(),
            plugin_count: self.pipeline.plugin_count(),
            subscriber_count: self.bus.subscriber_count(),
            entry_count: self.store.len(),
        }
    }

    /// Periodic maintenance trigger: retention sweep, budget eviction, and
    /// load-gate slot reclamation.
    pub fn maintain(&self) {
        self.store.evict_if_needed();
        self.gate.sweep();
    }

    /// Insert directly, bypassing loaders but not eviction.
    pub fn put(&self, entry: Entry) -> StrataResult<()> {
        self.store.put(entry)
    }

    pub fn delete(&self, layer: &LayerName, key: &str) -> Option<Entry> {
        self.store.delete(layer, key)
    }

    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> StrataResult<()> {
        self.pipeline.register(plugin)
    }

    pub fn set_plugin_enabled(&self, name: &str, enabled: bool) -> bool {
        self.pipeline.set_enabled(name, enabled)
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(pattern, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }
}
