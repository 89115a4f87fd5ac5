//! Ordered degradation: cached value (possibly stale), then a default/static
//! value, then a terminal error. Empty stages fall through to the next one.

use strata_core::errors::FallbackStage;

type Supplier<T> = Box<dyn FnOnce() -> Option<T> + Send>;

/// The fallback chain tried when the primary operation fails, times out, or
/// is short-circuited by an open breaker. Built per call; stage order is the
/// order of builder calls, conventionally stale cache before default.
#[derive(Default)]
pub struct FallbackChain<T> {
    stages: Vec<(FallbackStage, Supplier<T>)>,
}

impl<T> FallbackChain<T> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// A cached value, even if stale. Returning `None` falls through.
    pub fn stale_cache<F>(mut self, supplier: F) -> Self
    where
        F: FnOnce() -> Option<T> + Send + 'static,
    {
        self.stages.push((FallbackStage::StaleCache, Box::new(supplier)));
        self
    }

    /// A configured default/static value.
    pub fn default_value(mut self, value: T) -> Self
    where
        T: Send + 'static,
    {
        self.stages
            .push((FallbackStage::DefaultValue, Box::new(move || Some(value))));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Try stages strictly in order; the first non-empty result wins.
    /// On exhaustion, reports the last stage attempted.
    pub(crate) fn resolve(self) -> Result<(T, FallbackStage), Option<FallbackStage>> {
        let mut last_stage = None;
        for (stage, supplier) in self.stages {
            last_stage = Some(stage);
            if let Some(value) = supplier() {
                return Ok((value, stage));
            }
        }
        Err(last_stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_stage_wins() {
        let chain = FallbackChain::new()
            .stale_cache(|| Some("stale"))
            .default_value("default");
        let (value, stage) = chain.resolve().unwrap();
        assert_eq!(value, "stale");
        assert_eq!(stage, FallbackStage::StaleCache);
    }

    #[test]
    fn empty_stage_falls_through() {
        let chain = FallbackChain::new()
            .stale_cache(|| None)
            .default_value("default");
        let (value, stage) = chain.resolve().unwrap();
        assert_eq!(value, "default");
        assert_eq!(stage, FallbackStage::DefaultValue);
    }

    #[test]
    fn exhaustion_reports_last_attempted_stage() {
        let chain: FallbackChain<&str> = FallbackChain::new().stale_cache(|| None);
        assert_eq!(chain.resolve().unwrap_err(), Some(FallbackStage::StaleCache));

        let empty: FallbackChain<&str> = FallbackChain::new();
        assert_eq!(empty.resolve().unwrap_err(), None);
    }
}
