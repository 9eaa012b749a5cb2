use aerochem_game::{
    ChemicalInfo, EnrichmentError, EnrichmentSource, StaticEnrichment, describe_with_timeout,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Asynchronous source of chemical descriptions.
#[async_trait]
pub trait ChemicalLookup: Send + Sync {
    /// Name used for logging.
    fn name(&self) -> &'static str;

    async fn lookup(&self, chemical: &str) -> Result<Option<ChemicalInfo>, EnrichmentError>;
}

/// Adapts a synchronous [`EnrichmentSource`] to the async seam.
pub struct SourceLookup<S> {
    source: S,
}

impl<S> SourceLookup<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }
}

impl SourceLookup<StaticEnrichment> {
    pub const fn builtin() -> Self {
        Self::new(StaticEnrichment)
    }
}

#[async_trait]
impl<S: EnrichmentSource> ChemicalLookup for SourceLookup<S> {
    fn name(&self) -> &'static str {
        "built-in"
    }

    async fn lookup(&self, chemical: &str) -> Result<Option<ChemicalInfo>, EnrichmentError> {
        self.source.lookup(chemical)
    }
}

/// Wraps another lookup with a fixed latency, standing in for a remote
/// provider.
pub struct DelayedLookup {
    inner: Arc<dyn ChemicalLookup>,
    delay: Duration,
}

impl DelayedLookup {
    pub fn new(inner: Arc<dyn ChemicalLookup>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ChemicalLookup for DelayedLookup {
    fn name(&self) -> &'static str {
        "delayed"
    }

    async fn lookup(&self, chemical: &str) -> Result<Option<ChemicalInfo>, EnrichmentError> {
        tokio::time::sleep(self.delay).await;
        self.inner.lookup(chemical).await
    }
}

/// Describe `chemical`, giving up after `timeout` and falling back to the
/// default text.
pub async fn enrich(
    lookup: &dyn ChemicalLookup,
    chemical: &str,
    timeout: Duration,
) -> ChemicalInfo {
    log::debug!("enriching {chemical} via {}", lookup.name());
    describe_with_timeout(chemical, lookup.lookup(chemical), timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builtin_lookup_answers() {
        let lookup = SourceLookup::builtin();
        let info = enrich(&lookup, "Ethanol", Duration::from_secs(1)).await;
        assert_eq!(info.formula, "C2H6O");
        assert_eq!(info.source, "built-in");
    }

    #[tokio::test]
    async fn slow_lookup_falls_back() {
        let lookup = DelayedLookup::new(
            Arc::new(SourceLookup::builtin()),
            Duration::from_millis(200),
        );
        let info = enrich(&lookup, "Ethanol", Duration::from_millis(10)).await;
        assert_eq!(info, ChemicalInfo::fallback("Ethanol"));
    }

    #[test]
    fn unknown_chemical_uses_default_text() {
        let lookup = SourceLookup::builtin();
        let info = tokio_test::block_on(enrich(&lookup, "Kerosene", Duration::from_secs(1)));
        assert_eq!(info.source, "default");
    }
}
