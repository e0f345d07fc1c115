// Label resolver trait — the seam between enrichment and Wikidata.
//
// Enrichment never reaches for a global client. The caller builds a
// resolver (the HTTP client in production, a fixed map in tests) and
// passes it into every call that needs labels.

use anyhow::Result;
use async_trait::async_trait;

/// Resolves a single Wikidata identifier to its display label.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Look up the label for `id`. Any failure (unknown entity, network,
    /// entity without labels) is an error; callers decide whether to skip.
    async fn resolve_label(&self, id: &str) -> Result<String>;
}

/// Resolver for runs that only copy raw columns.
/// Errors on every lookup so a misconfigured plan can't silently drop labels.
pub struct NoopResolver;

#[async_trait]
impl LabelResolver for NoopResolver {
    async fn resolve_label(&self, id: &str) -> Result<String> {
        anyhow::bail!("NoopResolver cannot resolve {id}: no label source configured")
    }
}
