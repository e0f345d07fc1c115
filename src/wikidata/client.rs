// HTTP client for Wikidata's EntityData endpoint.
//
// `GET /wiki/Special:EntityData/<id>.json` returns the full entity,
// labels included, without authentication. We only read labels. Requests
// are issued one at a time; there is no batching, retry or backoff.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::LabelResolver;

/// Public Wikidata instance.
pub const DEFAULT_WIKIDATA_URL: &str = "https://www.wikidata.org";

/// Label language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Response from the EntityData endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDataResponse {
    pub entities: HashMap<String, Entity>,
}

/// The parts of a Wikidata entity we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub id: Option<String>,
    /// Language code → label. Deleted entities carry no labels.
    #[serde(default)]
    pub labels: BTreeMap<String, MonolingualText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonolingualText {
    pub language: String,
    pub value: String,
}

/// Pick the label for `id` out of an EntityData response.
///
/// Prefers `language`, then falls back to the first label in language-code
/// order. If the requested id is absent but the response holds exactly one
/// entity, the id was redirected and that entity is used.
pub fn label_from_entity_data(
    response: &EntityDataResponse,
    id: &str,
    language: &str,
) -> Result<String> {
    let entity = match response.entities.get(id) {
        Some(entity) => entity,
        None if response.entities.len() == 1 => response
            .entities
            .values()
            .next()
            .context("EntityData response is empty")?,
        None => anyhow::bail!("Entity {id} not present in EntityData response"),
    };

    if let Some(label) = entity.labels.get(language) {
        return Ok(label.value.clone());
    }

    entity
        .labels
        .values()
        .next()
        .map(|label| label.value.clone())
        .with_context(|| format!("Entity {id} has no labels"))
}

/// Client for Wikidata label lookups.
pub struct WikidataClient {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl WikidataClient {
    /// Create a new client pointing at the given Wikidata base URL.
    pub fn new(base_url: &str, language: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("quotescope/0.1 (quotebank enrichment)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }

    /// Fetch the EntityData document for a single identifier.
    pub async fn get_entity(&self, id: &str) -> Result<EntityDataResponse> {
        // The id becomes a path segment; refuse anything that isn't a bare identifier
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!("Refusing to look up malformed identifier {id:?}");
        }

        let url = format!("{}/wiki/Special:EntityData/{}.json", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Wikidata request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Wikidata returned {} for {}", status, id);
        }

        response
            .json::<EntityDataResponse>()
            .await
            .context("Failed to parse Wikidata EntityData response")
    }
}

#[async_trait]
impl LabelResolver for WikidataClient {
    async fn resolve_label(&self, id: &str) -> Result<String> {
        let entity = self.get_entity(id).await?;
        let label = label_from_entity_data(&entity, id, &self.language)?;
        debug!(id = id, label = %label, "Resolved label");
        Ok(label)
    }
}
