use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{log_failure, ApiClient};
use crate::catalog::Catalog;
use crate::config::{Credentials, Endpoints};
use crate::enrich::Enricher;
use crate::error::Result;
use crate::parse;
use crate::provider::{ProviderKind, PROVIDERS};
use crate::record::ModelRecord;

/// What one provider contributed to an aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// No credential configured.
    Skipped,
    Fetched(usize),
    /// Contributed nothing; carries the reason.
    Failed(String),
}

/// Builds the combined model list. Immutable; safe to share across requests.
#[derive(Clone)]
pub struct Aggregator {
    api: ApiClient,
    catalog: Arc<Catalog>,
    creds: Arc<Credentials>,
}

impl Aggregator {
    pub fn new(endpoints: Endpoints, catalog: Catalog, creds: Credentials) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(endpoints)?,
            catalog: Arc::new(catalog),
            creds: Arc::new(creds),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.creds
    }

    fn enricher(&self) -> Enricher<'_> {
        Enricher::new(&self.api, &self.catalog, &self.creds)
    }

    /// Records of one provider. `Ok(vec![])` when its credential is missing.
    pub async fn fetch_provider(&self, kind: ProviderKind) -> Result<Vec<ModelRecord>> {
        let Some(credential) = self.creds.for_provider(kind) else {
            return Ok(Vec::new());
        };
        let records = match kind {
            ProviderKind::OpenRouter => {
                let data = self.api.list_models(kind, credential).await?;
                let entries = parse::parse_openrouter(&data)?;
                debug!(count = entries.len(), "enriching OpenRouter models");
                self.enricher().enrich_openrouter(entries).await
            }
            ProviderKind::Together => {
                parse::parse_together(&self.api.list_models(kind, credential).await?)?
            }
            ProviderKind::Groq => {
                parse::parse_groq(&self.api.list_models(kind, credential).await?, &self.catalog)?
            }
            ProviderKind::Replicate => {
                parse::parse_replicate(&self.api.list_models(kind, credential).await?)?
            }
            ProviderKind::HuggingFace => {
                self.enricher().open_weights(kind.display_name()).await
            }
        };
        Ok(records)
    }

    /// Every provider in registry order, one after another, with the outcome
    /// of each. Failures are logged and contribute nothing.
    pub async fn collect_with_outcomes(&self) -> (Vec<ModelRecord>, Vec<(ProviderKind, ProviderOutcome)>) {
        let mut records = Vec::new();
        let mut outcomes = Vec::with_capacity(PROVIDERS.len());
        for p in PROVIDERS {
            let outcome = if !self.creds.is_enabled(p.kind) {
                debug!(provider = p.display_name, env = p.credential_env, "no credential, skipping");
                ProviderOutcome::Skipped
            } else {
                match self.fetch_provider(p.kind).await {
                    Ok(batch) => {
                        info!(provider = p.display_name, count = batch.len(), "fetched models");
                        let n = batch.len();
                        records.extend(batch);
                        ProviderOutcome::Fetched(n)
                    }
                    Err(e) => {
                        log_failure(&format!("{} fetch", p.display_name), &e);
                        ProviderOutcome::Failed(e.to_string())
                    }
                }
            };
            outcomes.push((p.kind, outcome));
        }
        (records, outcomes)
    }

    /// The combined list. Never fails; an empty list is a valid answer.
    pub async fn collect(&self) -> Vec<ModelRecord> {
        self.collect_with_outcomes().await.0
    }
}
