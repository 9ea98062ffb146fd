//! Best-effort popularity lookups.
//!
//! Records are never dropped here: a failed lookup leaves the field `None`.
//! All lookups of a batch run together and the batch is returned once every
//! one of them has settled.

use futures::future::join_all;
use tracing::debug;

use crate::api::{log_failure, ApiClient};
use crate::catalog::{Catalog, GithubRepo};
use crate::config::Credentials;
use crate::parse::OpenRouterEntry;
use crate::record::ModelRecord;

pub struct Enricher<'a> {
    api: &'a ApiClient,
    catalog: &'a Catalog,
    creds: &'a Credentials,
}

impl<'a> Enricher<'a> {
    pub fn new(api: &'a ApiClient, catalog: &'a Catalog, creds: &'a Credentials) -> Self {
        Self { api, catalog, creds }
    }

    pub async fn stars(&self, repo: &GithubRepo) -> Option<u64> {
        match self.api.repo_stars(repo, self.creds.github.as_deref()).await {
            Ok(n) => Some(n),
            Err(e) => {
                log_failure(&format!("GitHub stars for {repo}"), &e);
                None
            }
        }
    }

    /// `None` without an HF token, without an id, or on failure.
    pub async fn likes(&self, hf_id: Option<&str>) -> Option<u64> {
        let (id, token) = match (hf_id, self.creds.huggingface.as_deref()) {
            (Some(id), Some(token)) if !id.is_empty() => (id, token),
            _ => return None,
        };
        match self.api.hf_likes(id, token).await {
            Ok(n) => Some(n),
            Err(e) => {
                log_failure(&format!("HF likes for {id}"), &e);
                None
            }
        }
    }

    /// Stars and likes for one OpenRouter record, looked up concurrently.
    pub async fn enrich_entry(&self, entry: OpenRouterEntry) -> ModelRecord {
        let OpenRouterEntry {
            mut record,
            hugging_face_id,
        } = entry;
        let repo = self.catalog.resolve_repo(&record.model);
        if repo.is_none() {
            debug!(model = %record.model, "no repository mapping, skipping stars");
        }
        let stars = async {
            match repo {
                Some(r) => self.stars(r).await,
                None => None,
            }
        };
        let (stars, likes) = futures::join!(stars, self.likes(hugging_face_id.as_deref()));
        record.stars = stars;
        record.hf_likes = likes;
        record
    }

    /// Enrich a whole OpenRouter listing, keeping input order.
    pub async fn enrich_openrouter(&self, entries: Vec<OpenRouterEntry>) -> Vec<ModelRecord> {
        join_all(entries.into_iter().map(|e| self.enrich_entry(e))).await
    }

    /// The catalog's open-weight list as records, each with its likes.
    pub async fn open_weights(&self, provider: &str) -> Vec<ModelRecord> {
        join_all(self.catalog.open_weights.iter().map(|m| async move {
            let mut record = m.to_record(provider);
            record.hf_likes = self.likes(Some(&m.id)).await;
            record
        }))
        .await
    }
}
