use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::catalog::GithubRepo;
use crate::config::Endpoints;
use crate::error::{PriceError, Result};
use crate::provider::ProviderKind;

const USER_AGENT: &str = concat!("llm-prices/", env!("CARGO_PKG_VERSION"));

/// HTTP access to provider listings and the two popularity sources.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, endpoints })
    }

    async fn get_json(&self, url: &str, headers: &[(&str, String)]) -> Result<Value> {
        debug!(url, "GET");
        let mut req = self.http.get(url);
        for (name, value) in headers {
            req = req.header(*name, value);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PriceError::Api { status, body });
        }
        Ok(resp.json().await?)
    }

    /// Raw model listing of a provider. Providers without a listing endpoint
    /// yield a config error.
    pub async fn list_models(&self, kind: ProviderKind, credential: &str) -> Result<Value> {
        let url = self.endpoints.models_url(kind).ok_or_else(|| {
            PriceError::Config(format!("{kind} has no model listing endpoint"))
        })?;
        let auth = kind.info().auth.header_value(credential);
        self.get_json(
            url,
            &[
                ("Authorization", auth),
                ("Content-Type", "application/json".to_string()),
            ],
        )
        .await
    }

    /// Star count of a GitHub repository. The token is optional.
    pub async fn repo_stars(&self, repo: &GithubRepo, token: Option<&str>) -> Result<u64> {
        let url = format!("{}/repos/{}/{}", self.endpoints.github_api, repo.owner, repo.repo);
        let mut headers = vec![("Accept", "application/vnd.github+json".to_string())];
        if let Some(t) = token {
            headers.push(("Authorization", format!("Bearer {t}")));
        }
        let data = self.get_json(&url, &headers).await?;
        Ok(data
            .get("stargazers_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// Like count of a Hugging Face model such as `meta-llama/Llama-3.3-70B-Instruct`.
    pub async fn hf_likes(&self, model_id: &str, token: &str) -> Result<u64> {
        let url = format!("{}/models/{model_id}", self.endpoints.huggingface_api);
        let data = self
            .get_json(&url, &[("Authorization", format!("Bearer {token}"))])
            .await?;
        Ok(data.get("likes").and_then(|v| v.as_u64()).unwrap_or(0))
    }
}

/// Log a failed upstream call: a non-success status is a warning, anything
/// else an error.
pub(crate) fn log_failure(what: &str, err: &PriceError) {
    if err.is_upstream_status() {
        warn!("{what}: {err}");
    } else {
        error!("{what}: {err}");
    }
}
