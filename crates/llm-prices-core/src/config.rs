use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// Credentials gating each provider and enrichment. Absent means disabled.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openrouter: Option<String>,
    pub together: Option<String>,
    pub groq: Option<String>,
    pub replicate: Option<String>,
    pub huggingface: Option<String>,
    /// Optional for star lookups; raises the GitHub rate limit when set.
    pub github: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// The Hugging Face token also falls back to `HUGGING_FACE_HUB_TOKEN` and
    /// `~/.cache/huggingface/token`.
    pub fn from_env() -> Self {
        let mut creds = Self::from_lookup(|key| std::env::var(key).ok());
        #[cfg(feature = "network")]
        if creds.huggingface.is_none() {
            creds.huggingface = dirs::home_dir()
                .map(|home| home.join(".cache/huggingface/token"))
                .and_then(|path| std::fs::read_to_string(path).ok())
                .and_then(non_blank);
        }
        creds
    }

    /// Build credentials from an arbitrary key lookup. Blank values count as
    /// missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(non_blank);
        Self {
            openrouter: get("OPENROUTER_API_KEY"),
            together: get("TOGETHER_API_KEY"),
            groq: get("GROQ_API_KEY"),
            replicate: get("REPLICATE_API_TOKEN"),
            huggingface: get("HF_TOKEN").or_else(|| get("HUGGING_FACE_HUB_TOKEN")),
            github: get("GITHUB_PAT"),
        }
    }

    pub fn for_provider(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::OpenRouter => self.openrouter.as_deref(),
            ProviderKind::Together => self.together.as_deref(),
            ProviderKind::Groq => self.groq.as_deref(),
            ProviderKind::Replicate => self.replicate.as_deref(),
            ProviderKind::HuggingFace => self.huggingface.as_deref(),
        }
    }

    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        self.for_provider(kind).is_some()
    }
}

fn non_blank(s: String) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("openrouter", &mask(&self.openrouter))
            .field("together", &mask(&self.together))
            .field("groq", &mask(&self.groq))
            .field("replicate", &mask(&self.replicate))
            .field("huggingface", &mask(&self.huggingface))
            .field("github", &mask(&self.github))
            .finish()
    }
}

/// Upstream URLs. Defaults point at the live services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub openrouter_models: String,
    pub together_models: String,
    pub groq_models: String,
    pub replicate_models: String,
    pub github_api: String,
    pub huggingface_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            openrouter_models: "https://openrouter.ai/api/v1/models".into(),
            together_models: "https://api.together.xyz/v1/models".into(),
            groq_models: "https://api.groq.com/openai/v1/models".into(),
            replicate_models: "https://api.replicate.com/v1/models".into(),
            github_api: "https://api.github.com".into(),
            huggingface_api: "https://huggingface.co/api".into(),
        }
    }
}

impl Endpoints {
    /// Every service under one base URL, e.g. a local mock server:
    /// `{base}/openrouter/models`, `{base}/github`, `{base}/hf`, ...
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            openrouter_models: format!("{base}/openrouter/models"),
            together_models: format!("{base}/together/models"),
            groq_models: format!("{base}/groq/models"),
            replicate_models: format!("{base}/replicate/models"),
            github_api: format!("{base}/github"),
            huggingface_api: format!("{base}/hf"),
        }
    }

    /// Model-listing URL; `None` for providers served from the catalog.
    pub fn models_url(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::OpenRouter => Some(&self.openrouter_models),
            ProviderKind::Together => Some(&self.together_models),
            ProviderKind::Groq => Some(&self.groq_models),
            ProviderKind::Replicate => Some(&self.replicate_models),
            ProviderKind::HuggingFace => None,
        }
    }
}
