use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PriceError, Result};
use crate::record::ModelRecord;

/// A GitHub repository whose star count stands in for a model's popularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

impl GithubRepo {
    pub fn new(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }
}

impl std::fmt::Display for GithubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Heuristic mapping from model-id fragments to a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRule {
    /// Fragment matched against the owner prefix of the model id.
    pub provider: Option<String>,
    /// Fragment matched against the whole model id.
    pub model: Option<String>,
    #[serde(flatten)]
    pub repo: GithubRepo,
}

impl RepoRule {
    /// Both inputs must already be lowercase.
    fn matches(&self, id_lower: &str, prefix_lower: &str) -> bool {
        let hit = |fragment: &Option<String>, haystack: &str| {
            fragment
                .as_deref()
                .map(|f| !f.is_empty() && haystack.contains(&f.to_lowercase()))
                .unwrap_or(false)
        };
        hit(&self.provider, prefix_lower) || hit(&self.model, id_lower)
    }
}

/// USD per 1M tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePrice {
    pub prompt: Option<f64>,
    pub completion: Option<f64>,
}

/// Curated open-weight model listed without a live provider call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWeightModel {
    pub id: String,
    pub context_length: Option<u64>,
    pub prompt_price: Option<f64>,
    pub completion_price: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl OpenWeightModel {
    pub fn to_record(&self, provider: &str) -> ModelRecord {
        ModelRecord {
            context_length: self.context_length,
            prompt_price: self.prompt_price,
            completion_price: self.completion_price,
            description: self.description.clone(),
            ..ModelRecord::new(provider, &self.id)
        }
    }
}

/// Immutable lookup tables: repository overrides and rules, Groq prices,
/// and the curated open-weight list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub repo_overrides: BTreeMap<String, GithubRepo>,
    #[serde(default)]
    pub repo_rules: Vec<RepoRule>,
    #[serde(default)]
    pub groq_pricing: BTreeMap<String, TablePrice>,
    #[serde(default)]
    pub open_weights: Vec<OpenWeightModel>,
}

impl Catalog {
    /// Parse and validate a catalog from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(toml_str)
            .map_err(|e| PriceError::Config(format!("bad catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped in `data/catalog.toml`.
    pub fn bundled() -> Result<Self> {
        Self::parse(include_str!("../../../data/catalog.toml"))
    }

    /// Load a catalog file from disk.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PriceError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        let repos = self
            .repo_overrides
            .iter()
            .map(|(k, r)| (k.as_str(), r))
            .chain(self.repo_rules.iter().map(|r| ("repo rule", &r.repo)));
        for (key, repo) in repos {
            if repo.owner.is_empty() || repo.repo.is_empty() {
                return Err(PriceError::Config(format!("{key}: owner and repo are required")));
            }
        }
        for (i, rule) in self.repo_rules.iter().enumerate() {
            let blank = |f: &Option<String>| f.as_deref().map_or(true, str::is_empty);
            if blank(&rule.provider) && blank(&rule.model) {
                return Err(PriceError::Config(format!(
                    "repo rule #{} ({}) has neither provider nor model fragment",
                    i + 1,
                    rule.repo
                )));
            }
        }
        let negative = |p: Option<f64>| p.is_some_and(|v| v < 0.0);
        for (key, price) in &self.groq_pricing {
            if negative(price.prompt) || negative(price.completion) {
                return Err(PriceError::Config(format!("{key}: negative price")));
            }
        }
        for m in &self.open_weights {
            if m.id.is_empty() {
                return Err(PriceError::Config("open-weight model without id".into()));
            }
            if negative(m.prompt_price) || negative(m.completion_price) {
                return Err(PriceError::Config(format!("{}: negative price", m.id)));
            }
        }
        Ok(())
    }

    /// Pick the repository whose stars represent `model_id`.
    ///
    /// Exact overrides win; otherwise the first matching rule. `None` means
    /// no lookup should be made.
    pub fn resolve_repo(&self, model_id: &str) -> Option<&GithubRepo> {
        if let Some(repo) = self.repo_overrides.get(model_id) {
            return Some(repo);
        }
        let id = model_id.to_lowercase();
        let prefix = id.split('/').next().unwrap_or("");
        self.repo_rules
            .iter()
            .find(|rule| rule.matches(&id, prefix))
            .map(|rule| &rule.repo)
    }

    /// Listed Groq price for a model id such as `gemma2-9b-it` or
    /// `gemma2-9b-it:latest`. Unknown ids have no price.
    pub fn groq_price(&self, model_id: &str) -> TablePrice {
        let key = model_id.split(':').next().unwrap_or(model_id);
        self.groq_pricing.get(key).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses() {
        let c = Catalog::bundled().expect("bundled catalog should parse");
        assert_eq!(c.repo_overrides.len(), 3);
        assert_eq!(c.repo_rules.len(), 5);
        assert_eq!(c.open_weights.len(), 3);
        assert!(c.open_weights.iter().all(|m| m.prompt_price == Some(0.0)));
    }

    #[test]
    fn override_beats_rules() {
        let c = Catalog::bundled().unwrap();
        let repo = c.resolve_repo("qwen/Qwen3-Max-Thinking").unwrap();
        assert_eq!(repo, &GithubRepo::new("QwenLM", "Qwen"));
    }

    #[test]
    fn llama_fragment_resolves_to_meta_repo() {
        let c = Catalog::bundled().unwrap();
        let repo = c.resolve_repo("nousresearch/hermes-3-LLaMA-3.1-405b").unwrap();
        assert_eq!(repo, &GithubRepo::new("meta-llama", "llama"));
    }

    #[test]
    fn provider_prefix_matches_without_model_fragment() {
        let c = Catalog::bundled().unwrap();
        let repo = c.resolve_repo("google/gemini-2.5-pro").unwrap();
        assert_eq!(repo, &GithubRepo::new("google", "gemma"));
    }

    #[test]
    fn first_rule_wins() {
        // Both the llama and mistral rules match; llama is listed first.
        let c = Catalog::bundled().unwrap();
        let repo = c.resolve_repo("mistralai/llama-mistral-merge").unwrap();
        assert_eq!(repo.owner, "meta-llama");
    }

    #[test]
    fn unmatched_id_resolves_to_none() {
        let c = Catalog::bundled().unwrap();
        assert!(c.resolve_repo("openai/gpt-4o").is_none());
        assert!(c.resolve_repo("").is_none());
    }

    #[test]
    fn groq_price_strips_tag_suffix() {
        let c = Catalog::bundled().unwrap();
        let p = c.groq_price("gemma2-9b-it:latest");
        assert_eq!(p.prompt, Some(0.10));
        assert_eq!(c.groq_price("unknown-model"), TablePrice::default());
    }

    #[test]
    fn rule_without_fragments_is_rejected() {
        let toml = r#"
[[repo_rules]]
owner = "a"
repo = "b"
"#;
        assert!(Catalog::parse(toml).is_err());
    }

    #[test]
    fn negative_table_price_is_rejected() {
        let toml = r#"
[groq_pricing."m"]
prompt = -1.0
"#;
        assert!(Catalog::parse(toml).is_err());
    }

    #[test]
    fn empty_catalog_is_valid() {
        let c = Catalog::parse("").unwrap();
        assert!(c.resolve_repo("meta-llama/anything").is_none());
        assert!(c.open_weights.is_empty());
    }
}
