use serde::{Deserialize, Serialize};

/// One model offering from one provider, in the unified schema.
///
/// Prices are USD per 1,000,000 tokens. `None` means unknown or not
/// applicable; `Some(0.0)` means free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub provider: String,
    pub model: String,
    pub context_length: Option<u64>,
    pub prompt_price: Option<f64>,
    pub completion_price: Option<f64>,
    #[serde(default)]
    pub description: String,
    pub stars: Option<u64>,
    pub hf_likes: Option<u64>,
}

impl ModelRecord {
    /// Record with only the identifying fields set.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            context_length: None,
            prompt_price: None,
            completion_price: None,
            description: String::new(),
            stars: None,
            hf_likes: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.prompt_price == Some(0.0) && self.completion_price == Some(0.0)
    }
}

/// Body of the aggregation endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelRecord>,
}

impl From<Vec<ModelRecord>> for ModelsResponse {
    fn from(models: Vec<ModelRecord>) -> Self {
        Self { models }
    }
}

/// Convert a per-token USD price into a per-million-token price.
///
/// Accepts JSON strings (`"0.000002"`) and numbers. Unparseable and negative
/// inputs yield `None`; negative values are sentinels for variable pricing.
pub fn per_million(raw: Option<&serde_json::Value>) -> Option<f64> {
    let per_token = match raw? {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if !per_token.is_finite() || per_token < 0.0 {
        return None;
    }
    Some(per_token * 1_000_000.0)
}
