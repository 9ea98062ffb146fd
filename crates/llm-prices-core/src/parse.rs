//! Map provider listing payloads onto [`ModelRecord`].
//!
//! Each provider shapes its `/models` response differently. These functions
//! are pure so they can be tested against captured JSON.

use serde_json::Value;

use crate::catalog::Catalog;
use crate::error::{PriceError, Result};
use crate::provider::ProviderKind;
use crate::record::{per_million, ModelRecord};

/// An OpenRouter record plus the identifier used for the likes lookup.
#[derive(Debug, Clone)]
pub struct OpenRouterEntry {
    pub record: ModelRecord,
    pub hugging_face_id: Option<String>,
}

/// Array under `field`. A missing field is an empty listing; anything other
/// than an array is a shape error.
fn list_field<'a>(data: &'a Value, field: &str) -> Result<&'a [Value]> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(PriceError::Shape(format!(
            "`{field}` should be an array, got {}",
            kind_of(other)
        ))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn str_field(m: &Value, key: &str) -> Option<String> {
    m.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn model_id(m: &Value) -> Option<String> {
    str_field(m, "id").or_else(|| str_field(m, "name"))
}

/// First non-zero integer among `keys`. Whole floats such as `8192.0` count.
fn context_length(m: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|k| m.get(*k).and_then(window_size).filter(|n| *n > 0))
}

fn window_size(v: &Value) -> Option<u64> {
    v.as_u64().or_else(|| {
        v.as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn description(m: &Value) -> String {
    str_field(m, "description").unwrap_or_default()
}

/// `pricing.prompt` / `pricing.completion`, per token, scaled to per million.
fn token_prices(m: &Value) -> (Option<f64>, Option<f64>) {
    let pricing = m.get("pricing");
    (
        per_million(pricing.and_then(|p| p.get("prompt"))),
        per_million(pricing.and_then(|p| p.get("completion"))),
    )
}

pub fn parse_openrouter(data: &Value) -> Result<Vec<OpenRouterEntry>> {
    let name = ProviderKind::OpenRouter.display_name();
    Ok(list_field(data, "data")?
        .iter()
        .filter_map(|m| {
            let (prompt_price, completion_price) = token_prices(m);
            let record = ModelRecord {
                context_length: context_length(m, &["context_length"]),
                prompt_price,
                completion_price,
                description: description(m),
                ..ModelRecord::new(name, model_id(m)?)
            };
            Some(OpenRouterEntry {
                record,
                hugging_face_id: str_field(m, "hugging_face_id"),
            })
        })
        .collect())
}

/// Together answers either `{ "data": [...] }` or a bare array.
pub fn parse_together(data: &Value) -> Result<Vec<ModelRecord>> {
    let items = match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) if obj.contains_key("data") => list_field(data, "data")?,
        other => {
            return Err(PriceError::Shape(format!(
                "expected a model array, got {}",
                kind_of(other)
            )))
        }
    };
    let name = ProviderKind::Together.display_name();
    Ok(items
        .iter()
        .filter_map(|m| {
            let (prompt_price, completion_price) = token_prices(m);
            Some(ModelRecord {
                context_length: context_length(m, &["max_model_len", "context_length"]),
                prompt_price,
                completion_price,
                description: description(m),
                ..ModelRecord::new(name, model_id(m)?)
            })
        })
        .collect())
}

/// Groq lists no prices; they come from the catalog table.
pub fn parse_groq(data: &Value, catalog: &Catalog) -> Result<Vec<ModelRecord>> {
    let name = ProviderKind::Groq.display_name();
    Ok(list_field(data, "data")?
        .iter()
        .filter_map(|m| {
            let id = str_field(m, "id")?;
            let price = catalog.groq_price(&id);
            Some(ModelRecord {
                context_length: context_length(m, &["context_length", "context_window"]),
                prompt_price: price.prompt,
                completion_price: price.completion,
                description: description(m),
                ..ModelRecord::new(name, id)
            })
        })
        .collect())
}

/// Replicate bills by compute time, so its records carry no token prices.
pub fn parse_replicate(data: &Value) -> Result<Vec<ModelRecord>> {
    let name = ProviderKind::Replicate.display_name();
    Ok(list_field(data, "results")?
        .iter()
        .filter_map(|m| {
            let owner = m
                .get("owner")
                .and_then(|o| if o.is_string() { Some(o) } else { o.get("username") })
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())?;
            let model = str_field(m, "name")?;
            Some(ModelRecord {
                description: description(m),
                ..ModelRecord::new(name, format!("{owner}/{model}"))
            })
        })
        .collect())
}
