//! Filtering, sorting and cell formatting for the comparison table.
//!
//! Shared by the terminal table and the browser bindings so both order rows
//! the same way.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::ModelRecord;

/// Provider filter value meaning "no filter".
pub const ALL_PROVIDERS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderFilter {
    #[default]
    All,
    /// Exact, case-sensitive provider label.
    Named(String),
}

impl ProviderFilter {
    pub fn matches(&self, record: &ModelRecord) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => record.provider == *name,
        }
    }
}

impl From<&str> for ProviderFilter {
    fn from(s: &str) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_PROVIDERS) {
            Self::All
        } else {
            Self::Named(s.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Provider,
    #[default]
    Model,
    ContextLength,
    PromptPrice,
    CompletionPrice,
    Stars,
    HfLikes,
}

pub const SORT_KEYS: &[SortKey] = &[
    SortKey::Provider,
    SortKey::Model,
    SortKey::ContextLength,
    SortKey::PromptPrice,
    SortKey::CompletionPrice,
    SortKey::Stars,
    SortKey::HfLikes,
];

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Model => "model",
            Self::ContextLength => "context_length",
            Self::PromptPrice => "prompt_price",
            Self::CompletionPrice => "completion_price",
            Self::Stars => "stars",
            Self::HfLikes => "hf_likes",
        }
    }

    /// Column header text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Provider => "Provider",
            Self::Model => "Model",
            Self::ContextLength => "Context",
            Self::PromptPrice => "Prompt $/1M",
            Self::CompletionPrice => "Completion $/1M",
            Self::Stars => "Stars",
            Self::HfLikes => "HF Likes",
        }
    }

    /// Compare two records on this key. Text keys compare byte-wise; numeric
    /// keys treat a missing value as zero.
    pub fn compare(self, a: &ModelRecord, b: &ModelRecord) -> Ordering {
        let num = |r: &ModelRecord| -> f64 {
            let value = match self {
                Self::ContextLength => r.context_length.map(|n| n as f64),
                Self::PromptPrice => r.prompt_price,
                Self::CompletionPrice => r.completion_price,
                Self::Stars => r.stars.map(|n| n as f64),
                Self::HfLikes => r.hf_likes.map(|n| n as f64),
                Self::Provider | Self::Model => None,
            };
            value.unwrap_or(0.0)
        };
        match self {
            Self::Provider => a.provider.cmp(&b.provider),
            Self::Model => a.model.cmp(&b.model),
            _ => num(a).partial_cmp(&num(b)).unwrap_or(Ordering::Equal),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('-', "_");
        SORT_KEYS
            .iter()
            .copied()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| {
                let valid: Vec<_> = SORT_KEYS.iter().map(|k| k.as_str()).collect();
                format!("unknown sort key '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Model,
            ascending: true,
        }
    }
}

impl SortState {
    /// Header click: the active key flips direction, another key becomes
    /// active in ascending order.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self {
                key,
                ascending: !self.ascending,
            }
        } else {
            Self {
                key,
                ascending: true,
            }
        }
    }

    /// Header arrow for `key`: empty unless it is the active key.
    pub fn arrow(&self, key: SortKey) -> &'static str {
        match (self.key == key, self.ascending) {
            (false, _) => "",
            (true, true) => "↑",
            (true, false) => "↓",
        }
    }

    pub fn compare(&self, a: &ModelRecord, b: &ModelRecord) -> Ordering {
        if self.ascending {
            self.key.compare(a, b)
        } else {
            self.key.compare(b, a)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub provider: ProviderFilter,
    pub free_only: bool,
    pub sort: SortState,
}

impl ViewOptions {
    pub fn keeps(&self, record: &ModelRecord) -> bool {
        self.provider.matches(record) && (!self.free_only || record.is_free())
    }
}

/// Filtered, stably sorted view over `records`.
pub fn apply<'r>(records: &'r [ModelRecord], opts: &ViewOptions) -> Vec<&'r ModelRecord> {
    let mut rows: Vec<&ModelRecord> = records.iter().filter(|r| opts.keeps(r)).collect();
    rows.sort_by(|a, b| opts.sort.compare(a, b));
    rows
}

/// Filter choices: the "All" sentinel, then each provider in order of first
/// appearance.
pub fn provider_options(records: &[ModelRecord]) -> Vec<String> {
    let mut out = vec![ALL_PROVIDERS.to_string()];
    for r in records {
        if !out.iter().any(|p| *p == r.provider) {
            out.push(r.provider.clone());
        }
    }
    out
}

/// `$2.0000`, or an em dash when unknown.
pub fn fmt_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${p:.4}"),
        None => "—".to_string(),
    }
}

/// `128,000`, or an em dash when unknown.
pub fn fmt_count(n: Option<u64>) -> String {
    let Some(n) = n else {
        return "—".to_string();
    };
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn fmt_summary(rows: usize) -> String {
    if rows == 1 {
        "1 model".to_string()
    } else {
        format!("{rows} models")
    }
}
