use wasm_bindgen::prelude::*;

use llm_prices_core::record::ModelRecord;
use llm_prices_core::view::{self, ProviderFilter, SortKey, SortState, ViewOptions};

fn records(models: JsValue) -> Option<Vec<ModelRecord>> {
    serde_wasm_bindgen::from_value(models).ok()
}

fn sort_state(key: &str, ascending: bool) -> Option<SortState> {
    Some(SortState {
        key: key.parse::<SortKey>().ok()?,
        ascending,
    })
}

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

/// Filter and sort the `models` array from `/api/models`.
/// `provider` is a provider label or "All". Returns the rows or null.
#[wasm_bindgen]
pub fn table_rows(
    models: JsValue,
    provider: &str,
    free_only: bool,
    sort_key: &str,
    ascending: bool,
) -> JsValue {
    let Some(models) = records(models) else {
        return JsValue::NULL;
    };
    let Some(sort) = sort_state(sort_key, ascending) else {
        return JsValue::NULL;
    };
    let opts = ViewOptions {
        provider: ProviderFilter::from(provider),
        free_only,
        sort,
    };
    let rows = view::apply(&models, &opts);
    serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL)
}

/// Options for the provider dropdown: "All" then each provider seen.
#[wasm_bindgen]
pub fn provider_options(models: JsValue) -> JsValue {
    match records(models) {
        Some(models) => {
            serde_wasm_bindgen::to_value(&view::provider_options(&models)).unwrap_or(JsValue::NULL)
        }
        None => JsValue::NULL,
    }
}

/// Header click. Returns the new `{ key, ascending }` or null for an unknown key.
#[wasm_bindgen]
pub fn toggle_sort(current_key: &str, ascending: bool, clicked: &str) -> JsValue {
    let (Some(state), Ok(clicked)) = (sort_state(current_key, ascending), clicked.parse::<SortKey>()) else {
        return JsValue::NULL;
    };
    serde_wasm_bindgen::to_value(&state.toggle(clicked)).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Cell formatting
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct RowCells {
    provider: String,
    model: String,
    free: bool,
    context: String,
    prompt: String,
    completion: String,
    stars: String,
    hf_likes: String,
    description: String,
}

impl From<&ModelRecord> for RowCells {
    fn from(r: &ModelRecord) -> Self {
        Self {
            provider: r.provider.clone(),
            model: r.model.clone(),
            free: r.is_free(),
            context: view::fmt_count(r.context_length),
            prompt: view::fmt_price(r.prompt_price),
            completion: view::fmt_price(r.completion_price),
            stars: view::fmt_count(r.stars),
            hf_likes: view::fmt_count(r.hf_likes),
            description: if r.description.is_empty() {
                "\u{2014}".to_string()
            } else {
                r.description.clone()
            },
        }
    }
}

/// Display strings for each record, in input order.
#[wasm_bindgen]
pub fn format_rows(models: JsValue) -> JsValue {
    let Some(models) = records(models) else {
        return JsValue::NULL;
    };
    let cells: Vec<RowCells> = models.iter().map(RowCells::from).collect();
    serde_wasm_bindgen::to_value(&cells).unwrap_or(JsValue::NULL)
}

/// Header text for a sort key, with an arrow when it is the active key.
#[wasm_bindgen]
pub fn header_label(key: &str, active_key: &str, ascending: bool) -> String {
    let (Ok(key), Some(state)) = (key.parse::<SortKey>(), sort_state(active_key, ascending)) else {
        return key.to_string();
    };
    let arrow = state.arrow(key);
    if arrow.is_empty() {
        key.label().to_string()
    } else {
        format!("{} {arrow}", key.label())
    }
}

#[wasm_bindgen]
pub fn summary(rows: usize) -> String {
    view::fmt_summary(rows)
}
