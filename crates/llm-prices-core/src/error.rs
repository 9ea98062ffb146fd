#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    #[error("bad config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(feature = "network")]
impl From<reqwest::Error> for PriceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

impl PriceError {
    /// Upstream answered with a non-success status, as opposed to a transport
    /// or decoding failure.
    pub fn is_upstream_status(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, PriceError>;
