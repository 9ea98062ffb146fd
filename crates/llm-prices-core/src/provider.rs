use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    OpenRouter,
    Together,
    Groq,
    Replicate,
    HuggingFace,
}

/// How a provider expects its credential in the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Token,
}

impl AuthScheme {
    pub fn header_value(self, credential: &str) -> String {
        match self {
            Self::Bearer => format!("Bearer {credential}"),
            Self::Token => format!("Token {credential}"),
        }
    }
}

/// Static provider registry entry.
#[derive(Debug, Clone)]
pub struct Provider {
    pub kind: ProviderKind,
    /// Label written into `ModelRecord::provider`.
    pub display_name: &'static str,
    /// Kebab-case id, as accepted on the command line.
    pub id: &'static str,
    /// Environment variable holding the credential that enables it.
    pub credential_env: &'static str,
    pub auth: AuthScheme,
}

const OPENROUTER: Provider  = Provider { kind: ProviderKind::OpenRouter,  display_name: "OpenRouter",   id: "open-router",  credential_env: "OPENROUTER_API_KEY",  auth: AuthScheme::Bearer };
const TOGETHER: Provider    = Provider { kind: ProviderKind::Together,    display_name: "Together AI",  id: "together",     credential_env: "TOGETHER_API_KEY",    auth: AuthScheme::Bearer };
const GROQ: Provider        = Provider { kind: ProviderKind::Groq,        display_name: "Groq",         id: "groq",         credential_env: "GROQ_API_KEY",        auth: AuthScheme::Bearer };
const REPLICATE: Provider   = Provider { kind: ProviderKind::Replicate,   display_name: "Replicate",    id: "replicate",    credential_env: "REPLICATE_API_TOKEN", auth: AuthScheme::Token };
const HUGGING_FACE: Provider = Provider { kind: ProviderKind::HuggingFace, display_name: "Hugging Face", id: "hugging-face", credential_env: "HF_TOKEN",            auth: AuthScheme::Bearer };

/// Aggregation order.
pub const PROVIDERS: &[Provider] = &[OPENROUTER, TOGETHER, GROQ, REPLICATE, HUGGING_FACE];

impl ProviderKind {
    pub fn info(self) -> &'static Provider {
        match self {
            Self::OpenRouter => &OPENROUTER,
            Self::Together => &TOGETHER,
            Self::Groq => &GROQ,
            Self::Replicate => &REPLICATE,
            Self::HuggingFace => &HUGGING_FACE,
        }
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    /// Look up by display name or kebab-case id, ignoring case.
    pub fn find(name: &str) -> Option<Self> {
        let needle = name.trim();
        PROVIDERS
            .iter()
            .find(|p| p.display_name.eq_ignore_ascii_case(needle) || p.id.eq_ignore_ascii_case(needle))
            .map(|p| p.kind)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
