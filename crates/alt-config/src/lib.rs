// SPDX-License-Identifier: MIT OR Apache-2.0
//! Environment-driven runtime configuration for the alt-text pipeline
//! (§6, §10.3).
//!
//! This crate loads [`PipelineConfig`] from the environment variables listed
//! in §6, resolves the `strategy:<name>` selector strings into typed enum
//! tags at startup (no runtime reflection), and produces advisory
//! [`ConfigWarning`]s for legacy environment variable aliases and missing
//! optional endpoints.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::env::VarError;
use std::fmt;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading configuration from the environment.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingRequiredVar {
        /// The variable name.
        name: String,
    },
    /// A `strategy:<name>` selector had an unrecognized `<name>`.
    #[error("unrecognized strategy selector '{raw}' for {var}")]
    InvalidStrategy {
        /// The environment variable the selector came from.
        var: String,
        /// The raw value that failed to parse.
        raw: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level configuration issues that do not prevent startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A legacy environment variable alias was used instead of the current name.
    LegacyEnvVarAlias {
        /// The canonical variable name.
        canonical: String,
        /// The legacy alias that was actually set.
        legacy: String,
    },
    /// An endpoint the selected strategy needs was not configured.
    MissingOptionalEndpoint {
        /// The strategy that needs the endpoint.
        strategy: String,
        /// The environment variable that would supply it.
        var: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::LegacyEnvVarAlias { canonical, legacy } => {
                write!(f, "using legacy env var '{legacy}' — prefer '{canonical}'")
            }
            ConfigWarning::MissingOptionalEndpoint { strategy, var } => {
                write!(f, "strategy '{strategy}' selected but '{var}' is not set")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy selectors
// ---------------------------------------------------------------------------

/// Describer strategy selected via `DESCRIBER=strategy:<name>` (§4.5, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriberStrategy {
    /// Multimodal chat completion against the small-language-model deployment.
    Slm,
    /// Multimodal chat completion against the large-language-model deployment (primary).
    Llm,
    /// Caption + tags vision API (fallback variant).
    Vision,
    /// Text chat completion with an image URL content part (alternate variant).
    Phi4,
}

impl DescriberStrategy {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "slm" => Some(Self::Slm),
            "llm" => Some(Self::Llm),
            "vision" => Some(Self::Vision),
            "phi4" => Some(Self::Phi4),
            _ => None,
        }
    }
}

/// Translator strategy selected via `TRANSLATOR=strategy:<name>` (§4.9, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorStrategy {
    /// The dedicated translation API (primary variant).
    Translator,
    /// Chat-completion-driven translation (alternate variant).
    ChatCompletion,
}

impl TranslatorStrategy {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "translator" => Some(Self::Translator),
            "llm" | "phi4" => Some(Self::ChatCompletion),
            _ => None,
        }
    }
}

/// Strip a `strategy:` prefix, if present, before matching the name.
fn strategy_name(raw: &str) -> &str {
    raw.strip_prefix("strategy:").unwrap_or(raw)
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Fully-resolved runtime configuration for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Selected describer strategy.
    pub describer_strategy: DescriberStrategy,
    /// Selected translator strategy.
    pub translator_strategy: TranslatorStrategy,
    /// Default target languages when a metadata document specifies none.
    pub default_languages: Vec<String>,
    /// Storage account name (`AZURE_STORAGE_ACCOUNT`).
    pub storage_account: String,
    /// User-assigned managed identity client id, if any (`AZURE_CLIENT_ID`).
    pub client_id: Option<String>,
    /// Describer endpoint (`AZURE_FOUNDRY_ENDPOINT`).
    pub foundry_endpoint: Option<String>,
    /// SLM deployment name (`AZURE_FOUNDRY_DEPLOYMENT_SLM`).
    pub deployment_slm: Option<String>,
    /// LLM deployment name (`AZURE_FOUNDRY_DEPLOYMENT_LLM`).
    pub deployment_llm: Option<String>,
    /// Vision-variant endpoint (`AZURE_VISION_ENDPOINT`).
    pub vision_endpoint: Option<String>,
    /// Translator endpoint (`AZURE_TRANSLATOR_ENDPOINT`).
    pub translator_endpoint: Option<String>,
    /// Translator region header value (`AZURE_TRANSLATOR_REGION`).
    pub translator_region: Option<String>,
    /// Log level (`LOG_LEVEL`), defaults to `"info"`.
    pub log_level: String,
    /// Managed identity endpoint, if discovered (`IDENTITY_ENDPOINT` / `MSI_ENDPOINT`).
    pub identity_endpoint: Option<String>,
    /// Managed identity secret header value (`IDENTITY_HEADER` / `MSI_SECRET`).
    pub identity_header: Option<String>,
}

impl PipelineConfig {
    /// Load configuration from the process environment (§6), returning any
    /// advisory warnings alongside the resolved config.
    pub fn from_env() -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        Self::from_lookup(|name| std::env::var(name))
    }

    /// Load configuration from an arbitrary lookup function — used by tests
    /// to avoid mutating the real process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Result<String, VarError> + Copy,
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut warnings = Vec::new();
        let get = |name: &str| lookup(name).ok().filter(|v| !v.is_empty());

        let describer_raw = get("DESCRIBER").unwrap_or_else(|| "strategy:llm".to_string());
        let describer_strategy = DescriberStrategy::parse(strategy_name(&describer_raw))
            .ok_or_else(|| ConfigError::InvalidStrategy {
                var: "DESCRIBER".to_string(),
                raw: describer_raw.clone(),
            })?;

        let translator_raw = get("TRANSLATOR").unwrap_or_else(|| "strategy:translator".to_string());
        let translator_strategy = TranslatorStrategy::parse(strategy_name(&translator_raw))
            .ok_or_else(|| ConfigError::InvalidStrategy {
                var: "TRANSLATOR".to_string(),
                raw: translator_raw.clone(),
            })?;

        let default_languages = get("LOCALES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_ascii_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec!["en".to_string()]);

        let storage_account = get("AZURE_STORAGE_ACCOUNT").ok_or_else(|| {
            ConfigError::MissingRequiredVar {
                name: "AZURE_STORAGE_ACCOUNT".to_string(),
            }
        })?;

        let (identity_endpoint, w1) =
            read_with_legacy_alias_using(get, "IDENTITY_ENDPOINT", "MSI_ENDPOINT");
        let (identity_header, w2) =
            read_with_legacy_alias_using(get, "IDENTITY_HEADER", "MSI_SECRET");
        warnings.extend(w1);
        warnings.extend(w2);

        let vision_endpoint = get("AZURE_VISION_ENDPOINT");
        if describer_strategy == DescriberStrategy::Vision && vision_endpoint.is_none() {
            warnings.push(ConfigWarning::MissingOptionalEndpoint {
                strategy: "vision".to_string(),
                var: "AZURE_VISION_ENDPOINT".to_string(),
            });
        }

        let translator_endpoint = get("AZURE_TRANSLATOR_ENDPOINT");
        if translator_strategy == TranslatorStrategy::Translator && translator_endpoint.is_none() {
            warnings.push(ConfigWarning::MissingOptionalEndpoint {
                strategy: "translator".to_string(),
                var: "AZURE_TRANSLATOR_ENDPOINT".to_string(),
            });
        }

        Ok((
            Self {
                describer_strategy,
                translator_strategy,
                default_languages,
                storage_account,
                client_id: get("AZURE_CLIENT_ID"),
                foundry_endpoint: get("AZURE_FOUNDRY_ENDPOINT"),
                deployment_slm: get("AZURE_FOUNDRY_DEPLOYMENT_SLM"),
                deployment_llm: get("AZURE_FOUNDRY_DEPLOYMENT_LLM"),
                vision_endpoint,
                translator_endpoint,
                translator_region: get("AZURE_TRANSLATOR_REGION"),
                log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                identity_endpoint,
                identity_header,
            },
            warnings,
        ))
    }
}

fn read_with_legacy_alias_using(
    get: impl Fn(&str) -> Option<String>,
    canonical: &str,
    legacy: &str,
) -> (Option<String>, Option<ConfigWarning>) {
    if let Some(v) = get(canonical) {
        return (Some(v), None);
    }
    if let Some(v) = get(legacy) {
        return (
            Some(v),
            Some(ConfigWarning::LegacyEnvVarAlias {
                canonical: canonical.to_string(),
                legacy: legacy.to_string(),
            }),
        );
    }
    (None, None)
}
