//! Primary variant: the dedicated translation API (§4.9).

use std::collections::BTreeMap;

use alt_core::MetadataDocument;
use alt_error::AltError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alias::{map_to_api_code, normalize_requested_code};
use crate::transport::{is_success, TranslatorMethod, TranslatorRequest, TranslatorTransport};
use crate::Translator;

/// Token audience for the translator call (§4.9).
pub const TRANSLATOR_TOKEN_AUDIENCE: &str = "https://cognitiveservices.azure.com/.default";

#[derive(Debug, Serialize)]
struct TranslateEntry<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseEntry {
    translations: Vec<TranslationItem>,
}

#[derive(Debug, Deserialize)]
struct TranslationItem {
    text: String,
}

/// `true` if `endpoint` looks like a managed-identity custom-subdomain
/// endpoint (`https://<resource>.cognitiveservices.azure.com`) rather than
/// the global multi-tenant translator endpoint (§4.9).
fn is_custom_subdomain(endpoint: &str) -> bool {
    endpoint.contains(".cognitiveservices.azure.com")
}

/// Dedicated translation-API translator.
pub struct DedicatedTranslator<T: TranslatorTransport> {
    transport: T,
    endpoint: String,
    region: String,
}

impl<T: TranslatorTransport> DedicatedTranslator<T> {
    /// Build a translator targeting `endpoint`, sending `region` as the
    /// subscription-region header.
    pub fn new(transport: T, endpoint: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            region: region.into(),
        }
    }

    fn url(&self, mapped_code: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        if is_custom_subdomain(base) {
            format!("{base}/translator/text/v3.0/translate?from=en&to={mapped_code}")
        } else {
            format!("{base}/translate?api-version=3.0&from=en&to={mapped_code}")
        }
    }

    async fn translate_one(&self, text: &str, mapped_code: &str, token: &str) -> Option<String> {
        let payload = serde_json::to_vec(&[TranslateEntry { text }]).ok()?;
        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Bearer {token}")),
            ("Ocp-Apim-Subscription-Region".to_string(), self.region.clone()),
        ];

        let response = self
            .transport
            .execute(TranslatorRequest {
                method: TranslatorMethod::Post,
                url: self.url(mapped_code),
                headers,
                body: Some(payload),
            })
            .await
            .map_err(|err| warn!(%err, lang = mapped_code, "translator request failed"))
            .ok()?;

        if !is_success(response.status) {
            warn!(lang = mapped_code, status = response.status, "translator call returned non-2xx");
            return None;
        }

        let parsed: Vec<TranslateResponseEntry> = serde_json::from_slice(&response.body)
            .map_err(|err| warn!(%err, lang = mapped_code, "translator response was not valid JSON"))
            .ok()?;
        parsed
            .into_iter()
            .next()
            .and_then(|entry| entry.translations.into_iter().next())
            .map(|t| t.text)
    }
}

#[async_trait]
impl<T: TranslatorTransport> Translator for DedicatedTranslator<T> {
    async fn translate(
        &self,
        text: &str,
        languages: &[String],
        _metadata: &MetadataDocument,
        token: &str,
    ) -> Result<BTreeMap<String, String>, AltError> {
        let mut out = BTreeMap::new();
        for requested in languages {
            let requested = normalize_requested_code(requested);
            if requested == "en" {
                out.insert(requested, text.to_string());
                continue;
            }
            let mapped = map_to_api_code(&requested);
            match self.translate_one(text, mapped, token).await {
                Some(translated) => {
                    out.insert(requested, translated);
                }
                None => {
                    warn!(lang = %requested, "translation failed; falling back to English source");
                    out.insert(requested, text.to_string());
                }
            }
        }
        Ok(out)
    }
}
