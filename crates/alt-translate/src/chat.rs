//! Alternate variant: chat-completion-driven translation (§4.9 "Alternate
//! variant"), one call per target language.

use std::collections::BTreeMap;

use alt_core::MetadataDocument;
use alt_error::{AltError, ErrorCode};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::alias::normalize_requested_code;
use crate::transport::{is_success, TranslatorMethod, TranslatorRequest, TranslatorTransport};
use crate::Translator;

/// Maximum length the translated text is constrained to (§4.9 "Alternate
/// variant").
const MAX_TRANSLATION_LEN: usize = 125;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

fn system_prompt(target_language: &str, brand: Option<&str>, model: Option<&str>) -> String {
    let mut constraints = vec![format!(
        "Translate the given English product alt text into {target_language}."
    )];
    if let (Some(brand), Some(model)) = (brand, model) {
        constraints.push(format!(
            "Preserve the brand name \"{brand}\" and model name \"{model}\" exactly as given, untranslated."
        ));
    }
    constraints.push(format!(
        "Respond with the translation only, {MAX_TRANSLATION_LEN} characters or fewer, no quotes, no commentary."
    ));
    constraints.join(" ")
}

/// Strip a single layer of surrounding straight or curly quotes.
fn strip_surrounding_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}')] {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    trimmed
}

/// Chat-completion-driven translator: issues one chat call per target
/// language rather than a single batched call (§4.9 "Alternate variant").
pub struct ChatCompletionTranslator<T: TranslatorTransport> {
    transport: T,
    endpoint: String,
    deployment: String,
}

impl<T: TranslatorTransport> ChatCompletionTranslator<T> {
    /// Build a translator targeting `deployment` on `endpoint`.
    pub fn new(transport: T, endpoint: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            deployment: deployment.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version=2024-05-01-preview",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }

    async fn translate_one(
        &self,
        text: &str,
        target_language: &str,
        metadata: &MetadataDocument,
        token: &str,
    ) -> Result<Option<String>, AltError> {
        let system = system_prompt(target_language, metadata.brand.as_deref(), metadata.model.as_deref());
        let body = serde_json::json!({
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": text},
            ],
            "temperature": 0.3,
            "max_tokens": 200,
            "top_p": 0.95,
            "frequency_penalty": 0,
            "presence_penalty": 0,
        });
        let payload = serde_json::to_vec(&body).map_err(|e| {
            AltError::new(ErrorCode::Internal, "failed to serialize translation chat request")
                .with_source(e)
        })?;

        let response = self
            .transport
            .execute(TranslatorRequest {
                method: TranslatorMethod::Post,
                url: self.url(),
                headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
                body: Some(payload),
            })
            .await?;

        if !is_success(response.status) {
            warn!(lang = target_language, status = response.status, "chat translation call returned non-2xx");
            return Ok(None);
        }

        let parsed: ChatCompletionResponse = match serde_json::from_slice(&response.body) {
            Ok(p) => p,
            Err(err) => {
                warn!(lang = target_language, %err, "chat translation response was not valid JSON");
                return Ok(None);
            }
        };

        let content = match parsed.choices.first() {
            Some(choice) => &choice.message.content,
            None => return Ok(None),
        };

        Ok(Some(strip_surrounding_quotes(content).to_string()))
    }
}

#[async_trait]
impl<T: TranslatorTransport> Translator for ChatCompletionTranslator<T> {
    async fn translate(
        &self,
        text: &str,
        languages: &[String],
        metadata: &MetadataDocument,
        token: &str,
    ) -> Result<BTreeMap<String, String>, AltError> {
        let mut out = BTreeMap::new();
        for requested in languages {
            let requested = normalize_requested_code(requested);
            if requested == "en" {
                out.insert(requested, text.to_string());
                continue;
            }
            match self.translate_one(text, &requested, metadata, token).await? {
                Some(translated) => {
                    out.insert(requested, translated);
                }
                None => {
                    warn!(lang = %requested, "chat translation failed; falling back to English source");
                    out.insert(requested, text.to_string());
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TranslatorResponse;

    struct FakeTransport {
        status: u16,
        content: String,
    }

    #[async_trait]
    impl TranslatorTransport for FakeTransport {
        async fn execute(&self, _request: TranslatorRequest) -> Result<TranslatorResponse, AltError> {
            let body = serde_json::json!({"choices": [{"message": {"content": self.content}}]});
            Ok(TranslatorResponse { status: self.status, body: body.to_string().into_bytes() })
        }
    }

    #[tokio::test]
    async fn strips_surrounding_quotes_from_the_chat_response() {
        let t = ChatCompletionTranslator::new(
            FakeTransport { status: 200, content: "\"Une imprimante.\"".to_string() },
            "https://my-foundry.openai.azure.com",
            "gpt-4o-deployment",
        );
        let langs = vec!["fr".to_string()];
        let out = t
            .translate("A printer.", &langs, &MetadataDocument::default(), "tok")
            .await
            .unwrap();
        assert_eq!(out["fr"], "Une imprimante.");
    }

    #[tokio::test]
    async fn english_is_copied_without_a_chat_call() {
        let t = ChatCompletionTranslator::new(
            FakeTransport { status: 200, content: "unused".to_string() },
            "https://my-foundry.openai.azure.com",
            "gpt-4o-deployment",
        );
        let langs = vec!["en".to_string()];
        let out = t
            .translate("A printer.", &langs, &MetadataDocument::default(), "tok")
            .await
            .unwrap();
        assert_eq!(out["en"], "A printer.");
    }

    #[tokio::test]
    async fn non_2xx_falls_back_to_english_source() {
        let t = ChatCompletionTranslator::new(
            FakeTransport { status: 500, content: String::new() },
            "https://my-foundry.openai.azure.com",
            "gpt-4o-deployment",
        );
        let langs = vec!["de".to_string()];
        let out = t
            .translate("A printer.", &langs, &MetadataDocument::default(), "tok")
            .await
            .unwrap();
        assert_eq!(out["de"], "A printer.");
    }

    #[test]
    fn system_prompt_preserves_brand_and_model_when_present() {
        let prompt = system_prompt("French", Some("Acme"), Some("X1"));
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("X1"));
    }

    #[test]
    fn strip_quotes_handles_unquoted_text() {
        assert_eq!(strip_surrounding_quotes("no quotes here"), "no quotes here");
    }
}
