//! Alternate variant: text chat completion with an inline image URL,
//! for deployments without a structured `image_url` content type.

use alt_core::{DescriberResult, MetadataDocument, ProductFacts, VisionHints};
use alt_error::{AltError, ErrorCode};
use alt_prompt::PromptLibrary;
use async_trait::async_trait;
use tracing::warn;

use crate::instruction::compose_user_instruction;
use crate::message::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::multimodal::CHAT_API_VERSION;
use crate::transport::{is_success, DescriberMethod, DescriberRequest, DescriberTransport};
use crate::Describer;

/// Token budget for the phi4 variant (§4.5 step 4 names `300 | 500`; the
/// alternate variant uses the larger budget).
const MAX_TOKENS: u32 = 500;

/// Phi4-style describer: the image reference is embedded as text inside the
/// user message rather than as a separate `image_url` content part, for
/// endpoints that only accept single-string message content.
pub struct Phi4Describer<T: DescriberTransport> {
    transport: T,
    prompts: PromptLibrary,
    endpoint: String,
    deployment: String,
}

impl<T: DescriberTransport> Phi4Describer<T> {
    /// Build a describer targeting `deployment` on `endpoint`.
    pub fn new(transport: T, prompts: PromptLibrary, endpoint: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            transport,
            prompts,
            endpoint: endpoint.into(),
            deployment: deployment.into(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            CHAT_API_VERSION
        )
    }
}

#[async_trait]
impl<T: DescriberTransport> Describer for Phi4Describer<T> {
    async fn describe(
        &self,
        blob_name: &str,
        image_ref: &str,
        metadata: &MetadataDocument,
        facts: &ProductFacts,
        hints: &VisionHints,
        token: &str,
    ) -> Result<DescriberResult, AltError> {
        let system_instruction = self.prompts.system_instruction(&metadata.source_or_default());
        let user_instruction = compose_user_instruction(blob_name, metadata, facts, hints);
        let user_text = format!("{user_instruction}\n\nImage: {image_ref}");

        let messages = vec![
            ChatMessage::system(system_instruction),
            ChatMessage::user_text(user_text),
        ];
        let body = ChatCompletionRequest::new(messages, MAX_TOKENS);
        let payload = serde_json::to_vec(&body).map_err(|e| {
            AltError::new(ErrorCode::Internal, "failed to serialize chat completion request")
                .with_source(e)
        })?;

        let response = self
            .transport
            .execute(DescriberRequest {
                method: DescriberMethod::Post,
                url: self.url(),
                headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
                body: Some(payload),
            })
            .await?;

        if !is_success(response.status) {
            warn!(blob_name, status = response.status, "phi4 describer call returned non-2xx");
            return Ok(DescriberResult::failed());
        }

        let parsed: ChatCompletionResponse = match serde_json::from_slice(&response.body) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(blob_name, %err, "phi4 describer response was not valid JSON");
                return Ok(DescriberResult::failed());
            }
        };

        let content = match parsed.choices.first() {
            Some(choice) => &choice.message.content,
            None => {
                warn!(blob_name, "phi4 describer response had no choices");
                return Ok(DescriberResult::failed());
            }
        };

        Ok(DescriberResult::new(alt_normalize::normalize(content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::DescriberResponse;

    struct FakeTransport {
        status: u16,
        body: String,
    }

    #[async_trait]
    impl DescriberTransport for FakeTransport {
        async fn execute(&self, request: DescriberRequest) -> Result<DescriberResponse, AltError> {
            let payload: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
            let content = &payload["messages"][1]["content"];
            assert!(content.is_string(), "phi4 user content must be a bare string, not a parts array");
            Ok(DescriberResponse { status: self.status, body: self.body.clone().into_bytes() })
        }
    }

    #[tokio::test]
    async fn embeds_image_reference_as_text_not_a_content_part() {
        let body = serde_json::json!({"choices": [{"message": {"content": "{\"alt_en\": \"a mug\"}"}}]}).to_string();
        let d = Phi4Describer::new(
            FakeTransport { status: 200, body },
            PromptLibrary::embedded(),
            "https://my-foundry.openai.azure.com",
            "phi-4-multimodal",
        );
        let result = d
            .describe(
                "img.png",
                "data:image/png;base64,abc",
                &MetadataDocument::default(),
                &ProductFacts::empty(),
                &VisionHints::default(),
                "tok",
            )
            .await
            .unwrap();
        assert_eq!(result.alt_en, "A mug.");
    }

    #[tokio::test]
    async fn non_2xx_yields_failure_result() {
        let d = Phi4Describer::new(
            FakeTransport { status: 500, body: String::new() },
            PromptLibrary::embedded(),
            "https://my-foundry.openai.azure.com",
            "phi-4-multimodal",
        );
        let result = d
            .describe(
                "img.png",
                "data:image/png;base64,abc",
                &MetadataDocument::default(),
                &ProductFacts::empty(),
                &VisionHints::default(),
                "tok",
            )
            .await
            .unwrap();
        assert!(result.is_failure());
    }
}
