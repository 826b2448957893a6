//! Primary variant: multimodal chat completion (§4.5 steps 1-6).

use alt_core::{DescriberResult, MetadataDocument, ProductFacts, VisionHints};
use alt_error::{AltError, ErrorCode};
use alt_prompt::PromptLibrary;
use async_trait::async_trait;
use tracing::warn;

use crate::instruction::compose_user_instruction;
use crate::message::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart};
use crate::transport::{is_success, DescriberMethod, DescriberRequest, DescriberTransport};
use crate::Describer;

/// Chat-completion protocol version (§4.5 step 4).
pub const CHAT_API_VERSION: &str = "2024-05-01-preview";

/// Token audience for the describer call (§4.5 step 4).
pub const DESCRIBER_TOKEN_AUDIENCE: &str = "https://cognitiveservices.azure.com/.default";

/// Multimodal chat-completion describer, shared by the `slm` and `llm`
/// strategies — they differ only in deployment name and `max_tokens`.
pub struct MultimodalDescriber<T: DescriberTransport> {
    transport: T,
    prompts: PromptLibrary,
    endpoint: String,
    deployment: String,
    max_tokens: u32,
}

impl<T: DescriberTransport> MultimodalDescriber<T> {
    /// The `slm` strategy uses a 300-token budget (§4.5 step 4).
    pub const SLM_MAX_TOKENS: u32 = 300;
    /// The `llm` strategy uses a 500-token budget (§4.5 step 4).
    pub const LLM_MAX_TOKENS: u32 = 500;

    /// Build a describer targeting `deployment` on `endpoint`.
    pub fn new(
        transport: T,
        prompts: PromptLibrary,
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            transport,
            prompts,
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            max_tokens,
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
impl<T: DescriberTransport> Describer for MultimodalDescriber<T> {
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

        let messages = vec![
            ChatMessage::system(system_instruction),
            ChatMessage::user(vec![
                ContentPart::image(image_ref),
                ContentPart::text(user_instruction),
            ]),
        ];
        let body = ChatCompletionRequest::new(messages, self.max_tokens);
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
            warn!(blob_name, status = response.status, "describer call returned non-2xx");
            return Ok(DescriberResult::failed());
        }

        let parsed: ChatCompletionResponse = match serde_json::from_slice(&response.body) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(blob_name, %err, "describer response was not valid JSON");
                return Ok(DescriberResult::failed());
            }
        };

        let content = match parsed.choices.first() {
            Some(choice) => &choice.message.content,
            None => {
                warn!(blob_name, "describer response had no choices");
                return Ok(DescriberResult::failed());
            }
        };

        let alt_en = alt_normalize::normalize(content);
        Ok(DescriberResult::new(alt_en))
    }
}
