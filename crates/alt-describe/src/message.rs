//! Chat-completion wire shapes (§4.5 step 3, §9 "Multimodal content payload").

use serde::{Deserialize, Serialize};

/// `{type: image_url, image_url: {url: <...>}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUrlRef {
    /// The image reference — a `data:` URL or an absolute HTTP(S) URL.
    pub url: String,
}

/// One part of a multimodal user message's ordered content array.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// An image reference part.
    ImageUrl {
        /// The wrapped URL.
        image_url: ImageUrlRef,
    },
    /// A plain text part.
    Text {
        /// The text content.
        text: String,
    },
}

impl ContentPart {
    /// Build an `image_url` part.
    pub fn image(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlRef { url: url.into() },
        }
    }

    /// Build a `text` part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A chat message's content: either a plain string (system messages) or an
/// ordered list of heterogeneous parts (multimodal user messages).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// An ordered sequence of content parts.
    Parts(Vec<ContentPart>),
}

/// One chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// `"system"` or `"user"`.
    pub role: String,
    /// The message content.
    pub content: MessageContent,
}

impl ChatMessage {
    /// Build a system message with plain text content.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    /// Build a user message with an ordered parts list.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }

    /// Build a user message with plain text content (no image part).
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Chat-completion request body (§4.5 step 4).
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// The message list.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Nucleus sampling parameter.
    pub top_p: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Presence penalty.
    pub presence_penalty: f64,
}

impl ChatCompletionRequest {
    /// Build a request with the fixed sampling parameters of §4.5 step 4.
    pub fn new(messages: Vec<ChatMessage>, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature: 0.3,
            max_tokens,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: String,
}
