//! Alternate variant: caption+tags vision API, used when multimodal
//! chat-completion endpoints are unavailable (§4.5 "Alternate variant").

use alt_core::{DescriberResult, MetadataDocument, ProductFacts, VisionHints};
use alt_error::AltError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::transport::{is_success, DescriberMethod, DescriberRequest, DescriberTransport};
use crate::Describer;

/// Maximum length of the composed alt text before ellipsis truncation
/// (§4.5 "Alternate variant").
const MAX_ALT_LEN: usize = 125;

#[derive(Debug, Serialize)]
struct UrlBody<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    description: CaptionDescription,
}

#[derive(Debug, Deserialize)]
struct CaptionDescription {
    captions: Vec<Caption>,
}

#[derive(Debug, Deserialize)]
struct Caption {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Caption+tags describer, addressed at a vision API deployment. Issues two
/// sequential POSTs with a `{"url": <imageRef>}` body (the URL-body
/// alternative named alongside the GET form in §4.5) rather than two GETs,
/// since the image reference here is a `data:` URL, not a fetchable link.
pub struct CaptionTagsDescriber<T: DescriberTransport> {
    transport: T,
    endpoint: String,
}

impl<T: DescriberTransport> CaptionTagsDescriber<T> {
    /// Build a describer targeting the vision API at `endpoint`.
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    fn caption_url(&self) -> String {
        format!(
            "{}/vision/v3.2/describe?api-version=3.2&visualFeatures=Description",
            self.endpoint.trim_end_matches('/')
        )
    }

    fn tag_url(&self) -> String {
        format!("{}/vision/v3.2/tag?api-version=3.2", self.endpoint.trim_end_matches('/'))
    }

    async fn post(&self, url: String, image_ref: &str, token: &str) -> Result<Option<Vec<u8>>, AltError> {
        let body = serde_json::to_vec(&UrlBody { url: image_ref })
            .expect("UrlBody serialization cannot fail");

        let response = self
            .transport
            .execute(DescriberRequest {
                method: DescriberMethod::Post,
                url,
                headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
                body: Some(body),
            })
            .await?;

        if !is_success(response.status) {
            return Ok(None);
        }
        Ok(Some(response.body))
    }
}

#[async_trait]
impl<T: DescriberTransport> Describer for CaptionTagsDescriber<T> {
    async fn describe(
        &self,
        blob_name: &str,
        image_ref: &str,
        metadata: &MetadataDocument,
        _facts: &ProductFacts,
        _hints: &VisionHints,
        token: &str,
    ) -> Result<DescriberResult, AltError> {
        let caption_body = match self.post(self.caption_url(), image_ref, token).await? {
            Some(body) => body,
            None => {
                warn!(blob_name, "caption call returned non-2xx");
                return Ok(DescriberResult::failed());
            }
        };

        let caption: CaptionResponse = match serde_json::from_slice(&caption_body) {
            Ok(c) => c,
            Err(err) => {
                warn!(blob_name, %err, "caption response was not valid JSON");
                return Ok(DescriberResult::failed());
            }
        };
        let caption_text = match caption.description.captions.first() {
            Some(c) => c.text.clone(),
            None => {
                warn!(blob_name, "caption response had no captions");
                return Ok(DescriberResult::failed());
            }
        };

        if let Some(tag_body) = self.post(self.tag_url(), image_ref, token).await? {
            if let Ok(tags) = serde_json::from_slice::<TagResponse>(&tag_body) {
                debug!(
                    blob_name,
                    tags = ?tags.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                    "vision tag call completed"
                );
            }
        }

        let mut parts = Vec::new();
        if let Some(brand) = &metadata.brand {
            parts.push(brand.as_str());
        }
        if let Some(model) = &metadata.model {
            parts.push(model.as_str());
        }
        parts.push(caption_text.as_str());

        let alt = truncate_with_ellipsis(&parts.join(" "), MAX_ALT_LEN);
        Ok(DescriberResult::new(alt))
    }
}

fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len).collect();
    format!("{truncated}...")
}
