// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pipeline orchestrator (§4.2).
//!
//! [`PipelineOrchestrator::run`] executes the eleven-step straight-line DAG
//! of §4.2 for one image: resolve metadata, distill facts, derive vision
//! hints, fetch the image as a data URL, describe, translate, and persist
//! the sidecar/tags/copy. Any step's failure aborts the run and propagates
//! to the caller (§4.2 "Failure policy") — the only swallowed failures are
//! the ones §4.2/§4.3/§7 call out explicitly: metadata absence, per-language
//! translation failure, and tag-set failure.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use alt_core::{AltTextResult, MetadataDocument, TagSet};
use alt_describe::multimodal::DESCRIBER_TOKEN_AUDIENCE;
use alt_describe::Describer;
use alt_distill::{derive_vision_hints, extract_product_facts};
use alt_error::{AltError, ErrorCode};
use alt_identity::IdentityTokenProvider;
use alt_storage::{ObjectStoreClient, StorageTransport};
use alt_translate::alias::normalize_requested_code;
use alt_translate::dedicated::TRANSLATOR_TOKEN_AUDIENCE;
use alt_translate::Translator;
use chrono::Utc;
use tracing::{info, warn};

/// Token audience for object-store operations (§6).
pub const STORAGE_TOKEN_AUDIENCE: &str = "https://storage.azure.com";

/// One invocation's input: the blob to process, plus any context the
/// handler already extracted from the webhook body (§4.2 input).
#[derive(Debug, Clone, Default)]
pub struct OrchestratorInput {
    /// The image blob name within the ingest container.
    pub blob_name: String,
    /// Pre-supplied metadata, bypassing the `<stem>.yml` fetch.
    pub metadata: Option<MetadataDocument>,
    /// Pre-supplied CMS description text, overriding the metadata document's
    /// `description` field as the distiller's input (§4.2 step 3).
    pub cms_text: Option<String>,
}

/// The result of one successful run, returned to the HTTP handler (§4.2
/// step 11).
#[derive(Debug, Clone)]
pub struct OrchestratorOutput {
    /// The persisted sidecar content.
    pub alt_json: AltTextResult,
    /// The tag set applied to the image blob.
    pub tags: TagSet,
    /// Whether the image was copied to the public container (`false` only
    /// when the blob name ends in `.json`, §4.2 step 10c).
    pub copied: bool,
}

/// Coordinates the object store, identity provider, distiller, describer,
/// and translator for one image (§2 component 8, §4.2).
pub struct PipelineOrchestrator<S: StorageTransport> {
    storage: ObjectStoreClient<S>,
    identity: Arc<IdentityTokenProvider>,
    describer: Arc<dyn Describer>,
    translator: Arc<dyn Translator>,
    ingest_container: String,
    public_container: String,
}

impl<S: StorageTransport> PipelineOrchestrator<S> {
    /// Build an orchestrator addressed at `ingest_container` /
    /// `public_container` in the storage account behind `storage`.
    pub fn new(
        storage: ObjectStoreClient<S>,
        identity: Arc<IdentityTokenProvider>,
        describer: Arc<dyn Describer>,
        translator: Arc<dyn Translator>,
        ingest_container: impl Into<String>,
        public_container: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            identity,
            describer,
            translator,
            ingest_container: ingest_container.into(),
            public_container: public_container.into(),
        }
    }

    async fn resolve_metadata(&self, input: &OrchestratorInput, storage_token: &str) -> MetadataDocument {
        if let Some(metadata) = &input.metadata {
            return metadata.clone();
        }
        match self
            .storage
            .read_yaml_metadata(&self.ingest_container, &input.blob_name, storage_token)
            .await
        {
            Ok(Some(doc)) => doc,
            Ok(None) => MetadataDocument::default(),
            Err(err) => {
                warn!(blob = %input.blob_name, %err, "metadata fetch failed; proceeding with defaults");
                MetadataDocument::default()
            }
        }
    }

    /// Run the full pipeline for one image (§4.2 steps 1-11).
    pub async fn run(&self, input: OrchestratorInput) -> Result<OrchestratorOutput, AltError> {
        let storage_token = self.identity.get_token(STORAGE_TOKEN_AUDIENCE).await?;

        let metadata = self.resolve_metadata(&input, &storage_token).await;

        let description = input
            .cms_text
            .clone()
            .or_else(|| metadata.description.clone())
            .unwrap_or_default();
        let facts = extract_product_facts(&description);
        let hints = derive_vision_hints(&input.blob_name, &[], &metadata);

        let image_ref = self
            .storage
            .data_url(&self.ingest_container, &input.blob_name, &storage_token)
            .await?
            .ok_or_else(|| {
                AltError::new(ErrorCode::StorageUnavailable, "image blob not found in ingest container")
                    .with_context("blob", &input.blob_name)
            })?;

        let describer_token = self.identity.get_token(DESCRIBER_TOKEN_AUDIENCE).await?;
        let description_result = self
            .describer
            .describe(&input.blob_name, &image_ref, &metadata, &facts, &hints, &describer_token)
            .await?;
        if description_result.is_failure() {
            return Err(
                AltError::new(ErrorCode::DescriberUnavailable, "describer returned no usable alt text")
                    .with_context("blob", &input.blob_name),
            );
        }

        let normalized_languages: Vec<String> = metadata
            .languages_or_default()
            .iter()
            .map(|lang| normalize_requested_code(lang))
            .collect();
        let non_english: Vec<String> = normalized_languages
            .iter()
            .filter(|lang| lang.as_str() != "en")
            .cloned()
            .collect();

        let translator_token = self.identity.get_token(TRANSLATOR_TOKEN_AUDIENCE).await?;
        let mut alt_text = self
            .translator
            .translate(&description_result.alt_en, &non_english, &metadata, &translator_token)
            .await?;
        alt_text.insert("en".to_string(), description_result.alt_en.clone());

        let stem = alt_core::stem_of(&input.blob_name);
        let asset = metadata.asset.clone().unwrap_or_else(|| stem.to_string());
        let alt_json = AltTextResult {
            asset,
            image: input.blob_name.clone(),
            source: metadata.source_or_default(),
            alt_text,
            generated_at: Utc::now(),
        };

        let sidecar_name = AltTextResult::sidecar_name(stem);
        let sidecar_bytes = serde_json::to_vec(&alt_json).map_err(|e| {
            AltError::new(ErrorCode::Internal, "failed to serialize alt-text sidecar").with_source(e)
        })?;
        self.storage
            .write(&self.ingest_container, &sidecar_name, sidecar_bytes, "application/json", &storage_token)
            .await?;

        let tags = TagSet::new(normalized_languages);
        self.storage
            .set_tags(&self.ingest_container, &input.blob_name, &tags.to_map(), &storage_token)
            .await;

        let copied = if input.blob_name.to_ascii_lowercase().ends_with(".json") {
            false
        } else {
            self.storage
                .copy(&self.ingest_container, &input.blob_name, &self.public_container, &input.blob_name, &storage_token)
                .await?;
            true
        };

        info!(blob = %input.blob_name, langs = %tags.langs, copied, "processed image");

        Ok(OrchestratorOutput { alt_json, tags, copied })
    }
}
