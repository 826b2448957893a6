// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inbound delivery-service event shapes (§3 `ImageEvent`, §6).

use serde::{Deserialize, Serialize};

/// The delivery service's subscription-validation event type literal.
///
/// Retained verbatim as a constant per the vendor wire contract (§9).
pub const SUBSCRIPTION_VALIDATION_EVENT: &str =
    "Microsoft.EventGrid.SubscriptionValidationEvent";

/// The delivery service's blob-created event type literal.
pub const BLOB_CREATED_EVENT: &str = "Microsoft.Storage.BlobCreated";

/// The kind of delivery-service event carried by one array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Subscription validation handshake.
    Validation,
    /// A blob was created in the ingest container.
    BlobCreated,
    /// Any other event type the core does not act on.
    Other,
}

/// One notification from the delivery service.
///
/// A single webhook invocation carries an ordered sequence of `Vec<ImageEvent>`
/// with at least one element (§3 invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEvent {
    /// What kind of event this is.
    pub kind: EventKind,
    /// Absolute blob URL, present for [`EventKind::BlobCreated`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,
    /// Validation code to echo back, present for [`EventKind::Validation`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_code: Option<String>,
}

impl ImageEvent {
    /// Classify a raw `eventType` string into an [`EventKind`].
    pub fn kind_from_event_type(event_type: &str) -> EventKind {
        if event_type == SUBSCRIPTION_VALIDATION_EVENT {
            EventKind::Validation
        } else if event_type == BLOB_CREATED_EVENT {
            EventKind::BlobCreated
        } else {
            EventKind::Other
        }
    }

    /// Split an absolute blob URL's path into `(container, blob_name)`.
    ///
    /// The path is `/​<container>/<rest...>`; the first segment is the
    /// container, everything after is the blob name (which may itself
    /// contain `/`).
    pub fn split_blob_path(url: &str) -> Option<(String, String)> {
        let path = url.splitn(4, '/').nth(3)?;
        let (container, blob) = path.split_once('/')?;
        if container.is_empty() || blob.is_empty() {
            return None;
        }
        Some((container.to_string(), blob.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_validation_event() {
        assert_eq!(
            ImageEvent::kind_from_event_type(SUBSCRIPTION_VALIDATION_EVENT),
            EventKind::Validation
        );
    }

    #[test]
    fn classifies_blob_created_event() {
        assert_eq!(
            ImageEvent::kind_from_event_type(BLOB_CREATED_EVENT),
            EventKind::BlobCreated
        );
    }

    #[test]
    fn classifies_unknown_event_as_other() {
        assert_eq!(
            ImageEvent::kind_from_event_type("Microsoft.Storage.BlobDeleted"),
            EventKind::Other
        );
    }

    #[test]
    fn splits_blob_path_into_container_and_name() {
        let url = "https://acct.blob.core.windows.net/ingest/img_0.png";
        let (container, blob) = ImageEvent::split_blob_path(url).unwrap();
        assert_eq!(container, "ingest");
        assert_eq!(blob, "img_0.png");
    }

    #[test]
    fn splits_blob_path_with_nested_segments() {
        let url = "https://acct.blob.core.windows.net/ingest/sub/dir/img_0.png";
        let (container, blob) = ImageEvent::split_blob_path(url).unwrap();
        assert_eq!(container, "ingest");
        assert_eq!(blob, "sub/dir/img_0.png");
    }

    #[test]
    fn rejects_url_without_blob_name() {
        let url = "https://acct.blob.core.windows.net/ingest";
        assert!(ImageEvent::split_blob_path(url).is_none());
    }
}
