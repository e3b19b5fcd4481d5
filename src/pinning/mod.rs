// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Content Pinning
//!
//! Everything the relay needs to turn an uploaded file into a permanent
//! `ipfs://` locator:
//!
//! - [`PinningService`] - the seam over the hosted pinning provider
//! - [`PinataClient`] - the production implementation
//! - [`pin_asset`] - the two-step workflow (file, then metadata document)
//!
//! The workflow is strictly sequential and never retries. If the metadata
//! pin fails after the file was pinned, the file pin is left in place;
//! content addressing makes a full retry by the caller safe.

use async_trait::async_trait;
use axum::body::Bytes;
use serde_json::Value;

pub mod locator;
pub mod metadata;
pub mod pinata;
pub mod relay;

pub use locator::ContentLocator;
pub use metadata::{AssetFields, NftMetadata, DEFAULT_DESCRIPTION, DEFAULT_NAME};
pub use pinata::{PinataAuth, PinataClient};
pub use relay::{pin_asset, PinAssetRequest, PinnedAsset};

/// A file received from a client, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original filename as reported by the client, if any.
    pub file_name: Option<String>,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum PinError {
    /// The pinning service answered with a non-success status.
    #[error("pinning service returned {status}: {detail}")]
    Upstream {
        status: u16,
        /// Error string the service itself reported, when the body had one.
        reported: Option<String>,
        detail: String,
    },

    #[error("pinning request failed: {0}")]
    Transport(String),

    #[error("pinning service response was invalid: {0}")]
    InvalidResponse(String),

    #[error("pinning request could not be built: {0}")]
    Request(String),
}

impl PinError {
    /// The error string reported by the upstream service, if there was one.
    pub fn reported_message(&self) -> Option<&str> {
        match self {
            PinError::Upstream {
                reported: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    /// The underlying failure description without the variant prefix.
    pub fn detail(&self) -> &str {
        match self {
            PinError::Upstream { detail, .. } => detail,
            PinError::Transport(detail)
            | PinError::InvalidResponse(detail)
            | PinError::Request(detail) => detail,
        }
    }
}

/// Hosted content-addressed storage.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pin raw file bytes under `name`.
    async fn pin_file(&self, file: FileUpload, name: &str) -> Result<ContentLocator, PinError>;

    /// Pin a JSON document under `name`.
    async fn pin_json(&self, document: &Value, name: &str) -> Result<ContentLocator, PinError>;

    /// Check that the configured credentials are accepted.
    async fn test_authentication(&self) -> Result<(), PinError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process [`PinningService`] used by relay and handler tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum PinCall {
        File { name: String, len: usize },
        Json { name: String, document: Value },
    }

    #[derive(Default)]
    pub struct FakePinner {
        pub calls: Mutex<Vec<PinCall>>,
        pub fail_file: Option<fn() -> PinError>,
        pub fail_json: Option<fn() -> PinError>,
    }

    impl FakePinner {
        pub fn calls(&self) -> Vec<PinCall> {
            self.calls.lock().unwrap().clone()
        }

        fn next_hash(&self, prefix: &str) -> String {
            let n = self.calls.lock().unwrap().len();
            format!("{prefix}{n}")
        }
    }

    #[async_trait]
    impl PinningService for FakePinner {
        async fn pin_file(
            &self,
            file: FileUpload,
            name: &str,
        ) -> Result<ContentLocator, PinError> {
            if let Some(fail) = self.fail_file {
                return Err(fail());
            }
            let hash = self.next_hash("bafyimage");
            self.calls.lock().unwrap().push(PinCall::File {
                name: name.to_string(),
                len: file.bytes.len(),
            });
            ContentLocator::from_hash(hash)
        }

        async fn pin_json(&self, document: &Value, name: &str) -> Result<ContentLocator, PinError> {
            if let Some(fail) = self.fail_json {
                return Err(fail());
            }
            let hash = self.next_hash("bafymeta");
            self.calls.lock().unwrap().push(PinCall::Json {
                name: name.to_string(),
                document: document.clone(),
            });
            ContentLocator::from_hash(hash)
        }

        async fn test_authentication(&self) -> Result<(), PinError> {
            Ok(())
        }
    }
}
