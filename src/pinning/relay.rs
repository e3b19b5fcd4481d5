// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Two-step asset pin: the file first, then a metadata document that
//! references it.

use tracing::{info, warn};
use uuid::Uuid;

use super::{AssetFields, ContentLocator, FileUpload, NftMetadata, PinError, PinningService};

const METADATA_NAME_SUFFIX: &str = ".metadata.json";
const MAX_PIN_NAME_LEN: usize = 200;

/// A validated upload ready to be pinned.
#[derive(Debug, Clone)]
pub struct PinAssetRequest {
    pub file: FileUpload,
    pub fields: AssetFields,
}

/// Locators produced by a successful [`pin_asset`].
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedAsset {
    pub image: ContentLocator,
    pub metadata: ContentLocator,
    pub document: NftMetadata,
}

/// Pin the file, build its metadata document, and pin that.
///
/// The metadata pin is not attempted when the file pin fails, and a failed
/// metadata pin does not unpin the file.
pub async fn pin_asset(
    pinner: &dyn PinningService,
    request: PinAssetRequest,
) -> Result<PinnedAsset, PinError> {
    let PinAssetRequest { file, fields } = request;
    let file_name = pin_name_for(file.file_name.as_deref());
    let size = file.bytes.len();

    let image = pinner.pin_file(file, &file_name).await.map_err(|e| {
        warn!(error = %e, file_name = %file_name, "File pin failed");
        e
    })?;
    info!(file_name = %file_name, bytes = size, image = %image, "Pinned asset file");

    let document = fields.into_metadata(image.clone());
    let document_json = serde_json::to_value(&document)
        .map_err(|e| PinError::Request(format!("failed to encode metadata: {e}")))?;

    let metadata_name = format!("{file_name}{METADATA_NAME_SUFFIX}");
    let metadata = pinner
        .pin_json(&document_json, &metadata_name)
        .await
        .map_err(|e| {
            // The image stays pinned; a retry re-pins the same content.
            warn!(error = %e, image = %image, "Metadata pin failed after file pin");
            e
        })?;
    info!(metadata = %metadata, image = %image, "Pinned asset metadata");

    Ok(PinnedAsset {
        image,
        metadata,
        document,
    })
}

/// Name under which the file is pinned: the client's filename without any
/// path components, or a generated `upload-<uuid>`.
pub fn pin_name_for(original: Option<&str>) -> String {
    let base = original
        .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name))
        .map(|name| {
            name.chars()
                .filter(|c| !c.is_control())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..");

    match base {
        Some(name) => name.chars().take(MAX_PIN_NAME_LEN).collect(),
        None => format!("upload-{}", Uuid::new_v4()),
    }
}
