// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Asset pinning endpoint.
//!
//! Accepts one multipart upload, pins the file and a metadata document that
//! references it, and answers with the metadata locator.

use axum::{
    body::Bytes,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ErrorBody},
    pinning::{pin_asset, AssetFields, ContentLocator, FileUpload, PinAssetRequest, PinError},
    state::AppState,
};

/// Largest accepted file, in bytes (10 MiB).
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub const NO_FILE_MESSAGE: &str = "No file uploaded";
pub const FILE_TOO_LARGE_MESSAGE: &str = "File too large";
pub const PIN_FAILURE_FALLBACK: &str = "Failed to pin asset to IPFS";

const FILE_FIELD: &str = "file";
const NAME_FIELD: &str = "metaName";
const DESCRIPTION_FIELD: &str = "metaDescription";
const PROPERTIES_FIELD: &str = "properties";

/// Multipart form accepted by `POST /api/pin-image` (documentation only).
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PinImageForm {
    /// Asset file, at most 10 MiB.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Display name; blank falls back to "NFT Example".
    pub meta_name: Option<String>,
    /// Description; blank falls back to "This is an unchangeable NFT".
    pub meta_description: Option<String>,
    /// Serialized JSON object; invalid JSON is treated as `{}`.
    pub properties: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PinImageResponse {
    /// Locator of the pinned metadata document.
    #[serde(rename = "metadataUrl")]
    #[schema(value_type = String, example = "ipfs://bafkreibm6jg3ux5qumhcn2b3flc3tyu6dmlb4xa7u5bf44yegnrjhc4yeq")]
    pub metadata_url: ContentLocator,
}

/// Raw multipart values before normalization.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<FileUpload>,
    meta_name: Option<String>,
    meta_description: Option<String>,
    properties: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/pin-image",
    tag = "Pinning",
    request_body(content = PinImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File and metadata pinned", body = PinImageResponse),
        (status = 400, description = "No file uploaded", body = ErrorBody),
        (status = 413, description = "File larger than 10 MiB", body = ErrorBody),
        (status = 500, description = "Pinning service failure", body = ErrorBody)
    )
)]
pub async fn pin_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PinImageResponse>, ApiError> {
    // A request that is not multipart cannot carry a file.
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Pin request is not multipart");
        ApiError::bad_request(NO_FILE_MESSAGE)
    })?;

    let form = read_form(&mut multipart).await?;
    let Some(file) = form.file else {
        return Err(ApiError::bad_request(NO_FILE_MESSAGE));
    };

    let fields = AssetFields::from_form(
        form.meta_name.as_deref(),
        form.meta_description.as_deref(),
        form.properties.as_deref(),
    );

    let pinned = pin_asset(state.pinner.as_ref(), PinAssetRequest { file, fields })
        .await
        .map_err(|e| ApiError::internal(pin_failure_message(&e)))?;

    Ok(Json(PinImageResponse {
        metadata_url: pinned.metadata,
    }))
}

/// Message returned to the client for a failed pin: the upstream-reported
/// error, then the error's own description, then a fixed fallback.
pub fn pin_failure_message(error: &PinError) -> String {
    error
        .reported_message()
        .or_else(|| Some(error.detail().trim()).filter(|d| !d.is_empty()))
        .unwrap_or(PIN_FAILURE_FALLBACK)
        .to_string()
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            FILE_FIELD if form.file.is_none() => {
                form.file = read_file(field).await?;
            }
            FILE_FIELD => {
                tracing::debug!("Ignoring repeated file field");
            }
            NAME_FIELD => form.meta_name = Some(field.text().await.map_err(multipart_error)?),
            DESCRIPTION_FIELD => {
                form.meta_description = Some(field.text().await.map_err(multipart_error)?)
            }
            PROPERTIES_FIELD => {
                form.properties = Some(field.text().await.map_err(multipart_error)?)
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

/// Read the file part, enforcing the size limit while streaming.
///
/// Only parts carrying a `filename` are files. An empty part with a blank
/// filename is what browsers send for an unset file input, and counts as
/// no file.
async fn read_file(mut field: Field<'_>) -> Result<Option<FileUpload>, ApiError> {
    let Some(file_name) = field.file_name().map(str::to_string) else {
        tracing::debug!("Ignoring file field without a filename");
        return Ok(None);
    };
    let content_type = field.content_type().map(str::to_string);

    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buffer.len() + chunk.len() > MAX_FILE_BYTES {
            return Err(ApiError::payload_too_large(FILE_TOO_LARGE_MESSAGE));
        }
        buffer.extend_from_slice(&chunk);
    }

    if buffer.is_empty() && file_name.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(FileUpload {
        file_name: Some(file_name),
        content_type,
        bytes: Bytes::from(buffer),
    }))
}

fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(FILE_TOO_LARGE_MESSAGE)
    } else {
        ApiError::bad_request(error.body_text())
    }
}
