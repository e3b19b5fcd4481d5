// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pinata integration for IPFS pinning.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{ContentLocator, FileUpload, PinError, PinningService};

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const PIN_JSON_PATH: &str = "/pinning/pinJSONToIPFS";
const TEST_AUTH_PATH: &str = "/data/testAuthentication";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Pinata credentials. A JWT is used when both kinds are configured.
#[derive(Clone, PartialEq, Eq)]
pub enum PinataAuth {
    Jwt(String),
    KeyPair {
        api_key: String,
        secret_api_key: String,
    },
}

impl std::fmt::Debug for PinataAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinataAuth::Jwt(_) => f.write_str("PinataAuth::Jwt(<redacted>)"),
            PinataAuth::KeyPair { api_key, .. } => f
                .debug_struct("PinataAuth::KeyPair")
                .field("api_key", api_key)
                .field("secret_api_key", &"<redacted>")
                .finish(),
        }
    }
}

impl PinataAuth {
    pub fn kind(&self) -> &'static str {
        match self {
            PinataAuth::Jwt(_) => "jwt",
            PinataAuth::KeyPair { .. } => "key_pair",
        }
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            PinataAuth::Jwt(token) => request.bearer_auth(token),
            PinataAuth::KeyPair {
                api_key,
                secret_api_key,
            } => request
                .header("pinata_api_key", api_key)
                .header("pinata_secret_api_key", secret_api_key),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    api_base_url: String,
    auth: PinataAuth,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl PinataClient {
    pub fn new(api_base_url: impl Into<String>, auth: PinataAuth) -> Result<Self, PinError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PinError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            auth,
            http,
        })
    }

    pub fn auth_kind(&self) -> &'static str {
        self.auth.kind()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    async fn send_pin(&self, path: &str, request: RequestBuilder) -> Result<ContentLocator, PinError> {
        let response = self
            .auth
            .apply(request)
            .send()
            .await
            .map_err(|e| PinError::Transport(format!("POST {path} failed: {e}")))?;

        let response = ensure_success(path, response).await?;
        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| PinError::InvalidResponse(format!("POST {path} invalid JSON: {e}")))?;

        ContentLocator::from_hash(pinned.ipfs_hash)
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, file: FileUpload, name: &str) -> Result<ContentLocator, PinError> {
        let len = file.bytes.len() as u64;
        let content_type = file
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let part = Part::stream_with_length(file.bytes, len)
            .file_name(name.to_string())
            .mime_str(content_type)
            .map_err(|e| PinError::Request(format!("invalid content type {content_type}: {e}")))?;

        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", json!({ "name": name }).to_string());

        debug!(name = %name, bytes = len, "Pinning file to Pinata");
        let request = self.http.post(self.url(PIN_FILE_PATH)).multipart(form);
        self.send_pin(PIN_FILE_PATH, request).await
    }

    async fn pin_json(&self, document: &Value, name: &str) -> Result<ContentLocator, PinError> {
        let payload = json!({
            "pinataContent": document,
            "pinataMetadata": { "name": name }
        });

        debug!(name = %name, "Pinning JSON document to Pinata");
        let request = self.http.post(self.url(PIN_JSON_PATH)).json(&payload);
        self.send_pin(PIN_JSON_PATH, request).await
    }

    async fn test_authentication(&self) -> Result<(), PinError> {
        let response = self
            .auth
            .apply(self.http.get(self.url(TEST_AUTH_PATH)))
            .send()
            .await
            .map_err(|e| PinError::Transport(format!("GET {TEST_AUTH_PATH} failed: {e}")))?;

        let response = ensure_success(TEST_AUTH_PATH, response).await?;
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = body.get("message").and_then(|m| m.as_str()).unwrap_or("");
        info!(
            auth = self.auth.kind(),
            message = message,
            "Pinata authentication succeeded"
        );
        Ok(())
    }
}

async fn ensure_success(path: &str, response: Response) -> Result<Response, PinError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(PinError::Upstream {
        status: status.as_u16(),
        reported: extract_error_message(&body),
        detail: format!("{path} returned {status}: {}", body.trim()),
    })
}

/// Pull a human-readable message out of a Pinata error body.
///
/// Pinata has answered with `{"error":{"reason","details"}}`,
/// `{"error":"..."}` and `{"message":"..."}` over time.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let candidates = [
        value.pointer("/error/details"),
        value.pointer("/error/reason"),
        value.pointer("/error/message"),
        value.get("error"),
        value.get("message"),
        value.get("details"),
    ];
    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string);
    found
}
