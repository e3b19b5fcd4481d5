// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-origin policy.
//!
//! Requests without an `Origin` header (same-origin, curl, server-to-server)
//! are always allowed. Browser requests must come from the explicit
//! allow-list or from an `https` subdomain of the configured hosting domain.
//! Everything else is rejected with `403` before reaching a handler.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        request::Parts,
        HeaderValue, Method,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use url::Url;

use crate::{config::RelayConfig, error::ApiError};

pub const ORIGIN_REJECTED_MESSAGE: &str = "Origin not allowed by CORS";

#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
    hosted_suffix: Option<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>, hosted_suffix: Option<String>) -> Self {
        Self {
            allowed: allowed
                .iter()
                .map(|o| normalize_origin(o))
                .filter(|o| !o.is_empty())
                .collect(),
            hosted_suffix: hosted_suffix
                .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.allowed_origins.clone(),
            config.hosted_origin_suffix.clone(),
        )
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        let origin = normalize_origin(origin);
        if self.allowed.iter().any(|allowed| *allowed == origin) {
            return true;
        }
        let Some(suffix) = &self.hosted_suffix else {
            return false;
        };
        let Ok(url) = Url::parse(&origin) else {
            return false;
        };
        if url.scheme() != "https" || url.path() != "/" || url.query().is_some() {
            return false;
        }
        match url.host_str() {
            Some(host) => host
                .strip_suffix(suffix.as_str())
                .and_then(|label| label.strip_suffix('.'))
                .is_some_and(|label| !label.is_empty()),
            None => false,
        }
    }

    fn allows_header(&self, origin: &HeaderValue) -> bool {
        origin.to_str().is_ok_and(|o| self.is_allowed(o))
    }
}

/// Browsers never send a trailing slash in `Origin`.
pub(crate) fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// CORS headers for allowed origins, including preflight handling.
pub fn cors_layer(policy: Arc<OriginPolicy>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| policy.allows_header(origin),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(false)
}

/// Reject requests whose declared origin is not allowed.
pub async fn enforce_origin(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        if !policy.allows_header(origin) {
            tracing::warn!(
                origin = ?origin,
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected request from disallowed origin"
            );
            return ApiError::forbidden(ORIGIN_REJECTED_MESSAGE).into_response();
        }
    }
    next.run(request).await
}
