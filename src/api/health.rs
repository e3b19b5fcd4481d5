// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{header::CACHE_CONTROL, HeaderName},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    /// Server time in milliseconds since the Unix epoch; never decreases.
    pub ts: i64,
}

/// Health check endpoint handler.
///
/// Always returns 200 while the process is serving. Responses are never
/// cached.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(
    State(state): State<AppState>,
) -> ([(HeaderName, &'static str); 1], Json<HealthResponse>) {
    (
        [(CACHE_CONTROL, "no-store")],
        Json(HealthResponse {
            ok: true,
            ts: state.clock.now_millis(),
        }),
    )
}
