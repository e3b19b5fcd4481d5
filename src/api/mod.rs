// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ErrorBody, pinning::NftMetadata, state::AppState};

pub mod cors;
pub mod health;
pub mod pin;

/// Room for the text fields and multipart framing on top of the file.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let origins = state.origins.clone();

    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/pin-image", post(pin::pin_image))
        .layer(DefaultBodyLimit::max(pin::MAX_FILE_BYTES + FORM_OVERHEAD_BYTES))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors::cors_layer(origins.clone()))
        .layer(middleware::from_fn_with_state(origins, cors::enforce_origin))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health, pin::pin_image),
    components(
        schemas(
            health::HealthResponse,
            pin::PinImageForm,
            pin::PinImageResponse,
            NftMetadata,
            ErrorBody
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Pinning", description = "IPFS pinning of asset files and metadata")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{
                ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
                ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
                ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CACHE_CONTROL,
                CONTENT_TYPE, ORIGIN,
            },
            Method, Request, StatusCode,
        },
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        api::cors::OriginPolicy,
        pinning::{
            testing::{FakePinner, PinCall},
            PinError, DEFAULT_NAME,
        },
    };

    const BOUNDARY: &str = "relay-test-boundary";

    fn app_with(pinner: Arc<FakePinner>) -> Router {
        let policy = OriginPolicy::new(
            vec!["http://localhost:5173".into()],
            Some("vercel.app".into()),
        );
        router(AppState::new(pinner, policy))
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a [u8]),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn pin_request(parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/pin-image")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = app_with(Arc::new(FakePinner::default()));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_uncached_and_monotonic() {
        let app = app_with(Arc::new(FakePinner::default()));

        let mut last = 0;
        for _ in 0..3 {
            let response = app
                .clone()
                .oneshot(Request::get("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[CACHE_CONTROL], "no-store");

            let body = json_body(response).await;
            assert_eq!(body["ok"], json!(true));
            let ts = body["ts"].as_i64().unwrap();
            assert!(ts >= last);
            last = ts;
        }
    }

    #[tokio::test]
    async fn pin_image_returns_metadata_url() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());

        let response = app
            .oneshot(pin_request(&[
                Part::File("cat.png", b"png-bytes"),
                Part::Text("metaName", "  "),
                Part::Text("metaDescription", " Sleepy cat "),
                Part::Text("properties", "not json"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let url = body["metadataUrl"].as_str().unwrap();
        let metadata_hash = url.strip_prefix("ipfs://").unwrap();
        assert!(!metadata_hash.is_empty());

        let calls = pinner.calls();
        assert_eq!(calls.len(), 2);
        let PinCall::File { len, .. } = &calls[0] else {
            panic!("first call must pin the file");
        };
        assert_eq!(*len, 9);
        let PinCall::Json { document, .. } = &calls[1] else {
            panic!("second call must pin the metadata");
        };
        assert_eq!(document["name"], json!(DEFAULT_NAME));
        assert_eq!(document["description"], json!("Sleepy cat"));
        assert_eq!(document["properties"], json!({}));
        let image_hash = document["image"]
            .as_str()
            .unwrap()
            .strip_prefix("ipfs://")
            .unwrap();
        assert_ne!(image_hash, metadata_hash);
    }

    #[tokio::test]
    async fn missing_file_is_400_without_upstream_calls() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());

        let response = app
            .oneshot(pin_request(&[Part::Text("metaName", "Cat")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
        assert!(pinner.calls().is_empty());
    }

    #[tokio::test]
    async fn file_field_without_filename_is_not_a_file() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());

        let response = app
            .oneshot(pin_request(&[Part::Text("file", "hello")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
        assert!(pinner.calls().is_empty());
    }

    #[tokio::test]
    async fn unset_file_input_is_not_a_file() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());

        let response = app
            .oneshot(pin_request(&[Part::File("", b""), Part::Text("metaName", "Cat")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(pinner.calls().is_empty());
    }

    #[tokio::test]
    async fn non_multipart_request_is_treated_as_missing_file() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());

        let response = app
            .oneshot(
                Request::post("/api/pin-image")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
        assert!(pinner.calls().is_empty());
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() {
        let pinner = Arc::new(FakePinner::default());
        let app = app_with(pinner.clone());
        let big = vec![0u8; pin::MAX_FILE_BYTES + 1];

        let response = app
            .oneshot(pin_request(&[Part::File("big.bin", &big)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await, json!({"error": "File too large"}));
        assert!(pinner.calls().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_reported_message() {
        let pinner = Arc::new(FakePinner {
            fail_file: Some(|| PinError::Upstream {
                status: 401,
                reported: Some("Invalid API key provided".into()),
                detail: "401".into(),
            }),
            ..Default::default()
        });
        let app = app_with(pinner);

        let response = app
            .oneshot(pin_request(&[Part::File("cat.png", b"png")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Invalid API key provided"})
        );
    }

    #[tokio::test]
    async fn disallowed_origin_is_rejected() {
        let app = app_with(Arc::new(FakePinner::default()));

        let response = app
            .oneshot(
                Request::get("/health")
                    .header(ORIGIN, "https://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await,
            json!({"error": cors::ORIGIN_REJECTED_MESSAGE})
        );
    }

    #[tokio::test]
    async fn allowed_origin_gets_cors_headers_and_preflight() {
        let app = app_with(Arc::new(FakePinner::default()));

        let response = app
            .clone()
            .oneshot(
                Request::get("/health")
                    .header(ORIGIN, "https://my-mint.vercel.app")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://my-mint.vercel.app"
        );

        let preflight = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/pin-image")
                    .header(ORIGIN, "http://localhost:5173")
                    .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(preflight.status(), StatusCode::OK);
        let headers = preflight.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
        let methods = headers[ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
        assert!(methods.contains("POST"));
        let mut allowed: Vec<String> = headers[ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        allowed.sort();
        assert_eq!(allowed, ["authorization", "content-type"]);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[tokio::test]
    async fn preflight_from_disallowed_origin_is_forbidden() {
        let app = app_with(Arc::new(FakePinner::default()));

        let preflight = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/pin-image")
                    .header(ORIGIN, "https://evil.example.com")
                    .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(preflight.status(), StatusCode::FORBIDDEN);
        assert!(preflight
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        assert_eq!(
            json_body(preflight).await,
            json!({"error": cors::ORIGIN_REJECTED_MESSAGE})
        );
    }

    #[tokio::test]
    async fn request_without_origin_is_allowed() {
        let app = app_with(Arc::new(FakePinner::default()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn openapi_documents_both_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api/pin-image"));
    }

    #[test]
    fn openapi_pin_form_uses_form_field_names() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let properties = doc
            .pointer("/components/schemas/PinImageForm/properties")
            .and_then(Value::as_object)
            .unwrap();
        for field in ["file", "metaName", "metaDescription", "properties"] {
            assert!(properties.contains_key(field), "{field}");
        }
        assert!(!properties.contains_key("meta_name"));
    }
}
