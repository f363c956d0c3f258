mod editor_config;
mod geocode;
mod render;
mod settings;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use mapcard_core::AppConfig;
use mapcard_geocode::GeocodeClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, require_edit_capability, AuthState, RequestId};
use crate::settings_store::SettingsStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub settings: Arc<SettingsStore>,
    pub geocoder: Arc<GeocodeClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    credential: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "no_results" | "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "missing_api_key" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Single resolution point for the geocoding credential, with a fixed source
/// order: the env-injected key wins, then the stored settings value. No
/// other source is ever consulted, and callers receive the value rather
/// than re-querying ambient state.
pub(super) async fn resolve_credential(state: &AppState) -> Option<String> {
    if let Some(key) = &state.config.api_key {
        return Some(key.clone());
    }
    state.settings.api_key().await
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/geocode", get(geocode::geocode))
        .route(
            "/api/v1/settings",
            get(settings::read_settings).put(settings::update_settings),
        )
        .route("/api/v1/editor-config", get(editor_config::editor_config))
        .route("/api/v1/render", post(render::render_cards))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_edit_capability,
        ))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let credential = if resolve_credential(&state).await.is_some() {
        "configured"
    } else {
        "missing"
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                credential,
            },
            meta,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use mapcard_core::Environment;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::settings_store::SettingsPatch;

    struct TestApp {
        app: Router,
        // Keeps the settings file alive for the duration of the test.
        _dir: tempfile::TempDir,
    }

    fn test_config(dir: &tempfile::TempDir, geocoder_base: &str, env_key: Option<&str>) -> AppConfig {
        AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            settings_path: dir.path().join("settings.json"),
            api_key: env_key.map(ToOwned::to_owned),
            geocoder_base_url: geocoder_base.to_string(),
            geocoder_timeout_secs: 10,
            public_base_url: "https://example.com".to_string(),
        }
    }

    async fn test_app_with(
        geocoder_base: &str,
        stored_key: Option<&str>,
        env_key: Option<&str>,
        auth: AuthState,
    ) -> TestApp {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir, geocoder_base, env_key);
        let settings = SettingsStore::open(&config.settings_path)
            .await
            .expect("open store");
        if let Some(key) = stored_key {
            settings
                .update(SettingsPatch {
                    api_key: Some(key.to_string()),
                    ..SettingsPatch::default()
                })
                .await
                .expect("seed key");
        }
        let geocoder =
            GeocodeClient::with_base_url(10, geocoder_base).expect("geocoder construction");
        let app = build_app(
            AppState {
                config: Arc::new(config),
                settings: Arc::new(settings),
                geocoder: Arc::new(geocoder),
            },
            auth,
        );
        TestApp { app, _dir: dir }
    }

    async fn test_app(geocoder_base: &str, stored_key: Option<&str>) -> TestApp {
        test_app_with(
            geocoder_base,
            stored_key,
            None,
            AuthState::with_tokens(Vec::new()),
        )
        .await
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    fn address_feature() -> serde_json::Value {
        serde_json::json!({
            "features": [{
                "id": "address.1",
                "place_name": "100 Congress Avenue, Austin, Texas 78701, United States",
                "center": [-97.7431, 30.2672],
                "place_type": ["address"],
            }]
        })
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn health_is_public_and_reports_missing_credential() {
        let harness = test_app_with(
            "http://127.0.0.1:1",
            None,
            None,
            AuthState::with_tokens(vec!["edit-token".to_string()]),
        )
        .await;

        let response = harness
            .app
            .oneshot(get_request("/api/v1/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["credential"], "missing");
    }

    // -------------------------------------------------------------------------
    // Geocode proxy
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn geocode_requires_the_edit_capability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(address_feature()))
            .expect(0)
            .mount(&server)
            .await;

        let harness = test_app_with(
            &server.uri(),
            Some("stored-key"),
            None,
            AuthState::with_tokens(vec!["edit-token".to_string()]),
        )
        .await;

        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=100+Congress+Ave"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn geocode_accepts_a_valid_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(address_feature()))
            .mount(&server)
            .await;

        let harness = test_app_with(
            &server.uri(),
            Some("stored-key"),
            None,
            AuthState::with_tokens(vec!["edit-token".to_string()]),
        )
        .await;

        let request = Request::builder()
            .uri("/api/v1/geocode?address=100+Congress+Ave")
            .header("authorization", "Bearer edit-token")
            .body(Body::empty())
            .expect("request");
        let response = harness.app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn geocode_rejects_a_blank_address_before_any_outbound_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(address_feature()))
            .expect(0)
            .mount(&server)
            .await;

        let harness = test_app(&server.uri(), Some("stored-key")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=++"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn geocode_without_a_credential_makes_no_outbound_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(address_feature()))
            .expect(0)
            .mount(&server)
            .await;

        let harness = test_app(&server.uri(), None).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=100+Congress+Ave"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "missing_api_key");
    }

    #[tokio::test]
    async fn geocode_returns_the_normalized_best_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::query_param("access_token", "stored-key"))
            .and(wiremock::matchers::query_param("limit", "1"))
            .and(wiremock::matchers::query_param("types", "address"))
            .respond_with(ResponseTemplate::new(200).set_body_json(address_feature()))
            .expect(1)
            .mount(&server)
            .await;

        let harness = test_app(&server.uri(), Some("stored-key")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=100+Congress+Ave"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["data"]["address"],
            "100 Congress Avenue, Austin, Texas 78701, United States"
        );
        assert!((json["data"]["latitude"].as_f64().unwrap() - 30.2672).abs() < 1e-9);
        assert!((json["data"]["longitude"].as_f64().unwrap() - (-97.7431)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn geocode_with_no_features_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "features": []
            })))
            .mount(&server)
            .await;

        let harness = test_app(&server.uri(), Some("stored-key")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=nowhere+at+all"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "no_results");
    }

    #[tokio::test]
    async fn geocode_provider_failure_is_an_upstream_error_without_the_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream sad"))
            .mount(&server)
            .await;

        let harness = test_app(&server.uri(), Some("sk.very-secret")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/geocode?address=100+Congress+Ave"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "geocoding_failed");
        let message = json["error"]["message"].as_str().unwrap_or_default();
        assert!(message.contains("503"), "message should name the upstream status");
        assert!(
            !serde_json::to_string(&json).expect("json").contains("very-secret"),
            "credential must never appear in error payloads"
        );
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn settings_read_masks_the_credential() {
        let harness = test_app("http://127.0.0.1:1", Some("pk.abcdef123456")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/settings"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["apiKey"], "****3456");
        assert!(
            !serde_json::to_string(&json).expect("json").contains("pk.abcdef123456"),
            "raw credential must not appear in the settings read"
        );
    }

    #[tokio::test]
    async fn settings_update_applies_and_returns_the_new_defaults() {
        let harness = test_app("http://127.0.0.1:1", None).await;
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/settings")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "defaultStyle": "dark-v11",
                    "defaultZoom": 9.5,
                })
                .to_string(),
            ))
            .expect("request");
        let response = harness.app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["defaultStyle"], "dark-v11");
        assert!((json["data"]["defaultZoom"].as_f64().unwrap() - 9.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn settings_update_rejects_an_out_of_range_zoom() {
        let harness = test_app("http://127.0.0.1:1", None).await;
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/settings")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "defaultZoom": 42.0 }).to_string(),
            ))
            .expect("request");
        let response = harness.app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    // -------------------------------------------------------------------------
    // Editor config
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn editor_config_prefers_the_env_injected_credential() {
        let harness = test_app_with(
            "http://127.0.0.1:1",
            Some("stored-key"),
            Some("env-key"),
            AuthState::with_tokens(Vec::new()),
        )
        .await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/editor-config"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["apiKey"], "env-key");
    }

    #[tokio::test]
    async fn editor_config_falls_back_to_the_stored_credential() {
        let harness = test_app("http://127.0.0.1:1", Some("stored-key")).await;
        let response = harness
            .app
            .oneshot(get_request("/api/v1/editor-config"))
            .await
            .expect("response");
        let json = body_json(response).await;
        assert_eq!(json["data"]["apiKey"], "stored-key");
        assert_eq!(json["data"]["defaultStyle"], "streets-v12");
        assert!(json["data"]["minQueryLen"].as_u64().is_some());
    }

    // -------------------------------------------------------------------------
    // Render pass
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn render_emits_dataset_attributes_and_drained_jsonld() {
        let harness = test_app("http://127.0.0.1:1", None).await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/render")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "cards": [
                        {
                            "address": "100 Congress Avenue, Austin, Texas",
                            "latitude": 30.2672,
                            "longitude": -97.7431,
                            "isSet": true,
                            "mapStyle": "dark-v11",
                            "zoomLevel": 15,
                        },
                        { "address": "", "latitude": 0, "longitude": 0 },
                    ]
                })
                .to_string(),
            ))
            .expect("request");
        let response = harness.app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;

        let cards = json["data"]["cards"].as_array().expect("cards array");
        assert_eq!(cards.len(), 2);
        assert_eq!(
            cards[0]["addressAbbreviation"],
            "100 Congress Ave, Austin, TX"
        );
        assert!(cards[0]["blockId"]
            .as_str()
            .is_some_and(|id| id.starts_with("location-")));
        assert!(cards[0]["directionsUrl"]
            .as_str()
            .is_some_and(|u| u.contains("destination=")));
        assert!(cards[1]["directionsUrl"].is_null());

        // Only the committed card produces JSON-LD.
        let schemas = json["data"]["schema"].as_array().expect("schema array");
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0]["@type"], "Place");
        assert!(schemas[0]["@id"]
            .as_str()
            .is_some_and(|id| id.starts_with("https://example.com#location-")));
    }

    #[tokio::test]
    async fn render_passes_do_not_leak_schema_across_requests() {
        let harness = test_app("http://127.0.0.1:1", None).await;

        let first = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/render")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "cards": [{
                        "address": "100 Congress Avenue, Austin, Texas",
                        "latitude": 30.2672,
                        "longitude": -97.7431,
                        "isSet": true,
                    }]
                })
                .to_string(),
            ))
            .expect("request");
        let response = harness.app.clone().oneshot(first).await.expect("response");
        let json = body_json(response).await;
        assert_eq!(json["data"]["schema"].as_array().map(Vec::len), Some(1));

        let second = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/render")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "cards": [] }).to_string()))
            .expect("request");
        let response = harness.app.oneshot(second).await.expect("response");
        let json = body_json(response).await;
        assert_eq!(
            json["data"]["schema"].as_array().map(Vec::len),
            Some(0),
            "a fresh render pass must start with an empty collector"
        );
    }
}
