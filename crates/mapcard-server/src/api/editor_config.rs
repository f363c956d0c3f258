//! Bootstrap payload for the editor: the verbatim credential (the map SDK
//! and the in-editor search both need it client-side) plus the map defaults.
//!
//! This is the one endpoint that returns the credential unmasked, which is
//! why it sits behind the edit capability with the rest of the editor API.

use axum::extract::State;
use axum::{Extension, Json};
use mapcard_core::{LngLat, MapStyle};
use mapcard_geocode::MIN_QUERY_LEN;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{resolve_credential, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EditorConfig {
    api_key: Option<String>,
    default_style: MapStyle,
    default_zoom: f64,
    default_center: LngLat,
    min_query_len: usize,
}

pub(super) async fn editor_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<EditorConfig>> {
    let api_key = resolve_credential(&state).await;
    let settings = state.settings.get().await;

    Json(ApiResponse {
        data: EditorConfig {
            api_key,
            default_style: settings.default_style,
            default_zoom: settings.default_zoom,
            default_center: settings.default_center,
            min_query_len: MIN_QUERY_LEN,
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
