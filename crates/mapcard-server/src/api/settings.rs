//! Read and update handlers for the stored map defaults and credential.
//!
//! Reads never return the raw credential: it is masked down to its last
//! four characters so the editor can show "a key is set" without being able
//! to copy it back out.

use axum::extract::State;
use axum::{Extension, Json};
use mapcard_core::{LngLat, MapStyle};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::settings_store::{Settings, SettingsError, SettingsPatch};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Settings as the editor sees them: same fields as [`Settings`], with the
/// credential masked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SettingsView {
    api_key: Option<String>,
    default_style: MapStyle,
    default_zoom: f64,
    default_center: LngLat,
}

impl From<Settings> for SettingsView {
    fn from(settings: Settings) -> Self {
        Self {
            api_key: settings.api_key.as_deref().map(mask_credential),
            default_style: settings.default_style,
            default_zoom: settings.default_zoom,
            default_center: settings.default_center,
        }
    }
}

/// Masks a credential to `****` plus its last four characters. Short keys
/// mask entirely.
fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub(super) async fn read_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SettingsView>> {
    let settings = state.settings.get().await;
    Json(ApiResponse {
        data: settings.into(),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn update_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ApiResponse<SettingsView>>, ApiError> {
    let updated = state.settings.update(patch).await.map_err(|e| match e {
        SettingsError::ZoomOutOfRange(_) | SettingsError::InvalidCenter(_) => {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        }
        SettingsError::Io(_) | SettingsError::Parse(_) => {
            tracing::error!(request_id = %req_id.0, error = %e, "failed to persist settings");
            ApiError::new(
                req_id.0.clone(),
                "settings_persist_failed",
                "could not persist settings",
            )
        }
    })?;

    Ok(Json(ApiResponse {
        data: updated.into(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
