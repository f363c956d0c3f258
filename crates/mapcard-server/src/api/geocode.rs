//! Server-side geocoding proxy.
//!
//! The browser editor never holds the server-resolved credential for this
//! path: callers send an address, the server attaches the key and returns
//! the single best street-address match.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{resolve_credential, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    address: Option<String>,
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<ApiResponse<mapcard_geocode::ResolvedLocation>>, ApiError> {
    let address = query.address.as_deref().map(str::trim).unwrap_or_default();
    if address.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "address query parameter is required",
        ));
    }

    let Some(credential) = resolve_credential(&state).await else {
        return Err(ApiError::new(
            req_id.0,
            "missing_api_key",
            "no geocoding API key is configured",
        ));
    };

    let resolved = state
        .geocoder
        .best_match(address, &credential)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %req_id.0, error = %e.upstream_message(), "geocoding proxy call failed");
            ApiError::new(req_id.0.clone(), "geocoding_failed", e.upstream_message())
        })?;

    match resolved {
        Some(location) => Ok(Json(ApiResponse {
            data: location,
            meta: ResponseMeta::new(req_id.0),
        })),
        None => Err(ApiError::new(
            req_id.0,
            "no_results",
            format!("no street address found for '{address}'"),
        )),
    }
}
