//! Server-side render pass for location cards.
//!
//! Takes the stored card attributes, recomputes the derived pieces (block
//! IDs, address abbreviations, directions links), and collects one JSON-LD
//! entry per committed card. The schema collector is created fresh for
//! every request, so concurrent renders cannot see each other's entries.

use axum::extract::State;
use axum::{Extension, Json};
use mapcard_core::schema::SchemaCollector;
use mapcard_core::LocationAttributes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RenderRequest {
    #[serde(default)]
    cards: Vec<LocationAttributes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RenderedCard {
    block_id: String,
    #[serde(flatten)]
    attributes: LocationAttributes,
    directions_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RenderResponse {
    cards: Vec<RenderedCard>,
    schema: Vec<serde_json::Value>,
}

pub(super) async fn render_cards(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<RenderRequest>,
) -> Json<ApiResponse<RenderResponse>> {
    let base_url = state.config.public_base_url.as_str();
    let mut collector = SchemaCollector::new();
    let mut cards = Vec::with_capacity(request.cards.len());

    for mut attrs in request.cards {
        let block_id = format!("location-{}", Uuid::new_v4());
        attrs.refresh_abbreviation();
        collector.push(&attrs, &block_id, base_url);

        let directions_url = directions_url(&attrs);
        cards.push(RenderedCard {
            block_id,
            attributes: attrs,
            directions_url,
        });
    }

    Json(ApiResponse {
        data: RenderResponse {
            cards,
            schema: collector.drain(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// A Google Maps directions link for a committed card with an address.
fn directions_url(attrs: &LocationAttributes) -> Option<String> {
    if !attrs.is_set || attrs.address.is_empty() {
        return None;
    }
    reqwest::Url::parse_with_params(
        "https://www.google.com/maps/dir/",
        &[("api", "1"), ("destination", attrs.address.as_str())],
    )
    .ok()
    .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcard_core::LngLat;

    #[test]
    fn directions_link_encodes_the_destination() {
        let mut attrs = LocationAttributes::default();
        attrs
            .commit_location("100 Congress Avenue, Austin", LngLat::new(-97.74, 30.27))
            .expect("valid coordinates");
        let url = directions_url(&attrs).expect("committed card gets a link");
        assert!(url.starts_with("https://www.google.com/maps/dir/?"));
        assert!(url.contains("api=1"));
        assert!(url.contains("destination=100+Congress+Avenue%2C+Austin"));
    }

    #[test]
    fn unset_cards_get_no_directions_link() {
        assert!(directions_url(&LocationAttributes::default()).is_none());
    }
}
