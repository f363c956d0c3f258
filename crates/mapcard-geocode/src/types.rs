//! Wire shapes for provider responses and the suggestion types exposed to
//! callers.

use mapcard_core::LngLat;
use serde::{Deserialize, Serialize};

/// Provider-assigned category of a geocoding result.
///
/// The declaration order here is the fixed ranking priority used when
/// sorting suggestions: street addresses first, postcodes last, anything
/// the provider invents later after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Address,
    Poi,
    Place,
    Locality,
    Neighborhood,
    Postcode,
    #[serde(other)]
    Unknown,
}

impl PlaceType {
    /// Sort key for suggestion ranking; lower ranks first.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            PlaceType::Address => 0,
            PlaceType::Poi => 1,
            PlaceType::Place => 2,
            PlaceType::Locality => 3,
            PlaceType::Neighborhood => 4,
            PlaceType::Postcode => 5,
            PlaceType::Unknown => u8::MAX,
        }
    }
}

/// One search suggestion, held only transiently by the editor controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeSuggestion {
    pub place_id: String,
    pub place_name: String,
    pub center: LngLat,
    pub place_type: PlaceType,
}

/// The proxy's normalized single-best-match result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level provider response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One feature as the provider sends it.
#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub id: String,
    pub place_name: String,
    /// `[longitude, latitude]`, in provider order.
    pub center: [f64; 2],
    #[serde(default)]
    pub place_type: Vec<PlaceType>,
}

impl From<Feature> for GeocodeSuggestion {
    fn from(feature: Feature) -> Self {
        Self {
            place_id: feature.id,
            place_name: feature.place_name,
            center: LngLat::new(feature.center[0], feature.center[1]),
            place_type: feature
                .place_type
                .first()
                .copied()
                .unwrap_or(PlaceType::Unknown),
        }
    }
}

impl From<Feature> for ResolvedLocation {
    fn from(feature: Feature) -> Self {
        Self {
            address: feature.place_name,
            latitude: feature.center[1],
            longitude: feature.center[0],
        }
    }
}
