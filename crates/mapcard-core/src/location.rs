//! Location card attributes: the durable contract persisted with content.
//!
//! Field names serialize in camelCase to stay backward-readable with
//! previously stored card payloads. Payloads written before `isSet` existed
//! infer it from non-zero coordinates on deserialization.

use serde::{Deserialize, Serialize};

use crate::abbrev;
use crate::CoreError;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;

const DEFAULT_ZOOM: f64 = 14.0;

/// A longitude/latitude pair, in that order, matching the provider's
/// `center: [lon, lat]` convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Validates both axes against the legal coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LatitudeOutOfRange`] or
    /// [`CoreError::LongitudeOutOfRange`] for the offending axis.
    pub fn validate(self) -> Result<Self, CoreError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoreError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoreError::LongitudeOutOfRange(self.lng));
        }
        Ok(self)
    }
}

/// Named visual theme for the map widget. Serialized as the provider's
/// versioned style slug so stored content keeps rendering against the same
/// tilesets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapStyle {
    #[default]
    #[serde(rename = "streets-v12")]
    Streets,
    #[serde(rename = "outdoors-v12")]
    Outdoors,
    #[serde(rename = "light-v11")]
    Light,
    #[serde(rename = "dark-v11")]
    Dark,
    #[serde(rename = "satellite-v9")]
    Satellite,
    #[serde(rename = "satellite-streets-v12")]
    SatelliteStreets,
}

impl MapStyle {
    #[must_use]
    pub const fn as_slug(self) -> &'static str {
        match self {
            MapStyle::Streets => "streets-v12",
            MapStyle::Outdoors => "outdoors-v12",
            MapStyle::Light => "light-v11",
            MapStyle::Dark => "dark-v11",
            MapStyle::Satellite => "satellite-v9",
            MapStyle::SatelliteStreets => "satellite-streets-v12",
        }
    }
}

impl std::fmt::Display for MapStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// Schema.org type emitted in the card's JSON-LD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaType {
    #[default]
    Place,
    LocalBusiness,
    Restaurant,
    Store,
    TouristAttraction,
}

impl SchemaType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SchemaType::Place => "Place",
            SchemaType::LocalBusiness => "LocalBusiness",
            SchemaType::Restaurant => "Restaurant",
            SchemaType::Store => "Store",
            SchemaType::TouristAttraction => "TouristAttraction",
        }
    }
}

/// Attributes owned by a single location card instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LocationAttributesWire")]
pub struct LocationAttributes {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub map_style: MapStyle,
    pub zoom_level: f64,
    pub address_abbreviation: String,
    /// Whether a location has been committed. Distinguishes a genuine (0,0)
    /// coordinate from the unset default.
    pub is_set: bool,
    pub schema_type: SchemaType,
    pub schema_name: Option<String>,
    pub schema_description: Option<String>,
    pub schema_telephone: Option<String>,
    pub schema_website: Option<String>,
    pub schema_opening_hours: Option<String>,
}

/// Wire shape for deserialization. Older stored payloads predate `isSet`,
/// so the field is optional and inferred from the coordinates when absent.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationAttributesWire {
    #[serde(default)]
    address: String,
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
    #[serde(default)]
    map_style: MapStyle,
    #[serde(default = "default_zoom")]
    zoom_level: f64,
    #[serde(default)]
    address_abbreviation: String,
    #[serde(default)]
    is_set: Option<bool>,
    #[serde(default)]
    schema_type: SchemaType,
    #[serde(default)]
    schema_name: Option<String>,
    #[serde(default)]
    schema_description: Option<String>,
    #[serde(default)]
    schema_telephone: Option<String>,
    #[serde(default)]
    schema_website: Option<String>,
    #[serde(default)]
    schema_opening_hours: Option<String>,
}

const fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

impl From<LocationAttributesWire> for LocationAttributes {
    fn from(wire: LocationAttributesWire) -> Self {
        let inferred = wire.latitude != 0.0 || wire.longitude != 0.0;
        Self {
            address: wire.address,
            latitude: wire.latitude,
            longitude: wire.longitude,
            map_style: wire.map_style,
            zoom_level: wire.zoom_level,
            address_abbreviation: wire.address_abbreviation,
            is_set: wire.is_set.unwrap_or(inferred),
            schema_type: wire.schema_type,
            schema_name: wire.schema_name,
            schema_description: wire.schema_description,
            schema_telephone: wire.schema_telephone,
            schema_website: wire.schema_website,
            schema_opening_hours: wire.schema_opening_hours,
        }
    }
}

impl Default for LocationAttributes {
    fn default() -> Self {
        Self {
            address: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            map_style: MapStyle::default(),
            zoom_level: DEFAULT_ZOOM,
            address_abbreviation: String::new(),
            is_set: false,
            schema_type: SchemaType::default(),
            schema_name: None,
            schema_description: None,
            schema_telephone: None,
            schema_website: None,
            schema_opening_hours: None,
        }
    }
}

impl LocationAttributes {
    /// The committed coordinates, or `None` when no location is set.
    #[must_use]
    pub fn coordinates(&self) -> Option<LngLat> {
        self.is_set
            .then(|| LngLat::new(self.longitude, self.latitude))
    }

    /// Commits a selected location: address, validated coordinates, and the
    /// recomputed abbreviation.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] when either coordinate is out of range; the
    /// attributes are left untouched in that case.
    pub fn commit_location(&mut self, address: &str, center: LngLat) -> Result<(), CoreError> {
        let center = center.validate()?;
        self.address = address.to_owned();
        self.latitude = center.lat;
        self.longitude = center.lng;
        self.is_set = true;
        self.refresh_abbreviation();
        Ok(())
    }

    /// Resets the location to the unset state. Map style, zoom, and schema
    /// fields survive a clear.
    pub fn clear_location(&mut self) {
        self.address.clear();
        self.latitude = 0.0;
        self.longitude = 0.0;
        self.is_set = false;
        self.address_abbreviation.clear();
    }

    /// Recomputes `address_abbreviation` from the current address.
    pub fn refresh_abbreviation(&mut self) {
        self.address_abbreviation = abbrev::abbreviate(&self.address);
    }

    /// Validates and applies a zoom level.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ZoomOutOfRange`] when outside `[1, 20]`.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), CoreError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(CoreError::ZoomOutOfRange(zoom));
        }
        self.zoom_level = zoom;
        Ok(())
    }
}
