//! Forward-geocoding client for the mapping provider.
//!
//! Used by the editor search flow (multi-suggestion, client credential) and
//! by the server-side proxy (single best match, stored credential).

mod client;
mod error;
mod types;

pub use client::{GeocodeClient, DEFAULT_BASE_URL, MIN_QUERY_LEN};
pub use error::GeocodeError;
pub use types::{GeocodeSuggestion, PlaceType, ResolvedLocation};
