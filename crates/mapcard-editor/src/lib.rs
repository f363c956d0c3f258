//! Editor-side controllers for location cards.
//!
//! [`search::LocationEditorController`] drives the address-search flow and
//! owns the card attributes; [`map_sync::MapSyncController`] owns the map
//! widget lifecycle and keeps it in sync with committed attributes. Both are
//! sans-IO: the host event loop performs the actual HTTP calls and SDK
//! callbacks and feeds results back in.

pub mod map_sync;
pub mod search;

pub use map_sync::{
    MapDefaults, MapPhase, MapSyncController, MapWidget, WidgetFactory, WidgetOptions,
};
pub use search::{run_search, LocationEditorController, SearchPhase, SearchTicket};
