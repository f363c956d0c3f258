//! Address-search controller: debounce-friendly state machine over the
//! geocoding client.
//!
//! Every keystroke allocates a fresh [`SearchTicket`] with a monotonically
//! increasing sequence number; a response is only applied when its ticket is
//! still the newest one issued. A burst of rapid keystrokes therefore cannot
//! surface stale suggestions, no matter how the in-flight requests race.

use mapcard_core::{CoreError, LocationAttributes};
use mapcard_geocode::{GeocodeClient, GeocodeError, GeocodeSuggestion, MIN_QUERY_LEN};

/// User-facing message for transient provider failures.
const SEARCH_ERROR_MESSAGE: &str = "Error searching locations. Please try again.";

/// Where the search surface currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Search surface closed; nothing in flight.
    Idle,
    /// Surface open, typing or awaiting results (also the empty-result
    /// state, rendered as an empty-suggestions message).
    Searching,
    /// At least one suggestion is visible.
    SuggestionsShown,
    /// A provider failure is displayed; the user retries by typing.
    Error,
}

/// Handle for one in-flight search request.
///
/// Holds the sequence number that [`LocationEditorController::apply_result`]
/// checks to discard stale responses.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    seq: u64,
    pub query: String,
}

/// Controller coordinating search input, suggestion display, and attribute
/// commits for a single location card.
#[derive(Debug)]
pub struct LocationEditorController {
    attrs: LocationAttributes,
    phase: SearchPhase,
    suggestions: Vec<GeocodeSuggestion>,
    error: Option<String>,
    /// Sequence number of the newest ticket ever issued. Responses carrying
    /// an older ticket are dropped on the floor.
    latest_seq: u64,
}

impl LocationEditorController {
    #[must_use]
    pub fn new(attrs: LocationAttributes) -> Self {
        Self {
            attrs,
            phase: SearchPhase::Idle,
            suggestions: Vec::new(),
            error: None,
            latest_seq: 0,
        }
    }

    #[must_use]
    pub fn attributes(&self) -> &LocationAttributes {
        &self.attrs
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    #[must_use]
    pub fn suggestions(&self) -> &[GeocodeSuggestion] {
        &self.suggestions
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Opens the search surface.
    pub fn open_search(&mut self) {
        if self.phase == SearchPhase::Idle {
            self.phase = SearchPhase::Searching;
        }
    }

    /// Registers new input and hands back a ticket for the request the host
    /// should now dispatch.
    ///
    /// Returns `None` for queries shorter than the search minimum: visible
    /// suggestions are cleared and no request should be made. Either way the
    /// internal sequence number advances, so responses to older input are
    /// invalidated immediately.
    pub fn note_input(&mut self, query: &str) -> Option<SearchTicket> {
        self.latest_seq += 1;
        self.phase = SearchPhase::Searching;
        self.error = None;

        if query.chars().count() < MIN_QUERY_LEN {
            self.suggestions.clear();
            return None;
        }

        Some(SearchTicket {
            seq: self.latest_seq,
            query: query.to_owned(),
        })
    }

    /// Applies the outcome of a dispatched search.
    ///
    /// Stale tickets (anything but the newest issued) are ignored, as is any
    /// response arriving after the surface was dismissed.
    pub fn apply_result(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<GeocodeSuggestion>, GeocodeError>,
    ) {
        if ticket.seq != self.latest_seq {
            tracing::debug!(query = %ticket.query, "discarding stale search response");
            return;
        }
        if self.phase == SearchPhase::Idle {
            return;
        }

        match result {
            Ok(suggestions) if suggestions.is_empty() => {
                self.suggestions.clear();
                self.phase = SearchPhase::Searching;
            }
            Ok(suggestions) => {
                self.suggestions = suggestions;
                self.phase = SearchPhase::SuggestionsShown;
            }
            Err(e) => {
                tracing::warn!(error = %e, query = %ticket.query, "location search failed");
                self.suggestions.clear();
                self.error = Some(SEARCH_ERROR_MESSAGE.to_owned());
                self.phase = SearchPhase::Error;
            }
        }
    }

    /// Commits the selected suggestion into the card attributes, recomputes
    /// the abbreviation, and closes the search surface.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError`] if the suggestion carries out-of-range
    /// coordinates; the controller stays in its current phase in that case.
    pub fn select(&mut self, index: usize) -> Result<(), CoreError> {
        let Some(suggestion) = self.suggestions.get(index) else {
            return Ok(());
        };
        self.attrs
            .commit_location(&suggestion.place_name, suggestion.center)?;
        self.close_surface();
        Ok(())
    }

    /// Resets the location to unset values and returns to idle. Legal from
    /// any state.
    pub fn clear(&mut self) {
        self.attrs.clear_location();
        self.close_surface();
    }

    /// Dismisses the search surface, discarding in-flight suggestions.
    /// Responses still in flight become stale by construction.
    pub fn dismiss(&mut self) {
        self.close_surface();
    }

    fn close_surface(&mut self) {
        self.latest_seq += 1;
        self.suggestions.clear();
        self.error = None;
        self.phase = SearchPhase::Idle;
    }
}

/// Drives one full search round trip: ticket, provider call, result
/// application. Hosts with their own event loop can instead dispatch the
/// ticket themselves and call [`LocationEditorController::apply_result`].
pub async fn run_search(
    controller: &mut LocationEditorController,
    client: &GeocodeClient,
    credential: &str,
    query: &str,
) {
    let Some(ticket) = controller.note_input(query) else {
        return;
    };
    let result = client.search(&ticket.query, credential).await;
    controller.apply_result(&ticket, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcard_core::LngLat;
    use mapcard_geocode::PlaceType;

    fn suggestion(name: &str, lng: f64, lat: f64) -> GeocodeSuggestion {
        GeocodeSuggestion {
            place_id: format!("address.{name}"),
            place_name: name.to_owned(),
            center: LngLat::new(lng, lat),
            place_type: PlaceType::Address,
        }
    }

    fn controller() -> LocationEditorController {
        let mut ctl = LocationEditorController::new(LocationAttributes::default());
        ctl.open_search();
        ctl
    }

    #[test]
    fn opening_search_moves_to_searching() {
        let ctl = controller();
        assert_eq!(ctl.phase(), SearchPhase::Searching);
    }

    #[test]
    fn short_queries_yield_no_ticket_and_clear_suggestions() {
        let mut ctl = controller();
        let ticket = ctl.note_input("123 Main").expect("ticket");
        ctl.apply_result(&ticket, Ok(vec![suggestion("123 Main St", -97.7, 30.3)]));
        assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);

        assert!(ctl.note_input("12").is_none());
        assert!(ctl.suggestions().is_empty());
        assert_eq!(ctl.phase(), SearchPhase::Searching);
    }

    #[test]
    fn successful_result_shows_suggestions() {
        let mut ctl = controller();
        let ticket = ctl.note_input("ferry building").expect("ticket");
        ctl.apply_result(
            &ticket,
            Ok(vec![suggestion("Ferry Building, SF", -122.39, 37.79)]),
        );
        assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);
        assert_eq!(ctl.suggestions().len(), 1);
    }

    #[test]
    fn empty_result_stays_searching_with_no_suggestions() {
        let mut ctl = controller();
        let ticket = ctl.note_input("zzzzz").expect("ticket");
        ctl.apply_result(&ticket, Ok(Vec::new()));
        assert_eq!(ctl.phase(), SearchPhase::Searching);
        assert!(ctl.suggestions().is_empty());
    }

    #[test]
    fn failure_surfaces_a_retryable_error() {
        let mut ctl = controller();
        let ticket = ctl.note_input("anywhere").expect("ticket");
        let err = GeocodeError::InvalidBaseUrl {
            url: "x".to_owned(),
            reason: "test".to_owned(),
        };
        ctl.apply_result(&ticket, Err(err));
        assert_eq!(ctl.phase(), SearchPhase::Error);
        assert!(ctl.error_message().is_some());

        // Typing again retries and clears the error.
        let ticket = ctl.note_input("anywhere else").expect("ticket");
        assert!(ctl.error_message().is_none());
        ctl.apply_result(&ticket, Ok(vec![suggestion("Anywhere Else", 1.0, 2.0)]));
        assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut ctl = controller();
        let first = ctl.note_input("coffee").expect("ticket");
        let second = ctl.note_input("coffee shop austin").expect("ticket");

        // Newer request resolves first.
        ctl.apply_result(
            &second,
            Ok(vec![suggestion("Coffee Shop, Austin", -97.7, 30.3)]),
        );
        assert_eq!(ctl.suggestions().len(), 1);

        // The older response must not overwrite the newer suggestions.
        ctl.apply_result(&first, Ok(vec![suggestion("Coffee, Somewhere", 0.0, 0.0)]));
        assert_eq!(ctl.suggestions().len(), 1);
        assert_eq!(ctl.suggestions()[0].place_name, "Coffee Shop, Austin");
    }

    #[test]
    fn stale_error_does_not_clobber_newer_suggestions() {
        let mut ctl = controller();
        let first = ctl.note_input("coffee").expect("ticket");
        let second = ctl.note_input("coffee atx").expect("ticket");

        ctl.apply_result(&second, Ok(vec![suggestion("Coffee ATX", -97.7, 30.3)]));
        ctl.apply_result(
            &first,
            Err(GeocodeError::InvalidBaseUrl {
                url: "x".to_owned(),
                reason: "test".to_owned(),
            }),
        );
        assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);
        assert!(ctl.error_message().is_none());
    }

    #[test]
    fn select_commits_attributes_and_returns_to_idle() {
        let mut ctl = controller();
        let ticket = ctl.note_input("ferry building").expect("ticket");
        ctl.apply_result(
            &ticket,
            Ok(vec![suggestion(
                "Ferry Building, San Francisco, California",
                -122.39,
                37.79,
            )]),
        );
        ctl.select(0).expect("commit");

        assert_eq!(ctl.phase(), SearchPhase::Idle);
        assert!(ctl.suggestions().is_empty());
        let attrs = ctl.attributes();
        assert!(attrs.is_set);
        assert_eq!(attrs.address, "Ferry Building, San Francisco, California");
        assert_eq!(attrs.address_abbreviation, "Ferry Building, San Francisco, CA");
        assert!((attrs.longitude - (-122.39)).abs() < 1e-9);
    }

    #[test]
    fn select_out_of_bounds_is_a_no_op() {
        let mut ctl = controller();
        let ticket = ctl.note_input("ferry").expect("ticket");
        ctl.apply_result(&ticket, Ok(vec![suggestion("Ferry Building", -122.39, 37.79)]));
        ctl.select(5).expect("no-op");
        assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);
        assert!(!ctl.attributes().is_set);
    }

    #[test]
    fn clear_resets_attributes_from_any_state() {
        let mut ctl = controller();
        let ticket = ctl.note_input("ferry building").expect("ticket");
        ctl.apply_result(&ticket, Ok(vec![suggestion("Ferry Building", -122.39, 37.79)]));
        ctl.select(0).expect("commit");

        ctl.clear();
        assert_eq!(ctl.phase(), SearchPhase::Idle);
        assert!(!ctl.attributes().is_set);
        assert_eq!(ctl.attributes().address, "");
    }

    #[test]
    fn dismiss_invalidates_in_flight_requests() {
        let mut ctl = controller();
        let ticket = ctl.note_input("coffee").expect("ticket");
        ctl.dismiss();
        assert_eq!(ctl.phase(), SearchPhase::Idle);

        // The response lands after dismissal and must change nothing.
        ctl.apply_result(&ticket, Ok(vec![suggestion("Coffee", 0.0, 0.0)]));
        assert_eq!(ctl.phase(), SearchPhase::Idle);
        assert!(ctl.suggestions().is_empty());
    }
}
