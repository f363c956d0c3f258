//! End-to-end editor search flow against a mocked geocoding provider.

use mapcard_core::LocationAttributes;
use mapcard_editor::{run_search, LocationEditorController, SearchPhase};
use mapcard_geocode::GeocodeClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GeocodeClient {
    GeocodeClient::with_base_url(10, base_url).expect("client construction should not fail")
}

#[tokio::test]
async fn typing_selecting_and_clearing_round_trip() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "features": [{
            "id": "address.1",
            "place_name": "123 North Main Street, Austin, Texas",
            "center": [-97.743, 30.265],
            "place_type": ["address"],
        }]
    });
    Mock::given(method("GET"))
        .and(path("/main.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut ctl = LocationEditorController::new(LocationAttributes::default());
    ctl.open_search();

    // Two short keystrokes, then a real query: only one provider call.
    run_search(&mut ctl, &client, "test-key", "m").await;
    run_search(&mut ctl, &client, "test-key", "ma").await;
    run_search(&mut ctl, &client, "test-key", "main").await;

    assert_eq!(ctl.phase(), SearchPhase::SuggestionsShown);
    assert_eq!(ctl.suggestions().len(), 1);

    ctl.select(0).expect("commit");
    let attrs = ctl.attributes();
    assert_eq!(ctl.phase(), SearchPhase::Idle);
    assert_eq!(attrs.address, "123 North Main Street, Austin, Texas");
    assert_eq!(attrs.address_abbreviation, "123 N Main St, Austin, TX");
    assert!((attrs.latitude - 30.265).abs() < 1e-9);

    ctl.clear();
    assert!(!ctl.attributes().is_set);
}

#[tokio::test]
async fn provider_failure_is_surfaced_and_retryable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut ctl = LocationEditorController::new(LocationAttributes::default());
    ctl.open_search();

    run_search(&mut ctl, &client, "test-key", "somewhere").await;
    assert_eq!(ctl.phase(), SearchPhase::Error);
    assert!(ctl
        .error_message()
        .is_some_and(|m| m.contains("try again")));
}
