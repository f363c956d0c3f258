//! HTTP client for the provider's forward-geocoding API.
//!
//! Wraps `reqwest` with typed errors, bounded timeouts, and the fixed
//! suggestion ranking. The credential is passed per call rather than stored:
//! the editor flow and the server proxy resolve it from different places.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{FeatureCollection, GeocodeSuggestion, ResolvedLocation};

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Queries shorter than this short-circuit to an empty result without a
/// network call.
pub const MIN_QUERY_LEN: usize = 3;

const SEARCH_TYPES: &str = "address,poi,place,locality,neighborhood,postcode";
const SEARCH_LIMIT: &str = "10";

/// Client for the provider's forward-geocoding dataset.
///
/// Use [`GeocodeClient::new`] for production or
/// [`GeocodeClient::with_base_url`] to point at a mock server in tests.
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Creates a client pointed at the production geocoding API.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` is not usable.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("mapcard/0.1 (location-cards)")
            .build()?;

        let trimmed = base_url.trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(GeocodeError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot serve as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Forward-geocodes a free-text query into ranked suggestions.
    ///
    /// Asks for up to 10 features across the searchable place types and
    /// sorts them by the fixed type priority; the sort is stable, so ties
    /// keep provider order. Queries shorter than [`MIN_QUERY_LEN`]
    /// characters return an empty list without touching the network.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure, timeout, or non-2xx.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search(
        &self,
        query: &str,
        credential: &str,
    ) -> Result<Vec<GeocodeSuggestion>, GeocodeError> {
        if query.chars().count() < MIN_QUERY_LEN {
            tracing::debug!(query, "query below search minimum, skipping provider call");
            return Ok(Vec::new());
        }

        let url = self.endpoint_url(
            query,
            credential,
            &[
                ("limit", SEARCH_LIMIT),
                ("types", SEARCH_TYPES),
                ("language", "en"),
            ],
        )?;
        let body = self
            .request_json(url, &format!("search(query={query})"))
            .await?;

        let mut suggestions: Vec<GeocodeSuggestion> =
            body.features.into_iter().map(Into::into).collect();
        suggestions.sort_by_key(|s| s.place_type.priority());
        tracing::debug!(query, count = suggestions.len(), "search completed");
        Ok(suggestions)
    }

    /// Forward-geocodes an address to its single best street-address match.
    ///
    /// Returns `None` when the provider finds nothing; only the first
    /// feature is normalized, the rest are discarded.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure, timeout, or non-2xx.
    /// - [`GeocodeError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn best_match(
        &self,
        address: &str,
        credential: &str,
    ) -> Result<Option<ResolvedLocation>, GeocodeError> {
        let url = self.endpoint_url(address, credential, &[("limit", "1"), ("types", "address")])?;
        let body = self
            .request_json(url, &format!("best_match(address={address})"))
            .await?;

        Ok(body.features.into_iter().next().map(Into::into))
    }

    /// Builds `{base}/{query}.json?access_token=...&...` with the query text
    /// percent-encoded as a single path segment.
    fn endpoint_url(
        &self,
        query: &str,
        credential: &str,
        extra: &[(&str, &str)],
    ) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot serve as a base".to_string(),
            })?
            .push(&format!("{query}.json"));
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", credential);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx status, and parses the feature
    /// collection. Errors are stripped of their URL before wrapping: the
    /// request URL embeds the access token.
    async fn request_json(
        &self,
        url: Url,
        context: &str,
    ) -> Result<FeatureCollection, GeocodeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))?;
        let response = response
            .error_for_status()
            .map_err(|e| GeocodeError::Http(e.without_url()))?;
        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}
