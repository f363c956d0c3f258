use thiserror::Error;

/// Errors returned by the geocoding client.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network failure, timeout, or non-2xx from the provider. The wrapped
    /// error has its URL stripped so the access token can never leak through
    /// a rendered message.
    #[error("provider HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not parseable.
    #[error("invalid geocoder base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl GeocodeError {
    /// A short, user-displayable description that never includes request
    /// URLs or credentials.
    #[must_use]
    pub fn upstream_message(&self) -> String {
        match self {
            GeocodeError::Http(e) => e.status().map_or_else(
                || "could not reach the geocoding provider".to_string(),
                |status| format!("geocoding provider returned HTTP {status}"),
            ),
            GeocodeError::Deserialize { .. } => {
                "geocoding provider returned an unreadable response".to_string()
            }
            GeocodeError::InvalidBaseUrl { .. } => {
                "geocoding provider is misconfigured".to_string()
            }
        }
    }
}
