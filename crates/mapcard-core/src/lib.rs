pub mod abbrev;
mod app_config;
mod config;
mod location;
pub mod schema;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{LngLat, LocationAttributes, MapStyle, SchemaType, MAX_ZOOM, MIN_ZOOM};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("latitude {0} is out of range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is out of range [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("zoom level {0} is out of range [1, 20]")]
    ZoomOutOfRange(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
