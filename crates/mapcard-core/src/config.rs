use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("MAPCARD_ENV", "development"));
    let bind_addr = parse_addr("MAPCARD_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MAPCARD_LOG_LEVEL", "info");
    let settings_path = PathBuf::from(or_default("MAPCARD_SETTINGS_PATH", "./settings.json"));
    // Empty string means "not configured" so a blank .env entry does not
    // shadow the stored settings value.
    let api_key = lookup("MAPCARD_API_KEY").ok().filter(|k| !k.is_empty());
    let geocoder_base_url = or_default(
        "MAPCARD_GEOCODER_BASE_URL",
        "https://api.mapbox.com/geocoding/v5/mapbox.places",
    );
    let geocoder_timeout_secs = parse_u64("MAPCARD_GEOCODER_TIMEOUT_SECS", "10")?;
    let public_base_url = or_default("MAPCARD_PUBLIC_BASE_URL", "http://localhost:3000");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        settings_path,
        api_key,
        geocoder_base_url,
        geocoder_timeout_secs,
        public_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
