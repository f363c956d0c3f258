//! File-backed key/value persistence for the geocoding credential and map
//! defaults — the service's stand-in for a host CMS options table.
//!
//! Reads happen from an in-memory copy behind an `RwLock`; writes validate,
//! then persist atomically via a temp file and rename so a crash mid-write
//! never leaves a torn settings file.

use std::path::{Path, PathBuf};

use mapcard_core::{CoreError, LngLat, MapStyle, MAX_ZOOM, MIN_ZOOM};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("default zoom {0} is out of range [1, 20]")]
    ZoomOutOfRange(f64),

    #[error("default center is invalid: {0}")]
    InvalidCenter(#[from] CoreError),
}

/// Persisted settings. The credential lives here when not injected via
/// environment.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub default_style: MapStyle,
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,
    #[serde(default = "default_center")]
    pub default_center: LngLat,
}

fn default_zoom() -> f64 {
    14.0
}

fn default_center() -> LngLat {
    // Geographic center of the contiguous US; an arbitrary but stable
    // fallback for cards without a committed location.
    LngLat::new(-98.5795, 39.8283)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            default_style: MapStyle::default(),
            default_zoom: default_zoom(),
            default_center: default_center(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("default_style", &self.default_style)
            .field("default_zoom", &self.default_zoom)
            .field("default_center", &self.default_center)
            .finish()
    }
}

/// Partial update applied by the settings endpoint. Absent fields keep their
/// stored value; an empty `api_key` string clears the credential.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub api_key: Option<String>,
    pub default_style: Option<MapStyle>,
    pub default_zoom: Option<f64>,
    pub default_center: Option<LngLat>,
}

pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<Settings>,
}

impl SettingsStore {
    /// Opens the store, reading the settings file when it exists. A missing
    /// file yields defaults; it is only created on the first write.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] on read failure other than not-found,
    /// or [`SettingsError::Parse`] for a corrupt file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let settings = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "settings file absent, using defaults");
                Settings::default()
            }
            Err(e) => return Err(SettingsError::Io(e)),
        };

        Ok(Self {
            path,
            inner: RwLock::new(settings),
        })
    }

    /// A point-in-time copy of the settings.
    pub async fn get(&self) -> Settings {
        self.inner.read().await.clone()
    }

    /// The stored credential, if any.
    pub async fn api_key(&self) -> Option<String> {
        self.inner.read().await.api_key.clone()
    }

    /// Validates and applies a patch, persisting the result atomically.
    /// Returns the updated settings.
    ///
    /// # Errors
    ///
    /// Returns a validation variant when the patch carries an out-of-range
    /// zoom or center, or [`SettingsError::Io`] if persistence fails; the
    /// in-memory settings are only replaced after a successful write.
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings, SettingsError> {
        if let Some(zoom) = patch.default_zoom {
            if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                return Err(SettingsError::ZoomOutOfRange(zoom));
            }
        }
        if let Some(center) = patch.default_center {
            center.validate()?;
        }

        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        if let Some(api_key) = patch.api_key {
            next.api_key = Some(api_key).filter(|k| !k.is_empty());
        }
        if let Some(style) = patch.default_style {
            next.default_style = style;
        }
        if let Some(zoom) = patch.default_zoom {
            next.default_zoom = zoom;
        }
        if let Some(center) = patch.default_center {
            next.default_center = center;
        }

        self.persist(&next).await?;
        *guard = next.clone();
        Ok(next)
    }

    async fn persist(&self, settings: &Settings) -> Result<(), SettingsError> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
