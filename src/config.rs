// Settings module: where the client gets its userhash and endpoint from.
// Values come from a small JSON file in the home directory and can be
// overridden with `CATBOX_USERHASH` / `CATBOX_API_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_API_URL;
use crate::error::{CatboxError, Result};

const SETTINGS_FILE: &str = ".catbox.json";

/// Persisted client settings. Every field is optional so an empty or
/// missing file means "anonymous client against catbox.moe".
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Settings {
    /// `~/.catbox.json`, or `./.catbox.json` when there is no home directory.
    pub fn default_path() -> PathBuf {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        dir.join(SETTINGS_FILE)
    }

    /// Load the settings file and apply environment overrides on top.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::default_path())?;
        settings.apply_env();
        Ok(settings)
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(CatboxError::Settings(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&data)
            .map_err(|e| CatboxError::Settings(format!("malformed {}: {}", path.display(), e)))
    }

    /// Override fields from `CATBOX_USERHASH` and `CATBOX_API_URL`.
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var("CATBOX_USERHASH").ok(),
            std::env::var("CATBOX_API_URL").ok(),
        );
    }

    fn apply_overrides(&mut self, userhash: Option<String>, api_url: Option<String>) {
        if let Some(hash) = non_blank(userhash) {
            self.userhash = Some(hash);
        }
        if let Some(url) = non_blank(api_url) {
            self.api_url = Some(url);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| CatboxError::Settings(e.to_string()))?;
        std::fs::write(path, data)
            .map_err(|e| CatboxError::Settings(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Endpoint to talk to, falling back to the public catbox API.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
