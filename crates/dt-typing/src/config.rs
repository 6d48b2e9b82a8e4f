use std::fs;
use std::path::Path;

use dt_url::UrlConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Settings shared by every field validation.
///
/// ```toml
/// [url]
/// probe_remote = false
/// probe_timeout = 2.5
/// base_dir = "/srv/media"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub url: UrlConfig,
}

impl TypingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ValidationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
