use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Client identification sent on every outbound request.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Knobs for URL validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Issue a GET to read `Content-Type` when the extension says nothing.
    pub probe_remote: bool,
    /// Probe timeout, in seconds on the wire.
    #[serde(with = "duration_secs")]
    pub probe_timeout: Duration,
    /// Sent with the content-type check. `load_bytes` always uses [`USER_AGENT`].
    pub user_agent: String,
    /// Directory relative paths resolve against. Defaults to the process cwd.
    pub base_dir: Option<PathBuf>,
}

impl Default for UrlConfig {
    fn default() -> Self {
        UrlConfig {
            probe_remote: true,
            probe_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
            base_dir: None,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
