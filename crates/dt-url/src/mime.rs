use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::config::UrlConfig;

/// Mime type implied by the extension of `path`.
pub fn guess_from_path(path: &str) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(str::to_string)
}

/// Ask the server what `url` is.
///
/// Any failure (unreachable host, timeout, non-2xx status, missing header)
/// yields `None`. Failures are logged at debug level and never returned.
pub fn probe_content_type(url: &str, config: &UrlConfig) -> Option<String> {
    match fetch_content_type(url, config) {
        Ok(Some(mime)) => Some(mime),
        Ok(None) => {
            debug!(url, "probe response carried no content type");
            None
        }
        Err(e) => {
            debug!(url, error = %e, "content type probe failed");
            None
        }
    }
}

fn fetch_content_type(url: &str, config: &UrlConfig) -> reqwest::Result<Option<String>> {
    let client = Client::builder()
        .timeout(config.probe_timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence)
        .filter(|m| !m.is_empty()))
}

/// `"Text/HTML; charset=utf-8"` becomes `"text/html"`.
fn essence(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}
