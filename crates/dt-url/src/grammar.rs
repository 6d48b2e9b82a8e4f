use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, UrlError};

/// Longest accepted URL, in bytes.
pub const MAX_URL_LENGTH: usize = 1 << 16;

// Every component is optional, including scheme and host, so a bare
// filesystem path parses as a path-only URL.
const URL_PATTERN: &str = concat!(
    r"(?i)^",
    r"(?:(?P<scheme>[a-z][a-z0-9+\-.]+)://)?",
    r"(?:(?P<user>[^\s:/]*)(?::(?P<password>[^\s/]*))?@)?",
    r"(?P<host>\[[0-9a-f:.]+\]|[^\s/:?#\[\]@]+)?",
    r"(?::(?P<port>\d+))?",
    r"(?P<path>/[^\s?#]*)?",
    r"(?:\?(?P<query>[^\s#]*))?",
    r"(?:#(?P<fragment>[^\s#]*))?",
);

fn url_regex() -> std::result::Result<&'static Regex, &'static regex::Error> {
    static URL_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(URL_PATTERN)).as_ref()
}

/// The syntactic components of a URL or path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl UrlParts {
    /// Split `url` into its components.
    ///
    /// # Errors
    /// Returns `UrlError::InvalidUrlGrammar` if the input is empty, too long,
    /// or has trailing characters that fit no component.
    pub fn parse(url: &str) -> Result<UrlParts> {
        let invalid = |reason: String| UrlError::InvalidUrlGrammar {
            url: url.to_string(),
            reason,
        };
        if url.is_empty() {
            return Err(invalid("empty URL".to_string()));
        }
        if url.len() > MAX_URL_LENGTH {
            return Err(invalid(format!(
                "URL is longer than {} bytes",
                MAX_URL_LENGTH
            )));
        }

        let caps = url_regex()
            .map_err(|e| invalid(e.to_string()))?
            .captures(url)
            .ok_or_else(|| invalid("URL does not match".to_string()))?;
        let end = caps.get(0).map_or(0, |m| m.end());
        if end != url.len() {
            return Err(invalid(format!("unexpected characters '{}'", &url[end..])));
        }

        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        Ok(UrlParts {
            scheme: group("scheme"),
            user: group("user"),
            password: group("password"),
            host: group("host"),
            port: group("port"),
            path: group("path"),
            query: group("query"),
            fragment: group("fragment"),
        })
    }

    /// Check the parsed components.
    ///
    /// A missing scheme is always accepted and means "local path". A present
    /// scheme must be in `allowed_schemes` when that is given. The port, if
    /// any, must fit in 16 bits.
    pub fn check(&self, url: &str, allowed_schemes: Option<&[&str]>) -> Result<()> {
        if let (Some(scheme), Some(allowed)) = (&self.scheme, allowed_schemes) {
            let scheme = scheme.to_ascii_lowercase();
            if !allowed.iter().any(|s| s.eq_ignore_ascii_case(&scheme)) {
                return Err(UrlError::InvalidUrlGrammar {
                    url: url.to_string(),
                    reason: format!(
                        "URL scheme '{}' is not permitted, expected one of [{}]",
                        scheme,
                        allowed.join(", ")
                    ),
                });
            }
        }

        if let Some(port) = &self.port {
            if !matches!(port.parse::<u32>(), Ok(p) if p <= u16::MAX as u32) {
                return Err(UrlError::InvalidUrlGrammar {
                    url: url.to_string(),
                    reason: format!("URL port '{}' is invalid, port cannot exceed 65535", port),
                });
            }
        }
        Ok(())
    }

    /// Lowercased scheme, if any.
    pub fn scheme_lowercase(&self) -> Option<String> {
        self.scheme.as_ref().map(|s| s.to_ascii_lowercase())
    }
}

/// Rebuilds the URL from its components; a missing scheme emits no `://`.
impl fmt::Display for UrlParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{}://", scheme)?;
        }
        if let Some(user) = &self.user {
            write!(f, "{}", user)?;
            if let Some(password) = &self.password {
                write!(f, ":{}", password)?;
            }
            write!(f, "@")?;
        }
        if let Some(host) = &self.host {
            write!(f, "{}", host)?;
        }
        if let Some(port) = &self.port {
            write!(f, ":{}", port)?;
        }
        if let Some(path) = &self.path {
            write!(f, "{}", path)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        let p = UrlParts::parse("https://user:pw@example.com:8080/a/b.mp4?x=1#t=3").unwrap();
        assert_eq!(p.scheme.as_deref(), Some("https"));
        assert_eq!(p.user.as_deref(), Some("user"));
        assert_eq!(p.password.as_deref(), Some("pw"));
        assert_eq!(p.host.as_deref(), Some("example.com"));
        assert_eq!(p.port.as_deref(), Some("8080"));
        assert_eq!(p.path.as_deref(), Some("/a/b.mp4"));
        assert_eq!(p.query.as_deref(), Some("x=1"));
        assert_eq!(p.fragment.as_deref(), Some("t=3"));
    }

    #[test]
    fn test_bare_path_has_no_host() {
        let p = UrlParts::parse("/data/photos/cat.png").unwrap();
        assert!(p.scheme.is_none());
        assert!(p.host.is_none());
        assert_eq!(p.path.as_deref(), Some("/data/photos/cat.png"));
    }

    #[test]
    fn test_ipv6_host() {
        let p = UrlParts::parse("http://[::1]:9000/clip.mp4").unwrap();
        assert_eq!(p.host.as_deref(), Some("[::1]"));
        assert_eq!(p.port.as_deref(), Some("9000"));
    }

    #[test]
    fn test_rebuild_is_exact() {
        for url in [
            "https://user:pw@example.com:8080/a/b.mp4?x=1#t=3",
            "http://example.com",
            "/tmp/a.png?",
            "s3://bucket/key.wav",
            "http://@host/x",
        ] {
            assert_eq!(UrlParts::parse(url).unwrap().to_string(), url);
        }
    }

    #[test]
    fn test_trailing_garbage() {
        assert!(matches!(
            UrlParts::parse("http://exa mple.com/a.png"),
            Err(UrlError::InvalidUrlGrammar { .. })
        ));
    }

    #[test]
    fn test_empty_and_too_long() {
        assert!(UrlParts::parse("").is_err());
        let long = format!("/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(UrlParts::parse(&long).is_err());
    }

    #[test]
    fn test_port_range() {
        let p = UrlParts::parse("http://example.com:65536/a.mp4").unwrap();
        assert!(p.check("http://example.com:65536/a.mp4", None).is_err());
        let p = UrlParts::parse("http://example.com:65535/a.mp4").unwrap();
        assert!(p.check("http://example.com:65535/a.mp4", None).is_ok());
    }

    #[test]
    fn test_scheme_whitelist() {
        let allowed: &[&str] = &["http", "https"];
        let p = UrlParts::parse("FTP://host/a.png").unwrap();
        assert!(p.check("FTP://host/a.png", Some(allowed)).is_err());
        assert!(p.check("FTP://host/a.png", None).is_ok());
        let p = UrlParts::parse("HTTPS://host/a.png").unwrap();
        assert!(p.check("HTTPS://host/a.png", Some(allowed)).is_ok());
        let p = UrlParts::parse("/local/a.png").unwrap();
        assert!(p.check("/local/a.png", Some(allowed)).is_ok());
    }
}
