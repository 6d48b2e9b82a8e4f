use std::env;
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use dt_proto::NodeProto;
use reqwest::blocking::Client;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::config::{UrlConfig, USER_AGENT};
use crate::error::{Result, UrlError};
use crate::grammar::{UrlParts, MAX_URL_LENGTH};
use crate::kind::{Audio, Image, Text, UrlKind, Video};
use crate::mime;

pub type ImageUrl = Url<Image>;
pub type AudioUrl = Url<Audio>;
pub type VideoUrl = Url<Video>;
pub type TextUrl = Url<Text>;

const NETWORK_SCHEMES: [&str; 2] = ["http", "https"];

/// Where a validated URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A relative path, kept as given. `absolute` is what it resolved to at
    /// validation time.
    Relative { original: String, absolute: PathBuf },
    /// An absolute path or a fully qualified URL.
    Canonical(String),
}

impl Location {
    pub fn as_str(&self) -> &str {
        match self {
            Location::Relative { original, .. } => original,
            Location::Canonical(s) => s,
        }
    }
}

/// A URL or filesystem path that has been checked to reference `K` media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url<K: UrlKind> {
    location: Location,
    parts: UrlParts,
    mime: Option<String>,
    kind: PhantomData<K>,
}

fn is_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Lexically collapse `.` and `..`, never touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve(relative: &str, config: &UrlConfig) -> Result<PathBuf> {
    let base = match &config.base_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    Ok(normalize(&base.join(relative)))
}

impl<K: UrlKind> Url<K> {
    /// Validate `raw` with the default configuration.
    pub fn validate(raw: &str) -> Result<Self> {
        Self::validate_with(raw, &UrlConfig::default())
    }

    /// Validate `raw`.
    ///
    /// Relative paths are resolved before grammar and format checks, but the
    /// value keeps the caller's relative string.
    ///
    /// # Errors
    /// `InvalidUrlGrammar` if the text is not a URL, `UnsupportedFormat` if it
    /// does not reference `K` media, `Io` if the working directory is needed
    /// and unreadable.
    pub fn validate_with(raw: &str, config: &UrlConfig) -> Result<Self> {
        let value = raw.trim();
        if value.is_empty() || value.len() > MAX_URL_LENGTH {
            return Err(UrlError::InvalidUrlGrammar {
                url: value.to_string(),
                reason: format!("URL length must be between 1 and {} bytes", MAX_URL_LENGTH),
            });
        }

        let absolute = if is_http(value) || Path::new(value).is_absolute() {
            None
        } else {
            Some(resolve(value, config)?)
        };
        let candidate = match &absolute {
            Some(path) => path.to_string_lossy().into_owned(),
            None => value.to_string(),
        };

        let parts = UrlParts::parse(&candidate)?;
        parts.check(&candidate, K::allowed_schemes())?;

        let mut mime = parts.path.as_deref().and_then(mime::guess_from_path);
        if mime.is_none() && config.probe_remote {
            if let Some(scheme) = parts.scheme_lowercase() {
                if NETWORK_SCHEMES.contains(&scheme.as_str()) {
                    mime = mime::probe_content_type(&candidate, config);
                }
            }
        }

        match &mime {
            Some(m) if !m.starts_with(K::mime_type()) => {
                return Err(UrlError::UnsupportedFormat {
                    url: value.to_string(),
                    reason: format!("is not a {} file format", K::mime_type()),
                });
            }
            Some(_) => {}
            None => {
                let full = value.to_ascii_lowercase();
                let stem = full.split('?').next().unwrap_or(&full);
                let allowed = K::allowed_extensions();
                if !allowed
                    .iter()
                    .any(|ext| full.ends_with(ext) || stem.ends_with(ext))
                {
                    return Err(UrlError::UnsupportedFormat {
                        url: value.to_string(),
                        reason: format!("is not a valid file format for {}", K::NAME),
                    });
                }
            }
        }
        trace!(url = value, kind = K::NAME, mime = ?mime, "url validated");

        let location = match absolute {
            Some(absolute) => Location::Relative {
                original: value.to_string(),
                absolute,
            },
            None => Location::Canonical(parts.to_string()),
        };
        Ok(Url {
            location,
            parts,
            mime,
            kind: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        self.location.as_str()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn is_relative(&self) -> bool {
        matches!(self.location, Location::Relative { .. })
    }

    /// Components of the validated form; for relative inputs these describe
    /// the resolved absolute path.
    pub fn parts(&self) -> &UrlParts {
        &self.parts
    }

    pub fn scheme(&self) -> Option<&str> {
        self.parts.scheme.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.parts.host.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.parts.path.as_deref()
    }

    /// Mime type found by extension lookup or remote probe, if any.
    pub fn detected_mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    fn is_network(&self) -> bool {
        self.parts
            .scheme_lowercase()
            .is_some_and(|s| NETWORK_SCHEMES.contains(&s.as_str()))
    }

    fn local_path(&self) -> PathBuf {
        match &self.location {
            Location::Relative { absolute, .. } => absolute.clone(),
            Location::Canonical(s) => PathBuf::from(s),
        }
    }

    /// Fetch the referenced bytes over HTTP(S) or from disk.
    ///
    /// `timeout` bounds the network path only; `None` waits indefinitely.
    /// Requests always identify as [`USER_AGENT`]; `UrlConfig::user_agent`
    /// only applies to the content-type check during validation.
    ///
    /// # Errors
    /// `Http` for transport failures and non-2xx responses, `Io` if the file
    /// exists but cannot be read, `ResourceUnavailable` if it does not exist.
    pub fn load_bytes(&self, timeout: Option<Duration>) -> Result<Vec<u8>> {
        if self.is_network() {
            let client = Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()?;
            let response = client.get(self.as_str()).send()?.error_for_status()?;
            return Ok(response.bytes()?.to_vec());
        }

        let path = self.local_path();
        if path.exists() {
            return Ok(fs::read(path)?);
        }
        Err(UrlError::ResourceUnavailable {
            url: self.as_str().to_string(),
        })
    }

    /// Wire form: the string in `text`, the kind in `type`.
    pub fn to_node_proto(&self) -> NodeProto {
        NodeProto::text(self.as_str(), K::PROTO_TYPE_NAME)
    }

    /// Rebuild from the wire text. The text is validated again, so stale
    /// or hostile messages are rejected the same way user input is.
    pub fn from_protobuf(text: &str, config: &UrlConfig) -> Result<Self> {
        Self::validate_with(text, config)
    }

    pub fn from_node_proto(node: &NodeProto, config: &UrlConfig) -> Result<Self> {
        if node.type_name() != K::PROTO_TYPE_NAME {
            return Err(UrlError::MalformedProto(format!(
                "expected type '{}', got '{}'",
                K::PROTO_TYPE_NAME,
                node.type_name()
            )));
        }
        let text = node.as_text()?;
        Self::from_protobuf(text, config)
    }
}

impl<K: UrlKind> Deref for Url<K> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<K: UrlKind> AsRef<str> for Url<K> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<K: UrlKind> fmt::Display for Url<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<K: UrlKind> FromStr for Url<K> {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::validate(s)
    }
}

impl<K: UrlKind> Serialize for Url<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, K: UrlKind> Deserialize<'de> for Url<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::validate(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Photo {}

    impl UrlKind for Photo {
        const NAME: &'static str = "PhotoUrl";
        const PROTO_TYPE_NAME: &'static str = "photo_url";

        fn mime_type() -> &'static str {
            "image/"
        }

        fn allowed_extensions() -> &'static [&'static str] {
            &[".jpg", ".png", ".shot"]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum WebClip {}

    impl UrlKind for WebClip {
        const NAME: &'static str = "WebClipUrl";
        const PROTO_TYPE_NAME: &'static str = "web_clip_url";

        fn mime_type() -> &'static str {
            "video/"
        }

        fn allowed_extensions() -> &'static [&'static str] {
            &[".mp4"]
        }

        fn allowed_schemes() -> Option<&'static [&'static str]> {
            Some(&["http", "https"])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum HttpsClip {}

    impl UrlKind for HttpsClip {
        const NAME: &'static str = "HttpsClipUrl";
        const PROTO_TYPE_NAME: &'static str = "https_clip_url";

        fn mime_type() -> &'static str {
            "video/"
        }

        fn allowed_extensions() -> &'static [&'static str] {
            &[".mp4"]
        }

        fn allowed_schemes() -> Option<&'static [&'static str]> {
            Some(&["https"])
        }
    }

    fn offline() -> UrlConfig {
        UrlConfig {
            probe_remote: false,
            ..UrlConfig::default()
        }
    }

    fn in_dir(dir: &Path) -> UrlConfig {
        UrlConfig {
            base_dir: Some(dir.to_path_buf()),
            ..offline()
        }
    }

    /// Serve one canned HTTP response on an ephemeral port.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    /// Like `serve_once`, but hands back the raw request text.
    fn serve_once_recording(response: String) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (format!("http://{}", addr), rx)
    }

    fn http_response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            content_type,
            body.len(),
            body
        )
    }

    #[test]
    fn test_relative_png_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::<Photo>::validate_with("photo.png", &in_dir(dir.path())).unwrap();
        assert_eq!(url.as_str(), "photo.png");
        assert!(url.is_relative());
        assert_eq!(
            url.location(),
            &Location::Relative {
                original: "photo.png".to_string(),
                absolute: dir.path().join("photo.png"),
            }
        );
        assert_eq!(url.detected_mime(), Some("image/png"));
    }

    #[test]
    fn test_relative_txt_rejected_by_mime() {
        let dir = tempfile::tempdir().unwrap();
        let err = Url::<Photo>::validate_with("photo.txt", &in_dir(dir.path())).unwrap_err();
        match err {
            UrlError::UnsupportedFormat { url, reason } => {
                assert_eq!(url, "photo.txt");
                assert!(reason.contains("image/"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_relative_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::<Photo>::validate_with("./a/../b/cat.jpg", &in_dir(dir.path())).unwrap();
        assert_eq!(url.as_str(), "./a/../b/cat.jpg");
        match url.location() {
            Location::Relative { absolute, .. } => {
                assert_eq!(absolute, &dir.path().join("b").join("cat.jpg"))
            }
            other => panic!("unexpected location {other:?}"),
        }
    }

    #[test]
    fn test_absolute_and_http_are_canonical() {
        let url = Url::<Image>::validate_with("/data/cat.png", &offline()).unwrap();
        assert_eq!(url.location(), &Location::Canonical("/data/cat.png".to_string()));

        let url =
            Url::<Image>::validate_with("  https://example.com/cat.jpg?size=2  ", &offline())
                .unwrap();
        assert_eq!(url.as_str(), "https://example.com/cat.jpg?size=2");
        assert_eq!(url.host(), Some("example.com"));
        assert!(!url.is_relative());
    }

    #[test]
    fn test_unknown_mime_falls_back_to_extension() {
        // ".shot" has no registered mime type
        let url = Url::<Photo>::validate_with("/shots/frame.SHOT", &offline()).unwrap();
        assert!(url.detected_mime().is_none());

        let err = Url::<Photo>::validate_with("/shots/frame.xyzq", &offline()).unwrap_err();
        assert!(matches!(err, UrlError::UnsupportedFormat { ref reason, .. } if reason.contains("PhotoUrl")));
    }

    #[test]
    fn test_mime_mismatch_beats_extension() {
        // ".txt" is text/plain even if the extension list would allow it
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Loose {}
        impl UrlKind for Loose {
            const NAME: &'static str = "LooseUrl";
            const PROTO_TYPE_NAME: &'static str = "loose_url";
            fn mime_type() -> &'static str {
                "image/"
            }
            fn allowed_extensions() -> &'static [&'static str] {
                &[".txt"]
            }
        }
        assert!(Url::<Loose>::validate_with("/a/b.txt", &offline()).is_err());
    }

    #[test]
    fn test_extension_check_ignores_query() {
        let url = Url::<Photo>::validate_with("http://127.0.0.1:1/get?id=7", &offline());
        assert!(url.is_err());
        let url = Url::<Photo>::validate_with("/p/x.shot?rev=2", &offline()).unwrap();
        assert_eq!(url.as_str(), "/p/x.shot?rev=2");
    }

    #[test]
    fn test_grammar_errors() {
        assert!(matches!(
            Url::<Image>::validate_with("", &offline()),
            Err(UrlError::InvalidUrlGrammar { .. })
        ));
        assert!(matches!(
            Url::<Image>::validate_with("   ", &offline()),
            Err(UrlError::InvalidUrlGrammar { .. })
        ));
        assert!(matches!(
            Url::<Image>::validate_with("http://example.com:99999/a.png", &offline()),
            Err(UrlError::InvalidUrlGrammar { .. })
        ));
        assert!(matches!(
            Url::<WebClip>::validate_with("/local/clip.mp4", &offline()),
            Ok(_)
        ));
        assert!(matches!(
            Url::<HttpsClip>::validate_with("http://example.com/clip.mp4", &offline()),
            Err(UrlError::InvalidUrlGrammar { .. })
        ));
        assert!(Url::<HttpsClip>::validate_with("https://example.com/clip.mp4", &offline()).is_ok());
    }

    #[test]
    fn test_non_http_scheme_is_a_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::<WebClip>::validate_with("ftp://host/clip.mp4", &in_dir(dir.path())).unwrap();
        assert_eq!(url.as_str(), "ftp://host/clip.mp4");
        assert!(url.scheme().is_none());
        match url.location() {
            Location::Relative { absolute, .. } => {
                assert_eq!(absolute, &dir.path().join("ftp:").join("host").join("clip.mp4"))
            }
            other => panic!("unexpected location {other:?}"),
        }
    }

    #[test]
    fn test_failed_probe_is_swallowed() {
        let config = UrlConfig {
            probe_timeout: Duration::from_secs(1),
            ..UrlConfig::default()
        };
        let err = Url::<Video>::validate_with("http://127.0.0.1:1/clip", &config).unwrap_err();
        assert!(matches!(err, UrlError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_probe_content_type() {
        let base = serve_once(http_response("200 OK", "video/mp4; codecs=avc1", "abcd"));
        let url = Url::<Video>::validate_with(&format!("{}/stream", base), &UrlConfig::default())
            .unwrap();
        assert_eq!(url.detected_mime(), Some("video/mp4"));
    }

    #[test]
    fn test_probe_wrong_family_rejected() {
        let base = serve_once(http_response("200 OK", "text/html", "<p>"));
        let err = Url::<Video>::validate_with(&format!("{}/page", base), &UrlConfig::default())
            .unwrap_err();
        assert!(matches!(err, UrlError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_bytes_http() {
        let base = serve_once(http_response("200 OK", "image/png", "pngdata"));
        let url = Url::<Image>::validate_with(&format!("{}/a.png", base), &offline()).unwrap();
        let bytes = url.load_bytes(Some(Duration::from_secs(5))).unwrap();
        assert_eq!(bytes, b"pngdata");
    }

    #[test]
    fn test_load_bytes_sends_fixed_user_agent() {
        let (base, requests) =
            serve_once_recording(http_response("200 OK", "image/png", "pngdata"));
        let config = UrlConfig {
            user_agent: "dt-validate/0.1".to_string(),
            ..offline()
        };
        let url = Url::<Image>::validate_with(&format!("{}/a.png", base), &config).unwrap();
        url.load_bytes(Some(Duration::from_secs(5))).unwrap();
        let request = requests.recv_timeout(Duration::from_secs(5)).unwrap().to_ascii_lowercase();
        assert!(request.contains("user-agent: mozilla/5.0"), "{request}");
    }

    #[test]
    fn test_load_bytes_http_status() {
        let base = serve_once(http_response("404 Not Found", "text/plain", "nope"));
        let url = Url::<Image>::validate_with(&format!("{}/a.png", base), &offline()).unwrap();
        assert!(matches!(
            url.load_bytes(Some(Duration::from_secs(5))),
            Err(UrlError::Http(_))
        ));
    }

    #[test]
    fn test_load_bytes_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let url = Url::<Text>::validate_with("notes.txt", &in_dir(dir.path())).unwrap();
        assert_eq!(url.load_bytes(None).unwrap(), b"hello");

        let absolute = dir.path().join("notes.txt");
        let url = Url::<Text>::validate_with(absolute.to_str().unwrap(), &offline()).unwrap();
        assert_eq!(url.load_bytes(None).unwrap(), b"hello");
    }

    #[test]
    fn test_load_bytes_missing() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::<Text>::validate_with("gone.txt", &in_dir(dir.path())).unwrap();
        assert!(matches!(
            url.load_bytes(None),
            Err(UrlError::ResourceUnavailable { ref url }) if url == "gone.txt"
        ));
    }

    #[test]
    fn test_node_proto() {
        let url = Url::<Audio>::validate_with("/music/take.wav", &offline()).unwrap();
        let node = url.to_node_proto();
        assert_eq!(node.type_name(), "audio_url");
        assert_eq!(node.as_text().unwrap(), "/music/take.wav");

        let back = Url::<Audio>::from_node_proto(&node, &offline()).unwrap();
        assert_eq!(back, url);

        assert!(matches!(
            Url::<Video>::from_node_proto(&node, &offline()),
            Err(UrlError::MalformedProto(_))
        ));
    }

    #[test]
    fn test_from_protobuf_revalidates() {
        assert!(Url::<Audio>::from_protobuf("/music/take.png", &offline()).is_err());
    }

    #[test]
    fn test_str_views() {
        let url = Url::<Image>::validate_with("/x/y.gif", &offline()).unwrap();
        assert!(url.ends_with(".gif"));
        assert_eq!(format!("{}", url), "/x/y.gif");
        let s: &str = url.as_ref();
        assert_eq!(s, "/x/y.gif");
    }

    #[test]
    fn test_serde() {
        let url = Url::<Image>::validate_with("/x/y.gif", &offline()).unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), r#""/x/y.gif""#);
        let back: Url<Image> = serde_json::from_str(r#""/x/y.gif""#).unwrap();
        assert_eq!(back.as_str(), "/x/y.gif");
        assert!(serde_json::from_str::<Url<Image>>(r#""/x/y.mp3""#).is_err());
    }
}
