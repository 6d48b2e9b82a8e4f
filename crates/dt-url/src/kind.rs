use std::fmt::Debug;

/// Media family a URL field points at.
///
/// Implementors are uninhabited marker enums; the validated value lives in
/// [`Url<K>`](crate::Url).
pub trait UrlKind: Debug + Clone + Copy + PartialEq + Eq + 'static {
    /// Type name used in error messages.
    const NAME: &'static str;
    /// Discriminator written into `NodeProto::type`.
    const PROTO_TYPE_NAME: &'static str;

    /// Top-level mime prefix, including the trailing slash.
    fn mime_type() -> &'static str;

    /// Lowercase extensions with the leading dot.
    fn allowed_extensions() -> &'static [&'static str];

    /// Accepted schemes, matched case-insensitively. `None` accepts any.
    fn allowed_schemes() -> Option<&'static [&'static str]> {
        None
    }
}

macro_rules! url_kind {
    ($(#[$doc:meta])* $kind:ident, $name:literal, $proto:literal, $mime:literal, [$($ext:literal),* $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $kind {}

        impl UrlKind for $kind {
            const NAME: &'static str = $name;
            const PROTO_TYPE_NAME: &'static str = $proto;

            fn mime_type() -> &'static str {
                $mime
            }

            fn allowed_extensions() -> &'static [&'static str] {
                &[$($ext),*]
            }
        }
    };
}

url_kind!(
    /// Still images.
    Image, "ImageUrl", "image_url", "image/",
    [".png", ".jpeg", ".jpg", ".gif", ".bmp", ".tif", ".tiff", ".webp", ".ico", ".svg"]
);

url_kind!(
    Audio, "AudioUrl", "audio_url", "audio/",
    [".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".wma", ".aiff", ".opus"]
);

url_kind!(
    Video, "VideoUrl", "video_url", "video/",
    [".mp4", ".avi", ".mov", ".mkv", ".webm", ".wmv", ".flv", ".mpeg", ".mpg", ".m4v", ".3gp"]
);

url_kind!(
    /// Plain and marked-up text documents.
    Text, "TextUrl", "text_url", "text/",
    [".txt", ".md", ".html", ".htm", ".csv", ".tsv", ".xml", ".log"]
);
