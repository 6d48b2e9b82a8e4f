//! `dt-url` - URL field types that reference a specific kind of media.
//!
//! A value is checked in stages: relative paths are resolved, the text is
//! parsed against a relaxed URL grammar, the mime type is detected from the
//! extension (or, for HTTP URLs, by probing the server), and finally the
//! media family or the extension list must agree with the field kind.

pub mod config;
pub mod error;
pub mod grammar;
pub mod kind;
pub mod mime;
pub mod url;

pub use config::{UrlConfig, USER_AGENT};
pub use error::{Result, UrlError};
pub use grammar::{UrlParts, MAX_URL_LENGTH};
pub use kind::{Audio, Image, Text, UrlKind, Video};
pub use url::{AudioUrl, ImageUrl, Location, TextUrl, Url, VideoUrl};
