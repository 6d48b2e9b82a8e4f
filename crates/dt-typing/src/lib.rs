//! `dt-typing` - the seam between a document schema engine and the field
//! types in `dt-tensor` and `dt-url`.
//!
//! A schema declares each field with a [`FieldType`]; [`validate_field`]
//! turns raw input into a [`FieldValue`], and [`FieldValue::decode`] rebuilds
//! values from the wire by looking their discriminator up in the
//! [`registry`].

pub mod config;
pub mod error;
pub mod field;
pub mod registry;

pub use config::TypingConfig;
pub use error::{Result, ValidationError};
pub use field::{validate_field, FieldInput, FieldType, FieldValue, UrlType};
