//! `dt-proto` - protobuf wire messages shared by the typed field crates.
//!
//! The messages are declared with `prost` derives instead of generated from a
//! `.proto` file, so no `protoc` is required at build time.

pub mod error;
pub mod messages;

pub use error::{ProtoError, Result};
pub use messages::{node_proto, DenseNdArrayProto, NdArrayProto, NodeProto};
