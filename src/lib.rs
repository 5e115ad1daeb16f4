//! # schema_token
//!
//! Describe a data shape, then turn that description into a short URL-safe token
//! that can be rebuilt exactly later.
//!
//! ## What is a schema?
//!
//! A schema is a name plus an ordered list of [`Node`]s. The field grammar covers
//! booleans, bounded integers, fixed-point numbers, enumerations, optional values,
//! bounded arrays, enumeration arrays, objects, discriminated unions, and named
//! pointers back to another field for bounded self-reference.
//!
//! ## Key Features
//!
//! - **Two token formats**: a bit-packed format that is as small as possible but
//!   bounded in depth, and a compressed JSON format with no bound
//! - **String table**: every name and option is written once per token
//! - **Builder configs**: [`FieldConfig`] is the loose, editor-facing form of a node,
//!   with [`to_wire`] and [`to_config`] converting between the two
//! - **Defaults**: [`default_value`] derives the initial data for any node
//! - **Data codec**: [`bitpack`] packs data that matches a schema
//!
//! ## Quick Start
//!
//! ```rust
//! use schema_token::{decode_packed, encode_packed, Node};
//!
//! let fields = vec![
//!     Node::bool("enabled"),
//!     Node::int("count", 0, 100).unwrap(),
//! ];
//!
//! let token = encode_packed("settings", &fields).unwrap();
//! let schema = decode_packed(&token).unwrap();
//! assert_eq!(schema.name, "settings");
//! assert_eq!(schema.fields, fields);
//! ```
//!
//! ### Packing data against a schema
//!
//! ```rust
//! use schema_token::{bitpack, value, CodecOptions, Node};
//!
//! let fields = vec![
//!     Node::enumeration("status", ["pending", "active", "completed"]).unwrap(),
//!     Node::optional("note", Node::int("score", 0, 10).unwrap()),
//! ];
//! let data = value!({"status": "active", "note": 7});
//!
//! let options = CodecOptions::default();
//! let token = bitpack::encode(&fields, &data, &options).unwrap();
//! assert_eq!(bitpack::decode(&fields, &token, &options).unwrap(), data);
//! ```
//!
//! ### Editing with builder configs
//!
//! ```rust
//! use schema_token::{to_config, to_wire, ConfigKind, FieldConfig, Node};
//!
//! let config = FieldConfig::new("count", ConfigKind::Int { min: None, max: Some(50) });
//! assert_eq!(to_wire(&config), Node::int("count", 0, 50).unwrap());
//!
//! let back = to_config(&to_wire(&config));
//! assert_eq!(back.name, "count");
//! ```
//!
//! ## Errors
//!
//! Everything returns [`Result`]. Decoders report malformed input as
//! [`Error::CorruptToken`] with the offending token attached, so callers can log it
//! and fall back to [`default_object`].
//!
//! ## Logging
//!
//! Codecs emit [`tracing`] events at `debug` and `trace` level and a `warn` when a
//! token is rejected. No subscriber is installed.

pub mod base64url;
pub mod bitpack;
pub mod compressed;
pub mod config;
pub mod defaults;
pub mod error;
pub mod macros;
pub mod map;
pub mod meta;
pub mod node;
pub mod options;
pub mod schema_file;
pub mod strings;
pub mod transport;
pub mod value;
pub mod wire;

pub use config::{to_config, to_wire, to_wire_with, ConfigKind, FieldConfig};
pub use defaults::{default_object, default_value, default_when_present};
pub use error::{Error, Result};
pub use map::ValueMap;
pub use node::{EnumNode, Node, NodeKind, Schema};
pub use options::{CodecOptions, ConfigDefaults, Format};
pub use schema_file::SchemaFile;
pub use strings::StringTable;
pub use value::Value;

/// Encode a schema as a bit-packed token with default options.
///
/// # Examples
///
/// ```rust
/// use schema_token::{encode_packed, Node};
///
/// let token = encode_packed("flags", &[Node::bool("enabled")]).unwrap();
/// assert!(token.chars().all(schema_token::base64url::is_alphabet));
/// ```
///
/// # Errors
///
/// Returns an error if a node is invalid or the tree is deeper than
/// [`CodecOptions::max_depth`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_packed(name: &str, fields: &[Node]) -> Result<String> {
    encode_packed_with_options(name, fields, &CodecOptions::default())
}

/// Encode a schema as a bit-packed token with custom options.
///
/// A token must be decoded with the same `max_depth` it was encoded with.
///
/// # Errors
///
/// Returns an error if a node is invalid or the tree is too deep.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode_packed_with_options(
    name: &str,
    fields: &[Node],
    options: &CodecOptions,
) -> Result<String> {
    transport::packed::encode(name, fields, options)
}

/// Decode a bit-packed token with default options.
///
/// # Examples
///
/// ```rust
/// use schema_token::{decode_packed, encode_packed, Node};
///
/// let fields = vec![Node::int("count", 0, 100).unwrap()];
/// let schema = decode_packed(&encode_packed("c", &fields).unwrap()).unwrap();
/// assert_eq!(schema.fields, fields);
/// ```
///
/// # Errors
///
/// Returns [`Error::CorruptToken`] for malformed tokens and
/// [`Error::UnresolvedPointer`] for pointers with no target.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_packed(token: &str) -> Result<Schema> {
    decode_packed_with_options(token, &CodecOptions::default())
}

/// Decode a bit-packed token with custom options.
///
/// # Errors
///
/// Returns an error if the token is malformed or was written with another
/// `max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode_packed_with_options(token: &str, options: &CodecOptions) -> Result<Schema> {
    transport::packed::decode(token, options)
}

/// Encode a schema as a compressed token.
///
/// # Errors
///
/// Returns an error if a node is invalid or compression fails.
pub async fn encode_compressed(name: &str, fields: &[Node]) -> Result<String> {
    transport::compressed::encode(name, fields, &CodecOptions::default()).await
}

/// Decode a compressed token.
///
/// # Errors
///
/// Returns [`Error::CorruptToken`] for malformed tokens and
/// [`Error::UnresolvedPointer`] for pointers with no target.
pub async fn decode_compressed(token: &str) -> Result<Schema> {
    transport::compressed::decode(token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_round_trip() {
        let fields = vec![
            Node::bool("enabled"),
            Node::array("scores", 0, 10, Node::int("score", 0, 100).unwrap()).unwrap(),
        ];
        let token = encode_packed("game", &fields).unwrap();
        let schema = decode_packed(&token).unwrap();
        assert_eq!(schema, Schema::new("game", fields));
    }

    #[test]
    fn test_packed_with_options() {
        let options = CodecOptions::new().with_max_depth(2);
        let fields = vec![Node::optional("o", Node::bool("b"))];
        let token = encode_packed_with_options("s", &fields, &options).unwrap();
        assert_eq!(
            decode_packed_with_options(&token, &options).unwrap().fields,
            fields
        );
    }

    #[tokio::test]
    async fn test_compressed_round_trip() {
        let fields = vec![Node::fixed("ratio", 0.0, 1.0, 0.01).unwrap()];
        let token = encode_compressed("r", &fields).await.unwrap();
        assert_eq!(decode_compressed(&token).await.unwrap().fields, fields);
    }

    #[test]
    fn test_empty_schema() {
        let token = encode_packed("empty", &[]).unwrap();
        let schema = decode_packed(&token).unwrap();
        assert_eq!(schema.name, "empty");
        assert!(schema.fields.is_empty());
    }
}
