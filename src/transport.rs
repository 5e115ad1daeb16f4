//! The function pairs callers use to turn `(name, fields)` into a token and back.
//!
//! [`packed`] and [`compressed`] produce untagged tokens: the caller has to know
//! which decoder to use. [`encode_tagged`] prefixes a one-character [`Format`]
//! marker so [`decode_tagged`] can dispatch on its own.
//!
//! ```rust
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use schema_token::transport::{decode_tagged, encode_tagged};
//! use schema_token::{CodecOptions, Format, Node};
//!
//! let options = CodecOptions::default();
//! let fields = vec![Node::int("count", 0, 100).unwrap()];
//!
//! let token = encode_tagged(Format::Packed, "counter", &fields, &options).await.unwrap();
//! assert!(token.starts_with('b'));
//! let schema = decode_tagged(&token, &options).await.unwrap();
//! assert_eq!(schema.fields, fields);
//! # });
//! ```

use crate::node::{Node, Schema};
use crate::{CodecOptions, Error, Format, Result};

/// Bit-packed tokens against the meta-schema.
pub mod packed {
    use super::*;

    pub fn encode(name: &str, fields: &[Node], options: &CodecOptions) -> Result<String> {
        crate::meta::encode_schema(name, fields, options)
    }

    pub fn decode(token: &str, options: &CodecOptions) -> Result<Schema> {
        let result = crate::meta::decode_schema(token, options);
        if let Err(e) = &result {
            tracing::warn!(error = %e, token_len = token.len(), "packed schema token rejected");
        }
        result
    }
}

/// Deflate-compressed JSON tokens.
pub mod compressed {
    use super::*;

    pub async fn encode(name: &str, fields: &[Node], options: &CodecOptions) -> Result<String> {
        crate::compressed::encode_schema(name, fields, options).await
    }

    pub async fn decode(token: &str) -> Result<Schema> {
        crate::compressed::decode_schema(token).await
    }
}

/// Encodes with `format` and prefixes its marker character.
pub async fn encode_tagged(
    format: Format,
    name: &str,
    fields: &[Node],
    options: &CodecOptions,
) -> Result<String> {
    let body = match format {
        Format::Packed => packed::encode(name, fields, options)?,
        Format::Compressed => compressed::encode(name, fields, options).await?,
    };
    let mut token = String::with_capacity(body.len() + 1);
    token.push(format.marker());
    token.push_str(&body);
    Ok(token)
}

/// Decodes a token produced by [`encode_tagged`].
///
/// Errors from the inner codec echo the whole tagged token.
pub async fn decode_tagged(token: &str, options: &CodecOptions) -> Result<Schema> {
    let mut chars = token.chars();
    let format = chars
        .next()
        .and_then(Format::from_marker)
        .ok_or_else(|| Error::corrupt_token(token, "missing or unknown format marker"))?;
    let body = chars.as_str();
    let result = match format {
        Format::Packed => packed::decode(body, options),
        Format::Compressed => compressed::decode(body).await,
    };
    result.map_err(|e| match e {
        Error::CorruptToken { reason, .. } => Error::corrupt_token(token, reason),
        other => other,
    })
}
