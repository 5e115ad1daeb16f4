//! Error types for schema construction, token encoding and token decoding.
//!
//! Every fallible operation in this crate returns [`Result`], and every failure is
//! one of the [`Error`] variants below. Nothing is retried internally.
//!
//! ## Error Categories
//!
//! - **Construction**: a node carries invalid attributes (`min > max`, empty enum, ...)
//! - **Unresolved pointers**: a `Pointer` names a field that does not exist in the schema
//! - **Depth**: a node tree is deeper than the bit-packed codec's configured bound
//! - **Corrupt tokens**: malformed base64url, bad table indices, unknown discriminators,
//!   truncated bit streams; the offending token is echoed for diagnostics
//! - **Compression**: the shared compressor failed while encoding
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{decode_packed, Error};
//!
//! let result = decode_packed("not a token!");
//! match result {
//!     Err(Error::CorruptToken { token, .. }) => assert_eq!(token, "not a token!"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while building, encoding or decoding schemas.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// A node was built with invalid attributes.
    #[error("Invalid field `{field}`: {msg}")]
    Construction { field: String, msg: String },

    /// A pointer's target could not be found in the enclosing schema.
    #[error("Pointer `{field}` refers to unknown field `{target}`")]
    UnresolvedPointer { field: String, target: String },

    /// The node tree (or pointer unrolling) is deeper than the configured bound.
    #[error("Field `{field}` has depth {depth}, exceeding the configured maximum depth of {max_depth}")]
    DepthExceeded {
        field: String,
        depth: usize,
        max_depth: usize,
    },

    /// The token could not be decoded.
    #[error("Corrupt token: {reason}\nToken: {token}")]
    CorruptToken { token: String, reason: String },

    /// The shared compressor failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// A data value falls outside the bounds its field declares.
    #[error("Value for `{field}` is out of bounds: {msg}")]
    OutOfBounds { field: String, msg: String },

    /// A data value does not have the shape its field declares.
    #[error("Invalid data for `{field}`: {msg}")]
    InvalidData { field: String, msg: String },

    /// A string cannot be stored in the string table.
    #[error("String table error: {0}")]
    StringTable(String),

    /// JSON text could not be produced or parsed.
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Generic message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates a construction error for the named field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schema_token::Error;
    ///
    /// let err = Error::construction("count", "min must not exceed max");
    /// assert!(err.to_string().contains("`count`"));
    /// ```
    pub fn construction(field: &str, msg: &str) -> Self {
        Error::Construction {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates an unresolved pointer error.
    pub fn unresolved_pointer(field: &str, target: &str) -> Self {
        Error::UnresolvedPointer {
            field: field.to_string(),
            target: target.to_string(),
        }
    }

    /// Creates a depth error. The message always states the configured bound.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schema_token::Error;
    ///
    /// let err = Error::depth_exceeded("tree", 7, 5);
    /// assert!(err.to_string().contains("maximum depth of 5"));
    /// ```
    pub fn depth_exceeded(field: &str, depth: usize, max_depth: usize) -> Self {
        Error::DepthExceeded {
            field: field.to_string(),
            depth,
            max_depth,
        }
    }

    /// Creates a corrupt-token error echoing the offending token.
    pub fn corrupt_token<T: fmt::Display>(token: &str, reason: T) -> Self {
        Error::CorruptToken {
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a bounds error for a data value.
    pub fn out_of_bounds<T: fmt::Display>(field: &str, msg: T) -> Self {
        Error::OutOfBounds {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a data-shape error.
    pub fn invalid_data<T: fmt::Display>(field: &str, msg: T) -> Self {
        Error::InvalidData {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a compression error.
    pub fn compression<T: fmt::Display>(msg: T) -> Self {
        Error::Compression(msg.to_string())
    }

    /// Creates a string table error.
    pub fn string_table<T: fmt::Display>(msg: T) -> Self {
        Error::StringTable(msg.to_string())
    }

    /// Creates a generic error with a display message.
    pub fn message<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Attaches `token` to errors raised while reading it.
    ///
    /// Structural failures (truncated streams, bad indices, unknown discriminators,
    /// bound violations) become [`Error::CorruptToken`]. Semantic failures such as
    /// unresolved pointers or invalid nodes keep their own variant.
    pub(crate) fn in_token(self, token: &str) -> Self {
        match self {
            Error::CorruptToken { reason, .. } => Error::corrupt_token(token, reason),
            Error::OutOfBounds { field, msg } | Error::InvalidData { field, msg } => {
                Error::corrupt_token(token, format!("`{}`: {}", field, msg))
            }
            Error::StringTable(msg) | Error::Json(msg) | Error::Message(msg) => {
                Error::corrupt_token(token, msg)
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
