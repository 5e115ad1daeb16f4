//! Configuration for the codecs and for builder-config fallbacks.
//!
//! This module provides:
//!
//! - [`CodecOptions`]: depth bounds and compression level used by the codecs
//! - [`Format`]: which of the two token formats to use
//! - [`ConfigDefaults`]: the single source of fallback attributes applied when a
//!   builder config leaves an attribute unset
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{CodecOptions, ConfigDefaults};
//!
//! let options = CodecOptions::new().with_max_depth(8).with_pointer_depth(3);
//! assert_eq!(options.max_depth, 8);
//!
//! let defaults = ConfigDefaults::new().with_int_bounds(-10, 10);
//! assert_eq!(defaults.int_min, -10);
//! ```

use crate::node::{EnumNode, Node};

/// Token format. The two formats share an alphabet but not a layout, so a decoder
/// must know which one produced a token (or read the tag written by
/// [`crate::transport::encode_tagged`]).
///
/// # Examples
///
/// ```rust
/// use schema_token::Format;
///
/// assert_eq!(Format::Packed.marker(), 'b');
/// assert_eq!(Format::from_marker('z'), Some(Format::Compressed));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    /// Bounded-depth bit-packed meta-schema encoding.
    #[default]
    Packed,
    /// JSON text compressed with raw deflate.
    Compressed,
}

impl Format {
    /// Returns the single-character tag written in front of tagged tokens.
    #[must_use]
    pub const fn marker(&self) -> char {
        match self {
            Format::Packed => 'b',
            Format::Compressed => 'z',
        }
    }

    /// Looks up a format by its tag character.
    #[must_use]
    pub const fn from_marker(marker: char) -> Option<Format> {
        match marker {
            'b' => Some(Format::Packed),
            'z' => Some(Format::Compressed),
            _ => None,
        }
    }
}

/// Configuration options for the codecs.
///
/// # Examples
///
/// ```rust
/// use schema_token::CodecOptions;
///
/// let options = CodecOptions::new();
/// assert_eq!(options.max_depth, 5);
/// assert_eq!(options.pointer_depth, 5);
/// assert_eq!(options.compression_level, 6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CodecOptions {
    /// Number of nesting levels the bit-packed meta-schema supports.
    pub max_depth: usize,
    /// How many times the bit-packing data codec may re-enter a pointer target.
    pub pointer_depth: usize,
    /// Deflate level (0-9) used by the compressed codec.
    pub compression_level: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: 5,
            pointer_depth: 5,
            compression_level: 6,
        }
    }
}

impl CodecOptions {
    /// Creates default options (max depth 5, pointer depth 5, compression level 6).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum tree depth supported by the bit-packed codec.
    ///
    /// Both sides of a token exchange must agree on this value: it changes the
    /// shape of the meta-schema. Values above [`crate::meta::MAX_DEPTH`] make the
    /// bit-packed codec fail with [`crate::Error::OutOfBounds`].
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets how deep pointer targets may be re-entered when packing data.
    #[must_use]
    pub fn with_pointer_depth(mut self, pointer_depth: usize) -> Self {
        self.pointer_depth = pointer_depth;
        self
    }

    /// Sets the deflate level, clamped to 0-9.
    ///
    /// The level is passed to the shared compressor on every call, so options with
    /// different levels can be used side by side.
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }
}

/// Fallback attributes for builder configs that leave attributes unset.
///
/// [`crate::to_wire`] uses [`ConfigDefaults::default`]; [`crate::to_wire_with`]
/// takes any other set.
///
/// # Examples
///
/// ```rust
/// use schema_token::{ConfigDefaults, Node};
///
/// let defaults = ConfigDefaults::default();
/// assert_eq!((defaults.int_min, defaults.int_max), (0, 100));
/// assert_eq!(defaults.optional_inner(), Node::Bool { name: "value".to_string() });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigDefaults {
    pub int_min: i64,
    pub int_max: i64,
    pub fixed_min: f64,
    pub fixed_max: f64,
    pub precision: f64,
    pub enum_options: Vec<String>,
    pub min_length: u32,
    pub max_length: u32,
    pub enum_array_name: String,
    pub discriminator_name: String,
    pub pointer_target: String,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        ConfigDefaults {
            int_min: 0,
            int_max: 100,
            fixed_min: 0.0,
            fixed_max: 100.0,
            precision: 0.1,
            enum_options: vec!["option1".to_string(), "option2".to_string()],
            min_length: 0,
            max_length: 10,
            enum_array_name: "value".to_string(),
            discriminator_name: "type".to_string(),
            pointer_target: String::new(),
        }
    }
}

impl ConfigDefaults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback integer bounds.
    #[must_use]
    pub fn with_int_bounds(mut self, min: i64, max: i64) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Sets the fallback fixed-point bounds and precision.
    #[must_use]
    pub fn with_fixed(mut self, min: f64, max: f64, precision: f64) -> Self {
        self.fixed_min = min;
        self.fixed_max = max;
        self.precision = precision;
        self
    }

    /// Sets the fallback enumeration options.
    #[must_use]
    pub fn with_enum_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the fallback length bounds for arrays and enum arrays.
    #[must_use]
    pub fn with_lengths(mut self, min_length: u32, max_length: u32) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    /// The nested field synthesized for an `Optional` with no inner config.
    #[must_use]
    pub fn optional_inner(&self) -> Node {
        Node::Bool {
            name: "value".to_string(),
        }
    }

    /// The nested field synthesized for an `Array` with no item config.
    #[must_use]
    pub fn array_item(&self) -> Node {
        Node::Int {
            name: "item".to_string(),
            min: self.int_min,
            max: self.int_max,
        }
    }

    /// The enumeration used when an enum array or union has no options configured.
    #[must_use]
    pub fn enumeration(&self, name: &str) -> EnumNode {
        EnumNode {
            name: name.to_string(),
            options: self.enum_options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level_is_clamped() {
        let options = CodecOptions::new().with_compression_level(42);
        assert_eq!(options.compression_level, 9);
    }

    #[test]
    fn test_format_markers_round_trip() {
        for format in [Format::Packed, Format::Compressed] {
            assert_eq!(Format::from_marker(format.marker()), Some(format));
        }
        assert_eq!(Format::from_marker('x'), None);
    }

    #[test]
    fn test_array_item_follows_int_bounds() {
        let defaults = ConfigDefaults::new().with_int_bounds(-5, 5);
        assert_eq!(
            defaults.array_item(),
            Node::Int {
                name: "item".to_string(),
                min: -5,
                max: 5
            }
        );
    }
}
