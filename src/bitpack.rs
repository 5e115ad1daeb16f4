//! Bit-packing data codec.
//!
//! Packs a [`Value`] against a list of [`Node`]s into the smallest bit string the
//! declared bounds allow, then renders it with [`crate::base64url`]. Nothing about
//! the shape is written: decoding needs the same schema that encoding used.
//!
//! ## Layout
//!
//! Fields are written in declaration order, most significant bit first:
//!
//! | Kind | Bits |
//! |---|---|
//! | `Bool` | 1 |
//! | `Int` | `width(max - min)`, offset from `min` |
//! | `Fixed` | `width(steps(max) - steps(min))`, where a step is `precision` |
//! | `Enum` | `width(options - 1)` |
//! | `Optional` | 1 presence bit, then the inner field if present |
//! | `Array`, `EnumArray` | `width(maxLength - minLength)` for the length, then each item |
//! | `Object` | each field |
//! | `Union` | discriminator as an `Enum`, then the chosen variant's fields |
//! | `Pointer` | the target field's layout |
//!
//! `width(n)` is the number of bits needed to write `n`, so a field whose range
//! holds a single value costs nothing.
//!
//! ## Examples
//!
//! ```rust
//! use schema_token::{bitpack, value, CodecOptions, Node};
//!
//! let schema = vec![
//!     Node::bool("enabled"),
//!     Node::int("count", 0, 100).unwrap(),
//! ];
//! let data = value!({ "enabled": true, "count": 42 });
//!
//! let options = CodecOptions::default();
//! let token = bitpack::encode(&schema, &data, &options).unwrap();
//! assert_eq!(bitpack::decode(&schema, &token, &options).unwrap(), data);
//! ```

use crate::node::{resolve_target, EnumNode, Node};
use crate::{base64url, CodecOptions, Error, Result, Value, ValueMap};

/// Number of bits needed to represent every value in `0..=range`.
#[inline]
#[must_use]
pub const fn width(range: u64) -> u32 {
    u64::BITS - range.leading_zeros()
}

/// Appends bit fields to a byte buffer, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the low `bits` bits of `value`.
    pub fn write(&mut self, value: u64, bits: u32) {
        for shift in (0..bits).rev() {
            if self.bit_len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> shift) & 1 == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// The written bits, zero padded to a whole byte.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Reads bit fields written by [`BitWriter`].
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, position: 0 }
    }

    pub fn read(&mut self, bits: u32) -> Result<u64> {
        if self.remaining() < bits as usize {
            return Err(Error::corrupt_token(
                "",
                format!(
                    "unexpected end of data: needed {} bits at offset {}",
                    bits, self.position
                ),
            ));
        }
        let mut value = 0u64;
        for _ in 0..bits {
            let byte = self.bytes[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | u64::from(bit);
            self.position += 1;
        }
        Ok(value)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }
}

/// Fixed-point values are stored as a whole number of `precision` steps.
///
/// Precisions below one that are reciprocals of whole numbers (0.1, 0.25, 0.001)
/// divide by that whole number when converting back, so decoded values are the
/// closest `f64` to the intended decimal.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Steps {
    precision: f64,
    divisor: Option<f64>,
}

impl Steps {
    pub(crate) fn new(precision: f64) -> Self {
        let inverse = 1.0 / precision;
        let divisor = (precision < 1.0 && (inverse - inverse.round()).abs() < 1e-9)
            .then(|| inverse.round());
        Steps { precision, divisor }
    }

    pub(crate) fn of(&self, value: f64) -> i64 {
        match self.divisor {
            Some(divisor) => (value * divisor).round() as i64,
            None => (value / self.precision).round() as i64,
        }
    }

    pub(crate) fn value(&self, steps: i64) -> f64 {
        match self.divisor {
            Some(divisor) => steps as f64 / divisor,
            None => steps as f64 * self.precision,
        }
    }
}

fn int_range(min: i64, max: i64) -> u64 {
    (i128::from(max) - i128::from(min)) as u64
}

/// Walks a schema alongside a value. `scope` is the whole schema so that pointers
/// can be resolved from anywhere inside it.
struct Packer<'s> {
    scope: &'s [Node],
    pointer_depth: usize,
}

impl<'s> Packer<'s> {
    fn write_fields(
        &self,
        out: &mut BitWriter,
        fields: &[Node],
        object: &ValueMap,
        budget: usize,
    ) -> Result<()> {
        for field in fields {
            let value = object.get(field.name()).unwrap_or(&Value::Null);
            self.write(out, field, value, budget)?;
        }
        Ok(())
    }

    fn write(&self, out: &mut BitWriter, node: &Node, value: &Value, budget: usize) -> Result<()> {
        match node {
            Node::Bool { name } => {
                let b = value
                    .as_bool()
                    .ok_or_else(|| mismatch(name, "bool", value))?;
                out.write(u64::from(b), 1);
            }
            Node::Int { name, min, max } => {
                let v = value.as_i64().ok_or_else(|| mismatch(name, "int", value))?;
                if v < *min || v > *max {
                    return Err(Error::out_of_bounds(
                        name,
                        format!("{} is outside {}..={}", v, min, max),
                    ));
                }
                out.write(int_range(*min, v), width(int_range(*min, *max)));
            }
            Node::Fixed {
                name,
                min,
                max,
                precision,
            } => {
                let v = value.as_f64().ok_or_else(|| mismatch(name, "fixed", value))?;
                let steps = Steps::new(*precision);
                let (low, high, at) = (steps.of(*min), steps.of(*max), steps.of(v));
                if !v.is_finite() || at < low || at > high {
                    return Err(Error::out_of_bounds(
                        name,
                        format!("{} is outside {}..={}", v, min, max),
                    ));
                }
                out.write(int_range(low, at), width(int_range(low, high)));
            }
            Node::Enum(enumeration) => {
                write_option(out, enumeration, value)?;
            }
            Node::Optional { inner, .. } => {
                if value.is_null() {
                    out.write(0, 1);
                } else {
                    out.write(1, 1);
                    self.write(out, inner, value, budget)?;
                }
            }
            Node::Array {
                name,
                min_length,
                max_length,
                item,
            } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| mismatch(name, "array", value))?;
                write_length(out, name, items.len(), *min_length, *max_length)?;
                for element in items {
                    self.write(out, item, element, budget)?;
                }
            }
            Node::EnumArray {
                name,
                min_length,
                max_length,
                enumeration,
            } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| mismatch(name, "array", value))?;
                write_length(out, name, items.len(), *min_length, *max_length)?;
                for element in items {
                    write_option(out, enumeration, element)?;
                }
            }
            Node::Object { name, fields } => {
                let object = value
                    .as_object()
                    .ok_or_else(|| mismatch(name, "object", value))?;
                self.write_fields(out, fields, object, budget)?;
            }
            Node::Union {
                name,
                discriminator,
                variants,
            } => {
                let object = value
                    .as_object()
                    .ok_or_else(|| mismatch(name, "object", value))?;
                let chosen = object
                    .get(&discriminator.name)
                    .unwrap_or(&Value::Null);
                let index = write_option(out, discriminator, chosen)?;
                let fields = variants
                    .get(&discriminator.options[index])
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                self.write_fields(out, fields, object, budget)?;
            }
            Node::Pointer { name, target_name } => {
                let target = self.enter(name, target_name, budget)?;
                self.write(out, target, value, budget - 1)?;
            }
        }
        Ok(())
    }

    fn read_fields(&self, input: &mut BitReader, fields: &[Node], budget: usize) -> Result<ValueMap> {
        let mut object = ValueMap::with_capacity(fields.len());
        for field in fields {
            let value = self.read(input, field, budget)?;
            object.insert(field.name().to_string(), value);
        }
        Ok(object)
    }

    fn read(&self, input: &mut BitReader, node: &Node, budget: usize) -> Result<Value> {
        let value = match node {
            Node::Bool { .. } => Value::Bool(input.read(1)? == 1),
            Node::Int { name, min, max } => {
                let offset = input.read(width(int_range(*min, *max)))?;
                if offset > int_range(*min, *max) {
                    return Err(Error::out_of_bounds(name, format!("offset {} exceeds range", offset)));
                }
                Value::Int((i128::from(*min) + i128::from(offset)) as i64)
            }
            Node::Fixed {
                name,
                min,
                max,
                precision,
            } => {
                let steps = Steps::new(*precision);
                let (low, high) = (steps.of(*min), steps.of(*max));
                let offset = input.read(width(int_range(low, high)))?;
                if offset > int_range(low, high) {
                    return Err(Error::out_of_bounds(name, format!("offset {} exceeds range", offset)));
                }
                Value::Fixed(steps.value((i128::from(low) + i128::from(offset)) as i64))
            }
            Node::Enum(enumeration) => Value::String(read_option(input, enumeration)?.to_string()),
            Node::Optional { inner, .. } => {
                if input.read(1)? == 1 {
                    self.read(input, inner, budget)?
                } else {
                    Value::Null
                }
            }
            Node::Array {
                name,
                min_length,
                max_length,
                item,
            } => {
                let len = read_length(input, name, *min_length, *max_length)?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(self.read(input, item, budget)?);
                }
                Value::Array(items)
            }
            Node::EnumArray {
                name,
                min_length,
                max_length,
                enumeration,
            } => {
                let len = read_length(input, name, *min_length, *max_length)?;
                let mut items = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    items.push(Value::String(read_option(input, enumeration)?.to_string()));
                }
                Value::Array(items)
            }
            Node::Object { fields, .. } => Value::Object(self.read_fields(input, fields, budget)?),
            Node::Union {
                discriminator,
                variants,
                ..
            } => {
                let option = read_option(input, discriminator)?;
                let mut object = ValueMap::new();
                object.insert(discriminator.name.clone(), Value::String(option.to_string()));
                if let Some(fields) = variants.get(option) {
                    for (key, value) in self.read_fields(input, fields, budget)? {
                        object.insert(key, value);
                    }
                }
                Value::Object(object)
            }
            Node::Pointer { name, target_name } => {
                let target = self.enter(name, target_name, budget)?;
                self.read(input, target, budget - 1)?
            }
        };
        Ok(value)
    }

    /// Resolves a pointer and checks that the re-entry budget allows following it.
    fn enter(&self, name: &str, target_name: &str, budget: usize) -> Result<&'s Node> {
        let target = resolve_target(self.scope, target_name)
            .ok_or_else(|| Error::unresolved_pointer(name, target_name))?;
        if budget == 0 {
            return Err(Error::depth_exceeded(
                name,
                self.pointer_depth + 1,
                self.pointer_depth,
            ));
        }
        Ok(target)
    }
}

fn mismatch(field: &str, expected: &str, found: &Value) -> Error {
    Error::invalid_data(field, format!("expected {}, found {}", expected, found.kind()))
}

fn write_option(out: &mut BitWriter, enumeration: &EnumNode, value: &Value) -> Result<usize> {
    let option = value
        .as_str()
        .ok_or_else(|| mismatch(&enumeration.name, "enum option", value))?;
    let index = enumeration.index_of(option).ok_or_else(|| {
        Error::out_of_bounds(
            &enumeration.name,
            format!("`{}` is not one of {:?}", option, enumeration.options),
        )
    })?;
    out.write(index as u64, width(enumeration.options.len() as u64 - 1));
    Ok(index)
}

fn read_option<'e>(input: &mut BitReader, enumeration: &'e EnumNode) -> Result<&'e str> {
    let index = input.read(width(enumeration.options.len() as u64 - 1))?;
    enumeration
        .options
        .get(index as usize)
        .map(String::as_str)
        .ok_or_else(|| {
            Error::corrupt_token(
                "",
                format!(
                    "unknown option index {} for `{}` ({} options)",
                    index,
                    enumeration.name,
                    enumeration.options.len()
                ),
            )
        })
}

fn write_length(
    out: &mut BitWriter,
    name: &str,
    len: usize,
    min_length: u32,
    max_length: u32,
) -> Result<()> {
    if len < min_length as usize || len > max_length as usize {
        return Err(Error::out_of_bounds(
            name,
            format!("length {} is outside {}..={}", len, min_length, max_length),
        ));
    }
    out.write(
        (len - min_length as usize) as u64,
        width(u64::from(max_length - min_length)),
    );
    Ok(())
}

fn read_length(input: &mut BitReader, name: &str, min_length: u32, max_length: u32) -> Result<usize> {
    let offset = input.read(width(u64::from(max_length - min_length)))?;
    let len = u64::from(min_length) + offset;
    if len > u64::from(max_length) {
        return Err(Error::out_of_bounds(
            name,
            format!("length {} exceeds maxLength {}", len, max_length),
        ));
    }
    Ok(len as usize)
}

/// Packs `data` (an object keyed by top-level field name) into raw bytes.
pub fn pack(schema: &[Node], data: &Value, options: &CodecOptions) -> Result<Vec<u8>> {
    let object = data
        .as_object()
        .ok_or_else(|| mismatch("<root>", "object", data))?;
    let packer = Packer {
        scope: schema,
        pointer_depth: options.pointer_depth,
    };
    let mut out = BitWriter::new();
    packer.write_fields(&mut out, schema, object, options.pointer_depth)?;
    tracing::trace!(bits = out.bit_len(), "packed data");
    Ok(out.into_bytes())
}

/// Reverses [`pack`]. Whole unread bytes left over are treated as corruption.
pub fn unpack(schema: &[Node], bytes: &[u8], options: &CodecOptions) -> Result<Value> {
    let packer = Packer {
        scope: schema,
        pointer_depth: options.pointer_depth,
    };
    let mut input = BitReader::new(bytes);
    let object = packer.read_fields(&mut input, schema, options.pointer_depth)?;
    if input.remaining() >= 8 {
        return Err(Error::corrupt_token(
            "",
            format!("{} trailing bits after the last field", input.remaining()),
        ));
    }
    Ok(Value::Object(object))
}

/// Encodes `data` against `schema` into a URL-safe token.
pub fn encode(schema: &[Node], data: &Value, options: &CodecOptions) -> Result<String> {
    let token = base64url::encode(&pack(schema, data, options)?);
    tracing::debug!(fields = schema.len(), token_len = token.len(), "encoded data token");
    Ok(token)
}

/// Decodes a token produced by [`encode`] with the same schema.
pub fn decode(schema: &[Node], token: &str, options: &CodecOptions) -> Result<Value> {
    let result = base64url::decode(token).and_then(|bytes| unpack(schema, &bytes, options));
    result.map_err(|e| {
        let e = e.in_token(token);
        tracing::warn!(error = %e, "failed to decode data token");
        e
    })
}

/// Checks that `data` fits `schema` without producing a token.
pub fn validate(schema: &[Node], data: &Value, options: &CodecOptions) -> Result<()> {
    pack(schema, data, options).map(|_| ())
}
