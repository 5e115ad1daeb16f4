//! Token Layouts
//!
//! This module documents the two schema token formats produced by this library.
//! It contains no code.
//!
//! # Overview
//!
//! A schema token is a URL-safe string that carries a schema name and its ordered
//! list of fields. Both formats use the same 64-symbol alphabet and never write
//! padding:
//!
//! ```text
//! A-Z a-z 0-9 - _
//! ```
//!
//! Neither format describes itself. A decoder must be told which one it is looking
//! at, or the token must carry the one-character marker written by
//! [`crate::transport::encode_tagged`]:
//!
//! | Marker | Format |
//! |---|---|
//! | `b` | bit-packed ([`crate::meta`]) |
//! | `z` | compressed ([`crate::compressed`]) |
//!
//! # Base64url
//!
//! Bytes are fed into a bit accumulator most significant bit first. Every time six
//! or more bits are buffered, the top six are emitted as one symbol. Leftover bits
//! at the end are shifted left to fill a final symbol. Decoding reverses this and
//! drops trailing bits that do not complete a byte.
//!
//! ```text
//! "hello world"  ->  aGVsbG8gd29ybGQ
//! ```
//!
//! # Bit-packed layout
//!
//! The schema is described as data and packed against the meta-schema. Values are
//! written most significant bit first with the minimum number of bits their range
//! needs: `width(n)` is the number of bits required to write `n`, and `0` for a
//! range of one value.
//!
//! | Node | Bits |
//! |---|---|
//! | bool | 1 |
//! | int | `width(max - min)`, offset from `min` |
//! | fixed | `width(steps)`, steps of `precision` from `min` |
//! | enum | `width(options - 1)` |
//! | optional | 1 presence bit, then the inner value |
//! | array, enumArray | length as `width(maxLength - minLength)`, then each item |
//! | object | each field in declaration order |
//! | union | discriminator index, then the chosen variant's fields |
//! | pointer | the target's layout, at most `pointer_depth` times |
//!
//! The meta-schema payload is:
//!
//! ```text
//! meta      object  { version: int 0..=255 }          currently 1
//! fields    array   0..=255 of node@1
//! strings   array   0..=65535 of int 0..=255          string table bytes
//! ```
//!
//! `node@L` is a union on `kind`. At the innermost level (`L == max_depth`) only
//! `bool int fixed enum enumArray pointer` are offered; above it all ten kinds are.
//! Every variant starts with `name`, a string-table index (`0..=4095`):
//!
//! | kind | payload after `name` |
//! |---|---|
//! | bool | |
//! | int | `min`, `max` within i32 |
//! | fixed | `min`, `max` within ±1e9, `precision` within 1e-4..=1e6, all at 1e-4 |
//! | enum | `options`: 1..=256 indices |
//! | optional | `inner`: node@L+1 |
//! | array | `minLength`, `maxLength` (0..=65535), `item`: node@L+1 |
//! | enumArray | `minLength`, `maxLength`, `enumName` index, `options` |
//! | object | `fields`: 0..=255 of node@L+1 |
//! | union | `discriminatorName` index, `options`, `variants`: one field list per option |
//! | pointer | `targetName` index |
//!
//! ## String table
//!
//! Entry 0 is the schema name. Further entries appear in the order a pre-order walk
//! of the fields first meets them: a node's own name, then its enumeration name and
//! options, then its children. Each distinct string is stored once. The table is
//! written as its entries joined with `U+001F`, as UTF-8. An empty table writes no
//! bytes and reads back as a single empty entry.
//!
//! # Compressed layout
//!
//! ```text
//! base64url( deflate_raw( json({ "name": ..., "fields": [...] }) ) )
//! ```
//!
//! Nodes use the same JSON shape as schema files, tagged by `type`:
//!
//! ```json
//! { "type": "array", "name": "scores", "minLength": 0, "maxLength": 10,
//!   "item": { "type": "int", "name": "score", "min": 0, "max": 100 } }
//! ```
//!
//! There is no depth bound and no version field.
