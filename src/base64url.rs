//! URL-safe base64 without padding.
//!
//! Both token formats end up as bytes rendered with this module. Bytes are fed
//! into a bit accumulator most-significant bit first; every complete group of six
//! bits becomes one symbol of [`ALPHABET`], and a final partial group is padded
//! with zero bits on the right. No `=` is ever written or accepted.

use crate::{Error, Result};

/// URL-safe base64 alphabet (uses `-` and `_` instead of `+` and `/`).
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const INVALID: u8 = 0xFF;

const REVERSE: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Returns `true` if `c` belongs to [`ALPHABET`].
#[must_use]
pub fn is_alphabet(c: char) -> bool {
    c.is_ascii() && REVERSE[c as usize] != INVALID
}

/// Encodes bytes as URL-safe base64 with no padding.
///
/// # Examples
///
/// ```rust
/// use schema_token::base64url;
///
/// assert_eq!(base64url::encode(b"hello world"), "aGVsbG8gd29ybGQ");
/// assert_eq!(base64url::encode(&[0xFB, 0xFF]), "-_8");
/// ```
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity((bytes.len() * 4 + 2) / 3);
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    for &byte in bytes {
        bits = (bits << 8) | u32::from(byte);
        bit_count += 8;
        while bit_count >= 6 {
            bit_count -= 6;
            out.push(ALPHABET[((bits >> bit_count) & 0x3F) as usize] as char);
        }
        bits &= (1 << bit_count) - 1;
    }
    if bit_count > 0 {
        out.push(ALPHABET[((bits << (6 - bit_count)) & 0x3F) as usize] as char);
    }
    out
}

/// Decodes URL-safe base64. Trailing bits that do not complete a byte are dropped.
///
/// # Examples
///
/// ```rust
/// use schema_token::base64url;
///
/// assert_eq!(base64url::decode("aGVsbG8gd29ybGQ").unwrap(), b"hello world");
/// assert!(base64url::decode("aGVsbG8=").is_err());
/// ```
pub fn decode(token: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(token.len() * 3 / 4);
    let mut bits: u32 = 0;
    let mut bit_count: u32 = 0;
    for (position, c) in token.char_indices() {
        if !is_alphabet(c) {
            return Err(Error::corrupt_token(
                token,
                format!("invalid character {:?} at position {}", c, position),
            ));
        }
        bits = (bits << 6) | u32::from(REVERSE[c as usize]);
        bit_count += 6;
        if bit_count >= 8 {
            bit_count -= 8;
            out.push(((bits >> bit_count) & 0xFF) as u8);
            bits &= (1 << bit_count) - 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let cases: [(&[u8], &str); 6] = [
            (b"", ""),
            (b"f", "Zg"),
            (b"fo", "Zm8"),
            (b"foo", "Zm9v"),
            (b"foob", "Zm9vYg"),
            (b"fooba", "Zm9vYmE"),
        ];
        for (bytes, text) in cases {
            assert_eq!(encode(bytes), text);
            assert_eq!(decode(text).unwrap(), bytes);
        }
    }

    #[test]
    fn test_all_byte_values() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = encode(&bytes);
        assert!(text.chars().all(is_alphabet));
        assert_eq!(decode(&text).unwrap(), bytes);
    }

    #[test]
    fn test_rejects_foreign_characters() {
        for bad in ["ab+c", "ab/c", "abc=", "ab c", "é"] {
            let err = decode(bad).unwrap_err();
            match err {
                Error::CorruptToken { token, .. } => assert_eq!(token, bad),
                other => panic!("Expected corrupt token, got {:?}", other),
            }
        }
    }
}
