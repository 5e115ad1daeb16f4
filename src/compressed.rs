//! Compressed schema tokens.
//!
//! The schema is written as JSON, compressed with raw deflate and rendered with
//! [`crate::base64url`]. There is no depth bound and no meta-schema version, so
//! this path keeps working for any tree the grammar can express. Tokens are
//! larger than bit-packed ones and both directions are `async`.
//!
//! All callers share one [`Deflate`] instance. It is created on first use behind a
//! [`tokio::sync::OnceCell`]; callers that arrive while it is being created wait for
//! that same initialization. It lives for the rest of the process.
//!
//! ```rust
//! # tokio_test_block(async {
//! use schema_token::{compressed, CodecOptions, Node};
//!
//! let fields = vec![Node::bool("enabled")];
//! let token = compressed::encode_schema("flags", &fields, &CodecOptions::default())
//!     .await
//!     .unwrap();
//! let schema = compressed::decode_schema(&token).await.unwrap();
//! assert_eq!(schema.fields, fields);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::io::{Read, Write};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use tokio::sync::OnceCell;

use crate::node::{Node, Schema};
use crate::{base64url, CodecOptions, Error, Result};

/// Largest inflated payload a compressed token may expand to.
pub const MAX_INFLATED_LEN: usize = 4 * 1024 * 1024;

static COMPRESSOR: OnceCell<Deflate> = OnceCell::const_new();
#[cfg(test)]
static INITIALIZATIONS: AtomicUsize = AtomicUsize::new(0);

/// Process-wide raw deflate compressor.
#[derive(Debug)]
pub struct Deflate {
    max_output: usize,
}

impl Deflate {
    async fn init() -> Deflate {
        #[cfg(test)]
        INITIALIZATIONS.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(max_output = MAX_INFLATED_LEN, "initialized shared deflate compressor");
        Deflate {
            max_output: MAX_INFLATED_LEN,
        }
    }

    /// Compresses `bytes` at `level` (0-9).
    pub async fn compress(&self, bytes: &[u8], level: u32) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level.min(9)));
        encoder.write_all(bytes).map_err(Error::compression)?;
        encoder.finish().map_err(Error::compression)
    }

    /// Inflates bytes produced by [`Deflate::compress`].
    ///
    /// Output longer than [`MAX_INFLATED_LEN`] is rejected.
    pub async fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        DeflateDecoder::new(bytes)
            .take(self.max_output as u64 + 1)
            .read_to_end(&mut out)
            .map_err(Error::compression)?;
        if out.len() > self.max_output {
            return Err(Error::compression(format!(
                "inflated data exceeds {} bytes",
                self.max_output
            )));
        }
        Ok(out)
    }
}

/// Returns the shared compressor, creating it on the first call.
pub async fn shared_compressor() -> &'static Deflate {
    COMPRESSOR.get_or_init(Deflate::init).await
}

/// Encodes a schema into a compressed token.
pub async fn encode_schema(name: &str, fields: &[Node], options: &CodecOptions) -> Result<String> {
    let schema = Schema::new(name, fields.to_vec());
    schema.validate()?;
    let json = serde_json::to_vec(&schema)?;
    let compressed = shared_compressor()
        .await
        .compress(&json, options.compression_level)
        .await?;
    let token = base64url::encode(&compressed);
    tracing::debug!(
        schema = name,
        fields = fields.len(),
        depth = schema.depth(),
        json_len = json.len(),
        token_len = token.len(),
        "encoded compressed schema token"
    );
    Ok(token)
}

/// Decodes a token produced by [`encode_schema`].
///
/// Bad characters, undecodable deflate streams and malformed JSON all surface as
/// [`Error::CorruptToken`].
pub async fn decode_schema(token: &str) -> Result<Schema> {
    let result = read_schema(token).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, token_len = token.len(), "compressed schema token rejected");
    }
    result
}

async fn read_schema(token: &str) -> Result<Schema> {
    let bytes = base64url::decode(token)?;
    let json = shared_compressor()
        .await
        .decompress(&bytes)
        .await
        .map_err(|e| Error::corrupt_token(token, e))?;
    let schema: Schema =
        serde_json::from_slice(&json).map_err(|e| Error::corrupt_token(token, e))?;
    schema.validate()?;
    schema.resolve_pointers()?;
    tracing::debug!(
        schema = %schema.name,
        fields = schema.fields.len(),
        token_len = token.len(),
        "decoded compressed schema token"
    );
    Ok(schema)
}
