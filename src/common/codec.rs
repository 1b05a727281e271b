use std::borrow::Cow;
use std::io::Read;

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::GatewayError;

/// Decodes `body` according to its `content-encoding` value.
///
/// The input is never modified. Identity bodies are borrowed, compressed ones are
/// inflated into a fresh buffer; a corrupt stream is an error, never a partial body.
pub fn decode_body<'a>(body: &'a [u8], encoding: &str) -> Result<Cow<'a, [u8]>, GatewayError> {
    match encoding {
        "" | "identity" => Ok(Cow::Borrowed(body)),
        "gzip" => inflate(GzDecoder::new(body), encoding).map(Cow::Owned),
        "deflate" => inflate(ZlibDecoder::new(body), encoding).map(Cow::Owned),
        other => Err(GatewayError::UnsupportedEncoding(other.to_string())),
    }
}

fn inflate<R: Read>(mut decoder: R, encoding: &str) -> Result<Vec<u8>, GatewayError> {
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).map_err(|source| GatewayError::MalformedBody {
        encoding: encoding.to_string(),
        source,
    })?;
    Ok(decoded)
}
