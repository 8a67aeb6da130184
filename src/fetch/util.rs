//! Body decoding helpers: manual decompression fallback and charset
//! handling for servers that mislabel their responses.

use std::io::Read;

use tracing::debug;

use crate::TARGET_WEB_REQUEST;

/// Decompress a response body, trying brotli first when the server labeled
/// it as such, then gzip, zlib, and deflate. Falls back to the original
/// bytes when nothing applies; reqwest has usually already handled the
/// transfer encoding, this catches double-encoded and mislabeled bodies.
pub fn decompress_body(bytes: &[u8], content_encoding: Option<&str>, url: &str) -> Vec<u8> {
    if content_encoding == Some("br") {
        let mut decoded = Vec::new();
        let mut reader = brotli::Decompressor::new(bytes, 4096);
        if reader.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
            debug!(target: TARGET_WEB_REQUEST, "Decompressed brotli content from {}", url);
            return decoded;
        }
    }

    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut decoded = Vec::new();
    if decoder.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed gzip content from {}", url);
        return decoded;
    }

    let mut decoder = flate2::read::ZlibDecoder::new(bytes);
    let mut decoded = Vec::new();
    if decoder.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed zlib content from {}", url);
        return decoded;
    }

    let mut decoder = flate2::read::DeflateDecoder::new(bytes);
    let mut decoded = Vec::new();
    if decoder.read_to_end(&mut decoded).is_ok() && !decoded.is_empty() {
        debug!(target: TARGET_WEB_REQUEST, "Decompressed deflate content from {}", url);
        return decoded;
    }

    bytes.to_vec()
}

/// Decode body bytes to text, honoring a `charset=` parameter in the
/// Content-Type header when present, lossy UTF-8 otherwise.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = ct.split("charset=").nth(1) {
            let label = charset.split(';').next().unwrap_or(charset).trim();
            if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
                let (text, _, _) = encoding.decode(bytes);
                return text.into_owned();
            }
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}
