//! Gzip helpers for request and response bodies.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, ErrorKind, Result};

/// Content coding token used in `content-encoding` / `accept-encoding`.
pub const GZIP: &str = "gzip";

/// Gzip-compress a buffer.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::with_source(ErrorKind::Compression(e.to_string()), e))?;
    encoder
        .finish()
        .map_err(|e| Error::with_source(ErrorKind::Compression(e.to_string()), e))
}

/// Decompress a gzip buffer.
pub fn gunzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::with_source(ErrorKind::Compression(e.to_string()), e))?;
    Ok(out)
}

/// Returns true if a `content-encoding` header value names gzip.
pub fn is_gzip(content_encoding: &str) -> bool {
    content_encoding
        .split(',')
        .any(|coding| coding.trim().eq_ignore_ascii_case(GZIP))
}
