//! Content-encoding codecs.
//!
//! # Responsibilities
//! - Decode and encode bodies for `gzip`, `deflate` and `br`
//! - Treat an empty or `identity` encoding as a no-op
//!
//! # Design Decisions
//! - Unknown encodings are fatal: a silently mis-decoded body would
//!   corrupt every script analysed from it
//! - `deflate` is the zlib-wrapped stream, as HTTP defines it

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use super::HttpError;

const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_WINDOW: u32 = 22;

/// Supported `content-encoding` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
}

impl ContentEncoding {
    /// Interpret a header value; `None` means identity.
    pub fn from_header(value: Option<&str>) -> Result<Self, HttpError> {
        let value = value.map(|v| v.trim().to_ascii_lowercase()).unwrap_or_default();
        match value.as_str() {
            "" | "identity" => Ok(Self::Identity),
            "gzip" | "x-gzip" => Ok(Self::Gzip),
            "deflate" => Ok(Self::Deflate),
            "br" => Ok(Self::Brotli),
            _ => Err(HttpError::UnsupportedContentEncoding(value)),
        }
    }

    /// Undo this encoding.
    pub fn decode(self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        let mut out = Vec::new();
        match self {
            Self::Identity => return Ok(input.to_vec()),
            Self::Gzip => GzDecoder::new(input).read_to_end(&mut out),
            Self::Deflate => ZlibDecoder::new(input).read_to_end(&mut out),
            Self::Brotli => brotli::Decompressor::new(input, BROTLI_BUFFER_SIZE).read_to_end(&mut out),
        }
        .map_err(|source| HttpError::Codec { encoding: self, source })?;
        Ok(out)
    }

    /// Apply this encoding.
    pub fn encode(self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        let codec_err = |source| HttpError::Codec { encoding: self, source };
        match self {
            Self::Identity => Ok(input.to_vec()),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(input).map_err(codec_err)?;
                encoder.finish().map_err(codec_err)
            }
            Self::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(input).map_err(codec_err)?;
                encoder.finish().map_err(codec_err)
            }
            Self::Brotli => {
                let mut encoder = brotli::CompressorWriter::new(
                    Vec::new(),
                    BROTLI_BUFFER_SIZE,
                    BROTLI_QUALITY,
                    BROTLI_WINDOW,
                );
                encoder.write_all(input).map_err(codec_err)?;
                encoder.flush().map_err(codec_err)?;
                Ok(encoder.into_inner())
            }
        }
    }
}

impl std::fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Brotli => "br",
        };
        f.write_str(name)
    }
}
