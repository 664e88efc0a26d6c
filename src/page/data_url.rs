//! `data:` URL payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("not a data: URL")]
    NotDataUrl,

    #[error("data: URL has no ',' separator")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode the payload of a `data:[<mediatype>][;base64],<data>` URL.
///
/// Any fragment is ignored.
pub fn decode_data_url(url: &Url) -> Result<Vec<u8>, DataUrlError> {
    if url.scheme() != "data" {
        return Err(DataUrlError::NotDataUrl);
    }
    let mut rest = &url.as_str()["data:".len()..];
    if let Some(hash) = rest.find('#') {
        rest = &rest[..hash];
    }

    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingSeparator)?;
    let bytes: Vec<u8> = percent_decode_str(payload).collect();

    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|param| param.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Ok(bytes);
    }

    let compact: Vec<u8> = bytes.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}
