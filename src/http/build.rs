//! [`HttpMessage`] → raw bytes.

use super::headers::HeaderMap;
use super::message::HttpMessage;
use super::reader::{latin1_encode, CRLF};

/// Serialize a message: head line, headers, blank line, body.
///
/// A message declaring `transfer-encoding: chunked` has its body
/// re-framed as a single chunk followed by the terminating zero chunk
/// and the trailer block.
pub fn build_message(message: &HttpMessage) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.body.len() + 256);

    latin1_encode(&message.head_line0, &mut out);
    out.push(b' ');
    latin1_encode(&message.head_line1, &mut out);
    out.push(b' ');
    latin1_encode(&message.head_line2, &mut out);
    out.extend_from_slice(CRLF);
    write_headers(&message.headers, &mut out);
    out.extend_from_slice(CRLF);

    if message.is_chunked() {
        write_chunked_body(&message.body, &message.trailing_headers, &mut out);
    } else {
        out.extend_from_slice(&message.body);
    }

    out
}

fn write_headers(headers: &HeaderMap, out: &mut Vec<u8>) {
    for (name, value) in headers.iter() {
        latin1_encode(name, out);
        out.extend_from_slice(b": ");
        latin1_encode(value, out);
        out.extend_from_slice(CRLF);
    }
}

fn write_chunked_body(body: &[u8], trailers: &HeaderMap, out: &mut Vec<u8>) {
    // A zero-length data chunk would read as the terminator.
    if !body.is_empty() {
        out.extend_from_slice(format!("{:x}", body.len()).as_bytes());
        out.extend_from_slice(CRLF);
        out.extend_from_slice(body);
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(b"0");
    out.extend_from_slice(CRLF);
    write_headers(trailers, out);
    out.extend_from_slice(CRLF);
}
