//! Raw bytes → [`HttpMessage`].
//!
//! # Responsibilities
//! - Split the head line on its first two whitespace runs
//! - Parse `Name: Value` header lines until the blank separator line
//! - Remove chunked transfer framing, collecting trailer headers
//!
//! # Design Decisions
//! - `content-length` is never checked against the body: archives hold
//!   re-chunked and truncated captures that must still load
//! - Any structural violation fails the whole message

use super::headers::HeaderMap;
use super::message::HttpMessage;
use super::reader::ByteReader;
use super::HttpError;

/// Parse one HTTP message.
pub fn parse_message(input: &[u8]) -> Result<HttpMessage, HttpError> {
    let mut reader = ByteReader::new(input);

    let (head_line0, head_line1, head_line2) = read_head_line(&mut reader)?;
    let headers = read_headers(&mut reader)?;
    let (body, trailing_headers) = read_body(&mut reader, &headers)?;

    Ok(HttpMessage {
        head_line0,
        head_line1,
        head_line2,
        headers,
        body,
        trailing_headers,
    })
}

fn read_head_line(reader: &mut ByteReader<'_>) -> Result<(String, String, String), HttpError> {
    let line = reader.read_line()?;
    let trimmed = trim_ascii(&line);

    let (part0, rest) = split_at_whitespace(trimmed)
        .ok_or_else(|| HttpError::MalformedHeadLine(line.clone()))?;
    let (part1, part2) = match split_at_whitespace(rest) {
        Some((part1, part2)) => (part1, part2),
        None if !rest.is_empty() => (rest, ""),
        None => return Err(HttpError::MalformedHeadLine(line.clone())),
    };

    Ok((part0.to_string(), part1.to_string(), part2.to_string()))
}

/// Lines are Latin-1 decoded, so only ASCII whitespace may be stripped;
/// bytes such as 0x85 and 0xA0 belong to the value.
fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Split off the first token; the remainder has its leading whitespace removed.
fn split_at_whitespace(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| c.is_ascii_whitespace())?;
    Some((&s[..end], s[end..].trim_start_matches(|c: char| c.is_ascii_whitespace())))
}

fn read_headers(reader: &mut ByteReader<'_>) -> Result<HeaderMap, HttpError> {
    let mut headers = HeaderMap::new();

    loop {
        let line = reader.read_line()?;
        if line.is_empty() {
            return Ok(headers);
        }

        let sep = line
            .find(':')
            .ok_or_else(|| HttpError::MalformedHeader(line.clone()))?;
        let name = trim_ascii(&line[..sep]);
        let value = trim_ascii(&line[sep + 1..]);
        if name.is_empty() || value.is_empty() {
            return Err(HttpError::MalformedHeader(line.clone()));
        }

        headers.add(name, value);
    }
}

fn read_body(
    reader: &mut ByteReader<'_>,
    headers: &HeaderMap,
) -> Result<(Vec<u8>, HeaderMap), HttpError> {
    let data = reader.read_to_end();

    match headers.get("transfer-encoding") {
        Some("chunked") => {
            if headers.contains("content-length") {
                return Err(HttpError::ConflictingFraming);
            }
            read_chunked_body(&mut ByteReader::new(data))
        }
        Some(other) => Err(HttpError::UnsupportedTransferEncoding(other.to_string())),
        None => Ok((data.to_vec(), HeaderMap::new())),
    }
}

fn read_chunked_body(reader: &mut ByteReader<'_>) -> Result<(Vec<u8>, HeaderMap), HttpError> {
    let mut body = Vec::new();

    loop {
        let line = reader.read_line()?;
        let size_field = match line.find(';') {
            Some(ext) => &line[..ext],
            None => line.as_str(),
        };
        let size = usize::from_str_radix(trim_ascii(size_field), 16)
            .map_err(|_| HttpError::InvalidChunkSize(line.clone()))?;

        if size == 0 {
            let trailing_headers = read_headers(reader)?;
            if reader.available() {
                return Err(HttpError::TrailingGarbage);
            }
            return Ok((body, trailing_headers));
        }

        body.extend_from_slice(reader.read(size)?);

        if !reader.read_line()?.is_empty() {
            return Err(HttpError::MissingChunkTerminator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head_line_tolerates_extra_whitespace() {
        let msg = parse_message(b"  GET   /index.html \t HTTP/1.1  \r\nHost: a.test\r\n\r\n").unwrap();
        assert_eq!(msg.head_line0, "GET");
        assert_eq!(msg.head_line1, "/index.html");
        assert_eq!(msg.head_line2, "HTTP/1.1");
        assert_eq!(msg.headers.get("host"), Some("a.test"));
        assert!(msg.body.is_empty());
    }

    #[test]
    fn test_parse_head_line_keeps_multi_word_reason() {
        let msg = parse_message(b"HTTP/1.1 404 Not Found\r\n\r\nmissing").unwrap();
        assert_eq!(msg.head_line1, "404");
        assert_eq!(msg.head_line2, "Not Found");
        assert_eq!(msg.body, b"missing");
    }

    #[test]
    fn test_parse_head_line_without_reason() {
        let msg = parse_message(b"HTTP/1.1 204\r\n\r\n").unwrap();
        assert_eq!(msg.head_line1, "204");
        assert_eq!(msg.head_line2, "");
    }

    #[test]
    fn test_single_token_head_line_is_rejected() {
        assert!(matches!(
            parse_message(b"GARBAGE\r\n\r\n"),
            Err(HttpError::MalformedHeadLine(_))
        ));
    }

    #[test]
    fn test_header_value_split_on_first_colon() {
        let msg = parse_message(b"GET / HTTP/1.1\r\nReferer:  http://a.test:8080/x \r\n\r\n").unwrap();
        assert_eq!(msg.headers.get("referer"), Some("http://a.test:8080/x"));
    }

    #[test]
    fn test_malformed_headers_are_fatal() {
        for raw in [
            &b"GET / HTTP/1.1\r\nno-colon\r\n\r\n"[..],
            &b"GET / HTTP/1.1\r\n: value\r\n\r\n"[..],
            &b"GET / HTTP/1.1\r\nEmpty:   \r\n\r\n"[..],
        ] {
            assert!(matches!(parse_message(raw), Err(HttpError::MalformedHeader(_))));
        }
    }

    #[test]
    fn test_missing_blank_line_is_fatal() {
        assert!(parse_message(b"GET / HTTP/1.1\r\nHost: a.test\r\n").is_err());
    }

    #[test]
    fn test_content_length_is_not_validated() {
        let msg = parse_message(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort").unwrap();
        assert_eq!(msg.body, b"short");
    }

    #[test]
    fn test_chunked_body_with_extension_and_trailers() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
4;name=value\r\nWiki\r\n5\r\npedia\r\n0\r\nExpires: never\r\n\r\n";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.body, b"Wikipedia");
        assert_eq!(msg.trailing_headers.get("expires"), Some("never"));
    }

    #[test]
    fn test_chunked_rejects_content_length() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nContent-Length: 4\r\n\r\n0\r\n\r\n";
        assert!(matches!(parse_message(raw), Err(HttpError::ConflictingFraming)));
    }

    #[test]
    fn test_unsupported_transfer_encoding() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: gzip\r\n\r\n";
        assert!(matches!(
            parse_message(raw),
            Err(HttpError::UnsupportedTransferEncoding(enc)) if enc == "gzip"
        ));
    }

    #[test]
    fn test_chunked_requires_full_consumption() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\nextra";
        assert!(matches!(parse_message(raw), Err(HttpError::TrailingGarbage)));
    }

    #[test]
    fn test_chunk_shorter_than_declared() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nff\r\nabc\r\n0\r\n\r\n";
        assert!(parse_message(raw).is_err());
    }

    #[test]
    fn test_non_ascii_whitespace_bytes_are_kept() {
        let raw = b"HTTP/1.1 200 \xA0OK\xA0\r\nX-Name: \xC3\x85\r\nX-Pad: \x85v\xA0\r\n\r\n";
        let msg = parse_message(raw).unwrap();

        assert_eq!(msg.head_line2, "\u{A0}OK\u{A0}");
        assert_eq!(msg.headers.get("x-name"), Some("\u{C3}\u{85}"));
        assert_eq!(msg.headers.get("x-pad"), Some("\u{85}v\u{A0}"));

        let rebuilt = crate::http::build::build_message(&msg);
        assert_eq!(
            rebuilt,
            b"HTTP/1.1 200 \xA0OK\xA0\r\nx-name: \xC3\x85\r\nx-pad: \x85v\xA0\r\n\r\n".to_vec()
        );
    }
}
