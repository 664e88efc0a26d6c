//! Forward-only cursor over a captured HTTP byte stream.

use super::HttpError;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// Byte cursor used by the message parser and chunked decoder.
#[derive(Debug)]
pub(crate) struct ByteReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Returns true while unread bytes remain.
    pub fn available(&self) -> bool {
        self.offset < self.buffer.len()
    }

    /// Read exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], HttpError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.buffer.len())
            .ok_or(HttpError::Truncated {
                wanted: n,
                remaining: self.buffer.len() - self.offset,
            })?;
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    /// Read everything that is left.
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let bytes = &self.buffer[self.offset..];
        self.offset = self.buffer.len();
        bytes
    }

    /// Read up to the next CRLF and consume the terminator.
    ///
    /// Bytes are widened to chars one-for-one (ISO-8859-1) so that a
    /// later rebuild reproduces them exactly.
    pub fn read_line(&mut self) -> Result<String, HttpError> {
        let rest = &self.buffer[self.offset..];
        let end = rest
            .windows(CRLF.len())
            .position(|w| w == CRLF)
            .ok_or(HttpError::MissingLineTerminator)?;
        let line = latin1_decode(&rest[..end]);
        self.offset += end + CRLF.len();
        Ok(line)
    }
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of [`latin1_decode`]; chars outside ISO-8859-1 become `?`.
pub(crate) fn latin1_encode(text: &str, out: &mut Vec<u8>) {
    out.extend(text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')));
}
