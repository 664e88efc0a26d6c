//! Shared fixtures: in-memory archives built from raw HTTP bytes.

#![allow(dead_code)]

use url::Url;
use wpr_compat::archive::{ArchivedExchange, SessionArchive, SessionMetadata};

pub const HTML: &str = "text/html; charset=utf-8";
pub const JAVASCRIPT: &str = "application/javascript";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Raw `GET` request bytes for `url`.
pub fn raw_request(url: &str) -> Vec<u8> {
    let parsed = Url::parse(url).unwrap();
    let mut target = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        target.push('?');
        target.push_str(query);
    }
    format!(
        "GET {target} HTTP/1.1\r\nHost: {}\r\nAccept: */*\r\n\r\n",
        parsed.host_str().unwrap()
    )
    .into_bytes()
}

/// Raw response bytes with the given headers and a content-length.
pub fn raw_response(status: u16, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status} Status\r\n").into_bytes();
    for (name, value) in headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes());
    out.extend_from_slice(body);
    out
}

/// Builder for archives in capture order.
#[derive(Default)]
pub struct ArchiveBuilder {
    exchanges: Vec<ArchivedExchange>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exchange(mut self, url: &str, status: u16, headers: &[(&str, &str)], body: &[u8]) -> Self {
        let exchange =
            ArchivedExchange::from_http(url, &raw_request(url), &raw_response(status, headers, body), 0).unwrap();
        self.exchanges.push(exchange);
        self
    }

    pub fn html(self, url: &str, body: &str) -> Self {
        self.exchange(url, 200, &[("Content-Type", HTML)], body.as_bytes())
    }

    pub fn script(self, url: &str, body: &str) -> Self {
        self.exchange(url, 200, &[("Content-Type", JAVASCRIPT)], body.as_bytes())
    }

    pub fn redirect(self, url: &str, location: &str) -> Self {
        self.exchange(url, 302, &[("Location", location)], b"")
    }

    pub fn build(self) -> SessionArchive {
        SessionArchive::new(self.exchanges, SessionMetadata::default())
    }
}
