//! Archive file round-trips and edits through the public API.

mod common;

use std::io::{Read, Write};

use common::{url, ArchiveBuilder};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use wpr_compat::archive::{ArchiveError, SessionArchive};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    GzDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

#[test]
fn test_save_and_load_preserve_exchanges() {
    let archive = ArchiveBuilder::new()
        .html("https://a.test/", "<p>hi</p>")
        .script("https://a.test/app.js", "let a = 1;")
        .script("https://cdn.test/lib.js", "var b;")
        .build();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.wprgo");
    archive.save(&path).unwrap();
    let loaded = SessionArchive::load(&path).unwrap();

    assert_eq!(loaded.len(), 3);
    let urls: Vec<_> = loaded.exchanges().iter().map(|e| e.url().to_string()).collect();
    assert!(urls.contains(&"https://a.test/app.js".to_string()));
    assert!(urls.contains(&"https://cdn.test/lib.js".to_string()));

    let script = loaded.resolve(&url("https://a.test/app.js"), false).unwrap();
    assert_eq!(script.exchange.response().body().unwrap(), b"let a = 1;");
    assert_eq!(script.exchange.request().method().unwrap(), "GET");
    assert_eq!(loaded.metadata(), archive.metadata());
}

#[test]
fn test_untouched_exchange_is_written_verbatim() {
    let archive = ArchiveBuilder::new().script("https://a.test/x.js", "x()").build();
    let reloaded = SessionArchive::from_compressed(&archive.to_compressed().unwrap()).unwrap();

    let before = archive.exchanges()[0].response().serialize().unwrap();
    let after = reloaded.exchanges()[0].response().serialize().unwrap();
    assert_eq!(before, after);
    assert!(!reloaded.exchanges()[0].response().is_modified());
}

#[test]
fn test_edit_of_gzip_body_is_reencoded() {
    let archive = ArchiveBuilder::new()
        .exchange(
            "https://a.test/app.js",
            200,
            &[("Content-Type", "text/javascript"), ("Content-Encoding", "gzip")],
            &gzip(b"old()"),
        )
        .build();
    assert_eq!(archive.exchanges()[0].response().body().unwrap(), b"old()");

    let edited = archive
        .with_edited_url(&url("https://a.test/app.js"), b"brand_new()".to_vec())
        .unwrap();
    let reloaded = SessionArchive::from_compressed(&edited.to_compressed().unwrap()).unwrap();
    let response = reloaded.exchanges()[0].response();
    let message = response.message().unwrap();

    assert_eq!(response.body().unwrap(), b"brand_new()");
    assert_eq!(gunzip(&message.body), b"brand_new()");
    assert_eq!(
        message.headers.get("content-length"),
        Some(message.body.len().to_string().as_str())
    );

    // the source archive is unchanged
    assert_eq!(archive.exchanges()[0].response().body().unwrap(), b"old()");
}

#[test]
fn test_redirect_chain_resolves_to_final_exchange() {
    let archive = ArchiveBuilder::new()
        .redirect("https://a.test/old", "/mid")
        .redirect("https://a.test/mid", "https://b.test/new")
        .html("https://b.test/new", "<p>moved</p>")
        .build();

    let resolution = archive.resolve(&url("https://a.test/old"), false).unwrap();
    assert_eq!(resolution.url.as_str(), "https://b.test/new");
    assert_eq!(resolution.exchange.response().body().unwrap(), b"<p>moved</p>");
}

#[test]
fn test_missing_resource_is_not_found() {
    let archive = ArchiveBuilder::new().html("https://a.test/", "").build();
    let err = archive.resolve(&url("https://a.test/missing.js"), true).unwrap_err();
    assert!(err.is_not_found());
    assert!(archive.try_resolve(&url("https://a.test/missing.js"), true).unwrap().is_none());
}

#[test]
fn test_load_rejects_non_archive_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bogus.wprgo");
    std::fs::write(&path, b"plain text").unwrap();
    assert!(matches!(SessionArchive::load(&path), Err(ArchiveError::Io(_))));
}
