//! End-to-end page analysis over in-memory archives.

mod common;

use common::{url, ArchiveBuilder, HTML, JAVASCRIPT};
use wpr_compat::archive::ArchiveError;
use wpr_compat::config::ResolverConfig;
use wpr_compat::page::{content_hash, ModuleFacet, ScriptOrigin};
use wpr_compat::{resolve_page_syntax, EsVersion, PageError, ScriptGraphResolver};

const PAGE: &str = "https://a.test/index.html";

fn external(url: &str) -> ScriptOrigin {
    ScriptOrigin::External {
        url: url.to_string(),
        dynamic_loading: false,
    }
}

#[test]
fn test_page_minimum_is_highest_script() {
    let archive = ArchiveBuilder::new()
        .html(
            PAGE,
            r#"<html><head>
                <script>let a = 1;</script>
                <script src="/app.js"></script>
            </head><body><button onclick="a?.b()">go</button></body></html>"#,
        )
        .script("https://a.test/app.js", "var f = () => 1;")
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();

    assert_eq!(page.document_url, PAGE);
    assert_eq!(page.minimum_es_version, EsVersion::ES2020);
    assert!(page.errors.is_empty());
    assert_eq!(page.scripts.len(), 3);

    let inline = &page.scripts[0];
    assert_eq!(
        inline.origin,
        ScriptOrigin::Inline {
            hash: content_hash("let a = 1;"),
            event_handler: false
        }
    );
    assert_eq!(inline.features, vec!["ES2015:block-scoping"]);

    let app = &page.scripts[1];
    assert_eq!(app.origin, external("https://a.test/app.js"));
    assert_eq!(app.minimum_es_version, EsVersion::ES2015);
    assert_eq!(app.features, vec!["ES2015:arrow-functions"]);
    assert!(!app.is_module());

    let handler = &page.scripts[2];
    assert_eq!(
        handler.origin,
        ScriptOrigin::Inline {
            hash: content_hash("a?.b()"),
            event_handler: true
        }
    );
    assert_eq!(handler.minimum_es_version, EsVersion::ES2020);
}

#[test]
fn test_page_without_scripts_is_es5() {
    let archive = ArchiveBuilder::new().html(PAGE, "<p>static</p>").build();
    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();
    assert_eq!(page.minimum_es_version, EsVersion::ES5);
    assert!(page.scripts.is_empty());
}

#[test]
fn test_missing_content_type_is_taken_as_html() {
    let archive = ArchiveBuilder::new()
        .exchange(PAGE, 200, &[], b"<script>const x = 1;</script>")
        .build();
    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();
    assert_eq!(page.minimum_es_version, EsVersion::ES2015);
}

#[test]
fn test_non_html_document_fails() {
    let archive = ArchiveBuilder::new()
        .exchange(PAGE, 200, &[("Content-Type", "application/json")], b"{}")
        .build();
    let err = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap_err();
    assert!(matches!(err, PageError::NotHtml { .. }));
}

#[test]
fn test_failed_document_status_fails() {
    let archive = ArchiveBuilder::new()
        .exchange(PAGE, 404, &[("Content-Type", HTML)], b"not found")
        .build();
    let err = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap_err();
    assert!(matches!(err, PageError::DocumentStatus { status: 404, .. }));
}

#[test]
fn test_missing_document_fails() {
    let archive = ArchiveBuilder::new().html("https://other.test/", "").build();
    let err = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap_err();
    assert!(matches!(err, PageError::Archive(ArchiveError::NotFound { .. })));
}

#[test]
fn test_document_redirect_is_followed() {
    let archive = ArchiveBuilder::new()
        .redirect("https://a.test/", "/home/")
        .html("https://a.test/home/", r#"<script src="app.js"></script>"#)
        .script("https://a.test/home/app.js", "for (var x of y) {}")
        .build();
    let page = resolve_page_syntax(&archive, &url("https://a.test/"), &[]).unwrap();

    assert_eq!(page.document_url, "https://a.test/home/");
    assert_eq!(page.scripts[0].origin, external("https://a.test/home/app.js"));
    assert_eq!(page.scripts[0].features, vec!["ES2015:for-of"]);
}

#[test]
fn test_module_graph_follows_import_map_and_reexports() {
    let archive = ArchiveBuilder::new()
        .html(
            PAGE,
            r#"<script type="importmap">{"imports": {"lib": "/vendor/lib.js"}}</script>
               <script type="module" src="/main.js"></script>"#,
        )
        .script(
            "https://a.test/main.js",
            r#"import { x } from "lib"; export { y } from "./re.js";"#,
        )
        .script("https://a.test/vendor/lib.js", "export const x = 1n;")
        .script("https://a.test/re.js", "export function y() {}")
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();
    let urls: Vec<_> = page.external_urls().collect();
    assert_eq!(
        urls,
        vec!["https://a.test/main.js", "https://a.test/vendor/lib.js", "https://a.test/re.js"]
    );

    let main = &page.scripts[0];
    assert_eq!(
        main.module,
        ModuleFacet::Module {
            import_urls: vec![
                "https://a.test/vendor/lib.js".to_string(),
                "https://a.test/re.js".to_string()
            ]
        }
    );
    assert!(main.features.contains(&"ES2015:modules".to_string()));
    assert!(page.scripts.iter().all(|s| s.is_module()));
    let mut lib_features = page.scripts[1].features.clone();
    lib_features.sort();
    assert_eq!(lib_features, vec!["ES2015:block-scoping", "ES2015:modules", "ES2020:bigint"]);
    assert_eq!(page.minimum_es_version, EsVersion::ES2020);
}

#[test]
fn test_redirected_module_imports_resolve_against_final_url() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script type="module" src="/entry.js"></script>"#)
        .redirect("https://a.test/entry.js", "/v2/entry.js")
        .script("https://a.test/v2/entry.js", r#"import "./dep.js";"#)
        .script("https://a.test/v2/dep.js", "export default 1;")
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();

    assert_eq!(page.scripts[0].url(), Some("https://a.test/entry.js"));
    assert_eq!(page.scripts[0].import_urls(), ["https://a.test/v2/dep.js"]);
    assert_eq!(page.scripts[1].url(), Some("https://a.test/v2/dep.js"));
}

#[test]
fn test_missing_script_is_dropped_and_reported() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script src="/gone.js"></script><script>var ok;</script>"#)
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();

    assert_eq!(page.scripts.len(), 1);
    assert_eq!(page.errors.len(), 1);
    assert!(page.errors[0].contains("https://a.test/gone.js"));
}

#[test]
fn test_unresolvable_bare_specifier_is_reported() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script type="module">import "react";</script>"#)
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();

    assert_eq!(page.scripts.len(), 1);
    assert!(page.scripts[0].import_urls().is_empty());
    assert!(page.errors[0].starts_with("react:"));
}

#[test]
fn test_insecure_script_upgrade_follows_config() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script src="http://cdn.test/lib.js"></script>"#)
        .script("https://cdn.test/lib.js", "class A {}")
        .build();

    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();
    assert_eq!(page.scripts[0].url(), Some("http://cdn.test/lib.js"));
    assert_eq!(page.minimum_es_version, EsVersion::ES2015);

    let strict = ResolverConfig {
        upgrade_insecure_scripts: false,
        ..ResolverConfig::default()
    };
    let page = ScriptGraphResolver::new(&archive, &strict).resolve(&url(PAGE), &[]).unwrap();
    assert!(page.scripts.is_empty());
    assert_eq!(page.errors.len(), 1);
}

#[test]
fn test_observed_scripts_are_marked_dynamic() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script src="/app.js"></script>"#)
        .script("https://a.test/app.js", "var a;")
        .script("https://a.test/lazy.js", "async function f() { await g(); }")
        .script("https://a.test/chunk.mjs", "export const c = 1;")
        .exchange("https://a.test/data.json", 200, &[("Content-Type", "application/json")], br#"{"k": [1, 2]}"#)
        .build();
    let observed = [
        url("https://a.test/app.js"),
        url("https://a.test/lazy.js#x"),
        url("https://a.test/lazy.js"),
        url("https://a.test/chunk.mjs"),
        url("https://a.test/data.json"),
    ];

    let page = resolve_page_syntax(&archive, &url(PAGE), &observed).unwrap();
    assert_eq!(page.scripts.len(), 4);

    assert_eq!(page.scripts[0].origin, external("https://a.test/app.js"));

    let lazy = &page.scripts[1];
    assert_eq!(
        lazy.origin,
        ScriptOrigin::External {
            url: "https://a.test/lazy.js".to_string(),
            dynamic_loading: true
        }
    );
    assert_eq!(lazy.minimum_es_version, EsVersion::ES2017);

    let chunk = &page.scripts[2];
    assert!(chunk.is_module());
    assert!(chunk.import_urls().is_empty());

    let json = &page.scripts[3];
    assert!(!json.is_module());
    assert!(json.features.is_empty());
    assert_eq!(json.minimum_es_version, EsVersion::ES5);

    assert_eq!(page.minimum_es_version, EsVersion::ES2017);
}

#[test]
fn test_observed_garbage_is_dropped() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, "")
        .exchange("https://a.test/blob.bin", 200, &[("Content-Type", JAVASCRIPT)], b"<<<>>>")
        .build();
    let page = resolve_page_syntax(&archive, &url(PAGE), &[url("https://a.test/blob.bin")]).unwrap();
    assert!(page.scripts.is_empty());
    assert_eq!(page.errors.len(), 1);
}

#[test]
fn test_data_url_script_is_analyzed_inline() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script src="data:text/javascript,let%20x%20%3D%201"></script>"#)
        .build();
    let page = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap();

    assert_eq!(
        page.scripts[0].origin,
        ScriptOrigin::Inline {
            hash: content_hash("let x = 1"),
            event_handler: false
        }
    );
    assert_eq!(page.minimum_es_version, EsVersion::ES2015);
}

#[test]
fn test_module_parse_failure_is_fatal() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script type="module">import {</script>"#)
        .build();
    let err = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap_err();
    match err {
        PageError::Parse { script, .. } => assert!(script.starts_with("inline script ")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_classic_external_parse_failure_names_script() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<script src="/broken.js"></script>"#)
        .script("https://a.test/broken.js", "function (")
        .build();
    let err = resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap_err();
    assert!(matches!(err, PageError::Parse { ref script, .. } if script == "https://a.test/broken.js"));
}

#[test]
fn test_report_is_deterministic() {
    let archive = ArchiveBuilder::new()
        .html(
            PAGE,
            r#"<script type="module" src="/m.js"></script><div onload="x ??= 1"></div>"#,
        )
        .script("https://a.test/m.js", r#"import "./a.js"; import "./b.js";"#)
        .script("https://a.test/a.js", "export class A { #p = 1; }")
        .script("https://a.test/b.js", r#"import "./a.js";"#)
        .build();

    let first = serde_json::to_string(&resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap()).unwrap();
    let second = serde_json::to_string(&resolve_page_syntax(&archive, &url(PAGE), &[]).unwrap()).unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["minimumESVersion"], "ES2022");
    assert_eq!(value["scripts"].as_array().unwrap().len(), 4);
    assert!(value.get("errors").is_none());
}

#[test]
fn test_configured_handler_attributes_limit_analysis() {
    let archive = ArchiveBuilder::new()
        .html(PAGE, r#"<body onload="let a = 1" onclick="a ||= 2"></body>"#)
        .build();
    let config = ResolverConfig {
        event_handler_attributes: Some(vec!["ONCLICK".to_string()]),
        ..ResolverConfig::default()
    };

    let page = ScriptGraphResolver::new(&archive, &config).resolve(&url(PAGE), &[]).unwrap();

    assert_eq!(page.scripts.len(), 1);
    assert_eq!(page.scripts[0].features, vec!["ES2021:logical-assignment-operators"]);
}

#[test]
fn test_non_network_script_urls_are_skipped_silently() {
    let archive = ArchiveBuilder::new()
        .html(
            PAGE,
            r#"<script src="blob:https://a.test/1"></script>
               <script src="chrome-extension://x/a.js"></script>
               <script src="/app.js"></script>"#,
        )
        .script("https://a.test/app.js", "let a;")
        .build();
    let observed = [url("blob:https://a.test/1"), url("chrome-extension://x/a.js")];

    let page = resolve_page_syntax(&archive, &url(PAGE), &observed).unwrap();

    assert_eq!(page.scripts.len(), 1);
    assert_eq!(page.scripts[0].origin, external("https://a.test/app.js"));
    assert!(page.errors.is_empty());
    assert_eq!(page.minimum_es_version, EsVersion::ES2015);
    assert!(page
        .external_urls()
        .all(|u| !u.starts_with("blob:") && !u.starts_with("chrome-extension:")));
}
