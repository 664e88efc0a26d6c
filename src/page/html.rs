//! Static scan of an HTML document for everything that can run script.
//!
//! # Responsibilities
//! - Find `<script>` elements that execute as classic or module scripts
//! - Find inline event handler attributes
//! - Capture the document base URL and inline import map
//!
//! # Design Decisions
//! - The tree is walked in document order with `scraper`, so candidates
//!   come out in the order a browser would meet them
//! - The first `<base href>` and the first import map win, as in browsers
//! - Handler attributes come out in markup order per element; `scraper`
//!   keeps source attribute order with its `deterministic` feature

use scraper::{ElementRef, Html};

/// HTML event handler content attributes analyzed by default.
pub const DEFAULT_EVENT_HANDLER_ATTRIBUTES: &[&str] = &[
    "onabort", "onafterprint", "onanimationend", "onanimationiteration", "onanimationstart",
    "onauxclick", "onbeforeinput", "onbeforeprint", "onbeforeunload", "onblur", "oncancel",
    "oncanplay", "oncanplaythrough", "onchange", "onclick", "onclose", "oncontextmenu",
    "oncopy", "oncuechange", "oncut", "ondblclick", "ondrag", "ondragend", "ondragenter",
    "ondragleave", "ondragover", "ondragstart", "ondrop", "ondurationchange", "onemptied",
    "onended", "onerror", "onfocus", "onfocusin", "onfocusout", "onformdata",
    "onfullscreenchange", "onhashchange", "oninput", "oninvalid", "onkeydown", "onkeypress",
    "onkeyup", "onlanguagechange", "onload", "onloadeddata", "onloadedmetadata",
    "onloadstart", "onmessage", "onmessageerror", "onmousedown", "onmouseenter",
    "onmouseleave", "onmousemove", "onmouseout", "onmouseover", "onmouseup", "onoffline",
    "ononline", "onpagehide", "onpageshow", "onpaste", "onpause", "onplay", "onplaying",
    "onpointercancel", "onpointerdown", "onpointerenter", "onpointerleave", "onpointermove",
    "onpointerout", "onpointerover", "onpointerup", "onpopstate", "onprogress",
    "onratechange", "onrejectionhandled", "onreset", "onresize", "onscroll", "onscrollend",
    "onsearch", "onsecuritypolicyviolation", "onseeked", "onseeking", "onselect",
    "onselectionchange", "onselectstart", "onslotchange", "onstalled", "onstorage",
    "onsubmit", "onsuspend", "ontimeupdate", "ontoggle", "ontouchcancel", "ontouchend",
    "ontouchmove", "ontouchstart", "ontransitioncancel", "ontransitionend",
    "ontransitionrun", "ontransitionstart", "onunhandledrejection", "onunload",
    "onvolumechange", "onwaiting", "onwheel",
];

/// A script-bearing construct found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlScript {
    /// `<script src=...>`, `src` exactly as written.
    External { src: String, module: bool },
    /// `<script>` with inline text.
    Inline { source: String, module: bool },
    /// An `on*` attribute value.
    EventHandler { attribute: String, source: String },
}

/// Everything the resolver needs from the document markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentScan {
    pub base_href: Option<String>,
    /// Text of the first `<script type="importmap">`.
    pub import_map: Option<String>,
    pub scripts: Vec<HtmlScript>,
}

enum ScriptType {
    Classic,
    Module,
    ImportMap,
    Data,
}

fn script_type(element: &ElementRef<'_>) -> ScriptType {
    let Some(raw) = element.value().attr("type") else {
        return ScriptType::Classic;
    };
    let kind = raw.trim().to_ascii_lowercase();
    if kind.is_empty() || kind.contains("javascript") || kind.contains("ecmascript") {
        ScriptType::Classic
    } else if kind == "module" {
        ScriptType::Module
    } else if kind == "importmap" {
        ScriptType::ImportMap
    } else {
        ScriptType::Data
    }
}

/// Scan `html` for scripts, handlers, `<base>`, and the import map.
pub fn scan_document<S: AsRef<str>>(html: &str, handler_attributes: &[S]) -> DocumentScan {
    let document = Html::parse_document(html);
    let mut scan = DocumentScan::default();

    for element in document.root_element().descendants().filter_map(ElementRef::wrap) {
        let value = element.value();

        match value.name() {
            "base" if scan.base_href.is_none() => {
                scan.base_href = value.attr("href").map(str::to_string);
            }
            "script" => scan_script(&element, &mut scan),
            _ => {}
        }

        // markup order; attribute names arrive lowercased from the parser
        for (name, source) in value.attrs() {
            if handler_attributes.iter().any(|allowed| allowed.as_ref() == name) {
                scan.scripts.push(HtmlScript::EventHandler {
                    attribute: name.to_string(),
                    source: source.to_string(),
                });
            }
        }
    }

    scan
}

fn scan_script(element: &ElementRef<'_>, scan: &mut DocumentScan) {
    let value = element.value();
    let module = match script_type(element) {
        ScriptType::Classic => false,
        ScriptType::Module => true,
        ScriptType::ImportMap => {
            if scan.import_map.is_none() {
                scan.import_map = Some(element.text().collect());
            }
            return;
        }
        ScriptType::Data => return,
    };

    // legacy fallback for browsers without module support
    if value.attr("nomodule").is_some() {
        return;
    }

    match value.attr("src") {
        Some(src) if !src.trim().is_empty() => scan.scripts.push(HtmlScript::External {
            src: src.trim().to_string(),
            module,
        }),
        Some(_) => {}
        None => {
            let source: String = element.text().collect();
            if !source.is_empty() {
                scan.scripts.push(HtmlScript::Inline { source, module });
            }
        }
    }
}
