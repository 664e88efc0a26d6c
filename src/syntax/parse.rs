//! JavaScript parsing for the three script goals a page can contain.

use std::fmt;

use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, SourceMap};
use swc_core::ecma::ast::{EsVersion as TargetVersion, ModuleDecl, ModuleItem, Program};
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsConfig, Parser, StringInput, Syntax};

use super::ScriptParseError;

/// Grammar a source text is parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseGoal {
    /// Classic `<script>`.
    Script,
    /// `<script type="module">` and everything it imports.
    Module,
    /// Inline `on*` attribute: a classic script that may `return` at top
    /// level, since it runs as an implicit function body.
    EventHandler,
}

impl fmt::Display for ParseGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParseGoal::Script => "script",
            ParseGoal::Module => "module",
            ParseGoal::EventHandler => "event handler",
        })
    }
}

/// Parse `source` under `goal`. Recoverable parser diagnostics count as
/// failures too.
pub fn parse_program(source: &str, goal: ParseGoal) -> Result<Program, ScriptParseError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon, source.to_string());

    let config = EsConfig {
        allow_return_outside_function: goal == ParseGoal::EventHandler,
        ..Default::default()
    };
    let lexer = Lexer::new(Syntax::Es(config), TargetVersion::Es2022, StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let to_error = |e: swc_core::ecma::parser::error::Error| ScriptParseError {
        goal,
        offset: e.span().lo.0.saturating_sub(fm.start_pos.0),
        message: e.kind().msg().into_owned(),
    };

    let program = match goal {
        ParseGoal::Module => parser.parse_module().map(Program::Module),
        ParseGoal::Script | ParseGoal::EventHandler => parser.parse_script().map(Program::Script),
    }
    .map_err(to_error)?;

    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(to_error(e));
    }
    Ok(program)
}

/// Specifiers of every module this program loads statically: import
/// declarations plus `export … from` re-exports, in source order.
///
/// Empty for non-module programs.
pub fn static_module_requests(program: &Program) -> Vec<String> {
    let Program::Module(module) = program else {
        return Vec::new();
    };

    module
        .body
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) if !import.type_only => Some(&import.src),
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) if !export.type_only => export.src.as_ref(),
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) if !export.type_only => Some(&export.src),
            _ => None,
        })
        .map(|src| src.value.to_string())
        .collect()
}
