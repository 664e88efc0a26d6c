//! ECMAScript compatibility analysis.
//!
//! # Data Flow
//! ```text
//! source text
//!     → parse.rs (swc, goal: script | module | event handler)
//!     → collector.rs (one walk, every rule in features.rs)
//!     → SyntaxReport (distinct categories, minimum edition)
//! ```
//!
//! # Design Decisions
//! - Rules are data (rules.rs) matched against an ESTree-shaped view
//!   of each node (node.rs), so the rule table reads like the grammar
//!   and does not depend on the parser's AST layout
//! - The built-in table is built once and shared by every analysis

pub mod collector;
pub mod features;
pub mod node;
pub mod parse;
pub mod rules;
pub mod version;

use std::sync::Arc;

use indexmap::IndexSet;
use swc_core::ecma::ast::Program;
use thiserror::Error;

pub use collector::collect_evidences;
pub use features::default_rules;
pub use parse::{parse_program, static_module_requests, ParseGoal};
pub use rules::{Evidence, RuleSet, RuleSetBuilder};
pub use version::{Category, EsVersion};

/// A source text that does not parse under the requested goal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{goal} parse failed at byte {offset}: {message}")]
pub struct ScriptParseError {
    pub goal: ParseGoal,
    pub offset: u32,
    pub message: String,
}

/// Features used by one program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxReport {
    /// Distinct categories in order of first evidence.
    pub categories: Vec<Arc<Category>>,
    pub minimum_es_version: EsVersion,
}

impl SyntaxReport {
    pub fn from_evidences<'a>(evidences: impl IntoIterator<Item = &'a Evidence>) -> Self {
        let categories: IndexSet<Arc<Category>> =
            evidences.into_iter().map(|e| Arc::clone(e.category())).collect();
        let minimum_es_version = EsVersion::max_of(categories.iter().map(|c| c.version));
        Self {
            categories: categories.into_iter().collect(),
            minimum_es_version,
        }
    }

    /// `version:name` strings, e.g. `ES2015:for-of`.
    pub fn features(&self) -> Vec<String> {
        self.categories.iter().map(ToString::to_string).collect()
    }
}

/// Run the built-in rules over a parsed program.
pub fn analyze_program(program: &Program) -> SyntaxReport {
    SyntaxReport::from_evidences(&collect_evidences(program, default_rules()))
}

/// Parse and analyze in one step.
pub fn analyze_source(source: &str, goal: ParseGoal) -> Result<SyntaxReport, ScriptParseError> {
    Ok(analyze_program(&parse_program(source, goal)?))
}
