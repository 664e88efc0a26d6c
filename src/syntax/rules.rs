//! Declarative feature rules.
//!
//! # Responsibilities
//! - Predicates over node property values
//! - Per-edition builders that tag every rule with a feature category
//! - A merged registry keyed by node type
//!
//! # Design Decisions
//! - The builder is a type state: rules can only be registered after
//!   `intro` has named a category, so there is no "no active category"
//!   failure at runtime
//! - Registration order is kept, but nothing depends on it; evidences
//!   are deduplicated by category downstream

use std::collections::HashMap;
use std::sync::Arc;

use super::node::{NodeProps, NodeType, Value};
use super::version::{Category, EsVersion};

/// Test applied to a single property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    /// Some list element matches.
    Some(Box<Predicate>),
    /// The value is a node of exactly this kind.
    Is(NodeType),
    Union(Vec<Predicate>),
    Not(Box<Predicate>),
    IsNull,
    /// Non-null and matching; an absent value never matches.
    ExcludingNull(Box<Predicate>),
}

pub fn eq(value: impl Into<Value>) -> Predicate {
    Predicate::Eq(value.into())
}

pub fn some(predicate: Predicate) -> Predicate {
    Predicate::Some(Box::new(predicate))
}

pub fn is(node_type: NodeType) -> Predicate {
    Predicate::Is(node_type)
}

pub fn union(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    Predicate::Union(predicates.into_iter().collect())
}

pub fn not(predicate: Predicate) -> Predicate {
    Predicate::Not(Box::new(predicate))
}

pub fn is_null() -> Predicate {
    Predicate::IsNull
}

pub fn excluding_null(predicate: Predicate) -> Predicate {
    Predicate::ExcludingNull(Box::new(predicate))
}

impl Predicate {
    pub fn test(&self, value: &Value) -> bool {
        match self {
            Predicate::Eq(expected) => value == expected,
            Predicate::Some(inner) => match value {
                Value::List(items) => items.iter().any(|item| inner.test(item)),
                _ => false,
            },
            Predicate::Is(node_type) => matches!(value, Value::Node(t) if t == node_type),
            Predicate::Union(predicates) => predicates.iter().any(|p| p.test(value)),
            Predicate::Not(inner) => !inner.test(value),
            Predicate::IsNull => matches!(value, Value::Null),
            Predicate::ExcludingNull(inner) => !matches!(value, Value::Null) && inner.test(value),
        }
    }
}

/// A single observation that a feature is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// A node of a feature-defining kind was visited.
    Node {
        category: Arc<Category>,
        node_type: NodeType,
    },
    /// A node property matched a feature predicate.
    Prop {
        category: Arc<Category>,
        node_type: NodeType,
        prop: &'static str,
    },
}

impl Evidence {
    pub fn category(&self) -> &Arc<Category> {
        match self {
            Evidence::Node { category, .. } | Evidence::Prop { category, .. } => category,
        }
    }
}

#[derive(Debug, Clone)]
enum Check {
    Node,
    Prop {
        name: &'static str,
        predicate: Predicate,
    },
}

/// One registered rule for one node type.
#[derive(Debug, Clone)]
pub struct Rule {
    category: Arc<Category>,
    check: Check,
}

impl Rule {
    pub fn category(&self) -> &Arc<Category> {
        &self.category
    }

    /// Evidence produced by this rule for a node, if it fires.
    pub fn apply(&self, node_type: NodeType, props: &NodeProps) -> Option<Evidence> {
        match &self.check {
            Check::Node => Some(Evidence::Node {
                category: Arc::clone(&self.category),
                node_type,
            }),
            Check::Prop { name, predicate } => predicate.test(props.get(name)).then(|| Evidence::Prop {
                category: Arc::clone(&self.category),
                node_type,
                prop: *name,
            }),
        }
    }
}

/// Rules keyed by the node type they inspect.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<NodeType, Vec<Rule>>,
}

impl RuleSet {
    /// Combine registries; per-type lists are concatenated in argument order.
    pub fn merge(sets: impl IntoIterator<Item = RuleSet>) -> RuleSet {
        let mut merged = RuleSet::default();
        for set in sets {
            for (node_type, rules) in set.rules {
                merged.rules.entry(node_type).or_default().extend(rules);
            }
        }
        merged
    }

    pub fn rules_for(&self, node_type: NodeType) -> &[Rule] {
        self.rules.get(&node_type).map_or(&[], Vec::as_slice)
    }

    /// Every distinct category with at least one rule.
    pub fn categories(&self) -> Vec<Arc<Category>> {
        let mut categories: Vec<_> = self
            .rules
            .values()
            .flatten()
            .map(|rule| Arc::clone(&rule.category))
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn push(&mut self, node_type: NodeType, rule: Rule) {
        self.rules.entry(node_type).or_default().push(rule);
    }
}

/// Builder for the rules of one ECMAScript edition.
#[derive(Debug)]
pub struct RuleSetBuilder {
    version: EsVersion,
    rules: RuleSet,
}

impl RuleSetBuilder {
    pub fn new(version: EsVersion) -> Self {
        Self {
            version,
            rules: RuleSet::default(),
        }
    }

    /// Start registering rules for the feature `name`.
    pub fn intro(self, name: &str) -> CategoryBuilder {
        let category = Arc::new(Category::new(self.version, name));
        CategoryBuilder { inner: self, category }
    }

    pub fn build(self) -> RuleSet {
        self.rules
    }
}

/// [`RuleSetBuilder`] with an active category.
#[derive(Debug)]
pub struct CategoryBuilder {
    inner: RuleSetBuilder,
    category: Arc<Category>,
}

impl CategoryBuilder {
    /// Every node of `node_type` evidences the active category.
    pub fn defines_node(mut self, node_type: NodeType) -> Self {
        let rule = Rule {
            category: Arc::clone(&self.category),
            check: Check::Node,
        };
        self.inner.rules.push(node_type, rule);
        self
    }

    /// A `node_type` node whose `prop` satisfies `predicate` evidences the
    /// active category.
    pub fn extends_prop(mut self, node_type: NodeType, prop: &'static str, predicate: Predicate) -> Self {
        let rule = Rule {
            category: Arc::clone(&self.category),
            check: Check::Prop { name: prop, predicate },
        };
        self.inner.rules.push(node_type, rule);
        self
    }

    /// Switch to another feature of the same edition.
    pub fn intro(self, name: &str) -> CategoryBuilder {
        self.inner.intro(name)
    }

    pub fn build(self) -> RuleSet {
        self.inner.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(eq("let").test(&Value::Str("let")));
        assert!(!eq("let").test(&Value::Str("var")));
        assert!(union([eq("let"), eq("const")]).test(&Value::Str("const")));

        let list = Value::List(vec![Value::Null, Value::Node(NodeType::SpreadElement)]);
        assert!(some(is(NodeType::SpreadElement)).test(&list));
        assert!(!some(is(NodeType::Identifier)).test(&list));
        assert!(!some(is(NodeType::Identifier)).test(&Value::Null));

        let key_not_simple = not(union([is(NodeType::Literal), is(NodeType::Identifier)]));
        assert!(key_not_simple.test(&Value::Node(NodeType::BinaryExpression)));
        assert!(!key_not_simple.test(&Value::Node(NodeType::Identifier)));

        assert!(is_null().test(&Value::Null));
        assert!(not(is_null()).test(&Value::Opaque));
        assert!(!excluding_null(not(is(NodeType::Literal))).test(&Value::Null));
        assert!(excluding_null(not(is(NodeType::Literal))).test(&Value::Bool(true)));
    }

    #[test]
    fn test_builder_tags_rules_with_active_category() {
        let rules = RuleSetBuilder::new(EsVersion::ES2015)
            .intro("a")
            .defines_node(NodeType::Super)
            .intro("b")
            .extends_prop(NodeType::Property, "shorthand", eq(true))
            .extends_prop(NodeType::Property, "method", eq(true))
            .build();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules.rules_for(NodeType::Super)[0].category().name, "a");
        assert_eq!(rules.rules_for(NodeType::Property).len(), 2);
        assert!(rules.rules_for(NodeType::Literal).is_empty());
    }

    #[test]
    fn test_every_rule_for_a_type_applies() {
        let rules = RuleSetBuilder::new(EsVersion::ES2015)
            .intro("computed")
            .extends_prop(NodeType::Property, "computed", eq(true))
            .intro("shorthand")
            .extends_prop(NodeType::Property, "shorthand", eq(true))
            .build();
        let props = NodeProps::new().with("computed", true).with("shorthand", true);

        let fired: Vec<_> = rules
            .rules_for(NodeType::Property)
            .iter()
            .filter_map(|rule| rule.apply(NodeType::Property, &props))
            .map(|e| e.category().name.clone())
            .collect();
        assert_eq!(fired, vec!["computed", "shorthand"]);
    }

    #[test]
    fn test_merge_concatenates_per_type() {
        let a = RuleSetBuilder::new(EsVersion::ES2015)
            .intro("x")
            .defines_node(NodeType::Function)
            .build();
        let b = RuleSetBuilder::new(EsVersion::ES2017)
            .intro("y")
            .extends_prop(NodeType::Function, "async", eq(true))
            .build();

        let merged = RuleSet::merge([a, b]);
        let names: Vec<_> = merged
            .rules_for(NodeType::Function)
            .iter()
            .map(|r| r.category().to_string())
            .collect();
        assert_eq!(names, vec!["ES2015:x", "ES2017:y"]);
        assert_eq!(merged.categories().len(), 2);
    }
}
