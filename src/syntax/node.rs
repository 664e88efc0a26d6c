//! Parser-independent view of syntax nodes that rules match against.
//!
//! Node kinds use the ESTree names so rule tables read like the
//! language grammar. The collector projects each parsed node into a
//! [`NodeType`] plus a small set of named property [`Value`]s; a property
//! holding a child node carries the child's exact kind, so subtype checks
//! are plain comparisons.

use std::fmt;

/// Syntax node kinds, named after their ESTree counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Program,

    // statements and declarations
    VariableDeclaration,
    FunctionDeclaration,
    ClassDeclaration,
    ExpressionStatement,
    BlockStatement,
    ForOfStatement,
    CatchClause,

    // modules
    ImportDeclaration,
    ImportSpecifier,
    ImportDefaultSpecifier,
    ImportNamespaceSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportDefaultDeclaration,
    ExportAllDeclaration,

    // functions and classes
    Function,
    ArrowFunctionExpression,
    Class,
    ClassBody,
    MethodDefinition,
    PropertyDefinition,
    StaticBlock,
    AccessorProperty,

    // expressions
    Identifier,
    PrivateIdentifier,
    Literal,
    ThisExpression,
    Super,
    ArrayExpression,
    ObjectExpression,
    Property,
    SpreadElement,
    FunctionExpression,
    ClassExpression,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    ChainExpression,
    SequenceExpression,
    YieldExpression,
    AwaitExpression,
    ImportExpression,
    MetaProperty,
    TemplateLiteral,
    TaggedTemplateExpression,
    TemplateElement,

    // patterns
    ObjectPattern,
    ArrayPattern,
    RestElement,
    AssignmentPattern,

    /// Anything no rule distinguishes.
    Other,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Program => "Program",
            NodeType::VariableDeclaration => "VariableDeclaration",
            NodeType::FunctionDeclaration => "FunctionDeclaration",
            NodeType::ClassDeclaration => "ClassDeclaration",
            NodeType::ExpressionStatement => "ExpressionStatement",
            NodeType::BlockStatement => "BlockStatement",
            NodeType::ForOfStatement => "ForOfStatement",
            NodeType::CatchClause => "CatchClause",
            NodeType::ImportDeclaration => "ImportDeclaration",
            NodeType::ImportSpecifier => "ImportSpecifier",
            NodeType::ImportDefaultSpecifier => "ImportDefaultSpecifier",
            NodeType::ImportNamespaceSpecifier => "ImportNamespaceSpecifier",
            NodeType::ExportNamedDeclaration => "ExportNamedDeclaration",
            NodeType::ExportSpecifier => "ExportSpecifier",
            NodeType::ExportDefaultDeclaration => "ExportDefaultDeclaration",
            NodeType::ExportAllDeclaration => "ExportAllDeclaration",
            NodeType::Function => "Function",
            NodeType::ArrowFunctionExpression => "ArrowFunctionExpression",
            NodeType::Class => "Class",
            NodeType::ClassBody => "ClassBody",
            NodeType::MethodDefinition => "MethodDefinition",
            NodeType::PropertyDefinition => "PropertyDefinition",
            NodeType::StaticBlock => "StaticBlock",
            NodeType::AccessorProperty => "AccessorProperty",
            NodeType::Identifier => "Identifier",
            NodeType::PrivateIdentifier => "PrivateIdentifier",
            NodeType::Literal => "Literal",
            NodeType::ThisExpression => "ThisExpression",
            NodeType::Super => "Super",
            NodeType::ArrayExpression => "ArrayExpression",
            NodeType::ObjectExpression => "ObjectExpression",
            NodeType::Property => "Property",
            NodeType::SpreadElement => "SpreadElement",
            NodeType::FunctionExpression => "FunctionExpression",
            NodeType::ClassExpression => "ClassExpression",
            NodeType::UnaryExpression => "UnaryExpression",
            NodeType::UpdateExpression => "UpdateExpression",
            NodeType::BinaryExpression => "BinaryExpression",
            NodeType::LogicalExpression => "LogicalExpression",
            NodeType::AssignmentExpression => "AssignmentExpression",
            NodeType::ConditionalExpression => "ConditionalExpression",
            NodeType::CallExpression => "CallExpression",
            NodeType::NewExpression => "NewExpression",
            NodeType::MemberExpression => "MemberExpression",
            NodeType::ChainExpression => "ChainExpression",
            NodeType::SequenceExpression => "SequenceExpression",
            NodeType::YieldExpression => "YieldExpression",
            NodeType::AwaitExpression => "AwaitExpression",
            NodeType::ImportExpression => "ImportExpression",
            NodeType::MetaProperty => "MetaProperty",
            NodeType::TemplateLiteral => "TemplateLiteral",
            NodeType::TaggedTemplateExpression => "TaggedTemplateExpression",
            NodeType::TemplateElement => "TemplateElement",
            NodeType::ObjectPattern => "ObjectPattern",
            NodeType::ArrayPattern => "ArrayPattern",
            NodeType::RestElement => "RestElement",
            NodeType::AssignmentPattern => "AssignmentPattern",
            NodeType::Other => "Other",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of one node property as seen by a rule predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absent or `null`.
    Null,
    Bool(bool),
    Str(&'static str),
    /// A child node of the given kind.
    Node(NodeType),
    List(Vec<Value>),
    /// Present, but not something a rule compares by content.
    Opaque,
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::Str(s)
    }
}

impl From<NodeType> for Value {
    fn from(t: NodeType) -> Self {
        Value::Node(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Named properties of one visited node.
#[derive(Debug, Clone, Default)]
pub struct NodeProps {
    entries: Vec<(&'static str, Value)>,
}

impl NodeProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.entries.push((name, value.into()));
        self
    }

    /// Value of `name`; unknown properties read as [`Value::Null`].
    pub fn get(&self, name: &str) -> &Value {
        const NULL: &Value = &Value::Null;
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(NULL, |(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prop_reads_null() {
        let props = NodeProps::new().with("kind", "let").with("param", None::<NodeType>);
        assert_eq!(props.get("kind"), &Value::Str("let"));
        assert_eq!(props.get("param"), &Value::Null);
        assert_eq!(props.get("nonexistent"), &Value::Null);
    }
}
