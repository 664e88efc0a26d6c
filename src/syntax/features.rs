//! The built-in feature rule table, ES2015 through ES2022.

use std::sync::OnceLock;

use super::node::NodeType::*;
use super::rules::{eq, excluding_null, is, is_null, not, some, union, RuleSet, RuleSetBuilder};
use super::version::EsVersion;

/// Shared registry of every built-in rule, built on first use.
pub fn default_rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(build_default_rules)
}

fn build_default_rules() -> RuleSet {
    RuleSet::merge([es2015(), es2016(), es2017(), es2018(), es2019(), es2020(), es2021(), es2022()])
}

fn es2015() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2015)
        .intro("for-of")
        .defines_node(ForOfStatement)
        .intro("block-scoping")
        .extends_prop(VariableDeclaration, "kind", union([eq("let"), eq("const")]))
        .intro("object-super")
        .defines_node(Super)
        .extends_prop(CallExpression, "callee", is(Super))
        .extends_prop(MemberExpression, "object", is(Super))
        .intro("spread")
        .defines_node(SpreadElement)
        .extends_prop(ArrayExpression, "elements", some(excluding_null(is(SpreadElement))))
        .extends_prop(CallExpression, "arguments", some(is(SpreadElement)))
        .extends_prop(NewExpression, "arguments", some(is(SpreadElement)))
        .intro("method-properties")
        .extends_prop(Property, "method", eq(true))
        .intro("shorthand-properties")
        .extends_prop(Property, "shorthand", eq(true))
        .intro("computed-properties")
        .extends_prop(Property, "key", not(union([is(Literal), is(Identifier)])))
        .extends_prop(Property, "computed", eq(true))
        .intro("arrow-functions")
        .defines_node(ArrowFunctionExpression)
        .intro("generator-functions")
        .defines_node(YieldExpression)
        .extends_prop(Function, "generator", eq(true))
        .intro("template-literals")
        .defines_node(TemplateLiteral)
        .defines_node(TaggedTemplateExpression)
        .defines_node(TemplateElement)
        .intro("destructuring")
        .defines_node(ObjectPattern)
        .defines_node(ArrayPattern)
        .defines_node(RestElement)
        .defines_node(AssignmentPattern)
        .intro("classes")
        .defines_node(Class)
        .defines_node(ClassBody)
        .defines_node(MethodDefinition)
        .defines_node(ClassDeclaration)
        .defines_node(ClassExpression)
        .defines_node(MetaProperty)
        .intro("modules")
        .defines_node(ImportDeclaration)
        .defines_node(ImportSpecifier)
        .defines_node(ImportDefaultSpecifier)
        .defines_node(ImportNamespaceSpecifier)
        .defines_node(ExportNamedDeclaration)
        .defines_node(ExportSpecifier)
        .defines_node(ExportDefaultDeclaration)
        .defines_node(ExportAllDeclaration)
        .extends_prop(Program, "sourceType", eq("module"))
        .extends_prop(
            Program,
            "body",
            some(union([
                is(ImportDeclaration),
                is(ExportNamedDeclaration),
                is(ExportDefaultDeclaration),
                is(ExportAllDeclaration),
            ])),
        )
        .build()
}

fn es2016() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2016)
        .intro("exponentiation-operator")
        .extends_prop(BinaryExpression, "operator", eq("**"))
        .extends_prop(AssignmentExpression, "operator", eq("**="))
        .build()
}

fn es2017() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2017)
        .intro("async-functions")
        .extends_prop(Function, "async", eq(true))
        .defines_node(AwaitExpression)
        .build()
}

fn es2018() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2018)
        .intro("for-await-of")
        .extends_prop(ForOfStatement, "await", eq(true))
        .intro("object-spread")
        .extends_prop(ObjectExpression, "properties", some(is(SpreadElement)))
        .intro("object-destructuring")
        .extends_prop(ObjectPattern, "properties", some(is(RestElement)))
        .build()
}

fn es2019() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2019)
        .intro("optional-catch-binding")
        .extends_prop(CatchClause, "param", is_null())
        .build()
}

fn es2020() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2020)
        .intro("bigint")
        .extends_prop(Literal, "bigint", not(is_null()))
        .intro("optional-chaining")
        .defines_node(ChainExpression)
        .extends_prop(CallExpression, "optional", eq(true))
        .extends_prop(MemberExpression, "optional", eq(true))
        .intro("nullish-coalescing-operator")
        .extends_prop(LogicalExpression, "operator", eq("??"))
        .intro("dynamic-import")
        .defines_node(ImportExpression)
        .intro("export-namespace-from")
        .extends_prop(ExportAllDeclaration, "exported", not(is_null()))
        .build()
}

fn es2021() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2021)
        .intro("logical-assignment-operators")
        .extends_prop(
            AssignmentExpression,
            "operator",
            union([eq("||="), eq("&&="), eq("??=")]),
        )
        .build()
}

fn es2022() -> RuleSet {
    RuleSetBuilder::new(EsVersion::ES2022)
        .intro("class-properties")
        .defines_node(PropertyDefinition)
        .extends_prop(ClassBody, "body", some(union([is(PropertyDefinition), is(StaticBlock)])))
        .intro("private-properties")
        .defines_node(PrivateIdentifier)
        .extends_prop(MethodDefinition, "key", is(PrivateIdentifier))
        .extends_prop(MemberExpression, "property", is(PrivateIdentifier))
        .extends_prop(BinaryExpression, "left", is(PrivateIdentifier))
        .intro("class-static-block")
        .defines_node(StaticBlock)
        .intro("es2022-imports-exports")
        .extends_prop(ImportSpecifier, "imported", is(Literal))
        .extends_prop(ExportSpecifier, "local", is(Literal))
        .extends_prop(ExportSpecifier, "exported", is(Literal))
        .extends_prop(ExportAllDeclaration, "exported", not(is_null()))
        .build()
}
