//! Evidence Collector: one AST walk that runs every registered rule.
//!
//! # Data Flow
//! ```text
//! swc node ──visit_*──▶ (NodeType, NodeProps) ──RuleSet::rules_for──▶ Evidence*
//! ```
//!
//! # Design Decisions
//! - Each visited node is projected to its ESTree kind; some swc nodes
//!   yield several views (a class is both `Class` and `ClassBody`, an
//!   arrow is also a `Function`)
//! - Property values are only built when rules exist for the node kind
//! - All rules for a kind run, so one node can evidence several features

use swc_core::ecma::ast;
use swc_core::ecma::visit::{Visit, VisitWith};

use super::node::{NodeProps, NodeType, Value};
use super::rules::{Evidence, RuleSet};

/// Walk `program` and return every evidence fired, duplicates included.
pub fn collect_evidences(program: &ast::Program, rules: &RuleSet) -> Vec<Evidence> {
    let mut collector = EvidenceCollector::new(rules);
    program.visit_with(&mut collector);
    collector.into_evidences()
}

/// Per-walk accumulator.
pub struct EvidenceCollector<'r> {
    rules: &'r RuleSet,
    evidences: Vec<Evidence>,
}

impl<'r> EvidenceCollector<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            evidences: Vec::new(),
        }
    }

    pub fn into_evidences(self) -> Vec<Evidence> {
        self.evidences
    }

    fn observe(&mut self, node_type: NodeType, props: impl FnOnce() -> NodeProps) {
        let rules = self.rules.rules_for(node_type);
        if rules.is_empty() {
            return;
        }
        let props = props();
        self.evidences
            .extend(rules.iter().filter_map(|rule| rule.apply(node_type, &props)));
    }

    fn observe_node(&mut self, node_type: NodeType) {
        self.observe(node_type, NodeProps::new);
    }
}

fn is_logical(op: ast::BinaryOp) -> bool {
    matches!(
        op,
        ast::BinaryOp::LogicalOr | ast::BinaryOp::LogicalAnd | ast::BinaryOp::NullishCoalescing
    )
}

fn expr_type(expr: &ast::Expr) -> NodeType {
    use ast::Expr;

    match expr {
        Expr::This(_) => NodeType::ThisExpression,
        Expr::Array(_) => NodeType::ArrayExpression,
        Expr::Object(_) => NodeType::ObjectExpression,
        Expr::Fn(_) => NodeType::FunctionExpression,
        Expr::Unary(_) => NodeType::UnaryExpression,
        Expr::Update(_) => NodeType::UpdateExpression,
        Expr::Bin(bin) if is_logical(bin.op) => NodeType::LogicalExpression,
        Expr::Bin(_) => NodeType::BinaryExpression,
        Expr::Assign(_) => NodeType::AssignmentExpression,
        Expr::Member(_) | Expr::SuperProp(_) => NodeType::MemberExpression,
        Expr::Cond(_) => NodeType::ConditionalExpression,
        Expr::Call(call) => callee_call_type(&call.callee),
        Expr::New(_) => NodeType::NewExpression,
        Expr::Seq(_) => NodeType::SequenceExpression,
        Expr::Ident(_) => NodeType::Identifier,
        Expr::Lit(_) => NodeType::Literal,
        Expr::Tpl(_) => NodeType::TemplateLiteral,
        Expr::TaggedTpl(_) => NodeType::TaggedTemplateExpression,
        Expr::Arrow(_) => NodeType::ArrowFunctionExpression,
        Expr::Class(_) => NodeType::ClassExpression,
        Expr::Yield(_) => NodeType::YieldExpression,
        Expr::MetaProp(_) => NodeType::MetaProperty,
        Expr::Await(_) => NodeType::AwaitExpression,
        // ESTree keeps no node for parentheses
        Expr::Paren(paren) => expr_type(&paren.expr),
        Expr::PrivateName(_) => NodeType::PrivateIdentifier,
        Expr::OptChain(_) => NodeType::ChainExpression,
        _ => NodeType::Other,
    }
}

/// `import(...)` is its own node kind, not a call.
fn callee_call_type(callee: &ast::Callee) -> NodeType {
    match callee {
        ast::Callee::Import(_) => NodeType::ImportExpression,
        _ => NodeType::CallExpression,
    }
}

fn callee_type(callee: &ast::Callee) -> NodeType {
    match callee {
        ast::Callee::Super(_) => NodeType::Super,
        ast::Callee::Import(_) => NodeType::Other,
        ast::Callee::Expr(expr) => expr_type(expr),
    }
}

fn pat_type(pat: &ast::Pat) -> NodeType {
    match pat {
        ast::Pat::Ident(_) => NodeType::Identifier,
        ast::Pat::Array(_) => NodeType::ArrayPattern,
        ast::Pat::Rest(_) => NodeType::RestElement,
        ast::Pat::Object(_) => NodeType::ObjectPattern,
        ast::Pat::Assign(_) => NodeType::AssignmentPattern,
        ast::Pat::Expr(expr) => expr_type(expr),
        _ => NodeType::Other,
    }
}

fn prop_name_type(key: &ast::PropName) -> NodeType {
    match key {
        ast::PropName::Ident(_) => NodeType::Identifier,
        ast::PropName::Str(_) | ast::PropName::Num(_) | ast::PropName::BigInt(_) => NodeType::Literal,
        ast::PropName::Computed(computed) => expr_type(&computed.expr),
    }
}

fn member_prop_type(prop: &ast::MemberProp) -> NodeType {
    match prop {
        ast::MemberProp::Ident(_) => NodeType::Identifier,
        ast::MemberProp::PrivateName(_) => NodeType::PrivateIdentifier,
        ast::MemberProp::Computed(computed) => expr_type(&computed.expr),
    }
}

fn export_name_type(name: &ast::ModuleExportName) -> NodeType {
    match name {
        ast::ModuleExportName::Ident(_) => NodeType::Identifier,
        ast::ModuleExportName::Str(_) => NodeType::Literal,
    }
}

fn stmt_type(stmt: &ast::Stmt) -> NodeType {
    match stmt {
        ast::Stmt::Decl(ast::Decl::Var(_)) => NodeType::VariableDeclaration,
        ast::Stmt::Decl(ast::Decl::Fn(_)) => NodeType::FunctionDeclaration,
        ast::Stmt::Decl(ast::Decl::Class(_)) => NodeType::ClassDeclaration,
        ast::Stmt::Expr(_) => NodeType::ExpressionStatement,
        ast::Stmt::Block(_) => NodeType::BlockStatement,
        ast::Stmt::ForOf(_) => NodeType::ForOfStatement,
        _ => NodeType::Other,
    }
}

/// `export * as ns from "m"` parses as a named export in swc but is an
/// export-all declaration in ESTree.
fn namespace_reexport(export: &ast::NamedExport) -> Option<&ast::ExportNamespaceSpecifier> {
    export.specifiers.iter().find_map(|specifier| match specifier {
        ast::ExportSpecifier::Namespace(namespace) => Some(namespace),
        _ => None,
    })
}

fn module_decl_type(decl: &ast::ModuleDecl) -> NodeType {
    match decl {
        ast::ModuleDecl::Import(_) => NodeType::ImportDeclaration,
        ast::ModuleDecl::ExportNamed(export) if namespace_reexport(export).is_some() => {
            NodeType::ExportAllDeclaration
        }
        ast::ModuleDecl::ExportDecl(_) | ast::ModuleDecl::ExportNamed(_) => NodeType::ExportNamedDeclaration,
        ast::ModuleDecl::ExportDefaultDecl(_) | ast::ModuleDecl::ExportDefaultExpr(_) => {
            NodeType::ExportDefaultDeclaration
        }
        ast::ModuleDecl::ExportAll(_) => NodeType::ExportAllDeclaration,
        _ => NodeType::Other,
    }
}

fn class_member_type(member: &ast::ClassMember) -> Option<NodeType> {
    match member {
        ast::ClassMember::Constructor(_) | ast::ClassMember::Method(_) | ast::ClassMember::PrivateMethod(_) => {
            Some(NodeType::MethodDefinition)
        }
        ast::ClassMember::ClassProp(_) | ast::ClassMember::PrivateProp(_) => Some(NodeType::PropertyDefinition),
        ast::ClassMember::StaticBlock(_) => Some(NodeType::StaticBlock),
        ast::ClassMember::AutoAccessor(_) => Some(NodeType::AccessorProperty),
        _ => None,
    }
}

fn arguments(args: &[ast::ExprOrSpread]) -> Value {
    Value::List(
        args.iter()
            .map(|arg| match arg.spread {
                Some(_) => Value::Node(NodeType::SpreadElement),
                None => Value::Node(expr_type(&arg.expr)),
            })
            .collect(),
    )
}

fn node_list(types: impl Iterator<Item = NodeType>) -> Value {
    Value::List(types.map(Value::Node).collect())
}

fn function_props(is_async: bool, is_generator: bool) -> NodeProps {
    NodeProps::new()
        .with("async", is_async)
        .with("generator", is_generator)
}

fn method_props(key: NodeType) -> NodeProps {
    NodeProps::new().with("key", key)
}

impl Visit for EvidenceCollector<'_> {
    fn visit_module(&mut self, n: &ast::Module) {
        self.observe(NodeType::Program, || {
            let body = n.body.iter().map(|item| match item {
                ast::ModuleItem::ModuleDecl(decl) => module_decl_type(decl),
                ast::ModuleItem::Stmt(stmt) => stmt_type(stmt),
            });
            NodeProps::new()
                .with("sourceType", "module")
                .with("body", node_list(body))
        });
        n.visit_children_with(self);
    }

    fn visit_script(&mut self, n: &ast::Script) {
        self.observe(NodeType::Program, || {
            NodeProps::new()
                .with("sourceType", "script")
                .with("body", node_list(n.body.iter().map(stmt_type)))
        });
        n.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, n: &ast::VarDecl) {
        self.observe(NodeType::VariableDeclaration, || {
            NodeProps::new().with("kind", n.kind.as_str())
        });
        n.visit_children_with(self);
    }

    fn visit_for_of_stmt(&mut self, n: &ast::ForOfStmt) {
        self.observe(NodeType::ForOfStatement, || NodeProps::new().with("await", n.is_await));
        n.visit_children_with(self);
    }

    fn visit_catch_clause(&mut self, n: &ast::CatchClause) {
        self.observe(NodeType::CatchClause, || {
            NodeProps::new().with("param", n.param.as_ref().map(pat_type))
        });
        n.visit_children_with(self);
    }

    fn visit_super(&mut self, _: &ast::Super) {
        self.observe_node(NodeType::Super);
    }

    fn visit_call_expr(&mut self, n: &ast::CallExpr) {
        match &n.callee {
            ast::Callee::Import(_) => self.observe_node(NodeType::ImportExpression),
            callee => self.observe(NodeType::CallExpression, || {
                NodeProps::new()
                    .with("callee", callee_type(callee))
                    .with("arguments", arguments(&n.args))
                    .with("optional", false)
            }),
        }
        n.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, n: &ast::NewExpr) {
        self.observe(NodeType::NewExpression, || {
            NodeProps::new().with(
                "arguments",
                n.args.as_deref().map_or(Value::List(Vec::new()), arguments),
            )
        });
        n.visit_children_with(self);
    }

    fn visit_member_expr(&mut self, n: &ast::MemberExpr) {
        self.observe(NodeType::MemberExpression, || {
            NodeProps::new()
                .with("object", expr_type(&n.obj))
                .with("property", member_prop_type(&n.prop))
                .with("optional", false)
        });
        n.visit_children_with(self);
    }

    fn visit_super_prop_expr(&mut self, n: &ast::SuperPropExpr) {
        self.observe(NodeType::MemberExpression, || {
            let property = match &n.prop {
                ast::SuperProp::Computed(computed) => expr_type(&computed.expr),
                _ => NodeType::Identifier,
            };
            NodeProps::new()
                .with("object", NodeType::Super)
                .with("property", property)
                .with("optional", false)
        });
        n.visit_children_with(self);
    }

    fn visit_opt_chain_expr(&mut self, n: &ast::OptChainExpr) {
        self.observe_node(NodeType::ChainExpression);
        match &*n.base {
            ast::OptChainBase::Member(member) => self.observe(NodeType::MemberExpression, || {
                NodeProps::new()
                    .with("object", expr_type(&member.obj))
                    .with("property", member_prop_type(&member.prop))
                    .with("optional", n.optional)
            }),
            ast::OptChainBase::Call(call) => self.observe(NodeType::CallExpression, || {
                NodeProps::new()
                    .with("callee", expr_type(&call.callee))
                    .with("arguments", arguments(&call.args))
                    .with("optional", n.optional)
            }),
        }
        n.visit_children_with(self);
    }

    fn visit_expr_or_spread(&mut self, n: &ast::ExprOrSpread) {
        if n.spread.is_some() {
            self.observe_node(NodeType::SpreadElement);
        }
        n.visit_children_with(self);
    }

    fn visit_spread_element(&mut self, n: &ast::SpreadElement) {
        self.observe_node(NodeType::SpreadElement);
        n.visit_children_with(self);
    }

    fn visit_array_lit(&mut self, n: &ast::ArrayLit) {
        self.observe(NodeType::ArrayExpression, || {
            let elements = n
                .elems
                .iter()
                .map(|element| match element {
                    None => Value::Null,
                    Some(element) if element.spread.is_some() => Value::Node(NodeType::SpreadElement),
                    Some(element) => Value::Node(expr_type(&element.expr)),
                })
                .collect();
            NodeProps::new().with("elements", Value::List(elements))
        });
        n.visit_children_with(self);
    }

    fn visit_object_lit(&mut self, n: &ast::ObjectLit) {
        self.observe(NodeType::ObjectExpression, || {
            let properties = n.props.iter().map(|prop| match prop {
                ast::PropOrSpread::Spread(_) => NodeType::SpreadElement,
                ast::PropOrSpread::Prop(_) => NodeType::Property,
            });
            NodeProps::new().with("properties", node_list(properties))
        });
        n.visit_children_with(self);
    }

    fn visit_prop(&mut self, n: &ast::Prop) {
        self.observe(NodeType::Property, || {
            let (key, shorthand, method) = match n {
                ast::Prop::Shorthand(_) | ast::Prop::Assign(_) => (None, true, false),
                ast::Prop::KeyValue(prop) => (Some(&prop.key), false, false),
                ast::Prop::Getter(prop) => (Some(&prop.key), false, false),
                ast::Prop::Setter(prop) => (Some(&prop.key), false, false),
                ast::Prop::Method(prop) => (Some(&prop.key), false, true),
            };
            let computed = matches!(key, Some(ast::PropName::Computed(_)));
            NodeProps::new()
                .with("key", key.map_or(NodeType::Identifier, prop_name_type))
                .with("computed", computed)
                .with("shorthand", shorthand)
                .with("method", method)
        });
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &ast::Function) {
        self.observe(NodeType::Function, || function_props(n.is_async, n.is_generator));
        n.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, n: &ast::ArrowExpr) {
        self.observe_node(NodeType::ArrowFunctionExpression);
        self.observe(NodeType::Function, || function_props(n.is_async, n.is_generator));
        n.visit_children_with(self);
    }

    fn visit_yield_expr(&mut self, n: &ast::YieldExpr) {
        self.observe_node(NodeType::YieldExpression);
        n.visit_children_with(self);
    }

    fn visit_await_expr(&mut self, n: &ast::AwaitExpr) {
        self.observe_node(NodeType::AwaitExpression);
        n.visit_children_with(self);
    }

    fn visit_tpl(&mut self, n: &ast::Tpl) {
        self.observe_node(NodeType::TemplateLiteral);
        n.visit_children_with(self);
    }

    fn visit_tagged_tpl(&mut self, n: &ast::TaggedTpl) {
        self.observe_node(NodeType::TaggedTemplateExpression);
        n.visit_children_with(self);
    }

    fn visit_tpl_element(&mut self, _: &ast::TplElement) {
        self.observe_node(NodeType::TemplateElement);
    }

    fn visit_object_pat(&mut self, n: &ast::ObjectPat) {
        self.observe(NodeType::ObjectPattern, || {
            let properties = n.props.iter().map(|prop| match prop {
                ast::ObjectPatProp::Rest(_) => NodeType::RestElement,
                _ => NodeType::Property,
            });
            NodeProps::new().with("properties", node_list(properties))
        });
        n.visit_children_with(self);
    }

    fn visit_array_pat(&mut self, n: &ast::ArrayPat) {
        self.observe_node(NodeType::ArrayPattern);
        n.visit_children_with(self);
    }

    fn visit_rest_pat(&mut self, n: &ast::RestPat) {
        self.observe_node(NodeType::RestElement);
        n.visit_children_with(self);
    }

    fn visit_assign_pat(&mut self, n: &ast::AssignPat) {
        self.observe_node(NodeType::AssignmentPattern);
        n.visit_children_with(self);
    }

    fn visit_assign_pat_prop(&mut self, n: &ast::AssignPatProp) {
        if n.value.is_some() {
            self.observe_node(NodeType::AssignmentPattern);
        }
        n.visit_children_with(self);
    }

    fn visit_class(&mut self, n: &ast::Class) {
        self.observe_node(NodeType::Class);
        self.observe(NodeType::ClassBody, || {
            let body = n.body.iter().filter_map(class_member_type);
            NodeProps::new().with("body", node_list(body))
        });
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ast::ClassDecl) {
        self.observe_node(NodeType::ClassDeclaration);
        n.visit_children_with(self);
    }

    fn visit_class_expr(&mut self, n: &ast::ClassExpr) {
        self.observe_node(NodeType::ClassExpression);
        n.visit_children_with(self);
    }

    fn visit_constructor(&mut self, n: &ast::Constructor) {
        self.observe(NodeType::MethodDefinition, || method_props(prop_name_type(&n.key)));
        n.visit_children_with(self);
    }

    fn visit_class_method(&mut self, n: &ast::ClassMethod) {
        self.observe(NodeType::MethodDefinition, || method_props(prop_name_type(&n.key)));
        n.visit_children_with(self);
    }

    fn visit_private_method(&mut self, n: &ast::PrivateMethod) {
        self.observe(NodeType::MethodDefinition, || method_props(NodeType::PrivateIdentifier));
        n.visit_children_with(self);
    }

    fn visit_class_prop(&mut self, n: &ast::ClassProp) {
        self.observe_node(NodeType::PropertyDefinition);
        n.visit_children_with(self);
    }

    fn visit_private_prop(&mut self, n: &ast::PrivateProp) {
        self.observe_node(NodeType::PropertyDefinition);
        n.visit_children_with(self);
    }

    fn visit_static_block(&mut self, n: &ast::StaticBlock) {
        self.observe_node(NodeType::StaticBlock);
        n.visit_children_with(self);
    }

    fn visit_private_name(&mut self, _: &ast::PrivateName) {
        self.observe_node(NodeType::PrivateIdentifier);
    }

    fn visit_meta_prop_expr(&mut self, n: &ast::MetaPropExpr) {
        self.observe_node(NodeType::MetaProperty);
        n.visit_children_with(self);
    }

    fn visit_bin_expr(&mut self, n: &ast::BinExpr) {
        let node_type = if is_logical(n.op) {
            NodeType::LogicalExpression
        } else {
            NodeType::BinaryExpression
        };
        self.observe(node_type, || {
            NodeProps::new()
                .with("operator", n.op.as_str())
                .with("left", expr_type(&n.left))
        });
        n.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, n: &ast::AssignExpr) {
        self.observe(NodeType::AssignmentExpression, || {
            NodeProps::new().with("operator", n.op.as_str())
        });
        n.visit_children_with(self);
    }

    fn visit_lit(&mut self, n: &ast::Lit) {
        self.observe(NodeType::Literal, || {
            let bigint = matches!(n, ast::Lit::BigInt(_)).then_some(Value::Opaque);
            NodeProps::new().with("bigint", bigint)
        });
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ast::ImportDecl) {
        self.observe_node(NodeType::ImportDeclaration);
        n.visit_children_with(self);
    }

    fn visit_import_named_specifier(&mut self, n: &ast::ImportNamedSpecifier) {
        self.observe(NodeType::ImportSpecifier, || {
            let imported = n.imported.as_ref().map_or(NodeType::Identifier, export_name_type);
            NodeProps::new().with("imported", imported)
        });
        n.visit_children_with(self);
    }

    fn visit_import_default_specifier(&mut self, n: &ast::ImportDefaultSpecifier) {
        self.observe_node(NodeType::ImportDefaultSpecifier);
        n.visit_children_with(self);
    }

    fn visit_import_star_as_specifier(&mut self, n: &ast::ImportStarAsSpecifier) {
        self.observe_node(NodeType::ImportNamespaceSpecifier);
        n.visit_children_with(self);
    }

    fn visit_export_decl(&mut self, n: &ast::ExportDecl) {
        self.observe_node(NodeType::ExportNamedDeclaration);
        n.visit_children_with(self);
    }

    fn visit_named_export(&mut self, n: &ast::NamedExport) {
        match namespace_reexport(n) {
            Some(namespace) => self.observe(NodeType::ExportAllDeclaration, || {
                NodeProps::new().with("exported", export_name_type(&namespace.name))
            }),
            None => self.observe_node(NodeType::ExportNamedDeclaration),
        }
        n.visit_children_with(self);
    }

    fn visit_export_named_specifier(&mut self, n: &ast::ExportNamedSpecifier) {
        self.observe(NodeType::ExportSpecifier, || {
            let local = export_name_type(&n.orig);
            let exported = n.exported.as_ref().map_or(local, export_name_type);
            NodeProps::new().with("local", local).with("exported", exported)
        });
        n.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, n: &ast::ExportDefaultDecl) {
        self.observe_node(NodeType::ExportDefaultDeclaration);
        n.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, n: &ast::ExportDefaultExpr) {
        self.observe_node(NodeType::ExportDefaultDeclaration);
        n.visit_children_with(self);
    }

    fn visit_export_all(&mut self, n: &ast::ExportAll) {
        self.observe(NodeType::ExportAllDeclaration, || {
            NodeProps::new().with("exported", Value::Null)
        });
        n.visit_children_with(self);
    }
}
