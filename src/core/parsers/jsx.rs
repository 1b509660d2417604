//! JS/TS/JSX/TSX provider backed by swc.
//!
//! The swc AST is lowered into the generic tree. Only the parts the
//! extraction walker cares about get their own node kinds (markup, string
//! and template literals, binaries, conditionals, calls and references);
//! everything else becomes an opaque `Expression` node that still carries
//! any JSX or calls embedded in it.

use std::ops::Range;

use swc_common::{FileName, GLOBALS, Globals, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    BinaryOp, CallExpr, Callee, Expr, JSXAttrName, JSXAttrOrSpread, JSXAttrValue, JSXElement,
    JSXElementChild, JSXElementName, JSXExpr, JSXExprContainer, JSXFragment, JSXObject, Lit,
    MemberProp, OptChainBase, Tpl,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::{
    core::{
        parsers::{ParseOutcome, TreeProvider},
        tree::{NodeId, NodeKind, TreeBuilder},
    },
    utils::line_of_offset,
};

/// Parses `.js`, `.jsx`, `.ts`, `.tsx`, `.mjs` and `.cjs` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcTreeProvider;

impl TreeProvider for SwcTreeProvider {
    fn parse(&self, file_path: &str, content: &str) -> ParseOutcome {
        let Some(syntax) = syntax_for(file_path) else {
            return ParseOutcome::Unavailable;
        };

        GLOBALS.set(&Globals::new(), || {
            let source_map = SourceMap::default();
            let source_file =
                source_map.new_source_file(FileName::Real(file_path.into()).into(), content.to_string());
            let base = source_file.start_pos.0;

            let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
            match parser.parse_module() {
                Ok(module) => {
                    let mut lowering = Lowering::new(content, base);
                    let root = lowering.builder.root();
                    let mut collector = RootCollector {
                        lowering: &mut lowering,
                        parent: root,
                    };
                    module.visit_with(&mut collector);
                    ParseOutcome::Parsed(lowering.builder.finish())
                }
                Err(e) => {
                    let offset = (e.span().lo.0.saturating_sub(base) as usize).min(content.len());
                    ParseOutcome::Failed {
                        message: e.kind().msg().to_string(),
                        line: Some(line_of_offset(content, offset)),
                    }
                }
            }
        })
    }
}

fn syntax_for(file_path: &str) -> Option<Syntax> {
    let extension = file_path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())?;
    match extension.as_str() {
        "tsx" => Some(Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })),
        "ts" | "mts" | "cts" => Some(Syntax::Typescript(TsSyntax::default())),
        "js" | "jsx" | "mjs" | "cjs" => Some(Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })),
        _ => None,
    }
}

// ============================================================
// Lowering
// ============================================================

struct Lowering<'a> {
    content: &'a str,
    base: u32,
    builder: TreeBuilder,
}

impl<'a> Lowering<'a> {
    fn new(content: &'a str, base: u32) -> Self {
        Self {
            content,
            base,
            builder: TreeBuilder::new(content.len()),
        }
    }

    fn range(&self, span: Span) -> Range<usize> {
        let len = self.content.len();
        let start = (span.lo.0.saturating_sub(self.base) as usize).min(len);
        let end = (span.hi.0.saturating_sub(self.base) as usize).clamp(start, len);
        start..end
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        let range = self.range(span);
        self.builder.push(parent, kind, range)
    }

    fn element(&mut self, parent: NodeId, element: &JSXElement) {
        let tag = element_name(&element.opening.name);
        let id = self.push(parent, NodeKind::Element { tag }, element.span);

        for attr in &element.opening.attrs {
            match attr {
                JSXAttrOrSpread::JSXAttr(attr) => {
                    let name = match &attr.name {
                        JSXAttrName::Ident(ident) => ident.sym.to_string(),
                        JSXAttrName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
                    };
                    let attr_id = self.push(id, NodeKind::Attribute { name, bound: false }, attr.span);
                    match &attr.value {
                        Some(JSXAttrValue::Str(s)) => {
                            let value = s.value.as_str().unwrap_or_default().to_string();
                            self.push(attr_id, NodeKind::StringLiteral { value }, s.span);
                        }
                        Some(JSXAttrValue::JSXExprContainer(container)) => {
                            self.container(attr_id, container);
                        }
                        Some(JSXAttrValue::JSXElement(inner)) => self.element(attr_id, inner),
                        Some(JSXAttrValue::JSXFragment(fragment)) => self.fragment(attr_id, fragment),
                        None => {}
                    }
                }
                JSXAttrOrSpread::SpreadElement(spread) => {
                    let expr_id = self.push(id, NodeKind::Expression, spread.expr.span());
                    self.embedded(expr_id, &spread.expr);
                }
            }
        }

        self.children(id, &element.children);
    }

    fn fragment(&mut self, parent: NodeId, fragment: &JSXFragment) {
        let id = self.push(parent, NodeKind::Element { tag: String::new() }, fragment.span);
        self.children(id, &fragment.children);
    }

    fn children(&mut self, parent: NodeId, children: &[JSXElementChild]) {
        for child in children {
            match child {
                JSXElementChild::JSXText(text) => {
                    self.push(parent, NodeKind::Text, text.span);
                }
                JSXElementChild::JSXExprContainer(container) => self.container(parent, container),
                JSXElementChild::JSXSpreadChild(spread) => {
                    let id = self.push(parent, NodeKind::Expression, spread.span);
                    self.embedded(id, &spread.expr);
                }
                JSXElementChild::JSXElement(element) => self.element(parent, element),
                JSXElementChild::JSXFragment(fragment) => self.fragment(parent, fragment),
            }
        }
    }

    fn container(&mut self, parent: NodeId, container: &JSXExprContainer) {
        let id = self.push(parent, NodeKind::ExpressionContainer, container.span);
        match &container.expr {
            JSXExpr::Expr(expr) => self.expr(id, expr),
            JSXExpr::JSXEmptyExpr(empty) => {
                self.push(id, NodeKind::Comment, empty.span);
            }
        }
    }

    fn expr(&mut self, parent: NodeId, expr: &Expr) {
        match expr {
            Expr::Paren(paren) => self.expr(parent, &paren.expr),
            Expr::TsAs(e) => self.expr(parent, &e.expr),
            Expr::TsNonNull(e) => self.expr(parent, &e.expr),
            Expr::TsSatisfies(e) => self.expr(parent, &e.expr),
            Expr::TsConstAssertion(e) => self.expr(parent, &e.expr),
            Expr::TsTypeAssertion(e) => self.expr(parent, &e.expr),
            Expr::Lit(Lit::Str(s)) => {
                let value = s.value.as_str().unwrap_or_default().to_string();
                self.push(parent, NodeKind::StringLiteral { value }, s.span);
            }
            Expr::Tpl(tpl) => self.template(parent, tpl),
            Expr::Bin(bin) => {
                let op = match bin.op {
                    BinaryOp::Add => "+",
                    BinaryOp::LogicalOr => "||",
                    BinaryOp::LogicalAnd => "&&",
                    BinaryOp::NullishCoalescing => "??",
                    _ => "other",
                };
                let id = self.push(parent, NodeKind::Binary { op: op.to_string() }, bin.span);
                self.expr(id, &bin.left);
                self.expr(id, &bin.right);
            }
            Expr::Cond(cond) => {
                let id = self.push(parent, NodeKind::Conditional, cond.span);
                self.expr(id, &cond.test);
                self.expr(id, &cond.cons);
                self.expr(id, &cond.alt);
            }
            Expr::Call(call) => self.call(parent, call),
            Expr::Ident(ident) => {
                self.push(parent, NodeKind::Reference, ident.span);
            }
            Expr::Member(member) => {
                let id = self.push(parent, NodeKind::Reference, member.span);
                self.embedded(id, expr);
            }
            Expr::OptChain(chain) if matches!(&*chain.base, OptChainBase::Member(_)) => {
                let id = self.push(parent, NodeKind::Reference, chain.span);
                self.embedded(id, expr);
            }
            Expr::JSXElement(element) => self.element(parent, element),
            Expr::JSXFragment(fragment) => self.fragment(parent, fragment),
            other => {
                let id = self.push(parent, NodeKind::Expression, other.span());
                self.embedded(id, other);
            }
        }
    }

    fn call(&mut self, parent: NodeId, call: &CallExpr) {
        let callee = match &call.callee {
            Callee::Expr(callee) => callee_path(callee).unwrap_or_default(),
            _ => String::new(),
        };
        let id = self.push(parent, NodeKind::Call { callee }, call.span);
        if let Callee::Expr(callee) = &call.callee {
            self.embedded(id, callee);
        }
        for arg in &call.args {
            self.expr(id, &arg.expr);
        }
    }

    fn template(&mut self, parent: NodeId, tpl: &Tpl) {
        let id = self.push(parent, NodeKind::TemplateLiteral, tpl.span);
        for (i, quasi) in tpl.quasis.iter().enumerate() {
            let value = quasi
                .cooked
                .as_ref()
                .and_then(|cooked| cooked.as_str())
                .unwrap_or_else(|| quasi.raw.as_str())
                .to_string();
            self.push(id, NodeKind::TemplateChunk { value }, quasi.span);
            if let Some(expr) = tpl.exprs.get(i) {
                self.expr(id, expr);
            }
        }
    }

    /// Collects JSX and calls nested anywhere inside an opaque expression.
    fn embedded(&mut self, parent: NodeId, expr: &Expr) {
        let mut collector = RootCollector {
            lowering: self,
            parent,
        };
        match expr {
            // The node itself is already lowered; only look inside it.
            Expr::Member(member) => member.visit_children_with(&mut collector),
            Expr::OptChain(chain) => chain.visit_children_with(&mut collector),
            _ => expr.visit_children_with(&mut collector),
        }
    }
}

/// Lowers top-level markup and calls, skipping over everything else.
struct RootCollector<'l, 'a> {
    lowering: &'l mut Lowering<'a>,
    parent: NodeId,
}

impl Visit for RootCollector<'_, '_> {
    fn visit_jsx_element(&mut self, node: &JSXElement) {
        self.lowering.element(self.parent, node);
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.lowering.fragment(self.parent, node);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.lowering.call(self.parent, node);
    }
}

fn element_name(name: &JSXElementName) -> String {
    match name {
        JSXElementName::Ident(ident) => ident.sym.to_string(),
        JSXElementName::JSXMemberExpr(member) => {
            format!("{}.{}", jsx_object_name(&member.obj), member.prop.sym)
        }
        JSXElementName::JSXNamespacedName(ns) => format!("{}:{}", ns.ns.sym, ns.name.sym),
    }
}

fn jsx_object_name(obj: &JSXObject) -> String {
    match obj {
        JSXObject::Ident(ident) => ident.sym.to_string(),
        JSXObject::JSXMemberExpr(member) => {
            format!("{}.{}", jsx_object_name(&member.obj), member.prop.sym)
        }
    }
}

/// Dotted path of a callee such as `t` or `i18n.t`, if it is a plain path.
fn callee_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            Some(format!("{}.{}", callee_path(&member.obj)?, prop.sym))
        }
        Expr::Paren(paren) => callee_path(&paren.expr),
        _ => None,
    }
}
