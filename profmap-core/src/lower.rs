//! Lowering of the SWC AST into the naming tree
//!
//! Global invariants enforced:
//! - Children are stored in document order
//! - Nodes with dummy spans are skipped and their children hoisted
//!
//! Lowered constructs:
//! - Function declarations (`FnDecl`, named `export default function`)
//! - Function expressions (`FnExpr`) and arrow functions (`ArrowExpr`)
//! - Class methods, private methods, object methods, accessors, constructors
//! - Variable declarators, with their initializer flagged
//! - Class declarations, class properties, object `key: value` properties
//! - Every other statement and expression as `Other`
//!
//! Columns are counted in UTF-16 code units, the unit trace and sourcemap
//! columns use, so astral characters such as emoji count twice.
//!
//! Parentheses and TypeScript type wrappers (`as`, `satisfies`, `!`,
//! `<T>expr`, `as const`) produce no node, so `const f = (() => {}) as Fn`
//! still sees the arrow as the initializer of `f`.

use crate::position::PositionRange;
use crate::tree::{NodeKind, SyntaxNode};
use swc_common::{SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Build a naming tree from a parsed program
///
/// The root spans the whole source text, from 1:0 to the start of its last line.
pub fn lower_program(program: &Program, source_map: &SourceMap, src: &str) -> SyntaxNode {
    let last_line = src.lines().count().max(1) as u32;
    let root = SyntaxNode::new(NodeKind::Module, PositionRange::from_coords(1, 0, last_line, 0));

    let mut builder = TreeBuilder {
        source_map,
        src,
        line_starts: line_starts(src),
        stack: vec![root],
        pending_initializer: false,
    };
    program.visit_with(&mut builder);
    builder.finish()
}

fn line_starts(src: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(src.match_indices('\n').map(|(index, _)| index + 1))
        .collect()
}

/// Visitor that mirrors the AST as a stack of open nodes
struct TreeBuilder<'a> {
    source_map: &'a SourceMap,
    src: &'a str,
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
    stack: Vec<SyntaxNode>,
    /// Set while visiting a variable initializer; consumed by the next node opened
    pending_initializer: bool,
}

impl TreeBuilder<'_> {
    fn range(&self, span: Span) -> PositionRange {
        let start = self.source_map.lookup_char_pos(span.lo);
        let end = self.source_map.lookup_char_pos(span.hi);
        PositionRange::from_coords(
            start.line as u32,
            self.utf16_column(start.line, start.col.0),
            end.line as u32,
            self.utf16_column(end.line, end.col.0),
        )
    }

    /// Convert a 0-based character column on a 1-based line to UTF-16 units
    fn utf16_column(&self, line: usize, char_column: usize) -> u32 {
        let text = self
            .line_starts
            .get(line.saturating_sub(1))
            .and_then(|&start| self.src.get(start..))
            .unwrap_or_default();
        let units: usize = text.chars().take(char_column).map(char::len_utf16).sum();
        units as u32
    }

    /// Open a node, visit its children with `visit_children`, then close it
    fn with_node(
        &mut self,
        kind: NodeKind,
        span: Span,
        name: Option<String>,
        visit_children: impl FnOnce(&mut Self),
    ) {
        if span.is_dummy() {
            visit_children(self);
            return;
        }

        let mut node = SyntaxNode::new(kind, self.range(span));
        node.declared_name = name;
        node.is_initializer = std::mem::take(&mut self.pending_initializer);

        self.stack.push(node);
        visit_children(self);
        if let Some(mut node) = self.stack.pop() {
            node.children.sort_by_key(|child| child.range.start);
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(node);
            }
        }
    }

    fn finish(mut self) -> SyntaxNode {
        // Only the root is left once the visit has unwound
        let mut root = self.stack.swap_remove(0);
        root.children.sort_by_key(|child| child.range.start);
        root
    }
}

/// Name of a property key, when it is statically known
fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        // Wtf8Atom to String via to_atom_lossy (borrows when possible)
        PropName::Str(str_lit) => Some(str_lit.value.to_atom_lossy().to_string()),
        PropName::Num(num) => Some(num.to_string()),
        PropName::Computed(_) | PropName::BigInt(_) => None,
    }
}

fn private_name(key: &PrivateName) -> String {
    format!("#{}", key.name)
}

impl Visit for TreeBuilder<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // These open their own nodes
            Stmt::Decl(Decl::Fn(_)) | Stmt::Decl(Decl::Class(_)) => stmt.visit_children_with(self),
            _ => self.with_node(NodeKind::Other, stmt.span(), None, |this| {
                stmt.visit_children_with(this)
            }),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Fn(_)
            | Expr::Arrow(_)
            | Expr::Paren(_)
            | Expr::TsAs(_)
            | Expr::TsSatisfies(_)
            | Expr::TsNonNull(_)
            | Expr::TsTypeAssertion(_)
            | Expr::TsConstAssertion(_) => expr.visit_children_with(self),
            _ => self.with_node(NodeKind::Other, expr.span(), None, |this| {
                expr.visit_children_with(this)
            }),
        }
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        let name = Some(decl.ident.sym.to_string());
        self.with_node(NodeKind::FunctionDeclaration, decl.function.span, name, |this| {
            decl.function.visit_with(this)
        });
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        // Recorded, but never used as a display name
        let name = expr.ident.as_ref().map(|id| id.sym.to_string());
        self.with_node(NodeKind::FunctionExpression, expr.function.span, name, |this| {
            expr.function.visit_with(this)
        });
    }

    fn visit_arrow_expr(&mut self, arrow: &ArrowExpr) {
        self.with_node(NodeKind::ArrowFunction, arrow.span, None, |this| {
            arrow.visit_children_with(this)
        });
    }

    fn visit_export_default_decl(&mut self, export: &ExportDefaultDecl) {
        match &export.decl {
            // `export default function foo() {}` declares `foo`
            DefaultDecl::Fn(FnExpr {
                ident: Some(ident),
                function,
                ..
            }) => {
                let name = Some(ident.sym.to_string());
                self.with_node(NodeKind::FunctionDeclaration, function.span, name, |this| {
                    function.visit_with(this)
                });
            }
            DefaultDecl::Class(ClassExpr {
                ident: Some(ident),
                class,
                ..
            }) => {
                let name = Some(ident.sym.to_string());
                self.with_node(NodeKind::ClassDeclaration, class.span, name, |this| {
                    class.visit_with(this)
                });
            }
            _ => export.visit_children_with(self),
        }
    }

    fn visit_class_method(&mut self, method: &ClassMethod) {
        let name = prop_name(&method.key);
        self.with_node(NodeKind::MethodDeclaration, method.span, name, |this| {
            method.visit_children_with(this)
        });
    }

    fn visit_private_method(&mut self, method: &PrivateMethod) {
        let name = Some(private_name(&method.key));
        self.with_node(NodeKind::MethodDeclaration, method.span, name, |this| {
            method.visit_children_with(this)
        });
    }

    fn visit_constructor(&mut self, ctor: &Constructor) {
        let name = Some("constructor".to_string());
        self.with_node(NodeKind::MethodDeclaration, ctor.span, name, |this| {
            ctor.visit_children_with(this)
        });
    }

    fn visit_method_prop(&mut self, method: &MethodProp) {
        let name = prop_name(&method.key);
        let span = Span::new(method.key.span().lo, method.function.span.hi);
        self.with_node(NodeKind::MethodDeclaration, span, name, |this| {
            method.visit_children_with(this)
        });
    }

    fn visit_getter_prop(&mut self, getter: &GetterProp) {
        let name = prop_name(&getter.key);
        self.with_node(NodeKind::MethodDeclaration, getter.span, name, |this| {
            getter.visit_children_with(this)
        });
    }

    fn visit_setter_prop(&mut self, setter: &SetterProp) {
        let name = prop_name(&setter.key);
        self.with_node(NodeKind::MethodDeclaration, setter.span, name, |this| {
            setter.visit_children_with(this)
        });
    }

    fn visit_var_declarator(&mut self, decl: &VarDeclarator) {
        let name = match &decl.name {
            Pat::Ident(binding) => Some(binding.id.sym.to_string()),
            _ => None,
        };

        self.with_node(NodeKind::VariableDeclaration, decl.span, name, |this| {
            decl.name.visit_with(this);
            if let Some(init) = &decl.init {
                this.pending_initializer = true;
                (**init).visit_with(this);
                this.pending_initializer = false;
            }
        });
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        let name = Some(decl.ident.sym.to_string());
        self.with_node(NodeKind::ClassDeclaration, decl.class.span, name, |this| {
            decl.class.visit_with(this)
        });
    }

    fn visit_class_prop(&mut self, prop: &ClassProp) {
        let name = prop_name(&prop.key);
        self.with_node(NodeKind::PropertyDeclaration, prop.span, name, |this| {
            prop.visit_children_with(this)
        });
    }

    fn visit_private_prop(&mut self, prop: &PrivateProp) {
        let name = Some(private_name(&prop.key));
        self.with_node(NodeKind::PropertyDeclaration, prop.span, name, |this| {
            prop.visit_children_with(this)
        });
    }

    fn visit_key_value_prop(&mut self, prop: &KeyValueProp) {
        let name = prop_name(&prop.key);
        let span = Span::new(prop.key.span().lo, prop.value.span().hi);
        self.with_node(NodeKind::PropertyDeclaration, span, name, |this| {
            prop.visit_children_with(this)
        });
    }
}

#[cfg(test)]
#[path = "lower/tests.rs"]
mod tests;
