//! Declaration classification
//!
//! Decides which nodes can carry a display name and extracts names that are
//! statically known. Pure functions of node shape.

use crate::tree::{NodeKind, SyntaxNode};

/// Kinds of node the search can report as an enclosing declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameableKind {
    FunctionDeclaration,
    FunctionExpression,
    MethodDeclaration,
    ArrowFunction,
    VariableDeclaration,
}

/// Classify a node as nameable or not
pub fn classify(node: &SyntaxNode) -> Option<NameableKind> {
    match node.kind {
        NodeKind::FunctionDeclaration => Some(NameableKind::FunctionDeclaration),
        NodeKind::FunctionExpression => Some(NameableKind::FunctionExpression),
        NodeKind::MethodDeclaration => Some(NameableKind::MethodDeclaration),
        NodeKind::ArrowFunction => Some(NameableKind::ArrowFunction),
        NodeKind::VariableDeclaration => Some(NameableKind::VariableDeclaration),
        NodeKind::Module
        | NodeKind::ClassDeclaration
        | NodeKind::PropertyDeclaration
        | NodeKind::Other => None,
    }
}

/// Statically known name of a nameable node
///
/// Function expressions and arrow functions are always anonymous here, even
/// when the source gives the expression its own identifier. They can only be
/// named by an enclosing variable declaration.
pub fn static_name(node: &SyntaxNode) -> Option<&str> {
    match classify(node)? {
        NameableKind::FunctionDeclaration
        | NameableKind::MethodDeclaration
        | NameableKind::VariableDeclaration => non_empty(node.declared_name.as_deref()),
        NameableKind::FunctionExpression | NameableKind::ArrowFunction => None,
    }
}

/// Name a node exposes to the "anonymous in X" composition rule
///
/// Same as `static_name`, plus class and property declarations and named
/// function expressions. Those never name themselves but still have a name
/// for an anonymous function nested inside them.
pub fn exposed_name(node: &SyntaxNode) -> Option<&str> {
    match node.kind {
        NodeKind::ClassDeclaration
        | NodeKind::PropertyDeclaration
        | NodeKind::FunctionExpression => non_empty(node.declared_name.as_deref()),
        _ => static_name(node),
    }
}

fn non_empty(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty())
}
