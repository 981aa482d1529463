//! Syntax tree model used by the enclosing-name search
//!
//! Global invariants enforced:
//! - Children are stored in document order
//! - Trees are immutable after construction and hold no back references

use crate::position::PositionRange;

/// Kind tag for a node in the lowered syntax tree
///
/// This is a closed set: every parser construct that matters for naming maps
/// to one of these, everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root of a parsed file
    Module,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    /// Class methods, object methods, accessors and constructors
    MethodDeclaration,
    /// A single variable declarator (`x = ...` inside `const x = ...`)
    VariableDeclaration,
    ClassDeclaration,
    /// Class properties and object `key: value` properties
    PropertyDeclaration,
    /// Any other statement or expression
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::FunctionDeclaration => "function_declaration",
            NodeKind::FunctionExpression => "function_expression",
            NodeKind::ArrowFunction => "arrow_function",
            NodeKind::MethodDeclaration => "method_declaration",
            NodeKind::VariableDeclaration => "variable_declaration",
            NodeKind::ClassDeclaration => "class_declaration",
            NodeKind::PropertyDeclaration => "property_declaration",
            NodeKind::Other => "other",
        }
    }
}

/// A node in the lowered syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub range: PositionRange,
    /// Identifier bound by this node, when it binds one
    pub declared_name: Option<String>,
    /// Set when this node is the initializer of its parent variable declaration
    pub is_initializer: bool,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, range: PositionRange) -> Self {
        SyntaxNode {
            kind,
            range,
            declared_name: None,
            is_initializer: false,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.declared_name = Some(name.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn as_initializer(mut self) -> Self {
        self.is_initializer = true;
        self
    }

    /// Child flagged as this node's initializer, if any
    pub fn initializer(&self) -> Option<&SyntaxNode> {
        self.children.iter().find(|child| child.is_initializer)
    }

    /// Count nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::node_count).sum::<usize>()
    }
}
