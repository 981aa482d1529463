//! Enclosing-declaration search
//!
//! Global invariants enforced:
//! - Children are visited in document order; the first child that names
//!   the position wins and later siblings are not evaluated
//! - The tree is never mutated
//! - Recursion depth is bounded
//!
//! Labels are composed bottom-up. An anonymous function or arrow function is
//! named by the variable declaration it initializes; failing that its parent
//! settles it as `anonymous`, and the nearest ancestor above that parent
//! exposing a name turns it into `anonymous in <name>`. Composition is
//! applied at most once.

use crate::classify::{classify, exposed_name, static_name, NameableKind};
use crate::position::SourcePosition;
use crate::tree::SyntaxNode;
use tracing::warn;

/// Label for a function with no recoverable name
pub const ANONYMOUS: &str = "anonymous";

/// Label reported when no enclosing declaration exists
pub const NOT_FOUND: &str = "anonymous (not found)";

/// Default bound on tree depth visited by the search
pub const DEFAULT_MAX_DEPTH: usize = 2048;

/// Outcome of searching a subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult<'a> {
    /// The position lies outside this subtree
    NotContaining,
    /// The position is inside, but nothing nameable encloses it here
    ContainedUnnamed,
    /// A display name has been settled
    Named(String),
    /// Innermost match is an anonymous function awaiting a name
    Candidate(&'a SyntaxNode),
}

impl SearchResult<'_> {
    /// Map a root-level result to the string reported to callers
    pub fn into_display_name(self) -> String {
        match self {
            SearchResult::Named(name) => name,
            SearchResult::Candidate(_) => ANONYMOUS.to_string(),
            SearchResult::ContainedUnnamed | SearchResult::NotContaining => NOT_FOUND.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Named(_) | SearchResult::Candidate(_))
    }
}

/// Search `root` for the innermost declaration enclosing `position`
pub fn search(root: &SyntaxNode, position: SourcePosition, max_depth: usize) -> SearchResult<'_> {
    let search = EnclosingSearch {
        position,
        max_depth,
    };
    search.visit(root, 0)
}

struct EnclosingSearch {
    position: SourcePosition,
    max_depth: usize,
}

impl EnclosingSearch {
    fn visit<'a>(&self, node: &'a SyntaxNode, depth: usize) -> SearchResult<'a> {
        if !node.range.contains(self.position) {
            return SearchResult::NotContaining;
        }
        if depth > self.max_depth {
            warn!(
                max_depth = self.max_depth,
                line = node.range.start.line,
                "syntax tree exceeds maximum search depth; ignoring subtree"
            );
            return SearchResult::NotContaining;
        }

        // A contained-but-unnamed child does not stop the scan: with the loose
        // end-line check an earlier sibling can "contain" a position that
        // really belongs to a later one on the same line.
        for child in &node.children {
            match self.visit(child, depth + 1) {
                SearchResult::Named(name) => return compose(node, name),
                SearchResult::Candidate(inner) => return settle_candidate(node, inner),
                SearchResult::NotContaining | SearchResult::ContainedUnnamed => {}
            }
        }

        innermost(node)
    }
}

/// Result for a node that is itself the innermost container
fn innermost(node: &SyntaxNode) -> SearchResult<'_> {
    match classify(node) {
        Some(_) => match static_name(node) {
            Some(name) => SearchResult::Named(name.to_string()),
            None => SearchResult::Candidate(node),
        },
        None => SearchResult::ContainedUnnamed,
    }
}

/// Give an anonymous function its name from the enclosing node
///
/// Only a variable declaration initialized by the candidate names it. Any
/// other parent settles it as plain `anonymous`, which the next ancestor
/// exposing a name composes with.
fn settle_candidate<'a>(node: &'a SyntaxNode, candidate: &'a SyntaxNode) -> SearchResult<'a> {
    if classify(node) == Some(NameableKind::VariableDeclaration) && initializes(node, candidate) {
        if let Some(name) = static_name(node) {
            return SearchResult::Named(name.to_string());
        }
    }
    // Destructuring bindings land here too: no single name to borrow
    SearchResult::Named(ANONYMOUS.to_string())
}

/// Apply the one-level "anonymous in X" rule
fn compose(node: &SyntaxNode, name: String) -> SearchResult<'_> {
    if name == ANONYMOUS {
        if let Some(outer) = exposed_name(node) {
            return SearchResult::Named(format!("{} in {}", ANONYMOUS, outer));
        }
    }
    SearchResult::Named(name)
}

fn initializes(declaration: &SyntaxNode, candidate: &SyntaxNode) -> bool {
    declaration
        .initializer()
        .is_some_and(|init| std::ptr::eq(init, candidate))
}

#[cfg(test)]
#[path = "search/tests.rs"]
mod tests;
