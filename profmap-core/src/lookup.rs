//! Lookup entry point: source text and position in, display name out

use crate::error::Result;
use crate::parser;
use crate::position::SourcePosition;
use crate::search::{self, DEFAULT_MAX_DEPTH};
use crate::tree::SyntaxNode;
use tracing::debug;

/// Options for a name lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// Bound on the tree depth visited by the search
    pub max_depth: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        LookupOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Resolve the name of the declaration enclosing `line:column` in `text`
///
/// `file` selects the parser syntax by extension and names the file in
/// errors. Returns `"anonymous (not found)"` when nothing encloses the
/// position; a parse failure is returned as an error, never as a name.
pub fn resolve_enclosing_name(file: &str, text: &str, line: u32, column: u32) -> Result<String> {
    resolve_enclosing_name_with(file, text, line, column, LookupOptions::default())
}

/// Same as `resolve_enclosing_name`, with explicit options
pub fn resolve_enclosing_name_with(
    file: &str,
    text: &str,
    line: u32,
    column: u32,
    options: LookupOptions,
) -> Result<String> {
    let tree = parser::parse_tree(text, file)?;
    Ok(resolve_in_tree(&tree, file, SourcePosition::new(line, column), options))
}

/// Resolve a name in a tree that has already been parsed
///
/// Lets callers parse a file once and look up many positions in it.
pub fn resolve_in_tree(
    tree: &SyntaxNode,
    file: &str,
    position: SourcePosition,
    options: LookupOptions,
) -> String {
    let result = search::search(tree, position, options.max_depth);
    let found = result.is_found();
    let name = result.into_display_name();

    if found {
        debug!(name = %name, file, line = position.line, column = position.column, "found enclosing name");
    }
    name
}
