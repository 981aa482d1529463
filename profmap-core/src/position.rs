//! Source positions and range containment
//!
//! Global invariants enforced:
//! - Lines are 1-indexed, columns are 0-indexed (in characters)
//! - A malformed range (end before start) contains nothing

use serde::{Deserialize, Serialize};

/// A single cursor location in a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (0-indexed, in characters)
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        SourcePosition { line, column }
    }
}

/// Start and end position of a syntax node
///
/// The end position is the location just past the node's last character,
/// so `end.line` is the line the node ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl PositionRange {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        PositionRange { start, end }
    }

    /// Shorthand for `PositionRange::new` from raw line/column pairs
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        PositionRange {
            start: SourcePosition::new(start_line, start_col),
            end: SourcePosition::new(end_line, end_col),
        }
    }

    /// Check if the end of the range precedes its start
    pub fn is_malformed(&self) -> bool {
        self.end < self.start
    }

    /// Check if this range contains `position`
    ///
    /// The column is only checked on the start line. Any position on the end
    /// line counts as contained, whatever its column: columns mapped back from
    /// minified code are imprecise, and tightening this check changes which
    /// name is reported near closing braces.
    pub fn contains(&self, position: SourcePosition) -> bool {
        if self.is_malformed() {
            return false;
        }

        let after_start = position.line > self.start.line
            || (position.line == self.start.line && position.column >= self.start.column);

        after_start && position.line <= self.end.line
    }
}
