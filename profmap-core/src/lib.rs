//! Profmap core library - names anonymous frames in JavaScript profiles

#![deny(warnings)]

// Global invariants enforced in this crate:
// - A lookup is a pure function of (file, text, line, column)
// - No global mutable state
// - Trees are read-only once built and shared across threads
// - Traversal is in document order; the first containing sibling wins
// - Parse failures surface as errors, never as guessed names
// - Event order and JSON field order survive a rewrite

pub mod classify;
pub mod config;
pub mod error;
pub mod location;
pub mod lookup;
pub mod lower;
pub mod parser;
pub mod position;
pub mod rewrite;
pub mod search;
pub mod trace;
pub mod tree;

pub use config::ResolvedConfig;
pub use error::{Error, Result};
pub use location::{LocationResolver, ResolvedLocation, SourceMapResolver};
pub use lookup::{resolve_enclosing_name, resolve_enclosing_name_with, resolve_in_tree, LookupOptions};
pub use position::{PositionRange, SourcePosition};
pub use rewrite::{rewrite_events, RewriteOptions, RewriteSummary};
pub use search::{ANONYMOUS, NOT_FOUND};
pub use trace::TraceDocument;

use std::path::Path;
use tracing::info;

/// Rewrite the trace at `input` and write the result to `output`
///
/// The output is only written once every event has been processed.
pub fn rewrite_trace_file(input: &Path, output: &Path, config: &ResolvedConfig) -> Result<RewriteSummary> {
    let document = TraceDocument::load(input)?;
    let mut resolver = SourceMapResolver::new(config.source_root.clone());

    let (document, summary) = rewrite_document(document, &mut resolver, &config.rewrite_options());
    document.write(output)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        total = summary.total,
        with_source = summary.with_source,
        relocated = summary.relocated,
        renamed = summary.renamed,
        skipped = summary.skipped,
        "rewrote trace"
    );
    Ok(summary)
}

/// Rewrite the events of a parsed trace, keeping its envelope
pub fn rewrite_document(
    mut document: TraceDocument,
    resolver: &mut dyn LocationResolver,
    options: &RewriteOptions,
) -> (TraceDocument, RewriteSummary) {
    let events = document.take_events();
    let (events, summary) = rewrite_events(events, resolver, options);
    (document.with_events(events), summary)
}
