//! Trace rewriting
//!
//! Events that point at generated code are relocated to their original
//! source, and events carrying the sentinel name get the name of their
//! enclosing declaration.
//!
//! Work happens in three passes:
//! 1. Resolve every source pointer (sequential, the resolver caches files)
//! 2. Parse each distinct original source once (parallel)
//! 3. Apply locations and names to events (parallel, order preserved)

use crate::location::{LocationResolver, ResolvedLocation};
use crate::lookup::{self, LookupOptions};
use crate::parser;
use crate::position::SourcePosition;
use crate::search::ANONYMOUS;
use crate::trace;
use crate::tree::SyntaxNode;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Options for a rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Event name that marks a frame for renaming
    pub sentinel: String,
    pub lookup: LookupOptions,
    /// Parse sources and apply events on the rayon pool
    pub parallel: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            sentinel: ANONYMOUS.to_string(),
            lookup: LookupOptions::default(),
            parallel: true,
        }
    }
}

/// Counts from a rewrite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteSummary {
    /// Events in the trace
    pub total: usize,
    /// Events carrying a source pointer
    pub with_source: usize,
    /// Events moved to their original location
    pub relocated: usize,
    /// Events whose sentinel name was replaced
    pub renamed: usize,
    /// Events with a source pointer that were left unchanged
    pub skipped: usize,
}

/// What the first pass learned about one event
enum Resolution {
    NoSource,
    Unresolvable,
    Resolved(ResolvedLocation),
}

enum Outcome {
    NoSource,
    Skipped,
    Relocated { renamed: bool },
}

type Trees = HashMap<String, Option<SyntaxNode>>;

/// Rewrite trace events, returning them in their original order
pub fn rewrite_events(
    events: Vec<Value>,
    resolver: &mut dyn LocationResolver,
    options: &RewriteOptions,
) -> (Vec<Value>, RewriteSummary) {
    let resolutions: Vec<Resolution> = events
        .iter()
        .map(|event| resolve_event(event, resolver))
        .collect();

    let trees = parse_sources(&events, &resolutions, options);

    let outcomes: Vec<(Value, Outcome)> = if options.parallel {
        events
            .into_par_iter()
            .zip(resolutions.into_par_iter())
            .map(|(event, resolution)| apply(event, resolution, &trees, options))
            .collect()
    } else {
        events
            .into_iter()
            .zip(resolutions)
            .map(|(event, resolution)| apply(event, resolution, &trees, options))
            .collect()
    };

    let mut summary = RewriteSummary {
        total: outcomes.len(),
        ..Default::default()
    };
    let events = outcomes
        .into_iter()
        .map(|(event, outcome)| {
            match outcome {
                Outcome::NoSource => {}
                Outcome::Skipped => {
                    summary.with_source += 1;
                    summary.skipped += 1;
                }
                Outcome::Relocated { renamed } => {
                    summary.with_source += 1;
                    summary.relocated += 1;
                    if renamed {
                        summary.renamed += 1;
                    }
                }
            }
            event
        })
        .collect();

    (events, summary)
}

fn resolve_event(event: &Value, resolver: &mut dyn LocationResolver) -> Resolution {
    let Some(pointer) = trace::source_pointer(event) else {
        return Resolution::NoSource;
    };

    match resolver.resolve(&pointer) {
        Ok(location) => Resolution::Resolved(location),
        Err(e) => {
            warn!(error = %e, line = pointer.line, column = pointer.column, "leaving event unchanged");
            Resolution::Unresolvable
        }
    }
}

/// Parse every original source that some sentinel-named event needs
///
/// A source that fails to parse maps to `None`.
fn parse_sources(events: &[Value], resolutions: &[Resolution], options: &RewriteOptions) -> Trees {
    let mut sources: HashMap<&str, Arc<str>> = HashMap::new();
    for (event, resolution) in events.iter().zip(resolutions) {
        if let Resolution::Resolved(location) = resolution {
            if needs_name(event, options) {
                sources
                    .entry(location.path.as_str())
                    .or_insert_with(|| location.text.clone());
            }
        }
    }

    let parse = |(path, text): (&str, Arc<str>)| {
        let tree = match parser::parse_tree(&text, path) {
            Ok(tree) => {
                debug!(file = path, nodes = tree.node_count(), "parsed original source");
                Some(tree)
            }
            Err(e) => {
                warn!(error = %e, "cannot name events in unparseable source");
                None
            }
        };
        (path.to_string(), tree)
    };

    if options.parallel {
        sources.into_par_iter().map(parse).collect()
    } else {
        sources.into_iter().map(parse).collect()
    }
}

fn needs_name(event: &Value, options: &RewriteOptions) -> bool {
    trace::event_name(event) == Some(options.sentinel.as_str())
}

fn apply(mut event: Value, resolution: Resolution, trees: &Trees, options: &RewriteOptions) -> (Value, Outcome) {
    let location = match resolution {
        Resolution::NoSource => return (event, Outcome::NoSource),
        Resolution::Unresolvable => return (event, Outcome::Skipped),
        Resolution::Resolved(location) => location,
    };

    let name = if needs_name(&event, options) {
        match trees.get(&location.path) {
            Some(Some(tree)) => Some(lookup::resolve_in_tree(
                tree,
                &location.path,
                SourcePosition::new(location.line, location.column),
                options.lookup,
            )),
            _ => return (event, Outcome::Skipped),
        }
    } else {
        None
    };

    relocate(&mut event, location);

    let renamed = match (name, event.as_object_mut()) {
        (Some(name), Some(fields)) => {
            fields.insert("name".to_string(), Value::String(name));
            true
        }
        _ => false,
    };

    (event, Outcome::Relocated { renamed })
}

/// Point an event's `args` at the original source
///
/// Existing keys are overwritten in place, so field order is kept.
fn relocate(event: &mut Value, location: ResolvedLocation) {
    let Some(args) = event.get_mut("args").and_then(Value::as_object_mut) else {
        return;
    };

    args.insert("url".to_string(), Value::String(location.path));
    args.insert("line".to_string(), Value::from(location.line));
    args.insert("column".to_string(), Value::from(location.column));
    if let Some(source_line) = location.source_line {
        args.insert("sourceLine".to_string(), Value::String(source_line));
    }
}
