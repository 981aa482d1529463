//! TypeScript and JavaScript parser using SWC
//!
//! Global invariants enforced:
//! - Deterministic parsing order
//! - Recoverable parse errors fail the parse; no partial trees are returned

use crate::error::{Error, Result};
use crate::lower;
use crate::tree::SyntaxNode;
use swc_common::{sync::Lrc, FileName, SourceFile, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// Determine the appropriate syntax configuration based on file extension
///
/// Unknown extensions fall back to JavaScript with JSX enabled, since trace
/// urls often point at `.js` files that contain JSX (React Native bundles).
fn syntax_for_file(filename: &str) -> Syntax {
    let path = strip_query(filename);

    if path.ends_with(".tsx") || path.ends_with(".mtsx") || path.ends_with(".ctsx") {
        Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: true,
            decorators: true,
            dts: false,
            ..Default::default()
        })
    } else if path.ends_with(".ts") || path.ends_with(".mts") || path.ends_with(".cts") {
        Syntax::Typescript(swc_ecma_parser::TsSyntax {
            tsx: false,
            decorators: true,
            dts: path.ends_with(".d.ts"),
            ..Default::default()
        })
    } else {
        Syntax::Es(swc_ecma_parser::EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        })
    }
}

/// Drop a `?query` or `#fragment` suffix that bundler urls carry
fn strip_query(filename: &str) -> &str {
    filename
        .split(['?', '#'])
        .next()
        .unwrap_or(filename)
}

/// Parse TypeScript, JavaScript, JSX, or TSX source code into an SWC program
///
/// Syntax is chosen from the extension of `filename`, which is otherwise only
/// used in error messages. Fails on the first fatal error, and also when the
/// parser recovered from errors, since a recovered tree may misplace nodes.
pub fn parse_source(src: &str, source_map: &Lrc<SourceMap>, filename: &str) -> Result<Program> {
    let syntax = syntax_for_file(filename);

    // Create SourceFile for the source code
    let source_file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(filename.into()).into(),
        src.to_string(),
    );

    let input = StringInput::from(&*source_file);
    let lexer = Lexer::new(syntax, EsVersion::EsNext, input, None);
    let mut parser = Parser::new_from(lexer);

    let program = parser
        .parse_program()
        .map_err(|e| parse_error(filename, source_map, &e))?;

    if let Some(e) = parser.take_errors().first() {
        return Err(parse_error(filename, source_map, e));
    }

    Ok(program)
}

/// Parse source text into a lowered syntax tree rooted at a `Module` node
pub fn parse_tree(src: &str, filename: &str) -> Result<SyntaxNode> {
    let cm: Lrc<SourceMap> = Default::default();
    let program = parse_source(src, &cm, filename)?;
    Ok(lower::lower_program(&program, &cm, src))
}

fn parse_error(filename: &str, source_map: &SourceMap, e: &swc_ecma_parser::error::Error) -> Error {
    let span = e.span();
    let message = if span.is_dummy() {
        e.kind().msg().to_string()
    } else {
        let loc = source_map.lookup_char_pos(span.lo);
        format!("{} at {}:{}", e.kind().msg(), loc.line, loc.col.0)
    };

    Error::Parse {
        file: filename.to_string(),
        message,
    }
}
