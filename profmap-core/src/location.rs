//! Mapping generated trace locations back to original sources
//!
//! Trace events point at generated (bundled or minified) code. The resolver
//! follows the generated file's `sourceMappingURL` to find the original
//! file, position, and text the name search runs against.

use crate::error::{Error, Result};
use crate::trace::SourcePointer;
use sourcemap::DecodedMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Original-source location for a trace event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// Path of the original source file
    pub path: String,
    /// Line in the original source (1-indexed)
    pub line: u32,
    /// Column in the original source (0-indexed)
    pub column: u32,
    /// Text of the original line, when it exists
    pub source_line: Option<String>,
    /// Full original source text
    pub text: Arc<str>,
}

/// Resolves a generated location to its original source
pub trait LocationResolver {
    fn resolve(&mut self, pointer: &SourcePointer) -> Result<ResolvedLocation>;
}

/// Resolver backed by sourcemaps on the local filesystem
///
/// Generated files, their maps, and original sources are read once and
/// cached, failures included.
#[derive(Default)]
pub struct SourceMapResolver {
    source_root: Option<PathBuf>,
    generated: HashMap<String, std::result::Result<GeneratedFile, String>>,
    originals: HashMap<PathBuf, std::result::Result<Arc<str>, String>>,
}

/// A generated file and its decoded sourcemap
struct GeneratedFile {
    path: PathBuf,
    text: Arc<str>,
    map: Option<SourceMapFile>,
}

struct SourceMapFile {
    map: DecodedMap,
    /// Directory that relative `sources` entries resolve against
    dir: PathBuf,
}

/// Position in an original file, before its text is loaded
struct MappedPosition {
    path: PathBuf,
    line: u32,
    column: u32,
    embedded: Option<Arc<str>>,
}

impl SourceMapResolver {
    pub fn new(source_root: Option<PathBuf>) -> Self {
        SourceMapResolver {
            source_root,
            ..Default::default()
        }
    }

    /// Turn a trace url into a local path
    fn local_path(&self, url: &str) -> std::result::Result<PathBuf, String> {
        let url = strip_query(url);
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if url.contains("://") {
            return Err("only local files and file:// urls are supported".to_string());
        }

        let path = PathBuf::from(url);
        match &self.source_root {
            Some(root) if path.is_relative() => Ok(root.join(path)),
            _ => Ok(path),
        }
    }

    fn original_text(&mut self, path: &Path) -> std::result::Result<Arc<str>, String> {
        self.originals
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                std::fs::read_to_string(path)
                    .map(Arc::from)
                    .map_err(|e| format!("cannot read original source {}: {}", path.display(), e))
            })
            .clone()
    }
}

impl LocationResolver for SourceMapResolver {
    fn resolve(&mut self, pointer: &SourcePointer) -> Result<ResolvedLocation> {
        if !self.generated.contains_key(&pointer.url) {
            let loaded = self
                .local_path(&pointer.url)
                .and_then(|path| load_generated(path));
            self.generated.insert(pointer.url.clone(), loaded);
        }

        let mapped = match self.generated.get(&pointer.url) {
            Some(Ok(generated)) => map_position(generated, pointer),
            Some(Err(reason)) => Err(reason.clone()),
            None => Err("generated file not loaded".to_string()),
        }
        .map_err(|reason| Error::unresolvable(&pointer.url, reason))?;

        let text = match mapped.embedded {
            Some(text) => text,
            None => self
                .original_text(&mapped.path)
                .map_err(|reason| Error::unresolvable(&pointer.url, reason))?,
        };

        let source_line = mapped
            .line
            .checked_sub(1)
            .and_then(|index| text.lines().nth(index as usize))
            .map(str::to_string);

        Ok(ResolvedLocation {
            path: mapped.path.to_string_lossy().into_owned(),
            line: mapped.line,
            column: mapped.column,
            source_line,
            text,
        })
    }
}

fn load_generated(path: PathBuf) -> std::result::Result<GeneratedFile, String> {
    let text = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let map = load_sourcemap(&path, &text)?;

    debug!(file = %path.display(), has_sourcemap = map.is_some(), "loaded generated file");
    Ok(GeneratedFile {
        path,
        text: Arc::from(text),
        map,
    })
}

/// Find the sourcemap for a generated file
///
/// Follows the `sourceMappingURL` comment (inline `data:` url or file),
/// falling back to a sibling `<file>.map`. No map means the file is its own
/// original source.
fn load_sourcemap(path: &Path, text: &str) -> std::result::Result<Option<SourceMapFile>, String> {
    let dir = parent_dir(path);

    let reference = sourcemap::locate_sourcemap_reference_slice(text.as_bytes())
        .map_err(|e| format!("invalid sourceMappingURL in {}: {}", path.display(), e))?;

    let map_path = match reference {
        Some(reference) => {
            let url = reference.get_url();
            if url.starts_with("data:") {
                let map = sourcemap::decode_data_url(url)
                    .map_err(|e| format!("invalid inline sourcemap in {}: {}", path.display(), e))?;
                return Ok(Some(SourceMapFile { map, dir }));
            }
            dir.join(strip_query(url.strip_prefix("file://").unwrap_or(url)))
        }
        None => {
            let mut sibling = path.as_os_str().to_owned();
            sibling.push(".map");
            let sibling = PathBuf::from(sibling);
            if !sibling.is_file() {
                return Ok(None);
            }
            sibling
        }
    };

    let bytes = std::fs::read(&map_path)
        .map_err(|e| format!("cannot read sourcemap {}: {}", map_path.display(), e))?;
    let map = sourcemap::decode_slice(&bytes)
        .map_err(|e| format!("invalid sourcemap {}: {}", map_path.display(), e))?;

    Ok(Some(SourceMapFile {
        map,
        dir: parent_dir(&map_path),
    }))
}

fn map_position(
    generated: &GeneratedFile,
    pointer: &SourcePointer,
) -> std::result::Result<MappedPosition, String> {
    let Some(source_map) = &generated.map else {
        return Ok(MappedPosition {
            path: generated.path.clone(),
            line: pointer.line,
            column: pointer.column,
            embedded: Some(generated.text.clone()),
        });
    };

    let line = pointer
        .line
        .checked_sub(1)
        .ok_or_else(|| "line numbers start at 1".to_string())?;
    let token = source_map
        .map
        .lookup_token(line, pointer.column)
        .ok_or_else(|| format!("no mapping for {}:{}", pointer.line, pointer.column))?;
    let source = token
        .get_source()
        .ok_or_else(|| "mapping has no original source".to_string())?;

    Ok(MappedPosition {
        path: source_path(&source_map.dir, source),
        line: token.get_src_line() + 1,
        column: token.get_src_col(),
        embedded: token.get_source_view().map(|view| Arc::from(view.source())),
    })
}

/// Resolve a sourcemap `sources` entry against the map's directory
///
/// Bundler schemes such as `webpack:///` are dropped and the rest is
/// treated as a path.
fn source_path(dir: &Path, source: &str) -> PathBuf {
    if let Some(path) = source.strip_prefix("file://") {
        return PathBuf::from(path);
    }
    let source = match source.find("://") {
        Some(index) => source[index + 3..].trim_start_matches('/'),
        None => source,
    };
    dir.join(source)
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
