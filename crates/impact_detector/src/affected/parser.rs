//! TypeScript/JavaScript import parser using tree-sitter.
//!
//! Extracts static `import ... from` and `export ... from` declarations for
//! dependency graph construction. Dynamic `import()` and `require()` calls are
//! not dependency edges and are not extracted.

use crate::normalize::path::truncate_for_log;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use tree_sitter::{Language, Parser, Query, QueryCursor, StreamingIterator};

/// Maximum number of imports to extract per file.
const MAX_IMPORTS_PER_FILE: usize = 500;

const IMPORT_QUERY: &str = r#"
    (import_statement source: (string) @source)
    (export_statement source: (string) @source)
"#;

/// Errors that can occur while parsing a source file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("syntax errors in {}", path.display())]
    Syntax { path: PathBuf },
    #[error("parser setup failed: {0}")]
    Setup(String),
}

/// Kind of import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import { x } from './path'`
    Named,
    /// `import x from './path'`
    Default,
    /// `import * as x from './path'`
    Namespace,
    /// `import './path'`
    SideEffect,
    /// `import type { x } from './path'`
    TypeOnly,
    /// `export { x } from './path'`
    ReExportNamed,
    /// `export * from './path'`
    ReExportAll,
}

/// A parsed import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// The import specifier (e.g., "./foo", "@/lib/bar", "lodash").
    pub specifier: String,
    /// The kind of import.
    pub kind: ImportKind,
}

struct Grammar {
    language: Language,
    query: Query,
    source_capture: u32,
}

impl Grammar {
    fn new(language: Language) -> Result<Self, ParseError> {
        let query = Query::new(&language, IMPORT_QUERY)
            .map_err(|e| ParseError::Setup(format!("invalid import query: {e}")))?;
        let source_capture = query
            .capture_index_for_name("source")
            .ok_or_else(|| ParseError::Setup("query has no @source capture".into()))?;
        Ok(Self {
            language,
            query,
            source_capture,
        })
    }
}

/// Reusable import parser holding compiled grammars and queries.
pub struct ImportParser {
    parser: Parser,
    typescript: Grammar,
    tsx: Grammar,
}

impl ImportParser {
    /// Create a parser for TypeScript and TSX sources.
    ///
    /// # Errors
    /// Returns `ParseError::Setup` if a grammar or query fails to load.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: Parser::new(),
            typescript: Grammar::new(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?,
            tsx: Grammar::new(tree_sitter_typescript::LANGUAGE_TSX.into())?,
        })
    }

    /// Parse imports from a file on disk.
    ///
    /// # Errors
    /// Fails if the file cannot be read or contains syntax errors.
    pub fn parse_file(&mut self, path: &Path) -> Result<Vec<ImportStatement>, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(&content, path)
    }

    /// Parse imports from source text. `path` selects the grammar.
    ///
    /// Truncates to the first 500 imports if exceeded (logged as warning).
    ///
    /// # Errors
    /// Fails if the source contains syntax errors.
    pub fn parse_source(
        &mut self,
        content: &str,
        path: &Path,
    ) -> Result<Vec<ImportStatement>, ParseError> {
        let grammar = if uses_jsx(path) { &self.tsx } else { &self.typescript };

        self.parser
            .set_language(&grammar.language)
            .map_err(|e| ParseError::Setup(e.to_string()))?;

        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ParseError::Syntax {
                path: path.to_path_buf(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax {
                path: path.to_path_buf(),
            });
        }

        let mut imports = extract_imports(grammar, content, root);

        if imports.len() > MAX_IMPORTS_PER_FILE {
            warn!(
                path = %truncate_for_log(path),
                count = imports.len(),
                "too many imports, truncating to {MAX_IMPORTS_PER_FILE}"
            );
            imports.truncate(MAX_IMPORTS_PER_FILE);
        }

        Ok(imports)
    }
}

/// JavaScript sources may contain JSX, which only the TSX grammar accepts.
fn uses_jsx(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tsx" | "jsx" | "js" | "mjs" | "cjs")
    )
}

fn extract_imports(
    grammar: &Grammar,
    content: &str,
    root: tree_sitter::Node<'_>,
) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&grammar.query, root, content.as_bytes());

    while let Some(m) = matches.next() {
        for capture in m.captures {
            if capture.index != grammar.source_capture {
                continue;
            }
            if let Some(import) = extract_import_from_node(content, capture.node) {
                imports.push(import);
            }
        }
    }

    imports
}

fn extract_import_from_node(
    content: &str,
    source_node: tree_sitter::Node<'_>,
) -> Option<ImportStatement> {
    let specifier = get_string_content(content, source_node)?;
    if specifier.is_empty() {
        return None;
    }

    let statement = source_node.parent()?;
    let kind = match statement.kind() {
        "import_statement" => classify_import_statement(content, statement),
        "export_statement" => classify_export_statement(content, statement),
        _ => return None,
    };

    Some(ImportStatement { specifier, kind })
}

fn get_string_content(content: &str, node: tree_sitter::Node<'_>) -> Option<String> {
    let text = node.utf8_text(content.as_bytes()).ok()?;
    let trimmed = text.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    Some(trimmed.to_string())
}

fn classify_import_statement(content: &str, node: tree_sitter::Node<'_>) -> ImportKind {
    let mut walker = node.walk();
    let Some(clause) = node
        .named_children(&mut walker)
        .find(|c| c.kind() == "import_clause")
    else {
        return ImportKind::SideEffect;
    };

    // `import type` carries an anonymous `type` keyword child
    if node.children(&mut walker).any(|c| !c.is_named() && c.kind() == "type") {
        return ImportKind::TypeOnly;
    }

    let clause_text = clause.utf8_text(content.as_bytes()).unwrap_or("");
    if clause_text.contains("* as") {
        return ImportKind::Namespace;
    }
    if clause_text.contains('{') {
        return ImportKind::Named;
    }
    ImportKind::Default
}

fn classify_export_statement(content: &str, node: tree_sitter::Node<'_>) -> ImportKind {
    let text = node.utf8_text(content.as_bytes()).unwrap_or("");
    let head = text.split("from").next().unwrap_or("");

    // `export * as ns from` is a named re-export
    if head.contains('*') && !head.contains(" as ") {
        return ImportKind::ReExportAll;
    }
    ImportKind::ReExportNamed
}
