//! Deterministic classification of buffer lines.

/// Lines whose trimmed form starts with this marker are dropped.
pub const COMMENT_MARKER: &str = "//";
/// Lines whose trimmed form starts with this keyword are imports.
pub const IMPORT_KEYWORD: &str = "import";

/// Buffer lines split into imports and body statements, in buffer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub imports: Vec<String>,
    pub statements: Vec<String>,
}

/// Classify every line of `buffer` into imports vs statements.
///
/// - Comment lines are discarded.
/// - Import lines keep their original (untrimmed) text.
/// - Everything else, blank lines included, is a statement.
///
/// The prefix tests run on the trimmed line only, so indentation survives into
/// the rendered program.
pub fn classify(buffer: &str) -> Classified {
    let mut classified = Classified::default();
    for line in buffer.split('\n') {
        match line_kind(line) {
            LineKind::Comment => {}
            LineKind::Import => classified.imports.push(line.to_string()),
            LineKind::Statement => classified.statements.push(line.to_string()),
        }
    }
    classified
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Comment,
    Import,
    Statement,
}

fn line_kind(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.starts_with(COMMENT_MARKER) {
        LineKind::Comment
    } else if trimmed.starts_with(IMPORT_KEYWORD) {
        LineKind::Import
    } else {
        LineKind::Statement
    }
}
