//! Conversions between tool diagnostics and LSP types.
//!
//! Tools count lines from 1 and columns in characters; LSP counts both from 0
//! and measures columns in UTF-16 code units.

use gill_tools::{Diagnostic, DiagnosticSeverity};
use tower_lsp::lsp_types as lsp;

/// Convert a tool diagnostic against the document text it was produced for.
///
/// Diagnostics without a column span cover their whole line. Lines past the
/// end of the document clamp to the last line.
pub fn to_lsp_diagnostic(diag: &Diagnostic, text: &str) -> lsp::Diagnostic {
    let line_count = text.lines().count().max(1);
    let line = diag.location.line.saturating_sub(1).min(line_count - 1);
    let line_text = text.lines().nth(line).unwrap_or("");

    let (start, end) = match (diag.location.column, diag.location.end_column) {
        (Some(col), Some(end_col)) => (
            utf16_offset(line_text, col.saturating_sub(1)),
            utf16_offset(line_text, end_col.saturating_sub(1)),
        ),
        (Some(col), None) => {
            let start = utf16_offset(line_text, col.saturating_sub(1));
            (start, utf16_offset(line_text, col))
        }
        _ => (0, utf16_offset(line_text, usize::MAX)),
    };

    lsp::Diagnostic {
        range: lsp::Range {
            start: lsp::Position {
                line: line as u32,
                character: start,
            },
            end: lsp::Position {
                line: line as u32,
                character: end.max(start),
            },
        },
        severity: Some(to_lsp_severity(diag.severity)),
        code: Some(lsp::NumberOrString::String(diag.rule_id.clone())),
        source: Some(diag.tool.clone()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

fn to_lsp_severity(severity: DiagnosticSeverity) -> lsp::DiagnosticSeverity {
    match severity {
        DiagnosticSeverity::Error => lsp::DiagnosticSeverity::ERROR,
        DiagnosticSeverity::Warning => lsp::DiagnosticSeverity::WARNING,
        DiagnosticSeverity::Info => lsp::DiagnosticSeverity::INFORMATION,
        DiagnosticSeverity::Hint => lsp::DiagnosticSeverity::HINT,
    }
}

/// UTF-16 offset of the first `chars` characters of `line`, clamped to its end.
fn utf16_offset(line: &str, chars: usize) -> u32 {
    line.chars()
        .take(chars)
        .map(char::len_utf16)
        .sum::<usize>() as u32
}

/// Range spanning an entire document, for whole-document replacement edits.
pub fn full_document_range(text: &str) -> lsp::Range {
    let last_line = text.matches('\n').count() as u32;
    let tail = text.rsplit('\n').next().unwrap_or("");
    lsp::Range {
        start: lsp::Position::new(0, 0),
        end: lsp::Position::new(last_line, utf16_offset(tail, usize::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gill_tools::Location;

    fn syntax_error(line: usize) -> Diagnostic {
        Diagnostic::error("fish", "syntax-error", "bad", Location::new("a.fish", line))
    }

    #[test]
    fn test_whole_line_range() {
        let text = "echo ok\nif true\n  echo x\n";
        let d = to_lsp_diagnostic(&syntax_error(2), text);
        assert_eq!(d.range.start, lsp::Position::new(1, 0));
        assert_eq!(d.range.end, lsp::Position::new(1, 7));
        assert_eq!(d.severity, Some(lsp::DiagnosticSeverity::ERROR));
        assert_eq!(d.source.as_deref(), Some("fish"));
        assert_eq!(
            d.code,
            Some(lsp::NumberOrString::String("syntax-error".into()))
        );
        assert_eq!(d.message, "bad");
    }

    #[test]
    fn test_caret_span_range() {
        let text = "echo 'foo\n";
        let mut diag = syntax_error(1);
        diag.location = diag.location.with_span(6, 11);
        let d = to_lsp_diagnostic(&diag, text);
        assert_eq!(d.range.start, lsp::Position::new(0, 5));
        // End clamps to the line length.
        assert_eq!(d.range.end, lsp::Position::new(0, 9));
    }

    #[test]
    fn test_utf16_columns() {
        // '🐟' is two UTF-16 units.
        let text = "echo 🐟 'x\n";
        let mut diag = syntax_error(1);
        diag.location = diag.location.with_span(8, 10);
        let d = to_lsp_diagnostic(&diag, text);
        assert_eq!(d.range.start.character, 8);
        assert_eq!(d.range.end.character, 10);
    }

    #[test]
    fn test_line_past_end_clamps() {
        let text = "echo a\necho bb";
        let d = to_lsp_diagnostic(&syntax_error(9), text);
        assert_eq!(d.range.start.line, 1);
        assert_eq!(d.range.end.character, 7);

        let d = to_lsp_diagnostic(&syntax_error(1), "");
        assert_eq!(d.range.start, lsp::Position::new(0, 0));
        assert_eq!(d.range.end, lsp::Position::new(0, 0));
    }

    #[test]
    fn test_full_document_range() {
        assert_eq!(
            full_document_range("a\nbc\n").end,
            lsp::Position::new(2, 0)
        );
        assert_eq!(full_document_range("a\nbc").end, lsp::Position::new(1, 2));
        assert_eq!(full_document_range("").end, lsp::Position::new(0, 0));
        assert_eq!(full_document_range("é🐟").end, lsp::Position::new(0, 3));
    }
}
