//! Logical-line extraction and classification.
//!
//! The extractor walks the physical lines of a template, joins continuation
//! lines into a single logical line, and classifies the result so the
//! processor can route it without re-inspecting the text.

use crate::config::Delimiters;

/// Classification of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing to process: blank, comment, or no expression delimiters.
    Transparent,
    /// A processor command (`{{ ... }}`).
    Command,
    /// A line to be expanded against the current variable definitions.
    Substitution,
}

/// A reconstructed line after continuation joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Text of the line, continuations joined.
    pub text: String,
    /// Source line number (1-based) of the first contributing physical line.
    pub line_no: usize,
    /// Routing classification.
    pub kind: LineKind,
}

/// Pulls logical lines from a template source.
pub struct LineExtractor {
    lines: Vec<String>,
    pos: usize,
    delimiters: Delimiters,
    /// Line number of the last physical line consumed, for error reporting.
    current_line_no: usize,
}

impl LineExtractor {
    pub fn new(source: &str, delimiters: Delimiters) -> Self {
        let lines = source
            .split(&delimiters.line_separator)
            .map(|s| s.to_string())
            .collect();
        Self {
            lines,
            pos: 0,
            delimiters,
            current_line_no: 0,
        }
    }

    /// Source line number (1-based) of the most recently consumed physical
    /// line. Zero before the first call to [`next`](Self::next).
    pub fn current_line_no(&self) -> usize {
        self.current_line_no
    }

    /// Returns the next logical line, or `None` at end of input.
    ///
    /// `strip` controls whitespace trimming of each physical line before
    /// continuation joining; the processor turns it off inside script blocks
    /// so indentation survives. Blank physical lines are skipped entirely
    /// and never terminate a continuation in progress.
    pub fn next(&mut self, strip: bool) -> Option<LogicalLine> {
        let cont = self.delimiters.continuation.clone();
        let mut text: Option<String> = None;
        let mut start_line = 0;

        while self.pos < self.lines.len() {
            let raw = &self.lines[self.pos];
            let piece = if strip { raw.trim() } else { raw.as_str() };
            self.pos += 1;
            self.current_line_no = self.pos;
            if piece.is_empty() {
                continue;
            }
            let acc = text.get_or_insert_with(String::new);
            if start_line == 0 {
                start_line = self.pos;
            }
            if let Some(stripped) = piece.strip_suffix(&cont) {
                // Whitespace ahead of the marker goes with it.
                acc.push_str(if strip { stripped.trim_end() } else { stripped });
            } else {
                acc.push_str(piece);
                break;
            }
        }

        let text = text?;
        let kind = self.classify(&text);
        Some(LogicalLine {
            text,
            line_no: start_line,
            kind,
        })
    }

    /// Classification rules, evaluated in order:
    /// blank or comment, command prefix, no expression delimiters, else
    /// substitution. The command check precedes the expression check since
    /// the command delimiter starts with the expression delimiter.
    fn classify(&self, text: &str) -> LineKind {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with(&self.delimiters.comment) {
            LineKind::Transparent
        } else if trimmed.starts_with(&self.delimiters.command_start) {
            LineKind::Command
        } else if !trimmed.contains(&self.delimiters.expression_start)
            && !trimmed.contains(&self.delimiters.expression_end)
        {
            LineKind::Transparent
        } else {
            LineKind::Substitution
        }
    }
}
