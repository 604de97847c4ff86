//! Diagnostics for rejected template entries.
//!
//! A diagnostic always describes one template entry. Its label points into
//! the entry's expression text, the part between `${` (or `$${`) and `}`.
//! That text is attached only when the diagnostic is rendered through miette.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, NamedSource, Report};
use std::fmt;

/// A span of expression text with a short explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    pub span: Span,
    pub message: String,
}

/// An error found while lexing, parsing or validating a template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub message: String,
    /// The offending part of the expression text, if it has one.
    pub label: Option<DiagLabel>,
    pub help: Option<String>,
    /// Context lines, such as the entry the diagnostic belongs to.
    pub notes: Vec<String>,
    /// Stable code such as `template::path_not_found`.
    pub code: Option<String>,
}

impl Diag {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            label: None,
            help: None,
            notes: Vec::new(),
            code: None,
        }
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.label = Some(DiagLabel {
            span,
            message: message.into(),
        });
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Renders the diagnostic against the expression text it points into.
    /// A label outside the text is clamped to its end.
    pub fn to_report(&self, source: &ExpressionSource) -> Report {
        let label = self.label.as_ref().map(|label| {
            let span = source.clamp(&label.span);
            LabeledSpan::new_primary_with_span(
                Some(label.message.clone()),
                (span.start, span.end - span.start),
            )
        });
        let rendered = RenderedDiag {
            message: self.message.clone(),
            code: self.code.clone(),
            help: self.help.clone(),
            label,
            notes: self.notes.iter().cloned().map(RenderedNote).collect(),
        };

        let report = Report::new(rendered);
        match source.entry() {
            Some(entry) => report.with_source_code(NamedSource::new(entry, source.text().to_string())),
            None => report.with_source_code(source.text().to_string()),
        }
    }
}

/// Expression text of one template entry, optionally named after the entry.
#[derive(Debug, Clone)]
pub struct ExpressionSource {
    text: String,
    entry: Option<String>,
}

impl ExpressionSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            entry: None,
        }
    }

    /// Expression text of the entry at `entry`, e.g. `/features/0/name`.
    pub fn for_entry(text: impl Into<String>, entry: impl fmt::Display) -> Self {
        Self {
            text: text.into(),
            entry: Some(entry.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Clamps `span` into the text.
    pub fn clamp(&self, span: &Span) -> Span {
        let len = self.text.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        start..end
    }
}

#[derive(Debug)]
struct RenderedDiag {
    message: String,
    code: Option<String>,
    help: Option<String>,
    label: Option<LabeledSpan>,
    notes: Vec<RenderedNote>,
}

#[derive(Debug)]
struct RenderedNote(String);

impl fmt::Display for RenderedDiag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for RenderedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for RenderedDiag {}
impl std::error::Error for RenderedNote {}

impl Diagnostic for RenderedDiag {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code
            .as_ref()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = self.label.clone()?;
        Some(Box::new(std::iter::once(label)))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        if self.notes.is_empty() {
            return None;
        }
        Some(Box::new(self.notes.iter().map(|note| note as &dyn Diagnostic)))
    }
}

impl Diagnostic for RenderedNote {
    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Advice)
    }
}
