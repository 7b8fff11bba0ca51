use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

use crate::Section;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid scenario file: {0}")]
    Toml(String),

    #[error("unknown section \"{0}\"")]
    UnknownSection(String),

    #[error("duplicate \"{0}\" section")]
    DuplicateSection(Section),

    #[error("the \"given\" section takes a single statement")]
    ExtraGiven,
}

/// A scenario file that could not be loaded, located in its source.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub file_id: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Range<usize>, file_id: usize) -> Self {
        ParseError {
            kind,
            span,
            file_id,
        }
    }

    /// Wrap a TOML syntax or type error, keeping its span when toml reports one.
    pub fn from_toml(error: &toml::de::Error, file_id: usize) -> Self {
        ParseError::new(
            ParseErrorKind::Toml(error.message().to_string()),
            error.span().unwrap_or(0..0),
            file_id,
        )
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        let (label, notes) = match &self.kind {
            ParseErrorKind::Toml(_) => ("here", vec![]),
            ParseErrorKind::UnknownSection(_) => (
                "not a scenario section",
                vec!["expected one of: Given, When, Then".to_string()],
            ),
            ParseErrorKind::DuplicateSection(_) => ("defined again here", vec![]),
            ParseErrorKind::ExtraGiven => (
                "extra statement",
                vec!["move follow-up steps under \"When\"".to_string()],
            ),
        };
        Diagnostic::error()
            .with_message(self.kind.to_string())
            .with_labels(vec![
                Label::primary(self.file_id, self.span.clone()).with_message(label),
            ])
            .with_notes(notes)
    }
}
