mod suggest;

pub use suggest::{SUGGESTION_THRESHOLD, Suggestion, closest_template, levenshtein};

use std::sync::OnceLock;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use regex::Regex;
use thiserror::Error;

use crate::registry::Registry;
use crate::statement::Statement;

/// A statement containing a `<...>` token that no placeholder family recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.statement, .suggestion))]
pub struct SyntaxError {
    pub statement: Statement,
    /// The first token that failed to match.
    pub token: String,
    pub suggestion: Option<Suggestion>,
}

fn describe(statement: &Statement, suggestion: &Option<Suggestion>) -> String {
    match suggestion {
        Some(s) => format!(
            "invalid syntax in statement \"{}\"; did you mean \"{}\"?",
            statement, s.template
        ),
        None => format!("invalid placeholder in statement \"{}\"", statement),
    }
}

impl SyntaxError {
    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::error()
            .with_message(self.to_string())
            .with_notes(vec![format!("unrecognized placeholder: {}", self.token)]);
        if let Some(span) = &self.statement.span {
            diagnostic = diagnostic.with_labels(vec![
                Label::primary(file_id, span.clone()).with_message("in this statement"),
            ]);
        }
        if let Some(suggestion) = &self.suggestion {
            diagnostic
                .notes
                .push(format!("closest template: {}", suggestion.template));
        }
        diagnostic
    }
}

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"<([^<]+)>").unwrap_or_else(|e| panic!("{e}")))
}

/// Every `<...>` token in `text`, in order.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    token_pattern().find_iter(text).map(|m| m.as_str())
}

/// Check that every `<...>` token in the statement has a known family shape.
///
/// Only the outer shape is checked; a statement can pass here and still match no
/// sub-pattern during resolution.
pub fn validate_statement(registry: &Registry, statement: &Statement) -> Result<(), SyntaxError> {
    for token in tokens(statement.as_str()) {
        if registry.family_for_token(token).is_none() {
            let suggestion = closest_template(registry, statement.as_str());
            tracing::debug!(
                statement = statement.as_str(),
                token,
                suggestion = suggestion.as_ref().map(|s| s.template),
                "statement failed validation"
            );
            return Err(SyntaxError {
                statement: statement.clone(),
                token: token.to_string(),
                suggestion,
            });
        }
    }
    Ok(())
}

/// Validate statements in order, stopping at the first failure.
pub fn validate_all<'a>(
    registry: &Registry,
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Result<(), SyntaxError> {
    statements
        .into_iter()
        .try_for_each(|statement| validate_statement(registry, statement))
}
