use std::fmt;
use std::io;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

use scenario::StructuralError;
use scenario::registry::{FamilyTag, Registry};
use scenario::statement::Statement;
use scenario::validate::SyntaxError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("cannot write '{target}': {source}")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A placeholder whose family was recognized but whose argument matched none of
/// the family's sub-patterns. Its text is left in the output as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub family: FamilyTag,
    /// The literal `<...>` text that was left in place.
    pub placeholder: String,
    pub statement: Statement,
}

impl Unresolved {
    /// Convert to a warning Diagnostic, listing the templates the family does accept.
    pub fn to_diagnostic(&self, registry: &Registry, file_id: usize) -> Diagnostic<usize> {
        let mut diagnostic = Diagnostic::warning().with_message(self.to_string());
        if let Some(span) = &self.statement.span {
            diagnostic = diagnostic.with_labels(vec![
                Label::primary(file_id, span.clone()).with_message("left unresolved"),
            ]);
        }
        if let Some(family) = registry.family(self.family) {
            let templates: Vec<&str> = family.patterns().iter().map(|p| p.template()).collect();
            diagnostic = diagnostic.with_notes(vec![format!(
                "expected one of: {}",
                templates.join(", ")
            )]);
        }
        diagnostic
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unresolved placeholder {} in statement \"{}\"",
            self.placeholder, self.statement
        )
    }
}
