use std::fmt;
use std::ops::Range;

/// The reserved statement that closes the open conditional scope.
pub const CLOSING_MARKER: &str = "<if_end>";

/// Prefix shared by every conditional-opening statement.
pub const CONDITIONAL_PREFIX: &str = "<if_";

/// One line of scenario input. May contain zero or more `<family_argument>` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    /// Byte span in the scenario source, when the statement was loaded from a file.
    pub span: Option<Range<usize>>,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Statement {
            text: text.into(),
            span: None,
        }
    }

    pub fn with_span(text: impl Into<String>, span: Range<usize>) -> Self {
        Statement {
            text: text.into(),
            span: Some(span),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_closing_marker(&self) -> bool {
        self.text == CLOSING_MARKER
    }

    pub fn is_conditional(&self) -> bool {
        !self.is_closing_marker() && self.text.starts_with(CONDITIONAL_PREFIX)
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Statement::new(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Statement::new(text)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
