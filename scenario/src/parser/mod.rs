pub mod error;
mod markdown;
mod toml_source;

pub use error::{ParseError, ParseErrorKind};

use std::path::Path;

use crate::ScenarioInput;

/// The on-disk formats a scenario can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Toml,
    Markdown,
}

impl SourceFormat {
    /// Pick the format from a file extension (`.toml`, `.md`, `.markdown`).
    pub fn from_path(path: &Path) -> Option<SourceFormat> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Some(SourceFormat::Toml),
            "md" | "markdown" => Some(SourceFormat::Markdown),
            _ => None,
        }
    }
}

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    format: SourceFormat,
    /// Fallback scenario name when the source does not declare one.
    default_name: String,
}

impl Parser {
    pub fn new(source: String, file_id: usize, format: SourceFormat) -> Self {
        Parser {
            source,
            file_id,
            format,
            default_name: String::new(),
        }
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Parse the source into a scenario record. Sections may still be missing or
    /// empty; converting into a [`crate::Scenario`] checks that.
    pub fn parse(&self) -> Result<ScenarioInput, Vec<ParseError>> {
        let mut input = match self.format {
            SourceFormat::Toml => toml_source::parse_scenario(&self.source, self.file_id)?,
            SourceFormat::Markdown => markdown::parse_scenario(&self.source, self.file_id)?,
        };
        if input.name.is_empty() {
            input.name = self.default_name.clone();
        }
        input.source_id = self.file_id;
        tracing::debug!(
            name = input.name.as_str(),
            format = ?self.format,
            "scenario loaded"
        );
        Ok(input)
    }
}
