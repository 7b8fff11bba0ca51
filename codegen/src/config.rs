use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Which text names the generated `it(...)` test case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestTitle {
    /// The raw given statement.
    #[default]
    Given,
    /// The scenario name.
    Name,
}

/// Output options for the emitted script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Emit the `/// <reference types="cypress" />` header.
    pub reference_types: bool,
    pub test_title: TestTitle,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            indent: 2,
            reference_types: true,
            test_title: TestTitle::Given,
        }
    }
}

impl CompilerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
