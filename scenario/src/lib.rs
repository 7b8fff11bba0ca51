pub mod parser;
pub mod registry;
pub mod statement;
pub mod tree;
pub mod validate;

use std::fmt;

use thiserror::Error;

use crate::registry::Registry;
use crate::statement::Statement;
use crate::tree::{ScenarioNode, build_forest};
use crate::validate::{SyntaxError, validate_all};

/// One of the three parts of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Given,
    When,
    Then,
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Given => "given",
            Section::When => "when",
            Section::Then => "then",
        }
    }

    /// Case-insensitive lookup, used by the scenario loaders.
    pub fn from_name(name: &str) -> Option<Section> {
        match name.trim().to_ascii_lowercase().as_str() {
            "given" => Some(Section::Given),
            "when" => Some(Section::When),
            "then" => Some(Section::Then),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scenario whose shape is wrong before any statement is looked at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("a scenario must have \"given\", \"when\", and \"then\" sections (missing \"{0}\")")]
    MissingSection(Section),
    #[error("\"{0}\" must have at least one statement")]
    EmptySection(Section),
}

/// Scenario input as supplied by a loader: any section may be missing.
#[derive(Debug, Clone, Default)]
pub struct ScenarioInput {
    pub name: String,
    pub given: Option<Statement>,
    pub when: Option<Vec<Statement>>,
    pub then: Option<Vec<Statement>>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

/// A structurally complete scenario: a given statement and non-empty when/then lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub given: Statement,
    pub when: Vec<Statement>,
    pub then: Vec<Statement>,
    pub source_id: usize,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        given: impl Into<Statement>,
        when: Vec<Statement>,
        then: Vec<Statement>,
    ) -> Result<Self, StructuralError> {
        Scenario::try_from(ScenarioInput {
            name: name.into(),
            given: Some(given.into()),
            when: Some(when),
            then: Some(then),
            source_id: 0,
        })
    }

    /// Given, then every when statement, then every then statement, in order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        std::iter::once(&self.given)
            .chain(self.when.iter())
            .chain(self.then.iter())
    }

    /// Check every raw statement against the registry, failing on the first bad one.
    pub fn validate(&self, registry: &Registry) -> Result<(), SyntaxError> {
        validate_all(registry, self.statements())
    }

    /// Group the when and then lists into forests.
    pub fn build_tree(&self) -> ScenarioTree {
        ScenarioTree {
            name: self.name.clone(),
            given: self.given.clone(),
            when: build_forest(&self.when),
            then: build_forest(&self.then),
        }
    }
}

impl TryFrom<ScenarioInput> for Scenario {
    type Error = StructuralError;

    fn try_from(input: ScenarioInput) -> Result<Self, Self::Error> {
        let given = input
            .given
            .ok_or(StructuralError::MissingSection(Section::Given))?;
        let when = input
            .when
            .ok_or(StructuralError::MissingSection(Section::When))?;
        let then = input
            .then
            .ok_or(StructuralError::MissingSection(Section::Then))?;

        if given.as_str().trim().is_empty() {
            return Err(StructuralError::EmptySection(Section::Given));
        }
        if when.is_empty() {
            return Err(StructuralError::EmptySection(Section::When));
        }
        if then.is_empty() {
            return Err(StructuralError::EmptySection(Section::Then));
        }

        Ok(Scenario {
            name: input.name,
            given,
            when,
            then,
            source_id: input.source_id,
        })
    }
}

/// A scenario with its when/then lists grouped into conditional forests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioTree {
    pub name: String,
    pub given: Statement,
    pub when: Vec<ScenarioNode>,
    pub then: Vec<ScenarioNode>,
}
