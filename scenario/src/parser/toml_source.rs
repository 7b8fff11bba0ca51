use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use toml::Spanned;

use crate::ScenarioInput;
use crate::parser::error::ParseError;
use crate::statement::Statement;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given: Option<Spanned<String>>,
    #[serde(default)]
    when: Option<Spanned<Steps>>,
    #[serde(default)]
    then: Option<Spanned<Steps>>,
}

/// `when`/`then` accept a single string or a list of strings.
#[derive(Debug)]
enum Steps {
    One(String),
    Many(Vec<Spanned<String>>),
}

impl<'de> Deserialize<'de> for Steps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StepsVisitor)
    }
}

struct StepsVisitor;

impl<'de> Visitor<'de> for StepsVisitor {
    type Value = Steps;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a statement or a list of statements")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Steps, E> {
        Ok(Steps::One(value.to_string()))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Steps, A::Error> {
        let mut steps = Vec::new();
        while let Some(step) = seq.next_element::<Spanned<String>>()? {
            steps.push(step);
        }
        Ok(Steps::Many(steps))
    }
}

fn statement(spanned: Spanned<String>) -> Statement {
    let span = spanned.span();
    Statement::with_span(spanned.into_inner().trim(), span)
}

fn statements(spanned: Spanned<Steps>) -> Vec<Statement> {
    let span = spanned.span();
    let steps = match spanned.into_inner() {
        Steps::One(text) => vec![Statement::with_span(text.trim(), span)],
        Steps::Many(steps) => steps.into_iter().map(statement).collect(),
    };
    steps
        .into_iter()
        .filter(|s| !s.as_str().is_empty())
        .collect()
}

/// Parse a TOML scenario:
///
/// ```toml
/// name = "log in"
/// given = "<visit_url http://example.com>"
/// when = ["<input_username value bob>", "<click_#go>"]
/// then = "<assert_#title has text Hi>"
/// ```
pub fn parse_scenario(source: &str, file_id: usize) -> Result<ScenarioInput, Vec<ParseError>> {
    let raw: RawScenario =
        toml::from_str(source).map_err(|e| vec![ParseError::from_toml(&e, file_id)])?;

    Ok(ScenarioInput {
        name: raw.name.unwrap_or_default(),
        given: raw.given.map(statement),
        when: raw.when.map(statements),
        then: raw.then.map(statements),
        source_id: file_id,
    })
}
