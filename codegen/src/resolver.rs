use scenario::registry::Registry;
use scenario::statement::Statement;

use crate::error::Unresolved;

/// A statement with every resolvable placeholder replaced by code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    /// Placeholders that were recognized but left in place.
    pub unresolved: Vec<Unresolved>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace every recognized placeholder in `statement` with its generated code.
///
/// Families are applied in registry order. Within a family the statement is
/// scanned left to right; inserted code is never rescanned by the same family.
/// An occurrence whose argument fits no sub-pattern stays as literal text and is
/// reported in [`Resolution::unresolved`]. Text outside placeholders is untouched.
pub fn resolve_statement(registry: &Registry, statement: &Statement) -> Resolution {
    let mut text = statement.text.clone();
    let mut unresolved = Vec::new();

    for family in registry.families() {
        let mut cursor = 0;
        while let Some(occurrence) = family.find_at(&text, cursor) {
            let range = occurrence.range.clone();
            let code = family
                .sub_pattern(occurrence.argument)
                .and_then(|pattern| pattern.apply(occurrence.argument));

            match code {
                Some(code) => {
                    tracing::trace!(
                        family = %family.tag(),
                        placeholder = occurrence.text,
                        code = code.as_str(),
                        "placeholder resolved"
                    );
                    text.replace_range(range.clone(), &code);
                    cursor = range.start + code.len();
                }
                None => {
                    tracing::debug!(
                        family = %family.tag(),
                        placeholder = occurrence.text,
                        statement = statement.as_str(),
                        "no template matches placeholder; leaving it unresolved"
                    );
                    unresolved.push(Unresolved {
                        family: family.tag(),
                        placeholder: occurrence.text.to_string(),
                        statement: statement.clone(),
                    });
                    cursor = range.end;
                }
            }
        }
    }

    Resolution { text, unresolved }
}
