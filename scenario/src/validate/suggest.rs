use crate::registry::Registry;

/// Suggestions further than this many edits away are not offered.
pub const SUGGESTION_THRESHOLD: usize = 10;

/// The closest known template to a rejected statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub template: &'static str,
    pub distance: usize,
}

/// Find the template nearest to `statement` by edit distance, if one is within
/// [`SUGGESTION_THRESHOLD`]. Ties go to the template declared first.
pub fn closest_template(registry: &Registry, statement: &str) -> Option<Suggestion> {
    let mut best: Option<Suggestion> = None;
    for (_, template) in registry.templates() {
        let distance = levenshtein(statement, template);
        if distance > SUGGESTION_THRESHOLD {
            continue;
        }
        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(Suggestion { template, distance });
        }
    }
    best
}

/// Character-wise Levenshtein distance (insert, delete, substitute; all cost 1).
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
