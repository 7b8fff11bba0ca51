mod families;

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Code-generation rule for a sub-pattern. Receives the captures of the inner matcher.
pub type Render = fn(&Captures<'_>) -> String;

/// The outer category of a placeholder: the `family` in `<family_argument>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyTag {
    /// The bare `<end>` marker. Renders to nothing.
    End,
    Visit,
    Input,
    Click,
    Button,
    /// Conditional guards: `<if_...>`.
    If,
    Selector,
    Element,
    Action,
    Assert,
    Alert,
}

impl FamilyTag {
    pub fn name(&self) -> &'static str {
        match self {
            FamilyTag::End => "end",
            FamilyTag::Visit => "visit",
            FamilyTag::Input => "input",
            FamilyTag::Click => "click",
            FamilyTag::Button => "button",
            FamilyTag::If => "if",
            FamilyTag::Selector => "selector",
            FamilyTag::Element => "element",
            FamilyTag::Action => "action",
            FamilyTag::Assert => "assert",
            FamilyTag::Alert => "alert",
        }
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recognized shape inside a family, with the rule that turns it into code.
pub struct SubPattern {
    matcher: Regex,
    template: &'static str,
    render: Render,
}

impl SubPattern {
    /// Build a sub-pattern. `pattern` is anchored at both ends of the argument.
    fn new(pattern: &str, template: &'static str, render: Render) -> Self {
        let matcher = Regex::new(&format!("^(?:{pattern})$"))
            .unwrap_or_else(|e| panic!("invalid sub-pattern {pattern:?}: {e}"));
        SubPattern {
            matcher,
            template,
            render,
        }
    }

    /// Human-readable form, used for diagnostics only.
    pub fn template(&self) -> &'static str {
        self.template
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    pub fn is_match(&self, argument: &str) -> bool {
        self.matcher.is_match(argument)
    }

    /// Run the code-generation rule on captures produced by this sub-pattern's matcher.
    /// Captures from any other matcher may panic on a missing group.
    pub fn render(&self, captures: &Captures<'_>) -> String {
        (self.render)(captures)
    }

    /// Match `argument` and render it in one step.
    pub fn apply(&self, argument: &str) -> Option<String> {
        self.matcher
            .captures(argument)
            .map(|captures| self.render(&captures))
    }
}

impl fmt::Debug for SubPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubPattern")
            .field("matcher", &self.matcher.as_str())
            .field("template", &self.template)
            .finish()
    }
}

/// A placeholder found inside a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence<'h> {
    /// Byte range of the whole `<...>` text within the searched string.
    pub range: Range<usize>,
    pub text: &'h str,
    /// The text after `family_`, up to the closing `>`.
    pub argument: &'h str,
}

/// A family of placeholders sharing one outer shape, e.g. every `<action_...>`.
#[derive(Debug)]
pub struct PlaceholderFamily {
    tag: FamilyTag,
    shape: Regex,
    patterns: Vec<SubPattern>,
}

impl PlaceholderFamily {
    fn new(tag: FamilyTag, patterns: Vec<SubPattern>) -> Self {
        let name = regex::escape(tag.name());
        // `<end>` carries no argument; its name doubles as the argument.
        // Arguments run up to the last `>` before the next `<`, so CSS child
        // combinators (`ul > li`) stay inside the placeholder.
        let shape = match tag {
            FamilyTag::End => format!("<({name})>"),
            _ => format!("<{name}_([^<]+)>"),
        };
        PlaceholderFamily {
            tag,
            shape: Regex::new(&shape).unwrap_or_else(|e| panic!("invalid shape {shape:?}: {e}")),
            patterns,
        }
    }

    pub fn tag(&self) -> FamilyTag {
        self.tag
    }

    pub fn patterns(&self) -> &[SubPattern] {
        &self.patterns
    }

    /// Find the first occurrence of this family's shape at or after byte offset `from`.
    pub fn find_at<'h>(&self, haystack: &'h str, from: usize) -> Option<Occurrence<'h>> {
        let captures = self.shape.captures_at(haystack, from)?;
        let whole = captures.get(0)?;
        let argument = captures.get(1)?;
        Some(Occurrence {
            range: whole.range(),
            text: whole.as_str(),
            argument: argument.as_str(),
        })
    }

    /// True when `token` (a complete `<...>` token) is exactly this family's shape.
    pub fn matches_token(&self, token: &str) -> bool {
        self.shape
            .find(token)
            .is_some_and(|m| m.start() == 0 && m.end() == token.len())
    }

    /// The first sub-pattern accepting `argument`, in declaration order.
    pub fn sub_pattern(&self, argument: &str) -> Option<&SubPattern> {
        self.patterns.iter().find(|p| p.is_match(argument))
    }
}

/// The ordered, immutable table of placeholder families.
#[derive(Debug)]
pub struct Registry {
    families: Vec<PlaceholderFamily>,
}

impl Registry {
    pub fn families(&self) -> &[PlaceholderFamily] {
        &self.families
    }

    pub fn family(&self, tag: FamilyTag) -> Option<&PlaceholderFamily> {
        self.families.iter().find(|f| f.tag == tag)
    }

    /// Resolve a family tag and inner argument to the first accepting sub-pattern.
    pub fn lookup(&self, tag: FamilyTag, argument: &str) -> Option<&SubPattern> {
        self.family(tag)?.sub_pattern(argument)
    }

    /// The first family (in declaration order) whose shape is exactly `token`.
    pub fn family_for_token(&self, token: &str) -> Option<&PlaceholderFamily> {
        self.families.iter().find(|f| f.matches_token(token))
    }

    /// Every sub-pattern template, paired with its family, in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = (FamilyTag, &'static str)> + '_ {
        self.families
            .iter()
            .flat_map(|f| f.patterns.iter().map(move |p| (f.tag, p.template)))
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// The process-wide registry. Built on first use, read-only afterwards.
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        let registry = Registry {
            families: families::all(),
        };
        tracing::debug!(
            families = registry.families.len(),
            templates = registry.templates().count(),
            "placeholder registry initialized"
        );
        registry
    })
}
