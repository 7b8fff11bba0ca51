use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Parser as CmarkParser, Tag, TagEnd};

use crate::parser::error::{ParseError, ParseErrorKind};
use crate::statement::Statement;
use crate::{ScenarioInput, Section};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a Markdown scenario:
///
/// ```markdown
/// # log in
/// ## Given
/// <visit_url http://example.com>
/// ## When
/// 1. <input_username value bob>
/// 2. <click_#go>
/// ## Then
/// - <assert_#title has text Hi>
/// ```
///
/// Statements are taken from the raw source, so placeholder text is never
/// reinterpreted as Markdown.
pub fn parse_scenario(source: &str, file_id: usize) -> Result<ScenarioInput, Vec<ParseError>> {
    let events: Vec<(Event<'_>, Range<usize>)> =
        CmarkParser::new(source).into_offset_iter().collect();

    let mut state = ParseState::new(source, file_id);
    state.process_events(&events);
    state.finalize()
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    source: &'a str,
    file_id: usize,
    name: Option<String>,
    /// The section new statements go into.
    current: Option<Section>,
    given: Option<SectionBody>,
    when: Option<SectionBody>,
    then: Option<SectionBody>,
    errors: Vec<ParseError>,
}

struct SectionBody {
    heading: Range<usize>,
    statements: Vec<Statement>,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, file_id: usize) -> Self {
        ParseState {
            source,
            file_id,
            name: None,
            current: None,
            given: None,
            when: None,
            then: None,
            errors: Vec::new(),
        }
    }

    fn body_mut(&mut self, section: Section) -> &mut Option<SectionBody> {
        match section {
            Section::Given => &mut self.given,
            Section::When => &mut self.when,
            Section::Then => &mut self.then,
        }
    }

    fn push(&mut self, statement: Statement) {
        if statement.as_str().is_empty() {
            return;
        }
        if let Some(section) = self.current {
            if let Some(body) = self.body_mut(section) {
                body.statements.push(statement);
            }
        }
    }

    fn process_events(&mut self, events: &[(Event<'_>, Range<usize>)]) {
        let mut i = 0;

        while i < events.len() {
            let (ref ev, ref range) = events[i];
            i += 1;

            match ev {
                Event::Start(Tag::Heading { level, .. }) => {
                    let text = collect_heading_text(events, &mut i);
                    self.open_heading(*level, text.trim(), range.clone());
                }

                // Each list item is one statement, plus any lone placeholder
                // lines that lazily continued it.
                Event::Start(Tag::Item) => {
                    skip_to_end(events, &mut i);
                    if self.current.is_some() {
                        for statement in item_statements(self.source, range.clone()) {
                            self.push(statement);
                        }
                    }
                }

                // Each line of a paragraph or raw HTML block is one statement.
                Event::Start(Tag::Paragraph) | Event::Start(Tag::HtmlBlock) => {
                    skip_to_end(events, &mut i);
                    if self.current.is_some() {
                        for statement in line_statements(self.source, range.clone()) {
                            self.push(statement);
                        }
                    }
                }

                // Descend into lists; their items are handled above.
                Event::Start(Tag::List(_)) => {}

                Event::Start(_) => skip_to_end(events, &mut i),

                _ => {}
            }
        }
    }

    fn open_heading(&mut self, level: HeadingLevel, text: &str, range: Range<usize>) {
        match level {
            HeadingLevel::H1 => {
                if self.name.is_none() {
                    self.name = Some(text.to_string());
                }
                self.current = None;
            }
            HeadingLevel::H2 => match Section::from_name(text) {
                Some(section) => {
                    if self.body_mut(section).is_some() {
                        self.errors.push(ParseError::new(
                            ParseErrorKind::DuplicateSection(section),
                            range,
                            self.file_id,
                        ));
                        self.current = None;
                        return;
                    }
                    *self.body_mut(section) = Some(SectionBody {
                        heading: range,
                        statements: Vec::new(),
                    });
                    self.current = Some(section);
                }
                None => {
                    self.errors.push(ParseError::new(
                        ParseErrorKind::UnknownSection(text.to_string()),
                        range,
                        self.file_id,
                    ));
                    self.current = None;
                }
            },
            // Deeper headings are commentary.
            _ => {}
        }
    }

    fn finalize(mut self) -> Result<ScenarioInput, Vec<ParseError>> {
        let given = self.given.take().map(|body| {
            let mut statements = body.statements.into_iter();
            let first = statements
                .next()
                .unwrap_or_else(|| Statement::with_span("", body.heading.clone()));
            for extra in statements {
                self.errors.push(ParseError::new(
                    ParseErrorKind::ExtraGiven,
                    extra.span.clone().unwrap_or(body.heading.clone()),
                    self.file_id,
                ));
            }
            first
        });

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(ScenarioInput {
            name: self.name.unwrap_or_default(),
            given,
            when: self.when.map(|body| body.statements),
            then: self.then.map(|body| body.statements),
            source_id: self.file_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn collect_heading_text(events: &[(Event<'_>, Range<usize>)], i: &mut usize) -> String {
    let mut text = String::new();
    while *i < events.len() {
        let (ref ev, _) = events[*i];
        *i += 1;
        match ev {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Advance `i` past the end event matching an already consumed start event.
fn skip_to_end(events: &[(Event<'_>, Range<usize>)], i: &mut usize) {
    let mut depth = 1usize;
    while *i < events.len() && depth > 0 {
        match events[*i].0 {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            _ => {}
        }
        *i += 1;
    }
}

/// Trim `range` within `source`, returning the trimmed text and its narrowed span.
fn trimmed(source: &str, range: Range<usize>) -> (&str, Range<usize>) {
    let slice = &source[range.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let text = slice.trim();
    let start = range.start + leading;
    (text, start..start + text.len())
}

/// Byte length of a leading list marker (`1.`, `2)`, `-`, `*`, `+`), or 0.
fn list_marker_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 {
        return match bytes.get(digits) {
            Some(b'.') | Some(b')') => digits + 1,
            _ => 0,
        };
    }
    match bytes.first() {
        Some(b'-') | Some(b'*') | Some(b'+') => 1,
        _ => 0,
    }
}

/// Continuation lines fold into the item's statement. A line holding a lone
/// placeholder (`<if_end>` after `- <click_#a>`) starts a statement of its own.
fn item_statements(source: &str, range: Range<usize>) -> Vec<Statement> {
    let (text, span) = trimmed(source, range);
    let marker = list_marker_len(text);
    let (_, body) = trimmed(source, span.start + marker..span.end);

    let mut folded: Vec<(Vec<&str>, Range<usize>)> = Vec::new();
    let mut offset = body.start;
    for line in source[body.clone()].split_inclusive('\n') {
        let (text, span) = trimmed(source, offset..offset + line.len());
        offset += line.len();
        if text.is_empty() {
            continue;
        }
        match folded.last_mut() {
            Some((parts, joined)) if !is_lone_placeholder(text) => {
                parts.push(text);
                joined.end = span.end;
            }
            _ => folded.push((vec![text], span)),
        }
    }

    folded
        .into_iter()
        .map(|(parts, span)| Statement::with_span(parts.join(" "), span))
        .collect()
}

fn is_lone_placeholder(line: &str) -> bool {
    line.starts_with('<') && line.ends_with('>') && !line[1..].contains('<')
}

fn line_statements(source: &str, range: Range<usize>) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut offset = range.start;
    for line in source[range].split_inclusive('\n') {
        let (text, span) = trimmed(source, offset..offset + line.len());
        offset += line.len();
        if !text.is_empty() {
            statements.push(Statement::with_span(text, span));
        }
    }
    statements
}
