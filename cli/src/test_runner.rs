use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use serde::Deserialize;

use codegen::{CompileReport, Compiler, CompilerConfig, Unresolved};
use scenario::parser::{Parser, SourceFormat};

/// One unresolved-placeholder warning a test expects.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedWarning {
    pub contains: String,

    /// 1-based line in the scenario body where the offending statement starts.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Front matter of a `.test.md` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestConfig {
    pub description: Option<String>,

    /// Checked in order: each must appear after the previous one.
    pub expect_contains: Vec<String>,

    /// Whole script, compared after trimming.
    pub expect_output: Option<String>,

    /// Compilation must fail with a message containing this.
    pub expect_error: Option<String>,

    /// When present, even as `[]`, warnings are matched pairwise.
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    pub config: Option<CompilerConfig>,
}

/// Split a `.test.md` file into its TOML front matter and the Markdown scenario after it.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let body = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- frontmatter delimiter")?;

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let config = toml::from_str(&body[..offset])
                .map_err(|e| format!("invalid front matter: {}", e))?;
            return Ok((config, &body[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err("missing closing --- frontmatter delimiter".to_string())
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();
    let default_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .trim_end_matches(".test");

    let compiled = Parser::new(source.to_string(), 0, SourceFormat::Markdown)
        .with_default_name(default_name)
        .parse()
        .map_err(|errs| {
            let msgs: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
            format!("parse error: {}", msgs.join("; "))
        })
        .and_then(|input| {
            let compiler = Compiler::new(config.config.clone().unwrap_or_default());
            compiler.compile_input(input).map_err(|e| e.to_string())
        });

    match check_expectations(&config, source, compiled) {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

/// Compare a compilation result against the front matter. Returns `Some(reason)` on mismatch.
fn check_expectations(
    config: &TestConfig,
    source: &str,
    compiled: Result<CompileReport, String>,
) -> Option<String> {
    let report = match (&config.expect_error, compiled) {
        (Some(expected), Err(actual)) => {
            return (!actual.contains(expected.as_str())).then(|| {
                format!("expected error containing \"{}\", got: {}", expected, actual)
            });
        }
        (Some(expected), Ok(_)) => {
            return Some(format!(
                "expected error containing \"{}\", but compilation succeeded",
                expected
            ));
        }
        (None, Err(actual)) => return Some(format!("unexpected error: {}", actual)),
        (None, Ok(report)) => report,
    };

    if let Some(reason) = check_contains(&report.script, &config.expect_contains) {
        return Some(reason);
    }

    if let Some(expected) = &config.expect_output {
        let actual = report.script.trim();
        let expected = expected.trim();
        if actual != expected {
            return Some(format!(
                "output mismatch\n  expected:\n{}\n  actual:\n{}",
                expected, actual
            ));
        }
    }

    config
        .expect_warnings
        .as_ref()
        .and_then(|expected| check_warnings(source, &report.warnings, expected))
}

/// Each needle must appear after the previous one.
fn check_contains(script: &str, needles: &[String]) -> Option<String> {
    let mut cursor = 0;
    for needle in needles {
        match script[cursor..].find(needle.as_str()) {
            Some(at) => cursor += at + needle.len(),
            None if script.contains(needle.as_str()) => {
                return Some(format!("\"{}\" appears out of order", needle));
            }
            None => return Some(format!("output does not contain \"{}\"", needle)),
        }
    }
    None
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())].matches('\n').count() + 1
}

/// Match reported warnings against the expected ones, pairwise in order.
fn check_warnings(
    source: &str,
    warnings: &[Unresolved],
    expected: &[ExpectedWarning],
) -> Option<String> {
    if warnings.len() != expected.len() {
        let listed: String = warnings.iter().map(|w| format!("\n    - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}{}",
            expected.len(),
            warnings.len(),
            listed
        ));
    }

    warnings
        .iter()
        .zip(expected)
        .enumerate()
        .find_map(|(i, (warning, want))| {
            let message = warning.to_string();
            if !message.contains(&want.contains) {
                return Some(format!(
                    "warning {}: \"{}\" not found in: {}",
                    i + 1,
                    want.contains,
                    message
                ));
            }

            let line = want.line?;
            match warning.statement.span.as_ref().map(|span| line_of(source, span.start)) {
                Some(found) if found == line => None,
                Some(found) => Some(format!(
                    "warning {}: expected on line {}, statement starts on line {}",
                    i + 1,
                    line,
                    found
                )),
                None => Some(format!(
                    "warning {}: expected on line {}, statement has no location",
                    i + 1,
                    line
                )),
            }
        })
}

/// `.test.md` files grouped by category, the subfolder they sit in relative
/// to the suite root. Files directly under the root have category "".
struct Suite {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl Suite {
    fn discover(path: &Path) -> Self {
        let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        if path.is_file() {
            categories.insert(String::new(), vec![path.to_path_buf()]);
        } else {
            walk(path, path, &mut categories);
            for files in categories.values_mut() {
                files.sort();
            }
        }
        Suite { categories }
    }

    fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// The requested categories and everything nested below them; all of them when none are requested.
    fn select(&self, requested: &[String]) -> Vec<(&str, &[PathBuf])> {
        let wanted = |category: &str| {
            requested.is_empty()
                || requested.iter().any(|req| {
                    let req = req.trim_matches('/');
                    category == req
                        || category
                            .strip_prefix(req)
                            .is_some_and(|rest| rest.starts_with('/'))
                })
        };

        for req in requested {
            let req = req.trim_matches('/');
            let known = self
                .categories
                .keys()
                .any(|cat| cat == req || cat.starts_with(&format!("{}/", req)));
            if !known {
                tracing::warn!(category = req, "no such test category");
            }
        }

        self.categories
            .iter()
            .filter(|(cat, _)| wanted(cat.as_str()))
            .map(|(cat, files)| (cat.as_str(), files.as_slice()))
            .collect()
    }
}

fn walk(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "skipping unreadable directory");
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            walk(&path, root, out);
            continue;
        }
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".test.md"));
        if is_test {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let suite = Suite::discover(path);
    if suite.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &suite.categories {
        eprintln!("  {} ({} tests)", category_label(cat), files.len());
    }
}

/// Colored progress and summary lines on stderr.
struct Report {
    out: StandardStream,
    passed: usize,
    failures: Vec<TestResult>,
}

impl Report {
    fn new(no_color: bool) -> Self {
        let choice = if no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Report {
            out: StandardStream::stderr(choice),
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn colored(&mut self, text: &str, color: Color) -> io::Result<()> {
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    fn category(&mut self, category: &str) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(self.out, "{}", category_label(category))?;
        self.out.reset()
    }

    fn record(&mut self, result: TestResult) -> io::Result<()> {
        write!(self.out, "  ")?;
        match result.outcome {
            TestOutcome::Pass => {
                self.colored("PASS", Color::Green)?;
                writeln!(self.out, "  {}", result.label())?;
                self.passed += 1;
            }
            TestOutcome::Fail(_) => {
                self.colored("FAIL", Color::Red)?;
                writeln!(self.out, "  {}", result.label())?;
                self.failures.push(result);
            }
        }
        Ok(())
    }

    /// Print failure details and the summary line. Returns the exit code.
    fn finish(mut self) -> io::Result<i32> {
        if !self.failures.is_empty() {
            writeln!(self.out, "\nfailures:")?;
            for failure in &self.failures {
                writeln!(self.out, "\n  --- {} ---", failure.path.display())?;
                if let TestOutcome::Fail(reason) = &failure.outcome {
                    for line in reason.lines() {
                        writeln!(self.out, "  {}", line)?;
                    }
                }
            }
        }

        write!(self.out, "\ntest result: ")?;
        if self.failures.is_empty() {
            self.colored("ok", Color::Green)?;
            writeln!(self.out, ". {} passed, 0 failed", self.passed)?;
            Ok(0)
        } else {
            let failed = self.failures.len();
            self.colored("FAILED", Color::Red)?;
            writeln!(
                self.out,
                ". {} passed, {} failed (of {})",
                self.passed,
                failed,
                self.passed + failed
            )?;
            Ok(1)
        }
    }
}

/// Run all `.test.md` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let suite = Suite::discover(path);
    if suite.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return 1;
    }

    let single = path.is_file();
    let requested: &[String] = if single { &[] } else { categories };
    let selected = suite.select(requested);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let run = || -> io::Result<i32> {
        let mut report = Report::new(no_color);
        for (category, files) in selected {
            if !single {
                report.category(category)?;
            }
            for file in files {
                report.record(run_single_test(file))?;
            }
        }
        report.finish()
    };

    run().unwrap_or_else(|e| {
        eprintln!("error: cannot write test report: {}", e);
        1
    })
}
