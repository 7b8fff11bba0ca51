use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use codegen::emitter::emit_forest;
use codegen::{
    CompileError, Compiler, CompilerConfig, TestTitle, compile, resolve_statement,
};
use scenario::registry::{FamilyTag, registry};
use scenario::statement::Statement;
use scenario::tree::build_forest;
use scenario::{Scenario, ScenarioInput, Section, StructuralError};

fn statements(lines: &[&str]) -> Vec<Statement> {
    lines.iter().map(|l| Statement::from(*l)).collect()
}

fn scenario(name: &str, given: &str, when: &[&str], then: &[&str]) -> Scenario {
    Scenario::new(name, given, statements(when), statements(then)).expect("complete scenario")
}

fn resolve(text: &str) -> String {
    let resolution = resolve_statement(registry(), &Statement::new(text));
    assert!(resolution.is_complete(), "unresolved: {:?}", resolution.unresolved);
    resolution.text
}

/// Positions of each needle, asserting they appear in order.
fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut cursor = 0;
    for needle in needles {
        let at = haystack[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("{:?} missing or out of order in:\n{}", needle, haystack));
        cursor += at + needle.len();
    }
}

#[test]
fn end_to_end_login() {
    let s = scenario(
        "log in",
        "<visit_url http://x>",
        &["<input_username value bob>", "<click_#go>"],
        &["<assert_#title has text Hi>"],
    );
    let report = compile(&s).expect("compiles");
    assert!(report.warnings.is_empty());
    assert_in_order(
        &report.script,
        &[
            "describe('log in', () => {",
            "it('<visit_url http://x>', () => {",
            "cy.visit('http://x')",
            "cy.get('input.username').type('bob')",
            "cy.get('#go').click()",
            "cy.get('#title').should('contain.text', 'Hi')",
            "});",
        ],
    );
    assert_eq!(report.script.matches("describe(").count(), 1);
    assert_eq!(report.script.matches("it(").count(), 1);
}

#[test]
fn conditional_blocks_render_nested() {
    let s = scenario(
        "visit example website",
        "<visit_url http://example.com>",
        &[
            "<input_username value testuser>",
            "<if_welcome_message exists>",
            "<click_#submit>",
            "<if_end>",
        ],
        &["<assert_page_title has text Welcome to Example>"],
    );
    let report = compile(&s).expect("compiles");
    let expected = "\
/// <reference types=\"cypress\" />
describe('visit example website', () => {
  it('<visit_url http://example.com>', () => {
    cy.visit('http://example.com')

    cy.get('input.username').type('testuser')
    if (cy.get('welcome_message').should('exist')) {
      cy.get('#submit').click()
    }

    cy.get('page_title').should('contain.text', 'Welcome to Example')
  });
});
";
    assert_eq!(report.script, expected);
}

#[test]
fn every_template_resolves_through_its_own_rule() {
    for family in registry().families() {
        for pattern in family.patterns() {
            let mut statement = String::new();
            let mut rest = pattern.template();
            let mut n = 0;
            while let Some(start) = rest.find('[') {
                let end = start + rest[start..].find(']').expect("slot");
                statement.push_str(&rest[..start]);
                statement.push_str(&format!("arg{}", n));
                n += 1;
                rest = &rest[end + 1..];
            }
            statement.push_str(rest);

            let occurrence = family.find_at(&statement, 0).expect("family shape");
            let direct = pattern.apply(occurrence.argument).expect("own template");
            assert_eq!(resolve(&statement), direct, "{}", pattern.template());
        }
    }
}

#[test]
fn resolution_leaves_prose_alone() {
    assert_eq!(
        resolve("first <click_#a>, then <click_#b> // done"),
        "first cy.get('#a').click(), then cy.get('#b').click() // done"
    );
}

#[test]
fn child_combinator_selectors_resolve_whole() {
    assert_eq!(resolve("<click_ul.menu > li>"), "cy.get('ul.menu > li').click()");
    assert_eq!(
        resolve("<click_ul.menu > li> then <click_#nav > a>"),
        "cy.get('ul.menu > li').click() then cy.get('#nav > a').click()"
    );
    assert_eq!(
        resolve("<assert_ol > li.done has text 3 items>"),
        "cy.get('ol > li.done').should('contain.text', '3 items')"
    );
}

#[test]
fn resolution_spans_families() {
    assert_eq!(
        resolve("<selector_button Save> <element_table orders>"),
        "cy.get('button').contains('Save') cy.get('table.orders')"
    );
}

#[test]
fn alert_renders_a_listener() {
    assert_eq!(
        resolve("<alert_contains text Saved>"),
        "cy.on('window:alert', (alertText) => { expect(alertText).to.equal('Saved'); });"
    );
}

#[test]
fn end_marker_resolves_to_nothing() {
    assert_eq!(resolve("<end>"), "");
}

#[test]
fn unresolved_placeholder_passes_through_with_a_warning() {
    let resolution = resolve_statement(
        registry(),
        &Statement::new("<visit_http://x> then <click_#go>"),
    );
    assert_eq!(resolution.text, "<visit_http://x> then cy.get('#go').click()");
    assert_eq!(resolution.unresolved.len(), 1);
    let warning = &resolution.unresolved[0];
    assert_eq!(warning.family, FamilyTag::Visit);
    assert_eq!(warning.placeholder, "<visit_http://x>");
    assert!(warning.to_string().contains("<visit_http://x>"));
}

#[test]
fn repeated_unresolved_placeholders_terminate() {
    let resolution = resolve_statement(registry(), &Statement::new("<button_a> <button_b>"));
    assert_eq!(resolution.text, "<button_a> <button_b>");
    assert_eq!(resolution.unresolved.len(), 2);
}

#[test]
fn compile_reports_unresolved_but_succeeds() {
    let s = scenario(
        "odd",
        "<visit_url http://x>",
        &["<if_#a sparkles>", "<click_#a>", "<if_end>"],
        &["<assert_#a is checked>"],
    );
    let report = compile(&s).expect("compiles");
    assert_eq!(report.warnings.len(), 1);
    assert!(report.script.contains("if (<if_#a sparkles>) {"));
    let diagnostic = report.warnings[0].to_diagnostic(registry(), 0);
    assert!(diagnostic.notes[0].contains("<if_[selector] exists>"));
}

#[test]
fn emitter_indents_children() {
    let forest = build_forest(&statements(&["<if_#x is visible>", "<click_#x>", "<if_end>"]));
    let emitted = emit_forest(registry(), &forest, 4);
    assert_eq!(
        emitted.text,
        "if (cy.get('#x').should('be.visible')) {\n    cy.get('#x').click()\n}\n"
    );
}

#[test]
fn empty_conditional_renders_as_a_statement() {
    let forest = build_forest(&statements(&["<if_#x exists>", "<if_end>"]));
    let emitted = emit_forest(registry(), &forest, 2);
    assert_eq!(emitted.text, "cy.get('#x').should('exist')\n");
}

#[test]
fn syntax_error_stops_compilation() {
    let s = scenario(
        "typo",
        "<visit_url http://x>",
        &["<clik_#go>"],
        &["<assert_#title has text Hi>"],
    );
    match compile(&s) {
        Err(CompileError::Syntax(err)) => {
            assert_eq!(err.statement.as_str(), "<clik_#go>");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn syntax_error_in_given_is_caught_first() {
    let s = scenario("typo", "<vist_url [url]>", &["<hover_#a>"], &["<click_#b>"]);
    let err = compile(&s).unwrap_err();
    assert!(
        err.to_string().contains("did you mean \"<visit_url [url]>\""),
        "{}",
        err
    );
}

#[test]
fn empty_when_is_structural() {
    let input = ScenarioInput {
        name: "empty".into(),
        given: Some("<visit_url http://x>".into()),
        when: Some(Vec::new()),
        then: Some(statements(&["<click_#a>"])),
        source_id: 0,
    };
    match Compiler::default().compile_input(input) {
        Err(CompileError::Structural(StructuralError::EmptySection(Section::When))) => {}
        other => panic!("expected structural error, got {:?}", other),
    }
}

#[test]
fn missing_then_is_structural() {
    let input = ScenarioInput {
        name: "partial".into(),
        given: Some("<visit_url http://x>".into()),
        when: Some(statements(&["<click_#a>"])),
        then: None,
        source_id: 0,
    };
    let err = Compiler::default().compile_input(input).unwrap_err();
    assert!(err.to_string().contains("missing \"then\""), "{}", err);
}

#[test]
fn config_changes_layout() {
    let config = CompilerConfig::from_toml_str(
        "indent = 4\nreference_types = false\ntest_title = \"name\"\n",
    )
    .expect("config");
    assert_eq!(config.test_title, TestTitle::Name);

    let s = scenario("it's done", "<visit_url http://x>", &["<click_#a>"], &["<click_#b>"]);
    let report = Compiler::new(config).compile(&s).expect("compiles");
    assert!(!report.script.contains("reference types"));
    assert!(report.script.starts_with("describe('it\\'s done', () => {\n"));
    assert!(report.script.contains("\n    it('it\\'s done', () => {\n"));
    assert!(report.script.contains("\n        cy.visit('http://x')\n"));
}

#[test]
fn config_rejects_unknown_keys() {
    assert!(CompilerConfig::from_toml_str("tabs = true\n").is_err());
    assert_eq!(
        CompilerConfig::from_toml_str("").expect("empty config"),
        CompilerConfig::default()
    );
}

#[test]
fn write_spec_file_creates_directories() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("cypress/integration/generated.spec.ts");
    let s = scenario("w", "<visit_url http://x>", &["<click_#a>"], &["<click_#b>"]);

    let report = Compiler::default()
        .write_spec_file(&s, &path)
        .expect("written");
    let written = std::fs::read_to_string(&path).expect("readable");
    assert_eq!(written, report.script);
}

#[test]
fn write_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A directory where the file should go.
    let path = dir.path().join("taken");
    std::fs::create_dir(&path).expect("mkdir");
    let s = scenario("w", "<visit_url http://x>", &["<click_#a>"], &["<click_#b>"]);

    match Compiler::default().write_spec_file(&s, &path) {
        Err(CompileError::Io { target, .. }) => assert!(target.ends_with("taken")),
        other => panic!("expected io error, got {:?}", other),
    }
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn compile_to_writer() {
    let s = scenario("w", "<visit_url http://x>", &["<click_#a>"], &["<click_#b>"]);
    let mut out = Vec::new();
    let report = Compiler::default()
        .compile_to(&s, &mut out, "<buffer>")
        .expect("written");
    assert_eq!(String::from_utf8(out).expect("utf-8"), report.script);

    let err = Compiler::default()
        .compile_to(&s, &mut BrokenPipe, "<pipe>")
        .unwrap_err();
    assert!(err.to_string().starts_with("cannot write '<pipe>'"), "{}", err);
}

#[test]
fn compilations_are_independent_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let s = scenario(
                    &format!("thread {}", i),
                    "<visit_url http://x>",
                    &["<if_#a exists>", "<click_#a>", "<if_end>"],
                    &["<assert_#a is checked>"],
                );
                compile(&s).expect("compiles").script
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let script = handle.join().expect("thread");
        assert!(script.contains(&format!("describe('thread {}'", i)));
    }
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn reported_conditions_stay_below_warn() {
    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || sink.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let s = scenario(
            "quiet",
            "<visit_url http://x>",
            &["<if_#a sparkles>", "<click_#a>", "<if_end>"],
            &["<button_a>"],
        );
        let report = compile(&s).expect("compiles");
        assert_eq!(report.warnings.len(), 2);

        let dir = tempfile::tempdir().expect("tempdir");
        let taken = dir.path().join("taken");
        std::fs::create_dir(&taken).expect("mkdir");
        assert!(Compiler::default().write_spec_file(&s, &taken).is_err());
    });

    let logged = String::from_utf8(captured.0.lock().expect("log buffer").clone()).expect("utf-8");
    assert!(logged.is_empty(), "unexpected log output:\n{}", logged);
}
