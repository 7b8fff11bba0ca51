use scenario::registry::{FamilyTag, registry};

/// Substitute each `[slot]` in a template with a distinct sample word.
fn fill(template: &str) -> String {
    let mut out = String::new();
    let mut rest = template;
    let mut n = 0;
    while let Some(start) = rest.find('[') {
        let end = start + rest[start..].find(']').expect("unclosed slot");
        out.push_str(&rest[..start]);
        out.push_str(&format!("v{}", n));
        n += 1;
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

#[test]
fn every_template_selects_its_own_sub_pattern() {
    for family in registry().families() {
        for pattern in family.patterns() {
            let statement = fill(pattern.template());
            let occurrence = family
                .find_at(&statement, 0)
                .unwrap_or_else(|| panic!("{} does not match its family shape", statement));
            assert_eq!(occurrence.text, statement);

            let found = registry()
                .lookup(family.tag(), occurrence.argument)
                .unwrap_or_else(|| panic!("no sub-pattern accepts {}", statement));
            assert!(
                std::ptr::eq(found, pattern),
                "{} resolved through {} instead",
                statement,
                found.template()
            );

            let captures = pattern
                .matcher()
                .captures(occurrence.argument)
                .expect("matcher accepts its own template");
            assert_eq!(pattern.apply(occurrence.argument), Some(pattern.render(&captures)));
        }
    }
}

#[test]
fn families_are_in_declaration_order() {
    let tags: Vec<FamilyTag> = registry().families().iter().map(|f| f.tag()).collect();
    assert_eq!(
        tags,
        vec![
            FamilyTag::End,
            FamilyTag::Visit,
            FamilyTag::Input,
            FamilyTag::Click,
            FamilyTag::Button,
            FamilyTag::If,
            FamilyTag::Selector,
            FamilyTag::Element,
            FamilyTag::Action,
            FamilyTag::Assert,
            FamilyTag::Alert,
        ]
    );
}

#[test]
fn guard_family_covers_all_conditions() {
    let guards = registry().family(FamilyTag::If).expect("if family");
    assert_eq!(guards.patterns().len(), 9);
    assert_eq!(
        registry()
            .lookup(FamilyTag::If, "#banner has color as red")
            .and_then(|p| p.apply("#banner has color as red")),
        Some("cy.get('#banner').should('have.css', 'color', 'red')".to_string())
    );
    assert_eq!(
        registry()
            .lookup(FamilyTag::If, "#save is disabled")
            .and_then(|p| p.apply("#save is disabled")),
        Some("cy.get('#save').should('be.disabled')".to_string())
    );
}

#[test]
fn uncheck_is_not_shadowed_by_check() {
    let pattern = registry()
        .lookup(FamilyTag::Action, "uncheck #terms")
        .expect("uncheck pattern");
    assert_eq!(pattern.template(), "<action_uncheck [selector]>");
    assert_eq!(
        pattern.apply("uncheck #terms").as_deref(),
        Some("cy.get('#terms').uncheck()")
    );
}

#[test]
fn unknown_argument_matches_no_sub_pattern() {
    assert!(registry().lookup(FamilyTag::If, "end").is_none());
    assert!(registry().lookup(FamilyTag::Visit, "http://x").is_none());
}

#[test]
fn shapes_match_whole_tokens_only() {
    let visit = registry().family(FamilyTag::Visit).expect("visit family");
    assert!(visit.matches_token("<visit_url http://x>"));
    assert!(!visit.matches_token("<revisit_url http://x>"));
    assert!(!visit.matches_token("<visit_>"));

    assert_eq!(
        registry()
            .family_for_token("<end>")
            .map(|f| f.tag()),
        Some(FamilyTag::End)
    );
    assert_eq!(
        registry()
            .family_for_token("<if_end>")
            .map(|f| f.tag()),
        Some(FamilyTag::If)
    );
    assert!(registry().family_for_token("<hover_#menu>").is_none());
}

#[test]
fn occurrences_stop_before_the_next_placeholder() {
    let click = registry().family(FamilyTag::Click).expect("click family");
    let text = "<click_#a> then <click_#b>";
    let first = click.find_at(text, 0).expect("first click");
    assert_eq!(first.argument, "#a");
    let second = click.find_at(text, first.range.end).expect("second click");
    assert_eq!(second.argument, "#b");
    assert_eq!(&text[second.range.clone()], "<click_#b>");
}

#[test]
fn child_combinator_stays_inside_the_argument() {
    let click = registry().family(FamilyTag::Click).expect("click family");
    let text = "<click_ul.menu > li> then <click_#nav > a>";
    let first = click.find_at(text, 0).expect("first click");
    assert_eq!(first.argument, "ul.menu > li");
    let second = click.find_at(text, first.range.end).expect("second click");
    assert_eq!(second.argument, "#nav > a");
}
