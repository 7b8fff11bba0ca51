//! The placeholder table. Order matters: families are tried top to bottom,
//! and within a family the first accepting sub-pattern wins.

use super::{FamilyTag, PlaceholderFamily, SubPattern};

pub(super) fn all() -> Vec<PlaceholderFamily> {
    vec![
        PlaceholderFamily::new(
            FamilyTag::End,
            vec![SubPattern::new("end", "<end>", |_| String::new())],
        ),
        PlaceholderFamily::new(
            FamilyTag::Visit,
            vec![SubPattern::new("url (.+)", "<visit_url [url]>", |c| {
                format!("cy.visit('{}')", &c[1])
            })],
        ),
        PlaceholderFamily::new(
            FamilyTag::Input,
            vec![SubPattern::new(
                "(.+) value (.+)",
                "<input_[selector] value [value]>",
                |c| format!("cy.get('input.{}').type('{}')", &c[1], &c[2]),
            )],
        ),
        PlaceholderFamily::new(
            FamilyTag::Click,
            vec![SubPattern::new("(.+)", "<click_[selector]>", |c| {
                format!("cy.get('{}').click()", &c[1])
            })],
        ),
        PlaceholderFamily::new(
            FamilyTag::Button,
            vec![
                SubPattern::new("submit (.+)", "<button_submit [selector]>", |c| {
                    format!("cy.get('button[type=\"submit\"].{}').click()", &c[1])
                }),
                SubPattern::new("cancel (.+)", "<button_cancel [selector]>", |c| {
                    format!("cy.get('button[type=\"button\"].{}').click()", &c[1])
                }),
            ],
        ),
        PlaceholderFamily::new(FamilyTag::If, guards()),
        PlaceholderFamily::new(
            FamilyTag::Selector,
            vec![
                SubPattern::new("button (.+)", "<selector_button [text]>", |c| {
                    format!("cy.get('button').contains('{}')", &c[1])
                }),
                SubPattern::new("hyperlink (.+)", "<selector_hyperlink [text]>", |c| {
                    format!("cy.get('a').contains('{}')", &c[1])
                }),
                SubPattern::new("input (.+)", "<selector_input [name]>", |c| {
                    format!("cy.get('input[name=\"{}\"]')", &c[1])
                }),
            ],
        ),
        PlaceholderFamily::new(
            FamilyTag::Element,
            vec![
                SubPattern::new("table (.+)", "<element_table [css_name]>", |c| {
                    format!("cy.get('table.{}')", &c[1])
                }),
                SubPattern::new("list (.+)", "<element_list [css_name]>", |c| {
                    format!("cy.get('ul.{}')", &c[1])
                }),
                SubPattern::new("list_item (.+)", "<element_list_item [css_name]>", |c| {
                    format!("cy.get('li.{}')", &c[1])
                }),
            ],
        ),
        PlaceholderFamily::new(
            FamilyTag::Action,
            vec![
                SubPattern::new("type (.+) into (.+)", "<action_type [text] into [selector]>", |c| {
                    format!("cy.get('{}').type('{}')", &c[2], &c[1])
                }),
                SubPattern::new(
                    "select (.+) from (.+)",
                    "<action_select [option] from [selector]>",
                    |c| format!("cy.get('{}').select('{}')", &c[2], &c[1]),
                ),
                SubPattern::new("check (.+)", "<action_check [selector]>", |c| {
                    format!("cy.get('{}').check()", &c[1])
                }),
                SubPattern::new("uncheck (.+)", "<action_uncheck [selector]>", |c| {
                    format!("cy.get('{}').uncheck()", &c[1])
                }),
            ],
        ),
        PlaceholderFamily::new(
            FamilyTag::Assert,
            vec![
                SubPattern::new("(.+) has text (.+)", "<assert_[selector] has text [text]>", |c| {
                    format!("cy.get('{}').should('contain.text', '{}')", &c[1], &c[2])
                }),
                SubPattern::new("(.+) is checked", "<assert_[selector] is checked>", |c| {
                    format!("cy.get('{}').should('be.checked')", &c[1])
                }),
                SubPattern::new("(.+) is unchecked", "<assert_[selector] is unchecked>", |c| {
                    format!("cy.get('{}').should('not.be.checked')", &c[1])
                }),
            ],
        ),
        PlaceholderFamily::new(
            FamilyTag::Alert,
            vec![SubPattern::new(
                "contains text (.+)",
                "<alert_contains text [text]>",
                |c| {
                    format!(
                        "cy.on('window:alert', (alertText) => {{ expect(alertText).to.equal('{}'); }});",
                        &c[1]
                    )
                },
            )],
        ),
    ]
}

/// Conditional guards. Each renders to a chainable assertion used as an `if` header.
fn guards() -> Vec<SubPattern> {
    vec![
        SubPattern::new("(.+) exists", "<if_[selector] exists>", |c| {
            format!("cy.get('{}').should('exist')", &c[1])
        }),
        SubPattern::new("(.+) does not exist", "<if_[selector] does not exist>", |c| {
            format!("cy.get('{}').should('not.exist')", &c[1])
        }),
        SubPattern::new("(.+) is visible", "<if_[selector] is visible>", |c| {
            format!("cy.get('{}').should('be.visible')", &c[1])
        }),
        SubPattern::new("(.+) is hidden", "<if_[selector] is hidden>", |c| {
            format!("cy.get('{}').should('not.be.visible')", &c[1])
        }),
        SubPattern::new("(.+) is enabled", "<if_[selector] is enabled>", |c| {
            format!("cy.get('{}').should('not.be.disabled')", &c[1])
        }),
        SubPattern::new("(.+) is disabled", "<if_[selector] is disabled>", |c| {
            format!("cy.get('{}').should('be.disabled')", &c[1])
        }),
        SubPattern::new(
            "(.+) has (.+) as (.+)",
            "<if_[selector] has [css_property] as [css_value]>",
            |c| format!("cy.get('{}').should('have.css', '{}', '{}')", &c[1], &c[2], &c[3]),
        ),
        SubPattern::new(
            "(.+) has (.+) attribute with value (.+)",
            "<if_[selector] has [attribute] attribute with value [value]>",
            |c| format!("cy.get('{}').should('have.attr', '{}', '{}')", &c[1], &c[2], &c[3]),
        ),
        SubPattern::new("(.+) has class (.+)", "<if_[selector] has class [class]>", |c| {
            format!("cy.get('{}').should('have.class', '{}')", &c[1], &c[2])
        }),
    ]
}
