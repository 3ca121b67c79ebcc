//! Common test utilities for building scripts and answers.
use scriptflow::prelude::*;
use std::sync::Arc;

/// Three welcome pages `p1 -> p2 -> p3` with no rules.
#[allow(dead_code)]
pub fn create_linear_script() -> ScriptSnapshot {
    let pages = vec![
        Page::new("p1", PageType::Welcome).with_title("Intro"),
        Page::new("p2", PageType::Welcome).with_title("Middle"),
        Page::new("p3", PageType::Ending).with_title("Thanks"),
    ];
    ScriptSnapshot::new("linear", "Linear", pages, RuleSet::new()).expect("Valid linear script")
}

/// A qualification form that branches on a multiple-choice answer.
///
/// `p1` holds `f1` (Yes/No) and a required email. `p1[f1=c1] -> p3`,
/// otherwise `p1 -> p2`.
#[allow(dead_code)]
pub fn create_branching_pages() -> Vec<Page> {
    vec![
        Page::new("p1", PageType::Form)
            .with_title("Qualify")
            .with_field(
                Field::new("f1", "interested", "Interested?", FieldType::MultipleChoice)
                    .with_choice("c1", "Yes")
                    .with_choice("c2", "No"),
            )
            .with_field(Field::new("email", "email", "Email", FieldType::Email).required()),
        Page::new("p2", PageType::Welcome).with_title("Not interested"),
        Page::new("p3", PageType::Ending).with_title("Booked"),
    ]
}

#[allow(dead_code)]
pub fn create_branching_rules() -> RuleSet {
    RuleSet::new()
        .with_rule(
            RuleKey::field_choice("p1", "f1", "c1"),
            Destination::Page("p3".to_string()),
        )
        .with_rule(RuleKey::page("p1"), Destination::Page("p2".to_string()))
}

#[allow(dead_code)]
pub fn create_branching_script() -> ScriptSnapshot {
    ScriptSnapshot::new(
        "branching",
        "Branching",
        create_branching_pages(),
        create_branching_rules(),
    )
    .expect("Valid branching script")
}

#[allow(dead_code)]
pub fn shared(script: ScriptSnapshot) -> Arc<ScriptSnapshot> {
    Arc::new(script)
}

/// Builds an answer map from `(field_id, value)` pairs.
#[allow(dead_code)]
pub fn answers<const N: usize>(pairs: [(&str, AnswerValue); N]) -> Answers {
    pairs
        .into_iter()
        .map(|(id, value)| (id.to_string(), value))
        .collect()
}

/// A builder export using dashed ids and the flat rule mapping.
#[allow(dead_code)]
pub const BUILDER_JSON: &str = r#"{
    "id": "script-1",
    "name": "Solar lead",
    "pages": [
        {
            "id": "intro",
            "type": "welcome",
            "title": "Hello, I'm {{agentName}}"
        },
        {
            "id": "intro-2",
            "type": "form",
            "title": "Qualify",
            "fields": [
                {
                    "id": "owner-q",
                    "type": "radio",
                    "label": "Home Owner?",
                    "required": true,
                    "choices": [
                        { "id": "yes-own", "text": "Yes" },
                        { "id": "no", "text": "No" }
                    ]
                },
                {
                    "id": "email-1",
                    "type": "email",
                    "label": "Email Address",
                    "apiName": "Email Address"
                },
                {
                    "id": "email-2",
                    "type": "email",
                    "label": "Email Address"
                }
            ]
        },
        {
            "id": "renter",
            "type": "ending",
            "title": "Sorry"
        },
        {
            "id": "hidden-page",
            "type": "welcome",
            "title": "Draft",
            "visible": false
        },
        {
            "id": "booked",
            "type": "ending",
            "title": "Booked for {{email_address}}"
        }
    ],
    "logicRules": {
        "intro-2-owner-q-yes-own": "booked",
        "intro-2": "renter",
        "ghost-page": "booked"
    }
}"#;
