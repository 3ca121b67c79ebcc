mod common;
use common::*;
use scriptflow::prelude::*;

fn contact_pages() -> Vec<Page> {
    vec![
        Page::new("p1", PageType::Form)
            .with_field(Field::new("f-email", "email_field", "Email", FieldType::Email))
            .with_field(Field::new("f-name", "customer_name", "Customer Name", FieldType::ShortText))
            .with_field(Field::new("f-info", "info", "Info", FieldType::Content)),
    ]
}

#[test]
fn test_operator_and_answer_tokens() {
    let text = "Hi {{user.firstName}}, your email is {{email_field}}";
    let sam = OperatorIdentity::default().with_first_name("Sam");
    let data = answers([("email_field", AnswerValue::from("a@b.com"))]);

    assert_eq!(
        process_merge_variables(text, &data, &[], Some(&sam)),
        "Hi Sam, your email is a@b.com"
    );
    assert_eq!(
        process_merge_variables(text, &data, &[], None),
        "Hi {{user.firstName}}, your email is a@b.com"
    );
}

#[test]
fn test_field_lookup_by_label_and_api_name() {
    let pages = contact_pages();
    let data = answers([
        ("f-email", AnswerValue::from("lead@example.com")),
        ("f-name", AnswerValue::from("Ada")),
    ]);

    assert_eq!(
        process_merge_variables("{{Customer Name}} <{{email_field}}>", &data, &pages, None),
        "Ada <lead@example.com>"
    );
    assert_eq!(
        process_merge_variables("{{ f-name }}", &data, &pages, None),
        "Ada"
    );
}

#[test]
fn test_unresolved_tokens_stay_literal() {
    let pages = contact_pages();
    let data = answers([("f-name", AnswerValue::Null)]);

    assert_eq!(
        process_merge_variables("Dear {{customer_name}}, {{unknown}}", &data, &pages, None),
        "Dear {{customer_name}}, {{unknown}}"
    );
}

#[test]
fn test_blank_operator_attribute_is_unresolved() {
    let blank = OperatorIdentity::default().with_first_name("  ");
    assert_eq!(
        process_merge_variables("{{user.firstName}}", &Answers::new(), &[], Some(&blank)),
        "{{user.firstName}}"
    );
}

#[test]
fn test_agent_name_uses_full_name() {
    let operator = OperatorIdentity::default()
        .with_first_name("Sam")
        .with_last_name("Lee")
        .with_email("sam@acme.test");

    assert_eq!(
        process_merge_variables("{{agentName}} ({{user.email}})", &Answers::new(), &[], Some(&operator)),
        "Sam Lee (sam@acme.test)"
    );
}

#[test]
fn test_substitution_is_idempotent_and_not_recursive() {
    let pages = contact_pages();
    let data = answers([
        ("f-name", AnswerValue::from("{{email_field}}")),
        ("f-email", AnswerValue::from("x@y.z")),
    ]);

    let once = process_merge_variables("Name: {{customer_name}}", &data, &pages, None);
    assert_eq!(once, "Name: {{email_field}}");

    let plain = answers([("f-name", AnswerValue::from("Ada"))]);
    let first = process_merge_variables("Hello {{customer_name}}", &plain, &pages, None);
    let second = process_merge_variables(&first, &plain, &pages, None);
    assert_eq!(first, second);
}

#[test]
fn test_answer_values_render_as_text() {
    let data = answers([
        ("count", AnswerValue::Number(3.0)),
        ("ratio", AnswerValue::Number(2.5)),
        ("ok", AnswerValue::Bool(true)),
        ("tags", AnswerValue::List(vec!["a".to_string(), "b".to_string()])),
    ]);

    assert_eq!(
        process_merge_variables("{{count}} {{ratio}} {{ok}} {{tags}}", &data, &[], None),
        "3 2.5 true a, b"
    );
}

#[test]
fn test_resolver_operator_aliases() {
    let script = ScriptSnapshot::new("s", "s", contact_pages(), RuleSet::new()).expect("Valid script");
    let resolver = Resolver::builder(&script)
        .with_operator_alias("rep", OperatorToken::FirstName)
        .build();
    let operator = OperatorIdentity::default().with_first_name("Kim");

    assert_eq!(
        resolver.render("This is {{rep}}", &Answers::new(), Some(&operator)),
        "This is Kim"
    );
    assert_eq!(
        Resolver::new(&script).render("This is {{rep}}", &Answers::new(), Some(&operator)),
        "This is {{rep}}"
    );
}

#[test]
fn test_available_variables_skip_content_blocks() {
    let variables = available_variables(&contact_pages());

    assert_eq!(&variables[..5], &OperatorToken::BUILTIN.map(str::to_string)[..]);
    assert!(variables.contains(&"email_field".to_string()));
    assert!(variables.contains(&"customer_name".to_string()));
    assert!(!variables.contains(&"info".to_string()));
}
