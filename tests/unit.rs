use scriptflow::prelude::*;
use scriptflow::script::naming::{to_api_name, unique_api_name};

#[test]
fn test_answer_value_display() {
    assert_eq!(AnswerValue::Null.to_string(), "");
    assert_eq!(AnswerValue::Number(42.0).to_string(), "42");
    assert_eq!(AnswerValue::Number(-0.5).to_string(), "-0.5");
    assert_eq!(AnswerValue::Bool(false).to_string(), "false");
    assert_eq!(
        AnswerValue::Number(1e20).to_string(),
        "100000000000000000000"
    );
    assert_eq!(AnswerValue::Number(-1e19).to_string(), "-10000000000000000000");
    assert_eq!(AnswerValue::Number(123456789012.0).to_string(), "123456789012");
    assert_eq!(
        AnswerValue::List(vec!["a".to_string(), "b".to_string()]).to_string(),
        "a, b"
    );
}

#[test]
fn test_answer_value_from_json() {
    let parsed: std::collections::HashMap<String, AnswerValue> =
        serde_json::from_str(r#"{"a": true, "b": 1, "c": "true", "d": ["x"], "e": null}"#)
            .expect("Valid answers JSON");

    assert_eq!(parsed["a"], AnswerValue::Bool(true));
    assert_eq!(parsed["b"], AnswerValue::Number(1.0));
    assert_eq!(parsed["c"], AnswerValue::Text("true".to_string()));
    assert_eq!(parsed["d"], AnswerValue::List(vec!["x".to_string()]));
    assert_eq!(parsed["e"], AnswerValue::Null);
}

#[test]
fn test_api_name_normalisation() {
    assert_eq!(to_api_name("Email Address"), "email_address");
    assert_eq!(to_api_name("  What's your ZIP?  "), "what_s_your_zip");
    assert_eq!(to_api_name("!!!"), "field");

    let fields = vec![
        Field::new("a", "zip", "Zip", FieldType::ShortText),
        Field::new("b", "zip_2", "Zip", FieldType::ShortText),
    ];
    assert_eq!(unique_api_name("zip", &fields, None), "zip_3");
    assert_eq!(unique_api_name("zip", &fields, Some("a")), "zip");
}

#[test]
fn test_operator_full_name() {
    let only_user = OperatorIdentity::default().with_username("sam01");
    assert_eq!(only_user.full_name(), Some("sam01".to_string()));

    let last_only = OperatorIdentity::default().with_last_name("Lee");
    assert_eq!(last_only.full_name(), Some("Lee".to_string()));

    assert_eq!(OperatorIdentity::default().full_name(), None);
}

#[test]
fn test_destination_parsing() {
    assert_eq!(Destination::parse("end"), Destination::End);
    assert_eq!(Destination::parse("p2"), Destination::Page("p2".to_string()));
    assert_eq!(Destination::End.as_stored(), END_SENTINEL);
    assert_eq!(
        RuleKey::field_choice("p1", "f1", "c1").to_legacy_key(),
        "p1-f1-c1"
    );
}

#[test]
fn test_error_display() {
    let err = RunError::RequiredFieldsMissing {
        page_id: "p1".to_string(),
        field_ids: vec!["email".to_string(), "phone".to_string()],
    };
    assert_eq!(
        err.to_string(),
        "Required fields on page 'p1' are not filled: email, phone"
    );

    let err = SubmitError::from(RunError::NotCompleted);
    assert!(err.to_string().contains("not completed"));

    let err = ScriptConversionError::from(ScriptError::NoPages);
    assert_eq!(err.to_string(), "A script must contain at least one page");
}
