mod common;
use common::*;
use scriptflow::prelude::*;

#[test]
fn test_builder_json_conversion() {
    let script = ScriptSnapshot::from_builder_json(BUILDER_JSON).expect("Valid builder export");

    assert_eq!(script.id(), "script-1");
    assert_eq!(script.name(), "Solar lead");
    assert_eq!(script.pages().len(), 5);
    assert_eq!(script.visible_pages().len(), 4);

    let qualify = script.page("intro-2").expect("Page exists");
    assert_eq!(qualify.page_type, PageType::Form);
    assert_eq!(qualify.fields[0].field_type, FieldType::Radio);
    assert!(qualify.fields[0].required);
    assert_eq!(qualify.fields[0].api_name, "home_owner");

    // The "ghost-page" rule matches no page and is dropped.
    assert_eq!(script.rules().len(), 2);
}

#[test]
fn test_duplicate_api_names_are_suffixed_on_import() {
    let script = ScriptSnapshot::from_builder_json(BUILDER_JSON).expect("Valid builder export");
    let api_names: Vec<&str> = script
        .page("intro-2")
        .expect("Page exists")
        .fields
        .iter()
        .map(|f| f.api_name.as_str())
        .collect();

    assert_eq!(api_names, vec!["home_owner", "email_address", "email_address_2"]);
}

#[test]
fn test_legacy_keys_with_dashed_ids() {
    let script = ScriptSnapshot::from_builder_json(BUILDER_JSON).expect("Valid builder export");

    assert_eq!(
        script.rules().get(&RuleKey::field_choice("intro-2", "owner-q", "yes-own")),
        Some(&Destination::Page("booked".to_string()))
    );
    assert_eq!(
        script.rules().page_default("intro-2"),
        Some(&Destination::Page("renter".to_string()))
    );
    assert!(script.rules().rules_for("intro").is_empty());
}

#[test]
fn test_builder_script_runs_end_to_end() {
    let script = shared(ScriptSnapshot::from_builder_json(BUILDER_JSON).expect("Valid builder export"));
    let operator = OperatorIdentity::default().with_first_name("Sam");

    let mut run = ScriptRun::start(script).expect("Run starts");
    let intro = run.current_page().expect("On intro").title.clone();
    assert_eq!(run.render(&intro, Some(&operator)), "Hello, I'm Sam");

    run.next().expect("To qualify");
    run.set_answer("owner-q", "yes-own").expect("Answer accepted");
    run.set_answer("email-1", "owner@example.com").expect("Answer accepted");
    run.next().expect("Branch to booked");

    let page = run.current_page().expect("On booked");
    assert_eq!(page.id, "booked");
    assert_eq!(run.render(&page.title, None), "Booked for owner@example.com");
}

#[test]
fn test_legacy_key_export_roundtrip_keeps_mapping() {
    let script = ScriptSnapshot::from_builder_json(BUILDER_JSON).expect("Valid builder export");
    let exported = script.rules().to_legacy_keys();

    assert_eq!(exported.get("intro-2-owner-q-yes-own").map(String::as_str), Some("booked"));
    assert_eq!(exported.get("intro-2").map(String::as_str), Some("renter"));
}

#[test]
fn test_unknown_choice_is_kept_positionally() {
    let pages = create_branching_pages();
    let (rules, skipped) = RuleSet::from_legacy_keys([("p1-f1-c9", "end"), ("nope", "p2")], &pages);

    assert_eq!(skipped, vec!["nope".to_string()]);
    assert_eq!(
        rules.get(&RuleKey::field_choice("p1", "f1", "c9")),
        Some(&Destination::End)
    );
}

#[test]
fn test_invalid_builder_json() {
    let result = ScriptSnapshot::from_builder_json("{ not json");
    assert!(matches!(result, Err(ScriptConversionError::JsonParseError(_))));

    let empty = ScriptSnapshot::from_builder_json(r#"{ "pages": [] }"#);
    assert!(matches!(
        empty,
        Err(ScriptConversionError::Script(ScriptError::NoPages))
    ));
}

#[test]
fn test_snapshot_rejects_duplicate_ids() {
    let pages = vec![
        Page::new("p1", PageType::Welcome),
        Page::new("p1", PageType::Welcome),
    ];
    assert_eq!(
        ScriptSnapshot::new("s", "s", pages, RuleSet::new()),
        Err(ScriptError::DuplicatePageId("p1".to_string()))
    );

    let pages = vec![
        Page::new("a", PageType::Form).with_field(Field::new("f", "f", "F", FieldType::ShortText)),
        Page::new("b", PageType::Form).with_field(Field::new("f", "g", "G", FieldType::ShortText)),
    ];
    assert_eq!(
        ScriptSnapshot::new("s", "s", pages, RuleSet::new()),
        Err(ScriptError::DuplicateFieldId {
            page_id: "b".to_string(),
            field_id: "f".to_string(),
        })
    );
}

#[test]
fn test_snapshot_file_roundtrip() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let path = dir.path().join("branching.script");
    let script = create_branching_script();

    script.save(&path).expect("Save snapshot");
    let loaded = ScriptSnapshot::from_file(&path).expect("Load snapshot");

    assert_eq!(loaded, script);
    assert!(matches!(
        ScriptSnapshot::from_file(dir.path().join("missing.script")),
        Err(SnapshotError::Io { .. })
    ));
    assert!(matches!(
        ScriptSnapshot::from_bytes(&[0xff, 0x00, 0x13]),
        Err(SnapshotError::Decode(_))
    ));
}

#[test]
fn test_memory_store() {
    let mut store = MemoryStore::new();
    assert!(store.is_empty());

    store.save("branching", &create_branching_script()).expect("Save");
    assert_eq!(store.len(), 1);
    assert_eq!(store.load("branching").expect("Load").id(), "branching");
    assert!(matches!(store.load("x"), Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.save("other", &create_linear_script()),
        Err(StoreError::IdMismatch { .. })
    ));
}

fn script_with_id(id: &str, pages: Vec<Page>) -> ScriptSnapshot {
    ScriptSnapshot::new(id, id, pages, RuleSet::new()).expect("Valid script")
}

#[test]
fn test_file_store() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let mut store = FileStore::new(dir.path().join("scripts")).expect("Create store");
    let script = script_with_id("team/solar", create_linear_script().pages().to_vec());

    store.save("team/solar", &script).expect("Save");
    assert!(store.path_for("team/solar").exists());
    assert_eq!(store.load("team/solar").expect("Load"), script);
    assert!(matches!(store.load("other"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_file_store_keeps_similar_ids_apart() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let mut store = FileStore::new(dir.path()).expect("Create store");
    let ids = ["team/solar", "team.solar", "team_solar"];

    for id in ids {
        let pages = vec![Page::new("p1", PageType::Welcome).with_title(id)];
        store.save(id, &script_with_id(id, pages)).expect("Save");
    }

    for id in ids {
        let loaded = store.load(id).expect("Load");
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.pages()[0].title, id);
    }
}

#[test]
fn test_file_store_rejects_foreign_snapshot() {
    let dir = tempfile::tempdir().expect("Temp dir");
    let mut store = FileStore::new(dir.path()).expect("Create store");

    assert!(matches!(
        store.save("solar", &create_linear_script()),
        Err(StoreError::IdMismatch { .. })
    ));

    // A file copied in under another id's name is refused on load.
    create_linear_script()
        .save(store.path_for("solar"))
        .expect("Write snapshot");
    assert!(matches!(
        store.load("solar"),
        Err(StoreError::IdMismatch { ref requested, ref found })
            if requested == "solar" && found == "linear"
    ));
}
