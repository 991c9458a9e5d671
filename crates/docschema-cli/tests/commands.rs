//! Integration test: run every subcommand handler against the fixture
//! files under `tests/fixtures/`.

use std::path::PathBuf;

use docschema_cli::check::{self, CheckArgs};
use docschema_cli::field::{self, FieldArgs};
use docschema_cli::serialize::{self, SerializeArgs};
use docschema_cli::validate::{self, Outcome, ValidateArgs};
use docschema_core::{FieldError, Map, Value};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn map(value: serde_json::Value) -> Map {
    Value::from(value).into_object().unwrap()
}

fn validate_args(payload: &str, original: Option<&str>, replace: bool) -> ValidateArgs {
    ValidateArgs {
        schema: fixture("article.yaml"),
        payload: fixture(payload),
        original: original.map(fixture),
        replace,
    }
}

// ── check ────────────────────────────────────────────────────────────

#[test]
fn test_check_lists_field_paths() {
    let paths = check::run(&CheckArgs {
        schema: fixture("article.yaml"),
    })
    .unwrap();
    assert_eq!(
        paths,
        vec![
            "author",
            "author.email",
            "author.name",
            "id",
            "published_at",
            "status",
            "title",
            "token",
        ]
    );
}

#[test]
fn test_check_missing_schema_file() {
    let err = check::run(&CheckArgs {
        schema: fixture("missing.yaml"),
    })
    .unwrap_err();
    assert!(err.to_string().contains("cannot read schema descriptor"));
}

// ── field ────────────────────────────────────────────────────────────

#[test]
fn test_field_nested_lookup() {
    let summary = field::run(&FieldArgs {
        schema: fixture("article.yaml"),
        path: "author.name".into(),
    })
    .unwrap();
    assert!(summary.required);
    assert!(!summary.read_only);
    assert!(summary.validator.is_some());
}

#[test]
fn test_field_reports_dependency_and_default() {
    let summary = field::run(&FieldArgs {
        schema: fixture("article.yaml"),
        path: "published_at".into(),
    })
    .unwrap();
    assert_eq!(summary.dependency.as_deref(), Some(r#"status == "published""#));

    let summary = field::run(&FieldArgs {
        schema: fixture("article.yaml"),
        path: "status".into(),
    })
    .unwrap();
    assert_eq!(summary.default, Some(Value::from("draft")));
}

#[test]
fn test_field_lists_sub_fields() {
    let summary = field::run(&FieldArgs {
        schema: fixture("article.yaml"),
        path: "author".into(),
    })
    .unwrap();
    assert_eq!(summary.fields, vec!["email", "name"]);
    assert!(summary.validator.is_none());
}

#[test]
fn test_field_unknown_path() {
    let err = field::run(&FieldArgs {
        schema: fixture("article.yaml"),
        path: "author.age".into(),
    })
    .unwrap_err();
    assert_eq!(err.to_string(), "no field 'author.age' in schema 'A blog article'");
}

// ── serialize ────────────────────────────────────────────────────────

#[test]
fn test_serialize_stored_document() {
    let doc = serialize::run(&SerializeArgs {
        schema: fixture("article.yaml"),
        payload: fixture("stored.json"),
    })
    .unwrap();
    assert!(!doc.contains_key("token"));
    assert_eq!(doc["published_at"], Value::from("2023-11-14T22:13:20Z"));
}

// ── validate ─────────────────────────────────────────────────────────

#[test]
fn test_validate_create() {
    let Outcome::Valid(doc) = validate::run(&validate_args("new.json", None, false)).unwrap()
    else {
        panic!("expected a valid document");
    };
    assert!(doc["id"].as_str().is_some());
    assert_eq!(doc["status"], Value::from("draft"));
    assert_eq!(doc["author"], Value::from(json!({"name": "Ada"})));
}

#[test]
fn test_validate_update_from_yaml_patch() {
    let outcome =
        validate::run(&validate_args("patch.yaml", Some("stored.json"), false)).unwrap();
    let Outcome::Valid(doc) = outcome else {
        panic!("expected a valid document");
    };
    assert_eq!(
        doc,
        map(json!({
            "id": "7d1c0d3e-0000-4000-8000-000000000001",
            "title": "Hello again",
            "status": "published",
            "published_at": "2023-11-14T22:13:20Z",
            "author": {"name": "Ada", "email": "countess@example.com"}
        }))
    );
}

#[test]
fn test_validate_replace() {
    let outcome = validate::run(&validate_args("new.json", Some("stored.json"), true)).unwrap();
    let Outcome::Valid(doc) = outcome else {
        panic!("expected a valid document");
    };
    assert_eq!(
        doc,
        map(json!({
            "id": "7d1c0d3e-0000-4000-8000-000000000001",
            "title": "Hello",
            "author": {"name": "Ada"}
        }))
    );
}

#[test]
fn test_validate_collects_errors() {
    let Outcome::Invalid(errors) =
        validate::run(&validate_args("bad.json", None, false)).unwrap()
    else {
        panic!("expected validation errors");
    };
    assert!(errors.contains("title", &FieldError::Invalid("not a string".into())));
    assert!(errors.get("status").is_some());
    assert!(errors.contains("extra", &FieldError::InvalidField));
    assert!(errors
        .nested("author")
        .unwrap()
        .contains("name", &FieldError::Required));
}

#[test]
fn test_validate_replace_requires_original() {
    let err = validate::run(&validate_args("new.json", None, true)).unwrap_err();
    assert_eq!(err.to_string(), "replace requires an original document");
}

#[test]
fn test_validate_rejects_non_mapping_payload() {
    let err = validate::run(&validate_args("scalar.json", None, false)).unwrap_err();
    assert!(err.to_string().contains("must be a mapping, found array"));
}
