//! # Prepare — Change-Set Reconciliation
//!
//! `prepare` turns an incoming payload, and optionally the document it
//! applies to, into two maps:
//!
//! - **changes**: What the caller asserts should change. A removal is a
//!   [`Value::Tombstone`].
//! - **base**: The rest of the document: prior values, defaults, and hook
//!   output the caller did not supply.
//!
//! The pair is the input of [`Schema::validate`].
//!
//! ## Modes
//!
//! | Mode | Diffing | Defaults | Removals | Hook |
//! |------|---------|----------|----------|------|
//! | [`Mode::Create`] | every supplied value is a change | omitted or null fields get their default in base | none | `on_init` |
//! | [`Mode::Update`] | only values differing from the original | none | none | `on_update` |
//! | [`Mode::Replace`] | as update | none | omitted fields become tombstones, hidden non-read-only fields keep their prior value | `on_init` |
//!
//! In update and replace mode every prior value is carried into base, so
//! merging changes onto base reproduces the intended document.
//!
//! ## Hooks
//!
//! After diffing, the active hook runs on the field's current value. A
//! change is rewritten in place. A tombstone is dropped and the hook runs
//! on the base value instead, so a hook can normalize what remains without
//! the removal surfacing as a caller change. Without a change, the hook
//! runs on the base value (possibly absent).
//!
//! Payload keys the schema does not declare are copied into changes so
//! validation can reject them.

use docschema_core::{Context, Map, Value};

use crate::error::PrepareError;
use crate::field::Hook;
use crate::schema::{Schema, EMPTY};

/// How a payload relates to the stored document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode<'a> {
    /// The payload is a new document.
    Create,
    /// The payload patches the given original document.
    Update(&'a Map),
    /// The payload replaces the given original document entirely.
    Replace(&'a Map),
}

impl<'a> Mode<'a> {
    /// Build a mode from an optional original and a replace flag.
    ///
    /// # Errors
    ///
    /// Returns [`PrepareError::ReplaceWithoutOriginal`] when `replace` is
    /// set without an original document.
    pub fn new(original: Option<&'a Map>, replace: bool) -> Result<Self, PrepareError> {
        match (original, replace) {
            (None, false) => Ok(Mode::Create),
            (None, true) => Err(PrepareError::ReplaceWithoutOriginal),
            (Some(original), false) => Ok(Mode::Update(original)),
            (Some(original), true) => Ok(Mode::Replace(original)),
        }
    }

    /// The document the payload applies to, absent in create mode.
    pub fn original(&self) -> Option<&'a Map> {
        match self {
            Mode::Create => None,
            Mode::Update(original) | Mode::Replace(original) => Some(original),
        }
    }

    /// True when `on_init` applies rather than `on_update`.
    pub fn initializes(&self) -> bool {
        !matches!(self, Mode::Update(_))
    }

    /// The same mode, applied to a sub-document of the original.
    fn descend(&self, sub_original: &'a Map) -> Mode<'a> {
        match self {
            Mode::Create => Mode::Create,
            Mode::Update(_) => Mode::Update(sub_original),
            Mode::Replace(_) => Mode::Replace(sub_original),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Mode::Create => "create",
            Mode::Update(_) => "update",
            Mode::Replace(_) => "replace",
        }
    }
}

/// Output of [`Schema::prepare`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prepared {
    /// Caller-asserted changes, possibly holding tombstones.
    pub changes: Map,
    /// Everything else the resolved document starts from.
    pub base: Map,
}

impl Schema {
    /// Compute the change-set and base for a payload.
    ///
    /// `ctx` is handed unchanged to every hook invocation.
    pub fn prepare(&self, ctx: &Context, payload: &Map, mode: Mode<'_>) -> Prepared {
        tracing::trace!(
            request_id = %ctx.request_id(),
            mode = mode.name(),
            keys = payload.len(),
            "preparing payload"
        );
        let mut changes = Map::new();
        let mut base = Map::new();

        for (name, field) in &self.fields {
            let value = payload.get(name);
            match mode {
                Mode::Create => match value {
                    None | Some(Value::Null) => {
                        if let Some(default) = &field.default {
                            base.insert(name.clone(), default.clone());
                        }
                    }
                    Some(value) => {
                        changes.insert(name.clone(), value.clone());
                    }
                },
                Mode::Update(original) | Mode::Replace(original) => {
                    let prior = original.get(name);
                    if let Some(value) = value {
                        if prior != Some(value) {
                            changes.insert(name.clone(), value.clone());
                        }
                    }
                    if let (None, Some(prior), Mode::Replace(_)) = (value, prior, mode) {
                        // A client cannot resubmit a value it never saw.
                        let removal = if field.hidden && !field.read_only {
                            prior.clone()
                        } else {
                            Value::Tombstone
                        };
                        changes.insert(name.clone(), removal);
                    }
                    if let Some(prior) = prior {
                        base.insert(name.clone(), prior.clone());
                    }
                }
            }

            if let Some(schema) = &field.schema {
                let sub_original = mode
                    .original()
                    .and_then(|original| original.get(name))
                    .and_then(Value::as_object)
                    .unwrap_or(&EMPTY);
                let sub_mode = mode.descend(sub_original);
                match value {
                    Some(Value::Object(sub_payload)) => {
                        let sub = schema.prepare(ctx, sub_payload, sub_mode);
                        if !sub.changes.is_empty() || changes.contains_key(name) {
                            changes.insert(name.clone(), Value::Object(sub.changes));
                        }
                        if !sub.base.is_empty() || base.contains_key(name) {
                            base.insert(name.clone(), Value::Object(sub.base));
                        }
                    }
                    // Not a mapping: left for validate to report.
                    Some(_) => {}
                    // The whole sub-document was removed.
                    None if changes.contains_key(name) => {}
                    None => {
                        // Still prepare an empty sub-document so defaults
                        // and hooks apply.
                        let sub = schema.prepare(ctx, &EMPTY, sub_mode);
                        if !sub.changes.is_empty() {
                            changes.insert(name.clone(), Value::Object(sub.changes));
                        }
                        if !sub.base.is_empty() {
                            base.insert(name.clone(), Value::Object(sub.base));
                        }
                    }
                }
            }

            let hook = if mode.initializes() {
                field.on_init.as_deref()
            } else {
                field.on_update.as_deref()
            };
            if let Some(hook) = hook {
                apply_hook(ctx, hook, name, &mut changes, &mut base);
            }
        }

        for (name, value) in payload {
            if !self.fields.contains_key(name) {
                changes.insert(name.clone(), value.clone());
            }
        }

        Prepared { changes, base }
    }
}

fn apply_hook(ctx: &Context, hook: &dyn Hook, name: &str, changes: &mut Map, base: &mut Map) {
    match changes.remove(name) {
        Some(Value::Tombstone) | None => {
            let current = base.remove(name);
            if let Some(value) = hook.call(ctx, current) {
                base.insert(name.to_string(), value);
            }
        }
        Some(change) => {
            if let Some(value) = hook.call(ctx, Some(change)) {
                changes.insert(name.to_string(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::validators::{IntegerValidator, StringValidator};
    use serde_json::json;

    fn map(value: serde_json::Value) -> Map {
        Value::from(value).into_object().unwrap()
    }

    fn user() -> Schema {
        Schema::new("user")
            .with_field("name", Field::new().required(true).validator(StringValidator::new()))
            .with_field(
                "age",
                Field::new().default_value(0).validator(IntegerValidator::new()),
            )
    }

    fn tag(label: &'static str) -> impl Fn(&Context, Option<Value>) -> Option<Value> {
        move |_: &Context, value: Option<Value>| {
            let current = value.map(|v| v.to_string()).unwrap_or_else(|| "none".into());
            Some(Value::from(format!("{label}:{current}")))
        }
    }

    // ── Mode ─────────────────────────────────────────────────────────

    #[test]
    fn test_mode_rejects_replace_without_original() {
        assert_eq!(
            Mode::new(None, true),
            Err(PrepareError::ReplaceWithoutOriginal)
        );
    }

    #[test]
    fn test_mode_from_parts() {
        let original = Map::new();
        assert_eq!(Mode::new(None, false), Ok(Mode::Create));
        assert_eq!(Mode::new(Some(&original), false), Ok(Mode::Update(&original)));
        assert_eq!(Mode::new(Some(&original), true), Ok(Mode::Replace(&original)));
        assert!(Mode::Replace(&original).initializes());
        assert!(!Mode::Update(&original).initializes());
    }

    // ── Create ───────────────────────────────────────────────────────

    #[test]
    fn test_create_defaults_into_base() {
        let prepared = user().prepare(&Context::new(), &map(json!({"name": "Bob"})), Mode::Create);
        assert_eq!(prepared.changes, map(json!({"name": "Bob"})));
        assert_eq!(prepared.base, map(json!({"age": 0})));
    }

    #[test]
    fn test_create_null_falls_back_to_default() {
        let prepared = user().prepare(
            &Context::new(),
            &map(json!({"name": "Bob", "age": null})),
            Mode::Create,
        );
        assert!(!prepared.changes.contains_key("age"));
        assert_eq!(prepared.base, map(json!({"age": 0})));
    }

    #[test]
    fn test_create_copies_unknown_keys() {
        let prepared = user().prepare(&Context::new(), &map(json!({"bogus": 1})), Mode::Create);
        assert_eq!(prepared.changes, map(json!({"bogus": 1})));
    }

    // ── Update ───────────────────────────────────────────────────────

    #[test]
    fn test_update_records_only_differences() {
        let original = map(json!({"name": "Bob", "age": 5}));
        let prepared = user().prepare(
            &Context::new(),
            &map(json!({"name": "Bob", "age": 6})),
            Mode::Update(&original),
        );
        assert_eq!(prepared.changes, map(json!({"age": 6})));
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_update_does_not_apply_defaults() {
        let original = map(json!({"name": "Bob"}));
        let prepared = user().prepare(&Context::new(), &Map::new(), Mode::Update(&original));
        assert!(prepared.changes.is_empty());
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_update_distinguishes_integer_from_float() {
        let original = map(json!({"age": 5}));
        let prepared = user().prepare(
            &Context::new(),
            &map(json!({"age": 5.0})),
            Mode::Update(&original),
        );
        assert_eq!(prepared.changes["age"], Value::Float(5.0));
    }

    // ── Replace ──────────────────────────────────────────────────────

    #[test]
    fn test_replace_tombstones_omitted_fields() {
        let original = map(json!({"name": "Bob", "age": 5}));
        let prepared = user().prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert_eq!(prepared.changes["name"], Value::Tombstone);
        assert_eq!(prepared.changes["age"], Value::Tombstone);
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_replace_keeps_hidden_value() {
        let schema = Schema::new("account").with_field("password", Field::new().hidden(true));
        let original = map(json!({"password": "hash"}));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert_eq!(prepared.changes, map(json!({"password": "hash"})));
    }

    #[test]
    fn test_replace_runs_hook_on_kept_hidden_value() {
        let schema = Schema::new("account")
            .with_field("secret", Field::new().hidden(true).on_init(tag("init")));
        let original = map(json!({"secret": "x"}));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert_eq!(prepared.changes, map(json!({"secret": "init:\"x\""})));
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_replace_tombstones_hidden_read_only() {
        let schema = Schema::new("account")
            .with_field("salt", Field::new().hidden(true).read_only(true));
        let original = map(json!({"salt": "abc"}));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert_eq!(prepared.changes["salt"], Value::Tombstone);
    }

    // ── Hooks ────────────────────────────────────────────────────────

    #[test]
    fn test_on_init_runs_on_change() {
        let schema = Schema::new("s").with_field("f", Field::new().on_init(tag("init")));
        let prepared = schema.prepare(&Context::new(), &map(json!({"f": "x"})), Mode::Create);
        assert_eq!(prepared.changes, map(json!({"f": "init:\"x\""})));
        assert!(prepared.base.is_empty());
    }

    #[test]
    fn test_on_init_runs_on_absent_base() {
        let schema = Schema::new("s").with_field("f", Field::new().on_init(tag("init")));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Create);
        assert_eq!(prepared.base, map(json!({"f": "init:none"})));
    }

    #[test]
    fn test_on_update_runs_in_update_mode_only() {
        let schema = Schema::new("s").with_field(
            "f",
            Field::new().on_init(tag("init")).on_update(tag("update")),
        );
        let original = map(json!({"f": 1}));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Update(&original));
        assert_eq!(prepared.base, map(json!({"f": "update:1"})));

        let prepared = schema.prepare(&Context::new(), &map(json!({"f": 1})), Mode::Replace(&original));
        assert_eq!(prepared.base, map(json!({"f": "init:1"})));
    }

    #[test]
    fn test_hook_consumes_tombstone() {
        let schema = Schema::new("s").with_field("created", Field::new().on_init(tag("init")));
        let original = map(json!({"created": 7}));
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert!(!prepared.changes.contains_key("created"));
        assert_eq!(prepared.base, map(json!({"created": "init:7"})));
    }

    #[test]
    fn test_hook_returning_none_removes_key() {
        let schema = Schema::new("s")
            .with_field(
                "f",
                Field::new().on_init(|_: &Context, _: Option<Value>| -> Option<Value> { None }),
            );
        let prepared = schema.prepare(&Context::new(), &map(json!({"f": 1})), Mode::Create);
        assert!(prepared.changes.is_empty());
        assert!(prepared.base.is_empty());
    }

    #[test]
    fn test_hook_receives_context() {
        let ctx = Context::new();
        let expected = ctx.request_id().to_string();
        let schema = Schema::new("s").with_field(
            "request",
            Field::new().on_init(|ctx: &Context, _: Option<Value>| {
                Some(Value::from(ctx.request_id().to_string()))
            }),
        );
        let prepared = schema.prepare(&ctx, &Map::new(), Mode::Create);
        assert_eq!(prepared.base["request"], Value::from(expected));
    }

    // ── Sub-schemas ──────────────────────────────────────────────────

    fn with_address() -> Schema {
        Schema::new("user").with_field(
            "address",
            Field::new().schema(
                Schema::new("address")
                    .with_field("city", Field::new().required(true))
                    .with_field("country", Field::new().default_value("FR")),
            ),
        )
    }

    #[test]
    fn test_sub_schema_defaults_when_absent() {
        let prepared = with_address().prepare(&Context::new(), &Map::new(), Mode::Create);
        assert!(prepared.changes.is_empty());
        assert_eq!(prepared.base, map(json!({"address": {"country": "FR"}})));
    }

    #[test]
    fn test_sub_schema_without_defaults_writes_nothing() {
        let schema = Schema::new("user").with_field(
            "address",
            Field::new().schema(Schema::new("address").with_field("city", Field::new())),
        );
        let prepared = schema.prepare(&Context::new(), &Map::new(), Mode::Create);
        assert_eq!(prepared, Prepared::default());
    }

    #[test]
    fn test_sub_schema_splits_changes_and_base() {
        let prepared = with_address().prepare(
            &Context::new(),
            &map(json!({"address": {"city": "Lyon"}})),
            Mode::Create,
        );
        assert_eq!(prepared.changes, map(json!({"address": {"city": "Lyon"}})));
        assert_eq!(prepared.base, map(json!({"address": {"country": "FR"}})));
    }

    #[test]
    fn test_sub_schema_update_diffs_against_sub_original() {
        let original = map(json!({"address": {"city": "Lyon", "country": "FR"}}));
        let prepared = with_address().prepare(
            &Context::new(),
            &map(json!({"address": {"city": "Nice", "country": "FR"}})),
            Mode::Update(&original),
        );
        assert_eq!(prepared.changes, map(json!({"address": {"city": "Nice"}})));
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_sub_schema_unchanged_is_not_a_change() {
        let original = map(json!({"address": {"city": "Lyon"}}));
        let prepared = with_address().prepare(
            &Context::new(),
            &map(json!({"address": {"city": "Lyon"}})),
            Mode::Update(&original),
        );
        assert!(prepared.changes.is_empty());
        assert_eq!(prepared.base, original);
    }

    #[test]
    fn test_sub_schema_replace_removes_whole_document() {
        let original = map(json!({"address": {"city": "Lyon"}}));
        let prepared = with_address().prepare(&Context::new(), &Map::new(), Mode::Replace(&original));
        assert_eq!(prepared.changes["address"], Value::Tombstone);
    }

    #[test]
    fn test_sub_schema_non_object_left_as_is() {
        let prepared = with_address().prepare(
            &Context::new(),
            &map(json!({"address": "Lyon"})),
            Mode::Create,
        );
        assert_eq!(prepared.changes, map(json!({"address": "Lyon"})));
    }
}
