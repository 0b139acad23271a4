//! allOf / anyOf / oneOf / not, including how branches inherit the
//! constraints of the node that carries them.

use mcp_schema_server::schema::{
    validate, CombinedSchema, IntegerSchema, NumberSchema, NumericBounds, ObjectSchema,
    SchemaError, SchemaNode, SchemaType, StringSchema, ValidationErrorType as Kind,
    ValidationErrors,
};
use serde_json::{json, Value};

fn check(schema: impl Into<SchemaNode>, data: Value) -> ValidationErrors {
    validate(&schema.into(), &data).expect("schema must be evaluable")
}

#[test]
fn one_of_with_disjoint_lengths() {
    let schema = CombinedSchema::new().one_of([
        StringSchema::new().max_length(3),
        StringSchema::new().min_length(5),
    ]);

    assert!(check(schema.clone(), json!("ab")).is_empty());

    let errors = check(schema, json!("abcd"));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::OneOfNotMet));
}

#[test]
fn one_of_rejects_more_than_one_match() {
    let schema = CombinedSchema::new().one_of([
        SchemaNode::from(IntegerSchema::new()),
        NumberSchema::new().into(),
    ]);

    assert!(check(schema.clone(), json!(3.5)).is_empty());

    let errors = check(schema, json!(3));
    assert_eq!(errors.len(), 1);
    let error = errors.iter().next().unwrap();
    assert_eq!(error.kind, Kind::OneOfNotMet);
    assert!(error.details.as_deref().unwrap().contains("matched 2 of 2"));
}

#[test]
fn all_of_keeps_branch_failures() {
    let schema = CombinedSchema::new().all_of([
        StringSchema::new().min_length(2),
        StringSchema::new().max_length(4),
    ]);

    assert!(check(schema.clone(), json!("abc")).is_empty());

    let errors = check(schema, json!("a"));
    assert_eq!(errors.len(), 2);
    assert!(errors.contains_kind(Kind::AllOfNotMet));
    assert!(errors.contains_kind(Kind::MinLengthNotMet));
    assert!(errors.iter().all(|e| e.path.is_empty()));
}

#[test]
fn all_of_collapses_identical_branch_errors() {
    let schema = CombinedSchema::new().all_of([StringSchema::new(), StringSchema::new()]);

    let errors = check(schema, json!(1));

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.of_kind(Kind::TypeMismatch).count(), 1);
    assert_eq!(errors.of_kind(Kind::AllOfNotMet).count(), 1);
}

#[test]
fn all_of_branches_inherit_base_constraints() {
    // Base maxLength fails directly and again inside the merged branch; the
    // two identical errors collapse into one.
    let schema = StringSchema::new()
        .max_length(3)
        .all_of([StringSchema::new().pattern("^a")]);

    let errors = check(schema, json!("abcd"));

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.of_kind(Kind::MaxLengthExceeded).count(), 1);
    assert!(errors.contains_kind(Kind::AllOfNotMet));
}

#[test]
fn any_of_discards_branch_failures() {
    let schema = CombinedSchema::new().any_of([
        SchemaNode::from(StringSchema::new()),
        IntegerSchema::new().into(),
    ]);

    assert!(check(schema.clone(), json!(5)).is_empty());
    assert!(check(schema.clone(), json!("five")).is_empty());

    let errors = check(schema, json!(true));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::AnyOfNotMet));
}

#[test]
fn any_of_branches_see_base_required() {
    let schema = ObjectSchema::new().required(["id"]).any_of([
        ObjectSchema::new().required(["name"]),
        ObjectSchema::new().required(["email"]),
    ]);

    assert!(check(schema.clone(), json!({"id": 1, "email": "a@b"})).is_empty());

    // A branch's `required` replaces the base list, so {"email"} alone
    // satisfies the second branch; only the direct check reports `id`.
    let errors = check(schema.clone(), json!({"email": "a@b"}));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::RequiredPropertyMissing));

    let errors = check(schema, json!({"id": 1}));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::AnyOfNotMet));
}

#[test]
fn any_of_branches_inherit_untouched_base_keys() {
    let schema = StringSchema::new()
        .max_length(3)
        .any_of([StringSchema::new().pattern("^a"), StringSchema::new().pattern("^b")]);

    assert!(check(schema.clone(), json!("abc")).is_empty());

    // Both branches carry the base maxLength, so neither passes.
    let errors = check(schema, json!("abcd"));
    assert!(errors.contains_kind(Kind::MaxLengthExceeded));
    assert!(errors.contains_kind(Kind::AnyOfNotMet));
    assert_eq!(errors.len(), 2);
}

#[test]
fn empty_combinator_lists() {
    assert!(check(CombinedSchema::new().all_of(Vec::<SchemaNode>::new()), json!(1)).is_empty());
    assert!(check(CombinedSchema::new().not(Vec::<SchemaNode>::new()), json!(1)).is_empty());
    assert!(check(CombinedSchema::new().any_of(Vec::<SchemaNode>::new()), json!(1))
        .contains_kind(Kind::AnyOfNotMet));
    assert!(check(CombinedSchema::new().one_of(Vec::<SchemaNode>::new()), json!(1))
        .contains_kind(Kind::OneOfNotMet));
}

#[test]
fn not_negates() {
    let schema = CombinedSchema::new().not([StringSchema::new()]);

    assert!(check(schema.clone(), json!(1)).is_empty());

    let errors = check(schema, json!("x"));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::NotConditionViolated));
}

#[test]
fn not_fails_if_any_listed_schema_matches() {
    let schema = CombinedSchema::new().not([
        SchemaNode::from(StringSchema::new()),
        IntegerSchema::new().into(),
    ]);

    assert!(check(schema.clone(), json!(null)).is_empty());
    assert!(check(schema.clone(), json!(4)).contains_kind(Kind::NotConditionViolated));
    assert!(check(schema, json!("s")).contains_kind(Kind::NotConditionViolated));
}

#[test]
fn not_with_base_constraints() {
    let schema = IntegerSchema::new().not([IntegerSchema::new().minimum(10.0)]);

    assert!(check(schema.clone(), json!(5)).is_empty());
    assert!(check(schema.clone(), json!(15)).contains_kind(Kind::NotConditionViolated));

    // The merged branch fails on type too, so `not` is satisfied and only
    // the direct type error remains.
    let errors = check(schema, json!("x"));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::TypeMismatch));
}

#[test]
fn typed_node_and_combinators_both_apply() {
    let schema = StringSchema::new()
        .min_length(1)
        .one_of([StringSchema::new().pattern("^a"), StringSchema::new().pattern("z$")]);

    assert!(check(schema.clone(), json!("abc")).is_empty());
    assert!(check(schema.clone(), json!("az")).contains_kind(Kind::OneOfNotMet));

    let errors = check(schema, json!(""));
    assert!(errors.contains_kind(Kind::MinLengthNotMet));
    assert!(errors.contains_kind(Kind::OneOfNotMet));
}

#[test]
fn combinators_report_at_nested_location() {
    let schema = ObjectSchema::new().property(
        "id",
        CombinedSchema::new().any_of([
            SchemaNode::from(StringSchema::new().min_length(1)),
            IntegerSchema::new().minimum(0.0).into(),
        ]),
    );

    let errors = check(schema, json!({"id": -1}));

    let any_of = errors.of_kind(Kind::AnyOfNotMet).next().unwrap();
    assert_eq!(any_of.path, vec!["id".to_string()]);
    assert!(errors.contains_kind(Kind::PropertyValueInvalid));
    assert_eq!(errors.len(), 2);
}

#[test]
fn malformed_pattern_inside_branch_propagates() {
    let schema: SchemaNode = CombinedSchema::new()
        .any_of([StringSchema::new().pattern("[")])
        .into();
    let err = validate(&schema, &json!("x")).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidPattern { .. }));
}

// ---------------------------------------------------------------------------
// Merge semantics
// ---------------------------------------------------------------------------

#[test]
fn merge_overlay_keys_win() {
    let base: SchemaNode = StringSchema::new().min_length(2).max_length(8).into();
    let overlay: SchemaNode = StringSchema::new().max_length(4).into();

    let merged = base.merged_with(&overlay);

    let SchemaNode::String(string) = &merged else {
        panic!("expected a string schema, got {merged:?}");
    };
    assert_eq!(string.min_length, Some(2));
    assert_eq!(string.max_length, Some(4));
}

#[test]
fn merge_without_overlay_type_keeps_base_type() {
    let base: SchemaNode = IntegerSchema::new().minimum(0.0).into();
    let overlay: SchemaNode = CombinedSchema::new().description("non-negative").into();

    let merged = base.merged_with(&overlay);

    assert_eq!(merged.schema_type(), Some(SchemaType::Integer));
    assert_eq!(merged.description(), Some("non-negative"));
    assert!(!check(merged, json!(-1)).is_empty());
}

#[test]
fn merge_strips_base_combinators_keeps_overlay_ones() {
    let base: SchemaNode = CombinedSchema::new()
        .any_of([StringSchema::new()])
        .into();
    let overlay: SchemaNode = CombinedSchema::new()
        .not([IntegerSchema::new()])
        .into();

    let merged = base.merged_with(&overlay);

    assert!(merged.meta().any_of.is_none());
    assert_eq!(merged.meta().not.as_ref().map(Vec::len), Some(1));
}

#[test]
fn merge_type_conflict_overlay_type_wins() {
    let base: SchemaNode = ObjectSchema::new().required(["a"]).into();
    let overlay: SchemaNode = StringSchema::new().min_length(1).into();

    let merged = base.merged_with(&overlay);

    assert_eq!(merged.schema_type(), Some(SchemaType::String));
    assert!(check(merged, json!("x")).is_empty());

    // On the full node the direct object check still fails, while the
    // string branch of anyOf is satisfied.
    let schema = ObjectSchema::new()
        .required(["a"])
        .any_of([StringSchema::new().min_length(1)]);
    let errors = check(schema, json!("x"));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::TypeMismatch));
}

// ---------------------------------------------------------------------------
// Branches without a type
// ---------------------------------------------------------------------------

fn requires(name: &str) -> CombinedSchema {
    CombinedSchema::new().object_keywords(ObjectSchema::new().required([name]))
}

#[test]
fn untyped_any_of_branches_contribute_required() {
    let schema = ObjectSchema::new().any_of([requires("a"), requires("b")]);

    assert!(check(schema.clone(), json!({"b": 1})).is_empty());
    assert!(check(schema.clone(), json!({"a": 1, "b": 2})).is_empty());

    let errors = check(schema, json!({}));
    assert_eq!(errors.len(), 1);
    assert!(errors.contains_kind(Kind::AnyOfNotMet));
}

#[test]
fn untyped_all_of_branch_tightens_base() {
    let schema = StringSchema::new()
        .all_of([CombinedSchema::new().string_keywords(StringSchema::new().min_length(5))]);

    assert!(check(schema.clone(), json!("abcde")).is_empty());

    let errors = check(schema, json!("ab"));
    assert_eq!(errors.len(), 2);
    assert!(errors.contains_kind(Kind::AllOfNotMet));
    assert!(errors.contains_kind(Kind::MinLengthNotMet));
}

#[test]
fn untyped_one_of_branches_keep_base_type() {
    let low = CombinedSchema::new().numeric_keywords(NumericBounds {
        maximum: Some(5.0),
        ..NumericBounds::default()
    });
    let high = CombinedSchema::new().numeric_keywords(NumericBounds {
        minimum: Some(10.0),
        ..NumericBounds::default()
    });
    let schema = IntegerSchema::new().one_of([low, high]);

    assert!(check(schema.clone(), json!(3)).is_empty());
    assert!(check(schema.clone(), json!(12)).is_empty());
    assert!(check(schema.clone(), json!(7)).contains_kind(Kind::OneOfNotMet));

    // The merged branches are integer schemas, so a fraction matches neither.
    let errors = check(schema, json!(3.5));
    assert!(errors.contains_kind(Kind::TypeMismatch));
    assert!(errors.contains_kind(Kind::OneOfNotMet));
}

#[test]
fn untyped_not_branch_forbids_property() {
    let schema = ObjectSchema::new().not([requires("secret")]);

    assert!(check(schema.clone(), json!({"public": 1})).is_empty());
    assert!(check(schema, json!({"secret": 1})).contains_kind(Kind::NotConditionViolated));
}

#[test]
fn untyped_branches_read_from_wire() {
    let schema: SchemaNode = serde_json::from_value(json!({
        "type": "object",
        "properties": {"kind": {"type": "string"}},
        "oneOf": [
            {"required": ["url"], "properties": {"url": {"type": "string", "pattern": "^https://"}}},
            {"required": ["path"]}
        ]
    }))
    .unwrap();

    assert!(check(schema.clone(), json!({"url": "https://x"})).is_empty());
    assert!(check(schema.clone(), json!({"path": "/tmp"})).is_empty());
    assert!(check(schema.clone(), json!({"url": "ftp://x"})).contains_kind(Kind::OneOfNotMet));
    assert!(check(schema, json!({"url": "https://x", "path": "/"}))
        .contains_kind(Kind::OneOfNotMet));
}

#[test]
fn untyped_node_applies_keywords_by_data_kind() {
    let schema = CombinedSchema::new()
        .string_keywords(StringSchema::new().min_length(2))
        .object_keywords(ObjectSchema::new().required(["id"]));

    assert!(check(schema.clone(), json!(5)).is_empty());
    assert!(check(schema.clone(), json!(null)).is_empty());
    assert!(check(schema.clone(), json!("ab")).is_empty());
    assert!(check(schema.clone(), json!("a")).contains_kind(Kind::MinLengthNotMet));
    assert!(check(schema.clone(), json!({"id": 1})).is_empty());
    assert!(check(schema, json!({})).contains_kind(Kind::RequiredPropertyMissing));
}

#[test]
fn merge_untyped_overlay_keeps_base_type() {
    let base: SchemaNode = ObjectSchema::new()
        .required(["id"])
        .property("id", IntegerSchema::new())
        .into();
    let overlay: SchemaNode = requires("name").into();

    let merged = base.merged_with(&overlay);

    let SchemaNode::Object(object) = &merged else {
        panic!("expected an object schema, got {merged:?}");
    };
    assert_eq!(object.required, Some(vec!["name".to_string()]));
    assert_eq!(object.properties.as_ref().map(|p| p.len()), Some(1));
}
