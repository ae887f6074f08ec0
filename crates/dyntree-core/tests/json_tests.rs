/// JSON codec tests: parsing, serialization, number formatting and error
/// reporting.
use dyntree_core::json::{from_json, from_value, to_json, to_json_pretty, to_value};
use dyntree_core::{Format, Kind, ParseErrorKind, Tree, TreeError};
use serde_json::json;

fn round_trip(input: &str) -> String {
    let mut tree = Tree::new();
    let root = from_json(&mut tree, input).unwrap();
    to_json(&tree, root).unwrap()
}

// ============================================================================
// 1. Parsing
// ============================================================================

#[test]
fn parse_builds_every_kind() {
    let mut tree = Tree::new();
    let root = from_json(
        &mut tree,
        r#"{"n":1.5,"s":"x","t":true,"z":null,"a":[1],"o":{}}"#,
    )
    .unwrap();
    let kinds: Vec<Kind> = tree.children(root).iter().map(|c| tree.kind(*c)).collect();
    assert_eq!(
        kinds,
        vec![
            Kind::Number,
            Kind::String,
            Kind::Bool,
            Kind::Null,
            Kind::Array,
            Kind::Object
        ]
    );
    assert_eq!(tree.kind(root), Kind::Object);
}

#[test]
fn parse_scalar_root() {
    let mut tree = Tree::new();
    let root = from_json(&mut tree, "42").unwrap();
    assert_eq!(tree.kind(root), Kind::Number);
    assert_eq!(tree.number(root), 42.0);
    assert!(tree.parent(root).is_none());
}

#[test]
fn parse_preserves_member_order() {
    assert_eq!(round_trip(r#"{"z":1,"a":2,"m":3}"#), r#"{"z":1,"a":2,"m":3}"#);
}

#[test]
fn parse_duplicate_key_last_wins() {
    assert_eq!(round_trip(r#"{"k":1,"k":2}"#), r#"{"k":2}"#);
}

#[test]
fn array_elements_are_nameless() {
    let mut tree = Tree::new();
    let root = from_json(&mut tree, r#"[1,2]"#).unwrap();
    assert!(tree.children(root).iter().all(|c| tree.name(*c).is_none()));
}

#[test]
fn from_value_accepts_parsed_documents() {
    let mut tree = Tree::new();
    let root = from_value(&mut tree, &json!({"user": {"id": 7, "tags": ["a", "b"]}})).unwrap();
    assert_eq!(to_value(&tree, root), json!({"user": {"id": 7, "tags": ["a", "b"]}}));
}

// ============================================================================
// 2. Serialization
// ============================================================================

#[test]
fn integral_numbers_have_no_decimal_point() {
    assert_eq!(round_trip("[1.0,-2.0,0,1e3]"), "[1,-2,0,1000]");
}

#[test]
fn fractional_numbers_never_use_exponents() {
    assert_eq!(round_trip("[0.5,21.1,1e-7]"), "[0.5,21.1,0.0000001]");
}

#[test]
fn strings_are_escaped() {
    assert_eq!(
        round_trip(r#"{"q":"say \"hi\"\n\ttab","u":"café"}"#),
        r#"{"q":"say \"hi\"\n\ttab","u":"café"}"#
    );
}

#[test]
fn undefined_serializes_as_null() {
    let mut tree = Tree::new();
    let root = tree.create();
    tree.set_field(root, "u", None).unwrap();
    assert_eq!(to_json(&tree, root).unwrap(), r#"{"u":null}"#);
    assert_eq!(to_value(&tree, root), json!({"u": null}));
}

#[test]
fn non_finite_numbers_serialize_as_null() {
    let mut tree = Tree::new();
    let root = tree.create();
    tree.push_number(root, f64::NAN).unwrap();
    tree.push_number(root, f64::INFINITY).unwrap();
    assert_eq!(to_json(&tree, root).unwrap(), "[null,null]");
    assert_eq!(to_value(&tree, root), json!([null, null]));
}

#[test]
fn empty_containers() {
    assert_eq!(round_trip(r#"{"a":[],"o":{}}"#), r#"{"a":[],"o":{}}"#);
}

#[test]
fn pretty_output_indents_two_spaces() {
    let mut tree = Tree::new();
    let root = from_json(&mut tree, r#"{"a":[1,2],"b":{},"c":"x"}"#).unwrap();
    let expected = "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {},\n  \"c\": \"x\"\n}";
    assert_eq!(to_json_pretty(&tree, root).unwrap(), expected);
}

#[test]
fn pretty_output_parses_back_to_same_value() {
    let input = r#"{"users":[{"name":"Alice","age":30},{"name":"Bob","age":25.5}],"ok":true}"#;
    let mut tree = Tree::new();
    let root = from_json(&mut tree, input).unwrap();
    let pretty = to_json_pretty(&tree, root).unwrap();
    let a: serde_json::Value = serde_json::from_str(input).unwrap();
    let b: serde_json::Value = serde_json::from_str(&pretty).unwrap();
    assert_eq!(a, b);
}

#[test]
fn serialize_subtree() {
    let mut tree = Tree::new();
    let root = from_json(&mut tree, r#"{"a":{"b":[true,null]}}"#).unwrap();
    let a = tree.by_name(root, "a").unwrap();
    assert_eq!(to_json(&tree, a).unwrap(), r#"{"b":[true,null]}"#);
}

// ============================================================================
// 3. Errors
// ============================================================================

#[test]
fn truncated_input_is_unexpected_eof() {
    let mut tree = Tree::new();
    let err = from_json(&mut tree, r#"{"a":[1,2"#).unwrap_err();
    assert!(matches!(
        err,
        TreeError::Parse {
            format: Format::Json,
            kind: ParseErrorKind::UnexpectedEof,
            ..
        }
    ));
}

#[test]
fn syntax_error_reports_byte_offset() {
    let mut tree = Tree::new();
    let input = "{\n  \"a\": 1,\n  \"b\": x\n}";
    let err = from_json(&mut tree, input).unwrap_err();
    match err {
        TreeError::Parse {
            kind: ParseErrorKind::Syntax(_),
            offset,
            ..
        } => {
            let x = input.find('x').unwrap();
            assert!(offset >= x && offset <= x + 1, "offset {offset}, x at {x}");
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn failed_parse_leaves_nothing_allocated() {
    let mut tree = Tree::new();
    assert!(from_json(&mut tree, r#"{"a":{"b":[1,2,"#).is_err());
    assert!(from_json(&mut tree, "").is_err());
    assert_eq!(tree.node_count(), 0);
}

#[test]
fn parse_error_display_names_format() {
    let mut tree = Tree::new();
    let err = from_json(&mut tree, "[").unwrap_err();
    assert!(err.to_string().starts_with("JSON parse error at byte"));
}
