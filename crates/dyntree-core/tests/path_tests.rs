/// Path layer tests: tokenizer, exact resolver, resolve cache and the path
/// setter.
use dyntree_core::json::{from_json, to_json};
use dyntree_core::path::{
    lookup, resolve, resolve_bool, resolve_first, resolve_number, resolve_string, set_path,
    set_path_bool, set_path_null, set_path_number, set_path_string, Path, PathConfig,
    ResolveCache, Token,
};
use dyntree_core::{Kind, NodeId, Tree, TreeError};

fn slash(text: &str) -> Path {
    Path::parse(text, &PathConfig::default())
}

fn load(tree: &mut Tree, json: &str) -> NodeId {
    from_json(tree, json).unwrap()
}

// ============================================================================
// 1. Tokenizer
// ============================================================================

#[test]
fn tokenizer_skips_empty_tokens() {
    let path = slash("/a//b/");
    assert_eq!(
        path.tokens(),
        &[Token::Name("a".into()), Token::Name("b".into())]
    );
    assert_eq!(path.to_string(), "a/b");
}

#[test]
fn tokenizer_marks_wildcards() {
    let path = slash("*/x/*");
    assert!(path.has_wildcard());
    assert!(path.tokens()[0].is_wildcard());
    assert!(!path.tokens()[1].is_wildcard());
    // A star inside a name is literal.
    assert!(!slash("a*").has_wildcard());
}

#[test]
fn tokenizer_index_reading() {
    let path = slash("12/1a/-1");
    assert_eq!(path.tokens()[0].as_index(), Some(12));
    assert_eq!(path.tokens()[1].as_index(), None);
    assert_eq!(path.tokens()[2].as_index(), None);
    assert_eq!(Token::Wildcard.as_index(), None);
}

#[test]
fn tokenizer_custom_separator() {
    let config = PathConfig::new('.').unwrap();
    let path = Path::parse("a.b/c.d", &config);
    assert_eq!(path.len(), 3);
    assert_eq!(path.tokens()[1], Token::Name("b/c".into()));
    assert_eq!(path.to_string(), "a.b/c.d");
}

#[test]
fn empty_text_is_empty_path() {
    assert!(slash("").is_empty());
    assert!(slash("///").is_empty());
}

#[test]
fn separator_must_be_ascii_and_not_wildcard() {
    assert!(matches!(
        PathConfig::new('é'),
        Err(TreeError::InvalidSeparator('é'))
    ));
    assert!(PathConfig::new('*').is_err());
    assert_eq!(PathConfig::default().separator(), '/');
}

#[test]
fn path_config_from_json() {
    let config: PathConfig = serde_json::from_str(r#"{"separator":"."}"#).unwrap();
    assert_eq!(config.separator(), '.');
    assert!(serde_json::from_str::<PathConfig>(r#"{"separator":"→"}"#).is_err());
}

// ============================================================================
// 2. Exact resolver
// ============================================================================

#[test]
fn resolver_descends_objects_and_arrays() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":[10,20,{"b":"x"}]}"#);

    assert_eq!(resolve_number(&tree, root, &slash("a/1")), 20.0);
    assert_eq!(resolve_string(&tree, root, &slash("a/2/b")), Some("x"));
    assert!(resolve(&tree, root, &slash("a/9")).is_none());
    assert!(resolve(&tree, root, &slash("a/1/deeper")).is_none());
}

#[test]
fn resolver_empty_path_is_root() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":1}"#);
    assert_eq!(resolve(&tree, root, &slash("")), Some(root));
}

#[test]
fn resolver_never_matches_wildcard() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":{"b":1}}"#);
    assert!(resolve(&tree, root, &slash("*/b")).is_none());
}

#[test]
fn resolver_digit_tokens_are_positional_on_objects() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"b":1,"0":2}"#);
    // "0" is position 0 (the "b" field), not the field named "0".
    assert_eq!(lookup(&tree, root, "0").map(|n| tree.number(n)), Some(1.0));
    assert_eq!(lookup(&tree, root, "1").map(|n| tree.number(n)), Some(2.0));
    assert!(lookup(&tree, root, "2").is_none());
    assert_eq!(lookup(&tree, root, "b").map(|n| tree.number(n)), Some(1.0));
}

#[test]
fn resolver_arrays_ignore_names() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"[1,2,3]"#);
    assert!(lookup(&tree, root, "first").is_none());
    assert_eq!(lookup(&tree, root, "2").map(|n| tree.number(n)), Some(3.0));
}

#[test]
fn resolver_helpers_use_neutral_defaults() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"flag":true,"list":[7,8]}"#);
    assert!(resolve_bool(&tree, root, &slash("flag")));
    assert!(!resolve_bool(&tree, root, &slash("missing")));
    assert_eq!(resolve_number(&tree, root, &slash("missing")), 0.0);
    assert!(resolve_string(&tree, root, &slash("flag")).is_none());
    let first = resolve_first(&tree, root, &slash("list")).unwrap();
    assert_eq!(tree.number(first), 7.0);
}

#[test]
fn resolver_stale_root_is_not_found() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":1}"#);
    tree.free(root);
    assert!(lookup(&tree, root, "a").is_none());
}

// ============================================================================
// 3. Resolve cache
// ============================================================================

#[test]
fn cache_reuses_shared_prefix() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":{"b":{"c":1,"d":2}}}"#);
    let mut cache = ResolveCache::new();

    let c = cache.resolve(&tree, root, &slash("a/b/c")).unwrap();
    assert_eq!(tree.number(c), 1.0);
    assert_eq!(cache.misses(), 3);
    assert_eq!(cache.hits(), 0);

    let d = cache.resolve(&tree, root, &slash("a/b/d")).unwrap();
    assert_eq!(tree.number(d), 2.0);
    assert_eq!(cache.hits(), 2);
    assert_eq!(cache.misses(), 4);
}

#[test]
fn cache_agrees_with_resolver() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":[{"x":1},{"x":2}],"b":{"x":3}}"#);
    let mut cache = ResolveCache::new();
    for text in ["a/0/x", "a/1/x", "b/x", "a/1/x", "a/5", "b/x/y", "a/0"] {
        let path = slash(text);
        assert_eq!(
            cache.resolve(&tree, root, &path),
            resolve(&tree, root, &path),
            "mismatch for {text}"
        );
    }
}

#[test]
fn cache_invalidates_on_mutation() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":{"b":1}}"#);
    let mut cache = ResolveCache::new();
    let path = slash("a/b");
    let old = cache.resolve(&tree, root, &path).unwrap();

    let a = lookup(&tree, root, "a").unwrap();
    tree.free(a);
    tree.set_field(root, "a", None).unwrap();
    let a = lookup(&tree, root, "a").unwrap();
    let new = tree.set_field_number(a, "b", 2.0).unwrap();

    let found = cache.resolve(&tree, root, &path).unwrap();
    assert_ne!(found, old);
    assert_eq!(found, new);
}

#[test]
fn cache_invalidates_on_root_change() {
    let mut tree = Tree::new();
    let first = load(&mut tree, r#"{"k":1}"#);
    let second = load(&mut tree, r#"{"k":2}"#);
    let mut cache = ResolveCache::new();
    let path = slash("k");
    assert_eq!(cache.resolve(&tree, first, &path).map(|n| tree.number(n)), Some(1.0));
    assert_eq!(cache.resolve(&tree, second, &path).map(|n| tree.number(n)), Some(2.0));
}

// ============================================================================
// 4. Path setter
// ============================================================================

#[test]
fn set_path_creates_missing_fields() {
    let mut tree = Tree::new();
    let root = tree.create();
    set_path_number(&mut tree, root, &slash("a/b/c"), 1.0).unwrap();
    set_path_string(&mut tree, root, &slash("a/name"), "x").unwrap();
    set_path_bool(&mut tree, root, &slash("flag"), true).unwrap();
    set_path_null(&mut tree, root, &slash("nothing")).unwrap();
    assert_eq!(
        to_json(&tree, root).unwrap(),
        r#"{"a":{"b":{"c":1},"name":"x"},"flag":true,"nothing":null}"#
    );
}

#[test]
fn set_path_overwrites_existing_value() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":{"b":"old"}}"#);
    let before = tree.node_count();
    let node = set_path_number(&mut tree, root, &slash("a/b"), 5.0).unwrap();
    assert_eq!(tree.kind(node), Kind::Number);
    assert_eq!(resolve_number(&tree, root, &slash("a/b")), 5.0);
    // The temporary value node is gone again.
    assert_eq!(tree.node_count(), before);
}

#[test]
fn set_path_addresses_array_elements() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"list":[1,2,3]}"#);
    set_path_number(&mut tree, root, &slash("list/1"), 20.0).unwrap();
    assert_eq!(to_json(&tree, root).unwrap(), r#"{"list":[1,20,3]}"#);
}

#[test]
fn set_path_promotes_scalar_on_the_way() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":5}"#);
    set_path_number(&mut tree, root, &slash("a/b"), 1.0).unwrap();
    assert_eq!(to_json(&tree, root).unwrap(), r#"{"a":{"b":1}}"#);
}

#[test]
fn set_path_rejects_wildcards_and_empty_paths() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":{"b":1}}"#);
    let before = tree.node_count();

    assert!(matches!(
        set_path_number(&mut tree, root, &slash("*/b"), 2.0),
        Err(TreeError::InvalidPath { .. })
    ));
    assert!(matches!(
        set_path_number(&mut tree, root, &slash(""), 2.0),
        Err(TreeError::InvalidPath { .. })
    ));
    assert_eq!(tree.node_count(), before);
    assert_eq!(to_json(&tree, root).unwrap(), r#"{"a":{"b":1}}"#);
}

#[test]
fn set_path_rejects_attached_value() {
    let mut tree = Tree::new();
    let root = load(&mut tree, r#"{"a":1,"b":2}"#);
    let b = lookup(&tree, root, "b").unwrap();
    assert!(matches!(
        set_path(&mut tree, root, &slash("a"), b),
        Err(TreeError::AlreadyAttached(_))
    ));
    assert!(tree.contains(b));
}

#[test]
fn set_path_rejects_value_that_owns_root() {
    let mut tree = Tree::new();
    let outer = load(&mut tree, r#"{"inner":{}}"#);
    let inner = lookup(&tree, outer, "inner").unwrap();
    assert!(matches!(
        set_path(&mut tree, inner, &slash("x"), outer),
        Err(TreeError::CyclicInsert { .. })
    ));
}

#[test]
fn set_path_takes_value_from_detached_node() {
    let mut tree = Tree::new();
    let root = tree.create();
    let value = tree.create_string("hello");
    set_path(&mut tree, root, &slash("greeting"), value).unwrap();
    assert!(!tree.contains(value));
    assert_eq!(tree.string_by(root, "greeting"), Some("hello"));
}
