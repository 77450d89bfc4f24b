use proptest::prelude::*;
use serde_json::json;
use toolx_utils::string;

fn values() -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert("name".into(), json!("broker"));
    map.insert("port".into(), json!(9092));
    map.insert("tags".into(), json!(["a", "b"]));
    map
}

#[test]
fn template_substitutes_known_keys() {
    let line = string::format_template("{name}:{port} {tags}", "{", "}", &values());
    assert_eq!(line, r#"broker:9092 ["a","b"]"#);
}

#[test]
fn template_keeps_unknown_and_unclosed_placeholders() {
    let line = string::format_template("{name} {missing} {open", "{", "}", &values());
    assert_eq!(line, "broker {missing} {open");
}

#[test]
fn template_supports_custom_delimiters() {
    let line = string::format_template("<<name>> up", "<<", ">>", &values());
    assert_eq!(line, "broker up");
}

#[test]
fn key_value_pairs_trim_and_skip_malformed_segments() {
    let parsed = string::parse_key_value_pairs(" a = 1 ;b=2;; c ;d=;=x;");
    assert_eq!(parsed.len(), 3);
    assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
    assert_eq!(parsed.get("b").map(String::as_str), Some("2"));
    assert_eq!(parsed.get("d").map(String::as_str), Some(""));
    assert!(!parsed.contains_key("c"));
}

#[test]
fn url_query_sorts_without_explicit_keys() {
    let parsed = string::parse_key_value_pairs("b=2;a=1;c=3");
    assert_eq!(string::make_url_query(&parsed, &[]), "a=1&b=2&c=3");
    assert_eq!(string::make_url_query(&parsed, &["c", "a", "x"]), "c=3&a=1");
}

#[test]
fn random_uses_alphanumeric_charset() {
    let value = string::random(64);
    assert_eq!(value.len(), 64);
    assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(string::random(64), string::random(64));
}

proptest! {
    #[test]
    fn parsed_pairs_round_trip_through_query(
        pairs in proptest::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..8)
    ) {
        let input: String = pairs.iter().map(|(k, v)| format!("{k}={v};")).collect();
        let parsed = string::parse_key_value_pairs(&input);
        prop_assert_eq!(parsed.len(), pairs.len());

        let expected: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
        prop_assert_eq!(string::make_url_query(&parsed, &[]), expected.join("&"));
    }
}
