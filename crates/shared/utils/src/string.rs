//! Random strings, placeholder templating and key/value parsing.

use fxhash::FxHashMap;
use rand::Rng;
use serde_json::{Map, Value};

const CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random alphanumeric string of `len` characters.
#[must_use]
pub fn random(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())])).collect()
}

/// Substitutes `{key}` placeholders with JSON-rendered values.
///
/// String values are inserted without quotes; other values render as JSON
/// text. Placeholders without a matching key are kept verbatim, as is an
/// opening delimiter that never closes.
///
/// ```rust
/// let mut values = serde_json::Map::new();
/// values.insert("name".into(), serde_json::json!("kafka"));
/// values.insert("port".into(), serde_json::json!(9092));
/// let line = toolx_utils::string::format_template("{name}:{port} ({x})", "{", "}", &values);
/// assert_eq!(line, "kafka:9092 ({x})");
/// ```
#[must_use]
pub fn format_template(template: &str, open: &str, close: &str, values: &Map<String, Value>) -> String {
    if open.is_empty() || close.is_empty() {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(close) else {
            out.push_str(open);
            rest = after;
            continue;
        };
        let key = &after[..end];
        match values.get(key) {
            Some(Value::String(text)) => out.push_str(text),
            Some(value) => out.push_str(&value.to_string()),
            None => {
                out.push_str(open);
                out.push_str(key);
                out.push_str(close);
            }
        }
        rest = &after[end + close.len()..];
    }
    out.push_str(rest);
    out
}

/// Parses `k=v;k2=v2;` into a map.
///
/// Keys and values are trimmed; empty segments and segments without `=`
/// are ignored. Later duplicates win.
#[must_use]
pub fn parse_key_value_pairs(input: &str) -> FxHashMap<String, String> {
    input
        .split(';')
        .filter_map(|segment| {
            let (key, value) = segment.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Joins `k=v` pairs with `&`.
///
/// When `keys` is empty every entry is emitted sorted by key; otherwise
/// only the listed keys are emitted, in the given order, skipping keys
/// absent from the map.
#[must_use]
pub fn make_url_query(values: &FxHashMap<String, String>, keys: &[&str]) -> String {
    let pairs: Vec<String> = if keys.is_empty() {
        let mut sorted: Vec<_> = values.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted.into_iter().map(|(k, v)| format!("{k}={v}")).collect()
    } else {
        keys.iter().filter_map(|k| values.get(*k).map(|v| format!("{k}={v}"))).collect()
    };
    pairs.join("&")
}
