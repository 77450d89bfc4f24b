//! Declared-default injection over serde's data model.
//!
//! A defaults tree mirrors the shape of the target document. Missing or
//! null fields are filled from it; values that are already present stay
//! untouched apart from two scalar coercions: duration strings become
//! integer milliseconds when the default is a number, and JSON-literal
//! strings become arrays/objects when the default is one.

use crate::UtilsError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Recursively fills missing or null fields of `target` from `defaults`.
///
/// Objects merge key-by-key. Arrays apply a single-element defaults
/// template to every element. Present non-null scalars are never
/// overwritten.
///
/// ```rust
/// use serde_json::json;
///
/// let mut doc = json!({"host": "db1", "pool": {"max": 8}});
/// let defaults = json!({"host": "localhost", "port": 5432, "pool": {"max": 4, "idle": 1}});
/// toolx_utils::defaults::apply_defaults(&mut doc, &defaults);
/// assert_eq!(doc, json!({"host": "db1", "port": 5432, "pool": {"max": 8, "idle": 1}}));
/// ```
pub fn apply_defaults(target: &mut Value, defaults: &Value) {
    if target.is_null() {
        *target = defaults.clone();
        return;
    }
    match (target, defaults) {
        (Value::Object(fields), Value::Object(default_fields)) => {
            for (key, default_value) in default_fields {
                match fields.get_mut(key) {
                    Some(existing) => apply_defaults(existing, default_value),
                    None => {
                        fields.insert(key.clone(), default_value.clone());
                    }
                }
            }
        }
        (Value::Array(items), Value::Array(template)) => {
            if let [element_defaults] = template.as_slice() {
                for item in items.iter_mut() {
                    apply_defaults(item, element_defaults);
                }
            }
        }
        (target, defaults) => coerce_scalar(target, defaults),
    }
}

/// Applies `defaults` to `value` and deserializes the result.
pub fn hydrate<T: DeserializeOwned>(mut value: Value, defaults: &Value) -> Result<T, UtilsError> {
    apply_defaults(&mut value, defaults);
    Ok(serde_json::from_value(value)?)
}

fn coerce_scalar(target: &mut Value, defaults: &Value) {
    let Value::String(text) = &*target else { return };
    match defaults {
        Value::Number(_) => {
            if let Ok(duration) = crate::time::parse_duration(text) {
                let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                *target = Value::from(millis);
            }
        }
        Value::Array(_) | Value::Object(_) => {
            let Ok(parsed) = serde_json::from_str::<Value>(text) else { return };
            let kind_matches = (parsed.is_array() && defaults.is_array())
                || (parsed.is_object() && defaults.is_object());
            if kind_matches {
                *target = parsed;
                apply_defaults(target, defaults);
            }
        }
        _ => {}
    }
}
