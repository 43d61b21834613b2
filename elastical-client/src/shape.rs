//! Option-shaping helpers shared by every operation.
//!
//! These are pure functions over [`serde_json::Value`]: layered option
//! merging, iteration over sequence-or-map inputs, and the wire rendering of
//! query parameter values.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

/// Characters left unescaped in path segments and query components.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Position of a value visited by [`each`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// Offset into a sequence.
    Index(usize),
    /// Key in a map.
    Name(&'a str),
}

/// Deep-merge option layers into a new map.
///
/// Later sources win. Nested objects merge recursively; `null`, arrays and
/// scalars replace whatever was there. Inputs are never modified, and zero
/// sources yield an empty map.
pub fn merge(sources: &[&Map<String, Value>]) -> Map<String, Value> {
    let mut target = Map::new();
    for source in sources {
        mix(&mut target, source);
    }
    target
}

fn mix(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match value {
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(existing) = slot {
                    mix(existing, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

/// Visit every element of a sequence or every entry of a map, in order.
///
/// Scalars have nothing to visit.
pub fn each<'a>(value: &'a Value, mut visit: impl FnMut(&'a Value, Key<'a>)) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                visit(item, Key::Index(i));
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                visit(item, Key::Name(name));
            }
        }
        _ => {}
    }
}

/// The values of a sequence or map, in order.
pub fn values(value: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    each(value, |item, _| out.push(item.clone()));
    out
}

/// Query-string rendering of a boolean.
pub fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Query-string rendering of a JSON value.
///
/// Booleans become `1`/`0`, sequences are comma-joined, and `null` renders
/// as nothing so the parameter is skipped.
pub fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(flag(*b).to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Percent-encode one path segment or query component.
pub fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

pub(crate) fn take(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    let value = map.get(key).cloned()?;
    map.retain(|k, _| k != key);
    Some(value)
}

pub(crate) fn insert_some<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_merge_rightmost_scalar_wins() {
        let a = obj(json!({"size": 10, "from": 0}));
        let b = obj(json!({"size": 20}));
        let c = obj(json!({"size": 30, "explain": true}));

        let merged = merge(&[&a, &b, &c]);
        assert_eq!(Value::Object(merged), json!({"size": 30, "from": 0, "explain": true}));
    }

    #[test]
    fn test_merge_nested_objects_union() {
        let a = obj(json!({"query": {"term": {"user": "kimchy"}, "boost": 1}}));
        let b = obj(json!({"query": {"boost": 2, "minimum": 1}}));

        let merged = merge(&[&a, &b]);
        assert_eq!(
            Value::Object(merged),
            json!({"query": {"term": {"user": "kimchy"}, "boost": 2, "minimum": 1}})
        );
    }

    #[test]
    fn test_merge_arrays_and_null_replace() {
        let a = obj(json!({"fields": ["a", "b"], "routing": "x"}));
        let b = obj(json!({"fields": ["c"], "routing": null}));

        let merged = merge(&[&a, &b]);
        assert_eq!(Value::Object(merged), json!({"fields": ["c"], "routing": null}));
    }

    #[test]
    fn test_merge_object_over_scalar() {
        let a = obj(json!({"sort": "date"}));
        let b = obj(json!({"sort": {"date": "desc"}}));
        assert_eq!(Value::Object(merge(&[&a, &b])), json!({"sort": {"date": "desc"}}));
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let a = obj(json!({"query": {"boost": 1}}));
        let b = obj(json!({"query": {"boost": 2}}));
        let _ = merge(&[&a, &b]);
        assert_eq!(Value::Object(a), json!({"query": {"boost": 1}}));
    }

    #[test]
    fn test_merge_no_sources() {
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn test_each_visits_in_order() {
        let mut seen = Vec::new();
        each(&json!(["x", "y"]), |v, k| seen.push((v.clone(), format!("{k:?}"))));
        each(&json!({"b": 1, "a": 2}), |v, k| seen.push((v.clone(), format!("{k:?}"))));

        assert_eq!(
            seen,
            vec![
                (json!("x"), "Index(0)".to_string()),
                (json!("y"), "Index(1)".to_string()),
                (json!(1), "Name(\"b\")".to_string()),
                (json!(2), "Name(\"a\")".to_string()),
            ]
        );
    }

    #[test]
    fn test_values() {
        assert_eq!(values(&json!({"b": 1, "a": [2]})), vec![json!(1), json!([2])]);
        assert_eq!(values(&json!([3, 4])), vec![json!(3), json!(4)]);
        assert!(values(&json!("scalar")).is_empty());
    }

    #[test]
    fn test_flag_and_query_value() {
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
        assert_eq!(query_value(&json!(true)).as_deref(), Some("1"));
        assert_eq!(query_value(&json!(false)).as_deref(), Some("0"));
        assert_eq!(query_value(&json!(3)).as_deref(), Some("3"));
        assert_eq!(query_value(&json!(["a", "b"])).as_deref(), Some("a,b"));
        assert_eq!(query_value(&Value::Null), None);
    }

    #[test]
    fn test_encode_matches_uri_component_rules() {
        assert_eq!(encode("foo,bar"), "foo%2Cbar");
        assert_eq!(encode("a b/c?d"), "a%20b%2Fc%3Fd");
        assert_eq!(encode("keep-_.!~*'()"), "keep-_.!~*'()");
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_take_preserves_order() {
        let mut map = obj(json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(take(&mut map, "a"), Some(json!(1)));
        assert_eq!(take(&mut map, "missing"), None);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
