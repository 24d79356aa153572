//! Helpers over bound values
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Return the textual projection of a value, the way it is written into markup
///
/// Null renders as the empty string, booleans as `1`/empty, whole floats without a fraction.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    return format!("{}", f as i64);
                }
            }
            n.to_string()
        }
        other => other.to_string(),
    }
}

/// A value counts as empty when it is null or renders to the empty string
///
/// `false` is not empty: an unchecked checkbox reporting `false` carries an answer.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Compare two scalar values by their textual projection
///
/// Submitted data is always text, so `"1"` matches a checked value of `1`.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Array(_), _) | (_, Value::Array(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
            a == b
        }
        _ => to_text(a) == to_text(b),
    }
}

/// Truthiness of a submitted value
///
/// Null, `false`, zero, the empty string and `"0"` are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(list) => !list.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Return true if the value is, or parses as, a finite number
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s
            .trim_start()
            .parse::<f64>()
            .map(|f| f.is_finite())
            .unwrap_or(false),
        _ => false,
    }
}

/// Escape text for inclusion in markup (quotes included)
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

static MACRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^\s}]+)\}").expect("valid macro regex"));

/// Replace `{key}` and `{nested.key}` macros in a string with values from a map
///
/// Keys are matched case-insensitively against lower-cased map keys. Unknown macros are left as
/// they are.
pub fn replace_macros(template: &str, values: &Map<String, Value>) -> String {
    MACRO
        .replace_all(template, |caps: &Captures| {
            let mut item = values;
            for part in caps[1].split('.') {
                let part = part.to_lowercase();
                let found = item
                    .iter()
                    .find(|(k, _)| k.to_lowercase() == part)
                    .map(|(_, v)| v);
                match found {
                    Some(Value::Object(map)) => item = map,
                    Some(value) => return to_text(value),
                    None => return caps[0].to_string(),
                }
            }
            caps[0].to_string()
        })
        .into_owned()
}

/// Coerce an arbitrary value into a map
///
/// Arrays become index-keyed maps, scalars are stored under key `0` and null becomes empty.
pub fn to_map(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        scalar => Map::from_iter([("0".to_string(), scalar.clone())]),
    }
}

/// Return the `(key, value)` entries of a collection in order
///
/// Keys of arrays are their indices, keys of maps are taken literally so that
/// non-contiguous submitted indices survive.
pub fn entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Null => Vec::new(),
        scalar => vec![("0".to_string(), scalar.clone())],
    }
}

/// Merge `incoming` into `target`, accumulating rather than replacing collections
pub fn merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(dst), Value::Object(src)) => {
            for (k, v) in src {
                dst.insert(k, v);
            }
        }
        (Value::Array(dst), Value::Array(src)) => dst.extend(src),
        (Value::Object(dst), Value::Array(src)) => {
            let offset = dst.len();
            for (i, v) in src.into_iter().enumerate() {
                dst.insert((offset + i).to_string(), v);
            }
        }
        (dst, src) => *dst = src,
    }
}

/// Insert a value in a tree at the location given by a list of dimensions
///
/// An empty dimension appends to a list, a list value is appended element by element.
/// Intermediate maps are created as needed.
pub fn insert_at(target: &mut Map<String, Value>, dims: &[String], value: Value) {
    let Some((first, rest)) = dims.split_first() else {
        return;
    };

    if rest.is_empty() {
        target.insert(first.clone(), value);
        return;
    }

    if rest[0].is_empty() {
        let slot = target
            .entry(first.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(list) = slot {
            match value {
                Value::Null => {}
                Value::Array(items) => list.extend(items),
                value => list.push(value),
            }
        }
        return;
    }

    let slot = target
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        insert_at(map, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_projects_values_to_text() {
        assert_eq!(to_text(&json!(null)), "");
        assert_eq!(to_text(&json!(12.0)), "12");
        assert_eq!(to_text(&json!(12.5)), "12.5");
        assert_eq!(to_text(&json!(true)), "1");
        assert_eq!(to_text(&json!("x")), "x");
    }

    #[test]
    fn it_treats_false_as_non_empty() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("")));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!(0)));
    }

    #[test]
    fn it_compares_loosely() {
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(!loose_eq(&json!(null), &json!("")));
        assert!(!loose_eq(&json!("a"), &json!("b")));
    }

    #[test]
    fn it_evaluates_truthiness() {
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!("0")));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn it_detects_numeric_input() {
        assert!(is_numeric(&json!("12.5")));
        assert!(is_numeric(&json!(" -3")));
        assert!(!is_numeric(&json!("12a")));
        assert!(!is_numeric(&json!("")));
        assert!(!is_numeric(&json!("inf")));
    }

    #[test]
    fn it_replaces_macros() {
        let values = to_map(&json!({"ID": 7, "owner": {"name": "ada"}}));
        assert_eq!(
            replace_macros("/edit?id={id}&o={owner.name}&x={missing}", &values),
            "/edit?id=7&o=ada&x={missing}"
        );
    }

    #[test]
    fn it_merges_accumulating_collections() {
        let mut target = json!({"a": 1});
        merge(&mut target, json!({"b": 2}));
        assert_eq!(target, json!({"a": 1, "b": 2}));

        let mut list = json!([1]);
        merge(&mut list, json!([2, 3]));
        assert_eq!(list, json!([1, 2, 3]));
    }

    #[test]
    fn it_inserts_at_nested_dimensions() {
        let mut map = Map::new();
        insert_at(&mut map, &["a".into(), "b".into()], json!(1));
        insert_at(&mut map, &["tags".into(), "".into()], json!("x"));
        insert_at(&mut map, &["tags".into(), "".into()], json!(null));
        insert_at(&mut map, &["tags".into(), "".into()], json!("y"));
        insert_at(&mut map, &["tags".into(), "".into()], json!(["z", "w"]));
        assert_eq!(
            Value::Object(map),
            json!({"a": {"b": 1}, "tags": ["x", "y", "z", "w"]})
        );
    }
}
