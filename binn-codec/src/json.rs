//! JSON bridge
//!
//! BINN is a superset of JSON's data model apart from blobs and integer map
//! keys. Blobs become arrays of byte values and map keys become their
//! decimal strings; NaN and infinities become `null`.

use crate::item::Item;
use crate::reader::{ContainerRef, Key};
use crate::value::{Value, ValueOptions};
use binn_format::limits::HARD_MAX_DEPTH;
use binn_format::{BinnError, ContainerKind, Result};
use serde_json::{Map, Number, Value as JsonValue};

/// Convert a decoded item to JSON.
pub fn to_json(item: &Item<'_>) -> Result<JsonValue> {
    item_to_json(item, 0)
}

/// Convert a JSON object or array into a new [`Value`].
///
/// Integers that fit `i64` are written as signed, larger ones as `u64`, the
/// rest as `float64`; compression then picks the stored width.
pub fn from_json(json: &JsonValue, opts: ValueOptions) -> Result<Value<'static>> {
    match json {
        JsonValue::Array(_) | JsonValue::Object(_) => build(json, opts, 0),
        _ => Err(BinnError::Malformed(
            "top-level JSON must be an object or an array".to_string(),
        )),
    }
}

fn item_to_json(item: &Item<'_>, depth: usize) -> Result<JsonValue> {
    let json = match *item {
        Item::Null => JsonValue::Null,
        Item::Bool(b) => JsonValue::Bool(b),
        Item::UInt8(v) => v.into(),
        Item::Int8(v) => v.into(),
        Item::UInt16(v) => v.into(),
        Item::Int16(v) => v.into(),
        Item::UInt32(v) => v.into(),
        Item::Int32(v) => v.into(),
        Item::UInt64(v) => v.into(),
        Item::Int64(v) => v.into(),
        Item::Float32(v) => float(f64::from(v)),
        Item::Float64(v) => float(v),
        Item::Str(s) => JsonValue::String(s.to_string()),
        Item::Blob(b) => JsonValue::Array(b.iter().map(|&byte| byte.into()).collect()),
        Item::Container(c) => container_to_json(&c, depth + 1)?,
    };
    Ok(json)
}

fn container_to_json(container: &ContainerRef<'_>, depth: usize) -> Result<JsonValue> {
    if depth > HARD_MAX_DEPTH {
        return Err(BinnError::LimitExceeded(format!(
            "nesting deeper than {HARD_MAX_DEPTH}"
        )));
    }

    if container.kind() == ContainerKind::List {
        let items = container
            .entries()
            .map(|entry| item_to_json(&entry?.1, depth))
            .collect::<Result<Vec<_>>>()?;
        return Ok(JsonValue::Array(items));
    }

    let mut map = Map::with_capacity(container.count());
    for entry in container.entries() {
        let (key, item) = entry?;
        let name = match key {
            Key::Name(name) => name.to_string(),
            other => other.to_string(),
        };
        map.insert(name, item_to_json(&item, depth)?);
    }
    Ok(JsonValue::Object(map))
}

fn float(v: f64) -> JsonValue {
    Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

fn build(json: &JsonValue, opts: ValueOptions, depth: usize) -> Result<Value<'static>> {
    if depth >= HARD_MAX_DEPTH {
        return Err(BinnError::LimitExceeded(format!(
            "nesting deeper than {HARD_MAX_DEPTH}"
        )));
    }

    match json {
        JsonValue::Object(fields) => {
            let mut value = Value::with_options(ContainerKind::Object, opts)?;
            for (name, field) in fields {
                insert(&mut value, Some(name.as_str()), field, opts, depth)?;
            }
            Ok(value)
        }
        JsonValue::Array(items) => {
            let mut value = Value::with_options(ContainerKind::List, opts)?;
            for item in items {
                insert(&mut value, None, item, opts, depth)?;
            }
            Ok(value)
        }
        _ => Err(BinnError::Malformed("expected an object or an array".to_string())),
    }
}

fn insert(
    parent: &mut Value<'_>,
    name: Option<&str>,
    json: &JsonValue,
    opts: ValueOptions,
    depth: usize,
) -> Result<()> {
    let nested;
    let item = match json {
        JsonValue::Null => Item::Null,
        JsonValue::Bool(b) => Item::Bool(*b),
        JsonValue::Number(n) => number(n)?,
        JsonValue::String(s) => Item::Str(s.as_str()),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            nested = build(json, opts, depth + 1)?;
            Item::from(&nested)
        }
    };
    match name {
        Some(name) => parent.object_set(name, item),
        None => parent.list_add(item),
    }
}

fn number(n: &Number) -> Result<Item<'static>> {
    if let Some(v) = n.as_i64() {
        Ok(Item::Int64(v))
    } else if let Some(v) = n.as_u64() {
        Ok(Item::UInt64(v))
    } else {
        n.as_f64()
            .map(Item::Float64)
            .ok_or_else(|| BinnError::Malformed(format!("unrepresentable number {n}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_through_json() {
        let doc = json!({
            "id": 42,
            "name": "widget",
            "tags": ["a", "b"],
            "price": 7.89,
            "big": u64::MAX,
            "neg": -300,
            "none": null,
            "ok": true,
            "nested": {"empty": []}
        });
        let value = from_json(&doc, ValueOptions::default()).unwrap();
        assert_eq!(value.count(), 9);
        assert_eq!(value.reader().object_get("id").unwrap().type_tag().family().name(), "integer");

        let back = to_json(&Item::from(&value)).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_wire_order_preserved() {
        let doc = json!({"z": 1, "a": 2});
        let value = from_json(&doc, ValueOptions::default()).unwrap();
        let back = to_json(&Item::from(&value)).unwrap();
        let keys: Vec<&String> = back.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_map_keys_and_blobs() {
        let mut map = Value::map().unwrap();
        map.map_set(-7, &b"\x01\xff"[..]).unwrap();
        map.map_set(3, f64::NAN).unwrap();
        let json = to_json(&Item::from(&map)).unwrap();
        assert_eq!(json, json!({"-7": [1, 255], "3": null}));
    }

    #[test]
    fn test_scalar_top_level_rejected() {
        assert!(matches!(
            from_json(&json!(5), ValueOptions::default()),
            Err(BinnError::Malformed(_))
        ));
    }

    #[test]
    fn test_uncompressed_option_is_honored() {
        let opts = ValueOptions {
            int_compression: false,
            ..ValueOptions::default()
        };
        let value = from_json(&json!([1]), opts).unwrap();
        assert_eq!(value.as_bytes(), &[0xE0, 0x0C, 0x01, 0x81, 0, 0, 0, 0, 0, 0, 0, 1]);
    }
}
