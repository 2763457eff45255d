//! Lenient deserializers for the backend's loosely typed JSON.
//!
//! The marketplace API is not consistent about types: ids and prices arrive
//! either as numbers or as numeric strings, booleans as `0`/`1`, and nullable
//! columns as explicit `null`. These helpers absorb that at the DTO boundary.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Treat `null` the same as a missing field.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Option::<T>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Accept `12`, `"12"` or `null` for an unsigned id.
pub fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id(deserializer)?.unwrap_or_default())
}

/// Accept `12`, `"12"`, `""` or `null` for an optional unsigned id.
pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid id: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid id: {s}"))),
        other => Err(de::Error::custom(format!("invalid id: {other}"))),
    }
}

/// Accept `500000`, `"500000.00"`, `""` or `null` for an optional amount.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {s}"))),
        other => Err(de::Error::custom(format!("invalid number: {other}"))),
    }
}

/// Accept `true`, `1`, `"1"`, `"true"`; everything else is `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

/// Plans carry `features` either as a comma separated string or as an array.
pub fn joined_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "id")]
        id: u64,
        #[serde(default, deserialize_with = "opt_number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "flag")]
        active: bool,
        #[serde(default, deserialize_with = "null_default")]
        name: String,
        #[serde(default, deserialize_with = "joined_list")]
        features: String,
    }

    #[test]
    fn accepts_stringly_typed_values() {
        let p: Probe = serde_json::from_value(json!({
            "id": "42",
            "price": "99.50",
            "active": 1,
            "name": null,
            "features": ["a", "b"]
        }))
        .unwrap();
        assert_eq!(p.id, 42);
        assert_eq!(p.price, Some(99.5));
        assert!(p.active);
        assert_eq!(p.name, "");
        assert_eq!(p.features, "a, b");
    }

    #[test]
    fn rejects_garbage_ids() {
        let res: Result<Probe, _> = serde_json::from_value(json!({ "id": "abc" }));
        assert!(res.is_err());
    }
}
