//! Per-entity wiring: list behaviour, drafts and lifecycle actions.

pub mod ads;
pub mod blocks;
pub mod plans;
pub mod properties;
pub mod reports;
pub mod subscriptions;
pub mod users;

use serde_json::Value;

/// Numeric form text to JSON: integers stay integers, unparseable text is
/// passed through for the server to reject.
pub(crate) fn number_value(text: &str) -> Value {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Value::from(f as i64)
            } else {
                Value::from(f)
            }
        }
        _ => Value::from(text),
    }
}

/// Optional numeric text: empty becomes `null`.
pub(crate) fn optional_number_value(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Null
    } else {
        number_value(text)
    }
}

/// Optional free text: blank becomes `null`.
pub(crate) fn optional_text_value(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        Value::Null
    } else {
        Value::from(text)
    }
}

/// Render an amount for a text input (`500000.0` -> `"500000"`).
pub(crate) fn number_text(value: Option<f64>) -> String {
    match value {
        // `Display` already drops a zero fraction and never saturates.
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn id_text(id: Option<u64>) -> String {
    id.filter(|v| *v > 0).map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_their_shape() {
        assert_eq!(number_value("42"), json!(42));
        assert_eq!(number_value(" 99.5 "), json!(99.5));
        assert_eq!(number_value("1500.00"), json!(1500));
        assert_eq!(number_value("abc"), json!("abc"));
        assert_eq!(optional_number_value(""), Value::Null);
        assert_eq!(number_text(Some(500000.0)), "500000");
        assert_eq!(number_text(Some(12.25)), "12.25");
        assert_eq!(number_text(Some(f64::NAN)), "");
        assert_eq!(id_text(Some(7)), "7");
        assert_eq!(id_text(Some(0)), "");
    }

    #[test]
    fn large_amounts_round_trip() {
        let huge = 1e20;
        let text = number_text(Some(huge));
        assert_eq!(text, "100000000000000000000");
        assert_eq!(number_value(&text).as_f64(), Some(huge));
    }
}
