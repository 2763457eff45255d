//! Field validation for drafts.
//!
//! Each rule records at most one message per field; once a field has failed,
//! later rules for the same field are skipped.

use aqargo_shared::FieldErrors;
use aqargo_shared::date;

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Saudi mobile numbers: `05XXXXXXXX`, `5XXXXXXXX`, `9665XXXXXXXX` or
/// `+9665XXXXXXXX`. Spaces and dashes are ignored.
pub fn is_valid_saudi_phone(value: &str) -> bool {
    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let rest = digits
        .strip_prefix("+966")
        .or_else(|| digits.strip_prefix("966"))
        .or_else(|| digits.strip_prefix('0'))
        .unwrap_or(&digits);
    rest.len() == 9 && rest.starts_with('5') && rest.chars().all(|c| c.is_ascii_digit())
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn failed(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.add(field, message);
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if !self.failed(field) && value.trim().is_empty() {
            self.fail(field, "This field is required");
        }
        self
    }

    /// Required numeric value `> 0`.
    pub fn positive(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !parse_number(value).is_some_and(|v| v > 0.0) {
            self.fail(field, "Must be a number greater than zero");
        }
        self
    }

    /// Required numeric value `>= 0`.
    pub fn non_negative(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !parse_number(value).is_some_and(|v| v >= 0.0) {
            self.fail(field, "Must be a number of zero or more");
        }
        self
    }

    /// Optional whole number `> 0`; empty passes.
    pub fn optional_positive_integer(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if !self.failed(field)
            && !value.is_empty()
            && !value.parse::<u64>().is_ok_and(|v| v > 0)
        {
            self.fail(field, "Must be a whole number greater than zero");
        }
        self
    }

    /// Required whole number `> 0`.
    pub fn positive_integer(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        self.optional_positive_integer(field, value)
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !is_valid_email(value) {
            self.fail(field, "Enter a valid email address");
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !is_valid_saudi_phone(value) {
            self.fail(field, "Enter a valid Saudi mobile number");
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if !self.failed(field) && value.trim().chars().count() > max {
            self.fail(field, format!("Must be at most {} characters", max));
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if !self.failed(field) && value.chars().count() < min {
            self.fail(field, format!("Must be at least {} characters", min));
        }
        self
    }

    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !self.failed(field) && !allowed.contains(&value.trim()) {
            self.fail(field, format!("Must be one of: {}", allowed.join(", ")));
        }
        self
    }

    pub fn matches(&mut self, field: &str, value: &str, other: &str) -> &mut Self {
        if !self.failed(field) && value != other {
            self.fail(field, "Values do not match");
        }
        self
    }

    /// Required `YYYY-MM-DD` (or any server date shape).
    pub fn date(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && date::parse_date(value).is_none() {
            self.fail(field, "Enter a valid date");
        }
        self
    }

    /// `end` must be strictly after `start`. Only checked when both parse;
    /// the error lands on the end field.
    pub fn date_after(&mut self, end_field: &str, end: &str, start: &str) -> &mut Self {
        if !self.failed(end_field) && date::is_after(end, start) == Some(false) {
            self.fail(end_field, "End date must be after the start date");
        }
        self
    }

    /// Referenced entity ids (`property_id`, `plan_id`, ...).
    pub fn reference(&mut self, field: &str, value: &str) -> &mut Self {
        self.required(field, value);
        if !self.failed(field) && !value.trim().parse::<u64>().is_ok_and(|v| v > 0) {
            self.fail(field, "Select an item from the list");
        }
        self
    }

    pub fn finish(&mut self) -> FieldErrors {
        std::mem::take(&mut self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_per_field_wins() {
        let errors = Validator::new()
            .required("name", "  ")
            .max_len("name", "  ", 3)
            .positive("price", "abc")
            .non_negative("fee", "0")
            .finish();
        assert_eq!(errors.get("name"), Some("This field is required"));
        assert_eq!(errors.get("price"), Some("Must be a number greater than zero"));
        assert!(!errors.contains("fee"));
    }

    #[test]
    fn date_range_is_exclusive() {
        let same_day = Validator::new()
            .date("start_date", "2024-01-01")
            .date("end_date", "2024-01-01")
            .date_after("end_date", "2024-01-01", "2024-01-01")
            .finish();
        assert!(same_day.contains("end_date"));
        assert!(!same_day.contains("start_date"));

        let reversed = Validator::new()
            .date_after("end_date", "2024-01-01", "2024-02-01")
            .finish();
        assert!(reversed.contains("end_date"));

        let unparsed_start = Validator::new()
            .date_after("end_date", "2024-01-01", "")
            .finish();
        assert!(unparsed_start.is_empty());
    }

    #[test]
    fn emails_and_phones() {
        assert!(is_valid_email("admin@aqargo.sa"));
        assert!(!is_valid_email("admin@aqargo"));
        assert!(!is_valid_email("ad min@aqargo.sa"));
        assert!(!is_valid_email("@aqargo.sa"));

        for ok in ["0551234567", "+966551234567", "966 55 123 4567", "551234567"] {
            assert!(is_valid_saudi_phone(ok), "{ok}");
        }
        for bad in ["0451234567", "05512345", "abc", ""] {
            assert!(!is_valid_saudi_phone(bad), "{bad}");
        }
    }

    #[test]
    fn integers_and_references() {
        let errors = Validator::new()
            .optional_positive_integer("days", "")
            .optional_positive_integer("weeks", "1.5")
            .reference("plan_id", "0")
            .reference("property_id", "42")
            .one_of("type", "weekly", &["monthly", "yearly"])
            .finish();
        assert!(!errors.contains("days"));
        assert!(errors.contains("weeks"));
        assert!(errors.contains("plan_id"));
        assert!(!errors.contains("property_id"));
        assert_eq!(errors.get("type"), Some("Must be one of: monthly, yearly"));
    }
}
