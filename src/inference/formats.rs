//! String format detection

use once_cell::sync::Lazy;
use regex::Regex;

// Prefix match: anything starting with an ISO date-time counts as a date
static ISO_DATETIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("valid regex"));

static CAMEL_BOUNDARY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z])").expect("valid regex"));

/// Check whether a string starts with an ISO 8601 date-time
pub fn is_iso_datetime(value: &str) -> bool {
    ISO_DATETIME_REGEX.is_match(value)
}

/// Check whether a string is a 24-character hexadecimal identifier
pub fn is_object_id_hex(value: &str) -> bool {
    value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Human-readable description derived from a field name
///
/// `_id` is the document identifier; otherwise snake_case and camelCase are
/// split into words and the result is capitalized.
pub fn describe_field(field_name: &str) -> String {
    if field_name == "_id" {
        return "Unique document identifier".to_string();
    }

    let spaced = CAMEL_BOUNDARY_REGEX.replace_all(field_name, " $1");
    let words = spaced.replace('_', " ");
    capitalize(words.trim())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_datetime() {
        assert!(is_iso_datetime("2024-01-15T10:30:00"));
        assert!(is_iso_datetime("2024-01-15T10:30:00.123Z"));
        assert!(!is_iso_datetime("2024-01-15"));
        assert!(!is_iso_datetime("January 15"));
    }

    #[test]
    fn test_object_id_hex() {
        assert!(is_object_id_hex("507f1f77bcf86cd799439011"));
        assert!(!is_object_id_hex("507f1f77bcf86cd79943901"));
        assert!(!is_object_id_hex("507f1f77bcf86cd79943901z"));
    }

    #[test]
    fn test_describe_field() {
        assert_eq!(describe_field("_id"), "Unique document identifier");
        assert_eq!(describe_field("customer_id"), "Customer id");
        assert_eq!(describe_field("createdAt"), "Created at");
        assert_eq!(describe_field("totalAmountUSD"), "Total amount u s d");
        assert_eq!(describe_field("address.city"), "Address.city");
        assert_eq!(describe_field(""), "");
    }
}
