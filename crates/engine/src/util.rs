//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! name normalization so every service compares names the same way.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ErrorCode, ResultEngine};

/// Trim and NFC-normalize a required name; blank names are rejected.
pub(crate) fn normalize_required_name(value: &str, field: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::invalid_input(field, "must not be blank"));
    }
    Ok(normalized)
}

/// Like [`normalize_required_name`], but reports `INVALID_USERNAME`.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return Err(EngineError::Invalid {
            code: ErrorCode::InvalidUsername,
            message: format!("invalid username: {value:?}"),
            args: vec![value.to_string()],
        });
    }
    Ok(normalized)
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_composed() {
        let decomposed = "Cafe\u{301}";
        assert_eq!(
            normalize_required_name(&format!("  {decomposed} "), "name").unwrap(),
            "Caf\u{e9}"
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = normalize_required_name("   ", "name").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn usernames_cannot_contain_spaces() {
        assert_eq!(normalize_username(" bob ").unwrap(), "bob");
        let err = normalize_username("bo b").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidUsername);
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" fresh ")), Some("fresh".to_string()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
