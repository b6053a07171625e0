//! Shape checks applied to inbound identifiers before business logic runs.
//!
//! All pure functions, no side effects; handlers treat a failed check as a
//! malformed request and stop.

use regex::Regex;

/// Basic email-address syntax check.
#[must_use]
pub fn is_email_address(s: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(s))
}

/// Textual UUID format: 8-4-4-4-12 hex groups.
#[must_use]
pub fn is_uuid(s: &str) -> bool {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .map_or(false, |re| re.is_match(s))
}

/// Free-text fields (e.g. display names) must be non-empty, contain no
/// control characters and no residual percent-escapes.
#[must_use]
pub fn is_valid_decoded_str(s: &str) -> bool {
    if s.is_empty() || s.chars().any(char::is_control) {
        return false;
    }
    Regex::new(r"%[0-9a-fA-F]{2}").map_or(false, |re| !re.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_basic_format() {
        assert!(is_email_address("a@example.com"));
        assert!(is_email_address("name.surname@example.co"));
    }

    #[test]
    fn email_rejects_missing_parts() {
        assert!(!is_email_address("not-an-email"));
        assert!(!is_email_address("missing-at.example.com"));
        assert!(!is_email_address("missing-domain@"));
        assert!(!is_email_address("spaces in@example.com"));
    }

    #[test]
    fn uuid_accepts_canonical_form() {
        assert!(is_uuid("3d1f0a36-0d34-4d3a-8ee5-0d5f0a67d001"));
        assert!(is_uuid("3D1F0A36-0D34-4D3A-8EE5-0D5F0A67D001"));
    }

    #[test]
    fn uuid_rejects_other_shapes() {
        assert!(!is_uuid(""));
        assert!(!is_uuid("3d1f0a360d344d3a8ee50d5f0a67d001"));
        assert!(!is_uuid("3d1f0a36-0d34-4d3a-8ee5"));
        assert!(!is_uuid("{3d1f0a36-0d34-4d3a-8ee5-0d5f0a67d001}"));
        assert!(!is_uuid("zd1f0a36-0d34-4d3a-8ee5-0d5f0a67d001"));
    }

    #[test]
    fn decoded_str_accepts_plain_names() {
        assert!(is_valid_decoded_str("Alice Example"));
        assert!(is_valid_decoded_str("José"));
    }

    #[test]
    fn decoded_str_rejects_control_and_escapes() {
        assert!(!is_valid_decoded_str(""));
        assert!(!is_valid_decoded_str("line\nbreak"));
        assert!(!is_valid_decoded_str("null\0byte"));
        assert!(!is_valid_decoded_str("still%20encoded"));
    }
}
