//! Property-based tests for truncation, escaping, and level parsing

use fanlog::core::format::escape_json_into;
use fanlog::{utf8_truncate, LogLevel};
use proptest::prelude::*;

proptest! {
    /// The truncated prefix always fits, is a prefix, and sits on a
    /// codepoint boundary (guaranteed by the &str return type); it backs
    /// up at most three bytes from the limit.
    #[test]
    fn prop_truncate_fits_on_boundary(s in ".*", max in 0usize..64) {
        let t = utf8_truncate(&s, max);
        prop_assert!(t.len() <= max);
        prop_assert!(s.starts_with(t));
        if s.len() <= max {
            prop_assert_eq!(t, s.as_str());
        } else {
            prop_assert!(max - t.len() < 4);
        }
    }

    /// Escaped output parses as a JSON string value and round-trips to the
    /// original message.
    #[test]
    fn prop_json_escape_roundtrips(s in "[ -~\\n\\r\\t]*") {
        let mut out = Vec::new();
        out.push(b'"');
        escape_json_into(&mut out, &s);
        out.push(b'"');

        let parsed: String = serde_json::from_slice(&out).unwrap();
        prop_assert_eq!(parsed, s);
    }

    /// Multi-byte payloads survive escaping untouched apart from the five
    /// escaped characters.
    #[test]
    fn prop_json_escape_preserves_length_lower_bound(s in ".*") {
        let mut out = Vec::new();
        escape_json_into(&mut out, &s);
        prop_assert!(out.len() >= s.len());
        prop_assert!(out.len() <= s.len() * 2);
    }

    /// Level names round-trip through FromStr.
    #[test]
    fn prop_level_roundtrip(level in prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
        Just(LogLevel::Fatal),
    ]) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(parsed, level);
        prop_assert_eq!(level.to_str().parse::<LogLevel>().unwrap().short_name(), level.short_name());
    }
}

#[test]
fn test_truncate_empty_input() {
    assert_eq!(utf8_truncate("", 16), "");
    assert_eq!(utf8_truncate("abc", 0), "");
}
