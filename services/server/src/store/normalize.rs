use once_cell::sync::Lazy;
use regex::Regex;

static ISO_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d{3})?Z?").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());
static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}").unwrap()
});

/// Turns a raw error message into the dedup/pattern key: lowercase, trim,
/// then fold out the volatile bits (timestamps, bare integers, UUIDs) that
/// would otherwise make every occurrence of "the same" error look unique.
/// Idempotent: `normalize(normalize(m)) == normalize(m)`, since the
/// substituted tokens (`TIMESTAMP`, `NUMBER`, `UUID`) never match their own
/// source patterns again, and UUIDs are substituted before bare integers so
/// a UUID's digit runs aren't partially eaten by the integer pass first.
pub fn normalize(message: &str) -> String {
    let lower = message.to_ascii_lowercase().trim().to_string();
    let step1 = ISO_TIMESTAMP.replace_all(&lower, "TIMESTAMP");
    let step2 = UUID_RE.replace_all(&step1, "UUID");
    let step3 = INTEGER.replace_all(&step2, "NUMBER");
    step3.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_timestamps_numbers_and_uuids() {
        let msg = "Request 42 failed at 2025-08-01T10:30:15Z for user 550e8400-e29b-41d4-a716-446655440000";
        let normalized = normalize(msg);
        assert!(normalized.contains("TIMESTAMP"));
        assert!(normalized.contains("NUMBER"));
        assert!(normalized.contains("UUID"));
        assert!(!normalized.contains("42"));
    }

    #[test]
    fn is_idempotent() {
        let msg = "Connection 7 dropped at 2025-08-01 10:30:15";
        let once = normalize(msg);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(normalize("  Database Error  "), normalize("database error"));
    }
}
