use crate::model::Severity;

const CRITICAL_KEYWORDS: &[&str] = &["fatal", "critical", "emergency", "panic", "severe"];
const HIGH_KEYWORDS: &[&str] = &["error", "fail", "exception", "timeout", "refused", "denied"];
const MEDIUM_KEYWORDS: &[&str] = &["warn", "warning", "deprecated", "retry"];

/// Severity from the raw message (§4.4), first-match-wins over three
/// keyword tiers, else `Low`. Total over any nonempty string.
pub fn severity_of(message: &str) -> Severity {
    let lower = message.to_ascii_lowercase();
    if CRITICAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Severity::Critical
    } else if HIGH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Severity::High
    } else if MEDIUM_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_beats_generic_error_keyword() {
        assert_eq!(severity_of("Fatal error in worker"), Severity::Critical);
    }

    #[test]
    fn plain_failure_is_high() {
        assert_eq!(severity_of("Database connection failed"), Severity::High);
    }

    #[test]
    fn unmatched_message_is_low() {
        assert_eq!(severity_of("all systems nominal"), Severity::Low);
    }
}
