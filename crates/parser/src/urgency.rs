use pulseguard_protocol::{Level, Semantics};

fn level_base(level: Level) -> i32 {
    match level {
        Level::Error => 8,
        Level::Warn => 4,
        Level::Info => 1,
        Level::Debug => 0,
    }
}

fn semantic_boost(semantics: &Semantics) -> i32 {
    let mut boost = 0;
    if semantics.has_database {
        boost += 2;
    }
    if semantics.has_network {
        boost += 1;
    }
    if semantics.has_auth {
        boost += 3;
    }
    if semantics.has_security {
        boost += 5;
    }
    if semantics.has_memory {
        boost += 2;
    }
    if semantics.has_status_code {
        boost += 1;
    }
    boost
}

fn keyword_boost(message: &str) -> i32 {
    let lower = message.to_ascii_lowercase();
    let mut boost = 0;
    if lower.contains("critical") || lower.contains("fatal") {
        boost += 3;
    }
    if lower.contains("timeout") {
        boost += 2;
    }
    if lower.contains("failed") || lower.contains("failure") {
        boost += 2;
    }
    boost
}

/// Scores urgency in `[0, 10]` from the normalized level, the semantic
/// feature vector, and a small keyword boost over the message text.
/// Clamped, never negative.
pub fn score_urgency(level: Level, message: &str, semantics: &Semantics) -> u8 {
    let total = level_base(level) + semantic_boost(semantics) + keyword_boost(message);
    total.clamp(0, 10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::extract_semantics;

    #[test]
    fn database_connection_failure_clamps_to_ten() {
        let message = "Database connection failed";
        let semantics = extract_semantics(message);
        let urgency = score_urgency(Level::Error, message, &semantics);
        assert_eq!(urgency, 10);
    }

    #[test]
    fn info_with_no_boosts_is_low() {
        let message = "request completed";
        let semantics = extract_semantics(message);
        let urgency = score_urgency(Level::Info, message, &semantics);
        assert_eq!(urgency, 1);
    }
}
