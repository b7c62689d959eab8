use pulseguard_protocol::Level;

/// Normalizes a raw level token (`"ERR"`, `"warning"`, `"CRIT"`, ...) into
/// the closed `Level` set. Unknown tokens fold to `Info` — the data model
/// keeps `level` a closed enum, so "pass through uppercased" from the
/// source becomes "treat as INFO-equivalent" here, matching the spec's own
/// fallback rule for downstream counting.
pub fn normalize_level(raw: &str) -> Level {
    match raw.trim().to_ascii_uppercase().as_str() {
        "E" | "ERR" | "ERROR" | "FATAL" | "CRITICAL" | "CRIT" => Level::Error,
        "W" | "WARN" | "WARNING" => Level::Warn,
        "NOTICE" | "LOG" | "INFO" | "INFORMATION" => Level::Info,
        "TRACE" | "VERBOSE" | "DEBUG" => Level::Debug,
        _ => Level::Info,
    }
}

const ERROR_KEYWORDS: &[&str] = &[
    "error", "exception", "failed", "failure", "timeout", "refused", "denied", "fatal",
    "critical", "panic", "abort",
];

const WARN_KEYWORDS: &[&str] = &["warning", "warn", "deprecated", "retry", "fallback", "slow"];

/// Keyword-based level inference for lines that carry no explicit level
/// token (the generic parser's last-resort arm, and syslog, which never
/// carries a level).
pub fn detect_level_from_content(line: &str) -> Level {
    let lower = line.to_ascii_lowercase();
    if ERROR_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Level::Error
    } else if WARN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Level::Warn
    } else {
        Level::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["ERR", "warning", "CRIT", "notice", "bogus"] {
            let once = normalize_level(raw);
            let twice = normalize_level(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn keyword_detection_prioritizes_error() {
        assert_eq!(detect_level_from_content("connection timeout occurred"), Level::Error);
        assert_eq!(detect_level_from_content("slow query detected"), Level::Warn);
        assert_eq!(detect_level_from_content("request completed"), Level::Info);
    }
}
