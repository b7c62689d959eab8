use once_cell::sync::Lazy;
use pulseguard_protocol::ParserKind;
use regex::Regex;
use std::collections::HashMap;

use super::Extraction;
use crate::level::{detect_level_from_content, normalize_level};
use crate::timestamp::parse_timestamp;

const LEVEL_TOKEN: &str = r"(?i:ERROR|ERR|E|FATAL|CRITICAL|CRIT|WARNING|WARN|W|NOTICE|LOG|INFO|INFORMATION|TRACE|VERBOSE|DEBUG)";

static BRACKETED_TS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\[([^\]]+)\]\s*({})[:\s]+(.*)$", LEVEL_TOKEN)).unwrap()
});
static ISO_TS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(\d{{4}}-\d{{2}}-\d{{2}}[T ]\d{{2}}:\d{{2}}:\d{{2}}(?:\.\d+)?(?:Z|[+-]\d{{2}}:?\d{{2}})?)\s+({})[:\s]*(.*)$",
        LEVEL_TOKEN
    ))
    .unwrap()
});
static LEVEL_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({})[:\s]+(.*)$", LEVEL_TOKEN)).unwrap());

/// Generic line parsing: tries three increasingly loose patterns, then
/// falls back to pure keyword-based level inference over the whole line.
/// The fallback arm always matches, so this function never returns a
/// "no match" signal — the caller just checks which `ParserKind` came back.
pub fn parse(line: &str) -> (ParserKind, Extraction) {
    if let Some(caps) = BRACKETED_TS.captures(line) {
        let level = normalize_level(&caps[2]);
        return (
            ParserKind::Generic,
            Extraction {
                timestamp: parse_timestamp(&caps[1]),
                level,
                message: caps[3].trim().to_string(),
                metadata: HashMap::new(),
            },
        );
    }

    if let Some(caps) = ISO_TS.captures(line) {
        let level = normalize_level(&caps[2]);
        return (
            ParserKind::Generic,
            Extraction {
                timestamp: parse_timestamp(&caps[1]),
                level,
                message: caps[3].trim().to_string(),
                metadata: HashMap::new(),
            },
        );
    }

    if let Some(caps) = LEVEL_ONLY.captures(line) {
        let level = normalize_level(&caps[1]);
        return (
            ParserKind::Generic,
            Extraction {
                timestamp: parse_timestamp(""),
                level,
                message: caps[2].trim().to_string(),
                metadata: HashMap::new(),
            },
        );
    }

    (
        ParserKind::Fallback,
        Extraction {
            timestamp: parse_timestamp(""),
            level: detect_level_from_content(line),
            message: line.trim().to_string(),
            metadata: HashMap::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::Level;

    #[test]
    fn bracketed_timestamp_form() {
        let (kind, ex) = parse("[2025-08-01 10:30:15] ERROR: Database connection failed");
        assert_eq!(kind, ParserKind::Generic);
        assert_eq!(ex.level, Level::Error);
        assert_eq!(ex.message, "Database connection failed");
    }

    #[test]
    fn level_only_form() {
        let (kind, ex) = parse("CRITICAL: Authentication system failed");
        assert_eq!(kind, ParserKind::Generic);
        assert_eq!(ex.level, Level::Error);
        assert_eq!(ex.message, "Authentication system failed");
    }

    #[test]
    fn unmatched_line_falls_back() {
        let (kind, ex) = parse("something completely unstructured happened here");
        assert_eq!(kind, ParserKind::Fallback);
        assert_eq!(ex.level, Level::Info);
    }
}
