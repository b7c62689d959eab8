use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;

use crate::level::detect_level_from_content;
use crate::timestamp::parse_timestamp;

use super::Extraction;

/// Used both here and by the auto-detect dispatcher to recognize syslog's
/// `Mon DD HH:MM:SS host proc` prefix.
pub static PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2} \S+ \S+").unwrap());

static SYSLOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w{3}\s+\d{1,2} \d{2}:\d{2}:\d{2}) (\S+) ([^:\[]+)(?:\[(\d+)\])?: (.*)$").unwrap()
});

/// Parses a syslog-prefixed line: `Jan  2 15:04:05 host sshd[1234]: body`.
/// Syslog carries no level token, so the level is inferred from the body
/// via [`crate::level::detect_level_from_content`].
pub fn parse(line: &str) -> Option<Extraction> {
    let caps = SYSLOG_LINE.captures(line)?;
    let body = caps[5].trim().to_string();

    let mut metadata = HashMap::new();
    metadata.insert("hostname".to_string(), json!(caps[2].to_string()));
    metadata.insert("service".to_string(), json!(caps[3].trim().to_string()));
    if let Some(pid) = caps.get(4) {
        metadata.insert("pid".to_string(), json!(pid.as_str()));
    }

    Some(Extraction {
        timestamp: parse_timestamp(&caps[1]),
        level: detect_level_from_content(&body),
        message: body,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::Level;

    #[test]
    fn parses_service_and_pid() {
        let line = "Jan  2 15:04:05 myhost sshd[1234]: Failed password for invalid user admin";
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Error);
        assert_eq!(ex.metadata.get("service").unwrap(), "sshd");
        assert_eq!(ex.metadata.get("pid").unwrap(), "1234");
    }

    #[test]
    fn parses_service_without_pid() {
        let line = "Jan  2 15:04:05 myhost systemd: Starting periodic cleanup";
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Info);
        assert_eq!(ex.metadata.get("service").unwrap(), "systemd");
        assert!(!ex.metadata.contains_key("pid"));
    }
}
