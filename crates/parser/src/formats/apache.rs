use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;

use crate::level::normalize_level;
use crate::timestamp::parse_timestamp;

use super::Extraction;

static APACHE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[([^\]]+)\] \[(\w+)\] (?:\[pid (\d+)\] )?(?:\[client ([^\]]+)\] )?(.*)$",
    )
    .unwrap()
});

/// Parses apache `error.log` lines:
/// `[Wed Oct 11 14:32:52 2023] [error] [pid 1234] [client 1.2.3.4:5] body`.
/// `pid` and `client` are optional per spec; both land in metadata when
/// present.
pub fn parse(line: &str) -> Option<Extraction> {
    let caps = APACHE_LINE.captures(line)?;
    let mut metadata = HashMap::new();
    if let Some(pid) = caps.get(3) {
        metadata.insert("pid".to_string(), json!(pid.as_str()));
    }
    if let Some(client) = caps.get(4) {
        metadata.insert("client".to_string(), json!(client.as_str()));
    }

    Some(Extraction {
        timestamp: parse_timestamp(&caps[1]),
        level: normalize_level(&caps[2]),
        message: caps[5].trim().to_string(),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::Level;

    #[test]
    fn parses_line_with_pid_and_client() {
        let line = "[Wed Oct 11 14:32:52 2023] [error] [pid 1234] [client 192.168.1.1:4321] File does not exist: /var/www/html/favicon.ico";
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Error);
        assert_eq!(ex.metadata.get("pid").unwrap(), "1234");
        assert_eq!(ex.metadata.get("client").unwrap(), "192.168.1.1:4321");
        assert!(ex.message.starts_with("File does not exist"));
    }

    #[test]
    fn parses_line_without_optional_groups() {
        let line = "[Wed Oct 11 14:32:52 2023] [notice] Apache configuration reloaded";
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Info);
        assert!(ex.metadata.is_empty());
    }
}
