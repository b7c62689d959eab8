use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;

use crate::level::normalize_level;
use crate::timestamp::parse_timestamp;

use super::Extraction;

static NGINX_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}) \[(\w+)\] (\d+)#(\d+): (?:\*\d+ )?(.*)$")
        .unwrap()
});

/// Parses `error.log`-style nginx lines:
/// `2023/10/10 13:55:36 [error] 12345#0: *1 connection refused ...`.
/// Returns `None` on mismatch so the caller falls through to generic.
pub fn parse(line: &str) -> Option<Extraction> {
    let caps = NGINX_LINE.captures(line)?;
    let mut metadata = HashMap::new();
    metadata.insert("pid".to_string(), json!(caps[3].to_string()));
    metadata.insert("tid".to_string(), json!(caps[4].to_string()));

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
    fn parses_connection_refused_line() {
        let line = "2023/10/10 13:55:36 [error] 12345#0: *1 connect() failed (111: Connection refused) while connecting to upstream";
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Error);
        assert!(ex.message.starts_with("connect() failed"));
        assert_eq!(ex.metadata.get("pid").unwrap(), "12345");
    }

    #[test]
    fn non_nginx_line_falls_through() {
        assert!(parse("not an nginx line at all").is_none());
    }
}
