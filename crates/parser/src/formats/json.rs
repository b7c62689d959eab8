use std::collections::HashMap;

use crate::level::normalize_level;
use crate::timestamp::parse_timestamp;

use super::Extraction;

/// Parses a JSON log line. Returns `None` on any parse failure or if the
/// object lacks a usable message field — the caller falls through to the
/// generic parser in both cases, per spec.
pub fn parse(line: &str) -> Option<Extraction> {
    let value: serde_json::Value = serde_json::from_str(line.trim()).ok()?;
    let obj = value.as_object()?;

    let timestamp_raw = obj
        .get("timestamp")
        .or_else(|| obj.get("time"))
        .or_else(|| obj.get("@timestamp"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    let level_raw = obj
        .get("level")
        .or_else(|| obj.get("severity"))
        .and_then(|v| v.as_str())
        .unwrap_or("INFO");

    let message = obj
        .get("message")
        .or_else(|| obj.get("msg"))
        .or_else(|| obj.get("text"))
        .and_then(|v| v.as_str())?
        .to_string();

    let mut metadata = HashMap::new();
    for (key, val) in obj {
        if !matches!(
            key.as_str(),
            "timestamp" | "time" | "@timestamp" | "level" | "severity" | "message" | "msg" | "text"
        ) {
            metadata.insert(key.clone(), val.clone());
        }
    }

    Some(Extraction {
        timestamp: parse_timestamp(timestamp_raw),
        level: normalize_level(level_raw),
        message,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulseguard_protocol::Level;

    #[test]
    fn round_trips_the_spec_example() {
        let line = r#"{"timestamp":"2025-08-01T10:30:15Z", "level":"error", "message":"API timeout"}"#;
        let ex = parse(line).unwrap();
        assert_eq!(ex.level, Level::Error);
        assert_eq!(ex.message, "API timeout");
    }

    #[test]
    fn falls_through_on_malformed_json() {
        assert!(parse("{not json").is_none());
    }

    #[test]
    fn preserves_extra_fields_as_metadata() {
        let line = r#"{"message":"ok","service":"billing","traceId":"abc-123"}"#;
        let ex = parse(line).unwrap();
        assert_eq!(ex.metadata.get("service").unwrap(), "billing");
        assert_eq!(ex.metadata.get("traceId").unwrap(), "abc-123");
    }
}
