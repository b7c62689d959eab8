use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parses a timestamp in any of the formats the source's five log families
/// emit. Anything unparseable yields "now" rather than an error — timestamp
/// parsing is never allowed to abort event construction.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Utc::now();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }

    // nginx: YYYY/MM/DD HH:MM:SS
    let slashes_to_dashes = raw.replacen('/', "-", 2);
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&slashes_to_dashes, fmt) {
            return Utc.from_utc_datetime(&naive);
        }
    }

    // apache combined-log form: 10/Oct/2023:13:55:36 +0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%d/%b/%Y:%H:%M:%S %z") {
        return dt.with_timezone(&Utc);
    }

    // apache error-log form: Wed Oct 11 14:32:52 2023
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %Y") {
        return Utc.from_utc_datetime(&naive);
    }

    // bare syslog: "Jan  2 15:04:05" — no year, assume current.
    let current_year = Utc::now().format("%Y").to_string();
    let with_year = format!("{} {}", current_year, raw);
    for fmt in ["%Y %b %e %H:%M:%S", "%Y %b %d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&with_year, fmt) {
            return Utc.from_utc_datetime(&naive);
        }
    }

    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2025-08-01T10:30:15Z");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-08-01 10:30:15");
    }

    #[test]
    fn parses_nginx_style() {
        let dt = parse_timestamp("2023/10/10 13:55:36");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-10-10 13:55:36");
    }

    #[test]
    fn parses_apache_long_form() {
        let dt = parse_timestamp("10/Oct/2023:13:55:36 +0000");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2023-10-10 13:55:36");
    }

    #[test]
    fn falls_back_to_now_on_garbage() {
        let before = Utc::now();
        let dt = parse_timestamp("not a timestamp");
        assert!(dt >= before);
    }
}
