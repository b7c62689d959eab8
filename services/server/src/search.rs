use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Category, Severity, StoredError, Trend};

static SERVER_CUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)server[- ]?(\w+)").unwrap());

struct Filters {
    severity: Option<Severity>,
    category: Option<Category>,
    message_contains: Option<&'static str>,
    trends: Option<&'static [Trend]>,
    server_token: Option<String>,
}

impl Filters {
    fn is_empty(&self) -> bool {
        self.severity.is_none()
            && self.category.is_none()
            && self.message_contains.is_none()
            && self.trends.is_none()
            && self.server_token.is_none()
    }

    fn matches(&self, error: &StoredError) -> bool {
        if let Some(severity) = self.severity {
            if error.severity != severity {
                return false;
            }
        }
        if let Some(category) = self.category {
            if error.category != category {
                return false;
            }
        }
        if let Some(needle) = self.message_contains {
            if !error.error_message.to_ascii_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(trends) = self.trends {
            if !trends.contains(&error.trend) {
                return false;
            }
        }
        if let Some(token) = &self.server_token {
            let token_lower = token.to_ascii_lowercase();
            let server_id_matches = error.server_id.to_ascii_lowercase().contains(&token_lower);
            let server_name_matches = error.server_name.to_ascii_lowercase().contains(&token_lower);
            if !(server_id_matches || server_name_matches) {
                return false;
            }
        }
        true
    }
}

/// Builds a filter chain from cue tokens in free-text `q`, per §4.7.
fn build_filters(q_lower: &str) -> Filters {
    let severity = if q_lower.contains("critical") || q_lower.contains("urgent") {
        Some(Severity::Critical)
    } else {
        None
    };
    let category = if q_lower.contains("database") || q_lower.contains("db") {
        Some(Category::DatabaseConnectivity)
    } else {
        None
    };
    let message_contains = if q_lower.contains("timeout") {
        Some("timeout")
    } else {
        None
    };
    let trends: Option<&'static [Trend]> = if q_lower.contains("new") || q_lower.contains("recent") {
        Some(&[Trend::New, Trend::Increasing])
    } else {
        None
    };
    let server_token = SERVER_CUE.captures(q_lower).map(|c| c[1].to_string());

    Filters {
        severity,
        category,
        message_contains,
        trends,
        server_token,
    }
}

/// Runs the cue-based filter chain, falling back to a plain substring
/// search over `errorMessage | serverName | category` only when no cue
/// matched at all. A query that matches a cue but also carries unrelated
/// text (e.g. "database random-token") still only applies the cue filter —
/// this is a documented ambiguity in the source, preserved here.
pub fn search(errors: &[StoredError], q: &str, limit: usize) -> Vec<StoredError> {
    let limit = limit.min(100);
    if q.trim().is_empty() {
        return errors.iter().take(50).cloned().collect();
    }

    let q_lower = q.to_ascii_lowercase();
    let filters = build_filters(&q_lower);

    let results: Vec<StoredError> = if filters.is_empty() {
        errors
            .iter()
            .filter(|e| {
                e.error_message.to_ascii_lowercase().contains(&q_lower)
                    || e.server_name.to_ascii_lowercase().contains(&q_lower)
                    || e.category.as_str().to_ascii_lowercase().contains(&q_lower)
            })
            .cloned()
            .collect()
    } else {
        errors.iter().filter(|e| filters.matches(e)).cloned().collect()
    };

    results.into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make(message: &str, severity: Severity, category: Category, server_name: &str) -> StoredError {
        let now = Utc::now();
        StoredError {
            id: Uuid::new_v4(),
            server_id: server_name.to_string(),
            server_name: server_name.to_string(),
            log_file: "/var/log/app.log".to_string(),
            line_number: 1,
            timestamp: now,
            error_message: message.to_string(),
            parser: pulseguard_protocol::ParserKind::Generic,
            urgency: 9,
            semantics: pulseguard_protocol::Semantics::default(),
            severity,
            category,
            count: 1,
            first_seen: now,
            last_seen: now,
            trend: Trend::Stable,
        }
    }

    #[test]
    fn critical_database_cue_filters_conjunctively() {
        let errors = vec![
            make(
                "Database connection lost",
                Severity::Critical,
                Category::DatabaseConnectivity,
                "agent-a",
            ),
            make(
                "Invalid credentials supplied",
                Severity::Low,
                Category::Authentication,
                "agent-b",
            ),
        ];
        let results = search(&errors, "critical database", 100);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].server_name, "agent-a");
    }

    #[test]
    fn unmatched_cue_falls_back_to_text_search() {
        let errors = vec![make(
            "Disk space critically low on volume",
            Severity::Low,
            Category::FileSystem,
            "agent-c",
        )];
        let results = search(&errors, "volume", 100);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn cue_match_ignores_trailing_unrelated_token() {
        let errors = vec![
            make("Database pool exhausted", Severity::High, Category::DatabaseConnectivity, "agent-a"),
            make("Unrelated auth failure", Severity::High, Category::Authentication, "agent-b"),
        ];
        let results = search(&errors, "database random-token", 100);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, Category::DatabaseConnectivity);
    }
}
