use std::collections::HashMap;

use chrono::{Duration, Utc};

use crate::model::{Category, Insight, InsightType, PatternEntry, StoredError};

const RECENT_WINDOW_MINUTES: i64 = 60;

/// Re-derives the full insight set from the current store snapshot. Called
/// on every ingest; the caller replaces the insight list wholesale with
/// the top 5 by confidence, per spec.
pub fn generate(errors: &[StoredError], patterns: &HashMap<String, PatternEntry>) -> Vec<Insight> {
    let mut candidates = Vec::new();
    let now = Utc::now();
    let window_start = now - Duration::minutes(RECENT_WINDOW_MINUTES);

    for (pattern, entry) in patterns {
        if entry.count > 5 && entry.server_set.len() > 1 {
            let confidence = (60 + 2 * entry.count).min(95) as u8;
            candidates.push(Insight {
                kind: InsightType::Pattern,
                title: "Cross-server error pattern detected".to_string(),
                description: format!(
                    "\"{}\" has occurred {} times across {} servers",
                    pattern,
                    entry.count,
                    entry.server_set.len()
                ),
                confidence,
                pattern: Some(pattern.clone()),
            });
        }
    }

    let recent: Vec<&StoredError> = errors.iter().filter(|e| e.last_seen >= window_start).collect();
    if recent.len() > 10 {
        let mut by_category: HashMap<Category, usize> = HashMap::new();
        for error in &recent {
            *by_category.entry(error.category).or_insert(0) += 1;
        }
        if let Some((category, count)) = by_category.into_iter().max_by_key(|(_, count)| *count) {
            if count > 3 {
                let share = (count as f64 / recent.len() as f64) * 100.0;
                candidates.push(Insight {
                    kind: InsightType::Anomaly,
                    title: format!("Anomalous concentration of {category} errors"),
                    description: format!(
                        "{count} of the last {total} errors ({share:.0}%) are {category}",
                        total = recent.len()
                    ),
                    confidence: 85,
                    pattern: None,
                });
            }
        }
    }

    let db_count = errors
        .iter()
        .filter(|e| e.category == Category::DatabaseConnectivity)
        .count();
    if db_count > 3 {
        candidates.push(Insight {
            kind: InsightType::Recommendation,
            title: "Investigate database connectivity".to_string(),
            description: format!(
                "{db_count} stored errors are categorized as Database Connectivity; consider checking connection pool sizing and upstream database health"
            ),
            confidence: 78,
            pattern: None,
        });
    }

    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    candidates.truncate(5);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use uuid::Uuid;

    use crate::model::{Severity, Trend};

    fn sample_error(server_id: &str, category: Category) -> StoredError {
        let now = Utc::now();
        StoredError {
            id: Uuid::new_v4(),
            server_id: server_id.to_string(),
            server_name: server_id.to_string(),
            log_file: "/var/log/app.log".to_string(),
            line_number: 1,
            timestamp: now,
            error_message: "Database connection failed".to_string(),
            parser: pulseguard_protocol::ParserKind::Generic,
            urgency: 9,
            semantics: pulseguard_protocol::Semantics::default(),
            severity: Severity::High,
            category,
            count: 1,
            first_seen: now,
            last_seen: now,
            trend: Trend::Stable,
        }
    }

    #[test]
    fn pattern_insight_requires_multiple_servers() {
        let mut patterns = HashMap::new();
        let mut single_server = HashSet::new();
        single_server.insert("agent-a".to_string());
        patterns.insert(
            "database connection failed".to_string(),
            PatternEntry {
                count: 12,
                server_set: single_server,
                last_seen: Utc::now(),
            },
        );
        let insights = generate(&[], &patterns);
        assert!(insights.is_empty());
    }

    #[test]
    fn pattern_insight_fires_across_servers() {
        let mut patterns = HashMap::new();
        let mut servers = HashSet::new();
        servers.insert("agent-a".to_string());
        servers.insert("agent-b".to_string());
        patterns.insert(
            "database connection failed".to_string(),
            PatternEntry {
                count: 12,
                server_set: servers,
                last_seen: Utc::now(),
            },
        );
        let insights = generate(&[], &patterns);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightType::Pattern);
        assert_eq!(insights[0].confidence, 84);
    }

    #[test]
    fn database_recommendation_needs_more_than_three() {
        let errors: Vec<StoredError> = (0..4)
            .map(|i| sample_error(&format!("agent-{i}"), Category::DatabaseConnectivity))
            .collect();
        let insights = generate(&errors, &HashMap::new());
        assert!(insights.iter().any(|i| i.kind == InsightType::Recommendation));
    }
}
