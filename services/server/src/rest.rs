//! Dashboard REST surface (C6, poll half): purely read-only JSON, per §6.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::store::MemoryStore;

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub started_at: Instant,
}

#[derive(Debug, Deserialize)]
pub struct ErrorsQuery {
    pub limit: Option<usize>,
    pub q: Option<String>,
}

pub async fn get_servers(state: web::Data<AppState>) -> HttpResponse {
    let agents = state.store.list_agents().await;
    HttpResponse::Ok().json(agents)
}

pub async fn get_errors(state: web::Data<AppState>, query: web::Query<ErrorsQuery>) -> HttpResponse {
    let limit = query.limit.unwrap_or(50).min(100);
    let errors = match &query.q {
        Some(q) if !q.is_empty() => state.store.search(q, limit).await,
        _ => state.store.recent_errors(limit).await,
    };
    HttpResponse::Ok().json(errors)
}

pub async fn get_stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.store.summary_stats().await)
}

pub async fn get_insights(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.store.insights().await)
}

pub async fn get_health(state: web::Data<AppState>) -> HttpResponse {
    let summary = state.store.summary_stats().await;
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "memoryBytes": resident_memory_bytes(),
        "servers": summary.total_servers,
        "errors": state.store.error_count().await,
    }))
}

fn resident_memory_bytes() -> u64 {
    std::fs::read_to_string("/proc/self/statm")
        .ok()
        .and_then(|s| s.split_whitespace().nth(1).map(str::to_string))
        .and_then(|pages| pages.parse::<u64>().ok())
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    fn test_state() -> web::Data<AppState> {
        web::Data::new(AppState {
            store: Arc::new(MemoryStore::new(1000)),
            started_at: Instant::now(),
        })
    }

    #[actix_web::test]
    async fn health_reports_ok_status() {
        let state = test_state();
        let app = test::init_service(App::new().app_data(state).route("/api/health", web::get().to(get_health))).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn errors_endpoint_defaults_limit_to_fifty() {
        let state = test_state();
        let app = test::init_service(App::new().app_data(state).route("/api/errors", web::get().to(get_errors))).await;
        let req = test::TestRequest::get().uri("/api/errors").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
