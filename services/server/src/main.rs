mod broadcast;
mod config;
mod ingest;
mod model;
mod rest;
mod search;
mod store;

use std::sync::Arc;
use std::time::Instant;

use actix::Actor;
use actix_cors::Cors;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use tokio::net::TcpListener;
use tracing::{error, info};

use broadcast::{Broadcaster, DashboardSession};
use config::ServerConfig;
use rest::AppState;
use store::MemoryStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    pulseguard_shared::logging::init_unified_logging(
        "pulseguard-server",
        std::env::var("PULSEGUARD_SERVER_LOG_FILE").ok().as_deref(),
    )?;

    let config = ServerConfig::from_env()?;
    let store = Arc::new(MemoryStore::new(config.max_errors));
    let broadcaster = Broadcaster::default().start();

    let agent_listener = match TcpListener::bind((config.http_host.as_str(), config.agent_tcp_port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, port = config.agent_tcp_port, "failed to bind agent ingestion port");
            return Err(err.into());
        }
    };
    info!(port = config.agent_tcp_port, "agent ingestion listening");
    tokio::spawn(ingest::run(agent_listener, store.clone(), broadcaster.clone()));

    let ws_state = web::Data::new(WsState {
        broadcaster: broadcaster.clone(),
        store: store.clone(),
    });
    let ws_host = config.http_host.clone();
    let ws_port = config.ws_port;
    let ws_server = HttpServer::new(move || {
        App::new()
            .app_data(ws_state.clone())
            .route("/ws", web::get().to(ws_handler))
    })
    .bind((ws_host.as_str(), ws_port))
    .map_err(|err| {
        error!(error = %err, port = ws_port, "failed to bind dashboard push port");
        err
    })?
    .run();
    info!(port = ws_port, "dashboard push listening");
    tokio::spawn(ws_server);

    let app_state = web::Data::new(AppState {
        store: store.clone(),
        started_at: Instant::now(),
    });
    let http_host = config.http_host.clone();
    let http_port = config.http_port;

    info!(host = %http_host, port = http_port, "dashboard REST listening");
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_header(actix_web::http::header::CONTENT_TYPE)
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(pulseguard_shared::logging::correlation::CorrelationId)
            .app_data(app_state.clone())
            .route("/api/servers", web::get().to(rest::get_servers))
            .route("/api/errors", web::get().to(rest::get_errors))
            .route("/api/stats", web::get().to(rest::get_stats))
            .route("/api/insights", web::get().to(rest::get_insights))
            .route("/api/health", web::get().to(rest::get_health))
    })
    .bind((http_host.as_str(), http_port))
    .map_err(|err| {
        error!(error = %err, port = http_port, "failed to bind dashboard REST port");
        err
    })?
    .run()
    .await?;

    Ok(())
}

struct WsState {
    broadcaster: actix::Addr<Broadcaster>,
    store: Arc<MemoryStore>,
}

async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<WsState>,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(DashboardSession::new(state.broadcaster.clone(), state.store.clone()), &req, stream)
}
