//! Ingestion Hub (C5): accepts agent transports and dispatches each
//! `{type, data}` frame to the store, broadcasting deltas to dashboard
//! subscribers as it goes.

use std::sync::Arc;

use actix::Addr;
use futures::StreamExt;
use pulseguard_protocol::{AgentMessage, DashboardFrame};
use tokio::net::TcpListener;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{info, warn};
use uuid::Uuid;

use crate::broadcast::{Broadcaster, Publish};
use crate::store::MemoryStore;

pub async fn run(listener: TcpListener, store: Arc<MemoryStore>, broadcaster: Addr<Broadcaster>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                info!(%peer, "agent connected");
                let store = store.clone();
                let broadcaster = broadcaster.clone();
                tokio::spawn(async move {
                    handle_connection(stream, store, broadcaster).await;
                });
            }
            Err(err) => {
                warn!(error = %err, "failed to accept agent connection");
            }
        }
    }
}

async fn handle_connection(stream: tokio::net::TcpStream, store: Arc<MemoryStore>, broadcaster: Addr<Broadcaster>) {
    let connection_id = Uuid::new_v4();
    let mut reader = FramedRead::new(stream, LinesCodec::new());

    while let Some(frame) = reader.next().await {
        let line = match frame {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "agent transport read error");
                break;
            }
        };

        let message: AgentMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(err) => {
                // §7: malformed agent message is logged and ignored, never
                // a reason to drop the connection.
                warn!(error = %err, "malformed agent message, ignoring");
                continue;
            }
        };

        match message {
            AgentMessage::Register(data) => {
                store
                    .register_agent(
                        connection_id,
                        data.server_id.clone(),
                        data.server_name.clone(),
                        data.platform,
                        data.log_files,
                    )
                    .await;
                broadcast_servers(&store, &broadcaster).await;
            }
            AgentMessage::Error(data) => {
                store.record_error_seen(&data.server_id).await;
                let stored = store.add_error(&data).await;
                let recent = store.recent_errors(50).await;
                let insights = store.insights().await;

                broadcaster.do_send(Publish(DashboardFrame::NewError(
                    serde_json::to_value(&stored).unwrap_or_default(),
                )));
                broadcaster.do_send(Publish(DashboardFrame::Errors(
                    serde_json::to_value(&recent).unwrap_or_default(),
                )));
                broadcaster.do_send(Publish(DashboardFrame::Insights(
                    serde_json::to_value(&insights).unwrap_or_default(),
                )));
            }
            AgentMessage::Stats(data) => {
                store
                    .apply_stats(&data.server_id, data.stats.errors, data.stats.warnings, data.stats.success)
                    .await;
                broadcast_servers(&store, &broadcaster).await;
            }
        }
    }

    if let Some(server_id) = store.disconnect(connection_id).await {
        info!(server_id = %server_id, "agent disconnected, marked offline");
        broadcast_servers(&store, &broadcaster).await;
    }
}

async fn broadcast_servers(store: &Arc<MemoryStore>, broadcaster: &Addr<Broadcaster>) {
    let agents = store.list_agents().await;
    broadcaster.do_send(Publish(DashboardFrame::Servers(
        serde_json::to_value(&agents).unwrap_or_default(),
    )));
}
