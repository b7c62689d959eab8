use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pulseguard_protocol::{AgentMessage, RegisterData};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, info, warn};

use crate::config::AgentConfig;

/// Owns the agent's single persistent link to the server: connect, send
/// `register`, then forward whatever the pipeline pushes onto
/// `outbound_rx` until the transport breaks, at which point it reconnects
/// with exponential backoff. Runs until `outbound_rx` closes (agent
/// shutdown) or `max_attempts` is exhausted.
///
/// Framing is newline-delimited JSON over a plain TCP socket —
/// `tokio_util::codec::{FramedRead, FramedWrite, LinesCodec}` — the same
/// pattern the corpus's log-streaming client uses, chosen here because the
/// agent is a plain binary with no need for an HTTP upgrade handshake.
pub async fn run(config: AgentConfig, register: RegisterData, mut outbound_rx: mpsc::Receiver<AgentMessage>) {
    let mut attempt: u32 = 0;

    loop {
        if config.max_attempts >= 0 && attempt as i64 >= config.max_attempts {
            warn!(attempt, "exhausted max reconnect attempts, giving up");
            return;
        }

        match TcpStream::connect((config.server_host.as_str(), config.server_port)).await {
            Ok(stream) => {
                info!(attempt, "connected to server");
                attempt = 0;

                let (read_half, write_half) = stream.into_split();
                let mut writer = FramedWrite::new(write_half, LinesCodec::new());
                let mut reader = FramedRead::new(read_half, LinesCodec::new());

                if !send_frame(&mut writer, &AgentMessage::Register(register.clone())).await {
                    continue;
                }

                loop {
                    tokio::select! {
                        outbound = outbound_rx.recv() => {
                            match outbound {
                                Some(message) => {
                                    if !send_frame(&mut writer, &message).await {
                                        break;
                                    }
                                }
                                None => {
                                    debug!("outbound channel closed, shutting down connection task");
                                    return;
                                }
                            }
                        }
                        inbound = reader.next() => {
                            match inbound {
                                None | Some(Err(_)) => {
                                    warn!("server transport closed, will reconnect");
                                    break;
                                }
                                Some(Ok(_line)) => {
                                    // The server never pushes frames to agents today; ignore.
                                }
                            }
                        }
                    }
                }
            }
            Err(err) => {
                warn!(attempt, error = %err, "failed to connect to server");
            }
        }

        attempt += 1;
        // delay = min(baseDelay * 2^(attempt-1), cap)
        let exponent = attempt.saturating_sub(1).min(20);
        let delay_ms = config
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(config.backoff_cap_secs * 1000);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

async fn send_frame<W>(writer: &mut FramedWrite<W, LinesCodec>, message: &AgentMessage) -> bool
where
    W: tokio::io::AsyncWrite + Unpin,
{
    match serde_json::to_string(message) {
        Ok(json) => match writer.send(json).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "send to server failed, dropping frame");
                false
            }
        },
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound frame");
            true
        }
    }
}
