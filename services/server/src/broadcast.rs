//! Dashboard Broadcast (C6, push half): a typed, best-effort fan-out to
//! every connected dashboard WebSocket subscriber.
//!
//! `actix-web-actors` is declared in the workspace stack but the teacher
//! repo never actually uses it; this is the first consumer, in the idiom
//! its own examples establish — one actor per connection, registered with
//! a hub actor that holds `Recipient` handles for fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use actix::{Actor, Addr, AsyncContext, Context, Handler, Message, Recipient, StreamHandler};
use actix_web_actors::ws;
use pulseguard_protocol::DashboardFrame;
use uuid::Uuid;

use crate::store::MemoryStore;

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct Publish(pub DashboardFrame);

#[derive(Message)]
#[rtype(result = "Uuid")]
struct Subscribe(Recipient<Publish>);

#[derive(Message)]
#[rtype(result = "()")]
struct Unsubscribe(Uuid);

/// Holds one `Recipient` per connected dashboard session and fans out
/// every `Publish` to all of them. Sends are best-effort: a session whose
/// mailbox is gone is simply dropped from the map on its next send
/// failure rather than treated as an error.
#[derive(Default)]
pub struct Broadcaster {
    subscribers: HashMap<Uuid, Recipient<Publish>>,
}

impl Actor for Broadcaster {
    type Context = Context<Self>;
}

impl Handler<Subscribe> for Broadcaster {
    type Result = Uuid;

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Self::Context) -> Uuid {
        let id = Uuid::new_v4();
        self.subscribers.insert(id, msg.0);
        id
    }
}

impl Handler<Unsubscribe> for Broadcaster {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _ctx: &mut Self::Context) {
        self.subscribers.remove(&msg.0);
    }
}

impl Handler<Publish> for Broadcaster {
    type Result = ();

    fn handle(&mut self, msg: Publish, _ctx: &mut Self::Context) {
        // Best-effort fan-out: a send failure means the session's mailbox
        // is gone, which its own `stopped()` hook already reports via
        // `Unsubscribe`, so we don't need to prune here.
        for recipient in self.subscribers.values() {
            let _ = recipient.do_send(msg.clone());
        }
    }
}

/// One actor per connected dashboard WebSocket. Pushes the three initial
/// snapshots (servers, recent-50 errors, insights) on connect, then
/// forwards every subsequent `Publish` from the hub until the socket
/// closes.
pub struct DashboardSession {
    broadcaster: Addr<Broadcaster>,
    store: Arc<MemoryStore>,
    id: Option<Uuid>,
}

impl DashboardSession {
    pub fn new(broadcaster: Addr<Broadcaster>, store: Arc<MemoryStore>) -> Self {
        Self {
            broadcaster,
            store,
            id: None,
        }
    }
}

impl Actor for DashboardSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let recipient = ctx.address().recipient();
        let broadcaster = self.broadcaster.clone();
        let store = self.store.clone();
        let addr = ctx.address();

        actix::spawn(async move {
            let id = broadcaster.send(Subscribe(recipient)).await.unwrap_or_default();

            let servers = serde_json::to_value(store.list_agents().await).unwrap_or_default();
            let errors = serde_json::to_value(store.recent_errors(50).await).unwrap_or_default();
            let insights = serde_json::to_value(store.insights().await).unwrap_or_default();

            addr.do_send(SetSubscriptionId(id));
            addr.do_send(Publish(DashboardFrame::Servers(servers)));
            addr.do_send(Publish(DashboardFrame::Errors(errors)));
            addr.do_send(Publish(DashboardFrame::Insights(insights)));
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(id) = self.id {
            self.broadcaster.do_send(Unsubscribe(id));
        }
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct SetSubscriptionId(Uuid);

impl Handler<SetSubscriptionId> for DashboardSession {
    type Result = ();

    fn handle(&mut self, msg: SetSubscriptionId, _ctx: &mut Self::Context) {
        self.id = Some(msg.0);
    }
}

impl Handler<Publish> for DashboardSession {
    type Result = ();

    fn handle(&mut self, msg: Publish, ctx: &mut Self::Context) {
        if let Ok(json) = serde_json::to_string(&msg.0) {
            ctx.text(json);
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for DashboardSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        // Read-only surface: the dashboard never sends application
        // messages, only the WebSocket handshake and keepalive pings.
        match msg {
            Ok(ws::Message::Ping(payload)) => ctx.pong(&payload),
            Ok(ws::Message::Close(reason)) => ctx.close(reason),
            _ => {}
        }
    }
}
