use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use valentine_types::events::GatewayEvent;
use valentine_types::models::Request;

/// Fans out request changes to every connected gateway session.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for gateway events. Every session receives every
    /// event and filters by its own subscription set
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Live sessions: session_id -> subscribed request ids
    sessions: RwLock<HashMap<Uuid, Vec<Uuid>>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected sessions.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    /// Publish the post-write state of a request.
    pub fn request_changed(&self, request: Request) {
        self.broadcast(GatewayEvent::RequestUpdate { request });
    }

    pub async fn session_opened(&self, session_id: Uuid) {
        self.inner.sessions.write().await.insert(session_id, Vec::new());
    }

    pub async fn session_closed(&self, session_id: Uuid) {
        self.inner.sessions.write().await.remove(&session_id);
    }

    /// Record which request ids a session follows, for diagnostics.
    pub async fn set_session_subscriptions(&self, session_id: Uuid, request_ids: Vec<Uuid>) {
        if let Some(ids) = self.inner.sessions.write().await.get_mut(&session_id) {
            *ids = request_ids;
        }
    }

    pub async fn session_count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Number of live sessions following a given request.
    pub async fn watchers(&self, request_id: Uuid) -> usize {
        self.inner
            .sessions
            .read()
            .await
            .values()
            .filter(|ids| ids.contains(&request_id))
            .count()
    }
}
