use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Request;

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Server confirms the connection is live
    Ready { session_id: Uuid },

    /// Server confirms the set of request ids this connection now follows
    Subscribed { request_ids: Vec<Uuid> },

    /// A stored request changed; carries the full row after the write
    RequestUpdate { request: Request },
}

impl GatewayEvent {
    /// Returns the request id if this event is scoped to a single request.
    /// Events that return `None` are connection-level and always delivered.
    pub fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::RequestUpdate { request } => Some(request.id),
            Self::Ready { .. } | Self::Subscribed { .. } => None,
        }
    }
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Follow changes for these request ids. Replaces any previous set.
    Subscribe { request_ids: Vec<Uuid> },

    /// Stop following these request ids.
    Unsubscribe { request_ids: Vec<Uuid> },
}
