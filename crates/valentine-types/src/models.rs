use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted Valentine request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub sender_name: String,
    pub recipient_name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
    pub gift: String,
    pub theme: String,
    pub music: String,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            id: self.id,
            sender_name: self.sender_name.clone(),
            recipient_name: self.recipient_name.clone(),
            accepted: self.accepted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The slice of a request the status screen reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub id: Uuid,
    pub sender_name: String,
    pub recipient_name: String,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Request> for StatusSnapshot {
    fn from(request: Request) -> Self {
        Self {
            id: request.id,
            sender_name: request.sender_name,
            recipient_name: request.recipient_name,
            accepted: request.accepted,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// True when a required text field carries no visible content.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
