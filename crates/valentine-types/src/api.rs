use serde::{Deserialize, Serialize};

use crate::models::is_blank;

// -- Requests --

/// Body of `POST /requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRequest {
    pub sender_name: String,
    pub recipient_name: String,
    pub message: String,
    #[serde(default)]
    pub custom_message: Option<String>,
    pub gift: String,
    pub theme: String,
    pub music: String,
    #[serde(default)]
    pub accepted: bool,
}

impl NewRequest {
    /// Names of required fields that are blank, in column order.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("sender_name", &self.sender_name),
            ("recipient_name", &self.recipient_name),
            ("message", &self.message),
            ("gift", &self.gift),
            ("theme", &self.theme),
            ("music", &self.music),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(name, _)| name)
        .collect()
    }

    /// An empty custom message is stored as absent.
    pub fn normalized_custom_message(&self) -> Option<&str> {
        self.custom_message
            .as_deref()
            .filter(|message| !is_blank(message))
    }
}

/// Body of `PATCH /requests/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
}

impl RequestPatch {
    pub fn accept() -> Self {
        Self {
            accepted: Some(true),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_none()
    }
}

// -- Errors --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewRequest {
        NewRequest {
            sender_name: "Sam".into(),
            recipient_name: "Lee".into(),
            message: "Hi".into(),
            custom_message: None,
            gift: "🌹 Red Rose Bouquet".into(),
            theme: "classic_romance".into(),
            music: "midnight_glow".into(),
            accepted: false,
        }
    }

    #[test]
    fn complete_request_has_no_blank_fields() {
        assert!(sample().blank_fields().is_empty());
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let mut req = sample();
        req.recipient_name = "   ".into();
        req.music = String::new();
        assert_eq!(req.blank_fields(), vec!["recipient_name", "music"]);
    }

    #[test]
    fn empty_custom_message_is_dropped() {
        let mut req = sample();
        req.custom_message = Some(" ".into());
        assert_eq!(req.normalized_custom_message(), None);
        req.custom_message = Some("forever".into());
        assert_eq!(req.normalized_custom_message(), Some("forever"));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<RequestPatch>(r#"{"message":"edited"}"#);
        assert!(err.is_err());
        let patch: RequestPatch = serde_json::from_str(r#"{"accepted":true}"#).unwrap();
        assert_eq!(patch, RequestPatch::accept());
    }
}
