//! The share page: outbound social links and copy-to-clipboard.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use valentine_types::models::Request;

use crate::routes::canonical_view_url;
use crate::store::RecordStore;
use crate::ui::{Notification, UiHandle};

/// How long the "copied" indicator stays on.
pub const COPIED_FOR: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareKind {
    /// Sent to the recipient.
    #[default]
    Invite,
    /// Posted by the sender after the fact.
    Brag,
}

impl ShareKind {
    pub fn message(self, sender_name: &str) -> String {
        match self {
            Self::Invite => format!("💝 {sender_name} sent you a special Valentine's request!"),
            Self::Brag => format!("🔥 {sender_name} just achieved something amazing!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePlatform {
    pub name: &'static str,
    pub icon: &'static str,
    pub url: Url,
}

fn link(base: &str, params: &[(&str, &str)]) -> Option<Url> {
    Url::parse_with_params(base, params).ok()
}

/// Outbound links for `request`, each embedding `share_url`.
pub fn platforms(request: &Request, share_url: &Url, kind: ShareKind) -> Vec<SharePlatform> {
    let message = kind.message(&request.sender_name);
    let target = share_url.as_str();
    let whatsapp_text = format!("{message} Check it out here: {target}");

    [
        (
            "WhatsApp",
            "💬",
            link("https://wa.me/", &[("text", whatsapp_text.as_str())]),
        ),
        (
            "Telegram",
            "✈️",
            link(
                "https://t.me/share/url",
                &[("url", target), ("text", message.as_str())],
            ),
        ),
        (
            "Facebook",
            "👥",
            link("https://www.facebook.com/sharer/sharer.php", &[("u", target)]),
        ),
        (
            "X (Twitter)",
            "🐦",
            link(
                "https://twitter.com/intent/tweet",
                &[("text", message.as_str()), ("url", target)],
            ),
        ),
    ]
    .into_iter()
    .filter_map(|(name, icon, url)| url.map(|url| SharePlatform { name, icon, url }))
    .collect()
}

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// System clipboard seam.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard held in memory. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
    broken: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that refuses every write.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        match self.contents.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.broken {
            return Err(ClipboardError("write denied".into()));
        }
        let mut guard = match self.contents.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(text.to_string());
        Ok(())
    }
}

pub struct ShareSurface {
    id: Uuid,
    link: Url,
    request: Option<Request>,
    ui: UiHandle,
    clipboard: Box<dyn Clipboard>,
    copied_at: Mutex<Option<Instant>>,
}

impl ShareSurface {
    /// Load the record behind `id`. The link itself only needs the id, so
    /// copying works even if the load fails.
    pub async fn load(
        store: Arc<dyn RecordStore>,
        id: Uuid,
        site: &Url,
        ui: UiHandle,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let request = match store.get_by_id(id).await {
            Ok(request) => Some(request),
            Err(e) => {
                warn!("Error loading request {}: {}", id, e);
                ui.notify(Notification::error("Could not load request details"));
                None
            }
        };

        Self {
            id,
            link: canonical_view_url(site, id),
            request,
            ui,
            clipboard,
            copied_at: Mutex::new(None),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    pub fn link(&self) -> &Url {
        &self.link
    }

    /// Empty until the record has loaded.
    pub fn platforms(&self, kind: ShareKind) -> Vec<SharePlatform> {
        self.request
            .as_ref()
            .map(|request| platforms(request, &self.link, kind))
            .unwrap_or_default()
    }

    fn copied_lock(&self) -> MutexGuard<'_, Option<Instant>> {
        match self.copied_at.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn copy_link(&self) -> bool {
        match self.clipboard.write_text(self.link.as_str()) {
            Ok(()) => {
                *self.copied_lock() = Some(Instant::now());
                self.ui
                    .notify(Notification::info("Success", "Link copied to clipboard"));
                true
            }
            Err(e) => {
                warn!("Copy failed: {}", e);
                self.ui.notify(Notification::error("Could not copy link"));
                false
            }
        }
    }

    pub fn is_copied(&self) -> bool {
        self.copied_lock()
            .is_some_and(|at| at.elapsed() < COPIED_FOR)
    }

    pub fn open(&self, platform: &SharePlatform) {
        info!("Sharing {} via {}", self.id, platform.name);
        self.ui.open_external(platform.url.as_str());
        self.ui.notify(Notification::info(
            "Shared",
            format!("Opening {}...", platform.name),
        ));
    }
}
