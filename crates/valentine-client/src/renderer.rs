//! The recipient's screen: shows one stored request and offers accept/decline.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use valentine_types::api::RequestPatch;
use valentine_types::catalog::{self, REJECTION_MESSAGES, RejectionMessage, Theme, Track};
use valentine_types::models::Request;

use crate::player::{AudioOutput, PreviewPlayer};
use crate::routes::canonical_view_url;
use crate::store::RecordStore;
use crate::ui::{Notification, UiHandle};

/// How long a decline message stays on screen.
const DECLINE_NOTICE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// The recipient's own link.
    Live,
    /// The sender looking at what the recipient will see.
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderView {
    Loading,
    Loaded(Request),
    NotFound,
    Failed(String),
}

/// One-way accept gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Pending,
    Accepted,
}

/// Which actions the screen should enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub accept: bool,
    pub decline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    /// Not loaded, already accepted, or an accept is already in flight.
    Ignored,
    Failed,
}

pub struct RequestRenderer {
    store: Arc<dyn RecordStore>,
    ui: UiHandle,
    id: Uuid,
    mode: ViewMode,
    view: Mutex<RenderView>,
    accepting: AtomicBool,
    rejection_index: AtomicUsize,
    player: Mutex<PreviewPlayer>,
}

impl RequestRenderer {
    pub fn new(
        store: Arc<dyn RecordStore>,
        ui: UiHandle,
        id: Uuid,
        mode: ViewMode,
        output: Box<dyn AudioOutput>,
    ) -> Self {
        Self {
            store,
            ui,
            id,
            mode,
            view: Mutex::new(RenderView::Loading),
            accepting: AtomicBool::new(false),
            rejection_index: AtomicUsize::new(0),
            player: Mutex::new(PreviewPlayer::new(output)),
        }
    }

    fn view_lock(&self) -> MutexGuard<'_, RenderView> {
        match self.view.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn player_lock(&self) -> MutexGuard<'_, PreviewPlayer> {
        match self.player.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn view(&self) -> RenderView {
        self.view_lock().clone()
    }

    pub async fn load(&self) {
        *self.view_lock() = RenderView::Loading;

        let view = match self.store.get_by_id(self.id).await {
            Ok(request) => {
                if let Err(e) = self.player_lock().load(&request.music) {
                    warn!("Request {} has no playable song: {}", self.id, e);
                }
                RenderView::Loaded(request)
            }
            Err(e) if e.is_not_found() => {
                warn!("Request {} not found", self.id);
                RenderView::NotFound
            }
            Err(e) => {
                warn!("Failed to load request {}: {}", self.id, e);
                self.ui
                    .notify(Notification::error("Failed to load Valentine request"));
                RenderView::Failed(e.to_string())
            }
        };

        *self.view_lock() = view;
    }

    /// `None` until a record is loaded; error views render no controls.
    pub fn gate(&self) -> Option<Gate> {
        match &*self.view_lock() {
            RenderView::Loaded(request) if request.accepted => Some(Gate::Accepted),
            RenderView::Loaded(_) => Some(Gate::Pending),
            _ => None,
        }
    }

    pub fn controls(&self) -> Option<Controls> {
        let pending = self.gate()? == Gate::Pending;
        Some(Controls {
            accept: pending && !self.accepting.load(Ordering::Acquire),
            decline: pending && self.mode == ViewMode::Live,
        })
    }

    pub async fn accept(&self) -> AcceptOutcome {
        if self
            .accepting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return AcceptOutcome::Ignored;
        }
        // Checked while holding the flag: a finished accept flips the gate
        // before it releases the flag.
        if self.gate() != Some(Gate::Pending) {
            self.accepting.store(false, Ordering::Release);
            return AcceptOutcome::Ignored;
        }

        let result = self.store.update(self.id, RequestPatch::accept()).await;
        let outcome = match result {
            Ok(()) => {
                if let RenderView::Loaded(request) = &mut *self.view_lock() {
                    request.accepted = true;
                }
                info!("Request {} accepted", self.id);
                self.ui.celebrate();
                self.ui.notify(Notification::info(
                    "Love Accepted!",
                    "💕 Your heart is now connected!",
                ));
                AcceptOutcome::Accepted
            }
            Err(e) => {
                warn!("Couldn't accept request {}: {}", self.id, e);
                self.ui.notify(Notification::error("Couldn't accept the request"));
                AcceptOutcome::Failed
            }
        };

        self.accepting.store(false, Ordering::Release);
        outcome
    }

    /// Show the next joke from the pool. Never touches the store.
    pub fn decline(&self) -> Option<RejectionMessage> {
        if !self.controls()?.decline {
            return None;
        }

        let index = self
            .rejection_index
            .fetch_add(1, Ordering::AcqRel)
            % REJECTION_MESSAGES.len();
        let message = REJECTION_MESSAGES[index];

        self.ui.notify(
            Notification::info(message.title, message.description)
                .destructive()
                .with_duration(DECLINE_NOTICE),
        );
        Some(message)
    }

    pub fn theme(&self) -> Option<&'static Theme> {
        match &*self.view_lock() {
            RenderView::Loaded(request) => catalog::theme(&request.theme),
            _ => None,
        }
    }

    pub fn track(&self) -> Option<&'static Track> {
        self.player_lock().track()
    }

    /// Run `f` against the preview player (play/pause, seek, volume).
    pub fn with_player<T>(&self, f: impl FnOnce(&mut PreviewPlayer) -> T) -> T {
        f(&mut self.player_lock())
    }

    pub fn share_url(&self, site: &Url) -> Url {
        canonical_view_url(site, self.id)
    }
}
