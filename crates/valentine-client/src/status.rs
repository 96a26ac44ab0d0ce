//! The sender's live status page for one request.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use valentine_types::models::{Request, StatusSnapshot};

use crate::store::{RecordStore, Subscription};
use crate::ui::{Notification, UiHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusState {
    Loading,
    Awaiting(StatusSnapshot),
    Accepted(StatusSnapshot),
    NotFound,
    Failed(String),
}

impl StatusState {
    fn from_snapshot(snapshot: StatusSnapshot) -> Self {
        if snapshot.accepted {
            Self::Accepted(snapshot)
        } else {
            Self::Awaiting(snapshot)
        }
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            Self::Awaiting(s) | Self::Accepted(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

pub struct StatusViewer {
    id: Uuid,
    state: watch::Receiver<StatusState>,
    subscription: Mutex<Option<Subscription>>,
}

impl StatusViewer {
    /// Subscribe to changes for `id`, then load the current snapshot.
    ///
    /// The feed is registered before the read so an accept landing in
    /// between is not lost. A pushed change always wins over the initial read.
    pub async fn open(store: Arc<dyn RecordStore>, id: Uuid, ui: UiHandle) -> Self {
        let (tx, rx) = watch::channel(StatusState::Loading);
        let tx = Arc::new(tx);

        let feed_tx = tx.clone();
        let on_change = Arc::new(move |request: Request| {
            debug!("Status update for {}: accepted={}", request.id, request.accepted);
            feed_tx.send_replace(StatusState::from_snapshot(request.status()));
        });

        let mut subscription = match store.subscribe(id, on_change).await {
            Ok(sub) => Some(sub),
            Err(e) => {
                warn!("Live updates unavailable for {}: {}", id, e);
                None
            }
        };

        let loaded = match store.get_status(id).await {
            Ok(snapshot) => StatusState::from_snapshot(snapshot),
            Err(e) if e.is_not_found() => StatusState::NotFound,
            Err(e) => {
                warn!("Could not load status for {}: {}", id, e);
                ui.notify(Notification::error("Could not load request status"));
                StatusState::Failed(e.to_string())
            }
        };

        // Nothing will ever change for an id the store does not have
        if loaded == StatusState::NotFound {
            if let Some(sub) = subscription.take() {
                sub.unsubscribe();
            }
        }

        tx.send_if_modified(|state| {
            if *state == StatusState::Loading {
                *state = loaded;
                true
            } else {
                false
            }
        });

        Self {
            id,
            state: rx,
            subscription: Mutex::new(subscription),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> StatusState {
        self.state.borrow().clone()
    }

    /// A receiver that wakes on every change.
    pub fn watch(&self) -> watch::Receiver<StatusState> {
        self.state.clone()
    }

    pub fn is_live(&self) -> bool {
        match self.subscription.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Stop listening. The last state stays readable.
    pub fn close(&self) {
        let subscription = match self.subscription.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sub) = subscription {
            sub.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::memory::MemoryStore;
    use crate::ui::{self, UiEvent};
    use valentine_types::api::RequestPatch;

    fn seeded(store: &MemoryStore) -> Uuid {
        let now = Utc::now();
        let request = Request {
            id: Uuid::new_v4(),
            sender_name: "Sam".into(),
            recipient_name: "Lee".into(),
            message: "Hi".into(),
            custom_message: None,
            gift: "🌹 Red Rose Bouquet".into(),
            theme: "classic_romance".into(),
            music: "midnight_glow".into(),
            accepted: false,
            created_at: now,
            updated_at: now,
        };
        let id = request.id;
        store.insert(request);
        id
    }

    #[tokio::test]
    async fn external_accept_arrives_without_refresh() {
        let store = Arc::new(MemoryStore::new());
        let id = seeded(&store);
        let (ui, _rx) = ui::channel();

        let viewer = StatusViewer::open(store.clone(), id, ui).await;
        let mut changes = viewer.watch();
        let StatusState::Awaiting(snapshot) = viewer.state() else {
            panic!("expected awaiting, got {:?}", viewer.state());
        };
        assert_eq!(snapshot.recipient_name, "Lee");

        // The recipient accepts from another screen
        store.update(id, RequestPatch::accept()).await.unwrap();

        changes.changed().await.unwrap();
        assert!(changes.borrow().is_accepted());
        assert!(viewer.state().is_accepted());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (ui, mut rx) = ui::channel();

        let viewer = StatusViewer::open(store.clone(), Uuid::new_v4(), ui).await;
        assert_eq!(viewer.state(), StatusState::NotFound);
        assert!(ui::drain(&mut rx).is_empty());
        assert!(!viewer.is_live());
        assert_eq!(store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn drop_releases_subscription() {
        let store = Arc::new(MemoryStore::new());
        let id = seeded(&store);
        let (ui, _rx) = ui::channel();

        let viewer = StatusViewer::open(store.clone(), id, ui).await;
        assert_eq!(store.watcher_count(), 1);
        drop(viewer);
        assert_eq!(store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn close_keeps_last_state() {
        let store = Arc::new(MemoryStore::new());
        let id = seeded(&store);
        let (ui, _rx) = ui::channel();

        let viewer = StatusViewer::open(store.clone(), id, ui).await;
        viewer.close();
        assert!(!viewer.is_live());
        assert_eq!(store.watcher_count(), 0);

        store.update(id, RequestPatch::accept()).await.unwrap();
        assert!(matches!(viewer.state(), StatusState::Awaiting(_)));
    }

    #[tokio::test]
    async fn failed_load_notifies() {
        struct Broken;

        #[async_trait::async_trait]
        impl RecordStore for Broken {
            async fn create(&self, _: valentine_types::api::NewRequest) -> Result<Request, crate::error::StoreError> {
                unreachable!()
            }
            async fn get_by_id(&self, _: Uuid) -> Result<Request, crate::error::StoreError> {
                unreachable!()
            }
            async fn get_status(&self, _: Uuid) -> Result<StatusSnapshot, crate::error::StoreError> {
                Err(crate::error::StoreError::Rejected {
                    status: 500,
                    message: "boom".into(),
                })
            }
            async fn update(&self, _: Uuid, _: RequestPatch) -> Result<(), crate::error::StoreError> {
                unreachable!()
            }
            async fn subscribe(
                &self,
                _: Uuid,
                _: crate::store::ChangeHandler,
            ) -> Result<Subscription, crate::error::StoreError> {
                Ok(Subscription::new(|| {}))
            }
        }

        let (ui, mut rx) = ui::channel();
        let viewer = StatusViewer::open(Arc::new(Broken), Uuid::new_v4(), ui).await;
        assert!(matches!(viewer.state(), StatusState::Failed(_)));
        assert!(matches!(
            ui::drain(&mut rx).as_slice(),
            [UiEvent::Notify(n)] if n.description == "Could not load request status"
        ));
    }
}
