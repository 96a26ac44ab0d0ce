use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use valentine_types::api::{NewRequest, RequestPatch};
use valentine_types::models::{Request, StatusSnapshot};

use crate::error::StoreError;
use crate::store::{ChangeHandler, RecordStore, Subscription};

/// In-process Record Store with the same rules as the service: blank required
/// fields are refused and `accepted` never goes back to false. Also records
/// every call so tests can assert on traffic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
    latency: Option<Duration>,
}

#[derive(Default)]
struct MemoryInner {
    rows: HashMap<Uuid, Request>,
    watchers: HashMap<u64, (Uuid, ChangeHandler)>,
    next_token: u64,
    create_calls: Vec<NewRequest>,
    update_calls: Vec<(Uuid, RequestPatch)>,
    fail_creates: bool,
    fail_updates: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before touching the table.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.lock().fail_creates = fail;
    }

    pub fn set_fail_updates(&self, fail: bool) {
        self.lock().fail_updates = fail;
    }

    /// Seed a row directly, bypassing validation.
    pub fn insert(&self, request: Request) {
        self.lock().rows.insert(request.id, request);
    }

    pub fn row(&self, id: Uuid) -> Option<Request> {
        self.lock().rows.get(&id).cloned()
    }

    pub fn create_calls(&self) -> Vec<NewRequest> {
        self.lock().create_calls.clone()
    }

    pub fn update_calls(&self) -> Vec<(Uuid, RequestPatch)> {
        self.lock().update_calls.clone()
    }

    pub fn watcher_count(&self) -> usize {
        self.lock().watchers.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn unavailable() -> StoreError {
    StoreError::Rejected {
        status: 503,
        message: "store unavailable".into(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, request: NewRequest) -> Result<Request, StoreError> {
        self.lock().create_calls.push(request.clone());
        self.delay().await;

        let mut inner = self.lock();
        if inner.fail_creates {
            return Err(unavailable());
        }

        let blank = request.blank_fields();
        if !blank.is_empty() {
            return Err(StoreError::Rejected {
                status: 422,
                message: format!("required: {}", blank.join(", ")),
            });
        }
        if request.accepted {
            return Err(StoreError::Rejected {
                status: 422,
                message: "a new request cannot start out accepted".into(),
            });
        }

        let now = Utc::now();
        let row = Request {
            id: Uuid::new_v4(),
            custom_message: request.normalized_custom_message().map(str::to_string),
            sender_name: request.sender_name,
            recipient_name: request.recipient_name,
            message: request.message,
            gift: request.gift,
            theme: request.theme,
            music: request.music,
            accepted: false,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(row.id, row.clone());
        debug!("memory store created {}", row.id);
        Ok(row)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Request, StoreError> {
        self.delay().await;
        self.row(id).ok_or(StoreError::NotFound(id))
    }

    async fn get_status(&self, id: Uuid) -> Result<StatusSnapshot, StoreError> {
        self.get_by_id(id).await.map(StatusSnapshot::from)
    }

    async fn update(&self, id: Uuid, patch: RequestPatch) -> Result<(), StoreError> {
        self.lock().update_calls.push((id, patch.clone()));
        self.delay().await;

        let (changed, handlers) = {
            let mut inner = self.lock();
            if inner.fail_updates {
                return Err(unavailable());
            }

            let row = inner.rows.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            let Some(accepted) = patch.accepted else {
                return Err(StoreError::Rejected {
                    status: 422,
                    message: "patch carries no fields".into(),
                });
            };
            if row.accepted && !accepted {
                return Err(StoreError::Rejected {
                    status: 409,
                    message: "an accepted request cannot be un-accepted".into(),
                });
            }
            if row.accepted == accepted {
                return Ok(());
            }

            row.accepted = accepted;
            row.updated_at = Utc::now();
            let changed = row.clone();

            let handlers: Vec<ChangeHandler> = inner
                .watchers
                .values()
                .filter(|(watched, _)| *watched == id)
                .map(|(_, handler)| handler.clone())
                .collect();
            (changed, handlers)
        };

        // Handlers run outside the lock so they may call back into the store.
        for handler in handlers {
            handler(changed.clone());
        }
        Ok(())
    }

    async fn subscribe(&self, id: Uuid, on_change: ChangeHandler) -> Result<Subscription, StoreError> {
        let token = {
            let mut inner = self.lock();
            let token = inner.next_token;
            inner.next_token += 1;
            inner.watchers.insert(token, (id, on_change));
            token
        };

        let store = self.clone();
        Ok(Subscription::new(move || {
            store.lock().watchers.remove(&token);
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn new_request() -> NewRequest {
        NewRequest {
            sender_name: "Sam".into(),
            recipient_name: "Lee".into(),
            message: "Hi".into(),
            custom_message: Some(String::new()),
            gift: "🌹 Red Rose Bouquet".into(),
            theme: "classic_romance".into(),
            music: "midnight_glow".into(),
            accepted: false,
        }
    }

    #[tokio::test]
    async fn create_and_read() {
        let store = MemoryStore::new();
        let created = store.create(new_request()).await.unwrap();

        assert_eq!(created.custom_message, None);
        assert_eq!(store.get_by_id(created.id).await.unwrap(), created);
        assert!(store.get_by_id(Uuid::new_v4()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn watchers_see_only_their_request() {
        let store = MemoryStore::new();
        let watched = store.create(new_request()).await.unwrap();
        let other = store.create(new_request()).await.unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let sub = store
            .subscribe(
                watched.id,
                Arc::new(move |req: Request| {
                    assert!(req.accepted);
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        store.update(other.id, RequestPatch::accept()).await.unwrap();
        store.update(watched.id, RequestPatch::accept()).await.unwrap();
        // No-op write does not notify
        store.update(watched.id, RequestPatch::accept()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(sub);
        assert_eq!(store.watcher_count(), 0);
    }

    #[tokio::test]
    async fn create_refuses_preaccepted_request() {
        let store = MemoryStore::new();
        let mut request = new_request();
        request.accepted = true;

        let err = store.create(request).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 422, .. }));
        assert_eq!(store.create_calls().len(), 1);
    }

    #[tokio::test]
    async fn accepted_cannot_be_cleared() {
        let store = MemoryStore::new();
        let created = store.create(new_request()).await.unwrap();
        store.update(created.id, RequestPatch::accept()).await.unwrap();

        let err = store
            .update(created.id, RequestPatch { accepted: Some(false) })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));
        assert!(store.row(created.id).unwrap().accepted);
    }
}
