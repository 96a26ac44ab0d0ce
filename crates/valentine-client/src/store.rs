use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use valentine_types::api::{NewRequest, RequestPatch};
use valentine_types::models::{Request, StatusSnapshot};

use crate::error::StoreError;

/// Called with the full row every time a watched request changes.
pub type ChangeHandler = Arc<dyn Fn(Request) + Send + Sync>;

/// The hosted table holding Valentine requests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, request: NewRequest) -> Result<Request, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Request, StoreError>;

    async fn get_status(&self, id: Uuid) -> Result<StatusSnapshot, StoreError>;

    async fn update(&self, id: Uuid, patch: RequestPatch) -> Result<(), StoreError>;

    /// Start delivering changes for `id` to `on_change`. Delivery stops when
    /// the returned handle is dropped or explicitly unsubscribed.
    async fn subscribe(&self, id: Uuid, on_change: ChangeHandler) -> Result<Subscription, StoreError>;
}

/// Live change feed registration. Cancels itself on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
