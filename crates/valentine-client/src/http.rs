//! Record Store client for the `valentine` service: REST for reads and writes,
//! the `/gateway` WebSocket for change notifications.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use valentine_types::api::{ErrorBody, NewRequest, RequestPatch};
use valentine_types::events::{GatewayCommand, GatewayEvent};
use valentine_types::models::{Request, StatusSnapshot};

use crate::error::StoreError;
use crate::store::{ChangeHandler, RecordStore, Subscription};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SUBSCRIBE_ACK_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpRecordStore {
    client: reqwest::Client,
    api_url: String,
}

impl HttpRecordStore {
    pub fn new(store_url: &Url) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, store_url))
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, store_url: &Url) -> Self {
        Self {
            client,
            api_url: store_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn request_url(&self, id: Uuid) -> String {
        format!("{}/requests/{}", self.api_url, id)
    }

    fn gateway_url(&self) -> String {
        let ws_base = if let Some(rest) = self.api_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.api_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.api_url.clone()
        };
        format!("{ws_base}/gateway")
    }

    /// Map non-2xx answers onto [`StoreError`] and decode the body otherwise.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        id: Option<Uuid>,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()));
        }

        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(StoreError::NotFound(id));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create(&self, request: NewRequest) -> Result<Request, StoreError> {
        let response = self
            .client
            .post(format!("{}/requests", self.api_url))
            .json(&request)
            .send()
            .await?;
        let created: Request = Self::parse_response(response, None).await?;
        info!("Stored request {}", created.id);
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Request, StoreError> {
        let response = self.client.get(self.request_url(id)).send().await?;
        Self::parse_response(response, Some(id)).await
    }

    async fn get_status(&self, id: Uuid) -> Result<StatusSnapshot, StoreError> {
        let response = self
            .client
            .get(format!("{}/status", self.request_url(id)))
            .send()
            .await?;
        Self::parse_response(response, Some(id)).await
    }

    async fn update(&self, id: Uuid, patch: RequestPatch) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.request_url(id))
            .json(&patch)
            .send()
            .await?;
        let _updated: Request = Self::parse_response(response, Some(id)).await?;
        Ok(())
    }

    /// Opens a dedicated gateway connection following `id`. Returns once the
    /// server has acknowledged the subscription.
    async fn subscribe(&self, id: Uuid, on_change: ChangeHandler) -> Result<Subscription, StoreError> {
        let url = self.gateway_url();
        let (mut ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| StoreError::Gateway(format!("failed to connect to {url}: {e}")))?;

        let command = serde_json::to_string(&GatewayCommand::Subscribe {
            request_ids: vec![id],
        })
        .map_err(|e| StoreError::Decode(e.to_string()))?;
        ws.send(Message::text(command))
            .await
            .map_err(|e| StoreError::Gateway(e.to_string()))?;

        let ack = async {
            while let Some(frame) = ws.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Ok(GatewayEvent::Subscribed { request_ids }) =
                            serde_json::from_str::<GatewayEvent>(&text)
                        {
                            if request_ids.contains(&id) {
                                return Ok(());
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => return Err(StoreError::Gateway(e.to_string())),
                }
            }
            Err(StoreError::Gateway("gateway closed before subscribing".into()))
        };
        tokio::time::timeout(SUBSCRIBE_ACK_TIMEOUT, ack)
            .await
            .map_err(|_| StoreError::Gateway("timed out waiting for subscription".into()))??;

        debug!("Following request {} over {}", id, url);

        let feed = tokio::spawn(async move {
            while let Some(frame) = ws.next().await {
                match frame {
                    Ok(Message::Text(text)) => match serde_json::from_str::<GatewayEvent>(&text) {
                        Ok(GatewayEvent::RequestUpdate { request }) if request.id == id => {
                            on_change(request);
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Unreadable gateway frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Gateway feed for {} failed: {}", id, e);
                        break;
                    }
                }
            }
            debug!("Gateway feed for {} ended", id);
        });

        Ok(Subscription::new(move || feed.abort()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_from_base() {
        let base = Url::parse("https://store.example/api/").unwrap();
        let store = HttpRecordStore::with_client(reqwest::Client::new(), &base);
        let id = Uuid::nil();

        assert_eq!(
            store.request_url(id),
            "https://store.example/api/requests/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(store.gateway_url(), "wss://store.example/api/gateway");

        let local = Url::parse("http://127.0.0.1:3000").unwrap();
        let store = HttpRecordStore::with_client(reqwest::Client::new(), &local);
        assert_eq!(store.gateway_url(), "ws://127.0.0.1:3000/gateway");
    }
}
