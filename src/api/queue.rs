use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::error::{ensure_success, ApiError};
use super::{endpoint, parse_base_url, QueueService};
use crate::constants;
use crate::models::{ItemId, NewQueueItem, PriorityUpdate, QueueItem};

/// REST client for the shared queue. Every call carries the bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parse_base_url(base_url)?,
            token: token.into(),
        })
    }

    fn queue_url(&self) -> Result<Url, ApiError> {
        endpoint(&self.base_url, constants::QUEUE_PATH)
    }

    fn item_url(&self, id: &ItemId) -> Result<Url, ApiError> {
        let mut url = self.queue_url()?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl QueueService for ApiClient {
    async fn fetch_queue(&self) -> Result<Vec<QueueItem>, ApiError> {
        let response = self
            .http
            .get(self.queue_url()?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let items = ensure_success(response).await?.json::<Vec<QueueItem>>().await?;
        debug!("Fetched {} queue items", items.len());
        Ok(items)
    }

    async fn add_item(&self, item: &NewQueueItem) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.queue_url()?)
            .bearer_auth(&self.token)
            .json(item)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn update_priority(&self, id: &ItemId, update: &PriorityUpdate) -> Result<(), ApiError> {
        let response = self
            .http
            .patch(self.item_url(id)?)
            .bearer_auth(&self.token)
            .json(update)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.item_url(id)?)
            .bearer_auth(&self.token)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
