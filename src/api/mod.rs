pub mod auth;
pub mod error;
pub mod queue;

use async_trait::async_trait;
use url::Url;

pub use auth::{login, signup, AuthError};
pub use error::ApiError;
pub use queue::ApiClient;

use crate::models::{ItemId, NewQueueItem, PriorityUpdate, QueueItem};

/// Remote operations the queue controller relies on.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Current queue, already ordered by the service.
    async fn fetch_queue(&self) -> Result<Vec<QueueItem>, ApiError>;

    async fn add_item(&self, item: &NewQueueItem) -> Result<(), ApiError>;

    async fn update_priority(&self, id: &ItemId, update: &PriorityUpdate) -> Result<(), ApiError>;

    async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError>;
}

/// Parses the configured base URL, making sure relative joins keep its path.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}

pub(crate) fn endpoint(base_url: &Url, path: &str) -> Result<Url, ApiError> {
    Ok(base_url.join(path)?)
}
