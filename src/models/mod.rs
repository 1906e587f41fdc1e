use serde::{Deserialize, Deserializer};

// Shared utility for deserializing null values as empty strings
pub(crate) fn deserialize_null_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

mod auth;
mod queue_item;

pub use auth::{AuthResponse, Credentials};
pub use queue_item::{ItemId, NewQueueItem, PriorityUpdate, QueueItem};
