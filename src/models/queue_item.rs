use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::deserialize_null_default;
use crate::media::{self, MediaId};

/// Opaque identifier assigned by the queue service.
///
/// The service may hand out numbers or strings; both are kept as text.
#[derive(Serialize, Clone, PartialEq, Eq, Hash, Debug)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for ItemId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => ItemId(n.to_string()),
            RawId::Text(s) => ItemId(s),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer).map(ItemId::from)
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(ItemId::from))
}

#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: ItemId,
    #[serde(alias = "url")]
    pub source_url: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub title: String,
    #[serde(default, alias = "thumbnail", deserialize_with = "deserialize_null_default")]
    pub thumbnail_url: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, alias = "userId", deserialize_with = "deserialize_optional_id")]
    pub submitter_id: Option<ItemId>,
}

impl QueueItem {
    /// Platform id derived from `source_url`; never stored on its own.
    pub fn media_id(&self) -> Option<MediaId> {
        media::extract_media_id(&self.source_url)
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.source_url
        } else {
            &self.title
        }
    }

    /// Stored thumbnail, else the platform's default still for the media id.
    pub fn artwork_url(&self) -> Option<String> {
        if !self.thumbnail_url.is_empty() {
            return Some(self.thumbnail_url.clone());
        }
        self.media_id().map(|id| id.thumbnail_url())
    }

    pub fn submitter_label(&self) -> String {
        self.submitter_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Body of `POST /queue`
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewQueueItem {
    pub source_url: String,
    pub priority: i64,
}

/// Body of `PATCH /queue/{id}`
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct PriorityUpdate {
    pub priority: i64,
}

impl PriorityUpdate {
    /// One vote up or down relative to the priority the client last saw.
    pub fn vote(item: &QueueItem, up: bool) -> Self {
        let delta = if up { 1 } else { -1 };
        Self {
            priority: item.priority.saturating_add(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_service_records_with_legacy_field_names() {
        let json = r#"[
            {"id": 7, "url": "https://youtu.be/dQw4w9WgXcQ", "title": "Never",
             "thumbnail": null, "priority": 3, "userId": 42},
            {"id": "b1", "sourceUrl": "https://example.com", "title": null,
             "thumbnailUrl": "https://img", "priority": -2}
        ]"#;

        let items: Vec<QueueItem> = serde_json::from_str(json).unwrap();

        assert_eq!(items[0].id, ItemId::new("7"));
        assert_eq!(items[0].source_url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(items[0].thumbnail_url, "");
        assert_eq!(items[0].submitter_label(), "42");
        assert_eq!(items[0].media_id().unwrap().as_str(), "dQw4w9WgXcQ");

        assert_eq!(items[1].id.as_str(), "b1");
        assert_eq!(items[1].title, "");
        assert_eq!(items[1].display_title(), "https://example.com");
        assert_eq!(items[1].priority, -2);
        assert_eq!(items[1].submitter_id, None);
        assert_eq!(items[1].media_id(), None);
    }

    #[test]
    fn new_item_body_uses_camel_case() {
        let body = NewQueueItem {
            source_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            priority: 0,
        };

        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"sourceUrl": "https://youtu.be/dQw4w9WgXcQ", "priority": 0})
        );
    }

    #[test]
    fn votes_move_priority_by_one_without_bounds() {
        let mut item: QueueItem = serde_json::from_str(
            r#"{"id": 1, "sourceUrl": "x", "priority": 0}"#,
        )
        .unwrap();

        assert_eq!(PriorityUpdate::vote(&item, true).priority, 1);
        assert_eq!(PriorityUpdate::vote(&item, false).priority, -1);

        item.priority = -50;
        assert_eq!(PriorityUpdate::vote(&item, false).priority, -51);
    }

    #[test]
    fn artwork_falls_back_to_platform_still() {
        let stored: QueueItem = serde_json::from_str(
            r#"{"id": 1, "sourceUrl": "https://youtu.be/dQw4w9WgXcQ", "thumbnailUrl": "https://img/a.jpg"}"#,
        )
        .unwrap();
        let bare: QueueItem = serde_json::from_str(
            r#"{"id": 2, "sourceUrl": "https://youtu.be/dQw4w9WgXcQ"}"#,
        )
        .unwrap();
        let unsupported: QueueItem =
            serde_json::from_str(r#"{"id": 3, "sourceUrl": "https://example.com"}"#).unwrap();

        assert_eq!(stored.artwork_url().as_deref(), Some("https://img/a.jpg"));
        assert_eq!(
            bare.artwork_url().as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(unsupported.artwork_url(), None);
    }
}
