use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiError, QueueService};
use crate::media::{self, MediaId};
use crate::models::{NewQueueItem, PriorityUpdate, QueueItem};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("unsupported video link: {0}")]
    UnsupportedLink(String),
}

/// Sequence number of an issued refresh. Only the newest one may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer refresh was issued after this one; the response was dropped
    Stale,
}

/// Locally cached copy of the shared queue plus the pointer to what is playing.
///
/// The service owns the ordering. The controller never reorders, and every
/// mutation is followed by a full re-fetch.
#[derive(Debug)]
pub struct QueueController<S> {
    service: Arc<S>,
    snapshot: Vec<QueueItem>,
    active_index: usize,
    active_media_id: Option<MediaId>,
    last_issued: u64,
}

/// A request to the queue service, detached from the controller so the UI can
/// run it on its executor.
pub type QueueFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'static>>;

impl<S: QueueService + 'static> QueueController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            snapshot: Vec::new(),
            active_index: 0,
            active_media_id: None,
            last_issued: 0,
        }
    }

    /// Fetch of the whole queue, tagged with a fresh ticket for `apply_refresh`.
    pub fn refresh_request(&mut self) -> (RefreshTicket, QueueFuture<Vec<QueueItem>>) {
        let ticket = self.begin_refresh();
        let service = Arc::clone(&self.service);
        (ticket, Box::pin(async move { service.fetch_queue().await }))
    }

    /// Validate the link and post it with priority 0.
    pub fn submit_request(&self, source_url: &str) -> Result<QueueFuture<()>, QueueError> {
        let item = self.prepare_submission(source_url)?;
        let service = Arc::clone(&self.service);
        Ok(Box::pin(async move { service.add_item(&item).await }))
    }

    pub fn vote_request(&self, item: &QueueItem, up: bool) -> QueueFuture<()> {
        let update = PriorityUpdate::vote(item, up);
        let id = item.id.clone();
        let service = Arc::clone(&self.service);
        Box::pin(async move { service.update_priority(&id, &update).await })
    }

    pub fn remove_request(&self, item: &QueueItem) -> QueueFuture<()> {
        let id = item.id.clone();
        let service = Arc::clone(&self.service);
        Box::pin(async move { service.delete_item(&id).await })
    }

    /// Delete whatever is currently playing. `None` on an empty queue.
    pub fn remove_current_request(&self) -> Option<QueueFuture<()>> {
        self.current_item().map(|item| self.remove_request(item))
    }
}

impl<S> QueueController<S> {
    /// Issue a new refresh ticket; any older in-flight response becomes stale.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.last_issued += 1;
        RefreshTicket(self.last_issued)
    }

    /// Apply the response of the refresh identified by `ticket`.
    ///
    /// Failures leave the cached snapshot untouched. Responses for anything
    /// but the newest ticket are dropped, successful or not.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<QueueItem>, ApiError>,
    ) -> Result<RefreshOutcome, ApiError> {
        if ticket.0 != self.last_issued {
            debug!(
                "Dropping stale queue response {} (latest {})",
                ticket.0, self.last_issued
            );
            return Ok(RefreshOutcome::Stale);
        }

        match result {
            Ok(items) => {
                self.snapshot = items;
                self.active_index = 0;
                self.active_media_id = self.snapshot.first().and_then(QueueItem::media_id);
                debug!(
                    "Queue refreshed: {} items, now playing {:?}",
                    self.snapshot.len(),
                    self.active_media_id
                );
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                warn!("Failed to refresh queue: {}", e);
                Err(e)
            }
        }
    }

    /// Move to the next item. Returns false at the end of the queue (no wraparound).
    pub fn advance(&mut self) -> bool {
        if self.active_index + 1 < self.snapshot.len() {
            self.active_index += 1;
            self.active_media_id = self.snapshot[self.active_index].media_id();
            true
        } else {
            false
        }
    }

    /// Check a link before anything is sent to the service.
    pub fn prepare_submission(&self, source_url: &str) -> Result<NewQueueItem, QueueError> {
        let source_url = source_url.trim();
        if media::extract_media_id(source_url).is_none() {
            return Err(QueueError::UnsupportedLink(source_url.to_string()));
        }
        Ok(NewQueueItem {
            source_url: source_url.to_string(),
            priority: 0,
        })
    }

    pub fn current_item(&self) -> Option<&QueueItem> {
        self.snapshot.get(self.active_index)
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_media_id(&self) -> Option<&MediaId> {
        self.active_media_id.as_ref()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.snapshot
    }

    pub fn has_next(&self) -> bool {
        self.active_index + 1 < self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::ItemId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Fetch,
        Add(NewQueueItem),
        Update(ItemId, i64),
        Delete(ItemId),
    }

    /// In-memory stand-in for the queue service.
    #[derive(Default)]
    pub struct FakeService {
        pub items: Mutex<Vec<QueueItem>>,
        pub calls: Mutex<Vec<Call>>,
        pub fail_fetch: Mutex<bool>,
        next_id: Mutex<u64>,
    }

    impl FakeService {
        pub fn with_items(items: Vec<QueueItem>) -> Arc<Self> {
            let service = Self::default();
            *service.next_id.lock().unwrap() = 100;
            *service.items.lock().unwrap() = items;
            Arc::new(service)
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueService for FakeService {
        async fn fetch_queue(&self) -> Result<Vec<QueueItem>, ApiError> {
            self.calls.lock().unwrap().push(Call::Fetch);
            if *self.fail_fetch.lock().unwrap() {
                return Err(ApiError::Network("connection refused".to_string()));
            }
            let mut items = self.items.lock().unwrap().clone();
            items.sort_by(|a, b| b.priority.cmp(&a.priority));
            Ok(items)
        }

        async fn add_item(&self, item: &NewQueueItem) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::Add(item.clone()));
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            self.items.lock().unwrap().push(QueueItem {
                id: ItemId::new(next_id.to_string()),
                source_url: item.source_url.clone(),
                title: String::new(),
                thumbnail_url: String::new(),
                priority: item.priority,
                submitter_id: None,
            });
            Ok(())
        }

        async fn update_priority(&self, id: &ItemId, update: &PriorityUpdate) -> Result<(), ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(id.clone(), update.priority));
            let mut items = self.items.lock().unwrap();
            match items.iter_mut().find(|item| &item.id == id) {
                Some(item) => {
                    item.priority = update.priority;
                    Ok(())
                }
                None => Err(ApiError::Status {
                    status: 404,
                    message: "not found".to_string(),
                }),
            }
        }

        async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(Call::Delete(id.clone()));
            self.items.lock().unwrap().retain(|item| &item.id != id);
            Ok(())
        }
    }

    pub fn item(id: &str, source_url: &str, priority: i64) -> QueueItem {
        QueueItem {
            id: ItemId::new(id),
            source_url: source_url.to_string(),
            title: format!("Song {}", id),
            thumbnail_url: String::new(),
            priority,
            submitter_id: Some(ItemId::new("7")),
        }
    }

    pub const A: &str = "https://youtu.be/aaaaaaaaaaa";
    pub const B: &str = "https://www.youtube.com/watch?v=bbbbbbbbbbb";

    fn controller(items: Vec<QueueItem>) -> (QueueController<FakeService>, Arc<FakeService>) {
        let service = FakeService::with_items(items);
        (QueueController::new(Arc::clone(&service)), service)
    }

    async fn refreshed(queue: &mut QueueController<FakeService>) -> Result<RefreshOutcome, ApiError> {
        let (ticket, fetch) = queue.refresh_request();
        let result = fetch.await;
        queue.apply_refresh(ticket, result)
    }

    #[tokio::test]
    async fn refresh_points_at_the_head_of_the_queue() {
        let (mut queue, _) = controller(vec![item("1", A, 0), item("2", B, 0)]);

        assert_eq!(refreshed(&mut queue).await.unwrap(), RefreshOutcome::Applied);

        assert_eq!(queue.active_index(), 0);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "aaaaaaaaaaa");
        assert_eq!(queue.current_item().unwrap().id.as_str(), "1");
    }

    #[tokio::test]
    async fn refresh_with_unextractable_head_has_no_media() {
        let (mut queue, _) = controller(vec![item("1", "https://example.com/video", 0), item("2", B, 0)]);

        refreshed(&mut queue).await.unwrap();

        assert_eq!(queue.active_index(), 0);
        assert_eq!(queue.active_media_id(), None);
    }

    #[tokio::test]
    async fn refresh_to_empty_clears_media() {
        let (mut queue, service) = controller(vec![item("1", A, 0)]);
        refreshed(&mut queue).await.unwrap();

        service.items.lock().unwrap().clear();
        refreshed(&mut queue).await.unwrap();

        assert!(queue.is_empty());
        assert_eq!(queue.active_media_id(), None);
        assert!(queue.current_item().is_none());
    }

    #[tokio::test]
    async fn advance_stops_at_the_last_item() {
        let (mut queue, _) = controller(vec![item("1", A, 0), item("2", B, 0)]);
        refreshed(&mut queue).await.unwrap();

        assert!(queue.advance());
        assert_eq!(queue.active_index(), 1);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "bbbbbbbbbbb");

        assert!(!queue.advance());
        assert!(!queue.advance());
        assert_eq!(queue.active_index(), 1);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "bbbbbbbbbbb");
    }

    #[test]
    fn advance_on_empty_queue_is_a_no_op() {
        let mut queue = QueueController::new(FakeService::with_items(Vec::new()));

        assert!(!queue.advance());
        assert_eq!(queue.active_index(), 0);
        assert_eq!(queue.active_media_id(), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_known_good_state() {
        let (mut queue, service) = controller(vec![item("1", A, 0), item("2", B, 0)]);
        refreshed(&mut queue).await.unwrap();
        queue.advance();

        *service.fail_fetch.lock().unwrap() = true;
        let result = refreshed(&mut queue).await;

        assert!(matches!(result, Err(ApiError::Network(_))));
        assert_eq!(queue.items().len(), 2);
        assert_eq!(queue.active_index(), 1);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "bbbbbbbbbbb");
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut queue = QueueController::new(FakeService::with_items(Vec::new()));

        let slow = queue.begin_refresh();
        let fast = queue.begin_refresh();

        let applied = queue.apply_refresh(fast, Ok(vec![item("1", A, 0)])).unwrap();
        assert_eq!(applied, RefreshOutcome::Applied);

        let stale = queue
            .apply_refresh(slow, Ok(vec![item("9", B, 0), item("8", B, 0), item("7", B, 0)]))
            .unwrap();
        assert_eq!(stale, RefreshOutcome::Stale);
        assert_eq!(queue.items().len(), 1);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "aaaaaaaaaaa");

        let stale_error = queue.apply_refresh(slow, Err(ApiError::Network("late".to_string())));
        assert_eq!(stale_error, Ok(RefreshOutcome::Stale));
    }

    #[tokio::test]
    async fn requests_are_lazy_until_awaited() {
        let (mut queue, service) = controller(vec![item("1", A, 0)]);

        let (_, fetch) = queue.refresh_request();
        let vote = queue.vote_request(&item("1", A, 0), true);
        assert!(service.calls().is_empty());

        drop(fetch);
        vote.await.unwrap();
        assert_eq!(service.calls(), vec![Call::Update(ItemId::new("1"), 1)]);
    }

    #[tokio::test]
    async fn submit_posts_with_zero_priority() {
        let (mut queue, service) = controller(Vec::new());

        queue
            .submit_request("https://youtu.be/dQw4w9WgXcQ")
            .unwrap()
            .await
            .unwrap();
        refreshed(&mut queue).await.unwrap();

        assert_eq!(
            service.calls(),
            vec![
                Call::Add(NewQueueItem {
                    source_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                    priority: 0,
                }),
                Call::Fetch,
            ]
        );
        assert_eq!(queue.active_media_id().unwrap().as_str(), "dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn submitted_links_are_trimmed() {
        let (queue, service) = controller(Vec::new());

        queue
            .submit_request("  https://youtu.be/dQw4w9WgXcQ \n")
            .unwrap()
            .await
            .unwrap();

        assert_eq!(
            service.calls(),
            vec![Call::Add(NewQueueItem {
                source_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                priority: 0,
            })]
        );
    }

    #[test]
    fn preview_and_submission_accept_the_same_input() {
        let (queue, _) = controller(Vec::new());
        let inputs = [
            "https://youtu.be/dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ \n",
            "\thttps://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://example.com/video",
            "   ",
        ];

        for input in inputs {
            assert_eq!(
                media::preview_for(input).is_some(),
                queue.prepare_submission(input).is_ok(),
                "disagreement on {:?}",
                input
            );
        }
    }

    #[test]
    fn submit_of_unsupported_link_sends_nothing() {
        let (queue, service) = controller(Vec::new());

        let result = queue.submit_request("https://example.com/video");

        assert_eq!(
            result.err(),
            Some(QueueError::UnsupportedLink("https://example.com/video".to_string()))
        );
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn upvote_raises_reported_priority_by_one() {
        let (mut queue, service) = controller(vec![item("1", A, 2), item("2", B, 0)]);
        refreshed(&mut queue).await.unwrap();

        let target = queue.items()[1].clone();
        queue.vote_request(&target, true).await.unwrap();
        refreshed(&mut queue).await.unwrap();

        let reported = queue.items().iter().find(|i| i.id == target.id).unwrap();
        assert_eq!(reported.priority, 1);
        assert_eq!(service.calls()[1], Call::Update(ItemId::new("2"), 1));
    }

    #[tokio::test]
    async fn downvote_goes_negative() {
        let (mut queue, _) = controller(vec![item("1", A, 0)]);
        refreshed(&mut queue).await.unwrap();

        let target = queue.items()[0].clone();
        queue.vote_request(&target, false).await.unwrap();
        refreshed(&mut queue).await.unwrap();

        assert_eq!(queue.items()[0].priority, -1);
    }

    #[tokio::test]
    async fn vote_reorders_only_through_the_service() {
        let (mut queue, _) = controller(vec![item("1", A, 1), item("2", B, 1)]);
        refreshed(&mut queue).await.unwrap();

        let second = queue.items()[1].clone();
        queue.vote_request(&second, true).await.unwrap();
        assert_eq!(queue.items()[0].id.as_str(), "1");

        refreshed(&mut queue).await.unwrap();
        assert_eq!(queue.items()[0].id.as_str(), "2");
        assert_eq!(queue.active_media_id().unwrap().as_str(), "bbbbbbbbbbb");
    }

    #[tokio::test]
    async fn remove_deletes_by_id() {
        let (mut queue, service) = controller(vec![item("1", A, 0), item("2", B, 0)]);
        refreshed(&mut queue).await.unwrap();

        let first = queue.items()[0].clone();
        queue.remove_request(&first).await.unwrap();
        refreshed(&mut queue).await.unwrap();

        assert_eq!(&service.calls()[1..], &[Call::Delete(ItemId::new("1")), Call::Fetch]);
        assert_eq!(queue.items().len(), 1);
        assert_eq!(queue.active_media_id().unwrap().as_str(), "bbbbbbbbbbb");
    }

    #[tokio::test]
    async fn remove_current_targets_the_active_item() {
        let (mut queue, service) = controller(vec![item("1", A, 0), item("2", B, 0)]);
        refreshed(&mut queue).await.unwrap();
        queue.advance();

        queue.remove_current_request().unwrap().await.unwrap();
        refreshed(&mut queue).await.unwrap();

        assert!(service.calls().contains(&Call::Delete(ItemId::new("2"))));
        assert_eq!(queue.active_index(), 0);
    }

    #[test]
    fn remove_current_on_empty_queue_does_nothing() {
        let (queue, service) = controller(Vec::new());

        assert!(queue.remove_current_request().is_none());
        assert!(service.calls().is_empty());
    }
}
