use std::sync::Arc;

use tracing::{debug, info};

use super::playback::{PlaybackAdapter, PlayerPlatform, Transition};
use super::queue::{QueueController, QueueError, QueueFuture, RefreshOutcome, RefreshTicket};
use crate::api::{ApiError, QueueService};
use crate::media::MediaId;
use crate::models::QueueItem;

/// What the shell has to start after the queue or the player moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Idle,
    /// A fresh player is waiting for the media of this id
    Load(MediaId),
    /// Nothing is playing any more
    Stopped,
}

impl From<Transition> for Cue {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Created(media_id) => Cue::Load(media_id),
            Transition::Cleared => Cue::Stopped,
            Transition::Unchanged | Transition::Deferred(_) | Transition::Failed(_) => Cue::Idle,
        }
    }
}

/// The shared queue driving the local player.
///
/// Remote work is handed out as futures; their results come back through
/// `queue_fetched` and `mutation_finished`. Every successful mutation is
/// followed by a full refresh, and the player always follows the
/// controller's active media id.
pub struct Jukebox<S, P: PlayerPlatform> {
    queue: QueueController<S>,
    playback: PlaybackAdapter<P>,
}

impl<S: QueueService + 'static, P: PlayerPlatform> Jukebox<S, P> {
    pub fn new(service: Arc<S>, platform: P) -> Self {
        Self {
            queue: QueueController::new(service),
            playback: PlaybackAdapter::new(platform),
        }
    }

    pub fn queue(&self) -> &QueueController<S> {
        &self.queue
    }

    pub fn playback(&self) -> &PlaybackAdapter<P> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackAdapter<P> {
        &mut self.playback
    }

    pub fn refresh(&mut self) -> (RefreshTicket, QueueFuture<Vec<QueueItem>>) {
        self.queue.refresh_request()
    }

    pub fn submit(&self, source_url: &str) -> Result<QueueFuture<()>, QueueError> {
        self.queue.submit_request(source_url)
    }

    pub fn vote(&self, item: &QueueItem, up: bool) -> QueueFuture<()> {
        self.queue.vote_request(item, up)
    }

    pub fn remove(&self, item: &QueueItem) -> QueueFuture<()> {
        self.queue.remove_request(item)
    }

    pub fn remove_current(&self) -> Option<QueueFuture<()>> {
        self.queue.remove_current_request()
    }

    /// Resynchronize after a mutation. A failed one leaves everything as it was.
    pub fn mutation_finished(
        &mut self,
        result: Result<(), ApiError>,
    ) -> Result<(RefreshTicket, QueueFuture<Vec<QueueItem>>), ApiError> {
        result?;
        Ok(self.refresh())
    }

    pub fn queue_fetched(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<QueueItem>, ApiError>,
    ) -> Result<(RefreshOutcome, Cue), ApiError> {
        let outcome = self.queue.apply_refresh(ticket, result)?;
        let cue = match outcome {
            RefreshOutcome::Applied => self.sync(),
            RefreshOutcome::Stale => Cue::Idle,
        };
        Ok((outcome, cue))
    }

    pub fn platform_ready(&mut self) -> Cue {
        self.playback.platform_ready().into()
    }

    /// Poll for the end of playback and move on when it happened.
    pub fn tick(&mut self) -> Cue {
        if !self.playback.poll_ended() {
            return Cue::Idle;
        }
        debug!("Playback ended for {:?}", self.queue.active_media_id());
        if self.queue.advance() {
            self.sync()
        } else {
            info!("Reached the end of the queue");
            Cue::Stopped
        }
    }

    /// Move to the next item. On the last one the current song keeps playing.
    pub fn skip(&mut self) -> Cue {
        if self.queue.advance() {
            self.sync()
        } else {
            debug!("Nothing to skip to");
            Cue::Idle
        }
    }

    fn sync(&mut self) -> Cue {
        self.playback
            .set_active(self.queue.active_media_id().cloned())
            .into()
    }
}
