use tracing::{debug, info, warn};

use crate::media::MediaId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("no audio output device available")]
    NoOutputDevice,

    #[error("failed to decode media: {0}")]
    Decode(String),

    #[error("player rejected: {0}")]
    Rejected(String),
}

/// One live instance of the underlying player, bound to a single media id.
pub trait Player {
    /// Media payload the instance plays once it arrives
    type Source;

    fn media_id(&self) -> &MediaId;

    fn attach(&mut self, source: Self::Source) -> Result<(), PlayerError>;

    /// True once playback ran through to the end
    fn has_ended(&self) -> bool;

    fn set_paused(&mut self, paused: bool);

    fn is_paused(&self) -> bool;

    fn set_volume(&mut self, volume: u32);

    fn destroy(self);
}

/// Builds player instances. Only asked once the platform reported ready.
pub trait PlayerPlatform {
    type Player: Player;

    fn create(&mut self, media_id: &MediaId) -> Result<Self::Player, PlayerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Empty,
    /// Instance exists (or is waiting for readiness) but has no media yet
    Loading(MediaId),
    Playing(MediaId),
}

/// What the caller has to do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    Unchanged,
    /// The slot is empty now
    Cleared,
    /// Held until the platform is ready
    Deferred(MediaId),
    /// A fresh instance exists; fetch its media and `attach_source` it
    Created(MediaId),
    /// Creation failed; the slot stays empty and will never report an end
    Failed(MediaId),
}

/// Single owner of the embedded player.
///
/// Guarantees at most one live instance: the old one is always destroyed
/// before a new one is created.
pub struct PlaybackAdapter<P: PlayerPlatform> {
    platform: P,
    slot: Option<P::Player>,
    requested: Option<MediaId>,
    ready: bool,
    attached: bool,
    end_reported: bool,
    volume: u32,
}

impl<P: PlayerPlatform> PlaybackAdapter<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            slot: None,
            requested: None,
            ready: false,
            attached: false,
            end_reported: false,
            volume: 100,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match (&self.requested, &self.slot) {
            (None, _) => PlaybackState::Empty,
            (Some(id), Some(_)) if self.attached => PlaybackState::Playing(id.clone()),
            (Some(id), _) => PlaybackState::Loading(id.clone()),
        }
    }

    pub fn has_player(&self) -> bool {
        self.slot.is_some()
    }

    /// Follow the controller's active media id.
    pub fn set_active(&mut self, media_id: Option<MediaId>) -> Transition {
        if media_id == self.requested {
            return Transition::Unchanged;
        }

        self.destroy_current();
        self.requested = media_id;

        match self.requested.clone() {
            None => Transition::Cleared,
            Some(id) if !self.ready => {
                debug!("Player for {} deferred until the platform is ready", id);
                Transition::Deferred(id)
            }
            Some(id) => self.create(id),
        }
    }

    /// Platform readiness signal. Safe to deliver more than once.
    pub fn platform_ready(&mut self) -> Transition {
        if self.ready {
            return Transition::Unchanged;
        }
        self.ready = true;
        info!("Player platform ready");

        match self.requested.clone() {
            Some(id) if self.slot.is_none() => self.create(id),
            _ => Transition::Unchanged,
        }
    }

    /// Hand fetched media to the live instance. Media for any other id is dropped.
    pub fn attach_source(
        &mut self,
        media_id: &MediaId,
        source: <P::Player as Player>::Source,
    ) -> Result<bool, PlayerError> {
        let Some(player) = self.slot.as_mut() else {
            debug!("No player for {}, dropping media", media_id);
            return Ok(false);
        };
        if player.media_id() != media_id || self.attached {
            debug!("Media for {} no longer wanted", media_id);
            return Ok(false);
        }

        player.attach(source)?;
        self.attached = true;
        Ok(true)
    }

    /// Reports the end of playback, once per instance.
    pub fn poll_ended(&mut self) -> bool {
        if self.end_reported || !self.attached {
            return false;
        }
        match &self.slot {
            Some(player) if player.has_ended() => {
                self.end_reported = true;
                true
            }
            _ => false,
        }
    }

    pub fn toggle_pause(&mut self) {
        if let Some(player) = self.slot.as_mut() {
            let paused = player.is_paused();
            player.set_paused(!paused);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.slot.as_ref().is_some_and(|player| player.is_paused())
    }

    pub fn set_volume(&mut self, volume: u32) {
        self.volume = volume.min(100);
        if let Some(player) = self.slot.as_mut() {
            player.set_volume(self.volume);
        }
    }

    fn create(&mut self, media_id: MediaId) -> Transition {
        // The slot is always empty here; destroy_current ran on every path in.
        debug_assert!(self.slot.is_none());
        match self.platform.create(&media_id) {
            Ok(mut player) => {
                player.set_volume(self.volume);
                self.slot = Some(player);
                info!("Player created for {}", media_id);
                Transition::Created(media_id)
            }
            Err(e) => {
                warn!("Failed to create player for {}: {}", media_id, e);
                Transition::Failed(media_id)
            }
        }
    }

    fn destroy_current(&mut self) {
        if let Some(player) = self.slot.take() {
            debug!("Destroying player for {}", player.media_id());
            player.destroy();
        }
        self.attached = false;
        self.end_reported = false;
    }
}

impl<P: PlayerPlatform> Drop for PlaybackAdapter<P> {
    fn drop(&mut self) {
        self.destroy_current();
    }
}
