use std::sync::mpsc;

use souvlaki::{MediaControlEvent, MediaControls, MediaMetadata, MediaPlayback, PlatformConfig};
use tracing::warn;

/// What the OS media overlay should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSession {
    Track {
        title: String,
        submitter: String,
        cover_url: Option<String>,
    },
    Paused(bool),
    Stopped,
}

/// OS media controls (MPRIS, SMTC, Now Playing) for the current queue item.
pub struct MediaControlsBridge {
    controls: MediaControls,
    receiver: mpsc::Receiver<MediaControlEvent>,
}

impl MediaControlsBridge {
    /// Returns `None` when the platform has no media control service.
    pub fn new() -> Option<Self> {
        let (sender, receiver) = mpsc::channel();
        let config = PlatformConfig {
            dbus_name: "bonktify",
            display_name: "Bonktify",
            hwnd: None,
        };

        let mut controls = match MediaControls::new(config) {
            Ok(controls) => controls,
            Err(e) => {
                warn!("Media controls unavailable: {:?}", e);
                return None;
            }
        };

        if let Err(e) = controls.attach(move |event| {
            let _ = sender.send(event);
        }) {
            warn!("Failed to attach media controls handler: {:?}", e);
            return None;
        }

        Some(Self { controls, receiver })
    }

    pub fn try_recv(&self) -> Option<MediaControlEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn apply(&mut self, session: &MediaSession) {
        match session {
            MediaSession::Track {
                title,
                submitter,
                cover_url,
            } => self.now_playing(title, submitter, cover_url.as_deref()),
            MediaSession::Paused(paused) => self.paused(*paused),
            MediaSession::Stopped => self.stopped(),
        }
    }

    fn now_playing(&mut self, title: &str, submitter: &str, cover_url: Option<&str>) {
        let metadata = MediaMetadata {
            title: Some(title),
            artist: Some(submitter),
            album: None,
            cover_url,
            duration: None,
        };
        let _ = self.controls.set_metadata(metadata);
        let _ = self
            .controls
            .set_playback(MediaPlayback::Playing { progress: None });
    }

    fn paused(&mut self, paused: bool) {
        let playback = if paused {
            MediaPlayback::Paused { progress: None }
        } else {
            MediaPlayback::Playing { progress: None }
        };
        let _ = self.controls.set_playback(playback);
    }

    fn stopped(&mut self) {
        let _ = self.controls.set_playback(MediaPlayback::Stopped);
    }
}
