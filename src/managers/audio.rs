use std::io::Cursor;

use rodio::{Decoder, OutputStream, Sink};
use tokio_util::bytes::Bytes;
use tracing::warn;

use super::playback::{Player, PlayerError, PlayerPlatform};
use crate::media::MediaId;

/// rodio-backed player platform: one output stream, one `Sink` per player instance.
pub struct AudioPlatform {
    stream: Option<OutputStream>,
}

impl AudioPlatform {
    /// Open the default output device. Without one, every `create` fails.
    pub fn new() -> Self {
        let stream = match rodio::OutputStreamBuilder::open_default_stream() {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Failed to open default audio output stream: {}", e);
                None
            }
        };
        Self { stream }
    }
}

impl Default for AudioPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerPlatform for AudioPlatform {
    type Player = AudioPlayer;

    fn create(&mut self, media_id: &MediaId) -> Result<AudioPlayer, PlayerError> {
        let stream = self.stream.as_ref().ok_or(PlayerError::NoOutputDevice)?;
        let sink = Sink::connect_new(stream.mixer());

        Ok(AudioPlayer {
            media_id: media_id.clone(),
            sink,
            loaded: false,
        })
    }
}

pub struct AudioPlayer {
    media_id: MediaId,
    sink: Sink,
    loaded: bool,
}

impl Player for AudioPlayer {
    type Source = Bytes;

    fn media_id(&self) -> &MediaId {
        &self.media_id
    }

    fn attach(&mut self, track_data: Bytes) -> Result<(), PlayerError> {
        let source = Decoder::new(Cursor::new(track_data))
            .map_err(|e| PlayerError::Decode(e.to_string()))?;

        self.sink.clear();
        self.sink.append(source);
        self.sink.play();
        self.loaded = true;

        Ok(())
    }

    fn has_ended(&self) -> bool {
        self.loaded && self.sink.empty()
    }

    fn set_paused(&mut self, paused: bool) {
        if paused {
            self.sink.pause();
        } else {
            self.sink.play();
        }
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn set_volume(&mut self, volume: u32) {
        self.sink.set_volume(volume as f32 / 100.0);
    }

    fn destroy(self) {
        self.sink.stop();
    }
}
