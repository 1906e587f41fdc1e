pub mod audio;
pub mod jukebox;
pub mod media_controls;
pub mod playback;
pub mod queue;

// Re-export for convenience
pub use audio::AudioPlatform;
pub use jukebox::{Cue, Jukebox};
pub use media_controls::{MediaControlsBridge, MediaSession};
pub use playback::PlaybackState;
pub use queue::{QueueError, QueueFuture, RefreshOutcome, RefreshTicket};
