use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio_util::bytes::Bytes;
use tracing::{debug, info, warn};

use super::MediaId;
use crate::config::PlayerSettings;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("{command} failed: {message}")]
    Helper { command: String, message: String },

    #[error("{command} returned no stream URL")]
    NoStream { command: String },

    #[error("download failed: {0}")]
    Download(String),
}

/// Whether the helper ran, checked at most once per process.
static HELPER_READY: OnceCell<bool> = OnceCell::const_new();

/// Turns media ids into playable audio bytes through an external helper.
///
/// Every resolver shares the same readiness answer, which is the platform
/// readiness signal for playback.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    command: String,
    audio_format: String,
    http: reqwest::Client,
}

impl MediaResolver {
    pub fn new(settings: &PlayerSettings) -> Self {
        Self {
            command: settings.resolver_command.clone(),
            audio_format: settings.audio_format.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Resolves once the helper has been checked. Later calls, from any
    /// resolver, return the cached result.
    pub async fn ready(self) -> bool {
        helper_ready(&HELPER_READY, &self.command).await
    }

    pub async fn fetch_audio(self, media_id: MediaId) -> Result<Bytes, ResolveError> {
        let stream_url = self.stream_url(&media_id).await?;
        debug!("Downloading audio for {}", media_id);

        let response = self
            .http
            .get(stream_url)
            .send()
            .await
            .map_err(|e| ResolveError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Download(format!("HTTP {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| ResolveError::Download(e.to_string()))
    }

    async fn stream_url(&self, media_id: &MediaId) -> Result<String, ResolveError> {
        let output = Command::new(&self.command)
            .arg("--get-url")
            .arg("--no-playlist")
            .arg("-f")
            .arg(&self.audio_format)
            .arg(media_id.watch_url())
            .output()
            .await
            .map_err(|e| ResolveError::Spawn {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ResolveError::Helper {
                command: self.command.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        first_url(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| ResolveError::NoStream {
            command: self.command.clone(),
        })
    }
}

async fn helper_ready(cell: &OnceCell<bool>, command: &str) -> bool {
    *cell.get_or_init(|| check_helper(command)).await
}

async fn check_helper(command: &str) -> bool {
    match Command::new(command).arg("--version").output().await {
        Ok(output) if output.status.success() => {
            info!(
                "{} {} available",
                command,
                String::from_utf8_lossy(&output.stdout).trim()
            );
            true
        }
        Ok(output) => {
            warn!("{} --version exited with {}", command, output.status);
            false
        }
        Err(e) => {
            warn!("{} is not available: {}", command, e);
            false
        }
    }
}

fn first_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("http"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_url_skips_noise() {
        let stdout = "WARNING: something\n  https://cdn.example/a.m4a\nhttps://cdn.example/b\n";
        assert_eq!(first_url(stdout).as_deref(), Some("https://cdn.example/a.m4a"));
        assert_eq!(first_url("nothing here\n"), None);
    }

    const MISSING: &str = "bonktify-definitely-missing-helper";

    #[tokio::test]
    async fn missing_helper_is_not_ready() {
        assert!(!check_helper(MISSING).await);
    }

    #[tokio::test]
    async fn readiness_is_decided_once() {
        let cell = OnceCell::new();

        assert!(!helper_ready(&cell, MISSING).await);
        assert_eq!(cell.get(), Some(&false));
        assert!(!helper_ready(&cell, "bonktify-another-missing-helper").await);
    }

    #[tokio::test]
    async fn separate_resolvers_share_the_readiness_answer() {
        let settings = PlayerSettings {
            resolver_command: MISSING.to_string(),
            ..PlayerSettings::default()
        };
        let first = MediaResolver::new(&settings);
        let second = MediaResolver::new(&settings);

        let answer = first.ready().await;

        assert_eq!(HELPER_READY.get(), Some(&answer));
        assert_eq!(second.ready().await, answer);
    }
}
