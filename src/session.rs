use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config;
use crate::constants;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists the bearer token under a well-known key in the data directory.
///
/// Presence of the token is the only thing the auth gate checks: there is no
/// expiry and no refresh.
#[derive(Debug, Clone)]
pub struct TokenStore {
    file_path: PathBuf,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::in_dir(config::get_data_dir())
    }

    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            file_path: dir.join(constants::TOKEN_KEY),
        }
    }

    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.file_path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.file_path, token)?;
        info!("Bearer token saved to {}", self.file_path.display());
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path)?;
            info!("Bearer token cleared from {}", self.file_path.display());
        }
        Ok(())
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_through_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::in_dir(dir.path().join("nested"));

        assert_eq!(store.load(), None);
        store.save("abc.def.ghi").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn clear_removes_the_token_and_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::in_dir(dir.path().to_path_buf());

        store.save("secret").unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn blank_token_file_does_not_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::in_dir(dir.path().to_path_buf());

        store.save("  \n").unwrap();

        assert_eq!(store.load(), None);
    }
}
