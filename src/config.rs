use std::{env, fs, path::PathBuf};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "bonktify", env!("CARGO_PKG_NAME"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Helper used to turn a watch URL into a direct audio URL
    pub resolver_command: String,
    /// Format selector handed to the resolver
    pub audio_format: String,
    /// 0 - 100
    pub volume: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            resolver_command: constants::DEFAULT_RESOLVER_COMMAND.to_string(),
            audio_format: constants::DEFAULT_AUDIO_FORMAT.to_string(),
            volume: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    /// Overrides `API_URL` from the environment when set
    pub api_url: Option<String>,
    pub player: PlayerSettings,
}

impl AppSettings {
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| constants::API_URL.clone())
    }
}

pub fn get_settings_path() -> PathBuf {
    get_data_dir().join("app.toml")
}

pub fn load_settings() -> AppSettings {
    let settings_path = get_settings_path();

    if settings_path.exists() {
        match fs::read_to_string(&settings_path) {
            Ok(contents) => parse_settings(&contents),
            Err(e) => {
                warn!("Failed to read settings file: {}. Using defaults.", e);
                AppSettings::default()
            }
        }
    } else {
        let settings = AppSettings::default();
        if let Err(e) = save_settings(&settings) {
            warn!("Failed to write default settings: {}", e);
        }
        settings
    }
}

fn parse_settings(contents: &str) -> AppSettings {
    match toml::from_str(contents) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to parse settings file: {}. Using defaults.", e);
            AppSettings::default()
        }
    }
}

pub fn save_settings(settings: &AppSettings) -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = get_settings_path();

    // Ensure the data directory exists
    if let Some(parent) = settings_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(settings)?;
    fs::write(&settings_path, toml_string)?;

    Ok(())
}
