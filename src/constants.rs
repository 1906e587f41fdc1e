use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;

fn load_dotenv() {
    // Try to load .env from current directory first
    if dotenv::dotenv().is_ok() {
        return;
    }

    // If that fails, try to load from the executable's directory (for app bundles)
    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let env_path = exe_dir.join(".env");
            if env_path.exists() {
                dotenv::from_path(env_path).ok();
                return;
            }
        }
    }

    let possible_paths = vec![PathBuf::from("../.env"), PathBuf::from("../../.env")];

    for path in possible_paths {
        if path.exists() {
            dotenv::from_path(path).ok();
            break;
        }
    }
}

lazy_static! {
    /// Base URL of the queue service, e.g. `http://localhost:3000/api`
    pub static ref API_URL: String = {
        load_dotenv();
        env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
    };
}

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

pub const QUEUE_PATH: &str = "queue";
pub const LOGIN_PATH: &str = "auth/login";
pub const SIGNUP_PATH: &str = "auth/signup";

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";
pub const THUMBNAIL_URL_PREFIX: &str = "https://i.ytimg.com/vi/";
pub const PREVIEW_TITLE: &str = "Video Preview";

/// Name of the file holding the bearer token inside the data directory
pub const TOKEN_KEY: &str = "token";

pub const DEFAULT_RESOLVER_COMMAND: &str = "yt-dlp";
pub const DEFAULT_AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio";
