use crate::error::{Result, VaultError};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
const DB_FILENAME: &str = "library.json";

/// Runtime configuration, built once at process start and passed by
/// reference into the API client and store constructors.
///
/// The OAuth dance is out of scope; the client authenticates with a
/// ready-made bearer token from `SPOTIFY_ACCESS_TOKEN`.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub access_token: Option<String>,
    pub api_base: String,
    pub data_dir: PathBuf,
}

impl VaultConfig {
    /// Read configuration from the environment, falling back to the
    /// platform data directory for storage.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("TUNEVAULT_DATA_DIR")
            .map(PathBuf::from)
            .ok()
            .unwrap_or_else(default_data_dir);

        let api_base = std::env::var("TUNEVAULT_API_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let access_token = std::env::var("SPOTIFY_ACCESS_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());

        Self {
            access_token,
            api_base,
            data_dir,
        }
    }

    /// Path of the JSON document holding the whole mirror.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILENAME)
    }

    /// Fail fast when credentials are missing; no partial work is attempted.
    pub fn require_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            VaultError::Config(
                "Spotify credentials not configured. \
                 Set SPOTIFY_ACCESS_TOKEN in your environment."
                    .to_string(),
            )
        })
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "tunevault", "tunevault")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_is_under_data_dir() {
        let config = VaultConfig {
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from("/tmp/tv"),
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/tv/library.json"));
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let config = VaultConfig {
            access_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            data_dir: PathBuf::from("/tmp/tv"),
        };
        assert!(matches!(
            config.require_token(),
            Err(VaultError::Config(_))
        ));
    }
}
