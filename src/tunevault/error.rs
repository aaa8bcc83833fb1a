use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
