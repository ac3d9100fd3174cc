//! Error types for Ouro

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("artifact error: {name} - {message}")]
    Artifact { name: String, message: String },

    #[error("malformed agent definition in {artifact}: {source}")]
    Malformed {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported agent format version {found} in {artifact}")]
    Version { artifact: String, found: u32 },

    #[error("spawn failed: {0}")]
    Spawn(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn artifact(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Artifact {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn(message.into())
    }
}
