use std::path::PathBuf;

/// The camera could not deliver a frame. Fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("camera returned no image")]
    Unavailable,
    #[error("camera failure: {0}")]
    Device(String),
}

/// Saving a frame or appending the run report failed. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sink rejected write: {0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by the navigation loop and its controller.
#[derive(Debug, thiserror::Error)]
pub enum SeekerError {
    #[error("could not capture image: {0}")]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("frame {width}x{height} cannot be split into three non-empty bands")]
    InvalidFrame { width: u32, height: u32 },
    #[error("control channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, SeekerError>;
