use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Duplicate image key: {0}")]
    DuplicateKey(String),
    #[error("Nothing to pack")]
    Empty,
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
